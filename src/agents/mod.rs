//! Pipeline stage agents
//!
//! Each agent is one step of the research pipeline. It reads the fields of the
//! [`ResearchState`] it depends on, makes its LLM and search calls, and writes
//! its results, progress and errors back onto the state.
//!
//! Expected failures (a search that times out, a model call that errors) are
//! recorded on the state by the agent itself and reported as `Ok(())`. An
//! `Err` from [`Stage::run`] is an uncaught failure and is handled by the
//! pipeline supervisor.

/// Web researcher, technical analyst and business analyst.
pub mod analyst;
/// Dashboard rendering.
pub mod designer;
/// Question planning.
pub mod planner;
/// Report critique.
pub mod reviewer;
/// Report synthesis.
pub mod synthesizer;

use crate::research::state::ResearchState;
use crate::types::Result;
use async_trait::async_trait;

pub use analyst::{DomainAgent, DomainProfile};
pub use designer::HtmlDesigner;
pub use planner::ResearchPlanner;
pub use reviewer::QualityReviewer;
pub use synthesizer::ContentSynthesizer;

/// A single step of the research pipeline
#[async_trait]
pub trait Stage: Send + Sync {
    /// Name used in logs, stage records and supervisor error entries
    fn name(&self) -> &str;

    /// Run the stage against the shared state
    async fn run(&self, state: &mut ResearchState) -> Result<()>;
}
