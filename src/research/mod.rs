//! Research runs
//!
//! This module holds the data a research run works on and the boundary that
//! starts and tracks runs:
//! - [`state::ResearchState`] - the record threaded through every pipeline stage
//! - [`plan::ResearchPlan`] - questions produced by the planner
//! - [`store::ResearchStore`] - where runs are published for polling
//! - [`service::ResearchService`] - creates runs and schedules the pipeline
//!
//! # Usage
//!
//! ```ignore
//! let service = ResearchService::new(store, llm, search, config_manager);
//! let created = service.create_research("Quantum Computing", Customization::default())?;
//!
//! // later
//! let state = service.get_research(&created.research_id)?;
//! println!("{:?}: {:?}", state.status, state.progress_updates());
//! ```

/// Research plan and question selection.
pub mod plan;
/// Run creation, scheduling and polling.
pub mod service;
/// Shared state threaded through the pipeline.
pub mod state;
/// Run storage.
pub mod store;

pub use plan::{AgentRole, ResearchPlan, ResearchQuestion};
pub use service::ResearchService;
pub use state::{Customization, Finding, FindingKind, ResearchState, ResearchStatus};
pub use store::{InMemoryResearchStore, ResearchStore};
