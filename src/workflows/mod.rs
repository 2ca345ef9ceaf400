//! Research Pipeline Module
//!
//! The pipeline is a fixed, linear sequence of stages:
//!
//! ```text
//! ResearchPlanner -> WebResearcher -> TechnicalAnalyst -> BusinessAnalyst
//!     -> ContentSynthesizer -> QualityReviewer -> HTMLDesigner
//! ```
//!
//! Stage tuning comes from the `[pipeline]` section of `studio.toml`:
//!
//! ```toml
//! [pipeline]
//! search_timeout_secs = 15
//! max_synthesis_chars = 50000
//! question_concurrency = 1
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let pipeline = ResearchPipeline::standard(llm, search, &config.pipeline);
//! let mut state = ResearchState::new(Uuid::new_v4(), "Quantum Computing", Customization::default());
//! pipeline.run(&mut state, &NoopObserver).await;
//! println!("{:?}: {} errors", state.status, state.errors().len());
//! ```

pub mod engine;

pub use engine::{NoopObserver, PipelineObserver, ResearchPipeline};
