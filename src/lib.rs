//! # Agentic Research Studio
//!
//! A research service that turns a topic into a synthesized report and an HTML
//! dashboard by running a fixed pipeline of LLM-backed agents over a shared
//! research state.
//!
//! ## Overview
//!
//! The studio can be used in two ways:
//!
//! 1. **As a server** - Run the `research-studio` binary and drive runs over HTTP
//! 2. **As a library** - Build a [`ResearchPipeline`] and run it in-process
//!
//! ### Basic Example
//!
//! ```rust,ignore
//! use research_studio::{Customization, NoopObserver, Provider, ResearchPipeline, ResearchState, WebSearch};
//! use std::sync::Arc;
//!
//! let llm = Provider::Ollama {
//!     base_url: "http://localhost:11434".to_string(),
//!     model: "llama3.2".to_string(),
//!     temperature: 0.7,
//!     request_timeout: std::time::Duration::from_secs(120),
//! }
//! .create_client()?;
//!
//! let pipeline = ResearchPipeline::standard(llm, Arc::new(WebSearch::default()), &Default::default());
//! let mut state = ResearchState::new(uuid::Uuid::new_v4(), "Quantum Computing", Customization::default());
//! pipeline.run(&mut state, &NoopObserver).await;
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! ResearchPlanner -> WebResearcher -> TechnicalAnalyst -> BusinessAnalyst
//!     -> ContentSynthesizer -> QualityReviewer -> HTMLDesigner
//! ```
//!
//! A failing stage records its error on the state and the next stage still runs.
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `openai` | OpenAI-compatible chat completions (default) |
//! | `ollama` | Ollama local inference (default) |
//! | `swagger-ui` | Interactive API documentation at `/swagger-ui` |
//!
//! ## Modules
//!
//! - [`agents`] - Pipeline stage agents
//! - [`api`] - REST API handlers and routes
//! - [`llm`] - LLM client implementations
//! - [`research`] - Research state, plan, store and service
//! - [`tools`] - Web search
//! - [`workflows`] - Pipeline executor
//! - [`types`] - API types and error handling

/// Pipeline stage agents.
pub mod agents;
/// HTTP API handlers and routes.
pub mod api;
/// Command-line interface.
pub mod cli;
/// LLM provider clients and abstractions.
pub mod llm;
/// Research state, plan, store and request boundary.
pub mod research;
/// Web search capability.
pub mod tools;
/// Core types (requests, responses, errors).
pub mod types;
/// Configuration and text utilities.
pub mod utils;
/// Research pipeline executor.
pub mod workflows;

// Re-export commonly used types
pub use llm::{LLMClient, LLMClientFactory, Provider};
pub use research::{
    Customization, InMemoryResearchStore, ResearchService, ResearchState, ResearchStatus,
    ResearchStore,
};
pub use tools::{SearchProvider, WebSearch};
pub use types::{AppError, Result};
pub use utils::toml_config::{ConfigManager, StudioConfig};
pub use workflows::{NoopObserver, PipelineObserver, ResearchPipeline};

use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// TOML-based configuration with hot-reload support
    pub config_manager: Arc<ConfigManager>,
    /// Research run boundary
    pub service: Arc<ResearchService>,
}

impl AppState {
    /// Wire the configured LLM provider, DuckDuckGo search and an in-memory store
    pub fn from_config(config_manager: Arc<ConfigManager>) -> Result<Self> {
        let config = config_manager.config();
        let factory = LLMClientFactory::new(config.provider()?);
        let llm = factory.create_default()?;
        let search: Arc<dyn SearchProvider> = Arc::new(WebSearch::new(config.search.num_results));

        let service = ResearchService::new(
            Arc::new(InMemoryResearchStore::new()),
            llm,
            search,
            Arc::clone(&config_manager),
        );

        Ok(Self {
            config_manager,
            service: Arc::new(service),
        })
    }
}
