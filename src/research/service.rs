//! Request boundary for research runs
//!
//! [`ResearchService::create_research`] validates the request, publishes the
//! initial state and runs the pipeline on a background task; callers poll with
//! [`ResearchService::get_research`]. Each run owns its state, and the store
//! only ever receives snapshots of it.

use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use super::state::{Customization, ResearchState, ResearchStatus};
use super::store::ResearchStore;
use crate::llm::LLMClient;
use crate::tools::SearchProvider;
use crate::types::{AppError, CreateResearchResponse, ResearchSummary, Result};
use crate::utils::toml_config::ConfigManager;
use crate::workflows::{PipelineObserver, ResearchPipeline};

impl From<&ResearchState> for ResearchSummary {
    fn from(state: &ResearchState) -> Self {
        Self {
            research_id: state.research_id(),
            topic: state.topic().to_string(),
            status: state.status,
            created_at: state.metadata.created_at,
            completed_at: state.metadata.completed_at,
        }
    }
}

/// Publishes every pipeline update to the store, optionally forwarding it
struct StorePublisher<'a> {
    store: Arc<dyn ResearchStore>,
    forward: Option<&'a dyn PipelineObserver>,
}

impl PipelineObserver for StorePublisher<'_> {
    fn on_update(&self, state: &ResearchState) {
        self.store.put(state.clone());
        if let Some(forward) = self.forward {
            forward.on_update(state);
        }
    }
}

/// Creates, schedules and exposes research runs
pub struct ResearchService {
    store: Arc<dyn ResearchStore>,
    llm: Arc<dyn LLMClient>,
    search: Arc<dyn SearchProvider>,
    config: Arc<ConfigManager>,
}

impl ResearchService {
    pub fn new(
        store: Arc<dyn ResearchStore>,
        llm: Arc<dyn LLMClient>,
        search: Arc<dyn SearchProvider>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            store,
            llm,
            search,
            config,
        }
    }

    /// Pipeline built from the pipeline settings current right now
    fn pipeline(&self) -> ResearchPipeline {
        let config = self.config.config();
        ResearchPipeline::standard(
            Arc::clone(&self.llm),
            Arc::clone(&self.search),
            &config.pipeline,
        )
    }

    fn new_state(&self, topic: &str, customization: Customization) -> Result<ResearchState> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(AppError::InvalidInput("Topic must not be empty".to_string()));
        }

        let state = ResearchState::new(Uuid::new_v4(), topic, customization);
        self.store.put(state.clone());
        Ok(state)
    }

    /// Start a run in the background and return immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn create_research(
        &self,
        topic: &str,
        customization: Customization,
    ) -> Result<CreateResearchResponse> {
        let mut state = self.new_state(topic, customization)?;
        let research_id = state.research_id();
        info!(%research_id, topic = state.topic(), "Research run created");

        let pipeline = self.pipeline();
        let store = Arc::clone(&self.store);
        let handle = tokio::spawn(async move {
            let publisher = StorePublisher {
                store,
                forward: None,
            };
            pipeline.run(&mut state, &publisher).await;
        });

        // A panic that escapes the pipeline supervisor ends the task itself
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            if let Err(e) = handle.await {
                error!(%research_id, "Research task crashed: {}", e);
                if let Some(mut state) = store.get(&research_id) {
                    state.mark_crashed(format!("Research task crashed: {}", e));
                    store.put(state);
                }
            }
        });

        Ok(CreateResearchResponse {
            research_id,
            status: ResearchStatus::Started,
            message: "Research started. Poll for progress.".to_string(),
        })
    }

    /// Run the pipeline to completion on the current task
    pub async fn run_research(
        &self,
        topic: &str,
        customization: Customization,
        observer: &dyn PipelineObserver,
    ) -> Result<ResearchState> {
        let mut state = self.new_state(topic, customization)?;
        let publisher = StorePublisher {
            store: Arc::clone(&self.store),
            forward: Some(observer),
        };
        self.pipeline().run(&mut state, &publisher).await;
        Ok(state)
    }

    /// Latest snapshot of a run
    pub fn get_research(&self, research_id: &Uuid) -> Result<ResearchState> {
        self.store
            .get(research_id)
            .ok_or_else(|| AppError::NotFound(format!("Research {} not found", research_id)))
    }

    /// Summaries of every run, newest first
    pub fn list_research(&self) -> Vec<ResearchSummary> {
        let mut runs: Vec<ResearchSummary> = self
            .store
            .list()
            .iter()
            .map(ResearchSummary::from)
            .collect();
        runs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        runs
    }
}
