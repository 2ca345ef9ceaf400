//! Research Pipeline
//!
//! Runs the stage agents in a fixed linear order over one [`ResearchState`].
//! Every stage goes through the same supervisor: an uncaught error or a panic
//! is recorded on the state, the run is marked failed, and the next stage still
//! runs on whatever the previous stages left behind.

use crate::agents::{
    ContentSynthesizer, DomainAgent, HtmlDesigner, QualityReviewer, ResearchPlanner, Stage,
};
use crate::llm::LLMClient;
use crate::research::state::{ResearchState, StageOutcome, StageRecord};
use crate::tools::SearchProvider;
use crate::utils::toml_config::PipelineConfig;
use chrono::Utc;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{error, info};

/// Receives a snapshot of the state after every stage and once at the end
pub trait PipelineObserver: Send + Sync {
    fn on_update(&self, state: &ResearchState);
}

/// Observer that ignores every update
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {
    fn on_update(&self, _state: &ResearchState) {}
}

/// Fixed-order sequence of stages
pub struct ResearchPipeline {
    stages: Vec<Arc<dyn Stage>>,
}

impl ResearchPipeline {
    pub fn new(stages: Vec<Arc<dyn Stage>>) -> Self {
        Self { stages }
    }

    /// Planner, web researcher, technical analyst, business analyst,
    /// synthesizer, reviewer and HTML designer
    pub fn standard(
        llm: Arc<dyn LLMClient>,
        search: Arc<dyn SearchProvider>,
        pipeline: &PipelineConfig,
    ) -> Self {
        Self::new(vec![
            Arc::new(ResearchPlanner::new(Arc::clone(&llm))),
            Arc::new(DomainAgent::web_researcher(
                Arc::clone(&llm),
                Arc::clone(&search),
                pipeline,
            )),
            Arc::new(DomainAgent::technical_analyst(
                Arc::clone(&llm),
                Arc::clone(&search),
                pipeline,
            )),
            Arc::new(DomainAgent::business_analyst(
                Arc::clone(&llm),
                search,
                pipeline,
            )),
            Arc::new(ContentSynthesizer::new(
                Arc::clone(&llm),
                pipeline.max_synthesis_chars,
            )),
            Arc::new(QualityReviewer::new(Arc::clone(&llm))),
            Arc::new(HtmlDesigner::new(llm)),
        ])
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run every stage in order, then stamp the terminal status
    pub async fn run(&self, state: &mut ResearchState, observer: &dyn PipelineObserver) {
        info!(
            research_id = %state.research_id(),
            topic = state.topic(),
            stages = self.stages.len(),
            "Starting research pipeline"
        );

        for stage in &self.stages {
            let name = stage.name().to_string();
            let started_at = Utc::now();
            let step_start = std::time::Instant::now();

            info!(stage = %name, "Stage started");

            let outcome = match AssertUnwindSafe(stage.run(state)).catch_unwind().await {
                Ok(Ok(())) => StageOutcome::Completed,
                Ok(Err(e)) => StageOutcome::Failed(e.to_string()),
                Err(panic) => StageOutcome::Failed(panic_message(panic.as_ref())),
            };

            if let StageOutcome::Failed(message) = &outcome {
                error!(stage = %name, "Stage failed: {}", message);
                state.push_error(format!("{}: {}", name, message));
                state.mark_failed();
            }

            let duration_ms = step_start.elapsed().as_millis() as u64;
            info!(stage = %name, duration_ms, failed = outcome.is_failed(), "Stage finished");

            state.metadata.stages.push(StageRecord {
                stage: name,
                outcome,
                started_at,
                duration_ms,
            });
            observer.on_update(state);
        }

        state.finish();
        info!(
            research_id = %state.research_id(),
            status = ?state.status,
            errors = state.errors().len(),
            "Research pipeline finished"
        );
        observer.on_update(state);
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("stage panicked: {}", message)
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("stage panicked: {}", message)
    } else {
        "stage panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::research::state::{Customization, ResearchStatus};
    use crate::types::{AppError, Result};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use uuid::Uuid;

    enum Behavior {
        Progress,
        Fail,
        Panic,
    }

    struct FakeStage {
        name: &'static str,
        behavior: Behavior,
    }

    #[async_trait]
    impl Stage for FakeStage {
        fn name(&self) -> &str {
            self.name
        }

        async fn run(&self, state: &mut ResearchState) -> Result<()> {
            match self.behavior {
                Behavior::Progress => {
                    state.push_progress(format!("{} done", self.name));
                    Ok(())
                }
                Behavior::Fail => Err(AppError::Internal("exploded".to_string())),
                Behavior::Panic => panic!("unexpected input"),
            }
        }
    }

    fn stage(name: &'static str, behavior: Behavior) -> Arc<dyn Stage> {
        Arc::new(FakeStage { name, behavior })
    }

    #[derive(Default)]
    struct RecordingObserver {
        snapshots: Mutex<Vec<usize>>,
    }

    impl PipelineObserver for RecordingObserver {
        fn on_update(&self, state: &ResearchState) {
            self.snapshots.lock().push(state.metadata.stages.len());
        }
    }

    fn state() -> ResearchState {
        ResearchState::new(Uuid::new_v4(), "Topic", Customization::default())
    }

    #[tokio::test]
    async fn test_all_stages_succeed() {
        let pipeline = ResearchPipeline::new(vec![
            stage("First", Behavior::Progress),
            stage("Second", Behavior::Progress),
        ]);
        let observer = RecordingObserver::default();
        let mut state = state();

        pipeline.run(&mut state, &observer).await;

        assert_eq!(state.status, ResearchStatus::Completed);
        assert!(state.metadata.completed_at.is_some());
        assert_eq!(
            state.progress_updates(),
            &["Research started", "First done", "Second done"]
        );
        assert_eq!(state.metadata.stages.len(), 2);
        assert!(state.metadata.stages.iter().all(|r| !r.outcome.is_failed()));
        assert_eq!(*observer.snapshots.lock(), vec![1, 2, 2]);
    }

    #[tokio::test]
    async fn test_failed_stage_is_recorded_and_pipeline_continues() {
        let pipeline = ResearchPipeline::new(vec![
            stage("First", Behavior::Fail),
            stage("Second", Behavior::Progress),
        ]);
        let mut state = state();

        pipeline.run(&mut state, &NoopObserver).await;

        assert_eq!(state.status, ResearchStatus::Failed);
        assert_eq!(state.errors(), &["First: Internal error: exploded"]);
        assert_eq!(state.progress_updates().last().unwrap(), "Second done");
        assert_eq!(
            state.metadata.stages[0].outcome,
            StageOutcome::Failed("Internal error: exploded".to_string())
        );
        assert_eq!(state.metadata.stages[1].outcome, StageOutcome::Completed);
    }

    #[tokio::test]
    async fn test_panicking_stage_is_contained() {
        let pipeline = ResearchPipeline::new(vec![
            stage("Boom", Behavior::Panic),
            stage("After", Behavior::Progress),
        ]);
        let mut state = state();

        pipeline.run(&mut state, &NoopObserver).await;

        assert_eq!(state.status, ResearchStatus::Failed);
        assert_eq!(state.errors().len(), 1);
        assert!(state.errors()[0].starts_with("Boom: stage panicked: unexpected input"));
        assert_eq!(state.progress_updates().last().unwrap(), "After done");
    }

    #[test]
    fn test_standard_stage_order() {
        struct NullLlm;
        #[async_trait]
        impl LLMClient for NullLlm {
            async fn generate(&self, _: &str) -> Result<String> {
                Ok(String::new())
            }
            async fn generate_with_system(&self, _: &str, _: &str) -> Result<String> {
                Ok(String::new())
            }
            async fn generate_with_history(&self, _: &[(String, String)]) -> Result<String> {
                Ok(String::new())
            }
            fn model_name(&self) -> &str {
                "null"
            }
        }

        let pipeline = ResearchPipeline::standard(
            Arc::new(NullLlm),
            Arc::new(crate::tools::WebSearch::default()),
            &PipelineConfig::default(),
        );
        assert_eq!(
            pipeline.stage_names(),
            vec![
                "ResearchPlanner",
                "WebResearcher",
                "TechnicalAnalyst",
                "BusinessAnalyst",
                "ContentSynthesizer",
                "QualityReviewer",
                "HTMLDesigner",
            ]
        );
    }
}
