use crate::agents::Stage;
use crate::llm::LLMClient;
use crate::research::state::ResearchState;
use crate::types::Result;
use crate::utils::text::preview;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, warn};

const REVIEW_SYSTEM_PROMPT: &str = r#"You are an Expert Editor and Fact Checker.
Review the research report for quality, clarity and completeness.

Criteria:
1. Clarity and readability
2. Depth relative to the gathered findings
3. Structure (Executive Summary, Details, Takeaways)

Return a short evaluation containing:
- Score: 1-10
- Critique: one paragraph of feedback
- Status: PASS or IMPROVE"#;

/// Produces an advisory critique of the synthesized report
pub struct QualityReviewer {
    llm: Arc<dyn LLMClient>,
}

impl QualityReviewer {
    pub fn new(llm: Arc<dyn LLMClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Stage for QualityReviewer {
    fn name(&self) -> &str {
        "QualityReviewer"
    }

    async fn run(&self, state: &mut ResearchState) -> Result<()> {
        let prompt = match &state.synthesized_content {
            Some(content) => format!("Review the following report:\n\n{}", content),
            None => {
                warn!("No synthesized content to review.");
                return Ok(());
            }
        };

        match self.llm.generate_with_system(REVIEW_SYSTEM_PROMPT, &prompt).await {
            Ok(review) => {
                info!("Quality Review Report: {}", preview(&review, 100));
                state.quality_report = Some(review);
                state.push_progress("Quality Review Completed.");
            }
            Err(e) => {
                error!("Error reviewing content: {}", e);
                state.push_error(format!("Quality Review Error: {}", e));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::MockLLMClient;
    use crate::research::state::Customization;
    use crate::types::AppError;
    use uuid::Uuid;

    fn state() -> ResearchState {
        ResearchState::new(Uuid::new_v4(), "Quantum Computing", Customization::default())
    }

    #[tokio::test]
    async fn test_review_is_stored_verbatim() {
        let mut llm = MockLLMClient::new();
        llm.expect_generate_with_system()
            .withf(|_, prompt| prompt.contains("# Report"))
            .returning(|_, _| Ok("Score: 4\nCritique: thin.\nStatus: IMPROVE".to_string()));

        let mut state = state();
        state.synthesized_content = Some("# Report".to_string());
        QualityReviewer::new(Arc::new(llm)).run(&mut state).await.unwrap();

        assert_eq!(
            state.quality_report.as_deref(),
            Some("Score: 4\nCritique: thin.\nStatus: IMPROVE")
        );
        // The verdict is advisory: nothing else changes
        assert_eq!(state.synthesized_content.as_deref(), Some("# Report"));
        assert!(state.errors().is_empty());
    }

    #[tokio::test]
    async fn test_noop_without_content() {
        let mut llm = MockLLMClient::new();
        llm.expect_generate_with_system().never();

        let mut state = state();
        let before = state.clone();
        QualityReviewer::new(Arc::new(llm)).run(&mut state).await.unwrap();
        assert_eq!(state, before);
    }

    #[tokio::test]
    async fn test_failure_appends_one_error() {
        let mut llm = MockLLMClient::new();
        llm.expect_generate_with_system()
            .returning(|_, _| Err(AppError::Timeout("slow".to_string())));

        let mut state = state();
        state.synthesized_content = Some("# Report".to_string());
        QualityReviewer::new(Arc::new(llm)).run(&mut state).await.unwrap();

        assert_eq!(state.errors().len(), 1);
        assert!(state.errors()[0].starts_with("Quality Review Error: "));
        assert_eq!(state.progress_updates().len(), 1);
        assert!(state.quality_report.is_none());
    }
}
