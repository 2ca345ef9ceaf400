use crate::agents::Stage;
use crate::llm::LLMClient;
use crate::research::state::ResearchState;
use crate::types::Result;
use crate::utils::text::clean_html_response;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, warn};

const DESIGN_SYSTEM_PROMPT: &str = r#"You are a Business Intelligence designer.
Turn the research report into an executive dashboard delivered as ONE self-contained HTML document.

Required sections, in order:
- Header with the report title and date
- Executive Summary
- Key Metrics: four cards with headline numbers
- Analysis tabs switched with JavaScript (Market, Technical, Strategy)
- Strategic Recommendations
- References & Citations with links

Use Tailwind CSS and Chart.js from their CDNs and include at least three Chart.js charts.
Start the output with <!DOCTYPE html>. Return only the HTML."#;

/// Renders the synthesized report as an HTML dashboard
pub struct HtmlDesigner {
    llm: Arc<dyn LLMClient>,
}

impl HtmlDesigner {
    pub fn new(llm: Arc<dyn LLMClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Stage for HtmlDesigner {
    fn name(&self) -> &str {
        "HTMLDesigner"
    }

    async fn run(&self, state: &mut ResearchState) -> Result<()> {
        let content = match &state.synthesized_content {
            Some(content) => content,
            None => {
                warn!("No synthesized content to design.");
                return Ok(());
            }
        };

        let prompt = format!(
            "Topic: {}\n\nAudience and style:\n{}\n\nReport:\n\n{}",
            state.topic(),
            state.customization.describe(),
            content
        );

        match self.llm.generate_with_system(DESIGN_SYSTEM_PROMPT, &prompt).await {
            Ok(raw) => {
                let html = clean_html_response(&raw);
                info!(bytes = html.len(), "HTML report generated");
                state.html_output = Some(html);
                state.push_progress("HTML Report generated.");
            }
            Err(e) => {
                error!("Error generating HTML: {}", e);
                state.push_error(format!("HTML Generation Error: {}", e));
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

    fn state_with_report() -> ResearchState {
        let mut state =
            ResearchState::new(Uuid::new_v4(), "Quantum Computing", Customization::default());
        state.synthesized_content = Some("# Report".to_string());
        state
    }

    #[tokio::test]
    async fn test_fenced_html_is_cleaned() {
        let mut llm = MockLLMClient::new();
        llm.expect_generate_with_system().returning(|_, _| {
            Ok("```html\n<!DOCTYPE html>\n<html><body>ok</body></html>\n```".to_string())
        });

        let mut state = state_with_report();
        HtmlDesigner::new(Arc::new(llm)).run(&mut state).await.unwrap();

        assert_eq!(
            state.html_output.as_deref(),
            Some("<!DOCTYPE html>\n<html><body>ok</body></html>")
        );
        assert_eq!(state.progress_updates().last().unwrap(), "HTML Report generated.");
    }

    #[tokio::test]
    async fn test_noop_without_content() {
        let mut llm = MockLLMClient::new();
        llm.expect_generate_with_system().never();

        let mut state =
            ResearchState::new(Uuid::new_v4(), "Quantum Computing", Customization::default());
        HtmlDesigner::new(Arc::new(llm)).run(&mut state).await.unwrap();
        assert!(state.html_output.is_none());
    }

    #[tokio::test]
    async fn test_failure_appends_one_error() {
        let mut llm = MockLLMClient::new();
        llm.expect_generate_with_system()
            .returning(|_, _| Err(AppError::LLM("quota".to_string())));

        let mut state = state_with_report();
        HtmlDesigner::new(Arc::new(llm)).run(&mut state).await.unwrap();

        assert_eq!(state.errors(), &["HTML Generation Error: LLM error: quota".to_string()]);
        assert_eq!(state.progress_updates().len(), 1);
    }
}
