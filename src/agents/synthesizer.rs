use crate::agents::Stage;
use crate::llm::LLMClient;
use crate::research::state::{Finding, ResearchState};
use crate::types::Result;
use crate::utils::text::truncate_chars;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Synthesized content when no agent produced a finding
pub const NO_FINDINGS_PLACEHOLDER: &str = "No research findings were collected.";
/// Appended to an aggregate cut at the character cap
pub const TRUNCATION_MARKER: &str = "\n...(truncated due to length)...";

const SYNTHESIS_SYSTEM_PROMPT: &str = r#"You are a Lead Editor. Synthesize the research findings into a comprehensive Markdown report.

Structure the report as:
1. Executive Summary
2. Detailed Analysis, organized by theme rather than by source
3. Key Takeaways

Keep concrete facts, figures and names from the findings and mention their sources."#;

fn render_finding(finding: &Finding) -> String {
    format!(
        "\n--- Finding ({}) ---\nQuestion: {}\nContent: {}\nSource: {}\n",
        finding.kind.label(),
        finding.question,
        finding.best_content(),
        finding.source
    )
}

/// Aggregate all findings (web, technical, business) into one text block
pub fn aggregate_findings(state: &ResearchState) -> String {
    state.all_findings().map(render_finding).collect()
}

/// Cut `text` to `max_chars` characters and append the truncation marker.
///
/// Returns the text unchanged when it fits.
pub fn cap_findings(text: String, max_chars: usize) -> String {
    let total = text.chars().count();
    if total <= max_chars {
        return text;
    }

    warn!("Truncating findings from {} to {} chars.", total, max_chars);
    format!("{}{}", truncate_chars(&text, max_chars), TRUNCATION_MARKER)
}

/// Merges every finding into the report draft
pub struct ContentSynthesizer {
    llm: Arc<dyn LLMClient>,
    max_chars: usize,
}

impl ContentSynthesizer {
    pub fn new(llm: Arc<dyn LLMClient>, max_chars: usize) -> Self {
        Self { llm, max_chars }
    }
}

#[async_trait]
impl Stage for ContentSynthesizer {
    fn name(&self) -> &str {
        "ContentSynthesizer"
    }

    async fn run(&self, state: &mut ResearchState) -> Result<()> {
        if state.finding_count() == 0 {
            warn!("No findings available to synthesize.");
            state.synthesized_content = Some(NO_FINDINGS_PLACEHOLDER.to_string());
            return Ok(());
        }

        let findings_text = cap_findings(aggregate_findings(state), self.max_chars);
        info!(
            findings = state.finding_count(),
            chars = findings_text.chars().count(),
            "Synthesizing report"
        );

        let prompt = format!(
            "Research Topic: {}\n\nWrite the report based on:\n\n{}",
            state.topic(),
            findings_text
        );

        match self.llm.generate_with_system(SYNTHESIS_SYSTEM_PROMPT, &prompt).await {
            Ok(report) => {
                state.synthesized_content = Some(report);
                state.push_progress("Research content synthesized.");
            }
            Err(e) => {
                error!("Error during content synthesis: {}", e);
                state.push_error(format!("Content Synthesis Error: {}", e));
            }
        }

        Ok(())
    }
}
