use crate::agents::Stage;
use crate::llm::{generate_structured, LLMClient};
use crate::research::plan::ResearchPlan;
use crate::research::state::ResearchState;
use crate::types::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info};

const PLANNER_SYSTEM_PROMPT: &str = r#"You are a Senior Research Director planning a multi-agent research project.

Break the topic down into 5 to 8 specific, answerable research questions.

For every question choose:
- category: one of technical, business, market, news, industry, general
- priority: 1 (low) to 5 (critical)
- depth: overview, deep-dive or fast-check
- assigned_agent:
  - web_researcher for news, recent events and broad overviews
  - technical_analyst for implementation details, architecture and specifications
  - business_analyst for market trends, companies, financials and impact

Give every question a unique id such as q1, q2, q3."#;

/// Turns the topic into a structured research plan
pub struct ResearchPlanner {
    llm: Arc<dyn LLMClient>,
}

impl ResearchPlanner {
    pub fn new(llm: Arc<dyn LLMClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Stage for ResearchPlanner {
    fn name(&self) -> &str {
        "ResearchPlanner"
    }

    async fn run(&self, state: &mut ResearchState) -> Result<()> {
        info!(topic = state.topic(), "Planning research");

        let prompt = format!(
            "Research Topic: {}\n\nCustomization:\n{}",
            state.topic(),
            state.customization.describe()
        );

        match generate_structured::<ResearchPlan>(self.llm.as_ref(), PLANNER_SYSTEM_PROMPT, &prompt)
            .await
        {
            Ok(plan) => {
                let plan = plan.normalized();
                info!(questions = plan.len(), "Research plan created");
                state.push_progress(format!(
                    "Research plan created with {} questions.",
                    plan.len()
                ));
                state.research_plan = Some(plan);
            }
            Err(e) => {
                error!("Error in Research Planner: {}", e);
                state.push_error(format!("Research Planner Error: {}", e));
            }
        }

        Ok(())
    }
}
