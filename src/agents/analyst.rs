//! Domain-filtering agents
//!
//! The web researcher, technical analyst and business analyst share one
//! contract and differ only in their [`DomainProfile`]:
//!
//! 1. select the plan questions assigned to the agent or matching its categories
//! 2. search each question (with the profile's query suffix) under a timeout
//! 3. for analyst profiles, run a second LLM call over the raw results
//! 4. append one finding per successfully processed question
//!
//! A failing question is recorded on the state and never stops the others.
//! Questions can be processed through a bounded pool; results are always applied
//! in plan order, so the state looks the same whatever the concurrency.

use crate::agents::Stage;
use crate::llm::LLMClient;
use crate::research::plan::{AgentRole, ResearchQuestion};
use crate::research::state::{Finding, FindingKind, ResearchState};
use crate::tools::SearchProvider;
use crate::types::{AppError, Result};
use crate::utils::toml_config::PipelineConfig;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

const TECHNICAL_ANALYSIS_PROMPT: &str = "You are a Principal Software Architect. \
Analyze the search results for the research question and explain the technical substance: \
architecture, key technologies, implementation details, specifications and limitations. \
Be concrete and keep numbers and names from the sources.";

const BUSINESS_ANALYSIS_PROMPT: &str = "You are a Strategic Business Analyst. \
Analyze the search results for the research question and give a strategic insight: \
market size and growth, key players and competitive landscape, revenue models, \
risks and opportunities. Keep figures from the sources.";

/// Fixed identity and behavior of a domain-filtering agent
#[derive(Debug, Clone)]
pub struct DomainProfile {
    /// Stage name used by the pipeline
    pub stage_name: &'static str,
    /// Prefix of per-question error entries, e.g. "Web Search"
    pub error_label: &'static str,
    pub role: AgentRole,
    /// Categories owned by this agent in addition to its role
    pub categories: &'static [&'static str],
    /// Appended to the question text to build the search query
    pub query_suffix: Option<&'static str>,
    /// System prompt of the analysis call; `None` stores raw results
    pub analysis_prompt: Option<&'static str>,
    /// Finding source label; `None` uses the search provider's name
    pub source: Option<&'static str>,
    pub kind: FindingKind,
    pub url: &'static str,
    /// Progress when no question matches
    pub nothing_to_do: &'static str,
    /// Progress prefix for each processed question
    pub processed_prefix: &'static str,
    /// Progress after the last question
    pub finished: &'static str,
}

impl DomainProfile {
    pub fn web_researcher() -> Self {
        Self {
            stage_name: "WebResearcher",
            error_label: "Web Search",
            role: AgentRole::WebResearcher,
            categories: &["market", "news", "general"],
            query_suffix: None,
            analysis_prompt: None,
            source: None,
            kind: FindingKind::WebSearch,
            url: "https://duckduckgo.com",
            nothing_to_do: "No specific web questions found.",
            processed_prefix: "Found data for: ",
            finished: "Web Research completed.",
        }
    }

    pub fn technical_analyst() -> Self {
        Self {
            stage_name: "TechnicalAnalyst",
            error_label: "Technical Analyst",
            role: AgentRole::TechnicalAnalyst,
            categories: &["technical"],
            query_suffix: Some("documentation github technical whitepaper"),
            analysis_prompt: Some(TECHNICAL_ANALYSIS_PROMPT),
            source: Some("Technical Analyst Agent"),
            kind: FindingKind::TechnicalDeepDive,
            url: "https://github.com",
            nothing_to_do: "No specific technical questions found.",
            processed_prefix: "Analyzed technical aspect: ",
            finished: "Technical Analysis phase finished.",
        }
    }

    pub fn business_analyst() -> Self {
        Self {
            stage_name: "BusinessAnalyst",
            error_label: "Business Analyst",
            role: AgentRole::BusinessAnalyst,
            categories: &["business", "market", "industry"],
            query_suffix: Some("market size revenue trends business impact"),
            analysis_prompt: Some(BUSINESS_ANALYSIS_PROMPT),
            source: Some("Business Analyst Agent"),
            kind: FindingKind::MarketAnalysis,
            url: "https://bloomberg.com",
            nothing_to_do: "No specific business questions found.",
            processed_prefix: "Business Insight generated: ",
            finished: "Business Analysis phase finished.",
        }
    }

    /// Search query for a question
    pub fn query_for(&self, question: &str) -> String {
        match self.query_suffix {
            Some(suffix) => format!("{} {}", question, suffix),
            None => question.to_string(),
        }
    }

    /// Findings list this profile writes to
    fn findings_mut<'a>(&self, state: &'a mut ResearchState) -> &'a mut Vec<Finding> {
        match self.kind {
            FindingKind::WebSearch => &mut state.web_findings,
            FindingKind::TechnicalDeepDive => &mut state.technical_findings,
            FindingKind::MarketAnalysis => &mut state.business_findings,
        }
    }
}

/// Search-and-analyze agent driven by a [`DomainProfile`]
pub struct DomainAgent {
    profile: DomainProfile,
    llm: Arc<dyn LLMClient>,
    search: Arc<dyn SearchProvider>,
    search_timeout: Duration,
    concurrency: usize,
}

impl DomainAgent {
    pub fn new(
        profile: DomainProfile,
        llm: Arc<dyn LLMClient>,
        search: Arc<dyn SearchProvider>,
        pipeline: &PipelineConfig,
    ) -> Self {
        Self {
            profile,
            llm,
            search,
            search_timeout: pipeline.search_timeout(),
            concurrency: pipeline.question_concurrency.max(1),
        }
    }

    pub fn web_researcher(
        llm: Arc<dyn LLMClient>,
        search: Arc<dyn SearchProvider>,
        pipeline: &PipelineConfig,
    ) -> Self {
        Self::new(DomainProfile::web_researcher(), llm, search, pipeline)
    }

    pub fn technical_analyst(
        llm: Arc<dyn LLMClient>,
        search: Arc<dyn SearchProvider>,
        pipeline: &PipelineConfig,
    ) -> Self {
        Self::new(DomainProfile::technical_analyst(), llm, search, pipeline)
    }

    pub fn business_analyst(
        llm: Arc<dyn LLMClient>,
        search: Arc<dyn SearchProvider>,
        pipeline: &PipelineConfig,
    ) -> Self {
        Self::new(DomainProfile::business_analyst(), llm, search, pipeline)
    }

    pub fn profile(&self) -> &DomainProfile {
        &self.profile
    }

    /// Search, and for analyst profiles analyze, a single question
    async fn process(&self, question: &ResearchQuestion) -> Result<Finding> {
        let query = self.profile.query_for(&question.question);
        debug!(agent = self.profile.stage_name, query = %query, "Searching");

        let raw_content = tokio::time::timeout(self.search_timeout, self.search.search(&query))
            .await
            .map_err(|_| {
                AppError::Timeout(format!(
                    "search did not finish within {}s",
                    self.search_timeout.as_secs_f32()
                ))
            })??;

        let content = match self.profile.analysis_prompt {
            Some(system) => {
                let prompt = format!(
                    "Research question: \"{}\"\n\nSearch results:\n{}",
                    question.question, raw_content
                );
                Some(self.llm.generate_with_system(system, &prompt).await?)
            }
            None => None,
        };

        let source = self
            .profile
            .source
            .map(str::to_string)
            .unwrap_or_else(|| self.search.name().to_string());

        Ok(Finding {
            question_id: question.id.clone(),
            question: question.question.clone(),
            raw_content,
            content,
            source,
            kind: self.profile.kind,
            url: Some(self.profile.url.to_string()),
        })
    }
}

#[async_trait]
impl Stage for DomainAgent {
    fn name(&self) -> &str {
        self.profile.stage_name
    }

    async fn run(&self, state: &mut ResearchState) -> Result<()> {
        let profile = &self.profile;

        let questions: Vec<ResearchQuestion> = match &state.research_plan {
            Some(plan) => plan
                .select(profile.role, profile.categories)
                .into_iter()
                .cloned()
                .collect(),
            None => {
                warn!(agent = profile.stage_name, "No research plan found, skipping");
                return Ok(());
            }
        };

        if questions.is_empty() {
            info!(agent = profile.stage_name, "No questions assigned");
            state.push_progress(profile.nothing_to_do);
            return Ok(());
        }

        info!(
            agent = profile.stage_name,
            questions = questions.len(),
            concurrency = self.concurrency,
            "Researching questions"
        );
        state.push_progress(format!(
            "{}: identified {} questions to research.",
            profile.stage_name,
            questions.len()
        ));

        // `buffered` yields in input order regardless of completion order
        let results: Vec<Result<Finding>> = stream::iter(questions.iter().cloned())
            .map(|question| async move { self.process(&question).await })
            .buffered(self.concurrency)
            .collect()
            .await;

        for (question, result) in questions.iter().zip(results) {
            match result {
                Ok(finding) => {
                    state.push_progress(format!("{}{}", profile.processed_prefix, question.question));
                    profile.findings_mut(state).push(finding);
                }
                Err(e) => {
                    error!(
                        agent = profile.stage_name,
                        question = %question.question,
                        "Question failed: {}", e
                    );
                    state.push_error(format!(
                        "{} Error ({}): {}",
                        profile.error_label, question.question, e
                    ));
                }
            }
        }

        state.push_progress(profile.finished);
        Ok(())
    }
}
