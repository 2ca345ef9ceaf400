//! Research plan model
//!
//! The plan is produced once by the planner stage and read by the three
//! domain-filtering agents. Each agent selects its share of the questions with
//! [`ResearchPlan::select`], which also collapses duplicate question ids.

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Lowest accepted question priority
pub const MIN_PRIORITY: i64 = 1;
/// Highest accepted question priority
pub const MAX_PRIORITY: i64 = 5;

/// Agent that owns a research question.
///
/// Labels are matched case-insensitively. A label naming no known agent
/// becomes [`AgentRole::Unassigned`], so the question is routed by its
/// category alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    /// General news, recent events and broad overviews
    WebResearcher,
    /// Implementation details, architecture, specifications
    TechnicalAnalyst,
    /// Market trends, companies, financials, impact
    BusinessAnalyst,
    #[schemars(skip)]
    Unassigned,
}

impl AgentRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentRole::WebResearcher => "web_researcher",
            AgentRole::TechnicalAnalyst => "technical_analyst",
            AgentRole::BusinessAnalyst => "business_analyst",
            AgentRole::Unassigned => "unassigned",
        }
    }

    /// Parse a generated agent label; `market_analyst` is the web researcher
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "web_researcher" | "market_analyst" => AgentRole::WebResearcher,
            "technical_analyst" => AgentRole::TechnicalAnalyst,
            "business_analyst" => AgentRole::BusinessAnalyst,
            _ => AgentRole::Unassigned,
        }
    }
}

impl<'de> Deserialize<'de> for AgentRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let label = String::deserialize(deserializer)?;
        Ok(AgentRole::from_label(&label))
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single question in the research plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ResearchQuestion {
    /// Unique identifier for the question (e.g. "q1")
    pub id: String,
    /// The specific research question
    pub question: String,
    /// Category: technical, business, market, news, industry, general
    pub category: String,
    /// Priority score 1-5 (5 is highest)
    pub priority: i64,
    /// Expected depth: overview, deep-dive, fast-check
    #[serde(default)]
    pub depth: String,
    /// Agent responsible for answering the question
    pub assigned_agent: AgentRole,
}

impl ResearchQuestion {
    /// Whether the question's category is in `categories` (case-insensitive)
    pub fn in_category(&self, categories: &[&str]) -> bool {
        let category = self.category.trim();
        categories.iter().any(|c| c.eq_ignore_ascii_case(category))
    }
}

/// Structured research plan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ResearchPlan {
    /// Ordered list of research questions
    pub questions: Vec<ResearchQuestion>,
    /// Estimated time to complete the research
    #[serde(default)]
    pub estimated_time: Option<String>,
}

impl ResearchPlan {
    /// Normalize a freshly generated plan.
    ///
    /// Question text and ids are trimmed, questions without text are dropped and
    /// priorities are clamped into `MIN_PRIORITY..=MAX_PRIORITY`.
    pub fn normalized(mut self) -> Self {
        self.questions.retain_mut(|q| {
            q.id = q.id.trim().to_string();
            q.question = q.question.trim().to_string();
            q.priority = q.priority.clamp(MIN_PRIORITY, MAX_PRIORITY);
            !q.question.is_empty()
        });
        self
    }

    /// Select the questions an agent is responsible for.
    ///
    /// A question matches when it is assigned to `role` or when its category is in
    /// `categories`. Duplicate ids are collapsed to their first occurrence and plan
    /// order is preserved.
    pub fn select(&self, role: AgentRole, categories: &[&str]) -> Vec<&ResearchQuestion> {
        let mut seen = HashSet::new();
        self.questions
            .iter()
            .filter(|q| q.assigned_agent == role || q.in_category(categories))
            .filter(|q| seen.insert(q.id.as_str()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
