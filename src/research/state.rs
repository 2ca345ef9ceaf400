//! Shared research state
//!
//! One [`ResearchState`] exists per research run. It is created by the request
//! boundary, threaded through every pipeline stage by mutable reference and
//! published to the run store after each stage.
//!
//! The topic is fixed at construction and the `errors` / `progress_updates`
//! sequences are append-only: the only way to touch them is
//! [`ResearchState::push_error`] and [`ResearchState::push_progress`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;
use uuid::Uuid;

use super::plan::ResearchPlan;

/// First progress entry of every run
pub const RESEARCH_STARTED: &str = "Research started";

/// Lifecycle status of a research run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResearchStatus {
    /// Run accepted; pipeline running and no stage has failed so far
    Started,
    /// At least one stage failed; the pipeline still ran to the end
    Failed,
    /// The background task running the pipeline crashed
    Error,
    /// Every stage ran without an uncaught failure
    Completed,
}

impl ResearchStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ResearchStatus::Started)
    }
}

/// Presentation and scope hints supplied with the topic.
///
/// Known keys are typed; anything else is kept verbatim in `extra` and passed
/// through to the prompts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Customization {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub focus_areas: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Customization {
    pub fn depth_or_default(&self) -> &str {
        self.depth.as_deref().unwrap_or("standard")
    }

    pub fn audience_or_default(&self) -> &str {
        self.target_audience.as_deref().unwrap_or("general")
    }

    pub fn tone_or_default(&self) -> &str {
        self.tone.as_deref().unwrap_or("professional")
    }

    /// Render the hints as prompt lines
    pub fn describe(&self) -> String {
        let focus = if self.focus_areas.is_empty() {
            "none specified".to_string()
        } else {
            self.focus_areas.join(", ")
        };

        let mut lines = vec![
            format!("- Depth: {}", self.depth_or_default()),
            format!("- Focus Areas: {}", focus),
            format!("- Target Audience: {}", self.audience_or_default()),
            format!("- Tone: {}", self.tone_or_default()),
        ];
        for (key, value) in &self.extra {
            let value = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            lines.push(format!("- {}: {}", key, value));
        }
        lines.join("\n")
    }
}

/// Kind of a finding, serialized as its `type` tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    WebSearch,
    TechnicalDeepDive,
    MarketAnalysis,
}

impl FindingKind {
    /// Domain label used when findings are aggregated for synthesis
    pub fn label(&self) -> &'static str {
        match self {
            FindingKind::WebSearch => "Web",
            FindingKind::TechnicalDeepDive => "Technical",
            FindingKind::MarketAnalysis => "Business",
        }
    }
}

/// A question-answer record produced by a domain-filtering agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub question_id: String,
    pub question: String,
    pub raw_content: String,
    /// Analyzed text, present for analyst findings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub source: String,
    #[serde(rename = "type")]
    pub kind: FindingKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Finding {
    /// Analyzed content when present and non-empty, raw content otherwise
    pub fn best_content(&self) -> &str {
        match self.content.as_deref() {
            Some(content) if !content.trim().is_empty() => content,
            _ => &self.raw_content,
        }
    }
}

/// Result of one supervised stage invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "error", rename_all = "lowercase")]
pub enum StageOutcome {
    Completed,
    Failed(String),
}

impl StageOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, StageOutcome::Failed(_))
    }
}

/// Execution record appended by the pipeline executor after every stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageRecord {
    pub stage: String,
    pub outcome: StageOutcome,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
}

/// Per-run bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub research_id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub stages: Vec<StageRecord>,
}

/// Mutable record threaded through every pipeline stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchState {
    topic: String,
    pub customization: Customization,
    pub research_plan: Option<ResearchPlan>,
    pub web_findings: Vec<Finding>,
    pub technical_findings: Vec<Finding>,
    pub business_findings: Vec<Finding>,
    pub synthesized_content: Option<String>,
    pub quality_report: Option<String>,
    pub html_output: Option<String>,
    pub status: ResearchStatus,
    progress_updates: Vec<String>,
    errors: Vec<String>,
    pub metadata: RunMetadata,
}

impl ResearchState {
    /// Allocate the state for a new run
    pub fn new(research_id: Uuid, topic: impl Into<String>, customization: Customization) -> Self {
        Self {
            topic: topic.into(),
            customization,
            research_plan: None,
            web_findings: Vec::new(),
            technical_findings: Vec::new(),
            business_findings: Vec::new(),
            synthesized_content: None,
            quality_report: None,
            html_output: None,
            status: ResearchStatus::Started,
            progress_updates: vec![RESEARCH_STARTED.to_string()],
            errors: Vec::new(),
            metadata: RunMetadata {
                research_id,
                created_at: Utc::now(),
                completed_at: None,
                stages: Vec::new(),
            },
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn research_id(&self) -> Uuid {
        self.metadata.research_id
    }

    pub fn progress_updates(&self) -> &[String] {
        &self.progress_updates
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn push_progress(&mut self, message: impl Into<String>) {
        self.progress_updates.push(message.into());
    }

    pub fn push_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Total number of findings across the three domains
    pub fn finding_count(&self) -> usize {
        self.web_findings.len() + self.technical_findings.len() + self.business_findings.len()
    }

    /// All findings in synthesis order: web, technical, business
    pub fn all_findings(&self) -> impl Iterator<Item = &Finding> {
        self.web_findings
            .iter()
            .chain(self.technical_findings.iter())
            .chain(self.business_findings.iter())
    }

    /// Mark the run as failed. A failed run never goes back to `Started`.
    pub fn mark_failed(&mut self) {
        if self.status != ResearchStatus::Error {
            self.status = ResearchStatus::Failed;
        }
    }

    /// Stamp the terminal status once the pipeline has finished
    pub fn finish(&mut self) {
        if self.status == ResearchStatus::Started {
            self.status = ResearchStatus::Completed;
        }
        self.metadata.completed_at = Some(Utc::now());
    }

    /// Record that the task running the pipeline ended abnormally
    pub fn mark_crashed(&mut self, message: impl Into<String>) {
        self.push_error(message);
        self.status = ResearchStatus::Error;
        self.metadata.completed_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn state() -> ResearchState {
        ResearchState::new(Uuid::new_v4(), "Quantum Computing", Customization::default())
    }

    #[test]
    fn test_new_state_defaults() {
        let state = state();
        assert_eq!(state.topic(), "Quantum Computing");
        assert_eq!(state.status, ResearchStatus::Started);
        assert_eq!(state.progress_updates(), &[RESEARCH_STARTED.to_string()]);
        assert!(state.errors().is_empty());
        assert!(state.research_plan.is_none());
        assert_eq!(state.finding_count(), 0);
        assert!(state.metadata.completed_at.is_none());
    }

    #[test]
    fn test_finish_sets_completed_only_from_started() {
        let mut ok = state();
        ok.finish();
        assert_eq!(ok.status, ResearchStatus::Completed);
        assert!(ok.metadata.completed_at.is_some());

        let mut failed = state();
        failed.mark_failed();
        failed.finish();
        assert_eq!(failed.status, ResearchStatus::Failed);
    }

    #[test]
    fn test_crash_overrides_failed_and_is_not_reset() {
        let mut state = state();
        state.mark_failed();
        state.mark_crashed("worker died");
        assert_eq!(state.status, ResearchStatus::Error);
        assert_eq!(state.errors(), &["worker died".to_string()]);

        state.mark_failed();
        state.finish();
        assert_eq!(state.status, ResearchStatus::Error);
    }

    #[test]
    fn test_customization_keeps_unknown_keys() {
        let customization: Customization = serde_json::from_value(json!({
            "tone": "academic",
            "focus_areas": ["hardware", "startups"],
            "region": "EU"
        }))
        .unwrap();

        assert_eq!(customization.tone.as_deref(), Some("academic"));
        assert_eq!(customization.extra.get("region"), Some(&json!("EU")));

        let described = customization.describe();
        assert!(described.contains("Focus Areas: hardware, startups"));
        assert!(described.contains("- region: EU"));
        assert!(described.contains("Depth: standard"));
    }

    #[test]
    fn test_finding_serializes_kind_as_type() {
        let finding = Finding {
            question_id: "q1".to_string(),
            question: "What is it?".to_string(),
            raw_content: "raw".to_string(),
            content: None,
            source: "DuckDuckGo".to_string(),
            kind: FindingKind::WebSearch,
            url: Some("https://duckduckgo.com".to_string()),
        };

        let value = serde_json::to_value(&finding).unwrap();
        assert_eq!(value["type"], "web_search");
        assert!(value.get("content").is_none());
    }

    #[test]
    fn test_best_content_prefers_analysis() {
        let mut finding = Finding {
            question_id: "q1".to_string(),
            question: "q".to_string(),
            raw_content: "raw".to_string(),
            content: Some("analyzed".to_string()),
            source: "s".to_string(),
            kind: FindingKind::TechnicalDeepDive,
            url: None,
        };
        assert_eq!(finding.best_content(), "analyzed");

        finding.content = Some("  ".to_string());
        assert_eq!(finding.best_content(), "raw");
    }

    #[test]
    fn test_stage_record_shape() {
        let record = StageRecord {
            stage: "ResearchPlanner".to_string(),
            outcome: StageOutcome::Failed("boom".to_string()),
            started_at: Utc::now(),
            duration_ms: 12,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["outcome"]["status"], "failed");
        assert_eq!(value["outcome"]["error"], "boom");
    }
}
