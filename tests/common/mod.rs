//! Shared fixtures for integration tests.

#![allow(dead_code)]

pub mod mocks;

use mocks::{MockSearch, ScriptedLLMClient};
use research_studio::utils::toml_config::{ConfigManager, PipelineConfig, StudioConfig};
use research_studio::{InMemoryResearchStore, ResearchService, ResearchStore};
use std::sync::Arc;

/// Needles matching the system prompt of each LLM-backed stage
pub const PLANNER: &str = "Research Director";
pub const TECHNICAL: &str = "Software Architect";
pub const BUSINESS: &str = "Strategic Business Analyst";
pub const SYNTHESIZER: &str = "Lead Editor";
pub const REVIEWER: &str = "Fact Checker";
pub const DESIGNER: &str = "Business Intelligence designer";

/// Plan with one technical and one business question
pub const QUANTUM_PLAN: &str = r#"```json
{
  "questions": [
    {"id": "q1", "question": "How do superconducting qubits work?", "category": "technical",
     "priority": 5, "depth": "deep-dive", "assigned_agent": "technical_analyst"},
    {"id": "q2", "question": "How large is the quantum computing market?", "category": "business",
     "priority": 4, "depth": "overview", "assigned_agent": "business_analyst"}
  ],
  "estimated_time": "30 minutes"
}
```"#;

pub const DASHBOARD: &str =
    "```html\n<!DOCTYPE html>\n<html><head><title>Quantum</title></head><body>Dashboard</body></html>\n```";

/// LLM scripted for a complete, successful run
pub fn quantum_llm() -> ScriptedLLMClient {
    ScriptedLLMClient::new()
        .reply(PLANNER, QUANTUM_PLAN)
        .reply(TECHNICAL, "Qubits are built from Josephson junctions.")
        .reply(BUSINESS, "The market is projected to grow quickly.")
        .reply(SYNTHESIZER, "# Quantum Computing\n\n## Executive Summary\n...")
        .reply(REVIEWER, "Score: 8\nCritique: solid.\nStatus: PASS")
        .reply(DESIGNER, DASHBOARD)
}

pub fn config_manager(pipeline: PipelineConfig) -> Arc<ConfigManager> {
    let config = StudioConfig {
        pipeline,
        ..StudioConfig::default()
    };
    Arc::new(ConfigManager::from_config(config))
}

pub fn service_with(
    llm: Arc<ScriptedLLMClient>,
    search: Arc<MockSearch>,
    store: Arc<dyn ResearchStore>,
) -> ResearchService {
    ResearchService::new(store, llm, search, config_manager(PipelineConfig::default()))
}

pub fn service(llm: Arc<ScriptedLLMClient>, search: Arc<MockSearch>) -> ResearchService {
    service_with(llm, search, Arc::new(InMemoryResearchStore::new()))
}
