//! Mock implementations for testing.
//!
//! This module provides a scripted LLM client and a search provider that can
//! be shared across integration test files without duplication.

use async_trait::async_trait;
use parking_lot::Mutex;
use research_studio::llm::LLMClient;
use research_studio::tools::SearchProvider;
use research_studio::types::{AppError, Result};
use std::time::Duration;

/// Reply chosen by a [`ScriptedLLMClient`] rule
#[derive(Clone)]
enum Reply {
    Text(String),
    Fail(String),
}

/// Mock LLM client that answers by matching the system prompt.
///
/// Rules are checked in insertion order; the first rule whose needle appears
/// in the system prompt wins. Every call is recorded.
///
/// ```ignore
/// let llm = ScriptedLLMClient::new()
///     .reply("Research Director", PLAN_JSON)
///     .fail("Fact Checker", "quota exceeded");
/// ```
#[derive(Default)]
pub struct ScriptedLLMClient {
    rules: Vec<(String, Reply)>,
    fallback: Option<String>,
    calls: Mutex<Vec<(String, String)>>,
}

#[allow(dead_code)]
impl ScriptedLLMClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer with `response` when the system prompt contains `needle`
    pub fn reply(mut self, needle: &str, response: &str) -> Self {
        self.rules
            .push((needle.to_string(), Reply::Text(response.to_string())));
        self
    }

    /// Fail when the system prompt contains `needle`
    pub fn fail(mut self, needle: &str, message: &str) -> Self {
        self.rules
            .push((needle.to_string(), Reply::Fail(message.to_string())));
        self
    }

    /// Answer every unmatched call with `response`
    pub fn otherwise(mut self, response: &str) -> Self {
        self.fallback = Some(response.to_string());
        self
    }

    /// Recorded `(system, prompt)` pairs
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().clone()
    }

    /// Number of calls whose system prompt contains `needle`
    pub fn calls_matching(&self, needle: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|(system, _)| system.contains(needle))
            .count()
    }

    fn answer(&self, system: &str, prompt: &str) -> Result<String> {
        self.calls
            .lock()
            .push((system.to_string(), prompt.to_string()));

        let rule = self
            .rules
            .iter()
            .find(|(needle, _)| system.contains(needle.as_str()))
            .map(|(_, reply)| reply.clone());

        match rule {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Fail(message)) => Err(AppError::LLM(message)),
            None => self
                .fallback
                .clone()
                .ok_or_else(|| AppError::LLM(format!("no scripted reply for: {}", system))),
        }
    }
}

#[async_trait]
impl LLMClient for ScriptedLLMClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.answer("", prompt)
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.answer(system, prompt)
    }

    async fn generate_with_history(&self, messages: &[(String, String)]) -> Result<String> {
        let system = messages
            .iter()
            .find(|(role, _)| role == "system")
            .map(|(_, content)| content.as_str())
            .unwrap_or("");
        let prompt = messages
            .last()
            .map(|(_, content)| content.as_str())
            .unwrap_or("");
        self.answer(system, prompt)
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Mock search provider that echoes the query and records it
#[derive(Default)]
pub struct MockSearch {
    failing: Vec<String>,
    delay: Option<Duration>,
    queries: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl MockSearch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every query that contains `needle`
    pub fn failing_on(mut self, needle: &str) -> Self {
        self.failing.push(needle.to_string());
        self
    }

    /// Sleep before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().clone()
    }
}

#[async_trait]
impl SearchProvider for MockSearch {
    async fn search(&self, query: &str) -> Result<String> {
        self.queries.lock().push(query.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.iter().any(|needle| query.contains(needle.as_str())) {
            return Err(AppError::Search(format!("Mock search failure for '{}'", query)));
        }
        Ok(format!("Search results for: {}", query))
    }

    fn name(&self) -> &str {
        "DuckDuckGo"
    }
}
