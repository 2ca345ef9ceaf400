//! Web search capability
//!
//! [`SearchProvider`] is the seam the domain agents search through. The default
//! implementation, [`WebSearch`], uses the daedra crate with DuckDuckGo as the
//! backend and renders results as plain text blocks for the prompts.

use crate::types::{AppError, Result};
use async_trait::async_trait;
use tracing::debug;

/// Free-text search capability
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run a query and return the results as text
    async fn search(&self, query: &str) -> Result<String>;

    /// Source label recorded on findings produced from this provider
    fn name(&self) -> &str;
}

/// Web search powered by daedra
pub struct WebSearch {
    num_results: usize,
}

impl WebSearch {
    pub fn new(num_results: usize) -> Self {
        Self { num_results }
    }
}

impl Default for WebSearch {
    fn default() -> Self {
        Self::new(10)
    }
}

#[async_trait]
impl SearchProvider for WebSearch {
    async fn search(&self, query: &str) -> Result<String> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::InvalidInput("Empty search query".to_string()));
        }

        debug!(query, num_results = self.num_results, "Running web search");

        let search_args = daedra::SearchArgs {
            query: query.to_string(),
            options: Some(daedra::SearchOptions {
                num_results: self.num_results,
                ..Default::default()
            }),
        };

        let response = daedra::tools::search::perform_search(&search_args)
            .await
            .map_err(|e| AppError::Search(format!("Search failed: {}", e)))?;

        let rendered = render_results(
            response
                .data
                .iter()
                .map(|r| (r.title.as_str(), r.url.as_str(), r.description.as_str())),
        );

        if rendered.is_empty() {
            Ok(format!("No results found for '{}'", query))
        } else {
            Ok(rendered)
        }
    }

    fn name(&self) -> &str {
        "DuckDuckGo"
    }
}

/// Render `(title, url, description)` triples as blank-line separated blocks
pub fn render_results<'a>(results: impl Iterator<Item = (&'a str, &'a str, &'a str)>) -> String {
    results
        .map(|(title, url, description)| format!("{}\n{}\n{}", title, url, description))
        .collect::<Vec<_>>()
        .join("\n\n")
}
