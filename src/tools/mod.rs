//! Tools available to the research agents
//!
//! # Web Search
//! Searches the web and returns the results as text:
//! ```ignore
//! let search = WebSearch::new(10);
//! let text = search.search("quantum error correction").await?;
//! ```

/// Web search capability using DuckDuckGo.
pub mod search;

pub use search::{SearchProvider, WebSearch};
