//! LLM Provider Clients and Abstractions
//!
//! Every pipeline stage talks to a model through the [`LLMClient`] trait. The
//! concrete clients speak plain HTTP with `reqwest`:
//! - `openai` - OpenAI-compatible `/chat/completions` (OpenAI, Azure, OpenRouter, vLLM)
//! - `ollama` - Local Ollama server via `/api/chat`
//!
//! # Example
//!
//! ```ignore
//! use research_studio::llm::{LLMClientFactory, Provider};
//!
//! let factory = LLMClientFactory::new(config.provider()?);
//! let client = factory.create_default()?;
//! let answer = client.generate("What is a qubit?").await?;
//! ```

/// Core LLM client trait, structured output and provider selection.
pub mod client;

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(feature = "openai")]
pub mod openai;

pub use client::{generate_structured, LLMClient, LLMClientFactory, Provider};
