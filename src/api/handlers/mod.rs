//! API request handlers.

/// Health check handler.
pub mod health;
/// Research run creation and polling handlers.
pub mod research;
