/// Text cleanup helpers for raw LLM output.
pub mod text;
/// TOML configuration with hot-reload support.
pub mod toml_config;
