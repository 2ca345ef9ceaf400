//! Colored output helpers for CLI
//!
//! Provides consistent, colored terminal output for the research-studio CLI.

use crate::research::state::{ResearchState, ResearchStatus, StageRecord};
use owo_colors::OwoColorize;

/// Output style configuration
pub struct Output {
    /// Whether to use colored output
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Create a new output helper with colors enabled
    pub fn new() -> Self {
        Self { colored: true }
    }

    /// Create a new output helper with colors disabled
    pub fn no_color() -> Self {
        Self { colored: false }
    }

    /// Print the studio banner
    pub fn banner(&self) {
        if self.colored {
            println!(
                "\n   {} {}\n",
                "Agentic Research Studio".bright_cyan().bold(),
                format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
            );
        } else {
            println!(
                "\n   Agentic Research Studio v{}\n",
                env!("CARGO_PKG_VERSION")
            );
        }
    }

    /// Print a success message with a checkmark
    pub fn success(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "✓".green().bold(), message.green());
        } else {
            println!("  [OK] {}", message);
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "•".blue(), message);
        } else {
            println!("  [INFO] {}", message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "⚠".yellow().bold(), message.yellow());
        } else {
            println!("  [WARN] {}", message);
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {}", message);
        }
    }

    /// Print a finished pipeline stage
    pub fn stage(&self, index: usize, record: &StageRecord) {
        let label = format!("[{}] {}", index, record.stage);
        let timing = format!("{} ms", record.duration_ms);
        let failed = record.outcome.is_failed();

        if self.colored {
            let mark = if failed {
                "✗".red().bold().to_string()
            } else {
                "✓".green().bold().to_string()
            };
            println!("  {} {} {}", mark, label.bright_white(), timing.dimmed());
        } else {
            let mark = if failed { "FAILED" } else { "OK" };
            println!("  [{}] {} ({})", mark, label, timing);
        }
    }

    /// Print a header for a section
    pub fn header(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bright_white().bold().underline());
        } else {
            println!("\n  === {} ===", title);
        }
    }

    /// Print a key-value pair
    pub fn kv(&self, key: &str, value: &str) {
        if self.colored {
            println!("    {}: {}", key.dimmed(), value.bright_white());
        } else {
            println!("    {}: {}", key, value);
        }
    }

    /// Print a hint/tip message
    pub fn hint(&self, message: &str) {
        if self.colored {
            println!("\n  {}", message.dimmed().italic());
        } else {
            println!("\n  [TIP] {}", message);
        }
    }

    /// Print the closing summary of a run
    pub fn summary(&self, state: &ResearchState) {
        self.header("Summary");
        self.kv("Research ID", &state.research_id().to_string());
        self.kv("Status", &format!("{:?}", state.status).to_lowercase());
        self.kv("Findings", &state.finding_count().to_string());
        self.kv("Errors", &state.errors().len().to_string());

        match state.status {
            ResearchStatus::Completed => self.success("Research completed"),
            ResearchStatus::Failed => self.warning("Research finished with failed stages"),
            ResearchStatus::Error => self.error("Research task crashed"),
            ResearchStatus::Started => self.info("Research still running"),
        }
    }
}
