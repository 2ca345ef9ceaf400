//! CLI module for the research studio
//!
//! Provides command-line interface parsing for the research-studio binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod output;

use crate::research::state::ResearchState;
use crate::workflows::PipelineObserver;
use clap::{Parser, Subcommand};
use output::Output;
use parking_lot::Mutex;
use std::path::PathBuf;

/// Agentic Research Studio
///
/// Turns a research topic into a synthesized report and an HTML dashboard
/// using a pipeline of LLM-backed agents.
#[derive(Parser, Debug)]
#[command(
    name = "research-studio",
    version,
    about = "Agentic Research Studio - multi-agent research reports",
    long_about = "Runs a fixed pipeline of research agents (planner, web researcher,\n\
                  technical analyst, business analyst, synthesizer, reviewer, designer)\n\
                  over a topic. Serve the HTTP API or run a single job in the terminal.",
    after_help = "EXAMPLES:\n    \
                  research-studio                                # Start the server (requires studio.toml)\n    \
                  research-studio serve --watch-config           # Serve and hot-reload studio.toml\n    \
                  research-studio run \"Quantum Computing\"        # Run one job and write report.html\n    \
                  research-studio config --validate              # Check the configuration file"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "studio.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve {
        /// Reload studio.toml when it changes on disk
        #[arg(long)]
        watch_config: bool,
    },

    /// Run a single research job in the terminal
    Run {
        /// Research topic
        topic: String,

        /// Where to write the HTML dashboard
        #[arg(short, long, default_value = "report.html")]
        output: PathBuf,

        /// Customization as a JSON object, e.g. '{"tone": "academic"}'
        #[arg(long)]
        customization: Option<String>,
    },

    /// Show configuration information
    Config {
        /// Validate the configuration file
        #[arg(long)]
        validate: bool,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn output(&self) -> Output {
        if self.no_color {
            Output::no_color()
        } else {
            Output::new()
        }
    }
}

/// Prints stage results, progress and errors as a run advances
pub struct ProgressPrinter {
    output: Output,
    seen: Mutex<Seen>,
}

#[derive(Default)]
struct Seen {
    stages: usize,
    progress: usize,
    errors: usize,
}

impl ProgressPrinter {
    pub fn new(output: Output) -> Self {
        Self {
            output,
            seen: Mutex::new(Seen::default()),
        }
    }
}

impl PipelineObserver for ProgressPrinter {
    fn on_update(&self, state: &ResearchState) {
        let mut seen = self.seen.lock();

        for message in &state.progress_updates()[seen.progress..] {
            self.output.info(message);
        }
        for message in &state.errors()[seen.errors..] {
            self.output.error(message);
        }
        for (offset, record) in state.metadata.stages[seen.stages..].iter().enumerate() {
            self.output.stage(seen.stages + offset + 1, record);
        }

        seen.progress = state.progress_updates().len();
        seen.errors = state.errors().len();
        seen.stages = state.metadata.stages.len();
    }
}
