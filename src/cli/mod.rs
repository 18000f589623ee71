use clap::{Parser, Subcommand};

pub mod error;
pub mod handler;
pub mod output;

/// dlm-live - live progress view for a download manager
#[derive(Parser, Debug)]
#[command(name = "dlm-live")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Override config directory path
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<std::path::PathBuf>,

    /// Enable verbose logging (TRACE level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute (defaults to `watch`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Follow download progress until Ctrl+C
    Watch {
        /// Progress endpoint URL (overrides poll.endpoint)
        #[arg(long)]
        endpoint: Option<String>,

        /// Poll interval in milliseconds (overrides poll.interval_ms)
        #[arg(long)]
        interval_ms: Option<u64>,
    },

    /// Fetch one progress batch and print it
    Once {
        /// Progress endpoint URL (overrides poll.endpoint)
        #[arg(long)]
        endpoint: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    Config {
        /// Configuration action
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show or change the saved theme (light, dark, toggle)
    Theme {
        /// New theme; omit to print the current one
        #[arg(value_parser = ["light", "dark", "toggle"])]
        mode: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Get configuration value
    Get {
        /// Configuration key (e.g., poll.interval_ms)
        key: String,
    },

    /// Set configuration value
    Set {
        /// Configuration key (e.g., poll.endpoint)
        key: String,

        /// Value to set
        value: String,
    },

    /// Show all configuration
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the settings file location
    Path,
}
