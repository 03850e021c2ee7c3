use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;

#[derive(Debug, Parser)]
#[command(name = "follower-tracker")]
#[command(about = "Tracks daily follower counts of public profiles")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// JSON configuration file; builtin defaults are used when omitted
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the history file location
    #[arg(long, global = true)]
    pub history_file: Option<PathBuf>,

    /// Override the saved browser session used for exact fetches
    #[arg(long, global = true)]
    pub session_file: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fetch and record today's follower count
    Fetch {
        /// Profile URL or username (defaults to the first configured profile)
        profile: Option<String>,
    },

    /// Print the recorded history as JSON
    History {
        #[arg(short, long)]
        profile: Option<String>,
    },

    /// Keep fetching every configured profile on an interval until Ctrl-C
    Watch {
        /// Minutes between rounds
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// Write the history to a CSV file
    Export {
        #[arg(short, long, default_value = "followers_history.csv")]
        output: PathBuf,
    },

    /// Show follower change over the last few days
    Growth {
        profile: String,

        #[arg(short, long, default_value_t = 7)]
        days: u32,
    },

    /// Open a terminal chart of a profile's history
    Chart { profile: String },
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(path) = &self.history_file {
            config.history_file = path.clone();
        }
        if let Some(path) = &self.session_file {
            config.session_file = path.clone();
        }
        if let Commands::Watch {
            interval: Some(minutes),
        } = &self.command
        {
            config.watch_interval_minutes = *minutes;
        }
    }
}
