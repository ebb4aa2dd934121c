//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};
use clap::Parser;

use crate::state::LaunchReason;

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "power-nap")]
#[command(about = "Nap countdown and wake alarm controller")]
#[command(version)]
pub struct Config {
    /// Port the presentation layer connects to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Directory holding the persisted duration and wake request
    #[arg(short, long, default_value = ".power-nap")]
    pub data_dir: PathBuf,

    /// Set by the wake service when it launches the process for a due request
    #[arg(long)]
    pub launched_by_wake: bool,

    /// Shell command run for every alarm pulse (logs the pulse when unset)
    #[arg(long)]
    pub pulse_command: Option<String>,

    /// How often due wake requests are checked while resident, in milliseconds
    #[arg(long, default_value = "1000")]
    pub wake_poll_ms: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn launch_reason(&self) -> LaunchReason {
        if self.launched_by_wake {
            LaunchReason::WakeFired
        } else {
            LaunchReason::User
        }
    }

    pub fn wake_poll_interval(&self) -> Duration {
        Duration::from_millis(self.wake_poll_ms.max(10))
    }
}
