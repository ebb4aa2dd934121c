//! Haptic output for the alarm

use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};
use tokio::{process::Command, runtime::Handle};
use tracing::{debug, info, warn};

/// Produces one haptic pulse. Assumed to always succeed from the caller's view.
pub trait Haptics: Send {
    fn pulse(&mut self);
}

/// Logs each pulse; the default when no vibration command is configured
#[derive(Debug, Default)]
pub struct LogHaptics;

impl Haptics for LogHaptics {
    fn pulse(&mut self) {
        info!("bzzt");
    }
}

/// Runs a shell command per pulse, e.g. a vibration motor helper
#[derive(Debug, Clone)]
pub struct CommandHaptics {
    command: String,
}

impl CommandHaptics {
    pub fn new(command: impl Into<String>) -> Self {
        Self { command: command.into() }
    }
}

impl Haptics for CommandHaptics {
    fn pulse(&mut self) {
        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!("No runtime available, skipping pulse command");
                return;
            }
        };

        let command = self.command.clone();
        handle.spawn(async move {
            debug!("Running pulse command: {}", command);
            match Command::new("sh").args(["-c", &command]).output().await {
                Ok(output) if output.status.success() => {}
                Ok(output) => {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    warn!("Pulse command failed: {}", stderr.trim());
                }
                Err(e) => warn!("Failed to execute pulse command: {}", e),
            }
        });
    }
}

/// Counts pulses; clones share the counter
#[derive(Debug, Default, Clone)]
pub struct CountingHaptics {
    pulses: Arc<AtomicU32>,
}

impl CountingHaptics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> u32 {
        self.pulses.load(Ordering::SeqCst)
    }
}

impl Haptics for CountingHaptics {
    fn pulse(&mut self) {
        self.pulses.fetch_add(1, Ordering::SeqCst);
    }
}
