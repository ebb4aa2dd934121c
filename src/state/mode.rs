//! Modes, user intents and the inbound event set

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::scheduler::WakeId;

/// Controller mode. The device starts in `Wake`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Idle, the configured nap length can be adjusted
    #[default]
    Wake,
    /// Counting down towards a scheduled wake request
    Sleep,
    /// Deadline reached, the pulse sequence is running
    Alarm,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Wake => "wake",
            Mode::Sleep => "sleep",
            Mode::Alarm => "alarm",
        };
        f.write_str(name)
    }
}

/// The three physical buttons on the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Button {
    Up,
    Down,
    Select,
}

impl Button {
    /// Parse a button name as used in the HTTP routes
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "up" => Some(Button::Up),
            "down" => Some(Button::Down),
            "select" => Some(Button::Select),
            _ => None,
        }
    }

    /// Map a button press to an intent for the given mode.
    ///
    /// While the alarm is running every button dismisses it, so Up and Down
    /// stop meaning increment/decrement in `Alarm`.
    pub fn intent(self, mode: Mode) -> Intent {
        match (mode, self) {
            (Mode::Alarm, _) => Intent::Dismiss,
            (_, Button::Up) => Intent::Increment,
            (_, Button::Down) => Intent::Decrement,
            (_, Button::Select) => Intent::Toggle,
        }
    }
}

/// Discrete user intents accepted by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    /// Lengthen the configured nap by one minute (Wake only)
    Increment,
    /// Shorten the configured nap by one minute (Wake only)
    Decrement,
    /// Start a nap from Wake, cancel it from Sleep
    Toggle,
    /// Stop the alarm. Increment, Decrement and Toggle also dismiss in Alarm.
    Dismiss,
}

/// Inbound stimuli, all dispatched through `NapController::handle`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Intent(Intent),
    /// Countdown tick produced by the timer armed with `generation`
    Tick { generation: u64 },
    /// The external scheduler delivered the wake request `id`
    WakeFired { id: WakeId },
    /// Alarm pulse tick produced by the timer armed with `generation`
    VibrateTick { generation: u64 },
}

impl From<Intent> for Event {
    fn from(intent: Intent) -> Self {
        Event::Intent(intent)
    }
}

/// Why the process was started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchReason {
    /// Normal start by the user
    User,
    /// Started by the wake service because the pending request fired
    WakeFired,
}
