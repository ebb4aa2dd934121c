//! Observable controller state for the presentation layer

use serde::{Deserialize, Serialize};

use super::Mode;

/// Snapshot of everything the presentation layer needs to render
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NapStatus {
    pub mode: Mode,
    /// Configured minutes in Wake, remaining minutes in Sleep, unused in Alarm
    pub displayed_minutes: Option<u32>,
    pub configured_minutes: u32,
    /// Pulses emitted so far (Alarm only)
    pub vibrate_count: u32,
    /// User-visible failure indications
    pub errors: Vec<String>,
}

impl NapStatus {
    /// Status of a freshly started device with the given configuration
    pub fn new(configured_minutes: u32) -> Self {
        Self {
            mode: Mode::Wake,
            displayed_minutes: Some(configured_minutes),
            configured_minutes,
            vibrate_count: 0,
            errors: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn is_napping(&self) -> bool {
        self.mode == Mode::Sleep
    }

    #[cfg(test)]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Text for the main display line
    pub fn headline(&self) -> String {
        match (self.mode, self.displayed_minutes) {
            (Mode::Alarm, _) => "Wake up!".to_string(),
            (Mode::Sleep, Some(minutes)) => format!("{} min left", minutes),
            (_, Some(minutes)) => format!("{} min", minutes),
            (_, None) => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_status_shows_configured_minutes() {
        let status = NapStatus::new(20);
        assert_eq!(status.mode, Mode::Wake);
        assert_eq!(status.displayed_minutes, Some(20));
        assert!(!status.has_errors());
        assert_eq!(status.headline(), "20 min");
    }

    #[test]
    fn test_headline_per_mode() {
        let mut status = NapStatus::new(20);
        status.mode = Mode::Sleep;
        status.displayed_minutes = Some(7);
        assert!(status.is_napping());
        assert_eq!(status.headline(), "7 min left");

        status.mode = Mode::Alarm;
        status.displayed_minutes = None;
        assert_eq!(status.headline(), "Wake up!");
    }
}
