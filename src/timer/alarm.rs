//! Bounded pulse sequence run once the nap deadline is reached

use std::time::Duration;

use tracing::debug;

use crate::services::Haptics;
use super::{TimerPort, TimerSlot};

/// Spacing between two pulses
pub const PULSE_INTERVAL: Duration = Duration::from_secs(2);

/// Pulses per alarm, about one minute of vibration in total
pub const PULSE_LIMIT: u32 = (60 / PULSE_INTERVAL.as_secs()) as u32;

/// What a delivered pulse tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PulseOutcome {
    /// Pulsed and armed the next tick
    Continue,
    /// The limit was reached, nothing is armed any more
    Finished,
}

/// Owns the vibrate timer slot and the pulse counter
pub struct AlarmSequencer {
    haptics: Box<dyn Haptics>,
    generation: u64,
    armed: Option<u64>,
    vibrate_count: u32,
}

impl AlarmSequencer {
    pub fn new(haptics: Box<dyn Haptics>) -> Self {
        Self {
            haptics,
            generation: 0,
            armed: None,
            vibrate_count: 0,
        }
    }

    /// Emit one haptic pulse
    pub fn pulse(&mut self) {
        self.haptics.pulse();
        self.vibrate_count += 1;
        debug!("Alarm pulse {}/{}", self.vibrate_count, PULSE_LIMIT);
    }

    /// Begin the sequence: pulse right away and arm the next tick
    pub fn start(&mut self, port: &mut dyn TimerPort) {
        self.vibrate_count = 0;
        self.pulse();
        self.arm(port);
    }

    /// Handle a vibrate tick. `None` means the tick was stale and ignored.
    pub fn on_tick(&mut self, port: &mut dyn TimerPort, generation: u64) -> Option<PulseOutcome> {
        if self.armed != Some(generation) {
            return None;
        }
        self.armed = None;

        if self.vibrate_count < PULSE_LIMIT {
            self.pulse();
            self.arm(port);
            Some(PulseOutcome::Continue)
        } else {
            Some(PulseOutcome::Finished)
        }
    }

    /// Cancel the sequence. Idempotent.
    pub fn stop(&mut self, port: &mut dyn TimerPort) {
        self.armed = None;
        self.vibrate_count = 0;
        port.disarm(TimerSlot::Vibrate);
    }

    pub fn vibrate_count(&self) -> u32 {
        self.vibrate_count
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.armed.is_some()
    }

    fn arm(&mut self, port: &mut dyn TimerPort) {
        self.generation += 1;
        self.armed = Some(self.generation);
        port.arm(TimerSlot::Vibrate, PULSE_INTERVAL, self.generation);
    }
}
