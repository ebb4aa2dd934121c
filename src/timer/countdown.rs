//! Minute-granular countdown ticking while the controller is resident

use std::time::Duration;

use super::{TimerPort, TimerSlot};

pub const SECONDS_PER_MINUTE: u64 = 60;

/// Regular spacing between countdown ticks
pub const TICK_INTERVAL: Duration = Duration::from_secs(SECONDS_PER_MINUTE);

/// Owns the countdown timer slot
#[derive(Debug, Default)]
pub struct CountdownEngine {
    generation: u64,
    armed: Option<u64>,
}

impl CountdownEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the next tick after `delay`, invalidating any outstanding one
    pub fn schedule_tick(&mut self, port: &mut dyn TimerPort, delay: Duration) {
        self.generation += 1;
        self.armed = Some(self.generation);
        port.arm(TimerSlot::Countdown, delay, self.generation);
    }

    /// Drop the outstanding tick, if any
    pub fn cancel_tick(&mut self, port: &mut dyn TimerPort) {
        self.armed = None;
        port.disarm(TimerSlot::Countdown);
    }

    /// Consume a delivered tick. Returns false for ticks from a replaced or
    /// cancelled timer.
    pub fn accept(&mut self, generation: u64) -> bool {
        if self.armed == Some(generation) {
            self.armed = None;
            true
        } else {
            false
        }
    }

    #[cfg(test)]
    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }
}

/// Rebuild the countdown from the seconds left until the original deadline.
///
/// Returns the minutes to display and the delay of the next tick. A partial
/// minute counts as a whole one and the next tick lands on the remainder, so
/// later ticks fall on minute boundaries of the deadline rather than of the
/// restart.
pub fn align_to_deadline(seconds_left: u64) -> (u32, Duration) {
    let whole_minutes = seconds_left / SECONDS_PER_MINUTE;
    let leftover_seconds = seconds_left % SECONDS_PER_MINUTE;
    let (minutes, next_tick) = if leftover_seconds > 0 {
        (whole_minutes + 1, Duration::from_secs(leftover_seconds))
    } else {
        (whole_minutes, TICK_INTERVAL)
    };
    (u32::try_from(minutes).unwrap_or(u32::MAX), next_tick)
}
