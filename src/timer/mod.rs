//! In-process timers used while the controller is resident
//!
//! Each purpose owns one slot. Arming a slot again replaces the previous
//! timer, and every armed timer carries a generation so a tick that was
//! already queued when its timer got replaced can be recognised as stale.

pub mod alarm;
pub mod countdown;

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

pub use alarm::{AlarmSequencer, PulseOutcome, PULSE_INTERVAL, PULSE_LIMIT};
pub use countdown::{CountdownEngine, SECONDS_PER_MINUTE, TICK_INTERVAL};

/// Timer purposes; at most one outstanding timer per slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerSlot {
    /// Minute countdown while in Sleep
    Countdown,
    /// Pulse repeat while in Alarm
    Vibrate,
}

/// Platform timer facility
pub trait TimerPort: Send {
    /// Deliver a tick tagged with `generation` for `slot` after `delay`,
    /// replacing whatever was armed on that slot
    fn arm(&mut self, slot: TimerSlot, delay: Duration, generation: u64);

    /// Drop the timer on `slot`. Idempotent.
    fn disarm(&mut self, slot: TimerSlot);
}

/// Armed timer as seen by `ManualTimers`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmedTimer {
    pub delay: Duration,
    pub generation: u64,
}

/// Timer port that only records what is armed; ticks are delivered by hand.
/// Clones share the same slots, so a test can keep a handle while the
/// controller owns another.
#[derive(Debug, Default, Clone)]
pub struct ManualTimers {
    armed: Arc<Mutex<HashMap<TimerSlot, ArmedTimer>>>,
}

impl ManualTimers {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> std::sync::MutexGuard<'_, HashMap<TimerSlot, ArmedTimer>> {
        self.armed.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn armed(&self, slot: TimerSlot) -> Option<ArmedTimer> {
        self.slots().get(&slot).copied()
    }

    pub fn is_idle(&self) -> bool {
        self.slots().is_empty()
    }
}

impl TimerPort for ManualTimers {
    fn arm(&mut self, slot: TimerSlot, delay: Duration, generation: u64) {
        self.slots().insert(slot, ArmedTimer { delay, generation });
    }

    fn disarm(&mut self, slot: TimerSlot) {
        self.slots().remove(&slot);
    }
}
