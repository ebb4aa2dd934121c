//! Wake scheduling
//!
//! A wake request is a promise to resume the controller at an absolute time,
//! independent of whether the process is resident when it comes due.

pub mod file;

use std::{
    fmt,
    sync::{Arc, Mutex},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{NapError, NapResult};

pub use file::FileWakeScheduler;

/// Opaque handle for a scheduled wake request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WakeId(pub u64);

impl fmt::Display for WakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wake#{}", self.0)
    }
}

/// A single outstanding wake request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WakeRequest {
    pub id: WakeId,
    pub fire_at: DateTime<Utc>,
}

/// Contract the controller needs from the platform wake service
pub trait WakeScheduler: Send + Sync {
    /// Register a wake at `fire_at`, replacing any outstanding request
    fn schedule(&self, fire_at: DateTime<Utc>) -> NapResult<WakeId>;

    /// Deadline of `id`, or `None` once it was consumed, cancelled or never existed
    fn query(&self, id: WakeId) -> NapResult<Option<DateTime<Utc>>>;

    /// Drop every outstanding request. Idempotent.
    fn cancel_all(&self) -> NapResult<()>;
}

impl<T: WakeScheduler + ?Sized> WakeScheduler for Arc<T> {
    fn schedule(&self, fire_at: DateTime<Utc>) -> NapResult<WakeId> {
        (**self).schedule(fire_at)
    }

    fn query(&self, id: WakeId) -> NapResult<Option<DateTime<Utc>>> {
        (**self).query(id)
    }

    fn cancel_all(&self) -> NapResult<()> {
        (**self).cancel_all()
    }
}

#[derive(Debug, Default)]
struct MemorySlot {
    next_id: u64,
    pending: Option<WakeRequest>,
    deny: bool,
}

/// In-memory scheduler for tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryWakeScheduler {
    slot: Mutex<MemorySlot>,
}

impl MemoryWakeScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following `schedule` call fail
    pub fn set_deny(&self, deny: bool) {
        if let Ok(mut slot) = self.slot.lock() {
            slot.deny = deny;
        }
    }

    /// Currently outstanding request, if any
    pub fn pending(&self) -> Option<WakeRequest> {
        self.slot.lock().ok().and_then(|slot| slot.pending.clone())
    }

    /// Consume the outstanding request as if it had fired
    pub fn fire(&self) -> Option<WakeRequest> {
        self.slot.lock().ok().and_then(|mut slot| slot.pending.take())
    }

    /// Put a request in place directly, as left behind by an earlier process
    pub fn insert(&self, fire_at: DateTime<Utc>) -> WakeId {
        let mut slot = match self.slot.lock() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        slot.next_id += 1;
        let id = WakeId(slot.next_id);
        slot.pending = Some(WakeRequest { id, fire_at });
        id
    }
}

impl WakeScheduler for MemoryWakeScheduler {
    fn schedule(&self, fire_at: DateTime<Utc>) -> NapResult<WakeId> {
        let denied = self.slot.lock().map(|slot| slot.deny).unwrap_or(true);
        if denied {
            return Err(NapError::ScheduleDenied("scheduler unavailable".to_string()));
        }
        Ok(self.insert(fire_at))
    }

    fn query(&self, id: WakeId) -> NapResult<Option<DateTime<Utc>>> {
        Ok(self
            .pending()
            .filter(|request| request.id == id)
            .map(|request| request.fire_at))
    }

    fn cancel_all(&self) -> NapResult<()> {
        if let Ok(mut slot) = self.slot.lock() {
            slot.pending = None;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_memory_scheduler_single_slot() {
        let scheduler = MemoryWakeScheduler::new();
        let now = Utc::now();
        let first = scheduler.schedule(now + Duration::minutes(5)).unwrap();
        let second = scheduler.schedule(now + Duration::minutes(9)).unwrap();

        assert_ne!(first, second);
        assert_eq!(scheduler.query(first).unwrap(), None);
        assert_eq!(scheduler.query(second).unwrap(), Some(now + Duration::minutes(9)));
    }

    #[test]
    fn test_memory_scheduler_cancel_is_idempotent() {
        let scheduler = MemoryWakeScheduler::new();
        let id = scheduler.schedule(Utc::now() + Duration::minutes(1)).unwrap();
        scheduler.cancel_all().unwrap();
        scheduler.cancel_all().unwrap();
        assert_eq!(scheduler.query(id).unwrap(), None);
    }

    #[test]
    fn test_memory_scheduler_deny() {
        let scheduler = MemoryWakeScheduler::new();
        scheduler.set_deny(true);
        let result = scheduler.schedule(Utc::now() + Duration::minutes(1));
        assert!(matches!(result, Err(NapError::ScheduleDenied(_))));
        assert!(scheduler.pending().is_none());
    }

    #[test]
    fn test_wake_id_display() {
        assert_eq!(WakeId(7).to_string(), "wake#7");
    }
}
