//! Persistent records: the configured nap length and the pending wake id

pub mod file;

use std::sync::{Arc, Mutex};

use crate::{error::NapResult, scheduler::WakeId};

pub use file::FileStore;

/// Persists the configured nap length across restarts
pub trait DurationStore: Send {
    /// Stored minutes, `None` when nothing was ever saved
    fn load(&self) -> NapResult<Option<u32>>;
    fn save(&self, minutes: u32) -> NapResult<()>;
}

/// Mirror of the outstanding wake request id, so it can be re-queried after a restart
pub trait WakeIdStore: Send {
    fn load_wake_id(&self) -> NapResult<Option<WakeId>>;
    fn save_wake_id(&self, id: WakeId) -> NapResult<()>;
    /// Remove the record. Idempotent.
    fn clear_wake_id(&self) -> NapResult<()>;
}

/// Both records, as owned by the controller
pub trait NapStore: DurationStore + WakeIdStore {}

impl<T: DurationStore + WakeIdStore> NapStore for T {}

#[derive(Debug, Default, Clone)]
struct MemoryRecords {
    minutes: Option<u32>,
    wake_id: Option<WakeId>,
}

/// In-memory store for tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<MemoryRecords>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_minutes(minutes: u32) -> Self {
        let store = Self::new();
        store.records.lock().unwrap_or_else(|p| p.into_inner()).minutes = Some(minutes);
        store
    }

    pub fn with_wake_id(self, id: WakeId) -> Self {
        self.records.lock().unwrap_or_else(|p| p.into_inner()).wake_id = Some(id);
        self
    }

    fn records(&self) -> MemoryRecords {
        self.records.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    fn update(&self, f: impl FnOnce(&mut MemoryRecords)) {
        f(&mut self.records.lock().unwrap_or_else(|p| p.into_inner()));
    }
}

impl DurationStore for MemoryStore {
    fn load(&self) -> NapResult<Option<u32>> {
        Ok(self.records().minutes)
    }

    fn save(&self, minutes: u32) -> NapResult<()> {
        self.update(|records| records.minutes = Some(minutes));
        Ok(())
    }
}

impl WakeIdStore for MemoryStore {
    fn load_wake_id(&self) -> NapResult<Option<WakeId>> {
        Ok(self.records().wake_id)
    }

    fn save_wake_id(&self, id: WakeId) -> NapResult<()> {
        self.update(|records| records.wake_id = Some(id));
        Ok(())
    }

    fn clear_wake_id(&self) -> NapResult<()> {
        self.update(|records| records.wake_id = None);
        Ok(())
    }
}

// Shared handle so tests can inspect records while the controller owns the store
impl<T: DurationStore + Sync + ?Sized> DurationStore for Arc<T> {
    fn load(&self) -> NapResult<Option<u32>> {
        (**self).load()
    }

    fn save(&self, minutes: u32) -> NapResult<()> {
        (**self).save(minutes)
    }
}

impl<T: WakeIdStore + Sync + ?Sized> WakeIdStore for Arc<T> {
    fn load_wake_id(&self) -> NapResult<Option<WakeId>> {
        (**self).load_wake_id()
    }

    fn save_wake_id(&self, id: WakeId) -> NapResult<()> {
        (**self).save_wake_id(id)
    }

    fn clear_wake_id(&self) -> NapResult<()> {
        (**self).clear_wake_id()
    }
}
