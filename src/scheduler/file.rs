//! Wake scheduler persisted to disk so requests outlive the process

use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    error::{NapError, NapResult},
    store::file::{read_json, write_json},
};
use super::{WakeId, WakeRequest, WakeScheduler};

const REQUEST_FILE: &str = "wake_request.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct SchedulerRecord {
    /// Last id handed out; ids never repeat across restarts
    next_id: u64,
    pending: Option<WakeRequest>,
}

/// File-backed wake scheduler holding the single outstanding request
#[derive(Debug)]
pub struct FileWakeScheduler {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileWakeScheduler {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(REQUEST_FILE),
            lock: Mutex::new(()),
        }
    }

    /// Load the record; an unreadable one is dropped and flagged for rewrite
    fn load(&self) -> NapResult<(SchedulerRecord, bool)> {
        match read_json(&self.path) {
            Ok(record) => Ok((record.unwrap_or_default(), false)),
            Err(NapError::Corrupt(e)) => {
                warn!("Discarding unreadable {}: {}", self.path.display(), e);
                Ok((SchedulerRecord::default(), true))
            }
            Err(e) => Err(e),
        }
    }

    fn with_record<T>(&self, f: impl FnOnce(&mut SchedulerRecord) -> NapResult<(T, bool)>) -> NapResult<T> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let (mut record, repaired) = self.load()?;
        let (value, dirty) = f(&mut record)?;
        if dirty || repaired {
            write_json(&self.path, &record)?;
        }
        Ok(value)
    }

    /// Currently outstanding request, if any
    pub fn pending(&self) -> NapResult<Option<WakeRequest>> {
        self.with_record(|record| Ok((record.pending.clone(), false)))
    }

    /// Consume the outstanding request if its deadline has passed
    pub fn take_due(&self, now: DateTime<Utc>) -> NapResult<Option<WakeRequest>> {
        self.with_record(|record| {
            let due = record.pending.as_ref().is_some_and(|request| request.fire_at <= now);
            if !due {
                return Ok((None, false));
            }
            let request = record.pending.take();
            if let Some(request) = &request {
                info!("Wake request {} is due (fire_at={})", request.id, request.fire_at);
            }
            Ok((request, true))
        })
    }
}

impl WakeScheduler for FileWakeScheduler {
    fn schedule(&self, fire_at: DateTime<Utc>) -> NapResult<WakeId> {
        let now = Utc::now();
        if fire_at <= now {
            return Err(NapError::ScheduleDenied(format!(
                "fire_at {} is not in the future",
                fire_at
            )));
        }

        self.with_record(|record| {
            record.next_id += 1;
            let id = WakeId(record.next_id);
            if let Some(previous) = record.pending.replace(WakeRequest { id, fire_at }) {
                debug!("Replacing outstanding wake request {}", previous.id);
            }
            info!("Scheduled wake request {} at {}", id, fire_at);
            Ok((id, true))
        })
    }

    fn query(&self, id: WakeId) -> NapResult<Option<DateTime<Utc>>> {
        self.with_record(|record| {
            let fire_at = record
                .pending
                .as_ref()
                .filter(|request| request.id == id)
                .map(|request| request.fire_at);
            Ok((fire_at, false))
        })
    }

    fn cancel_all(&self) -> NapResult<()> {
        self.with_record(|record| match record.pending.take() {
            Some(request) => {
                info!("Cancelled wake request {}", request.id);
                Ok(((), true))
            }
            None => Ok(((), false)),
        })
    }
}
