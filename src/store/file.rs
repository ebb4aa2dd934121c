//! JSON records in a data directory
//!
//! Plain blocking `std::fs` calls: the records are a few bytes each and are
//! only touched from the controller task.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::{error::NapResult, scheduler::WakeId};
use super::{DurationStore, WakeIdStore};

const MINUTES_FILE: &str = "nap_minutes.json";
const WAKE_ID_FILE: &str = "pending_wake.json";

#[derive(Debug, Serialize, Deserialize)]
struct MinutesRecord {
    minutes: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct WakeIdRecord {
    id: WakeId,
}

/// Read a JSON record. A missing file is `Ok(None)`.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> NapResult<Option<T>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Write a JSON record through a temp file and rename, so readers never see half a record
pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> NapResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, serde_json::to_vec_pretty(value)?)?;
    fs::rename(&tmp, path)?;
    debug!("Wrote {}", path.display());
    Ok(())
}

fn remove_file(path: &Path) -> NapResult<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// File-backed store for both persisted records
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DurationStore for FileStore {
    fn load(&self) -> NapResult<Option<u32>> {
        let record: Option<MinutesRecord> = read_json(&self.dir.join(MINUTES_FILE))?;
        Ok(record.map(|r| r.minutes))
    }

    fn save(&self, minutes: u32) -> NapResult<()> {
        write_json(&self.dir.join(MINUTES_FILE), &MinutesRecord { minutes })
    }
}

impl WakeIdStore for FileStore {
    fn load_wake_id(&self) -> NapResult<Option<WakeId>> {
        let record: Option<WakeIdRecord> = read_json(&self.dir.join(WAKE_ID_FILE))?;
        Ok(record.map(|r| r.id))
    }

    fn save_wake_id(&self, id: WakeId) -> NapResult<()> {
        write_json(&self.dir.join(WAKE_ID_FILE), &WakeIdRecord { id })
    }

    fn clear_wake_id(&self) -> NapResult<()> {
        remove_file(&self.dir.join(WAKE_ID_FILE))
    }
}
