//! Flat-file JSON persistence for the cycle history and the last
//! computed snapshot.
//!
//! Both files are small, overwritten in place, and strictly
//! non-authoritative: a failed read or write is logged by the caller
//! and the loop carries on from wall-clock arithmetic alone.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::{CycleRecord, CycleStatus, StatusSnapshot};

const CYCLES_FILE: &str = "cycles.json";
const SNAPSHOT_FILE: &str = "status.json";

/// Persistent storage for cycle transitions and the status snapshot.
pub struct CycleStore {
    dir: PathBuf,
}

impl CycleStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create state dir {}", dir.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn cycles_path(&self) -> PathBuf {
        self.dir.join(CYCLES_FILE)
    }

    fn snapshot_path(&self) -> PathBuf {
        self.dir.join(SNAPSHOT_FILE)
    }

    /// All recorded transitions, oldest first. A missing file is an
    /// empty history, not an error.
    pub fn read_history(&self) -> Result<Vec<CycleRecord>> {
        let path = self.cycles_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let data = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&data).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// The most recent transition, if any.
    pub fn last_transition(&self) -> Result<Option<CycleRecord>> {
        let history = self.read_history()?;
        Ok(history.into_iter().max_by_key(|r| r.timestamp))
    }

    /// Append a transition record and rewrite the history file.
    pub fn append_transition(
        &self,
        status: CycleStatus,
        at: DateTime<Utc>,
    ) -> Result<CycleRecord> {
        let record = CycleRecord {
            id: uuid::Uuid::new_v4().to_string(),
            status,
            timestamp: at,
        };
        let mut history = self.read_history().unwrap_or_default();
        history.push(record.clone());
        let path = self.cycles_path();
        let data = serde_json::to_string_pretty(&history)?;
        std::fs::write(&path, data)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(record)
    }

    /// Overwrite the snapshot file with the latest computed state.
    pub fn write_snapshot(&self, snapshot: &StatusSnapshot) -> Result<()> {
        let path = self.snapshot_path();
        let data = serde_json::to_string_pretty(snapshot)?;
        std::fs::write(&path, data)
            .with_context(|| format!("failed to write {}", path.display()))
    }

    /// The last written snapshot, if one exists and parses.
    pub fn read_snapshot(&self) -> Result<Option<StatusSnapshot>> {
        let path = self.snapshot_path();
        if !path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let snapshot = serde_json::from_str(&data)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(Some(snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use hangarbot_types::{CyclePhase, LightState};

    struct TempDir(PathBuf);

    impl TempDir {
        fn new() -> Self {
            let dir = std::env::temp_dir().join(format!("hangarbot-store-{}", uuid::Uuid::new_v4()));
            Self(dir)
        }
    }

    impl Drop for TempDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }

    #[test]
    fn test_empty_history() {
        let tmp = TempDir::new();
        let store = CycleStore::open(&tmp.0).unwrap();
        assert!(store.read_history().unwrap().is_empty());
        assert!(store.last_transition().unwrap().is_none());
    }

    #[test]
    fn test_append_and_read_back() {
        let tmp = TempDir::new();
        let store = CycleStore::open(&tmp.0).unwrap();
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 2, 0, 0).unwrap();

        store.append_transition(CycleStatus::Online, t0).unwrap();
        store
            .append_transition(CycleStatus::Offline, t0 + chrono::Duration::hours(1))
            .unwrap();

        let history = store.read_history().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].status, CycleStatus::Online);

        let last = store.last_transition().unwrap().unwrap();
        assert_eq!(last.status, CycleStatus::Offline);
    }

    #[test]
    fn test_history_file_is_iso8601() {
        let tmp = TempDir::new();
        let store = CycleStore::open(&tmp.0).unwrap();
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 2, 0, 0).unwrap();
        store.append_transition(CycleStatus::Online, t0).unwrap();

        let raw = std::fs::read_to_string(tmp.0.join(CYCLES_FILE)).unwrap();
        assert!(raw.contains("\"Online\""));
        assert!(raw.contains("2024-01-01T02:00:00Z"));
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let tmp = TempDir::new();
        let store = CycleStore::open(&tmp.0).unwrap();
        assert!(store.read_snapshot().unwrap().is_none());

        let snapshot = StatusSnapshot {
            phase: CyclePhase::Closed,
            lights: vec![LightState::Filled, LightState::Empty],
            updated_at: Utc::now(),
        };
        store.write_snapshot(&snapshot).unwrap();
        let read = store.read_snapshot().unwrap().unwrap();
        assert_eq!(read.phase, CyclePhase::Closed);
        assert_eq!(read.lights, snapshot.lights);

        // Overwrite-in-place, not append.
        let next = StatusSnapshot {
            phase: CyclePhase::Open,
            lights: vec![LightState::Filled],
            updated_at: Utc::now(),
        };
        store.write_snapshot(&next).unwrap();
        assert_eq!(store.read_snapshot().unwrap().unwrap().phase, CyclePhase::Open);
    }

    #[test]
    fn test_corrupt_history_is_an_error() {
        let tmp = TempDir::new();
        let store = CycleStore::open(&tmp.0).unwrap();
        std::fs::write(tmp.0.join(CYCLES_FILE), "not json").unwrap();
        assert!(store.read_history().is_err());
    }
}
