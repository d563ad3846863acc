//! JSON file-backed logbook store.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::FlightLeg;

use super::memory::Ledger;
use super::{LogbookStore, StoreError, StoreEvent, event_channel};

/// On-disk layout of the logbook file.
#[derive(Debug, Serialize, Deserialize)]
struct LogbookFile {
    legs: Vec<FlightLeg>,
}

/// A store that persists every change to a JSON file.
///
/// Writes go to a sibling temporary file which is then renamed over the
/// target, so a crash mid-write leaves the previous contents intact.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    ledger: Mutex<Ledger>,
    events: broadcast::Sender<StoreEvent>,
}

impl JsonFileStore {
    /// Open the store at `path`, loading it if the file exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let ledger = if path.exists() {
            let contents = std::fs::read_to_string(&path).map_err(|e| StoreError::Io {
                message: format!("failed to read {}: {}", path.display(), e),
            })?;
            let file: LogbookFile =
                serde_json::from_str(&contents).map_err(|e| StoreError::Json {
                    message: format!("failed to parse {}: {}", path.display(), e),
                })?;
            info!(path = %path.display(), legs = file.legs.len(), "loaded logbook");
            Ledger::from_legs(file.legs)
        } else {
            info!(path = %path.display(), "starting new logbook");
            Ledger::default()
        };

        Ok(Self {
            path,
            ledger: Mutex::new(ledger),
            events: event_channel(),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `change` to a copy of the ledger, persist it, then keep it.
    ///
    /// If persisting fails the in-memory state is left untouched. The file
    /// write happens under the ledger lock and blocks the calling thread;
    /// async callers should run store calls on the blocking pool.
    fn mutate<T>(
        &self,
        change: impl FnOnce(&mut Ledger) -> Result<(T, StoreEvent), StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self.ledger.lock().map_err(|_| StoreError::Poisoned)?;
        let mut next = guard.clone();
        let (value, event) = change(&mut next)?;
        self.persist(&next)?;
        *guard = next;
        drop(guard);

        debug!(?event, path = %self.path.display(), "logbook file updated");
        let _ = self.events.send(event);
        Ok(value)
    }

    fn persist(&self, ledger: &Ledger) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Io {
                message: format!("failed to create store directory: {}", e),
            })?;
        }

        let file = LogbookFile {
            legs: ledger.sorted(),
        };
        let json = serde_json::to_string_pretty(&file).map_err(|e| StoreError::Json {
            message: format!("failed to serialize logbook: {}", e),
        })?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| StoreError::Io {
            message: format!("failed to write {}: {}", tmp.display(), e),
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|e| StoreError::Io {
            message: format!("failed to replace {}: {}", self.path.display(), e),
        })?;

        Ok(())
    }
}

impl LogbookStore for JsonFileStore {
    fn create(&self, leg: FlightLeg) -> Result<FlightLeg, StoreError> {
        self.mutate(|ledger| {
            let event = ledger.create(leg.clone())?;
            Ok((leg, event))
        })
    }

    fn update(&self, leg: FlightLeg) -> Result<FlightLeg, StoreError> {
        self.mutate(|ledger| {
            let event = ledger.update(leg.clone())?;
            Ok((leg, event))
        })
    }

    fn delete(&self, id: Uuid) -> Result<FlightLeg, StoreError> {
        self.mutate(|ledger| ledger.delete(id))
    }

    fn get(&self, id: Uuid) -> Result<Option<FlightLeg>, StoreError> {
        Ok(self.ledger.lock().map_err(|_| StoreError::Poisoned)?.get(id))
    }

    fn query_all(&self) -> Result<Vec<FlightLeg>, StoreError> {
        Ok(self.ledger.lock().map_err(|_| StoreError::Poisoned)?.sorted())
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LegDraft;
    use crate::store::memory::tests::sample_leg;
    use tempfile::tempdir;

    #[test]
    fn missing_file_starts_empty() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("logbook.json")).unwrap();
        assert!(store.query_all().unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn changes_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logbook.json");
        let first = sample_leg(1, ["2309", "0024", "0736", "0742"]);
        let second = sample_leg(3, ["0800", "0815", "1500", "1510"]);

        {
            let store = JsonFileStore::open(&path).unwrap();
            store.create(second.clone()).unwrap();
            store.create(first.clone()).unwrap();
        }

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.query_all().unwrap(), vec![first.clone(), second.clone()]);

        reopened.delete(second.id()).unwrap();
        let again = JsonFileStore::open(&path).unwrap();
        assert_eq!(again.query_all().unwrap(), vec![first]);
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("logbook.json");
        let store = JsonFileStore::open(&path).unwrap();

        store.create(sample_leg(1, ["0800", "0815", "1500", "1510"])).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn update_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logbook.json");
        let store = JsonFileStore::open(&path).unwrap();
        let leg = sample_leg(1, ["0800", "0815", "1500", "1510"]);
        store.create(leg.clone()).unwrap();

        let mut draft = LegDraft::from_leg(&leg);
        draft.arrival_airport = "KBOS".into();
        store.update(draft.commit().unwrap()).unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        let stored = reopened.get(leg.id()).unwrap().unwrap();
        assert_eq!(stored.arrival_airport(), "KBOS");
    }

    #[test]
    fn rejected_change_leaves_file_alone() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logbook.json");
        let store = JsonFileStore::open(&path).unwrap();
        let leg = sample_leg(1, ["0800", "0815", "1500", "1510"]);

        assert!(matches!(store.update(leg.clone()), Err(StoreError::NotFound(_))));
        assert!(!path.exists());

        store.create(leg.clone()).unwrap();
        assert!(matches!(store.create(leg), Err(StoreError::Duplicate(_))));
        assert_eq!(store.query_all().unwrap().len(), 1);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logbook.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(JsonFileStore::open(&path), Err(StoreError::Json { .. })));
    }

    #[test]
    fn out_of_order_leg_in_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logbook.json");
        let leg = sample_leg(1, ["0800", "0815", "1500", "1510"]);
        let mut value = serde_json::to_value(LogbookFile { legs: vec![leg] }).unwrap();
        let times = &mut value["legs"][0]["times"];
        let out = times["out"].clone();
        times["out"] = times["in"].clone();
        times["in"] = out;
        std::fs::write(&path, value.to_string()).unwrap();

        let err = JsonFileStore::open(&path).unwrap_err();
        assert!(matches!(err, StoreError::Json { .. }), "{err}");
    }

    #[test]
    fn notifies_subscribers() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("logbook.json")).unwrap();
        let mut rx = store.subscribe();
        let leg = sample_leg(1, ["0800", "0815", "1500", "1510"]);

        store.create(leg.clone()).unwrap();
        assert_eq!(rx.try_recv().unwrap(), StoreEvent::Created(leg.id()));
    }
}
