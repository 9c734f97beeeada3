//! Named samples persisted as one JSON mapping in a single storage slot
use crate::recorder::Recording;
use indexmap::IndexMap;
use log::{info, warn};
use serde::{Deserialize, Serialize};

pub mod storage;

use storage::Storage;

/// Slot holding the serialized sample mapping.
pub const STORAGE_KEY: &str = "musicSamples";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Sample name to recording, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SampleMap {
    samples: IndexMap<String, Recording>,
}

impl SampleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// The mapping after saving `recording` as `name`. A blank name means the
    /// user cancelled, so there is nothing to save.
    pub fn with_saved(&self, name: &str, recording: &Recording) -> Option<SampleMap> {
        if name.trim().is_empty() {
            return None;
        }
        let mut next = self.clone();
        next.samples.insert(name.to_string(), recording.clone());
        Some(next)
    }

    /// The mapping with `name` removed. Absent names leave it unchanged.
    pub fn without(&self, name: &str) -> SampleMap {
        let mut next = self.clone();
        next.samples.shift_remove(name);
        next
    }

    pub fn get(&self, name: &str) -> Option<&Recording> {
        self.samples.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.samples.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, StoreError> {
        Ok(serde_json::from_str(text)?)
    }
}

pub struct SampleStore {
    samples: SampleMap,
    storage: Box<dyn Storage>,
    key: String,
}

impl SampleStore {
    /// Read the slot once. Anything other than a valid mapping starts empty.
    pub fn load(storage: Box<dyn Storage>, key: &str) -> Self {
        let samples = match storage.get(key) {
            Ok(Some(text)) if text.trim().is_empty() => SampleMap::new(),
            Ok(Some(text)) => SampleMap::from_json(&text).unwrap_or_else(|err| {
                warn!("ignoring unreadable samples in '{}': {}", key, err);
                SampleMap::new()
            }),
            Ok(None) => SampleMap::new(),
            Err(err) => {
                warn!("could not read samples from '{}': {}", key, err);
                SampleMap::new()
            }
        };
        info!("loaded {} saved samples", samples.len());

        Self {
            samples,
            storage,
            key: key.to_string(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Recording> {
        self.samples.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.samples.names()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Save `recording` as `name` and rewrite the slot. Returns `false` for a
    /// blank name. The in-memory mapping is updated even if the write fails.
    pub fn save(&mut self, name: &str, recording: &Recording) -> Result<bool, StoreError> {
        let Some(next) = self.samples.with_saved(name, recording) else {
            return Ok(false);
        };
        self.samples = next;
        self.persist()?;
        Ok(true)
    }

    pub fn delete(&mut self, name: &str) -> Result<(), StoreError> {
        self.samples = self.samples.without(name);
        self.persist()
    }

    pub fn into_storage(self) -> Box<dyn Storage> {
        self.storage
    }

    fn persist(&mut self) -> Result<(), StoreError> {
        let text = self.samples.to_json()?;
        self.storage.set(&self.key, &text)
    }
}

#[cfg(test)]
mod tests {
    use super::storage::{FileStorage, MemoryStorage};
    use super::*;
    use crate::recorder::{Note, NoteEvent};
    use tempfile::tempdir;

    fn recording(events: &[(Note, f64)]) -> Recording {
        Recording::from(
            events
                .iter()
                .map(|(note, time)| NoteEvent::new(*note, *time))
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn test_blank_name_is_not_saved() {
        let map = SampleMap::new();
        assert!(map.with_saved("", &Recording::new()).is_none());
        assert!(map.with_saved("   ", &Recording::new()).is_none());
    }

    #[test]
    fn test_with_saved_overwrites_in_place() {
        let r1 = recording(&[(Note::C, 0.0)]);
        let r2 = recording(&[(Note::F, 0.3)]);

        let map = SampleMap::new()
            .with_saved("A", &r1)
            .and_then(|map| map.with_saved("B", &r1))
            .and_then(|map| map.with_saved("A", &r2))
            .unwrap();

        assert_eq!(map.get("A"), Some(&r2));
        assert_eq!(map.names().collect::<Vec<_>>(), vec!["A", "B"]);
    }

    #[test]
    fn test_name_is_kept_as_typed() {
        let mut store = SampleStore::load(Box::new(MemoryStorage::new()), STORAGE_KEY);
        let rec = recording(&[(Note::C, 0.0)]);
        store.save("A", &rec).unwrap();
        store.save(" A", &rec).unwrap();

        assert_eq!(store.names().collect::<Vec<_>>(), vec!["A", " A"]);
        assert_eq!(store.get(" A"), Some(&rec));

        store.delete(" A").unwrap();
        assert_eq!(store.names().collect::<Vec<_>>(), vec!["A"]);
    }

    #[test]
    fn test_without_absent_is_noop() {
        let map = SampleMap::new()
            .with_saved("A", &recording(&[(Note::D, 0.0)]))
            .unwrap();
        assert_eq!(map.without("missing"), map);
    }

    #[test]
    fn test_wire_format() {
        let map = SampleMap::new()
            .with_saved("demo", &recording(&[(Note::C, 0.0), (Note::E, 0.5)]))
            .unwrap();
        assert_eq!(
            map.to_json().unwrap(),
            r#"{"demo":[{"note":"C","time":0.0},{"note":"E","time":0.5}]}"#
        );
    }

    #[test]
    fn test_load_falls_back_to_empty() {
        for text in ["", "not json", r#"{"x":[{"note":"Z","time":0}]}"#, "[1,2]"] {
            let store = SampleStore::load(
                Box::new(MemoryStorage::with_slot(STORAGE_KEY, text)),
                STORAGE_KEY,
            );
            assert!(store.is_empty(), "expected empty store for {:?}", text);
        }

        let store = SampleStore::load(Box::new(MemoryStorage::new()), STORAGE_KEY);
        assert!(store.is_empty());
    }

    #[test]
    fn test_save_then_reload() {
        let dir = tempdir().unwrap();
        let rec = recording(&[(Note::C, 0.0), (Note::D, 1.25)]);

        let mut store = SampleStore::load(Box::new(FileStorage::new(dir.path())), STORAGE_KEY);
        assert!(store.save("A", &rec).unwrap());
        assert!(!store.save("", &rec).unwrap());

        let reloaded = SampleStore::load(Box::new(FileStorage::new(dir.path())), STORAGE_KEY);
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.get("A"), Some(&rec));
    }

    #[test]
    fn test_delete_persists() {
        let dir = tempdir().unwrap();
        let rec = recording(&[(Note::E, 0.0)]);

        let mut store = SampleStore::load(Box::new(FileStorage::new(dir.path())), STORAGE_KEY);
        store.save("A", &rec).unwrap();
        store.save("B", &rec).unwrap();
        store.delete("A").unwrap();
        store.delete("A").unwrap();
        assert!(store.get("A").is_none());

        let reloaded = SampleStore::load(Box::new(FileStorage::new(dir.path())), STORAGE_KEY);
        assert_eq!(reloaded.names().collect::<Vec<_>>(), vec!["B"]);
    }

    #[test]
    fn test_every_mutation_rewrites_slot() {
        let mut store = SampleStore::load(Box::new(MemoryStorage::new()), STORAGE_KEY);
        store.delete("nothing").unwrap();

        let storage = store.into_storage();
        assert_eq!(storage.get(STORAGE_KEY).unwrap().as_deref(), Some("{}"));
    }
}
