//! Version-stamped side-store for resolved species entries

use crate::core::error::Result;
use crate::core::types::SpeciesId;
use crate::species::entry::SpeciesEntry;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Identifies the schema and host build a document was written by
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStamp {
    pub schema_version: String,
    pub host_build: String,
}

/// Full on-disk contents of the side-store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesDocument {
    pub stamp: StoreStamp,
    pub entries: BTreeMap<SpeciesId, SpeciesEntry>,
}

/// Persistence backend for the species cache
///
/// Writes overwrite the whole document.
pub trait SideStore {
    /// `Ok(None)` when nothing has been stored yet
    fn load(&self) -> Result<Option<SpeciesDocument>>;

    fn save(&mut self, document: &SpeciesDocument) -> Result<()>;
}

/// Pretty-printed JSON file next to the active save
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub const FILE_NAME: &'static str = "critter_ranch_species.json";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store placed in the same directory as a save file
    pub fn beside_save(save_file: &Path) -> Self {
        let folder = save_file.parent().unwrap_or_else(|| Path::new("."));
        Self::new(folder.join(Self::FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SideStore for JsonFileStore {
    fn load(&self) -> Result<Option<SpeciesDocument>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn save(&mut self, document: &SpeciesDocument) -> Result<()> {
        let json = serde_json::to_string_pretty(document)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

/// In-memory store; clones share the same slot
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Rc<RefCell<Option<SpeciesDocument>>>,
    writes: Rc<RefCell<u32>>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(document: SpeciesDocument) -> Self {
        let store = Self::default();
        *store.slot.borrow_mut() = Some(document);
        store
    }

    /// Every save returns a permission error
    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn document(&self) -> Option<SpeciesDocument> {
        self.slot.borrow().clone()
    }

    /// Successful saves so far
    pub fn writes(&self) -> u32 {
        *self.writes.borrow()
    }
}

impl SideStore for MemoryStore {
    fn load(&self) -> Result<Option<SpeciesDocument>> {
        Ok(self.slot.borrow().clone())
    }

    fn save(&mut self, document: &SpeciesDocument) -> Result<()> {
        if self.fail_writes {
            return Err(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "side-store is read-only",
            )
            .into());
        }
        *self.slot.borrow_mut() = Some(document.clone());
        *self.writes.borrow_mut() += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_document() -> SpeciesDocument {
        let mut entries = BTreeMap::new();
        entries.insert(
            SpeciesId::new("HatchEgg"),
            SpeciesEntry {
                egg: SpeciesId::new("HatchEgg"),
                juvenile: Some(SpeciesId::new("HatchBaby")),
                adult: Some(SpeciesId::new("Hatch")),
                maturation_threshold: 5.0,
                max_age: 100.0,
                incubation_rate: 6.0,
                display_name: "Hatchling Egg".into(),
            },
        );
        SpeciesDocument {
            stamp: StoreStamp { schema_version: "1".into(), host_build: "b1".into() },
            entries,
        }
    }

    #[test]
    fn test_json_file_store_missing_file_is_empty() {
        let dir = std::env::temp_dir().join(format!("critter_ranch_missing_{}", std::process::id()));
        let store = JsonFileStore::new(dir.join("nope.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_json_file_store_overwrites() {
        let path = std::env::temp_dir()
            .join(format!("critter_ranch_store_test_{}.json", std::process::id()));
        let mut store = JsonFileStore::new(&path);

        let mut doc = sample_document();
        store.save(&doc).expect("first save");
        doc.stamp.host_build = "b2".into();
        store.save(&doc).expect("second save");

        let loaded = store.load().unwrap().expect("document present");
        assert_eq!(loaded, doc);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_json_file_store_corrupt_file_is_error() {
        let path = std::env::temp_dir()
            .join(format!("critter_ranch_corrupt_test_{}.json", std::process::id()));
        std::fs::write(&path, "{ not json").unwrap();
        let store = JsonFileStore::new(&path);
        assert!(store.load().is_err());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_beside_save_uses_save_folder() {
        let store = JsonFileStore::beside_save(Path::new("/saves/colony/colony.sav"));
        assert_eq!(store.path(), Path::new("/saves/colony/critter_ranch_species.json"));
    }

    #[test]
    fn test_memory_store_shares_slot_between_clones() {
        let store = MemoryStore::new();
        let mut writer = store.clone();
        writer.save(&sample_document()).unwrap();
        assert_eq!(store.writes(), 1);
        assert_eq!(store.document(), Some(sample_document()));
    }

    #[test]
    fn test_memory_store_preloaded_document() {
        let store = MemoryStore::with_document(sample_document());
        assert_eq!(store.load().unwrap(), Some(sample_document()));
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn test_memory_store_failing_writes() {
        let mut store = MemoryStore::new().failing_writes();
        assert!(store.save(&sample_document()).is_err());
        assert!(store.document().is_none());
        assert_eq!(store.writes(), 0);
    }
}
