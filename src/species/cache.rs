//! Species metadata cache
//!
//! On a miss the cache sweeps the host registry once, derives entries for
//! every known lifecycle and overwrites the side-store with the full cache.
//! Sweeps are capped per process: while the host is still populating its
//! registry a few retries are worthwhile, after that misses stay absent
//! until the next start.

use crate::core::config::RanchConfig;
use crate::core::types::SpeciesId;
use crate::host::DefinitionRegistry;
use crate::species::entry::{SpeciesEntry, SpeciesLookup};
use crate::species::store::{SideStore, SpeciesDocument, StoreStamp};
use ahash::AHashMap;

pub struct SpeciesCache {
    entries: AHashMap<SpeciesId, SpeciesEntry>,
    store: Box<dyn SideStore>,
    stamp: StoreStamp,
    sweeps: u32,
    max_sweeps: u32,
    rate_scale: f32,
}

impl SpeciesCache {
    /// Open the cache, keeping stored entries only when the stamp matches
    pub fn load(
        store: Box<dyn SideStore>,
        registry: &dyn DefinitionRegistry,
        config: &RanchConfig,
    ) -> Self {
        let stamp = StoreStamp {
            schema_version: config.schema_version.clone(),
            host_build: registry.host_build(),
        };

        let entries = match store.load() {
            Ok(Some(document)) if document.stamp == stamp => {
                tracing::info!("Loaded {} cached species entries", document.entries.len());
                document.entries.into_iter().collect()
            }
            Ok(Some(document)) => {
                tracing::warn!(
                    "Species cache stamp {:?} does not match {:?}, discarding {} entries",
                    document.stamp,
                    stamp,
                    document.entries.len()
                );
                AHashMap::new()
            }
            Ok(None) => AHashMap::new(),
            Err(e) => {
                tracing::error!("Failed to read species side-store: {}", e);
                AHashMap::new()
            }
        };

        Self {
            entries,
            store,
            stamp,
            sweeps: 0,
            max_sweeps: config.max_registry_sweeps,
            rate_scale: config.incubation_rate_scale,
        }
    }

    /// Cached entry without touching the registry
    pub fn get(&self, species: &SpeciesId) -> Option<&SpeciesEntry> {
        self.entries.get(species)
    }

    /// Cached entry, sweeping the registry once on a miss
    pub fn resolve(
        &mut self,
        registry: &dyn DefinitionRegistry,
        species: &SpeciesId,
    ) -> Option<&SpeciesEntry> {
        if !self.entries.contains_key(species) {
            self.sweep(registry);
        }
        self.entries.get(species)
    }

    /// Make sure every listed species has been looked up
    ///
    /// All misses share a single sweep.
    pub fn warm<'a>(
        &mut self,
        registry: &dyn DefinitionRegistry,
        species: impl IntoIterator<Item = &'a SpeciesId>,
    ) {
        let missing = species.into_iter().any(|s| !self.entries.contains_key(s));
        if missing {
            self.sweep(registry);
        }
    }

    /// Registry sweeps performed by this process
    pub fn sweeps(&self) -> u32 {
        self.sweeps
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn sweep(&mut self, registry: &dyn DefinitionRegistry) {
        if self.sweeps >= self.max_sweeps {
            return;
        }
        self.sweeps += 1;

        let mut added = 0;
        for definition in registry.lifecycle_definitions() {
            for (id, entry) in SpeciesEntry::family(&definition, self.rate_scale) {
                if !self.entries.contains_key(&id) {
                    self.entries.insert(id, entry);
                    added += 1;
                }
            }
        }

        tracing::info!(
            "Species registry sweep {}/{} added {} entries ({} total)",
            self.sweeps,
            self.max_sweeps,
            added,
            self.entries.len()
        );
        if self.sweeps == self.max_sweeps {
            tracing::warn!("Species registry sweep limit reached; unknown species stay unresolved");
        }

        self.persist();
    }

    fn persist(&mut self) {
        let document = SpeciesDocument {
            stamp: self.stamp.clone(),
            entries: self
                .entries
                .iter()
                .map(|(id, entry)| (id.clone(), entry.clone()))
                .collect(),
        };
        if let Err(e) = self.store.save(&document) {
            tracing::error!("Failed to write species side-store: {}", e);
        }
    }
}

impl SpeciesLookup for SpeciesCache {
    fn entry(&self, species: &SpeciesId) -> Option<&SpeciesEntry> {
        self.get(species)
    }
}
