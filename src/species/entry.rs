//! Resolved per-species metadata

use crate::core::types::SpeciesId;
use crate::host::{LifecycleDefinition, StageDefinition};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Everything the ranch needs to know about one life stage of a species
///
/// Entries for the egg, juvenile and adult stage of one species share every
/// field except `display_name`, so any stage identity resolves the family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesEntry {
    pub egg: SpeciesId,
    pub juvenile: Option<SpeciesId>,
    pub adult: Option<SpeciesId>,
    /// Days at or below which an animal is still a juvenile
    pub maturation_threshold: f32,
    /// Days; zero or less means unbounded
    pub max_age: f32,
    /// Incubation percent gained per day before environmental bonus
    pub incubation_rate: f32,
    pub display_name: String,
}

impl SpeciesEntry {
    /// Build the entries for every stage named by a lifecycle definition
    ///
    /// `rate_scale` converts the registry's per-second incubation fraction into
    /// percent per day.
    pub fn family(def: &LifecycleDefinition, rate_scale: f32) -> Vec<(SpeciesId, SpeciesEntry)> {
        let template = SpeciesEntry {
            egg: def.egg.id.clone(),
            juvenile: def.juvenile.as_ref().map(|s| s.id.clone()),
            adult: def.adult.as_ref().map(|s| s.id.clone()),
            maturation_threshold: def.maturation_threshold,
            max_age: if def.adult.is_some() { def.max_age } else { 0.0 },
            incubation_rate: (def.incubation_rate * rate_scale).round(),
            display_name: String::new(),
        };

        std::iter::once(&def.egg)
            .chain(def.juvenile.as_ref())
            .chain(def.adult.as_ref())
            .filter(|stage| !stage.id.is_empty())
            .map(|stage: &StageDefinition| {
                let entry = SpeciesEntry {
                    display_name: stage.display_name.clone(),
                    ..template.clone()
                };
                (stage.id.clone(), entry)
            })
            .collect()
    }

    /// Identity an animal of this family has at `age`
    ///
    /// Falls back to `None` when the family has no identity for that stage.
    pub fn stage_for_age(&self, age: f32) -> Option<&SpeciesId> {
        if self.maturation_threshold < 0.0 {
            return None;
        }
        if age > self.maturation_threshold {
            self.adult.as_ref()
        } else {
            self.juvenile.as_ref()
        }
    }

    /// Past maturation: produces daily output
    pub fn is_mature(&self, age: f32) -> bool {
        self.maturation_threshold >= 0.0 && age > self.maturation_threshold
    }

    /// Exactly the first day after maturation
    pub fn just_matured(&self, age: f32) -> bool {
        self.maturation_threshold >= 0.0 && age == self.maturation_threshold + 1.0
    }

    /// Too old to keep; only when a max age is configured
    pub fn is_expired(&self, age: f32) -> bool {
        self.max_age > 0.0 && age > self.max_age
    }
}

/// Read-only access to resolved entries
pub trait SpeciesLookup {
    fn entry(&self, species: &SpeciesId) -> Option<&SpeciesEntry>;

    /// Display name, or the raw identity when unknown
    fn display_name(&self, species: &SpeciesId) -> String {
        self.entry(species)
            .map(|e| e.display_name.clone())
            .unwrap_or_else(|| species.to_string())
    }
}

impl SpeciesLookup for AHashMap<SpeciesId, SpeciesEntry> {
    fn entry(&self, species: &SpeciesId) -> Option<&SpeciesEntry> {
        self.get(species)
    }
}
