//! Stored records - creatures and eggs held by an enclosure outside the live world

use crate::core::error::RanchError;
use crate::core::types::SpeciesId;
use crate::species::SpeciesLookup;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Life stage of a stored record; exactly one of egg or animal
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stage {
    /// Incubation percent, 0 to 100
    Egg { incubation: f32 },
    /// Days since hatching (or since the age the creature had when captured)
    Animal { age: f32 },
}

/// One captured creature or egg
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PersistedRecord", into = "PersistedRecord")]
pub struct StoredRecord {
    /// Identity as captured; an egg keeps its egg identity after hatching
    pub base_species: SpeciesId,
    pub stage: Stage,
    /// `Some` only for wild records
    pub wildness: Option<f32>,
    pub pending_delete: bool,
    pub pending_butcher: bool,
}

impl StoredRecord {
    pub fn animal(species: impl Into<SpeciesId>, age: f32) -> Self {
        Self::new(species.into(), Stage::Animal { age })
    }

    pub fn egg(species: impl Into<SpeciesId>, incubation: f32) -> Self {
        Self::new(species.into(), Stage::Egg { incubation })
    }

    fn new(base_species: SpeciesId, stage: Stage) -> Self {
        Self {
            base_species,
            stage,
            wildness: None,
            pending_delete: false,
            pending_butcher: false,
        }
    }

    /// Non-positive wildness leaves the record tame
    pub fn with_wildness(mut self, wildness: f32) -> Self {
        self.wildness = (wildness > 0.0).then_some(wildness);
        self
    }

    pub fn is_animal(&self) -> bool {
        matches!(self.stage, Stage::Animal { .. })
    }

    pub fn is_egg(&self) -> bool {
        matches!(self.stage, Stage::Egg { .. })
    }

    pub fn is_wild(&self) -> bool {
        self.wildness.is_some()
    }

    /// Neither deleted nor butchered
    pub fn is_live(&self) -> bool {
        !self.pending_delete && !self.pending_butcher
    }

    pub fn age(&self) -> Option<f32> {
        match self.stage {
            Stage::Animal { age } => Some(age),
            Stage::Egg { .. } => None,
        }
    }

    pub fn incubation(&self) -> Option<f32> {
        match self.stage {
            Stage::Egg { incubation } => Some(incubation),
            Stage::Animal { .. } => None,
        }
    }

    /// Identity this record currently represents
    ///
    /// Eggs are their base species. Animals are the juvenile identity while
    /// `age` is at or below the maturation threshold and the adult identity
    /// after it. Unknown species keep their base identity.
    pub fn effective_species(&self, lookup: &dyn SpeciesLookup) -> SpeciesId {
        match self.stage {
            Stage::Egg { .. } => self.base_species.clone(),
            Stage::Animal { age } => lookup
                .entry(&self.base_species)
                .and_then(|entry| entry.stage_for_age(age))
                .cloned()
                .unwrap_or_else(|| self.base_species.clone()),
        }
    }

    /// Ordering used after every daily pass
    ///
    /// Pending deletions last. Animals before eggs, wild before tame within
    /// each. Animals by descending age, eggs by ascending incubation.
    pub fn priority_cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }

    fn sort_key(&self) -> (u8, OrderedFloat<f32>) {
        if self.pending_delete {
            return (4, OrderedFloat(0.0));
        }
        let tame = u8::from(!self.is_wild());
        match self.stage {
            Stage::Animal { age } => (tame, OrderedFloat(-age)),
            Stage::Egg { incubation } => (2 + tame, OrderedFloat(incubation)),
        }
    }
}

/// Compact persisted layout: one flag byte instead of the split stage enum
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedRecord {
    pub species: SpeciesId,
    pub flags: u8,
    #[serde(default)]
    pub age: f32,
    #[serde(default)]
    pub incubation: f32,
    #[serde(default)]
    pub wildness: f32,
}

impl PersistedRecord {
    pub const WILD: u8 = 1 << 0;
    pub const EGG: u8 = 1 << 1;
    pub const ANIMAL: u8 = 1 << 2;
    pub const PENDING_DELETE: u8 = 1 << 3;
    pub const PENDING_BUTCHER: u8 = 1 << 4;
}

impl From<StoredRecord> for PersistedRecord {
    fn from(record: StoredRecord) -> Self {
        let mut flags = 0;
        let (mut age, mut incubation) = (0.0, 0.0);
        match record.stage {
            Stage::Egg { incubation: i } => {
                flags |= Self::EGG;
                incubation = i;
            }
            Stage::Animal { age: a } => {
                flags |= Self::ANIMAL;
                age = a;
            }
        }
        if record.wildness.is_some() {
            flags |= Self::WILD;
        }
        if record.pending_delete {
            flags |= Self::PENDING_DELETE;
        }
        if record.pending_butcher {
            flags |= Self::PENDING_BUTCHER;
        }
        Self {
            species: record.base_species,
            flags,
            age,
            incubation,
            wildness: record.wildness.unwrap_or(0.0),
        }
    }
}

impl TryFrom<PersistedRecord> for StoredRecord {
    type Error = RanchError;

    fn try_from(p: PersistedRecord) -> Result<Self, Self::Error> {
        let egg = p.flags & PersistedRecord::EGG != 0;
        let animal = p.flags & PersistedRecord::ANIMAL != 0;
        let stage = match (egg, animal) {
            (true, false) => Stage::Egg { incubation: p.incubation },
            (false, true) => Stage::Animal { age: p.age },
            _ => {
                return Err(RanchError::InvalidLifecycle { species: p.species, flags: p.flags });
            }
        };
        Ok(Self {
            base_species: p.species,
            stage,
            wildness: (p.flags & PersistedRecord::WILD != 0).then_some(p.wildness),
            pending_delete: p.flags & PersistedRecord::PENDING_DELETE != 0,
            pending_butcher: p.flags & PersistedRecord::PENDING_BUTCHER != 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::SpeciesEntry;
    use ahash::AHashMap;

    fn lookup() -> AHashMap<SpeciesId, SpeciesEntry> {
        let entry = SpeciesEntry {
            egg: "HatchEgg".into(),
            juvenile: Some("HatchBaby".into()),
            adult: Some("Hatch".into()),
            maturation_threshold: 5.0,
            max_age: 100.0,
            incubation_rate: 6.0,
            display_name: "Hatch".into(),
        };
        ["HatchEgg", "HatchBaby", "Hatch"]
            .into_iter()
            .map(|id| (SpeciesId::new(id), entry.clone()))
            .collect()
    }

    #[test]
    fn test_effective_species_follows_age() {
        let lookup = lookup();
        let mut record = StoredRecord::animal("HatchEgg", 2.0);
        assert_eq!(record.effective_species(&lookup).as_str(), "HatchBaby");

        record.stage = Stage::Animal { age: 5.0 };
        assert_eq!(record.effective_species(&lookup).as_str(), "HatchBaby");

        record.stage = Stage::Animal { age: 6.0 };
        assert_eq!(record.effective_species(&lookup).as_str(), "Hatch");
    }

    #[test]
    fn test_effective_species_of_egg_is_base() {
        let record = StoredRecord::egg("HatchEgg", 40.0);
        assert_eq!(record.effective_species(&lookup()).as_str(), "HatchEgg");
    }

    #[test]
    fn test_effective_species_unknown_is_base() {
        let record = StoredRecord::animal("Ghost", 50.0);
        assert_eq!(record.effective_species(&lookup()).as_str(), "Ghost");
    }

    #[test]
    fn test_wildness_only_kept_when_positive() {
        assert!(!StoredRecord::animal("Hatch", 1.0).with_wildness(0.0).is_wild());
        let wild = StoredRecord::animal("Hatch", 1.0).with_wildness(35.0);
        assert_eq!(wild.wildness, Some(35.0));
    }

    #[test]
    fn test_priority_order() {
        let mut records = vec![
            StoredRecord::egg("HatchEgg", 50.0),
            StoredRecord::animal("Hatch", 3.0),
            StoredRecord::egg("HatchEgg", 10.0).with_wildness(20.0),
            StoredRecord::animal("Hatch", 5.0).with_wildness(10.0),
            StoredRecord::animal("Hatch", 9.0),
        ];
        records[1].pending_delete = true;
        records.sort_by(StoredRecord::priority_cmp);

        let summary: Vec<(bool, bool, f32)> = records
            .iter()
            .map(|r| (r.is_animal(), r.is_wild(), r.age().or(r.incubation()).unwrap()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (true, true, 5.0),
                (true, false, 9.0),
                (false, true, 10.0),
                (false, false, 50.0),
                (true, false, 3.0),
            ]
        );
        assert!(records[4].pending_delete);
    }

    #[test]
    fn test_persisted_layout_uses_flag_bits() {
        let mut record = StoredRecord::animal("Hatch", 7.0).with_wildness(12.5);
        record.pending_butcher = true;
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["species"], "Hatch");
        assert_eq!(
            json["flags"],
            PersistedRecord::ANIMAL | PersistedRecord::WILD | PersistedRecord::PENDING_BUTCHER
        );
        assert_eq!(json["age"], 7.0);

        let back: StoredRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_persisted_record_needs_exactly_one_stage() {
        let both = r#"{"species":"Hatch","flags":6}"#;
        assert!(serde_json::from_str::<StoredRecord>(both).is_err());

        let neither = PersistedRecord {
            species: "Hatch".into(),
            flags: PersistedRecord::WILD,
            age: 0.0,
            incubation: 0.0,
            wildness: 3.0,
        };
        match StoredRecord::try_from(neither) {
            Err(RanchError::InvalidLifecycle { species, flags }) => {
                assert_eq!(species.as_str(), "Hatch");
                assert_eq!(flags, PersistedRecord::WILD);
            }
            other => panic!("Expected InvalidLifecycle, got {:?}", other),
        }
    }
}
