//! Growth bonus table - species that shed a one-off item on maturing

use crate::core::types::{ItemId, SpeciesId};
use ahash::AHashMap;

/// Item dropped the day after a species matures, and its mass multiplier
#[derive(Debug, Clone, PartialEq)]
pub struct GrowthBonus {
    pub item: ItemId,
    pub mass_scale: f32,
}

/// Static per-species bonus table
#[derive(Debug, Clone, Default)]
pub struct GrowthBonusTable {
    bonuses: AHashMap<SpeciesId, GrowthBonus>,
}

impl GrowthBonusTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Crabs leave their outgrown shell behind
    ///
    /// Every stage identity is listed so the lookup works whichever identity
    /// a record reports.
    pub fn with_defaults() -> Self {
        let mut table = Self::new();
        for (stages, shell) in [
            (["CrabEgg", "CrabBaby", "Crab"], "CrabShell"),
            (["CrabWoodEgg", "CrabWoodBaby", "CrabWood"], "CrabWoodShell"),
        ] {
            for stage in stages {
                table.add(stage, shell, 5.0);
            }
        }
        table
    }

    pub fn add(&mut self, species: impl Into<SpeciesId>, item: impl Into<ItemId>, mass_scale: f32) {
        self.bonuses.insert(
            species.into(),
            GrowthBonus { item: item.into(), mass_scale },
        );
    }

    pub fn get(&self, species: &SpeciesId) -> Option<&GrowthBonus> {
        self.bonuses.get(species)
    }

    pub fn contains(&self, species: &SpeciesId) -> bool {
        self.bonuses.contains_key(species)
    }
}
