//! Daily pass - ages, incubates and matures stored records
//!
//! One call advances every stored record by one day and tallies what the
//! production emitter should spawn:
//! - Animals past their max age are flagged for butchering and removed
//! - The first day after maturation yields a growth bonus for listed species
//! - Mature animals yield daily production
//! - Eggs incubate, and hatch once incubation reaches 100
//!
//! Afterwards the collection is re-sorted so release and display always see
//! the same priority order.

use crate::core::types::SpeciesId;
use crate::pen::record::{Stage, StoredRecord};
use crate::production::bonus::GrowthBonusTable;
use crate::species::SpeciesLookup;
use std::collections::BTreeMap;

/// Incubation percent at which an egg hatches
pub const HATCH_THRESHOLD: f32 = 100.0;

/// Per-species tallies handed from the daily pass to the emitter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductionBatch {
    pub butcher: BTreeMap<SpeciesId, u32>,
    pub daily: BTreeMap<SpeciesId, u32>,
    pub growth_bonus: BTreeMap<SpeciesId, u32>,
}

impl ProductionBatch {
    pub fn is_empty(&self) -> bool {
        self.butcher.is_empty() && self.daily.is_empty() && self.growth_bonus.is_empty()
    }

    pub fn butcher_count(&self, species: &SpeciesId) -> u32 {
        self.butcher.get(species).copied().unwrap_or(0)
    }

    pub fn daily_count(&self, species: &SpeciesId) -> u32 {
        self.daily.get(species).copied().unwrap_or(0)
    }

    pub fn growth_bonus_count(&self, species: &SpeciesId) -> u32 {
        self.growth_bonus.get(species).copied().unwrap_or(0)
    }
}

fn tally(counts: &mut BTreeMap<SpeciesId, u32>, species: SpeciesId) {
    *counts.entry(species).or_insert(0) += 1;
}

/// Advance every record by one day
///
/// `environmental_bonus` is added to each egg's base incubation rate.
pub fn advance_day(
    records: &mut Vec<StoredRecord>,
    lookup: &dyn SpeciesLookup,
    bonuses: &GrowthBonusTable,
    environmental_bonus: f32,
) -> ProductionBatch {
    let mut batch = ProductionBatch::default();

    for record in records.iter_mut() {
        if !record.is_live() {
            continue;
        }

        let entry = lookup.entry(&record.base_species);
        match record.stage {
            Stage::Animal { age } => {
                let effective = record.effective_species(lookup);
                if let Some(entry) = entry {
                    if entry.is_expired(age) {
                        record.pending_butcher = true;
                        tally(&mut batch.butcher, effective);
                    } else if entry.just_matured(age) && bonuses.contains(&effective) {
                        tally(&mut batch.growth_bonus, effective);
                    } else if entry.is_mature(age) {
                        tally(&mut batch.daily, effective);
                    }
                }
                // Counted before the increment, so tallies lag age by one day
                record.stage = Stage::Animal { age: age + 1.0 };
            }
            Stage::Egg { incubation } => {
                record.stage = if incubation >= HATCH_THRESHOLD {
                    Stage::Animal { age: 0.0 }
                } else {
                    let base = entry.map(|e| e.incubation_rate).unwrap_or(0.0);
                    Stage::Egg { incubation: incubation + base + environmental_bonus }
                };
            }
        }
    }

    records.retain(|r| !r.pending_butcher);
    records.sort_by(StoredRecord::priority_cmp);

    tracing::debug!(
        "Daily pass: {} records, {} butchered, {} producing, {} growth bonuses",
        records.len(),
        batch.butcher.values().sum::<u32>(),
        batch.daily.values().sum::<u32>(),
        batch.growth_bonus.values().sum::<u32>()
    );

    batch
}
