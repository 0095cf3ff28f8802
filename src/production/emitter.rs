//! Production emitter - turns a daily batch into world side-effects
//!
//! Four independent streams per batch:
//! - Butcher loot for expired animals, with calories reported to the host
//! - Daily byproducts routed by matter phase (gas, liquid, solid, prefab)
//! - One probabilistic secondary drop per producing species, thrown clear
//! - Growth bonuses from the static bonus table

use crate::core::config::RanchConfig;
use crate::core::types::Cell;
use crate::host::{DefinitionRegistry, World};
use crate::production::bonus::GrowthBonusTable;
use crate::production::recipes::{EmissionPath, RecipeBook};
use crate::simulation::daily::ProductionBatch;
use crate::species::SpeciesLookup;
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Where and how hot emissions leave the enclosure
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmissionSite {
    pub drop_cell: Cell,
    /// Where the floating "+product" feedback appears
    pub indicator_cell: Cell,
    pub temperature: f32,
}

/// What one emission pass spawned
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmissionReport {
    pub loot_spawned: u32,
    pub outputs_spawned: u32,
    pub secondary_drops: u32,
    pub growth_bonuses: u32,
    pub calories_reported: f32,
}

pub struct ProductionEmitter {
    recipes: RecipeBook,
    bonuses: GrowthBonusTable,
    rng: ChaCha8Rng,
    config: RanchConfig,
}

impl ProductionEmitter {
    pub fn new(config: &RanchConfig, bonuses: GrowthBonusTable, seed: u64) -> Self {
        Self {
            recipes: RecipeBook::new(config.calorie_yield_damping),
            bonuses,
            rng: ChaCha8Rng::seed_from_u64(seed),
            config: config.clone(),
        }
    }

    pub fn bonuses(&self) -> &GrowthBonusTable {
        &self.bonuses
    }

    pub fn recipes(&self) -> &RecipeBook {
        &self.recipes
    }

    /// Productivity multiplier: monotonic in uptime, never below 1
    pub fn productivity(&self, uptime: f32) -> f32 {
        self.config.productivity_multiplier(uptime)
    }

    pub fn emit(
        &mut self,
        batch: &ProductionBatch,
        site: EmissionSite,
        uptime: f32,
        world: &mut dyn World,
        registry: &dyn DefinitionRegistry,
        names: &dyn SpeciesLookup,
    ) -> EmissionReport {
        let mut report = EmissionReport::default();
        self.emit_butcher_loot(batch, site, world, registry, names, &mut report);
        self.emit_daily_outputs(batch, site, uptime, world, registry, &mut report);
        self.emit_secondary_drops(batch, site, uptime, world, registry, &mut report);
        self.emit_growth_bonuses(batch, site, world, &mut report);

        tracing::debug!(
            "Emitted {} loot, {} outputs, {} secondary drops, {} growth bonuses",
            report.loot_spawned,
            report.outputs_spawned,
            report.secondary_drops,
            report.growth_bonuses
        );
        report
    }

    fn emit_butcher_loot(
        &mut self,
        batch: &ProductionBatch,
        site: EmissionSite,
        world: &mut dyn World,
        registry: &dyn DefinitionRegistry,
        names: &dyn SpeciesLookup,
        report: &mut EmissionReport,
    ) {
        for (species, &count) in &batch.butcher {
            if count == 0 {
                continue;
            }
            let Some(loot) = self.recipes.butcher_loot(registry, species) else {
                continue;
            };
            for entry in loot {
                let scale = count as f32 * entry.weight;
                world.spawn_item(site.drop_cell, &entry.item, scale, site.temperature);
                report.loot_spawned += 1;

                if let Some(calories) = entry.calories {
                    let total = calories * scale;
                    world.report_calories(total, &format!("Butchered {}", names.display_name(species)));
                    report.calories_reported += total;
                }
            }
        }
    }

    fn emit_daily_outputs(
        &mut self,
        batch: &ProductionBatch,
        site: EmissionSite,
        uptime: f32,
        world: &mut dyn World,
        registry: &dyn DefinitionRegistry,
        report: &mut EmissionReport,
    ) {
        let multiplier = self.productivity(uptime) * self.config.daily_output_multiplier;

        for (species, &count) in &batch.daily {
            if count == 0 {
                continue;
            }
            let Some(yields) = self.recipes.diet_yield(registry, species) else {
                continue;
            };
            let scale = count as f32 * multiplier;
            for output in yields {
                let mass = output.per_animal * scale;
                match output.path {
                    EmissionPath::Gas => {
                        world.spawn_gas(site.drop_cell, &output.product, mass, site.temperature)
                    }
                    EmissionPath::Liquid => {
                        world.spawn_liquid(site.drop_cell, &output.product, mass, site.temperature)
                    }
                    EmissionPath::SolidResource => {
                        world.spawn_solid(site.drop_cell, &output.product, mass, site.temperature)
                    }
                    EmissionPath::Prefab => {
                        world.spawn_item(site.drop_cell, &output.product, scale, site.temperature)
                    }
                }
                world.show_indicator(site.indicator_cell, &output.label);
                report.outputs_spawned += 1;
            }
        }
    }

    fn emit_secondary_drops(
        &mut self,
        batch: &ProductionBatch,
        site: EmissionSite,
        uptime: f32,
        world: &mut dyn World,
        registry: &dyn DefinitionRegistry,
        report: &mut EmissionReport,
    ) {
        let chance = self.config.secondary_drop_chance(uptime);
        for (species, &count) in &batch.daily {
            if count == 0 || self.recipes.cannot_drop_secondary(species) {
                continue;
            }
            if self.rng.gen::<f32>() >= chance {
                continue;
            }
            let Some(drop) = self.recipes.secondary_drop(registry, species) else {
                continue;
            };
            let mass = (drop.drop_mass * count as f32 / self.config.secondary_drop_divisor).ceil()
                * self.config.secondary_drop_multiplier;
            let velocity = Vec2::new(self.rng.gen_range(-1.0..=1.0), self.rng.gen::<f32>() * 2.0 + 2.0);
            world.launch_item(site.drop_cell, &drop.item, mass, site.temperature, velocity);
            report.secondary_drops += 1;
        }
    }

    fn emit_growth_bonuses(
        &mut self,
        batch: &ProductionBatch,
        site: EmissionSite,
        world: &mut dyn World,
        report: &mut EmissionReport,
    ) {
        for (species, &count) in &batch.growth_bonus {
            if count == 0 {
                continue;
            }
            let Some(bonus) = self.bonuses.get(species) else {
                continue;
            };
            world.spawn_item(site.drop_cell, &bonus.item, bonus.mass_scale * count as f32, site.temperature);
            report.growth_bonuses += 1;
        }
    }
}
