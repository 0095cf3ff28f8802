//! Lazily resolved production recipes
//!
//! Butcher loot, diet yields and secondary drops are looked up in the host
//! registry the first time a species needs them. Failed lookups are cached
//! as permanent negatives so the registry is never asked the same question
//! twice in one run.

use crate::core::types::{ItemId, MatterPhase, SpeciesId};
use crate::host::{DefinitionRegistry, ShearDefinition};
use ahash::AHashMap;

/// Memoized per-species resolution, negatives included
#[derive(Debug)]
pub struct Memo<T> {
    label: &'static str,
    resolved: AHashMap<SpeciesId, Option<T>>,
}

impl<T> Memo<T> {
    pub fn new(label: &'static str) -> Self {
        Self { label, resolved: AHashMap::new() }
    }

    /// Cached value, running `resolve` only on the first request for `species`
    pub fn get_or_resolve(
        &mut self,
        species: &SpeciesId,
        resolve: impl FnOnce() -> Option<T>,
    ) -> Option<&T> {
        if !self.resolved.contains_key(species) {
            let value = resolve();
            if value.is_none() {
                tracing::warn!("No {} for {}; skipping it for the rest of the run", self.label, species);
            }
            self.resolved.insert(species.clone(), value);
        }
        self.resolved.get(species).and_then(Option::as_ref)
    }

    /// Resolved and found nothing
    pub fn is_negative(&self, species: &SpeciesId) -> bool {
        matches!(self.resolved.get(species), Some(None))
    }

    pub fn is_resolved(&self, species: &SpeciesId) -> bool {
        self.resolved.contains_key(species)
    }
}

/// One butchering loot entry with its food value
#[derive(Debug, Clone, PartialEq)]
pub struct LootEntry {
    pub item: ItemId,
    pub weight: f32,
    /// Calories per unit of default mass, when edible
    pub calories: Option<f32>,
}

/// Physical route a daily output takes into the world
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmissionPath {
    Gas,
    Liquid,
    SolidResource,
    Prefab,
}

impl From<Option<MatterPhase>> for EmissionPath {
    fn from(phase: Option<MatterPhase>) -> Self {
        match phase {
            Some(MatterPhase::Gas) => EmissionPath::Gas,
            Some(MatterPhase::Liquid) => EmissionPath::Liquid,
            Some(MatterPhase::Solid) => EmissionPath::SolidResource,
            None => EmissionPath::Prefab,
        }
    }
}

/// One diet output with its per-animal daily yield
#[derive(Debug, Clone, PartialEq)]
pub struct YieldEntry {
    pub product: ItemId,
    /// Kilograms per animal per day before the productivity multiplier
    pub per_animal: f32,
    pub path: EmissionPath,
    pub label: String,
}

/// Process-wide production recipe caches
#[derive(Debug)]
pub struct RecipeBook {
    butcher: Memo<Vec<LootEntry>>,
    diet: Memo<Vec<YieldEntry>>,
    secondary: Memo<ShearDefinition>,
    calorie_damping: f32,
}

impl RecipeBook {
    pub fn new(calorie_damping: f32) -> Self {
        Self {
            butcher: Memo::new("butcher table"),
            diet: Memo::new("diet yield"),
            secondary: Memo::new("secondary drop"),
            calorie_damping,
        }
    }

    pub fn butcher_loot(
        &mut self,
        registry: &dyn DefinitionRegistry,
        species: &SpeciesId,
    ) -> Option<&[LootEntry]> {
        self.butcher
            .get_or_resolve(species, || {
                let drops = registry.butcher_drops(species)?;
                let loot: Vec<LootEntry> = drops
                    .into_iter()
                    .map(|drop| LootEntry {
                        calories: registry.food_calories(&drop.item),
                        item: drop.item,
                        weight: drop.weight,
                    })
                    .collect();
                (!loot.is_empty()).then_some(loot)
            })
            .map(Vec::as_slice)
    }

    /// Daily yields derived from the species' calorie budget
    ///
    /// Each output yields `calories_per_day * produced_per_calorie * damping`
    /// kilograms per animal. Element outputs need a positive yield; prefab
    /// outputs spawn by count and are always kept.
    pub fn diet_yield(
        &mut self,
        registry: &dyn DefinitionRegistry,
        species: &SpeciesId,
    ) -> Option<&[YieldEntry]> {
        let damping = self.calorie_damping;
        self.diet
            .get_or_resolve(species, || {
                let diet = registry.diet(species)?;
                let yields: Vec<YieldEntry> = diet
                    .outputs
                    .into_iter()
                    .map(|output| YieldEntry {
                        per_animal: diet.calories_per_day * output.produced_per_calorie * damping,
                        path: registry.element_phase(&output.product).into(),
                        label: registry
                            .display_name(&output.product)
                            .unwrap_or_else(|| output.product.to_string()),
                        product: output.product,
                    })
                    .filter(|y| y.path == EmissionPath::Prefab || y.per_animal > 0.0)
                    .collect();
                (!yields.is_empty()).then_some(yields)
            })
            .map(Vec::as_slice)
    }

    /// Well-fed shearing wins over scale growth when a species has both
    pub fn secondary_drop(
        &mut self,
        registry: &dyn DefinitionRegistry,
        species: &SpeciesId,
    ) -> Option<&ShearDefinition> {
        self.secondary.get_or_resolve(species, || {
            registry
                .well_fed_shear(species)
                .or_else(|| registry.scale_growth(species))
        })
    }

    pub fn has_no_yield(&self, species: &SpeciesId) -> bool {
        self.diet.is_negative(species)
    }

    pub fn cannot_butcher(&self, species: &SpeciesId) -> bool {
        self.butcher.is_negative(species)
    }

    pub fn cannot_drop_secondary(&self, species: &SpeciesId) -> bool {
        self.secondary.is_negative(species)
    }
}
