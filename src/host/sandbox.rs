//! In-memory host for tests and the demo binary
//!
//! `SandboxWorld` keeps loose entities in a flat list and rooms as
//! rectangles. Everything the ranch spawns is also appended to a log so
//! callers can assert on side-effects. `SandboxRegistry` carries a small
//! creature catalog and counts how often each query is made.

use crate::core::types::{Cell, CellBounds, EntityId, ItemId, MatterPhase, RegionId, SpeciesId};
use crate::host::{
    ButcherDrop, DefinitionRegistry, DietDefinition, DietOutput, EntityTag, FilterSource,
    LifecycleDefinition, LooseEntity, LooseKind, RegionInfo, ScanLayer, Scheduler, ShearDefinition,
    StageDefinition, World,
};
use ahash::{AHashMap, AHashSet};
use glam::Vec2;
use std::cell::{Cell as Counter, RefCell};
use std::rc::Rc;

/// One side-effect the sandbox observed
#[derive(Debug, Clone, PartialEq)]
pub enum Spawned {
    Creature { cell: Cell, species: SpeciesId, age: f32, wildness: f32 },
    Egg { cell: Cell, species: SpeciesId, incubation: f32, wildness: f32 },
    Item { cell: Cell, item: ItemId, mass_scale: f32, temperature: f32 },
    Gas { cell: Cell, element: ItemId, mass: f32, temperature: f32 },
    Liquid { cell: Cell, element: ItemId, mass: f32, temperature: f32 },
    Solid { cell: Cell, element: ItemId, mass: f32, temperature: f32 },
    Launched { cell: Cell, item: ItemId, mass: f32, temperature: f32, velocity: Vec2 },
}

#[derive(Debug, Clone)]
struct Room {
    id: RegionId,
    bounds: CellBounds,
    room_type: String,
}

#[derive(Debug, Default)]
pub struct SandboxWorld {
    entities: Vec<LooseEntity>,
    rooms: Vec<Room>,
    spawned: Vec<Spawned>,
    indicators: Vec<(Cell, String)>,
    calories: Vec<(f32, String)>,
    destroyed: u32,
}

impl SandboxWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a closed room; overlapping rooms resolve to the first added
    pub fn add_room(&mut self, bounds: CellBounds, room_type: impl Into<String>) -> RegionId {
        let id = RegionId(self.rooms.len() as u32 + 1);
        self.rooms.push(Room { id, bounds, room_type: room_type.into() });
        id
    }

    pub fn add_creature(&mut self, cell: Cell, species: impl Into<SpeciesId>, age: f32, wildness: f32) -> EntityId {
        self.insert(cell, species.into(), LooseKind::Creature { age }, wildness)
    }

    pub fn add_egg(&mut self, cell: Cell, species: impl Into<SpeciesId>, incubation: f32, wildness: f32) -> EntityId {
        self.insert(cell, species.into(), LooseKind::Egg { incubation }, wildness)
    }

    fn insert(&mut self, cell: Cell, species: SpeciesId, kind: LooseKind, wildness: f32) -> EntityId {
        let id = EntityId::new();
        self.entities.push(LooseEntity { id, species, cell, kind, wildness, tags: Vec::new() });
        id
    }

    pub fn tag(&mut self, entity: EntityId, tag: EntityTag) {
        if let Some(e) = self.entities.iter_mut().find(|e| e.id == entity) {
            e.tags.push(tag);
        }
    }

    pub fn entities(&self) -> &[LooseEntity] {
        &self.entities
    }

    pub fn entity(&self, entity: EntityId) -> Option<&LooseEntity> {
        self.entities.iter().find(|e| e.id == entity)
    }

    /// Loose creatures (not eggs) of any species
    pub fn creature_count(&self) -> usize {
        self.entities.iter().filter(|e| !e.is_egg()).count()
    }

    pub fn egg_count(&self) -> usize {
        self.entities.iter().filter(|e| e.is_egg()).count()
    }

    pub fn spawned(&self) -> &[Spawned] {
        &self.spawned
    }

    pub fn indicators(&self) -> &[(Cell, String)] {
        &self.indicators
    }

    pub fn calories_reported(&self) -> f32 {
        self.calories.iter().map(|(c, _)| c).sum()
    }

    pub fn destroyed(&self) -> u32 {
        self.destroyed
    }

    fn room_at(&self, cell: Cell) -> Option<&Room> {
        self.rooms.iter().find(|r| r.bounds.contains(cell))
    }
}

impl World for SandboxWorld {
    fn region_for_cell(&self, cell: Cell) -> Option<RegionInfo> {
        self.room_at(cell).map(|room| RegionInfo { id: room.id, room_type: room.room_type.clone() })
    }

    fn creatures_in_region(&self, region: RegionId) -> Vec<SpeciesId> {
        let Some(room) = self.rooms.iter().find(|r| r.id == region) else {
            return Vec::new();
        };
        self.entities
            .iter()
            .filter(|e| !e.is_egg() && !e.tags.contains(&EntityTag::Dead) && room.bounds.contains(e.cell))
            .map(|e| e.species.clone())
            .collect()
    }

    fn scan_region(&self, bounds: CellBounds, _layer: ScanLayer, visitor: &mut dyn FnMut(&LooseEntity)) {
        for entity in self.entities.iter().filter(|e| bounds.contains(e.cell)) {
            visitor(entity);
        }
    }

    fn destroy(&mut self, entity: EntityId) {
        let before = self.entities.len();
        self.entities.retain(|e| e.id != entity);
        if self.entities.len() < before {
            self.destroyed += 1;
        }
    }

    fn spawn_creature(&mut self, cell: Cell, species: &SpeciesId, age: f32, wildness: f32) {
        self.insert(cell, species.clone(), LooseKind::Creature { age }, wildness);
        self.spawned.push(Spawned::Creature { cell, species: species.clone(), age, wildness });
    }

    fn spawn_egg(&mut self, cell: Cell, species: &SpeciesId, incubation: f32, wildness: f32) {
        self.insert(cell, species.clone(), LooseKind::Egg { incubation }, wildness);
        self.spawned.push(Spawned::Egg { cell, species: species.clone(), incubation, wildness });
    }

    fn spawn_item(&mut self, cell: Cell, item: &ItemId, mass_scale: f32, temperature: f32) {
        self.spawned.push(Spawned::Item { cell, item: item.clone(), mass_scale, temperature });
    }

    fn spawn_gas(&mut self, cell: Cell, element: &ItemId, mass: f32, temperature: f32) {
        self.spawned.push(Spawned::Gas { cell, element: element.clone(), mass, temperature });
    }

    fn spawn_liquid(&mut self, cell: Cell, element: &ItemId, mass: f32, temperature: f32) {
        self.spawned.push(Spawned::Liquid { cell, element: element.clone(), mass, temperature });
    }

    fn spawn_solid(&mut self, cell: Cell, element: &ItemId, mass: f32, temperature: f32) {
        self.spawned.push(Spawned::Solid { cell, element: element.clone(), mass, temperature });
    }

    fn launch_item(&mut self, cell: Cell, item: &ItemId, mass: f32, temperature: f32, velocity: Vec2) {
        self.spawned.push(Spawned::Launched { cell, item: item.clone(), mass, temperature, velocity });
    }

    fn show_indicator(&mut self, cell: Cell, label: &str) {
        self.indicators.push((cell, format!("+{}", label)));
    }

    fn report_calories(&mut self, calories: f32, note: &str) {
        self.calories.push((calories, note.to_string()));
    }
}

/// Build identifier the sandbox reports until told otherwise
pub const SANDBOX_BUILD: &str = "U51-596100";

/// Creature catalog with query counters
///
/// All setters take `&self` so a test can keep populating the registry
/// while a cache or enclosure holds a shared reference to it.
#[derive(Debug)]
pub struct SandboxRegistry {
    host_build: RefCell<String>,
    lifecycles: RefCell<Vec<LifecycleDefinition>>,
    butcher: RefCell<AHashMap<SpeciesId, Vec<ButcherDrop>>>,
    diets: RefCell<AHashMap<SpeciesId, DietDefinition>>,
    phases: RefCell<AHashMap<ItemId, MatterPhase>>,
    names: RefCell<AHashMap<ItemId, String>>,
    calories: RefCell<AHashMap<ItemId, f32>>,
    shear: RefCell<AHashMap<SpeciesId, ShearDefinition>>,
    scales: RefCell<AHashMap<SpeciesId, ShearDefinition>>,
    lifecycle_queries: Counter<u32>,
    butcher_queries: Counter<u32>,
    diet_queries: Counter<u32>,
    shear_queries: Counter<u32>,
}

impl Default for SandboxRegistry {
    fn default() -> Self {
        Self {
            host_build: RefCell::new(SANDBOX_BUILD.to_string()),
            lifecycles: RefCell::default(),
            butcher: RefCell::default(),
            diets: RefCell::default(),
            phases: RefCell::default(),
            names: RefCell::default(),
            calories: RefCell::default(),
            shear: RefCell::default(),
            scales: RefCell::default(),
            lifecycle_queries: Counter::new(0),
            butcher_queries: Counter::new(0),
            diet_queries: Counter::new(0),
            shear_queries: Counter::new(0),
        }
    }
}

fn bump(counter: &Counter<u32>) {
    counter.set(counter.get() + 1);
}

impl SandboxRegistry {
    /// An empty registry, as seen before the host has loaded its assets
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.add_defaults();
        registry
    }

    /// Load the stock catalog
    ///
    /// | family    | daily output                 | secondary drop        |
    /// |-----------|------------------------------|-----------------------|
    /// | Hatch     | Carbon (solid)               | none                  |
    /// | Crab      | Sand (solid)                 | none                  |
    /// | CrabWood  | none                         | none                  |
    /// | Drecko    | Phosphorite (solid)          | BasicFabric scales    |
    /// | WoodDeer  | none                         | WoodLog when well fed |
    /// | Puft      | ContaminatedOxygen (gas)     | none                  |
    /// | Slickster | CrudeOil (liquid)            | none                  |
    /// | Pip       | PlantSeed (prefab)           | none                  |
    pub fn add_defaults(&self) {
        for (prefix, adult_name, max_age) in [
            ("Hatch", "Hatch", 100.0),
            ("Crab", "Pokeshell", 100.0),
            ("CrabWood", "Oakshell", 100.0),
            ("Drecko", "Drecko", 150.0),
            ("WoodDeer", "Flox", 100.0),
            ("Puft", "Puft", 75.0),
            ("Slickster", "Slickster", 100.0),
            ("Pip", "Pip", 100.0),
        ] {
            self.add_lifecycle(LifecycleDefinition {
                egg: StageDefinition::new(format!("{prefix}Egg"), format!("{adult_name} Egg")),
                juvenile: Some(StageDefinition::new(format!("{prefix}Baby"), format!("{adult_name}ling"))),
                adult: Some(StageDefinition::new(prefix, adult_name)),
                maturation_threshold: 5.0,
                max_age,
                incubation_rate: 0.01,
            });
        }

        self.set_butcher_drops("Hatch", vec![ButcherDrop { item: "Meat".into(), weight: 1.0 }]);
        self.set_butcher_drops("Drecko", vec![ButcherDrop { item: "Meat".into(), weight: 2.0 }]);
        self.set_butcher_drops("Crab", vec![ButcherDrop { item: "ShellfishMeat".into(), weight: 1.0 }]);
        self.set_food_calories("Meat", 1600.0);
        self.set_food_calories("ShellfishMeat", 1000.0);

        for (species, calories_per_day, product, per_calorie, phase, label) in [
            ("Hatch", 700.0, "Carbon", 0.05, Some(MatterPhase::Solid), "Coal"),
            ("Crab", 100.0, "Sand", 0.5, Some(MatterPhase::Solid), "Sand"),
            ("Drecko", 400.0, "Phosphorite", 0.01, Some(MatterPhase::Solid), "Phosphorite"),
            ("Puft", 200.0, "ContaminatedOxygen", 0.01, Some(MatterPhase::Gas), "Polluted Oxygen"),
            ("Slickster", 400.0, "CrudeOil", 0.05, Some(MatterPhase::Liquid), "Crude Oil"),
            ("Pip", 300.0, "PlantSeed", 0.01, None, "Arbor Acorn"),
        ] {
            self.set_diet(
                species,
                DietDefinition {
                    calories_per_day,
                    outputs: vec![DietOutput { product: product.into(), produced_per_calorie: per_calorie }],
                },
            );
            if let Some(phase) = phase {
                self.set_element_phase(product, phase);
            }
            self.set_display_name(product, label);
        }

        self.set_scale_growth("Drecko", ShearDefinition { item: "BasicFabric".into(), drop_mass: 2.0 });
        self.set_well_fed_shear("WoodDeer", ShearDefinition { item: "WoodLog".into(), drop_mass: 30.0 });
        self.set_scale_growth("WoodDeer", ShearDefinition { item: "DeerAntler".into(), drop_mass: 5.0 });
    }

    pub fn add_lifecycle(&self, definition: LifecycleDefinition) {
        self.lifecycles.borrow_mut().push(definition);
    }

    pub fn set_host_build(&self, build: &str) {
        *self.host_build.borrow_mut() = build.to_string();
    }

    pub fn set_butcher_drops(&self, species: impl Into<SpeciesId>, drops: Vec<ButcherDrop>) {
        self.butcher.borrow_mut().insert(species.into(), drops);
    }

    pub fn set_diet(&self, species: impl Into<SpeciesId>, diet: DietDefinition) {
        self.diets.borrow_mut().insert(species.into(), diet);
    }

    pub fn set_element_phase(&self, element: impl Into<ItemId>, phase: MatterPhase) {
        self.phases.borrow_mut().insert(element.into(), phase);
    }

    pub fn set_display_name(&self, item: impl Into<ItemId>, name: impl Into<String>) {
        self.names.borrow_mut().insert(item.into(), name.into());
    }

    pub fn set_food_calories(&self, item: impl Into<ItemId>, calories: f32) {
        self.calories.borrow_mut().insert(item.into(), calories);
    }

    pub fn set_well_fed_shear(&self, species: impl Into<SpeciesId>, drop: ShearDefinition) {
        self.shear.borrow_mut().insert(species.into(), drop);
    }

    pub fn set_scale_growth(&self, species: impl Into<SpeciesId>, drop: ShearDefinition) {
        self.scales.borrow_mut().insert(species.into(), drop);
    }

    pub fn lifecycle_queries(&self) -> u32 {
        self.lifecycle_queries.get()
    }

    pub fn butcher_queries(&self) -> u32 {
        self.butcher_queries.get()
    }

    pub fn diet_queries(&self) -> u32 {
        self.diet_queries.get()
    }

    /// Secondary-drop lookups (well-fed shear, then scale growth, count as one)
    pub fn shear_queries(&self) -> u32 {
        self.shear_queries.get()
    }
}

impl DefinitionRegistry for SandboxRegistry {
    fn host_build(&self) -> String {
        self.host_build.borrow().clone()
    }

    fn lifecycle_definitions(&self) -> Vec<LifecycleDefinition> {
        bump(&self.lifecycle_queries);
        self.lifecycles.borrow().clone()
    }

    fn butcher_drops(&self, species: &SpeciesId) -> Option<Vec<ButcherDrop>> {
        bump(&self.butcher_queries);
        self.butcher.borrow().get(species).cloned()
    }

    fn diet(&self, species: &SpeciesId) -> Option<DietDefinition> {
        bump(&self.diet_queries);
        self.diets.borrow().get(species).cloned()
    }

    fn element_phase(&self, product: &ItemId) -> Option<MatterPhase> {
        self.phases.borrow().get(product).copied()
    }

    fn display_name(&self, item: &ItemId) -> Option<String> {
        self.names.borrow().get(item).cloned()
    }

    fn food_calories(&self, item: &ItemId) -> Option<f32> {
        self.calories.borrow().get(item).copied()
    }

    fn well_fed_shear(&self, species: &SpeciesId) -> Option<ShearDefinition> {
        bump(&self.shear_queries);
        self.shear.borrow().get(species).cloned()
    }

    fn scale_growth(&self, species: &SpeciesId) -> Option<ShearDefinition> {
        self.scales.borrow().get(species).cloned()
    }
}

/// Filter widget stand-in; clones share the same accepted set
#[derive(Debug, Clone, Default)]
pub struct SharedFilter(Rc<RefCell<AHashSet<SpeciesId>>>);

impl SharedFilter {
    pub fn new<I, S>(species: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SpeciesId>,
    {
        let filter = Self::default();
        filter.set(species);
        filter
    }

    /// Replace the accepted set
    pub fn set<I, S>(&self, species: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<SpeciesId>,
    {
        *self.0.borrow_mut() = species.into_iter().map(Into::into).collect();
    }

    pub fn accept(&self, species: impl Into<SpeciesId>) {
        self.0.borrow_mut().insert(species.into());
    }

    pub fn reject(&self, species: &SpeciesId) {
        self.0.borrow_mut().remove(species);
    }
}

impl FilterSource for SharedFilter {
    fn accepted_species(&self) -> AHashSet<SpeciesId> {
        self.0.borrow().clone()
    }
}

/// Scheduler that only runs actions when the caller advances its clock
#[derive(Default)]
pub struct ManualScheduler {
    now: f32,
    queue: Vec<(f32, Box<dyn FnOnce()>)>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Advance the clock and run every action now due; returns how many ran
    pub fn advance(&mut self, secs: f32) -> usize {
        self.now += secs;
        let now = self.now;
        let (due, waiting): (Vec<_>, Vec<_>) = self.queue.drain(..).partition(|(at, _)| *at <= now);
        self.queue = waiting;
        let ran = due.len();
        for (_, action) in due {
            action();
        }
        ran
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_once(&mut self, delay_secs: f32, action: Box<dyn FnOnce()>) {
        self.queue.push((self.now + delay_secs.max(0.0), action));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rooms_resolve_regions() {
        let mut world = SandboxWorld::new();
        let id = world.add_room(CellBounds::new(0, 0, 10, 6), "creature_pen");

        let info = world.region_for_cell(Cell::new(3, 3)).unwrap();
        assert_eq!(info.id, id);
        assert_eq!(info.room_type, "creature_pen");
        assert!(world.region_for_cell(Cell::new(20, 3)).is_none());
    }

    #[test]
    fn test_creatures_in_region_skips_eggs_and_dead() {
        let mut world = SandboxWorld::new();
        let room = world.add_room(CellBounds::new(0, 0, 10, 6), "creature_pen");
        world.add_creature(Cell::new(1, 1), "Hatch", 10.0, 0.0);
        world.add_egg(Cell::new(2, 1), "HatchEgg", 10.0, 0.0);
        let dead = world.add_creature(Cell::new(3, 1), "Hatch", 10.0, 0.0);
        world.tag(dead, EntityTag::Dead);
        world.add_creature(Cell::new(30, 1), "Hatch", 10.0, 0.0);

        assert_eq!(world.creatures_in_region(room), vec![SpeciesId::new("Hatch")]);
    }

    #[test]
    fn test_spawned_creature_is_live() {
        let mut world = SandboxWorld::new();
        world.spawn_creature(Cell::new(1, 1), &"Hatch".into(), 3.0, 0.0);
        assert_eq!(world.creature_count(), 1);
        assert_eq!(world.spawned().len(), 1);
        assert_eq!(world.entities()[0].species.as_str(), "Hatch");
    }

    #[test]
    fn test_registry_counts_queries() {
        let registry = SandboxRegistry::with_defaults();
        registry.lifecycle_definitions();
        registry.diet(&"Hatch".into());
        registry.diet(&"Hatch".into());
        assert_eq!(registry.lifecycle_queries(), 1);
        assert_eq!(registry.diet_queries(), 2);
        assert_eq!(registry.host_build(), SANDBOX_BUILD);
    }

    #[test]
    fn test_scheduler_runs_after_delay() {
        let hits = Rc::new(Counter::new(0));
        let mut scheduler = ManualScheduler::new();
        let h = Rc::clone(&hits);
        scheduler.schedule_once(0.1, Box::new(move || h.set(h.get() + 1)));

        assert_eq!(scheduler.advance(0.05), 0);
        assert_eq!(scheduler.advance(0.05), 1);
        assert_eq!(hits.get(), 1);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_shared_filter_clones_share_state() {
        let filter = SharedFilter::new(["Hatch"]);
        let view = filter.clone();
        filter.accept("Crab");
        assert_eq!(view.accepted_species().len(), 2);

        filter.reject(&SpeciesId::new("Hatch"));
        assert_eq!(view.accepted_species(), AHashSet::from_iter([SpeciesId::new("Crab")]));
    }
}
