//! Interfaces the ranch consumes from its host world
//!
//! The ranch never owns the world. Spatial queries, containment regions,
//! spawning, the species definition registry, the filter widget and the
//! scheduler are all provided by the host through these traits. The
//! `sandbox` module implements every one of them in memory for tests and the
//! demo binary.

pub mod sandbox;

use crate::core::types::{Cell, CellBounds, EntityId, ItemId, MatterPhase, RegionId, SpeciesId};
use ahash::AHashSet;
use glam::Vec2;

/// A validated containment region and the room type it forms
#[derive(Debug, Clone, PartialEq)]
pub struct RegionInfo {
    pub id: RegionId,
    pub room_type: String,
}

/// Markers other systems put on loose entities
///
/// Any of these makes an entity ineligible for capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityTag {
    Stored,
    Reserved,
    Trapped,
    Dead,
    Bagged,
    Dying,
}

/// What a loose entity currently is
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LooseKind {
    Egg { incubation: f32 },
    Creature { age: f32 },
}

/// A pickupable entity visited by the spatial scan
#[derive(Debug, Clone, PartialEq)]
pub struct LooseEntity {
    pub id: EntityId,
    pub species: SpeciesId,
    pub cell: Cell,
    pub kind: LooseKind,
    /// Zero means tame
    pub wildness: f32,
    pub tags: Vec<EntityTag>,
}

impl LooseEntity {
    pub fn is_egg(&self) -> bool {
        matches!(self.kind, LooseKind::Egg { .. })
    }

    /// Reserved, claimed, trapped, dead or bagged by some other system
    pub fn is_claimed(&self) -> bool {
        !self.tags.is_empty()
    }
}

/// Spatial partition layer to scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanLayer {
    Pickupables,
}

/// Live world access: spatial index, containment, spawning and statistics
pub trait World {
    /// Containment region for a cell, if the cell is inside a closed room
    fn region_for_cell(&self, cell: Cell) -> Option<RegionInfo>;

    /// Species of every live creature inside a region
    fn creatures_in_region(&self, region: RegionId) -> Vec<SpeciesId>;

    /// Visit every entity of `layer` inside `bounds`
    ///
    /// The visitor is called synchronously and must not mutate the world.
    fn scan_region(&self, bounds: CellBounds, layer: ScanLayer, visitor: &mut dyn FnMut(&LooseEntity));

    fn destroy(&mut self, entity: EntityId);

    fn spawn_creature(&mut self, cell: Cell, species: &SpeciesId, age: f32, wildness: f32);

    fn spawn_egg(&mut self, cell: Cell, species: &SpeciesId, incubation: f32, wildness: f32);

    /// Spawn a prefab instance with its default mass multiplied by `mass_scale`
    fn spawn_item(&mut self, cell: Cell, item: &ItemId, mass_scale: f32, temperature: f32);

    fn spawn_gas(&mut self, cell: Cell, element: &ItemId, mass: f32, temperature: f32);

    fn spawn_liquid(&mut self, cell: Cell, element: &ItemId, mass: f32, temperature: f32);

    fn spawn_solid(&mut self, cell: Cell, element: &ItemId, mass: f32, temperature: f32);

    /// Spawn an item with an absolute mass and throw it with `velocity`
    fn launch_item(&mut self, cell: Cell, item: &ItemId, mass: f32, temperature: f32, velocity: Vec2);

    /// Floating "+item" feedback above a cell
    fn show_indicator(&mut self, cell: Cell, label: &str);

    /// Feed the host's end-of-day statistics
    fn report_calories(&mut self, calories: f32, note: &str);
}

/// One named life stage of a species
#[derive(Debug, Clone, PartialEq)]
pub struct StageDefinition {
    pub id: SpeciesId,
    pub display_name: String,
}

impl StageDefinition {
    pub fn new(id: impl Into<SpeciesId>, display_name: impl Into<String>) -> Self {
        Self { id: id.into(), display_name: display_name.into() }
    }
}

/// Egg → juvenile → adult chain as the registry describes it
#[derive(Debug, Clone, PartialEq)]
pub struct LifecycleDefinition {
    pub egg: StageDefinition,
    pub juvenile: Option<StageDefinition>,
    pub adult: Option<StageDefinition>,
    /// Days until a juvenile counts as adult
    pub maturation_threshold: f32,
    /// Days; zero or less means the species never dies of old age
    pub max_age: f32,
    /// Fraction of incubation per second
    pub incubation_rate: f32,
}

/// One butchering loot entry
#[derive(Debug, Clone, PartialEq)]
pub struct ButcherDrop {
    pub item: ItemId,
    pub weight: f32,
}

/// What a species excretes from the calories it digests
#[derive(Debug, Clone, PartialEq)]
pub struct DietDefinition {
    /// Net calories a well-fed adult burns per day
    pub calories_per_day: f32,
    pub outputs: Vec<DietOutput>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DietOutput {
    pub product: ItemId,
    /// Kilograms produced per calorie digested
    pub produced_per_calorie: f32,
}

/// An item a species periodically sheds (scales, fur, shells)
#[derive(Debug, Clone, PartialEq)]
pub struct ShearDefinition {
    pub item: ItemId,
    pub drop_mass: f32,
}

/// Species and item definitions owned by the host's asset system
///
/// Every query except the lifecycle listing is optional; a registry that
/// knows nothing about a topic simply keeps the default `None`.
pub trait DefinitionRegistry {
    /// Build identifier of the running host, used to stamp the side-store
    fn host_build(&self) -> String;

    /// Every egg-laying species the registry currently knows about
    fn lifecycle_definitions(&self) -> Vec<LifecycleDefinition>;

    fn butcher_drops(&self, _species: &SpeciesId) -> Option<Vec<ButcherDrop>> {
        None
    }

    fn diet(&self, _species: &SpeciesId) -> Option<DietDefinition> {
        None
    }

    /// Matter phase of an element; `None` means the product is a discrete prefab
    fn element_phase(&self, _product: &ItemId) -> Option<MatterPhase> {
        None
    }

    fn display_name(&self, _item: &ItemId) -> Option<String> {
        None
    }

    /// Calories in one default-mass unit of an edible item
    fn food_calories(&self, _item: &ItemId) -> Option<f32> {
        None
    }

    fn well_fed_shear(&self, _species: &SpeciesId) -> Option<ShearDefinition> {
        None
    }

    fn scale_growth(&self, _species: &SpeciesId) -> Option<ShearDefinition> {
        None
    }
}

/// The user-facing species filter attached to an enclosure
pub trait FilterSource {
    fn accepted_species(&self) -> AHashSet<SpeciesId>;
}

/// One-off delayed actions
pub trait Scheduler {
    fn schedule_once(&mut self, delay_secs: f32, action: Box<dyn FnOnce()>);
}
