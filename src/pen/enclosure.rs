//! Enclosure controller - keeps a pen room at its capacity limit
//!
//! Every fast tick the controller counts the live creatures of accepted
//! species inside the pen's room and compares that with the user's capacity
//! limit:
//! - At or above the limit, the surplus animals (and every loose egg) inside
//!   the scan window are captured into stored records
//! - Below the limit, stored animals are released back into the room
//!
//! A pending new day replaces balancing for one tick with the daily pass and
//! its production emission.

use crate::core::config::RanchConfig;
use crate::core::types::{Cell, CellBounds, SpeciesId};
use crate::host::{FilterSource, LooseEntity, LooseKind, RegionInfo, ScanLayer, Scheduler, World};
use crate::pen::record::{Stage, StoredRecord};
use crate::pen::snapshot::PenSnapshot;
use crate::production::{EmissionReport, EmissionSite};
use crate::services::RanchServices;
use crate::simulation::daily::{advance_day, ProductionBatch, HATCH_THRESHOLD};
use crate::species::SpeciesLookup;
use ahash::AHashSet;
use std::cell::RefCell;
use std::rc::Rc;

/// Delay before a freshly attached enclosure reads its filter
pub const FILTER_PRIME_DELAY_SECS: f32 = 0.1;

/// Cells the enclosure works with, all derived from its home cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PenLayout {
    /// Where the structure stands; releases and indicators appear here
    pub home: Cell,
    /// Cell above home, used to find the room
    pub cavity: Cell,
    /// Up-right of home; production lands here
    pub drop_cell: Cell,
    pub scan: CellBounds,
}

impl PenLayout {
    pub fn at(home: Cell, config: &RanchConfig) -> Self {
        let cavity = home.above();
        let half = config.scan_half_width;
        Self {
            home,
            cavity,
            drop_cell: home.up_right(),
            scan: CellBounds::new(cavity.x - half, cavity.y - 1, half * 2 + 1, config.scan_height),
        }
    }
}

/// Host state the enclosure needs on every tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickInput {
    /// Fraction of the last cycle the structure was operational
    pub uptime: f32,
    /// Ambient temperature of the structure, inherited by everything it spawns
    pub temperature: f32,
    /// Simulation speed multiplier; above 1 every other tick is skipped
    pub sim_speed: f32,
}

impl Default for TickInput {
    fn default() -> Self {
        Self { uptime: 1.0, temperature: 293.15, sim_speed: 1.0 }
    }
}

/// Which stored animals a release pass may pick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseMode {
    /// Effective species is in the accepted filter
    Normal,
    /// Effective species is not in the accepted filter
    Inverse,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BalanceReport {
    /// The pen stood in a valid room this tick
    pub in_room: bool,
    pub captured_animals: u32,
    pub captured_eggs: u32,
    pub released: u32,
    /// Released because the filter changed
    pub filter_released: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailyOutcome {
    pub batch: ProductionBatch,
    pub report: EmissionReport,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// The enclosure was cleaned up and ignores ticks
    Retired,
    Skipped,
    Daily(DailyOutcome),
    Balanced(BalanceReport),
}

/// Counts for the status line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoredSummary {
    pub animal_count: usize,
    pub egg_count: usize,
}

pub struct Enclosure {
    layout: PenLayout,
    records: Vec<StoredRecord>,
    capacity_limit: u32,
    max_capacity: u32,
    required_room: String,
    release_batch: usize,
    filter: Box<dyn FilterSource>,
    accepted: AHashSet<SpeciesId>,
    filter_dirty: bool,
    eject_pending: bool,
    day_pending: bool,
    last_cycle: Option<u64>,
    skipper: u32,
    operational: bool,
    retired: bool,
    scratch: Vec<LooseEntity>,
}

impl Enclosure {
    /// The accepted set stays empty until the filter is first read
    pub fn new(home: Cell, filter: Box<dyn FilterSource>, config: &RanchConfig) -> Self {
        Self {
            layout: PenLayout::at(home, config),
            records: Vec::new(),
            capacity_limit: config.default_capacity.min(config.max_capacity),
            max_capacity: config.max_capacity,
            required_room: config.required_room.clone(),
            release_batch: config.filter_release_batch,
            filter,
            accepted: AHashSet::new(),
            filter_dirty: false,
            eject_pending: false,
            day_pending: false,
            last_cycle: None,
            skipper: 1,
            operational: false,
            retired: false,
            scratch: Vec::new(),
        }
    }

    /// Share the enclosure with the host and schedule filter priming
    ///
    /// The scheduled action only holds a weak handle and does nothing if
    /// the enclosure has been dropped by the time it runs.
    pub fn attach(pen: &Rc<RefCell<Enclosure>>, scheduler: &mut dyn Scheduler) {
        let weak = Rc::downgrade(pen);
        scheduler.schedule_once(
            FILTER_PRIME_DELAY_SECS,
            Box::new(move || match weak.upgrade() {
                Some(pen) => pen.borrow_mut().refresh_filter(),
                None => tracing::debug!("Enclosure gone before filter priming"),
            }),
        );
    }

    pub fn layout(&self) -> &PenLayout {
        &self.layout
    }

    pub fn records(&self) -> &[StoredRecord] {
        &self.records
    }

    /// Append a record as if it had just been captured
    pub fn store_record(&mut self, record: StoredRecord) {
        self.records.push(record);
    }

    pub fn accepted_species(&self) -> &AHashSet<SpeciesId> {
        &self.accepted
    }

    pub fn capacity_limit(&self) -> u32 {
        self.capacity_limit
    }

    /// Set the user capacity limit, clamped to the configured maximum
    pub fn set_capacity_limit(&mut self, limit: u32) {
        self.capacity_limit = limit.min(self.max_capacity);
    }

    pub fn max_capacity(&self) -> u32 {
        self.max_capacity
    }

    /// Copy-settings only carries the capacity limit
    pub fn on_copy_settings_from(&mut self, other: &Enclosure) {
        self.set_capacity_limit(other.capacity_limit);
    }

    pub fn set_operational(&mut self, operational: bool) {
        self.operational = operational;
    }

    pub fn is_operational(&self) -> bool {
        self.operational
    }

    pub fn is_retired(&self) -> bool {
        self.retired
    }

    /// The filter widget changed; applied on the next fast tick
    pub fn on_filter_changed(&mut self) {
        self.filter_dirty = true;
    }

    /// Re-read the accepted species from the filter widget
    pub fn refresh_filter(&mut self) {
        self.accepted = self.filter.accepted_species();
        tracing::info!("Enclosure filter accepts {} species", self.accepted.len());
    }

    /// Latch a daily pass for the next fast tick
    ///
    /// Returns false when `cycle` was already seen.
    pub fn on_new_day(&mut self, cycle: u64) -> bool {
        if self.retired || self.last_cycle.is_some_and(|last| cycle <= last) {
            return false;
        }
        self.last_cycle = Some(cycle);
        self.day_pending = true;
        true
    }

    pub fn day_pending(&self) -> bool {
        self.day_pending
    }

    pub fn on_fast_tick(
        &mut self,
        world: &mut dyn World,
        services: &mut RanchServices,
        input: TickInput,
    ) -> TickOutcome {
        if self.retired {
            return TickOutcome::Retired;
        }

        if input.sim_speed > 1.0 {
            self.skipper += 1;
            if self.skipper % 2 == 0 {
                self.skipper = 0;
                return TickOutcome::Skipped;
            }
        }

        if self.day_pending {
            self.day_pending = false;
            return TickOutcome::Daily(self.run_daily(input, world, services));
        }

        let mut filter_released = 0;
        if self.filter_dirty {
            self.filter_dirty = false;
            self.refresh_filter();
            self.eject_pending = true;
        }
        // One batch per tick until a pass comes up short
        if self.eject_pending {
            filter_released = self.release(world, &services.species, self.release_batch, ReleaseMode::Inverse);
            if filter_released == 0 || (filter_released as usize) < self.release_batch {
                self.eject_pending = false;
            }
        }

        let mut report = self.balance(world, services);
        report.filter_released = filter_released;
        TickOutcome::Balanced(report)
    }

    /// Capture the surplus or release the shortfall
    ///
    /// A pen outside a room of the required type does nothing.
    pub fn balance(&mut self, world: &mut dyn World, services: &mut RanchServices) -> BalanceReport {
        let mut report = BalanceReport::default();
        let Some(region) = self.validated_region(world) else {
            return report;
        };
        report.in_room = true;

        let live = world
            .creatures_in_region(region.id)
            .iter()
            .filter(|species| self.accepted.contains(*species))
            .count() as i64;
        let surplus = live - i64::from(self.capacity_limit);

        if surplus >= 0 {
            let (animals, eggs) = self.capture(world, services, &region, surplus as u32);
            report.captured_animals = animals;
            report.captured_eggs = eggs;
        } else {
            report.released = self.release(world, &services.species, surplus.unsigned_abs() as usize, ReleaseMode::Normal);
        }

        if report.captured_animals + report.captured_eggs + report.released > 0 {
            tracing::debug!(
                "Pen at {:?}: {} live, limit {}, captured {} animals and {} eggs, released {}",
                self.layout.home,
                live,
                self.capacity_limit,
                report.captured_animals,
                report.captured_eggs,
                report.released
            );
        }
        report
    }

    fn validated_region(&self, world: &dyn World) -> Option<RegionInfo> {
        world
            .region_for_cell(self.layout.cavity)
            .filter(|region| region.room_type == self.required_room)
    }

    /// Store every loose egg and up to `max_animals` accepted animals
    fn capture(
        &mut self,
        world: &mut dyn World,
        services: &mut RanchServices,
        region: &RegionInfo,
        max_animals: u32,
    ) -> (u32, u32) {
        self.scratch.clear();
        let scratch = &mut self.scratch;
        world.scan_region(self.layout.scan, ScanLayer::Pickupables, &mut |entity| {
            if !entity.is_claimed() {
                scratch.push(entity.clone());
            }
        });

        let first_new = self.records.len();
        let (mut animals, mut eggs) = (0, 0);
        for entity in self.scratch.drain(..) {
            // Same room only, nothing through walls
            if world.region_for_cell(entity.cell).map(|r| r.id) != Some(region.id) {
                continue;
            }
            let record = match entity.kind {
                LooseKind::Egg { incubation } => {
                    eggs += 1;
                    StoredRecord::egg(entity.species, incubation)
                }
                LooseKind::Creature { age } => {
                    if animals >= max_animals || !self.accepted.contains(&entity.species) {
                        continue;
                    }
                    animals += 1;
                    StoredRecord::animal(entity.species, age)
                }
            };
            self.records.push(record.with_wildness(entity.wildness));
            world.destroy(entity.id);
        }

        if self.records.len() > first_new {
            let registry = services.registry.as_ref();
            services
                .species
                .warm(registry, self.records[first_new..].iter().map(|r| &r.base_species));
        }
        (animals, eggs)
    }

    /// Release up to `count` stored animals, newest first
    ///
    /// Eggs and records already pending deletion are never picked. Picked
    /// records are spawned at the home cell and purged in one pass.
    pub fn release(
        &mut self,
        world: &mut dyn World,
        lookup: &dyn SpeciesLookup,
        count: usize,
        mode: ReleaseMode,
    ) -> u32 {
        if count == 0 || self.records.is_empty() {
            return 0;
        }

        let mut released = 0;
        for record in self.records.iter_mut().rev() {
            if released >= count {
                break;
            }
            let Stage::Animal { age } = record.stage else {
                continue;
            };
            if !record.is_live() {
                continue;
            }
            let species = record.effective_species(lookup);
            let in_filter = self.accepted.contains(&species);
            let wanted = match mode {
                ReleaseMode::Normal => in_filter,
                ReleaseMode::Inverse => !in_filter,
            };
            if !wanted {
                continue;
            }
            world.spawn_creature(self.layout.home, &species, age, record.wildness.unwrap_or(0.0));
            record.pending_delete = true;
            released += 1;
        }

        self.records.retain(|r| !r.pending_delete);
        released as u32
    }

    /// Age the stored records by one day and emit their production
    pub fn run_daily(
        &mut self,
        input: TickInput,
        world: &mut dyn World,
        services: &mut RanchServices,
    ) -> DailyOutcome {
        let registry = services.registry.as_ref();
        services
            .species
            .warm(registry, self.records.iter().map(|r| &r.base_species));

        let bonus = services.config.incubation_bonus(input.uptime);
        let batch = advance_day(&mut self.records, &services.species, services.emitter.bonuses(), bonus);

        let site = EmissionSite {
            drop_cell: self.layout.drop_cell,
            indicator_cell: self.layout.home,
            temperature: input.temperature,
        };
        let report = services
            .emitter
            .emit(&batch, site, input.uptime, world, registry, &services.species);

        tracing::info!(
            "Daily pass at {:?}: {} records kept, {} loot, {} outputs",
            self.layout.home,
            self.records.len(),
            report.loot_spawned,
            report.outputs_spawned
        );
        DailyOutcome { batch, report }
    }

    /// Return everything stored to the world and retire the enclosure
    pub fn on_cleanup(&mut self, world: &mut dyn World, lookup: &dyn SpeciesLookup) -> usize {
        let home = self.layout.home;
        let mut spawned = 0;
        for record in self.records.iter().filter(|r| r.is_live()) {
            let wildness = record.wildness.unwrap_or(0.0);
            match record.stage {
                Stage::Animal { age } => {
                    world.spawn_creature(home, &record.effective_species(lookup), age, wildness)
                }
                Stage::Egg { incubation } => world.spawn_egg(
                    home,
                    &record.base_species,
                    incubation.min(HATCH_THRESHOLD),
                    wildness,
                ),
            }
            spawned += 1;
        }
        self.records.clear();
        self.retired = true;
        tracing::info!("Enclosure at {:?} cleaned up, released {} records", home, spawned);
        spawned
    }

    pub fn stored_summary(&self) -> StoredSummary {
        let live = self.records.iter().filter(|r| r.is_live());
        let (animals, eggs): (Vec<_>, Vec<_>) = live.partition(|r| r.is_animal());
        StoredSummary { animal_count: animals.len(), egg_count: eggs.len() }
    }

    /// "Name: count" per effective species, in order of first appearance
    pub fn describe(&self, lookup: &dyn SpeciesLookup) -> String {
        let mut counts: Vec<(SpeciesId, usize)> = Vec::new();
        for record in self.records.iter().filter(|r| r.is_live()) {
            let species = record.effective_species(lookup);
            match counts.iter_mut().find(|(s, _)| *s == species) {
                Some((_, n)) => *n += 1,
                None => counts.push((species, 1)),
            }
        }
        counts
            .iter()
            .map(|(species, n)| format!("{}: {}", lookup.display_name(species), n))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn snapshot(&self) -> PenSnapshot {
        PenSnapshot {
            records: self.records.iter().filter(|r| r.is_live()).cloned().collect(),
            capacity_limit: self.capacity_limit,
        }
    }

    /// Replace the stored state with a snapshot
    ///
    /// Records that were pending removal when saved stay gone.
    pub fn restore(&mut self, snapshot: PenSnapshot, services: &mut RanchServices) {
        self.set_capacity_limit(snapshot.capacity_limit);
        self.records = snapshot.records.into_iter().filter(StoredRecord::is_live).collect();
        let registry = services.registry.as_ref();
        services
            .species
            .warm(registry, self.records.iter().map(|r| &r.base_species));
        tracing::info!("Restored {} stored records", self.records.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::sandbox::{SandboxRegistry, SandboxWorld, SharedFilter, Spawned};
    use crate::species::MemoryStore;

    const PEN: &str = "creature_pen";

    fn services() -> RanchServices {
        RanchServices::new(
            RanchConfig::default(),
            Rc::new(SandboxRegistry::with_defaults()),
            Box::new(MemoryStore::new()),
            3,
        )
        .unwrap()
    }

    /// Pen at (5, 0) inside a 12x6 room
    fn setup(accepted: &[&str]) -> (SandboxWorld, Enclosure, SharedFilter) {
        let mut world = SandboxWorld::new();
        world.add_room(CellBounds::new(0, 0, 12, 6), PEN);
        let filter = SharedFilter::new(accepted.iter().copied());
        let mut pen = Enclosure::new(Cell::new(5, 0), Box::new(filter.clone()), &RanchConfig::default());
        pen.refresh_filter();
        (world, pen, filter)
    }

    #[test]
    fn test_layout_matches_scan_window() {
        let layout = PenLayout::at(Cell::new(10, 10), &RanchConfig::default());
        assert_eq!(layout.cavity, Cell::new(10, 11));
        assert_eq!(layout.drop_cell, Cell::new(11, 11));
        assert_eq!(layout.scan, CellBounds::new(6, 10, 9, 8));
    }

    #[test]
    fn test_capacity_is_clamped() {
        let (_, mut pen, _) = setup(&[]);
        assert_eq!(pen.capacity_limit(), 20);
        pen.set_capacity_limit(500);
        assert_eq!(pen.capacity_limit(), pen.max_capacity());
        pen.set_capacity_limit(0);
        assert_eq!(pen.capacity_limit(), 0);
    }

    #[test]
    fn test_captures_only_the_surplus() {
        let (mut world, mut pen, _) = setup(&["Hatch"]);
        let mut services = services();
        pen.set_capacity_limit(2);
        let ids: Vec<_> = (2..5)
            .map(|x| world.add_creature(Cell::new(x, 1), "Hatch", 20.0, 0.0))
            .collect();

        let report = pen.balance(&mut world, &mut services);
        assert!(report.in_room);
        assert_eq!(report.captured_animals, 1);
        assert_eq!(pen.records().len(), 1);
        assert_eq!(world.creature_count(), 2);
        assert_eq!(world.destroyed(), 1);
        assert_eq!(ids.iter().filter(|id| world.entity(**id).is_none()).count(), 1);
    }

    #[test]
    fn test_eggs_always_captured() {
        let (mut world, mut pen, _) = setup(&["Hatch"]);
        let mut services = services();
        world.add_creature(Cell::new(2, 1), "Hatch", 20.0, 0.0);
        world.add_egg(Cell::new(3, 1), "CrabEgg", 40.0, 12.0);
        pen.set_capacity_limit(1);

        let report = pen.balance(&mut world, &mut services);
        assert_eq!(report.captured_eggs, 1);
        assert_eq!(report.captured_animals, 0);
        let egg = &pen.records()[0];
        assert_eq!(egg.incubation(), Some(40.0));
        assert_eq!(egg.wildness, Some(12.0));
    }

    #[test]
    fn test_unaccepted_and_claimed_entities_ignored() {
        let (mut world, mut pen, _) = setup(&["Hatch"]);
        let mut services = services();
        pen.set_capacity_limit(0);
        world.add_creature(Cell::new(2, 1), "Crab", 20.0, 0.0);
        let bagged = world.add_creature(Cell::new(3, 1), "Hatch", 20.0, 0.0);
        world.tag(bagged, crate::host::EntityTag::Bagged);

        let report = pen.balance(&mut world, &mut services);
        assert_eq!(report.captured_animals, 0);
        assert!(pen.records().is_empty());
    }

    #[test]
    fn test_no_capture_through_walls() {
        let (mut world, mut pen, _) = setup(&["Hatch"]);
        let mut services = services();
        world.add_room(CellBounds::new(0, 6, 12, 6), "barracks");
        pen.set_capacity_limit(0);
        world.add_creature(Cell::new(5, 7), "Hatch", 20.0, 0.0);

        pen.balance(&mut world, &mut services);
        assert!(pen.records().is_empty());
    }

    #[test]
    fn test_wrong_room_type_is_noop() {
        let mut world = SandboxWorld::new();
        world.add_room(CellBounds::new(0, 0, 12, 6), "barracks");
        let filter = SharedFilter::new(["Hatch"]);
        let mut pen = Enclosure::new(Cell::new(5, 0), Box::new(filter), &RanchConfig::default());
        pen.refresh_filter();
        pen.set_capacity_limit(0);
        world.add_creature(Cell::new(5, 1), "Hatch", 20.0, 0.0);

        let report = pen.balance(&mut world, &mut services());
        assert!(!report.in_room);
        assert_eq!(world.creature_count(), 1);
    }

    #[test]
    fn test_release_fills_shortfall() {
        let (mut world, mut pen, _) = setup(&["Hatch"]);
        let mut services = services();
        pen.set_capacity_limit(2);
        pen.store_record(StoredRecord::animal("Hatch", 10.0));
        pen.store_record(StoredRecord::egg("HatchEgg", 10.0));
        pen.store_record(StoredRecord::animal("Hatch", 12.0).with_wildness(5.0));

        let report = pen.balance(&mut world, &mut services);
        assert_eq!(report.released, 2);
        assert_eq!(pen.stored_summary(), StoredSummary { animal_count: 0, egg_count: 1 });
        assert_eq!(
            world.spawned()[0],
            Spawned::Creature { cell: Cell::new(5, 0), species: "Hatch".into(), age: 12.0, wildness: 5.0 }
        );

        // Balanced now
        let again = pen.balance(&mut world, &mut services);
        assert_eq!(again, BalanceReport { in_room: true, ..Default::default() });
    }

    #[test]
    fn test_release_modes_follow_filter() {
        for (mode, expected) in [(ReleaseMode::Normal, "Hatch"), (ReleaseMode::Inverse, "Crab")] {
            let (mut world, mut pen, _) = setup(&["Hatch"]);
            let services = services();
            pen.store_record(StoredRecord::animal("Hatch", 5.0));
            pen.store_record(StoredRecord::animal("Crab", 2.0));

            assert_eq!(pen.release(&mut world, &services.species, 1, mode), 1);
            assert_eq!(pen.records().len(), 1);
            match &world.spawned()[0] {
                Spawned::Creature { species, .. } => assert_eq!(species.as_str(), expected),
                other => panic!("Expected a creature, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_filter_change_ejects_in_batches() {
        let (mut world, mut pen, filter) = setup(&["Hatch"]);
        let mut services = services();
        pen.set_capacity_limit(20);
        for _ in 0..10 {
            pen.store_record(StoredRecord::animal("Hatch", 10.0));
        }

        filter.set(["Crab"]);
        pen.on_filter_changed();
        let TickOutcome::Balanced(report) = pen.on_fast_tick(&mut world, &mut services, TickInput::default()) else {
            panic!("Expected a balancing tick");
        };
        assert_eq!(report.filter_released, 8);
        assert_eq!(pen.records().len(), 2);
        assert!(pen.accepted_species().contains(&SpeciesId::new("Crab")));

        let TickOutcome::Balanced(report) = pen.on_fast_tick(&mut world, &mut services, TickInput::default()) else {
            panic!("Expected a balancing tick");
        };
        assert_eq!(report.filter_released, 2);
        assert!(pen.records().is_empty());
    }

    #[test]
    fn test_filter_eject_drains_then_stops() {
        let (mut world, mut pen, filter) = setup(&["Hatch", "Crab"]);
        let mut services = services();
        pen.set_capacity_limit(0);
        for _ in 0..20 {
            pen.store_record(StoredRecord::animal("Hatch", 10.0));
        }
        pen.store_record(StoredRecord::animal("Crab", 10.0));

        filter.set(["Crab"]);
        pen.on_filter_changed();
        let released: Vec<u32> = (0..5)
            .map(|_| match pen.on_fast_tick(&mut world, &mut services, TickInput::default()) {
                TickOutcome::Balanced(report) => report.filter_released,
                other => panic!("Expected a balancing tick, got {:?}", other),
            })
            .collect();
        assert_eq!(released, vec![8, 8, 4, 0, 0]);
        assert_eq!(pen.records().len(), 1);
        assert_eq!(pen.records()[0].effective_species(&services.species).as_str(), "Crab");
    }

    #[test]
    fn test_skip_policy_at_high_speed() {
        let (mut world, mut pen, _) = setup(&[]);
        let mut services = services();
        let fast = TickInput { sim_speed: 3.0, ..Default::default() };

        let outcomes: Vec<bool> = (0..4)
            .map(|_| pen.on_fast_tick(&mut world, &mut services, fast) == TickOutcome::Skipped)
            .collect();
        assert_eq!(outcomes, vec![true, false, true, false]);
    }

    #[test]
    fn test_new_day_latch_ignores_repeats() {
        let (_, mut pen, _) = setup(&[]);
        assert!(pen.on_new_day(4));
        assert!(!pen.on_new_day(4));
        assert!(!pen.on_new_day(3));
        assert!(pen.on_new_day(5));
    }

    #[test]
    fn test_daily_tick_replaces_balancing() {
        let (mut world, mut pen, _) = setup(&["Hatch"]);
        let mut services = services();
        pen.set_capacity_limit(0);
        pen.store_record(StoredRecord::animal("Hatch", 10.0));
        world.add_creature(Cell::new(3, 1), "Hatch", 20.0, 0.0);

        pen.on_new_day(1);
        let outcome = pen.on_fast_tick(&mut world, &mut services, TickInput::default());
        let TickOutcome::Daily(daily) = outcome else {
            panic!("Expected the daily pass");
        };
        assert_eq!(daily.batch.daily_count(&"Hatch".into()), 1);
        assert_eq!(pen.records()[0].age(), Some(11.0));
        // The loose hatch was not captured on the daily tick
        assert_eq!(world.creature_count(), 1);
        assert!(!pen.day_pending());
    }

    #[test]
    fn test_cleanup_releases_everything_once() {
        let (mut world, mut pen, _) = setup(&[]);
        let services = services();
        pen.store_record(StoredRecord::animal("Hatch", 10.0));
        pen.store_record(StoredRecord::egg("HatchEgg", 130.0));
        let mut gone = StoredRecord::animal("Hatch", 3.0);
        gone.pending_delete = true;
        pen.store_record(gone);

        assert_eq!(pen.on_cleanup(&mut world, &services.species), 2);
        assert!(pen.records().is_empty());
        assert!(pen.is_retired());
        assert!(world.spawned().iter().any(|s| matches!(s, Spawned::Egg { incubation, .. } if *incubation == 100.0)));
    }

    #[test]
    fn test_copy_settings_copies_capacity_only() {
        let (_, mut source, _) = setup(&["Hatch"]);
        let (_, mut target, _) = setup(&[]);
        source.set_capacity_limit(7);
        source.store_record(StoredRecord::animal("Hatch", 1.0));

        target.on_copy_settings_from(&source);
        assert_eq!(target.capacity_limit(), 7);
        assert!(target.records().is_empty());
        assert!(target.accepted_species().is_empty());
    }

    #[test]
    fn test_describe_groups_by_effective_species() {
        let (_, mut pen, _) = setup(&[]);
        let mut services = services();
        let registry = services.registry.clone();
        services.species.resolve(registry.as_ref(), &"Hatch".into());

        pen.store_record(StoredRecord::animal("HatchEgg", 10.0));
        pen.store_record(StoredRecord::animal("Hatch", 2.0));
        pen.store_record(StoredRecord::animal("HatchBaby", 20.0));
        pen.store_record(StoredRecord::egg("HatchEgg", 5.0));

        assert_eq!(pen.describe(&services.species), "Hatch: 2, Hatchling: 1, Hatch Egg: 1");
    }
}
