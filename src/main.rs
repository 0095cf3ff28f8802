//! Critter Ranch - sandbox driver
//!
//! Builds a pen room with a starting herd, runs fast and daily ticks against
//! the in-memory host and prints what the pen stored and produced.

use clap::Parser;
use critter_ranch::core::config::RanchConfig;
use critter_ranch::core::error::Result;
use critter_ranch::core::types::{Cell, CellBounds};
use critter_ranch::host::sandbox::{ManualScheduler, SandboxRegistry, SandboxWorld, SharedFilter, Spawned};
use critter_ranch::pen::{Enclosure, TickInput, TickOutcome};
use critter_ranch::services::RanchServices;
use critter_ranch::species::{JsonFileStore, MemoryStore, SideStore};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

/// Fast ticks delivered between two new-day notifications
const FAST_TICKS_PER_DAY: u32 = 150;

#[derive(Parser, Debug)]
#[command(name = "critter-ranch")]
#[command(about = "Run a creature pen in a sandbox world")]
struct Args {
    /// Days to simulate
    #[arg(long, default_value_t = 30)]
    days: u64,

    /// Random seed for the herd and the production rolls
    #[arg(long)]
    seed: Option<u64>,

    /// Capacity limit of the pen
    #[arg(long, default_value_t = 4)]
    capacity: u32,

    /// TOML file overriding the ranch config
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON side-store for resolved species; kept in memory when omitted
    #[arg(long)]
    cache: Option<PathBuf>,

    /// Operational uptime fraction reported to the pen
    #[arg(long, default_value_t = 1.0)]
    uptime: f32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "critter_ranch=info".into()),
        )
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);

    let config = match &args.config {
        Some(path) => RanchConfig::load_from_toml(path)?,
        None => RanchConfig::default(),
    };
    let store: Box<dyn SideStore> = match &args.cache {
        Some(path) => Box::new(JsonFileStore::new(path.clone())),
        None => Box::new(MemoryStore::new()),
    };

    let registry = Rc::new(SandboxRegistry::with_defaults());
    let mut services = RanchServices::new(config.clone(), registry, store, seed)?;

    let mut world = SandboxWorld::new();
    world.add_room(CellBounds::new(0, 0, 16, 8), config.required_room.clone());
    populate(&mut world, seed);

    let filter = SharedFilter::new(["Hatch", "HatchBaby", "Drecko", "DreckoBaby", "Crab", "CrabBaby"]);
    let pen = Rc::new(RefCell::new(Enclosure::new(Cell::new(6, 0), Box::new(filter), &config)));
    pen.borrow_mut().set_capacity_limit(args.capacity);
    pen.borrow_mut().set_operational(true);

    let mut scheduler = ManualScheduler::new();
    Enclosure::attach(&pen, &mut scheduler);
    scheduler.advance(1.0);

    let input = TickInput { uptime: args.uptime, ..Default::default() };
    tracing::info!("Critter Ranch starting: {} days, seed {}, capacity {}", args.days, seed, args.capacity);

    for day in 1..=args.days {
        for _ in 0..FAST_TICKS_PER_DAY {
            pen.borrow_mut().on_fast_tick(&mut world, &mut services, input);
        }
        pen.borrow_mut().on_new_day(day);
        if let TickOutcome::Daily(daily) = pen.borrow_mut().on_fast_tick(&mut world, &mut services, input) {
            tracing::info!(
                "Day {}: {} butchered, {} producing, {} growth bonuses",
                day,
                daily.batch.butcher.values().sum::<u32>(),
                daily.batch.daily.values().sum::<u32>(),
                daily.batch.growth_bonus.values().sum::<u32>()
            );
        }
    }

    let pen = pen.borrow();
    let summary = pen.stored_summary();
    println!("\n=== CRITTER RANCH after {} days ===", args.days);
    println!("Stored: {} animals, {} eggs", summary.animal_count, summary.egg_count);
    println!("Contents: {}", pen.describe(&services.species));
    println!("Loose in room: {} creatures, {} eggs", world.creature_count(), world.egg_count());
    print_production(&world);
    Ok(())
}

/// A mixed starting herd plus a clutch of eggs
fn populate(world: &mut SandboxWorld, seed: u64) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    for species in ["Hatch", "Hatch", "Hatch", "Drecko", "Drecko", "Crab", "Crab", "Crab"] {
        let cell = Cell::new(rng.gen_range(1..15), rng.gen_range(1..7));
        let wildness = if rng.gen_bool(0.3) { rng.gen_range(10.0..90.0) } else { 0.0 };
        world.add_creature(cell, species, rng.gen_range(2.0..60.0), wildness);
    }
    for species in ["HatchEgg", "CrabEgg"] {
        let cell = Cell::new(rng.gen_range(1..15), 1);
        world.add_egg(cell, species, rng.gen_range(0.0..80.0), 0.0);
    }
}

fn print_production(world: &SandboxWorld) {
    let mut solids = 0.0;
    let mut items = 0;
    let mut launched = 0;
    for spawned in world.spawned() {
        match spawned {
            Spawned::Solid { mass, .. } | Spawned::Gas { mass, .. } | Spawned::Liquid { mass, .. } => {
                solids += mass
            }
            Spawned::Item { .. } => items += 1,
            Spawned::Launched { .. } => launched += 1,
            Spawned::Creature { .. } | Spawned::Egg { .. } => {}
        }
    }
    println!("Produced: {:.1} kg of elements, {} items, {} secondary drops", solids, items, launched);
    println!("Calories from butchering: {:.0}", world.calories_reported());
}
