//! Production - what a ranch yields each day and how it enters the world

pub mod bonus;
pub mod emitter;
pub mod recipes;

pub use bonus::{GrowthBonus, GrowthBonusTable};
pub use emitter::{EmissionReport, EmissionSite, ProductionEmitter};
pub use recipes::{EmissionPath, LootEntry, Memo, RecipeBook, YieldEntry};
