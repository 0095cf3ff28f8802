pub mod config;
pub mod error;
pub mod types;

pub use config::RanchConfig;
pub use error::{RanchError, Result};
pub use types::{Cell, CellBounds, EntityId, ItemId, MatterPhase, RegionId, SpeciesId};
