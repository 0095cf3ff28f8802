//! Critter Ranch - capacity-balancing creature enclosures
//!
//! A pen keeps its room at a user-set number of live creatures by capturing
//! the surplus into compact stored records and releasing them again when
//! the room runs short. Stored records age, hatch and mature once per day,
//! and the pen emits what they produce: butcher loot, daily byproducts,
//! secondary drops and one-off growth bonuses.

pub mod core;
pub mod host;
pub mod pen;
pub mod production;
pub mod services;
pub mod simulation;
pub mod species;

pub use crate::core::{RanchConfig, RanchError, Result};
pub use crate::pen::{Enclosure, TickInput, TickOutcome};
pub use crate::services::RanchServices;
