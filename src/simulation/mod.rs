//! Day-by-day lifecycle simulation of stored records

pub mod daily;

pub use daily::{advance_day, ProductionBatch, HATCH_THRESHOLD};
