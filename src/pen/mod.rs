//! Enclosures - captured creatures and eggs, and the controller that keeps
//! a pen room at its capacity limit

pub mod enclosure;
pub mod record;
pub mod snapshot;

pub use enclosure::{
    BalanceReport, DailyOutcome, Enclosure, PenLayout, ReleaseMode, StoredSummary, TickInput,
    TickOutcome,
};
pub use record::{PersistedRecord, Stage, StoredRecord};
pub use snapshot::PenSnapshot;
