//! Species metadata - life-stage identities, maturation and ageing constants
//!
//! Entries are derived once from the host registry, memoized per process and
//! persisted to a version-stamped side-store so later sessions can skip the
//! registry sweep.

pub mod cache;
pub mod entry;
pub mod store;

pub use cache::SpeciesCache;
pub use entry::{SpeciesEntry, SpeciesLookup};
pub use store::{JsonFileStore, MemoryStore, SideStore, SpeciesDocument, StoreStamp};
