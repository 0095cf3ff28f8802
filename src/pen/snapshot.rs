//! Durable per-enclosure state

use crate::core::error::Result;
use crate::pen::record::StoredRecord;
use serde::{Deserialize, Serialize};

/// What a save keeps for one enclosure: its records and the user's limit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenSnapshot {
    pub records: Vec<StoredRecord>,
    pub capacity_limit: u32,
}

impl PenSnapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Fails on malformed JSON and on records with an invalid lifecycle
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
