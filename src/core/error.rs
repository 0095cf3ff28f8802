use thiserror::Error;

#[derive(Error, Debug)]
pub enum RanchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// A persisted record must carry exactly one of the Egg/Animal bits
    #[error("Invalid lifecycle flags {flags:#04x} for stored {species}")]
    InvalidLifecycle {
        species: crate::core::types::SpeciesId,
        flags: u8,
    },
}

pub type Result<T> = std::result::Result<T, RanchError>;
