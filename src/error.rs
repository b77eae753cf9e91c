//! Error taxonomy shared by every stage of the generator.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, KittyError>;

#[derive(Debug, Error)]
pub enum KittyError {
    #[error("Invalid length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("Invalid version: expected {expected}, got {actual}")]
    InvalidVersion { expected: u16, actual: u16 },

    #[error("Invalid size: needed {needed} bytes, {available} available")]
    InvalidSize { needed: usize, available: usize },

    #[error("{kind} already exists: {name}")]
    AlreadyExists { kind: &'static str, name: String },

    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    #[error("Attribute out of range at locus {locus}: index {index}, count {count}")]
    AttributeOutOfRange {
        locus: &'static str,
        index: u16,
        count: usize,
    },

    #[error("Layer not found: {category}/{attribute} for breed {breed}")]
    LayerNotFound {
        category: String,
        attribute: String,
        breed: String,
    },

    #[error("Invalid file name {name}: {reason}")]
    InvalidFileName { name: String, reason: String },

    #[error("Invalid UTF-8 in encoded string")]
    InvalidUtf8,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl KittyError {
    pub fn already_exists(kind: &'static str, name: impl Into<String>) -> Self {
        Self::AlreadyExists { kind, name: name.into() }
    }

    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound { kind, name: name.into() }
    }

    /// Registration conflicts are recoverable; the compiler swallows them.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }
}
