use thiserror::Error;

use crate::capture::ValidationError;

#[derive(Error, Debug)]
pub enum DeskError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("No {collection} record with id '{id}'")]
    RecordNotFound { collection: &'static str, id: String },

    #[error("Narrative service unavailable: {reason}")]
    NarrativeUnavailable { reason: String },

    #[error("Narrative request timed out after {after_ms} ms")]
    NarrativeTimeout { after_ms: u64 },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type DeskResult<T> = Result<T, DeskError>;
