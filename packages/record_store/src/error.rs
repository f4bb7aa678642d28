//! Error taxonomy shared by every record family.

use std::path::PathBuf;

use thiserror::Error;

use crate::RecordId;

/// Errors from record store operations.
///
/// Every variant leaves the store it was raised from in its prior state.
#[derive(Debug, Error)]
pub enum RecordError {
    /// An operation referenced an id absent from the store.
    #[error("{family} {id} not found")]
    NotFound {
        /// Family of the missing record.
        family: &'static str,
        /// The id that was looked up.
        id: RecordId,
    },

    /// An insert used an id that is already present.
    #[error("{family} {id} already exists")]
    DuplicateId {
        /// Family of the conflicting record.
        family: &'static str,
        /// The duplicated id.
        id: RecordId,
    },

    /// A persisted file could not be read or is missing required fields.
    #[error("Malformed input in {}: {reason}", path.display())]
    MalformedInput {
        /// File that failed to load.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },

    /// A field value could not be applied.
    #[error("Invalid value for field '{field}': {reason}")]
    InvalidField {
        /// Name of the field.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RecordError {
    /// Builds a [`RecordError::NotFound`] for the given family.
    #[must_use]
    pub const fn not_found(family: &'static str, id: RecordId) -> Self {
        Self::NotFound { family, id }
    }

    /// Builds a [`RecordError::InvalidField`].
    #[must_use]
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Builds a [`RecordError::MalformedInput`].
    #[must_use]
    pub fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Returns `true` for [`RecordError::NotFound`].
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
