#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Generic record storage shared by every record family.
//!
//! A family (cases, officers, cells, ...) is a closed sum type implementing
//! [`Record`]. Its records live in a [`RecordStore`], an insertion-ordered
//! collection that doubles as an id index, and are mutated through a
//! [`RecordManager`] which keeps a running [`Tally`] of aggregate statistics
//! in step with every insert, update, and delete.
//!
//! The [`persist`] module reads and writes the per-family JSON documents and
//! [`legacy`] reads the older comma-delimited text files.

pub mod error;
pub mod fields;
pub mod legacy;
pub mod manager;
pub mod persist;
pub mod reference;
pub mod store;

pub use error::RecordError;
pub use manager::{KindCounts, RecordManager, Tally};
pub use reference::DanglingReference;
pub use store::RecordStore;

/// Identifier of a record, unique within its store.
pub type RecordId = i64;

/// A record belonging to one family.
///
/// The id returned by [`Record::id`] must never change once the record has
/// been created.
pub trait Record: Clone {
    /// Human-readable family name used in error messages (e.g. `"Case"`).
    const FAMILY: &'static str;

    /// Returns the record's id.
    fn id(&self) -> RecordId;

    /// Returns the kind discriminator (e.g. `"Theft"`).
    fn kind(&self) -> &str;
}

/// Records with a derived ranking score.
pub trait Prioritized {
    /// Computes the ranking score from the record's current fields.
    fn priority(&self) -> f64;
}

/// Records that accept string-typed field updates from interactive input.
pub trait FieldPatch {
    /// Parses `value` and stores it in `field`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidField`] if the field is unknown, does not
    /// apply to this record's kind, is immutable, or the value cannot be
    /// parsed. The record is left unchanged on error.
    fn set_field(&mut self, field: &str, value: &str) -> Result<(), RecordError>;
}
