//! Weak cross-references between families.
//!
//! Records point at records in other families by id only. Nothing stops the
//! target from being deleted, so every lookup may come back empty; a
//! [`DanglingReference`] describes one such unresolved link.

use std::fmt;

use crate::RecordId;

/// A cross-reference whose target does not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    /// Family of the record holding the reference.
    pub family: &'static str,
    /// Id of the record holding the reference.
    pub id: RecordId,
    /// Field holding the reference.
    pub field: &'static str,
    /// Family the reference points into.
    pub target_family: &'static str,
    /// Id that failed to resolve.
    pub target_id: RecordId,
}

impl DanglingReference {
    /// Describes an unresolved `field` on record `id` of `family`.
    #[must_use]
    pub const fn new(
        family: &'static str,
        id: RecordId,
        field: &'static str,
        target_family: &'static str,
        target_id: RecordId,
    ) -> Self {
        Self {
            family,
            id,
            field,
            target_family,
            target_id,
        }
    }
}

impl fmt::Display for DanglingReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} has {} {} but no {} with that id exists",
            self.family, self.id, self.field, self.target_id, self.target_family
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_both_ends() {
        let r = DanglingReference::new("Evidence", 3, "caseId", "Case", 7);
        assert_eq!(
            r.to_string(),
            "Evidence 3 has caseId 7 but no Case with that id exists"
        );
    }
}
