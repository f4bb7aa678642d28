#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Crime case management.
//!
//! [`CrimeManager`] owns the case and location stores, keeps
//! [`CaseStatistics`] current as cases change, and reads and writes
//! `crimes.json`. Cases reference locations by id only; deleting a location
//! leaves the cases filed against it in place with a dangling reference.

use std::path::Path;

use lems_crime_models::{Case, CaseRow, CaseStatus, CrimeDocument, Location, THEFT};
use lems_record_store::{
    FieldPatch, KindCounts, Prioritized, Record, RecordError, RecordId, RecordManager, Tally,
    legacy, persist,
};

pub use lems_crime_models as models;

/// Cases at or above this priority count as high priority.
pub const HIGH_PRIORITY_THRESHOLD: f64 = 8.0;

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Running aggregates over all cases.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaseStatistics {
    /// Case counts by kind.
    pub by_kind: KindCounts,
    /// Sum of stolen value over all thefts.
    pub total_stolen_value: i128,
    /// Sum of damage value over all vandalism cases.
    pub total_damage_value: i128,
    /// Cases with priority at or above [`HIGH_PRIORITY_THRESHOLD`].
    pub high_priority: usize,
    /// Thefts whose property was recovered.
    pub recovered_thefts: usize,
    /// Cases that are not closed.
    pub open_cases: usize,
}

impl Tally<Case> for CaseStatistics {
    fn absorb(&mut self, case: &Case) {
        self.by_kind.increment(case.kind());
        self.total_stolen_value += i128::from(case.stolen_value());
        self.total_damage_value += i128::from(case.damage_value());
        if case.priority() >= HIGH_PRIORITY_THRESHOLD {
            self.high_priority += 1;
        }
        if is_recovered_theft(case) {
            self.recovered_thefts += 1;
        }
        if case.status != CaseStatus::Closed {
            self.open_cases += 1;
        }
    }

    fn retract(&mut self, case: &Case) {
        self.by_kind.decrement(case.kind());
        self.total_stolen_value -= i128::from(case.stolen_value());
        self.total_damage_value -= i128::from(case.damage_value());
        if case.priority() >= HIGH_PRIORITY_THRESHOLD {
            self.high_priority -= 1;
        }
        if is_recovered_theft(case) {
            self.recovered_thefts -= 1;
        }
        if case.status != CaseStatus::Closed {
            self.open_cases -= 1;
        }
    }
}

impl CaseStatistics {
    /// Number of thefts.
    #[must_use]
    pub fn thefts(&self) -> usize {
        self.by_kind.get(THEFT)
    }
}

const fn is_recovered_theft(case: &Case) -> bool {
    matches!(
        case.details,
        lems_crime_models::CaseDetails::Theft {
            recovered: true,
            ..
        }
    )
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// What other families get to see of a case.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseRef {
    /// Case id.
    pub id: RecordId,
    /// Kind literal.
    pub kind: String,
    /// Current status.
    pub status: CaseStatus,
    /// One-line summary.
    pub summary: String,
}

/// Read-only case directory handed to families that reference cases.
pub trait CaseLookup {
    /// Summarises case `id`, or `None` if no such case exists.
    fn case_ref(&self, id: RecordId) -> Option<CaseRef>;

    /// Returns `true` if case `id` exists.
    fn has_case(&self, id: RecordId) -> bool {
        self.case_ref(id).is_some()
    }
}

impl CaseLookup for CrimeManager {
    fn case_ref(&self, id: RecordId) -> Option<CaseRef> {
        self.cases.get(id).map(|case| CaseRef {
            id: case.id,
            kind: case.kind().to_string(),
            status: case.status,
            summary: case.summary(),
        })
    }

    fn has_case(&self, id: RecordId) -> bool {
        self.cases.get(id).is_some()
    }
}

// ---------------------------------------------------------------------------
// Manager
// ---------------------------------------------------------------------------

/// Owns every case and location.
#[derive(Debug, Clone, Default)]
pub struct CrimeManager {
    locations: RecordManager<Location>,
    cases: RecordManager<Case, CaseStatistics>,
}

impl CrimeManager {
    /// Creates an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -- Locations ----------------------------------------------------------

    /// Adds a location.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::DuplicateId`] if the id is taken.
    pub fn add_location(&mut self, location: Location) -> Result<RecordId, RecordError> {
        let id = self.locations.insert(location)?;
        log::debug!("Added location {id}");
        Ok(id)
    }

    /// The id the next auto-numbered location will get.
    #[must_use]
    pub const fn next_location_id(&self) -> RecordId {
        self.locations.next_id()
    }

    /// Looks up a location.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotFound`] if absent.
    pub fn find_location(&self, id: RecordId) -> Result<&Location, RecordError> {
        self.locations.find(id)
    }

    /// All locations in insertion order.
    pub fn locations(&self) -> impl ExactSizeIterator<Item = &Location> + '_ {
        self.locations.list()
    }

    /// Sets one location field from text input.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotFound`] or [`RecordError::InvalidField`].
    pub fn update_location(
        &mut self,
        id: RecordId,
        field: &str,
        value: &str,
    ) -> Result<&Location, RecordError> {
        self.locations.update(id, |l| l.set_field(field, value))
    }

    /// Deletes a location. Cases filed against it keep the dangling id.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotFound`] if absent.
    pub fn delete_location(&mut self, id: RecordId) -> Result<Location, RecordError> {
        self.locations.delete(id)
    }

    // -- Cases --------------------------------------------------------------

    /// Adds a fully built case.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::DuplicateId`] if the id is taken.
    pub fn add_case(&mut self, case: Case) -> Result<RecordId, RecordError> {
        let id = self.cases.insert(case)?;
        log::debug!("Added case {id}");
        Ok(id)
    }

    /// Builds a case of `kind` and applies `fields` before inserting it.
    ///
    /// `kind` is matched exactly; unknown kinds become generic cases. When
    /// `id` is `None` the next free id is used. Nothing is inserted if any
    /// field fails to apply.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidField`] for a bad field or
    /// [`RecordError::DuplicateId`] if the id is taken.
    pub fn add_case_from_fields(
        &mut self,
        kind: &str,
        id: Option<RecordId>,
        fields: &[(&str, &str)],
    ) -> Result<RecordId, RecordError> {
        let id = id.unwrap_or_else(|| self.cases.next_id());
        let mut case = Case::from_kind(kind, id);
        for (field, value) in fields {
            case.set_field(field, value)?;
        }
        self.add_case(case)
    }

    /// The id the next auto-numbered case will get.
    #[must_use]
    pub const fn next_case_id(&self) -> RecordId {
        self.cases.next_id()
    }

    /// Looks up a case.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotFound`] if absent.
    pub fn find_case(&self, id: RecordId) -> Result<&Case, RecordError> {
        self.cases.find(id)
    }

    /// Looks up a case, reporting absence as `None`.
    #[must_use]
    pub fn get_case(&self, id: RecordId) -> Option<&Case> {
        self.cases.get(id)
    }

    /// All cases in insertion order.
    pub fn cases(&self) -> impl ExactSizeIterator<Item = &Case> + '_ {
        self.cases.list()
    }

    /// All cases, highest priority first, ties in insertion order.
    #[must_use]
    pub fn cases_by_priority(&self) -> Vec<&Case> {
        self.cases.list_sorted_by_priority()
    }

    /// Cases matching an arbitrary predicate.
    pub fn filter_cases<P>(&self, predicate: P) -> Vec<&Case>
    where
        P: FnMut(&Case) -> bool,
    {
        self.cases.filter(predicate)
    }

    /// Cases of one kind.
    #[must_use]
    pub fn cases_of_kind(&self, kind: &str) -> Vec<&Case> {
        self.cases.filter_by_kind(kind)
    }

    /// Cases filed against a location.
    #[must_use]
    pub fn cases_at_location(&self, location_id: RecordId) -> Vec<&Case> {
        self.cases.filter(|c| c.location_id == Some(location_id))
    }

    /// Cases with the given status.
    #[must_use]
    pub fn cases_with_status(&self, status: CaseStatus) -> Vec<&Case> {
        self.cases.filter(|c| c.status == status)
    }

    /// Cases at or above [`HIGH_PRIORITY_THRESHOLD`], highest first.
    #[must_use]
    pub fn high_priority_cases(&self) -> Vec<&Case> {
        self.cases
            .list_sorted_by_priority()
            .into_iter()
            .filter(|c| c.priority() >= HIGH_PRIORITY_THRESHOLD)
            .collect()
    }

    /// Resolves a case's location. `None` if the case has no location or
    /// the location no longer exists.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotFound`] if the case itself is absent.
    pub fn location_of(&self, case_id: RecordId) -> Result<Option<&Location>, RecordError> {
        let case = self.cases.find(case_id)?;
        Ok(case.location_id.and_then(|id| self.locations.get(id)))
    }

    /// Sets one case field from text input.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotFound`] or [`RecordError::InvalidField`].
    pub fn update_case(
        &mut self,
        id: RecordId,
        field: &str,
        value: &str,
    ) -> Result<&Case, RecordError> {
        self.cases.update(id, |c| c.set_field(field, value))
    }

    /// Deletes a case and removes it from the statistics.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotFound`] if absent.
    pub fn delete_case(&mut self, id: RecordId) -> Result<Case, RecordError> {
        let case = self.cases.delete(id)?;
        log::debug!("Deleted case {id}");
        Ok(case)
    }

    /// Number of cases.
    #[must_use]
    pub fn case_count(&self) -> usize {
        self.cases.len()
    }

    /// Maintained case statistics.
    #[must_use]
    pub const fn statistics(&self) -> &CaseStatistics {
        self.cases.statistics()
    }

    /// Case statistics rebuilt from the current cases.
    #[must_use]
    pub fn recompute_statistics(&self) -> CaseStatistics {
        self.cases.recompute_statistics()
    }

    // -- Persistence --------------------------------------------------------

    /// Writes every location and case to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Io`] or [`RecordError::Json`] on failure.
    pub fn save(&self, path: &Path) -> Result<(), RecordError> {
        let document = CrimeDocument {
            locations: self.locations.list().cloned().collect(),
            cases: self.cases.list().map(CaseRow::from).collect(),
        };
        persist::save_document(path, &document)?;
        log::info!(
            "Saved {} case(s) and {} location(s) to {}",
            self.cases.len(),
            self.locations.len(),
            path.display()
        );
        Ok(())
    }

    /// Replaces the in-memory state with the contents of `path`.
    ///
    /// A missing file yields an empty manager. Returns the number of cases
    /// loaded.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::MalformedInput`] if the file is unreadable,
    /// malformed, or repeats an id; the manager is left empty.
    pub fn load(&mut self, path: &Path) -> Result<usize, RecordError> {
        self.clear();
        let Some(document) = persist::load_document::<CrimeDocument>(path)? else {
            return Ok(0);
        };

        let result = self
            .locations
            .replace_all(document.locations)
            .and_then(|_| {
                self.cases
                    .replace_all(document.cases.into_iter().map(Case::from))
            });

        match result {
            Ok(count) => {
                log::info!("Loaded {count} case(s) from {}", path.display());
                Ok(count)
            }
            Err(e) => {
                self.clear();
                Err(RecordError::malformed(path, e.to_string()))
            }
        }
    }

    /// Imports cases from a legacy `id,kind` text file.
    ///
    /// Lines with a bad id or an id already present are skipped with a
    /// warning. Returns the number of cases imported.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::MalformedInput`] if the file cannot be opened.
    pub fn import_legacy(&mut self, path: &Path) -> Result<usize, RecordError> {
        let mut imported = 0;
        for row in legacy::read_rows(path)? {
            let Ok(id) = row.field(0).parse::<RecordId>() else {
                log::warn!("{}:{}: invalid case id", path.display(), row.line);
                continue;
            };
            let kind = if row.fields.len() > 1 {
                row.fields[1..].join(",")
            } else {
                String::new()
            };

            match self.add_case(Case::from_kind(&kind, id)) {
                Ok(_) => imported += 1,
                Err(e) => log::warn!("{}:{}: {e}", path.display(), row.line),
            }
        }
        Ok(imported)
    }

    /// Removes every case and location.
    pub fn clear(&mut self) {
        self.locations.clear();
        self.cases.clear();
    }
}

#[cfg(test)]
mod tests {
    use lems_crime_models::{ASSAULT, CaseDetails, VANDALISM};

    use super::*;

    fn sample() -> CrimeManager {
        let mut m = CrimeManager::new();
        m.add_case_from_fields(
            THEFT,
            Some(1),
            &[("severity", "2.0"), ("stolenValue", "3000"), ("recovered", "false")],
        )
        .unwrap();
        m.add_case_from_fields(
            ASSAULT,
            Some(2),
            &[("severity", "5.0"), ("weaponUsed", "true"), ("injurySeverity", "4")],
        )
        .unwrap();
        m
    }

    #[test]
    fn priorities_rank_assault_over_theft() {
        let m = sample();
        assert!((m.find_case(1).unwrap().priority() - 5.0).abs() < 1e-9);
        assert!((m.find_case(2).unwrap().priority() - 10.0).abs() < 1e-9);

        let ids: Vec<_> = m.cases_by_priority().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(m.high_priority_cases().len(), 1);
    }

    #[test]
    fn equal_priorities_keep_insertion_order() {
        let mut m = CrimeManager::new();
        for id in [5, 3, 8] {
            m.add_case(Case::other(id, "Fraud")).unwrap();
        }
        let ids: Vec<_> = m.cases_by_priority().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![5, 3, 8]);
    }

    #[test]
    fn delete_reverses_theft_aggregates() {
        let mut m = sample();
        m.add_case_from_fields(VANDALISM, Some(3), &[("damageValue", "500")])
            .unwrap();
        assert_eq!(m.statistics().total_stolen_value, 3000);
        assert_eq!(m.statistics().thefts(), 1);

        m.delete_case(1).unwrap();

        assert_eq!(m.statistics().total_stolen_value, 0);
        assert_eq!(m.statistics().thefts(), 0);
        assert_eq!(m.statistics().by_kind.total(), 2);
        assert!(m.find_case(1).unwrap_err().is_not_found());
        assert!(m.cases().all(|c| c.id != 1));
    }

    #[test]
    fn statistics_match_recomputation_after_mixed_operations() {
        let mut m = sample();
        m.add_case_from_fields(
            VANDALISM,
            None,
            &[("damageValue", "9000"), ("isPublicProperty", "yes")],
        )
        .unwrap();
        m.update_case(1, "recovered", "true").unwrap();
        m.update_case(2, "weaponUsed", "false").unwrap();
        m.update_case(3, "status", "Closed").unwrap();
        m.add_case(Case::theft(10)).unwrap();
        m.delete_case(2).unwrap();
        m.update_case(10, "stolenValue", "12000").unwrap();

        assert_eq!(*m.statistics(), m.recompute_statistics());
        assert_eq!(m.statistics().recovered_thefts, 1);
        assert_eq!(m.statistics().total_stolen_value, 15000);
        assert_eq!(m.statistics().open_cases, 2);
    }

    #[test]
    fn add_rejects_duplicate_ids_and_keeps_state() {
        let mut m = sample();
        let before = m.statistics().clone();

        let err = m.add_case(Case::theft(1)).unwrap_err();
        assert!(matches!(err, RecordError::DuplicateId { id: 1, .. }));
        assert_eq!(m.case_count(), 2);
        assert_eq!(*m.statistics(), before);
    }

    #[test]
    fn bad_field_aborts_add() {
        let mut m = sample();
        let err = m
            .add_case_from_fields(THEFT, Some(7), &[("stolenValue", "a lot")])
            .unwrap_err();
        assert!(matches!(err, RecordError::InvalidField { .. }));
        assert!(m.get_case(7).is_none());
    }

    #[test]
    fn auto_ids_skip_past_caller_supplied_ids() {
        let mut m = sample();
        let id = m.add_case_from_fields("Fraud", None, &[]).unwrap();
        assert_eq!(id, 3);
        assert_eq!(m.find_case(3).unwrap().kind(), "Fraud");
    }

    #[test]
    fn update_missing_case_is_not_found() {
        let mut m = sample();
        assert!(m.update_case(99, "severity", "1").unwrap_err().is_not_found());
    }

    #[test]
    fn location_references_are_weak() {
        let mut m = sample();
        m.add_location(Location::new(4, "Central Market")).unwrap();
        m.update_case(1, "locationId", "4").unwrap();

        assert_eq!(m.location_of(1).unwrap().unwrap().name, "Central Market");
        assert_eq!(m.cases_at_location(4).len(), 1);

        m.delete_location(4).unwrap();
        assert!(m.location_of(1).unwrap().is_none());
        assert_eq!(m.find_case(1).unwrap().location_id, Some(4));
    }

    #[test]
    fn lookup_summarises_cases() {
        let m = sample();
        let case = m.case_ref(2).unwrap();
        assert_eq!(case.kind, ASSAULT);
        assert_eq!(case.status, CaseStatus::Open);
        assert!(m.has_case(1));
        assert!(m.case_ref(42).is_none());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crimes.json");

        let mut m = sample();
        m.add_location(Location::new(4, "Central Market")).unwrap();
        m.update_case(1, "locationId", "4").unwrap();
        m.update_case(1, "itemStolen", "Laptop").unwrap();
        m.add_case(Case::other(3, "Fraud")).unwrap();
        m.save(&path).unwrap();

        let mut loaded = CrimeManager::new();
        assert_eq!(loaded.load(&path).unwrap(), 3);

        let original: Vec<_> = m.cases().cloned().collect();
        let restored: Vec<_> = loaded.cases().cloned().collect();
        assert_eq!(original, restored);
        assert_eq!(loaded.location_of(1).unwrap().unwrap().id, 4);
        assert_eq!(*loaded.statistics(), *m.statistics());
        assert_eq!(loaded.next_case_id(), 4);
    }

    #[test]
    fn load_replaces_existing_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crimes.json");
        CrimeManager::new().save(&path).unwrap();

        let mut m = sample();
        assert_eq!(m.load(&path).unwrap(), 0);
        assert_eq!(m.case_count(), 0);
        assert_eq!(*m.statistics(), CaseStatistics::default());
    }

    #[test]
    fn malformed_file_leaves_manager_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crimes.json");
        std::fs::write(
            &path,
            r#"{"cases": [{"id": 1, "kind": "Theft"}, {"id": 1, "kind": "Assault"}]}"#,
        )
        .unwrap();

        let mut m = sample();
        let err = m.load(&path).unwrap_err();
        assert!(matches!(err, RecordError::MalformedInput { .. }));
        assert_eq!(m.case_count(), 0);

        std::fs::write(&path, r#"{"cases": [{"kind": "Theft"}]}"#).unwrap();
        assert!(m.load(&path).is_err());
        assert_eq!(m.case_count(), 0);
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut m = sample();
        assert_eq!(m.load(&dir.path().join("crimes.json")).unwrap(), 0);
        assert_eq!(m.case_count(), 0);
    }

    #[test]
    fn legacy_import_dispatches_on_kind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crimes.txt");
        std::fs::write(&path, "1,Theft\n2,Assault\nx,Theft\n1,Vandalism\n3,Cyber Crime\n").unwrap();

        let mut m = CrimeManager::new();
        assert_eq!(m.import_legacy(&path).unwrap(), 3);
        assert!(matches!(
            m.find_case(2).unwrap().details,
            CaseDetails::Assault { .. }
        ));
        assert_eq!(m.find_case(1).unwrap().kind(), THEFT);
        assert_eq!(m.find_case(3).unwrap().kind(), "Cyber Crime");
    }

    #[test]
    fn value_totals_do_not_overflow() {
        let mut m = CrimeManager::new();
        let max = i64::MAX.to_string();
        m.add_case_from_fields(THEFT, Some(1), &[("stolenValue", &max)])
            .unwrap();
        m.add_case_from_fields(THEFT, Some(2), &[("stolenValue", "1")])
            .unwrap();
        m.add_case_from_fields(VANDALISM, Some(3), &[("damageValue", &max)])
            .unwrap();
        m.add_case_from_fields(VANDALISM, Some(4), &[("damageValue", &max)])
            .unwrap();

        let stats = m.statistics();
        assert_eq!(stats.total_stolen_value, i128::from(i64::MAX) + 1);
        assert_eq!(stats.total_damage_value, 2 * i128::from(i64::MAX));
        assert_eq!(*m.statistics(), m.recompute_statistics());

        m.delete_case(1).unwrap();
        assert_eq!(m.statistics().total_stolen_value, 1);
        assert_eq!(*m.statistics(), m.recompute_statistics());
    }
}
