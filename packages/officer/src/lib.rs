#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Officer roster management.
//!
//! [`OfficerManager`] owns every officer, tracks head counts per role and the
//! number of outstanding tasks, and reads and writes `officers.json`.

use std::path::Path;

use lems_officer_models::{Officer, OfficerDocument, OfficerRole, OfficerRow};
use lems_record_store::{
    FieldPatch, KindCounts, Record, RecordError, RecordId, RecordManager, Tally, legacy, persist,
};

pub use lems_officer_models as models;

/// Running aggregates over the roster.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OfficerStatistics {
    /// Officer counts by role.
    pub by_kind: KindCounts,
    /// Outstanding tasks across all officers.
    pub open_tasks: usize,
}

impl Tally<Officer> for OfficerStatistics {
    fn absorb(&mut self, officer: &Officer) {
        self.by_kind.increment(officer.kind());
        self.open_tasks += officer.tasks.len();
    }

    fn retract(&mut self, officer: &Officer) {
        self.by_kind.decrement(officer.kind());
        self.open_tasks -= officer.tasks.len();
    }
}

/// What other families get to see of an officer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfficerRef {
    /// Officer id.
    pub id: RecordId,
    /// Full name.
    pub name: String,
    /// Role literal.
    pub kind: String,
    /// `true` for head constables.
    pub is_head_constable: bool,
}

/// Read-only officer directory handed to families that reference officers.
pub trait OfficerLookup {
    /// Summarises officer `id`, or `None` if no such officer exists.
    fn officer_ref(&self, id: RecordId) -> Option<OfficerRef>;

    /// Returns `true` if officer `id` exists.
    fn has_officer(&self, id: RecordId) -> bool {
        self.officer_ref(id).is_some()
    }
}

impl OfficerLookup for OfficerManager {
    fn officer_ref(&self, id: RecordId) -> Option<OfficerRef> {
        self.officers.get(id).map(|officer| OfficerRef {
            id: officer.id,
            name: officer.name.clone(),
            kind: officer.kind().to_string(),
            is_head_constable: officer.is_head_constable(),
        })
    }

    fn has_officer(&self, id: RecordId) -> bool {
        self.officers.get(id).is_some()
    }
}

/// Owns every officer.
#[derive(Debug, Clone, Default)]
pub struct OfficerManager {
    officers: RecordManager<Officer, OfficerStatistics>,
}

impl OfficerManager {
    /// Creates an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a fully built officer.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::DuplicateId`] if the id is taken.
    pub fn add(&mut self, officer: Officer) -> Result<RecordId, RecordError> {
        let id = self.officers.insert(officer)?;
        log::debug!("Added officer {id}");
        Ok(id)
    }

    /// Builds an officer in role `kind` and applies `fields` before
    /// inserting it. Nothing is inserted if any field fails to apply.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidField`] for a bad field or
    /// [`RecordError::DuplicateId`] if the id is taken.
    pub fn add_from_fields(
        &mut self,
        kind: &str,
        id: Option<RecordId>,
        name: &str,
        fields: &[(&str, &str)],
    ) -> Result<RecordId, RecordError> {
        let id = id.unwrap_or_else(|| self.officers.next_id());
        let mut officer = Officer::from_kind(kind, id, name.trim());
        for (field, value) in fields {
            officer.set_field(field, value)?;
        }
        self.add(officer)
    }

    /// The id the next auto-numbered officer will get.
    #[must_use]
    pub const fn next_id(&self) -> RecordId {
        self.officers.next_id()
    }

    /// Looks up an officer.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotFound`] if absent.
    pub fn find(&self, id: RecordId) -> Result<&Officer, RecordError> {
        self.officers.find(id)
    }

    /// Looks up an officer, reporting absence as `None`.
    #[must_use]
    pub fn get(&self, id: RecordId) -> Option<&Officer> {
        self.officers.get(id)
    }

    /// Returns `true` if an officer has this id.
    #[must_use]
    pub fn contains(&self, id: RecordId) -> bool {
        self.officers.get(id).is_some()
    }

    /// All officers in insertion order.
    pub fn list(&self) -> impl ExactSizeIterator<Item = &Officer> + '_ {
        self.officers.list()
    }

    /// All officers, most senior role first, ties in insertion order.
    #[must_use]
    pub fn list_by_seniority(&self) -> Vec<&Officer> {
        let mut sorted: Vec<&Officer> = self.officers.list().collect();
        sorted.sort_by_key(|o| std::cmp::Reverse(o.role.seniority()));
        sorted
    }

    /// Officers matching an arbitrary predicate.
    pub fn filter<P>(&self, predicate: P) -> Vec<&Officer>
    where
        P: FnMut(&Officer) -> bool,
    {
        self.officers.filter(predicate)
    }

    /// Officers holding one role.
    #[must_use]
    pub fn of_kind(&self, kind: &str) -> Vec<&Officer> {
        self.officers.filter_by_kind(kind)
    }

    /// Officers whose name contains `needle`, ignoring case.
    #[must_use]
    pub fn search_by_name(&self, needle: &str) -> Vec<&Officer> {
        let needle = needle.trim().to_lowercase();
        self.officers
            .filter(|o| o.name.to_lowercase().contains(&needle))
    }

    /// Sets one officer field from text input.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotFound`] or [`RecordError::InvalidField`].
    pub fn update(
        &mut self,
        id: RecordId,
        field: &str,
        value: &str,
    ) -> Result<&Officer, RecordError> {
        self.officers.update(id, |o| o.set_field(field, value))
    }

    /// Appends a task to an officer's list.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotFound`] if the officer is absent or
    /// [`RecordError::InvalidField`] if the task is blank.
    pub fn assign_task(&mut self, id: RecordId, task: &str) -> Result<&Officer, RecordError> {
        let task = task.trim();
        if task.is_empty() {
            return Err(RecordError::invalid_field("task", "must not be empty"));
        }
        let officer = self.officers.update(id, |o: &mut Officer| -> Result<(), RecordError> {
            o.tasks.push(task.to_string());
            Ok(())
        })?;
        log::debug!("Assigned task to officer {id}");
        Ok(officer)
    }

    /// Removes the task at 1-based `position` and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotFound`] if the officer is absent or
    /// [`RecordError::InvalidField`] if there is no task at `position`.
    pub fn complete_task(&mut self, id: RecordId, position: usize) -> Result<String, RecordError> {
        let mut completed = String::new();
        self.officers.update(id, |o: &mut Officer| {
            if position == 0 || position > o.tasks.len() {
                return Err(RecordError::invalid_field(
                    "task",
                    format!("no task number {position}"),
                ));
            }
            completed = o.tasks.remove(position - 1);
            Ok(())
        })?;
        log::debug!("Officer {id} completed task {position}");
        Ok(completed)
    }

    /// Deletes an officer. Records elsewhere that reference this officer
    /// keep the dangling id.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotFound`] if absent.
    pub fn delete(&mut self, id: RecordId) -> Result<Officer, RecordError> {
        let officer = self.officers.delete(id)?;
        log::debug!("Deleted officer {id}");
        Ok(officer)
    }

    /// Number of officers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.officers.len()
    }

    /// Returns `true` if the roster is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.officers.is_empty()
    }

    /// Maintained roster statistics.
    #[must_use]
    pub const fn statistics(&self) -> &OfficerStatistics {
        self.officers.statistics()
    }

    /// Roster statistics rebuilt from the current officers.
    #[must_use]
    pub fn recompute_statistics(&self) -> OfficerStatistics {
        self.officers.recompute_statistics()
    }

    /// Writes every officer to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Io`] or [`RecordError::Json`] on failure.
    pub fn save(&self, path: &Path) -> Result<(), RecordError> {
        let document = OfficerDocument {
            officers: self.officers.list().map(OfficerRow::from).collect(),
        };
        persist::save_document(path, &document)?;
        log::info!("Saved {} officer(s) to {}", self.len(), path.display());
        Ok(())
    }

    /// Replaces the roster with the contents of `path`.
    ///
    /// A missing file yields an empty roster. Returns the number of officers
    /// loaded.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::MalformedInput`] if the file is unreadable,
    /// malformed, or repeats an id; the roster is left empty.
    pub fn load(&mut self, path: &Path) -> Result<usize, RecordError> {
        self.clear();
        let Some(document) = persist::load_document::<OfficerDocument>(path)? else {
            return Ok(0);
        };

        match self
            .officers
            .replace_all(document.officers.into_iter().map(Officer::from))
        {
            Ok(count) => {
                log::info!("Loaded {count} officer(s) from {}", path.display());
                Ok(count)
            }
            Err(e) => {
                self.clear();
                Err(RecordError::malformed(path, e.to_string()))
            }
        }
    }

    /// Imports officers from a legacy `id,name,role` text file.
    ///
    /// Names may contain commas. Lines with a bad id, no name, or an id
    /// already present are skipped with a warning. Returns the number of
    /// officers imported.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::MalformedInput`] if the file cannot be opened.
    pub fn import_legacy(&mut self, path: &Path) -> Result<usize, RecordError> {
        let mut imported = 0;
        for row in legacy::read_rows(path)? {
            let Ok(id) = row.field(0).parse::<RecordId>() else {
                log::warn!("{}:{}: invalid officer id", path.display(), row.line);
                continue;
            };
            let name = row.middle();
            if name.trim().is_empty() {
                log::warn!("{}:{}: officer has no name", path.display(), row.line);
                continue;
            }
            let role = OfficerRole::from_literal(row.fields.last().map_or("", String::as_str));

            match self.add(Officer::new(id, name.trim(), role)) {
                Ok(_) => imported += 1,
                Err(e) => log::warn!("{}:{}: {e}", path.display(), row.line),
            }
        }
        Ok(imported)
    }

    /// Removes every officer.
    pub fn clear(&mut self) {
        self.officers.clear();
    }
}

#[cfg(test)]
mod tests {
    use lems_officer_models::{CONSTABLE, HEAD_CONSTABLE, INSPECTOR, SHO};

    use super::*;

    fn roster() -> OfficerManager {
        let mut m = OfficerManager::new();
        m.add_from_fields(CONSTABLE, Some(1), "Bilal Ahmed", &[("beat", "Old Town")])
            .unwrap();
        m.add_from_fields(SHO, Some(2), "Ali Khan", &[("station", "Central")])
            .unwrap();
        m.add_from_fields(HEAD_CONSTABLE, Some(3), "Sara Malik", &[("squadSize", "5")])
            .unwrap();
        m
    }

    #[test]
    fn counts_roles() {
        let m = roster();
        assert_eq!(m.statistics().by_kind.get(SHO), 1);
        assert_eq!(m.statistics().by_kind.total(), 3);
        assert_eq!(m.of_kind(CONSTABLE).len(), 1);
    }

    #[test]
    fn seniority_listing_is_stable() {
        let mut m = roster();
        m.add_from_fields(CONSTABLE, Some(4), "Zain", &[]).unwrap();
        let ids: Vec<_> = m.list_by_seniority().iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![2, 3, 1, 4]);
    }

    #[test]
    fn tasks_feed_open_task_count() {
        let mut m = roster();
        m.assign_task(1, "Night patrol").unwrap();
        m.assign_task(1, "File report").unwrap();
        m.assign_task(2, "Review cases").unwrap();
        assert_eq!(m.statistics().open_tasks, 3);

        let done = m.complete_task(1, 1).unwrap();
        assert_eq!(done, "Night patrol");
        assert_eq!(m.find(1).unwrap().tasks, vec!["File report"]);
        assert_eq!(m.statistics().open_tasks, 2);
        assert_eq!(*m.statistics(), m.recompute_statistics());
    }

    #[test]
    fn bad_task_operations_change_nothing() {
        let mut m = roster();
        m.assign_task(1, "Night patrol").unwrap();

        assert!(m.assign_task(1, "   ").is_err());
        assert!(m.complete_task(1, 0).is_err());
        assert!(m.complete_task(1, 2).is_err());
        assert!(m.complete_task(9, 1).unwrap_err().is_not_found());
        assert_eq!(m.statistics().open_tasks, 1);
    }

    #[test]
    fn update_changes_rank_and_role_fields() {
        let mut m = roster();
        m.update(2, "rank", "Senior SHO").unwrap();
        m.update(2, "station", "North").unwrap();
        let officer = m.find(2).unwrap();
        assert_eq!(officer.rank, "Senior SHO");
        assert_eq!(
            officer.role,
            OfficerRole::Sho {
                station: "North".to_string()
            }
        );
        assert!(m.update(2, "beat", "x").is_err());
    }

    #[test]
    fn search_ignores_case() {
        let m = roster();
        let found = m.search_by_name("khan");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 2);
    }

    #[test]
    fn delete_updates_statistics() {
        let mut m = roster();
        m.assign_task(3, "Briefing").unwrap();
        m.delete(3).unwrap();
        assert_eq!(m.statistics().by_kind.get(HEAD_CONSTABLE), 0);
        assert_eq!(m.statistics().open_tasks, 0);
        assert!(!m.contains(3));
    }

    #[test]
    fn lookup_flags_head_constables() {
        let m = roster();
        assert!(m.officer_ref(3).unwrap().is_head_constable);
        assert!(!m.officer_ref(1).unwrap().is_head_constable);
        assert_eq!(m.officer_ref(2).unwrap().name, "Ali Khan");
        assert!(!m.has_officer(42));
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("officers.json");

        let mut m = roster();
        m.add_from_fields(INSPECTOR, None, "Omar", &[("division", "Homicide")])
            .unwrap();
        m.add_from_fields("Cadet", None, "Hina", &[]).unwrap();
        m.assign_task(4, "Interview witness").unwrap();
        m.save(&path).unwrap();

        let mut loaded = OfficerManager::new();
        assert_eq!(loaded.load(&path).unwrap(), 5);
        let original: Vec<_> = m.list().cloned().collect();
        let restored: Vec<_> = loaded.list().cloned().collect();
        assert_eq!(original, restored);
        assert_eq!(*loaded.statistics(), *m.statistics());
        assert_eq!(loaded.next_id(), 6);
    }

    #[test]
    fn duplicate_ids_in_file_are_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("officers.json");
        std::fs::write(
            &path,
            r#"{"officers": [{"id": 1, "kind": "SHO", "name": "A"}, {"id": 1, "kind": "SHO", "name": "B"}]}"#,
        )
        .unwrap();

        let mut m = roster();
        let err = m.load(&path).unwrap_err();
        assert!(matches!(err, RecordError::MalformedInput { .. }));
        assert!(m.is_empty());
    }

    #[test]
    fn legacy_import_keeps_commas_in_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("officers.txt");
        std::fs::write(
            &path,
            "1,Ali Khan,SHO\n2,Smith, John,Constable\n3,,Inspector\nabc,Nobody,SHO\n1,Again,SHO\n",
        )
        .unwrap();

        let mut m = OfficerManager::new();
        assert_eq!(m.import_legacy(&path).unwrap(), 2);
        assert_eq!(m.find(2).unwrap().name, "Smith,John");
        assert_eq!(m.find(2).unwrap().kind(), CONSTABLE);
        assert_eq!(m.find(1).unwrap().rank, "Station House Officer");
    }
}
