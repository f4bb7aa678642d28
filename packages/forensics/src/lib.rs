#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Forensic lab management.
//!
//! [`ForensicsManager`] owns the experts and the evidence log and reads and
//! writes `forensics.json`. Evidence points at cases and field agents point
//! at supervising officers by id only; those links are checked against a
//! [`CaseLookup`] or [`OfficerLookup`] passed in by the caller, never through
//! shared state.

use std::path::Path;

use lems_crime::models::Case;
use lems_crime::{CaseLookup, CaseRef};
use lems_forensics_models::{
    Evidence, EvidenceStatus, ExpertRole, ExpertRow, ForensicExpert, ForensicsDocument,
};
use lems_officer::OfficerLookup;
use lems_officer::models::Officer;
use lems_record_store::{
    DanglingReference, FieldPatch, KindCounts, Record, RecordError, RecordId, RecordManager,
    Tally, persist,
};

pub use lems_forensics_models as models;

/// Running aggregates over the evidence log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvidenceStatistics {
    /// Evidence counts by type.
    pub by_kind: KindCounts,
    /// Evidence counts by status.
    pub by_status: KindCounts,
    /// Evidence with no expert assigned.
    pub unassigned: usize,
}

impl EvidenceStatistics {
    /// Number of evidence records.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.by_kind.total()
    }

    /// Number of evidence records in `status`.
    #[must_use]
    pub fn with_status(&self, status: EvidenceStatus) -> usize {
        self.by_status.get(status.as_ref())
    }
}

impl Tally<Evidence> for EvidenceStatistics {
    fn absorb(&mut self, evidence: &Evidence) {
        self.by_kind.increment(evidence.kind());
        self.by_status.increment(evidence.status.as_ref());
        if evidence.expert_id.is_none() {
            self.unassigned += 1;
        }
    }

    fn retract(&mut self, evidence: &Evidence) {
        self.by_kind.decrement(evidence.kind());
        self.by_status.decrement(evidence.status.as_ref());
        if evidence.expert_id.is_none() {
            self.unassigned -= 1;
        }
    }
}

/// Owns every expert and piece of evidence.
#[derive(Debug, Clone, Default)]
pub struct ForensicsManager {
    experts: RecordManager<ForensicExpert, KindCounts>,
    evidence: RecordManager<Evidence, EvidenceStatistics>,
}

impl ForensicsManager {
    /// Creates an empty lab.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -- Experts ------------------------------------------------------------

    /// Adds a fully built expert.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::DuplicateId`] if the id is taken.
    pub fn add_expert(&mut self, expert: ForensicExpert) -> Result<RecordId, RecordError> {
        let id = self.experts.insert(expert)?;
        log::debug!("Added expert {id}");
        Ok(id)
    }

    /// Builds an expert of `kind` and applies `fields` before inserting it.
    /// Nothing is inserted if any field fails to apply.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidField`] for a bad field or
    /// [`RecordError::DuplicateId`] if the id is taken.
    pub fn add_expert_from_fields(
        &mut self,
        kind: &str,
        id: Option<RecordId>,
        name: &str,
        fields: &[(&str, &str)],
    ) -> Result<RecordId, RecordError> {
        let id = id.unwrap_or_else(|| self.experts.next_id());
        let mut expert = ForensicExpert::from_kind(kind, id, name.trim());
        for (field, value) in fields {
            expert.set_field(field, value)?;
        }
        self.add_expert(expert)
    }

    /// The id the next auto-numbered expert will get.
    #[must_use]
    pub const fn next_expert_id(&self) -> RecordId {
        self.experts.next_id()
    }

    /// Looks up an expert.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotFound`] if absent.
    pub fn find_expert(&self, id: RecordId) -> Result<&ForensicExpert, RecordError> {
        self.experts.find(id)
    }

    /// All experts in insertion order.
    pub fn experts(&self) -> impl ExactSizeIterator<Item = &ForensicExpert> + '_ {
        self.experts.list()
    }

    /// Experts of one kind.
    #[must_use]
    pub fn experts_of_kind(&self, kind: &str) -> Vec<&ForensicExpert> {
        self.experts.filter_by_kind(kind)
    }

    /// Sets one expert field from text input.
    ///
    /// Supervisor ids set this way are not checked; use
    /// [`ForensicsManager::set_supervisor`] to validate against the roster.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotFound`] or [`RecordError::InvalidField`].
    pub fn update_expert(
        &mut self,
        id: RecordId,
        field: &str,
        value: &str,
    ) -> Result<&ForensicExpert, RecordError> {
        self.experts.update(id, |e| e.set_field(field, value))
    }

    /// Puts a field agent under a head constable, or clears the supervisor
    /// when `officer_id` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotFound`] if the expert or officer is absent,
    /// or [`RecordError::InvalidField`] if the expert is not a field agent
    /// or the officer is not a head constable.
    pub fn set_supervisor(
        &mut self,
        expert_id: RecordId,
        officer_id: Option<RecordId>,
        officers: &dyn OfficerLookup,
    ) -> Result<&ForensicExpert, RecordError> {
        if let Some(officer_id) = officer_id {
            let officer = officers
                .officer_ref(officer_id)
                .ok_or_else(|| RecordError::not_found(Officer::FAMILY, officer_id))?;
            if !officer.is_head_constable {
                return Err(RecordError::invalid_field(
                    "supervisorId",
                    format!("{} is a {}, not a head constable", officer.name, officer.kind),
                ));
            }
        }

        self.experts.update(expert_id, |e: &mut ForensicExpert| {
            let kind = e.kind().to_string();
            match &mut e.role {
                ExpertRole::FieldAgent { supervisor_id } => {
                    *supervisor_id = officer_id;
                    Ok(())
                }
                _ => Err(RecordError::invalid_field(
                    "supervisorId",
                    format!("not applicable to {kind} records"),
                )),
            }
        })
    }

    /// Deletes an expert. Evidence assigned to them keeps the dangling id.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotFound`] if absent.
    pub fn delete_expert(&mut self, id: RecordId) -> Result<ForensicExpert, RecordError> {
        let expert = self.experts.delete(id)?;
        log::debug!("Deleted expert {id}");
        Ok(expert)
    }

    /// Expert counts by kind.
    #[must_use]
    pub const fn expert_counts(&self) -> &KindCounts {
        self.experts.statistics()
    }

    // -- Evidence -----------------------------------------------------------

    /// Logs new evidence against a case and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotFound`] if `cases` has no case `case_id`.
    pub fn add_evidence(
        &mut self,
        case_id: RecordId,
        evidence_type: &str,
        description: &str,
        cases: &dyn CaseLookup,
    ) -> Result<RecordId, RecordError> {
        if !cases.has_case(case_id) {
            return Err(RecordError::not_found(Case::FAMILY, case_id));
        }

        let mut evidence = Evidence::new(self.evidence.next_id(), case_id);
        evidence.evidence_type = evidence_type.trim().to_string();
        evidence.description = description.trim().to_string();
        let id = self.evidence.insert(evidence)?;
        log::debug!("Logged evidence {id} for case {case_id}");
        Ok(id)
    }

    /// Inserts an evidence record without checking its case.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::DuplicateId`] if the id is taken.
    pub fn insert_evidence(&mut self, evidence: Evidence) -> Result<RecordId, RecordError> {
        self.evidence.insert(evidence)
    }

    /// The id the next logged evidence will get.
    #[must_use]
    pub const fn next_evidence_id(&self) -> RecordId {
        self.evidence.next_id()
    }

    /// Looks up evidence.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotFound`] if absent.
    pub fn find_evidence(&self, id: RecordId) -> Result<&Evidence, RecordError> {
        self.evidence.find(id)
    }

    /// All evidence in insertion order.
    pub fn evidence(&self) -> impl ExactSizeIterator<Item = &Evidence> + '_ {
        self.evidence.list()
    }

    /// Evidence filed against a case.
    #[must_use]
    pub fn evidence_for_case(&self, case_id: RecordId) -> Vec<&Evidence> {
        self.evidence.filter(|e| e.case_id == case_id)
    }

    /// Evidence assigned to an expert.
    #[must_use]
    pub fn evidence_for_expert(&self, expert_id: RecordId) -> Vec<&Evidence> {
        self.evidence.filter(|e| e.expert_id == Some(expert_id))
    }

    /// Evidence in one status.
    #[must_use]
    pub fn evidence_with_status(&self, status: EvidenceStatus) -> Vec<&Evidence> {
        self.evidence.filter(|e| e.status == status)
    }

    /// Evidence no expert is working on.
    #[must_use]
    pub fn unassigned_evidence(&self) -> Vec<&Evidence> {
        self.evidence.filter(|e| e.expert_id.is_none())
    }

    /// Hands evidence to an expert. Collected evidence moves to
    /// [`EvidenceStatus::InAnalysis`].
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotFound`] if the evidence or expert is absent.
    pub fn assign_evidence(
        &mut self,
        evidence_id: RecordId,
        expert_id: RecordId,
    ) -> Result<&Evidence, RecordError> {
        self.experts.find(expert_id)?;
        let evidence = self
            .evidence
            .update(evidence_id, |e: &mut Evidence| -> Result<(), RecordError> {
                e.expert_id = Some(expert_id);
                if e.status == EvidenceStatus::Collected {
                    e.status = EvidenceStatus::InAnalysis;
                }
                Ok(())
            })?;
        log::debug!("Assigned evidence {evidence_id} to expert {expert_id}");
        Ok(evidence)
    }

    /// Moves evidence to `status`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotFound`] if the evidence is absent.
    pub fn set_evidence_status(
        &mut self,
        evidence_id: RecordId,
        status: EvidenceStatus,
    ) -> Result<&Evidence, RecordError> {
        self.evidence
            .update(evidence_id, |e: &mut Evidence| -> Result<(), RecordError> {
                e.status = status;
                Ok(())
            })
    }

    /// Sets one evidence field from text input.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotFound`] or [`RecordError::InvalidField`].
    pub fn update_evidence(
        &mut self,
        id: RecordId,
        field: &str,
        value: &str,
    ) -> Result<&Evidence, RecordError> {
        self.evidence.update(id, |e| e.set_field(field, value))
    }

    /// Deletes evidence.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotFound`] if absent.
    pub fn delete_evidence(&mut self, id: RecordId) -> Result<Evidence, RecordError> {
        let evidence = self.evidence.delete(id)?;
        log::debug!("Deleted evidence {id}");
        Ok(evidence)
    }

    /// Resolves the case a piece of evidence belongs to. `None` if the case
    /// no longer exists.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotFound`] if the evidence itself is absent.
    pub fn case_for_evidence(
        &self,
        evidence_id: RecordId,
        cases: &dyn CaseLookup,
    ) -> Result<Option<CaseRef>, RecordError> {
        let evidence = self.evidence.find(evidence_id)?;
        Ok(cases.case_ref(evidence.case_id))
    }

    /// Number of evidence records.
    #[must_use]
    pub fn evidence_count(&self) -> usize {
        self.evidence.len()
    }

    /// Maintained evidence statistics.
    #[must_use]
    pub const fn statistics(&self) -> &EvidenceStatistics {
        self.evidence.statistics()
    }

    /// Evidence statistics rebuilt from the current log.
    #[must_use]
    pub fn recompute_statistics(&self) -> EvidenceStatistics {
        self.evidence.recompute_statistics()
    }

    // -- References ---------------------------------------------------------

    /// Every cross-reference that does not resolve: evidence pointing at
    /// missing cases or experts, and field agents whose supervisor is not on
    /// the roster.
    #[must_use]
    pub fn dangling_references(
        &self,
        cases: &dyn CaseLookup,
        officers: &dyn OfficerLookup,
    ) -> Vec<DanglingReference> {
        let mut dangling = Vec::new();

        for evidence in self.evidence.list() {
            if !cases.has_case(evidence.case_id) {
                dangling.push(DanglingReference::new(
                    Evidence::FAMILY,
                    evidence.id,
                    "caseId",
                    Case::FAMILY,
                    evidence.case_id,
                ));
            }
            if let Some(expert_id) = evidence.expert_id
                && self.experts.get(expert_id).is_none()
            {
                dangling.push(DanglingReference::new(
                    Evidence::FAMILY,
                    evidence.id,
                    "expertId",
                    ForensicExpert::FAMILY,
                    expert_id,
                ));
            }
        }

        for expert in self.experts.list() {
            if let Some(officer_id) = expert.supervisor_id()
                && !officers.has_officer(officer_id)
            {
                dangling.push(DanglingReference::new(
                    ForensicExpert::FAMILY,
                    expert.id,
                    "supervisorId",
                    Officer::FAMILY,
                    officer_id,
                ));
            }
        }

        dangling
    }

    // -- Persistence --------------------------------------------------------

    /// Writes every expert and piece of evidence to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Io`] or [`RecordError::Json`] on failure.
    pub fn save(&self, path: &Path) -> Result<(), RecordError> {
        let document = ForensicsDocument {
            experts: self.experts.list().map(ExpertRow::from).collect(),
            evidence: self.evidence.list().cloned().collect(),
        };
        persist::save_document(path, &document)?;
        log::info!(
            "Saved {} expert(s) and {} evidence record(s) to {}",
            self.experts.len(),
            self.evidence.len(),
            path.display()
        );
        Ok(())
    }

    /// Replaces the in-memory state with the contents of `path`.
    ///
    /// Case and officer references are not checked here, so this can run
    /// before the crime and officer files are loaded. Returns the number of
    /// evidence records loaded.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::MalformedInput`] if the file is unreadable,
    /// malformed, or repeats an id; the manager is left empty.
    pub fn load(&mut self, path: &Path) -> Result<usize, RecordError> {
        self.clear();
        let Some(document) = persist::load_document::<ForensicsDocument>(path)? else {
            return Ok(0);
        };

        let result = self
            .experts
            .replace_all(document.experts.into_iter().map(ForensicExpert::from))
            .and_then(|_| self.evidence.replace_all(document.evidence));

        match result {
            Ok(count) => {
                log::info!(
                    "Loaded {} expert(s) and {count} evidence record(s) from {}",
                    self.experts.len(),
                    path.display()
                );
                Ok(count)
            }
            Err(e) => {
                self.clear();
                Err(RecordError::malformed(path, e.to_string()))
            }
        }
    }

    /// Removes every expert and piece of evidence.
    pub fn clear(&mut self) {
        self.experts.clear();
        self.evidence.clear();
    }
}

#[cfg(test)]
mod tests {
    use lems_crime::CrimeManager;
    use lems_crime::models::THEFT;
    use lems_forensics_models::{FIELD_AGENT, LAB_TECHNICIAN};
    use lems_officer::OfficerManager;
    use lems_officer::models::{CONSTABLE, HEAD_CONSTABLE};

    use super::*;

    fn crimes() -> CrimeManager {
        let mut m = CrimeManager::new();
        m.add_case_from_fields(THEFT, Some(7), &[("stolenValue", "500")])
            .unwrap();
        m
    }

    fn officers() -> OfficerManager {
        let mut m = OfficerManager::new();
        m.add_from_fields(HEAD_CONSTABLE, Some(1), "Sara Malik", &[])
            .unwrap();
        m.add_from_fields(CONSTABLE, Some(2), "Bilal Ahmed", &[])
            .unwrap();
        m
    }

    fn lab() -> ForensicsManager {
        let mut m = ForensicsManager::new();
        m.add_expert_from_fields(LAB_TECHNICIAN, Some(1), "Hira", &[("lab", "Central")])
            .unwrap();
        m.add_expert_from_fields(FIELD_AGENT, Some(2), "Kamran", &[])
            .unwrap();
        m
    }

    #[test]
    fn evidence_requires_existing_case() {
        let cases = crimes();
        let mut m = lab();

        let id = m.add_evidence(7, "Fingerprint", "On the window", &cases).unwrap();
        assert_eq!(id, 1);
        assert_eq!(m.evidence_for_case(7).len(), 1);

        let err = m.add_evidence(8, "Fiber", "", &cases).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(m.evidence_count(), 1);
    }

    #[test]
    fn assignment_moves_status_and_statistics() {
        let cases = crimes();
        let mut m = lab();
        m.add_evidence(7, "Fingerprint", "", &cases).unwrap();
        m.add_evidence(7, "Fiber", "", &cases).unwrap();
        assert_eq!(m.statistics().unassigned, 2);

        let evidence = m.assign_evidence(1, 1).unwrap();
        assert_eq!(evidence.status, EvidenceStatus::InAnalysis);
        assert_eq!(m.statistics().unassigned, 1);
        assert_eq!(m.statistics().with_status(EvidenceStatus::Collected), 1);

        m.set_evidence_status(1, EvidenceStatus::Analyzed).unwrap();
        assert_eq!(m.statistics().with_status(EvidenceStatus::Analyzed), 1);
        assert_eq!(m.evidence_for_expert(1).len(), 1);
        assert_eq!(*m.statistics(), m.recompute_statistics());

        assert!(m.assign_evidence(2, 99).unwrap_err().is_not_found());
        assert_eq!(m.find_evidence(2).unwrap().expert_id, None);
    }

    #[test]
    fn supervisor_must_be_head_constable() {
        let roster = officers();
        let mut m = lab();

        m.set_supervisor(2, Some(1), &roster).unwrap();
        assert_eq!(m.find_expert(2).unwrap().supervisor_id(), Some(1));

        let err = m.set_supervisor(2, Some(2), &roster).unwrap_err();
        assert!(matches!(err, RecordError::InvalidField { .. }));
        assert!(m.set_supervisor(2, Some(9), &roster).unwrap_err().is_not_found());
        assert!(m.set_supervisor(1, Some(1), &roster).is_err());
        assert_eq!(m.find_expert(2).unwrap().supervisor_id(), Some(1));

        m.set_supervisor(2, None, &roster).unwrap();
        assert_eq!(m.find_expert(2).unwrap().supervisor_id(), None);
    }

    #[test]
    fn evidence_loaded_before_its_case_resolves_afterwards() {
        let dir = tempfile::tempdir().unwrap();
        let forensics_path = dir.path().join("forensics.json");
        let crimes_path = dir.path().join("crimes.json");
        std::fs::write(
            &forensics_path,
            r#"{"experts": [], "evidence": [{"id": 1, "caseId": 7, "evidenceType": "Fingerprint"}]}"#,
        )
        .unwrap();
        crimes().save(&crimes_path).unwrap();

        let mut m = ForensicsManager::new();
        assert_eq!(m.load(&forensics_path).unwrap(), 1);

        let mut cases = CrimeManager::new();
        assert!(m.case_for_evidence(1, &cases).unwrap().is_none());

        cases.load(&crimes_path).unwrap();
        let case = m.case_for_evidence(1, &cases).unwrap().unwrap();
        assert_eq!(case.id, 7);
        assert_eq!(case.kind, THEFT);
        assert!(m.dangling_references(&cases, &officers()).is_empty());
    }

    #[test]
    fn dangling_references_are_reported() {
        let cases = crimes();
        let roster = officers();
        let mut m = lab();
        m.set_supervisor(2, Some(1), &roster).unwrap();
        m.add_evidence(7, "Fiber", "", &cases).unwrap();
        m.assign_evidence(1, 1).unwrap();

        m.delete_expert(1).unwrap();

        let dangling = m.dangling_references(&CrimeManager::new(), &OfficerManager::new());
        let fields: Vec<_> = dangling.iter().map(|d| d.field).collect();
        assert_eq!(fields, vec!["caseId", "expertId", "supervisorId"]);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forensics.json");
        let cases = crimes();

        let mut m = lab();
        m.update_expert(1, "certifications", "DNA, Toxicology").unwrap();
        m.set_supervisor(2, Some(1), &officers()).unwrap();
        m.add_evidence(7, "Fingerprint", "Glass", &cases).unwrap();
        m.add_evidence(7, "", "", &cases).unwrap();
        m.assign_evidence(1, 1).unwrap();
        m.save(&path).unwrap();

        let mut loaded = ForensicsManager::new();
        assert_eq!(loaded.load(&path).unwrap(), 2);
        let experts: Vec<_> = loaded.experts().cloned().collect();
        assert_eq!(experts, m.experts().cloned().collect::<Vec<_>>());
        let evidence: Vec<_> = loaded.evidence().cloned().collect();
        assert_eq!(evidence, m.evidence().cloned().collect::<Vec<_>>());
        assert_eq!(*loaded.statistics(), *m.statistics());
        assert_eq!(loaded.next_evidence_id(), 3);
    }

    #[test]
    fn malformed_file_leaves_manager_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forensics.json");
        std::fs::write(&path, r#"{"evidence": [{"id": 1}]}"#).unwrap();

        let mut m = lab();
        assert!(matches!(
            m.load(&path).unwrap_err(),
            RecordError::MalformedInput { .. }
        ));
        assert_eq!(m.experts().len(), 0);
        assert_eq!(m.evidence_count(), 0);
    }
}
