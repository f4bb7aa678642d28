#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Forensic expert and evidence record types.

use lems_record_store::{FieldPatch, Record, RecordError, RecordId, fields};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Kind literal for lab technicians.
pub const LAB_TECHNICIAN: &str = "LabTechnician";
/// Kind literal for field agents.
pub const FIELD_AGENT: &str = "FieldAgent";
/// Kind reported for evidence with no type recorded.
pub const UNTYPED_EVIDENCE: &str = "Unspecified";

// ---------------------------------------------------------------------------
// Experts
// ---------------------------------------------------------------------------

/// Specialty of a forensic expert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpertRole {
    /// Works in a lab analysing evidence.
    LabTechnician {
        /// Lab the technician works in.
        lab: String,
        /// Certifications held.
        certifications: Vec<String>,
    },
    /// Collects evidence at scenes under an officer's supervision.
    FieldAgent {
        /// Supervising head constable.
        supervisor_id: Option<RecordId>,
    },
    /// Any other specialty, identified only by its label.
    Other {
        /// The specialty label as entered.
        label: String,
    },
}

impl ExpertRole {
    /// Builds a role from its literal. Matching is exact; anything else
    /// becomes [`ExpertRole::Other`].
    #[must_use]
    pub fn from_literal(literal: &str) -> Self {
        match literal {
            LAB_TECHNICIAN => Self::LabTechnician {
                lab: String::new(),
                certifications: Vec::new(),
            },
            FIELD_AGENT => Self::FieldAgent {
                supervisor_id: None,
            },
            other => Self::Other {
                label: other.to_string(),
            },
        }
    }

    /// The kind literal.
    #[must_use]
    pub fn literal(&self) -> &str {
        match self {
            Self::LabTechnician { .. } => LAB_TECHNICIAN,
            Self::FieldAgent { .. } => FIELD_AGENT,
            Self::Other { label } => label,
        }
    }

    /// Display name of the specialty.
    #[must_use]
    pub fn specialty(&self) -> &str {
        match self {
            Self::LabTechnician { .. } => "Lab Technician",
            Self::FieldAgent { .. } => "Field Agent",
            Self::Other { label } => label,
        }
    }
}

/// A forensic expert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForensicExpert {
    /// Expert id.
    pub id: RecordId,
    /// Full name.
    pub name: String,
    /// Specialty and its specific fields.
    pub role: ExpertRole,
}

impl ForensicExpert {
    /// Creates an expert from a kind literal.
    #[must_use]
    pub fn from_kind(kind: &str, id: RecordId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            role: ExpertRole::from_literal(kind),
        }
    }

    /// Creates a lab technician.
    #[must_use]
    pub fn lab_technician(id: RecordId, name: impl Into<String>) -> Self {
        Self::from_kind(LAB_TECHNICIAN, id, name)
    }

    /// Creates a field agent with no supervisor.
    #[must_use]
    pub fn field_agent(id: RecordId, name: impl Into<String>) -> Self {
        Self::from_kind(FIELD_AGENT, id, name)
    }

    /// The supervising officer of a field agent.
    #[must_use]
    pub const fn supervisor_id(&self) -> Option<RecordId> {
        match self.role {
            ExpertRole::FieldAgent { supervisor_id } => supervisor_id,
            _ => None,
        }
    }

    /// One-line summary for listings.
    #[must_use]
    pub fn summary(&self) -> String {
        format!("{} (ID: {}) - {}", self.name, self.id, self.role.specialty())
    }

    /// Multi-line summary of every populated field.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut lines = vec![
            format!("Expert {} - {}", self.id, self.role.specialty()),
            format!("  Name: {}", self.name),
        ];
        match &self.role {
            ExpertRole::LabTechnician {
                lab,
                certifications,
            } => {
                if !lab.is_empty() {
                    lines.push(format!("  Lab: {lab}"));
                }
                if !certifications.is_empty() {
                    lines.push(format!("  Certifications: {}", certifications.join(", ")));
                }
            }
            ExpertRole::FieldAgent {
                supervisor_id: Some(supervisor),
            } => lines.push(format!("  Supervisor: officer {supervisor}")),
            _ => {}
        }
        lines.join("\n")
    }
}

impl Record for ForensicExpert {
    const FAMILY: &'static str = "Forensic expert";

    fn id(&self) -> RecordId {
        self.id
    }

    fn kind(&self) -> &str {
        self.role.literal()
    }
}

impl FieldPatch for ForensicExpert {
    fn set_field(&mut self, field: &str, value: &str) -> Result<(), RecordError> {
        let kind = self.role.literal().to_string();
        match (field, &mut self.role) {
            ("id", _) => return Err(fields::immutable_id()),
            ("name", _) => self.name = value.trim().to_string(),
            ("lab", ExpertRole::LabTechnician { lab, .. }) => *lab = value.trim().to_string(),
            ("certifications", ExpertRole::LabTechnician { certifications, .. }) => {
                *certifications = fields::parse_list(value);
            }
            ("supervisorId", ExpertRole::FieldAgent { supervisor_id }) => {
                *supervisor_id = fields::parse_reference(field, value)?;
            }
            ("lab" | "certifications" | "supervisorId", _) => {
                return Err(fields::not_applicable(field, &kind));
            }
            _ => return Err(fields::unknown(field)),
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Evidence
// ---------------------------------------------------------------------------

/// Analysis state of a piece of evidence.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
pub enum EvidenceStatus {
    /// Logged but not yet examined.
    #[default]
    Collected,
    /// With an expert.
    InAnalysis,
    /// Examination finished.
    Analyzed,
}

/// A piece of evidence filed against a case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    /// Evidence id.
    pub id: RecordId,
    /// Case the evidence belongs to.
    pub case_id: RecordId,
    /// Free-text description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Type of evidence, e.g. `Fingerprint`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub evidence_type: String,
    /// Analysis state.
    #[serde(default)]
    pub status: EvidenceStatus,
    /// Expert the evidence is assigned to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expert_id: Option<RecordId>,
}

impl Evidence {
    /// Creates collected, unassigned evidence for a case.
    #[must_use]
    pub const fn new(id: RecordId, case_id: RecordId) -> Self {
        Self {
            id,
            case_id,
            description: String::new(),
            evidence_type: String::new(),
            status: EvidenceStatus::Collected,
            expert_id: None,
        }
    }

    /// One-line summary for listings.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Evidence {} ({}) for case {} [{}]",
            self.id,
            self.kind(),
            self.case_id,
            self.status
        )
    }

    /// Multi-line summary of every populated field.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut lines = vec![
            format!("Evidence {} - {}", self.id, self.kind()),
            format!("  Case: {}", self.case_id),
            format!("  Status: {}", self.status),
        ];
        if !self.description.is_empty() {
            lines.push(format!("  Description: {}", self.description));
        }
        if let Some(expert) = self.expert_id {
            lines.push(format!("  Assigned expert: {expert}"));
        }
        lines.join("\n")
    }
}

impl Record for Evidence {
    const FAMILY: &'static str = "Evidence";

    fn id(&self) -> RecordId {
        self.id
    }

    fn kind(&self) -> &str {
        if self.evidence_type.is_empty() {
            UNTYPED_EVIDENCE
        } else {
            &self.evidence_type
        }
    }
}

impl FieldPatch for Evidence {
    fn set_field(&mut self, field: &str, value: &str) -> Result<(), RecordError> {
        match field {
            "id" => return Err(fields::immutable_id()),
            "caseId" => self.case_id = fields::parse(field, value)?,
            "description" => self.description = value.trim().to_string(),
            "evidenceType" | "type" => self.evidence_type = value.trim().to_string(),
            "status" => self.status = fields::parse(field, value)?,
            "expertId" => self.expert_id = fields::parse_reference(field, value)?,
            _ => return Err(fields::unknown(field)),
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Persisted shapes
// ---------------------------------------------------------------------------

/// Flat JSON shape of a [`ForensicExpert`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpertRow {
    /// Expert id.
    pub id: RecordId,
    /// Kind literal.
    pub kind: String,
    /// Full name.
    #[serde(default)]
    pub name: String,
    /// Lab technicians only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lab: Option<String>,
    /// Lab technicians only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub certifications: Vec<String>,
    /// Field agents only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supervisor_id: Option<RecordId>,
}

impl From<&ForensicExpert> for ExpertRow {
    fn from(expert: &ForensicExpert) -> Self {
        let mut row = Self {
            id: expert.id,
            kind: expert.role.literal().to_string(),
            name: expert.name.clone(),
            lab: None,
            certifications: Vec::new(),
            supervisor_id: None,
        };
        match &expert.role {
            ExpertRole::LabTechnician {
                lab,
                certifications,
            } => {
                row.lab = Some(lab.clone()).filter(|l| !l.is_empty());
                row.certifications.clone_from(certifications);
            }
            ExpertRole::FieldAgent { supervisor_id } => row.supervisor_id = *supervisor_id,
            ExpertRole::Other { .. } => {}
        }
        row
    }
}

impl From<ExpertRow> for ForensicExpert {
    fn from(row: ExpertRow) -> Self {
        let mut expert = Self::from_kind(&row.kind, row.id, row.name);
        match &mut expert.role {
            ExpertRole::LabTechnician {
                lab,
                certifications,
            } => {
                *lab = row.lab.unwrap_or_default();
                *certifications = row.certifications;
            }
            ExpertRole::FieldAgent { supervisor_id } => *supervisor_id = row.supervisor_id,
            ExpertRole::Other { .. } => {}
        }
        expert
    }
}

/// Evidence is persisted as-is.
pub type EvidenceRow = Evidence;

/// Contents of `forensics.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForensicsDocument {
    /// Every expert, in insertion order.
    #[serde(default)]
    pub experts: Vec<ExpertRow>,
    /// Every piece of evidence, in insertion order.
    #[serde(default)]
    pub evidence: Vec<EvidenceRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_specialty_keeps_label() {
        let expert = ForensicExpert::from_kind("Ballistics", 1, "Nadia");
        assert_eq!(expert.kind(), "Ballistics");
        assert_eq!(expert.role.specialty(), "Ballistics");
        assert!(ForensicExpert::from_kind("fieldagent", 2, "x").supervisor_id().is_none());
    }

    #[test]
    fn supervisor_only_applies_to_field_agents() {
        let mut agent = ForensicExpert::field_agent(1, "Kamran");
        agent.set_field("supervisorId", "12").unwrap();
        assert_eq!(agent.supervisor_id(), Some(12));
        agent.set_field("supervisorId", "none").unwrap();
        assert_eq!(agent.supervisor_id(), None);

        let mut tech = ForensicExpert::lab_technician(2, "Hira");
        assert!(tech.set_field("supervisorId", "12").is_err());
        tech.set_field("certifications", "DNA, Toxicology").unwrap();
        assert!(tech.describe().contains("DNA, Toxicology"));
    }

    #[test]
    fn evidence_defaults_and_fields() {
        let mut evidence = Evidence::new(1, 7);
        assert_eq!(evidence.status, EvidenceStatus::Collected);
        assert_eq!(evidence.kind(), UNTYPED_EVIDENCE);

        evidence.set_field("type", "Fingerprint").unwrap();
        evidence.set_field("status", "InAnalysis").unwrap();
        assert_eq!(evidence.kind(), "Fingerprint");
        assert_eq!(evidence.status, EvidenceStatus::InAnalysis);
        assert!(evidence.set_field("status", "Lost").is_err());
        assert!(evidence.set_field("caseId", "").is_err());
    }

    #[test]
    fn rows_omit_absent_fields() {
        let agent = ForensicExpert::field_agent(3, "Kamran");
        let json = serde_json::to_string(&ExpertRow::from(&agent)).unwrap();
        assert!(!json.contains("supervisorId"));
        assert!(!json.contains("lab"));

        let json = serde_json::to_string(&Evidence::new(1, 7)).unwrap();
        assert!(json.contains("\"caseId\":7"));
        assert!(!json.contains("expertId"));
    }

    #[test]
    fn expert_row_round_trip() {
        let mut tech = ForensicExpert::lab_technician(4, "Hira");
        tech.set_field("lab", "Central Lab").unwrap();
        tech.set_field("certifications", "DNA").unwrap();
        let row: ExpertRow =
            serde_json::from_str(&serde_json::to_string(&ExpertRow::from(&tech)).unwrap())
                .unwrap();
        assert_eq!(ForensicExpert::from(row), tech);
    }
}
