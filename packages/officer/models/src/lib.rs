#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Officer record types.
//!
//! Every [`Officer`] has a name, a rank title, and a task list; the
//! [`OfficerRole`] adds the fields specific to each post.

use lems_record_store::{FieldPatch, Record, RecordError, RecordId, fields};
use serde::{Deserialize, Serialize};

/// Role literal for a Station House Officer.
pub const SHO: &str = "SHO";
/// Role literal for an inspector.
pub const INSPECTOR: &str = "Inspector";
/// Role literal for a sub-inspector.
pub const SUB_INSPECTOR: &str = "SubInspector";
/// Role literal for a head constable.
pub const HEAD_CONSTABLE: &str = "HeadConstable";
/// Role literal for a constable.
pub const CONSTABLE: &str = "Constable";
/// Label used for officers created without a recognised role.
pub const GENERIC_OFFICER: &str = "Officer";

/// Post held by an officer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OfficerRole {
    /// In charge of a police station.
    Sho {
        /// Station commanded.
        station: String,
    },
    /// Leads investigations within a division.
    Inspector {
        /// Division assigned.
        division: String,
    },
    /// Assists an inspector.
    SubInspector,
    /// Supervises a squad of constables.
    HeadConstable {
        /// Number of constables supervised.
        squad_size: u32,
    },
    /// Patrols a beat.
    Constable {
        /// Beat assigned.
        beat: String,
    },
    /// Any other post, identified only by its label.
    Other {
        /// The role label as entered.
        label: String,
    },
}

impl OfficerRole {
    /// Builds a role from its literal. Matching is exact; anything else
    /// becomes [`OfficerRole::Other`].
    #[must_use]
    pub fn from_literal(literal: &str) -> Self {
        match literal {
            SHO => Self::Sho {
                station: String::new(),
            },
            INSPECTOR => Self::Inspector {
                division: String::new(),
            },
            SUB_INSPECTOR => Self::SubInspector,
            HEAD_CONSTABLE => Self::HeadConstable { squad_size: 0 },
            CONSTABLE => Self::Constable {
                beat: String::new(),
            },
            "" => Self::Other {
                label: GENERIC_OFFICER.to_string(),
            },
            other => Self::Other {
                label: other.to_string(),
            },
        }
    }

    /// The role literal.
    #[must_use]
    pub fn literal(&self) -> &str {
        match self {
            Self::Sho { .. } => SHO,
            Self::Inspector { .. } => INSPECTOR,
            Self::SubInspector => SUB_INSPECTOR,
            Self::HeadConstable { .. } => HEAD_CONSTABLE,
            Self::Constable { .. } => CONSTABLE,
            Self::Other { label } => label,
        }
    }

    /// Rank title given to new officers in this role.
    #[must_use]
    pub fn default_rank(&self) -> &str {
        match self {
            Self::Sho { .. } => "Station House Officer",
            Self::Inspector { .. } => "Inspector",
            Self::SubInspector => "Sub-Inspector",
            Self::HeadConstable { .. } => "Head Constable",
            Self::Constable { .. } => "Constable",
            Self::Other { label } => label,
        }
    }

    /// Position in the chain of command, higher is more senior.
    #[must_use]
    pub const fn seniority(&self) -> u8 {
        match self {
            Self::Sho { .. } => 5,
            Self::Inspector { .. } => 4,
            Self::SubInspector => 3,
            Self::HeadConstable { .. } => 2,
            Self::Constable { .. } => 1,
            Self::Other { .. } => 0,
        }
    }
}

/// A police officer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Officer {
    /// Officer id (badge number).
    pub id: RecordId,
    /// Full name.
    pub name: String,
    /// Rank title.
    pub rank: String,
    /// Outstanding tasks, oldest first.
    pub tasks: Vec<String>,
    /// Post and its specific fields.
    pub role: OfficerRole,
}

impl Officer {
    /// Creates an officer in `role` with the role's default rank.
    #[must_use]
    pub fn new(id: RecordId, name: impl Into<String>, role: OfficerRole) -> Self {
        Self {
            id,
            name: name.into(),
            rank: role.default_rank().to_string(),
            tasks: Vec::new(),
            role,
        }
    }

    /// Creates an officer from a role literal.
    #[must_use]
    pub fn from_kind(kind: &str, id: RecordId, name: impl Into<String>) -> Self {
        Self::new(id, name, OfficerRole::from_literal(kind))
    }

    /// Returns `true` for head constables, who may supervise field agents.
    #[must_use]
    pub const fn is_head_constable(&self) -> bool {
        matches!(self.role, OfficerRole::HeadConstable { .. })
    }

    /// One-line summary for listings.
    #[must_use]
    pub fn summary(&self) -> String {
        format!("{} ({}) - {}", self.name, self.id, self.role.literal())
    }

    /// Multi-line summary of every populated field.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut lines = vec![
            format!("Officer {} - {}", self.id, self.role.literal()),
            format!("  Name: {}", self.name),
            format!("  Rank: {}", self.rank),
        ];

        match &self.role {
            OfficerRole::Sho { station } if !station.is_empty() => {
                lines.push(format!("  Station: {station}"));
            }
            OfficerRole::Inspector { division } if !division.is_empty() => {
                lines.push(format!("  Division: {division}"));
            }
            OfficerRole::HeadConstable { squad_size } if *squad_size > 0 => {
                lines.push(format!("  Squad size: {squad_size}"));
            }
            OfficerRole::Constable { beat } if !beat.is_empty() => {
                lines.push(format!("  Beat: {beat}"));
            }
            _ => {}
        }

        if !self.tasks.is_empty() {
            lines.push("  Tasks:".to_string());
            for (i, task) in self.tasks.iter().enumerate() {
                lines.push(format!("    {}. {task}", i + 1));
            }
        }

        lines.join("\n")
    }
}

impl Record for Officer {
    const FAMILY: &'static str = "Officer";

    fn id(&self) -> RecordId {
        self.id
    }

    fn kind(&self) -> &str {
        self.role.literal()
    }
}

impl FieldPatch for Officer {
    fn set_field(&mut self, field: &str, value: &str) -> Result<(), RecordError> {
        let kind = self.role.literal().to_string();
        match (field, &mut self.role) {
            ("id", _) => return Err(fields::immutable_id()),
            ("kind" | "role", _) => {
                return Err(RecordError::invalid_field(
                    field,
                    "an officer's role cannot be changed; re-add the officer instead",
                ));
            }
            ("name", _) => self.name = value.trim().to_string(),
            ("rank", _) => self.rank = value.trim().to_string(),
            ("tasks", _) => self.tasks = fields::parse_list(value),
            ("station", OfficerRole::Sho { station }) => *station = value.trim().to_string(),
            ("division", OfficerRole::Inspector { division }) => {
                *division = value.trim().to_string();
            }
            ("squadSize", OfficerRole::HeadConstable { squad_size }) => {
                *squad_size = fields::parse(field, value)?;
            }
            ("beat", OfficerRole::Constable { beat }) => *beat = value.trim().to_string(),
            ("station" | "division" | "squadSize" | "beat", _) => {
                return Err(fields::not_applicable(field, &kind));
            }
            _ => return Err(fields::unknown(field)),
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Persisted shapes
// ---------------------------------------------------------------------------

/// Flat JSON shape of an [`Officer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficerRow {
    /// Officer id.
    pub id: RecordId,
    /// Role literal.
    pub kind: String,
    /// Full name.
    pub name: String,
    /// Rank title; the role default when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<String>,
    /// Outstanding tasks.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tasks: Vec<String>,
    /// SHO only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub station: Option<String>,
    /// Inspector only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub division: Option<String>,
    /// Head constable only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub squad_size: Option<u32>,
    /// Constable only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beat: Option<String>,
}

impl From<&Officer> for OfficerRow {
    fn from(officer: &Officer) -> Self {
        let (station, division, squad_size, beat) = match &officer.role {
            OfficerRole::Sho { station } => (Some(station.clone()), None, None, None),
            OfficerRole::Inspector { division } => (None, Some(division.clone()), None, None),
            OfficerRole::HeadConstable { squad_size } => (None, None, Some(*squad_size), None),
            OfficerRole::Constable { beat } => (None, None, None, Some(beat.clone())),
            OfficerRole::SubInspector | OfficerRole::Other { .. } => (None, None, None, None),
        };

        Self {
            id: officer.id,
            kind: officer.role.literal().to_string(),
            name: officer.name.clone(),
            rank: Some(officer.rank.clone()),
            tasks: officer.tasks.clone(),
            station: station.filter(|s| !s.is_empty()),
            division: division.filter(|s| !s.is_empty()),
            squad_size,
            beat: beat.filter(|s| !s.is_empty()),
        }
    }
}

impl From<OfficerRow> for Officer {
    fn from(row: OfficerRow) -> Self {
        let mut role = OfficerRole::from_literal(&row.kind);
        match &mut role {
            OfficerRole::Sho { station } => *station = row.station.unwrap_or_default(),
            OfficerRole::Inspector { division } => *division = row.division.unwrap_or_default(),
            OfficerRole::HeadConstable { squad_size } => {
                *squad_size = row.squad_size.unwrap_or_default();
            }
            OfficerRole::Constable { beat } => *beat = row.beat.unwrap_or_default(),
            OfficerRole::SubInspector | OfficerRole::Other { .. } => {}
        }

        let mut officer = Self::new(row.id, row.name, role);
        if let Some(rank) = row.rank {
            officer.rank = rank;
        }
        officer.tasks = row.tasks;
        officer
    }
}

/// Contents of `officers.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficerDocument {
    /// Every officer, in insertion order.
    #[serde(default)]
    pub officers: Vec<OfficerRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_literals_round_trip() {
        for literal in [SHO, INSPECTOR, SUB_INSPECTOR, HEAD_CONSTABLE, CONSTABLE] {
            assert_eq!(OfficerRole::from_literal(literal).literal(), literal);
        }
        assert_eq!(OfficerRole::from_literal("sho").literal(), "sho");
        assert_eq!(OfficerRole::from_literal("").literal(), GENERIC_OFFICER);
    }

    #[test]
    fn new_officer_takes_role_rank() {
        let officer = Officer::from_kind(SHO, 1, "Ali Khan");
        assert_eq!(officer.rank, "Station House Officer");
        assert!(officer.tasks.is_empty());
        assert!(!officer.is_head_constable());
    }

    #[test]
    fn seniority_orders_chain_of_command() {
        let sho = OfficerRole::from_literal(SHO);
        let constable = OfficerRole::from_literal(CONSTABLE);
        assert!(sho.seniority() > constable.seniority());
        assert_eq!(OfficerRole::from_literal("Cadet").seniority(), 0);
    }

    #[test]
    fn set_field_respects_role() {
        let mut officer = Officer::from_kind(HEAD_CONSTABLE, 4, "Sara");
        officer.set_field("squadSize", "6").unwrap();
        assert_eq!(officer.role, OfficerRole::HeadConstable { squad_size: 6 });

        assert!(officer.set_field("beat", "North").is_err());
        assert!(officer.set_field("squadSize", "-1").is_err());
        assert!(officer.set_field("role", SHO).is_err());

        officer.set_field("tasks", "Night patrol, File report").unwrap();
        assert_eq!(officer.tasks, vec!["Night patrol", "File report"]);
    }

    #[test]
    fn describe_lists_tasks() {
        let mut officer = Officer::from_kind(CONSTABLE, 2, "Bilal");
        officer.tasks.push("Traffic duty".to_string());
        let text = officer.describe();
        assert!(text.contains("1. Traffic duty"));
        assert!(!text.contains("Beat"));
    }

    #[test]
    fn row_round_trip_keeps_role_fields() {
        let mut officer = Officer::from_kind(INSPECTOR, 3, "Omar");
        officer.set_field("division", "Homicide").unwrap();
        officer.set_field("rank", "Senior Inspector").unwrap();

        let json = serde_json::to_string(&OfficerRow::from(&officer)).unwrap();
        assert!(json.contains("\"division\":\"Homicide\""));
        assert!(!json.contains("beat"));

        let row: OfficerRow = serde_json::from_str(&json).unwrap();
        assert_eq!(Officer::from(row), officer);
    }
}
