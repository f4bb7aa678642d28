#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Jail cell and prisoner record types.
//!
//! A cell's occupant list and each prisoner's `cell_id` describe the same
//! relation from both ends. The prisoner side is authoritative; the jail
//! manager rebuilds occupant lists from it whenever the two could diverge.

use lems_record_store::{FieldPatch, Record, RecordError, RecordId, fields};
use serde::{Deserialize, Serialize};

/// Kind literal for high security cells.
pub const HIGH_SECURITY: &str = "High Security";
/// Kind literal for standard cells.
pub const STANDARD: &str = "Standard";
/// Surveillance level given to new high security cells.
pub const DEFAULT_SURVEILLANCE_LEVEL: u8 = 3;
/// Kind reported for prisoners with no offense recorded.
pub const UNSPECIFIED_OFFENSE: &str = "Unspecified";

// ---------------------------------------------------------------------------
// Cells
// ---------------------------------------------------------------------------

/// Kind-specific cell fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellKind {
    /// Monitored cell for dangerous prisoners.
    HighSecurity {
        /// Monitoring intensity.
        surveillance_level: u8,
    },
    /// Ordinary cell.
    Standard,
    /// Any other cell type, identified only by its label.
    Other {
        /// The type label as entered.
        label: String,
    },
}

impl CellKind {
    /// Builds a kind from its literal. Matching is exact; anything else
    /// becomes [`CellKind::Other`].
    #[must_use]
    pub fn from_literal(literal: &str) -> Self {
        match literal {
            HIGH_SECURITY => Self::HighSecurity {
                surveillance_level: DEFAULT_SURVEILLANCE_LEVEL,
            },
            STANDARD => Self::Standard,
            other => Self::Other {
                label: other.to_string(),
            },
        }
    }

    /// The kind literal.
    #[must_use]
    pub fn literal(&self) -> &str {
        match self {
            Self::HighSecurity { .. } => HIGH_SECURITY,
            Self::Standard => STANDARD,
            Self::Other { label } => label,
        }
    }
}

/// A jail cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// Cell id.
    pub id: RecordId,
    /// Number of prisoners the cell holds.
    pub capacity: u32,
    /// Ids of the prisoners housed here, in admission order.
    pub occupants: Vec<RecordId>,
    /// Officer responsible for the cell.
    pub assigned_officer_id: Option<RecordId>,
    /// Kind and its specific fields.
    pub details: CellKind,
}

impl Cell {
    /// Creates an empty cell from a kind literal.
    #[must_use]
    pub fn from_kind(kind: &str, id: RecordId, capacity: u32) -> Self {
        Self {
            id,
            capacity,
            occupants: Vec::new(),
            assigned_officer_id: None,
            details: CellKind::from_literal(kind),
        }
    }

    /// Creates a high security cell.
    #[must_use]
    pub fn high_security(id: RecordId, capacity: u32) -> Self {
        Self::from_kind(HIGH_SECURITY, id, capacity)
    }

    /// Creates a standard cell.
    #[must_use]
    pub fn standard(id: RecordId, capacity: u32) -> Self {
        Self::from_kind(STANDARD, id, capacity)
    }

    /// Number of prisoners housed.
    #[must_use]
    pub fn occupancy(&self) -> usize {
        self.occupants.len()
    }

    /// Returns `true` if no more prisoners fit.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.occupancy() >= self.capacity as usize
    }

    /// Free places left, zero when over capacity.
    #[must_use]
    pub fn free_places(&self) -> usize {
        (self.capacity as usize).saturating_sub(self.occupancy())
    }

    /// One-line summary for listings.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} (ID: {}, Cap: {}) {}/{} occupied",
            self.kind(),
            self.id,
            self.capacity,
            self.occupancy(),
            self.capacity
        )
    }

    /// Multi-line summary of every populated field.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut lines = vec![
            format!("Cell {} - {}", self.id, self.kind()),
            format!("  Capacity: {}", self.capacity),
            format!("  Occupancy: {}", self.occupancy()),
        ];
        if let CellKind::HighSecurity { surveillance_level } = self.details {
            lines.push(format!("  Surveillance level: {surveillance_level}"));
        }
        if !self.occupants.is_empty() {
            let ids: Vec<String> = self.occupants.iter().map(ToString::to_string).collect();
            lines.push(format!("  Prisoners: {}", ids.join(", ")));
        }
        if let Some(officer) = self.assigned_officer_id {
            lines.push(format!("  Assigned officer: {officer}"));
        }
        lines.join("\n")
    }
}

impl Record for Cell {
    const FAMILY: &'static str = "Cell";

    fn id(&self) -> RecordId {
        self.id
    }

    fn kind(&self) -> &str {
        self.details.literal()
    }
}

impl FieldPatch for Cell {
    fn set_field(&mut self, field: &str, value: &str) -> Result<(), RecordError> {
        let kind = self.kind().to_string();
        match (field, &mut self.details) {
            ("id", _) => return Err(fields::immutable_id()),
            ("capacity", _) => {
                let capacity: u32 = fields::parse(field, value)?;
                if (capacity as usize) < self.occupants.len() {
                    return Err(RecordError::invalid_field(
                        field,
                        format!(
                            "cell holds {} prisoner(s); release some first",
                            self.occupants.len()
                        ),
                    ));
                }
                self.capacity = capacity;
            }
            ("assignedOfficerId", _) => {
                self.assigned_officer_id = fields::parse_reference(field, value)?;
            }
            ("surveillanceLevel", CellKind::HighSecurity { surveillance_level }) => {
                *surveillance_level = fields::parse(field, value)?;
            }
            ("surveillanceLevel", _) => return Err(fields::not_applicable(field, &kind)),
            ("occupants", _) => {
                return Err(RecordError::invalid_field(
                    field,
                    "admit, release, or transfer prisoners instead",
                ));
            }
            _ => return Err(fields::unknown(field)),
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Prisoners
// ---------------------------------------------------------------------------

/// A prisoner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prisoner {
    /// Prisoner id.
    pub id: RecordId,
    /// Full name.
    #[serde(default)]
    pub name: String,
    /// Offense convicted of.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub offense: String,
    /// Sentence length. Not validated.
    #[serde(default)]
    pub sentence_years: f64,
    /// Cell currently housing the prisoner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_id: Option<RecordId>,
}

impl Prisoner {
    /// Creates a prisoner not yet housed in any cell.
    #[must_use]
    pub fn new(id: RecordId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            offense: String::new(),
            sentence_years: 0.0,
            cell_id: None,
        }
    }

    /// One-line summary for listings.
    #[must_use]
    pub fn summary(&self) -> String {
        let housing = self
            .cell_id
            .map_or_else(|| "not housed".to_string(), |cell| format!("cell {cell}"));
        format!("{} (ID: {}) - {housing}", self.name, self.id)
    }

    /// Multi-line summary of every populated field.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut lines = vec![
            format!("Prisoner {}", self.id),
            format!("  Name: {}", self.name),
        ];
        if !self.offense.is_empty() {
            lines.push(format!("  Offense: {}", self.offense));
        }
        lines.push(format!("  Sentence: {} year(s)", self.sentence_years));
        if let Some(cell) = self.cell_id {
            lines.push(format!("  Cell: {cell}"));
        }
        lines.join("\n")
    }
}

impl Record for Prisoner {
    const FAMILY: &'static str = "Prisoner";

    fn id(&self) -> RecordId {
        self.id
    }

    fn kind(&self) -> &str {
        if self.offense.is_empty() {
            UNSPECIFIED_OFFENSE
        } else {
            &self.offense
        }
    }
}

impl FieldPatch for Prisoner {
    fn set_field(&mut self, field: &str, value: &str) -> Result<(), RecordError> {
        match field {
            "id" => return Err(fields::immutable_id()),
            "name" => self.name = value.trim().to_string(),
            "offense" => self.offense = value.trim().to_string(),
            "sentenceYears" => self.sentence_years = fields::parse_finite(field, value)?,
            "cellId" => {
                return Err(RecordError::invalid_field(
                    field,
                    "admit, release, or transfer the prisoner instead",
                ));
            }
            _ => return Err(fields::unknown(field)),
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Persisted shapes
// ---------------------------------------------------------------------------

/// Flat JSON shape of a [`Cell`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellRow {
    /// Cell id.
    pub id: RecordId,
    /// Kind literal.
    pub kind: String,
    /// Capacity.
    #[serde(default)]
    pub capacity: u32,
    /// Occupant ids as last saved. Rebuilt from prisoners on load.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub occupants: Vec<RecordId>,
    /// Responsible officer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_officer_id: Option<RecordId>,
    /// High security cells only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surveillance_level: Option<u8>,
}

impl From<&Cell> for CellRow {
    fn from(cell: &Cell) -> Self {
        let surveillance_level = match cell.details {
            CellKind::HighSecurity { surveillance_level } => Some(surveillance_level),
            _ => None,
        };
        Self {
            id: cell.id,
            kind: cell.kind().to_string(),
            capacity: cell.capacity,
            occupants: cell.occupants.clone(),
            assigned_officer_id: cell.assigned_officer_id,
            surveillance_level,
        }
    }
}

impl From<CellRow> for Cell {
    fn from(row: CellRow) -> Self {
        let mut cell = Self::from_kind(&row.kind, row.id, row.capacity);
        cell.occupants = row.occupants;
        cell.assigned_officer_id = row.assigned_officer_id;
        if let (CellKind::HighSecurity { surveillance_level }, Some(level)) =
            (&mut cell.details, row.surveillance_level)
        {
            *surveillance_level = level;
        }
        cell
    }
}

/// Prisoners are persisted as-is.
pub type PrisonerRow = Prisoner;

/// Contents of `jail.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JailDocument {
    /// Every cell, in insertion order.
    #[serde(default)]
    pub cells: Vec<CellRow>,
    /// Every prisoner, in insertion order.
    #[serde(default)]
    pub prisoners: Vec<PrisonerRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals_match_file_format() {
        let cell = Cell::from_kind("High Security", 1, 2);
        assert_eq!(
            cell.details,
            CellKind::HighSecurity {
                surveillance_level: DEFAULT_SURVEILLANCE_LEVEL
            }
        );
        assert_eq!(Cell::from_kind("HighSecurity", 2, 2).kind(), "HighSecurity");
        assert_eq!(Cell::standard(3, 4).kind(), STANDARD);
    }

    #[test]
    fn capacity_and_free_places() {
        let mut cell = Cell::standard(1, 2);
        assert!(!cell.is_full());
        cell.occupants = vec![10, 11];
        assert!(cell.is_full());
        assert_eq!(cell.free_places(), 0);

        assert!(cell.set_field("capacity", "1").is_err());
        cell.set_field("capacity", "3").unwrap();
        assert_eq!(cell.free_places(), 1);
        assert!(Cell::standard(2, 0).is_full());
    }

    #[test]
    fn cell_fields_are_checked() {
        let mut cell = Cell::high_security(1, 1);
        cell.set_field("surveillanceLevel", "5").unwrap();
        cell.set_field("assignedOfficerId", "7").unwrap();
        assert_eq!(cell.assigned_officer_id, Some(7));
        assert!(cell.set_field("occupants", "1,2").is_err());
        assert!(cell.set_field("surveillanceLevel", "300").is_err());

        let mut standard = Cell::standard(2, 1);
        assert!(standard.set_field("surveillanceLevel", "1").is_err());
    }

    #[test]
    fn negative_sentences_are_accepted() {
        let mut prisoner = Prisoner::new(1, "Tariq");
        prisoner.set_field("sentenceYears", "-2.5").unwrap();
        assert!((prisoner.sentence_years + 2.5).abs() < f64::EPSILON);
        assert!(prisoner.set_field("sentenceYears", "NaN").is_err());
        assert!(prisoner.set_field("cellId", "3").is_err());
        assert_eq!(prisoner.kind(), UNSPECIFIED_OFFENSE);
    }

    #[test]
    fn cell_row_round_trip() {
        let mut cell = Cell::high_security(4, 2);
        cell.set_field("surveillanceLevel", "4").unwrap();
        cell.occupants.push(9);

        let json = serde_json::to_string(&CellRow::from(&cell)).unwrap();
        assert!(json.contains("\"kind\":\"High Security\""));
        assert!(!json.contains("assignedOfficerId"));

        let row: CellRow = serde_json::from_str(&json).unwrap();
        assert_eq!(Cell::from(row), cell);
    }
}
