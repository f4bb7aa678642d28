#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Crime case and location record types.
//!
//! A [`Case`] carries the fields common to every case plus a
//! [`CaseDetails`] variant per kind. The kind decides how the case's
//! [`priority`](Prioritized::priority) is derived from its severity, and
//! which kind-specific fields [`FieldPatch::set_field`] accepts.
//!
//! [`CaseRow`] and [`LocationRow`] are the flat shapes written to
//! `crimes.json`.

use lems_record_store::{FieldPatch, Prioritized, Record, RecordError, RecordId, fields};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Kind literal for thefts.
pub const THEFT: &str = "Theft";
/// Kind literal for assaults.
pub const ASSAULT: &str = "Assault";
/// Kind literal for vandalism.
pub const VANDALISM: &str = "Vandalism";

/// Investigation status of a case.
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
pub enum CaseStatus {
    /// Reported, nobody assigned yet.
    #[default]
    Open,
    /// Actively being worked.
    UnderInvestigation,
    /// Resolved or dismissed.
    Closed,
}

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

/// A place cases can be filed against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Location id.
    pub id: RecordId,
    /// Short name, e.g. "Central Market".
    pub name: String,
    /// District or precinct.
    #[serde(default)]
    pub area: String,
    /// Free-form notes.
    #[serde(default)]
    pub description: String,
}

impl Location {
    /// Creates a location with only a name.
    #[must_use]
    pub fn new(id: RecordId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            area: String::new(),
            description: String::new(),
        }
    }

    /// Multi-line summary of every populated field.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut lines = vec![format!("Location {}: {}", self.id, self.name)];
        if !self.area.is_empty() {
            lines.push(format!("  Area: {}", self.area));
        }
        if !self.description.is_empty() {
            lines.push(format!("  Description: {}", self.description));
        }
        lines.join("\n")
    }
}

impl Record for Location {
    const FAMILY: &'static str = "Location";

    fn id(&self) -> RecordId {
        self.id
    }

    fn kind(&self) -> &str {
        "Location"
    }
}

impl FieldPatch for Location {
    fn set_field(&mut self, field: &str, value: &str) -> Result<(), RecordError> {
        match field {
            "id" => return Err(fields::immutable_id()),
            "name" => self.name = value.trim().to_string(),
            "area" => self.area = value.trim().to_string(),
            "description" => self.description = value.trim().to_string(),
            _ => return Err(fields::unknown(field)),
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Case
// ---------------------------------------------------------------------------

/// Kind-specific part of a [`Case`].
#[derive(Debug, Clone, PartialEq)]
pub enum CaseDetails {
    /// Property taken.
    Theft {
        /// Value of the stolen property, in whole currency units.
        stolen_value: i64,
        /// What was taken.
        item_stolen: String,
        /// Whether the property has been recovered.
        recovered: bool,
    },
    /// Violence against a person.
    Assault {
        /// Whether a weapon was involved.
        weapon_used: bool,
        /// Injury severity on a 0-10 scale.
        injury_severity: f64,
    },
    /// Damage to property.
    Vandalism {
        /// Cost of the damage, in whole currency units.
        damage_value: i64,
        /// Whether the damaged property is publicly owned.
        is_public_property: bool,
    },
    /// Any other kind, identified only by its label.
    Other {
        /// The kind label as entered.
        label: String,
    },
}

/// A crime case.
#[derive(Debug, Clone, PartialEq)]
pub struct Case {
    /// Case id.
    pub id: RecordId,
    /// Base severity before kind adjustments.
    pub severity: f64,
    /// Free-form description.
    pub description: String,
    /// Where the case happened, by [`Location`] id.
    pub location_id: Option<RecordId>,
    /// Investigation status.
    pub status: CaseStatus,
    /// Kind-specific fields.
    pub details: CaseDetails,
}

impl Case {
    /// Creates a theft with no stolen value and severity 2.0.
    #[must_use]
    pub fn theft(id: RecordId) -> Self {
        Self::with_details(
            id,
            2.0,
            CaseDetails::Theft {
                stolen_value: 0,
                item_stolen: String::new(),
                recovered: false,
            },
        )
    }

    /// Creates an unarmed, injury-free assault with severity 4.0.
    #[must_use]
    pub fn assault(id: RecordId) -> Self {
        Self::with_details(
            id,
            4.0,
            CaseDetails::Assault {
                weapon_used: false,
                injury_severity: 0.0,
            },
        )
    }

    /// Creates a private-property vandalism case with severity 1.5.
    #[must_use]
    pub fn vandalism(id: RecordId) -> Self {
        Self::with_details(
            id,
            1.5,
            CaseDetails::Vandalism {
                damage_value: 0,
                is_public_property: false,
            },
        )
    }

    /// Creates a case of an unrecognised kind with severity 1.0.
    #[must_use]
    pub fn other(id: RecordId, label: impl Into<String>) -> Self {
        Self::with_details(
            id,
            1.0,
            CaseDetails::Other {
                label: label.into(),
            },
        )
    }

    /// Creates a case from its kind literal.
    ///
    /// Matching is exact and case-sensitive. Unrecognised kinds become
    /// [`CaseDetails::Other`] carrying the literal as its label.
    #[must_use]
    pub fn from_kind(kind: &str, id: RecordId) -> Self {
        match kind {
            THEFT => Self::theft(id),
            ASSAULT => Self::assault(id),
            VANDALISM => Self::vandalism(id),
            other => Self::other(id, other),
        }
    }

    const fn with_details(id: RecordId, severity: f64, details: CaseDetails) -> Self {
        Self {
            id,
            severity,
            description: String::new(),
            location_id: None,
            status: CaseStatus::Open,
            details,
        }
    }

    /// Stolen value for thefts, zero otherwise.
    #[must_use]
    pub const fn stolen_value(&self) -> i64 {
        match self.details {
            CaseDetails::Theft { stolen_value, .. } => stolen_value,
            _ => 0,
        }
    }

    /// Damage value for vandalism, zero otherwise.
    #[must_use]
    pub const fn damage_value(&self) -> i64 {
        match self.details {
            CaseDetails::Vandalism { damage_value, .. } => damage_value,
            _ => 0,
        }
    }

    /// One-line summary for listings.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} (ID: {}) priority {:.2} [{}]",
            self.kind(),
            self.id,
            self.priority(),
            self.status
        )
    }

    /// Multi-line summary of every populated field.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut lines = vec![
            format!("Case {} - {}", self.id, self.kind()),
            format!("  Status: {}", self.status),
            format!("  Severity: {:.2}", self.severity),
            format!("  Priority: {:.2}", self.priority()),
        ];
        if !self.description.is_empty() {
            lines.push(format!("  Description: {}", self.description));
        }
        if let Some(location_id) = self.location_id {
            lines.push(format!("  Location: {location_id}"));
        }

        match &self.details {
            CaseDetails::Theft {
                stolen_value,
                item_stolen,
                recovered,
            } => {
                if !item_stolen.is_empty() {
                    lines.push(format!("  Item stolen: {item_stolen}"));
                }
                if *stolen_value != 0 {
                    lines.push(format!("  Stolen value: {stolen_value}"));
                }
                if *recovered {
                    lines.push("  Recovered: yes".to_string());
                }
            }
            CaseDetails::Assault {
                weapon_used,
                injury_severity,
            } => {
                if *weapon_used {
                    lines.push("  Weapon used: yes".to_string());
                }
                if *injury_severity != 0.0 {
                    lines.push(format!("  Injury severity: {injury_severity}"));
                }
            }
            CaseDetails::Vandalism {
                damage_value,
                is_public_property,
            } => {
                if *damage_value != 0 {
                    lines.push(format!("  Damage value: {damage_value}"));
                }
                if *is_public_property {
                    lines.push("  Public property: yes".to_string());
                }
            }
            CaseDetails::Other { .. } => {}
        }

        lines.join("\n")
    }
}

impl Record for Case {
    const FAMILY: &'static str = "Case";

    fn id(&self) -> RecordId {
        self.id
    }

    fn kind(&self) -> &str {
        match &self.details {
            CaseDetails::Theft { .. } => THEFT,
            CaseDetails::Assault { .. } => ASSAULT,
            CaseDetails::Vandalism { .. } => VANDALISM,
            CaseDetails::Other { label } => label,
        }
    }
}

impl Prioritized for Case {
    #[allow(clippy::cast_precision_loss)]
    fn priority(&self) -> f64 {
        let adjustment = match &self.details {
            CaseDetails::Theft {
                stolen_value,
                recovered,
                ..
            } => *stolen_value as f64 / 1000.0 - if *recovered { 1.0 } else { 0.0 },
            CaseDetails::Assault {
                weapon_used,
                injury_severity,
            } => (if *weapon_used { 3.0 } else { 0.0 }) + 0.5 * injury_severity,
            CaseDetails::Vandalism {
                damage_value,
                is_public_property,
            } => *damage_value as f64 / 2000.0 + if *is_public_property { 1.0 } else { 0.0 },
            CaseDetails::Other { .. } => 0.0,
        };
        self.severity + adjustment
    }
}

impl FieldPatch for Case {
    fn set_field(&mut self, field: &str, value: &str) -> Result<(), RecordError> {
        let kind = self.kind().to_string();
        match (field, &mut self.details) {
            ("id", _) => return Err(fields::immutable_id()),
            ("kind", _) => {
                return Err(RecordError::invalid_field(
                    field,
                    "the kind of a case cannot be changed",
                ));
            }
            ("severity", _) => self.severity = fields::parse_finite(field, value)?,
            ("description", _) => self.description = value.trim().to_string(),
            ("locationId", _) => self.location_id = fields::parse_reference(field, value)?,
            ("status", _) => self.status = fields::parse(field, value)?,

            ("stolenValue", CaseDetails::Theft { stolen_value, .. }) => {
                *stolen_value = fields::parse(field, value)?;
            }
            ("itemStolen", CaseDetails::Theft { item_stolen, .. }) => {
                *item_stolen = value.trim().to_string();
            }
            ("recovered", CaseDetails::Theft { recovered, .. }) => {
                *recovered = fields::parse_bool(field, value)?;
            }

            ("weaponUsed", CaseDetails::Assault { weapon_used, .. }) => {
                *weapon_used = fields::parse_bool(field, value)?;
            }
            ("injurySeverity", CaseDetails::Assault { injury_severity, .. }) => {
                *injury_severity = fields::parse_finite(field, value)?;
            }

            ("damageValue", CaseDetails::Vandalism { damage_value, .. }) => {
                *damage_value = fields::parse(field, value)?;
            }
            (
                "isPublicProperty",
                CaseDetails::Vandalism {
                    is_public_property, ..
                },
            ) => {
                *is_public_property = fields::parse_bool(field, value)?;
            }

            (
                "stolenValue" | "itemStolen" | "recovered" | "weaponUsed" | "injurySeverity"
                | "damageValue" | "isPublicProperty",
                _,
            ) => return Err(fields::not_applicable(field, &kind)),
            _ => return Err(fields::unknown(field)),
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Persisted shapes
// ---------------------------------------------------------------------------

/// Flat JSON shape of a [`Case`]. Fields that do not apply to the kind are
/// omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseRow {
    /// Case id.
    pub id: RecordId,
    /// Kind literal.
    pub kind: String,
    /// Base severity; the kind default when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<f64>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Location reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<RecordId>,
    /// Investigation status.
    #[serde(default)]
    pub status: CaseStatus,
    /// Theft only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stolen_value: Option<i64>,
    /// Theft only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_stolen: Option<String>,
    /// Theft only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recovered: Option<bool>,
    /// Assault only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weapon_used: Option<bool>,
    /// Assault only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub injury_severity: Option<f64>,
    /// Vandalism only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage_value: Option<i64>,
    /// Vandalism only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_public_property: Option<bool>,
}

impl From<&Case> for CaseRow {
    fn from(case: &Case) -> Self {
        let mut row = Self {
            id: case.id,
            kind: case.kind().to_string(),
            severity: Some(case.severity),
            description: case.description.clone(),
            location_id: case.location_id,
            status: case.status,
            stolen_value: None,
            item_stolen: None,
            recovered: None,
            weapon_used: None,
            injury_severity: None,
            damage_value: None,
            is_public_property: None,
        };

        match &case.details {
            CaseDetails::Theft {
                stolen_value,
                item_stolen,
                recovered,
            } => {
                row.stolen_value = Some(*stolen_value);
                row.item_stolen = Some(item_stolen.clone()).filter(|s| !s.is_empty());
                row.recovered = Some(*recovered);
            }
            CaseDetails::Assault {
                weapon_used,
                injury_severity,
            } => {
                row.weapon_used = Some(*weapon_used);
                row.injury_severity = Some(*injury_severity);
            }
            CaseDetails::Vandalism {
                damage_value,
                is_public_property,
            } => {
                row.damage_value = Some(*damage_value);
                row.is_public_property = Some(*is_public_property);
            }
            CaseDetails::Other { .. } => {}
        }

        row
    }
}

impl From<CaseRow> for Case {
    fn from(row: CaseRow) -> Self {
        let mut case = Self::from_kind(&row.kind, row.id);
        if let Some(severity) = row.severity {
            case.severity = severity;
        }
        case.description = row.description;
        case.location_id = row.location_id;
        case.status = row.status;

        match &mut case.details {
            CaseDetails::Theft {
                stolen_value,
                item_stolen,
                recovered,
            } => {
                *stolen_value = row.stolen_value.unwrap_or_default();
                *item_stolen = row.item_stolen.unwrap_or_default();
                *recovered = row.recovered.unwrap_or_default();
            }
            CaseDetails::Assault {
                weapon_used,
                injury_severity,
            } => {
                *weapon_used = row.weapon_used.unwrap_or_default();
                *injury_severity = row.injury_severity.unwrap_or_default();
            }
            CaseDetails::Vandalism {
                damage_value,
                is_public_property,
            } => {
                *damage_value = row.damage_value.unwrap_or_default();
                *is_public_property = row.is_public_property.unwrap_or_default();
            }
            CaseDetails::Other { .. } => {}
        }

        case
    }
}

/// Flat JSON shape of a [`Location`].
pub type LocationRow = Location;

/// Contents of `crimes.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrimeDocument {
    /// Every location, in insertion order.
    #[serde(default)]
    pub locations: Vec<LocationRow>,
    /// Every case, in insertion order.
    #[serde(default)]
    pub cases: Vec<CaseRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn theft_priority_scales_with_value_and_recovery() {
        let mut case = Case::theft(1);
        case.set_field("stolenValue", "3000").unwrap();
        assert_close(case.priority(), 5.0);

        case.set_field("recovered", "yes").unwrap();
        assert_close(case.priority(), 4.0);
    }

    #[test]
    fn assault_priority_counts_weapon_and_injury() {
        let mut case = Case::assault(2);
        case.set_field("severity", "5.0").unwrap();
        case.set_field("weaponUsed", "true").unwrap();
        case.set_field("injurySeverity", "4").unwrap();
        assert_close(case.priority(), 10.0);
    }

    #[test]
    fn vandalism_priority_counts_damage_and_public_property() {
        let mut case = Case::vandalism(3);
        case.set_field("damageValue", "4000").unwrap();
        case.set_field("isPublicProperty", "y").unwrap();
        assert_close(case.priority(), 1.5 + 2.0 + 1.0);
    }

    #[test]
    fn from_kind_is_case_sensitive_with_generic_fallback() {
        assert_eq!(Case::from_kind("Theft", 1).kind(), THEFT);
        let lower = Case::from_kind("theft", 1);
        assert_eq!(lower.kind(), "theft");
        assert!(matches!(lower.details, CaseDetails::Other { .. }));
        assert_close(lower.priority(), lower.severity);
    }

    #[test]
    fn theft_defaults() {
        let case = Case::theft(9);
        assert_close(case.severity, 2.0);
        assert_eq!(case.stolen_value(), 0);
        assert_eq!(case.status, CaseStatus::Open);
        match case.details {
            CaseDetails::Theft {
                ref item_stolen,
                recovered,
                ..
            } => {
                assert!(item_stolen.is_empty());
                assert!(!recovered);
            }
            _ => panic!("expected theft"),
        }
    }

    #[test]
    fn set_field_rejects_fields_of_other_kinds() {
        let mut case = Case::assault(2);
        let before = case.clone();
        let err = case.set_field("stolenValue", "100").unwrap_err();
        assert!(err.to_string().contains("not applicable"));
        assert!(case.set_field("badField", "1").is_err());
        assert!(case.set_field("id", "5").is_err());
        assert!(case.set_field("severity", "high").is_err());
        assert!(case.set_field("severity", "NaN").is_err());
        assert!(case.set_field("injurySeverity", "inf").is_err());
        assert_eq!(case, before);
    }

    #[test]
    fn status_parses_from_variant_name() {
        let mut case = Case::theft(1);
        case.set_field("status", "UnderInvestigation").unwrap();
        assert_eq!(case.status, CaseStatus::UnderInvestigation);
        assert!(case.set_field("status", "Pending").is_err());
    }

    #[test]
    fn describe_includes_populated_fields_only() {
        let mut case = Case::theft(1);
        let bare = case.describe();
        assert!(!bare.contains("Item stolen"));
        assert!(!bare.contains("Location"));

        case.set_field("itemStolen", "Bicycle").unwrap();
        case.set_field("locationId", "4").unwrap();
        case.set_field("description", "Taken from rack").unwrap();
        let text = case.describe();
        assert!(text.contains("Item stolen: Bicycle"));
        assert!(text.contains("Location: 4"));
        assert!(text.contains("Description: Taken from rack"));
    }

    #[test]
    fn row_omits_fields_of_other_kinds() {
        let case = Case::assault(2);
        let json = serde_json::to_string(&CaseRow::from(&case)).unwrap();
        assert!(json.contains("\"kind\":\"Assault\""));
        assert!(json.contains("weaponUsed"));
        assert!(!json.contains("stolenValue"));
        assert!(!json.contains("locationId"));
    }

    #[test]
    fn row_without_optional_fields_uses_kind_defaults() {
        let row: CaseRow = serde_json::from_str(r#"{"id": 4, "kind": "Vandalism"}"#).unwrap();
        let case = Case::from(row);
        assert_eq!(case, Case::vandalism(4));
    }

    #[test]
    fn other_kind_label_survives_rows() {
        let case = Case::other(6, "Fraud");
        let back = Case::from(CaseRow::from(&case));
        assert_eq!(back.kind(), "Fraud");
        assert_eq!(back, case);
    }
}
