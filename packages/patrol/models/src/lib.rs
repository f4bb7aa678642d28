#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Patrol vehicle and shift record types.

use lems_record_store::{FieldPatch, Record, RecordError, RecordId, fields};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Kind literal for cars.
pub const CAR: &str = "Car";
/// Kind literal for motorbikes.
pub const BIKE: &str = "Bike";

// ---------------------------------------------------------------------------
// Vehicles
// ---------------------------------------------------------------------------

/// Kind-specific vehicle fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VehicleKind {
    /// Patrol car.
    Car {
        /// Seats including the driver.
        seating_capacity: u32,
    },
    /// Patrol motorbike.
    Bike {
        /// Engine displacement in cc.
        engine_cc: u32,
    },
    /// Any other vehicle type, identified only by its label.
    Other {
        /// The type label as entered.
        label: String,
    },
}

impl VehicleKind {
    /// Builds a kind from its literal. Matching is exact; anything else
    /// becomes [`VehicleKind::Other`].
    #[must_use]
    pub fn from_literal(literal: &str) -> Self {
        match literal {
            CAR => Self::Car {
                seating_capacity: 4,
            },
            BIKE => Self::Bike { engine_cc: 0 },
            other => Self::Other {
                label: other.to_string(),
            },
        }
    }

    /// The kind literal.
    #[must_use]
    pub fn literal(&self) -> &str {
        match self {
            Self::Car { .. } => CAR,
            Self::Bike { .. } => BIKE,
            Self::Other { label } => label,
        }
    }
}

/// A fleet vehicle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vehicle {
    /// Vehicle id.
    pub id: RecordId,
    /// Make and model.
    pub model: String,
    /// Model year; zero when unknown.
    pub year: i32,
    /// Odometer reading in whole kilometres.
    pub mileage: u64,
    /// `false` while out on patrol or in the workshop.
    pub available: bool,
    /// Kind and its specific fields.
    pub details: VehicleKind,
}

impl Vehicle {
    /// Creates an available vehicle from a kind literal.
    #[must_use]
    pub fn from_kind(kind: &str, id: RecordId) -> Self {
        Self {
            id,
            model: String::new(),
            year: 0,
            mileage: 0,
            available: true,
            details: VehicleKind::from_literal(kind),
        }
    }

    /// Creates a car.
    #[must_use]
    pub fn car(id: RecordId) -> Self {
        Self::from_kind(CAR, id)
    }

    /// Creates a bike.
    #[must_use]
    pub fn bike(id: RecordId) -> Self {
        Self::from_kind(BIKE, id)
    }

    /// One-line summary for listings.
    #[must_use]
    pub fn summary(&self) -> String {
        let availability = if self.available {
            "available"
        } else {
            "in use"
        };
        if self.model.is_empty() {
            format!("{} (ID: {}) [{availability}]", self.kind(), self.id)
        } else {
            format!(
                "{} {} (ID: {}) [{availability}]",
                self.kind(),
                self.model,
                self.id
            )
        }
    }

    /// Multi-line summary of every populated field.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut lines = vec![format!("Vehicle {} - {}", self.id, self.kind())];
        if !self.model.is_empty() {
            lines.push(format!("  Model: {}", self.model));
        }
        if self.year != 0 {
            lines.push(format!("  Year: {}", self.year));
        }
        lines.push(format!("  Mileage: {} km", self.mileage));
        lines.push(format!(
            "  Available: {}",
            if self.available { "yes" } else { "no" }
        ));
        match &self.details {
            VehicleKind::Car { seating_capacity } => {
                lines.push(format!("  Seats: {seating_capacity}"));
            }
            VehicleKind::Bike { engine_cc } if *engine_cc > 0 => {
                lines.push(format!("  Engine: {engine_cc} cc"));
            }
            _ => {}
        }
        lines.join("\n")
    }
}

impl Record for Vehicle {
    const FAMILY: &'static str = "Vehicle";

    fn id(&self) -> RecordId {
        self.id
    }

    fn kind(&self) -> &str {
        self.details.literal()
    }
}

impl FieldPatch for Vehicle {
    fn set_field(&mut self, field: &str, value: &str) -> Result<(), RecordError> {
        let kind = self.kind().to_string();
        match (field, &mut self.details) {
            ("id", _) => return Err(fields::immutable_id()),
            ("model", _) => self.model = value.trim().to_string(),
            ("year", _) => self.year = fields::parse(field, value)?,
            ("mileage", _) => self.mileage = fields::parse(field, value)?,
            ("available", _) => self.available = fields::parse_bool(field, value)?,
            ("seatingCapacity", VehicleKind::Car { seating_capacity }) => {
                *seating_capacity = fields::parse(field, value)?;
            }
            ("engineCc", VehicleKind::Bike { engine_cc }) => {
                *engine_cc = fields::parse(field, value)?;
            }
            ("seatingCapacity" | "engineCc", _) => {
                return Err(fields::not_applicable(field, &kind));
            }
            _ => return Err(fields::unknown(field)),
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Patrols
// ---------------------------------------------------------------------------

/// Duty shift.
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
pub enum Shift {
    /// 06:00 to 14:00.
    #[default]
    Morning,
    /// 14:00 to 22:00.
    Evening,
    /// 22:00 to 06:00.
    Night,
}

/// One officer out in one vehicle for one shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patrol {
    /// Patrol id.
    pub id: RecordId,
    /// Vehicle in use.
    pub vehicle_id: RecordId,
    /// Officer on patrol.
    pub officer_id: RecordId,
    /// Area covered.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub area: String,
    /// Shift worked.
    #[serde(default)]
    pub shift: Shift,
    /// `true` until the patrol is ended.
    #[serde(default)]
    pub active: bool,
}

impl Patrol {
    /// Creates an active patrol.
    #[must_use]
    pub fn new(
        id: RecordId,
        vehicle_id: RecordId,
        officer_id: RecordId,
        area: impl Into<String>,
        shift: Shift,
    ) -> Self {
        Self {
            id,
            vehicle_id,
            officer_id,
            area: area.into(),
            shift,
            active: true,
        }
    }

    /// One-line summary for listings.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Patrol {} - officer {} in vehicle {}, {} shift{}",
            self.id,
            self.officer_id,
            self.vehicle_id,
            self.shift,
            if self.active { " (active)" } else { "" }
        )
    }

    /// Multi-line summary of every populated field.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut lines = vec![
            format!("Patrol {} - {} shift", self.id, self.shift),
            format!("  Vehicle: {}", self.vehicle_id),
            format!("  Officer: {}", self.officer_id),
        ];
        if !self.area.is_empty() {
            lines.push(format!("  Area: {}", self.area));
        }
        lines.push(format!(
            "  Status: {}",
            if self.active { "active" } else { "ended" }
        ));
        lines.join("\n")
    }
}

impl Record for Patrol {
    const FAMILY: &'static str = "Patrol";

    fn id(&self) -> RecordId {
        self.id
    }

    fn kind(&self) -> &str {
        self.shift.as_ref()
    }
}

impl FieldPatch for Patrol {
    fn set_field(&mut self, field: &str, value: &str) -> Result<(), RecordError> {
        match field {
            "id" => return Err(fields::immutable_id()),
            "area" => self.area = value.trim().to_string(),
            "shift" => self.shift = fields::parse(field, value)?,
            "vehicleId" | "officerId" | "active" => {
                return Err(RecordError::invalid_field(
                    field,
                    "change this by ending the patrol and starting a new one",
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

/// Flat JSON shape of a [`Vehicle`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleRow {
    /// Vehicle id.
    pub id: RecordId,
    /// Kind literal.
    pub kind: String,
    /// Make and model.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub model: String,
    /// Model year.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    /// Odometer reading.
    #[serde(default)]
    pub mileage: u64,
    /// Availability; available when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
    /// Cars only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seating_capacity: Option<u32>,
    /// Bikes only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_cc: Option<u32>,
}

impl From<&Vehicle> for VehicleRow {
    fn from(vehicle: &Vehicle) -> Self {
        let (seating_capacity, engine_cc) = match vehicle.details {
            VehicleKind::Car { seating_capacity } => (Some(seating_capacity), None),
            VehicleKind::Bike { engine_cc } => (None, Some(engine_cc)),
            VehicleKind::Other { .. } => (None, None),
        };
        Self {
            id: vehicle.id,
            kind: vehicle.kind().to_string(),
            model: vehicle.model.clone(),
            year: Some(vehicle.year).filter(|y| *y != 0),
            mileage: vehicle.mileage,
            available: Some(vehicle.available),
            seating_capacity,
            engine_cc,
        }
    }
}

impl From<VehicleRow> for Vehicle {
    fn from(row: VehicleRow) -> Self {
        let mut vehicle = Self::from_kind(&row.kind, row.id);
        vehicle.model = row.model;
        vehicle.year = row.year.unwrap_or_default();
        vehicle.mileage = row.mileage;
        vehicle.available = row.available.unwrap_or(true);
        match &mut vehicle.details {
            VehicleKind::Car { seating_capacity } => {
                if let Some(seats) = row.seating_capacity {
                    *seating_capacity = seats;
                }
            }
            VehicleKind::Bike { engine_cc } => *engine_cc = row.engine_cc.unwrap_or_default(),
            VehicleKind::Other { .. } => {}
        }
        vehicle
    }
}

/// Patrols are persisted as-is.
pub type PatrolRow = Patrol;

/// Contents of `patrol.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatrolDocument {
    /// Every vehicle, in insertion order.
    #[serde(default)]
    pub vehicles: Vec<VehicleRow>,
    /// Every patrol, in insertion order.
    #[serde(default)]
    pub patrols: Vec<PatrolRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_dispatch_is_exact() {
        assert_eq!(Vehicle::from_kind(CAR, 1).kind(), CAR);
        assert_eq!(Vehicle::from_kind("car", 1).kind(), "car");
        assert!(matches!(
            Vehicle::from_kind("Van", 1).details,
            VehicleKind::Other { .. }
        ));
    }

    #[test]
    fn new_vehicles_are_available() {
        let bike = Vehicle::bike(2);
        assert!(bike.available);
        assert_eq!(bike.mileage, 0);
        assert!(bike.describe().contains("Available: yes"));
        assert!(!bike.describe().contains("Engine"));
    }

    #[test]
    fn kind_fields_are_checked() {
        let mut car = Vehicle::car(1);
        car.set_field("seatingCapacity", "5").unwrap();
        car.set_field("mileage", "12000").unwrap();
        car.set_field("available", "no").unwrap();
        assert_eq!(car.details, VehicleKind::Car { seating_capacity: 5 });
        assert!(!car.available);

        assert!(car.set_field("engineCc", "150").is_err());
        assert!(car.set_field("mileage", "-4").is_err());
        assert!(car.set_field("colour", "white").is_err());
    }

    #[test]
    fn patrol_fields() {
        let mut patrol = Patrol::new(1, 2, 3, "Old Town", Shift::Night);
        assert!(patrol.active);
        assert_eq!(patrol.kind(), "Night");

        patrol.set_field("shift", "Evening").unwrap();
        assert_eq!(patrol.shift, Shift::Evening);
        assert!(patrol.set_field("shift", "Noon").is_err());
        assert!(patrol.set_field("vehicleId", "9").is_err());
    }

    #[test]
    fn vehicle_row_round_trip() {
        let mut bike = Vehicle::bike(3);
        bike.set_field("engineCc", "250").unwrap();
        bike.set_field("model", "Honda CG").unwrap();
        bike.set_field("year", "2019").unwrap();

        let json = serde_json::to_string(&VehicleRow::from(&bike)).unwrap();
        assert!(json.contains("\"engineCc\":250"));
        assert!(!json.contains("seatingCapacity"));

        let row: VehicleRow = serde_json::from_str(&json).unwrap();
        assert_eq!(Vehicle::from(row), bike);
    }

    #[test]
    fn omitted_availability_means_available() {
        let row: VehicleRow = serde_json::from_str(r#"{"id": 1, "kind": "Car"}"#).unwrap();
        let car = Vehicle::from(row);
        assert!(car.available);
        assert_eq!(car.details, VehicleKind::Car { seating_capacity: 4 });
    }
}
