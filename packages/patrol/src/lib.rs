#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Patrol fleet management.
//!
//! [`PatrolManager`] owns the vehicle fleet and the patrol log and reads and
//! writes `patrol.json`. Starting a patrol takes a vehicle out of service
//! until the patrol is ended; the officer on patrol is checked against an
//! [`OfficerLookup`] when one is supplied.

use std::path::Path;

use lems_officer::OfficerLookup;
use lems_officer::models::Officer;
use lems_patrol_models::{Patrol, PatrolDocument, Shift, Vehicle, VehicleRow};
use lems_record_store::{
    DanglingReference, FieldPatch, KindCounts, Record, RecordError, RecordId, RecordManager,
    Tally, fields, legacy, persist,
};
use thiserror::Error;

pub use lems_patrol_models as models;

/// Errors from patrol operations.
#[derive(Debug, Error)]
pub enum PatrolError {
    /// A record lookup, insert, or field update failed.
    #[error(transparent)]
    Record(#[from] RecordError),

    /// The vehicle is already out on patrol or otherwise unavailable.
    #[error("Vehicle {0} is not available")]
    VehicleUnavailable(RecordId),

    /// The patrol has already been ended.
    #[error("Patrol {0} has already ended")]
    AlreadyEnded(RecordId),
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Running aggregates over the fleet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FleetStatistics {
    /// Vehicle counts by kind.
    pub by_kind: KindCounts,
    /// Vehicles currently available.
    pub available: usize,
    /// Sum of every vehicle's mileage.
    pub total_mileage: u128,
}

impl Tally<Vehicle> for FleetStatistics {
    fn absorb(&mut self, vehicle: &Vehicle) {
        self.by_kind.increment(vehicle.kind());
        if vehicle.available {
            self.available += 1;
        }
        self.total_mileage += u128::from(vehicle.mileage);
    }

    fn retract(&mut self, vehicle: &Vehicle) {
        self.by_kind.decrement(vehicle.kind());
        if vehicle.available {
            self.available -= 1;
        }
        self.total_mileage -= u128::from(vehicle.mileage);
    }
}

/// Running aggregates over the patrol log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatrolStatistics {
    /// Patrol counts by shift.
    pub by_shift: KindCounts,
    /// Patrols not yet ended.
    pub active: usize,
}

impl Tally<Patrol> for PatrolStatistics {
    fn absorb(&mut self, patrol: &Patrol) {
        self.by_shift.increment(patrol.kind());
        if patrol.active {
            self.active += 1;
        }
    }

    fn retract(&mut self, patrol: &Patrol) {
        self.by_shift.decrement(patrol.kind());
        if patrol.active {
            self.active -= 1;
        }
    }
}

// ---------------------------------------------------------------------------
// Manager
// ---------------------------------------------------------------------------

/// Owns every vehicle and patrol.
#[derive(Debug, Clone, Default)]
pub struct PatrolManager {
    vehicles: RecordManager<Vehicle, FleetStatistics>,
    patrols: RecordManager<Patrol, PatrolStatistics>,
}

impl PatrolManager {
    /// Creates an empty fleet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -- Vehicles -----------------------------------------------------------

    /// Adds a fully built vehicle.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::DuplicateId`] if the id is taken.
    pub fn add_vehicle(&mut self, vehicle: Vehicle) -> Result<RecordId, RecordError> {
        let id = self.vehicles.insert(vehicle)?;
        log::debug!("Added vehicle {id}");
        Ok(id)
    }

    /// Builds a vehicle of `kind` and applies `fields` before inserting it.
    /// Nothing is inserted if any field fails to apply.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidField`] for a bad field or
    /// [`RecordError::DuplicateId`] if the id is taken.
    pub fn add_vehicle_from_fields(
        &mut self,
        kind: &str,
        id: Option<RecordId>,
        fields: &[(&str, &str)],
    ) -> Result<RecordId, RecordError> {
        let id = id.unwrap_or_else(|| self.vehicles.next_id());
        let mut vehicle = Vehicle::from_kind(kind, id);
        for (field, value) in fields {
            vehicle.set_field(field, value)?;
        }
        self.add_vehicle(vehicle)
    }

    /// The id the next auto-numbered vehicle will get.
    #[must_use]
    pub const fn next_vehicle_id(&self) -> RecordId {
        self.vehicles.next_id()
    }

    /// Looks up a vehicle.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotFound`] if absent.
    pub fn find_vehicle(&self, id: RecordId) -> Result<&Vehicle, RecordError> {
        self.vehicles.find(id)
    }

    /// All vehicles in insertion order.
    pub fn vehicles(&self) -> impl ExactSizeIterator<Item = &Vehicle> + '_ {
        self.vehicles.list()
    }

    /// Vehicles of one kind.
    #[must_use]
    pub fn vehicles_of_kind(&self, kind: &str) -> Vec<&Vehicle> {
        self.vehicles.filter_by_kind(kind)
    }

    /// Vehicles ready to go out.
    #[must_use]
    pub fn available_vehicles(&self) -> Vec<&Vehicle> {
        self.vehicles.filter(|v| v.available)
    }

    /// Sets one vehicle field from text input.
    ///
    /// A vehicle out on an active patrol cannot be marked available; end the
    /// patrol instead.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotFound`] or [`RecordError::InvalidField`].
    pub fn update_vehicle(
        &mut self,
        id: RecordId,
        field: &str,
        value: &str,
    ) -> Result<&Vehicle, RecordError> {
        self.vehicles.find(id)?;
        if field == "available"
            && fields::parse_bool(field, value)?
            && let Some(patrol) = self.active_patrol_for_vehicle(id)
        {
            return Err(RecordError::invalid_field(
                field,
                format!("vehicle {id} is out on patrol {}", patrol.id),
            ));
        }
        self.vehicles.update(id, |v| v.set_field(field, value))
    }

    fn active_patrol_for_vehicle(&self, vehicle_id: RecordId) -> Option<&Patrol> {
        self.patrols
            .list()
            .find(|p| p.active && p.vehicle_id == vehicle_id)
    }

    /// Deletes a vehicle. Patrols that used it keep the dangling id.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotFound`] if absent.
    pub fn delete_vehicle(&mut self, id: RecordId) -> Result<Vehicle, RecordError> {
        let vehicle = self.vehicles.delete(id)?;
        log::debug!("Deleted vehicle {id}");
        Ok(vehicle)
    }

    // -- Patrols ------------------------------------------------------------

    /// Sends an officer out in a vehicle and returns the new patrol's id.
    ///
    /// The vehicle is marked unavailable until the patrol ends. When
    /// `officers` is supplied the officer must be on the roster.
    ///
    /// # Errors
    ///
    /// Returns [`PatrolError::Record`] with [`RecordError::NotFound`] if the
    /// vehicle or officer is absent, or [`PatrolError::VehicleUnavailable`]
    /// if the vehicle is already in use.
    pub fn start_patrol(
        &mut self,
        vehicle_id: RecordId,
        officer_id: RecordId,
        area: &str,
        shift: Shift,
        officers: Option<&dyn OfficerLookup>,
    ) -> Result<RecordId, PatrolError> {
        if !self.vehicles.find(vehicle_id)?.available {
            return Err(PatrolError::VehicleUnavailable(vehicle_id));
        }
        if let Some(officers) = officers
            && !officers.has_officer(officer_id)
        {
            return Err(RecordError::not_found(Officer::FAMILY, officer_id).into());
        }

        let patrol = Patrol::new(
            self.patrols.next_id(),
            vehicle_id,
            officer_id,
            area.trim(),
            shift,
        );
        let id = self.patrols.insert(patrol)?;
        self.set_availability(vehicle_id, false)?;
        log::info!("Patrol {id} started: officer {officer_id} in vehicle {vehicle_id}");
        Ok(id)
    }

    /// Ends an active patrol, adds `distance_km` to the vehicle's mileage, and
    /// returns the vehicle to service.
    ///
    /// If the vehicle has since been deleted the patrol is still ended.
    ///
    /// # Errors
    ///
    /// Returns [`PatrolError::Record`] with [`RecordError::NotFound`] if the
    /// patrol is absent or [`RecordError::InvalidField`] if the distance
    /// would overflow the vehicle's mileage, or [`PatrolError::AlreadyEnded`].
    /// Nothing changes on error.
    pub fn end_patrol(
        &mut self,
        patrol_id: RecordId,
        distance_km: u64,
    ) -> Result<(), PatrolError> {
        let patrol = self.patrols.find(patrol_id)?;
        if !patrol.active {
            return Err(PatrolError::AlreadyEnded(patrol_id));
        }
        let vehicle_id = patrol.vehicle_id;

        let mileage = self
            .vehicles
            .get(vehicle_id)
            .map(|v| {
                v.mileage.checked_add(distance_km).ok_or_else(|| {
                    RecordError::invalid_field(
                        "mileage",
                        format!("{distance_km} km would overflow vehicle {vehicle_id}'s mileage"),
                    )
                })
            })
            .transpose()?;

        self.patrols
            .update(patrol_id, |p: &mut Patrol| -> Result<(), RecordError> {
                p.active = false;
                Ok(())
            })?;

        if let Some(mileage) = mileage {
            self.vehicles
                .update(vehicle_id, |v: &mut Vehicle| -> Result<(), RecordError> {
                    v.available = true;
                    v.mileage = mileage;
                    Ok(())
                })?;
        } else {
            log::warn!("Patrol {patrol_id} ended but vehicle {vehicle_id} no longer exists");
        }

        log::info!("Patrol {patrol_id} ended after {distance_km} km");
        Ok(())
    }

    fn set_availability(
        &mut self,
        vehicle_id: RecordId,
        available: bool,
    ) -> Result<(), RecordError> {
        self.vehicles
            .update(vehicle_id, |v: &mut Vehicle| -> Result<(), RecordError> {
                v.available = available;
                Ok(())
            })?;
        Ok(())
    }

    /// Looks up a patrol.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotFound`] if absent.
    pub fn find_patrol(&self, id: RecordId) -> Result<&Patrol, RecordError> {
        self.patrols.find(id)
    }

    /// All patrols in insertion order.
    pub fn patrols(&self) -> impl ExactSizeIterator<Item = &Patrol> + '_ {
        self.patrols.list()
    }

    /// Patrols not yet ended.
    #[must_use]
    pub fn active_patrols(&self) -> Vec<&Patrol> {
        self.patrols.filter(|p| p.active)
    }

    /// Patrols worked by an officer.
    #[must_use]
    pub fn patrols_for_officer(&self, officer_id: RecordId) -> Vec<&Patrol> {
        self.patrols.filter(|p| p.officer_id == officer_id)
    }

    /// Patrols on one shift.
    #[must_use]
    pub fn patrols_on_shift(&self, shift: Shift) -> Vec<&Patrol> {
        self.patrols.filter(|p| p.shift == shift)
    }

    /// Sets one patrol field from text input.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotFound`] or [`RecordError::InvalidField`].
    pub fn update_patrol(
        &mut self,
        id: RecordId,
        field: &str,
        value: &str,
    ) -> Result<&Patrol, RecordError> {
        self.patrols.update(id, |p| p.set_field(field, value))
    }

    /// Deletes a patrol. Deleting an active patrol returns its vehicle to
    /// service.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotFound`] if absent.
    pub fn delete_patrol(&mut self, id: RecordId) -> Result<Patrol, RecordError> {
        let patrol = self.patrols.delete(id)?;
        if patrol.active && self.vehicles.get(patrol.vehicle_id).is_some() {
            self.set_availability(patrol.vehicle_id, true)?;
        }
        log::debug!("Deleted patrol {id}");
        Ok(patrol)
    }

    // -- Statistics ---------------------------------------------------------

    /// Maintained fleet statistics.
    #[must_use]
    pub const fn fleet_statistics(&self) -> &FleetStatistics {
        self.vehicles.statistics()
    }

    /// Fleet statistics rebuilt from the current vehicles.
    #[must_use]
    pub fn recompute_fleet_statistics(&self) -> FleetStatistics {
        self.vehicles.recompute_statistics()
    }

    /// Maintained patrol statistics.
    #[must_use]
    pub const fn patrol_statistics(&self) -> &PatrolStatistics {
        self.patrols.statistics()
    }

    /// Patrol statistics rebuilt from the current log.
    #[must_use]
    pub fn recompute_patrol_statistics(&self) -> PatrolStatistics {
        self.patrols.recompute_statistics()
    }

    /// Patrols whose officer is not on the roster or whose vehicle has been
    /// deleted.
    #[must_use]
    pub fn dangling_references(&self, officers: &dyn OfficerLookup) -> Vec<DanglingReference> {
        let mut dangling = Vec::new();
        for patrol in self.patrols.list() {
            if self.vehicles.get(patrol.vehicle_id).is_none() {
                dangling.push(DanglingReference::new(
                    Patrol::FAMILY,
                    patrol.id,
                    "vehicleId",
                    Vehicle::FAMILY,
                    patrol.vehicle_id,
                ));
            }
            if !officers.has_officer(patrol.officer_id) {
                dangling.push(DanglingReference::new(
                    Patrol::FAMILY,
                    patrol.id,
                    "officerId",
                    Officer::FAMILY,
                    patrol.officer_id,
                ));
            }
        }
        dangling
    }

    // -- Persistence --------------------------------------------------------

    /// Writes every vehicle and patrol to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Io`] or [`RecordError::Json`] on failure.
    pub fn save(&self, path: &Path) -> Result<(), RecordError> {
        let document = PatrolDocument {
            vehicles: self.vehicles.list().map(VehicleRow::from).collect(),
            patrols: self.patrols.list().cloned().collect(),
        };
        persist::save_document(path, &document)?;
        log::info!(
            "Saved {} vehicle(s) and {} patrol(s) to {}",
            self.vehicles.len(),
            self.patrols.len(),
            path.display()
        );
        Ok(())
    }

    /// Replaces the in-memory state with the contents of `path`.
    ///
    /// After both lists are loaded, any vehicle used by an active patrol is
    /// marked unavailable regardless of its saved flag. Returns the number of
    /// vehicles loaded.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::MalformedInput`] if the file is unreadable,
    /// malformed, or repeats an id; the manager is left empty.
    pub fn load(&mut self, path: &Path) -> Result<usize, RecordError> {
        self.clear();
        let Some(document) = persist::load_document::<PatrolDocument>(path)? else {
            return Ok(0);
        };

        let result = self
            .vehicles
            .replace_all(document.vehicles.into_iter().map(Vehicle::from))
            .and_then(|count| {
                self.patrols.replace_all(document.patrols)?;
                Ok(count)
            })
            .and_then(|count| {
                self.reconcile_availability()?;
                Ok(count)
            });

        match result {
            Ok(count) => {
                log::info!(
                    "Loaded {count} vehicle(s) and {} patrol(s) from {}",
                    self.patrols.len(),
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

    fn reconcile_availability(&mut self) -> Result<(), RecordError> {
        let in_use: Vec<RecordId> = self
            .patrols
            .list()
            .filter(|p| p.active)
            .map(|p| p.vehicle_id)
            .collect();

        for vehicle_id in in_use {
            if self.vehicles.get(vehicle_id).is_some_and(|v| v.available) {
                log::warn!("Vehicle {vehicle_id} is on an active patrol; marking it unavailable");
                self.set_availability(vehicle_id, false)?;
            }
        }
        Ok(())
    }

    /// Imports vehicles from a legacy `id,type` text file.
    ///
    /// Lines with a bad id or an id already present are skipped with a
    /// warning. Returns the number of vehicles imported.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::MalformedInput`] if the file cannot be opened.
    pub fn import_legacy(&mut self, path: &Path) -> Result<usize, RecordError> {
        let mut imported = 0;
        for row in legacy::read_rows(path)? {
            let Ok(id) = row.field(0).parse::<RecordId>() else {
                log::warn!("{}:{}: invalid vehicle id", path.display(), row.line);
                continue;
            };

            match self.add_vehicle(Vehicle::from_kind(row.field(1), id)) {
                Ok(_) => imported += 1,
                Err(e) => log::warn!("{}:{}: {e}", path.display(), row.line),
            }
        }
        Ok(imported)
    }

    /// Removes every vehicle and patrol.
    pub fn clear(&mut self) {
        self.vehicles.clear();
        self.patrols.clear();
    }
}

#[cfg(test)]
mod tests {
    use lems_officer::OfficerManager;
    use lems_officer::models::CONSTABLE;
    use lems_patrol_models::{BIKE, CAR};

    use super::*;

    fn fleet() -> PatrolManager {
        let mut m = PatrolManager::new();
        m.add_vehicle_from_fields(CAR, Some(1), &[("model", "Corolla"), ("mileage", "1000")])
            .unwrap();
        m.add_vehicle_from_fields(BIKE, Some(2), &[("mileage", "250")])
            .unwrap();
        m
    }

    fn roster() -> OfficerManager {
        let mut m = OfficerManager::new();
        m.add_from_fields(CONSTABLE, Some(10), "Bilal Ahmed", &[])
            .unwrap();
        m
    }

    #[test]
    fn start_patrol_takes_vehicle_out_of_service() {
        let mut m = fleet();
        let officers = roster();

        let id = m
            .start_patrol(1, 10, "Old Town", Shift::Night, Some(&officers))
            .unwrap();
        assert!(!m.find_vehicle(1).unwrap().available);
        assert_eq!(m.fleet_statistics().available, 1);
        assert_eq!(m.patrol_statistics().active, 1);
        assert_eq!(m.find_patrol(id).unwrap().shift, Shift::Night);

        let err = m
            .start_patrol(1, 10, "Harbour", Shift::Night, Some(&officers))
            .unwrap_err();
        assert!(matches!(err, PatrolError::VehicleUnavailable(1)));
        assert_eq!(m.patrols().len(), 1);
    }

    #[test]
    fn start_patrol_checks_references() {
        let mut m = fleet();
        let officers = roster();

        let err = m
            .start_patrol(9, 10, "", Shift::Morning, Some(&officers))
            .unwrap_err();
        assert!(matches!(err, PatrolError::Record(ref e) if e.is_not_found()));

        let err = m
            .start_patrol(1, 99, "", Shift::Morning, Some(&officers))
            .unwrap_err();
        assert!(matches!(err, PatrolError::Record(ref e) if e.is_not_found()));
        assert!(m.find_vehicle(1).unwrap().available);

        m.start_patrol(1, 99, "", Shift::Morning, None).unwrap();
    }

    #[test]
    fn end_patrol_returns_vehicle_and_adds_mileage() {
        let mut m = fleet();
        let id = m.start_patrol(2, 10, "Market", Shift::Evening, None).unwrap();

        m.end_patrol(id, 42).unwrap();
        let bike = m.find_vehicle(2).unwrap();
        assert!(bike.available);
        assert_eq!(bike.mileage, 292);
        assert_eq!(m.fleet_statistics().total_mileage, 1292);
        assert_eq!(m.patrol_statistics().active, 0);

        assert!(matches!(
            m.end_patrol(id, 1).unwrap_err(),
            PatrolError::AlreadyEnded(_)
        ));
        assert_eq!(*m.fleet_statistics(), m.recompute_fleet_statistics());
        assert_eq!(*m.patrol_statistics(), m.recompute_patrol_statistics());
    }

    #[test]
    fn deleting_active_patrol_frees_vehicle() {
        let mut m = fleet();
        let id = m.start_patrol(1, 10, "", Shift::Morning, None).unwrap();
        m.delete_patrol(id).unwrap();
        assert!(m.find_vehicle(1).unwrap().available);
        assert_eq!(m.available_vehicles().len(), 2);
    }

    #[test]
    fn vehicle_on_patrol_cannot_be_marked_available() {
        let mut m = fleet();
        let id = m.start_patrol(1, 10, "", Shift::Morning, None).unwrap();

        let err = m.update_vehicle(1, "available", "true").unwrap_err();
        assert!(matches!(err, RecordError::InvalidField { .. }));
        assert!(!m.find_vehicle(1).unwrap().available);
        assert!(matches!(
            m.start_patrol(1, 10, "", Shift::Night, None).unwrap_err(),
            PatrolError::VehicleUnavailable(1)
        ));
        assert_eq!(m.active_patrols().len(), 1);

        m.update_vehicle(1, "model", "Civic").unwrap();
        m.end_patrol(id, 0).unwrap();
        m.update_vehicle(1, "available", "no").unwrap();
        m.update_vehicle(1, "available", "yes").unwrap();
        assert!(m.find_vehicle(1).unwrap().available);
    }

    #[test]
    fn fleet_mileage_total_does_not_overflow() {
        let mut m = PatrolManager::new();
        let max = u64::MAX.to_string();
        m.add_vehicle_from_fields(CAR, Some(1), &[("mileage", &max)])
            .unwrap();
        m.add_vehicle_from_fields(BIKE, Some(2), &[("mileage", "1")])
            .unwrap();
        assert_eq!(
            m.fleet_statistics().total_mileage,
            u128::from(u64::MAX) + 1
        );

        m.delete_vehicle(1).unwrap();
        assert_eq!(m.fleet_statistics().total_mileage, 1);
        assert_eq!(*m.fleet_statistics(), m.recompute_fleet_statistics());
    }

    #[test]
    fn end_patrol_rejects_mileage_overflow_without_ending() {
        let mut m = PatrolManager::new();
        let max = u64::MAX.to_string();
        m.add_vehicle_from_fields(CAR, Some(1), &[("mileage", &max)])
            .unwrap();
        let id = m.start_patrol(1, 10, "", Shift::Night, None).unwrap();

        let err = m.end_patrol(id, 1).unwrap_err();
        assert!(matches!(
            err,
            PatrolError::Record(RecordError::InvalidField { .. })
        ));
        assert!(m.find_patrol(id).unwrap().active);
        assert!(!m.find_vehicle(1).unwrap().available);
        assert_eq!(m.find_vehicle(1).unwrap().mileage, u64::MAX);

        m.end_patrol(id, 0).unwrap();
        assert!(m.find_vehicle(1).unwrap().available);
    }

    #[test]
    fn deleted_vehicle_leaves_dangling_patrol() {
        let mut m = fleet();
        let officers = roster();
        let id = m.start_patrol(1, 10, "", Shift::Morning, None).unwrap();
        m.delete_vehicle(1).unwrap();

        let dangling = m.dangling_references(&officers);
        assert_eq!(dangling.len(), 1);
        assert_eq!(dangling[0].field, "vehicleId");

        m.end_patrol(id, 5).unwrap();
        assert!(!m.find_patrol(id).unwrap().active);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patrol.json");

        let mut m = fleet();
        m.add_vehicle(Vehicle::from_kind("Van", 3)).unwrap();
        let first = m.start_patrol(1, 10, "Old Town", Shift::Night, None).unwrap();
        m.start_patrol(2, 11, "Market", Shift::Morning, None).unwrap();
        m.end_patrol(first, 30).unwrap();
        m.save(&path).unwrap();

        let mut loaded = PatrolManager::new();
        assert_eq!(loaded.load(&path).unwrap(), 3);
        assert_eq!(
            loaded.vehicles().cloned().collect::<Vec<_>>(),
            m.vehicles().cloned().collect::<Vec<_>>()
        );
        assert_eq!(
            loaded.patrols().cloned().collect::<Vec<_>>(),
            m.patrols().cloned().collect::<Vec<_>>()
        );
        assert_eq!(*loaded.fleet_statistics(), *m.fleet_statistics());
        assert_eq!(loaded.next_vehicle_id(), 4);
    }

    #[test]
    fn load_marks_vehicles_on_active_patrols_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patrol.json");
        std::fs::write(
            &path,
            r#"{
                "patrols": [{"id": 1, "vehicleId": 5, "officerId": 2, "active": true}],
                "vehicles": [{"id": 5, "kind": "Car", "available": true}]
            }"#,
        )
        .unwrap();

        let mut m = PatrolManager::new();
        m.load(&path).unwrap();
        assert!(!m.find_vehicle(5).unwrap().available);
        assert_eq!(m.fleet_statistics().available, 0);
    }

    #[test]
    fn legacy_import_reads_vehicle_types() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vehicles.txt");
        std::fs::write(&path, "1,Car\n2,Bike\n2,Car\n3,Truck\nbad,Car\n").unwrap();

        let mut m = PatrolManager::new();
        assert_eq!(m.import_legacy(&path).unwrap(), 3);
        assert_eq!(m.vehicles_of_kind(CAR).len(), 1);
        assert_eq!(m.find_vehicle(3).unwrap().kind(), "Truck");
    }
}
