//! Patrol vehicle and patrol assignment menu.

use std::path::Path;

use lems_cli_utils::{CliResult, choose, optional, print_heading, print_list, text, value};
use lems_officer::OfficerManager;
use lems_patrol::PatrolManager;
use lems_patrol::models::{BIKE, CAR, Patrol, Shift, Vehicle};
use lems_record_store::RecordId;
use strum::IntoEnumIterator as _;

use super::{BACK, ask_fields, ask_kind, ask_update, format_breakdown, pairs, report};
use crate::registry::{Family, Registry};

const VEHICLE_FIELDS: &[&str] = &[
    "model",
    "year",
    "mileage",
    "available",
    "seatingCapacity",
    "engineCc",
];

const PATROL_FIELDS: &[&str] = &["area", "shift"];

enum PatrolAction {
    AddVehicle,
    ListVehicles,
    AvailableVehicles,
    FindVehicle,
    UpdateVehicle,
    DeleteVehicle,
    StartPatrol,
    EndPatrol,
    ListPatrols,
    ActivePatrols,
    OfficerPatrols,
    ShiftPatrols,
    UpdatePatrol,
    DeletePatrol,
    CheckReferences,
    Statistics,
    Import,
    Save,
    Back,
}

impl PatrolAction {
    const ALL: &[Self] = &[
        Self::AddVehicle,
        Self::ListVehicles,
        Self::AvailableVehicles,
        Self::FindVehicle,
        Self::UpdateVehicle,
        Self::DeleteVehicle,
        Self::StartPatrol,
        Self::EndPatrol,
        Self::ListPatrols,
        Self::ActivePatrols,
        Self::OfficerPatrols,
        Self::ShiftPatrols,
        Self::UpdatePatrol,
        Self::DeletePatrol,
        Self::CheckReferences,
        Self::Statistics,
        Self::Import,
        Self::Save,
        Self::Back,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::AddVehicle => "Add vehicle",
            Self::ListVehicles => "List vehicles",
            Self::AvailableVehicles => "List available vehicles",
            Self::FindVehicle => "Show a vehicle",
            Self::UpdateVehicle => "Update a vehicle",
            Self::DeleteVehicle => "Delete a vehicle",
            Self::StartPatrol => "Start a patrol",
            Self::EndPatrol => "End a patrol",
            Self::ListPatrols => "List patrols",
            Self::ActivePatrols => "List active patrols",
            Self::OfficerPatrols => "Patrols for an officer",
            Self::ShiftPatrols => "Patrols on a shift",
            Self::UpdatePatrol => "Update a patrol",
            Self::DeletePatrol => "Delete a patrol",
            Self::CheckReferences => "Check officer references",
            Self::Statistics => "Statistics",
            Self::Import => "Import legacy vehicle file",
            Self::Save => "Save",
            Self::Back => BACK,
        }
    }
}

/// Runs the patrol menu until the user goes back.
///
/// # Errors
///
/// Returns an error if the terminal cannot be read.
#[allow(clippy::too_many_lines)]
pub fn run(registry: &mut Registry) -> CliResult<()> {
    let labels: Vec<&str> = PatrolAction::ALL.iter().map(PatrolAction::label).collect();

    loop {
        let idx = choose("Patrol", &labels)?;
        match PatrolAction::ALL[idx] {
            PatrolAction::AddVehicle => handle_add_vehicle(registry.patrol())?,
            PatrolAction::ListVehicles => {
                print_list(
                    registry.patrol().vehicles().map(Vehicle::summary),
                    "vehicle",
                    "No vehicles in the fleet.",
                );
            }
            PatrolAction::AvailableVehicles => {
                print_list(
                    registry
                        .patrol()
                        .available_vehicles()
                        .into_iter()
                        .map(Vehicle::summary),
                    "vehicle",
                    "Every vehicle is out on patrol.",
                );
            }
            PatrolAction::FindVehicle => {
                let id: RecordId = value("Vehicle id")?;
                report(registry.patrol().find_vehicle(id), Vehicle::describe);
            }
            PatrolAction::UpdateVehicle => {
                let id: RecordId = value("Vehicle id")?;
                let (field, new_value) = ask_update(VEHICLE_FIELDS)?;
                report(
                    registry.patrol().update_vehicle(id, &field, &new_value),
                    Vehicle::describe,
                );
            }
            PatrolAction::DeleteVehicle => {
                let id: RecordId = value("Vehicle id")?;
                report(registry.patrol().delete_vehicle(id), |v| {
                    format!("Deleted {}", v.summary())
                });
            }
            PatrolAction::StartPatrol => {
                let (patrol, officers) = registry.patrol_with_roster();
                handle_start_patrol(patrol, officers)?;
            }
            PatrolAction::EndPatrol => {
                let id: RecordId = value("Patrol id")?;
                let distance: u64 = value("Distance driven (km)")?;
                report(registry.patrol().end_patrol(id, distance), |()| {
                    format!("Patrol {id} ended")
                });
            }
            PatrolAction::ListPatrols => {
                print_list(
                    registry.patrol().patrols().map(Patrol::summary),
                    "patrol",
                    "No patrols recorded.",
                );
            }
            PatrolAction::ActivePatrols => {
                print_list(
                    registry
                        .patrol()
                        .active_patrols()
                        .into_iter()
                        .map(Patrol::summary),
                    "patrol",
                    "No patrols are out.",
                );
            }
            PatrolAction::OfficerPatrols => {
                let officer_id: RecordId = value("Officer id")?;
                print_list(
                    registry
                        .patrol()
                        .patrols_for_officer(officer_id)
                        .into_iter()
                        .map(Patrol::summary),
                    "patrol",
                    "No patrols for that officer.",
                );
            }
            PatrolAction::ShiftPatrols => {
                let shift = ask_shift()?;
                print_list(
                    registry
                        .patrol()
                        .patrols_on_shift(shift)
                        .into_iter()
                        .map(Patrol::summary),
                    "patrol",
                    "No patrols on that shift.",
                );
            }
            PatrolAction::UpdatePatrol => {
                let id: RecordId = value("Patrol id")?;
                let (field, new_value) = ask_update(PATROL_FIELDS)?;
                report(
                    registry.patrol().update_patrol(id, &field, &new_value),
                    Patrol::describe,
                );
            }
            PatrolAction::DeletePatrol => {
                let id: RecordId = value("Patrol id")?;
                report(registry.patrol().delete_patrol(id), |p| {
                    format!("Deleted {}", p.summary())
                });
            }
            PatrolAction::CheckReferences => {
                let (patrol, officers) = registry.patrol_with_roster();
                print_list(
                    patrol.dangling_references(officers),
                    "dangling reference",
                    "Every vehicle and officer reference resolves.",
                );
            }
            PatrolAction::Statistics => print_statistics(registry.patrol()),
            PatrolAction::Import => {
                let path = text("Legacy file path")?;
                report(registry.patrol().import_legacy(Path::new(&path)), |n| {
                    format!("Imported {n} vehicle(s)")
                });
            }
            PatrolAction::Save => {
                let path = registry.paths().patrol.display().to_string();
                report(registry.save(Family::Patrol), |_| format!("Saved to {path}"));
            }
            PatrolAction::Back => return Ok(()),
        }
    }
}

fn handle_add_vehicle(patrol: &mut PatrolManager) -> CliResult<()> {
    let kind = ask_kind("Type", &[CAR, BIKE])?;
    let id: Option<RecordId> = optional("Id")?;

    let mut questions = vec![
        ("model", "Model"),
        ("year", "Year"),
        ("mileage", "Mileage (km)"),
    ];
    match kind.as_str() {
        CAR => questions.push(("seatingCapacity", "Seating capacity")),
        BIKE => questions.push(("engineCc", "Engine (cc)")),
        _ => {}
    }
    let answers = ask_fields(&questions)?;

    report(
        patrol.add_vehicle_from_fields(&kind, id, &pairs(&answers)),
        |id| format!("Added vehicle {id}"),
    );
    Ok(())
}

fn handle_start_patrol(patrol: &mut PatrolManager, officers: &OfficerManager) -> CliResult<()> {
    let available = patrol.available_vehicles();
    if available.is_empty() {
        println!("No vehicle is available.");
        return Ok(());
    }
    let labels: Vec<String> = available.iter().map(|v| v.summary()).collect();
    let vehicle_id = available[choose("Vehicle", &labels)?].id;

    let officer_id: RecordId = value("Officer id")?;
    let area = text("Area")?;
    let shift = ask_shift()?;

    report(
        patrol.start_patrol(vehicle_id, officer_id, &area, shift, Some(officers)),
        |id| format!("Patrol {id} started"),
    );
    Ok(())
}

fn ask_shift() -> CliResult<Shift> {
    let shifts: Vec<Shift> = Shift::iter().collect();
    let idx = choose("Shift", &shifts)?;
    Ok(shifts[idx])
}

fn print_statistics(patrol: &PatrolManager) {
    let fleet = patrol.fleet_statistics();
    let patrols = patrol.patrol_statistics();
    print_heading("Patrol statistics");
    println!("{}", format_breakdown("Vehicles", &fleet.by_kind));
    println!("Available vehicles: {}", fleet.available);
    println!("Total mileage: {} km", fleet.total_mileage);
    println!("{}", format_breakdown("Patrols by shift", &patrols.by_shift));
    println!("Active patrols: {}", patrols.active);
    println!();
}
