//! Crime case and location menu.

use std::path::Path;

use lems_cli_utils::{CliResult, choose, optional, print_heading, print_list, text, value};
use lems_crime::models::{ASSAULT, Case, CaseStatus, Location, THEFT, VANDALISM};
use lems_crime::{CrimeManager, HIGH_PRIORITY_THRESHOLD};
use lems_record_store::RecordId;
use strum::IntoEnumIterator as _;

use super::{BACK, ask_fields, ask_kind, ask_update, format_breakdown, pairs, report};
use crate::registry::{Family, Registry};

const CASE_FIELDS: &[&str] = &[
    "severity",
    "description",
    "locationId",
    "status",
    "stolenValue",
    "itemStolen",
    "recovered",
    "weaponUsed",
    "injurySeverity",
    "damageValue",
    "isPublicProperty",
];

const LOCATION_FIELDS: &[&str] = &["name", "area", "description"];

enum CrimeAction {
    AddCase,
    ListCases,
    ListByPriority,
    FindCase,
    FilterCases,
    UpdateCase,
    DeleteCase,
    AddLocation,
    ListLocations,
    UpdateLocation,
    DeleteLocation,
    Statistics,
    Import,
    Save,
    Back,
}

impl CrimeAction {
    const ALL: &[Self] = &[
        Self::AddCase,
        Self::ListCases,
        Self::ListByPriority,
        Self::FindCase,
        Self::FilterCases,
        Self::UpdateCase,
        Self::DeleteCase,
        Self::AddLocation,
        Self::ListLocations,
        Self::UpdateLocation,
        Self::DeleteLocation,
        Self::Statistics,
        Self::Import,
        Self::Save,
        Self::Back,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::AddCase => "Add case",
            Self::ListCases => "List cases",
            Self::ListByPriority => "List cases by priority",
            Self::FindCase => "Show a case",
            Self::FilterCases => "Filter cases",
            Self::UpdateCase => "Update a case",
            Self::DeleteCase => "Delete a case",
            Self::AddLocation => "Add location",
            Self::ListLocations => "List locations",
            Self::UpdateLocation => "Update a location",
            Self::DeleteLocation => "Delete a location",
            Self::Statistics => "Statistics",
            Self::Import => "Import legacy file",
            Self::Save => "Save",
            Self::Back => BACK,
        }
    }
}

enum CaseFilter {
    Kind,
    Location,
    Status,
    HighPriority,
}

impl CaseFilter {
    const ALL: &[Self] = &[Self::Kind, Self::Location, Self::Status, Self::HighPriority];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Kind => "By kind",
            Self::Location => "By location",
            Self::Status => "By status",
            Self::HighPriority => "High priority only",
        }
    }
}

/// Runs the crime menu until the user goes back.
///
/// # Errors
///
/// Returns an error if the terminal cannot be read.
pub fn run(registry: &mut Registry) -> CliResult<()> {
    let labels: Vec<&str> = CrimeAction::ALL.iter().map(CrimeAction::label).collect();

    loop {
        let idx = choose("Crime", &labels)?;
        match CrimeAction::ALL[idx] {
            CrimeAction::AddCase => handle_add_case(registry.crimes())?,
            CrimeAction::ListCases => {
                print_list(
                    registry.crimes().cases().map(Case::summary),
                    "case",
                    "No cases filed.",
                );
            }
            CrimeAction::ListByPriority => {
                print_list(
                    registry
                        .crimes()
                        .cases_by_priority()
                        .into_iter()
                        .map(Case::summary),
                    "case",
                    "No cases filed.",
                );
            }
            CrimeAction::FindCase => handle_find_case(registry.crimes())?,
            CrimeAction::FilterCases => handle_filter(registry.crimes())?,
            CrimeAction::UpdateCase => {
                let id: RecordId = value("Case id")?;
                let (field, new_value) = ask_update(CASE_FIELDS)?;
                report(
                    registry.crimes().update_case(id, &field, &new_value),
                    Case::describe,
                );
            }
            CrimeAction::DeleteCase => {
                let id: RecordId = value("Case id")?;
                report(registry.crimes().delete_case(id), |c| {
                    format!("Deleted {}", c.summary())
                });
            }
            CrimeAction::AddLocation => handle_add_location(registry.crimes())?,
            CrimeAction::ListLocations => {
                print_list(
                    registry
                        .crimes()
                        .locations()
                        .map(|l| format!("{} (ID: {}) {}", l.name, l.id, l.area)),
                    "location",
                    "No locations recorded.",
                );
            }
            CrimeAction::UpdateLocation => {
                let id: RecordId = value("Location id")?;
                let (field, new_value) = ask_update(LOCATION_FIELDS)?;
                report(
                    registry.crimes().update_location(id, &field, &new_value),
                    Location::describe,
                );
            }
            CrimeAction::DeleteLocation => {
                let id: RecordId = value("Location id")?;
                report(registry.crimes().delete_location(id), |l| {
                    format!("Deleted location {}", l.name)
                });
            }
            CrimeAction::Statistics => print_statistics(registry.crimes()),
            CrimeAction::Import => {
                let path = text("Legacy file path")?;
                report(registry.crimes().import_legacy(Path::new(&path)), |n| {
                    format!("Imported {n} case(s)")
                });
            }
            CrimeAction::Save => {
                let path = registry.paths().crimes.display().to_string();
                report(registry.save(Family::Crime), |_| format!("Saved to {path}"));
            }
            CrimeAction::Back => return Ok(()),
        }
    }
}

fn handle_add_case(crimes: &mut CrimeManager) -> CliResult<()> {
    let kind = ask_kind("Kind", &[THEFT, ASSAULT, VANDALISM])?;
    let id: Option<RecordId> = optional("Id")?;

    let mut questions = vec![
        ("severity", "Severity (blank for the kind's default)"),
        ("description", "Description"),
        ("locationId", "Location id"),
    ];
    match kind.as_str() {
        THEFT => questions.extend([
            ("stolenValue", "Stolen value"),
            ("itemStolen", "Item stolen"),
            ("recovered", "Recovered (yes/no)"),
        ]),
        ASSAULT => questions.extend([
            ("weaponUsed", "Weapon used (yes/no)"),
            ("injurySeverity", "Injury severity"),
        ]),
        VANDALISM => questions.extend([
            ("damageValue", "Damage value"),
            ("isPublicProperty", "Public property (yes/no)"),
        ]),
        _ => {}
    }
    let answers = ask_fields(&questions)?;

    report(
        crimes.add_case_from_fields(&kind, id, &pairs(&answers)),
        |id| format!("Filed case {id}"),
    );
    Ok(())
}

fn handle_find_case(crimes: &CrimeManager) -> CliResult<()> {
    let id: RecordId = value("Case id")?;
    match crimes.find_case(id) {
        Ok(case) => {
            println!("{}", case.describe());
            if let Ok(Some(location)) = crimes.location_of(id) {
                println!("{}", location.describe());
            }
        }
        Err(e) => println!("Error: {e}"),
    }
    Ok(())
}

fn handle_filter(crimes: &CrimeManager) -> CliResult<()> {
    let labels: Vec<&str> = CaseFilter::ALL.iter().map(CaseFilter::label).collect();
    let idx = choose("Filter", &labels)?;

    let cases = match CaseFilter::ALL[idx] {
        CaseFilter::Kind => {
            let kind = ask_kind("Kind", &[THEFT, ASSAULT, VANDALISM])?;
            crimes.cases_of_kind(&kind)
        }
        CaseFilter::Location => {
            let location_id: RecordId = value("Location id")?;
            crimes.cases_at_location(location_id)
        }
        CaseFilter::Status => {
            let statuses: Vec<CaseStatus> = CaseStatus::iter().collect();
            let idx = choose("Status", &statuses)?;
            crimes.cases_with_status(statuses[idx])
        }
        CaseFilter::HighPriority => crimes.high_priority_cases(),
    };

    print_list(
        cases.into_iter().map(Case::summary),
        "case",
        "No matching cases.",
    );
    Ok(())
}

fn handle_add_location(crimes: &mut CrimeManager) -> CliResult<()> {
    let id: Option<RecordId> = optional("Id")?;
    let name = text("Name")?;
    let mut location = Location::new(id.unwrap_or_else(|| crimes.next_location_id()), name);
    location.area = text("Area")?;
    location.description = text("Description")?;

    report(crimes.add_location(location), |id| {
        format!("Added location {id}")
    });
    Ok(())
}

fn print_statistics(crimes: &CrimeManager) {
    let stats = crimes.statistics();
    print_heading("Crime statistics");
    println!("{}", format_breakdown("Cases", &stats.by_kind));
    println!("Open cases: {}", stats.open_cases);
    println!(
        "High priority (>= {HIGH_PRIORITY_THRESHOLD:.1}): {}",
        stats.high_priority
    );
    println!("Total stolen value: {}", stats.total_stolen_value);
    println!(
        "Recovered thefts: {} of {}",
        stats.recovered_thefts,
        stats.thefts()
    );
    println!("Total damage value: {}", stats.total_damage_value);
    println!();
}
