//! Jail cell and prisoner menu.

use std::path::Path;

use lems_cli_utils::{CliResult, choose, optional, print_heading, print_list, text, value};
use lems_jail::JailManager;
use lems_jail::models::{Cell, HIGH_SECURITY, Prisoner, STANDARD};
use lems_record_store::RecordId;

use super::{BACK, ask_fields, ask_kind, ask_update, format_breakdown, pairs, report};
use crate::registry::{Family, Registry};

const CELL_FIELDS: &[&str] = &["capacity", "assignedOfficerId", "surveillanceLevel"];

const PRISONER_FIELDS: &[&str] = &["name", "offense", "sentenceYears"];

enum JailAction {
    AddCell,
    ListCells,
    CellsWithSpace,
    FindCell,
    UpdateCell,
    AssignOfficer,
    DeleteCell,
    AddPrisoner,
    ListPrisoners,
    FindPrisoner,
    UnhousedPrisoners,
    UpdatePrisoner,
    DeletePrisoner,
    Admit,
    Release,
    Transfer,
    CheckReferences,
    Statistics,
    Import,
    Save,
    Back,
}

impl JailAction {
    const ALL: &[Self] = &[
        Self::AddCell,
        Self::ListCells,
        Self::CellsWithSpace,
        Self::FindCell,
        Self::UpdateCell,
        Self::AssignOfficer,
        Self::DeleteCell,
        Self::AddPrisoner,
        Self::ListPrisoners,
        Self::FindPrisoner,
        Self::UnhousedPrisoners,
        Self::UpdatePrisoner,
        Self::DeletePrisoner,
        Self::Admit,
        Self::Release,
        Self::Transfer,
        Self::CheckReferences,
        Self::Statistics,
        Self::Import,
        Self::Save,
        Self::Back,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::AddCell => "Add cell",
            Self::ListCells => "List cells",
            Self::CellsWithSpace => "List cells with space",
            Self::FindCell => "Show a cell",
            Self::UpdateCell => "Update a cell",
            Self::AssignOfficer => "Assign officer to a cell",
            Self::DeleteCell => "Delete a cell",
            Self::AddPrisoner => "Register prisoner",
            Self::ListPrisoners => "List prisoners",
            Self::FindPrisoner => "Show a prisoner",
            Self::UnhousedPrisoners => "List prisoners without a cell",
            Self::UpdatePrisoner => "Update a prisoner",
            Self::DeletePrisoner => "Delete a prisoner",
            Self::Admit => "Admit prisoner to a cell",
            Self::Release => "Release prisoner from a cell",
            Self::Transfer => "Transfer prisoner",
            Self::CheckReferences => "Check officer and cell references",
            Self::Statistics => "Statistics",
            Self::Import => "Import legacy cell file",
            Self::Save => "Save",
            Self::Back => BACK,
        }
    }
}

/// Runs the jail menu until the user goes back.
///
/// # Errors
///
/// Returns an error if the terminal cannot be read.
#[allow(clippy::too_many_lines)]
pub fn run(registry: &mut Registry) -> CliResult<()> {
    let labels: Vec<&str> = JailAction::ALL.iter().map(JailAction::label).collect();

    loop {
        let idx = choose("Jail", &labels)?;
        match JailAction::ALL[idx] {
            JailAction::AddCell => handle_add_cell(registry.jail())?,
            JailAction::ListCells => {
                print_list(
                    registry.jail().cells().map(Cell::summary),
                    "cell",
                    "No cells on record.",
                );
            }
            JailAction::CellsWithSpace => {
                print_list(
                    registry
                        .jail()
                        .cells_with_space()
                        .into_iter()
                        .map(Cell::summary),
                    "cell",
                    "Every cell is full.",
                );
            }
            JailAction::FindCell => handle_find_cell(registry.jail())?,
            JailAction::UpdateCell => {
                let id: RecordId = value("Cell id")?;
                let (field, new_value) = ask_update(CELL_FIELDS)?;
                report(
                    registry.jail().update_cell(id, &field, &new_value),
                    Cell::describe,
                );
            }
            JailAction::AssignOfficer => {
                let id: RecordId = value("Cell id")?;
                let officer_id: Option<RecordId> = optional("Officer id")?;
                let (jail, officers) = registry.jail_with_roster();
                report(jail.assign_officer(id, officer_id, officers), Cell::describe);
            }
            JailAction::DeleteCell => {
                let id: RecordId = value("Cell id")?;
                report(registry.jail().delete_cell(id), |c| {
                    format!("Deleted {}", c.summary())
                });
            }
            JailAction::AddPrisoner => handle_add_prisoner(registry.jail())?,
            JailAction::ListPrisoners => {
                print_list(
                    registry.jail().prisoners().map(Prisoner::summary),
                    "prisoner",
                    "No prisoners registered.",
                );
            }
            JailAction::FindPrisoner => {
                let id: RecordId = value("Prisoner id")?;
                report(registry.jail().find_prisoner(id), Prisoner::describe);
            }
            JailAction::UnhousedPrisoners => {
                print_list(
                    registry
                        .jail()
                        .unhoused_prisoners()
                        .into_iter()
                        .map(Prisoner::summary),
                    "prisoner",
                    "Every prisoner is housed.",
                );
            }
            JailAction::UpdatePrisoner => {
                let id: RecordId = value("Prisoner id")?;
                let (field, new_value) = ask_update(PRISONER_FIELDS)?;
                report(
                    registry.jail().update_prisoner(id, &field, &new_value),
                    Prisoner::describe,
                );
            }
            JailAction::DeletePrisoner => {
                let id: RecordId = value("Prisoner id")?;
                report(registry.jail().delete_prisoner(id), |p| {
                    format!("Deleted {}", p.summary())
                });
            }
            JailAction::Admit => {
                let prisoner_id: RecordId = value("Prisoner id")?;
                let cell_id: RecordId = value("Cell id")?;
                report(registry.jail().admit(prisoner_id, cell_id), |()| {
                    format!("Prisoner {prisoner_id} admitted to cell {cell_id}")
                });
            }
            JailAction::Release => {
                let prisoner_id: RecordId = value("Prisoner id")?;
                report(registry.jail().release(prisoner_id), |cell_id| {
                    format!("Prisoner {prisoner_id} released from cell {cell_id}")
                });
            }
            JailAction::Transfer => {
                let prisoner_id: RecordId = value("Prisoner id")?;
                let cell_id: RecordId = value("New cell id")?;
                report(registry.jail().transfer(prisoner_id, cell_id), |()| {
                    format!("Prisoner {prisoner_id} is now in cell {cell_id}")
                });
            }
            JailAction::CheckReferences => {
                let (jail, officers) = registry.jail_with_roster();
                print_list(
                    jail.dangling_references(officers),
                    "dangling reference",
                    "Every officer and cell reference resolves.",
                );
            }
            JailAction::Statistics => print_statistics(registry.jail()),
            JailAction::Import => {
                let path = text("Legacy file path")?;
                report(registry.jail().import_legacy(Path::new(&path)), |n| {
                    format!("Imported {n} cell(s)")
                });
            }
            JailAction::Save => {
                let path = registry.paths().jail.display().to_string();
                report(registry.save(Family::Jail), |_| format!("Saved to {path}"));
            }
            JailAction::Back => return Ok(()),
        }
    }
}

fn handle_add_cell(jail: &mut JailManager) -> CliResult<()> {
    let kind = ask_kind("Type", &[HIGH_SECURITY, STANDARD])?;
    let id: Option<RecordId> = optional("Id")?;
    let capacity: u32 = value("Capacity")?;

    let answers = if kind == HIGH_SECURITY {
        ask_fields(&[("surveillanceLevel", "Surveillance level (blank for default)")])?
    } else {
        Vec::new()
    };

    report(
        jail.add_cell_from_fields(&kind, id, capacity, &pairs(&answers)),
        |id| format!("Added cell {id}"),
    );
    Ok(())
}

fn handle_find_cell(jail: &JailManager) -> CliResult<()> {
    let id: RecordId = value("Cell id")?;
    match jail.find_cell(id) {
        Ok(cell) => {
            println!("{}", cell.describe());
            for prisoner in jail.prisoners_in_cell(id) {
                println!("    {}", prisoner.summary());
            }
        }
        Err(e) => println!("Error: {e}"),
    }
    Ok(())
}

fn handle_add_prisoner(jail: &mut JailManager) -> CliResult<()> {
    let id: Option<RecordId> = optional("Id")?;
    let name = text("Name")?;
    let answers = ask_fields(&[
        ("offense", "Offense"),
        ("sentenceYears", "Sentence (years)"),
    ])?;

    let id = match jail.add_prisoner_from_fields(id, &name, &pairs(&answers)) {
        Ok(id) => id,
        Err(e) => {
            println!("Error: {e}");
            return Ok(());
        }
    };
    println!("Registered prisoner {id}");

    if let Some(cell_id) = optional::<RecordId>("Admit to cell")? {
        report(jail.admit(id, cell_id), |()| {
            format!("Prisoner {id} admitted to cell {cell_id}")
        });
    }
    Ok(())
}

fn print_statistics(jail: &JailManager) {
    let cells = jail.cell_statistics();
    let prisoners = jail.prisoner_statistics();
    print_heading("Jail statistics");
    println!("{}", format_breakdown("Cells", &cells.by_kind));
    println!("Total capacity: {}", cells.total_capacity);
    println!(
        "Occupancy: {} ({:.1}%)",
        cells.total_occupancy,
        cells.occupancy_rate()
    );
    println!("{}", format_breakdown("Prisoners by offense", &prisoners.by_kind));
    println!("Housed prisoners: {}", prisoners.housed);
    println!("Total sentence: {:.1} years", jail.total_sentence_years());
    println!();
}
