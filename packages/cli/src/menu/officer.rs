//! Officer roster menu.

use std::path::Path;

use lems_cli_utils::{CliResult, choose, optional, print_heading, print_list, text, value};
use lems_officer::OfficerManager;
use lems_officer::models::{CONSTABLE, HEAD_CONSTABLE, INSPECTOR, Officer, SHO, SUB_INSPECTOR};
use lems_record_store::RecordId;

use super::{BACK, ask_fields, ask_kind, ask_update, format_breakdown, pairs, report};
use crate::registry::{Family, Registry};

const FIELDS: &[&str] = &[
    "name", "rank", "tasks", "station", "division", "squadSize", "beat",
];

enum OfficerAction {
    Add,
    List,
    ListBySeniority,
    Find,
    Search,
    Update,
    AssignTask,
    CompleteTask,
    Delete,
    Statistics,
    Import,
    Save,
    Back,
}

impl OfficerAction {
    const ALL: &[Self] = &[
        Self::Add,
        Self::List,
        Self::ListBySeniority,
        Self::Find,
        Self::Search,
        Self::Update,
        Self::AssignTask,
        Self::CompleteTask,
        Self::Delete,
        Self::Statistics,
        Self::Import,
        Self::Save,
        Self::Back,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Add => "Add officer",
            Self::List => "List officers",
            Self::ListBySeniority => "List by seniority",
            Self::Find => "Show an officer",
            Self::Search => "Search by name",
            Self::Update => "Update an officer",
            Self::AssignTask => "Assign a task",
            Self::CompleteTask => "Complete a task",
            Self::Delete => "Delete an officer",
            Self::Statistics => "Statistics",
            Self::Import => "Import legacy file",
            Self::Save => "Save",
            Self::Back => BACK,
        }
    }
}

/// Runs the officer menu until the user goes back.
///
/// # Errors
///
/// Returns an error if the terminal cannot be read.
pub fn run(registry: &mut Registry) -> CliResult<()> {
    let labels: Vec<&str> = OfficerAction::ALL.iter().map(OfficerAction::label).collect();

    loop {
        let idx = choose("Officers", &labels)?;
        match OfficerAction::ALL[idx] {
            OfficerAction::Add => handle_add(registry.officers())?,
            OfficerAction::List => {
                print_list(
                    registry.officers().list().map(Officer::summary),
                    "officer",
                    "No officers on the roster.",
                );
            }
            OfficerAction::ListBySeniority => {
                print_list(
                    registry
                        .officers()
                        .list_by_seniority()
                        .into_iter()
                        .map(|o| format!("{} [{}]", o.summary(), o.rank)),
                    "officer",
                    "No officers on the roster.",
                );
            }
            OfficerAction::Find => {
                let id: RecordId = value("Officer id")?;
                report(registry.officers().find(id), Officer::describe);
            }
            OfficerAction::Search => {
                let needle = text("Name contains")?;
                print_list(
                    registry
                        .officers()
                        .search_by_name(&needle)
                        .into_iter()
                        .map(Officer::summary),
                    "officer",
                    "No matching officers.",
                );
            }
            OfficerAction::Update => {
                let id: RecordId = value("Officer id")?;
                let (field, new_value) = ask_update(FIELDS)?;
                report(
                    registry.officers().update(id, &field, &new_value),
                    Officer::describe,
                );
            }
            OfficerAction::AssignTask => {
                let id: RecordId = value("Officer id")?;
                let task = text("Task")?;
                report(registry.officers().assign_task(id, &task), |o| {
                    format!("{} now has {} open task(s)", o.name, o.tasks.len())
                });
            }
            OfficerAction::CompleteTask => handle_complete_task(registry.officers())?,
            OfficerAction::Delete => {
                let id: RecordId = value("Officer id")?;
                report(registry.officers().delete(id), |o| {
                    format!("Removed {} from the roster", o.summary())
                });
            }
            OfficerAction::Statistics => print_statistics(registry.officers()),
            OfficerAction::Import => {
                let path = text("Legacy file path")?;
                report(registry.officers().import_legacy(Path::new(&path)), |n| {
                    format!("Imported {n} officer(s)")
                });
            }
            OfficerAction::Save => {
                let path = registry.paths().officers.display().to_string();
                report(registry.save(Family::Officer), |_| format!("Saved to {path}"));
            }
            OfficerAction::Back => return Ok(()),
        }
    }
}

fn handle_add(officers: &mut OfficerManager) -> CliResult<()> {
    let kind = ask_kind(
        "Role",
        &[SHO, INSPECTOR, SUB_INSPECTOR, HEAD_CONSTABLE, CONSTABLE],
    )?;
    let id: Option<RecordId> = optional("Id")?;
    let name = text("Name")?;

    let mut questions = vec![("rank", "Rank (blank for the role's default)")];
    match kind.as_str() {
        SHO => questions.push(("station", "Station")),
        INSPECTOR => questions.push(("division", "Division")),
        HEAD_CONSTABLE => questions.push(("squadSize", "Squad size")),
        CONSTABLE => questions.push(("beat", "Beat")),
        _ => {}
    }
    let answers = ask_fields(&questions)?;

    report(
        officers.add_from_fields(&kind, id, &name, &pairs(&answers)),
        |id| format!("Added officer {id}"),
    );
    Ok(())
}

fn handle_complete_task(officers: &mut OfficerManager) -> CliResult<()> {
    let id: RecordId = value("Officer id")?;
    let officer = match officers.find(id) {
        Ok(officer) => officer,
        Err(e) => {
            println!("Error: {e}");
            return Ok(());
        }
    };
    if officer.tasks.is_empty() {
        println!("{} has no open tasks.", officer.name);
        return Ok(());
    }
    println!("{}", officer.describe());

    let position: usize = value("Task number")?;
    report(officers.complete_task(id, position), |task| {
        format!("Completed: {task}")
    });
    Ok(())
}

fn print_statistics(officers: &OfficerManager) {
    let stats = officers.statistics();
    print_heading("Officer statistics");
    println!("{}", format_breakdown("Officers", &stats.by_kind));
    println!("Open tasks: {}", stats.open_tasks);
    println!();
}
