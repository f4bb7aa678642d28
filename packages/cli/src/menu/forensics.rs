//! Forensic expert and evidence menu.

use lems_cli_utils::{CliResult, choose, optional, print_heading, print_list, text, value};
use lems_crime::CrimeManager;
use lems_forensics::ForensicsManager;
use lems_forensics::models::{
    Evidence, EvidenceStatus, FIELD_AGENT, ForensicExpert, LAB_TECHNICIAN,
};
use lems_officer::OfficerManager;
use lems_record_store::RecordId;
use strum::IntoEnumIterator as _;

use super::{BACK, ask_fields, ask_kind, ask_update, format_breakdown, pairs, report};
use crate::registry::{Family, Registry};

const EXPERT_FIELDS: &[&str] = &["name", "lab", "certifications"];

const EVIDENCE_FIELDS: &[&str] = &["caseId", "description", "evidenceType", "status", "expertId"];

enum ForensicsAction {
    AddExpert,
    ListExperts,
    FindExpert,
    UpdateExpert,
    SetSupervisor,
    DeleteExpert,
    LogEvidence,
    ListEvidence,
    FindEvidence,
    FilterEvidence,
    AssignEvidence,
    SetStatus,
    UpdateEvidence,
    DeleteEvidence,
    CheckReferences,
    Statistics,
    Save,
    Back,
}

impl ForensicsAction {
    const ALL: &[Self] = &[
        Self::AddExpert,
        Self::ListExperts,
        Self::FindExpert,
        Self::UpdateExpert,
        Self::SetSupervisor,
        Self::DeleteExpert,
        Self::LogEvidence,
        Self::ListEvidence,
        Self::FindEvidence,
        Self::FilterEvidence,
        Self::AssignEvidence,
        Self::SetStatus,
        Self::UpdateEvidence,
        Self::DeleteEvidence,
        Self::CheckReferences,
        Self::Statistics,
        Self::Save,
        Self::Back,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::AddExpert => "Add expert",
            Self::ListExperts => "List experts",
            Self::FindExpert => "Show an expert",
            Self::UpdateExpert => "Update an expert",
            Self::SetSupervisor => "Set field agent supervisor",
            Self::DeleteExpert => "Delete an expert",
            Self::LogEvidence => "Log evidence",
            Self::ListEvidence => "List evidence",
            Self::FindEvidence => "Show evidence",
            Self::FilterEvidence => "Filter evidence",
            Self::AssignEvidence => "Assign evidence to an expert",
            Self::SetStatus => "Set evidence status",
            Self::UpdateEvidence => "Update evidence",
            Self::DeleteEvidence => "Delete evidence",
            Self::CheckReferences => "Check case and officer references",
            Self::Statistics => "Statistics",
            Self::Save => "Save",
            Self::Back => BACK,
        }
    }
}

enum EvidenceFilter {
    Case,
    Expert,
    Status,
    Unassigned,
}

impl EvidenceFilter {
    const ALL: &[Self] = &[Self::Case, Self::Expert, Self::Status, Self::Unassigned];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Case => "By case",
            Self::Expert => "By expert",
            Self::Status => "By status",
            Self::Unassigned => "Unassigned only",
        }
    }
}

/// Runs the forensics menu until the user goes back.
///
/// # Errors
///
/// Returns an error if the terminal cannot be read.
#[allow(clippy::too_many_lines)]
pub fn run(registry: &mut Registry) -> CliResult<()> {
    let labels: Vec<&str> = ForensicsAction::ALL
        .iter()
        .map(ForensicsAction::label)
        .collect();

    loop {
        let idx = choose("Forensics", &labels)?;
        match ForensicsAction::ALL[idx] {
            ForensicsAction::AddExpert => {
                let (forensics, _, officers) = registry.forensics_with_lookups();
                handle_add_expert(forensics, officers)?;
            }
            ForensicsAction::ListExperts => {
                print_list(
                    registry.forensics().experts().map(ForensicExpert::summary),
                    "expert",
                    "No forensic experts registered.",
                );
            }
            ForensicsAction::FindExpert => {
                let id: RecordId = value("Expert id")?;
                report(registry.forensics().find_expert(id), ForensicExpert::describe);
            }
            ForensicsAction::UpdateExpert => {
                let id: RecordId = value("Expert id")?;
                let (field, new_value) = ask_update(EXPERT_FIELDS)?;
                report(
                    registry.forensics().update_expert(id, &field, &new_value),
                    ForensicExpert::describe,
                );
            }
            ForensicsAction::SetSupervisor => {
                let id: RecordId = value("Expert id")?;
                let officer_id: Option<RecordId> = optional("Head constable id")?;
                let (forensics, _, officers) = registry.forensics_with_lookups();
                report(
                    forensics.set_supervisor(id, officer_id, officers),
                    ForensicExpert::describe,
                );
            }
            ForensicsAction::DeleteExpert => {
                let id: RecordId = value("Expert id")?;
                report(registry.forensics().delete_expert(id), |e| {
                    format!("Deleted {}", e.summary())
                });
            }
            ForensicsAction::LogEvidence => {
                let (forensics, crimes, _) = registry.forensics_with_lookups();
                handle_log_evidence(forensics, crimes)?;
            }
            ForensicsAction::ListEvidence => {
                print_list(
                    registry.forensics().evidence().map(Evidence::summary),
                    "item",
                    "No evidence logged.",
                );
            }
            ForensicsAction::FindEvidence => {
                let (forensics, crimes, _) = registry.forensics_with_lookups();
                handle_find_evidence(forensics, crimes)?;
            }
            ForensicsAction::FilterEvidence => handle_filter(registry.forensics())?,
            ForensicsAction::AssignEvidence => {
                let evidence_id: RecordId = value("Evidence id")?;
                let expert_id: RecordId = value("Expert id")?;
                report(
                    registry.forensics().assign_evidence(evidence_id, expert_id),
                    Evidence::describe,
                );
            }
            ForensicsAction::SetStatus => {
                let id: RecordId = value("Evidence id")?;
                let status = ask_status()?;
                report(
                    registry.forensics().set_evidence_status(id, status),
                    Evidence::summary,
                );
            }
            ForensicsAction::UpdateEvidence => {
                let id: RecordId = value("Evidence id")?;
                let (field, new_value) = ask_update(EVIDENCE_FIELDS)?;
                report(
                    registry.forensics().update_evidence(id, &field, &new_value),
                    Evidence::describe,
                );
            }
            ForensicsAction::DeleteEvidence => {
                let id: RecordId = value("Evidence id")?;
                report(registry.forensics().delete_evidence(id), |e| {
                    format!("Deleted {}", e.summary())
                });
            }
            ForensicsAction::CheckReferences => {
                let (forensics, crimes, officers) = registry.forensics_with_lookups();
                print_list(
                    forensics.dangling_references(crimes, officers),
                    "dangling reference",
                    "Every case and officer reference resolves.",
                );
            }
            ForensicsAction::Statistics => print_statistics(registry.forensics()),
            ForensicsAction::Save => {
                let path = registry.paths().forensics.display().to_string();
                report(registry.save(Family::Forensics), |_| {
                    format!("Saved to {path}")
                });
            }
            ForensicsAction::Back => return Ok(()),
        }
    }
}

fn handle_add_expert(
    forensics: &mut ForensicsManager,
    officers: &OfficerManager,
) -> CliResult<()> {
    let kind = ask_kind("Role", &[LAB_TECHNICIAN, FIELD_AGENT])?;
    let id: Option<RecordId> = optional("Id")?;
    let name = text("Name")?;

    let answers = if kind == LAB_TECHNICIAN {
        ask_fields(&[
            ("lab", "Lab"),
            ("certifications", "Certifications (comma separated)"),
        ])?
    } else {
        Vec::new()
    };

    let id = match forensics.add_expert_from_fields(&kind, id, &name, &pairs(&answers)) {
        Ok(id) => id,
        Err(e) => {
            println!("Error: {e}");
            return Ok(());
        }
    };
    println!("Added expert {id}");

    if kind == FIELD_AGENT
        && let Some(officer_id) = optional::<RecordId>("Supervising head constable id")?
    {
        report(
            forensics.set_supervisor(id, Some(officer_id), officers),
            ForensicExpert::describe,
        );
    }
    Ok(())
}

fn handle_log_evidence(forensics: &mut ForensicsManager, crimes: &CrimeManager) -> CliResult<()> {
    let case_id: RecordId = value("Case id")?;
    let evidence_type = text("Evidence type")?;
    let description = text("Description")?;
    report(
        forensics.add_evidence(case_id, &evidence_type, &description, crimes),
        |id| format!("Logged evidence {id} against case {case_id}"),
    );
    Ok(())
}

fn handle_find_evidence(forensics: &ForensicsManager, crimes: &CrimeManager) -> CliResult<()> {
    let id: RecordId = value("Evidence id")?;
    let evidence = match forensics.find_evidence(id) {
        Ok(evidence) => evidence,
        Err(e) => {
            println!("Error: {e}");
            return Ok(());
        }
    };
    println!("{}", evidence.describe());

    match forensics.case_for_evidence(id, crimes) {
        Ok(Some(case)) => println!("  Case: {}", case.summary),
        Ok(None) => println!("  Case {} is not on file", evidence.case_id),
        Err(e) => println!("Error: {e}"),
    }
    if let Some(expert_id) = evidence.expert_id {
        match forensics.find_expert(expert_id) {
            Ok(expert) => println!("  Expert: {}", expert.summary()),
            Err(_) => println!("  Expert {expert_id} is no longer registered"),
        }
    }
    Ok(())
}

fn handle_filter(forensics: &ForensicsManager) -> CliResult<()> {
    let labels: Vec<&str> = EvidenceFilter::ALL.iter().map(EvidenceFilter::label).collect();
    let idx = choose("Filter", &labels)?;

    let evidence = match EvidenceFilter::ALL[idx] {
        EvidenceFilter::Case => {
            let case_id: RecordId = value("Case id")?;
            forensics.evidence_for_case(case_id)
        }
        EvidenceFilter::Expert => {
            let expert_id: RecordId = value("Expert id")?;
            forensics.evidence_for_expert(expert_id)
        }
        EvidenceFilter::Status => forensics.evidence_with_status(ask_status()?),
        EvidenceFilter::Unassigned => forensics.unassigned_evidence(),
    };

    print_list(
        evidence.into_iter().map(Evidence::summary),
        "item",
        "No matching evidence.",
    );
    Ok(())
}

fn ask_status() -> CliResult<EvidenceStatus> {
    let statuses: Vec<EvidenceStatus> = EvidenceStatus::iter().collect();
    let idx = choose("Status", &statuses)?;
    Ok(statuses[idx])
}

fn print_statistics(forensics: &ForensicsManager) {
    let stats = forensics.statistics();
    print_heading("Forensics statistics");
    println!("{}", format_breakdown("Experts", forensics.expert_counts()));
    println!("{}", format_breakdown("Evidence", &stats.by_kind));
    println!("{}", format_breakdown("By status", &stats.by_status));
    println!("Unassigned evidence: {}", stats.unassigned);
    println!();
}
