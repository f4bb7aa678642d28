//! Interactive menus, one module per record family.
//!
//! Every menu loops until "Back" is chosen. Record errors are printed and
//! the loop continues; only terminal failures are returned.

pub mod crime;
pub mod forensics;
pub mod jail;
pub mod officer;
pub mod patrol;

use std::fmt::{Display, Write as _};

use lems_cli_utils::{CliResult, choose, text};
use lems_record_store::KindCounts;

/// Label of the entry that leaves a menu.
pub const BACK: &str = "Back";

/// Label of the entry that asks for a free-form kind.
const OTHER_KIND: &str = "Other...";

/// Prints the outcome of a record operation.
pub fn report<T, E: Display>(result: Result<T, E>, success: impl FnOnce(T) -> String) {
    match result {
        Ok(value) => println!("{}", success(value)),
        Err(e) => println!("Error: {e}"),
    }
}

/// Lets the user pick one of `kinds`, or type any other literal.
///
/// # Errors
///
/// Returns an error if the terminal cannot be read.
pub fn ask_kind(prompt: &str, kinds: &[&str]) -> CliResult<String> {
    let mut labels = kinds.to_vec();
    labels.push(OTHER_KIND);
    let idx = choose(prompt, &labels)?;
    match kinds.get(idx) {
        Some(kind) => Ok((*kind).to_string()),
        None => text("Kind"),
    }
}

/// Asks each `(field, prompt)` question in turn and keeps the non-blank
/// answers.
///
/// # Errors
///
/// Returns an error if the terminal cannot be read.
pub fn ask_fields(questions: &[(&'static str, &str)]) -> CliResult<Vec<(&'static str, String)>> {
    let mut answers = Vec::new();
    for &(field, prompt) in questions {
        let answer = text(prompt)?;
        if !answer.is_empty() {
            answers.push((field, answer));
        }
    }
    Ok(answers)
}

/// Borrows collected answers in the shape `add_*_from_fields` expects.
#[must_use]
pub fn pairs<'a>(answers: &'a [(&'static str, String)]) -> Vec<(&'a str, &'a str)> {
    answers
        .iter()
        .map(|(field, value)| (*field, value.as_str()))
        .collect()
}

/// Asks which field to change and its new value.
///
/// # Errors
///
/// Returns an error if the terminal cannot be read.
pub fn ask_update(fields: &[&str]) -> CliResult<(String, String)> {
    println!("Fields: {}", fields.join(", "));
    let field = text("Field")?;
    let value = text("New value")?;
    Ok((field, value))
}

/// Renders per-kind counts with their share of the total.
#[must_use]
pub fn format_breakdown(title: &str, counts: &KindCounts) -> String {
    let mut out = format!("{title}: {}", counts.total());
    for (kind, count, percentage) in counts.breakdown() {
        let _ = write!(out, "\n  {kind:<20} {count:>5}  ({percentage:.1}%)");
    }
    out
}
