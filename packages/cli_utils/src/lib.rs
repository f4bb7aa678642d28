#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared CLI utilities for the law enforcement records toolchain.
//!
//! Provides [`init_logger`], which installs `pretty_env_logger` filtered by
//! `RUST_LOG`, and thin `dialoguer` wrappers used by every menu so that
//! prompts look and validate the same way across record families.

use std::fmt::Display;
use std::str::FromStr;

use dialoguer::{Confirm, Input, Select};

/// Result type for interactive handlers. Only terminal failures are
/// returned as errors; record errors are printed by the caller.
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Initializes the global logger.
///
/// Warnings and errors are shown by default so that load problems and
/// dangling references reach the operator; `RUST_LOG` overrides this.
pub fn init_logger() {
    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(log::LevelFilter::Warn);
    builder.parse_env("RUST_LOG");

    // Ignore error if logger was already set (e.g., in tests)
    builder.try_init().ok();
}

/// Presents a menu and returns the chosen index.
///
/// # Errors
///
/// Returns an error if the terminal cannot be read.
pub fn choose<T: ToString>(prompt: &str, labels: &[T]) -> CliResult<usize> {
    let labels: Vec<String> = labels.iter().map(ToString::to_string).collect();
    let idx = Select::new()
        .with_prompt(prompt)
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(idx)
}

/// Reads a line of free text. Empty input is allowed.
///
/// # Errors
///
/// Returns an error if the terminal cannot be read.
pub fn text(prompt: &str) -> CliResult<String> {
    let value: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;
    Ok(value.trim().to_string())
}

/// Reads a required value, re-prompting until it parses.
///
/// # Errors
///
/// Returns an error if the terminal cannot be read.
pub fn value<T>(prompt: &str) -> CliResult<T>
where
    T: Clone + ToString + FromStr,
    <T as FromStr>::Err: ToString,
{
    let value: T = Input::new().with_prompt(prompt).interact_text()?;
    Ok(value)
}

/// Reads an optional value. Blank input means `None`; anything else must
/// parse.
///
/// # Errors
///
/// Returns an error if the terminal cannot be read.
pub fn optional<T>(prompt: &str) -> CliResult<Option<T>>
where
    T: FromStr,
    <T as FromStr>::Err: Display,
{
    let raw: String = Input::new()
        .with_prompt(format!("{prompt} (blank for none)"))
        .allow_empty(true)
        .validate_with(|input: &String| -> Result<(), String> {
            parse_optional::<T>(input).map(|_| ()).map_err(|e| e.to_string())
        })
        .interact_text()?;
    parse_optional::<T>(&raw).map_err(|e| e.to_string().into())
}

/// Asks a yes/no question.
///
/// # Errors
///
/// Returns an error if the terminal cannot be read.
pub fn confirm(prompt: &str, default: bool) -> CliResult<bool> {
    let answer = Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()?;
    Ok(answer)
}

/// Parses text where blank means "no value".
///
/// # Errors
///
/// Returns the parse error for non-blank input that does not parse.
pub fn parse_optional<T: FromStr>(input: &str) -> Result<Option<T>, T::Err> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    input.parse().map(Some)
}

/// Renders one line per item, or `empty` when there are none, followed by
/// a count line.
#[must_use]
pub fn format_list<I, D>(items: I, noun: &str, empty: &str) -> String
where
    I: IntoIterator<Item = D>,
    D: Display,
{
    let lines: Vec<String> = items.into_iter().map(|item| item.to_string()).collect();
    if lines.is_empty() {
        return empty.to_string();
    }
    format!("{}\n\n{} {noun}(s)", lines.join("\n"), lines.len())
}

/// Prints [`format_list`] surrounded by blank lines.
pub fn print_list<I, D>(items: I, noun: &str, empty: &str)
where
    I: IntoIterator<Item = D>,
    D: Display,
{
    println!();
    println!("{}", format_list(items, noun, empty));
    println!();
}

/// Prints a section heading followed by an underline.
pub fn print_heading(title: &str) {
    println!();
    println!("{title}");
    println!("{}", "-".repeat(title.chars().count()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_optional_is_none() {
        assert_eq!(parse_optional::<i64>("").unwrap(), None);
        assert_eq!(parse_optional::<i64>("   ").unwrap(), None);
        assert_eq!(parse_optional::<i64>(" 12 ").unwrap(), Some(12));
        assert!(parse_optional::<i64>("twelve").is_err());
    }

    #[test]
    fn list_formatting() {
        assert_eq!(
            format_list(Vec::<String>::new(), "case", "No cases."),
            "No cases."
        );
        assert_eq!(
            format_list(["Case 1", "Case 2"], "case", "No cases."),
            "Case 1\nCase 2\n\n2 case(s)"
        );
    }
}
