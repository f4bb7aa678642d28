//! Parsers for string-typed field values entered at the prompt.
//!
//! Each parser names the field in its error so the caller can report which
//! input was rejected.

use std::str::FromStr;

use crate::{RecordError, RecordId};

/// Parses any [`FromStr`] value, trimming surrounding whitespace.
///
/// # Errors
///
/// Returns [`RecordError::InvalidField`] if the value does not parse.
pub fn parse<T>(field: &str, value: &str) -> Result<T, RecordError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| RecordError::invalid_field(field, format!("'{value}': {e}")))
}

/// Parses a finite floating-point value. `NaN` and infinities are rejected.
///
/// # Errors
///
/// Returns [`RecordError::InvalidField`] if the value does not parse or is
/// not finite.
pub fn parse_finite(field: &str, value: &str) -> Result<f64, RecordError> {
    let parsed: f64 = parse(field, value)?;
    if !parsed.is_finite() {
        return Err(RecordError::invalid_field(
            field,
            format!("'{value}' is not a finite number"),
        ));
    }
    Ok(parsed)
}

/// Parses a yes/no style flag.
///
/// Accepts `true`/`false`, `yes`/`no`, `y`/`n`, and `1`/`0`, ignoring case.
///
/// # Errors
///
/// Returns [`RecordError::InvalidField`] for anything else.
pub fn parse_bool(field: &str, value: &str) -> Result<bool, RecordError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Ok(true),
        "false" | "no" | "n" | "0" => Ok(false),
        _ => Err(RecordError::invalid_field(
            field,
            format!("'{value}' is not a yes/no value"),
        )),
    }
}

/// Parses an optional cross-reference id. Blank, `none`, and `-` clear it.
///
/// # Errors
///
/// Returns [`RecordError::InvalidField`] if a non-blank value is not an
/// integer.
pub fn parse_reference(field: &str, value: &str) -> Result<Option<RecordId>, RecordError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed == "-" || trimmed.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    parse(field, trimmed).map(Some)
}

/// Splits a comma-separated list, dropping blank entries.
#[must_use]
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Error for a field that exists on the family but not on this kind.
#[must_use]
pub fn not_applicable(field: &str, kind: &str) -> RecordError {
    RecordError::invalid_field(field, format!("not applicable to {kind} records"))
}

/// Error for a field name the family does not know.
#[must_use]
pub fn unknown(field: &str) -> RecordError {
    RecordError::invalid_field(field, "unknown field")
}

/// Error for an attempt to change a record's id.
#[must_use]
pub fn immutable_id() -> RecordError {
    RecordError::invalid_field("id", "ids cannot be changed after creation")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_reports_field_name() {
        let err = parse::<f64>("stolenValue", "lots").unwrap_err();
        match err {
            RecordError::InvalidField { field, .. } => assert_eq!(field, "stolenValue"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn parse_finite_rejects_nan_and_infinity() {
        assert!((parse_finite("severity", " 2.5 ").unwrap() - 2.5).abs() < f64::EPSILON);
        for v in ["NaN", "inf", "-inf", "infinity"] {
            assert!(parse_finite("severity", v).is_err(), "{v} accepted");
        }
    }

    #[test]
    fn parse_bool_accepts_common_spellings() {
        for v in ["true", "YES", "y", "1"] {
            assert!(parse_bool("flag", v).unwrap());
        }
        for v in ["false", "No", "n", "0"] {
            assert!(!parse_bool("flag", v).unwrap());
        }
        assert!(parse_bool("flag", "maybe").is_err());
    }

    #[test]
    fn parse_reference_clears_on_blank() {
        assert_eq!(parse_reference("locationId", "").unwrap(), None);
        assert_eq!(parse_reference("locationId", "none").unwrap(), None);
        assert_eq!(parse_reference("locationId", " 12 ").unwrap(), Some(12));
        assert!(parse_reference("locationId", "twelve").is_err());
    }

    #[test]
    fn parse_list_drops_blanks() {
        assert_eq!(parse_list("a, b,,c "), vec!["a", "b", "c"]);
        assert!(parse_list("  ").is_empty());
    }
}
