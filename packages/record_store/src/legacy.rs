//! Reader for the older comma-delimited text data files.
//!
//! Those files have no header row and one record per line, e.g.
//! `12,Theft` or `3,4,High Security`. Lines that cannot be parsed are
//! skipped with a warning rather than failing the whole import.

use std::path::Path;

use crate::RecordError;

/// One parsed line of a legacy text file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyRow {
    /// 1-based line number, for diagnostics.
    pub line: u64,
    /// Whitespace-trimmed fields.
    pub fields: Vec<String>,
}

impl LegacyRow {
    /// Returns field `index`, or an empty string if the line is short.
    #[must_use]
    pub fn field(&self, index: usize) -> &str {
        self.fields.get(index).map_or("", String::as_str)
    }

    /// Joins the fields between the first and the last with commas.
    ///
    /// Used for free-text columns that may themselves contain commas, such
    /// as a name in `id,name,role`.
    #[must_use]
    pub fn middle(&self) -> String {
        if self.fields.len() < 3 {
            return String::new();
        }
        self.fields[1..self.fields.len() - 1].join(",")
    }
}

/// Reads every well-formed line of a legacy text file.
///
/// Returns an empty list if the file does not exist.
///
/// # Errors
///
/// Returns [`RecordError::MalformedInput`] if the file exists but cannot be
/// opened.
pub fn read_rows(path: &Path) -> Result<Vec<LegacyRow>, RecordError> {
    if !path.exists() {
        log::info!("No legacy file at {}", path.display());
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| RecordError::malformed(path, e.to_string()))?;

    let mut rows = Vec::new();
    for result in reader.records() {
        match result {
            Ok(record) => {
                let line = record.position().map_or(0, csv::Position::line);
                let fields: Vec<String> = record.iter().map(ToString::to_string).collect();
                if fields.iter().all(String::is_empty) {
                    continue;
                }
                rows.push(LegacyRow { line, fields });
            }
            Err(e) => {
                log::warn!("Skipping unreadable line in {}: {e}", path.display());
            }
        }
    }

    Ok(rows)
}
