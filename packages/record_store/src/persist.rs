//! JSON document persistence.
//!
//! Each family is saved as one pretty-printed JSON document. A missing file
//! is treated as an empty store; anything unreadable is reported as
//! [`RecordError::MalformedInput`] so the caller can carry on with an empty
//! store instead of aborting.

use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::RecordError;

/// Reads a JSON document.
///
/// Returns `Ok(None)` if the file does not exist.
///
/// # Errors
///
/// Returns [`RecordError::MalformedInput`] if the file exists but cannot be
/// read or does not match the expected document shape.
pub fn load_document<D: DeserializeOwned>(path: &Path) -> Result<Option<D>, RecordError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::info!("No data file at {}, starting empty", path.display());
            return Ok(None);
        }
        Err(e) => return Err(RecordError::malformed(path, e.to_string())),
    };

    serde_json::from_str(&text)
        .map(Some)
        .map_err(|e| RecordError::malformed(path, e.to_string()))
}

/// Writes a JSON document, creating parent directories as needed.
///
/// The document is written to a sibling temporary file first and renamed
/// over the target, so a failed write never truncates the previous save.
///
/// # Errors
///
/// Returns [`RecordError::Json`] if serialization fails or
/// [`RecordError::Io`] if the file cannot be written.
pub fn save_document<D: Serialize>(path: &Path, document: &D) -> Result<(), RecordError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(document)?;
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, json)?;
    std::fs::rename(&tmp_path, path)?;

    log::debug!("Saved {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Doc {
        items: Vec<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    }

    #[test]
    fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded: Option<Doc> = load_document(&dir.path().join("absent.json")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn save_creates_directories_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("doc.json");
        let doc = Doc {
            items: vec![1, 2, 3],
            label: None,
        };

        save_document(&path, &doc).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(!text.contains("label"), "absent optional field was written");

        let loaded: Doc = load_document(&path).unwrap().unwrap();
        assert_eq!(loaded, doc);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn garbage_is_malformed_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = load_document::<Doc>(&path).unwrap_err();
        assert!(matches!(err, RecordError::MalformedInput { .. }));
    }

    #[test]
    fn missing_required_field_is_malformed_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        std::fs::write(&path, r#"{"label": "x"}"#).unwrap();

        let err = load_document::<Doc>(&path).unwrap_err();
        assert!(matches!(err, RecordError::MalformedInput { .. }));
    }
}
