//! JSON helpers for the index manifest sidecar.
//!
//! Writes go through a temp file + rename so a reader never sees a partial
//! manifest.

use std::fs;
use std::path::Path;

use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::errors::IndexError;

/// Writes a pretty-printed JSON document via temp file + rename.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), IndexError> {
    let tmp = path.with_extension("json.tmp");
    let body = serde_json::to_vec_pretty(value).map_err(|e| IndexError::Parse(e.to_string()))?;
    fs::write(&tmp, body)?;
    fs::rename(&tmp, path)?;
    debug!(path = %path.display(), "json written");
    Ok(())
}

/// Reads a JSON document.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, IndexError> {
    let body = fs::read(path)?;
    serde_json::from_slice(&body)
        .map_err(|e| IndexError::Parse(format!("{}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Doc {
        model: String,
        count: usize,
    }

    #[test]
    fn written_document_is_read_back_without_temp_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        let doc = Doc {
            model: "sentence-transformers/all-MiniLM-L6-v2".into(),
            count: 12,
        };
        write_json(&path, &doc).unwrap();

        assert_eq!(read_json::<Doc>(&path).unwrap(), doc);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn malformed_document_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        std::fs::write(&path, "{\"model\":").unwrap();

        let err = read_json::<Doc>(&path).unwrap_err();
        assert!(matches!(err, IndexError::Parse(msg) if msg.contains("manifest.json")));
    }
}
