use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use crate::connection::WebhookError;
use crate::json_util::format_json;

/// File name used when the current rubric is exported to disk and when it is
/// attached to the grading workflow request.
pub const RUBRIC_FILE_NAME: &str = "rubrica.json";

/// Tag recording how the current rubric was obtained.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RubricProvenance {
    Generated,
    Imported,
    Preset,
}

/// The rubric currently held in memory.
///
/// The rubric is an opaque JSON document: field names are consumed by the
/// external grading workflow only, so no schema is enforced here. It is kept
/// as pretty-printed text together with its provenance, replaced wholesale on
/// each new generation, import or preset selection, and not persisted across
/// runs.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RubricDocument {
    pub text: String,
    pub provenance: RubricProvenance,
}

impl RubricDocument {
    /// Wraps an already-unwrapped rubric text with its provenance.
    pub fn from_text(text: impl Into<String>, provenance: RubricProvenance) -> Self {
        RubricDocument {
            text: text.into(),
            provenance,
        }
    }

    /// Builds a rubric from a JSON value, storing it pretty-printed.
    pub fn from_value(value: &Value, provenance: RubricProvenance) -> Self {
        RubricDocument {
            text: format_json(value),
            provenance,
        }
    }

    /// Loads a rubric from a local JSON file.
    ///
    /// The file is required to parse as JSON; on failure a validation error
    /// with a fixed message is returned and no webhook is contacted. The
    /// resulting document carries provenance `Imported`.
    pub fn import_from_file(file_path: &Path) -> Result<Self, WebhookError> {
        let file = File::open(file_path).map_err(|e| {
            WebhookError::validation(format!("Could not open the rubric file: {}", e))
        })?;
        let reader = BufReader::new(file);

        // Deserialize the JSON content to validate it, then keep the pretty form
        let value: Value = serde_json::from_reader(reader).map_err(|_| {
            WebhookError::validation("The selected file does not contain a valid JSON rubric")
        })?;

        Ok(RubricDocument::from_value(&value, RubricProvenance::Imported))
    }

    /// Writes the rubric text to `rubrica.json` inside the given directory.
    ///
    /// Returns:
    /// - `Result<PathBuf, WebhookError>`: The path of the written file, or an
    ///   error when the directory is not writable.
    pub fn export_to_directory(&self, output_directory: &Path) -> Result<PathBuf, WebhookError> {
        let output_path = output_directory.join(RUBRIC_FILE_NAME);

        let mut file = File::create(&output_path).map_err(|e| {
            WebhookError::validation(format!("Could not create the export file: {}", e))
        })?;
        file.write_all(self.text.as_bytes()).map_err(|e| {
            WebhookError::validation(format!("Could not write the export file: {}", e))
        })?;

        Ok(output_path)
    }
}

/// Default directory for rubric exports: the user's download directory, or the
/// current directory when the platform does not report one.
pub fn default_export_directory() -> PathBuf {
    dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("rubric_test_{}", name));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_from_value_stores_pretty_text() {
        let rubric = RubricDocument::from_value(&json!({"criterio": 1}), RubricProvenance::Preset);
        assert_eq!(rubric.text, "{\n  \"criterio\": 1\n}");
        assert_eq!(rubric.provenance, RubricProvenance::Preset);
    }

    #[test]
    fn test_import_rejects_non_json_file() {
        let dir = scratch_dir("bad_import");
        let path = dir.join("notas.txt");
        std::fs::write(&path, "this is not json").unwrap();

        let err = RubricDocument::import_from_file(&path).unwrap_err();
        assert_eq!(
            err.message,
            "The selected file does not contain a valid JSON rubric"
        );
        assert!(err.details.is_none());
    }

    #[test]
    fn test_import_accepts_json_file_and_tags_provenance() {
        let dir = scratch_dir("good_import");
        let path = dir.join("rubrica_manual.json");
        std::fs::write(&path, "{\"criterios\":[{\"nombre\":\"Claridad\",\"peso\":0.4}]}").unwrap();

        let rubric = RubricDocument::import_from_file(&path).unwrap();
        assert_eq!(rubric.provenance, RubricProvenance::Imported);
        assert!(rubric.text.contains("\"Claridad\""));
    }

    #[test]
    fn test_export_writes_rubrica_json() {
        let dir = scratch_dir("export");
        let rubric = RubricDocument::from_text("{\"a\": 1}", RubricProvenance::Generated);

        let path = rubric.export_to_directory(&dir).unwrap();
        assert!(path.ends_with(RUBRIC_FILE_NAME));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "{\"a\": 1}");
    }
}
