//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. The core never reads environment variables itself; binaries do
//! that and hand the results to [`CoreConfig::new`].

use crate::constants::{DEFAULT_DATA_DIR, DESCRIPTION_FILENAME, MODEL_FILENAME};
use crate::reference::ReferenceKind;
use crate::{DiagnosisError, DiagnosisResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
    model_path: PathBuf,
    symptoms_file: Option<PathBuf>,
    groups_file: Option<PathBuf>,
    diseases_file: Option<PathBuf>,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Arguments
    ///
    /// * `data_dir` - Directory holding the five reference tables.
    /// * `model_path` - Classifier artifact; defaults to `model.json` inside `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns `DiagnosisError::InvalidInput` if `data_dir` is not a directory.
    pub fn new(data_dir: PathBuf, model_path: Option<PathBuf>) -> DiagnosisResult<Self> {
        if !data_dir.is_dir() {
            return Err(DiagnosisError::InvalidInput(format!(
                "data directory does not exist: {}",
                data_dir.display()
            )));
        }

        let model_path = model_path.unwrap_or_else(|| data_dir.join(MODEL_FILENAME));

        Ok(Self {
            data_dir,
            model_path,
            symptoms_file: None,
            groups_file: None,
            diseases_file: None,
        })
    }

    /// Use a symptom vocabulary file instead of the built-in table.
    pub fn with_symptoms_file(mut self, path: Option<PathBuf>) -> Self {
        self.symptoms_file = path;
        self
    }

    /// Use a symptom groups file instead of the built-in groups.
    pub fn with_groups_file(mut self, path: Option<PathBuf>) -> Self {
        self.groups_file = path;
        self
    }

    /// Use a disease catalog file instead of the built-in table.
    pub fn with_diseases_file(mut self, path: Option<PathBuf>) -> Self {
        self.diseases_file = path;
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn symptoms_file(&self) -> Option<&Path> {
        self.symptoms_file.as_deref()
    }

    pub fn groups_file(&self) -> Option<&Path> {
        self.groups_file.as_deref()
    }

    pub fn diseases_file(&self) -> Option<&Path> {
        self.diseases_file.as_deref()
    }

    /// Path of the CSV file backing the given reference table.
    pub fn table_path(&self, kind: ReferenceKind) -> PathBuf {
        self.data_dir.join(kind.file_name())
    }
}

/// Resolve the data directory without reading environment variables.
///
/// If `override_dir` is provided it must be a directory containing `description.csv`.
/// Otherwise this searches for `data/` relative to the current working directory and then
/// walks up from `CARGO_MANIFEST_DIR`.
///
/// # Errors
///
/// Returns `DiagnosisError::InvalidInput` if no suitable directory is found.
pub fn resolve_data_dir(override_dir: Option<PathBuf>) -> DiagnosisResult<PathBuf> {
    fn looks_like_data_dir(path: &Path) -> bool {
        path.join(DESCRIPTION_FILENAME).is_file()
    }

    if let Some(data_dir) = override_dir {
        if data_dir.is_dir() && looks_like_data_dir(&data_dir) {
            return Ok(data_dir);
        }
        return Err(DiagnosisError::InvalidInput(format!(
            "MEDREC_DATA_DIR override is not a valid data directory (must contain {DESCRIPTION_FILENAME})"
        )));
    }

    let cwd_relative = PathBuf::from(DEFAULT_DATA_DIR);
    if cwd_relative.is_dir() && looks_like_data_dir(&cwd_relative) {
        return Ok(cwd_relative);
    }

    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    for ancestor in manifest_dir.ancestors() {
        let candidate = ancestor.join(DEFAULT_DATA_DIR);
        if candidate.is_dir() && looks_like_data_dir(&candidate) {
            return Ok(candidate);
        }
    }

    Err(DiagnosisError::InvalidInput(format!(
        "could not locate {DEFAULT_DATA_DIR}/ directory with {DESCRIPTION_FILENAME}"
    )))
}
