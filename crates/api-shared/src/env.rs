//! Startup configuration read from the process environment.
//!
//! Server binaries call [`core_config_from_env`] once before serving; nothing below the
//! binaries reads environment variables.

use medrec_core::{resolve_data_dir, CoreConfig, DiagnosisResult};
use std::path::PathBuf;

/// Directory holding the reference tables and, by default, `model.json`.
pub const DATA_DIR_VAR: &str = "MEDREC_DATA_DIR";
/// Explicit path to the exported model.
pub const MODEL_PATH_VAR: &str = "MEDREC_MODEL_PATH";
/// Optional replacement for the built-in symptom vocabulary.
pub const SYMPTOMS_FILE_VAR: &str = "MEDREC_SYMPTOMS_FILE";
/// Optional replacement for the built-in symptom groups.
pub const GROUPS_FILE_VAR: &str = "MEDREC_GROUPS_FILE";
/// Optional replacement for the built-in disease catalog.
pub const DISEASES_FILE_VAR: &str = "MEDREC_DISEASES_FILE";

fn path_var(name: &str) -> Option<PathBuf> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}

/// Build a `CoreConfig` from the `MEDREC_*` variables.
///
/// # Errors
///
/// Returns `DiagnosisError::InvalidInput` if no usable data directory can be found.
pub fn core_config_from_env() -> DiagnosisResult<CoreConfig> {
    let data_dir = resolve_data_dir(path_var(DATA_DIR_VAR))?;
    Ok(CoreConfig::new(data_dir, path_var(MODEL_PATH_VAR))?
        .with_symptoms_file(path_var(SYMPTOMS_FILE_VAR))
        .with_groups_file(path_var(GROUPS_FILE_VAR))
        .with_diseases_file(path_var(DISEASES_FILE_VAR)))
}

/// Whether a boolean flag variable is set to `true`.
pub fn flag_enabled(name: &str) -> bool {
    std::env::var(name)
        .map(|v| v.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}
