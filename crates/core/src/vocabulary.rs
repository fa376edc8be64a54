//! Symptom vocabulary.
//!
//! A fixed, ordered list of symptom names. A symptom's index in the list is its position in the
//! feature vector, so the order must match the order the classifier was trained against.
//!
//! The built-in table is compiled from `data/symptoms.yaml`; a file with the same shape (a YAML
//! sequence of names) can replace it at startup.

use crate::constants::FEATURE_COUNT;
use crate::{DiagnosisError, DiagnosisResult};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const BUILTIN_SYMPTOMS_YAML: &str = include_str!("../data/symptoms.yaml");

/// Bijective mapping between symptom names and feature-vector positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymptomVocabulary {
    names: Vec<String>,
    positions: HashMap<String, usize>,
}

impl SymptomVocabulary {
    /// The vocabulary the bundled classifier was trained against.
    ///
    /// # Errors
    ///
    /// Only fails if the embedded table is corrupt, which the tests guard against.
    pub fn builtin() -> DiagnosisResult<Self> {
        Self::from_yaml_str(BUILTIN_SYMPTOMS_YAML)
    }

    /// Parse a vocabulary from a YAML sequence of symptom names.
    ///
    /// # Errors
    ///
    /// Returns `DiagnosisError::YamlDeserialization` if the YAML is malformed, or any error from
    /// [`SymptomVocabulary::from_names`].
    pub fn from_yaml_str(yaml: &str) -> DiagnosisResult<Self> {
        let names: Vec<String> =
            serde_yaml::from_str(yaml).map_err(DiagnosisError::YamlDeserialization)?;
        Self::from_names(names)
    }

    /// Read a vocabulary file.
    ///
    /// # Errors
    ///
    /// Returns `DiagnosisError::DataLoad` if the file cannot be read, otherwise as
    /// [`SymptomVocabulary::from_yaml_str`].
    pub fn from_yaml_file(path: &Path) -> DiagnosisResult<Self> {
        let yaml = fs::read_to_string(path).map_err(|source| DiagnosisError::DataLoad {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Build a vocabulary from names in position order.
    ///
    /// # Errors
    ///
    /// Returns `DiagnosisError::InvalidData` if:
    /// - the number of names differs from the classifier input width,
    /// - a name is empty or has surrounding whitespace,
    /// - a name appears twice.
    pub fn from_names(names: Vec<String>) -> DiagnosisResult<Self> {
        if names.len() != FEATURE_COUNT {
            return Err(DiagnosisError::InvalidData(format!(
                "symptom vocabulary must have {FEATURE_COUNT} entries, found {}",
                names.len()
            )));
        }

        let mut positions = HashMap::with_capacity(names.len());
        for (position, name) in names.iter().enumerate() {
            if name.is_empty() || name.trim() != name {
                return Err(DiagnosisError::InvalidData(format!(
                    "symptom at position {position} has an empty or padded name"
                )));
            }
            if positions.insert(name.clone(), position).is_some() {
                return Err(DiagnosisError::InvalidData(format!(
                    "symptom '{name}' appears more than once"
                )));
            }
        }

        Ok(Self { names, positions })
    }

    /// Feature-vector position of `name`, if it is part of the vocabulary.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    /// Symptom name at `position`.
    pub fn name_at(&self, position: usize) -> Option<&str> {
        self.names.get(position).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// `(position, name)` pairs in position order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.names.iter().map(String::as_str).enumerate()
    }
}

/// Human-readable form of a symptom identifier.
///
/// Underscores become spaces and every word is capitalised, with the remaining letters
/// lowercased: `toxic_look_(typhos)` becomes `Toxic Look (Typhos)`.
pub fn display_name(symptom: &str) -> String {
    let mut out = String::with_capacity(symptom.len());
    let mut previous_is_letter = false;

    for ch in symptom.chars() {
        let ch = if ch == '_' { ' ' } else { ch };
        if ch.is_alphabetic() {
            if previous_is_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(ch);
            previous_is_letter = false;
        }
    }

    out
}
