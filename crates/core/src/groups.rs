//! Symptom groups.
//!
//! Named subsets of the vocabulary used by front-ends to browse symptoms by body system. Groups
//! are presentation data only; they play no part in encoding or classification.

use crate::vocabulary::SymptomVocabulary;
use crate::{DiagnosisError, DiagnosisResult};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

const BUILTIN_GROUPS_YAML: &str = include_str!("../data/symptom_groups.yaml");

/// One named group of symptoms, members in display order.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct SymptomGroup {
    name: String,
    symptoms: Vec<String>,
}

impl SymptomGroup {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symptoms(&self) -> &[String] {
        &self.symptoms
    }
}

/// Ordered list of symptom groups, validated against a vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymptomGroups {
    groups: Vec<SymptomGroup>,
}

impl SymptomGroups {
    /// The built-in groups, checked against `vocabulary`.
    ///
    /// # Errors
    ///
    /// Returns `DiagnosisError::InvalidData` if a built-in member is missing from `vocabulary`,
    /// which happens when the vocabulary was replaced without supplying matching groups.
    pub fn builtin(vocabulary: &SymptomVocabulary) -> DiagnosisResult<Self> {
        Self::from_yaml_str(BUILTIN_GROUPS_YAML, vocabulary)
    }

    /// Parse groups from a YAML sequence of `{ name, symptoms }` entries.
    ///
    /// # Errors
    ///
    /// Returns `DiagnosisError::YamlDeserialization` if the YAML is malformed, or any error from
    /// [`SymptomGroups::new`].
    pub fn from_yaml_str(yaml: &str, vocabulary: &SymptomVocabulary) -> DiagnosisResult<Self> {
        let groups: Vec<SymptomGroup> =
            serde_yaml::from_str(yaml).map_err(DiagnosisError::YamlDeserialization)?;
        Self::new(groups, vocabulary)
    }

    /// Read a groups file.
    ///
    /// # Errors
    ///
    /// Returns `DiagnosisError::DataLoad` if the file cannot be read, otherwise as
    /// [`SymptomGroups::from_yaml_str`].
    pub fn from_yaml_file(path: &Path, vocabulary: &SymptomVocabulary) -> DiagnosisResult<Self> {
        let yaml = fs::read_to_string(path).map_err(|source| DiagnosisError::DataLoad {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml, vocabulary)
    }

    /// # Errors
    ///
    /// Returns `DiagnosisError::InvalidData` if:
    /// - a group name is blank or repeated,
    /// - a group has no members or repeats a member,
    /// - a member is not in `vocabulary`.
    pub fn new(groups: Vec<SymptomGroup>, vocabulary: &SymptomVocabulary) -> DiagnosisResult<Self> {
        let mut names = HashSet::new();
        for group in &groups {
            if group.name.trim().is_empty() {
                return Err(DiagnosisError::InvalidData(
                    "symptom group name cannot be empty".into(),
                ));
            }
            if !names.insert(group.name.as_str()) {
                return Err(DiagnosisError::InvalidData(format!(
                    "symptom group '{}' appears more than once",
                    group.name
                )));
            }
            if group.symptoms.is_empty() {
                return Err(DiagnosisError::InvalidData(format!(
                    "symptom group '{}' has no symptoms",
                    group.name
                )));
            }

            let mut members = HashSet::new();
            for symptom in &group.symptoms {
                if !vocabulary.contains(symptom) {
                    return Err(DiagnosisError::InvalidData(format!(
                        "symptom group '{}' lists unknown symptom '{symptom}'",
                        group.name
                    )));
                }
                if !members.insert(symptom.as_str()) {
                    return Err(DiagnosisError::InvalidData(format!(
                        "symptom group '{}' lists '{symptom}' more than once",
                        group.name
                    )));
                }
            }
        }

        Ok(Self { groups })
    }

    pub fn iter(&self) -> impl Iterator<Item = &SymptomGroup> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
