//! Disease catalog.
//!
//! Maps classifier label indices to canonical disease names. The names are the keys used by
//! every reference table, so resolution never falls back to a placeholder: an index that is not
//! in the catalog is an error.

use crate::{DiagnosisError, DiagnosisResult};
use medrec_types::NonEmptyText;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

const BUILTIN_DISEASES_YAML: &str = include_str!("../data/diseases.yaml");

/// Label index produced by the classifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct DiseaseLabel(pub u32);

impl std::fmt::Display for DiseaseLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Canonical disease name, as used to key the reference tables.
///
/// Stored exactly as written in the catalog, surrounding whitespace included. Table
/// rows are matched against it byte for byte.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DiseaseName(NonEmptyText);

impl DiseaseName {
    /// # Errors
    ///
    /// Returns `DiagnosisError::InvalidData` if the name is empty or blank.
    pub fn new(name: impl AsRef<str>) -> DiagnosisResult<Self> {
        NonEmptyText::new(name)
            .map(Self)
            .map_err(|e| DiagnosisError::InvalidData(format!("disease name: {e}")))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for DiseaseName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for DiseaseName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiseaseCatalog {
    entries: BTreeMap<DiseaseLabel, DiseaseName>,
}

impl DiseaseCatalog {
    /// The 41-disease catalog the bundled classifier was trained against.
    ///
    /// # Errors
    ///
    /// Only fails if the embedded table is corrupt, which the tests guard against.
    pub fn builtin() -> DiagnosisResult<Self> {
        Self::from_yaml_str(BUILTIN_DISEASES_YAML)
    }

    /// Parse a catalog from a YAML mapping of label index to name.
    ///
    /// # Errors
    ///
    /// Returns `DiagnosisError::YamlDeserialization` for malformed YAML and
    /// `DiagnosisError::InvalidData` for an empty catalog or empty names.
    pub fn from_yaml_str(yaml: &str) -> DiagnosisResult<Self> {
        let raw: BTreeMap<u32, String> =
            serde_yaml::from_str(yaml).map_err(DiagnosisError::YamlDeserialization)?;
        Self::from_entries(raw.into_iter().map(|(label, name)| (DiseaseLabel(label), name)))
    }

    /// Read a catalog file.
    ///
    /// # Errors
    ///
    /// Returns `DiagnosisError::DataLoad` if the file cannot be read, otherwise as
    /// [`DiseaseCatalog::from_yaml_str`].
    pub fn from_yaml_file(path: &Path) -> DiagnosisResult<Self> {
        let yaml = fs::read_to_string(path).map_err(|source| DiagnosisError::DataLoad {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// # Errors
    ///
    /// Returns `DiagnosisError::InvalidData` if there are no entries, a name is empty, or a
    /// label is repeated.
    pub fn from_entries<I, S>(entries: I) -> DiagnosisResult<Self>
    where
        I: IntoIterator<Item = (DiseaseLabel, S)>,
        S: AsRef<str>,
    {
        let mut map = BTreeMap::new();
        for (label, name) in entries {
            let name = DiseaseName::new(name)?;
            if map.insert(label, name).is_some() {
                return Err(DiagnosisError::InvalidData(format!(
                    "disease label {label} appears more than once"
                )));
            }
        }

        if map.is_empty() {
            return Err(DiagnosisError::InvalidData(
                "disease catalog cannot be empty".into(),
            ));
        }

        Ok(Self { entries: map })
    }

    /// Resolve a classifier label to its disease name.
    ///
    /// # Errors
    ///
    /// Returns `DiagnosisError::UnknownLabel` if the label is not in the catalog.
    pub fn resolve(&self, label: DiseaseLabel) -> DiagnosisResult<DiseaseName> {
        self.entries
            .get(&label)
            .cloned()
            .ok_or(DiagnosisError::UnknownLabel(label))
    }

    /// Entries in ascending label order.
    pub fn iter(&self) -> impl Iterator<Item = (DiseaseLabel, &DiseaseName)> {
        self.entries.iter().map(|(label, name)| (*label, name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_resolves_every_label() {
        let catalog = DiseaseCatalog::builtin().expect("builtin catalog should parse");
        assert_eq!(catalog.len(), 41);

        for label in 0..41 {
            let name = catalog
                .resolve(DiseaseLabel(label))
                .expect("every builtin label should resolve");
            assert!(!name.as_str().is_empty());
        }
    }

    #[test]
    fn test_builtin_catalog_known_names() {
        let catalog = DiseaseCatalog::builtin().unwrap();
        assert_eq!(catalog.resolve(DiseaseLabel(15)).unwrap().as_str(), "Fungal infection");
        assert_eq!(catalog.resolve(DiseaseLabel(2)).unwrap().as_str(), "Acne");
        assert_eq!(
            catalog.resolve(DiseaseLabel(0)).unwrap().as_str(),
            "(vertigo) Paroxysmal Positional Vertigo"
        );
    }

    #[test]
    fn test_resolve_unknown_label_fails() {
        let catalog = DiseaseCatalog::builtin().unwrap();
        let err = catalog
            .resolve(DiseaseLabel(999))
            .expect_err("unknown label should fail");
        assert!(matches!(err, DiagnosisError::UnknownLabel(DiseaseLabel(999))));

        assert!(catalog.resolve(DiseaseLabel(41)).is_err());
    }

    #[test]
    fn test_from_yaml_str_rejects_empty_name() {
        let err = DiseaseCatalog::from_yaml_str("0: 'Acne'\n1: '  '\n")
            .expect_err("should reject blank name");
        assert!(matches!(err, DiagnosisError::InvalidData(_)));
    }

    #[test]
    fn test_from_yaml_str_keeps_padded_name_verbatim() {
        let catalog = DiseaseCatalog::from_yaml_str("12: 'Diabetes '\n").unwrap();
        assert_eq!(catalog.resolve(DiseaseLabel(12)).unwrap().as_str(), "Diabetes ");
    }

    #[test]
    fn test_from_entries_rejects_repeated_label() {
        let err = DiseaseCatalog::from_entries([(DiseaseLabel(1), "AIDS"), (DiseaseLabel(1), "Acne")])
            .expect_err("should reject repeated label");
        assert!(matches!(err, DiagnosisError::InvalidData(msg) if msg.contains("more than once")));
    }

    #[test]
    fn test_from_entries_rejects_empty_catalog() {
        let err = DiseaseCatalog::from_entries(Vec::<(DiseaseLabel, String)>::new())
            .expect_err("should reject empty");
        assert!(matches!(err, DiagnosisError::InvalidData(_)));
    }
}
