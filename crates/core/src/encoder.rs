//! Feature encoding.
//!
//! Turns a set of symptom names into the binary vector the classifier consumes, and back.

use crate::vocabulary::SymptomVocabulary;
use crate::{DiagnosisError, DiagnosisResult};
use std::collections::BTreeSet;

/// Binary feature vector, one value per vocabulary position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct FeatureVector(Vec<u8>);

impl FeatureVector {
    /// All-zero vector of the given width.
    pub fn zeros(len: usize) -> Self {
        Self(vec![0; len])
    }

    /// Wrap raw values without validation.
    ///
    /// The classifier adapter checks width and values before inference.
    pub fn from_values(values: Vec<u8>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Positions set to 1, ascending.
    pub fn active_positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, value)| **value == 1)
            .map(|(position, _)| position)
    }
}

/// Encode selected symptoms into a feature vector.
///
/// The result depends only on which names are present: order and repetition are ignored. An
/// empty selection yields an all-zero vector.
///
/// # Errors
///
/// Returns `DiagnosisError::UnknownSymptom` for the first name not in `vocabulary`.
pub fn encode<I, S>(symptoms: I, vocabulary: &SymptomVocabulary) -> DiagnosisResult<FeatureVector>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut features = FeatureVector::zeros(vocabulary.len());
    for symptom in symptoms {
        let name = symptom.as_ref();
        let position = vocabulary
            .position(name)
            .ok_or_else(|| DiagnosisError::UnknownSymptom(name.to_string()))?;
        features.0[position] = 1;
    }
    Ok(features)
}

/// Names of the symptoms whose position is set in `features`.
///
/// Positions beyond the vocabulary are ignored.
pub fn decode(features: &FeatureVector, vocabulary: &SymptomVocabulary) -> BTreeSet<String> {
    features
        .active_positions()
        .filter_map(|position| vocabulary.name_at(position))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::FEATURE_COUNT;

    fn vocab() -> SymptomVocabulary {
        SymptomVocabulary::builtin().expect("builtin vocabulary should parse")
    }

    #[test]
    fn test_encode_sets_selected_positions() {
        let vocab = vocab();
        let features = encode(["itching", "skin_rash", "nodal_skin_eruptions"], &vocab)
            .expect("known symptoms should encode");

        assert_eq!(features.len(), FEATURE_COUNT);
        assert_eq!(features.active_positions().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(features.as_slice().iter().filter(|v| **v == 0).count(), 129);
    }

    #[test]
    fn test_encode_empty_selection_is_all_zeros() {
        let features = encode(Vec::<String>::new(), &vocab()).expect("empty set should encode");
        assert_eq!(features, FeatureVector::zeros(FEATURE_COUNT));
    }

    #[test]
    fn test_encode_is_order_independent_and_idempotent() {
        let vocab = vocab();
        let a = encode(["cough", "high_fever", "chills", "cough"], &vocab).unwrap();
        let b = encode(["chills", "high_fever", "cough"], &vocab).unwrap();
        let c = encode(["chills", "high_fever", "cough"], &vocab).unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn test_encode_rejects_unknown_symptom() {
        let err = encode(["itching", "sore_elbow"], &vocab()).expect_err("should reject");
        assert!(matches!(err, DiagnosisError::UnknownSymptom(name) if name == "sore_elbow"));
    }

    #[test]
    fn test_decode_round_trips_subsets() {
        let vocab = vocab();
        let subsets: Vec<Vec<&str>> = vec![
            vec![],
            vec!["yellow_crust_ooze"],
            vec!["fluid_overload", "fluid_overload.1"],
            vec!["vomiting", "fatigue", "headache", "nausea", "toxic_look_(typhos)"],
            vocab.iter().map(|(_, name)| name).collect(),
        ];

        for subset in subsets {
            let expected: BTreeSet<String> = subset.iter().map(|s| s.to_string()).collect();
            let features = encode(&subset, &vocab).expect("subset should encode");
            assert_eq!(decode(&features, &vocab), expected);
        }
    }
}
