use crate::catalog::DiseaseLabel;
use crate::reference::ReferenceKind;

#[derive(Debug, thiserror::Error)]
pub enum DiagnosisError {
    #[error("unknown symptom: {0}")]
    UnknownSymptom(String),
    #[error("no symptoms selected")]
    EmptySelection,
    #[error("invalid feature vector: expected {expected} values, got {actual}")]
    InvalidFeatureVector { expected: usize, actual: usize },
    #[error("invalid feature vector: value {value} at position {position} is not 0 or 1")]
    NonBinaryFeature { position: usize, value: u8 },
    #[error("classifier returned label {0} which is not in the disease catalog")]
    UnknownLabel(DiseaseLabel),
    #[error("classifier failed: {0}")]
    Classifier(String),
    #[error("lookup in {table} table failed: {reason}")]
    ReferenceLookup {
        table: ReferenceKind,
        reason: String,
    },

    #[error("failed to read {path}: {source}", path = path.display())]
    DataLoad {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {table} table: {source}")]
    TableParse {
        table: ReferenceKind,
        #[source]
        source: csv::Error,
    },
    #[error("failed to deserialize YAML: {0}")]
    YamlDeserialization(serde_yaml::Error),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("failed to load model: {0}")]
    ModelLoad(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl DiagnosisError {
    /// Short message that is safe to show to an end user.
    ///
    /// Internal detail (paths, parser output, model internals) stays in the `Display` form,
    /// which front-ends log rather than return.
    pub fn user_message(&self) -> String {
        match self {
            Self::UnknownSymptom(name) => format!("Unknown symptom: {name}"),
            Self::EmptySelection => "Please select at least one symptom.".into(),
            Self::InvalidFeatureVector { .. } | Self::NonBinaryFeature { .. } => {
                "The selected symptoms could not be analysed.".into()
            }
            Self::UnknownLabel(_) => {
                "The prediction could not be matched to a known disease.".into()
            }
            Self::Classifier(_) => "The prediction model is unavailable.".into(),
            Self::ReferenceLookup { .. } => "Reference information is unavailable.".into(),
            Self::DataLoad { .. }
            | Self::TableParse { .. }
            | Self::YamlDeserialization(_)
            | Self::InvalidData(_)
            | Self::ModelLoad(_)
            | Self::InvalidInput(_) => "The service is not configured correctly.".into(),
        }
    }

    /// Whether the error was caused by the caller's input rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::UnknownSymptom(_) | Self::EmptySelection)
    }
}

pub type DiagnosisResult<T> = std::result::Result<T, DiagnosisError>;
