//! Diagnosis pipeline.
//!
//! [`DiagnosisService`] owns the state loaded at startup (vocabulary, catalog, reference tables
//! and classifier) and runs the per-request pipeline:
//!
//! symptoms → feature vector → label → disease name → report
//!
//! The loaded state is never mutated, so the service is cloned into request handlers and used
//! concurrently without locking. Each call to [`DiagnosisService::analyse`] is independent.

use crate::catalog::{DiseaseCatalog, DiseaseLabel};
use crate::classifier::{ClassifierAdapter, DiseaseModel, LinearSvmModel};
use crate::config::CoreConfig;
use crate::constants::FEATURE_COUNT;
use crate::encoder::encode;
use crate::groups::SymptomGroups;
use crate::reference::ReferenceTables;
use crate::report::{assemble, Report};
use crate::vocabulary::SymptomVocabulary;
use crate::{DiagnosisError, DiagnosisResult};
use std::sync::Arc;

/// One user's symptom selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    symptoms: Vec<String>,
}

impl AnalysisRequest {
    /// Build a request from the selected symptom names.
    ///
    /// Names are trimmed and repeated names dropped, keeping first-seen order. Whether each name
    /// exists is checked later by the encoder.
    ///
    /// # Errors
    ///
    /// Returns `DiagnosisError::EmptySelection` if no non-blank name is given.
    pub fn new<I, S>(symptoms: I) -> DiagnosisResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selected: Vec<String> = Vec::new();
        for symptom in symptoms {
            let name = symptom.as_ref().trim();
            if name.is_empty() || selected.iter().any(|s| s == name) {
                continue;
            }
            selected.push(name.to_string());
        }

        if selected.is_empty() {
            return Err(DiagnosisError::EmptySelection);
        }

        Ok(Self { symptoms: selected })
    }

    pub fn symptoms(&self) -> &[String] {
        &self.symptoms
    }
}

/// Result of one analysis.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Diagnosis {
    pub label: DiseaseLabel,
    pub report: Report,
}

/// Read-only data shared by every request.
#[derive(Debug)]
pub struct KnowledgeBase {
    pub vocabulary: SymptomVocabulary,
    pub groups: SymptomGroups,
    pub catalog: DiseaseCatalog,
    pub tables: ReferenceTables,
}

impl KnowledgeBase {
    /// Load the vocabulary, symptom groups, catalog and reference tables described by `cfg`.
    ///
    /// # Errors
    ///
    /// Returns the first error from loading any of them.
    pub fn load(cfg: &CoreConfig) -> DiagnosisResult<Self> {
        let vocabulary = match cfg.symptoms_file() {
            Some(path) => SymptomVocabulary::from_yaml_file(path)?,
            None => SymptomVocabulary::builtin()?,
        };
        let groups = match cfg.groups_file() {
            Some(path) => SymptomGroups::from_yaml_file(path, &vocabulary)?,
            None => SymptomGroups::builtin(&vocabulary)?,
        };
        let catalog = match cfg.diseases_file() {
            Some(path) => DiseaseCatalog::from_yaml_file(path)?,
            None => DiseaseCatalog::builtin()?,
        };
        let tables = ReferenceTables::load(cfg.data_dir())?;

        Ok(Self {
            vocabulary,
            groups,
            catalog,
            tables,
        })
    }
}

/// Symptom analysis service shared by the CLI, REST and gRPC front-ends.
#[derive(Clone, Debug)]
pub struct DiagnosisService {
    knowledge: Arc<KnowledgeBase>,
    classifier: ClassifierAdapter,
}

impl DiagnosisService {
    /// Create a service from already-loaded parts.
    pub fn new(knowledge: KnowledgeBase, classifier: ClassifierAdapter) -> Self {
        Self {
            knowledge: Arc::new(knowledge),
            classifier,
        }
    }

    /// Load all data and the classifier once at startup.
    ///
    /// # Errors
    ///
    /// Returns `DiagnosisError::ModelLoad` if the model input width does not match the
    /// vocabulary, or any error from loading data or the model.
    pub fn load(cfg: &CoreConfig) -> DiagnosisResult<Self> {
        tracing::info!("Loading knowledge base from {:?}", cfg.data_dir());
        let knowledge = KnowledgeBase::load(cfg)?;

        let model = LinearSvmModel::from_path(cfg.model_path())?;
        if model.n_features() != FEATURE_COUNT {
            return Err(DiagnosisError::ModelLoad(format!(
                "model expects {} features, vocabulary has {FEATURE_COUNT}",
                model.n_features()
            )));
        }

        Ok(Self::new(knowledge, ClassifierAdapter::new(Arc::new(model))))
    }

    pub fn vocabulary(&self) -> &SymptomVocabulary {
        &self.knowledge.vocabulary
    }

    pub fn groups(&self) -> &SymptomGroups {
        &self.knowledge.groups
    }

    pub fn catalog(&self) -> &DiseaseCatalog {
        &self.knowledge.catalog
    }

    pub fn tables(&self) -> &ReferenceTables {
        &self.knowledge.tables
    }

    /// Run the full pipeline for one request.
    ///
    /// # Errors
    ///
    /// Returns `DiagnosisError::UnknownSymptom`, `InvalidFeatureVector`, `NonBinaryFeature`,
    /// `Classifier` or `UnknownLabel`; each aborts the request. Reference-table problems never
    /// surface here, they become placeholders in the report.
    pub fn analyse(&self, request: &AnalysisRequest) -> DiagnosisResult<Diagnosis> {
        tracing::debug!("Step 1: Encoding {} symptoms...", request.symptoms().len());
        let features = encode(request.symptoms(), &self.knowledge.vocabulary)?;

        tracing::debug!("Step 2: Running classifier...");
        let label = self.classifier.classify(&features)?;

        tracing::debug!("Step 3: Resolving label {}...", label);
        let disease = self.knowledge.catalog.resolve(label)?;

        tracing::debug!("Step 4: Assembling report for '{}'...", disease);
        let report = assemble(&disease, &self.knowledge.tables);

        tracing::info!("Analysis complete: label={}, disease={}", label, disease);

        Ok(Diagnosis { label, report })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ModelError;
    use crate::constants::{MODEL_FILENAME, NO_RECOMMENDATIONS};
    use crate::encoder::FeatureVector;
    use crate::reference::ReferenceKind;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Returns a fixed label and records the vector it was given.
    struct StubModel {
        label: u32,
        seen: Mutex<Option<FeatureVector>>,
    }

    impl StubModel {
        fn new(label: u32) -> Arc<Self> {
            Arc::new(Self {
                label,
                seen: Mutex::new(None),
            })
        }
    }

    impl DiseaseModel for StubModel {
        fn predict(&self, features: &[u8]) -> Result<DiseaseLabel, ModelError> {
            *self.seen.lock().unwrap() = Some(FeatureVector::from_values(features.to_vec()));
            Ok(DiseaseLabel(self.label))
        }

        fn n_features(&self) -> usize {
            FEATURE_COUNT
        }
    }

    fn write_tables(dir: &std::path::Path) {
        fs::write(
            dir.join(ReferenceKind::Description.file_name()),
            "Disease,Description\n\
             Fungal infection,Fungal infection is a common skin condition caused by fungi.\n\
             Acne,Acne occurs when hair follicles become clogged.\n",
        )
        .unwrap();
        fs::write(
            dir.join(ReferenceKind::Precautions.file_name()),
            ",Disease,Precaution_1,Precaution_2,Precaution_3,Precaution_4\n\
             0,Fungal infection,bath twice,use detol or neem in bathing water,keep infected area dry,use clean cloths\n\
             1,Acne,bath twice,avoid fatty spicy food,drink plenty of water,avoid too many products\n",
        )
        .unwrap();
        fs::write(
            dir.join(ReferenceKind::Medications.file_name()),
            "Disease,Medication\n\
             Fungal infection,\"['Antifungal Cream', 'Fluconazole', 'Terbinafine']\"\n",
        )
        .unwrap();
        fs::write(
            dir.join(ReferenceKind::Diet.file_name()),
            "Disease,Diet\n\
             Fungal infection,\"['Antifungal Diet', 'Probiotics']\"\n\
             Acne,\"['Low-Glycemic Diet', 'Omega-3 Fatty Acids']\"\n",
        )
        .unwrap();
        fs::write(
            dir.join(ReferenceKind::Workout.file_name()),
            "Unnamed: 0,disease,workout\n\
             0,Fungal infection,Avoid sugary foods\n\
             1,Fungal infection,Consume probiotics\n\
             2,Acne,Avoid oily foods\n",
        )
        .unwrap();
    }

    fn test_cfg(dir: &std::path::Path) -> CoreConfig {
        CoreConfig::new(dir.to_path_buf(), None).expect("CoreConfig::new should succeed")
    }

    fn service_with_stub(dir: &std::path::Path, model: Arc<StubModel>) -> DiagnosisService {
        let knowledge = KnowledgeBase::load(&test_cfg(dir)).expect("knowledge base should load");
        DiagnosisService::new(knowledge, ClassifierAdapter::new(model))
    }

    #[test]
    fn test_request_rejects_empty_selection() {
        let err = AnalysisRequest::new(Vec::<String>::new()).expect_err("should reject");
        assert!(matches!(err, DiagnosisError::EmptySelection));

        let err = AnalysisRequest::new(["  ", ""]).expect_err("blank names should not count");
        assert!(matches!(err, DiagnosisError::EmptySelection));
    }

    #[test]
    fn test_request_trims_and_deduplicates() {
        let request = AnalysisRequest::new([" itching", "skin_rash", "itching "]).unwrap();
        assert_eq!(request.symptoms(), ["itching", "skin_rash"]);
    }

    #[test]
    fn test_analyse_fungal_infection_end_to_end() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        write_tables(temp.path());
        let model = StubModel::new(15);
        let service = service_with_stub(temp.path(), model.clone());

        let request =
            AnalysisRequest::new(["itching", "skin_rash", "nodal_skin_eruptions"]).unwrap();
        let diagnosis = service.analyse(&request).expect("analysis should succeed");

        let seen = model.seen.lock().unwrap().clone().expect("model should be called");
        assert_eq!(seen.len(), FEATURE_COUNT);
        assert_eq!(seen.active_positions().collect::<Vec<_>>(), vec![0, 1, 2]);

        assert_eq!(diagnosis.label, DiseaseLabel(15));
        let report = diagnosis.report;
        assert_eq!(report.disease_name, "Fungal infection");
        assert_eq!(
            report.description,
            "Fungal infection is a common skin condition caused by fungi."
        );
        assert_eq!(
            report.precautions,
            vec![
                "bath twice",
                "use detol or neem in bathing water",
                "keep infected area dry",
                "use clean cloths"
            ]
        );
        assert_eq!(
            report.medications,
            vec!["Antifungal Cream", "Fluconazole", "Terbinafine"]
        );
        assert_eq!(report.diet, vec!["Antifungal Diet", "Probiotics"]);
        assert_eq!(report.workout, vec!["Avoid sugary foods", "Consume probiotics"]);
    }

    #[test]
    fn test_analyse_missing_medications_for_acne() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        write_tables(temp.path());
        let service = service_with_stub(temp.path(), StubModel::new(2));

        let request = AnalysisRequest::new(["pus_filled_pimples", "blackheads"]).unwrap();
        let report = service.analyse(&request).expect("analysis should succeed").report;

        assert_eq!(report.disease_name, "Acne");
        assert_eq!(report.medications, vec![NO_RECOMMENDATIONS.to_string()]);
        assert_eq!(
            report.description,
            "Acne occurs when hair follicles become clogged."
        );
    }

    #[test]
    fn test_analyse_unknown_label_fails() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        write_tables(temp.path());
        let service = service_with_stub(temp.path(), StubModel::new(999));

        let request = AnalysisRequest::new(["itching"]).unwrap();
        let err = service.analyse(&request).expect_err("unknown label should fail");
        assert!(matches!(err, DiagnosisError::UnknownLabel(DiseaseLabel(999))));
    }

    #[test]
    fn test_analyse_unknown_symptom_never_reaches_classifier() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        write_tables(temp.path());
        let model = StubModel::new(15);
        let service = service_with_stub(temp.path(), model.clone());

        let request = AnalysisRequest::new(["itching", "glowing_skin"]).unwrap();
        let err = service.analyse(&request).expect_err("unknown symptom should fail");

        assert!(matches!(err, DiagnosisError::UnknownSymptom(name) if name == "glowing_skin"));
        assert!(model.seen.lock().unwrap().is_none());
    }

    #[test]
    fn test_service_is_shareable_across_threads() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        write_tables(temp.path());
        let service = service_with_stub(temp.path(), StubModel::new(15));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let service = service.clone();
                std::thread::spawn(move || {
                    let request = AnalysisRequest::new(["itching"]).unwrap();
                    service.analyse(&request).unwrap().report
                })
            })
            .collect();

        let reports: Vec<Report> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(reports.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_load_reads_model_from_data_dir() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        write_tables(temp.path());

        // one-vs-rest over two classes keyed on `itching` (position 0)
        let mut itching = vec![0.0; FEATURE_COUNT];
        itching[0] = 1.0;
        let model = serde_json::json!({
            "n_features": FEATURE_COUNT,
            "classes": [2, 15],
            "coef": [vec![0.0; FEATURE_COUNT], itching],
            "intercept": [0.5, 0.0],
            "strategy": "ovr",
        });
        fs::write(temp.path().join(MODEL_FILENAME), model.to_string()).unwrap();

        let service = DiagnosisService::load(&test_cfg(temp.path())).expect("service should load");

        let fungal = service
            .analyse(&AnalysisRequest::new(["itching"]).unwrap())
            .unwrap();
        assert_eq!(fungal.report.disease_name, "Fungal infection");

        let acne = service
            .analyse(&AnalysisRequest::new(["blackheads"]).unwrap())
            .unwrap();
        assert_eq!(acne.report.disease_name, "Acne");
    }

    #[test]
    fn test_load_rejects_model_with_wrong_width() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        write_tables(temp.path());
        fs::write(
            temp.path().join(MODEL_FILENAME),
            r#"{"n_features": 3, "classes": [0, 1], "coef": [[1.0, 0.0, 0.0]], "intercept": [0.0]}"#,
        )
        .unwrap();

        let err = DiagnosisService::load(&test_cfg(temp.path())).expect_err("should reject");
        assert!(matches!(err, DiagnosisError::ModelLoad(msg) if msg.contains("expects 3")));
    }

    #[test]
    fn test_load_fails_when_table_missing() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        write_tables(temp.path());
        fs::remove_file(temp.path().join(ReferenceKind::Diet.file_name())).unwrap();

        let err = KnowledgeBase::load(&test_cfg(temp.path())).expect_err("should fail");
        assert!(matches!(err, DiagnosisError::DataLoad { .. }));
    }

    #[test]
    fn test_load_uses_builtin_groups() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        write_tables(temp.path());

        let knowledge = KnowledgeBase::load(&test_cfg(temp.path())).expect("should load");
        assert_eq!(knowledge.groups.len(), 4);
    }

    #[test]
    fn test_load_rejects_groups_outside_vocabulary() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        write_tables(temp.path());
        let groups_path = temp.path().join("groups.yaml");
        fs::write(&groups_path, "- name: General\n  symptoms: [fever]\n").unwrap();

        let cfg = test_cfg(temp.path()).with_groups_file(Some(groups_path));
        let err = KnowledgeBase::load(&cfg).expect_err("should reject unknown member");
        assert!(matches!(err, DiagnosisError::InvalidData(msg) if msg.contains("fever")));
    }

    #[test]
    fn test_padded_catalog_name_matches_padded_table_rows() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        write_tables(temp.path());
        let precautions = temp.path().join(ReferenceKind::Precautions.file_name());
        let mut csv = fs::read_to_string(&precautions).unwrap();
        csv.push_str("2,Diabetes ,have balanced diet,exercise,consult doctor,follow up\n");
        fs::write(&precautions, csv).unwrap();
        let diseases_path = temp.path().join("diseases.yaml");
        fs::write(&diseases_path, "12: 'Diabetes '\n").unwrap();

        let cfg = test_cfg(temp.path()).with_diseases_file(Some(diseases_path));
        let knowledge = KnowledgeBase::load(&cfg).expect("should load");
        let service = DiagnosisService::new(knowledge, ClassifierAdapter::new(StubModel::new(12)));

        let diagnosis = service
            .analyse(&AnalysisRequest::new(["polyuria"]).unwrap())
            .unwrap();
        assert_eq!(diagnosis.report.disease_name, "Diabetes ");
        assert_eq!(
            diagnosis.report.precautions,
            vec!["have balanced diet", "exercise", "consult doctor", "follow up"]
        );
    }
}
