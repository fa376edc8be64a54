// Re-export the proto module from the shared `api-shared` crate so callers
// can reference `api_grpc::pb`.
pub use api_shared::pb;

use api_shared::auth::ApiKey;
use api_shared::{convert, HealthService};
use medrec_core::{AnalysisRequest, DiagnosisError, DiagnosisService};
use tonic::{Request, Response, Status};

use api_shared::pb::{
    medrec_server::Medrec, AnalyseReq, AnalyseRes, HealthRes, ListDiseasesRes, ListSymptomsRes,
};

/// Build the authentication interceptor for gRPC requests
///
/// Every call must carry an `x-api-key` metadata entry matching `key`.
pub fn auth_interceptor(
    key: ApiKey,
) -> impl Fn(Request<()>) -> Result<Request<()>, Status> + Clone + Send + Sync + 'static {
    move |req: Request<()>| {
        key.validate_metadata(req.metadata())?;
        Ok(req)
    }
}

/// Map a core error to a gRPC status carrying only the user-facing message.
pub fn status_for(err: &DiagnosisError) -> Status {
    if err.is_client_error() {
        tracing::warn!("Rejected analysis request: {}", err);
        Status::invalid_argument(err.user_message())
    } else {
        tracing::error!("Analysis failed: {:?}", err);
        Status::internal(err.user_message())
    }
}

#[derive(Clone, Debug)]
pub struct MedrecService {
    service: DiagnosisService,
}

impl MedrecService {
    pub fn new(service: DiagnosisService) -> Self {
        Self { service }
    }
}

#[tonic::async_trait]
impl Medrec for MedrecService {
    async fn health(&self, _req: Request<()>) -> Result<Response<HealthRes>, Status> {
        Ok(Response::new(HealthService::check_health()))
    }

    async fn list_symptoms(
        &self,
        _req: Request<()>,
    ) -> Result<Response<ListSymptomsRes>, Status> {
        Ok(Response::new(convert::list_symptoms_res(
            self.service.vocabulary(),
            self.service.groups(),
        )))
    }

    async fn list_diseases(
        &self,
        _req: Request<()>,
    ) -> Result<Response<ListDiseasesRes>, Status> {
        Ok(Response::new(convert::list_diseases_res(
            self.service.catalog(),
        )))
    }

    async fn analyse(&self, req: Request<AnalyseReq>) -> Result<Response<AnalyseRes>, Status> {
        let request_id = uuid::Uuid::new_v4().simple().to_string();
        tracing::info!("gRPC analyse request {}", request_id);

        let req = req.into_inner();
        let request = AnalysisRequest::new(req.symptoms).map_err(|e| status_for(&e))?;
        let diagnosis = self
            .service
            .analyse(&request)
            .map_err(|e| status_for(&e))?;

        Ok(Response::new(convert::analyse_res(request_id, diagnosis)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_shared::auth::API_KEY_HEADER;
    use medrec_core::reference::{ReferenceTable, ReferenceTables};
    use medrec_core::{
        ClassifierAdapter, DiseaseCatalog, DiseaseLabel, DiseaseModel, KnowledgeBase, ModelError,
        ReferenceKind, SymptomGroups, SymptomVocabulary, FEATURE_COUNT, SAFETY_NOTICE,
    };
    use std::sync::Arc;

    struct FixedLabel(u32);

    impl DiseaseModel for FixedLabel {
        fn predict(&self, _features: &[u8]) -> Result<DiseaseLabel, ModelError> {
            Ok(DiseaseLabel(self.0))
        }

        fn n_features(&self) -> usize {
            FEATURE_COUNT
        }
    }

    fn table(kind: ReferenceKind, csv: &str) -> ReferenceTable {
        ReferenceTable::from_reader(kind, csv.as_bytes()).expect("fixture table should parse")
    }

    fn service(label: u32) -> MedrecService {
        let vocabulary = SymptomVocabulary::builtin().unwrap();
        let knowledge = KnowledgeBase {
            groups: SymptomGroups::builtin(&vocabulary).unwrap(),
            vocabulary,
            catalog: DiseaseCatalog::builtin().unwrap(),
            tables: ReferenceTables {
                description: table(
                    ReferenceKind::Description,
                    "Disease,Description\nAcne,Acne occurs when hair follicles become clogged.\n",
                ),
                precautions: table(
                    ReferenceKind::Precautions,
                    "Disease,Precaution_1\nAcne,bath twice\n",
                ),
                medications: table(ReferenceKind::Medications, "Disease,Medication\n"),
                diet: table(ReferenceKind::Diet, "Disease,Diet\nAcne,\"['Low-Glycemic Diet']\"\n"),
                workout: table(ReferenceKind::Workout, "disease,workout\nAcne,Avoid oily foods\n"),
            },
        };
        MedrecService::new(DiagnosisService::new(
            knowledge,
            ClassifierAdapter::new(Arc::new(FixedLabel(label))),
        ))
    }

    fn analyse_req(symptoms: &[&str]) -> Request<AnalyseReq> {
        Request::new(AnalyseReq {
            symptoms: symptoms.iter().map(|s| s.to_string()).collect(),
        })
    }

    #[tokio::test]
    async fn test_analyse_returns_report_and_notice() {
        let res = service(2)
            .analyse(analyse_req(&["skin_rash", "pus_filled_pimples", "blackheads"]))
            .await
            .expect("analyse should succeed")
            .into_inner();

        let report = res.report.expect("report should be present");
        assert_eq!(res.label, 2);
        assert_eq!(report.disease_name, "Acne");
        assert_eq!(report.medications, vec!["No recommendations available"]);
        assert_eq!(report.diet, vec!["Low-Glycemic Diet"]);
        assert_eq!(res.safety_notice, SAFETY_NOTICE);
        assert!(!res.request_id.is_empty());
    }

    #[tokio::test]
    async fn test_analyse_unknown_symptom_is_invalid_argument() {
        let status = service(2)
            .analyse(analyse_req(&["glowing"]))
            .await
            .expect_err("unknown symptom should fail");

        assert_eq!(status.code(), tonic::Code::InvalidArgument);
        assert_eq!(status.message(), "Unknown symptom: glowing");
    }

    #[tokio::test]
    async fn test_analyse_empty_selection_is_invalid_argument() {
        let status = service(2)
            .analyse(analyse_req(&[]))
            .await
            .expect_err("empty selection should fail");

        assert_eq!(status.code(), tonic::Code::InvalidArgument);
    }

    #[tokio::test]
    async fn test_analyse_unknown_label_is_internal() {
        let status = service(999)
            .analyse(analyse_req(&["itching"]))
            .await
            .expect_err("unknown label should fail");

        assert_eq!(status.code(), tonic::Code::Internal);
        assert!(!status.message().contains("999"));
    }

    #[tokio::test]
    async fn test_list_symptoms_and_diseases() {
        let svc = service(2);
        let symptoms = svc
            .list_symptoms(Request::new(()))
            .await
            .unwrap()
            .into_inner();
        let diseases = svc
            .list_diseases(Request::new(()))
            .await
            .unwrap()
            .into_inner();

        assert_eq!(symptoms.symptoms.len(), 132);
        assert_eq!(symptoms.groups.len(), 4);
        assert_eq!(symptoms.groups[1].name, "Pain");
        assert_eq!(diseases.diseases.len(), 41);
    }

    #[test]
    fn test_auth_interceptor() {
        let interceptor = auth_interceptor(ApiKey::new("secret").unwrap());

        let missing = interceptor(Request::new(())).expect_err("missing key should fail");
        assert_eq!(missing.code(), tonic::Code::Unauthenticated);

        let mut wrong = Request::new(());
        wrong
            .metadata_mut()
            .insert(API_KEY_HEADER, "guess".parse().unwrap());
        assert!(interceptor(wrong).is_err());

        let mut good = Request::new(());
        good.metadata_mut()
            .insert(API_KEY_HEADER, "secret".parse().unwrap());
        assert!(interceptor(good).is_ok());
    }
}
