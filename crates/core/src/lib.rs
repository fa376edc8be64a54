//! # Medrec Core
//!
//! Core logic for the medicine recommendation system:
//! - Symptom vocabulary, browsing groups and feature encoding
//! - Classifier adapter around the exported model
//! - Disease catalog
//! - Reference-table lookups and report assembly
//!
//! **No API concerns**: HTTP/gRPC servers, authentication and command-line handling belong in
//! `api-rest`, `api-grpc`, `api-shared` and `medrec-cli`.

pub mod catalog;
pub mod classifier;
pub mod config;
pub mod constants;
pub mod diagnosis;
pub mod encoder;
pub mod error;
pub mod groups;
pub mod reference;
pub mod report;
pub mod vocabulary;

pub use catalog::{DiseaseCatalog, DiseaseLabel, DiseaseName};
pub use classifier::{ClassifierAdapter, DiseaseModel, LinearSvmModel, ModelError};
pub use config::{resolve_data_dir, CoreConfig};
pub use constants::{DEFAULT_DATA_DIR, FEATURE_COUNT, SAFETY_NOTICE};
pub use diagnosis::{AnalysisRequest, Diagnosis, DiagnosisService, KnowledgeBase};
pub use encoder::{decode, encode, FeatureVector};
pub use error::{DiagnosisError, DiagnosisResult};
pub use groups::{SymptomGroup, SymptomGroups};
pub use reference::{clean_recommendation, Recommendations, ReferenceKind, ReferenceTables};
pub use report::Report;
pub use vocabulary::{display_name, SymptomVocabulary};

pub use medrec_types::{NonEmptyText, TextError};
