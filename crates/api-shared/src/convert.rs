//! Conversions from core types to wire types.

use crate::pb;
use medrec_core::{
    display_name, Diagnosis, DiseaseCatalog, Report, SymptomGroups, SymptomVocabulary,
    SAFETY_NOTICE,
};

impl From<Report> for pb::Report {
    fn from(report: Report) -> Self {
        Self {
            disease_name: report.disease_name,
            description: report.description,
            precautions: report.precautions,
            medications: report.medications,
            diet: report.diet,
            workout: report.workout,
        }
    }
}

/// Wrap a diagnosis in the analyse response, tagging it with the caller's request id.
pub fn analyse_res(request_id: String, diagnosis: Diagnosis) -> pb::AnalyseRes {
    pb::AnalyseRes {
        request_id,
        label: diagnosis.label.0,
        report: Some(diagnosis.report.into()),
        safety_notice: SAFETY_NOTICE.to_string(),
    }
}

pub fn list_symptoms_res(
    vocabulary: &SymptomVocabulary,
    groups: &SymptomGroups,
) -> pb::ListSymptomsRes {
    pb::ListSymptomsRes {
        symptoms: vocabulary
            .iter()
            .map(|(position, name)| pb::Symptom {
                position: position as u32,
                name: name.to_string(),
                display_name: display_name(name),
            })
            .collect(),
        groups: groups
            .iter()
            .map(|group| pb::SymptomGroup {
                name: group.name().to_string(),
                symptoms: group.symptoms().to_vec(),
            })
            .collect(),
    }
}

pub fn list_diseases_res(catalog: &DiseaseCatalog) -> pb::ListDiseasesRes {
    pb::ListDiseasesRes {
        diseases: catalog
            .iter()
            .map(|(label, name)| pb::Disease {
                label: label.0,
                name: name.to_string(),
            })
            .collect(),
    }
}
