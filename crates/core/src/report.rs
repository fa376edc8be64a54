//! Report assembly.

use crate::catalog::DiseaseName;
use crate::reference::ReferenceTables;

/// Everything a front-end needs to present one analysis.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub disease_name: String,
    pub description: String,
    pub precautions: Vec<String>,
    pub medications: Vec<String>,
    pub diet: Vec<String>,
    pub workout: Vec<String>,
}

/// Look `disease` up in every reference table and package the results.
///
/// A failure in one table is replaced by that table's placeholder and does not affect the
/// others.
pub fn assemble(disease: &DiseaseName, tables: &ReferenceTables) -> Report {
    Report {
        disease_name: disease.to_string(),
        description: tables.description.description(disease),
        precautions: tables.precautions.recommendations(disease).into_list(),
        medications: tables.medications.recommendations(disease).into_list(),
        diet: tables.diet.recommendations(disease).into_list(),
        workout: tables.workout.recommendations(disease).into_list(),
    }
}
