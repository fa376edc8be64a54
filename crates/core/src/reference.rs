//! Reference tables.
//!
//! Five read-only CSV tables keyed by disease name: descriptions, precautions, medications,
//! diet and workout. Recommendation cells are free text, often a stringified list such as
//! `['Omeprazole', 'Antacids']`, so every cell goes through [`clean_recommendation`] and is split
//! on commas before it reaches a report.
//!
//! Table files are read once at startup. Ragged rows are kept at load time and reported by the
//! lookup that touches them, so one broken row only affects the table it lives in.

use crate::catalog::DiseaseName;
use crate::constants::{
    DESCRIPTION_COLUMN, DESCRIPTION_FILENAME, DESCRIPTION_UNAVAILABLE, DIET_FILENAME,
    DISEASE_COLUMN, MEDICATIONS_FILENAME, MISSING_VALUE_TOKENS, NO_DESCRIPTION,
    NO_RECOMMENDATIONS, PRECAUTIONS_FILENAME, RECOMMENDATIONS_UNAVAILABLE, WORKOUT_FILENAME,
};
use crate::{DiagnosisError, DiagnosisResult};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Which reference table a value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    Description,
    Precautions,
    Medications,
    Diet,
    Workout,
}

impl ReferenceKind {
    pub const ALL: [ReferenceKind; 5] = [
        ReferenceKind::Description,
        ReferenceKind::Precautions,
        ReferenceKind::Medications,
        ReferenceKind::Diet,
        ReferenceKind::Workout,
    ];

    /// File name of the table inside the data directory.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Description => DESCRIPTION_FILENAME,
            Self::Precautions => PRECAUTIONS_FILENAME,
            Self::Medications => MEDICATIONS_FILENAME,
            Self::Diet => DIET_FILENAME,
            Self::Workout => WORKOUT_FILENAME,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Description => "description",
            Self::Precautions => "precautions",
            Self::Medications => "medications",
            Self::Diet => "diet",
            Self::Workout => "workout",
        }
    }
}

impl std::fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalise one recommendation cell.
///
/// - removes `[`, `]`, `'`, `"` and `\`
/// - strips leading and trailing commas and whitespace
/// - collapses runs of two or more commas into one
///
/// The transform is idempotent.
pub fn clean_recommendation(item: &str) -> String {
    let stripped: String = item
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | '\'' | '"' | '\\'))
        .collect();
    let trimmed = stripped.trim_matches(|c: char| c == ',' || c.is_whitespace());

    let mut out = String::with_capacity(trimmed.len());
    let mut previous_comma = false;
    for ch in trimmed.chars() {
        if ch == ',' {
            if previous_comma {
                continue;
            }
            previous_comma = true;
        } else {
            previous_comma = false;
        }
        out.push(ch);
    }
    out
}

/// Clean a cell and split it into individual recommendations.
pub fn split_recommendation(item: &str) -> Vec<String> {
    clean_recommendation(item)
        .split(',')
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Outcome of one recommendation lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recommendations {
    /// At least one recommendation was found.
    Found(Vec<String>),
    /// The table holds no data for the disease.
    Empty,
    /// The lookup failed; the table is malformed.
    Unavailable,
}

impl Recommendations {
    /// Flatten into the list shown in a report, substituting placeholders.
    pub fn into_list(self) -> Vec<String> {
        match self {
            Self::Found(items) => items,
            Self::Empty => vec![NO_RECOMMENDATIONS.to_string()],
            Self::Unavailable => vec![RECOMMENDATIONS_UNAVAILABLE.to_string()],
        }
    }
}

fn is_missing(cell: &str) -> bool {
    let cell = cell.trim();
    cell.is_empty() || MISSING_VALUE_TOKENS.contains(&cell)
}

fn is_index_column(header: &str) -> bool {
    let header = header.trim();
    header.is_empty() || header.starts_with("Unnamed:")
}

/// One reference table held in memory.
#[derive(Debug, Clone)]
pub struct ReferenceTable {
    kind: ReferenceKind,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ReferenceTable {
    /// Read a table from a CSV file. The file is closed before this returns.
    ///
    /// # Errors
    ///
    /// Returns `DiagnosisError::DataLoad` if the file cannot be opened and
    /// `DiagnosisError::TableParse` if it is not valid CSV.
    pub fn from_path(kind: ReferenceKind, path: &Path) -> DiagnosisResult<Self> {
        let file = File::open(path).map_err(|source| DiagnosisError::DataLoad {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_reader(kind, file)?;

        tracing::info!(
            "Loaded {} table from {:?} ({} rows)",
            kind,
            path,
            table.rows.len()
        );

        Ok(table)
    }

    /// Read a table from any CSV source with a header row.
    ///
    /// # Errors
    ///
    /// Returns `DiagnosisError::TableParse` if the input is not valid CSV.
    pub fn from_reader<R: Read>(kind: ReferenceKind, reader: R) -> DiagnosisResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()
            .map_err(|source| DiagnosisError::TableParse {
                table: kind,
                source,
            })?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows: Vec<Vec<String>> = Vec::new();
        for record in csv_reader.records() {
            let record = record.map_err(|source| DiagnosisError::TableParse {
                table: kind,
                source,
            })?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self {
            kind,
            headers,
            rows,
        })
    }

    pub fn kind(&self) -> ReferenceKind {
        self.kind
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn lookup_error(&self, reason: impl Into<String>) -> DiagnosisError {
        DiagnosisError::ReferenceLookup {
            table: self.kind,
            reason: reason.into(),
        }
    }

    fn column(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|header| header.trim().eq_ignore_ascii_case(name))
    }

    fn key_column(&self) -> DiagnosisResult<usize> {
        self.column(DISEASE_COLUMN)
            .ok_or_else(|| self.lookup_error(format!("no {DISEASE_COLUMN} column")))
    }

    /// Rows whose cell in column `key` equals `disease` exactly, in table order.
    fn matching_rows(&self, key: usize, disease: &DiseaseName) -> DiagnosisResult<Vec<&[String]>> {
        let mut matched = Vec::new();
        for (line, row) in self.rows.iter().enumerate() {
            if row.get(key).map(String::as_str) != Some(disease.as_str()) {
                continue;
            }
            if row.len() != self.headers.len() {
                return Err(self.lookup_error(format!(
                    "row {} has {} cells, header has {}",
                    line + 1,
                    row.len(),
                    self.headers.len()
                )));
            }
            matched.push(row.as_slice());
        }
        Ok(matched)
    }

    /// Cleaned recommendations for `disease`.
    ///
    /// Every value cell of every matching row is cleaned and split, in row then column order.
    /// The key column and pandas index columns are skipped, as are missing cells.
    ///
    /// # Errors
    ///
    /// Returns `DiagnosisError::ReferenceLookup` if the table has no key column or a matching
    /// row has the wrong number of cells.
    pub fn try_recommendations(&self, disease: &DiseaseName) -> DiagnosisResult<Vec<String>> {
        let key = self.key_column()?;

        let mut items = Vec::new();
        for row in self.matching_rows(key, disease)? {
            for (column, cell) in row.iter().enumerate() {
                if column == key || is_index_column(&self.headers[column]) || is_missing(cell) {
                    continue;
                }
                items.extend(split_recommendation(cell));
            }
        }
        Ok(items)
    }

    /// Recommendations for `disease`, with failures recovered locally.
    pub fn recommendations(&self, disease: &DiseaseName) -> Recommendations {
        match self.try_recommendations(disease) {
            Ok(items) if items.is_empty() => Recommendations::Empty,
            Ok(items) => Recommendations::Found(items),
            Err(e) => {
                tracing::warn!("{} lookup for '{}' recovered: {}", self.kind, disease, e);
                Recommendations::Unavailable
            }
        }
    }

    /// Description of `disease` from the first matching row, if any.
    ///
    /// # Errors
    ///
    /// Returns `DiagnosisError::ReferenceLookup` if the table has no key or description column,
    /// or a matching row has the wrong number of cells.
    pub fn try_description(&self, disease: &DiseaseName) -> DiagnosisResult<Option<String>> {
        let column = self
            .column(DESCRIPTION_COLUMN)
            .ok_or_else(|| self.lookup_error(format!("no {DESCRIPTION_COLUMN} column")))?;

        let key = self.key_column()?;

        Ok(self
            .matching_rows(key, disease)?
            .first()
            .map(|row| row[column].as_str())
            .filter(|cell| !is_missing(cell))
            .map(|cell| cell.trim().to_string()))
    }

    /// Description of `disease`, or a placeholder.
    pub fn description(&self, disease: &DiseaseName) -> String {
        match self.try_description(disease) {
            Ok(Some(description)) => description,
            Ok(None) => NO_DESCRIPTION.to_string(),
            Err(e) => {
                tracing::warn!("{} lookup for '{}' recovered: {}", self.kind, disease, e);
                DESCRIPTION_UNAVAILABLE.to_string()
            }
        }
    }
}

/// The five reference tables, loaded together.
#[derive(Debug, Clone)]
pub struct ReferenceTables {
    pub description: ReferenceTable,
    pub precautions: ReferenceTable,
    pub medications: ReferenceTable,
    pub diet: ReferenceTable,
    pub workout: ReferenceTable,
}

impl ReferenceTables {
    /// Load every table from `data_dir` using the standard file names.
    ///
    /// # Errors
    ///
    /// Returns the first load error; a missing table aborts startup.
    pub fn load(data_dir: &Path) -> DiagnosisResult<Self> {
        let load =
            |kind: ReferenceKind| ReferenceTable::from_path(kind, &data_dir.join(kind.file_name()));

        Ok(Self {
            description: load(ReferenceKind::Description)?,
            precautions: load(ReferenceKind::Precautions)?,
            medications: load(ReferenceKind::Medications)?,
            diet: load(ReferenceKind::Diet)?,
            workout: load(ReferenceKind::Workout)?,
        })
    }

    pub fn get(&self, kind: ReferenceKind) -> &ReferenceTable {
        match kind {
            ReferenceKind::Description => &self.description,
            ReferenceKind::Precautions => &self.precautions,
            ReferenceKind::Medications => &self.medications,
            ReferenceKind::Diet => &self.diet,
            ReferenceKind::Workout => &self.workout,
        }
    }
}
