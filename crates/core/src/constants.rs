//! Constants used throughout the medrec core crate.
//!
//! File names follow the layout of the exported training data set so an unmodified export can
//! be used as the data directory.

/// Width of the feature vector the classifier was trained on.
pub const FEATURE_COUNT: usize = 132;

/// Default data directory, relative to the working directory.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Filename for the exported classifier artifact.
pub const MODEL_FILENAME: &str = "model.json";

/// Filename for the disease description table.
pub const DESCRIPTION_FILENAME: &str = "description.csv";

/// Filename for the precautions table.
pub const PRECAUTIONS_FILENAME: &str = "precautions_df.csv";

/// Filename for the medications table.
pub const MEDICATIONS_FILENAME: &str = "medications.csv";

/// Filename for the diet table.
pub const DIET_FILENAME: &str = "diets.csv";

/// Filename for the workout table.
pub const WORKOUT_FILENAME: &str = "workout_df.csv";

/// Header of the key column shared by every reference table (matched ignoring ASCII case).
pub const DISEASE_COLUMN: &str = "Disease";

/// Header of the description column in the description table.
pub const DESCRIPTION_COLUMN: &str = "Description";

/// Placeholder list entry when a table has no data for the disease.
pub const NO_RECOMMENDATIONS: &str = "No recommendations available";

/// Placeholder list entry when a table lookup failed.
pub const RECOMMENDATIONS_UNAVAILABLE: &str = "Recommendations not available";

/// Placeholder description when the description table has no row for the disease.
pub const NO_DESCRIPTION: &str = "No description available.";

/// Placeholder description when the description lookup failed.
pub const DESCRIPTION_UNAVAILABLE: &str = "Description not available.";

/// Cell values treated as missing, in addition to empty cells.
pub const MISSING_VALUE_TOKENS: &[&str] = &["NaN", "nan", "NA", "N/A", "null", "None"];

/// Notice shown alongside every report.
pub const SAFETY_NOTICE: &str = "This analysis is not a substitute for professional medical \
advice. Always consult a qualified healthcare provider for diagnosis and treatment. In \
emergencies, call your local emergency number immediately.";
