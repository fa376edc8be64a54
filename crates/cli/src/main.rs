use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use medrec_core::{
    clean_recommendation, display_name, encode, resolve_data_dir, AnalysisRequest, CoreConfig,
    Diagnosis, DiagnosisError, DiagnosisResult, DiagnosisService, DiseaseCatalog, Report,
    SymptomGroups, SymptomVocabulary, SAFETY_NOTICE,
};

#[derive(Parser)]
#[command(name = "medrec")]
#[command(about = "Symptom-based disease prediction and recommendation CLI")]
struct Cli {
    /// Directory holding the reference tables and model.json
    #[arg(long, global = true, env = "MEDREC_DATA_DIR")]
    data_dir: Option<PathBuf>,
    /// Path to the exported model (default: <data-dir>/model.json)
    #[arg(long, global = true, env = "MEDREC_MODEL_PATH")]
    model: Option<PathBuf>,
    /// YAML list replacing the built-in symptom vocabulary
    #[arg(long, global = true, env = "MEDREC_SYMPTOMS_FILE")]
    symptoms_file: Option<PathBuf>,
    /// YAML map replacing the built-in disease catalog
    #[arg(long, global = true, env = "MEDREC_DISEASES_FILE")]
    diseases_file: Option<PathBuf>,
    /// YAML list replacing the built-in symptom groups
    #[arg(long, global = true, env = "MEDREC_GROUPS_FILE")]
    groups_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List recognised symptoms with their feature positions, then the symptom groups
    Symptoms,
    /// List the diseases the classifier can predict
    Diseases,
    /// Print the feature positions set for the given symptoms
    Encode {
        /// Symptom names, e.g. itching skin_rash
        #[arg(required = true)]
        symptoms: Vec<String>,
    },
    /// Run the recommendation cleaning transform on raw table text
    Clean {
        /// Raw cell text, e.g. "['Antibiotics', 'Topical treatments']"
        text: String,
    },
    /// Predict a disease from symptoms and print its report
    Analyse {
        /// Symptom names, e.g. itching skin_rash nodal_skin_eruptions
        symptoms: Vec<String>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

/// JSON shape printed by `analyse --json`.
#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyseOutput<'a> {
    label: u32,
    report: &'a Report,
    safety_notice: &'static str,
}

impl Cli {
    fn vocabulary(&self) -> DiagnosisResult<SymptomVocabulary> {
        match &self.symptoms_file {
            Some(path) => SymptomVocabulary::from_yaml_file(path),
            None => SymptomVocabulary::builtin(),
        }
    }

    fn groups(&self, vocabulary: &SymptomVocabulary) -> DiagnosisResult<SymptomGroups> {
        match &self.groups_file {
            Some(path) => SymptomGroups::from_yaml_file(path, vocabulary),
            None => SymptomGroups::builtin(vocabulary),
        }
    }

    fn catalog(&self) -> DiagnosisResult<DiseaseCatalog> {
        match &self.diseases_file {
            Some(path) => DiseaseCatalog::from_yaml_file(path),
            None => DiseaseCatalog::builtin(),
        }
    }

    fn core_config(&self) -> DiagnosisResult<CoreConfig> {
        let data_dir = resolve_data_dir(self.data_dir.clone())?;
        Ok(CoreConfig::new(data_dir, self.model.clone())?
            .with_symptoms_file(self.symptoms_file.clone())
            .with_diseases_file(self.diseases_file.clone())
            .with_groups_file(self.groups_file.clone()))
    }
}

fn render_list(title: &str, items: &[String]) -> String {
    let mut out = format!("{title}:\n");
    for (i, item) in items.iter().enumerate() {
        out.push_str(&format!("  {}. {}\n", i + 1, item));
    }
    out
}

fn render_groups(groups: &SymptomGroups) -> String {
    let mut out = String::new();
    for group in groups.iter() {
        let members: Vec<String> = group.symptoms().iter().map(|s| display_name(s)).collect();
        out.push_str(&format!("{}: {}\n", group.name(), members.join(", ")));
    }
    out
}

/// Plain-text report, sections in the same order as the web front-end.
fn render_report(diagnosis: &Diagnosis) -> String {
    let report = &diagnosis.report;
    let mut out = format!("Predicted disease: {}\n\n", report.disease_name);
    out.push_str(&format!("Description:\n  {}\n\n", report.description));
    out.push_str(&render_list("Precautions", &report.precautions));
    out.push('\n');
    out.push_str(&render_list("Medications", &report.medications));
    out.push('\n');
    out.push_str(&render_list("Diet", &report.diet));
    out.push('\n');
    out.push_str(&render_list("Workout", &report.workout));
    out.push('\n');
    out.push_str(SAFETY_NOTICE);
    out.push('\n');
    out
}

fn run(cli: Cli) -> DiagnosisResult<()> {
    match &cli.command {
        Some(Commands::Symptoms) => {
            let vocabulary = cli.vocabulary()?;
            let groups = cli.groups(&vocabulary)?;
            for (position, name) in vocabulary.iter() {
                println!("{:>3}  {:<32} {}", position, name, display_name(name));
            }
            println!();
            print!("{}", render_groups(&groups));
        }
        Some(Commands::Diseases) => {
            for (label, name) in cli.catalog()?.iter() {
                println!("{:>3}  {}", label.0, name);
            }
        }
        Some(Commands::Encode { symptoms }) => {
            let vocabulary = cli.vocabulary()?;
            let features = encode(symptoms, &vocabulary)?;
            let positions: Vec<String> = features
                .active_positions()
                .map(|p| p.to_string())
                .collect();
            println!("{}", positions.join(" "));
        }
        Some(Commands::Clean { text }) => {
            println!("{}", clean_recommendation(text));
        }
        Some(Commands::Analyse { symptoms, json }) => {
            let request = AnalysisRequest::new(symptoms)?;
            let service = DiagnosisService::load(&cli.core_config()?)?;
            let diagnosis = service.analyse(&request)?;

            if *json {
                let output = AnalyseOutput {
                    label: diagnosis.label.0,
                    report: &diagnosis.report,
                    safety_notice: SAFETY_NOTICE,
                };
                let rendered = serde_json::to_string_pretty(&output)
                    .map_err(|e| DiagnosisError::InvalidData(e.to_string()))?;
                println!("{rendered}");
            } else {
                print!("{}", render_report(&diagnosis));
            }
        }
        None => {
            println!("Use 'medrec --help' for commands");
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Logs go to stderr so command output stays pipeable.
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!("Command failed: {:?}", e);
            eprintln!("Error: {}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use medrec_core::DiseaseLabel;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_analyse_with_global_options() {
        let cli = Cli::try_parse_from([
            "medrec",
            "analyse",
            "itching",
            "skin_rash",
            "--json",
            "--data-dir",
            "/srv/medrec",
        ])
        .unwrap();

        assert_eq!(cli.data_dir, Some(PathBuf::from("/srv/medrec")));
        match cli.command {
            Some(Commands::Analyse { symptoms, json }) => {
                assert_eq!(symptoms, vec!["itching", "skin_rash"]);
                assert!(json);
            }
            _ => panic!("expected analyse command"),
        }
    }

    #[test]
    fn test_render_report_lists_sections_and_notice() {
        let diagnosis = Diagnosis {
            label: DiseaseLabel(2),
            report: Report {
                disease_name: "Acne".into(),
                description: "Acne occurs when hair follicles become clogged.".into(),
                precautions: vec!["bath twice".into(), "avoid fatty spicy food".into()],
                medications: vec!["No recommendations available".into()],
                diet: vec!["Low-Glycemic Diet".into()],
                workout: vec!["Avoid oily foods".into()],
            },
        };

        let text = render_report(&diagnosis);

        assert!(text.starts_with("Predicted disease: Acne\n"));
        assert!(text.contains("Precautions:\n  1. bath twice\n  2. avoid fatty spicy food\n"));
        assert!(text.contains("Medications:\n  1. No recommendations available\n"));
        assert!(text.trim_end().ends_with(SAFETY_NOTICE.trim_end()));
    }

    #[test]
    fn test_render_groups_uses_display_names() {
        let vocabulary = SymptomVocabulary::builtin().unwrap();
        let groups = SymptomGroups::builtin(&vocabulary).unwrap();

        let text = render_groups(&groups);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("General: High Fever, Mild Fever"));
        assert_eq!(lines[3], "Skin: Itching, Skin Rash, Red Spots Over Body, Blister");
    }

    #[test]
    fn test_parse_groups_file_option() {
        let cli =
            Cli::try_parse_from(["medrec", "symptoms", "--groups-file", "/tmp/groups.yaml"]).unwrap();
        assert_eq!(cli.groups_file, Some(PathBuf::from("/tmp/groups.yaml")));
    }

    #[test]
    fn test_run_empty_analyse_is_rejected_before_loading() {
        let cli = Cli::try_parse_from(["medrec", "analyse"]).unwrap();
        let err = run(cli).unwrap_err();
        assert!(matches!(err, DiagnosisError::EmptySelection));
    }
}
