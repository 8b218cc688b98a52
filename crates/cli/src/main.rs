mod output;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use health_md_core::anonymize::anonymization_report;
use health_md_core::config::reference_from_env_value;
use health_md_core::constants::{
    DEFAULT_DIGEST_MAX_LENGTH, DEFAULT_LAB_WINDOW_DAYS, DEFAULT_TIMELINE_WINDOW_DAYS,
};
use health_md_core::{export, insights, validate, CoreConfig, HealthRecord};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "health-md")]
#[command(about = "Parse and analyze Health.md clinical documents")]
struct Cli {
    /// Path to the Health.md file
    file: PathBuf,
    /// Show the LLM-optimized summary (default when nothing else is selected)
    #[arg(long)]
    summary: bool,
    /// Show current medications
    #[arg(long)]
    medications: bool,
    /// Show recent lab results
    #[arg(long)]
    labs: bool,
    /// Show medical conditions
    #[arg(long)]
    conditions: bool,
    /// Show the clinical timeline
    #[arg(long)]
    timeline: bool,
    /// Show clinical insights
    #[arg(long)]
    insights: bool,
    /// Validate the file structure
    #[arg(long)]
    validate: bool,
    /// Show anonymization status
    #[arg(long)]
    anonymize: bool,
    /// Print the parsed record as JSON
    #[arg(long)]
    json: bool,
    /// Print the parsed record as a FHIR R4 bundle
    #[arg(long)]
    fhir: bool,
    /// Lab result window in days
    #[arg(long, default_value_t = DEFAULT_LAB_WINDOW_DAYS)]
    lab_days: u32,
    /// Clinical timeline window in days
    #[arg(long, default_value_t = DEFAULT_TIMELINE_WINDOW_DAYS)]
    timeline_days: u32,
    /// Maximum summary length in characters
    #[arg(long, default_value_t = DEFAULT_DIGEST_MAX_LENGTH)]
    max_length: usize,
    /// Reference date for relative dates and recency windows (YYYY-MM-DD or RFC 3339)
    #[arg(long, env = "HEALTH_MD_REFERENCE_DATE")]
    reference_date: Option<String>,
}

impl Cli {
    /// True when no view flag was given, in which case the summary is shown.
    fn wants_default_view(&self) -> bool {
        !(self.summary
            || self.medications
            || self.labs
            || self.conditions
            || self.timeline
            || self.insights
            || self.validate
            || self.anonymize
            || self.json
            || self.fhir)
    }

    fn config(&self) -> anyhow::Result<CoreConfig> {
        let reference = reference_from_env_value(self.reference_date.clone())?
            .unwrap_or_else(Utc::now);
        Ok(CoreConfig::new(
            reference,
            self.lab_days,
            self.timeline_days,
            self.max_length,
        )?)
    }
}

fn load_document(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read Health.md file {}", path.display()))
}

fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    let config = cli.config()?;
    let content = load_document(&cli.file)?;
    tracing::debug!("loaded {} ({} bytes)", cli.file.display(), content.len());

    if cli.validate {
        match validate(&content) {
            Ok(report) => println!("{}", output::validation(&report)),
            Err(e) => {
                println!("Validation failed: {e}");
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    let record = HealthRecord::parse(&content, config.reference());

    if cli.summary || cli.wants_default_view() {
        println!("{}", output::summary(&record, config.digest_max_length()));
    }
    if cli.medications {
        println!("{}", output::medications(&record));
    }
    if cli.labs {
        println!("{}", output::labs(&record, config.lab_window_days()));
    }
    if cli.conditions {
        println!("{}", output::conditions(&record));
    }
    if cli.timeline {
        println!("{}", output::timeline(&record, config.timeline_window_days()));
    }
    if cli.insights {
        println!("{}", output::insights(&insights::generate(&record)));
    }
    if cli.anonymize {
        println!("{}", output::anonymization(&anonymization_report(&record)));
    }
    if cli.json {
        println!("{}", export::to_json(&record)?);
    }
    if cli.fhir {
        println!("{}", export::to_fhir_json(&record)?);
    }

    Ok(ExitCode::SUCCESS)
}

fn init_tracing() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("health_md=warn".parse()?))
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()?;
    Ok(())
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    if let Err(e) = init_tracing() {
        eprintln!("Failed to initialise logging: {e:#}");
    }

    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error processing Health.md file: {e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn summary_is_the_default_view() {
        let cli = Cli::try_parse_from(["health-md", "record.md"]).expect("parse args");
        assert!(cli.wants_default_view());
        assert_eq!(cli.lab_days, DEFAULT_LAB_WINDOW_DAYS);
        assert_eq!(cli.max_length, DEFAULT_DIGEST_MAX_LENGTH);
    }

    #[test]
    fn any_view_flag_replaces_the_default() {
        let cli = Cli::try_parse_from(["health-md", "record.md", "--labs", "--lab-days", "30"])
            .expect("parse args");
        assert!(!cli.wants_default_view());
        assert_eq!(cli.lab_days, 30);
    }

    #[test]
    fn file_argument_is_required() {
        assert!(Cli::try_parse_from(["health-md"]).is_err());
    }

    #[test]
    fn reference_date_flag_sets_config() {
        let cli = Cli::try_parse_from([
            "health-md",
            "record.md",
            "--reference-date",
            "2024-06-01",
        ])
        .expect("parse args");
        let config = cli.config().expect("config");
        assert_eq!(config.reference().format("%Y-%m-%d").to_string(), "2024-06-01");
    }

    #[test]
    fn zero_max_length_is_rejected() {
        let cli = Cli::try_parse_from(["health-md", "record.md", "--max-length", "0"])
            .expect("parse args");
        assert!(cli.config().is_err());
    }

    #[test]
    fn load_document_reads_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "## Notes\nhello").expect("write");
        let content = load_document(file.path()).expect("load");
        assert_eq!(content, "## Notes\nhello");
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("absent.md");
        let err = load_document(&path).expect_err("missing file");
        assert!(format!("{err:#}").contains("absent.md"));
    }
}
