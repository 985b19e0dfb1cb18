//! Assessor load driver binary

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use assessor_config::validation::Validatable;
use assessor_config::{ConfigLoader, LoadgenConfig};
use assessor_loadgen::{parse_stage, LoadRunner};
use assessor_logging::init_simple_tracing;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path (YAML or JSON)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Base URL of the service under test [env: BASE_URL]
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Ramp stage as DURATION:TARGET; repeat to build a profile
    #[arg(short, long = "stage", value_name = "DURATION:TARGET")]
    stages: Vec<String>,

    /// Log every failed request [env: VERBOSE]
    #[arg(short, long)]
    verbose: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print the run summary as JSON instead of text
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_simple_tracing(&cli.log_level)?;

    let mut config = ConfigLoader::new().load_loadgen(cli.config.as_deref())?;
    apply_cli_overrides(&mut config, &cli)?;
    config.validate()?;

    let report = LoadRunner::new(config)?.run().await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.summary);
        println!("{}", report.thresholds);
    }

    if report.passed() {
        Ok(ExitCode::SUCCESS)
    } else {
        for failed in report.thresholds.failures() {
            tracing::error!(
                "Threshold crossed: {} {} (observed {:.4})",
                failed.metric,
                failed.condition,
                failed.observed
            );
        }
        Ok(ExitCode::FAILURE)
    }
}

fn apply_cli_overrides(config: &mut LoadgenConfig, cli: &Cli) -> Result<()> {
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }

    if !cli.stages.is_empty() {
        config.stages = cli
            .stages
            .iter()
            .map(|s| parse_stage(s))
            .collect::<Result<Vec<_>, _>>()?;
    }

    if cli.verbose {
        config.verbose = true;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_stage_overrides() {
        let cli = Cli::parse_from([
            "assessor-loadgen",
            "--base-url",
            "http://localhost:3000",
            "--stage",
            "10s:5",
            "--stage",
            "5s:0",
        ]);
        let mut config = LoadgenConfig::default();
        apply_cli_overrides(&mut config, &cli).unwrap();

        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.stages.len(), 2);
        assert_eq!(config.total_duration(), Duration::from_secs(15));
        assert!(!config.verbose);
    }

    #[test]
    fn test_bad_stage_is_rejected() {
        let cli = Cli::parse_from(["assessor-loadgen", "--stage", "forever"]);
        let mut config = LoadgenConfig::default();
        assert!(apply_cli_overrides(&mut config, &cli).is_err());
    }
}
