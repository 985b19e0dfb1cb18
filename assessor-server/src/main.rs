//! Assessor Server Binary

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use assessor_config::{AssessorConfig, ConfigLoader};
use assessor_logging::init_logging_from_config;
use assessor_server::Server;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path (YAML or JSON)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Server bind address, e.g. 0.0.0.0:3000
    #[arg(short, long, value_name = "ADDR:PORT")]
    bind: Option<String>,

    /// MongoDB connection string
    #[arg(long, value_name = "URI")]
    mongo_uri: Option<String>,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ConfigLoader::new().load(cli.config.as_deref())?;
    apply_cli_overrides(&mut config, &cli)?;
    config.validate_all()?;

    if cli.print_config {
        println!("{}", serde_yaml::to_string(&config)?);
        return Ok(());
    }

    init_logging_from_config(&config.logging)?;

    Server::new(config).start().await
}

/// Apply CLI argument overrides to configuration
fn apply_cli_overrides(config: &mut AssessorConfig, cli: &Cli) -> Result<()> {
    if let Some(bind) = &cli.bind {
        let (host, port) = bind
            .rsplit_once(':')
            .ok_or_else(|| anyhow::anyhow!("Invalid bind address '{}': expected ADDR:PORT", bind))?;
        config.server.bind_address = host.trim_matches(|c| c == '[' || c == ']').to_string();
        config.server.port = port
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid bind address '{}': {}", bind, e))?;
    }

    if let Some(uri) = &cli.mongo_uri {
        config.database.uri = uri.clone();
    }

    Ok(())
}
