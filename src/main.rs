use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tourism_etl::config::Config;
use tourism_etl::services::{AnalysisService, EtlService};

#[derive(Parser)]
#[command(name = "vegas-tourism-etl")]
#[command(about = "Normalize LVCVA yearly tourism reports and compare months across years", long_about = None)]
struct Cli {
    /// Directory with the raw yearly report workbooks
    #[arg(long)]
    raw_dir: Option<PathBuf>,

    /// Directory for the processed tidy dataset
    #[arg(long)]
    processed_dir: Option<PathBuf>,

    /// Print results as JSON instead of text
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rebuild the tidy dataset from every raw report
    Preprocess,
    /// Write comparison chart series and the event-impact report
    Analyze {
        /// Metrics to analyze (default: all)
        #[arg(long, num_args = 0..)]
        metrics: Vec<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tourism_etl=debug")),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(raw_dir) = cli.raw_dir {
        config.raw_data_dir = raw_dir;
    }
    if let Some(processed_dir) = cli.processed_dir {
        config.processed_data_dir = processed_dir;
    }
    info!("Configuration: {:?}", config);

    match cli.command {
        Command::Preprocess => {
            let summary = EtlService::new(config).run()?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{summary}");
            }
        }
        Command::Analyze { metrics } => {
            let report = AnalysisService::new(config).run(&metrics)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{report}");
            }
        }
    }

    Ok(())
}
