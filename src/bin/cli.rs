//! Boundary crawler CLI.
//!
//! Local execution entry point. Running without a subcommand performs a
//! full crawl with configured defaults.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use geocrawler::{
    error::Result,
    models::Config,
    pipeline,
    storage::{BoundaryStore, LocalStore},
};

/// geocrawler - China administrative boundary crawler
#[derive(Parser, Debug)]
#[command(
    name = "geocrawler",
    version,
    about = "Fetches province and city boundary documents into a directory tree"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch all province and city boundaries
    Crawl {
        /// Hierarchy dataset (default: paths.hierarchy_file from config)
        #[arg(long)]
        hierarchy: Option<PathBuf>,

        /// Output directory (default: paths.output_dir from config)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Validate configuration and the hierarchy dataset without fetching
    Validate {
        /// Hierarchy dataset (default: paths.hierarchy_file from config)
        #[arg(long)]
        hierarchy: Option<PathBuf>,
    },

    /// Show the summary of the last crawl
    Info {
        /// Output directory (default: paths.output_dir from config)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
    geocrawler::utils::log::init(level);
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_or_default(&cli.config)?;
    if cli.config.exists() {
        log::info!("Loaded configuration from {}", cli.config.display());
    } else {
        log::info!("No {} found, using builtin defaults", cli.config.display());
    }

    let command = cli.command.unwrap_or(Command::Crawl {
        hierarchy: None,
        output: None,
    });

    match command {
        Command::Crawl { hierarchy, output } => {
            let hierarchy_path =
                hierarchy.unwrap_or_else(|| PathBuf::from(&config.paths.hierarchy_file));
            let output_dir = output.unwrap_or_else(|| PathBuf::from(&config.paths.output_dir));

            pipeline::run(&config, &hierarchy_path, &output_dir).await?;

            log::info!("Crawl complete!");
        }

        Command::Validate { hierarchy } => {
            let hierarchy_path =
                hierarchy.unwrap_or_else(|| PathBuf::from(&config.paths.hierarchy_file));

            pipeline::run_validate(&config, &hierarchy_path)?;

            log::info!("All validations passed!");
        }

        Command::Info { output } => {
            let output_dir = output.unwrap_or_else(|| PathBuf::from(&config.paths.output_dir));
            let store = LocalStore::new(&output_dir);

            match store.load_summary().await? {
                Some(summary) => {
                    log::info!("Last crawl finished at {}", summary.timestamp);
                    log::info!(
                        "Attempted: {} ({} ok, {} failed)",
                        summary.total,
                        summary.success,
                        summary.failed
                    );
                    log::info!("Success rate: {}", summary.success_rate);
                    log::info!(
                        "Provinces: {}/{} ok, cities: {}/{} ok",
                        summary.stats.provinces.success,
                        summary.stats.provinces.total,
                        summary.stats.cities.success,
                        summary.stats.cities.total
                    );
                }
                None => {
                    log::info!("No crawl summary found under {}", output_dir.display());
                }
            }
        }
    }

    Ok(())
}
