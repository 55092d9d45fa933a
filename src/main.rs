//! HDB Resale Price Estimator - command line front end
//!
//! Usage:
//!   resale_estimator estimate --year 2020 --town "ANG MO KIO" --flat-type "4 ROOM" \
//!     --flat-model "New Generation" --storey-range "07 TO 09" \
//!     --floor-area 90 --lease-commence-date 1990
//!   resale_estimator options
//!
//! Environment:
//!   RESALE_MODEL_PATH   - Model artifact (default: best_model.json)
//!   RESALE_OPTIONS_PATH - Option catalog JSON (default: built-in lists)
//!   RUST_LOG            - Log level (default: warn)

use clap::{Parser, Subcommand};
use eyre::Result;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use resale_estimator::models::config::{ENV_MODEL_PATH, ENV_OPTIONS_PATH};
use resale_estimator::utils::constants::{APP_NAME, APP_VERSION, DEFAULT_MODEL_PATH};
use resale_estimator::{AppConfig, EstimateRequest, Estimator, ModelStore, OptionCatalog, Predictor};

#[derive(Parser)]
#[command(name = "resale_estimator", version = APP_VERSION)]
#[command(about = "Estimate the resale price of an HDB flat")]
struct Cli {
    /// Trained model artifact
    #[arg(long, global = true, env = ENV_MODEL_PATH, default_value = DEFAULT_MODEL_PATH)]
    model: PathBuf,

    /// Option catalog JSON replacing the built-in lists
    #[arg(long, global = true, env = ENV_OPTIONS_PATH)]
    options: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate the resale price of one flat
    Estimate {
        /// Year of sale
        #[arg(long)]
        year: i32,
        #[arg(long)]
        town: String,
        #[arg(long)]
        flat_type: String,
        #[arg(long)]
        flat_model: String,
        /// e.g. "07 TO 09"
        #[arg(long)]
        storey_range: String,
        /// Floor area in square metres
        #[arg(long, allow_hyphen_values = true)]
        floor_area: String,
        #[arg(long)]
        lease_commence_date: i32,
    },

    /// Print the selectable options
    Options,
}

fn main() -> Result<ExitCode> {
    // Logs go to stderr so stdout carries only the result
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();
    let config = AppConfig {
        model_path: cli.model,
        options_path: cli.options,
        ..AppConfig::default()
    };
    let catalog = config.load_catalog()?;

    match cli.command {
        Commands::Options => {
            print_options(&catalog);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Estimate {
            year,
            town,
            flat_type,
            flat_model,
            storey_range,
            floor_area,
            lease_commence_date,
        } => {
            let model = ModelStore::new(config.model_path.clone()).get()?;
            let estimator = Estimator::new(Arc::new(catalog), Predictor::new(model));

            let request = EstimateRequest {
                year,
                town,
                flat_type,
                flat_model,
                storey_range,
                floor_area_sqm: floor_area,
                lease_commence_date,
            };

            match estimator.estimate(&request) {
                Ok(estimate) => {
                    println!("Estimated Resale Price: {}", estimate.formatted_price);
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) if e.is_user_facing() => {
                    eprintln!("Warning: {}", e.message);
                    Ok(ExitCode::FAILURE)
                }
                Err(e) => Err(e.into()),
            }
        }
    }
}

fn print_options(catalog: &OptionCatalog) {
    println!("{} v{}", APP_NAME, APP_VERSION);
    println!();
    println!(
        "Year of sale:          {} - {}",
        catalog.sale_years.min, catalog.sale_years.max
    );
    println!(
        "Lease commence year:   {} - {}",
        catalog.lease_commence_years.min, catalog.lease_commence_years.max
    );
    print_list("Towns", &catalog.towns);
    print_list("Flat types", &catalog.flat_types);
    print_list("Flat models", &catalog.flat_models);
    print_list("Storey ranges", &catalog.storey_ranges);
}

fn print_list(title: &str, items: &[String]) {
    println!();
    println!("{} ({}):", title, items.len());
    for item in items {
        println!("  {}", item);
    }
}
