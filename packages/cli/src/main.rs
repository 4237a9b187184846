#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Ask questions about crop production and rainfall from the terminal.
//!
//! ```text
//! samarth ask "Compare rainfall in Tamil Nadu and Kerala for the last 3 years" [--json]
//! samarth interactive
//! samarth vocabulary
//! ```
//!
//! Running `samarth` with no subcommand enters interactive mode. Dataset
//! paths come from `samarth.toml`, the `SAMARTH_CROPS_PATH` and
//! `SAMARTH_RAINFALL_PATH` environment variables, or `--crops` and
//! `--rainfall`, in increasing order of precedence.

mod config;
mod interactive;
mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use samarth_analytics_models::AnalyticsSettings;
use samarth_assistant::QueryEngine;
use samarth_cli_utils::{IndicatifProgress, MultiProgress};
use samarth_dataset::config::DatasetPaths;
use samarth_dataset::{load_crops, load_rainfall};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(
    name = "samarth",
    about = "Answer questions about Indian crop production and rainfall"
)]
struct Cli {
    /// Config file (defaults to ./samarth.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Crop production file (.xlsx or .csv), overriding config and environment
    #[arg(long, global = true)]
    crops: Option<PathBuf>,

    /// Rainfall CSV, overriding config and environment
    #[arg(long, global = true)]
    rainfall: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a single question
    Ask {
        /// The question, e.g. "Top 3 crops in Punjab in 2014"
        question: String,
        /// Print the full answer, intent and provenance as JSON
        #[arg(long)]
        json: bool,
    },
    /// Prompt for questions until an empty line or `exit`
    Interactive,
    /// Show dataset status and the states, crops, subdivisions and years they contain
    Vocabulary,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = samarth_cli_utils::init_logger();
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;
    let mut paths = config.datasets.with_env_overrides();
    if let Some(crops) = cli.crops {
        paths.crops = crops;
    }
    if let Some(rainfall) = cli.rainfall {
        paths.rainfall = rainfall;
    }

    let engine = load_engine(&multi, &paths, config.analytics);

    match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Ask { question, json } => match engine.answer_query(&question) {
            Ok(answer) if json => println!("{}", serde_json::to_string_pretty(&answer)?),
            Ok(answer) => println!("{}", render::render_answer(&answer)),
            Err(e) => {
                eprintln!("{e}");
                eprintln!("{}", e.guidance());
                std::process::exit(1);
            }
        },
        Commands::Interactive => interactive::run(&engine)?,
        Commands::Vocabulary => {
            println!("{}\n", render::render_datasets(engine.crops(), engine.rainfall()));
            println!("{}", render::render_vocabulary(engine.vocabulary()));
        }
    }

    Ok(())
}

fn load_engine(multi: &MultiProgress, paths: &DatasetPaths, settings: AnalyticsSettings) -> QueryEngine {
    let progress = IndicatifProgress::rows_spinner(multi, "Loading crop production data");
    let crops = load_crops(&paths.crops, progress.as_ref());

    let progress = IndicatifProgress::rows_spinner(multi, "Loading rainfall data");
    let rainfall = load_rainfall(&paths.rainfall, progress.as_ref());

    QueryEngine::new(crops, rainfall, settings)
}
