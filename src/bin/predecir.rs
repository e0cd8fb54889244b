//! Predecir CLI - score held-out instances against trained defect models
//!
//! Runs the batch driver once over the configured entry list and prints
//! a per-entry report.

use clap::Parser;

use predecir::batch::{self, BatchConfig, BatchEntry, EntryOutcome};
use predecir::project::ArtifactLayout;

/// Predecir - Offline Batch Inference for Fault-Prone Module Prediction
#[derive(Parser)]
#[command(name = "predecir")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Directory of historical train/test split CSV files
    #[arg(long, default_value = "./historical_data")]
    historical_dir: String,

    /// Directory of serialized model and scaler artifacts
    #[arg(long, default_value = "./saved_models")]
    models_dir: String,

    /// Directory of feature-importance CSV files
    #[arg(long, default_value = "./features")]
    features_dir: String,

    /// Test-split row index to score for every entry
    #[arg(short, long, default_value = "18")]
    instance_index: usize,

    /// Entries to score, as comma-separated algorithm:org/repo pairs
    #[arg(short, long)]
    entries: Option<String>,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    output: String,

    /// Suppress the progress bar
    #[arg(short, long)]
    quiet: bool,
}

fn parse_entries(list: &str) -> Vec<BatchEntry> {
    list.split(',')
        .map(|pair| {
            let Some((algorithm, project)) = pair.split_once(':') else {
                eprintln!("Error: Malformed entry '{pair}', expected algorithm:org/repo");
                std::process::exit(1);
            };
            BatchEntry::new(algorithm.trim(), project.trim())
        })
        .collect()
}

fn main() {
    let cli = Cli::parse();

    let entries = cli
        .entries
        .as_deref()
        .map_or_else(|| BatchConfig::default().entries, parse_entries);

    let config = BatchConfig {
        entries,
        instance_index: cli.instance_index,
        layout: ArtifactLayout::new(cli.historical_dir, cli.models_dir, cli.features_dir),
        show_progress: !cli.quiet && cli.output != "json",
    };

    let report = batch::run(&config);

    match cli.output.as_str() {
        "json" => {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).unwrap_or_default()
            );
        }
        _ => {
            for entry in &report.entries {
                println!("--- {} {} ---", entry.algorithm, entry.project);
                match &entry.outcome {
                    EntryOutcome::Scored {
                        prediction,
                        actual_label,
                        verdict,
                    } => {
                        println!("Predicted probability: {:.4}", prediction.probability);
                        println!("Predicted label: {}", prediction.label);
                        println!("Actual label: {actual_label}");
                        println!("==> {verdict}");
                    }
                    EntryOutcome::Failed { error } => {
                        eprintln!("Error: {error}");
                    }
                }
                println!();
            }
        }
    }

    if !report.all_scored() {
        std::process::exit(1);
    }
}
