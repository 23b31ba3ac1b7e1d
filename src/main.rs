//! Claimsense: Fraud Classification CLI Tool
//!
//! Labels every row of a claim file as fraud (Y) or valid (N) using a
//! cluster-routed ensemble of classifiers.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use tracing_subscriber::EnvFilter;

use claimsense::cli::Cli;
use claimsense::models::ModelRepository;
use claimsense::pipeline::{
    load_dataset, save_predictions, EnsemblePredictor, PipelineConfig, PredictionReport,
};
use claimsense::report::{display_summary, export_prediction_report};
use claimsense::utils::{
    create_spinner, finish_with_error, finish_with_success, print_banner, print_completion,
    print_config, print_info, print_step_header, print_success,
};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_path = cli.output_path();

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(&cli.input, &cli.models, &output_path);

    // Step 1: Load models
    print_step_header(1, "Load Models");
    let step_start = Instant::now();
    let repository = Arc::new(ModelRepository::new(&cli.models));

    let schema = repository
        .load_schema()
        .with_context(|| format!("Failed to read schema from {}", cli.models.display()))?;
    let config = match schema {
        Some(schema) => {
            print_info("Using schema.json from models root");
            PipelineConfig::with_schema(schema)
        }
        None => PipelineConfig::default(),
    }
    .drop_also(cli.drop_columns.iter().cloned())
    .with_placeholders(cli.placeholder.clone());

    let spinner = create_spinner("Loading grouping model...");
    let clusters = if cli.preload {
        repository.preload()
    } else {
        repository.load_cluster_model().map(|m| m.n_clusters())
    };
    let clusters = match clusters {
        Ok(n) => {
            finish_with_success(&spinner, &format!("Grouping model ready ({} clusters)", n));
            n
        }
        Err(e) => {
            finish_with_error(&spinner, "Failed to load models");
            return Err(e).context("Model loading failed");
        }
    };
    println!("      Took {:.2?}", step_start.elapsed());

    // Step 2: Load dataset
    print_step_header(2, "Load Claims");
    let step_start = Instant::now();
    let spinner = create_spinner("Reading input file...");
    let df = load_dataset(&cli.input, cli.infer_schema_length, &config.placeholders)?;
    finish_with_success(&spinner, "Claims loaded");
    println!("      Rows: {}", style(df.height()).yellow());
    println!("      Columns: {}", style(df.width()).yellow());
    println!("      Took {:.2?}", step_start.elapsed());

    // Step 3: Predict
    print_step_header(3, "Predict");
    let step_start = Instant::now();
    let predictor = EnsemblePredictor::new(Arc::clone(&repository), config);
    let spinner = create_spinner("Cleaning, routing and classifying...");
    let outcome = match predictor.predict(&df) {
        Ok(outcome) => {
            finish_with_success(&spinner, "Batch classified");
            outcome
        }
        Err(e) => {
            finish_with_error(&spinner, "Batch aborted");
            return Err(e).context(format!("Prediction failed for {}", cli.input.display()));
        }
    };
    println!("      Took {:.2?}", step_start.elapsed());

    // Step 4: Save output
    print_step_header(4, "Save Results");
    save_predictions(&outcome.labels(), &output_path)?;
    print_success(&format!("Saved to {}", output_path.display()));

    let report = PredictionReport::from_outcome(&cli.input, &output_path, &outcome);
    if let Some(report_path) = &cli.report {
        export_prediction_report(&report, &cli.models, clusters, report_path)?;
        print_success(&format!("Report written to {}", report_path.display()));
    }

    display_summary(&report);
    print_completion();

    Ok(())
}
