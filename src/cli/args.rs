//! Command-line argument definitions using clap

use clap::Parser;
use std::path::PathBuf;

/// Claimsense - Label insurance claim records as fraud (Y) or valid (N)
#[derive(Parser, Debug)]
#[command(name = "claimsense")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input file path (CSV or Parquet)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Models root containing clustering/kmeans.json and
    /// clustering/cluster_<id>/model.json
    #[arg(short, long, default_value = "models")]
    pub models: PathBuf,

    /// Output CSV path.
    /// Defaults to input directory with '_predictions' suffix (e.g., claims.csv → claims_predictions.csv).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Optional JSON report path (counts, unscored rows, run metadata)
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Extra columns to drop before processing (comma-separated).
    /// Added to the schema's drop list.
    #[arg(long, value_delimiter = ',')]
    pub drop_columns: Vec<String>,

    /// Tokens treated as missing values (comma-separated)
    #[arg(long, value_delimiter = ',', default_value = "?")]
    pub placeholder: Vec<String>,

    /// Number of rows to use for schema inference (CSV only).
    /// Use 0 for full table scan.
    #[arg(long, default_value = "10000")]
    pub infer_schema_length: usize,

    /// Load every classifier before predicting, failing early if one is missing
    #[arg(long, default_value = "false")]
    pub preload: bool,
}

impl Cli {
    /// Get the output path, deriving from input if not explicitly provided.
    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            let parent = self
                .input
                .parent()
                .unwrap_or_else(|| std::path::Path::new("."));
            let stem = self
                .input
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("output");
            parent.join(format!("{}_predictions.csv", stem))
        })
    }
}
