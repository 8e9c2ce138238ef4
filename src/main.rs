//! Loadsight - load-test log conversion and statistics
//!
//! This is the main entry point for the loadsight command-line interface.

use clap::{Parser, Subcommand};
use loadsight::codec::csv_export::export_csv_file;
use loadsight::codec::reader::Artifact;
use loadsight::codec::writer::write_artifact_file;
use loadsight::model::Sample;
use loadsight::parsing::csv_source::decode_file;
use loadsight::stats::builder;
use serde_json::json;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "loadsight", version, about = "Load-test log conversion and statistics")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a CSV result log into a binary sample artifact
    Import {
        /// The CSV file to convert
        source: PathBuf,
        /// Directory for the converted artifact
        #[arg(long, default_value = "data/converted")]
        out_dir: PathBuf,
        /// Bucket width for the printed timeseries stats, in milliseconds
        #[arg(long, default_value_t = 60_000)]
        span_millis: i64,
    },
    /// Convert a binary sample artifact back into CSV
    Export {
        /// The artifact to read
        artifact: PathBuf,
        /// Where to write the CSV
        csv: PathBuf,
    },
    /// Print an artifact's metadata as JSON
    Inspect {
        /// The artifact to read
        artifact: PathBuf,
    },
}

fn main() -> loadsight::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Import { source, out_dir, span_millis } => {
            let mut batch = decode_file(&source)?;
            batch.samples.sort_by(Sample::cmp_temporal);

            let stem = source
                .file_stem()
                .map_or_else(|| "converted".to_string(), |s| s.to_string_lossy().to_string());
            let artifact_path = out_dir.join(format!("{}.bin", stem));
            let hash = write_artifact_file(&batch, &artifact_path)?;

            let aggregate = builder::calc_aggregate_stats(&mut batch.samples);
            let series = builder::calc_timeseries_stats(&mut batch.samples, span_millis);
            let summary = json!({
                "artifact": artifact_path.display().to_string(),
                "sha256": hash,
                "rows": batch.len(),
                "earliestMillis": batch.earliest_millis,
                "latestMillis": batch.latest_millis,
                "labels": batch.label_set(),
                "aggregate": aggregate,
                "timeseries": series,
            });
            println!("{}", serde_json::to_string_pretty(&summary).unwrap_or_default());
        }
        Command::Export { artifact, csv } => {
            let hash = export_csv_file(&artifact, &csv)?;
            println!("{}", json!({ "csv": csv.display().to_string(), "sha256": hash }));
        }
        Command::Inspect { artifact } => {
            let artifact = Artifact::open_file(&artifact)?;
            let header = artifact.header();
            let summary = json!({
                "rows": header.num_rows,
                "earliestMillis": header.earliest_millis,
                "latestMillis": header.latest_millis,
                "labels": header.labels,
                "threadNames": header.thread_names,
                "customCodes": header.custom_codes,
                "customMessages": header.custom_messages,
            });
            println!("{}", serde_json::to_string_pretty(&summary).unwrap_or_default());
        }
    }
    Ok(())
}
