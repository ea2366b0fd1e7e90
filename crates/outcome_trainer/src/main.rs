//! Box-office outcome trainer CLI
//!
//! Trains the genre encoder, feature scaler and forest classifier from a
//! movie metadata CSV and writes them as one artifact bundle.

use anyhow::{Context, Result};
use boxoffice_core::{ClassWeight, FEATURE_NAMES};
use boxoffice_trainer::{TrainerConfig, TrainingPipeline};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "boxoffice-train")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Train the box-office outcome classifier", long_about = None)]
struct Args {
    /// Input CSV dataset path
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output directory for the artifact bundle
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML file with training parameters
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Also write the per-film metrics table to this path
    #[arg(long)]
    metrics_table: Option<PathBuf>,

    /// Number of trees in the forest
    #[arg(long)]
    trees: Option<usize>,

    /// Maximum tree depth
    #[arg(long)]
    max_depth: Option<usize>,

    /// Seed for the split and the forest
    #[arg(long)]
    seed: Option<u64>,

    /// Disable balanced class weights
    #[arg(long)]
    unweighted: bool,

    /// Keep exact duplicate rows
    #[arg(long)]
    keep_duplicates: bool,

    /// Print the training report as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn into_config(self) -> Result<(TrainerConfig, bool)> {
        let mut config = match &self.config {
            Some(path) => TrainerConfig::load_from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => TrainerConfig::default(),
        };

        if let Some(input) = self.input {
            config.input = input;
        }
        if let Some(output) = self.output {
            config.output_dir = output;
        }
        if self.metrics_table.is_some() {
            config.metrics_table = self.metrics_table;
        }
        if let Some(trees) = self.trees {
            config.forest.n_trees = trees;
        }
        if self.max_depth.is_some() {
            config.forest.max_depth = self.max_depth;
        }
        if let Some(seed) = self.seed {
            config.split_seed = seed;
            config.forest.seed = seed;
        }
        if self.unweighted {
            config.forest.class_weight = ClassWeight::None;
        }
        if self.keep_duplicates {
            config.drop_duplicates = false;
        }

        Ok((config, self.json))
    }
}

fn init_logging(verbose: bool) -> Result<()> {
    if std::env::var_os("RUST_LOG").is_some() && !verbose {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .with_target(false)
            .with_writer(std::io::stderr)
            .finish();
        return tracing::subscriber::set_global_default(subscriber)
            .context("Failed to set tracing subscriber");
    }

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set tracing subscriber")
}

fn run(args: Args) -> Result<()> {
    let (config, json) = args.into_config()?;

    info!("Box-office outcome trainer v{}", env!("CARGO_PKG_VERSION"));
    info!("═══════════════════════════════════════════");
    info!("Training configuration:");
    info!("  Input: {}", config.input.display());
    info!("  Output: {}", config.output_dir.display());
    info!("  Holdout ratio: {}", config.test_ratio);
    info!("  Split seed: {}", config.split_seed);
    info!("  Trees: {}", config.forest.n_trees);
    info!("  Max depth: {:?}", config.forest.max_depth);
    info!("  Class weight: {:?}", config.forest.class_weight);

    let pipeline = TrainingPipeline::new(config).context("Invalid training configuration")?;
    let report = pipeline.run().context("Training failed")?;

    info!("═══════════════════════════════════════════");
    info!("Training complete!");
    info!("  Rows: {} ({} duplicates dropped)", report.rows_loaded, report.duplicates_dropped);
    info!("  Genres: {}", report.vocabulary_size);
    info!("  Holdout accuracy: {:.4}", report.holdout_accuracy);
    for name in FEATURE_NAMES {
        if let Some(importance) = report.feature_importances.get(name) {
            info!("  Importance {}: {:.4}", name, importance);
        }
    }
    info!("  Bundle: {}", report.bundle_id);
    if let Some(saved) = &report.artifacts {
        info!("  Encoder: {}", saved.encoder.display());
        info!("  Scaler: {}", saved.scaler.display());
        info!("  Classifier: {}", saved.classifier.display());
    }

    if json {
        let out = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{out}");
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    if let Err(err) = run(args) {
        error!("{:#}", err);
        return Err(err);
    }
    Ok(())
}
