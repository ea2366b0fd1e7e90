//! Box-office outcome prediction CLI
//!
//! Loads the artifact bundle once and answers single predictions, lists the
//! genre vocabulary, or serves JSON-lines requests from stdin.

use anyhow::{Context, Result};
use boxoffice_service::{
    serve_lines, ArtifactCache, PredictionRequest, PredictionService, ServiceConfig,
};
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "boxoffice-predict")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Predict the financial outcome of a film", long_about = None)]
struct Args {
    /// Directory holding the artifact bundle
    #[arg(short, long)]
    artifacts: Option<PathBuf>,

    /// TOML service configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify a single film
    Predict {
        /// Genre, e.g. "Action" or "Action|Adventure"
        #[arg(long)]
        genre: String,

        /// Production budget
        #[arg(long)]
        budget: f64,

        /// Release year
        #[arg(long)]
        year: i32,

        /// Total cast popularity
        #[arg(long, default_value = "0")]
        cast: i64,

        /// Quality score between 0 and 10
        #[arg(long, default_value = "5.0")]
        score: f64,
    },
    /// List the genres the model knows
    Genres,
    /// Read JSON requests from stdin, one per line
    Serve,
}

fn load_config(args: &Args) -> Result<ServiceConfig> {
    let mut config = match &args.config {
        Some(path) => ServiceConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ServiceConfig::from_env().context("Invalid service configuration")?,
    };
    if let Some(dir) = &args.artifacts {
        config.artifact_dir = dir.clone();
    }
    if args.verbose {
        config.log_level = "debug".to_string();
    }
    Ok(config)
}

fn init_logging(config: &ServiceConfig) -> Result<()> {
    let filter = match std::env::var("RUST_LOG") {
        Ok(spec) => EnvFilter::new(spec),
        Err(_) => EnvFilter::new(&config.log_level),
    };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set tracing subscriber")
}

fn run(args: Args, config: ServiceConfig) -> Result<()> {
    let cache = Arc::new(ArtifactCache::new(&config.artifact_dir));
    let service = if config.eager_load {
        PredictionService::start(cache).context("Refusing to serve without a valid model")?
    } else {
        PredictionService::new(cache)
    };

    match args.command {
        Command::Predict {
            genre,
            budget,
            year,
            cast,
            score,
        } => {
            let request = PredictionRequest {
                genre,
                budget,
                release_year: year,
                cast_popularity: cast,
                quality_score: score,
            };
            let response = service.predict(&request).context("Prediction failed")?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Genres => {
            for genre in service.genres().context("Failed to read vocabulary")? {
                println!("{genre}");
            }
        }
        Command::Serve => {
            info!("Serving JSON-lines requests on stdin");
            let stdin = io::stdin();
            let answered = serve_lines(&service, stdin.lock(), io::stdout().lock())?;
            info!("Answered {} requests", answered);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;
    init_logging(&config)?;

    info!("Box-office prediction service v{}", env!("CARGO_PKG_VERSION"));
    info!("Artifact directory: {}", config.artifact_dir.display());

    if let Err(err) = run(args, config) {
        error!("{:#}", err);
        return Err(err);
    }
    Ok(())
}
