//! # anomaly
//!
//! Command-line interface: train a bundle from historical data, inspect it,
//! score single values against it, or serve it over HTTP.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use engine::{
    AnomalyScorer, ArtifactBundle, CsvHistorySource, DistanceMetric, RegressorConfig,
    ScoringConfig, SequenceRegressor, TrainingConfig, TrainingOutcome, TrainingPipeline,
};
use server::ServerConfig;

#[derive(Parser)]
#[command(name = "anomaly")]
#[command(about = "Forecast-residual anomaly detection", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum RegressorKind {
    Linear,
    Knn,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a bundle from a CSV of historical values
    Train {
        /// Input CSV file with a header row
        #[arg(short, long)]
        input: PathBuf,

        /// Column name or index holding the values (default: last column)
        #[arg(short, long)]
        column: Option<String>,

        /// Where to write the bundle
        #[arg(short, long, default_value = "artifacts/bundle.json")]
        output: PathBuf,

        /// JSON training configuration; flags below override it
        #[arg(long)]
        config: Option<PathBuf>,

        /// Samples per window
        #[arg(short, long)]
        window_size: Option<usize>,

        /// Residual percentile used as the threshold
        #[arg(short, long)]
        percentile: Option<f64>,

        /// Regressor to train
        #[arg(short, long, value_enum)]
        regressor: Option<RegressorKind>,

        /// Ridge penalty for the linear regressor
        #[arg(long, default_value = "1e-6")]
        ridge: f64,

        /// Neighbours for the KNN regressor
        #[arg(long, default_value = "5")]
        k: usize,

        /// Write the training report as JSON here (optional)
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Print a bundle's summary
    Inspect {
        #[arg(short, long, default_value = "artifacts/bundle.json")]
        bundle: PathBuf,
    },

    /// Score one value against the window that preceded it
    Score {
        #[arg(short, long, default_value = "artifacts/bundle.json")]
        bundle: PathBuf,

        /// Value to score
        #[arg(short, long, allow_hyphen_values = true)]
        value: f64,

        /// Preceding values, oldest first, comma separated
        #[arg(short, long, value_delimiter = ',', num_args = 1.., allow_hyphen_values = true)]
        window: Vec<f64>,

        /// Divisor applied to the calibrated threshold
        #[arg(short, long, default_value = "4.0")]
        tightening: f64,
    },

    /// Start the REST API server (other settings come from the environment)
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Bundle to serve
        #[arg(short, long)]
        bundle: Option<PathBuf>,
    },
}

/// Training configuration from an optional JSON file plus flag overrides.
fn training_config(
    config: Option<&Path>,
    window_size: Option<usize>,
    percentile: Option<f64>,
    regressor: Option<RegressorKind>,
    ridge: f64,
    k: usize,
) -> anyhow::Result<TrainingConfig> {
    let mut training = match config {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("cannot open config {}", path.display()))?;
            serde_json::from_reader(file)
                .with_context(|| format!("invalid training config {}", path.display()))?
        }
        None => TrainingConfig::default(),
    };

    if let Some(window_size) = window_size {
        training = training.with_window_size(window_size);
    }
    if let Some(percentile) = percentile {
        training = training.with_percentile(percentile);
    }
    match regressor {
        Some(RegressorKind::Linear) => {
            training = training.with_regressor(RegressorConfig::Linear { ridge });
        }
        Some(RegressorKind::Knn) => {
            training = training.with_regressor(RegressorConfig::Knn {
                k,
                metric: DistanceMetric::Euclidean,
            });
        }
        None => {}
    }

    training.validate()?;
    Ok(training)
}

fn training_report(outcome: &TrainingOutcome) -> serde_json::Value {
    let bundle = &outcome.bundle;
    let summary = bundle.summary();
    let anomalous_windows: Vec<usize> = outcome
        .calibration
        .exceedances()
        .iter()
        .enumerate()
        .filter_map(|(i, &flag)| flag.then_some(i))
        .collect();

    serde_json::json!({
        "window_size": bundle.window_size(),
        "regressor": bundle.regressor().name(),
        "threshold": bundle.threshold(),
        "percentile": bundle.percentile(),
        "normalization": bundle.normalization(),
        "summary": summary,
        "anomalous_windows": anomalous_windows,
    })
}

fn run_train(
    input: PathBuf,
    column: Option<String>,
    output: PathBuf,
    training: TrainingConfig,
    report: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut source = CsvHistorySource::new(&input);
    if let Some(column) = column {
        source = source.with_column(column);
    }

    let pipeline = TrainingPipeline::new(training)?;
    let outcome = pipeline
        .run(&source, &output)
        .with_context(|| format!("training from {} failed", input.display()))?;

    let summary = outcome.bundle.summary();
    println!("Trained on {} values ({} windows)", summary.series_len, summary.window_count);
    println!("Regressor: {}", outcome.bundle.regressor().name());
    println!(
        "Threshold: {:.6} (p{} of in-sample residuals)",
        outcome.bundle.threshold(),
        outcome.bundle.percentile()
    );
    println!(
        "Residuals: mean {:.6}, max {:.6}",
        summary.mean_residual, summary.max_residual
    );
    println!("In-sample exceedances: {}", summary.in_sample_anomalies);
    println!("Bundle written to {:?}", output);

    if let Some(path) = report {
        let file = File::create(&path)
            .with_context(|| format!("cannot create report {}", path.display()))?;
        serde_json::to_writer_pretty(file, &training_report(&outcome))?;
        println!("Report written to {:?}", path);
    }

    Ok(())
}

fn run_inspect(bundle: PathBuf) -> anyhow::Result<()> {
    let bundle = ArtifactBundle::load(&bundle)?;
    let summary = bundle.summary();
    let norm = bundle.normalization();

    println!("Regressor:     {}", bundle.regressor().name());
    println!("Window size:   {}", bundle.window_size());
    println!("Threshold:     {:.6} (p{})", bundle.threshold(), bundle.percentile());
    println!("Normalization: min {} max {}", norm.min(), norm.max());
    println!("Trained at:    {}", summary.trained_at.to_rfc3339());
    println!("Series length: {}", summary.series_len);
    println!("Windows:       {}", summary.window_count);
    println!(
        "Residuals:     mean {:.6}, max {:.6}, {} above threshold",
        summary.mean_residual, summary.max_residual, summary.in_sample_anomalies
    );
    Ok(())
}

fn run_score(bundle: PathBuf, value: f64, window: Vec<f64>, tightening: f64) -> anyhow::Result<()> {
    let bundle = Arc::new(ArtifactBundle::load(&bundle)?);
    let scorer = AnomalyScorer::new(bundle, ScoringConfig::new(tightening))?;
    let result = scorer.score(value, &window)?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn run_serve(
    port: Option<u16>,
    host: Option<String>,
    bundle: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut config = ServerConfig::from_env()?;
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(bundle) = bundle {
        config.artifact_path = bundle;
    }
    server::run(config).await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    server::init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Train {
            input,
            column,
            output,
            config,
            window_size,
            percentile,
            regressor,
            ridge,
            k,
            report,
        } => {
            let training =
                training_config(config.as_deref(), window_size, percentile, regressor, ridge, k)?;
            run_train(input, column, output, training, report)
        }
        Commands::Inspect { bundle } => run_inspect(bundle),
        Commands::Score {
            bundle,
            value,
            window,
            tightening,
        } => run_score(bundle, value, window, tightening),
        Commands::Serve { port, host, bundle } => run_serve(port, host, bundle).await,
    }
}
