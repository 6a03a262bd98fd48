mod cli;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tunemirror_core::{
    load_config, validate_config, Converter, Dispatcher, FfmpegConverter, JobOutcome,
    DEFAULT_CONFIG_FILE,
};

use cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("Fatal error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// An explicit `--config` must exist; the default file is optional.
fn config_path(cli: &Cli) -> Option<PathBuf> {
    match &cli.config {
        Some(path) => Some(path.clone()),
        None => Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|p| p.is_file()),
    }
}

/// Returns whether every job finished without failing.
async fn run(cli: Cli) -> Result<bool> {
    let config_path = config_path(&cli);
    if let Some(path) = &config_path {
        info!("Loading configuration from {:?}", path);
    }

    let config = load_config(config_path.as_deref(), &cli.overrides())
        .context("Failed to load configuration (--input and --output are required)")?;
    validate_config(&config).context("Configuration validation failed")?;
    let plan = config.run_plan()?;

    info!(
        input = %plan.input_root.display(),
        output = %plan.output_root.display(),
        codec = %plan.codec,
        compatibility = plan.options.compatibility,
        dry_run = plan.dry_run,
        "Configuration loaded"
    );

    let converter = FfmpegConverter::new(config.converter.clone());
    if let Err(e) = converter.validate().await {
        let hint = if e.is_engine_missing() {
            " (install ffmpeg or point --ffmpeg/--ffprobe at it)"
        } else {
            ""
        };
        let message = format!("Encoding engine check failed{}", hint);
        return Err(anyhow::Error::new(e).context(message));
    }

    let dispatcher = Dispatcher::new(config.processor.clone(), converter);
    let summary = dispatcher.run(&plan).await.context("Conversion run failed")?;

    println!("{}", summary);
    for report in summary.failures() {
        if let JobOutcome::Failed(err) = &report.outcome {
            println!("FAILED {}: {}", report.input_path.display(), err);
            if let Some(stderr) = err.diagnostics() {
                for line in stderr.lines() {
                    println!("    {}", line);
                }
            }
        }
    }
    if summary.aborted > 0 {
        println!("{} job(s) aborted", summary.aborted);
    }

    Ok(!summary.has_failures())
}
