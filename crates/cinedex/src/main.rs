//! Command-line entry point for the cinedex movie library crawler.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossbeam_channel::unbounded;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use cinedex::config::load_config;
use cinedex::error::{CinedexError, ConfigError};
use cinedex::pipeline::Pipeline;
use cinedex::session::{ChromeSessionFactory, SessionOptions};
use cinedex::site::ImdbExtractor;
use cinedex::storage::Library;
use cinedex::translate::HttpTranslator;
use cinedex::worker::{AggregateReport, JobStatus, LibraryScanner, Scheduler};

/// Enriches a folder of video files with movie metadata scraped through
/// a real browser: one folder per movie with its record, cover image,
/// and the video itself.
#[derive(Parser, Debug)]
#[command(name = "cinedex")]
#[command(version)]
#[command(about = "Movie library crawler and organizer", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, value_name = "FILE", default_value = "cinedex.toml")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Error, Debug)]
enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("library folder '{0}' does not exist or is not a directory")]
    LibraryMissing(PathBuf),

    #[error("chromedriver executable '{0}' not found; place the build matching your Chrome there or adjust [driver]")]
    DriverMissing(PathBuf),

    #[error("{0}")]
    Runtime(#[from] CinedexError),
}

impl CliError {
    /// Each pre-flight failure class gets its own exit code so wrapper
    /// scripts can tell them apart without parsing log output.
    fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(ConfigError::ReadFile { .. }) => 2,
            CliError::Config(ConfigError::ParseToml(_)) => 3,
            CliError::Config(ConfigError::Validation { .. }) => 4,
            CliError::LibraryMissing(_) => 5,
            CliError::DriverMissing(_) => 6,
            CliError::Runtime(_) => 1,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    let shutdown = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&shutdown);
    if let Err(e) = ctrlc::set_handler(move || {
        handler_flag.store(true, Ordering::Relaxed);
    }) {
        tracing::warn!("Ctrl-C handler not installed: {e}");
    }

    match run(&cli, shutdown) {
        Ok(report) => {
            print_report(&report);
            let code = if report.failed() > 0 { 1 } else { 0 };
            std::process::exit(code);
        }
        Err(err) => {
            tracing::error!("{err}");
            std::process::exit(err.exit_code());
        }
    }
}

fn run(cli: &Cli, shutdown: Arc<AtomicBool>) -> Result<AggregateReport, CliError> {
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = load_config(&cli.config)?;

    if !config.library.path.is_dir() {
        return Err(CliError::LibraryMissing(config.library.path.clone()));
    }
    let driver_executable = config.driver.executable();
    if !driver_executable.is_file() {
        return Err(CliError::DriverMissing(driver_executable));
    }

    let jobs = LibraryScanner::new(config.library.path.clone())
        .scan()
        .map_err(CinedexError::from)?;
    tracing::info!(
        "Found {} entries in {}",
        jobs.len(),
        config.library.path.display()
    );

    let library = Library::new(config.library.path.clone());
    let extractor = Arc::new(ImdbExtractor::new(Duration::from_secs(
        config.crawl.reveal_settle_secs,
    )));
    let translator = Arc::new(
        HttpTranslator::new(
            config.translate.endpoint.clone(),
            config.translate.target_lang.clone(),
        )
        .map_err(CinedexError::from)?,
    );
    let factory = Arc::new(ChromeSessionFactory::new(SessionOptions {
        executable: driver_executable,
        headless: config.driver.headless,
    }));

    let (relocation_tx, relocation_rx) = unbounded();
    let pipeline = Arc::new(Pipeline::new(
        &config.crawl,
        library,
        extractor,
        translator,
        relocation_tx,
    ));

    let scheduler = Scheduler::new(
        pipeline,
        relocation_rx,
        factory,
        config.workers.max_threads,
        config.workers.isolate_sessions,
        shutdown,
    );
    Ok(scheduler.run(jobs))
}

fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        let default = match verbose {
            0 => "cinedex=info,warn",
            1 => "cinedex=debug,info",
            _ => "trace",
        };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
    };

    // The library logs through the `log` facade; route those records into
    // the tracing subscriber alongside the pipeline spans.
    let _ = tracing_log::LogTracer::init();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn print_report(report: &AggregateReport) {
    for entry in &report.entries {
        match &entry.status {
            JobStatus::Completed => {
                tracing::info!("  ok      {} ({})", entry.title, entry.source_filename)
            }
            JobStatus::Failed(error) => tracing::error!(
                "  failed  {} ({}): {}",
                entry.title,
                entry.source_filename,
                error
            ),
            JobStatus::Skipped => tracing::warn!("  skipped {}", entry.source_filename),
        }
    }

    let elapsed = report.finished_at - report.started_at;
    tracing::info!(
        "{} completed, {} failed, {} skipped in {}s",
        report.completed(),
        report.failed(),
        report.skipped(),
        elapsed.num_seconds()
    );
    if report.relocation_failures > 0 {
        tracing::warn!(
            "{} files could not be moved into their movie folders",
            report.relocation_failures
        );
    }
}
