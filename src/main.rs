//! texidx - batch index texture creator
//!
//! Converts a tree of DDS normal maps into TGA index textures.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use texidx::batch::{default_workers, DEFAULT_SOURCE_EXTENSION, DEFAULT_TARGET_EXTENSION};
use texidx::settings::Settings;
use texidx::{
    textures, BatchConverter, BatchProgress, BatchRequest, BatchResult, CancelToken, ConfigError,
    ProgressCallback,
};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "texidx")]
#[command(version)]
#[command(about = "Batch-convert DDS textures into TGA index textures")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (use RUST_LOG=debug for more detail)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert every texture under INPUT into OUTPUT, mirroring the tree
    Convert {
        /// Input directory (defaults to the last one used)
        input: Option<PathBuf>,

        /// Output directory (defaults to the last one used)
        output: Option<PathBuf>,

        /// Files converted concurrently (defaults to CPU thread count)
        #[arg(short, long, env = "TEXIDX_WORKERS")]
        workers: Option<usize>,

        /// Extension of source files
        #[arg(long, default_value = DEFAULT_SOURCE_EXTENSION)]
        source_ext: String,

        /// Extension of written files
        #[arg(long, default_value = DEFAULT_TARGET_EXTENSION)]
        target_ext: String,

        /// Write a JSON report of the batch to this file
        #[arg(long)]
        report: Option<PathBuf>,

        /// Don't remember the directories and worker count for next time
        #[arg(long)]
        no_save: bool,
    },

    /// Show header information for a DDS file
    Info {
        /// Path to the DDS file
        file: PathBuf,
    },
}

/// Only initialize logging if verbose, RUST_LOG or a log file is set
fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    if !verbose && log_file.is_none() && std::env::var("RUST_LOG").is_err() {
        return Ok(None);
    }

    let level = if verbose {
        "texidx=debug"
    } else if log_file.is_some() {
        "texidx=info"
    } else {
        "texidx=warn"
    };
    let filter = EnvFilter::from_default_env().add_directive(level.parse()?);

    match log_file {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create log file: {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(writer)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            Ok(None)
        }
    }
}

/// Progress bar driven by batch events
fn progress_bar_callback(pb: ProgressBar) -> ProgressCallback {
    Arc::new(move |event: BatchProgress| match event {
        BatchProgress::Discovered { total } => {
            pb.set_length(total as u64);
            pb.set_message(format!("{} textures found", total));
        }
        BatchProgress::FileStarted { .. } => {}
        BatchProgress::FileFinished { path, success, .. } => {
            if !success {
                pb.println(format!("FAILED: {}", path.display()));
            }
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            pb.set_message(name);
            pb.inc(1);
        }
        BatchProgress::Completed { .. } => pb.finish_and_clear(),
    })
}

fn print_summary(result: &BatchResult) {
    println!("\n=== Conversion Summary ===");
    println!("Found:      {}", result.discovered);
    println!("Converted:  {}", result.succeeded);
    println!("Failed:     {}", result.failed());
    if !result.cancelled.is_empty() {
        println!("Cancelled:  {}", result.cancelled.len());
    }
    println!("Time:       {:.1}s", result.elapsed.as_secs_f64());

    if !result.failures.is_empty() {
        println!("\n=== Failures ===");
        for failure in &result.failures {
            println!("  {}: {}", failure.path.display(), failure.reason);
        }
    }

    if result.is_success() {
        println!("\nConversion completed successfully.");
    } else if !result.cancelled.is_empty() {
        println!("\nConversion cancelled.");
    } else {
        println!("\nSome textures failed. See the list above.");
    }
}

async fn run_convert(
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    workers: Option<usize>,
    source_ext: String,
    target_ext: String,
    report: Option<PathBuf>,
    no_save: bool,
) -> Result<ExitCode> {
    let mut settings = Settings::load();

    let input = input
        .or_else(|| settings.input_dir())
        .ok_or(ConfigError::MissingInputDir)?;
    let output = output
        .or_else(|| settings.output_dir())
        .ok_or(ConfigError::MissingOutputDir)?;
    let workers = workers.or(settings.workers).unwrap_or_else(default_workers);

    println!("texidx - Index Texture Creator");
    println!("Input:   {}", input.display());
    println!("Output:  {}", output.display());
    println!("Workers: {}", workers);
    println!();

    let request = BatchRequest::new(&input, &output)
        .with_workers(workers)
        .with_extensions(&source_ext, &target_ext);

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} | {msg}")
            .context("Invalid progress template")?
            .progress_chars("=>-"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));

    let cancel = CancelToken::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        let pb = pb.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                pb.println("Cancelling... waiting for in-flight textures");
                cancel.cancel();
            }
        })
    };

    let converter = Arc::new(BatchConverter::new());
    let result = converter
        .convert_async(request, cancel, Some(progress_bar_callback(pb.clone())))
        .await;
    ctrl_c.abort();
    pb.finish_and_clear();
    let result = result?;

    print_summary(&result);

    if let Some(report) = report {
        let json = result.to_json().context("Failed to serialize report")?;
        std::fs::write(&report, json)
            .with_context(|| format!("Failed to write report: {}", report.display()))?;
        info!("Report written to {}", report.display());
    }

    if !no_save && result.succeeded > 0 {
        settings.remember_batch(&input, &output, workers);
        if let Err(e) = settings.save() {
            warn!("Could not save settings: {:#}", e);
        }
    }

    Ok(if result.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let _log_guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    match cli.command {
        Commands::Convert {
            input,
            output,
            workers,
            source_ext,
            target_ext,
            report,
            no_save,
        } => {
            run_convert(input, output, workers, source_ext, target_ext, report, no_save).await
        }

        Commands::Info { file } => {
            let info = textures::texture_info(&file)?;
            println!("=== Texture Information ===");
            println!("File:       {}", file.display());
            println!("Dimensions: {}x{}", info.width, info.height);
            println!("Format:     {}", info.format);
            println!("Mipmaps:    {}", info.mip_count);
            Ok(ExitCode::SUCCESS)
        }
    }
}
