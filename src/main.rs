// pdf-organize - drop duplicate scanned pages and restore printed page order
use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::process::ExitCode;

use pdf_organize::batch::{BatchCoordinator, BatchOptions, BatchReport};
use pdf_organize::config::{CliOverrides, FileConfig, Settings};
use pdf_organize::error::{BatchError, ConfigError};
use pdf_organize::organizer::OrganizeOptions;
use pdf_organize::types::FallbackLabel;
use pdf_organize::logging;

const EXIT_FAILURES: u8 = 1;
const EXIT_CONFIG: u8 = 2;
const EXIT_INTERRUPTED: u8 = 130;

/// Deduplicate and reorder PDF pages by their printed "N/total" page numbers
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Directory with the PDFs to organize
    #[arg(short, long)]
    directory: PathBuf,

    /// Directory for the organized PDFs (created if missing)
    #[arg(short, long)]
    output: PathBuf,

    /// Run at most N files at once (default: all files at once)
    #[arg(short, long, value_name = "N")]
    jobs: Option<usize>,

    /// Label for pages without a readable page number
    #[arg(long, value_enum)]
    fallback: Option<FallbackLabel>,

    /// Config file (default: <config dir>/pdf-organize/config.toml if present)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// More logging (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    match run(Args::parse()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            if e.downcast_ref::<ConfigError>().is_some() {
                ExitCode::from(EXIT_CONFIG)
            } else if matches!(e.downcast_ref::<BatchError>(), Some(BatchError::Interrupted)) {
                ExitCode::from(EXIT_INTERRUPTED)
            } else {
                ExitCode::from(EXIT_FAILURES)
            }
        }
    }
}

fn run(args: Args) -> Result<ExitCode> {
    let file_config = FileConfig::discover(args.config.as_deref())?;
    let settings = Settings::resolve(
        CliOverrides {
            directory: args.directory,
            output: args.output,
            jobs: args.jobs,
            fallback: args.fallback,
            log_file: args.log_file,
            verbose: args.verbose,
        },
        file_config,
    )?;

    let terminal_log = logging::init(&settings.log_level, settings.log_file.as_deref())?;

    if settings.prepare_directories()? {
        println!("Created output directory: {}", settings.output.display());
    }

    let coordinator = BatchCoordinator::new(
        &settings.directory,
        &settings.output,
        BatchOptions {
            extension: settings.extension.clone(),
            jobs: settings.jobs,
            organize: OrganizeOptions {
                fallback: settings.fallback,
                overwrite: settings.overwrite,
            },
        },
    );
    let report = {
        // Records reach the terminal only once the progress block is done.
        let _held = terminal_log.as_ref().map(|log| log.hold());
        coordinator.run()
    }
    .with_context(|| format!("organizing {}", settings.directory.display()))?;

    print_summary(&report);
    if report.has_failures() {
        Ok(ExitCode::from(EXIT_FAILURES))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn print_summary(report: &BatchReport) {
    if report.is_empty() {
        println!("No PDF files found");
        return;
    }

    let organized = report.organized().count();
    let removed: usize = report
        .organized()
        .map(|result| result.original_pages.saturating_sub(result.new_pages))
        .sum();
    println!(
        "Organized {}/{} files, removed {} duplicate pages",
        organized,
        report.len(),
        removed
    );

    let failures: Vec<_> = report.failures().collect();
    if !failures.is_empty() {
        eprintln!("{} file(s) failed:", failures.len());
        for (file_name, error) in failures {
            eprintln!("  {}: {}", file_name, error);
        }
    }
}
