// Batch coordinator: discover files, one worker per file, shared progress block
use crossterm::terminal;
use crossterm::tty::IsTty;
use std::fs;
use std::io::{self, Write};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::{Builder, Runtime};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::error::{BatchError, OrganizeError};
use crate::organizer::{display_name, organize, OrganizeOptions};
use crate::progress::{CursorGuard, ProgressReporter};
use crate::types::OrganizeResult;

/// Regular files directly inside `directory` whose name ends with
/// `extension` (case-sensitive), sorted by file name.
pub fn discover_files(directory: &Path, extension: &str) -> Result<Vec<PathBuf>, BatchError> {
    let discover_error = |source: io::Error| BatchError::Discover {
        path: directory.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(directory).map_err(discover_error)? {
        let entry = entry.map_err(discover_error)?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            warn!("skipping non UTF-8 file name {:?}", entry.path());
            continue;
        };
        if !name.ends_with(extension) {
            continue;
        }
        // Follows symlinks, like a plain is_file check.
        if fs::metadata(entry.path()).map(|m| m.is_file()).unwrap_or(false) {
            files.push(entry.path());
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// What happened to one file.
#[derive(Debug)]
pub enum FileOutcome {
    Organized(OrganizeResult),
    Failed { file_name: String, error: String },
}

impl FileOutcome {
    pub fn file_name(&self) -> &str {
        match self {
            FileOutcome::Organized(result) => &result.file_name,
            FileOutcome::Failed { file_name, .. } => file_name,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, FileOutcome::Failed { .. })
    }
}

/// Outcomes of a finished batch, in slot order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn organized(&self) -> impl Iterator<Item = &OrganizeResult> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            FileOutcome::Organized(result) => Some(result),
            FileOutcome::Failed { .. } => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            FileOutcome::Failed { file_name, error } => Some((file_name.as_str(), error.as_str())),
            FileOutcome::Organized(_) => None,
        })
    }

    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(FileOutcome::is_failure)
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub extension: String,
    /// `None`: every file starts immediately on its own thread.
    pub jobs: Option<NonZeroUsize>,
    pub organize: OrganizeOptions,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            extension: crate::config::DEFAULT_EXTENSION.to_string(),
            jobs: None,
            organize: OrganizeOptions::default(),
        }
    }
}

pub struct BatchCoordinator {
    directory: PathBuf,
    output_dir: PathBuf,
    options: BatchOptions,
}

impl BatchCoordinator {
    pub fn new(directory: impl Into<PathBuf>, output_dir: impl Into<PathBuf>, options: BatchOptions) -> Self {
        Self {
            directory: directory.into(),
            output_dir: output_dir.into(),
            options,
        }
    }

    /// Run the batch with the progress block on stdout, cut to the terminal
    /// width when stdout is a terminal.
    pub fn run(&self) -> Result<BatchReport, BatchError> {
        let stdout = io::stdout();
        let width = if stdout.is_tty() {
            // A pty nobody has sized reports 0 columns.
            terminal::size()
                .ok()
                .map(|(columns, _)| usize::from(columns))
                .filter(|&columns| columns > 0)
        } else {
            None
        };
        self.run_in(stdout, width)
    }

    /// Run the batch, drawing the progress block on `out`.
    ///
    /// Per-file failures are collected into the report; only discovery,
    /// terminal and runtime problems or Ctrl-C fail the batch itself.
    pub fn run_with<W>(&self, out: W) -> Result<BatchReport, BatchError>
    where
        W: Write + Send + 'static,
    {
        self.run_in(out, None)
    }

    fn run_in<W>(&self, out: W, width: Option<usize>) -> Result<BatchReport, BatchError>
    where
        W: Write + Send + 'static,
    {
        let files = discover_files(&self.directory, &self.options.extension)?;
        info!(
            "found {} file(s) ending in {} in {}",
            files.len(),
            self.options.extension,
            self.directory.display()
        );

        let reporter = ProgressReporter::new(files.len(), out)
            .map_err(BatchError::Terminal)?
            .with_width(width);
        let reporter = Arc::new(reporter);
        let _guard = CursorGuard::new(Arc::clone(&reporter));

        if files.is_empty() {
            return Ok(BatchReport::default());
        }

        let runtime = worker_runtime(files.len())?;
        let result = runtime.block_on(self.dispatch(files, Arc::clone(&reporter)));
        if matches!(result, Err(BatchError::Interrupted)) {
            // Workers cannot be cancelled; leave them behind.
            runtime.shutdown_background();
        }
        result
    }

    async fn dispatch<W>(
        &self,
        files: Vec<PathBuf>,
        reporter: Arc<ProgressReporter<W>>,
    ) -> Result<BatchReport, BatchError>
    where
        W: Write + Send + 'static,
    {
        let semaphore = self.options.jobs.map(|jobs| Arc::new(Semaphore::new(jobs.get())));

        let mut workers = Vec::with_capacity(files.len());
        for (slot, path) in files.into_iter().enumerate() {
            let file_name = display_name(&path);
            if semaphore.is_some() {
                reporter.log(slot, &format!("… {}: queued", file_name));
            }
            let handle = spawn_worker(
                path,
                self.output_dir.clone(),
                slot,
                Arc::clone(&reporter),
                self.options.organize,
                semaphore.clone(),
            );
            workers.push((slot, file_name, handle));
        }

        let collect = async {
            let mut outcomes = Vec::with_capacity(workers.len());
            for (slot, file_name, handle) in workers {
                let outcome = match handle.await {
                    Ok(Ok(Ok(result))) => FileOutcome::Organized(result),
                    Ok(Ok(Err(e))) => FileOutcome::Failed {
                        file_name,
                        error: e.to_string(),
                    },
                    Ok(Err(e)) | Err(e) => {
                        let error = format!("worker panicked: {}", e);
                        error!("{}: {}", file_name, error);
                        reporter.log(slot, &failure_line(&file_name, &error));
                        FileOutcome::Failed { file_name, error }
                    }
                };
                outcomes.push(outcome);
            }
            BatchReport { outcomes }
        };

        tokio::select! {
            report = collect => Ok(report),
            Ok(()) = tokio::signal::ctrl_c() => {
                warn!("interrupted, abandoning running workers");
                Err(BatchError::Interrupted)
            }
        }
    }
}

type WorkerHandle = JoinHandle<Result<Result<OrganizeResult, OrganizeError>, tokio::task::JoinError>>;

fn spawn_worker<W>(
    path: PathBuf,
    output_dir: PathBuf,
    slot: usize,
    reporter: Arc<ProgressReporter<W>>,
    options: OrganizeOptions,
    semaphore: Option<Arc<Semaphore>>,
) -> WorkerHandle
where
    W: Write + Send + 'static,
{
    tokio::spawn(async move {
        // The semaphore is never closed, so acquiring only waits.
        let _permit = match semaphore {
            Some(semaphore) => semaphore.acquire_owned().await.ok(),
            None => None,
        };
        tokio::task::spawn_blocking(move || {
            let result = organize(&path, &output_dir, slot, &reporter, &options);
            if let Err(e) = &result {
                error!("{}: {}", path.display(), e);
                reporter.log(slot, &failure_line(&display_name(&path), &e.to_string()));
            }
            result
        })
        .await
    })
}

fn failure_line(file_name: &str, error: &str) -> String {
    format!("✗ {}: {}", file_name, error)
}

/// Runtime whose blocking pool has room for every file at once.
fn worker_runtime(workers: usize) -> Result<Runtime, BatchError> {
    Builder::new_multi_thread()
        .worker_threads(1)
        .max_blocking_threads(workers.max(1))
        .thread_name("pdf-organize-worker")
        .enable_all()
        .build()
        .map_err(BatchError::Runtime)
}
