//! Batch orchestrator
//!
//! Converts every source texture under an input root into an index texture
//! under an output root:
//! 1. Validate: both roots must be existing directories
//! 2. Discover: iterative walk, extension filter
//! 3. Convert: bounded rayon pool, one isolated pipeline per file
//! 4. Summarize: successes, per-file failures, cancelled files
//!
//! A failure in one file is recorded against that file and never stops the
//! rest of the batch. Only one batch runs per `BatchConverter` at a time.

pub mod config;
pub mod discover;
pub mod progress;
pub mod result;
pub mod task;

pub use config::{
    default_workers, BatchRequest, DEFAULT_SOURCE_EXTENSION, DEFAULT_TARGET_EXTENSION,
};
pub use discover::{discover, DiscoveredEntry};
pub use progress::{BatchProgress, CancelToken, ProgressCallback};
pub use result::{BatchResult, BatchStatus, FileFailure};
pub use task::ConversionTask;

use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::error::{BatchError, ConvertError};
use progress::ProgressReporter;

/// Whether a converter is currently running a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    Running,
}

/// Releases the running flag when dropped, on every exit path
struct RunGuard<'a> {
    running: &'a AtomicBool,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

/// What happened to one discovered entry
enum FileOutcome {
    Converted,
    Failed(PathBuf, ConvertError),
    Cancelled(PathBuf),
}

/// Runs batches, one at a time
#[derive(Debug, Default)]
pub struct BatchConverter {
    running: AtomicBool,
}

impl BatchConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> BatchState {
        if self.running.load(Ordering::SeqCst) {
            BatchState::Running
        } else {
            BatchState::Idle
        }
    }

    fn try_begin(&self) -> Result<RunGuard<'_>, BatchError> {
        self.running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| BatchError::AlreadyRunning)?;
        Ok(RunGuard {
            running: &self.running,
        })
    }

    /// Convert every matching file under `request.input_dir`
    ///
    /// Fails fast with `Validation` on bad roots and `AlreadyRunning` when
    /// another batch is in progress; everything else ends up in the result.
    pub fn convert(
        &self,
        request: &BatchRequest,
        cancel: &CancelToken,
        progress: Option<ProgressCallback>,
    ) -> Result<BatchResult, BatchError> {
        request.validate()?;
        let _guard = self.try_begin()?;
        let started = Instant::now();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(request.effective_workers())
            .thread_name(|i| format!("texidx-worker-{}", i))
            .build()
            .map_err(|e| BatchError::WorkerPool(e.to_string()))?;

        info!(
            "Scanning {} for *.{} files",
            request.input_dir.display(),
            request.source_extension
        );
        let mut entries = Vec::new();
        let mut scan_interrupted = false;
        for entry in discover(&request.input_dir, &request.source_extension) {
            entries.push(entry);
            if cancel.is_cancelled() {
                info!("Scan interrupted after {} entries", entries.len());
                scan_interrupted = true;
                break;
            }
        }
        let total = entries.len();
        info!(
            "Converting {} files with {} workers",
            total,
            request.effective_workers()
        );

        let reporter = ProgressReporter::new(progress, total);
        reporter.discovered();

        let outcomes: Vec<FileOutcome> = pool.install(|| {
            entries
                .into_par_iter()
                .map(|entry| process_entry(request, entry, cancel, &reporter))
                .collect()
        });

        let mut succeeded = 0;
        let mut failures = Vec::new();
        let mut cancelled = Vec::new();
        for outcome in outcomes {
            match outcome {
                FileOutcome::Converted => succeeded += 1,
                FileOutcome::Failed(path, error) => failures.push(FileFailure::new(path, &error)),
                FileOutcome::Cancelled(path) => cancelled.push(path),
            }
        }

        let status = if scan_interrupted || !cancelled.is_empty() {
            BatchStatus::Cancelled
        } else if !failures.is_empty() {
            BatchStatus::FailedPartial
        } else {
            BatchStatus::Completed
        };

        reporter.completed(succeeded, failures.len(), cancelled.len());
        info!(
            "Batch finished: {}/{} converted, {} failed, {} cancelled in {:?}",
            succeeded,
            total,
            failures.len(),
            cancelled.len(),
            started.elapsed()
        );

        Ok(BatchResult {
            status,
            discovered: total,
            succeeded,
            failures,
            cancelled,
            elapsed: started.elapsed(),
        })
    }

    /// Run [`convert`](Self::convert) on the tokio blocking pool
    pub async fn convert_async(
        self: Arc<Self>,
        request: BatchRequest,
        cancel: CancelToken,
        progress: Option<ProgressCallback>,
    ) -> Result<BatchResult, BatchError> {
        tokio::task::spawn_blocking(move || self.convert(&request, &cancel, progress))
            .await
            .map_err(|e| BatchError::WorkerPool(e.to_string()))?
    }
}

/// Run one entry through its pipeline, catching every per-file error
fn process_entry(
    request: &BatchRequest,
    entry: DiscoveredEntry,
    cancel: &CancelToken,
    reporter: &ProgressReporter,
) -> FileOutcome {
    let source = match entry {
        DiscoveredEntry::File(path) => path,
        DiscoveredEntry::Unreadable { path, error } => {
            warn!("Cannot read {}: {}", path.display(), error);
            reporter.file_finished(&path, false);
            return FileOutcome::Failed(path, ConvertError::Walk(error));
        }
    };

    if cancel.is_cancelled() {
        return FileOutcome::Cancelled(source);
    }

    reporter.file_started(&source);
    let result = ConversionTask::plan(request, &source).and_then(|task| task.run());

    match result {
        Ok(()) => {
            reporter.file_finished(&source, true);
            FileOutcome::Converted
        }
        Err(e) => {
            warn!("Failed to convert {}: {}", source.display(), e);
            reporter.file_finished(&source, false);
            FileOutcome::Failed(source, e)
        }
    }
}
