//! Progress reporting and cancellation

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Progress callback for reporting batch status
pub type ProgressCallback = Arc<dyn Fn(BatchProgress) + Send + Sync>;

/// Batch progress information
#[derive(Debug, Clone)]
pub enum BatchProgress {
    /// Directory walk finished
    Discovered { total: usize },
    /// A file's pipeline is starting
    FileStarted {
        index: usize,
        total: usize,
        path: PathBuf,
    },
    /// A file's pipeline finished (`index` counts finished files, 1-based)
    FileFinished {
        index: usize,
        total: usize,
        path: PathBuf,
        success: bool,
    },
    /// Batch finished
    Completed {
        succeeded: usize,
        failed: usize,
        cancelled: usize,
    },
}

/// Helper for reporting progress to an optional callback
pub(crate) struct ProgressReporter {
    callback: Option<ProgressCallback>,
    total: usize,
    started: AtomicUsize,
    finished: AtomicUsize,
}

impl ProgressReporter {
    pub fn new(callback: Option<ProgressCallback>, total: usize) -> Self {
        Self {
            callback,
            total,
            started: AtomicUsize::new(0),
            finished: AtomicUsize::new(0),
        }
    }

    fn emit(&self, event: BatchProgress) {
        if let Some(ref callback) = self.callback {
            callback(event);
        }
    }

    pub fn discovered(&self) {
        self.emit(BatchProgress::Discovered { total: self.total });
    }

    pub fn file_started(&self, path: &Path) {
        let index = self.started.fetch_add(1, Ordering::Relaxed) + 1;
        self.emit(BatchProgress::FileStarted {
            index,
            total: self.total,
            path: path.to_path_buf(),
        });
    }

    pub fn file_finished(&self, path: &Path, success: bool) {
        let index = self.finished.fetch_add(1, Ordering::Relaxed) + 1;
        self.emit(BatchProgress::FileFinished {
            index,
            total: self.total,
            path: path.to_path_buf(),
            success,
        });
    }

    pub fn completed(&self, succeeded: usize, failed: usize, cancelled: usize) {
        self.emit(BatchProgress::Completed {
            succeeded,
            failed,
            cancelled,
        });
    }
}

/// Cooperative cancellation signal shared between a batch and its caller
///
/// Checked while the tree is scanned and before each file is dispatched.
/// Files already dispatched run to completion.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_cancel_token_is_shared_between_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_reporter_counts_finished_files() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let callback: ProgressCallback =
            Arc::new(move |e: BatchProgress| sink.lock().unwrap().push(e));

        let reporter = ProgressReporter::new(Some(callback), 2);
        reporter.file_finished(Path::new("a.dds"), true);
        reporter.file_finished(Path::new("b.dds"), false);

        let events = events.lock().unwrap();
        let indices: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                BatchProgress::FileFinished { index, total, .. } => Some((*index, *total)),
                _ => None,
            })
            .collect();
        assert_eq!(indices, vec![(1, 2), (2, 2)]);
    }

    #[test]
    fn test_reporter_without_callback_is_silent() {
        let reporter = ProgressReporter::new(None, 1);
        reporter.discovered();
        reporter.file_started(Path::new("a.dds"));
        reporter.completed(1, 0, 0);
    }
}
