//! Error types for batch conversion
//!
//! `BatchError` aborts a whole batch before any file is touched.
//! `ConvertError` fails a single file and is recorded in the batch result.

use std::path::PathBuf;

/// Errors that reject a batch before it starts
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("invalid directories: {0}")]
    Validation(String),

    #[error("a batch is already running")]
    AlreadyRunning,

    #[error("failed to start worker pool: {0}")]
    WorkerPool(String),
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no input directory given and none saved in settings")]
    MissingInputDir,

    #[error("no output directory given and none saved in settings")]
    MissingOutputDir,
}

/// Errors that fail one file's pipeline
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("decode failed: {0}")]
    Decode(String),

    /// Pixel buffer length disagrees with its declared dimensions.
    /// Always a defect in the decoder, never bad user input.
    #[error("malformed buffer: {width}x{height} needs {expected} bytes, got {actual}")]
    MalformedBuffer {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("encode failed: {0}")]
    Encode(String),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not under the input directory", .0.display())]
    OutsideRoot(PathBuf),

    #[error("directory walk failed: {0}")]
    Walk(String),
}

impl ConvertError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Short category name for summaries
    pub fn kind(&self) -> &'static str {
        match self {
            ConvertError::Decode(_) => "decode",
            ConvertError::MalformedBuffer { .. } => "malformed-buffer",
            ConvertError::Encode(_) => "encode",
            ConvertError::Io { .. } => "io",
            ConvertError::OutsideRoot(_) => "outside-root",
            ConvertError::Walk(_) => "walk",
        }
    }
}
