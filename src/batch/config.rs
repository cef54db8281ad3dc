//! Batch configuration
//!
//! Defines what one batch converts and how wide it runs.

use std::path::PathBuf;

use crate::error::BatchError;

/// Default extension of files picked up from the input tree
pub const DEFAULT_SOURCE_EXTENSION: &str = "dds";

/// Default extension of written files
pub const DEFAULT_TARGET_EXTENSION: &str = "tga";

/// One batch: an input/output root pair plus options
#[derive(Debug, Clone)]
pub struct BatchRequest {
    /// Directory tree to read source textures from
    pub input_dir: PathBuf,

    /// Directory the converted tree is mirrored into
    pub output_dir: PathBuf,

    /// Extension of files to convert (matched case-insensitively)
    pub source_extension: String,

    /// Extension substituted on written files
    pub target_extension: String,

    /// Number of files converted concurrently
    pub workers: usize,
}

impl BatchRequest {
    /// Create a request with default extensions and one worker per CPU thread
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            source_extension: DEFAULT_SOURCE_EXTENSION.to_string(),
            target_extension: DEFAULT_TARGET_EXTENSION.to_string(),
            workers: default_workers(),
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_extensions(mut self, source: &str, target: &str) -> Self {
        self.source_extension = source.trim_start_matches('.').to_string();
        self.target_extension = target.trim_start_matches('.').to_string();
        self
    }

    /// Validate the request before a batch starts
    pub fn validate(&self) -> Result<(), BatchError> {
        if self.input_dir.as_os_str().is_empty() || !self.input_dir.is_dir() {
            return Err(BatchError::Validation(format!(
                "input directory not found: {}",
                self.input_dir.display()
            )));
        }

        if self.output_dir.as_os_str().is_empty() || !self.output_dir.is_dir() {
            return Err(BatchError::Validation(format!(
                "output directory not found: {}",
                self.output_dir.display()
            )));
        }

        if self.source_extension.trim_start_matches('.').is_empty()
            || self.target_extension.trim_start_matches('.').is_empty()
        {
            return Err(BatchError::Validation(
                "source and target extensions must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Worker count actually used (at least one)
    pub fn effective_workers(&self) -> usize {
        self.workers.max(1)
    }
}

/// Default to CPU thread count
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_existing_dirs() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        assert!(BatchRequest::new(input.path(), output.path()).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_paths() {
        let output = tempfile::tempdir().unwrap();
        let err = BatchRequest::new("", output.path()).validate().unwrap_err();
        assert!(matches!(err, BatchError::Validation(_)));

        let input = tempfile::tempdir().unwrap();
        let err = BatchRequest::new(input.path(), "").validate().unwrap_err();
        assert!(matches!(err, BatchError::Validation(_)));
    }

    #[test]
    fn test_validate_rejects_missing_and_file_paths() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("file.txt");
        std::fs::write(&file, b"x").unwrap();

        let missing = BatchRequest::new(temp.path().join("nope"), temp.path());
        assert!(missing.validate().is_err());

        let not_dir = BatchRequest::new(temp.path(), &file);
        assert!(not_dir.validate().is_err());
    }

    #[test]
    fn test_with_extensions_strips_dots() {
        let req = BatchRequest::new("/in", "/out").with_extensions(".DDS", ".tga");
        assert_eq!(req.source_extension, "DDS");
        assert_eq!(req.target_extension, "tga");
    }

    #[test]
    fn test_effective_workers_is_at_least_one() {
        let req = BatchRequest::new("/in", "/out").with_workers(0);
        assert_eq!(req.effective_workers(), 1);
    }
}
