//! Batch outcome

use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConvertError;

/// Final state of a finished batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    /// Every discovered file converted
    Completed,
    /// At least one file failed, the rest were still attempted
    FailedPartial,
    /// Cancel signal stopped the scan or dispatch before every file was attempted
    Cancelled,
}

/// One file that could not be converted
#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    /// Error category, see [`ConvertError::kind`]
    pub kind: String,
    pub reason: String,
}

impl FileFailure {
    pub fn new(path: PathBuf, error: &ConvertError) -> Self {
        Self {
            path,
            kind: error.kind().to_string(),
            reason: error.to_string(),
        }
    }
}

/// Summary of one batch
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    pub status: BatchStatus,
    /// Files found under the input root (plus unreadable walk entries)
    pub discovered: usize,
    pub succeeded: usize,
    pub failures: Vec<FileFailure>,
    /// Files never started because the batch was cancelled
    pub cancelled: Vec<PathBuf>,
    #[serde(serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

impl BatchResult {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Every discovered entry is accounted for exactly once
    pub fn attempted(&self) -> usize {
        self.succeeded + self.failures.len()
    }

    pub fn is_success(&self) -> bool {
        self.status == BatchStatus::Completed
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_report_shape() {
        let result = BatchResult {
            status: BatchStatus::FailedPartial,
            discovered: 2,
            succeeded: 1,
            failures: vec![FileFailure::new(
                PathBuf::from("in/bad.dds"),
                &ConvertError::Decode("Failed to parse DDS".into()),
            )],
            cancelled: Vec::new(),
            elapsed: Duration::from_millis(1500),
        };

        let json: serde_json::Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();
        assert_eq!(json["status"], "failed_partial");
        assert_eq!(json["succeeded"], 1);
        assert_eq!(json["elapsed"], 1500);
        assert_eq!(json["failures"][0]["kind"], "decode");
        assert_eq!(result.attempted(), 2);
        assert!(!result.is_success());
    }
}
