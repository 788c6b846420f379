//! Measurement modules driven by key events


pub use latency::{LatencyRecord, LatencyTest};

/// A single summary entry
#[derive(Debug, Clone, PartialEq)]
pub struct TestResult {
    pub label: String,
    pub value: String,
    pub status: ResultStatus,
}

impl TestResult {
    pub fn new(label: impl Into<String>, value: impl Into<String>, status: ResultStatus) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            status,
        }
    }

    pub fn ok(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(label, value, ResultStatus::Ok)
    }

    pub fn warning(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(label, value, ResultStatus::Warning)
    }

    pub fn info(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(label, value, ResultStatus::Info)
    }
}

/// Status of a test result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultStatus {
    Ok,
    Warning,
    Error,
    Info,
}
