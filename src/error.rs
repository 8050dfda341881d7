//! Unified Error Handling
//!
//! Typed errors for every pipeline stage plus the shared [`ErrorLog`] service
//! that records recovered failures and produces run summaries. The log is an
//! injected dependency, not a global: anything that can degrade to a fallback
//! takes a handle and records what happened.

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type encompassing all hard failures in the system.
///
/// Most failures never reach this type: extraction, validation and transport
/// problems are absorbed by fallbacks and only show up in the [`ErrorLog`].
#[derive(Debug, Error)]
pub enum DevForgeError {
    // Pipeline errors
    #[error("AI service error: {0}")]
    Ai(#[from] crate::ai::AiError),

    #[error("Response extraction error: {0}")]
    Extraction(#[from] crate::extract::ExtractionError),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Artifact persistence error: {0}")]
    Persistence(#[from] crate::artifacts::PersistenceError),

    #[error("Context ingestion error: {0}")]
    Ingest(#[from] crate::ingest::IngestError),

    // Infrastructure errors
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    // User-facing errors
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Result type alias for devforge operations.
pub type DevForgeResult<T> = Result<T, DevForgeError>;

impl DevForgeError {
    /// Whether the pipeline can absorb this error with a fallback value.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, DevForgeError::Ai(_) | DevForgeError::Extraction(_))
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        DevForgeError::InvalidInput {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        DevForgeError::Internal {
            message: message.into(),
        }
    }
}

/// Classification of a recorded failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Model output could not be turned into JSON of the expected shape.
    Extraction,
    /// Decoded JSON failed schema validation.
    Validation,
    /// The model backend was unreachable, timed out, or refused the request.
    Transport,
    /// Source analysis hit input it could not interpret.
    StaticAnalysis,
    /// Writing artifacts to disk failed. The only kind that propagates.
    Persistence,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Extraction => "extraction",
            ErrorKind::Validation => "validation",
            ErrorKind::Transport => "transport",
            ErrorKind::StaticAnalysis => "static_analysis",
            ErrorKind::Persistence => "persistence",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded failure, recovered or not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub timestamp: DateTime<Utc>,
    pub kind: ErrorKind,
    pub message: String,
    /// Where in the pipeline the failure happened (stage or operation name).
    pub context: String,
    /// Display strings of the error and its `source()` chain, outermost first.
    pub cause_chain: Vec<String>,
    pub recovered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovery_action: Option<String>,
}

impl ErrorRecord {
    pub fn new(kind: ErrorKind, message: impl Into<String>, context: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            timestamp: Utc::now(),
            kind,
            cause_chain: vec![message.clone()],
            message,
            context: context.into(),
            recovered: false,
            recovery_action: None,
        }
    }

    /// Build a record from a live error, capturing its cause chain.
    pub fn from_error(
        kind: ErrorKind,
        error: &(dyn Error + 'static),
        context: impl Into<String>,
    ) -> Self {
        let mut record = Self::new(kind, error.to_string(), context);
        record.cause_chain = build_cause_chain(error);
        record
    }

    pub fn with_recovery(mut self, action: impl Into<String>) -> Self {
        self.recovered = true;
        self.recovery_action = Some(action.into());
        self
    }
}

fn build_cause_chain(error: &(dyn Error + 'static)) -> Vec<String> {
    let mut chain = vec![error.to_string()];
    let mut current = error.source();
    while let Some(err) = current {
        chain.push(err.to_string());
        current = err.source();
    }
    chain
}

/// Aggregate view over the recorded failures of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorSummary {
    pub total_errors: usize,
    pub recovered_errors: usize,
    /// Share of recovered failures, rounded to two decimals. 0.0 when empty.
    pub recovery_rate_percent: f64,
    pub counts_by_kind: BTreeMap<String, usize>,
    /// The five most recent records, oldest first.
    pub recent: Vec<ErrorRecord>,
}

const RECENT_ERRORS_SHOWN: usize = 5;

/// Shared, append-only log of everything that went wrong during a run.
///
/// Cheap to clone (`Arc` inside); append order under concurrent use is
/// whatever the mutex hands out.
#[derive(Debug, Clone, Default)]
pub struct ErrorLog {
    records: Arc<Mutex<Vec<ErrorRecord>>>,
}

impl ErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> MutexGuard<'_, Vec<ErrorRecord>> {
        // A poisoned lock only means another thread panicked mid-append;
        // the Vec itself is still usable.
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Append a record and hand back a copy of what was stored.
    pub fn record(&self, record: ErrorRecord) -> ErrorRecord {
        tracing::debug!(
            kind = record.kind.as_str(),
            context = %record.context,
            recovered = record.recovered,
            "recorded failure: {}",
            record.message
        );
        self.records().push(record.clone());
        record
    }

    /// Convenience for the common case: a failure that a fallback absorbed.
    pub fn record_recovered(
        &self,
        kind: ErrorKind,
        error: &(dyn Error + 'static),
        context: impl Into<String>,
        action: impl Into<String>,
    ) -> ErrorRecord {
        self.record(ErrorRecord::from_error(kind, error, context).with_recovery(action))
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    pub fn clear(&self) {
        self.records().clear();
    }

    pub fn summary(&self) -> ErrorSummary {
        let records = self.records();
        let total_errors = records.len();
        let recovered_errors = records.iter().filter(|r| r.recovered).count();
        let recovery_rate_percent = if total_errors > 0 {
            round2(recovered_errors as f64 / total_errors as f64 * 100.0)
        } else {
            0.0
        };

        let mut counts_by_kind = BTreeMap::new();
        for record in records.iter() {
            *counts_by_kind
                .entry(record.kind.as_str().to_string())
                .or_insert(0) += 1;
        }

        let recent = records
            .iter()
            .rev()
            .take(RECENT_ERRORS_SHOWN)
            .rev()
            .cloned()
            .collect();

        ErrorSummary {
            total_errors,
            recovered_errors,
            recovery_rate_percent,
            counts_by_kind,
            recent,
        }
    }

    /// Copy of every record, in append order.
    pub fn snapshot(&self) -> Vec<ErrorRecord> {
        self.records().clone()
    }

    /// All records as pretty-printed JSON, for export alongside artifacts.
    pub fn export_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&*self.records())
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn io_error(message: &str) -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::Other, message.to_string())
    }

    #[test]
    fn test_record_captures_cause_chain() {
        let record = ErrorRecord::from_error(
            ErrorKind::Transport,
            &io_error("connection refused"),
            "suggest_tech_stacks",
        );

        assert_eq!(record.kind, ErrorKind::Transport);
        assert_eq!(record.cause_chain, vec!["connection refused".to_string()]);
        assert!(!record.recovered);
    }

    #[test]
    fn test_summary_counts_and_rate() {
        let log = ErrorLog::new();
        log.record_recovered(
            ErrorKind::Extraction,
            &io_error("bad json"),
            "suggest_tech_stacks",
            "used fallback tech stacks",
        );
        log.record_recovered(
            ErrorKind::Transport,
            &io_error("timeout"),
            "generate_structure",
            "returned error structure",
        );
        log.record(ErrorRecord::new(
            ErrorKind::Persistence,
            "disk full",
            "save_bundle",
        ));

        let summary = log.summary();
        assert_eq!(summary.total_errors, 3);
        assert_eq!(summary.recovered_errors, 2);
        assert_eq!(summary.recovery_rate_percent, 66.67);
        assert_eq!(summary.counts_by_kind.get("extraction"), Some(&1));
        assert_eq!(summary.counts_by_kind.get("transport"), Some(&1));
        assert_eq!(summary.counts_by_kind.get("persistence"), Some(&1));
        assert_eq!(summary.recent.len(), 3);
    }

    #[test]
    fn test_summary_recent_keeps_last_five() {
        let log = ErrorLog::new();
        for i in 0..8 {
            log.record(ErrorRecord::new(
                ErrorKind::Validation,
                format!("failure {}", i),
                "generate_structure",
            ));
        }

        let summary = log.summary();
        assert_eq!(summary.recent.len(), 5);
        assert_eq!(summary.recent[0].message, "failure 3");
        assert_eq!(summary.recent[4].message, "failure 7");
    }

    #[test]
    fn test_clear_resets_log() {
        let log = ErrorLog::new();
        log.record(ErrorRecord::new(ErrorKind::Validation, "bad", "stage"));
        assert_eq!(log.len(), 1);

        log.clear();
        assert!(log.is_empty());
        assert_eq!(log.summary().total_errors, 0);
        assert_eq!(log.summary().recovery_rate_percent, 0.0);
    }

    #[test]
    fn test_shared_handle_sees_same_records() {
        let log = ErrorLog::new();
        let handle = log.clone();
        handle.record(ErrorRecord::new(
            ErrorKind::Transport,
            "refused",
            "generate_bundle",
        ));

        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_kind_names_are_stable() {
        assert_eq!(ErrorKind::StaticAnalysis.as_str(), "static_analysis");
        assert_eq!(ErrorKind::Extraction.to_string(), "extraction");
    }
}
