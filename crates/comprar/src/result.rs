//! Result and error types for Comprar.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for Comprar operations
pub type ComprarResult<T> = Result<T, ComprarError>;

/// Errors that can occur in Comprar
#[derive(Debug, Error)]
pub enum ComprarError {
    /// A non-retrying action command resolved zero elements
    #[error("no element matched {query}")]
    ElementNotFound {
        /// The query that resolved nothing
        query: String,
    },

    /// A retried assertion or read never passed within its timeout
    #[error("assertion on {query} timed out after {timeout_ms}ms (last observed: {last_observed})")]
    AssertionTimeout {
        /// The query the retry loop was re-resolving
        query: String,
        /// Last observed element/page state before giving up
        last_observed: String,
        /// Timeout budget that was exhausted
        timeout_ms: u64,
    },

    /// A checkout guard rejected a state transition
    #[error("checkout gate rejected transition: {message}")]
    ValidationGate {
        /// The field that failed validation
        field: String,
        /// Field-specific error message
        message: String,
    },

    /// Computed and displayed currency totals disagree beyond epsilon.
    ///
    /// Always fatal, never retried: a stable computation error cannot be
    /// fixed by waiting.
    #[error("{label}: computed {computed:.2} vs displayed {displayed:.2} (epsilon {epsilon})")]
    DataIntegrityMismatch {
        /// Which total disagreed
        label: String,
        /// Value recomputed from per-row data
        computed: f64,
        /// Value read from the rendered page
        displayed: f64,
        /// Tolerance that was exceeded
        epsilon: f64,
    },

    /// An evidence append could not be persisted
    #[error("evidence append to {path} failed: {source}")]
    EvidenceWrite {
        /// Log file that rejected the append
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// Navigation failed or the document never became ready
    #[error("navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// A value-level verification failed (e.g. observed sort order)
    #[error("assertion failed: {message}")]
    Assertion {
        /// Error message
        message: String,
    },

    /// A command was issued after an earlier command in the same scenario failed
    #[error("scenario aborted by earlier failure: {first_failure}")]
    ScenarioAborted {
        /// The first failure, which is the only one surfaced
        first_failure: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ComprarError {
    /// Whether this error aborts the rest of the scenario's queue.
    ///
    /// Evidence write failures are the exception: they are logged and
    /// swallowed so a reporting problem never fails the functional
    /// scenario it describes.
    #[must_use]
    pub const fn aborts_scenario(&self) -> bool {
        !matches!(self, Self::EvidenceWrite { .. })
    }
}
