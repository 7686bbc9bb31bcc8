//! Append-only test-evidence pipeline.
//!
//! Every scenario appends structured records to per-kind JSONL logs under
//! a reports directory; nothing ever truncates or rewrites them, so
//! evidence from earlier runs survives later ones. A consolidated summary
//! is derived from the logs on demand and is a pure function of their
//! contents: rebuilding it against unchanged logs produces byte-identical
//! output.
//!
//! Evidence writes are deliberately non-fatal. A full disk must not turn
//! a passing scenario into a failing one, so append failures are logged
//! and swallowed at the sink boundary.

use crate::result::{ComprarError, ComprarResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Name of the derived consolidated summary file.
pub const CONSOLIDATED_FILE_NAME: &str = "consolidated-report.json";

/// The evidence categories, each with its own append-only log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EvidenceKind {
    /// Page timing measurements
    Performance,
    /// Accessibility scan findings
    Accessibility,
    /// Security posture checks
    Security,
    /// Responsive layout checks
    Responsive,
    /// Harness-observed application errors
    Error,
}

impl EvidenceKind {
    /// All kinds in consolidation order
    pub const ALL: [Self; 5] = [
        Self::Performance,
        Self::Accessibility,
        Self::Security,
        Self::Responsive,
        Self::Error,
    ];

    /// Log file name for this kind
    #[must_use]
    pub const fn log_file_name(&self) -> &'static str {
        match self {
            Self::Performance => "performance-metrics.jsonl",
            Self::Accessibility => "accessibility-report.jsonl",
            Self::Security => "security-report.jsonl",
            Self::Responsive => "responsive-report.jsonl",
            Self::Error => "error-report.jsonl",
        }
    }

    /// Stable key used in summary counts
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Performance => "performance",
            Self::Accessibility => "accessibility",
            Self::Security => "security",
            Self::Responsive => "responsive",
            Self::Error => "error",
        }
    }
}

/// One page's timing measurements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetric {
    /// Page under measurement
    pub page: String,
    /// Named millisecond measurements, sorted by name
    pub metrics: BTreeMap<String, f64>,
}

/// One accessibility violation from a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessibilityViolation {
    /// Rule identifier
    pub id: String,
    /// Severity (minor, moderate, serious, critical)
    pub impact: String,
    /// Human-readable description
    pub description: String,
    /// Number of offending nodes
    pub nodes: usize,
}

/// All violations found on one URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessibilityViolationSet {
    /// Scanned URL
    pub url: String,
    /// Violations found, possibly empty
    pub violations: Vec<AccessibilityViolation>,
}

/// Result of one security posture check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityCheckResult {
    /// Check name (e.g. "https-only", "no-mixed-content")
    pub check: String,
    /// URL the check ran against
    pub url: String,
    /// Whether the check passed
    pub passed: bool,
    /// Free-form details
    pub details: String,
}

/// Result of one responsive layout check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponsiveCheckResult {
    /// Viewport label, e.g. "375x667"
    pub viewport: String,
    /// URL the check ran against
    pub url: String,
    /// Whether the layout held
    pub passed: bool,
    /// Free-form notes
    pub notes: String,
}

/// An application error observed by the harness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Error message
    pub error: String,
    /// URL where it was observed
    pub url: String,
    /// Optional structured context
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
}

/// Kind-tagged evidence payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum EvidencePayload {
    /// Timing measurements
    Performance(PerformanceMetric),
    /// Accessibility findings
    Accessibility(AccessibilityViolationSet),
    /// Security check outcome
    Security(SecurityCheckResult),
    /// Responsive check outcome
    Responsive(ResponsiveCheckResult),
    /// Observed application error
    Error(ErrorReport),
}

impl EvidencePayload {
    /// The category this payload belongs to
    #[must_use]
    pub const fn kind(&self) -> EvidenceKind {
        match self {
            Self::Performance(_) => EvidenceKind::Performance,
            Self::Accessibility(_) => EvidenceKind::Accessibility,
            Self::Security(_) => EvidenceKind::Security,
            Self::Responsive(_) => EvidenceKind::Responsive,
            Self::Error(_) => EvidenceKind::Error,
        }
    }
}

/// One line in an evidence log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceRecord {
    /// RFC 3339 capture time
    pub timestamp: String,
    /// Run this record belongs to
    pub run_id: Uuid,
    /// Test that produced the record
    pub test_name: String,
    /// Spec file the test belongs to
    pub spec_name: String,
    /// The evidence itself
    #[serde(flatten)]
    pub payload: EvidencePayload,
}

/// Appends evidence records to the per-kind logs of one reports directory.
#[derive(Debug, Clone)]
pub struct EvidenceSink {
    reports_dir: PathBuf,
    run_id: Uuid,
    spec_name: String,
}

impl EvidenceSink {
    /// Open a sink over a reports directory, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error when the directory cannot be created.
    pub fn new(reports_dir: impl Into<PathBuf>, spec_name: impl Into<String>) -> ComprarResult<Self> {
        let reports_dir = reports_dir.into();
        std::fs::create_dir_all(&reports_dir)?;
        Ok(Self {
            reports_dir,
            run_id: Uuid::new_v4(),
            spec_name: spec_name.into(),
        })
    }

    /// The run identifier stamped on every record from this sink
    #[must_use]
    pub const fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Path of the log file for a kind
    #[must_use]
    pub fn log_path(&self, kind: EvidenceKind) -> PathBuf {
        self.reports_dir.join(kind.log_file_name())
    }

    /// Append one evidence record. Write failures are logged and
    /// swallowed; they never fail the calling scenario.
    pub fn record(&self, test_name: &str, payload: EvidencePayload) {
        let record = EvidenceRecord {
            timestamp: chrono::Utc::now().to_rfc3339(),
            run_id: self.run_id,
            test_name: test_name.to_string(),
            spec_name: self.spec_name.clone(),
            payload,
        };
        if let Err(err) = self.try_append(&record) {
            tracing::warn!(error = %err, "evidence append failed, continuing");
        }
    }

    /// Append one record, surfacing the write error.
    ///
    /// # Errors
    ///
    /// Returns `EvidenceWrite` when the log cannot be opened or written.
    pub fn try_append(&self, record: &EvidenceRecord) -> ComprarResult<()> {
        let path = self.log_path(record.payload.kind());
        let json = serde_json::to_string(record)?;
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&path)
            .map_err(|source| ComprarError::EvidenceWrite {
                path: path.clone(),
                source,
            })?;
        // One write_all per record keeps lines whole under concurrent
        // appends from separate processes.
        let line = format!("{json}\n");
        file.write_all(line.as_bytes())
            .map_err(|source| ComprarError::EvidenceWrite { path, source })
    }
}

/// Summary derived from the evidence logs.
///
/// Contains no capture-time fields of its own; with unchanged logs a
/// rebuild serializes to byte-identical output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ConsolidatedSummary {
    /// Total well-formed records across all logs
    pub total_records: usize,
    /// Record count per kind
    pub counts: BTreeMap<String, usize>,
    /// Passing security checks
    pub security_passed: usize,
    /// Failing security checks
    pub security_failed: usize,
    /// Passing responsive checks
    pub responsive_passed: usize,
    /// Failing responsive checks
    pub responsive_failed: usize,
    /// Total accessibility violations across all scans
    pub accessibility_violations: usize,
    /// Observed application errors
    pub error_reports: usize,
    /// Malformed lines skipped during consolidation
    pub skipped_lines: usize,
    /// Earliest record timestamp, if any records exist
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_timestamp: Option<String>,
    /// Latest record timestamp, if any records exist
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_timestamp: Option<String>,
}

impl ConsolidatedSummary {
    fn fold(&mut self, record: &EvidenceRecord) {
        self.total_records += 1;
        *self
            .counts
            .entry(record.payload.kind().as_str().to_string())
            .or_insert(0) += 1;
        match &record.payload {
            EvidencePayload::Security(check) => {
                if check.passed {
                    self.security_passed += 1;
                } else {
                    self.security_failed += 1;
                }
            }
            EvidencePayload::Responsive(check) => {
                if check.passed {
                    self.responsive_passed += 1;
                } else {
                    self.responsive_failed += 1;
                }
            }
            EvidencePayload::Accessibility(set) => {
                self.accessibility_violations += set.violations.len();
            }
            EvidencePayload::Error(_) => {
                self.error_reports += 1;
            }
            EvidencePayload::Performance(_) => {}
        }
        let ts = &record.timestamp;
        match &self.first_timestamp {
            Some(first) if first <= ts => {}
            _ => self.first_timestamp = Some(ts.clone()),
        }
        match &self.last_timestamp {
            Some(last) if last >= ts => {}
            _ => self.last_timestamp = Some(ts.clone()),
        }
    }
}

/// Rebuild the consolidated summary from the logs in a reports directory.
///
/// Logs are folded in a fixed kind order. Malformed lines are skipped and
/// counted, never fatal: one corrupt line must not cost the rest of the
/// evidence.
///
/// # Errors
///
/// Returns an error when a log file exists but cannot be read.
pub fn rebuild_summary(reports_dir: impl AsRef<Path>) -> ComprarResult<ConsolidatedSummary> {
    let reports_dir = reports_dir.as_ref();
    let mut summary = ConsolidatedSummary::default();
    for kind in EvidenceKind::ALL {
        let path = reports_dir.join(kind.log_file_name());
        if !path.exists() {
            continue;
        }
        let reader = BufReader::new(std::fs::File::open(&path)?);
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<EvidenceRecord>(&line) {
                Ok(record) => summary.fold(&record),
                Err(err) => {
                    summary.skipped_lines += 1;
                    tracing::warn!(log = %path.display(), error = %err, "skipping malformed evidence line");
                }
            }
        }
    }
    Ok(summary)
}

/// Rebuild the summary and write it to `consolidated-report.json`.
///
/// The summary file is the one derived artifact that IS overwritten; the
/// logs it derives from never are.
///
/// # Errors
///
/// Returns an error when the logs cannot be read or the summary cannot be
/// written.
pub fn write_summary(reports_dir: impl AsRef<Path>) -> ComprarResult<ConsolidatedSummary> {
    let reports_dir = reports_dir.as_ref();
    let summary = rebuild_summary(reports_dir)?;
    let path = reports_dir.join(CONSOLIDATED_FILE_NAME);
    let json = serde_json::to_string_pretty(&summary)?;
    std::fs::write(&path, json).map_err(|source| ComprarError::EvidenceWrite {
        path: path.clone(),
        source,
    })?;
    Ok(summary)
}
