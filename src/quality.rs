// Data quality reporting. Historical meet files are messy; no single bad
// record may abort a batch, so every dropped or suspect record lands here
// and is summarized after the run.

use serde::{Deserialize, Serialize};

// ============================================================================
// ISSUES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// Record was dropped.
    Critical,
    /// Record was ingested but something about it is suspect.
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueKind {
    /// Identifier has the wrong width or format.
    MalformedIdentifier,
    /// More than one equally good identity candidate.
    AmbiguousIdentity,
    /// Age observation contradicts the swimmer's birthday interval.
    InconsistentAgeData,
    /// (distance, stroke, course) not in the event catalog.
    UnknownEvent,
    /// Wire-format line too short or otherwise unreadable.
    UnparsableLine,
}

impl IssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::MalformedIdentifier => "malformed identifier",
            IssueKind::AmbiguousIdentity => "ambiguous identity",
            IssueKind::InconsistentAgeData => "inconsistent age data",
            IssueKind::UnknownEvent => "unknown event",
            IssueKind::UnparsableLine => "unparsable line",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityIssue {
    pub kind: IssueKind,
    pub severity: Severity,
    pub message: String,
    /// Source file, when the issue arose during file ingestion.
    pub source_file: Option<String>,
    /// 1-based line number within the source file.
    pub line_number: Option<usize>,
}

// ============================================================================
// REPORT
// ============================================================================

/// Per-run accumulator of quality issues and ingestion counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QualityReport {
    pub issues: Vec<QualityIssue>,
    pub records_ingested: usize,
    pub records_dropped: usize,
}

impl QualityReport {
    pub fn new() -> QualityReport {
        QualityReport::default()
    }

    pub fn record_ingested(&mut self) {
        self.records_ingested += 1;
    }

    pub fn push(&mut self, issue: QualityIssue) {
        if issue.severity == Severity::Critical {
            self.records_dropped += 1;
        }
        self.issues.push(issue);
    }

    pub fn issue(&mut self, kind: IssueKind, severity: Severity, message: impl Into<String>) {
        self.push(QualityIssue {
            kind,
            severity,
            message: message.into(),
            source_file: None,
            line_number: None,
        });
    }

    pub fn count(&self, kind: IssueKind) -> usize {
        self.issues.iter().filter(|i| i.kind == kind).count()
    }

    pub fn has_critical_issues(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Critical)
    }

    pub fn summary(&self) -> String {
        format!(
            "{} ingested, {} dropped, {} issues ({} critical)",
            self.records_ingested,
            self.records_dropped,
            self.issues.len(),
            self.issues
                .iter()
                .filter(|i| i.severity == Severity::Critical)
                .count()
        )
    }
}

// ============================================================================
// TESTS
// ============================================================================
