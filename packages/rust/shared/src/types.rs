//! Core domain types for docreview runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper for run identifiers (time-sortable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate a new time-sortable run identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RunId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

/// Review mode — selects the system prompt used throughout a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    PrdReview,
    TrdReview,
    TcReview,
}

impl Mode {
    /// Stable string form, used in filenames and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PrdReview => "prd_review",
            Self::TrdReview => "trd_review",
            Self::TcReview => "tc_review",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "prd_review" | "prd" => Ok(Self::PrdReview),
            "trd_review" | "trd" => Ok(Self::TrdReview),
            "tc_review" | "tc" => Ok(Self::TcReview),
            other => Err(format!("unknown review mode: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Run state machine
// ---------------------------------------------------------------------------

/// Lifecycle status of a run. `Running` is the only non-terminal value;
/// once a terminal value is set it never changes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Succeeded,
    Failed,
    Canceled,
}

impl RunStatus {
    /// Whether this status is terminal.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running)
    }
}

/// Pipeline phase of a run — strictly forward through the happy path.
/// `Parsing` occurs only when the input is a stored document that needs
/// text extraction; direct text input skips it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    Received,
    Parsing,
    Planning,
    Executing,
    Producing,
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Received => "received",
            Self::Parsing => "parsing",
            Self::Planning => "planning",
            Self::Executing => "executing",
            Self::Producing => "producing",
        };
        f.write_str(s)
    }
}

/// Snapshot of a single review run, pollable by external callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    /// Unique run identifier.
    pub id: RunId,
    /// Review mode for this run.
    pub mode: Mode,
    /// Lifecycle status.
    pub status: RunStatus,
    /// Current pipeline phase.
    pub phase: RunPhase,
    /// When the run was created.
    pub created_at: DateTime<Utc>,
    /// Failure description, set only when `status == Failed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Identifier of the produced review artifact, set on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_id: Option<String>,
}

impl RunRecord {
    /// A fresh record in the initial state.
    pub fn new(id: RunId, mode: Mode) -> Self {
        Self {
            id,
            mode,
            status: RunStatus::Running,
            phase: RunPhase::Received,
            created_at: Utc::now(),
            error: None,
            artifact_id: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Kind of a run event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Info,
    Todo,
    Error,
}

/// A single append-only progress event, associated with exactly one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunEvent {
    /// Owning run.
    pub run_id: RunId,
    /// Event kind.
    pub kind: EventKind,
    /// Human-readable message.
    pub message: String,
    /// Emission time.
    pub created_at: DateTime<Utc>,
}

impl RunEvent {
    /// Create an event stamped with the current time.
    pub fn now(run_id: RunId, kind: EventKind, message: impl Into<String>) -> Self {
        Self {
            run_id,
            kind,
            message: message.into(),
            created_at: Utc::now(),
        }
    }
}
