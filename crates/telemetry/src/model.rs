//! Data model for step traces and trace-chain summaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Status ────────────────────────────────────────────────────────────────

/// Where a traced step stands.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TraceStatus {
    /// Opened, not yet ended.
    Started,
    /// Ended normally (tool executed or final answer reached).
    Completed,
    /// Ended by a failure (LLM error, tool not found, tool error).
    Error,
    /// The run stopped here without an answer.
    Interrupted,
}

impl std::fmt::Display for TraceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Started => write!(f, "started"),
            Self::Completed => write!(f, "completed"),
            Self::Error => write!(f, "error"),
            Self::Interrupted => write!(f, "interrupted"),
        }
    }
}

// ── Trace ─────────────────────────────────────────────────────────────────

/// One traced step of a reasoning run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trace {
    /// Identifier, unique within its chain (`trace-{step}`, `timeout`).
    pub id: String,
    /// Zero-based step index.
    pub step: u32,
    /// Mode that produced the step.
    pub mode: String,
    pub agent_id: String,
    /// What the step was doing (`reasoning`, `timeout`).
    pub action: String,
    /// Human-readable description; replaced on end.
    pub details: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    /// Milliseconds between start and end; 0 while started.
    pub duration_ms: u64,
    pub status: TraceStatus,
}

impl Trace {
    /// Open a trace stamped with the current time.
    pub fn start(
        id: impl Into<String>,
        step: u32,
        mode: impl Into<String>,
        agent_id: impl Into<String>,
        action: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            step,
            mode: mode.into(),
            agent_id: agent_id.into(),
            action: action.into(),
            details: details.into(),
            start_time: Utc::now(),
            end_time: None,
            duration_ms: 0,
            status: TraceStatus::Started,
        }
    }

    /// Close the trace, returning the ended copy.
    ///
    /// Identity fields and the start time carry over; status, details, end
    /// time and duration are set from now.
    pub fn end(self, status: TraceStatus, details: impl Into<String>) -> Self {
        let now = Utc::now();
        let duration_ms = now
            .signed_duration_since(self.start_time)
            .num_milliseconds()
            .max(0) as u64;
        Self {
            details: details.into(),
            end_time: Some(now),
            duration_ms,
            status,
            ..self
        }
    }

    pub fn is_ended(&self) -> bool {
        self.end_time.is_some()
    }

    /// Whether the step ended badly.
    pub fn is_failure(&self) -> bool {
        matches!(self.status, TraceStatus::Error | TraceStatus::Interrupted)
    }
}

// ── Summary ───────────────────────────────────────────────────────────────

/// Aggregate view over a run's trace chain.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TraceSummary {
    /// Number of reasoning steps (the timeout marker is not a step).
    pub steps: usize,
    /// Entries that ended with `error`.
    pub errors: usize,
    /// Sum of every entry's duration.
    pub total_duration_ms: u64,
    /// Status of the last entry, if any.
    pub final_status: Option<TraceStatus>,
}

impl TraceSummary {
    pub fn from_chain(chain: &[Trace]) -> Self {
        Self {
            steps: chain.iter().filter(|t| t.action != "timeout").count(),
            errors: chain
                .iter()
                .filter(|t| t.status == TraceStatus::Error)
                .count(),
            total_duration_ms: chain.iter().map(|t| t.duration_ms).sum(),
            final_status: chain.last().map(|t| t.status),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
