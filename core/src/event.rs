//! Run events recorded while a pipeline run executes.
//!
//! Events are observations only. Nothing in the pipeline reads them
//! back; they exist so a persisted run can be audited later.

use crate::{extraction::ExclusionAudit, types::RunId};
use serde::{Deserialize, Serialize};

/// Every event emitted during a run.
/// Variants are only ever appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    RunStarted {
        run_id: RunId,
        fingerprint: String,
    },
    StageCompleted {
        stage: String,
        rows_in: u64,
        rows_out: u64,
    },
    /// `count` is default rows for record-level reasons and customers
    /// for customer-level ones.
    RowsExcluded {
        reason: String,
        level: ExclusionLevel,
        count: u64,
    },
    ReportBuilt {
        groups: u64,
        customers: u64,
        expected_collection: f64,
    },
}

impl PipelineEvent {
    /// Stable name for the event_type column in run_event.
    pub fn type_name(&self) -> &'static str {
        match self {
            PipelineEvent::RunStarted { .. } => "run_started",
            PipelineEvent::StageCompleted { .. } => "stage_completed",
            PipelineEvent::RowsExcluded { .. } => "rows_excluded",
            PipelineEvent::ReportBuilt { .. } => "report_built",
        }
    }
}

/// What an exclusion count is counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionLevel {
    /// DefaultCollection rows dropped before the per-customer sum.
    Record,
    /// Customers dropped after the sum.
    Customer,
}

impl ExclusionLevel {
    pub fn of(reason: &str) -> Self {
        if ExclusionAudit::RECORD_LEVEL_REASONS.contains(&reason) {
            ExclusionLevel::Record
        } else {
            ExclusionLevel::Customer
        }
    }
}

/// A persisted event row.
#[derive(Debug, Clone)]
pub struct EventLogEntry {
    pub id: Option<i64>,
    pub run_id: RunId,
    pub seq: u64,
    pub event_type: String,
    pub payload: String,
}
