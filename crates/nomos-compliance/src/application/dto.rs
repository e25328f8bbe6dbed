//! Commands and views
//!
//! Objects for transferring data across the service boundary.

use chrono::{DateTime, Utc};
use nomos_common::EntityId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{ExecutionRecord, RemediationWorkflow, ScheduleStatus};
use crate::matrix::ComplianceBand;
use crate::risk::RiskTier;

// =============================================================================
// Execution Commands
// =============================================================================

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecordExecutionCommand {
    pub scope_item_id: EntityId,
    pub schedule_entry_id: EntityId,
    pub sample_size: u32,
    pub non_conforming: u32,
    pub non_conformities: Option<String>,
    /// Used when the matrix prescribes nothing
    pub fallback_action: Option<String>,
    pub responsible: String,
    /// Defaults to now
    pub tested_at: Option<DateTime<Utc>>,
}

/// Saved record plus the workflow it opened, if any
#[derive(Clone, Debug, Serialize)]
pub struct ExecutionOutcome {
    pub record: ExecutionRecord,
    pub workflow: Option<RemediationWorkflow>,
}

// =============================================================================
// Workflow Commands
// =============================================================================

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StepCommand {
    pub description: String,
    pub responsible: Option<String>,
    /// ISO `YYYY-MM-DD`; blank means none
    pub due_date: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CreateWorkflowCommand {
    pub execution_id: Option<EntityId>,
    pub description: String,
    pub created_by: String,
    pub steps: Vec<StepCommand>,
}

// =============================================================================
// Views (Read Models)
// =============================================================================

/// Execution with its read-time compliance band
#[derive(Clone, Debug, Serialize)]
pub struct ExecutionView {
    pub record: ExecutionRecord,
    pub compliance: Option<ComplianceBand>,
}

/// Schedule entry joined with its scope item and execution result
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScheduleView {
    pub entry_id: EntityId,
    pub scope_item_id: EntityId,
    pub scope_name: String,
    pub area_name: String,
    pub directorate_name: String,
    pub risk_tier: RiskTier,
    pub month: u32,
    pub month_name: String,
    pub year: i32,
    pub status: ScheduleStatus,
    pub percentage: Option<Decimal>,
    pub compliance: Option<ComplianceBand>,
}

/// Origin details of a workflow
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowSummary {
    pub test_name: String,
    pub area: String,
    pub non_conformities: String,
}

impl WorkflowSummary {
    pub const UNKNOWN: &'static str = "N/A";

    pub fn standalone() -> Self {
        Self {
            test_name: Self::UNKNOWN.into(),
            area: Self::UNKNOWN.into(),
            non_conformities: String::new(),
        }
    }
}
