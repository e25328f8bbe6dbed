//! Domain layer
//!
//! Aggregates and value objects for scope items, schedules, executions and
//! remediation workflows.

pub mod execution;
pub mod organization;
pub mod schedule;
pub mod scope;
pub mod workflow;

pub use execution::{Conformity, ExecutionError, ExecutionRecord};
pub use organization::{Area, CostCenter, Directorate, Institution, OrgUnit};
pub use schedule::{month_from_name, month_name, ScheduleEntry, ScheduleStatus, MONTH_NAMES};
pub use scope::{RecurrencePeriod, ScopeDefinition, ScopeItem};
pub use workflow::{
    Attachment, AttachmentUpload, Message, MessageKind, RemediationWorkflow, Step, WorkflowError,
    WorkflowState,
};
