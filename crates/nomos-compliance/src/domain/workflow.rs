//! Remediation Workflow Aggregate
//!
//! Follow-up process (action plan) opened when a test result calls for
//! corrective action.
//!
//! ```text
//! DRAFT ──(description / first step)──► ACTIVE ──finalize──► COMPLETED
//! ```
//!
//! Workflows linked to an execution start ACTIVE. COMPLETED is terminal.

use chrono::{DateTime, NaiveDate, Utc};
use nomos_common::{EngineError, EntityId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message appended when a workflow is finalized
pub const FINALIZED_NOTE: &str = "Plano finalizado pelo usuário";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowState {
    Draft,
    Active,
    Completed,
}

impl WorkflowState {
    pub const ALL: [WorkflowState; 3] = [Self::Draft, Self::Active, Self::Completed];

    /// Stored code (DRAFT, ACTIVE, COMPLETED)
    pub fn code(self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Active => "ACTIVE",
            Self::Completed => "COMPLETED",
        }
    }
}

impl std::fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageKind {
    System,
    User,
}

/// File handed over by a caller; bytes are kept untouched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: EntityId,
    pub file_name: String,
    pub content_type: String,
    pub size: u64,
    pub data: Vec<u8>,
}

impl From<AttachmentUpload> for Attachment {
    fn from(upload: AttachmentUpload) -> Self {
        Self {
            id: EntityId::new(),
            size: upload.data.len() as u64,
            file_name: upload.file_name,
            content_type: upload.content_type,
            data: upload.data,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: EntityId,
    pub kind: MessageKind,
    pub text: String,
    pub author: String,
    pub attachments: Vec<Attachment>,
    pub sent_at: DateTime<Utc>,
}

impl Message {
    pub fn new(kind: MessageKind, text: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(),
            kind,
            text: text.into(),
            author: author.into(),
            attachments: vec![],
            sent_at: Utc::now(),
        }
    }

    pub fn system(text: impl Into<String>, author: impl Into<String>) -> Self {
        Self::new(MessageKind::System, text, author)
    }
}

/// One planned remediation step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub id: EntityId,
    pub description: String,
    pub responsible: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub done: bool,
}

impl Step {
    pub fn new(
        description: impl Into<String>,
        responsible: Option<String>,
        due_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            id: EntityId::new(),
            description: description.into(),
            responsible,
            due_date,
            done: false,
        }
    }
}

/// Remediation workflow aggregate root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemediationWorkflow {
    id: EntityId,
    execution_id: Option<EntityId>,
    state: WorkflowState,
    description: String,
    created_by: String,
    steps: Vec<Step>,
    messages: Vec<Message>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl RemediationWorkflow {
    /// Open a workflow with its initial system message
    pub fn create(
        execution_id: Option<EntityId>,
        description: impl Into<String>,
        created_by: impl Into<String>,
        opening: Message,
    ) -> Self {
        let now = Utc::now();
        let state = if execution_id.is_some() {
            WorkflowState::Active
        } else {
            WorkflowState::Draft
        };
        Self {
            id: EntityId::new(),
            execution_id,
            state,
            description: description.into(),
            created_by: created_by.into(),
            steps: vec![],
            messages: vec![opening],
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    pub fn update_description(&mut self, description: impl Into<String>) -> Result<(), WorkflowError> {
        self.ensure_open()?;
        self.description = description.into();
        if !self.description.trim().is_empty() {
            self.activate_if_draft();
        }
        self.touch();
        Ok(())
    }

    pub fn add_step(&mut self, step: Step) -> Result<&Step, WorkflowError> {
        self.ensure_open()?;
        self.steps.push(step);
        self.activate_if_draft();
        self.touch();
        let idx = self.steps.len() - 1;
        Ok(&self.steps[idx])
    }

    /// Flip a step's done flag, returning the new value
    pub fn toggle_step(&mut self, step_id: &EntityId) -> Result<bool, WorkflowError> {
        self.ensure_open()?;
        let step = self
            .steps
            .iter_mut()
            .find(|s| &s.id == step_id)
            .ok_or_else(|| WorkflowError::StepNotFound(step_id.clone()))?;
        step.done = !step.done;
        let done = step.done;
        self.touch();
        Ok(done)
    }

    /// Remove a step; absent ids are ignored
    pub fn remove_step(&mut self, step_id: &EntityId) -> Result<(), WorkflowError> {
        self.ensure_open()?;
        self.steps.retain(|s| &s.id != step_id);
        self.touch();
        Ok(())
    }

    pub fn finalize(&mut self, author: impl Into<String>) -> Result<(), WorkflowError> {
        self.ensure_open()?;
        let now = Utc::now();
        self.state = WorkflowState::Completed;
        self.completed_at = Some(now);
        self.messages.push(Message::system(FINALIZED_NOTE, author));
        self.updated_at = now;
        Ok(())
    }

    /// Append a message; state is unchanged
    pub fn add_message(&mut self, message: Message) -> &Message {
        self.messages.push(message);
        self.touch();
        let idx = self.messages.len() - 1;
        &self.messages[idx]
    }

    pub fn add_message_with_attachments(
        &mut self,
        text: impl Into<String>,
        author: impl Into<String>,
        files: Vec<AttachmentUpload>,
    ) -> &Message {
        let mut message = Message::new(MessageKind::User, text, author);
        message.attachments = files.into_iter().map(Attachment::from).collect();
        self.add_message(message)
    }

    /// Find an attachment across all messages
    pub fn attachment(&self, attachment_id: &EntityId) -> Option<&Attachment> {
        self.messages
            .iter()
            .flat_map(|m| m.attachments.iter())
            .find(|a| &a.id == attachment_id)
    }

    pub fn is_open(&self) -> bool {
        self.state != WorkflowState::Completed
    }

    fn ensure_open(&self) -> Result<(), WorkflowError> {
        if self.is_open() {
            Ok(())
        } else {
            Err(WorkflowError::AlreadyCompleted)
        }
    }

    fn activate_if_draft(&mut self) {
        if self.state == WorkflowState::Draft {
            self.state = WorkflowState::Active;
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    // =========================================================================
    // Getters
    // =========================================================================

    pub fn id(&self) -> &EntityId { &self.id }
    pub fn execution_id(&self) -> Option<&EntityId> { self.execution_id.as_ref() }
    pub fn state(&self) -> WorkflowState { self.state }
    pub fn description(&self) -> &str { &self.description }
    pub fn created_by(&self) -> &str { &self.created_by }
    pub fn steps(&self) -> &[Step] { &self.steps }
    pub fn messages(&self) -> &[Message] { &self.messages }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }
    pub fn completed_at(&self) -> Option<DateTime<Utc>> { self.completed_at }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("workflow is already completed")]
    AlreadyCompleted,
    #[error("step {0} not found")]
    StepNotFound(EntityId),
}

impl From<WorkflowError> for EngineError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::AlreadyCompleted => EngineError::InvalidState(err.to_string()),
            WorkflowError::StepNotFound(id) => EngineError::not_found("step", id),
        }
    }
}
