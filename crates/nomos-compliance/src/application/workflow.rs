//! Remediation workflow service

use chrono::NaiveDate;
use nomos_common::{EngineError, EngineResult, EntityId};
use std::sync::Arc;
use tracing::info;

use super::dto::{CreateWorkflowCommand, StepCommand, WorkflowSummary};
use super::Repositories;
use crate::domain::{
    Attachment, AttachmentUpload, Message, MessageKind, RemediationWorkflow, Step,
};
use crate::settings::EngineSettings;

/// Opening text of manually created workflows
pub const MANUAL_NOTE: &str = "Plano de ação criado manualmente.";

fn parse_due_date(value: Option<&str>) -> EngineResult<Option<NaiveDate>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(text) => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| EngineError::InvalidInput(format!("invalid due date '{}', expected YYYY-MM-DD", text))),
    }
}

fn build_step(command: StepCommand) -> EngineResult<Step> {
    let due_date = parse_due_date(command.due_date.as_deref())?;
    Ok(Step::new(command.description, command.responsible, due_date))
}

/// Remediation workflow application service
pub struct WorkflowService {
    repos: Repositories,
    settings: Arc<EngineSettings>,
}

impl WorkflowService {
    pub fn new(repos: Repositories, settings: Arc<EngineSettings>) -> Self {
        Self { repos, settings }
    }

    pub async fn create(&self, command: CreateWorkflowCommand) -> EngineResult<RemediationWorkflow> {
        if let Some(execution_id) = &command.execution_id {
            self.repos
                .executions
                .get(execution_id)
                .await?
                .ok_or_else(|| EngineError::not_found("execution", execution_id))?;
        }
        let steps = command
            .steps
            .into_iter()
            .map(build_step)
            .collect::<EngineResult<Vec<_>>>()?;

        let mut workflow = RemediationWorkflow::create(
            command.execution_id,
            command.description,
            command.created_by,
            Message::system(MANUAL_NOTE, self.settings.system_author.clone()),
        );
        for step in steps {
            workflow.add_step(step)?;
        }
        self.repos.workflows.save(&workflow).await?;
        info!("Remediation workflow {} created ({})", workflow.id(), workflow.state());
        Ok(workflow)
    }

    /// Every workflow, newest first
    pub async fn list(&self) -> EngineResult<Vec<RemediationWorkflow>> {
        Ok(self.repos.workflows.list().await?)
    }

    pub async fn get(&self, id: &EntityId) -> EngineResult<RemediationWorkflow> {
        self.repos
            .workflows
            .get(id)
            .await?
            .ok_or_else(|| EngineError::not_found("workflow", id))
    }

    pub async fn update_description(&self, id: &EntityId, description: &str) -> EngineResult<RemediationWorkflow> {
        let mut workflow = self.get(id).await?;
        workflow.update_description(description)?;
        self.repos.workflows.save(&workflow).await?;
        Ok(workflow)
    }

    pub async fn add_step(&self, id: &EntityId, command: StepCommand) -> EngineResult<Step> {
        let step = build_step(command)?;
        let mut workflow = self.get(id).await?;
        let added = workflow.add_step(step)?.clone();
        self.repos.workflows.save(&workflow).await?;
        Ok(added)
    }

    pub async fn toggle_step(&self, id: &EntityId, step_id: &EntityId) -> EngineResult<RemediationWorkflow> {
        let mut workflow = self.get(id).await?;
        workflow.toggle_step(step_id)?;
        self.repos.workflows.save(&workflow).await?;
        Ok(workflow)
    }

    pub async fn remove_step(&self, id: &EntityId, step_id: &EntityId) -> EngineResult<RemediationWorkflow> {
        let mut workflow = self.get(id).await?;
        workflow.remove_step(step_id)?;
        self.repos.workflows.save(&workflow).await?;
        Ok(workflow)
    }

    pub async fn finalize(&self, id: &EntityId) -> EngineResult<RemediationWorkflow> {
        let mut workflow = self.get(id).await?;
        workflow.finalize(self.settings.system_author.clone())?;
        self.repos.workflows.save(&workflow).await?;
        info!("Remediation workflow {} completed", workflow.id());
        Ok(workflow)
    }

    pub async fn add_message(
        &self,
        id: &EntityId,
        kind: MessageKind,
        text: &str,
        author: &str,
    ) -> EngineResult<Message> {
        let mut workflow = self.get(id).await?;
        let message = workflow.add_message(Message::new(kind, text, author)).clone();
        self.repos.workflows.save(&workflow).await?;
        Ok(message)
    }

    pub async fn add_message_with_attachments(
        &self,
        id: &EntityId,
        text: &str,
        author: &str,
        files: Vec<AttachmentUpload>,
    ) -> EngineResult<Message> {
        let mut workflow = self.get(id).await?;
        let message = workflow
            .add_message_with_attachments(text, author, files)
            .clone();
        self.repos.workflows.save(&workflow).await?;
        info!(
            "Message with {} attachment(s) added to workflow {}",
            message.attachments.len(),
            id
        );
        Ok(message)
    }

    /// Attachment bytes for download
    pub async fn attachment(&self, id: &EntityId, attachment_id: &EntityId) -> EngineResult<Attachment> {
        self.get(id)
            .await?
            .attachment(attachment_id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("attachment", attachment_id))
    }

    pub async fn delete(&self, id: &EntityId) -> EngineResult<()> {
        self.get(id).await?;
        self.repos.workflows.delete(id).await?;
        info!("Remediation workflow {} deleted", id);
        Ok(())
    }

    /// Test name, area and findings of the originating execution
    pub async fn summary(&self, id: &EntityId) -> EngineResult<WorkflowSummary> {
        let workflow = self.get(id).await?;
        let Some(execution_id) = workflow.execution_id() else {
            return Ok(WorkflowSummary::standalone());
        };
        let Some(record) = self.repos.executions.get(execution_id).await? else {
            return Ok(WorkflowSummary::standalone());
        };
        let non_conformities = record.non_conformities().unwrap_or_default().to_string();
        let Some(scope) = self.repos.scope_items.get(record.scope_item_id()).await? else {
            return Ok(WorkflowSummary {
                non_conformities,
                ..WorkflowSummary::standalone()
            });
        };
        let area = self
            .repos
            .organizations
            .get_area(scope.area_id())
            .await?
            .map(|a| a.name)
            .unwrap_or_else(|| WorkflowSummary::UNKNOWN.to_string());
        Ok(WorkflowSummary {
            test_name: scope.name().to_string(),
            area,
            non_conformities,
        })
    }
}
