//! Remediation workflow commands

use std::path::Path;

use colored::Colorize;
use nomos_compliance::application::{CreateWorkflowCommand, StepCommand};
use nomos_compliance::domain::{AttachmentUpload, MessageKind, RemediationWorkflow};
use tabled::Tabled;

use super::{id, Session};
use crate::output::{or_dash, state_badge, OutputFormat};
use crate::PlanCommands;

#[derive(Tabled)]
struct WorkflowRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Execution")]
    execution: String,
    #[tabled(rename = "Steps")]
    steps: String,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&RemediationWorkflow> for WorkflowRow {
    fn from(workflow: &RemediationWorkflow) -> Self {
        let done = workflow.steps().iter().filter(|s| s.done).count();
        Self {
            id: workflow.id().to_string(),
            state: state_badge(workflow.state()).to_string(),
            execution: or_dash(workflow.execution_id()),
            steps: format!("{}/{}", done, workflow.steps().len()),
            created: workflow.created_at().format("%Y-%m-%d").to_string(),
            description: workflow.description().to_string(),
        }
    }
}

/// `description|responsible|YYYY-MM-DD`, trailing parts optional
fn parse_step(value: &str) -> StepCommand {
    let mut parts = value.splitn(3, '|').map(str::trim);
    let description = parts.next().unwrap_or_default().to_string();
    let responsible = parts.next().filter(|r| !r.is_empty()).map(String::from);
    let due_date = parts.next().filter(|d| !d.is_empty()).map(String::from);
    StepCommand {
        description,
        responsible,
        due_date,
    }
}

fn content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "txt" | "log" => "text/plain",
        "csv" => "text/csv",
        "json" => "application/json",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

fn read_upload(file: &str) -> Result<AttachmentUpload, String> {
    let path = Path::new(file);
    let data = std::fs::read(path).map_err(|e| format!("{}: {}", file, e))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(file)
        .to_string();
    Ok(AttachmentUpload {
        file_name,
        content_type: content_type(path).to_string(),
        data,
    })
}

async fn show(session: &Session, workflow: &RemediationWorkflow) -> Result<(), String> {
    if !matches!(session.format, OutputFormat::Table) {
        session.format.print(workflow);
        return Ok(());
    }
    let summary = session
        .engine
        .workflows
        .summary(workflow.id())
        .await
        .map_err(|e| e.to_string())?;

    println!("{} {}", workflow.id().to_string().bold(), state_badge(workflow.state()));
    println!("Test:             {}", summary.test_name);
    println!("Area:             {}", summary.area);
    println!("Non-conformities: {}", summary.non_conformities);
    println!("Created by:       {}", workflow.created_by());
    println!("Description:      {}", workflow.description());
    if let Some(completed_at) = workflow.completed_at() {
        println!("Completed at:     {}", completed_at.format("%Y-%m-%d %H:%M"));
    }

    println!("\nSteps:");
    for step in workflow.steps() {
        let mark = if step.done { "[x]".green() } else { "[ ]".normal() };
        println!(
            "  {} {} ({}, due {}) {}",
            mark,
            step.description,
            or_dash(step.responsible.as_deref()),
            or_dash(step.due_date),
            step.id.to_string().dimmed()
        );
    }

    println!("\nMessages:");
    for message in workflow.messages() {
        let author = match message.kind {
            MessageKind::System => message.author.cyan(),
            MessageKind::User => message.author.normal(),
        };
        println!(
            "  {} {}: {}",
            message.sent_at.format("%Y-%m-%d %H:%M").to_string().dimmed(),
            author,
            message.text
        );
        for attachment in &message.attachments {
            println!(
                "      📎 {} ({}, {} bytes) {}",
                attachment.file_name,
                attachment.content_type,
                attachment.size,
                attachment.id.to_string().dimmed()
            );
        }
    }
    Ok(())
}

pub async fn handle(action: PlanCommands, session: &Session) -> Result<(), String> {
    let workflows = &session.engine.workflows;
    match action {
        PlanCommands::Create {
            execution,
            description,
            by,
            steps,
        } => {
            let workflow = workflows
                .create(CreateWorkflowCommand {
                    execution_id: execution.as_deref().map(id),
                    description,
                    created_by: by,
                    steps: steps.iter().map(|s| parse_step(s)).collect(),
                })
                .await
                .map_err(|e| e.to_string())?;
            println!("Created workflow: {} ({})", workflow.id(), state_badge(workflow.state()));
        }
        PlanCommands::List => {
            let list = workflows.list().await.map_err(|e| e.to_string())?;
            session
                .format
                .render(&list, |list| list.iter().map(WorkflowRow::from).collect());
        }
        PlanCommands::Show { id: workflow_id } => {
            let workflow = workflows.get(&id(&workflow_id)).await.map_err(|e| e.to_string())?;
            show(session, &workflow).await?;
        }
        PlanCommands::Describe { id: workflow_id, text } => {
            let workflow = workflows
                .update_description(&id(&workflow_id), &text)
                .await
                .map_err(|e| e.to_string())?;
            println!("Workflow {} is {}", workflow.id(), state_badge(workflow.state()));
        }
        PlanCommands::StepAdd {
            id: workflow_id,
            description,
            responsible,
            due,
        } => {
            let step = workflows
                .add_step(
                    &id(&workflow_id),
                    StepCommand {
                        description,
                        responsible,
                        due_date: due,
                    },
                )
                .await
                .map_err(|e| e.to_string())?;
            println!("Added step: {}", step.id);
        }
        PlanCommands::StepToggle { id: workflow_id, step } => {
            let workflow = workflows
                .toggle_step(&id(&workflow_id), &id(&step))
                .await
                .map_err(|e| e.to_string())?;
            let done = workflow
                .steps()
                .iter()
                .find(|s| s.id.as_str() == step.trim())
                .map(|s| s.done)
                .unwrap_or_default();
            println!("Step {} {}", step, if done { "done".green() } else { "reopened".yellow() });
        }
        PlanCommands::StepRemove { id: workflow_id, step } => {
            workflows
                .remove_step(&id(&workflow_id), &id(&step))
                .await
                .map_err(|e| e.to_string())?;
            println!("Removed step: {}", step);
        }
        PlanCommands::Message {
            id: workflow_id,
            text,
            author,
            attachments,
        } => {
            let workflow_id = id(&workflow_id);
            let message = if attachments.is_empty() {
                workflows
                    .add_message(&workflow_id, MessageKind::User, &text, &author)
                    .await
            } else {
                let files = attachments
                    .iter()
                    .map(|f| read_upload(f))
                    .collect::<Result<Vec<_>, _>>()?;
                workflows
                    .add_message_with_attachments(&workflow_id, &text, &author, files)
                    .await
            }
            .map_err(|e| e.to_string())?;
            println!(
                "Posted message: {} ({} attachment(s))",
                message.id,
                message.attachments.len()
            );
        }
        PlanCommands::Download {
            id: workflow_id,
            attachment,
            output,
        } => {
            let attachment = workflows
                .attachment(&id(&workflow_id), &id(&attachment))
                .await
                .map_err(|e| e.to_string())?;
            std::fs::write(&output, &attachment.data).map_err(|e| format!("{}: {}", output, e))?;
            println!("Saved {} ({} bytes) to {}", attachment.file_name, attachment.size, output);
        }
        PlanCommands::Finalize { id: workflow_id } => {
            let workflow = workflows.finalize(&id(&workflow_id)).await.map_err(|e| e.to_string())?;
            println!("Workflow {} is {}", workflow.id(), state_badge(workflow.state()));
        }
        PlanCommands::Delete { id: workflow_id } => {
            workflows.delete(&id(&workflow_id)).await.map_err(|e| e.to_string())?;
            println!("Deleted workflow: {}", workflow_id);
        }
    }
    Ok(())
}
