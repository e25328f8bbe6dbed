//! Test execution commands

use colored::Colorize;
use nomos_compliance::application::RecordExecutionCommand;
use nomos_compliance::domain::ExecutionRecord;
use tabled::Tabled;

use super::{id, Session};
use crate::output::{or_dash, state_badge, status_badge, tier_badge, OutputFormat};
use crate::ExecCommands;

#[derive(Tabled)]
struct ExecutionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Scope item")]
    scope_item: String,
    #[tabled(rename = "Tested at")]
    tested_at: String,
    #[tabled(rename = "Sample")]
    sample: u32,
    #[tabled(rename = "Non-conforming")]
    non_conforming: u32,
    #[tabled(rename = "%")]
    percentage: String,
    #[tabled(rename = "Action")]
    action: String,
}

impl From<&ExecutionRecord> for ExecutionRow {
    fn from(record: &ExecutionRecord) -> Self {
        Self {
            id: record.id().to_string(),
            scope_item: record.scope_item_id().to_string(),
            tested_at: record.tested_at().format("%Y-%m-%d %H:%M").to_string(),
            sample: record.conformity().sample_size,
            non_conforming: record.conformity().non_conforming,
            percentage: or_dash(record.percentage()),
            action: or_dash(record.action_taken()),
        }
    }
}

#[derive(Tabled)]
struct ScheduleRow {
    #[tabled(rename = "Entry")]
    entry: String,
    #[tabled(rename = "Directorate")]
    directorate: String,
    #[tabled(rename = "Area")]
    area: String,
    #[tabled(rename = "Scope item")]
    scope: String,
    #[tabled(rename = "Tier")]
    tier: String,
    #[tabled(rename = "Month")]
    month: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "%")]
    percentage: String,
    #[tabled(rename = "Compliance")]
    compliance: String,
}

pub async fn handle(action: ExecCommands, session: &Session) -> Result<(), String> {
    let executions = &session.engine.executions;
    match action {
        ExecCommands::Record {
            scope,
            entry,
            sample,
            non_conforming,
            findings,
            action,
            responsible,
        } => {
            let outcome = executions
                .record_execution(RecordExecutionCommand {
                    scope_item_id: id(&scope),
                    schedule_entry_id: id(&entry),
                    sample_size: sample,
                    non_conforming,
                    non_conformities: findings,
                    fallback_action: action,
                    responsible,
                    tested_at: None,
                })
                .await
                .map_err(|e| e.to_string())?;
            match session.format {
                OutputFormat::Table => {
                    let record = &outcome.record;
                    println!("Recorded execution: {}", record.id());
                    println!("Conformity: {}%", or_dash(record.percentage()));
                    println!("Action:     {}", or_dash(record.action_taken()));
                    match &outcome.workflow {
                        Some(workflow) => println!(
                            "{} {} ({})",
                            "Remediation workflow opened:".yellow(),
                            workflow.id(),
                            state_badge(workflow.state())
                        ),
                        None => println!("{}", "No remediation required".green()),
                    }
                }
                format => format.print(&outcome),
            }
        }
        ExecCommands::List { scope } => {
            let scope = scope.as_deref().map(id);
            let records = executions
                .list_executions(scope.as_ref())
                .await
                .map_err(|e| e.to_string())?;
            session
                .format
                .render(&records, |list| list.iter().map(ExecutionRow::from).collect());
        }
        ExecCommands::Show { id: execution_id } => {
            let view = executions
                .execution_view(&id(&execution_id))
                .await
                .map_err(|e| e.to_string())?;
            match session.format {
                OutputFormat::Table => {
                    let record = &view.record;
                    let conformity = record.conformity();
                    println!("ID:               {}", record.id());
                    println!("Scope item:       {}", record.scope_item_id());
                    println!("Schedule entry:   {}", or_dash(record.schedule_entry_id()));
                    println!("Tested at:        {}", record.tested_at().format("%Y-%m-%d %H:%M"));
                    println!("Responsible:      {}", record.responsible());
                    println!(
                        "Sample:           {} ({} conforming, {} non-conforming)",
                        conformity.sample_size, conformity.conforming, conformity.non_conforming
                    );
                    println!("Conformity:       {}%", or_dash(conformity.percentage));
                    println!(
                        "Compliance:       {}",
                        or_dash(view.compliance.as_ref().map(|b| b.label.as_str()))
                    );
                    println!("Non-conformities: {}", or_dash(record.non_conformities()));
                    println!("Action taken:     {}", or_dash(record.action_taken()));
                }
                format => format.print(&view),
            }
        }
        ExecCommands::Schedule => {
            let institution = session.institution()?;
            let schedule = executions
                .list_schedule(&institution)
                .await
                .map_err(|e| e.to_string())?;
            session.format.render(&schedule, |list| {
                list.iter()
                    .map(|s| ScheduleRow {
                        entry: s.entry_id.to_string(),
                        directorate: s.directorate_name.clone(),
                        area: s.area_name.clone(),
                        scope: s.scope_name.clone(),
                        tier: tier_badge(s.risk_tier).to_string(),
                        month: format!("{}/{}", s.month_name, s.year),
                        status: status_badge(s.status).to_string(),
                        percentage: or_dash(s.percentage),
                        compliance: or_dash(s.compliance.as_ref().map(|b| b.label.as_str())),
                    })
                    .collect()
            });
        }
    }
    Ok(())
}
