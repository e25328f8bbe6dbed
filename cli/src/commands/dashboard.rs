//! Dashboard commands

use colored::Colorize;
use nomos_compliance::reporting::{MonthlyStats, UnitStats};
use nomos_compliance::ReportFilter;
use tabled::Tabled;

use super::{id, Session};
use crate::output::{tier_badge, OutputFormat};
use crate::DashboardCommands;

#[derive(Tabled)]
struct MonthRow {
    #[tabled(rename = "Month")]
    month: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Count")]
    count: usize,
}

#[derive(Tabled)]
struct UnitRow {
    #[tabled(rename = "Unit")]
    name: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Count")]
    count: usize,
}

#[derive(Tabled)]
struct CellRow {
    #[tabled(rename = "Probability")]
    probability: u8,
    #[tabled(rename = "Impact")]
    impact: u8,
    #[tabled(rename = "Tier")]
    tier: String,
    #[tabled(rename = "Executions")]
    count: usize,
}

#[derive(Tabled)]
struct PendingRow {
    #[tabled(rename = "Tier")]
    tier: String,
    #[tabled(rename = "Scope item")]
    scope: String,
    #[tabled(rename = "Area")]
    area: String,
    #[tabled(rename = "Month")]
    month: String,
    #[tabled(rename = "Entry")]
    entry: String,
}

fn filter(directorate: Option<String>, area: Option<String>) -> ReportFilter {
    ReportFilter {
        directorate_id: directorate.as_deref().map(id),
        area_id: area.as_deref().map(id),
    }
}

fn heading(title: &str) {
    println!("\n{}", title.bold());
}

fn months(stats: &[MonthlyStats]) {
    OutputFormat::Table.render(&stats, |list| {
        list.iter()
            .map(|m| MonthRow {
                month: format!("{}/{}", m.month, m.year),
                value: m.value.to_string(),
                count: m.count,
            })
            .collect()
    });
}

fn units(stats: &[UnitStats]) {
    OutputFormat::Table.render(&stats, |list| {
        list.iter()
            .map(|u| UnitRow {
                name: u.name.clone(),
                value: u.value.to_string(),
                count: u.count,
            })
            .collect()
    });
}

pub async fn handle(action: DashboardCommands, session: &Session) -> Result<(), String> {
    let institution = session.institution()?;
    let reports = &session.engine.reports;
    match action {
        DashboardCommands::Compliance { directorate, area } => {
            let dashboard = reports
                .compliance_dashboard(&institution, &filter(directorate, area))
                .await
                .map_err(|e| e.to_string())?;
            let OutputFormat::Table = session.format else {
                session.format.print(&dashboard);
                return Ok(());
            };
            println!(
                "Average conformity: {}% over {} execution(s)",
                dashboard.average_percentage.to_string().bold(),
                dashboard.executions
            );
            heading("By month");
            months(&dashboard.monthly);
            heading("By area");
            units(&dashboard.by_area);
            heading("By directorate");
            units(&dashboard.by_directorate);
            heading("Risk matrix");
            OutputFormat::Table.render(&dashboard.risk_matrix, |cells| {
                cells
                    .iter()
                    .map(|c| CellRow {
                        probability: c.probability,
                        impact: c.impact,
                        tier: tier_badge(c.tier).to_string(),
                        count: c.count,
                    })
                    .collect()
            });
        }
        DashboardCommands::Workflows { directorate, area } => {
            let overview = reports
                .workflow_overview(&institution, &filter(directorate, area))
                .await
                .map_err(|e| e.to_string())?;
            let OutputFormat::Table = session.format else {
                session.format.print(&overview);
                return Ok(());
            };
            println!(
                "Workflows: {} total, {} active, {}% completed",
                overview.total,
                overview.active,
                overview.completion_rate.to_string().bold()
            );
            heading("Opened by month");
            months(&overview.monthly);
            heading("By area");
            units(&overview.by_area);
            heading("By directorate");
            units(&overview.by_directorate);
        }
        DashboardCommands::Home => {
            let home = reports.home_summary(&institution).await.map_err(|e| e.to_string())?;
            let OutputFormat::Table = session.format else {
                session.format.print(&home);
                return Ok(());
            };
            println!(
                "Tests:     {} planned, {} done, {} pending",
                home.planned,
                home.done.to_string().green(),
                home.pending.to_string().yellow()
            );
            println!("Average:   {}%", home.average_percentage);
            println!(
                "Workflows: {} draft, {} active, {} completed",
                home.draft_workflows, home.active_workflows, home.completed_workflows
            );
            heading("Pending tests");
            OutputFormat::Table.render(&home.pending_tests, |pending| {
                pending
                    .iter()
                    .map(|p| PendingRow {
                        tier: tier_badge(p.risk_tier).to_string(),
                        scope: p.scope_name.clone(),
                        area: format!("{} / {}", p.directorate_name, p.area_name),
                        month: format!("{}/{}", p.month_name, p.year),
                        entry: p.entry_id.to_string(),
                    })
                    .collect()
            });
        }
    }
    Ok(())
}
