//! Output formatting

use clap::ValueEnum;
use colored::{ColoredString, Colorize};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use nomos_compliance::domain::{ScheduleStatus, WorkflowState};
use nomos_compliance::RiskTier;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}

impl OutputFormat {
    /// Format named in the config file, if it is a known one
    pub fn from_config(value: Option<&str>) -> Option<Self> {
        value.and_then(|v| <Self as ValueEnum>::from_str(v, true).ok())
    }

    pub fn print<T: Serialize>(&self, data: &T) {
        match self {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(data).unwrap_or_default());
            }
            OutputFormat::Yaml => {
                println!("{}", serde_yaml::to_string(data).unwrap_or_default());
            }
            OutputFormat::Table => {
                println!("{}", serde_json::to_string_pretty(data).unwrap_or_default());
            }
        }
    }

    /// Print `data` as JSON/YAML, or the rows built from it as a table
    pub fn render<T, R, F>(&self, data: &T, rows: F)
    where
        T: Serialize,
        R: Tabled,
        F: FnOnce(&T) -> Vec<R>,
    {
        match self {
            OutputFormat::Table => {
                let rows = rows(data);
                if rows.is_empty() {
                    println!("{}", "(none)".dimmed());
                    return;
                }
                let mut table = Table::new(rows);
                table.with(Style::rounded());
                println!("{}", table);
            }
            _ => self.print(data),
        }
    }
}

pub fn tier_badge(tier: RiskTier) -> ColoredString {
    match tier {
        RiskTier::High => tier.label().red().bold(),
        RiskTier::Medium => tier.label().yellow(),
        RiskTier::Low => tier.label().green(),
    }
}

pub fn state_badge(state: WorkflowState) -> ColoredString {
    match state {
        WorkflowState::Draft => state.code().dimmed(),
        WorkflowState::Active => state.code().yellow(),
        WorkflowState::Completed => state.code().green(),
    }
}

pub fn status_badge(status: ScheduleStatus) -> ColoredString {
    match status {
        ScheduleStatus::Planned => status.label().normal(),
        ScheduleStatus::Done => status.label().green(),
    }
}

/// Cell text for an optional value
pub fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".into())
}
