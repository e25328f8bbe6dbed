//! Matrix configuration commands

use colored::Colorize;
use nomos_compliance::{MatrixDocument, RiskTier};
use serde::Serialize;

use super::Session;
use crate::output::{or_dash, OutputFormat};
use crate::MatrixCommands;

#[derive(Serialize)]
struct Resolution {
    tier: RiskTier,
    compliance: Option<String>,
    action: Option<String>,
}

pub async fn handle(action: MatrixCommands, session: &Session) -> Result<(), String> {
    let institution = session.institution()?;
    let matrix = &session.engine.matrix;
    match action {
        MatrixCommands::Show => {
            let document = matrix.load_matrix(&institution).await.map_err(|e| e.to_string())?;
            match session.format {
                OutputFormat::Table => println!(
                    "{}",
                    serde_json::to_string_pretty(&document).map_err(|e| e.to_string())?
                ),
                format => format.print(&document),
            }
        }
        MatrixCommands::Set { file } => {
            let raw = std::fs::read_to_string(&file).map_err(|e| format!("{}: {}", file, e))?;
            MatrixDocument::parse(&raw).map_err(|e| format!("{}: {}", file, e))?;
            matrix
                .save_config(&institution, raw)
                .await
                .map_err(|e| e.to_string())?;
            println!("Matrix configuration saved for {}", institution);
        }
        MatrixCommands::Resolve { percentage, tier } => {
            let tier = RiskTier::parse(&tier).ok_or_else(|| format!("Unknown risk tier: {}", tier))?;
            let band = matrix.resolve_compliance(&institution, Some(percentage)).await;
            let action = matrix.resolve_action(&institution, Some(percentage), tier).await;
            let resolution = Resolution {
                tier,
                compliance: band.map(|b| b.label),
                action,
            };
            match session.format {
                OutputFormat::Table => {
                    println!("Compliance: {}", or_dash(resolution.compliance.as_deref()).bold());
                    println!("Action:     {}", or_dash(resolution.action.as_deref()));
                }
                format => format.print(&resolution),
            }
        }
    }
    Ok(())
}
