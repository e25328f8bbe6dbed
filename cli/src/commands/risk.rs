//! Risk scoring commands

use nomos_compliance::risk::{self, RiskFactor};

use super::Session;
use crate::output::{tier_badge, OutputFormat};
use crate::RiskCommands;

pub fn handle(action: RiskCommands, session: &Session) -> Result<(), String> {
    match action {
        RiskCommands::Score { probability, impact } => {
            let factor = |value: u8, axis: &str| {
                RiskFactor::try_new(value).ok_or_else(|| {
                    format!(
                        "{} must be between {} and {}, got {}",
                        axis,
                        RiskFactor::MIN,
                        RiskFactor::MAX,
                        value
                    )
                })
            };
            let assessment = risk::score(factor(probability, "probability")?, factor(impact, "impact")?);
            match session.format {
                OutputFormat::Table => println!(
                    "{} × {} = {} ({})",
                    assessment.probability.value(),
                    assessment.impact.value(),
                    assessment.score,
                    tier_badge(assessment.tier)
                ),
                format => format.print(&assessment),
            }
        }
    }
    Ok(())
}
