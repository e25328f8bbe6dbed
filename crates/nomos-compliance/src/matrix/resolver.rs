//! Compliance and action resolution over a parsed matrix document

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::document::MatrixDocument;
use crate::risk::RiskTier;

/// Resolved compliance band
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceBand {
    pub label: String,
    pub color: String,
}

/// Matrix key for a tier and compliance band, e.g. `"Alto-Crítico"`
pub fn maintenance_key(tier: RiskTier, band: &ComplianceBand) -> String {
    format!("{}-{}", tier.label(), band.label)
}

/// First compliance band containing the percentage, in document order
pub fn resolve_compliance(matrix: &MatrixDocument, percentage: Decimal) -> Option<ComplianceBand> {
    let pct = percentage.to_f64()?;
    matrix
        .compliance_ranges
        .iter()
        .find(|band| band.contains(pct))
        .map(|band| ComplianceBand {
            label: band.label.clone(),
            color: band.color.clone(),
        })
}

/// Prescribed action for a percentage and risk tier
pub fn resolve_action(matrix: &MatrixDocument, percentage: Decimal, tier: RiskTier) -> Option<String> {
    if matrix.maintenance_matrix.is_empty() {
        return None;
    }
    let band = resolve_compliance(matrix, percentage)?;
    let key = maintenance_key(tier, &band);
    let action = matrix.action(&key);
    tracing::debug!("Matrix lookup {} -> {:?}", key, action);
    action
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> MatrixDocument {
        MatrixDocument::parse(
            r##"{
                "complianceRanges": [
                    {"min": 0, "max": 49, "label": "Crítico", "color": "#ef4444"},
                    {"min": 50, "max": 100, "label": "Ok", "color": "#10b981"}
                ],
                "maintenanceMatrix": {"Alto-Crítico": "Corretiva", "Baixo-Ok": "Nenhuma"}
            }"##,
        )
        .unwrap()
    }

    #[test]
    fn test_inside_band() {
        let doc = MatrixDocument::builtin().unwrap();
        let band = resolve_compliance(&doc, Decimal::new(8000, 2)).unwrap();
        assert_eq!(band.label, "Bom");
        assert_eq!(band.color, "#3b82f6");
    }

    #[test]
    fn test_band_edges_inclusive() {
        let doc = MatrixDocument::builtin().unwrap();
        assert_eq!(resolve_compliance(&doc, Decimal::from(49)).unwrap().label, "Crítico");
        assert_eq!(resolve_compliance(&doc, Decimal::from(50)).unwrap().label, "Regular");
        assert_eq!(resolve_compliance(&doc, Decimal::from(100)).unwrap().label, "Excelente");
    }

    #[test]
    fn test_gap_between_bands_is_unclassified() {
        let doc = MatrixDocument::builtin().unwrap();
        // 49.5 falls between the [0,49] and [50,74] bands
        assert_eq!(resolve_compliance(&doc, Decimal::new(4950, 2)), None);
        assert_eq!(resolve_compliance(&doc, Decimal::from(101)), None);
    }

    #[test]
    fn test_first_match_wins_on_overlap() {
        let doc = MatrixDocument::parse(
            r#"{"complianceRanges": [
                {"min": 0, "max": 60, "label": "A", "color": "a"},
                {"min": 40, "max": 100, "label": "B", "color": "b"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(resolve_compliance(&doc, Decimal::from(50)).unwrap().label, "A");
    }

    #[test]
    fn test_action_lookup() {
        let doc = configured();
        assert_eq!(
            resolve_action(&doc, Decimal::from(30), RiskTier::High).as_deref(),
            Some("Corretiva")
        );
        assert_eq!(
            resolve_action(&doc, Decimal::from(90), RiskTier::Low).as_deref(),
            Some("Nenhuma")
        );
        assert_eq!(resolve_action(&doc, Decimal::from(30), RiskTier::Medium), None);
    }

    #[test]
    fn test_empty_matrix_resolves_nothing() {
        let doc = MatrixDocument::builtin().unwrap();
        assert_eq!(resolve_action(&doc, Decimal::from(10), RiskTier::High), None);
    }

    #[test]
    fn test_key_uses_tenant_labels() {
        let band = ComplianceBand { label: "Crítico".into(), color: "#ef4444".into() };
        assert_eq!(maintenance_key(RiskTier::Medium, &band), "Médio-Crítico");
    }
}
