//! Matrix configuration document
//!
//! Wire format (kept stable for existing tenants):
//!
//! ```json
//! {
//!   "riskDimensions":   [{"id": "1", "name": "Impacto"}],
//!   "riskRanges":       [{"min": 1, "max": 5, "label": "Baixo", "color": "#10b981"}],
//!   "complianceRanges": [{"min": 0, "max": 49, "label": "Crítico", "color": "#ef4444"}],
//!   "maintenanceMatrix": {"Alto-Crítico": "Corretiva"},
//!   "notificationThresholdId": "c3"
//! }
//! ```
//!
//! Unknown keys are ignored on parse; the raw document is what gets stored.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Built-in document used when a tenant has none stored
pub const DEFAULT_DOCUMENT: &str = r##"{"empresaId":"global","riskDimensions":[{"id":"1","name":"Impacto"},{"id":"2","name":"Probabilidade"}],"riskRanges":[{"id":"1","min":1,"max":5,"label":"Baixo","color":"#10b981"},{"id":"2","min":6,"max":15,"label":"Médio","color":"#f59e0b"},{"id":"3","min":16,"max":25,"label":"Alto","color":"#ef4444"}],"complianceRanges":[{"id":"c1","min":0,"max":49,"label":"Crítico","color":"#ef4444"},{"id":"c2","min":50,"max":74,"label":"Regular","color":"#f59e0b"},{"id":"c3","min":75,"max":89,"label":"Bom","color":"#3b82f6"},{"id":"c4","min":90,"max":100,"label":"Excelente","color":"#10b981"}],"notificationThresholdId":"c3","maintenanceMatrix":{}}"##;

/// Matrix document errors
#[derive(Debug, Error)]
pub enum MatrixError {
    #[error("malformed matrix document: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Parsed matrix document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixDocument {
    #[serde(default)]
    pub risk_dimensions: Vec<RiskDimension>,
    #[serde(default)]
    pub risk_ranges: Vec<Band>,
    #[serde(default)]
    pub compliance_ranges: Vec<Band>,
    #[serde(default)]
    pub maintenance_matrix: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub notification_threshold_id: Option<String>,
}

impl MatrixDocument {
    /// Parse raw document text
    pub fn parse(raw: &str) -> Result<Self, MatrixError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Parsed built-in document
    pub fn builtin() -> Result<Self, MatrixError> {
        Self::parse(DEFAULT_DOCUMENT)
    }

    /// Action text stored under a matrix key
    ///
    /// Null entries count as absent; non-string values are rendered as text.
    pub fn action(&self, key: &str) -> Option<String> {
        match self.maintenance_matrix.get(key)? {
            serde_json::Value::Null => None,
            serde_json::Value::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Compliance band flagged as the notification threshold
    pub fn notification_threshold(&self) -> Option<&Band> {
        let id = self.notification_threshold_id.as_deref()?;
        self.compliance_ranges
            .iter()
            .find(|band| band.id.as_deref() == Some(id))
    }
}

/// Named axis of the risk grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskDimension {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
}

/// Inclusive numeric range with a label and display color
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Band {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub min: f64,
    pub max: f64,
    pub label: String,
    pub color: String,
}

impl Band {
    /// Whether `value` lies within min..=max
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}
