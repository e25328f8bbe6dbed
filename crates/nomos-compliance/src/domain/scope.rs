//! Scope Item Aggregate
//!
//! An auditable control with a recurrence and an inherent risk assessment.

use chrono::{DateTime, Utc};
use nomos_common::EntityId;
use serde::{Deserialize, Serialize};

use crate::domain::schedule::month_from_name;
use crate::risk::{self, RiskAssessment, RiskFactor, RiskTier};

/// How often a scope item is tested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrencePeriod {
    Monthly,
    Bimonthly,
    Quarterly,
    Semiannual,
    Annual,
    None,
}

impl RecurrencePeriod {
    /// Months between occurrences; `None` for non-recurring items
    pub fn step_months(self) -> Option<u32> {
        match self {
            Self::Monthly => Some(1),
            Self::Bimonthly => Some(2),
            Self::Quarterly => Some(3),
            Self::Semiannual => Some(6),
            Self::Annual => Some(12),
            Self::None => None,
        }
    }

    /// Parse Portuguese or English period names; anything else is `None`
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "mensal" | "monthly" => Self::Monthly,
            "bimestral" | "bimonthly" => Self::Bimonthly,
            "trimestral" | "quarterly" => Self::Quarterly,
            "semestral" | "semiannual" => Self::Semiannual,
            "anual" | "annual" => Self::Annual,
            _ => Self::None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Monthly => "Mensal",
            Self::Bimonthly => "Bimestral",
            Self::Quarterly => "Trimestral",
            Self::Semiannual => "Semestral",
            Self::Annual => "Anual",
            Self::None => "Nenhuma",
        }
    }
}

/// Editable fields of a scope item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeDefinition {
    pub name: String,
    pub purpose: Option<String>,
    pub area_id: EntityId,
    pub cost_center_id: Option<EntityId>,
    pub area_tag: Option<String>,
    pub procedures: Option<String>,
    pub period: RecurrencePeriod,
    /// Month name ("Março") or number ("3"); unknown values mean January
    pub start_month: String,
    pub normative_basis: Option<String>,
    /// Grid value, 1..=5
    pub probability: u8,
    /// Grid value, 1..=5
    pub impact: u8,
}

/// Scope item aggregate root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeItem {
    id: EntityId,
    name: String,
    purpose: Option<String>,
    area_id: EntityId,
    cost_center_id: Option<EntityId>,
    area_tag: Option<String>,
    procedures: Option<String>,
    period: RecurrencePeriod,
    start_month: u32,
    normative_basis: Option<String>,
    risk: RiskAssessment,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ScopeItem {
    pub fn create(definition: ScopeDefinition) -> Self {
        let now = Utc::now();
        let mut item = Self {
            id: EntityId::new(),
            name: String::new(),
            purpose: None,
            area_id: definition.area_id.clone(),
            cost_center_id: None,
            area_tag: None,
            procedures: None,
            period: RecurrencePeriod::None,
            start_month: 1,
            normative_basis: None,
            risk: RiskAssessment::default(),
            created_at: now,
            updated_at: now,
        };
        item.apply(definition);
        item
    }

    /// Replace all editable fields, recomputing risk
    pub fn update(&mut self, definition: ScopeDefinition) {
        self.apply(definition);
        self.updated_at = Utc::now();
    }

    /// Change the risk grid position; score and tier move together
    pub fn set_risk_factors(&mut self, probability: RiskFactor, impact: RiskFactor) {
        self.risk = risk::score(probability, impact);
    }

    fn apply(&mut self, definition: ScopeDefinition) {
        self.name = definition.name;
        self.purpose = definition.purpose;
        self.area_id = definition.area_id;
        self.cost_center_id = definition.cost_center_id;
        self.area_tag = definition.area_tag;
        self.procedures = definition.procedures;
        self.period = definition.period;
        self.start_month = month_from_name(&definition.start_month).unwrap_or(1);
        self.normative_basis = definition.normative_basis;
        self.set_risk_factors(RiskFactor::new(definition.probability), RiskFactor::new(definition.impact));
    }

    // =========================================================================
    // Getters
    // =========================================================================

    pub fn id(&self) -> &EntityId { &self.id }
    pub fn name(&self) -> &str { &self.name }
    pub fn purpose(&self) -> Option<&str> { self.purpose.as_deref() }
    pub fn area_id(&self) -> &EntityId { &self.area_id }
    pub fn cost_center_id(&self) -> Option<&EntityId> { self.cost_center_id.as_ref() }
    pub fn area_tag(&self) -> Option<&str> { self.area_tag.as_deref() }
    pub fn procedures(&self) -> Option<&str> { self.procedures.as_deref() }
    pub fn period(&self) -> RecurrencePeriod { self.period }
    pub fn start_month(&self) -> u32 { self.start_month }
    pub fn normative_basis(&self) -> Option<&str> { self.normative_basis.as_deref() }
    pub fn risk(&self) -> &RiskAssessment { &self.risk }
    pub fn risk_tier(&self) -> RiskTier { self.risk.tier }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }
}
