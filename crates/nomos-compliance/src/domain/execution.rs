//! Execution records

use chrono::{DateTime, Utc};
use nomos_common::{EngineError, EntityId};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error("non-conforming count cannot exceed sample size ({non_conforming} > {sample_size})")]
    NonConformingExceedsSample { sample_size: u32, non_conforming: u32 },
}

impl From<ExecutionError> for EngineError {
    fn from(err: ExecutionError) -> Self {
        EngineError::InvalidInput(err.to_string())
    }
}

/// Sample counts and derived conformity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conformity {
    pub sample_size: u32,
    pub non_conforming: u32,
    pub conforming: u32,
    /// Unset when the sample is empty
    pub percentage: Option<Decimal>,
}

impl Conformity {
    /// Measure a sample
    ///
    /// Percentage is `conforming / sample × 100`, rounded half-up to 2 places.
    pub fn measure(sample_size: u32, non_conforming: u32) -> Result<Self, ExecutionError> {
        if non_conforming > sample_size {
            return Err(ExecutionError::NonConformingExceedsSample {
                sample_size,
                non_conforming,
            });
        }
        let conforming = sample_size - non_conforming;
        let percentage = (sample_size > 0).then(|| {
            (Decimal::from(conforming) * Decimal::from(100) / Decimal::from(sample_size))
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        });
        Ok(Self {
            sample_size,
            non_conforming,
            conforming,
            percentage,
        })
    }
}

/// One completed test run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRecord {
    id: EntityId,
    scope_item_id: EntityId,
    schedule_entry_id: Option<EntityId>,
    tested_at: DateTime<Utc>,
    responsible: String,
    conformity: Conformity,
    non_conformities: Option<String>,
    /// Snapshot taken at write time
    action_taken: Option<String>,
}

impl ExecutionRecord {
    pub fn new(
        scope_item_id: EntityId,
        schedule_entry_id: Option<EntityId>,
        responsible: impl Into<String>,
        conformity: Conformity,
        non_conformities: Option<String>,
        action_taken: Option<String>,
    ) -> Self {
        Self {
            id: EntityId::new(),
            scope_item_id,
            schedule_entry_id,
            tested_at: Utc::now(),
            responsible: responsible.into(),
            conformity,
            non_conformities,
            action_taken,
        }
    }

    /// Override the test timestamp (backfilled results)
    pub fn with_tested_at(mut self, tested_at: DateTime<Utc>) -> Self {
        self.tested_at = tested_at;
        self
    }

    pub fn id(&self) -> &EntityId { &self.id }
    pub fn scope_item_id(&self) -> &EntityId { &self.scope_item_id }
    pub fn schedule_entry_id(&self) -> Option<&EntityId> { self.schedule_entry_id.as_ref() }
    pub fn tested_at(&self) -> DateTime<Utc> { self.tested_at }
    pub fn responsible(&self) -> &str { &self.responsible }
    pub fn conformity(&self) -> &Conformity { &self.conformity }
    pub fn percentage(&self) -> Option<Decimal> { self.conformity.percentage }
    pub fn non_conformities(&self) -> Option<&str> { self.non_conformities.as_deref() }
    pub fn action_taken(&self) -> Option<&str> { self.action_taken.as_deref() }
}
