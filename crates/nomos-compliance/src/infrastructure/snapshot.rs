//! JSON snapshot of the whole store

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::domain::{
    Area, CostCenter, Directorate, ExecutionRecord, Institution, RemediationWorkflow,
    ScheduleEntry, ScopeItem,
};
use crate::matrix::MatrixConfig;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot io: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot format: {0}")]
    Format(#[from] serde_json::Error),
}

/// Serializable copy of every collection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub institutions: Vec<Institution>,
    pub directorates: Vec<Directorate>,
    pub areas: Vec<Area>,
    pub cost_centers: Vec<CostCenter>,
    pub scope_items: Vec<ScopeItem>,
    pub schedule: Vec<ScheduleEntry>,
    pub executions: Vec<ExecutionRecord>,
    pub workflows: Vec<RemediationWorkflow>,
    pub matrix_configs: Vec<MatrixConfig>,
}

impl Snapshot {
    /// Read a snapshot; a missing file is an empty store
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn persist(&self, path: &Path) -> Result<(), SnapshotError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        tracing::debug!("Snapshot written to {}", path.display());
        Ok(())
    }
}
