//! CLI Commands

pub mod config;
pub mod dashboard;
pub mod exec;
pub mod matrix;
pub mod org;
pub mod plan;
pub mod risk;
pub mod scope;

use std::path::PathBuf;
use std::sync::Arc;

use nomos_common::EntityId;
use nomos_compliance::{ComplianceEngine, EngineSettings, InMemoryStore, Snapshot};
use tracing::debug;

use crate::config::Config;
use crate::output::OutputFormat;

/// Engine loaded from the snapshot file for one invocation
pub struct Session {
    pub engine: ComplianceEngine,
    pub format: OutputFormat,
    store: Arc<InMemoryStore>,
    snapshot_path: PathBuf,
    institution: Option<String>,
}

impl Session {
    pub fn open(
        snapshot: Option<String>,
        institution: Option<String>,
        format: Option<OutputFormat>,
        config: Config,
    ) -> Result<Self, String> {
        let snapshot_path = match snapshot {
            Some(path) => PathBuf::from(path),
            None => config.snapshot_path()?,
        };
        let settings = match &config.settings {
            Some(path) => EngineSettings::load(path).map_err(|e| format!("{}: {}", path, e))?,
            None => EngineSettings::default(),
        };
        let data = Snapshot::load(&snapshot_path).map_err(|e| e.to_string())?;
        debug!("Loaded snapshot from {}", snapshot_path.display());

        let store = Arc::new(InMemoryStore::from_snapshot(data));
        Ok(Self {
            engine: ComplianceEngine::in_memory(store.clone(), settings),
            format: format
                .or_else(|| OutputFormat::from_config(config.default_format.as_deref()))
                .unwrap_or(OutputFormat::Table),
            store,
            snapshot_path,
            institution: institution.or(config.institution_id),
        })
    }

    /// Write the store back to the snapshot file
    pub fn persist(&self) -> Result<(), String> {
        self.store
            .snapshot()
            .persist(&self.snapshot_path)
            .map_err(|e| e.to_string())
    }

    /// Institution from `--institution`, `NOMOS_INSTITUTION` or the config file
    pub fn institution(&self) -> Result<EntityId, String> {
        self.institution
            .as_deref()
            .map(EntityId::from)
            .ok_or_else(|| {
                "No institution selected (use --institution or `nomos config set institution_id <id>`)"
                    .to_string()
            })
    }
}

pub fn id(value: &str) -> EntityId {
    EntityId::from_string(value.trim())
}
