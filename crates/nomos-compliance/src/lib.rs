//! Nomos Risk & Compliance Decision Engine
//!
//! Tracks internal-control test execution per organizational unit and opens
//! remediation workflows when conformity falls below what the tenant accepts.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      DECISION ENGINE (Nomos)                        │
//! │                                                                     │
//! │  test result ──► ┌──────────────────────┐                           │
//! │                  │ Execution Processor  │──► schedule entry Done    │
//! │                  └───┬──────────┬───────┘                           │
//! │                      │          │                                   │
//! │        ┌─────────────▼─┐  ┌─────▼────────────────────────┐          │
//! │        │  Risk Scorer  │  │  Matrix Store (per tenant)   │          │
//! │        │  p × i → tier │  │  compliance band → action    │          │
//! │        └───────────────┘  └─────────────┬────────────────┘          │
//! │                                         │ action needs follow-up    │
//! │                           ┌─────────────▼────────────────┐          │
//! │                           │    Remediation Workflow      │          │
//! │                           │  DRAFT → ACTIVE → COMPLETED  │          │
//! │                           └─────────────┬────────────────┘          │
//! │                                         │                           │
//! │                           ┌─────────────▼────────────────┐          │
//! │                           │    Reporting Aggregator      │          │
//! │                           └──────────────────────────────┘          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod matrix;
pub mod ports;
pub mod reporting;
pub mod risk;
pub mod settings;

use std::sync::Arc;

pub use application::{
    ExecutionProcessor, OrganizationService, Repositories, ScopeService, WorkflowService,
};
pub use infrastructure::{InMemoryStore, Snapshot};
pub use matrix::{ComplianceBand, MatrixConfigStore, MatrixDocument};
pub use reporting::{ReportFilter, ReportGenerator};
pub use risk::{RiskAssessment, RiskFactor, RiskTier};
pub use settings::EngineSettings;

/// Main Decision Engine
///
/// Wires every service over one set of repository ports.
pub struct ComplianceEngine {
    /// Institutions, directorates, areas, cost centers
    pub organizations: OrganizationService,
    /// Scope items and their schedules
    pub scopes: ScopeService,
    /// Tenant matrix documents
    pub matrix: Arc<MatrixConfigStore>,
    /// Test results and the trigger rule
    pub executions: ExecutionProcessor,
    /// Remediation workflows
    pub workflows: WorkflowService,
    /// Dashboards
    pub reports: ReportGenerator,
    /// Runtime settings
    pub settings: Arc<EngineSettings>,
}

impl ComplianceEngine {
    /// Create an engine over the given ports
    pub fn new(repos: Repositories, settings: EngineSettings) -> Self {
        let settings = Arc::new(settings);
        let matrix = Arc::new(MatrixConfigStore::new(
            repos.matrix_configs.clone(),
            repos.organizations.clone(),
        ));
        Self {
            organizations: OrganizationService::new(repos.organizations.clone()),
            scopes: ScopeService::new(repos.clone()),
            executions: ExecutionProcessor::new(repos.clone(), matrix.clone(), settings.clone()),
            workflows: WorkflowService::new(repos.clone(), settings.clone()),
            reports: ReportGenerator::new(repos, settings.clone()),
            matrix,
            settings,
        }
    }

    /// Engine over a single in-memory store
    pub fn in_memory(store: Arc<InMemoryStore>, settings: EngineSettings) -> Self {
        Self::new(Repositories::in_memory(store), settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dto::RecordExecutionCommand;
    use crate::domain::scope::tests::definition;
    use crate::domain::WorkflowState;
    use nomos_common::EntityId;

    #[tokio::test]
    async fn test_end_to_end_then_cascade_delete() {
        let store = Arc::new(InMemoryStore::new());
        let engine = ComplianceEngine::in_memory(store.clone(), EngineSettings::default());

        let inst = engine.organizations.create_institution("Cooperativa Central").await.unwrap();
        let dir = engine.organizations.create_directorate(&inst.id, "Riscos").await.unwrap();
        let area = engine.organizations.create_area(&dir.id, "Crédito").await.unwrap();
        engine
            .matrix
            .save_config(
                &inst.id,
                r##"{"complianceRanges":[{"min":0,"max":49,"label":"Crítico","color":"#ef4444"}],"maintenanceMatrix":{"Alto-Crítico":"Corretiva"}}"##,
            )
            .await
            .unwrap();

        let item = engine.scopes.create(definition(area.id.clone(), 5, 4)).await.unwrap();
        let entries = engine.scopes.generate_schedule(item.id()).await.unwrap();
        let outcome = engine
            .executions
            .record_execution(RecordExecutionCommand {
                scope_item_id: item.id().clone(),
                schedule_entry_id: entries[0].id.clone(),
                sample_size: 20,
                non_conforming: 15,
                non_conformities: Some("Limites excedidos".into()),
                fallback_action: None,
                responsible: "auditor".into(),
                tested_at: None,
            })
            .await
            .unwrap();
        let workflow = outcome.workflow.unwrap();
        assert_eq!(workflow.state(), WorkflowState::Active);

        let summary = engine.workflows.summary(workflow.id()).await.unwrap();
        assert_eq!(summary.area, "Crédito");
        assert_eq!(summary.non_conformities, "Limites excedidos");

        // Full conformity falls outside the only configured band
        let second = engine
            .executions
            .record_execution(RecordExecutionCommand {
                scope_item_id: item.id().clone(),
                schedule_entry_id: entries[1].id.clone(),
                sample_size: 20,
                non_conforming: 0,
                non_conformities: None,
                fallback_action: None,
                responsible: "auditor".into(),
                tested_at: None,
            })
            .await
            .unwrap();
        assert!(second.workflow.is_none());
        assert_eq!(store.snapshot().executions.len(), 2);

        engine.scopes.delete(item.id()).await.unwrap();

        let snapshot = store.snapshot();
        assert!(snapshot.scope_items.is_empty());
        assert!(snapshot.schedule.is_empty());
        assert!(snapshot.executions.is_empty());
        assert!(snapshot.workflows.is_empty());
        assert!(engine.scopes.get(item.id()).await.unwrap_err().is_not_found());
        assert!(engine
            .executions
            .list_executions(Some(&EntityId::from_string(item.id().as_str())))
            .await
            .unwrap()
            .is_empty());
    }
}
