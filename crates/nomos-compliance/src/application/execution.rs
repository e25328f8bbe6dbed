//! Execution Processor
//!
//! Records a test result, resolves the prescribed action and decides whether
//! a remediation workflow has to be opened.

use nomos_common::{EngineError, EngineResult, EntityId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use super::dto::{ExecutionOutcome, ExecutionView, RecordExecutionCommand, ScheduleView};
use super::organization::{resolve_unit, OrgDirectory};
use super::Repositories;
use crate::domain::{Conformity, ExecutionRecord, Message, RemediationWorkflow, ScopeItem};
use crate::matrix::MatrixConfigStore;
use crate::settings::EngineSettings;

/// Opening text of workflows created by the trigger rule
pub fn auto_workflow_note(action: &str) -> String {
    format!(
        "Plano de ação gerado automaticamente a partir de baixa conformidade no teste executado. Ação: {}",
        action
    )
}

/// Execution processor
pub struct ExecutionProcessor {
    repos: Repositories,
    matrix: Arc<MatrixConfigStore>,
    settings: Arc<EngineSettings>,
}

impl ExecutionProcessor {
    pub fn new(
        repos: Repositories,
        matrix: Arc<MatrixConfigStore>,
        settings: Arc<EngineSettings>,
    ) -> Self {
        Self {
            repos,
            matrix,
            settings,
        }
    }

    pub async fn record_execution(&self, command: RecordExecutionCommand) -> EngineResult<ExecutionOutcome> {
        let scope = self
            .repos
            .scope_items
            .get(&command.scope_item_id)
            .await?
            .ok_or_else(|| EngineError::not_found("scope item", &command.scope_item_id))?;
        let mut entry = self
            .repos
            .schedule
            .get(&command.schedule_entry_id)
            .await?
            .ok_or_else(|| EngineError::not_found("schedule entry", &command.schedule_entry_id))?;
        if &entry.scope_item_id != scope.id() {
            return Err(EngineError::InvalidInput(
                "schedule entry belongs to another scope item".into(),
            ));
        }

        let conformity = Conformity::measure(command.sample_size, command.non_conforming)?;
        let unit = resolve_unit(self.repos.organizations.as_ref(), scope.area_id()).await?;

        let resolved = self
            .matrix
            .resolve_action(&unit.institution_id, conformity.percentage, scope.risk_tier())
            .await;
        let action = resolved.or(command.fallback_action);
        debug!(
            "Execution on {}: {:?}% -> action {:?}",
            scope.id(),
            conformity.percentage,
            action
        );

        entry.mark_done();
        self.repos.schedule.save(&entry).await?;

        let mut record = ExecutionRecord::new(
            scope.id().clone(),
            Some(entry.id.clone()),
            command.responsible,
            conformity,
            command.non_conformities,
            action,
        );
        if let Some(tested_at) = command.tested_at {
            record = record.with_tested_at(tested_at);
        }
        self.repos.executions.save(&record).await?;
        info!("Execution {} recorded for scope item {}", record.id(), scope.id());

        let workflow = self.open_workflow_if_required(&record).await?;
        Ok(ExecutionOutcome { record, workflow })
    }

    /// Trigger rule
    ///
    /// The open-workflow check and the insert are separate calls.
    async fn open_workflow_if_required(
        &self,
        record: &ExecutionRecord,
    ) -> EngineResult<Option<RemediationWorkflow>> {
        let Some(action) = record.action_taken() else {
            return Ok(None);
        };
        if !self.settings.requires_remediation(Some(action)) {
            return Ok(None);
        }

        let linked = self
            .repos
            .workflows
            .find_by_executions(std::slice::from_ref(record.id()))
            .await?;
        if linked.iter().any(RemediationWorkflow::is_open) {
            debug!("Execution {} already has an open workflow", record.id());
            return Ok(None);
        }

        let author = self.settings.system_author.clone();
        let workflow = RemediationWorkflow::create(
            Some(record.id().clone()),
            "",
            author.clone(),
            Message::system(auto_workflow_note(action), author),
        );
        self.repos.workflows.save(&workflow).await?;
        info!(
            "Remediation workflow {} opened for execution {} (action {})",
            workflow.id(),
            record.id(),
            action
        );
        Ok(Some(workflow))
    }

    /// Executions of one scope item, or all of them
    pub async fn list_executions(&self, scope_item_id: Option<&EntityId>) -> EngineResult<Vec<ExecutionRecord>> {
        Ok(match scope_item_id {
            Some(id) => self.repos.executions.find_by_scopes(std::slice::from_ref(id)).await?,
            None => self.repos.executions.list().await?,
        })
    }

    /// Execution with its compliance band resolved now
    pub async fn execution_view(&self, id: &EntityId) -> EngineResult<ExecutionView> {
        let record = self
            .repos
            .executions
            .get(id)
            .await?
            .ok_or_else(|| EngineError::not_found("execution", id))?;
        let scope = self
            .repos
            .scope_items
            .get(record.scope_item_id())
            .await?
            .ok_or_else(|| EngineError::not_found("scope item", record.scope_item_id()))?;
        let unit = resolve_unit(self.repos.organizations.as_ref(), scope.area_id()).await?;
        let compliance = self
            .matrix
            .resolve_compliance(&unit.institution_id, record.percentage())
            .await;
        Ok(ExecutionView { record, compliance })
    }

    /// Schedule of one institution with execution results joined in
    pub async fn list_schedule(&self, institution_id: &EntityId) -> EngineResult<Vec<ScheduleView>> {
        let directory = OrgDirectory::load(self.repos.organizations.as_ref(), institution_id).await?;
        let scopes = self
            .repos
            .scope_items
            .find_by_areas(&directory.area_ids(None, None))
            .await?;
        let scope_ids: Vec<EntityId> = scopes.iter().map(|s| s.id().clone()).collect();
        let by_id: HashMap<&EntityId, &ScopeItem> = scopes.iter().map(|s| (s.id(), s)).collect();

        // Records come oldest first; the latest per entry wins
        let executions = self.repos.executions.find_by_scopes(&scope_ids).await?;
        let by_entry: HashMap<&EntityId, &ExecutionRecord> = executions
            .iter()
            .filter_map(|e| e.schedule_entry_id().map(|entry| (entry, e)))
            .collect();

        let mut cache = self.matrix.cache();
        let mut views = Vec::new();
        for entry in self.repos.schedule.find_by_scopes(&scope_ids).await? {
            let Some(scope) = by_id.get(&entry.scope_item_id) else {
                continue;
            };
            let Some(unit) = directory.unit(scope.area_id()) else {
                continue;
            };
            let percentage = by_entry.get(&entry.id).and_then(|e| e.percentage());
            let compliance = cache.resolve_compliance(institution_id, percentage).await;
            views.push(ScheduleView {
                entry_id: entry.id.clone(),
                scope_item_id: entry.scope_item_id.clone(),
                scope_name: scope.name().to_string(),
                area_name: unit.area_name.clone(),
                directorate_name: unit.directorate_name.clone(),
                risk_tier: scope.risk_tier(),
                month: entry.month,
                month_name: entry.month_name().to_string(),
                year: entry.year,
                status: entry.status,
                percentage,
                compliance,
            });
        }
        Ok(views)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::scope::tests::{fixture, Fixture};
    use crate::application::ScopeService;
    use crate::domain::scope::tests::definition;
    use crate::domain::{MessageKind, ScheduleStatus, WorkflowState};
    use rust_decimal::Decimal;

    const CONFIGURED: &str = r##"{"complianceRanges":[{"min":0,"max":49,"label":"Crítico","color":"#ef4444"},{"min":50,"max":100,"label":"Ok","color":"#10b981"}],"maintenanceMatrix":{"Alto-Crítico":"Corretiva","Baixo-Crítico":"NENHUMA","Alto-Ok":"Nenhuma"}}"##;

    struct Harness {
        f: Fixture,
        matrix: Arc<MatrixConfigStore>,
        processor: ExecutionProcessor,
        scopes: ScopeService,
    }

    async fn harness() -> Harness {
        let f = fixture().await;
        let matrix = Arc::new(MatrixConfigStore::new(
            f.repos.matrix_configs.clone(),
            f.repos.organizations.clone(),
        ));
        let processor = ExecutionProcessor::new(
            f.repos.clone(),
            matrix.clone(),
            Arc::new(EngineSettings::default()),
        );
        let scopes = ScopeService::new(f.repos.clone());
        Harness {
            f,
            matrix,
            processor,
            scopes,
        }
    }

    impl Harness {
        /// High-risk item with a generated schedule; returns (item, first entry)
        async fn scheduled(&self, probability: u8, impact: u8) -> (EntityId, EntityId) {
            let item = self
                .scopes
                .create(definition(self.f.area.id.clone(), probability, impact))
                .await
                .unwrap();
            let entries = self
                .scopes
                .generate_schedule_for_year(item.id(), 2026)
                .await
                .unwrap();
            (item.id().clone(), entries[0].id.clone())
        }

        fn command(&self, scope: &EntityId, entry: &EntityId, sample: u32, nc: u32) -> RecordExecutionCommand {
            RecordExecutionCommand {
                scope_item_id: scope.clone(),
                schedule_entry_id: entry.clone(),
                sample_size: sample,
                non_conforming: nc,
                non_conformities: Some("Conciliações sem assinatura".into()),
                fallback_action: None,
                responsible: "auditor".into(),
                tested_at: None,
            }
        }
    }

    #[tokio::test]
    async fn test_seventy_failures_is_critical() {
        let h = harness().await;
        let (scope, entry) = h.scheduled(4, 5).await;
        let outcome = h.processor.record_execution(h.command(&scope, &entry, 100, 70)).await.unwrap();

        let conformity = outcome.record.conformity();
        assert_eq!(conformity.conforming, 30);
        assert_eq!(conformity.percentage, Some(Decimal::new(3000, 2)));

        let view = h.processor.execution_view(outcome.record.id()).await.unwrap();
        assert_eq!(view.compliance.unwrap().label, "Crítico");

        let stored = h.f.repos.schedule.get(&entry).await.unwrap().unwrap();
        assert_eq!(stored.status, ScheduleStatus::Done);
    }

    #[tokio::test]
    async fn test_corrective_action_opens_one_active_workflow() {
        let h = harness().await;
        h.matrix.save_config(&h.f.institution.id, CONFIGURED).await.unwrap();
        let (scope, entry) = h.scheduled(4, 5).await;

        let outcome = h.processor.record_execution(h.command(&scope, &entry, 100, 70)).await.unwrap();
        assert_eq!(outcome.record.action_taken(), Some("Corretiva"));

        let workflow = outcome.workflow.unwrap();
        assert_eq!(workflow.state(), WorkflowState::Active);
        assert_eq!(workflow.execution_id(), Some(outcome.record.id()));
        assert_eq!(workflow.created_by(), "Sistema");
        assert_eq!(workflow.messages().len(), 1);
        assert_eq!(workflow.messages()[0].kind, MessageKind::System);
        assert!(workflow.messages()[0].text.ends_with("Ação: Corretiva"));

        assert_eq!(h.f.repos.workflows.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_no_action_sentinel_never_opens_workflow() {
        let h = harness().await;
        h.matrix.save_config(&h.f.institution.id, CONFIGURED).await.unwrap();

        // Matrix says "NENHUMA" for low risk at critical compliance
        let (scope, entry) = h.scheduled(1, 1).await;
        let outcome = h.processor.record_execution(h.command(&scope, &entry, 100, 70)).await.unwrap();
        assert_eq!(outcome.record.action_taken(), Some("NENHUMA"));
        assert!(outcome.workflow.is_none());

        // Matrix says "Nenhuma" for high risk at good compliance
        let (scope, entry) = h.scheduled(5, 5).await;
        let outcome = h.processor.record_execution(h.command(&scope, &entry, 100, 0)).await.unwrap();
        assert!(outcome.workflow.is_none());
        assert!(h.f.repos.workflows.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fallback_action_used_when_matrix_silent() {
        let h = harness().await;
        let (scope, entry) = h.scheduled(3, 3).await;
        let mut cmd = h.command(&scope, &entry, 10, 5);
        cmd.fallback_action = Some("Revisão".into());

        let outcome = h.processor.record_execution(cmd).await.unwrap();
        assert_eq!(outcome.record.action_taken(), Some("Revisão"));
        assert!(outcome.workflow.is_some());
    }

    #[tokio::test]
    async fn test_empty_sample_succeeds_without_percentage() {
        let h = harness().await;
        let (scope, entry) = h.scheduled(4, 5).await;
        let outcome = h.processor.record_execution(h.command(&scope, &entry, 0, 0)).await.unwrap();
        assert_eq!(outcome.record.percentage(), None);
        assert_eq!(outcome.record.action_taken(), None);
        assert!(outcome.workflow.is_none());

        let view = h.processor.execution_view(outcome.record.id()).await.unwrap();
        assert!(view.compliance.is_none());
    }

    #[tokio::test]
    async fn test_preconditions() {
        let h = harness().await;
        let (scope, entry) = h.scheduled(4, 5).await;

        let err = h
            .processor
            .record_execution(h.command(&scope, &entry, 10, 11))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(ref m) if m.contains("cannot exceed sample size")));

        let err = h
            .processor
            .record_execution(h.command(&EntityId::new(), &entry, 10, 1))
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let err = h
            .processor
            .record_execution(h.command(&scope, &EntityId::new(), 10, 1))
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        // Nothing was written by the rejected calls
        assert!(h.processor.list_executions(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_schedule_joins_results() {
        let h = harness().await;
        let (scope, entry) = h.scheduled(4, 5).await;
        h.processor.record_execution(h.command(&scope, &entry, 100, 10)).await.unwrap();

        let views = h.processor.list_schedule(&h.f.institution.id).await.unwrap();
        assert_eq!(views.len(), 4);
        let done = views.iter().find(|v| v.entry_id == entry).unwrap();
        assert_eq!(done.status, ScheduleStatus::Done);
        assert_eq!(done.percentage, Some(Decimal::new(9000, 2)));
        assert_eq!(done.compliance.as_ref().unwrap().label, "Excelente");
        assert_eq!(done.area_name, "Tesouraria");
        assert!(views.iter().filter(|v| v.entry_id != entry).all(|v| v.percentage.is_none()));

        assert_eq!(h.processor.list_executions(Some(&scope)).await.unwrap().len(), 1);
    }
}
