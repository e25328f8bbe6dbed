//! Compliance Reporting
//!
//! Tenant-scoped dashboards over execution and workflow history.

use chrono::Datelike;
use nomos_common::{EngineResult, EntityId};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::application::{OrgDirectory, Repositories};
use crate::domain::{
    month_name, ExecutionRecord, OrgUnit, RemediationWorkflow, ScheduleStatus, ScopeItem,
    WorkflowState,
};
use crate::risk::{self, RiskFactor, RiskTier};
use crate::settings::EngineSettings;

fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Sum of the present values divided by `count`
fn average_over<I>(values: I, count: usize) -> Decimal
where
    I: IntoIterator<Item = Option<Decimal>>,
{
    if count == 0 {
        return Decimal::ZERO;
    }
    let sum: Decimal = values.into_iter().flatten().sum();
    round2(sum / Decimal::from(count as u64))
}

fn rate(completed: usize, total: usize) -> Decimal {
    if total == 0 {
        return Decimal::ZERO;
    }
    round2(Decimal::from(completed as u64) * Decimal::from(100) / Decimal::from(total as u64))
}

/// Optional unit filters; both unset means the whole institution
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportFilter {
    pub directorate_id: Option<EntityId>,
    pub area_id: Option<EntityId>,
}

/// Compliance dashboard
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComplianceDashboard {
    pub average_percentage: Decimal,
    pub executions: usize,
    pub monthly: Vec<MonthlyStats>,
    pub by_area: Vec<UnitStats>,
    pub by_directorate: Vec<UnitStats>,
    pub risk_matrix: Vec<RiskMatrixCell>,
}

/// One month of a series; `value` is an average or a completion rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyStats {
    pub month: String,
    pub month_number: u32,
    pub year: i32,
    pub value: Decimal,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitStats {
    pub name: String,
    pub value: Decimal,
    pub count: usize,
}

/// Heatmap cell for one probability × impact pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskMatrixCell {
    pub probability: u8,
    pub impact: u8,
    pub count: usize,
    pub tier: RiskTier,
}

/// Workflow dashboard
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowOverview {
    pub total: usize,
    pub completion_rate: Decimal,
    pub active: usize,
    pub monthly: Vec<MonthlyStats>,
    pub by_area: Vec<UnitStats>,
    pub by_directorate: Vec<UnitStats>,
}

/// Landing page summary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HomeSummary {
    pub planned: usize,
    pub done: usize,
    pub pending: usize,
    pub average_percentage: Decimal,
    pub draft_workflows: usize,
    pub active_workflows: usize,
    pub completed_workflows: usize,
    pub pending_tests: Vec<PendingTest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingTest {
    pub entry_id: EntityId,
    pub scope_item_id: EntityId,
    pub scope_name: String,
    pub area_name: String,
    pub directorate_name: String,
    pub month: u32,
    pub month_name: String,
    pub year: i32,
    pub risk_tier: RiskTier,
}

/// Executions (or workflows) with their scope item and unit resolved
struct Scoped<'a, T> {
    item: &'a T,
    scope: &'a ScopeItem,
    unit: &'a OrgUnit,
}

/// Tenant data loaded once per report
struct TenantView {
    directory: OrgDirectory,
    scopes: HashMap<EntityId, ScopeItem>,
}

impl TenantView {
    fn scope_ids(&self) -> Vec<EntityId> {
        self.scopes.keys().cloned().collect()
    }

    fn resolve<'a>(&'a self, record: &'a ExecutionRecord) -> Option<Scoped<'a, ExecutionRecord>> {
        let scope = self.scopes.get(record.scope_item_id())?;
        let unit = self.directory.unit(scope.area_id())?;
        Some(Scoped { item: record, scope, unit })
    }
}

fn group_units<'a, T, F>(rows: &[Scoped<'a, T>], key: impl Fn(&OrgUnit) -> &str, value: F) -> Vec<UnitStats>
where
    F: Fn(&[&Scoped<'a, T>]) -> Decimal,
{
    let mut groups: BTreeMap<&str, Vec<&Scoped<'a, T>>> = BTreeMap::new();
    for row in rows {
        groups.entry(key(row.unit)).or_default().push(row);
    }
    groups
        .into_iter()
        .map(|(name, rows)| UnitStats {
            name: name.to_string(),
            value: value(&rows),
            count: rows.len(),
        })
        .collect()
}

fn group_months<T, F>(rows: &[T], date: impl Fn(&T) -> (i32, u32), value: F) -> Vec<MonthlyStats>
where
    F: Fn(&[&T]) -> Decimal,
{
    let mut groups: BTreeMap<(i32, u32), Vec<&T>> = BTreeMap::new();
    for row in rows {
        groups.entry(date(row)).or_default().push(row);
    }
    groups
        .into_iter()
        .map(|((year, month), rows)| MonthlyStats {
            month: month_name(month).to_string(),
            month_number: month,
            year,
            value: value(&rows),
            count: rows.len(),
        })
        .collect()
}

fn percentages_average<T>(rows: &[&Scoped<'_, T>], percentage: impl Fn(&T) -> Option<Decimal>) -> Decimal {
    average_over(rows.iter().map(|r| percentage(r.item)), rows.len())
}

fn completion<T>(rows: &[&Scoped<'_, T>], state: impl Fn(&T) -> WorkflowState) -> Decimal {
    let completed = rows
        .iter()
        .filter(|r| state(r.item) == WorkflowState::Completed)
        .count();
    rate(completed, rows.len())
}

/// Report generator
pub struct ReportGenerator {
    repos: Repositories,
    settings: Arc<EngineSettings>,
}

impl ReportGenerator {
    pub fn new(repos: Repositories, settings: Arc<EngineSettings>) -> Self {
        Self { repos, settings }
    }

    async fn tenant(&self, institution_id: &EntityId, filter: &ReportFilter) -> EngineResult<TenantView> {
        let directory = OrgDirectory::load(self.repos.organizations.as_ref(), institution_id).await?;
        let area_ids = directory.area_ids(filter.directorate_id.as_ref(), filter.area_id.as_ref());
        let scopes = self
            .repos
            .scope_items
            .find_by_areas(&area_ids)
            .await?
            .into_iter()
            .map(|s| (s.id().clone(), s))
            .collect();
        Ok(TenantView { directory, scopes })
    }

    /// Compliance statistics over the tenant's executions
    pub async fn compliance_dashboard(
        &self,
        institution_id: &EntityId,
        filter: &ReportFilter,
    ) -> EngineResult<ComplianceDashboard> {
        let tenant = self.tenant(institution_id, filter).await?;
        let records = self.repos.executions.find_by_scopes(&tenant.scope_ids()).await?;
        let rows: Vec<_> = records.iter().filter_map(|r| tenant.resolve(r)).collect();
        if rows.is_empty() {
            return Ok(ComplianceDashboard::default());
        }

        let average_percentage = average_over(rows.iter().map(|r| r.item.percentage()), rows.len());
        let monthly = group_months(
            &rows,
            |r| (r.item.tested_at().year(), r.item.tested_at().month()),
            |group| average_over(group.iter().map(|r| r.item.percentage()), group.len()),
        );
        let by_area = group_units(&rows, |u| u.area_name.as_str(), |g| {
            percentages_average(g, ExecutionRecord::percentage)
        });
        let by_directorate = group_units(&rows, |u| u.directorate_name.as_str(), |g| {
            percentages_average(g, ExecutionRecord::percentage)
        });

        let mut cells: BTreeMap<(u8, u8), usize> = BTreeMap::new();
        for row in &rows {
            let risk = row.scope.risk();
            *cells
                .entry((risk.probability.value(), risk.impact.value()))
                .or_default() += 1;
        }
        let risk_matrix = cells
            .into_iter()
            .map(|((probability, impact), count)| RiskMatrixCell {
                probability,
                impact,
                count,
                tier: risk::score(RiskFactor::new(probability), RiskFactor::new(impact)).tier,
            })
            .collect();

        Ok(ComplianceDashboard {
            average_percentage,
            executions: rows.len(),
            monthly,
            by_area,
            by_directorate,
            risk_matrix,
        })
    }

    /// Workflow statistics; standalone workflows carry no unit and are left out
    pub async fn workflow_overview(
        &self,
        institution_id: &EntityId,
        filter: &ReportFilter,
    ) -> EngineResult<WorkflowOverview> {
        let tenant = self.tenant(institution_id, filter).await?;
        let records = self.repos.executions.find_by_scopes(&tenant.scope_ids()).await?;
        let by_execution: HashMap<&EntityId, &ExecutionRecord> =
            records.iter().map(|r| (r.id(), r)).collect();
        let execution_ids: Vec<EntityId> = records.iter().map(|r| r.id().clone()).collect();
        let workflows = self.repos.workflows.find_by_executions(&execution_ids).await?;

        let rows: Vec<Scoped<'_, RemediationWorkflow>> = workflows
            .iter()
            .filter_map(|w| {
                let record = *by_execution.get(w.execution_id()?)?;
                let scoped = tenant.resolve(record)?;
                Some(Scoped {
                    item: w,
                    scope: scoped.scope,
                    unit: scoped.unit,
                })
            })
            .collect();
        if rows.is_empty() {
            return Ok(WorkflowOverview::default());
        }

        let total = rows.len();
        let completed = rows
            .iter()
            .filter(|r| r.item.state() == WorkflowState::Completed)
            .count();
        let monthly = group_months(
            &rows,
            |r| (r.item.created_at().year(), r.item.created_at().month()),
            |group| {
                let done = group
                    .iter()
                    .filter(|r| r.item.state() == WorkflowState::Completed)
                    .count();
                rate(done, group.len())
            },
        );
        let by_area = group_units(&rows, |u| u.area_name.as_str(), |g| completion(g, RemediationWorkflow::state));
        let by_directorate = group_units(&rows, |u| u.directorate_name.as_str(), |g| {
            completion(g, RemediationWorkflow::state)
        });

        Ok(WorkflowOverview {
            total,
            completion_rate: rate(completed, total),
            active: total - completed,
            monthly,
            by_area,
            by_directorate,
        })
    }

    /// Planned/done counts, averages and the riskiest pending tests
    pub async fn home_summary(&self, institution_id: &EntityId) -> EngineResult<HomeSummary> {
        let tenant = self.tenant(institution_id, &ReportFilter::default()).await?;
        let scope_ids = tenant.scope_ids();
        let entries = self.repos.schedule.find_by_scopes(&scope_ids).await?;
        let records = self.repos.executions.find_by_scopes(&scope_ids).await?;
        let execution_ids: Vec<EntityId> = records.iter().map(|r| r.id().clone()).collect();
        let workflows = self.repos.workflows.find_by_executions(&execution_ids).await?;

        let present: Vec<Decimal> = records.iter().filter_map(ExecutionRecord::percentage).collect();
        let average_percentage = average_over(present.iter().copied().map(Some), present.len());
        let count_state = |state: WorkflowState| workflows.iter().filter(|w| w.state() == state).count();

        let mut pending: Vec<_> = entries
            .iter()
            .filter(|e| e.status == ScheduleStatus::Planned)
            .filter_map(|e| {
                let scope = tenant.scopes.get(&e.scope_item_id)?;
                let unit = tenant.directory.unit(scope.area_id())?;
                Some(PendingTest {
                    entry_id: e.id.clone(),
                    scope_item_id: scope.id().clone(),
                    scope_name: scope.name().to_string(),
                    area_name: unit.area_name.clone(),
                    directorate_name: unit.directorate_name.clone(),
                    month: e.month,
                    month_name: e.month_name().to_string(),
                    year: e.year,
                    risk_tier: scope.risk_tier(),
                })
            })
            .collect();
        pending.sort_by_key(|p| Reverse(p.risk_tier));
        pending.truncate(self.settings.pending_test_limit);

        let done = entries.iter().filter(|e| e.status == ScheduleStatus::Done).count();
        Ok(HomeSummary {
            planned: entries.len(),
            done,
            pending: entries.len() - done,
            average_percentage,
            draft_workflows: count_state(WorkflowState::Draft),
            active_workflows: count_state(WorkflowState::Active),
            completed_workflows: count_state(WorkflowState::Completed),
            pending_tests: pending,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dto::RecordExecutionCommand;
    use crate::application::scope::tests::{fixture, Fixture};
    use crate::application::{ExecutionProcessor, OrganizationService, ScopeService, WorkflowService};
    use crate::application::dto::CreateWorkflowCommand;
    use crate::domain::scope::tests::definition;
    use crate::matrix::MatrixConfigStore;

    struct Env {
        f: Fixture,
        scopes: ScopeService,
        processor: ExecutionProcessor,
        workflows: WorkflowService,
        reports: ReportGenerator,
    }

    async fn env() -> Env {
        let f = fixture().await;
        let settings = Arc::new(EngineSettings::default());
        let matrix = Arc::new(MatrixConfigStore::new(
            f.repos.matrix_configs.clone(),
            f.repos.organizations.clone(),
        ));
        Env {
            scopes: ScopeService::new(f.repos.clone()),
            processor: ExecutionProcessor::new(f.repos.clone(), matrix, settings.clone()),
            workflows: WorkflowService::new(f.repos.clone(), settings.clone()),
            reports: ReportGenerator::new(f.repos.clone(), settings),
            f,
        }
    }

    impl Env {
        /// Create an item in `area`, schedule it and record one result per sample
        async fn run(&self, area: &EntityId, p: u8, i: u8, results: &[(u32, u32)]) -> Vec<ExecutionRecord> {
            let item = self.scopes.create(definition(area.clone(), p, i)).await.unwrap();
            let entries = self.scopes.generate_schedule_for_year(item.id(), 2026).await.unwrap();
            let mut out = Vec::new();
            for (entry, (sample, nc)) in entries.iter().zip(results) {
                let outcome = self
                    .processor
                    .record_execution(RecordExecutionCommand {
                        scope_item_id: item.id().clone(),
                        schedule_entry_id: entry.id.clone(),
                        sample_size: *sample,
                        non_conforming: *nc,
                        non_conformities: None,
                        fallback_action: Some("Corretiva".into()),
                        responsible: "auditor".into(),
                        tested_at: None,
                    })
                    .await
                    .unwrap();
                out.push(outcome.record);
            }
            out
        }
    }

    #[tokio::test]
    async fn test_empty_dashboards_are_zeroed() {
        let e = env().await;
        let id = &e.f.institution.id;
        let compliance = e.reports.compliance_dashboard(id, &ReportFilter::default()).await.unwrap();
        assert_eq!(compliance.average_percentage, Decimal::ZERO);
        assert_eq!(compliance.executions, 0);
        assert!(compliance.monthly.is_empty() && compliance.risk_matrix.is_empty());

        let overview = e.reports.workflow_overview(id, &ReportFilter::default()).await.unwrap();
        assert_eq!(overview.total, 0);
        assert_eq!(overview.completion_rate, Decimal::ZERO);

        let home = e.reports.home_summary(id).await.unwrap();
        assert_eq!(home.planned, 0);
        assert_eq!(home.average_percentage, Decimal::ZERO);
        assert!(home.pending_tests.is_empty());
    }

    #[tokio::test]
    async fn test_average_divides_by_all_executions() {
        let e = env().await;
        // 90%, 60% and an empty sample
        e.run(&e.f.area.id, 4, 5, &[(10, 1), (10, 4), (0, 0)]).await;

        let dash = e
            .reports
            .compliance_dashboard(&e.f.institution.id, &ReportFilter::default())
            .await
            .unwrap();
        assert_eq!(dash.executions, 3);
        assert_eq!(dash.average_percentage, Decimal::new(5000, 2));
        assert_eq!(dash.by_area.len(), 1);
        assert_eq!(dash.by_area[0].name, "Tesouraria");
        assert_eq!(dash.by_area[0].count, 3);
        assert_eq!(dash.monthly.iter().map(|m| m.count).sum::<usize>(), 3);
        assert_eq!(
            dash.risk_matrix,
            vec![RiskMatrixCell { probability: 4, impact: 5, count: 3, tier: RiskTier::High }]
        );

        // Home averages only the present percentages
        let home = e.reports.home_summary(&e.f.institution.id).await.unwrap();
        assert_eq!(home.average_percentage, Decimal::new(7500, 2));
    }

    #[tokio::test]
    async fn test_filters_and_unit_breakdown() {
        let e = env().await;
        let orgs = OrganizationService::new(e.f.repos.organizations.clone());
        let dir = orgs.create_directorate(&e.f.institution.id, "Diretoria Comercial").await.unwrap();
        let vendas = orgs.create_area(&dir.id, "Vendas").await.unwrap();

        e.run(&e.f.area.id, 1, 1, &[(4, 1)]).await;
        e.run(&vendas.id, 3, 3, &[(4, 3)]).await;

        let all = e
            .reports
            .compliance_dashboard(&e.f.institution.id, &ReportFilter::default())
            .await
            .unwrap();
        assert_eq!(all.by_directorate.len(), 2);
        assert_eq!(all.risk_matrix.len(), 2);
        assert_eq!(all.risk_matrix[0].tier, RiskTier::Low);

        let filtered = e
            .reports
            .compliance_dashboard(
                &e.f.institution.id,
                &ReportFilter { directorate_id: Some(dir.id.clone()), area_id: None },
            )
            .await
            .unwrap();
        assert_eq!(filtered.executions, 1);
        assert_eq!(filtered.average_percentage, Decimal::new(2500, 2));
        assert_eq!(filtered.by_area[0].name, "Vendas");
    }

    #[tokio::test]
    async fn test_workflow_overview_excludes_standalone() {
        let e = env().await;
        let records = e.run(&e.f.area.id, 4, 5, &[(10, 8), (10, 9)]).await;
        e.workflows
            .create(CreateWorkflowCommand { created_by: "ana".into(), ..Default::default() })
            .await
            .unwrap();

        let linked = e.workflows.list().await.unwrap();
        assert_eq!(linked.len(), 3);
        let first = linked
            .iter()
            .find(|w| w.execution_id() == Some(records[0].id()))
            .unwrap();
        e.workflows.finalize(first.id()).await.unwrap();

        let overview = e
            .reports
            .workflow_overview(&e.f.institution.id, &ReportFilter::default())
            .await
            .unwrap();
        assert_eq!(overview.total, 2);
        assert_eq!(overview.active, 1);
        assert_eq!(overview.completion_rate, Decimal::new(5000, 2));
        assert_eq!(overview.by_area[0].value, Decimal::new(5000, 2));

        let home = e.reports.home_summary(&e.f.institution.id).await.unwrap();
        assert_eq!(home.active_workflows, 1);
        assert_eq!(home.completed_workflows, 1);
        assert_eq!(home.draft_workflows, 0);
    }

    #[tokio::test]
    async fn test_home_pending_ordered_by_risk() {
        let e = env().await;
        let low = e.scopes.create(definition(e.f.area.id.clone(), 1, 1)).await.unwrap();
        let high = e.scopes.create(definition(e.f.area.id.clone(), 5, 5)).await.unwrap();
        e.scopes.generate_schedule_for_year(low.id(), 2026).await.unwrap();
        e.scopes.generate_schedule_for_year(high.id(), 2026).await.unwrap();

        let home = e.reports.home_summary(&e.f.institution.id).await.unwrap();
        assert_eq!(home.planned, 8);
        assert_eq!(home.pending, 8);
        assert_eq!(home.done, 0);
        assert_eq!(home.pending_tests.len(), 8);
        assert!(home.pending_tests[..4].iter().all(|p| p.risk_tier == RiskTier::High));
        assert!(home.pending_tests[4..].iter().all(|p| p.risk_tier == RiskTier::Low));
    }
}
