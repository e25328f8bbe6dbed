//! In-memory adapters for every repository port
//!
//! One `InMemoryStore` backs all ports so multi-entity operations (schedule
//! replacement, snapshots) run under a single lock.

use async_trait::async_trait;
use nomos_common::{EntityId, RepoResult};
use parking_lot::RwLock;
use std::collections::HashMap;

use super::snapshot::Snapshot;
use crate::domain::{
    Area, CostCenter, Directorate, ExecutionRecord, Institution, RemediationWorkflow,
    ScheduleEntry, ScopeItem,
};
use crate::matrix::MatrixConfig;
use crate::ports::{
    ExecutionRepository, MatrixConfigRepository, OrganizationRepository, ScheduleRepository,
    ScopeItemRepository, WorkflowRepository,
};

#[derive(Default)]
struct StoreState {
    institutions: HashMap<EntityId, Institution>,
    directorates: HashMap<EntityId, Directorate>,
    areas: HashMap<EntityId, Area>,
    cost_centers: HashMap<EntityId, CostCenter>,
    scope_items: HashMap<EntityId, ScopeItem>,
    schedule: HashMap<EntityId, ScheduleEntry>,
    executions: HashMap<EntityId, ExecutionRecord>,
    workflows: HashMap<EntityId, RemediationWorkflow>,
    /// Keyed by institution
    matrix_configs: HashMap<EntityId, MatrixConfig>,
}

fn index<T>(items: Vec<T>, key: impl Fn(&T) -> EntityId) -> HashMap<EntityId, T> {
    items.into_iter().map(|item| (key(&item), item)).collect()
}

fn values<T: Clone>(map: &HashMap<EntityId, T>) -> Vec<T> {
    map.values().cloned().collect()
}

/// In-memory store
#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store holding a snapshot's contents
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let state = StoreState {
            institutions: index(snapshot.institutions, |i| i.id.clone()),
            directorates: index(snapshot.directorates, |d| d.id.clone()),
            areas: index(snapshot.areas, |a| a.id.clone()),
            cost_centers: index(snapshot.cost_centers, |c| c.id.clone()),
            scope_items: index(snapshot.scope_items, |s| s.id().clone()),
            schedule: index(snapshot.schedule, |e| e.id.clone()),
            executions: index(snapshot.executions, |e| e.id().clone()),
            workflows: index(snapshot.workflows, |w| w.id().clone()),
            matrix_configs: index(snapshot.matrix_configs, |m| m.institution_id.clone()),
        };
        Self {
            state: RwLock::new(state),
        }
    }

    /// Copy the current contents out
    pub fn snapshot(&self) -> Snapshot {
        let state = self.state.read();
        Snapshot {
            institutions: values(&state.institutions),
            directorates: values(&state.directorates),
            areas: values(&state.areas),
            cost_centers: values(&state.cost_centers),
            scope_items: values(&state.scope_items),
            schedule: values(&state.schedule),
            executions: values(&state.executions),
            workflows: values(&state.workflows),
            matrix_configs: values(&state.matrix_configs),
        }
    }
}

#[async_trait]
impl OrganizationRepository for InMemoryStore {
    async fn save_institution(&self, institution: &Institution) -> RepoResult<()> {
        self.state
            .write()
            .institutions
            .insert(institution.id.clone(), institution.clone());
        Ok(())
    }

    async fn get_institution(&self, id: &EntityId) -> RepoResult<Option<Institution>> {
        Ok(self.state.read().institutions.get(id).cloned())
    }

    async fn list_institutions(&self) -> RepoResult<Vec<Institution>> {
        let mut list = values(&self.state.read().institutions);
        list.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(list)
    }

    async fn save_directorate(&self, directorate: &Directorate) -> RepoResult<()> {
        self.state
            .write()
            .directorates
            .insert(directorate.id.clone(), directorate.clone());
        Ok(())
    }

    async fn get_directorate(&self, id: &EntityId) -> RepoResult<Option<Directorate>> {
        Ok(self.state.read().directorates.get(id).cloned())
    }

    async fn find_directorates(&self, institution_id: &EntityId) -> RepoResult<Vec<Directorate>> {
        let state = self.state.read();
        Ok(state
            .directorates
            .values()
            .filter(|d| &d.institution_id == institution_id)
            .cloned()
            .collect())
    }

    async fn save_area(&self, area: &Area) -> RepoResult<()> {
        self.state.write().areas.insert(area.id.clone(), area.clone());
        Ok(())
    }

    async fn get_area(&self, id: &EntityId) -> RepoResult<Option<Area>> {
        Ok(self.state.read().areas.get(id).cloned())
    }

    async fn find_areas(&self, directorate_ids: &[EntityId]) -> RepoResult<Vec<Area>> {
        let state = self.state.read();
        Ok(state
            .areas
            .values()
            .filter(|a| directorate_ids.contains(&a.directorate_id))
            .cloned()
            .collect())
    }

    async fn save_cost_center(&self, cost_center: &CostCenter) -> RepoResult<()> {
        self.state
            .write()
            .cost_centers
            .insert(cost_center.id.clone(), cost_center.clone());
        Ok(())
    }

    async fn get_cost_center(&self, id: &EntityId) -> RepoResult<Option<CostCenter>> {
        Ok(self.state.read().cost_centers.get(id).cloned())
    }

    async fn find_cost_centers(&self, institution_id: &EntityId) -> RepoResult<Vec<CostCenter>> {
        let state = self.state.read();
        Ok(state
            .cost_centers
            .values()
            .filter(|c| &c.institution_id == institution_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ScopeItemRepository for InMemoryStore {
    async fn get(&self, id: &EntityId) -> RepoResult<Option<ScopeItem>> {
        Ok(self.state.read().scope_items.get(id).cloned())
    }

    async fn save(&self, item: &ScopeItem) -> RepoResult<()> {
        self.state
            .write()
            .scope_items
            .insert(item.id().clone(), item.clone());
        Ok(())
    }

    async fn delete(&self, id: &EntityId) -> RepoResult<()> {
        self.state.write().scope_items.remove(id);
        Ok(())
    }

    async fn find_by_areas(&self, area_ids: &[EntityId]) -> RepoResult<Vec<ScopeItem>> {
        let state = self.state.read();
        let mut items: Vec<_> = state
            .scope_items
            .values()
            .filter(|s| area_ids.contains(s.area_id()))
            .cloned()
            .collect();
        items.sort_by(|a, b| (a.created_at(), a.id()).cmp(&(b.created_at(), b.id())));
        Ok(items)
    }
}

#[async_trait]
impl ScheduleRepository for InMemoryStore {
    async fn get(&self, id: &EntityId) -> RepoResult<Option<ScheduleEntry>> {
        Ok(self.state.read().schedule.get(id).cloned())
    }

    async fn save(&self, entry: &ScheduleEntry) -> RepoResult<()> {
        self.state
            .write()
            .schedule
            .insert(entry.id.clone(), entry.clone());
        Ok(())
    }

    async fn find_by_scopes(&self, scope_item_ids: &[EntityId]) -> RepoResult<Vec<ScheduleEntry>> {
        let state = self.state.read();
        let mut entries: Vec<_> = state
            .schedule
            .values()
            .filter(|e| scope_item_ids.contains(&e.scope_item_id))
            .cloned()
            .collect();
        // Same-month entries of different items order by item
        entries.sort_by(|a, b| {
            (a.year, a.month, &a.scope_item_id, &a.id).cmp(&(b.year, b.month, &b.scope_item_id, &b.id))
        });
        Ok(entries)
    }

    async fn replace_for_scope(
        &self,
        scope_item_id: &EntityId,
        entries: Vec<ScheduleEntry>,
    ) -> RepoResult<()> {
        let mut state = self.state.write();
        state.schedule.retain(|_, e| &e.scope_item_id != scope_item_id);
        state
            .schedule
            .extend(entries.into_iter().map(|e| (e.id.clone(), e)));
        Ok(())
    }

    async fn delete_by_scope(&self, scope_item_id: &EntityId) -> RepoResult<()> {
        self.state
            .write()
            .schedule
            .retain(|_, e| &e.scope_item_id != scope_item_id);
        Ok(())
    }
}

#[async_trait]
impl ExecutionRepository for InMemoryStore {
    async fn get(&self, id: &EntityId) -> RepoResult<Option<ExecutionRecord>> {
        Ok(self.state.read().executions.get(id).cloned())
    }

    async fn save(&self, record: &ExecutionRecord) -> RepoResult<()> {
        self.state
            .write()
            .executions
            .insert(record.id().clone(), record.clone());
        Ok(())
    }

    async fn find_by_scopes(&self, scope_item_ids: &[EntityId]) -> RepoResult<Vec<ExecutionRecord>> {
        let state = self.state.read();
        let mut records: Vec<_> = state
            .executions
            .values()
            .filter(|r| scope_item_ids.contains(r.scope_item_id()))
            .cloned()
            .collect();
        records.sort_by(|a, b| (a.tested_at(), a.id()).cmp(&(b.tested_at(), b.id())));
        Ok(records)
    }

    async fn list(&self) -> RepoResult<Vec<ExecutionRecord>> {
        let mut records = values(&self.state.read().executions);
        records.sort_by(|a, b| (a.tested_at(), a.id()).cmp(&(b.tested_at(), b.id())));
        Ok(records)
    }

    async fn delete_by_scope(&self, scope_item_id: &EntityId) -> RepoResult<()> {
        self.state
            .write()
            .executions
            .retain(|_, r| r.scope_item_id() != scope_item_id);
        Ok(())
    }
}

#[async_trait]
impl WorkflowRepository for InMemoryStore {
    async fn get(&self, id: &EntityId) -> RepoResult<Option<RemediationWorkflow>> {
        Ok(self.state.read().workflows.get(id).cloned())
    }

    async fn save(&self, workflow: &RemediationWorkflow) -> RepoResult<()> {
        self.state
            .write()
            .workflows
            .insert(workflow.id().clone(), workflow.clone());
        Ok(())
    }

    async fn delete(&self, id: &EntityId) -> RepoResult<()> {
        self.state.write().workflows.remove(id);
        Ok(())
    }

    async fn find_by_executions(&self, execution_ids: &[EntityId]) -> RepoResult<Vec<RemediationWorkflow>> {
        let state = self.state.read();
        Ok(state
            .workflows
            .values()
            .filter(|w| w.execution_id().is_some_and(|id| execution_ids.contains(id)))
            .cloned()
            .collect())
    }

    async fn list(&self) -> RepoResult<Vec<RemediationWorkflow>> {
        let mut list = values(&self.state.read().workflows);
        list.sort_by(|a, b| (b.created_at(), b.id()).cmp(&(a.created_at(), a.id())));
        Ok(list)
    }
}

#[async_trait]
impl MatrixConfigRepository for InMemoryStore {
    async fn find_by_institution(&self, institution_id: &EntityId) -> RepoResult<Option<MatrixConfig>> {
        Ok(self.state.read().matrix_configs.get(institution_id).cloned())
    }

    async fn upsert(&self, config: &MatrixConfig) -> RepoResult<()> {
        self.state
            .write()
            .matrix_configs
            .insert(config.institution_id.clone(), config.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::scope::tests::definition;

    #[tokio::test]
    async fn test_replace_for_scope_leaves_other_items() {
        let store = InMemoryStore::new();
        let a = EntityId::new();
        let b = EntityId::new();
        ScheduleRepository::save(&store, &ScheduleEntry::planned(b.clone(), 1, 2026))
            .await
            .unwrap();
        store
            .replace_for_scope(&a, vec![ScheduleEntry::planned(a.clone(), 3, 2026)])
            .await
            .unwrap();
        store
            .replace_for_scope(&a, vec![ScheduleEntry::planned(a.clone(), 6, 2026)])
            .await
            .unwrap();

        let for_a = ScheduleRepository::find_by_scopes(&store, &[a.clone()]).await.unwrap();
        assert_eq!(for_a.len(), 1);
        assert_eq!(for_a[0].month, 6);
        assert_eq!(ScheduleRepository::find_by_scopes(&store, &[b]).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_same_month_entries_order_by_scope_item() {
        let store = InMemoryStore::new();
        let mut items: Vec<EntityId> = (0..6).map(|_| EntityId::new()).collect();
        for item in items.iter().rev() {
            ScheduleRepository::save(&store, &ScheduleEntry::planned(item.clone(), 4, 2026))
                .await
                .unwrap();
        }
        ScheduleRepository::save(&store, &ScheduleEntry::planned(items[0].clone(), 1, 2026))
            .await
            .unwrap();

        let found = ScheduleRepository::find_by_scopes(&store, &items).await.unwrap();
        assert_eq!(found[0].month, 1);
        let april: Vec<EntityId> = found[1..].iter().map(|e| e.scope_item_id.clone()).collect();
        items.sort();
        assert_eq!(april, items);
    }

    #[tokio::test]
    async fn test_find_by_areas() {
        let store = InMemoryStore::new();
        let area = EntityId::new();
        let item = ScopeItem::create(definition(area.clone(), 2, 2));
        ScopeItemRepository::save(&store, &item).await.unwrap();
        ScopeItemRepository::save(&store, &ScopeItem::create(definition(EntityId::new(), 1, 1)))
            .await
            .unwrap();

        let found = store.find_by_areas(&[area]).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id(), item.id());
    }

    #[tokio::test]
    async fn test_snapshot_round_trip_keeps_entities() {
        let store = InMemoryStore::new();
        let inst = Institution::new("Cooperativa Sul");
        store.save_institution(&inst).await.unwrap();
        let restored = InMemoryStore::from_snapshot(store.snapshot());
        let found = restored.get_institution(&inst.id).await.unwrap().unwrap();
        assert_eq!(found.name, "Cooperativa Sul");
    }
}
