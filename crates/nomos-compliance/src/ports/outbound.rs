//! Outbound ports (Repository traits)
//!
//! Storage is an external collaborator: the engine only sees these traits.

use async_trait::async_trait;
use nomos_common::{EntityId, RepoResult};

use crate::domain::{
    Area, CostCenter, Directorate, ExecutionRecord, Institution, RemediationWorkflow,
    ScheduleEntry, ScopeItem,
};
use crate::matrix::MatrixConfig;

/// Organization registry port
#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    async fn save_institution(&self, institution: &Institution) -> RepoResult<()>;
    async fn get_institution(&self, id: &EntityId) -> RepoResult<Option<Institution>>;
    async fn list_institutions(&self) -> RepoResult<Vec<Institution>>;

    async fn save_directorate(&self, directorate: &Directorate) -> RepoResult<()>;
    async fn get_directorate(&self, id: &EntityId) -> RepoResult<Option<Directorate>>;
    /// Directorates of one institution
    async fn find_directorates(&self, institution_id: &EntityId) -> RepoResult<Vec<Directorate>>;

    async fn save_area(&self, area: &Area) -> RepoResult<()>;
    async fn get_area(&self, id: &EntityId) -> RepoResult<Option<Area>>;
    /// Areas under any of the given directorates
    async fn find_areas(&self, directorate_ids: &[EntityId]) -> RepoResult<Vec<Area>>;

    async fn save_cost_center(&self, cost_center: &CostCenter) -> RepoResult<()>;
    async fn get_cost_center(&self, id: &EntityId) -> RepoResult<Option<CostCenter>>;
    async fn find_cost_centers(&self, institution_id: &EntityId) -> RepoResult<Vec<CostCenter>>;
}

/// Scope item repository port
#[async_trait]
pub trait ScopeItemRepository: Send + Sync {
    async fn get(&self, id: &EntityId) -> RepoResult<Option<ScopeItem>>;
    /// Insert or update
    async fn save(&self, item: &ScopeItem) -> RepoResult<()>;
    async fn delete(&self, id: &EntityId) -> RepoResult<()>;
    /// Items owned by any of the given areas
    async fn find_by_areas(&self, area_ids: &[EntityId]) -> RepoResult<Vec<ScopeItem>>;
}

/// Schedule entry repository port
#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    async fn get(&self, id: &EntityId) -> RepoResult<Option<ScheduleEntry>>;
    async fn save(&self, entry: &ScheduleEntry) -> RepoResult<()>;
    async fn find_by_scopes(&self, scope_item_ids: &[EntityId]) -> RepoResult<Vec<ScheduleEntry>>;
    /// Drop every entry of a scope item and store the new ones in one step
    async fn replace_for_scope(
        &self,
        scope_item_id: &EntityId,
        entries: Vec<ScheduleEntry>,
    ) -> RepoResult<()>;
    async fn delete_by_scope(&self, scope_item_id: &EntityId) -> RepoResult<()>;
}

/// Execution record repository port
#[async_trait]
pub trait ExecutionRepository: Send + Sync {
    async fn get(&self, id: &EntityId) -> RepoResult<Option<ExecutionRecord>>;
    async fn save(&self, record: &ExecutionRecord) -> RepoResult<()>;
    /// Records of any of the given scope items, oldest first
    async fn find_by_scopes(&self, scope_item_ids: &[EntityId]) -> RepoResult<Vec<ExecutionRecord>>;
    /// Every record, oldest first
    async fn list(&self) -> RepoResult<Vec<ExecutionRecord>>;
    async fn delete_by_scope(&self, scope_item_id: &EntityId) -> RepoResult<()>;
}

/// Remediation workflow repository port
#[async_trait]
pub trait WorkflowRepository: Send + Sync {
    async fn get(&self, id: &EntityId) -> RepoResult<Option<RemediationWorkflow>>;
    async fn save(&self, workflow: &RemediationWorkflow) -> RepoResult<()>;
    async fn delete(&self, id: &EntityId) -> RepoResult<()>;
    /// Workflows originating from any of the given executions
    async fn find_by_executions(&self, execution_ids: &[EntityId]) -> RepoResult<Vec<RemediationWorkflow>>;
    /// Every workflow, newest first
    async fn list(&self) -> RepoResult<Vec<RemediationWorkflow>>;
}

/// Matrix configuration repository port
#[async_trait]
pub trait MatrixConfigRepository: Send + Sync {
    async fn find_by_institution(&self, institution_id: &EntityId) -> RepoResult<Option<MatrixConfig>>;
    /// Insert or replace the tenant's single document
    async fn upsert(&self, config: &MatrixConfig) -> RepoResult<()>;
}
