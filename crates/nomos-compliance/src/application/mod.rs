//! Application layer
//!
//! Services that orchestrate the domain over the repository ports.

pub mod dto;
pub mod execution;
pub mod organization;
pub mod scope;
pub mod workflow;

use std::sync::Arc;

use crate::infrastructure::InMemoryStore;
use crate::ports::{
    ExecutionRepository, MatrixConfigRepository, OrganizationRepository, ScheduleRepository,
    ScopeItemRepository, WorkflowRepository,
};

pub use dto::*;
pub use execution::ExecutionProcessor;
pub use organization::{OrgDirectory, OrganizationService};
pub use scope::ScopeService;
pub use workflow::WorkflowService;

/// Every repository port the services need
#[derive(Clone)]
pub struct Repositories {
    pub organizations: Arc<dyn OrganizationRepository>,
    pub scope_items: Arc<dyn ScopeItemRepository>,
    pub schedule: Arc<dyn ScheduleRepository>,
    pub executions: Arc<dyn ExecutionRepository>,
    pub workflows: Arc<dyn WorkflowRepository>,
    pub matrix_configs: Arc<dyn MatrixConfigRepository>,
}

impl Repositories {
    /// All ports backed by one in-memory store
    pub fn in_memory(store: Arc<InMemoryStore>) -> Self {
        Self {
            organizations: store.clone(),
            scope_items: store.clone(),
            schedule: store.clone(),
            executions: store.clone(),
            workflows: store.clone(),
            matrix_configs: store,
        }
    }
}
