//! Scope item and schedule service

use chrono::{Datelike, Utc};
use nomos_common::{EngineError, EngineResult, EntityId};
use tracing::info;

use super::organization::{resolve_unit, OrgDirectory};
use super::Repositories;
use crate::domain::schedule;
use crate::domain::{ScheduleEntry, ScopeDefinition, ScopeItem};
use crate::risk::{RiskAssessment, RiskFactor};

fn grid_factor(value: u8, axis: &str) -> EngineResult<RiskFactor> {
    RiskFactor::try_new(value).ok_or_else(|| {
        EngineError::InvalidInput(format!(
            "{} must be between {} and {}, got {}",
            axis,
            RiskFactor::MIN,
            RiskFactor::MAX,
            value
        ))
    })
}

/// Scope item application service
pub struct ScopeService {
    repos: Repositories,
}

impl ScopeService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn create(&self, definition: ScopeDefinition) -> EngineResult<ScopeItem> {
        self.validate(&definition).await?;
        let item = ScopeItem::create(definition);
        self.repos.scope_items.save(&item).await?;
        info!(
            "Scope item {} created (risk {} {})",
            item.id(),
            item.risk().score,
            item.risk_tier()
        );
        Ok(item)
    }

    /// Replace editable fields; score and tier follow the new factors
    pub async fn update(&self, id: &EntityId, definition: ScopeDefinition) -> EngineResult<ScopeItem> {
        let mut item = self.get(id).await?;
        self.validate(&definition).await?;
        item.update(definition);
        self.repos.scope_items.save(&item).await?;
        Ok(item)
    }

    /// Move only the risk grid position
    pub async fn rescore(
        &self,
        id: &EntityId,
        probability: u8,
        impact: u8,
    ) -> EngineResult<RiskAssessment> {
        let probability = grid_factor(probability, "probability")?;
        let impact = grid_factor(impact, "impact")?;
        let mut item = self.get(id).await?;
        item.set_risk_factors(probability, impact);
        self.repos.scope_items.save(&item).await?;
        Ok(*item.risk())
    }

    pub async fn get(&self, id: &EntityId) -> EngineResult<ScopeItem> {
        self.repos
            .scope_items
            .get(id)
            .await?
            .ok_or_else(|| EngineError::not_found("scope item", id))
    }

    /// Scope items of one institution
    pub async fn list(&self, institution_id: &EntityId) -> EngineResult<Vec<ScopeItem>> {
        let directory = OrgDirectory::load(self.repos.organizations.as_ref(), institution_id).await?;
        let areas = directory.area_ids(None, None);
        Ok(self.repos.scope_items.find_by_areas(&areas).await?)
    }

    /// Regenerate the current year's schedule, discarding prior entries
    pub async fn generate_schedule(&self, id: &EntityId) -> EngineResult<Vec<ScheduleEntry>> {
        self.generate_schedule_for_year(id, Utc::now().year()).await
    }

    pub async fn generate_schedule_for_year(
        &self,
        id: &EntityId,
        year: i32,
    ) -> EngineResult<Vec<ScheduleEntry>> {
        let item = self.get(id).await?;
        let entries = schedule::project(&item, year);
        self.repos
            .schedule
            .replace_for_scope(item.id(), entries.clone())
            .await?;
        info!(
            "Schedule regenerated for scope item {}: {} entries in {}",
            item.id(),
            entries.len(),
            year
        );
        Ok(entries)
    }

    /// Delete a scope item and everything hanging off it
    ///
    /// Order: workflows of its executions, executions, schedule entries, item.
    pub async fn delete(&self, id: &EntityId) -> EngineResult<()> {
        let item = self.get(id).await?;
        let executions = self
            .repos
            .executions
            .find_by_scopes(std::slice::from_ref(item.id()))
            .await?;
        let execution_ids: Vec<EntityId> = executions.iter().map(|e| e.id().clone()).collect();

        let workflows = self.repos.workflows.find_by_executions(&execution_ids).await?;
        for workflow in &workflows {
            self.repos.workflows.delete(workflow.id()).await?;
        }
        self.repos.executions.delete_by_scope(item.id()).await?;
        self.repos.schedule.delete_by_scope(item.id()).await?;
        self.repos.scope_items.delete(item.id()).await?;

        info!(
            "Scope item {} deleted with {} executions and {} workflows",
            item.id(),
            execution_ids.len(),
            workflows.len()
        );
        Ok(())
    }

    async fn validate(&self, definition: &ScopeDefinition) -> EngineResult<()> {
        if definition.name.trim().is_empty() {
            return Err(EngineError::InvalidInput("scope item name must not be blank".into()));
        }
        grid_factor(definition.probability, "probability")?;
        grid_factor(definition.impact, "impact")?;
        let unit = resolve_unit(self.repos.organizations.as_ref(), &definition.area_id).await?;
        if let Some(cost_center_id) = &definition.cost_center_id {
            let cost_center = self
                .repos
                .organizations
                .get_cost_center(cost_center_id)
                .await?
                .ok_or_else(|| EngineError::not_found("cost center", cost_center_id))?;
            if cost_center.institution_id != unit.institution_id {
                return Err(EngineError::InvalidInput(
                    "cost center belongs to another institution".into(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::application::{OrganizationService, Repositories};
    use crate::domain::scope::tests::definition;
    use crate::domain::{Area, Institution};
    use crate::infrastructure::InMemoryStore;
    use std::sync::Arc;

    /// Store with one institution, directorate and area
    pub(crate) struct Fixture {
        pub repos: Repositories,
        pub institution: Institution,
        pub area: Area,
    }

    pub(crate) async fn fixture() -> Fixture {
        let repos = Repositories::in_memory(Arc::new(InMemoryStore::new()));
        let orgs = OrganizationService::new(repos.organizations.clone());
        let institution = orgs.create_institution("Cooperativa Central").await.unwrap();
        let directorate = orgs
            .create_directorate(&institution.id, "Diretoria de Riscos")
            .await
            .unwrap();
        let area = orgs.create_area(&directorate.id, "Tesouraria").await.unwrap();
        Fixture {
            repos,
            institution,
            area,
        }
    }

    #[tokio::test]
    async fn test_create_requires_area() {
        let f = fixture().await;
        let service = ScopeService::new(f.repos.clone());
        let err = service
            .create(definition(EntityId::new(), 2, 2))
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let mut blank = definition(f.area.id.clone(), 2, 2);
        blank.name = " ".into();
        assert!(matches!(service.create(blank).await, Err(EngineError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_update_and_rescore() {
        let f = fixture().await;
        let service = ScopeService::new(f.repos.clone());
        let item = service.create(definition(f.area.id.clone(), 4, 5)).await.unwrap();

        let updated = service
            .update(item.id(), definition(f.area.id.clone(), 2, 3))
            .await
            .unwrap();
        assert_eq!(updated.risk().score, 6);

        let risk = service
            .rescore(item.id(), 5, 4)
            .await
            .unwrap();
        assert_eq!(risk.score, 20);
        assert_eq!(service.get(item.id()).await.unwrap().risk().score, 20);
    }

    #[tokio::test]
    async fn test_off_grid_factors_rejected() {
        let f = fixture().await;
        let service = ScopeService::new(f.repos.clone());
        assert!(matches!(
            service.create(definition(f.area.id.clone(), 9, 7)).await,
            Err(EngineError::InvalidInput(_))
        ));
        assert!(service.list(&f.institution.id).await.unwrap().is_empty());

        let item = service.create(definition(f.area.id.clone(), 2, 2)).await.unwrap();
        assert!(matches!(
            service.update(item.id(), definition(f.area.id.clone(), 0, 3)).await,
            Err(EngineError::InvalidInput(_))
        ));
        assert!(matches!(
            service.rescore(item.id(), 3, 6).await,
            Err(EngineError::InvalidInput(_))
        ));
        let stored = service.get(item.id()).await.unwrap();
        assert_eq!(stored.risk().score, 4);
    }

    #[tokio::test]
    async fn test_regeneration_overwrites() {
        let f = fixture().await;
        let service = ScopeService::new(f.repos.clone());
        let item = service.create(definition(f.area.id.clone(), 1, 1)).await.unwrap();

        service.generate_schedule_for_year(item.id(), 2026).await.unwrap();
        let again = service.generate_schedule_for_year(item.id(), 2026).await.unwrap();
        assert_eq!(again.len(), 4);

        let stored = f
            .repos
            .schedule
            .find_by_scopes(std::slice::from_ref(item.id()))
            .await
            .unwrap();
        assert_eq!(stored.len(), 4);
        let ids: Vec<_> = again.iter().map(|e| e.id.clone()).collect();
        assert!(stored.iter().all(|e| ids.contains(&e.id)));
    }

    #[tokio::test]
    async fn test_list_is_tenant_scoped() {
        let f = fixture().await;
        let service = ScopeService::new(f.repos.clone());
        service.create(definition(f.area.id.clone(), 1, 1)).await.unwrap();

        assert_eq!(service.list(&f.institution.id).await.unwrap().len(), 1);
        assert!(service.list(&EntityId::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_unknown() {
        let f = fixture().await;
        let service = ScopeService::new(f.repos);
        assert!(service.delete(&EntityId::new()).await.unwrap_err().is_not_found());
    }
}
