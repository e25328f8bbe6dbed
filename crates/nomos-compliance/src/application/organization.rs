//! Organization registry service

use nomos_common::{EngineError, EngineResult, EntityId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::domain::{Area, CostCenter, Directorate, Institution, OrgUnit};
use crate::ports::OrganizationRepository;

fn require_name(name: &str, what: &str) -> EngineResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(EngineError::InvalidInput(format!("{} name must not be blank", what)));
    }
    Ok(name.to_string())
}

/// Organization application service
pub struct OrganizationService {
    organizations: Arc<dyn OrganizationRepository>,
}

impl OrganizationService {
    pub fn new(organizations: Arc<dyn OrganizationRepository>) -> Self {
        Self { organizations }
    }

    pub async fn create_institution(&self, name: &str) -> EngineResult<Institution> {
        let institution = Institution::new(require_name(name, "institution")?);
        self.organizations.save_institution(&institution).await?;
        info!("Institution {} created: {}", institution.id, institution.name);
        Ok(institution)
    }

    pub async fn list_institutions(&self) -> EngineResult<Vec<Institution>> {
        Ok(self.organizations.list_institutions().await?)
    }

    pub async fn get_institution(&self, id: &EntityId) -> EngineResult<Institution> {
        self.organizations
            .get_institution(id)
            .await?
            .ok_or_else(|| EngineError::not_found("institution", id))
    }

    pub async fn create_directorate(
        &self,
        institution_id: &EntityId,
        name: &str,
    ) -> EngineResult<Directorate> {
        let name = require_name(name, "directorate")?;
        self.get_institution(institution_id).await?;
        let directorate = Directorate::new(name, institution_id.clone());
        self.organizations.save_directorate(&directorate).await?;
        Ok(directorate)
    }

    pub async fn create_area(&self, directorate_id: &EntityId, name: &str) -> EngineResult<Area> {
        let name = require_name(name, "area")?;
        self.organizations
            .get_directorate(directorate_id)
            .await?
            .ok_or_else(|| EngineError::not_found("directorate", directorate_id))?;
        let area = Area::new(name, directorate_id.clone());
        self.organizations.save_area(&area).await?;
        Ok(area)
    }

    pub async fn create_cost_center(
        &self,
        institution_id: &EntityId,
        name: &str,
        code: Option<String>,
    ) -> EngineResult<CostCenter> {
        let name = require_name(name, "cost center")?;
        self.get_institution(institution_id).await?;
        let cost_center = CostCenter::new(name, code, institution_id.clone());
        self.organizations.save_cost_center(&cost_center).await?;
        Ok(cost_center)
    }

    pub async fn list_cost_centers(&self, institution_id: &EntityId) -> EngineResult<Vec<CostCenter>> {
        Ok(self.organizations.find_cost_centers(institution_id).await?)
    }

    /// Resolved units of one institution
    pub async fn directory(&self, institution_id: &EntityId) -> EngineResult<OrgDirectory> {
        OrgDirectory::load(self.organizations.as_ref(), institution_id).await
    }

    /// Full chain for a single area
    pub async fn unit(&self, area_id: &EntityId) -> EngineResult<OrgUnit> {
        resolve_unit(self.organizations.as_ref(), area_id).await
    }
}

/// Resolve an area up to its institution
pub async fn resolve_unit(
    organizations: &dyn OrganizationRepository,
    area_id: &EntityId,
) -> EngineResult<OrgUnit> {
    let area = organizations
        .get_area(area_id)
        .await?
        .ok_or_else(|| EngineError::not_found("area", area_id))?;
    let directorate = organizations
        .get_directorate(&area.directorate_id)
        .await?
        .ok_or_else(|| EngineError::not_found("directorate", &area.directorate_id))?;
    Ok(OrgUnit {
        institution_id: directorate.institution_id,
        directorate_id: directorate.id,
        directorate_name: directorate.name,
        area_id: area.id,
        area_name: area.name,
    })
}

/// Area → unit lookup for one institution
#[derive(Debug, Clone, Default)]
pub struct OrgDirectory {
    units: HashMap<EntityId, OrgUnit>,
}

impl OrgDirectory {
    pub async fn load(
        organizations: &dyn OrganizationRepository,
        institution_id: &EntityId,
    ) -> EngineResult<Self> {
        let directorates = organizations.find_directorates(institution_id).await?;
        let ids: Vec<EntityId> = directorates.iter().map(|d| d.id.clone()).collect();
        let by_id: HashMap<&EntityId, &Directorate> =
            directorates.iter().map(|d| (&d.id, d)).collect();

        let mut units = HashMap::new();
        for area in organizations.find_areas(&ids).await? {
            let Some(directorate) = by_id.get(&area.directorate_id) else {
                continue;
            };
            units.insert(
                area.id.clone(),
                OrgUnit {
                    institution_id: institution_id.clone(),
                    directorate_id: directorate.id.clone(),
                    directorate_name: directorate.name.clone(),
                    area_id: area.id,
                    area_name: area.name,
                },
            );
        }
        Ok(Self { units })
    }

    pub fn unit(&self, area_id: &EntityId) -> Option<&OrgUnit> {
        self.units.get(area_id)
    }

    /// Areas passing optional directorate/area filters
    pub fn area_ids(&self, directorate_id: Option<&EntityId>, area_id: Option<&EntityId>) -> Vec<EntityId> {
        self.units
            .values()
            .filter(|u| directorate_id.map_or(true, |d| &u.directorate_id == d))
            .filter(|u| area_id.map_or(true, |a| &u.area_id == a))
            .map(|u| u.area_id.clone())
            .collect()
    }

    /// Units ordered by directorate then area name
    pub fn units(&self) -> Vec<&OrgUnit> {
        let mut units: Vec<&OrgUnit> = self.units.values().collect();
        units.sort_by(|a, b| {
            (a.directorate_name.as_str(), a.area_name.as_str())
                .cmp(&(b.directorate_name.as_str(), b.area_name.as_str()))
        });
        units
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::InMemoryStore;

    #[tokio::test]
    async fn test_hierarchy_and_directory() {
        let service = OrganizationService::new(Arc::new(InMemoryStore::new()));
        let inst = service.create_institution("Cooperativa Central").await.unwrap();
        let dir = service.create_directorate(&inst.id, "Diretoria Financeira").await.unwrap();
        let area = service.create_area(&dir.id, "Tesouraria").await.unwrap();
        let other = service.create_area(&dir.id, "Contabilidade").await.unwrap();

        let directory = service.directory(&inst.id).await.unwrap();
        let unit = directory.unit(&area.id).unwrap();
        assert_eq!(unit.directorate_name, "Diretoria Financeira");
        assert_eq!(unit.area_name, "Tesouraria");
        assert_eq!(directory.area_ids(None, None).len(), 2);
        let names: Vec<&str> = directory.units().iter().map(|u| u.area_name.as_str()).collect();
        assert_eq!(names, vec!["Contabilidade", "Tesouraria"]);
        assert_eq!(directory.area_ids(Some(&dir.id), Some(&other.id)), vec![other.id.clone()]);
        assert!(directory.area_ids(Some(&EntityId::new()), None).is_empty());

        assert_eq!(service.unit(&area.id).await.unwrap().institution_id, inst.id);
    }

    #[tokio::test]
    async fn test_missing_parents() {
        let service = OrganizationService::new(Arc::new(InMemoryStore::new()));
        assert!(service
            .create_directorate(&EntityId::new(), "D")
            .await
            .unwrap_err()
            .is_not_found());
        assert!(service.create_area(&EntityId::new(), "A").await.unwrap_err().is_not_found());
        assert!(matches!(
            service.create_institution("  ").await,
            Err(EngineError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_directory_is_tenant_scoped() {
        let service = OrganizationService::new(Arc::new(InMemoryStore::new()));
        let a = service.create_institution("A").await.unwrap();
        let b = service.create_institution("B").await.unwrap();
        let dir = service.create_directorate(&b.id, "D").await.unwrap();
        service.create_area(&dir.id, "X").await.unwrap();

        assert!(service.directory(&a.id).await.unwrap().is_empty());
        assert!(!service.directory(&b.id).await.unwrap().is_empty());
    }
}
