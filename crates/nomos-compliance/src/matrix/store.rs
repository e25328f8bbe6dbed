//! Per-tenant matrix configuration store

use chrono::{DateTime, Utc};
use nomos_common::{EngineError, EngineResult, EntityId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use super::document::{MatrixDocument, MatrixError, DEFAULT_DOCUMENT};
use super::resolver::{self, ComplianceBand};
use crate::ports::{MatrixConfigRepository, OrganizationRepository};
use crate::risk::RiskTier;

/// Stored configuration row; the document text is kept verbatim
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixConfig {
    pub id: EntityId,
    pub institution_id: EntityId,
    pub config_json: String,
    pub updated_at: DateTime<Utc>,
}

/// Matrix configuration store
pub struct MatrixConfigStore {
    configs: Arc<dyn MatrixConfigRepository>,
    organizations: Arc<dyn OrganizationRepository>,
}

impl MatrixConfigStore {
    pub fn new(
        configs: Arc<dyn MatrixConfigRepository>,
        organizations: Arc<dyn OrganizationRepository>,
    ) -> Self {
        Self {
            configs,
            organizations,
        }
    }

    /// Stored document text, or the built-in default
    pub async fn get_config(&self, institution_id: &EntityId) -> String {
        match self.configs.find_by_institution(institution_id).await {
            Ok(Some(config)) => config.config_json,
            Ok(None) => DEFAULT_DOCUMENT.to_string(),
            Err(e) => {
                warn!("Matrix config lookup failed for {}: {}; using default", institution_id, e);
                DEFAULT_DOCUMENT.to_string()
            }
        }
    }

    /// Replace the tenant's document wholesale
    pub async fn save_config(
        &self,
        institution_id: &EntityId,
        config_json: impl Into<String>,
    ) -> EngineResult<MatrixConfig> {
        self.organizations
            .get_institution(institution_id)
            .await?
            .ok_or_else(|| EngineError::not_found("institution", institution_id))?;

        let id = self
            .configs
            .find_by_institution(institution_id)
            .await?
            .map(|existing| existing.id)
            .unwrap_or_default();
        let config = MatrixConfig {
            id,
            institution_id: institution_id.clone(),
            config_json: config_json.into(),
            updated_at: Utc::now(),
        };
        self.configs.upsert(&config).await?;
        info!("Matrix configuration saved for institution {}", institution_id);
        Ok(config)
    }

    /// Parse the tenant's document for one request
    pub async fn load_matrix(&self, institution_id: &EntityId) -> Result<MatrixDocument, MatrixError> {
        MatrixDocument::parse(&self.get_config(institution_id).await)
    }

    pub async fn resolve_compliance(
        &self,
        institution_id: &EntityId,
        percentage: Option<Decimal>,
    ) -> Option<ComplianceBand> {
        let percentage = percentage?;
        let matrix = self.load_or_warn(institution_id).await?;
        resolver::resolve_compliance(&matrix, percentage)
    }

    pub async fn resolve_action(
        &self,
        institution_id: &EntityId,
        percentage: Option<Decimal>,
        tier: RiskTier,
    ) -> Option<String> {
        let percentage = percentage?;
        let matrix = self.load_or_warn(institution_id).await?;
        resolver::resolve_action(&matrix, percentage, tier)
    }

    /// Request-scoped cache of parsed documents
    pub fn cache(&self) -> MatrixCache<'_> {
        MatrixCache {
            store: self,
            parsed: HashMap::new(),
        }
    }

    async fn load_or_warn(&self, institution_id: &EntityId) -> Option<MatrixDocument> {
        match self.load_matrix(institution_id).await {
            Ok(matrix) => Some(matrix),
            Err(e) => {
                warn!("Matrix resolution failed for institution {}: {}", institution_id, e);
                None
            }
        }
    }
}

/// Parses each tenant's document at most once
pub struct MatrixCache<'a> {
    store: &'a MatrixConfigStore,
    parsed: HashMap<EntityId, Option<MatrixDocument>>,
}

impl MatrixCache<'_> {
    async fn matrix(&mut self, institution_id: &EntityId) -> Option<&MatrixDocument> {
        if !self.parsed.contains_key(institution_id) {
            let loaded = self.store.load_or_warn(institution_id).await;
            self.parsed.insert(institution_id.clone(), loaded);
        }
        self.parsed.get(institution_id).and_then(Option::as_ref)
    }

    pub async fn resolve_compliance(
        &mut self,
        institution_id: &EntityId,
        percentage: Option<Decimal>,
    ) -> Option<ComplianceBand> {
        let percentage = percentage?;
        let matrix = self.matrix(institution_id).await?;
        resolver::resolve_compliance(matrix, percentage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Institution;
    use crate::infrastructure::InMemoryStore;

    const CONFIGURED: &str = r##"{"complianceRanges":[{"min":0,"max":49,"label":"Crítico","color":"#ef4444"},{"min":50,"max":100,"label":"Ok","color":"#10b981"}],"maintenanceMatrix":{"Alto-Crítico":"Corretiva"}}"##;

    fn store() -> (Arc<InMemoryStore>, MatrixConfigStore) {
        let mem = Arc::new(InMemoryStore::new());
        let matrix = MatrixConfigStore::new(mem.clone(), mem.clone());
        (mem, matrix)
    }

    #[test]
    fn test_default_document_when_unset() {
        let (_, matrix) = store();
        let raw = tokio_test::block_on(matrix.get_config(&EntityId::new()));
        assert_eq!(raw, DEFAULT_DOCUMENT);
    }

    #[test]
    fn test_save_unknown_institution() {
        let (_, matrix) = store();
        let err = tokio_test::block_on(matrix.save_config(&EntityId::new(), "{}")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_save_is_verbatim_and_upserts() {
        let (mem, matrix) = store();
        let inst = Institution::new("Coop");
        mem.save_institution(&inst).await.unwrap();

        let first = matrix.save_config(&inst.id, "{ \"x\": 1 }").await.unwrap();
        let second = matrix.save_config(&inst.id, CONFIGURED).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(matrix.get_config(&inst.id).await, CONFIGURED);
    }

    #[tokio::test]
    async fn test_resolution_through_store() {
        let (mem, matrix) = store();
        let inst = Institution::new("Coop");
        mem.save_institution(&inst).await.unwrap();
        matrix.save_config(&inst.id, CONFIGURED).await.unwrap();

        let pct = Some(Decimal::new(3000, 2));
        assert_eq!(
            matrix.resolve_compliance(&inst.id, pct).await.unwrap().label,
            "Crítico"
        );
        assert_eq!(
            matrix.resolve_action(&inst.id, pct, RiskTier::High).await.as_deref(),
            Some("Corretiva")
        );
        assert_eq!(matrix.resolve_compliance(&inst.id, None).await, None);
    }

    #[tokio::test]
    async fn test_malformed_document_resolves_nothing() {
        let (mem, matrix) = store();
        let inst = Institution::new("Coop");
        mem.save_institution(&inst).await.unwrap();
        matrix.save_config(&inst.id, "{\"complianceRanges\": [").await.unwrap();

        let pct = Some(Decimal::from(10));
        assert!(matrix.load_matrix(&inst.id).await.is_err());
        assert_eq!(matrix.resolve_compliance(&inst.id, pct).await, None);
        assert_eq!(matrix.resolve_action(&inst.id, pct, RiskTier::High).await, None);

        let mut cache = matrix.cache();
        assert_eq!(cache.resolve_compliance(&inst.id, pct).await, None);
    }

    #[tokio::test]
    async fn test_cache_uses_default_for_unknown_tenant() {
        let (_, matrix) = store();
        let mut cache = matrix.cache();
        let band = cache
            .resolve_compliance(&EntityId::new(), Some(Decimal::from(95)))
            .await
            .unwrap();
        assert_eq!(band.label, "Excelente");
    }
}
