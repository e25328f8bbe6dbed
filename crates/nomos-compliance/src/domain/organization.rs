//! Organization hierarchy: institution → directorate → area

use chrono::{DateTime, Utc};
use nomos_common::EntityId;
use serde::{Deserialize, Serialize};

/// Tenant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Institution {
    pub id: EntityId,
    pub name: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Institution {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            active: true,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Directorate {
    pub id: EntityId,
    pub name: String,
    pub institution_id: EntityId,
}

impl Directorate {
    pub fn new(name: impl Into<String>, institution_id: EntityId) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            institution_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Area {
    pub id: EntityId,
    pub name: String,
    pub directorate_id: EntityId,
}

impl Area {
    pub fn new(name: impl Into<String>, directorate_id: EntityId) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            directorate_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostCenter {
    pub id: EntityId,
    pub name: String,
    pub code: Option<String>,
    pub institution_id: EntityId,
}

impl CostCenter {
    pub fn new(name: impl Into<String>, code: Option<String>, institution_id: EntityId) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            code,
            institution_id,
        }
    }
}

/// An area with its full chain resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgUnit {
    pub institution_id: EntityId,
    pub directorate_id: EntityId,
    pub directorate_name: String,
    pub area_id: EntityId,
    pub area_name: String,
}
