//! Matrix configuration
//!
//! Tenant document (compliance bands, risk ranges, maintenance matrix),
//! its store and the resolvers that read it.

pub mod document;
pub mod resolver;
pub mod store;

pub use document::{Band, MatrixDocument, MatrixError, RiskDimension, DEFAULT_DOCUMENT};
pub use resolver::{maintenance_key, ComplianceBand};
pub use store::{MatrixCache, MatrixConfig, MatrixConfigStore};
