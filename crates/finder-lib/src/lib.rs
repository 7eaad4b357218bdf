//! Library for the ElastiCache Graviton finder
//!
//! This crate provides the core functionality for:
//! - Paginated ElastiCache cluster and reservation inventory
//! - Graviton candidacy classification
//! - Reservation versus deployment reconciliation
//! - CSV report rendering and S3 publishing
//! - SNS alerting and structured run logging

pub mod analysis;
pub mod config;
pub mod error;
pub mod inventory;
pub mod models;
pub mod notify;
pub mod observability;
pub mod publish;
pub mod report;

#[cfg(test)]
mod testing;

pub use config::FinderConfig;
pub use error::{ConfigError, FinderError};
pub use models::*;
pub use observability::RunLogger;
pub use publish::{Analysis, InvocationResponse, Pipeline, RunReport, Services};
