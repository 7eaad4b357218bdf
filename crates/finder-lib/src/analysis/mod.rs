//! Cluster classification and reservation reconciliation
//!
//! This module provides:
//! - Graviton candidacy classification over the full cluster inventory
//! - Deployed versus reserved node counts per node type

mod classifier;
mod reconciler;

pub use classifier::{is_candidate, Classification, ClusterClassifier};
pub use reconciler::{Reconciliation, ReservationReconciler};

/// Reservation state counted by the reconciler
pub const ACTIVE_STATE: &str = "active";
