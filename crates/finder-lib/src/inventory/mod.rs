//! Inventory sources for cache clusters and reserved nodes
//!
//! Both listings are cursor paginated: a page carries a continuation
//! marker until the last page. The ElastiCache implementation backs both
//! traits; tests substitute in-memory pages.

mod elasticache;

pub use elasticache::ElastiCacheInventory;

use crate::error::FinderError;
use crate::models::{CacheCluster, Page, ReservedNode};

pub use async_trait::async_trait;

/// Paginated listing of cache clusters
#[async_trait]
pub trait ClusterInventory: Send + Sync {
    /// Fetch one page, starting from `cursor` when given
    async fn list_clusters(&self, cursor: Option<String>)
        -> Result<Page<CacheCluster>, FinderError>;
}

/// Paginated listing of reserved cache nodes
#[async_trait]
pub trait ReservationInventory: Send + Sync {
    /// Fetch one page, starting from `cursor` when given
    async fn list_reservations(
        &self,
        cursor: Option<String>,
    ) -> Result<Page<ReservedNode>, FinderError>;
}

/// Node type filter shared by the classifier and the reconciler
#[derive(Debug, Clone)]
pub struct NodeTypeFilter {
    size_family: String,
    excluded_marker: String,
}

impl NodeTypeFilter {
    pub fn new(size_family: impl Into<String>, excluded_marker: impl Into<String>) -> Self {
        Self {
            size_family: size_family.into(),
            excluded_marker: excluded_marker.into(),
        }
    }

    /// True when the node type is in the size family and not yet on Graviton
    pub fn matches(&self, node_type: &str) -> bool {
        node_type.contains(&self.size_family) && !node_type.contains(&self.excluded_marker)
    }
}

/// Normalise a continuation marker; an empty marker ends the listing
pub(crate) fn next_cursor(marker: Option<&str>) -> Option<String> {
    marker.filter(|m| !m.is_empty()).map(str::to_string)
}
