//! ElastiCache-backed inventory

use aws_sdk_elasticache::error::DisplayErrorContext;
use aws_sdk_elasticache::config::Region;
use aws_sdk_elasticache::Client;
use tracing::debug;

use super::{async_trait, next_cursor, ClusterInventory, ReservationInventory};
use crate::error::FinderError;
use crate::models::{CacheCluster, Page, ReservedNode};

/// Lists clusters and reserved nodes through the ElastiCache API
///
/// Required IAM permissions: `elasticache:DescribeCacheClusters` and
/// `elasticache:DescribeReservedCacheNodes`.
#[derive(Clone)]
pub struct ElastiCacheInventory {
    client: Client,
}

impl ElastiCacheInventory {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build from shared SDK config, optionally pinned to another region
    pub fn from_conf(sdk_config: &aws_config::SdkConfig, region: Option<&str>) -> Self {
        let mut builder = aws_sdk_elasticache::config::Builder::from(sdk_config);
        if let Some(region) = region {
            builder = builder.region(Region::new(region.to_string()));
        }
        Self::new(Client::from_conf(builder.build()))
    }
}

#[async_trait]
impl ClusterInventory for ElastiCacheInventory {
    async fn list_clusters(
        &self,
        cursor: Option<String>,
    ) -> Result<Page<CacheCluster>, FinderError> {
        let resp = self
            .client
            .describe_cache_clusters()
            .set_marker(cursor)
            .send()
            .await
            .map_err(|e| {
                FinderError::Inventory(format!(
                    "DescribeCacheClusters: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        let items: Vec<CacheCluster> = resp
            .cache_clusters()
            .iter()
            .map(|c| CacheCluster {
                cluster_id: c.cache_cluster_id().unwrap_or_default().to_string(),
                engine: c.engine().unwrap_or_default().to_string(),
                engine_version: c.engine_version().unwrap_or_default().to_string(),
                node_type: c.cache_node_type().unwrap_or_default().to_string(),
            })
            .collect();

        debug!(clusters = items.len(), more = resp.marker().is_some(), "Fetched cluster page");

        Ok(Page {
            items,
            next_cursor: next_cursor(resp.marker()),
        })
    }
}

#[async_trait]
impl ReservationInventory for ElastiCacheInventory {
    async fn list_reservations(
        &self,
        cursor: Option<String>,
    ) -> Result<Page<ReservedNode>, FinderError> {
        let resp = self
            .client
            .describe_reserved_cache_nodes()
            .set_marker(cursor)
            .send()
            .await
            .map_err(|e| {
                FinderError::Inventory(format!(
                    "DescribeReservedCacheNodes: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        let items: Vec<ReservedNode> = resp
            .reserved_cache_nodes()
            .iter()
            .map(|r| ReservedNode {
                node_type: r.cache_node_type().unwrap_or_default().to_string(),
                node_count: r.cache_node_count().map(|n| n.max(0) as u32).unwrap_or(0),
                state: r.state().unwrap_or_default().to_string(),
            })
            .collect();

        debug!(
            reservations = items.len(),
            more = resp.marker().is_some(),
            "Fetched reservation page"
        );

        Ok(Page {
            items,
            next_cursor: next_cursor(resp.marker()),
        })
    }
}
