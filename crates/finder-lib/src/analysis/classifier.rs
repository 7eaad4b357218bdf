//! Graviton candidacy classification

use tracing::{debug, info};

use crate::error::FinderError;
use crate::inventory::{ClusterInventory, NodeTypeFilter};
use crate::models::{CacheCluster, ClusterRecord, Engine, NodeCounts};
use crate::notify::RunAlerts;

/// Candidacy rule.
///
/// Versions are compared as raw strings, so "6.10" sorts before "6.2".
pub fn is_candidate(
    engine: &Engine,
    version: &str,
    redis_min_version: &str,
    memcached_min_version: &str,
) -> bool {
    match engine {
        Engine::Redis => version >= redis_min_version,
        Engine::Memcached => version >= memcached_min_version,
        Engine::Other(_) => false,
    }
}

/// Output of a classification pass
#[derive(Debug, Clone, Default)]
pub struct Classification {
    /// One row per included cluster, in listing order
    pub rows: Vec<ClusterRecord>,
    /// Deployed counts per node type
    pub counts: NodeCounts,
    /// Clusters returned by the inventory, included or not
    pub scanned: usize,
    /// Pages fetched
    pub pages: usize,
}

impl Classification {
    pub fn candidates(&self) -> impl Iterator<Item = &ClusterRecord> {
        self.rows.iter().filter(|r| r.is_candidate)
    }
}

/// Classifies clusters in the configured node-size family
#[derive(Debug, Clone)]
pub struct ClusterClassifier {
    filter: NodeTypeFilter,
    redis_min_version: String,
    memcached_min_version: String,
}

impl ClusterClassifier {
    pub fn new(
        filter: NodeTypeFilter,
        redis_min_version: impl Into<String>,
        memcached_min_version: impl Into<String>,
    ) -> Self {
        Self {
            filter,
            redis_min_version: redis_min_version.into(),
            memcached_min_version: memcached_min_version.into(),
        }
    }

    /// Classify one inventory cluster; `None` when the filter excludes it
    pub fn classify_cluster(&self, cluster: CacheCluster) -> Option<ClusterRecord> {
        if !self.filter.matches(&cluster.node_type) {
            return None;
        }

        let engine = Engine::parse(&cluster.engine);
        let candidate = is_candidate(
            &engine,
            &cluster.engine_version,
            &self.redis_min_version,
            &self.memcached_min_version,
        );

        Some(ClusterRecord {
            cluster_id: cluster.cluster_id,
            engine,
            engine_version: cluster.engine_version,
            node_type: cluster.node_type,
            is_candidate: candidate,
        })
    }

    /// Walk every cluster page and classify the clusters in scope.
    ///
    /// The first candidate triggers the Graviton findings alert.
    pub async fn classify(
        &self,
        inventory: &dyn ClusterInventory,
        alerts: &mut RunAlerts<'_>,
    ) -> Result<Classification, FinderError> {
        let mut result = Classification::default();
        let mut cursor = None;

        loop {
            let page = inventory.list_clusters(cursor.take()).await?;
            result.pages += 1;
            result.scanned += page.items.len();
            debug!(
                event = "page_fetched",
                resource = "clusters",
                page = result.pages,
                items = page.items.len(),
                "Fetched cluster page"
            );

            for cluster in page.items {
                let Some(record) = self.classify_cluster(cluster) else {
                    continue;
                };

                result.counts.record_deployed(&record.node_type);
                if record.is_candidate {
                    info!(
                        event = "candidate_found",
                        cluster_id = %record.cluster_id,
                        engine = %record.engine,
                        engine_version = %record.engine_version,
                        node_type = %record.node_type,
                        "Graviton candidate found"
                    );
                    alerts.graviton_candidates_found().await?;
                }
                result.rows.push(record);
            }

            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        Ok(result)
    }
}
