//! Core data models for the Graviton finder

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Cache engine reported by the inventory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    Redis,
    Memcached,
    /// Any engine name the classifier has no version floor for
    Other(String),
}

impl Engine {
    pub fn parse(name: &str) -> Self {
        match name {
            "redis" => Engine::Redis,
            "memcached" => Engine::Memcached,
            other => Engine::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Engine::Redis => "redis",
            Engine::Memcached => "memcached",
            Engine::Other(name) => name,
        }
    }
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cluster as returned by the inventory service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheCluster {
    pub cluster_id: String,
    pub engine: String,
    pub engine_version: String,
    pub node_type: String,
}

/// Reservation as returned by the inventory service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservedNode {
    pub node_type: String,
    pub node_count: u32,
    pub state: String,
}

/// One page of an inventory listing
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Continuation marker; `None` on the last page
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_cursor: None,
        }
    }
}

/// Classified cluster, one row of the candidate report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterRecord {
    pub cluster_id: String,
    pub engine: Engine,
    pub engine_version: String,
    pub node_type: String,
    pub is_candidate: bool,
}

/// Deployed and reserved node counts for one node type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceTypeCounter {
    pub node_type: String,
    pub deployed_count: u32,
    pub reserved_count: u32,
}

impl InstanceTypeCounter {
    fn new(node_type: &str) -> Self {
        Self {
            node_type: node_type.to_string(),
            deployed_count: 0,
            reserved_count: 0,
        }
    }

    /// Deployed minus reserved; positive means under-reserved
    pub fn gap(&self) -> i64 {
        i64::from(self.deployed_count) - i64::from(self.reserved_count)
    }
}

/// Per node type counters, kept in first-seen order.
///
/// A node type seen only in reservations keeps a deployed count of 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeCounts {
    counters: IndexMap<String, InstanceTypeCounter>,
}

impl NodeCounts {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, node_type: &str) -> &mut InstanceTypeCounter {
        self.counters
            .entry(node_type.to_string())
            .or_insert_with(|| InstanceTypeCounter::new(node_type))
    }

    /// Count one more deployed cluster of this node type
    pub fn record_deployed(&mut self, node_type: &str) {
        self.entry(node_type).deployed_count += 1;
    }

    /// Add reserved nodes for this node type
    pub fn record_reserved(&mut self, node_type: &str, count: u32) {
        let counter = self.entry(node_type);
        counter.reserved_count = counter.reserved_count.saturating_add(count);
    }

    pub fn get(&self, node_type: &str) -> Option<&InstanceTypeCounter> {
        self.counters.get(node_type)
    }

    pub fn iter(&self) -> impl Iterator<Item = &InstanceTypeCounter> {
        self.counters.values()
    }

    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    pub fn total_deployed(&self) -> u64 {
        self.iter().map(|c| u64::from(c.deployed_count)).sum()
    }

    pub fn total_reserved(&self) -> u64 {
        self.iter().map(|c| u64::from(c.reserved_count)).sum()
    }

    /// Rows for the reservation summary report
    pub fn summary_rows(&self) -> Vec<SummaryRow> {
        self.iter().map(SummaryRow::from).collect()
    }
}

/// One row of the reservation summary report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub node_type: String,
    pub reserved: u32,
    pub deployed: u32,
    pub diff: i64,
}

impl From<&InstanceTypeCounter> for SummaryRow {
    fn from(counter: &InstanceTypeCounter) -> Self {
        Self {
            node_type: counter.node_type.clone(),
            reserved: counter.reserved_count,
            deployed: counter.deployed_count,
            diff: counter.gap(),
        }
    }
}

/// Both report tables for one invocation
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunResult {
    pub candidate_rows: Vec<ClusterRecord>,
    pub summary_rows: Vec<SummaryRow>,
}

impl RunResult {
    pub fn candidate_count(&self) -> usize {
        self.candidate_rows.iter().filter(|r| r.is_candidate).count()
    }

    /// Node types with more deployed than reserved nodes
    pub fn under_reserved(&self) -> impl Iterator<Item = &SummaryRow> {
        self.summary_rows.iter().filter(|r| r.diff > 0)
    }
}
