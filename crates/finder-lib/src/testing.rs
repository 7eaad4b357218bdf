//! In-memory stand-ins for the AWS services used in unit tests

use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::FinderError;
use crate::inventory::{ClusterInventory, ReservationInventory};
use crate::models::{CacheCluster, Page, ReservedNode};
use crate::notify::NotificationChannel;
use crate::publish::ObjectStore;

pub fn cluster(id: &str, engine: &str, version: &str, node_type: &str) -> CacheCluster {
    CacheCluster {
        cluster_id: id.to_string(),
        engine: engine.to_string(),
        engine_version: version.to_string(),
        node_type: node_type.to_string(),
    }
}

pub fn reservation(node_type: &str, count: u32, state: &str) -> ReservedNode {
    ReservedNode {
        node_type: node_type.to_string(),
        node_count: count,
        state: state.to_string(),
    }
}

/// Serves fixed pages; page `n > 0` is addressed by cursor `page-n`
pub struct PagedInventory<T> {
    pages: Vec<Vec<T>>,
    fail: bool,
    requests: Mutex<Vec<Option<String>>>,
}

impl<T: Clone> PagedInventory<T> {
    pub fn new(pages: Vec<Vec<T>>) -> Self {
        Self {
            pages,
            fail: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn single(items: Vec<T>) -> Self {
        Self::new(vec![items])
    }

    pub fn failing() -> Self {
        Self {
            pages: Vec::new(),
            fail: true,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Cursors received, in call order
    pub fn requests(&self) -> Vec<Option<String>> {
        self.requests.lock().unwrap().clone()
    }

    fn fetch(&self, cursor: Option<String>) -> Result<Page<T>, FinderError> {
        self.requests.lock().unwrap().push(cursor.clone());
        if self.fail {
            return Err(FinderError::Inventory("ThrottlingException: Rate exceeded".to_string()));
        }

        let index = match cursor.as_deref() {
            None => 0,
            Some(c) => c
                .strip_prefix("page-")
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| FinderError::Inventory(format!("bad marker {c}")))?,
        };
        let items = self.pages.get(index).cloned().unwrap_or_default();
        let next_cursor = (index + 1 < self.pages.len()).then(|| format!("page-{}", index + 1));

        Ok(Page { items, next_cursor })
    }
}

#[async_trait]
impl ClusterInventory for PagedInventory<CacheCluster> {
    async fn list_clusters(
        &self,
        cursor: Option<String>,
    ) -> Result<Page<CacheCluster>, FinderError> {
        self.fetch(cursor)
    }
}

#[async_trait]
impl ReservationInventory for PagedInventory<ReservedNode> {
    async fn list_reservations(
        &self,
        cursor: Option<String>,
    ) -> Result<Page<ReservedNode>, FinderError> {
        self.fetch(cursor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentAlert {
    pub topic: String,
    pub message: String,
    pub subject: String,
}

/// Records publishes; can fail a number of leading attempts
pub struct RecordingChannel {
    failures_left: AtomicU32,
    attempts: AtomicU32,
    sent: Mutex<Vec<SentAlert>>,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self::failing_first(0)
    }

    pub fn failing_first(failures: u32) -> Self {
        Self {
            failures_left: AtomicU32::new(failures),
            attempts: AtomicU32::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn always_failing() -> Self {
        Self::failing_first(u32::MAX)
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<SentAlert> {
        self.sent.lock().unwrap().clone()
    }

    pub fn subjects(&self) -> Vec<String> {
        self.sent().into_iter().map(|a| a.subject).collect()
    }
}

#[async_trait]
impl NotificationChannel for RecordingChannel {
    async fn publish(&self, topic: &str, message: &str, subject: &str) -> Result<(), FinderError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(FinderError::Notify {
                topic: topic.to_string(),
                message: "InternalError".to_string(),
            });
        }

        self.sent.lock().unwrap().push(SentAlert {
            topic: topic.to_string(),
            message: message.to_string(),
            subject: subject.to_string(),
        });
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Upload {
    pub bucket: String,
    pub key: String,
    pub body: String,
}

/// Captures uploaded file contents
pub struct RecordingStore {
    fail: bool,
    uploads: Mutex<Vec<Upload>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self {
            fail: false,
            uploads: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            uploads: Mutex::new(Vec::new()),
        }
    }

    pub fn uploads(&self) -> Vec<Upload> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for RecordingStore {
    async fn upload(&self, local_path: &Path, bucket: &str, key: &str) -> Result<(), FinderError> {
        if self.fail {
            return Err(FinderError::Upload {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: "AccessDenied".to_string(),
            });
        }

        let body = tokio::fs::read_to_string(local_path).await.unwrap();
        self.uploads.lock().unwrap().push(Upload {
            bucket: bucket.to_string(),
            key: key.to_string(),
            body,
        });
        Ok(())
    }
}
