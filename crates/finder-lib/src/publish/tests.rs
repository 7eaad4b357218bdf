//! Integration tests for the pipeline
//!
//! Every AWS collaborator is replaced by an in-memory fake so a run can be
//! checked end to end: alerts sent, files uploaded, failures reported.

use super::*;
use crate::config::test_config;
use crate::models::{CacheCluster, ReservedNode};
use crate::notify::{ERROR_SUBJECT, GRAVITON_SUBJECT, RESERVATION_SUBJECT};
use crate::testing::{
    cluster, reservation, PagedInventory, RecordingChannel, RecordingStore,
};
use std::time::Duration;
use tempfile::TempDir;

struct Harness {
    pipeline: Pipeline,
    channel: Arc<RecordingChannel>,
    store: Arc<RecordingStore>,
    _report_dir: TempDir,
}

fn harness(
    clusters: PagedInventory<CacheCluster>,
    reservations: PagedInventory<ReservedNode>,
    channel: RecordingChannel,
    store: RecordingStore,
) -> Harness {
    let report_dir = TempDir::new().unwrap();
    let mut config = test_config();
    config.report_dir = report_dir.path().to_path_buf();

    let channel = Arc::new(channel);
    let store = Arc::new(store);
    let services = Services {
        clusters: Arc::new(clusters),
        reservations: Arc::new(reservations),
        store: store.clone(),
        channel: channel.clone(),
    };
    let notifier = Notifier::new(
        channel.clone(),
        &config.alert_topic,
        &config.findings_topic,
    )
    .with_retry_delay(Duration::ZERO);

    Harness {
        pipeline: Pipeline::new(config, services).with_notifier(notifier),
        channel,
        store,
        _report_dir: report_dir,
    }
}

fn sample_clusters() -> PagedInventory<CacheCluster> {
    PagedInventory::new(vec![
        vec![
            cluster("orders", "redis", "6.2", "cache.m5.large"),
            cluster("legacy", "redis", "5.0.6", "cache.m5.large"),
            cluster("small", "redis", "7.0", "cache.t3.micro"),
        ],
        vec![
            cluster("sessions", "memcached", "1.5.16", "cache.r5.large"),
            cluster("migrated", "redis", "7.0", "cache.r6g.large"),
        ],
    ])
}

fn sample_reservations() -> PagedInventory<ReservedNode> {
    PagedInventory::single(vec![
        reservation("cache.m5.large", 3, "active"),
        reservation("cache.r5.large", 4, "retired"),
    ])
}

mod run_tests {
    use super::*;

    #[tokio::test]
    async fn test_full_run_uploads_both_reports() {
        let h = harness(
            sample_clusters(),
            sample_reservations(),
            RecordingChannel::new(),
            RecordingStore::new(),
        );

        let report = h.pipeline.run().await.unwrap();

        assert_eq!(report.clusters_scanned, 5);
        assert_eq!(report.clusters_included, 3);
        assert_eq!(report.candidates, 1);
        assert_eq!(report.node_types, 2);
        assert_eq!(report.under_reserved, vec!["cache.r5.large".to_string()]);
        assert!(report.graviton_alert_sent);
        assert!(report.reservation_alert_sent);

        let uploads = h.store.uploads();
        assert_eq!(uploads.len(), 2);
        assert_eq!(uploads[0].bucket, "reports");
        assert_eq!(uploads[0].key, "elasticache/elasticache-graviton.csv");
        assert_eq!(
            uploads[0].body,
            ",Cluster Id,Engine,Version,Graviton,Node Type\n\
             0,orders,redis,6.2,yes,cache.m5.large\n\
             1,legacy,redis,5.0.6,no,cache.m5.large\n\
             2,sessions,memcached,1.5.16,no,cache.r5.large\n"
        );
        assert_eq!(uploads[1].key, "elasticache/elasticache-ri-summary.csv");
        assert_eq!(
            uploads[1].body,
            ",Node Type,Reservations,Nodes deployed,Diff\n\
             0,cache.m5.large,3,2,-1\n\
             1,cache.r5.large,0,1,1\n"
        );

        assert_eq!(
            h.channel.subjects(),
            vec![
                GRAVITON_SUBJECT.to_string(),
                RESERVATION_SUBJECT.to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_handle_returns_success_payload() {
        let h = harness(
            sample_clusters(),
            sample_reservations(),
            RecordingChannel::new(),
            RecordingStore::new(),
        );

        let response = h
            .pipeline
            .handle(&serde_json::json!({"source": "aws.events"}))
            .await
            .unwrap();

        assert_eq!(response, InvocationResponse::success());
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            serde_json::json!({"statusCode": 200, "body": "\"Success!\""})
        );
    }

    #[tokio::test]
    async fn test_no_findings_no_alerts() {
        let h = harness(
            PagedInventory::single(vec![cluster("sessions", "memcached", "1.5", "cache.m5.large")]),
            PagedInventory::single(vec![reservation("cache.m5.large", 1, "active")]),
            RecordingChannel::new(),
            RecordingStore::new(),
        );

        let report = h.pipeline.run().await.unwrap();

        assert_eq!(report.candidates, 0);
        assert!(report.under_reserved.is_empty());
        assert!(h.channel.sent().is_empty());
        assert_eq!(h.store.uploads().len(), 2);
    }

    #[tokio::test]
    async fn test_scan_is_silent() {
        let h = harness(
            sample_clusters(),
            sample_reservations(),
            RecordingChannel::new(),
            RecordingStore::new(),
        );

        let analysis = h.pipeline.scan().await.unwrap();

        assert_eq!(analysis.clusters_scanned, 5);
        assert_eq!(analysis.reservations_scanned, 2);
        assert_eq!(analysis.result.candidate_count(), 1);
        let deployed: u32 = analysis.result.summary_rows.iter().map(|r| r.deployed).sum();
        assert_eq!(deployed as usize, analysis.result.candidate_rows.len());
        assert!(h.channel.sent().is_empty());
        assert!(h.store.uploads().is_empty());
    }
}

mod failure_tests {
    use super::*;

    #[tokio::test]
    async fn test_inventory_failure_sends_one_error_alert() {
        let h = harness(
            PagedInventory::failing(),
            sample_reservations(),
            RecordingChannel::new(),
            RecordingStore::new(),
        );

        let err = h.pipeline.run().await.unwrap_err();

        assert!(matches!(err, FinderError::Inventory(_)));
        let sent = h.channel.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, ERROR_SUBJECT);
        assert_eq!(sent[0].topic, test_config().alert_topic);
        assert_eq!(sent[0].message, err.to_string());
        assert!(h.store.uploads().is_empty());
    }

    #[tokio::test]
    async fn test_reservation_failure_aborts_before_upload() {
        let h = harness(
            sample_clusters(),
            PagedInventory::failing(),
            RecordingChannel::new(),
            RecordingStore::new(),
        );

        let err = h.pipeline.run().await.unwrap_err();

        assert!(matches!(err, FinderError::Inventory(_)));
        assert_eq!(
            h.channel.subjects(),
            vec![GRAVITON_SUBJECT.to_string(), ERROR_SUBJECT.to_string()]
        );
        assert!(h.store.uploads().is_empty());
    }

    #[tokio::test]
    async fn test_upload_failure_is_reported() {
        let h = harness(
            sample_clusters(),
            sample_reservations(),
            RecordingChannel::new(),
            RecordingStore::failing(),
        );

        let err = h.pipeline.run().await.unwrap_err();

        assert!(matches!(err, FinderError::Upload { .. }));
        let sent = h.channel.sent();
        let errors: Vec<_> = sent.iter().filter(|a| a.subject == ERROR_SUBJECT).collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("AccessDenied"));
    }

    #[tokio::test]
    async fn test_publish_failing_once_is_retried() {
        let h = harness(
            sample_clusters(),
            sample_reservations(),
            RecordingChannel::failing_first(1),
            RecordingStore::new(),
        );

        let report = h.pipeline.run().await.unwrap();

        assert!(report.graviton_alert_sent);
        // graviton alert: 2 attempts, reservation alert: 1 attempt
        assert_eq!(h.channel.attempts(), 3);
        assert_eq!(h.store.uploads().len(), 2);
    }

    #[tokio::test]
    async fn test_persistent_publish_failure_is_bounded() {
        let h = harness(
            sample_clusters(),
            sample_reservations(),
            RecordingChannel::always_failing(),
            RecordingStore::new(),
        );

        let err = h.pipeline.run().await.unwrap_err();

        assert!(matches!(err, FinderError::Notify { .. }));
        // findings alert: 2 attempts, then the error alert: 2 attempts
        assert_eq!(h.channel.attempts(), 4);
        assert!(h.store.uploads().is_empty());
    }
}
