//! End-to-end tests for support bundle collection
//!
//! These exercise the public API only: collectors are composed with the
//! folder/node/source helpers, dispatched with `create_support_bundle`, and
//! the results inspected through the archive and the progress channel.

mod common;

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use common::{RecordingArchive, fixed};
use support_bundle::{
    Archive, BundleConfig, CLUSTER, Collector, Context, Error, Options, ProgressTracker,
    create_support_bundle, with_folder, with_node, with_source,
};
use tokio::sync::mpsc;

#[tokio::test]
async fn collect_writes_duplicates_and_node_entries() {
    let ctx = Context::new().with_timeout(Duration::from_secs(5));
    let archive = Arc::new(RecordingArchive::default());

    let mut collectors = vec![fixed("1", "something"), fixed("1", "something")];
    collectors.extend(with_node(vec![fixed("1", "another")], "n1"));

    let options = Options::new(Arc::clone(&archive) as Arc<dyn Archive>).with_num_workers(5);

    create_support_bundle(&ctx, Arc::new(options), collectors)
        .await
        .unwrap();

    assert_eq!(archive.file("1").unwrap(), b"something");
    assert_eq!(archive.file("n1/1").unwrap(), b"another");
    assert_eq!(archive.writes(), 3, "both writes to the same path are attempted");
    assert_eq!(archive.closes(), 1);
}

#[tokio::test]
async fn collect_with_progress() {
    let ctx = Context::new().with_timeout(Duration::from_secs(5));
    let archive = Arc::new(RecordingArchive::default());

    let mut collectors = Vec::with_capacity(1000);
    let mut group = 0;
    for i in 0..1000 {
        if i % 10 == 0 {
            group += 1;
        }
        collectors.extend(with_source(
            vec![fixed(&i.to_string(), "something")],
            &group.to_string(),
        ));
    }

    let (tx, mut rx) = mpsc::channel(1000);
    let options = Options::new(Arc::clone(&archive) as Arc<dyn Archive>)
        .with_num_workers(5)
        .with_progress(tx);

    create_support_bundle(&ctx, Arc::new(options), collectors)
        .await
        .unwrap();

    assert_eq!(archive.file_count(), 1000);

    let mut final_values: HashMap<String, usize> = HashMap::new();
    let mut tracker = ProgressTracker::new();
    for _ in 0..1000 {
        let progress = tokio::select! {
            progress = rx.recv() => progress.expect("progress channel closed early"),
            _ = ctx.done() => panic!("timed out waiting for progress"),
        };

        assert_eq!(progress.total, 10);
        tracker.observe(&progress);
        *final_values.entry(progress.source).or_default() += 1;
    }

    for (source, count) in &final_values {
        assert_eq!(*count, 10, "failed for source {source}");
    }
    assert!(tracker.is_complete());
    assert_eq!(tracker.failed(), 0);
}

#[tokio::test]
async fn bundle_into_zip_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = BundleConfig {
        num_workers: 3,
        nodes: vec!["10.5.0.2".into(), "10.5.0.3".into()],
        output: Some(dir.path().join("support.zip")),
    };
    let options = Arc::new(Options::from_config_with_zip(&config).unwrap());

    let mut collectors = with_source(
        vec![fixed("kubernetesResources/nodes.yaml", "kind: NodeList")],
        CLUSTER,
    );
    for node in options.nodes() {
        let node_collectors = with_folder(
            vec![Collector::new("machined.log", |ctx: Context, _| async move {
                Ok(Some(format!("log from {}", ctx.node().unwrap_or("?")).into_bytes()))
            })],
            "service-logs",
        );
        collectors.extend(with_node(node_collectors, node));
    }

    create_support_bundle(&Context::new(), Arc::clone(&options), collectors)
        .await
        .unwrap();

    let file = File::open(dir.path().join("support.zip")).unwrap();
    let mut zip = zip::ZipArchive::new(file).unwrap();
    assert_eq!(zip.len(), 3);

    let mut contents = String::new();
    zip.by_name("10.5.0.3/service-logs/machined.log")
        .unwrap()
        .read_to_string(&mut contents)
        .unwrap();
    assert_eq!(contents, "log from 10.5.0.3");
}

#[tokio::test]
async fn cancelled_run_never_closes_archive() {
    let ctx = Context::new();
    let archive = Arc::new(RecordingArchive::default());

    let collectors = (0..50)
        .map(|i| {
            Collector::new(i.to_string(), |_, _| async {
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok(Some(b"x".to_vec()))
            })
        })
        .collect();

    let canceller = {
        let ctx = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            ctx.cancel();
        })
    };

    let options = Options::new(Arc::clone(&archive) as Arc<dyn Archive>).with_num_workers(2);
    let result = create_support_bundle(&ctx, Arc::new(options), collectors).await;
    canceller.await.unwrap();

    assert!(matches!(result, Err(Error::Cancelled)), "got {result:?}");
    assert!(archive.writes() < 50);
    assert_eq!(archive.closes(), 0);
}
