use email_domain_filter::core::{FetchPolicy, Storage};
use email_domain_filter::{
    AggregatePipeline, AggregatorConfig, EtlEngine, FilterError, LocalStorage, MemoryStorage,
};
use httpmock::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

fn sources_json(server: &MockServer) -> String {
    serde_json::json!({
        "disposable": [
            {"name": "blocklist", "url": server.url("/blocklist.conf")}
        ],
        "free_paid": [
            {"name": "all-providers", "url": server.url("/providers.txt")}
        ]
    })
    .to_string()
}

fn mock_sources(server: &MockServer) {
    server.mock(|when, then| {
        when.method(GET).path("/blocklist.conf");
        then.status(200)
            .body("# disposable\nmailinator.com\n10minutemail.com\nGuerrillaMail.com\n");
    });
    server.mock(|when, then| {
        when.method(GET).path("/providers.txt");
        then.status(200)
            .body("gmail.com\nyahoo.com\nmailinator.com\nprotonmail.com\n\n");
    });
}

async fn seed_sources<S: Storage>(storage: &S, server: &MockServer) {
    storage
        .write_file("sources/sources.json", sources_json(server).as_bytes())
        .await
        .unwrap();
    storage
        .write_file("sources/custom_disposable.txt", b"# ours\nemailhook.site\n")
        .await
        .unwrap();
    storage
        .write_file("sources/paid_personal.txt", b"protonmail.com\nhey.com\n")
        .await
        .unwrap();
    storage
        .write_file("sources/allowlist.txt", b"mailinator.com\n")
        .await
        .unwrap();
}

fn config_for(root: &std::path::Path) -> AggregatorConfig {
    AggregatorConfig {
        root: root.to_path_buf(),
        ..Default::default()
    }
}

async fn run<S: Storage>(storage: S, config: AggregatorConfig) -> email_domain_filter::Result<String> {
    let fetcher = config.fetcher().unwrap();
    let pipeline = AggregatePipeline::new(storage, config, fetcher);
    EtlEngine::new(pipeline).run().await
}

fn read_json(path: std::path::PathBuf) -> Value {
    serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
}

#[tokio::test]
async fn test_end_to_end_aggregation_on_disk() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();
    mock_sources(&server);

    let storage = LocalStorage::new(temp_dir.path());
    seed_sources(&storage, &server).await;

    let output_path = run(storage.clone(), config_for(temp_dir.path()))
        .await
        .unwrap();
    assert_eq!(output_path, "output/email_domains.json");

    let output = read_json(storage.resolve("output/email_domains.json"));
    assert_eq!(
        output["domains"]["disposable"],
        serde_json::json!(["10minutemail.com", "emailhook.site", "guerrillamail.com"])
    );
    // mailinator is allowlisted out of disposable and, having come from a
    // disposable source, is kept out of free as well
    assert_eq!(output["domains"]["free"], serde_json::json!(["gmail.com", "yahoo.com"]));
    assert_eq!(
        output["domains"]["paid_personal"],
        serde_json::json!(["hey.com", "protonmail.com"])
    );
    assert_eq!(output["metadata"]["total_domains"], 7);
    assert_eq!(output["metadata"]["categories"]["free"], 2);
    assert!(output["metadata"]["generated"]
        .as_str()
        .unwrap()
        .ends_with("+00:00"));

    let csv = std::fs::read_to_string(storage.resolve("output/email_domains.csv")).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("domain,category"));
    assert_eq!(lines.next(), Some("10minutemail.com,disposable"));
    assert_eq!(csv.lines().count(), 8);
    assert!(csv.contains("hey.com,paid_personal"));

    let free = std::fs::read_to_string(storage.resolve("output/free.txt")).unwrap();
    assert_eq!(free, "gmail.com\nyahoo.com\n");

    let stats = read_json(storage.resolve("output/source_stats.json"));
    assert_eq!(stats["total_final_domains"], 7);
    assert_eq!(stats["sources"]["all-providers"]["total"], 4);
    // all-providers is largest, so it is credited with mailinator.com
    assert_eq!(stats["sources"]["blocklist"]["unique_contribution"], 2);
    assert_eq!(stats["sources"]["blocklist"]["overlap"], 1);
    assert_eq!(stats["sources"]["paid-personal"]["overlap"], 1);

    let delta = read_json(storage.resolve("output/delta.json"));
    assert_eq!(delta["total_added"], 7);
    assert_eq!(delta["total_removed"], 0);
    assert_eq!(delta["categories"]["disposable"]["added"], 3);

    assert!(storage.exists("temp/disposable_0.txt").await);
    assert!(storage.exists("temp/free_paid_0.txt").await);
}

#[tokio::test]
async fn test_unchanged_rerun_preserves_timestamp_and_reports_no_delta() {
    let server = MockServer::start();
    mock_sources(&server);

    let storage = MemoryStorage::new();
    seed_sources(&storage, &server).await;

    run(storage.clone(), AggregatorConfig::default()).await.unwrap();
    let first = storage.get_text("output/email_domains.json").await.unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    run(storage.clone(), AggregatorConfig::default()).await.unwrap();
    let second = storage.get_text("output/email_domains.json").await.unwrap();

    assert_eq!(first, second);

    let delta: Value =
        serde_json::from_str(&storage.get_text("output/delta.json").await.unwrap()).unwrap();
    assert_eq!(delta["total_added"], 0);
    assert_eq!(delta["total_removed"], 0);
    assert_eq!(delta["total_domains"], 7);
}

#[tokio::test]
async fn test_changed_source_updates_delta() {
    let server = MockServer::start();
    mock_sources(&server);

    let storage = MemoryStorage::new();
    seed_sources(&storage, &server).await;
    run(storage.clone(), AggregatorConfig::default()).await.unwrap();

    // drop one custom domain and add another
    storage
        .write_file("sources/custom_disposable.txt", b"yopmail.com\n")
        .await
        .unwrap();
    run(storage.clone(), AggregatorConfig::default()).await.unwrap();

    let delta: Value =
        serde_json::from_str(&storage.get_text("output/delta.json").await.unwrap()).unwrap();
    assert_eq!(delta["categories"]["disposable"]["added"], 1);
    assert_eq!(delta["categories"]["disposable"]["removed"], 1);
    assert_eq!(delta["categories"]["free"]["added"], 0);
    assert_eq!(delta["total_added"], 1);
    assert_eq!(delta["total_removed"], 1);

    let disposable = storage.get_text("output/disposable.txt").await.unwrap();
    assert_eq!(disposable, "10minutemail.com\nguerrillamail.com\nyopmail.com\n");
}

#[tokio::test]
async fn test_fetch_failure_aborts_without_output() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/blocklist.conf");
        then.status(200).body("mailinator.com\n");
    });
    let providers = server.mock(|when, then| {
        when.method(GET).path("/providers.txt");
        then.status(503);
    });

    let storage = MemoryStorage::new();
    seed_sources(&storage, &server).await;

    let err = run(storage.clone(), AggregatorConfig::default())
        .await
        .unwrap_err();

    providers.assert();
    assert!(matches!(err, FilterError::HttpStatus { status: 503, .. }));
    assert_eq!(err.exit_code(), 2);
    assert!(!storage.exists("output/email_domains.json").await);
    assert!(!storage.exists("output/delta.json").await);
}

#[tokio::test]
async fn test_missing_sources_config_is_fatal() {
    let storage = MemoryStorage::new();

    let err = run(storage.clone(), AggregatorConfig::default())
        .await
        .unwrap_err();

    assert!(matches!(err, FilterError::ConfigurationMissing { ref path } if path == "sources/sources.json"));
    assert!(storage.paths().await.is_empty());
}

#[tokio::test]
async fn test_optional_local_lists_may_be_absent() {
    let server = MockServer::start();
    mock_sources(&server);

    let storage = MemoryStorage::new();
    storage
        .write_file("sources/sources.json", sources_json(&server).as_bytes())
        .await
        .unwrap();

    run(storage.clone(), AggregatorConfig::default()).await.unwrap();

    let output: Value =
        serde_json::from_str(&storage.get_text("output/email_domains.json").await.unwrap())
            .unwrap();
    assert_eq!(
        output["domains"]["disposable"],
        serde_json::json!(["10minutemail.com", "guerrillamail.com", "mailinator.com"])
    );
    assert_eq!(
        output["domains"]["free"],
        serde_json::json!(["gmail.com", "protonmail.com", "yahoo.com"])
    );
    assert_eq!(output["domains"]["paid_personal"], serde_json::json!([]));
}

#[tokio::test]
async fn test_reuse_existing_policy_uses_cached_download() {
    let server = MockServer::start();
    let blocklist = server.mock(|when, then| {
        when.method(GET).path("/blocklist.conf");
        then.status(200).body("fresh.example\n");
    });
    server.mock(|when, then| {
        when.method(GET).path("/providers.txt");
        then.status(200).body("gmail.com\n");
    });

    let storage = MemoryStorage::new();
    seed_sources(&storage, &server).await;
    storage
        .write_file("temp/disposable_0.txt", b"cached.example\n")
        .await
        .unwrap();

    let config = AggregatorConfig {
        fetch_policy: FetchPolicy::ReuseExisting,
        ..Default::default()
    };
    run(storage.clone(), config).await.unwrap();

    blocklist.assert_hits(0);
    let disposable = storage.get_text("output/disposable.txt").await.unwrap();
    assert_eq!(disposable, "cached.example\nemailhook.site\n");
}

#[tokio::test]
async fn test_corrupt_previous_output_is_replaced() {
    let server = MockServer::start();
    mock_sources(&server);

    let storage = MemoryStorage::new();
    seed_sources(&storage, &server).await;
    storage
        .write_file("output/email_domains.json", b"{\"domains\": [")
        .await
        .unwrap();

    run(storage.clone(), AggregatorConfig::default()).await.unwrap();

    let output: Value =
        serde_json::from_str(&storage.get_text("output/email_domains.json").await.unwrap())
            .unwrap();
    assert_eq!(output["metadata"]["total_domains"], 7);
}
