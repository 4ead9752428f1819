//! End-to-end runs of the resolver against a scripted hosting API and mirrors.

use std::path::Path;
use std::sync::Arc;

use depotsync::{Config, EntryFailurePolicy, Error, Resolver};
use depotsync_fetch::mock::{MockHttpClient, MockReply};
use depotsync_fetch::{EndpointTemplate, Locality, MirrorSet};
use tempfile::tempdir;

const API: &str = "https://api.test";
const APP: &str = "228980";

const MANIFESTS: [&str; 5] = [
    "1000_50.manifest",
    "1000_75.manifest",
    "1000_60.manifest",
    "2000_1.manifest",
    "readme.manifest",
];

const KEY_FILE: &str = r#""depots"
{
    "1000" { "DecryptionKey" "aaaa" }
    "2000" { "DecryptionKey" "bbbb" }
}"#;

fn config(storage: &Path) -> Config {
    Config {
        repositories: vec!["o/a".into(), "o/b".into(), "o/c".into()],
        api_base: API.into(),
        storage_dir: storage.to_path_buf(),
        mirrors: MirrorSet {
            restricted: vec![EndpointTemplate::new("https://cn/{repo}/{sha}/{path}").unwrap()],
            global: vec![
                EndpointTemplate::new("https://m1/{repo}/{sha}/{path}").unwrap(),
                EndpointTemplate::new("https://m2/{repo}/{sha}/{path}").unwrap(),
            ],
        },
        ..Config::default()
    }
}

fn branch(sha: &str, date: &str) -> MockReply {
    MockReply::ok(format!(
        r#"{{"commit": {{"sha": "{sha}", "commit": {{"author": {{"date": "{date}"}}, "tree": {{"sha": "t-{sha}"}}}}}}}}"#
    ))
}

fn mirror(path: &str) -> String {
    format!("https://m2/o/b/c-b/{path}")
}

fn hosting() -> MockHttpClient {
    let tree: Vec<String> = MANIFESTS
        .iter()
        .chain(["Key.vdf", "README.md"].iter())
        .map(|p| format!(r#"{{"path": "{p}", "type": "blob"}}"#))
        .collect();

    MockHttpClient::new()
        .on(
            format!("{API}/repos/o/a/branches/{APP}"),
            branch("c-a", "2023-01-01T00:00:00Z"),
        )
        .on(
            format!("{API}/repos/o/b/branches/{APP}"),
            branch("c-b", "2024-03-01T00:00:00Z"),
        )
        .on(
            format!("{API}/repos/o/b/git/commits/c-b"),
            MockReply::ok(r#"{"sha": "c-b", "tree": {"sha": "t-b"}}"#),
        )
        .on(
            format!("{API}/repos/o/b/git/trees/t-b?recursive=1"),
            MockReply::ok(format!(r#"{{"tree": [{}]}}"#, tree.join(","))),
        )
        .on(mirror("Key.vdf"), MockReply::ok(KEY_FILE))
}

fn with_manifests(client: MockHttpClient, skip: &[&str]) -> MockHttpClient {
    MANIFESTS
        .iter()
        .filter(|p| !skip.contains(p))
        .fold(client, |c, p| c.on(mirror(p), MockReply::ok(format!("content of {p}"))))
}

fn ids(run: &depotsync::Resolution, depot: &str) -> Vec<String> {
    run.depots
        .get(depot)
        .unwrap()
        .iter()
        .map(|m| m.to_string())
        .collect()
}

#[tokio::test]
async fn test_full_run_selects_newest_and_maps_depots() {
    let dir = tempdir().unwrap();
    let client = Arc::new(with_manifests(hosting(), &[]));
    let resolver = Resolver::new(client.clone(), &config(dir.path()), Locality::Global).unwrap();

    let run = resolver.resolve_and_fetch(APP).await.unwrap();

    let repo = run.repository.as_ref().unwrap();
    assert_eq!(repo.repo, "o/b");
    assert_eq!(repo.sha, "c-b");

    assert_eq!(ids(&run, "1000"), vec!["75", "60", "50"]);
    assert_eq!(ids(&run, "2000"), vec!["1"]);
    assert_eq!(run.depots.len(), 2);

    let keys: Vec<(String, String)> = run
        .depot_keys
        .iter()
        .map(|k| (k.depot.to_string(), k.key.clone()))
        .collect();
    assert_eq!(
        keys,
        vec![
            ("1000".to_string(), "aaaa".to_string()),
            ("2000".to_string(), "bbbb".to_string())
        ]
    );

    assert_eq!(run.downloaded.len(), MANIFESTS.len());
    assert!(run.already_present.is_empty());
    assert!(!run.is_partial());

    let on_disk = std::fs::read(dir.path().join("1000_75.manifest")).unwrap();
    assert_eq!(on_disk, b"content of 1000_75.manifest");
    assert!(!client.requests().iter().any(|u| u.contains("README.md")));
    assert_eq!(resolver.store().root(), dir.path());
}

#[tokio::test]
async fn test_second_run_downloads_nothing_new() {
    let dir = tempdir().unwrap();
    let client = Arc::new(with_manifests(hosting(), &[]));
    let resolver = Resolver::new(client.clone(), &config(dir.path()), Locality::Global).unwrap();

    let first = resolver.resolve_and_fetch(APP).await.unwrap();
    client.clear_requests();
    let second = resolver.resolve_and_fetch(APP).await.unwrap();

    assert!(second.downloaded.is_empty());
    assert_eq!(second.already_present.len(), MANIFESTS.len());
    assert_eq!(second.depots, first.depots);
    assert_eq!(second.depot_keys, first.depot_keys);

    let manifest_fetches = client
        .requests()
        .into_iter()
        .filter(|u| u.ends_with(".manifest"))
        .count();
    assert_eq!(manifest_fetches, 0);
    assert!(second.deliverable_files(resolver.store()).is_empty());
}

#[tokio::test]
async fn test_no_matching_repository_is_empty_not_error() {
    let dir = tempdir().unwrap();
    let client = Arc::new(MockHttpClient::new());
    let resolver = Resolver::new(client.clone(), &config(dir.path()), Locality::Global).unwrap();

    let run = resolver.resolve_and_fetch("999").await.unwrap();

    assert!(run.repository.is_none());
    assert!(run.is_empty());
    assert!(run.downloaded.is_empty());
    assert_eq!(client.request_count(), 3);
}

#[tokio::test]
async fn test_fail_fast_names_the_missing_file() {
    let dir = tempdir().unwrap();
    let client = Arc::new(with_manifests(hosting(), &["1000_60.manifest"]));
    let resolver = Resolver::new(client.clone(), &config(dir.path()), Locality::Global).unwrap();

    let err = resolver.resolve_and_fetch(APP).await.unwrap_err();

    match err {
        Error::Fetch(depotsync_fetch::Error::ContentUnavailable { path, attempts }) => {
            assert_eq!(path, "1000_60.manifest");
            assert_eq!(attempts, 3 * 2);
        }
        other => panic!("unexpected error: {other}"),
    }
    let tries = client
        .requests()
        .into_iter()
        .filter(|u| u.ends_with("/1000_60.manifest"))
        .count();
    assert_eq!(tries, 6);
    // Files written before the failure stay on disk.
    assert!(dir.path().join("1000_50.manifest").exists());
}

#[tokio::test]
async fn test_best_effort_keeps_going() {
    let dir = tempdir().unwrap();
    let client = Arc::new(with_manifests(hosting(), &["1000_60.manifest"]));
    let resolver = Resolver::new(client, &config(dir.path()), Locality::Global)
        .unwrap()
        .with_policy(EntryFailurePolicy::BestEffort);

    let run = resolver.resolve_and_fetch(APP).await.unwrap();

    assert!(run.is_partial());
    assert_eq!(run.failures.len(), 1);
    assert_eq!(run.failures[0].path, "1000_60.manifest");
    assert!(run.failures[0].message.contains("1000_60.manifest"));
    assert_eq!(ids(&run, "1000"), vec!["75", "50"]);
    assert_eq!(run.depot_keys.len(), 2);
}

#[tokio::test]
async fn test_restricted_locality_uses_its_own_mirrors() {
    let dir = tempdir().unwrap();
    let client = Arc::new(hosting());
    let resolver = Resolver::new(client.clone(), &config(dir.path()), Locality::Restricted)
        .unwrap()
        .with_policy(EntryFailurePolicy::BestEffort);

    let run = resolver.resolve_and_fetch(APP).await.unwrap();

    assert_eq!(run.failures.len(), MANIFESTS.len() + 1);
    let mirror_requests: Vec<String> = client
        .requests()
        .into_iter()
        .filter(|u| !u.starts_with(API))
        .collect();
    assert!(mirror_requests.iter().all(|u| u.starts_with("https://cn/")));
    assert_eq!(mirror_requests.len(), (MANIFESTS.len() + 1) * 3);
}

#[tokio::test]
async fn test_deliverables_and_fresh_start() {
    let dir = tempdir().unwrap();
    let client = Arc::new(with_manifests(hosting(), &[]));
    let resolver = Resolver::new(client, &config(dir.path()), Locality::Global).unwrap();

    let first = resolver.resolve_and_fetch(APP).await.unwrap();
    let files = first.deliverable_files(resolver.store());
    assert_eq!(files.len(), MANIFESTS.len());
    assert!(files.iter().all(|f| f.starts_with(dir.path())));

    assert_eq!(resolver.store().clear().unwrap(), MANIFESTS.len());
    let again = resolver.resolve_and_fetch(APP).await.unwrap();
    assert_eq!(again.downloaded, first.downloaded);
}

#[tokio::test]
async fn test_api_gets_auth_headers_and_mirrors_do_not() {
    let dir = tempdir().unwrap();
    let client = Arc::new(with_manifests(hosting(), &[]));
    let mut config = config(dir.path());
    config.token = Some("secret".into());
    let resolver = Resolver::new(client.clone(), &config, Locality::Global).unwrap();

    resolver.resolve_and_fetch(APP).await.unwrap();

    let api_headers = client
        .headers_for(&format!("{API}/repos/o/b/branches/{APP}"))
        .unwrap();
    assert!(api_headers.iter().any(|(k, v)| k == "Authorization" && v == "Bearer secret"));
    assert_eq!(client.headers_for(&mirror("Key.vdf")), Some(Vec::new()));
}

#[tokio::test]
async fn test_invalid_app_id_rejected_before_any_request() {
    let dir = tempdir().unwrap();
    let client = Arc::new(MockHttpClient::new());
    let resolver = Resolver::new(client.clone(), &config(dir.path()), Locality::Global).unwrap();

    let err = resolver.resolve_and_fetch("12/../34").await.unwrap_err();

    assert!(matches!(err, Error::InvalidAppId(_)));
    assert_eq!(client.request_count(), 0);
}
