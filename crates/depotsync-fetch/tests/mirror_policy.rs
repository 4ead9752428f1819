//! Request-count bounds of the mirror walk, driven through the public API.

use std::sync::Arc;

use depotsync_fetch::mock::{MockHttpClient, MockReply};
use depotsync_fetch::{CdnFetcher, EndpointTemplate, Error, Locality, MirrorSet};

fn templates(hosts: &[&str]) -> Vec<EndpointTemplate> {
    hosts
        .iter()
        .map(|h| EndpointTemplate::new(format!("https://{h}/{{repo}}/{{sha}}/{{path}}")).unwrap())
        .collect()
}

fn mirrors() -> MirrorSet {
    MirrorSet {
        restricted: templates(&["cn-a", "cn-b", "cn-c", "cn-d"]),
        global: templates(&["raw"]),
    }
}

#[tokio::test]
async fn test_worst_case_is_rounds_times_endpoints() {
    for rounds in 1..=4 {
        let client = Arc::new(MockHttpClient::new());
        let policy = mirrors().policy(Locality::Restricted, rounds).unwrap();
        let fetcher = CdnFetcher::new(client.clone(), policy);

        let err = fetcher.fetch("o/r", "sha", "key.vdf").await.unwrap_err();

        assert!(matches!(err, Error::ContentUnavailable { ref path, .. } if path == "key.vdf"));
        assert_eq!(client.request_count(), 4 * rounds as usize);
    }
}

#[tokio::test]
async fn test_global_locality_never_touches_restricted_mirrors() {
    let client = Arc::new(
        MockHttpClient::new().on("https://raw/o/r/sha/1_2.manifest", MockReply::ok("m")),
    );
    let policy = mirrors().policy(Locality::Global, 3).unwrap();
    let fetcher = CdnFetcher::new(client.clone(), policy);

    assert_eq!(fetcher.fetch("o/r", "sha", "1_2.manifest").await.unwrap(), "m");
    assert!(client.requests().iter().all(|u| u.starts_with("https://raw/")));
}

#[test]
fn test_error_message_names_path() {
    let err = Error::ContentUnavailable {
        path: "2000_9.manifest".into(),
        attempts: 3,
    };
    assert!(err.to_string().contains("2000_9.manifest"));
}
