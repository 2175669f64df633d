//! End-to-end tests of the search pipeline against a mock GitHub API
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

use codehound_common::CorrelationId;
use codehound_config::ApplicationConfig;
use codehound_search::{CodeSearch, FetchFailurePolicy, SearchError, SearchService};
use codehound_test_utils::{
    hit_json, mount_file, mount_file_status, mount_search_page, search_page_json,
};
use std::collections::HashSet;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> ApplicationConfig {
    let mut config = ApplicationConfig::default();
    config.github.api_url = server.uri();
    config.github.token = Some("test-token".to_string());
    config
}

fn search_for(server: &MockServer) -> CodeSearch {
    CodeSearch::from_config(&config_for(server)).unwrap()
}

fn terms(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

async fn search_requests(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == "/search/code")
        .count()
}

#[tokio::test]
async fn test_no_results_makes_a_single_page_request() {
    let server = MockServer::start().await;
    mount_search_page(&server, 1, search_page_json(0, Vec::new())).await;

    let results = search_for(&server)
        .search(&terms(&["needle"]), None, 5, &[], &CorrelationId::new())
        .await
        .unwrap();

    assert!(results.is_empty());
    assert_eq!(search_requests(&server).await, 1);
}

#[tokio::test]
async fn test_pages_are_followed_until_total_count() {
    let server = MockServer::start().await;
    let base = server.uri();
    let paths = ["a.go", "b.go", "c.go", "d.go", "e.go"];

    for (index, chunk) in paths.chunks(2).enumerate() {
        let items = chunk
            .iter()
            .map(|file| hit_json(&base, "acme/tool", file))
            .collect();
        let page = u32::try_from(index + 1).unwrap();
        mount_search_page(&server, page, search_page_json(5, items)).await;
    }
    for file in paths {
        mount_file(&server, "acme/tool", file, "let needle = 1;\n").await;
    }

    let mut config = config_for(&server);
    config.github.per_page = 2;
    let results = CodeSearch::from_config(&config)
        .unwrap()
        .search(&terms(&["needle"]), Some("acme"), 3, &[], &CorrelationId::new())
        .await
        .unwrap();

    assert_eq!(results.len(), 5);
    let unique = results.iter().map(|m| m.hit.url.clone()).collect::<HashSet<_>>();
    assert_eq!(unique.len(), 5);
    assert_eq!(search_requests(&server).await, 3);
}

#[tokio::test]
async fn test_query_and_headers_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/code"))
        .and(header("authorization", "token test-token"))
        .and(header("accept", "application/vnd.github.v3.text-match+json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_page_json(0, Vec::new())))
        .expect(1)
        .mount(&server)
        .await;

    search_for(&server)
        .search(&terms(&["foo.bar"]), Some("acme"), 1, &[], &CorrelationId::new())
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let request = requests.first().unwrap();
    let query = request
        .url
        .query_pairs()
        .into_owned()
        .collect::<Vec<(String, String)>>();
    assert!(query.contains(&("q".to_string(), "foo bar org:acme".to_string())));
    assert!(query.contains(&("page".to_string(), "1".to_string())));
    assert!(query.contains(&("per_page".to_string(), "100".to_string())));
    assert!(request.headers.contains_key("user-agent"));
}

#[tokio::test]
async fn test_files_missing_a_term_are_excluded() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_search_page(
        &server,
        1,
        search_page_json(
            2,
            vec![
                hit_json(&base, "acme/tool", "both.go"),
                hit_json(&base, "acme/tool", "one.go"),
            ],
        ),
    )
    .await;
    mount_file(&server, "acme/tool", "both.go", "alpha()\nbeta()\n").await;
    mount_file(&server, "acme/tool", "one.go", "alpha()\n").await;

    let results = search_for(&server)
        .search(&terms(&["alpha", "beta"]), None, 2, &[], &CorrelationId::new())
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    let kept = &results[0];
    assert_eq!(kept.path(), "both.go");
    let rows = kept.matches.iter().map(|m| m.row).collect::<Vec<_>>();
    assert_eq!(rows, vec![1, 2]);
}

#[tokio::test]
async fn test_failing_fetch_is_skipped_by_default() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_search_page(
        &server,
        1,
        search_page_json(
            3,
            vec![
                hit_json(&base, "acme/tool", "a.go"),
                hit_json(&base, "acme/tool", "broken.go"),
                hit_json(&base, "acme/tool", "c.go"),
            ],
        ),
    )
    .await;
    mount_file(&server, "acme/tool", "a.go", "needle").await;
    mount_file_status(&server, "acme/tool", "broken.go", 500).await;
    mount_file(&server, "acme/tool", "c.go", "needle").await;

    let results = search_for(&server)
        .search(&terms(&["needle"]), None, 2, &[], &CorrelationId::new())
        .await
        .unwrap();

    let paths = results.iter().map(|m| m.path()).collect::<Vec<_>>();
    assert_eq!(paths, vec!["a.go", "c.go"]);
}

#[tokio::test]
async fn test_failing_fetch_aborts_under_abort_policy() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_search_page(
        &server,
        1,
        search_page_json(
            2,
            vec![
                hit_json(&base, "acme/tool", "a.go"),
                hit_json(&base, "acme/tool", "broken.go"),
            ],
        ),
    )
    .await;
    mount_file(&server, "acme/tool", "a.go", "needle").await;
    mount_file_status(&server, "acme/tool", "broken.go", 403).await;

    let err = search_for(&server)
        .with_policy(FetchFailurePolicy::Abort)
        .search(&terms(&["needle"]), None, 2, &[], &CorrelationId::new())
        .await
        .unwrap_err();

    assert!(matches!(err, SearchError::BadStatus { status: 403, .. }));
}

#[tokio::test]
async fn test_page_error_aborts_the_search() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_search_page(
        &server,
        1,
        search_page_json(4, vec![hit_json(&base, "acme/tool", "a.go")]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/search/code"))
        .and(wiremock::matchers::query_param("page", "2"))
        .respond_with(ResponseTemplate::new(422))
        .mount(&server)
        .await;

    let err = search_for(&server)
        .search(&terms(&["needle"]), None, 2, &[], &CorrelationId::new())
        .await
        .unwrap_err();

    assert!(matches!(err, SearchError::BadStatus { status: 422, .. }));
}

#[tokio::test]
async fn test_malformed_page_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/code"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{ not json"))
        .mount(&server)
        .await;

    let err = search_for(&server)
        .search(&terms(&["needle"]), None, 2, &[], &CorrelationId::new())
        .await
        .unwrap_err();

    assert!(matches!(err, SearchError::Decode { .. }));
}

#[tokio::test]
async fn test_symbol_search_resolves_aliased_and_plain_imports() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_search_page(
        &server,
        1,
        search_page_json(
            3,
            vec![
                hit_json(&base, "acme/app", "aliased.go"),
                hit_json(&base, "acme/app", "plain.go"),
                hit_json(&base, "acme/app", "unused.go"),
            ],
        ),
    )
    .await;
    mount_file(
        &server,
        "acme/app",
        "aliased.go",
        "package main\n\nimport widget \"github.com/acme/pkg\"\n\nfunc main() {\n\twidget.New()\n}\n",
    )
    .await;
    mount_file(
        &server,
        "acme/app",
        "plain.go",
        "package main\n\nimport (\n\t\"github.com/acme/pkg\"\n)\n\nvar p = pkg.New()\n",
    )
    .await;
    // Mentions both terms but never calls the constructor through its alias
    mount_file(
        &server,
        "acme/app",
        "unused.go",
        "package main\n\nimport w \"github.com/acme/pkg\"\n\n// New wraps pkg.New\nvar _ = w.Other\n",
    )
    .await;

    let results = search_for(&server)
        .symbol_search("github.com/acme/pkg.New", Some("acme"), 3, &CorrelationId::new())
        .await
        .unwrap();

    assert_eq!(results.len(), 2);

    let aliased = &results[0];
    assert_eq!(aliased.path(), "aliased.go");
    assert_eq!(aliased.matches.len(), 1);
    assert_eq!(aliased.matches[0].row, 6);
    assert_eq!(aliased.matches[0].col, 2);
    assert_eq!(aliased.matches[0].matched_text, "widget.New");

    let plain = &results[1];
    assert_eq!(plain.path(), "plain.go");
    assert_eq!(plain.matches[0].matched_text, "pkg.New");
    assert_eq!(plain.matches[0].row, 7);

    let requests = server.received_requests().await.unwrap();
    let q = requests
        .iter()
        .find(|request| request.url.path() == "/search/code")
        .and_then(|request| {
            request
                .url
                .query_pairs()
                .find(|(key, _)| key == "q")
                .map(|(_, value)| value.into_owned())
        })
        .unwrap();
    assert_eq!(q, "github com acme pkg New org:acme language:go");
}
