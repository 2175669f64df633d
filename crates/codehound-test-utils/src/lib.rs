//! Shared test fixtures for Codehound integration tests
//!
//! Builds the JSON bodies the GitHub code search and content endpoints return
//! and mounts them on a `wiremock` server, so integration tests can run the
//! real HTTP client against a local mock.
//!
//! ## Usage
//!
//! In your test crate's `Cargo.toml`:
//! ```toml
//! [dev-dependencies]
//! codehound-test-utils = { path = "../codehound-test-utils" }
//! ```
//!
//! In your tests:
//! ```no_run
//! # async fn example() {
//! let server = wiremock::MockServer::start().await;
//! let hit = codehound_test_utils::hit_json(&server.uri(), "acme/tool", "main.go");
//! codehound_test_utils::mount_search_page(
//!     &server,
//!     1,
//!     codehound_test_utils::search_page_json(1, vec![hit]),
//! )
//! .await;
//! codehound_test_utils::mount_file(&server, "acme/tool", "main.go", "package main\n").await;
//! # }
//! ```

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Value, json};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Column width GitHub wraps base64 content at
const BASE64_LINE_WIDTH: usize = 60;

/// Path of the content endpoint for `file_path` in `repo`
pub fn content_path(repo: &str, file_path: &str) -> String {
    format!("/repos/{repo}/contents/{file_path}")
}

/// A search hit whose content URL points at `base_url`
pub fn hit_json(base_url: &str, repo: &str, file_path: &str) -> Value {
    let name = file_path.rsplit('/').next().unwrap_or(file_path);
    let repo_name = repo.rsplit('/').next().unwrap_or(repo);
    let url = format!("{base_url}{}", content_path(repo, file_path));

    json!({
        "name": name,
        "path": file_path,
        "sha": "4f1c0e1a9d3b2c6e5f7a8b9c0d1e2f3a4b5c6d7e",
        "url": url,
        "git_url": format!("{base_url}/repos/{repo}/git/blobs/4f1c0e1a"),
        "html_url": format!("https://github.com/{repo}/blob/main/{file_path}"),
        "score": 1.0,
        "repository": {
            "id": 42,
            "name": repo_name,
            "full_name": repo,
            "html_url": format!("https://github.com/{repo}"),
            "url": format!("{base_url}/repos/{repo}")
        },
        "text_matches": []
    })
}

/// A `/search/code` response page
pub fn search_page_json(total_count: u64, items: Vec<Value>) -> Value {
    json!({
        "total_count": total_count,
        "incomplete_results": false,
        "items": items
    })
}

/// Base64 of `content`, wrapped with newlines the way GitHub returns it
pub fn encode_wrapped(content: &str) -> String {
    STANDARD
        .encode(content)
        .as_bytes()
        .chunks(BASE64_LINE_WIDTH)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join("\n")
}

/// A content endpoint response for `file_path` holding `content`
pub fn file_contents_json(file_path: &str, content: &str) -> Value {
    let name = file_path.rsplit('/').next().unwrap_or(file_path);
    json!({
        "name": name,
        "path": file_path,
        "sha": "4f1c0e1a9d3b2c6e5f7a8b9c0d1e2f3a4b5c6d7e",
        "size": content.len(),
        "download_url": null,
        "type": "file",
        "content": encode_wrapped(content),
        "encoding": "base64"
    })
}

/// Serve `body` for requests to `/search/code` asking for `page`
pub async fn mount_search_page(server: &MockServer, page: u32, body: Value) {
    Mock::given(method("GET"))
        .and(path("/search/code"))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Serve `content` from the content endpoint of `file_path` in `repo`
pub async fn mount_file(server: &MockServer, repo: &str, file_path: &str, content: &str) {
    mount_file_with_delay(server, repo, file_path, content, Duration::ZERO).await;
}

/// Like [`mount_file`], answering only after `delay`
pub async fn mount_file_with_delay(
    server: &MockServer,
    repo: &str,
    file_path: &str,
    content: &str,
    delay: Duration,
) {
    Mock::given(method("GET"))
        .and(path(content_path(repo, file_path)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(file_contents_json(file_path, content))
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

/// Answer the content endpoint of `file_path` in `repo` with `status`
pub async fn mount_file_status(server: &MockServer, repo: &str, file_path: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(content_path(repo, file_path)))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}
