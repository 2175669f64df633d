//! Test utilities for the search pipeline

use crate::error::{SearchError, SearchResult};
use crate::github::{CodeSearchBackend, FileContents, Repository, SearchHit, SearchPage, SearchQuery};

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use codehound_common::CorrelationId;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Build a hit for `path` in repository `repo` (`owner/name`)
pub fn hit(repo: &str, path: &str) -> SearchHit {
    let name = path.rsplit('/').next().unwrap_or(path).to_string();
    let repo_name = repo.rsplit('/').next().unwrap_or(repo).to_string();
    SearchHit {
        name,
        path: path.to_string(),
        sha: "0000000000000000000000000000000000000000".to_string(),
        url: format!("https://api.github.com/repos/{repo}/contents/{path}"),
        git_url: String::new(),
        html_url: format!("https://github.com/{repo}/blob/main/{path}"),
        score: 1.0,
        repository: Some(Repository {
            id: 1,
            name: repo_name,
            full_name: repo.to_string(),
            html_url: format!("https://github.com/{repo}"),
            url: format!("https://api.github.com/repos/{repo}"),
        }),
        text_matches: Vec::new(),
    }
}

/// Split `hits` into pages of `per_page`, each reporting the full total
pub fn pages_of(hits: &[SearchHit], per_page: usize) -> Vec<SearchPage> {
    let total_count = hits.len() as u64;
    hits.chunks(per_page.max(1))
        .map(|chunk| SearchPage {
            total_count,
            incomplete_results: false,
            items: chunk.to_vec(),
        })
        .collect()
}

#[derive(Clone)]
enum MockFile {
    Content(String),
    Status(u16),
    TransportError(String),
}

/// In-memory `CodeSearchBackend` with scripted pages and file contents
///
/// Tracks page requests, fetches and the peak number of fetches in flight at
/// once, so tests can assert on pagination and concurrency limits.
#[derive(Default)]
pub struct MockBackend {
    pages: Vec<SearchPage>,
    files: HashMap<String, MockFile>,
    fetch_delay: Duration,
    page_requests: Mutex<Vec<(String, u32)>>,
    fetches: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `hits` in pages of `per_page`, each hit's content being `content`
    pub fn with_hits(hits: &[(SearchHit, &str)], per_page: usize) -> Self {
        let only_hits = hits.iter().map(|(hit, _)| hit.clone()).collect::<Vec<_>>();
        let mut backend = Self::new();
        backend.pages = pages_of(&only_hits, per_page);
        for (hit, content) in hits {
            backend = backend.with_file(&hit.url, content);
        }
        backend
    }

    /// Append a page; pages are served in the order they were added
    #[must_use]
    pub fn with_page(mut self, page: SearchPage) -> Self {
        self.pages.push(page);
        self
    }

    #[must_use]
    pub fn with_file(mut self, url: &str, content: &str) -> Self {
        self.files
            .insert(url.to_string(), MockFile::Content(content.to_string()));
        self
    }

    /// Answer fetches of `url` with a non-2xx status
    #[must_use]
    pub fn with_failing_file(mut self, url: &str, status: u16) -> Self {
        self.files.insert(url.to_string(), MockFile::Status(status));
        self
    }

    /// Fail fetches of `url` as if the connection dropped
    #[must_use]
    pub fn with_unreachable_file(mut self, url: &str, message: &str) -> Self {
        self.files
            .insert(url.to_string(), MockFile::TransportError(message.to_string()));
        self
    }

    /// Hold every fetch for `delay` before answering
    #[must_use]
    pub const fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = delay;
        self
    }

    /// `(q, page)` of every page request, in order
    pub fn page_requests(&self) -> Vec<(String, u32)> {
        self.page_requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Most fetches observed in flight at the same time
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

/// Decrements the in-flight counter even when the fetch future is dropped
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl CodeSearchBackend for MockBackend {
    async fn search_page(
        &self,
        query: &SearchQuery,
        page: u32,
        _correlation_id: &CorrelationId,
    ) -> SearchResult<SearchPage> {
        if let Ok(mut requests) = self.page_requests.lock() {
            requests.push((query.q.clone(), page));
        }

        let index = usize::try_from(page.saturating_sub(1)).unwrap_or(usize::MAX);
        Ok(self.pages.get(index).cloned().unwrap_or_else(|| SearchPage {
            total_count: self.pages.first().map_or(0, |first| first.total_count),
            incomplete_results: false,
            items: Vec::new(),
        }))
    }

    async fn fetch_file(
        &self,
        url: &str,
        correlation_id: &CorrelationId,
    ) -> SearchResult<FileContents> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst).saturating_add(1);
        let _guard = InFlight(&self.in_flight);
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.fetch_delay.is_zero() {
            tokio::time::sleep(self.fetch_delay).await;
        }

        match self.files.get(url) {
            Some(MockFile::Content(content)) => {
                let path = url.rsplit("/contents/").next().unwrap_or(url).to_string();
                Ok(FileContents {
                    name: path.rsplit('/').next().unwrap_or(&path).to_string(),
                    path,
                    sha: String::new(),
                    size: content.len() as u64,
                    download_url: None,
                    kind: "file".to_string(),
                    content: STANDARD.encode(content),
                    encoding: "base64".to_string(),
                })
            }
            Some(MockFile::Status(status)) => Err(SearchError::BadStatus {
                url: url.to_string(),
                status: *status,
                correlation_id: correlation_id.clone(),
            }),
            Some(MockFile::TransportError(message)) => Err(SearchError::Transport {
                url: url.to_string(),
                message: message.clone(),
                correlation_id: correlation_id.clone(),
            }),
            None => Err(SearchError::BadStatus {
                url: url.to_string(),
                status: 404,
                correlation_id: correlation_id.clone(),
            }),
        }
    }
}
