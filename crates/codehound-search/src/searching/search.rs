//! Search pipeline: paginate, fetch, match, and for symbol queries re-match
//! on the import alias

use super::fetcher::ConcurrentFetcher;
use super::matcher::{FileMatch, match_files};
use super::paginator::Paginator;
use super::service::SearchService;
use super::symbol::{GO_LANGUAGE_FRAGMENT, confirm_symbol_usage, parse_symbol_query};
use crate::error::SearchResult;
use crate::github::{CodeSearchBackend, GitHubClient, build_query};
use async_trait::async_trait;
use codehound_common::CorrelationId;
use codehound_config::{ApplicationConfig, FetchFailurePolicy};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const DEFAULT_PER_PAGE: u32 = 100;

/// Code search over a [`CodeSearchBackend`]
///
/// Results are sorted by repository, path and URL unless sorting is turned
/// off, in which case they come back in fetch completion order.
pub struct CodeSearch {
    backend: Arc<dyn CodeSearchBackend>,
    per_page: u32,
    policy: FetchFailurePolicy,
    sort_results: bool,
    cancel: CancellationToken,
}

impl CodeSearch {
    pub fn new(backend: Arc<dyn CodeSearchBackend>) -> Self {
        Self {
            backend,
            per_page: DEFAULT_PER_PAGE,
            policy: FetchFailurePolicy::default(),
            sort_results: true,
            cancel: CancellationToken::new(),
        }
    }

    /// Build a search over the GitHub API described by `config`
    ///
    /// # Errors
    /// Returns `SearchError::Configuration` if the HTTP client cannot be built
    pub fn from_config(config: &ApplicationConfig) -> SearchResult<Self> {
        let client = GitHubClient::new(&config.github)?;
        Ok(Self::new(Arc::new(client))
            .with_per_page(config.github.per_page)
            .with_policy(config.search.fetch_failure_policy)
            .with_sorting(config.search.sort_results))
    }

    #[must_use]
    pub const fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    #[must_use]
    pub const fn with_policy(mut self, policy: FetchFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub const fn with_sorting(mut self, sort_results: bool) -> Self {
        self.sort_results = sort_results;
        self
    }

    /// Use `cancel` to stop in-progress searches
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that cancels every search run by this instance
    pub const fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Paginate, fetch, and keep files containing every term
    async fn run_pipeline(
        &self,
        terms: &[String],
        organization: Option<&str>,
        max_concurrency: usize,
        raw_fragments: &[String],
        correlation_id: &CorrelationId,
    ) -> SearchResult<Vec<FileMatch>> {
        let query = build_query(terms, organization, raw_fragments, self.per_page);

        let hits = Paginator::new(Arc::clone(&self.backend), self.cancel.clone())
            .collect(&query, correlation_id)
            .await?;

        let fetcher =
            ConcurrentFetcher::new(Arc::clone(&self.backend), self.policy, self.cancel.clone());
        let outcome = fetcher
            .fetch_all(hits, max_concurrency, correlation_id)
            .await?;

        Ok(match_files(outcome.files, terms))
    }

    fn finish(&self, mut matches: Vec<FileMatch>) -> Vec<FileMatch> {
        if self.sort_results {
            matches.sort_by(|a, b| {
                (a.repository_name(), a.path(), a.hit.url.as_str()).cmp(&(
                    b.repository_name(),
                    b.path(),
                    b.hit.url.as_str(),
                ))
            });
        }
        matches
    }
}

#[async_trait]
impl SearchService for CodeSearch {
    #[tracing::instrument(skip(self, terms, raw_fragments), fields(terms = ?terms, correlation_id = %correlation_id))]
    async fn search(
        &self,
        terms: &[String],
        organization: Option<&str>,
        max_concurrency: usize,
        raw_fragments: &[String],
        correlation_id: &CorrelationId,
    ) -> SearchResult<Vec<FileMatch>> {
        let matches = self
            .run_pipeline(terms, organization, max_concurrency, raw_fragments, correlation_id)
            .await?;

        tracing::info!(files = matches.len(), "Search complete");
        Ok(self.finish(matches))
    }

    #[tracing::instrument(skip(self), fields(correlation_id = %correlation_id))]
    async fn symbol_search(
        &self,
        qualified_name: &str,
        organization: Option<&str>,
        max_concurrency: usize,
        correlation_id: &CorrelationId,
    ) -> SearchResult<Vec<FileMatch>> {
        let symbol = parse_symbol_query(qualified_name)?;

        let candidates = self
            .run_pipeline(
                &symbol.broad_terms(),
                organization,
                max_concurrency,
                &[GO_LANGUAGE_FRAGMENT.to_string()],
                correlation_id,
            )
            .await?;
        let candidate_count = candidates.len();

        let confirmed = candidates
            .into_iter()
            .filter_map(|file| confirm_symbol_usage(file, &symbol))
            .collect::<Vec<_>>();

        tracing::info!(
            candidates = candidate_count,
            files = confirmed.len(),
            "Symbol search complete"
        );
        Ok(self.finish(confirmed))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::error::SearchError;
    use crate::searching::test_utils::{MockBackend, hit};

    fn terms(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    fn search_over(backend: &Arc<MockBackend>) -> CodeSearch {
        let backend: Arc<dyn CodeSearchBackend> = backend.clone();
        CodeSearch::new(backend)
    }

    #[tokio::test]
    async fn test_results_are_sorted_by_repository_then_path() {
        let backend = Arc::new(MockBackend::with_hits(
            &[
                (hit("zeta/tool", "a.go"), "needle"),
                (hit("acme/tool", "z.go"), "needle"),
                (hit("acme/tool", "b.go"), "needle"),
            ],
            100,
        ));

        let results = search_over(&backend)
            .search(&terms(&["needle"]), None, 3, &[], &CorrelationId::new())
            .await
            .unwrap();

        let order = results
            .iter()
            .map(|m| format!("{}/{}", m.repository_name(), m.path()))
            .collect::<Vec<_>>();
        assert_eq!(order, vec!["acme/tool/b.go", "acme/tool/z.go", "zeta/tool/a.go"]);
    }

    #[tokio::test]
    async fn test_symbol_search_sends_language_fragment() {
        let backend = Arc::new(MockBackend::with_hits(
            &[(
                hit("acme/app", "main.go"),
                "import widget \"github.com/acme/pkg\"\n\nfunc main() { widget.New() }",
            )],
            100,
        ));

        let results = search_over(&backend)
            .symbol_search("github.com/acme/pkg.New", Some("acme"), 2, &CorrelationId::new())
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        let (q, page) = backend.page_requests().into_iter().next().unwrap();
        assert_eq!(q, "github com acme pkg New org:acme language:go");
        assert_eq!(page, 1);
    }

    #[tokio::test]
    async fn test_invalid_symbol_query_makes_no_requests() {
        let backend = Arc::new(MockBackend::new());

        let err = search_over(&backend)
            .symbol_search("pkg.New", None, 2, &CorrelationId::new())
            .await
            .unwrap_err();

        assert!(matches!(err, SearchError::InvalidSymbolQuery { .. }));
        assert!(backend.page_requests().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_search_reports_cancellation() {
        let backend = Arc::new(MockBackend::new());
        let search = search_over(&backend);
        search.cancellation_token().cancel();

        let err = search
            .search(&terms(&["needle"]), None, 2, &[], &CorrelationId::new())
            .await
            .unwrap_err();

        assert!(matches!(err, SearchError::Cancelled { .. }));
    }

    #[test]
    fn test_from_config_uses_configured_policy() {
        let mut config = ApplicationConfig::default();
        config.search.fetch_failure_policy = FetchFailurePolicy::Abort;
        config.github.per_page = 25;

        let search = CodeSearch::from_config(&config).unwrap();

        assert_eq!(search.policy, FetchFailurePolicy::Abort);
        assert_eq!(search.per_page, 25);
    }
}
