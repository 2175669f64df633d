//! Page-by-page retrieval of search hits

use crate::error::{SearchError, SearchResult};
use crate::github::{CodeSearchBackend, SearchHit, SearchQuery};
use codehound_common::CorrelationId;
use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Drives the search endpoint until every reported hit has been received
///
/// Pages are requested one at a time starting at page 1. The loop stops when
/// the remote reports no results, when the received item count reaches
/// `total_count`, or when a page comes back empty (the remote caps how deep
/// a query can be paged). Any page error aborts the whole collection.
pub struct Paginator {
    backend: Arc<dyn CodeSearchBackend>,
    cancel: CancellationToken,
}

impl Paginator {
    pub fn new(backend: Arc<dyn CodeSearchBackend>, cancel: CancellationToken) -> Self {
        Self { backend, cancel }
    }

    /// Collect every hit for `query`, collapsing duplicate URLs
    ///
    /// # Errors
    /// Returns the first page error, or `SearchError::Cancelled` if the
    /// cancellation token fires between or during page requests
    #[tracing::instrument(skip(self, query), fields(q = %query.q, correlation_id = %correlation_id))]
    pub async fn collect(
        &self,
        query: &SearchQuery,
        correlation_id: &CorrelationId,
    ) -> SearchResult<Vec<SearchHit>> {
        let mut hits = Vec::new();
        let mut seen_urls = HashSet::new();
        let mut received: u64 = 0;
        let mut page: u32 = 1;

        loop {
            let cancelled = || SearchError::Cancelled {
                correlation_id: correlation_id.clone(),
            };
            if self.cancel.is_cancelled() {
                return Err(cancelled());
            }

            let result = tokio::select! {
                biased;
                () = self.cancel.cancelled() => return Err(cancelled()),
                result = self.backend.search_page(query, page, correlation_id) => result?,
            };

            tracing::debug!(
                page,
                total_count = result.total_count,
                items = result.items.len(),
                "Received search page"
            );

            if result.incomplete_results {
                tracing::warn!(page, "Remote search timed out, results may be incomplete");
            }

            if result.total_count == 0 {
                break;
            }

            let page_len = result.items.len();
            received = received.saturating_add(page_len as u64);

            for hit in result.items {
                if seen_urls.insert(hit.url.clone()) {
                    hits.push(hit);
                } else {
                    tracing::debug!(url = %hit.url, "Dropping duplicate hit");
                }
            }

            if received >= result.total_count {
                break;
            }

            if page_len == 0 {
                tracing::warn!(
                    page,
                    received,
                    total_count = result.total_count,
                    "Empty page before all results were received, stopping"
                );
                break;
            }

            page = page.saturating_add(1);
        }

        tracing::info!(hits = hits.len(), pages = page, "Search pages collected");
        Ok(hits)
    }
}
