//! Search service trait

use super::matcher::FileMatch;
use crate::error::SearchResult;
use async_trait::async_trait;
use codehound_common::CorrelationId;

/// Trait for code search operations with correlation ID support
#[async_trait]
pub trait SearchService: Send + Sync {
    /// Files containing every term, with their matching lines
    ///
    /// `raw_fragments` are appended to the remote query untouched (e.g.
    /// `language:go`) and take no part in local matching.
    async fn search(
        &self,
        terms: &[String],
        organization: Option<&str>,
        max_concurrency: usize,
        raw_fragments: &[String],
        correlation_id: &CorrelationId,
    ) -> SearchResult<Vec<FileMatch>>;

    /// Files that call `<import path>.<Resource>` under whatever name they
    /// import the package as
    async fn symbol_search(
        &self,
        qualified_name: &str,
        organization: Option<&str>,
        max_concurrency: usize,
        correlation_id: &CorrelationId,
    ) -> SearchResult<Vec<FileMatch>>;
}
