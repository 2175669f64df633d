//! Codehound search crate
//!
//! This crate searches GitHub's code index and confirms every hit against
//! the file's actual content: results are paged in, contents are fetched
//! under a concurrency limit, and only files whose lines contain every term
//! are returned. Symbol searches additionally resolve the local import alias
//! of a Go package before confirming a call site.

pub mod error;
pub mod github;
pub mod searching;

// Re-export main types
pub use codehound_config::FetchFailurePolicy;
pub use error::{SearchError, SearchResult};
pub use github::{CodeSearchBackend, GitHubClient, SearchHit};
pub use searching::{CodeSearch, FileContent, FileMatch, LineMatch, SearchService};
pub use tokio_util::sync::CancellationToken;

// Re-export test utilities when test-utils feature is enabled
#[cfg(any(test, feature = "test-utils"))]
pub mod test_mocks {
    pub use crate::searching::test_utils::{MockBackend, hit, pages_of};
}
