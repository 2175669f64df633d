//! Search pipeline module: pagination, concurrent content retrieval and
//! line-level matching
pub mod fetcher;
pub mod matcher;
pub mod paginator;
pub mod queue;
pub mod search;
pub mod service;
pub mod symbol;

pub use fetcher::{ConcurrentFetcher, FetchOutcome, FetchStats, FetchedFile};
pub use matcher::{FileContent, FileMatch, LineMatch};
pub use search::CodeSearch;
pub use service::SearchService;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
