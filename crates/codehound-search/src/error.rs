use codehound_common::CorrelationId;
use thiserror::Error;

/// Result type for search operations
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Search-specific error types
///
/// Page-level variants carry the correlation ID of the search that produced
/// them so a failure can be tied back to its log lines. Per-hit variants
/// (raised while fetching one file) are usually logged and skipped rather
/// than surfaced; see `FetchFailurePolicy`.
#[derive(Error, Debug)]
pub enum SearchError {
    /// The request URL could not be built (bad base URL, bad hit URL)
    #[error("Invalid endpoint '{url}': {reason} (correlation: {correlation_id})")]
    InvalidEndpoint {
        url: String,
        reason: String,
        correlation_id: CorrelationId,
    },

    /// The request could not be sent or the body could not be read
    #[error("Request to '{url}' failed: {message} (correlation: {correlation_id})")]
    Transport {
        url: String,
        message: String,
        correlation_id: CorrelationId,
    },

    /// The remote answered with a non-2xx status
    #[error("Bad status {status} from '{url}' (correlation: {correlation_id})")]
    BadStatus {
        url: String,
        status: u16,
        correlation_id: CorrelationId,
    },

    /// The response body did not have the expected shape
    #[error("Could not decode response from '{url}': {message} (correlation: {correlation_id})")]
    Decode {
        url: String,
        message: String,
        correlation_id: CorrelationId,
    },

    /// File content could not be decoded into text
    #[error("Could not decode content of '{path}': {message}")]
    ContentDecode { path: String, message: String },

    /// File content came back in an encoding we cannot decode
    #[error("Unknown content encoding '{encoding}', cannot decode file")]
    UnsupportedEncoding { encoding: String },

    /// Symbol query not in `<import path>.<Resource>` form
    #[error(
        "Invalid symbol query '{query}': expected <import path>.<Resource>, e.g. github.com/org/pkg.New"
    )]
    InvalidSymbolQuery { query: String },

    /// The caller cancelled the search
    #[error("Search cancelled (correlation: {correlation_id})")]
    Cancelled { correlation_id: CorrelationId },

    /// The HTTP client could not be built from the configuration
    #[error("Invalid client configuration: {0}")]
    Configuration(String),

    /// A fetch worker task failed to complete
    #[error("Fetch worker failed: {0}")]
    Worker(String),
}

impl SearchError {
    /// Whether this error only concerns a single hit's content fetch
    pub const fn is_per_hit(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. }
                | Self::BadStatus { .. }
                | Self::Decode { .. }
                | Self::ContentDecode { .. }
                | Self::UnsupportedEncoding { .. }
                | Self::InvalidEndpoint { .. }
        )
    }
}
