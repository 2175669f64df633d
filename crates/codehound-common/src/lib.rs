//! Common utilities shared across codehound crates
//!
//! Holds the correlation ID used to tie a search request to its log lines and
//! errors, and the one-time process environment setup.

pub mod init;

pub use init::initialize_environment;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Correlation ID type for tracking one search operation across its page
/// requests, content fetches and log lines
///
/// Uses UUID v4 for guaranteed uniqueness
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    /// Generate a new correlation ID using UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for CorrelationId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl From<&str> for CorrelationId {
    fn from(id: &str) -> Self {
        Uuid::try_parse(id).map_or_else(|_| Self(Uuid::new_v4()), Self)
    }
}
