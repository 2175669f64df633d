//! Centralized configuration management for codehound
//!
//! Provides type-safe, validated configuration with support for multiple
//! sources (defaults, TOML file, environment, CLI overrides).
//!
//! Configuration follows a simple hierarchy:
//! 1. Safe defaults (defined as constants)
//! 2. Optional TOML file
//! 3. Environment variable overrides
//! 4. Runtime validation

pub mod error;
pub mod source;
pub mod validation;

pub use error::{ConfigError, ConfigResult};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

// =============================================================================
// SAFE DEFAULTS
// =============================================================================

// GitHub API Configuration
const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
const DEFAULT_GITHUB_PER_PAGE: u32 = 100; // API maximum
const DEFAULT_GITHUB_REQUEST_TIMEOUT_SECONDS: u64 = 30;
const MAX_GITHUB_PER_PAGE: u64 = 100;

// Search Pipeline Configuration
const DEFAULT_SEARCH_MAX_CONCURRENCY: usize = 5;
const MAX_SEARCH_CONCURRENCY: u64 = 100;
const DEFAULT_SEARCH_SORT_RESULTS: bool = true;

// Telemetry Configuration
const DEFAULT_TRACING_LEVEL: &str = "info";
const DEFAULT_JSON_LOGS: bool = false;
const TRACING_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Default `User-Agent` sent with every request; GitHub rejects requests without one
fn default_user_agent() -> String {
    format!("codehound/{}", env!("CARGO_PKG_VERSION"))
}

/// Core configuration for the entire codehound application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Remote code search service configuration
    #[serde(default)]
    pub github: GitHubConfig,

    /// Search pipeline configuration
    #[serde(default)]
    pub search: SearchConfig,

    /// Logging configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// GitHub API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// Base API URL (scheme + host, no trailing path)
    pub api_url: String,

    /// Personal access token sent as `Authorization: token <token>`
    pub token: Option<String>,

    /// Results requested per search page (1-100)
    pub per_page: u32,

    /// Per-request timeout in seconds, applied to page requests and content fetches
    pub request_timeout_seconds: u64,

    /// `User-Agent` header value
    pub user_agent: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_GITHUB_API_URL.to_string(),
            token: None,
            per_page: DEFAULT_GITHUB_PER_PAGE,
            request_timeout_seconds: DEFAULT_GITHUB_REQUEST_TIMEOUT_SECONDS,
            user_agent: default_user_agent(),
        }
    }
}

impl GitHubConfig {
    /// Load configuration from environment variables with safe defaults
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply environment variable overrides on top of the current values
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(api_url) = std::env::var("CODEHOUND_GITHUB_API_URL") {
            self.api_url = api_url;
        }

        // Fall back to the conventional variable used by gh and friends
        if let Ok(token) =
            std::env::var("CODEHOUND_GITHUB_TOKEN").or_else(|_| std::env::var("GITHUB_TOKEN"))
        {
            self.token = Some(token);
        }

        if let Some(per_page) = env_parsed("CODEHOUND_GITHUB_PER_PAGE") {
            self.per_page = per_page;
        }

        if let Some(timeout) = env_parsed("CODEHOUND_GITHUB_REQUEST_TIMEOUT_SECONDS") {
            self.request_timeout_seconds = timeout;
        }

        if let Ok(user_agent) = std::env::var("CODEHOUND_GITHUB_USER_AGENT") {
            self.user_agent = user_agent;
        }

        self
    }

    /// Per-request timeout as a `Duration`
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Return the configured token, failing if none was provided
    ///
    /// Only callers that actually talk to the API need a token, so this is
    /// checked on use rather than in `validate()`.
    ///
    /// # Errors
    /// Returns `ConfigError::MissingField` if the token is unset or blank
    pub fn require_token(&self) -> ConfigResult<&str> {
        let token = self.token.as_deref().unwrap_or_default();
        validation::validate_non_empty(token, "github.token")?;
        Ok(token)
    }
}

impl validation::Validate for GitHubConfig {
    fn validate(&self) -> ConfigResult<()> {
        validation::validate_url(&self.api_url, "github.api_url")?;
        validation::validate_range(
            u64::from(self.per_page),
            1,
            MAX_GITHUB_PER_PAGE,
            "github.per_page",
        )?;
        validation::validate_range(
            self.request_timeout_seconds,
            1,
            3600,
            "github.request_timeout_seconds",
        )?;
        validation::validate_non_empty(&self.user_agent, "github.user_agent")?;
        Ok(())
    }
}

/// What to do when fetching one hit's content fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchFailurePolicy {
    /// Log the failure and drop the hit; the search still succeeds
    #[default]
    Skip,

    /// Abort the whole batch with the first failure
    Abort,
}

impl std::fmt::Display for FetchFailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Skip => write!(f, "skip"),
            Self::Abort => write!(f, "abort"),
        }
    }
}

impl FromStr for FetchFailurePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "abort" => Ok(Self::Abort),
            _ => Err(ConfigError::InvalidChoice {
                field: "search.fetch_failure_policy".to_string(),
                value: s.to_string(),
                expected: "skip, abort".to_string(),
            }),
        }
    }
}

/// Search pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum concurrent content fetches
    pub max_concurrency: usize,

    /// Per-hit fetch failure handling
    pub fetch_failure_policy: FetchFailurePolicy,

    /// Sort results by repository then path before returning them
    pub sort_results: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_SEARCH_MAX_CONCURRENCY,
            fetch_failure_policy: FetchFailurePolicy::default(),
            sort_results: DEFAULT_SEARCH_SORT_RESULTS,
        }
    }
}

impl SearchConfig {
    /// Load configuration from environment variables with safe defaults
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply environment variable overrides on top of the current values
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(max_concurrency) = env_parsed("CODEHOUND_SEARCH_MAX_CONCURRENCY") {
            self.max_concurrency = max_concurrency;
        }

        match std::env::var("CODEHOUND_SEARCH_FETCH_FAILURE_POLICY").map(|s| s.parse()) {
            Ok(Ok(policy)) => self.fetch_failure_policy = policy,
            Ok(Err(e)) => tracing::warn!("Ignoring CODEHOUND_SEARCH_FETCH_FAILURE_POLICY: {e}"),
            Err(_) => {}
        }

        if let Some(sort_results) = env_parsed("CODEHOUND_SEARCH_SORT_RESULTS") {
            self.sort_results = sort_results;
        }

        self
    }
}

impl validation::Validate for SearchConfig {
    fn validate(&self) -> ConfigResult<()> {
        validation::validate_range(
            self.max_concurrency as u64,
            1,
            MAX_SEARCH_CONCURRENCY,
            "search.max_concurrency",
        )?;
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Tracing level (trace, debug, info, warn, error), used when `RUST_LOG` is unset
    pub tracing_level: String,

    /// Emit logs as JSON instead of human-readable text
    pub json_logs: bool,

    /// Directory for daily-rotated log files; stderr only when unset
    pub log_dir: Option<PathBuf>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            tracing_level: DEFAULT_TRACING_LEVEL.to_string(),
            json_logs: DEFAULT_JSON_LOGS,
            log_dir: None,
        }
    }
}

impl TelemetryConfig {
    /// Load configuration from environment variables with safe defaults
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply environment variable overrides on top of the current values
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(level) = std::env::var("CODEHOUND_TELEMETRY_TRACING_LEVEL") {
            self.tracing_level = level;
        }

        if let Some(json_logs) = env_parsed("CODEHOUND_TELEMETRY_JSON_LOGS") {
            self.json_logs = json_logs;
        }

        if let Ok(log_dir) = std::env::var("CODEHOUND_TELEMETRY_LOG_DIR") {
            self.log_dir = Some(PathBuf::from(log_dir));
        }

        self
    }
}

impl validation::Validate for TelemetryConfig {
    fn validate(&self) -> ConfigResult<()> {
        validation::validate_choice(&self.tracing_level, TRACING_LEVELS, "telemetry.tracing_level")
    }
}

impl ApplicationConfig {
    /// Load configuration from environment variables with safe defaults
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply environment variable overrides to every section
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        Self {
            github: self.github.with_env_overrides(),
            search: self.search.with_env_overrides(),
            telemetry: self.telemetry.with_env_overrides(),
        }
    }
}

impl validation::Validate for ApplicationConfig {
    fn validate(&self) -> ConfigResult<()> {
        self.github.validate()?;
        self.search.validate()?;
        self.telemetry.validate()?;
        Ok(())
    }
}

/// Read and parse an environment variable, ignoring unset or unparsable values
fn env_parsed<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    let parsed = raw.parse().ok();
    if parsed.is_none() {
        tracing::warn!("Ignoring unparsable value '{raw}' for {key}");
    }
    parsed
}
