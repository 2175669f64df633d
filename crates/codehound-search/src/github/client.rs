//! HTTP backend for the code search and file content endpoints

use super::models::{FileContents, SearchPage};
use super::query::SearchQuery;
use crate::error::{SearchError, SearchResult};
use async_trait::async_trait;
use codehound_common::CorrelationId;
use codehound_config::GitHubConfig;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;

/// Media type that makes the search endpoint include `text_matches`
pub const TEXT_MATCH_MEDIA_TYPE: &str = "application/vnd.github.v3.text-match+json";

/// Remote collaborator the search pipeline talks to
///
/// `GitHubClient` is the production implementation; tests substitute a mock
/// to control latency and failures.
#[async_trait]
pub trait CodeSearchBackend: Send + Sync {
    /// Request one 1-indexed page of results for `query`
    async fn search_page(
        &self,
        query: &SearchQuery,
        page: u32,
        correlation_id: &CorrelationId,
    ) -> SearchResult<SearchPage>;

    /// Fetch the content payload behind a hit's `url`
    async fn fetch_file(
        &self,
        url: &str,
        correlation_id: &CorrelationId,
    ) -> SearchResult<FileContents>;
}

/// reqwest-backed client for the GitHub REST API
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    api_url: String,
}

impl GitHubClient {
    /// Build a client sending the configured token, `Accept` and `User-Agent`
    /// headers with every request
    ///
    /// # Errors
    /// Returns `SearchError::Configuration` when a header value is not valid
    /// or the underlying client cannot be created
    pub fn new(config: &GitHubConfig) -> SearchResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(TEXT_MATCH_MEDIA_TYPE));

        if let Some(token) = config.token.as_deref().filter(|t| !t.trim().is_empty()) {
            let mut value = HeaderValue::from_str(&format!("token {token}")).map_err(|e| {
                SearchError::Configuration(format!("token is not a valid header value: {e}"))
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| SearchError::Configuration(e.to_string()))?;

        Ok(Self::with_client(http, &config.api_url))
    }

    /// Wrap an already configured reqwest client
    pub fn with_client(http: Client, api_url: &str) -> Self {
        Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    /// Base API URL, without a trailing slash
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn parse_url(raw: &str, correlation_id: &CorrelationId) -> SearchResult<Url> {
        Url::parse(raw).map_err(|e| SearchError::InvalidEndpoint {
            url: raw.to_string(),
            reason: e.to_string(),
            correlation_id: correlation_id.clone(),
        })
    }

    /// Send `request` and decode a 2xx JSON body
    async fn get_json<T: DeserializeOwned>(
        request: RequestBuilder,
        url: &Url,
        correlation_id: &CorrelationId,
    ) -> SearchResult<T> {
        let transport_error = |e: reqwest::Error| SearchError::Transport {
            url: url.to_string(),
            message: if e.is_timeout() {
                format!("request timed out: {e}")
            } else {
                e.to_string()
            },
            correlation_id: correlation_id.clone(),
        };

        let response = request.send().await.map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::BadStatus {
                url: url.to_string(),
                status: status.as_u16(),
                correlation_id: correlation_id.clone(),
            });
        }

        let body = response.bytes().await.map_err(transport_error)?;
        serde_json::from_slice(&body).map_err(|e| SearchError::Decode {
            url: url.to_string(),
            message: e.to_string(),
            correlation_id: correlation_id.clone(),
        })
    }
}

#[async_trait]
impl CodeSearchBackend for GitHubClient {
    #[tracing::instrument(skip(self, query), fields(q = %query.q, correlation_id = %correlation_id))]
    async fn search_page(
        &self,
        query: &SearchQuery,
        page: u32,
        correlation_id: &CorrelationId,
    ) -> SearchResult<SearchPage> {
        let url = Self::parse_url(&format!("{}/search/code", self.api_url), correlation_id)?;
        let request = self.http.get(url.clone()).query(&query.params(page));
        Self::get_json(request, &url, correlation_id).await
    }

    #[tracing::instrument(skip(self), fields(correlation_id = %correlation_id))]
    async fn fetch_file(
        &self,
        url: &str,
        correlation_id: &CorrelationId,
    ) -> SearchResult<FileContents> {
        let url = Self::parse_url(url, correlation_id)?;
        let request = self.http.get(url.clone());
        Self::get_json(request, &url, correlation_id).await
    }
}
