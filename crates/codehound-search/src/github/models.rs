//! Wire types for the code search and file content endpoints

use crate::error::{SearchError, SearchResult};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

/// One page of `/search/code` results
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SearchPage {
    /// Total matches the remote reports for the whole query
    pub total_count: u64,
    /// The remote gave up before finding every match
    pub incomplete_results: bool,
    #[serde(default)]
    pub items: Vec<SearchHit>,
}

/// Remote metadata for one matched file, before its content is fetched
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SearchHit {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub sha: String,
    /// API URL of the file content endpoint
    pub url: String,
    #[serde(default)]
    pub git_url: String,
    /// Human readable URL
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub score: f64,
    pub repository: Option<Repository>,
    #[serde(default)]
    pub text_matches: Vec<TextMatch>,
}

impl SearchHit {
    /// Full name (`owner/repo`) of the owning repository, empty when absent
    pub fn repository_name(&self) -> &str {
        self.repository
            .as_ref()
            .map_or("", |repo| repo.full_name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub url: String,
}

/// Highlighted fragment returned with the text-match media type
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TextMatch {
    #[serde(default)]
    pub object_url: String,
    #[serde(default)]
    pub object_type: String,
    #[serde(default)]
    pub fragment: String,
    #[serde(default)]
    pub matches: Vec<TextMatchSpan>,
}

/// One highlighted span within a `TextMatch` fragment
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TextMatchSpan {
    pub text: String,
    /// `[start, end]` offsets into the fragment
    #[serde(default)]
    pub indices: Vec<usize>,
}

impl TextMatchSpan {
    /// Start offset, `None` unless `indices` is exactly `[start, end]`
    pub fn start(&self) -> Option<usize> {
        match self.indices.as_slice() {
            [start, _] => Some(*start),
            _ => None,
        }
    }

    /// End offset, `None` unless `indices` is exactly `[start, end]`
    pub fn end(&self) -> Option<usize> {
        match self.indices.as_slice() {
            [_, end] => Some(*end),
            _ => None,
        }
    }
}

/// Payload of the file content endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FileContents {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub sha: String,
    #[serde(default)]
    pub size: u64,
    pub download_url: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub encoding: String,
}

impl FileContents {
    /// Decode `content` according to `encoding`
    ///
    /// Only base64 is understood. GitHub wraps the base64 payload with
    /// newlines, which are stripped before decoding.
    ///
    /// # Errors
    /// `UnsupportedEncoding` for anything but base64; `ContentDecode` when the
    /// payload is not valid base64 or the decoded bytes are not UTF-8.
    pub fn decoded_content(&self) -> SearchResult<String> {
        match self.encoding.as_str() {
            "base64" => {
                let compact: String = self
                    .content
                    .chars()
                    .filter(|c| !c.is_ascii_whitespace())
                    .collect();
                let bytes = STANDARD
                    .decode(compact.as_bytes())
                    .map_err(|e| self.decode_error(format!("invalid base64: {e}")))?;
                String::from_utf8(bytes)
                    .map_err(|e| self.decode_error(format!("content is not UTF-8: {e}")))
            }
            other => Err(SearchError::UnsupportedEncoding {
                encoding: other.to_string(),
            }),
        }
    }

    fn decode_error(&self, message: String) -> SearchError {
        SearchError::ContentDecode {
            path: self.path.clone(),
            message,
        }
    }
}
