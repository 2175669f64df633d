//! GitHub REST API access: query assembly, wire types and the HTTP backend
pub mod client;
pub mod models;
pub mod query;

pub use client::{CodeSearchBackend, GitHubClient};
pub use models::{FileContents, Repository, SearchHit, SearchPage, TextMatch, TextMatchSpan};
pub use query::{SearchQuery, build_query};
