//! Query string assembly for the code search endpoint
//!
//! The search endpoint treats punctuation as operators or drops it, so every
//! character in [`INVALID_SEARCH_CHARS`] is replaced by a space before a term
//! is sent. Organization scope and raw qualifiers (`language:go`) are appended
//! after the sanitized terms and are never rewritten.

/// Characters the remote index cannot search for
pub const INVALID_SEARCH_CHARS: &str = ".,:;/\\`'\"=*!?#$&+^|~<>(){}[]@";

/// A fully assembled query, ready to be paged through
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Value of the `q` parameter
    pub q: String,
    /// Value of the `per_page` parameter
    pub per_page: u32,
}

impl SearchQuery {
    /// Query parameters for the given 1-indexed page
    pub fn params(&self, page: u32) -> [(&'static str, String); 3] {
        [
            ("q", self.q.clone()),
            ("page", page.to_string()),
            ("per_page", self.per_page.to_string()),
        ]
    }
}

/// Replace every invalid search character with a single space
pub fn sanitize_term(term: &str) -> String {
    term.chars()
        .map(|c| if INVALID_SEARCH_CHARS.contains(c) { ' ' } else { c })
        .collect()
}

/// Build the query for `terms`, scoped to `organization` when non-empty
///
/// Components are joined by a single space and empty components are skipped,
/// so the result never carries leading or trailing whitespace.
pub fn build_query(
    terms: &[String],
    organization: Option<&str>,
    raw_fragments: &[String],
    per_page: u32,
) -> SearchQuery {
    let sanitized = terms.iter().map(|term| sanitize_term(term));
    let org_scope = organization
        .map(str::trim)
        .filter(|org| !org.is_empty())
        .map(|org| format!("org:{org}"));
    let fragments = raw_fragments.iter().cloned();

    let q = sanitized
        .chain(org_scope)
        .chain(fragments)
        .filter_map(|part| {
            let trimmed = part.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .collect::<Vec<_>>()
        .join(" ");

    SearchQuery { q, per_page }
}
