//! Import-alias-aware symbol usage resolution
//!
//! A symbol query names an exported resource of a package by its import path,
//! e.g. `github.com/acme/pkg.New`. Files are first matched broadly on the
//! import path and the resource name; each candidate is then re-matched on the
//! qualified name it would actually use (`widget.New` when the file imports
//! the package as `widget`, `pkg.New` otherwise).

use super::matcher::{FileContent, FileMatch, string_in_lines};
use crate::error::{SearchError, SearchResult};
use once_cell::sync::Lazy;
use regex::Regex;

/// Query fragment restricting the broad match to Go sources
pub const GO_LANGUAGE_FRAGMENT: &str = "language:go";

/// `<import path>.<Resource>`: split on the final dot, path contains a `/`
static SYMBOL_QUERY: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^([^/]*/.*)\.([^./]+)$").ok());

/// `[alias] "quoted/import/path"` on an import line
static IMPORT_SPEC: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r#"([^ ]*)[ ]*"[^"]*""#).ok());

/// A parsed `<import path>.<Resource>` query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolQuery {
    pub import_path: String,
    pub resource: String,
}

impl SymbolQuery {
    /// Terms for the broad first-pass match
    pub fn broad_terms(&self) -> Vec<String> {
        vec![self.import_path.clone(), self.resource.clone()]
    }

    /// Last `/` segment of the import path, the default package name
    pub fn default_alias(&self) -> &str {
        self.import_path
            .rsplit('/')
            .next()
            .unwrap_or(&self.import_path)
    }
}

/// Split a symbol query into import path and resource
///
/// # Errors
/// Returns `SearchError::InvalidSymbolQuery` unless the query has the form
/// `<path containing />.<Resource>`
pub fn parse_symbol_query(query: &str) -> SearchResult<SymbolQuery> {
    let invalid = || SearchError::InvalidSymbolQuery {
        query: query.to_string(),
    };

    let captures = SYMBOL_QUERY
        .as_ref()
        .and_then(|regex| regex.captures(query.trim()))
        .ok_or_else(invalid)?;

    match (captures.get(1), captures.get(2)) {
        (Some(path), Some(resource)) => Ok(SymbolQuery {
            import_path: path.as_str().to_string(),
            resource: resource.as_str().to_string(),
        }),
        _ => Err(invalid()),
    }
}

/// Local name under which `content` refers to `query.import_path`
///
/// Uses the first line that mentions the import path in quotes; lines that
/// only name it in prose are skipped. An explicit alias other than `import`
/// wins; otherwise the last segment of the quoted path is used. Falls back to
/// the last segment of the import path when no line mentions it in quotes.
pub fn resolve_import_alias(content: &FileContent, query: &SymbolQuery) -> String {
    let spec = content
        .lines()
        .filter(|line| line.contains(&query.import_path))
        .find_map(|line| IMPORT_SPEC.as_ref()?.captures(line));

    let Some(spec) = spec else {
        return query.default_alias().to_string();
    };

    let explicit = spec.get(1).map_or("", |alias| alias.as_str().trim());
    if !explicit.is_empty() && explicit != "import" {
        return explicit.to_string();
    }

    spec.get(0)
        .and_then(|whole| whole.as_str().rsplit('/').next())
        .map(|segment| segment.trim_end_matches('"').to_string())
        .filter(|segment| !segment.is_empty())
        .unwrap_or_else(|| query.default_alias().to_string())
}

/// `alias.Resource` as written at call sites
pub fn qualify(alias: &str, query: &SymbolQuery) -> String {
    format!("{alias}.{}", query.resource)
}

/// Re-match a broadly matched file on its alias-qualified symbol
///
/// Returns the file with its matches replaced, or `None` when the qualified
/// symbol never appears.
pub fn confirm_symbol_usage(file: FileMatch, query: &SymbolQuery) -> Option<FileMatch> {
    let alias = resolve_import_alias(&file.content, query);
    let qualified = qualify(&alias, query);
    let matches = string_in_lines(&qualified, &file.content);

    if matches.is_empty() {
        tracing::debug!(path = %file.hit.path, %qualified, "Symbol not used in file");
        return None;
    }

    Some(FileMatch { matches, ..file })
}
