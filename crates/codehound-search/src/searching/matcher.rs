//! Line-level literal matching over fetched file contents

use super::fetcher::FetchedFile;
use crate::github::SearchHit;
use serde::{Deserialize, Serialize};

/// Decoded text of one file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileContent {
    text: String,
}

impl FileContent {
    pub fn new(text: String) -> Self {
        Self { text }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Lines split on `\n` only; a `\r` before the newline stays on the line
    pub fn lines(&self) -> std::str::Split<'_, char> {
        self.text.split('\n')
    }

    /// The 1-indexed `row`, if the file has that many lines
    pub fn line(&self, row: usize) -> Option<&str> {
        self.lines().nth(row.checked_sub(1)?)
    }
}

/// One occurrence of a term on a line
///
/// `row` and `col` are 1-indexed and `col` counts characters, not bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineMatch {
    pub row: usize,
    pub col: usize,
    pub matched_text: String,
}

/// A hit whose content confirmed every required term
#[derive(Debug, Clone, Serialize)]
pub struct FileMatch {
    pub hit: SearchHit,
    #[serde(skip)]
    pub content: FileContent,
    pub matches: Vec<LineMatch>,
}

impl FileMatch {
    /// `owner/repo` of the file, empty when the remote omitted the repository
    pub fn repository_name(&self) -> &str {
        self.hit.repository_name()
    }

    pub fn path(&self) -> &str {
        &self.hit.path
    }
}

/// First occurrence of `term` on every line that contains it
///
/// Case-sensitive literal search; lines without the term produce nothing.
pub fn string_in_lines(term: &str, content: &FileContent) -> Vec<LineMatch> {
    content
        .lines()
        .enumerate()
        .filter_map(|(index, line)| {
            let byte_offset = line.find(term)?;
            let chars_before = line.get(..byte_offset).map_or(0, |prefix| prefix.chars().count());
            Some(LineMatch {
                row: index.saturating_add(1),
                col: chars_before.saturating_add(1),
                matched_text: term.to_string(),
            })
        })
        .collect()
}

/// Matches for every term, or `None` if any term is missing from the file
///
/// Empty terms are ignored, so an empty (or all-empty) term list keeps the
/// file with no matches.
pub fn match_all_terms(terms: &[String], content: &FileContent) -> Option<Vec<LineMatch>> {
    let mut all = Vec::new();
    for term in terms.iter().filter(|term| !term.is_empty()) {
        let found = string_in_lines(term, content);
        if found.is_empty() {
            return None;
        }
        all.extend(found);
    }
    Some(all)
}

/// Keep the fetched files that contain every term, annotated with matches
pub fn match_files(files: Vec<FetchedFile>, terms: &[String]) -> Vec<FileMatch> {
    files
        .into_iter()
        .filter_map(|FetchedFile { hit, content }| {
            let content = FileContent::new(content);
            match match_all_terms(terms, &content) {
                Some(matches) => Some(FileMatch {
                    hit,
                    content,
                    matches,
                }),
                None => {
                    tracing::debug!(path = %hit.path, "File does not contain every term");
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::searching::test_utils::hit;

    fn content(text: &str) -> FileContent {
        FileContent::new(text.to_string())
    }

    fn terms(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_rows_and_columns_are_one_indexed() {
        let matches = string_in_lines("needle", &content("needle\n  a needle\nnothing"));
        assert_eq!(
            matches,
            vec![
                LineMatch {
                    row: 1,
                    col: 1,
                    matched_text: "needle".to_string()
                },
                LineMatch {
                    row: 2,
                    col: 5,
                    matched_text: "needle".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_only_first_occurrence_per_line() {
        let matches = string_in_lines("ab", &content("ab ab ab"));
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn test_columns_count_characters() {
        let matches = string_in_lines("x", &content("ééx"));
        assert_eq!(matches.first().unwrap().col, 3);
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        assert!(string_in_lines("Needle", &content("needle")).is_empty());
    }

    #[test]
    fn test_all_terms_must_match() {
        let file = content("alpha\nbeta");
        assert_eq!(match_all_terms(&terms(&["alpha", "beta"]), &file).unwrap().len(), 2);
        assert!(match_all_terms(&terms(&["alpha", "gamma"]), &file).is_none());
    }

    #[test]
    fn test_empty_term_list_keeps_the_file() {
        assert_eq!(match_all_terms(&[], &content("anything")), Some(Vec::new()));
        assert_eq!(match_all_terms(&terms(&[""]), &content("anything")), Some(Vec::new()));
    }

    #[test]
    fn test_match_files_drops_partial_matches() {
        let files = vec![
            FetchedFile {
                hit: hit("acme/a", "both.go"),
                content: "foo()\nbar()".to_string(),
            },
            FetchedFile {
                hit: hit("acme/a", "one.go"),
                content: "foo()".to_string(),
            },
        ];

        let matched = match_files(files, &terms(&["foo", "bar"]));

        assert_eq!(matched.len(), 1);
        assert_eq!(matched.first().unwrap().path(), "both.go");
    }

    #[test]
    fn test_file_match_serializes_without_content() {
        let file = FileMatch {
            hit: hit("acme/a", "main.go"),
            content: content("secret body"),
            matches: Vec::new(),
        };
        let json = serde_json::to_value(&file).unwrap();
        assert!(json.get("content").is_none());
        assert_eq!(json["hit"]["path"], "main.go");
    }

    #[test]
    fn test_line_lookup() {
        let file = content("one\ntwo");
        assert_eq!(file.line(2), Some("two"));
        assert_eq!(file.line(0), None);
        assert_eq!(file.line(3), None);
    }
}
