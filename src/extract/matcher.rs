//! Line-by-line pattern matching that splits text into hits and residue.
//!
//! Each line is searched independently. A line with at least one hit is
//! removed from the residual text; every other line is kept verbatim.

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

/// A pattern failed to compile.
#[derive(Debug, Error)]
#[error("invalid pattern `{pattern}`: {source}")]
pub struct PatternError {
    pub pattern: String,
    #[source]
    pub source: regex::Error,
}

/// Compile a pattern, keeping the pattern text in the error.
pub fn compile(pattern: &str) -> Result<Regex, PatternError> {
    Regex::new(pattern).map_err(|source| PatternError {
        pattern: pattern.to_string(),
        source,
    })
}

/// One hit, reported by capture group.
///
/// Patterns without capture groups yield the whole match, patterns with a
/// single group yield that group, and patterns with several groups yield
/// every group in order (empty string where a group did not participate).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FoundMatch {
    Text(String),
    Groups(Vec<String>),
}

impl FoundMatch {
    /// The matched text: the string itself, or the first non-empty group.
    pub fn text(&self) -> &str {
        match self {
            FoundMatch::Text(text) => text,
            FoundMatch::Groups(groups) => groups
                .iter()
                .find(|g| !g.is_empty())
                .map(String::as_str)
                .unwrap_or(""),
        }
    }

    /// Consume into the matched text.
    pub fn into_text(self) -> String {
        match self {
            FoundMatch::Text(text) => text,
            FoundMatch::Groups(groups) => groups
                .into_iter()
                .find(|g| !g.is_empty())
                .unwrap_or_default(),
        }
    }
}

/// A hit located on a single line (byte offsets into that line).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineHit {
    pub start: usize,
    pub end: usize,
    pub found: FoundMatch,
}

/// Something that can report all non-overlapping hits on one line,
/// left to right.
pub trait LinePattern {
    fn find_all(&self, line: &str) -> Vec<LineHit>;
}

impl LinePattern for Regex {
    fn find_all(&self, line: &str) -> Vec<LineHit> {
        let group_count = self.captures_len() - 1;

        self.captures_iter(line)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let group =
                    |i: usize| caps.get(i).map_or(String::new(), |m| m.as_str().to_string());

                let found = match group_count {
                    0 => FoundMatch::Text(whole.as_str().to_string()),
                    1 => FoundMatch::Text(group(1)),
                    n => FoundMatch::Groups((1..=n).map(group).collect()),
                };

                Some(LineHit {
                    start: whole.start(),
                    end: whole.end(),
                    found,
                })
            })
            .collect()
    }
}

/// What happens to a line that contains a hit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RemovalMode {
    /// Drop the whole line, including any unmatched text sharing it.
    #[default]
    WholeLine,
    /// Cut out only the matched spans; drop the line if nothing but
    /// whitespace remains.
    MatchedSpan,
}

/// Hits found across a text plus the text left over after removing them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionResult {
    pub matches: Vec<FoundMatch>,
    #[serde(rename = "cleanedText")]
    pub cleaned_text: String,
}

/// Compile `pattern` and run it over `text`, dropping matching lines.
pub fn remove_by_regex(text: &str, pattern: &str) -> Result<ExtractionResult, PatternError> {
    remove_by_regex_with_mode(text, pattern, RemovalMode::WholeLine)
}

/// Compile `pattern` and run it over `text` with an explicit removal mode.
pub fn remove_by_regex_with_mode(
    text: &str,
    pattern: &str,
    mode: RemovalMode,
) -> Result<ExtractionResult, PatternError> {
    let regex = compile(pattern)?;
    Ok(remove_matches(text, &regex, mode))
}

/// Run an already-built pattern over `text`.
pub fn remove_matches<P>(text: &str, pattern: &P, mode: RemovalMode) -> ExtractionResult
where
    P: LinePattern + ?Sized,
{
    let mut matches = Vec::new();
    let mut kept: Vec<String> = Vec::new();

    for line in text.split('\n') {
        let hits = pattern.find_all(line);
        if hits.is_empty() {
            kept.push(line.to_string());
            continue;
        }

        if mode == RemovalMode::MatchedSpan {
            let remainder = strip_spans(line, &hits);
            if !remainder.trim().is_empty() {
                kept.push(remainder);
            }
        }

        matches.extend(hits.into_iter().map(|hit| hit.found));
    }

    ExtractionResult {
        matches,
        cleaned_text: kept.join("\n"),
    }
}

fn strip_spans(line: &str, hits: &[LineHit]) -> String {
    let mut out = String::with_capacity(line.len());
    let mut cursor = 0;
    for hit in hits {
        if hit.start >= cursor {
            out.push_str(&line[cursor..hit.start]);
        }
        cursor = cursor.max(hit.end);
    }
    out.push_str(&line[cursor..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_matches_keeps_text_exactly() {
        let text = "first line\n\nthird line\n";
        let result = remove_by_regex(text, r"\d+").unwrap();
        assert!(result.matches.is_empty());
        assert_eq!(result.cleaned_text, text);
    }

    #[test]
    fn test_matching_line_dropped_entirely() {
        let text = "keep me\nroom 101 and 202\nalso keep";
        let result = remove_by_regex(text, r"\d+").unwrap();
        assert_eq!(
            result.matches,
            vec![
                FoundMatch::Text("101".to_string()),
                FoundMatch::Text("202".to_string()),
            ]
        );
        assert_eq!(result.cleaned_text, "keep me\nalso keep");
    }

    #[test]
    fn test_matches_keep_line_order() {
        let text = "c 3\na 1\nb 2";
        let result = remove_by_regex(text, r"\d").unwrap();
        let found: Vec<&str> = result.matches.iter().map(FoundMatch::text).collect();
        assert_eq!(found, vec!["3", "1", "2"]);
        assert_eq!(result.cleaned_text, "");
    }

    #[test]
    fn test_single_group_yields_group_text() {
        let result = remove_by_regex("id=42", r"id=(\d+)").unwrap();
        assert_eq!(result.matches, vec![FoundMatch::Text("42".to_string())]);
    }

    #[test]
    fn test_multiple_groups_yield_tuple_with_empty_slots() {
        let result = remove_by_regex("b", r"(a)|(b)").unwrap();
        assert_eq!(
            result.matches,
            vec![FoundMatch::Groups(vec![String::new(), "b".to_string()])]
        );
        assert_eq!(result.matches[0].text(), "b");
    }

    #[test]
    fn test_invalid_pattern_is_pattern_error() {
        let err = remove_by_regex("anything", r"(unclosed").unwrap_err();
        assert_eq!(err.pattern, "(unclosed");
        assert!(err.to_string().contains("(unclosed"));
    }

    #[test]
    fn test_empty_text() {
        let result = remove_by_regex("", r"\w+").unwrap();
        assert!(result.matches.is_empty());
        assert_eq!(result.cleaned_text, "");
    }

    #[test]
    fn test_matched_span_mode_keeps_remainder() {
        let text = "call 555 today\n999\nplain";
        let result = remove_by_regex_with_mode(text, r"\d+", RemovalMode::MatchedSpan).unwrap();
        assert_eq!(result.matches.len(), 2);
        assert_eq!(result.cleaned_text, "call  today\nplain");
    }

    #[test]
    fn test_serializes_with_camel_case_residue() {
        let result = remove_by_regex("x 1", r"\d").unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["matches"], serde_json::json!(["1"]));
        assert_eq!(json["cleanedText"], "");
    }
}
