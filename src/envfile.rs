//! Line-oriented parser for plain `KEY=VALUE` environment files.
//!
//! The parser is lazy: [`EnvParser`] walks the source a line at a time and
//! yields one event per non-blank, non-comment line. Re-opening the file
//! restarts the parse from scratch; nothing is cached between runs.
//!
//! Malformed lines are reported, never fatal. Duplicate keys are preserved
//! in source order; the consuming batch-import endpoint accepts duplicates.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Lines};
use std::path::Path;
use std::sync::OnceLock;

/// One imported environment variable, in batch-import shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvEntry {
    pub name: String,
    pub value: String,
    pub remarks: String,
}

/// A line that matched neither a blank/comment nor `KEY=VALUE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedLine {
    pub line_no: usize,
    pub content: String,
}

/// Per-line parse outcome. Blank and comment lines produce no event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseEvent {
    Entry(EnvEntry),
    Malformed(MalformedLine),
}

fn line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\s*=\s*(.*)$").expect("env line regex")
    })
}

/// Strip exactly one fully wrapping pair of matching quotes, never nested pairs.
fn strip_outer_quotes(value: &str) -> &str {
    if value.len() >= 2
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\'')))
    {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Escape substitution in fixed order: `\n`, `\t`, `\"`, `\'`.
fn unescape(value: &str) -> String {
    value
        .replace("\\n", "\n")
        .replace("\\t", "\t")
        .replace("\\\"", "\"")
        .replace("\\'", "'")
}

/// Parse a single raw line. `line_no` is 1-indexed; `source` names the file
/// for the provenance remark. Returns `None` for blank and comment lines.
pub fn parse_line(raw: &str, line_no: usize, source: &str) -> Option<ParseEvent> {
    let line = raw.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    match line_regex().captures(line) {
        Some(caps) => {
            let name = caps[1].to_string();
            let value = unescape(strip_outer_quotes(&caps[2]));
            Some(ParseEvent::Entry(EnvEntry {
                name,
                value,
                remarks: format!("imported from line {} of {}", line_no, source),
            }))
        }
        None => Some(ParseEvent::Malformed(MalformedLine {
            line_no,
            content: line.to_string(),
        })),
    }
}

/// Lazy parser over a buffered text source.
pub struct EnvParser<R: BufRead> {
    lines: Lines<R>,
    line_no: usize,
    source: String,
}

impl EnvParser<BufReader<File>> {
    /// Open `path` for a fresh parse. The caller is expected to have checked
    /// existence already if it wants a typed not-found error.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::from_reader(BufReader::new(file), &source))
    }
}

impl<R: BufRead> EnvParser<R> {
    pub fn from_reader(reader: R, source: &str) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            source: source.to_string(),
        }
    }
}

impl<R: BufRead> Iterator for EnvParser<R> {
    type Item = io::Result<ParseEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let raw = match self.lines.next()? {
                Ok(l) => l,
                Err(e) => return Some(Err(e)),
            };
            self.line_no += 1;
            if let Some(event) = parse_line(&raw, self.line_no, &self.source) {
                return Some(Ok(event));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(input: &str) -> (Vec<EnvEntry>, Vec<MalformedLine>) {
        let parser = EnvParser::from_reader(input.as_bytes(), "test.env");
        let mut entries = Vec::new();
        let mut malformed = Vec::new();
        for event in parser {
            match event.expect("in-memory read cannot fail") {
                ParseEvent::Entry(e) => entries.push(e),
                ParseEvent::Malformed(m) => malformed.push(m),
            }
        }
        (entries, malformed)
    }

    #[test]
    fn test_basic_entries_and_comment_skip() {
        let (entries, malformed) = parse_str("API_KEY=abc123\n# comment\nDEBUG=true\n");
        assert!(malformed.is_empty());
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "API_KEY");
        assert_eq!(entries[0].value, "abc123");
        assert_eq!(entries[0].remarks, "imported from line 1 of test.env");
        assert_eq!(entries[1].name, "DEBUG");
        assert_eq!(entries[1].value, "true");
        assert_eq!(entries[1].remarks, "imported from line 3 of test.env");
    }

    #[test]
    fn test_malformed_line_reported_not_fatal() {
        let (entries, malformed) = parse_str("BAD LINE\nX=1\n");
        assert_eq!(malformed.len(), 1);
        assert_eq!(malformed[0].line_no, 1);
        assert_eq!(malformed[0].content, "BAD LINE");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "X");
        assert_eq!(entries[0].value, "1");
    }

    #[test]
    fn test_value_may_contain_equals() {
        let (entries, _) = parse_str("URL=https://example.com/?a=1&b=2\n");
        assert_eq!(entries[0].value, "https://example.com/?a=1&b=2");
    }

    #[test]
    fn test_whitespace_around_separator() {
        let (entries, _) = parse_str("  KEY  =  padded value \n");
        assert_eq!(entries[0].name, "KEY");
        // Leading whitespace eaten by the separator pattern, trailing by trim.
        assert_eq!(entries[0].value, "padded value");
    }

    #[test]
    fn test_strips_exactly_one_matching_quote_pair() {
        let (entries, _) = parse_str("A=\"quoted\"\nB='single'\nC=\"'nested'\"\nD='it\"s'\n");
        assert_eq!(entries[0].value, "quoted");
        assert_eq!(entries[1].value, "single");
        // Only the outer pair goes; the inner pair survives.
        assert_eq!(entries[2].value, "'nested'");
        assert_eq!(entries[3].value, "it\"s");
    }

    #[test]
    fn test_mismatched_quotes_left_alone() {
        let (entries, _) = parse_str("A=\"half\nB='other\"\n");
        assert_eq!(entries[0].value, "\"half");
        assert_eq!(entries[1].value, "'other\"");
    }

    #[test]
    fn test_escape_substitution_order() {
        let (entries, _) = parse_str("A=line1\\nline2\\tend\nB=say \\\"hi\\\" and \\'bye\\'\n");
        assert_eq!(entries[0].value, "line1\nline2\tend");
        assert_eq!(entries[1].value, "say \"hi\" and 'bye'");
    }

    #[test]
    fn test_duplicate_keys_preserved_in_order() {
        let (entries, _) = parse_str("K=first\nK=second\nK=third\n");
        let values: Vec<&str> = entries.iter().map(|e| e.value.as_str()).collect();
        assert_eq!(values, ["first", "second", "third"]);
        assert!(entries.iter().all(|e| e.name == "K"));
    }

    #[test]
    fn test_invalid_identifier_is_malformed() {
        let (entries, malformed) = parse_str("9LIVES=no\n-DASH=no\nOK_1=yes\n");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "OK_1");
        assert_eq!(malformed.len(), 2);
    }

    #[test]
    fn test_empty_value_allowed() {
        let (entries, malformed) = parse_str("EMPTY=\n");
        assert!(malformed.is_empty());
        assert_eq!(entries[0].value, "");
    }

    #[test]
    fn test_restart_from_scratch_yields_same_sequence() {
        let input = "A=1\nbad\nB=2\n";
        let first = parse_str(input);
        let second = parse_str(input);
        assert_eq!(first, second);
    }
}
