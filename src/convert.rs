//! Env-file → batch-import JSON conversion.
//!
//! Reads `KEY=VALUE` lines, emits a JSON array of `{name, value, remarks}`
//! objects in source order. Two-space indentation, non-ASCII left unescaped
//! so values survive the import round trip byte-for-byte.

use crate::envfile::{EnvEntry, EnvParser, ParseEvent};
use crate::report::Reporter;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Shown after a successful conversion so the operator knows the next step.
const BATCH_IMPORT_HINT: &str = "bash batch-add-envs.sh";

/// Maximum characters of a value echoed in the summary preview.
const PREVIEW_LEN: usize = 30;

/// Errors that abort a conversion. Malformed lines are warnings, not errors.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("input file not found: {0}")]
    InputNotFound(PathBuf),

    #[error("no valid environment entries found in {0}")]
    EmptyResult(PathBuf),

    #[error("failed to read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Parse `input` and collect its valid entries, reporting one warning per
/// malformed line. Returns the entries and the malformed-line count.
pub fn parse_env_file(
    input: &Path,
    reporter: &dyn Reporter,
) -> Result<(Vec<EnvEntry>, usize), ConvertError> {
    if !input.exists() {
        return Err(ConvertError::InputNotFound(input.to_path_buf()));
    }
    let parser = EnvParser::open(input).map_err(|e| ConvertError::ReadFailed {
        path: input.to_path_buf(),
        source: e,
    })?;

    let mut entries = Vec::new();
    let mut skipped = 0usize;
    for event in parser {
        match event.map_err(|e| ConvertError::ReadFailed {
            path: input.to_path_buf(),
            source: e,
        })? {
            ParseEvent::Entry(entry) => entries.push(entry),
            ParseEvent::Malformed(line) => {
                skipped += 1;
                reporter.warning(&format!(
                    "line {} is not KEY=VALUE, skipped: {}",
                    line.line_no, line.content
                ));
            }
        }
    }
    Ok((entries, skipped))
}

/// Full conversion: parse, serialize, write, summarize.
/// Returns the number of converted entries.
pub fn run_convert(
    input: &Path,
    output: &Path,
    reporter: &dyn Reporter,
) -> Result<usize, ConvertError> {
    reporter.info(&format!("input file: {}", input.display()));
    reporter.info(&format!("output file: {}", output.display()));

    let (entries, skipped) = parse_env_file(input, reporter)?;
    if entries.is_empty() {
        return Err(ConvertError::EmptyResult(input.to_path_buf()));
    }

    // serde_json pretty printing is two-space indented and leaves non-ASCII
    // characters unescaped, which is exactly the import format.
    let json = serde_json::to_string_pretty(&entries)
        .expect("EnvEntry serialization is infallible");
    fs::write(output, json.as_bytes()).map_err(|e| ConvertError::WriteFailed {
        path: output.to_path_buf(),
        source: e,
    })?;

    reporter.success(&format!(
        "converted {} environment variable(s), {} line(s) skipped",
        entries.len(),
        skipped
    ));
    for entry in &entries {
        reporter.info(&format!("  - {}: {}", entry.name, preview(&entry.value)));
    }
    reporter.info(&format!(
        "import them with: {} {}",
        BATCH_IMPORT_HINT,
        output.display()
    ));

    Ok(entries.len())
}

fn preview(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() > PREVIEW_LEN {
        let mut s: String = chars[..PREVIEW_LEN].iter().collect();
        s.push_str("...");
        s
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::testing::CaptureReporter;

    #[test]
    fn test_convert_roundtrip_preserves_order_and_duplicates() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("vars.env");
        let output = dir.path().join("vars.json");
        fs::write(&input, "B=2\nA=1\nB=3\n").unwrap();

        let reporter = CaptureReporter::new();
        let count = run_convert(&input, &output, &reporter).expect("convert");
        assert_eq!(count, 3);

        let parsed: Vec<EnvEntry> =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        let names: Vec<&str> = parsed.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["B", "A", "B"]);
        assert_eq!(parsed[2].value, "3");
    }

    #[test]
    fn test_missing_input_is_typed_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let reporter = CaptureReporter::new();
        let err = run_convert(
            &dir.path().join("nope.env"),
            &dir.path().join("out.json"),
            &reporter,
        )
        .unwrap_err();
        assert!(matches!(err, ConvertError::InputNotFound(_)));
    }

    #[test]
    fn test_zero_valid_entries_is_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("only-comments.env");
        fs::write(&input, "# a\n\n# b\nnot a pair\n").unwrap();

        let reporter = CaptureReporter::new();
        let err = run_convert(&input, &dir.path().join("out.json"), &reporter).unwrap_err();
        assert!(matches!(err, ConvertError::EmptyResult(_)));
        // The malformed line still produced its warning before the failure.
        assert!(reporter.contains("not a pair"));
    }

    #[test]
    fn test_malformed_lines_warn_and_are_excluded() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("mixed.env");
        let output = dir.path().join("out.json");
        fs::write(&input, "BAD LINE\nX=1\n").unwrap();

        let reporter = CaptureReporter::new();
        let count = run_convert(&input, &output, &reporter).expect("convert");
        assert_eq!(count, 1);
        assert!(reporter.contains("line 1"));
    }

    #[test]
    fn test_output_is_two_space_indented_with_unescaped_unicode() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("cn.env");
        let output = dir.path().join("cn.json");
        fs::write(&input, "NAME_LIST=\"账户一,账户二\"\n").unwrap();

        let reporter = CaptureReporter::new();
        run_convert(&input, &output, &reporter).expect("convert");
        let text = fs::read_to_string(&output).unwrap();
        assert!(text.contains("账户一,账户二"));
        assert!(text.contains("\n  {"));
        assert!(!text.contains("\\u"));
    }

    #[test]
    fn test_write_failure_is_typed_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("vars.env");
        fs::write(&input, "A=1\n").unwrap();
        // Output path points into a missing directory.
        let output = dir.path().join("no-such-dir").join("out.json");

        let reporter = CaptureReporter::new();
        let err = run_convert(&input, &output, &reporter).unwrap_err();
        assert!(matches!(err, ConvertError::WriteFailed { .. }));
    }

    #[test]
    fn test_preview_truncates_long_values() {
        assert_eq!(preview("short"), "short");
        let long = "x".repeat(40);
        let p = preview(&long);
        assert!(p.ends_with("..."));
        assert_eq!(p.chars().count(), 33);
    }
}
