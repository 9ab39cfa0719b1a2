//! Leveled, colored reporting to the operator.
//!
//! User-facing output goes through an injected [`Reporter`] instead of a
//! process-wide logger; tests substitute a capturing fake. `tracing` carries
//! diagnostics, the reporter carries the product surface.

use chrono::Local;
use owo_colors::OwoColorize;

/// Severity of a reported line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
    Debug,
}

impl Level {
    pub fn label(self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Success => "SUCCESS",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Debug => "DEBUG",
        }
    }
}

/// Leveled log sink for user-facing output.
pub trait Reporter {
    fn log(&self, level: Level, message: &str);

    fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }
    fn success(&self, message: &str) {
        self.log(Level::Success, message);
    }
    fn warning(&self, message: &str) {
        self.log(Level::Warning, message);
    }
    fn error(&self, message: &str) {
        self.log(Level::Error, message);
    }
    fn debug(&self, message: &str) {
        self.log(Level::Debug, message);
    }
}

/// Production reporter: timestamped colored lines on stdout.
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn log(&self, level: Level, message: &str) {
        let ts = Local::now().format("%Y-%m-%d %H:%M:%S");
        let tag = format!("[{}] [{}]", ts, level.label());
        let tag = match level {
            Level::Info => tag.blue().to_string(),
            Level::Success => tag.green().to_string(),
            Level::Warning => tag.yellow().to_string(),
            Level::Error => tag.red().to_string(),
            Level::Debug => tag.purple().to_string(),
        };
        println!("{} {}", tag, message);
    }
}

#[cfg(test)]
pub mod testing {
    //! Capturing reporter for unit tests.

    use super::{Level, Reporter};
    use std::cell::RefCell;

    #[derive(Default)]
    pub struct CaptureReporter {
        pub lines: RefCell<Vec<(Level, String)>>,
    }

    impl CaptureReporter {
        pub fn new() -> Self {
            Self::default()
        }

        /// All captured messages, any level.
        pub fn messages(&self) -> Vec<String> {
            self.lines.borrow().iter().map(|(_, m)| m.clone()).collect()
        }

        /// Captured messages at one level.
        pub fn at_level(&self, level: Level) -> Vec<String> {
            self.lines
                .borrow()
                .iter()
                .filter(|(l, _)| *l == level)
                .map(|(_, m)| m.clone())
                .collect()
        }

        pub fn contains(&self, needle: &str) -> bool {
            self.lines.borrow().iter().any(|(_, m)| m.contains(needle))
        }
    }

    impl Reporter for CaptureReporter {
        fn log(&self, level: Level, message: &str) {
            self.lines.borrow_mut().push((level, message.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::CaptureReporter;
    use super::*;

    #[test]
    fn test_capture_reporter_records_levels() {
        let r = CaptureReporter::new();
        r.info("hello");
        r.warning("careful");
        r.error("boom");
        assert_eq!(r.at_level(Level::Info), vec!["hello".to_string()]);
        assert_eq!(r.at_level(Level::Warning), vec!["careful".to_string()]);
        assert!(r.contains("boom"));
    }

    #[test]
    fn test_level_labels() {
        assert_eq!(Level::Success.label(), "SUCCESS");
        assert_eq!(Level::Debug.label(), "DEBUG");
    }
}
