//! Human-diagnostic append log.
//!
//! Timestamped lines for request attempts, retries, and errors. Diagnostic
//! only, no machine contract: a failed write disables the log instead of
//! interrupting the run.

use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use tracing::warn;

/// Append-only diagnostic log file.
pub struct DebugLog {
    file: Option<File>,
}

impl DebugLog {
    /// Open (creating if needed) the log at `path`.
    pub fn open(path: &Path) -> Self {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Self { file: Some(file) },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Debug log unavailable");
                Self { file: None }
            }
        }
    }

    /// A log that discards everything.
    pub fn disabled() -> Self {
        Self { file: None }
    }

    /// Append one timestamped line.
    pub fn line(&mut self, message: &str) {
        let Some(file) = self.file.as_mut() else {
            return;
        };
        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        if let Err(e) = writeln!(file, "[{stamp}] {message}") {
            warn!(error = %e, "Debug log write failed, disabling");
            self.file = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn lines_are_timestamped_and_appended() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("debug.log");

        let mut log = DebugLog::open(&path);
        log.line("ID 1276: no fs-3 paragraph in response");
        log.line("ID 1277: attempt 1/3: Service error (status 503)");
        drop(log);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].contains("ID 1276"));

        // Reopening keeps appending.
        let mut log = DebugLog::open(&path);
        log.line("ID 1278: request failed - timeout");
        drop(log);
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 3);
    }

    #[test]
    fn disabled_log_is_a_no_op() {
        let mut log = DebugLog::disabled();
        log.line("goes nowhere");
    }
}
