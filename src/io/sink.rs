//! Append-only CSV result sinks.
//!
//! Every append is written, flushed, and fsynced before the caller moves
//! on, so a crash at any point leaves parseable files and the checkpoint
//! never runs ahead of the rows it covers.

use crate::models::{FailureRecord, Result, ScrapeError, TranslatedPair};
use serde::Serialize;
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::path::Path;
use tracing::{debug, warn};

/// Append-only CSV file that writes its header on creation and survives
/// being reopened mid-run.
struct CsvAppender {
    writer: csv::Writer<File>,
    sync_handle: File,
}

impl CsvAppender {
    /// Open `path` for appending, writing `header` first when the file is
    /// new or empty.
    fn open(path: &Path, header: &[&str]) -> Result<Self> {
        let has_rows = fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| ScrapeError::io(format!("opening {}", path.display()), e))?;
        let sync_handle = file
            .try_clone()
            .map_err(|e| ScrapeError::io("cloning output handle", e))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if !has_rows {
            writer.write_record(header)?;
            writer
                .flush()
                .map_err(|e| ScrapeError::io("flushing header", e))?;
        }

        Ok(Self {
            writer,
            sync_handle,
        })
    }

    /// Serialize one row, flush, and fsync.
    fn append<S: Serialize>(&mut self, row: &S) -> Result<()> {
        self.writer.serialize(row)?;
        self.writer
            .flush()
            .map_err(|e| ScrapeError::io("flushing output", e))?;
        self.sync_handle
            .sync_all()
            .map_err(|e| ScrapeError::io("syncing output", e))?;
        Ok(())
    }
}

/// Collect the ids already present in an output file.
///
/// Rows a crashed run left unparseable are tolerated here; the files stay
/// append-only, so one torn tail row at most.
fn load_ids(path: &Path) -> Result<HashSet<u64>> {
    let mut ids = HashSet::new();
    if !path.exists() {
        return Ok(ids);
    }

    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    for record in reader.records() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Unparseable row in existing output");
                continue;
            }
        };
        if let Some(id) = record.get(0).and_then(|s| s.parse::<u64>().ok()) {
            ids.insert(id);
        }
    }
    Ok(ids)
}

/// Owns the pair and failure outputs for one driver run.
///
/// Both destinations are indexed by id at open, and appends for an id
/// already present are silently suppressed. That makes reprocessing a
/// record after a crash, and repeated retry-failed passes, idempotent.
pub struct ResultSink {
    pairs: CsvAppender,
    failures: CsvAppender,
    pair_ids: HashSet<u64>,
    failure_ids: HashSet<u64>,
}

impl ResultSink {
    /// Open (creating if needed) both output files.
    pub fn open(pairs_path: &Path, failures_path: &Path) -> Result<Self> {
        let pair_ids = load_ids(pairs_path)?;
        let failure_ids = load_ids(failures_path)?;
        if !pair_ids.is_empty() || !failure_ids.is_empty() {
            debug!(
                pairs = pair_ids.len(),
                failures = failure_ids.len(),
                "Indexed existing output rows"
            );
        }

        Ok(Self {
            pairs: CsvAppender::open(pairs_path, &["id", "english", "tunisian"])?,
            failures: CsvAppender::open(failures_path, &["id", "english", "status"])?,
            pair_ids,
            failure_ids,
        })
    }

    /// Append a translated pair unless its id is already present.
    /// Returns whether a row was written.
    pub fn record_success(&mut self, pair: &TranslatedPair) -> Result<bool> {
        if !self.pair_ids.insert(pair.id) {
            debug!(id = pair.id, "Pair already recorded, skipping append");
            return Ok(false);
        }
        self.pairs.append(pair)?;
        Ok(true)
    }

    /// Append a failure row unless its id is already present.
    /// Returns whether a row was written.
    pub fn record_failure(&mut self, failure: &FailureRecord) -> Result<bool> {
        if !self.failure_ids.insert(failure.id) {
            debug!(id = failure.id, "Failure already recorded, skipping append");
            return Ok(false);
        }
        self.failures.append(failure)?;
        Ok(true)
    }

    /// Whether the primary output already holds this id.
    pub fn has_pair(&self, id: u64) -> bool {
        self.pair_ids.contains(&id)
    }
}

/// Append-only audit log written by the retry-failed driver.
pub struct RetryLog {
    appender: CsvAppender,
}

impl RetryLog {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            appender: CsvAppender::open(path, &["id", "english", "outcome"])?,
        })
    }

    pub fn record(&mut self, id: u64, english: &str, outcome: &str) -> Result<()> {
        self.appender.append(&(id, english, outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FailureStatus;
    use tempfile::TempDir;

    fn pair(id: u64) -> TranslatedPair {
        TranslatedPair {
            id,
            english: format!("sentence {id}"),
            tunisian: format!("جملة {id}"),
        }
    }

    #[test]
    fn header_written_once_across_reopens() {
        let dir = TempDir::new().unwrap();
        let pairs = dir.path().join("pairs.csv");
        let failed = dir.path().join("failed.csv");

        {
            let mut sink = ResultSink::open(&pairs, &failed).unwrap();
            sink.record_success(&pair(1)).unwrap();
        }
        {
            let mut sink = ResultSink::open(&pairs, &failed).unwrap();
            sink.record_success(&pair(2)).unwrap();
        }

        let content = fs::read_to_string(&pairs).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines[0], "id,english,tunisian");
        assert_eq!(lines.len(), 3);
        assert_eq!(content.matches("id,english,tunisian").count(), 1);
    }

    #[test]
    fn duplicate_pair_ids_are_suppressed() {
        let dir = TempDir::new().unwrap();
        let pairs = dir.path().join("pairs.csv");
        let failed = dir.path().join("failed.csv");

        let mut sink = ResultSink::open(&pairs, &failed).unwrap();
        assert!(sink.record_success(&pair(1)).unwrap());
        assert!(!sink.record_success(&pair(1)).unwrap());
        drop(sink);

        // Also suppressed after reopening, via the on-disk index.
        let mut sink = ResultSink::open(&pairs, &failed).unwrap();
        assert!(sink.has_pair(1));
        assert!(!sink.record_success(&pair(1)).unwrap());

        let content = fs::read_to_string(&pairs).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn failure_rows_roundtrip_through_csv() {
        let dir = TempDir::new().unwrap();
        let pairs = dir.path().join("pairs.csv");
        let failed = dir.path().join("failed.csv");

        let mut sink = ResultSink::open(&pairs, &failed).unwrap();
        sink.record_failure(&FailureRecord {
            id: 1277,
            english: "I have to go to sleep.".to_string(),
            status: FailureStatus::NoTranslation,
        })
        .unwrap();
        sink.record_failure(&FailureRecord {
            id: 1278,
            english: "So what?".to_string(),
            status: FailureStatus::Error,
        })
        .unwrap();
        drop(sink);

        let content = fs::read_to_string(&failed).unwrap();
        assert!(content.contains("1277,I have to go to sleep.,no_translation"));
        assert!(content.contains("1278,So what?,error"));

        let mut reader = csv::Reader::from_path(&failed).unwrap();
        let rows: Vec<FailureRecord> = reader.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].status, FailureStatus::NoTranslation);
        assert_eq!(rows[1].status, FailureStatus::Error);
    }

    #[test]
    fn fields_with_commas_are_quoted() {
        let dir = TempDir::new().unwrap();
        let pairs = dir.path().join("pairs.csv");
        let failed = dir.path().join("failed.csv");

        let mut sink = ResultSink::open(&pairs, &failed).unwrap();
        sink.record_success(&TranslatedPair {
            id: 9,
            english: "Well, well, well.".to_string(),
            tunisian: "يا، يا".to_string(),
        })
        .unwrap();
        drop(sink);

        let mut reader = csv::Reader::from_path(&pairs).unwrap();
        let rows: Vec<TranslatedPair> = reader.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(rows[0].english, "Well, well, well.");
    }

    #[test]
    fn retry_log_appends_with_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("retry_results.csv");

        let mut log = RetryLog::open(&path).unwrap();
        log.record(1276, "Let's try something.", "success").unwrap();
        log.record(1277, "I have to go to sleep.", "error").unwrap();
        drop(log);

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines[0], "id,english,outcome");
        assert_eq!(lines.len(), 3);
    }
}
