//! Replay of previously failed translations.
//!
//! Reads the failure file produced by the scrape driver and pushes every
//! row back through the shared translator. Successes land in the primary
//! pair output (the sink's id index keeps repeated passes from duplicating
//! rows); every attempt is recorded in the audit log. The failure file
//! itself is never rewritten.

use crate::client::{TranslationService, Translator};
use crate::io::{ResultSink, RetryLog};
use crate::models::{Config, FailureRecord, Result, RetryStats, TranslatedPair, TranslationOutcome};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// The failed-row replay driver. Independent of the checkpoint.
pub struct RetryFailedPipeline<S> {
    config: Config,
    translator: Translator<S>,
    interrupt: Arc<AtomicBool>,
}

impl<S: TranslationService> RetryFailedPipeline<S> {
    pub fn new(config: Config, translator: Translator<S>, interrupt: Arc<AtomicBool>) -> Self {
        Self {
            config,
            translator,
            interrupt,
        }
    }

    /// Retry every failure row once through the normal retry policy.
    pub async fn run(&mut self) -> Result<RetryStats> {
        let start = Instant::now();
        let mut stats = RetryStats::default();

        if !self.config.files.failed.exists() {
            info!("No failure file found, nothing to retry");
            return Ok(stats);
        }

        let failures = load_failures(&self.config.files.failed)?;
        if failures.is_empty() {
            info!("No failed translations to retry");
            return Ok(stats);
        }
        info!(count = failures.len(), "Retrying failed translations");

        let mut sink = ResultSink::open(&self.config.files.pairs, &self.config.files.failed)?;
        let mut log = RetryLog::open(&self.config.files.retry_log)?;

        let pb = ProgressBar::new(failures.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} ({percent}%) {msg}")
                .unwrap()
                .progress_chars("##-"),
        );

        for failure in failures {
            if self.interrupt.load(Ordering::SeqCst) {
                warn!("Interrupt received, stopping after the last completed record");
                stats.interrupted = true;
                break;
            }

            let outcome = self.translator.attempt(failure.id, &failure.english).await;

            if let TranslationOutcome::Success { tunisian } = &outcome {
                let written = sink.record_success(&TranslatedPair {
                    id: failure.id,
                    english: failure.english.clone(),
                    tunisian: tunisian.clone(),
                })?;
                if !written {
                    debug!(id = failure.id, "Pair was already recovered by an earlier pass");
                }
                stats.recovered += 1;
            } else {
                stats.still_failed += 1;
            }

            log.record(failure.id, &failure.english, outcome.label())?;

            pb.inc(1);
            pb.set_message(format!(
                "recovered: {}, still failed: {}",
                stats.recovered, stats.still_failed
            ));
        }
        pb.finish_and_clear();

        stats.runtime_secs = start.elapsed().as_secs_f64();
        info!(
            recovered = stats.recovered,
            still_failed = stats.still_failed,
            "Retry pass finished"
        );

        Ok(stats)
    }
}

/// Read all failure rows up front; the file is small relative to the input
/// table and must not be held open while the sink re-indexes it.
fn load_failures(path: &Path) -> Result<Vec<FailureRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for row in reader.deserialize::<FailureRecord>() {
        match row {
            Ok(record) => rows.push(record),
            Err(e) => warn!(error = %e, "Skipping unparseable failure row"),
        }
    }
    Ok(rows)
}
