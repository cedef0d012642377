//! Main scrape pipeline.
//!
//! Flow: sentence stream → checkpoint filter → rate-limited translate with
//! retry → result sink → checkpoint advance. The checkpoint is saved only
//! after the record's outcome is flushed, so a crash at any point costs at
//! most one reprocessed record, which the sink's id index absorbs.

use crate::checkpoint::CheckpointStore;
use crate::client::{TranslationService, Translator};
use crate::io::{ResultSink, SentenceStream};
use crate::models::{
    Config, FailureRecord, FailureStatus, Result, RunStats, TranslatedPair, TranslationOutcome,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// The resumable scrape driver.
pub struct ScrapePipeline<S> {
    config: Config,
    translator: Translator<S>,
    interrupt: Arc<AtomicBool>,
}

impl<S: TranslationService> ScrapePipeline<S> {
    pub fn new(config: Config, translator: Translator<S>, interrupt: Arc<AtomicBool>) -> Self {
        Self {
            config,
            translator,
            interrupt,
        }
    }

    /// Drive the full input table once, resuming past everything the
    /// checkpoint already covers.
    pub async fn run(&mut self) -> Result<RunStats> {
        let start = Instant::now();

        let checkpoint = CheckpointStore::new(&self.config.files.checkpoint);
        let last_id = checkpoint.load()?;
        match last_id {
            Some(id) => info!(last_id = id, "Resuming from checkpoint"),
            None => info!("No checkpoint found, starting from the beginning"),
        }

        let mut sink = ResultSink::open(&self.config.files.pairs, &self.config.files.failed)?;
        let stream = SentenceStream::open(
            &self.config.files.input,
            self.config.files.lang_filter.clone(),
        )?;

        // Skip-done is a filter on the stream; read errors pass through to
        // fail the run below.
        let mut skipped = 0usize;
        let pending = stream.filter(|item| match item {
            Ok(record) => {
                let done = last_id.is_some_and(|last| record.id <= last);
                if done {
                    skipped += 1;
                }
                !done
            }
            Err(_) => true,
        });

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} [{elapsed_precise}] {pos} processed {msg}")
                .unwrap(),
        );

        let mut stats = RunStats::default();

        for item in pending {
            if self.interrupt.load(Ordering::SeqCst) {
                warn!("Interrupt received, stopping after the last completed record");
                stats.interrupted = true;
                break;
            }

            let record = item?;
            let outcome = self.translator.attempt(record.id, &record.english).await;

            match outcome {
                TranslationOutcome::Success { tunisian } => {
                    sink.record_success(&TranslatedPair {
                        id: record.id,
                        english: record.english,
                        tunisian,
                    })?;
                    stats.translated += 1;
                }
                TranslationOutcome::NoTranslation => {
                    sink.record_failure(&FailureRecord {
                        id: record.id,
                        english: record.english,
                        status: FailureStatus::NoTranslation,
                    })?;
                    stats.failed += 1;
                }
                TranslationOutcome::TransientError { cause }
                | TranslationOutcome::FatalError { cause } => {
                    warn!(id = record.id, cause = %cause, "Recording failed translation");
                    sink.record_failure(&FailureRecord {
                        id: record.id,
                        english: record.english,
                        status: FailureStatus::Error,
                    })?;
                    stats.failed += 1;
                }
            }

            // The outcome is durable; only now may the checkpoint advance.
            checkpoint.save(record.id)?;

            pb.inc(1);
            pb.set_message(format!("ok: {}, failed: {}", stats.translated, stats.failed));
        }
        pb.finish_and_clear();

        stats.skipped = skipped;
        stats.runtime_secs = start.elapsed().as_secs_f64();

        let pacing = self.translator.limiter_stats();
        info!(
            translated = stats.translated,
            failed = stats.failed,
            skipped = stats.skipped,
            requests = pacing.total_requests,
            waited_secs = format!("{:.1}", pacing.total_wait_secs),
            "Scrape pipeline finished"
        );

        Ok(stats)
    }
}
