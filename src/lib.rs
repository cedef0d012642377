//! entn - checkpointed English→Tunisian translation scraping via the Klemy
//! service.
//!
//! ## Architecture
//!
//! One sentence at a time flows through:
//!
//! - **Sentence stream**: lazy TSV reader, re-opened from the start each run
//! - **Checkpoint filter**: drops everything at or below the saved id
//! - **Rate limiter + translator**: paced requests with bounded fixed-delay
//!   retries for transient errors
//! - **Result sink**: incremental, id-indexed CSV appends (pairs, failures)
//!
//! The checkpoint advances only after a record's outcome is flushed, so a
//! crash reprocesses at most one record and the sink's index keeps the
//! outputs duplicate-free.
//!
//! ## Drivers
//!
//! - **Scrape**: the resumable main pass over the input table
//! - **Retry-failed**: replays the failure file through the same translator
//!   and sink, auditing every attempt; it never touches the checkpoint

pub mod checkpoint;
pub mod client;
pub mod io;
pub mod models;
pub mod pipeline;

// Re-exports for convenience
pub use checkpoint::CheckpointStore;
pub use client::{KlemyClient, RateLimiter, TranslationService, Translator};
pub use io::{DebugLog, ResultSink, RetryLog, SentenceStream};
pub use models::{Config, Result, ScrapeError};
pub use pipeline::{RetryFailedPipeline, ScrapePipeline};
