//! Record types flowing through the pipeline.

use serde::{Deserialize, Serialize};

/// One row of the input sentence table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentenceRecord {
    /// Identifier from the source table; identity of the record
    pub id: u64,

    /// English source text
    pub english: String,
}

/// Terminal outcome of translating a single sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationOutcome {
    /// The service produced a translation
    Success { tunisian: String },
    /// The service responded but had no candidate
    NoTranslation,
    /// Retries exhausted on a retry-worthy error
    TransientError { cause: String },
    /// The request was rejected outright; retrying cannot help
    FatalError { cause: String },
}

impl TranslationOutcome {
    /// Label written to the retry results audit log.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::NoTranslation => "no_translation",
            Self::TransientError { .. } | Self::FatalError { .. } => "error",
        }
    }
}

/// A successfully translated sentence pair, keyed by `id` in the primary
/// output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatedPair {
    pub id: u64,
    pub english: String,
    pub tunisian: String,
}

/// Why a sentence ended up in the failure output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStatus {
    /// Service responded without a candidate translation
    NoTranslation,
    /// Transient errors exhausted retries, or the request was rejected
    Error,
}

impl FailureStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoTranslation => "no_translation",
            Self::Error => "error",
        }
    }
}

/// One row of the failure output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub id: u64,
    pub english: String,
    pub status: FailureStatus,
}

/// Counters reported at the end of a scrape run.
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Pairs appended to the primary output
    pub translated: usize,
    /// Rows appended to the failure output
    pub failed: usize,
    /// Records already covered by the checkpoint
    pub skipped: usize,
    /// The run stopped on an interrupt before exhausting the input
    pub interrupted: bool,
    pub runtime_secs: f64,
}

/// Counters reported at the end of a retry-failed run.
#[derive(Debug, Clone, Default)]
pub struct RetryStats {
    /// Previously failed sentences that now translated
    pub recovered: usize,
    /// Sentences that failed again
    pub still_failed: usize,
    /// The run stopped on an interrupt before exhausting the failure rows
    pub interrupted: bool,
    pub runtime_secs: f64,
}
