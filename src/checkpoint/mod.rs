//! Checkpoint module for resumable scraping.

mod store;

pub use store::*;
