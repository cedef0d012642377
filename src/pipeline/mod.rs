//! Pipeline drivers: the main scrape loop and the failed-row replay.

mod retry_failed;
mod scrape;

pub use retry_failed::*;
pub use scrape::*;
