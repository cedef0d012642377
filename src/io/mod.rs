//! File-backed streams and sinks: the input table, the CSV outputs, and the
//! diagnostic log.

mod debug_log;
mod sink;
mod source;

pub use debug_log::*;
pub use sink::*;
pub use source::*;
