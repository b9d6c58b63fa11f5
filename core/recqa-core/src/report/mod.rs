pub mod output;
pub mod stats;
pub mod writer;

pub use output::{OutputLayout, RecordWrapper};
pub use stats::{ErrorStat, ErrorStats, RunSummary};
pub use writer::JsonArrayWriter;
