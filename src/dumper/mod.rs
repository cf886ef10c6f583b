pub mod file_dumper;
pub mod hex;
pub mod report;

pub use file_dumper::{verify_outcome, ChunkProgress, DumpOutcome, Dumper};
pub use report::{BatchReport, FileFailure};
