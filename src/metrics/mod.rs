//! The metrics record shipped to the ingestion endpoint

pub mod assembler;
pub mod model;

pub use assembler::assemble;
pub use model::{BuildMetrics, SystemInfo, XcodeVersion};
