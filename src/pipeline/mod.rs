//! End-to-end metrics run: discover, parse, classify, assemble, upload

pub mod context;
pub mod orchestrator;

pub use context::{PipelineContext, RunRequest};
pub use orchestrator::{PipelineError, PipelineOrchestrator, PipelineOutcome, UploadStatus};
