//! Progress handler trait and events

use crate::classification::BuildCategory;
use std::path::PathBuf;
use std::time::Duration;

/// Events emitted while a metrics run progresses
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Run started for a build directory
    Started { build_dir: PathBuf },

    /// Build log found
    LogLocated { path: PathBuf, search_time: Duration },

    /// Log parser returned its records
    StepsParsed {
        records: usize,
        parse_time: Duration,
    },

    /// Build and targets classified
    Classified {
        category: BuildCategory,
        targets: usize,
        compiled_steps: u32,
    },

    /// Upload attempt finished
    UploadFinished {
        success: bool,
        upload_time: Duration,
    },

    /// Run completed
    Completed { total_time: Duration },

    /// Run failed
    Failed { error: String },
}

/// Receives progress events from the pipeline
pub trait ProgressHandler: Send + Sync {
    fn on_progress(&self, event: &ProgressEvent);
}

/// Handler that ignores all events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpHandler;

impl ProgressHandler for NoOpHandler {
    fn on_progress(&self, _event: &ProgressEvent) {}
}
