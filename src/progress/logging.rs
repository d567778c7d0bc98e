//! Logging-based progress handler

use super::{ProgressEvent, ProgressHandler};
use tracing::{error, info, warn};

/// Handler that logs progress events using tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ProgressHandler for LoggingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Started { build_dir } => {
                info!(build_dir = %build_dir.display(), "Collecting build metrics");
            }
            ProgressEvent::LogLocated { path, search_time } => {
                info!(
                    log = %path.display(),
                    search_time_ms = search_time.as_millis(),
                    "Build log located"
                );
            }
            ProgressEvent::StepsParsed {
                records,
                parse_time,
            } => {
                info!(
                    records,
                    parse_time_ms = parse_time.as_millis(),
                    "Build log parsed"
                );
            }
            ProgressEvent::Classified {
                category,
                targets,
                compiled_steps,
            } => {
                info!(
                    category = %category,
                    targets,
                    compiled_steps,
                    "Build classified"
                );
            }
            ProgressEvent::UploadFinished {
                success,
                upload_time,
            } => {
                if *success {
                    info!(upload_time_ms = upload_time.as_millis(), "Upload complete");
                } else {
                    warn!(upload_time_ms = upload_time.as_millis(), "Upload failed");
                }
            }
            ProgressEvent::Completed { total_time } => {
                info!(total_time_ms = total_time.as_millis(), "Metrics run complete");
            }
            ProgressEvent::Failed { error } => {
                error!(error = %error, "Metrics run failed");
            }
        }
    }
}
