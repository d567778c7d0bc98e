use super::context::{PipelineContext, RunRequest};
use crate::classification::{
    classify, partition_steps, BuildCategorisation, PartitionError, Target,
};
use crate::discovery::DiscoveryError;
use crate::facts::HostFactsError;
use crate::metrics::{assemble, BuildMetrics};
use crate::parser::{BuildStepRecord, ParseError};
use crate::progress::{NoOpHandler, ProgressEvent, ProgressHandler};
use crate::upload::LogPayload;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, info};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    #[error("Failed to parse build log: {0}")]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Partition(#[from] PartitionError),
    #[error(transparent)]
    HostFacts(#[from] HostFactsError),
    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// What happened to the upload of a metrics record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadStatus {
    Delivered,
    Failed(String),
    /// Dry run, nothing was sent
    Skipped,
}

#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub log_path: PathBuf,
    pub metrics: BuildMetrics,
    pub categorisation: BuildCategorisation,
    /// Targets annotated with their category and compiled count
    pub targets: Vec<Target>,
    pub dropped_steps: usize,
    pub upload: UploadStatus,
    pub elapsed: Duration,
}

pub struct PipelineOrchestrator {
    context: PipelineContext,
    progress_handler: Arc<dyn ProgressHandler>,
}

impl PipelineOrchestrator {
    pub fn new(context: PipelineContext) -> Self {
        Self {
            context,
            progress_handler: Arc::new(NoOpHandler),
        }
    }

    pub fn with_progress(mut self, handler: Arc<dyn ProgressHandler>) -> Self {
        self.progress_handler = handler;
        self
    }

    pub async fn execute(&self, request: &RunRequest) -> Result<PipelineOutcome, PipelineError> {
        let start = Instant::now();
        self.progress_handler.on_progress(&ProgressEvent::Started {
            build_dir: request.build_dir.clone(),
        });

        match self.run(request, start).await {
            Ok(outcome) => {
                self.progress_handler.on_progress(&ProgressEvent::Completed {
                    total_time: outcome.elapsed,
                });
                Ok(outcome)
            }
            Err(e) => {
                self.progress_handler.on_progress(&ProgressEvent::Failed {
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        request: &RunRequest,
        start: Instant,
    ) -> Result<PipelineOutcome, PipelineError> {
        let (log_path, records) = self.locate_and_parse(request).await?;

        let partitioned = partition_steps(&records)?;

        let categorisation = classify(&partitioned.targets, &partitioned.steps);
        let mut targets = partitioned.targets;
        categorisation.annotate(&mut targets);
        self.progress_handler.on_progress(&ProgressEvent::Classified {
            category: categorisation.build_category,
            targets: targets.len(),
            compiled_steps: categorisation.build_compiled_count,
        });

        let system_info = self.context.host_facts.fetch()?;
        let xcode_version = self.context.xcode_facts.fetch();
        if xcode_version.is_none() {
            debug!("Xcode version not available in environment");
        }

        let metrics = assemble(
            &categorisation,
            partitioned.build_duration_secs,
            request.is_ci,
            system_info,
            xcode_version,
        );

        let upload = if request.dry_run {
            info!("Dry run, skipping upload");
            UploadStatus::Skipped
        } else {
            self.upload(request, &metrics).await
        };

        Ok(PipelineOutcome {
            log_path,
            metrics,
            categorisation,
            targets,
            dropped_steps: partitioned.dropped_steps,
            upload,
            elapsed: start.elapsed(),
        })
    }

    /// Discovery polls with blocking sleeps and parsing runs a subprocess, so
    /// both happen on the blocking pool.
    async fn locate_and_parse(
        &self,
        request: &RunRequest,
    ) -> Result<(PathBuf, Vec<BuildStepRecord>), PipelineError> {
        let discovery = self.context.discovery.clone();
        let parser = Arc::clone(&self.context.parser);
        let progress = Arc::clone(&self.progress_handler);
        let build_dir = request.build_dir.clone();
        let timeout_secs = request.timeout_secs;

        tokio::task::spawn_blocking(move || -> Result<_, PipelineError> {
            let search_start = Instant::now();
            let log_path = discovery.locate_latest_log(&build_dir, timeout_secs)?;
            progress.on_progress(&ProgressEvent::LogLocated {
                path: log_path.clone(),
                search_time: search_start.elapsed(),
            });

            let parse_start = Instant::now();
            let records = parser.parse(&log_path)?;
            progress.on_progress(&ProgressEvent::StepsParsed {
                records: records.len(),
                parse_time: parse_start.elapsed(),
            });

            Ok((log_path, records))
        })
        .await?
    }

    async fn upload(&self, request: &RunRequest, metrics: &BuildMetrics) -> UploadStatus {
        let payload = LogPayload::new(
            request.hostname.clone(),
            request.project_name.clone(),
            metrics.clone(),
        );

        let upload_start = Instant::now();
        let result = self
            .context
            .uploader
            .send(&payload, &request.credentials)
            .await;
        self.progress_handler.on_progress(&ProgressEvent::UploadFinished {
            success: result.is_ok(),
            upload_time: upload_start.elapsed(),
        });

        match result {
            Ok(()) => UploadStatus::Delivered,
            Err(e) => {
                error!(error = %e, "Failed to upload build metrics");
                UploadStatus::Failed(e.to_string())
            }
        }
    }
}
