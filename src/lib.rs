//! xcdog - Xcode build metrics for Datadog
//!
//! Runs after an Xcode build, finds the activity log the build produced,
//! decides whether the build was a no-op, incremental or clean build, and
//! ships the result with host facts to the Datadog logs intake.
//!
//! # Example Usage
//!
//! ```no_run
//! use xcdog::{PipelineContext, PipelineOrchestrator, RunRequest, XcdogConfig};
//! use xcdog::upload::Credentials;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = XcdogConfig::default();
//! let context = PipelineContext::from_config(&config, "build-mac")?;
//! let orchestrator = PipelineOrchestrator::new(context);
//!
//! let request = RunRequest::new(
//!     "/Users/me/Library/Developer/Xcode/DerivedData/App-abc/Build/Products",
//!     config.timeout_secs,
//!     Credentials::new("api-key", "application-key"),
//! );
//! let outcome = orchestrator.execute(&request).await?;
//! println!("{}", outcome.metrics.build_category());
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`discovery`]: locating the newest build log
//! - [`parser`]: running `xclogparser` and decoding its step tree
//! - [`classification`]: partitioning steps and classifying the build
//! - [`metrics`]: the record that gets uploaded
//! - [`facts`]: host and Xcode facts
//! - [`upload`]: Datadog intake client
//! - [`pipeline`]: the end-to-end run

pub mod classification;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod facts;
pub mod fs;
pub mod metrics;
pub mod parser;
pub mod pipeline;
pub mod progress;
pub mod upload;
pub mod util;

pub use classification::{classify, partition_steps, BuildCategorisation, BuildCategory};
pub use config::{ConfigError, XcdogConfig};
pub use discovery::{DiscoveryError, LogDiscovery};
pub use metrics::{assemble, BuildMetrics, SystemInfo, XcodeVersion};
pub use pipeline::{
    PipelineContext, PipelineError, PipelineOrchestrator, PipelineOutcome, RunRequest,
    UploadStatus,
};
pub use util::{init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
