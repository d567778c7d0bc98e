//! Build log parsing collaborator
//!
//! Decoding the `.xcactivitylog` container is delegated to the `xclogparser`
//! executable. This module runs it, decodes its JSON step tree and flattens
//! the tree into the linear sequence of [`BuildStepRecord`]s that
//! classification consumes.

pub mod types;
pub mod xclogparser;

pub use types::{BuildStepRecord, DetailStepType, StepKind};
pub use xclogparser::{parse_json_tree, XcLogParserCli, DEFAULT_XCLOGPARSER_BINARY};

use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to run log parser {binary}: {source}")]
    Spawn {
        binary: String,
        source: std::io::Error,
    },
    #[error("Log parser exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
    #[error("Failed to decode log parser output: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Log parser returned no build steps for {0}")]
    Empty(String),
}

/// Turns a build log into a flattened sequence of build steps.
///
/// The first record is the build's root step; every other record names its
/// parent through `parent_identifier`.
pub trait LogParser: Send + Sync {
    fn parse(&self, log: &Path) -> Result<Vec<BuildStepRecord>, ParseError>;
}
