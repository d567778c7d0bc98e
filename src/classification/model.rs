use crate::parser::{BuildStepRecord, DetailStepType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

const TARGET_TITLE_PREFIX: &str = "Build target ";

/// How much of a build (or target) was freshly compiled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildCategory {
    /// Nothing compiled, everything came from cache or was up to date
    Noop,
    Incremental,
    /// Everything compiled from scratch
    Clean,
}

impl fmt::Display for BuildCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildCategory::Noop => write!(f, "noop"),
            BuildCategory::Incremental => write!(f, "incremental"),
            BuildCategory::Clean => write!(f, "clean"),
        }
    }
}

/// A buildable target, derived from a `target` step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Target {
    pub identifier: String,
    pub build_identifier: String,
    pub name: String,
    pub start_timestamp: f64,
    pub end_timestamp: f64,
    pub duration: f64,
    pub compilation_end_timestamp: f64,
    pub compilation_duration: f64,
    pub warning_count: u32,
    pub error_count: u32,
    pub fetched_from_cache: bool,
    pub category: Option<BuildCategory>,
    pub compiled_count: Option<u32>,
}

impl Target {
    pub fn from_record(record: &BuildStepRecord) -> Self {
        let name = record
            .title
            .strip_prefix(TARGET_TITLE_PREFIX)
            .unwrap_or(&record.title)
            .to_string();

        Self {
            identifier: record.identifier.clone(),
            build_identifier: record.parent_identifier.clone(),
            name,
            start_timestamp: record.start_timestamp,
            end_timestamp: record.end_timestamp,
            duration: record.duration,
            compilation_end_timestamp: record.compilation_end_timestamp,
            compilation_duration: record.compilation_duration,
            warning_count: record.warning_count,
            error_count: record.error_count,
            fetched_from_cache: record.fetched_from_cache,
            category: None,
            compiled_count: None,
        }
    }
}

/// A countable unit of work attributed to a target
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    pub identifier: String,
    pub build_identifier: String,
    pub target_identifier: String,
    pub title: String,
    pub signature: String,
    pub detail_type: DetailStepType,
    pub architecture: String,
    pub document_url: String,
    pub start_timestamp: f64,
    pub end_timestamp: f64,
    pub duration: f64,
    pub warning_count: u32,
    pub error_count: u32,
    pub fetched_from_cache: bool,
}

impl Step {
    pub fn from_record(
        record: &BuildStepRecord,
        build_identifier: &str,
        target_identifier: &str,
    ) -> Self {
        Self {
            identifier: record.identifier.clone(),
            build_identifier: build_identifier.to_string(),
            target_identifier: target_identifier.to_string(),
            title: record.title.clone(),
            signature: record.signature.clone(),
            detail_type: record.detail_step_type,
            architecture: record.architecture.clone(),
            document_url: record.document_url.clone(),
            start_timestamp: record.start_timestamp,
            end_timestamp: record.end_timestamp,
            duration: record.duration,
            warning_count: record.warning_count,
            error_count: record.error_count,
            fetched_from_cache: record.fetched_from_cache,
        }
    }
}

/// Result of classifying a build, keyed by target identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildCategorisation {
    pub build_category: BuildCategory,
    /// Steps not fetched from cache, across all targets
    pub build_compiled_count: u32,
    pub targets_category: BTreeMap<String, BuildCategory>,
    pub targets_compiled_count: BTreeMap<String, u32>,
}

impl BuildCategorisation {
    /// Copies each target's category and compiled count onto the target
    pub fn annotate(&self, targets: &mut [Target]) {
        for target in targets {
            target.category = self.targets_category.get(&target.identifier).copied();
            target.compiled_count = self.targets_compiled_count.get(&target.identifier).copied();
        }
    }
}
