use crate::classification::BuildCategory;
use serde::{Deserialize, Serialize};

/// Facts about the machine that ran the build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    pub cpu_count: usize,
    pub cpu_model: String,
    pub cpu_speed_ghz: f32,
    pub host_architecture: String,
    pub host_model: String,
    pub host_os: String,
    pub host_os_family: String,
    pub host_os_version: String,
    pub is_virtual: bool,
    pub memory_free_mb: f64,
    pub memory_total_mb: f64,
    pub swap_free_mb: f64,
    pub swap_total_mb: f64,
    pub timezone: String,
    pub uptime_seconds: u64,
}

/// Xcode version that produced the build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XcodeVersion {
    pub build_number: String,
    pub version: String,
}

/// Metrics for one build. Built once by [`super::assemble`], read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildMetrics {
    #[serde(rename = "buildCategory")]
    build_category: BuildCategory,
    #[serde(rename = "isCI")]
    is_ci: bool,
    #[serde(rename = "totalElapsedBuildTimeMs")]
    total_elapsed_build_time_ms: i64,
    #[serde(rename = "systemInfo")]
    system_info: SystemInfo,
    #[serde(rename = "xcodeVersion", skip_serializing_if = "Option::is_none")]
    xcode_version: Option<XcodeVersion>,
}

impl BuildMetrics {
    pub(super) fn new(
        build_category: BuildCategory,
        is_ci: bool,
        total_elapsed_build_time_ms: i64,
        system_info: SystemInfo,
        xcode_version: Option<XcodeVersion>,
    ) -> Self {
        Self {
            build_category,
            is_ci,
            total_elapsed_build_time_ms,
            system_info,
            xcode_version,
        }
    }

    pub fn build_category(&self) -> BuildCategory {
        self.build_category
    }

    pub fn is_ci(&self) -> bool {
        self.is_ci
    }

    pub fn total_elapsed_build_time_ms(&self) -> i64 {
        self.total_elapsed_build_time_ms
    }

    pub fn system_info(&self) -> &SystemInfo {
        &self.system_info
    }

    pub fn xcode_version(&self) -> Option<&XcodeVersion> {
        self.xcode_version.as_ref()
    }
}
