use super::model::{BuildMetrics, SystemInfo, XcodeVersion};
use crate::classification::BuildCategorisation;

/// Combines classification output with host and Xcode facts.
///
/// The build duration is converted to whole milliseconds, truncating.
pub fn assemble(
    categorisation: &BuildCategorisation,
    build_duration_secs: f64,
    is_ci: bool,
    system_info: SystemInfo,
    xcode_version: Option<XcodeVersion>,
) -> BuildMetrics {
    BuildMetrics::new(
        categorisation.build_category,
        is_ci,
        (build_duration_secs * 1000.0) as i64,
        system_info,
        xcode_version,
    )
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::classification::BuildCategory;
    use std::collections::BTreeMap;

    pub(crate) fn system_info() -> SystemInfo {
        SystemInfo {
            cpu_count: 10,
            cpu_model: "Apple M1 Pro".to_string(),
            cpu_speed_ghz: 3.2,
            host_architecture: "arm64".to_string(),
            host_model: "MacBookPro18,3".to_string(),
            host_os: "macOS".to_string(),
            host_os_family: "Darwin".to_string(),
            host_os_version: "14.4".to_string(),
            is_virtual: false,
            memory_free_mb: 2048.0,
            memory_total_mb: 32768.0,
            swap_free_mb: 1024.0,
            swap_total_mb: 2048.0,
            timezone: "+01:00".to_string(),
            uptime_seconds: 3600,
        }
    }

    fn categorisation(category: BuildCategory) -> BuildCategorisation {
        BuildCategorisation {
            build_category: category,
            build_compiled_count: 0,
            targets_category: BTreeMap::new(),
            targets_compiled_count: BTreeMap::new(),
        }
    }

    #[test]
    fn test_duration_is_truncated_to_milliseconds() {
        let metrics = assemble(
            &categorisation(BuildCategory::Clean),
            12.3456789,
            true,
            system_info(),
            None,
        );

        assert_eq!(metrics.total_elapsed_build_time_ms(), 12345);
        assert_eq!(metrics.build_category(), BuildCategory::Clean);
        assert!(metrics.is_ci());
        assert!(metrics.xcode_version().is_none());
    }

    #[test]
    fn test_wire_format_keys() {
        let metrics = assemble(
            &categorisation(BuildCategory::Noop),
            1.5,
            false,
            system_info(),
            Some(XcodeVersion {
                build_number: "15E204a".to_string(),
                version: "1530".to_string(),
            }),
        );

        let json = serde_json::to_value(&metrics).unwrap();
        assert_eq!(json["buildCategory"], "noop");
        assert_eq!(json["isCI"], false);
        assert_eq!(json["totalElapsedBuildTimeMs"], 1500);
        assert_eq!(json["systemInfo"]["cpuCount"], 10);
        assert_eq!(json["systemInfo"]["hostOsVersion"], "14.4");
        assert_eq!(json["systemInfo"]["uptimeSeconds"], 3600);
        assert_eq!(json["xcodeVersion"]["buildNumber"], "15E204a");
    }

    #[test]
    fn test_absent_xcode_version_is_omitted() {
        let metrics = assemble(
            &categorisation(BuildCategory::Incremental),
            0.0,
            false,
            system_info(),
            None,
        );

        let json = serde_json::to_value(&metrics).unwrap();
        assert!(json.get("xcodeVersion").is_none());
    }
}
