//! Output formatting for report, facts and configuration
//!
//! JSON and YAML render the same structure; human output is a short summary
//! for build logs.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::classification::{BuildCategory, Target};
use crate::config::XcdogConfig;
use crate::metrics::{BuildMetrics, SystemInfo, XcodeVersion};
use crate::pipeline::{PipelineOutcome, UploadStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
    Human,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportView<'a> {
    log_path: String,
    metrics: &'a BuildMetrics,
    targets: Vec<TargetView<'a>>,
    dropped_steps: usize,
    upload: UploadView<'a>,
    elapsed_ms: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TargetView<'a> {
    name: &'a str,
    category: Option<BuildCategory>,
    compiled_count: Option<u32>,
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum UploadView<'a> {
    Delivered,
    Failed { error: &'a str },
    Skipped,
}

impl<'a> From<&'a UploadStatus> for UploadView<'a> {
    fn from(status: &'a UploadStatus) -> Self {
        match status {
            UploadStatus::Delivered => UploadView::Delivered,
            UploadStatus::Failed(error) => UploadView::Failed { error },
            UploadStatus::Skipped => UploadView::Skipped,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FactsView<'a> {
    system_info: &'a SystemInfo,
    xcode_version: Option<&'a XcodeVersion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<BTreeMap<String, String>>,
}

fn rule() -> String {
    "\u{2501}".repeat(42)
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_report(&self, outcome: &PipelineOutcome) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&report_view(outcome))
                .context("Failed to serialize report to JSON"),
            OutputFormat::Yaml => serde_yaml::to_string(&report_view(outcome))
                .context("Failed to serialize report to YAML"),
            OutputFormat::Human => Ok(self.format_report_human(outcome)),
        }
    }

    pub fn format_facts(
        &self,
        system_info: &SystemInfo,
        xcode_version: Option<&XcodeVersion>,
        config: Option<&XcdogConfig>,
    ) -> Result<String> {
        let view = FactsView {
            system_info,
            xcode_version,
            config: config.map(|c| c.to_display_map().into_iter().collect()),
        };

        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(&view).context("Failed to serialize facts to JSON")
            }
            OutputFormat::Yaml => {
                serde_yaml::to_string(&view).context("Failed to serialize facts to YAML")
            }
            OutputFormat::Human => Ok(self.format_facts_human(&view)),
        }
    }

    fn format_report_human(&self, outcome: &PipelineOutcome) -> String {
        let metrics = &outcome.metrics;
        let mut output = String::new();

        output.push_str(&format!(
            "\u{2713} {} build\n",
            metrics.build_category()
        ));
        output.push_str(&rule());
        output.push_str("\n\n");

        output.push_str(&format!("Log:           {}\n", outcome.log_path.display()));
        output.push_str(&format!(
            "Build time:    {}ms\n",
            metrics.total_elapsed_build_time_ms()
        ));
        output.push_str(&format!(
            "Compiled:      {} step(s)\n",
            outcome.categorisation.build_compiled_count
        ));
        output.push_str(&format!("CI:            {}\n", metrics.is_ci()));
        if let Some(xcode) = metrics.xcode_version() {
            output.push_str(&format!(
                "Xcode:         {} ({})\n",
                xcode.version, xcode.build_number
            ));
        }
        output.push('\n');

        if !outcome.targets.is_empty() {
            output.push_str("Targets:\n");
            let last = outcome.targets.len() - 1;
            for (i, target) in outcome.targets.iter().enumerate() {
                output.push_str(&format_target_line(target, i == last));
            }
            output.push('\n');
        }

        if outcome.dropped_steps > 0 {
            output.push_str(&format!(
                "\u{26A0} {} step(s) could not be attributed to a target\n\n",
                outcome.dropped_steps
            ));
        }

        output.push_str(&match &outcome.upload {
            UploadStatus::Delivered => "Upload: delivered\n".to_string(),
            UploadStatus::Failed(error) => format!("Upload: failed ({})\n", error),
            UploadStatus::Skipped => "Upload: skipped (dry run)\n".to_string(),
        });

        output
    }

    fn format_facts_human(&self, view: &FactsView<'_>) -> String {
        let info = view.system_info;
        let mut output = String::new();

        output.push_str("Host Facts\n");
        output.push_str(&rule());
        output.push_str("\n\n");

        output.push_str(&format!(
            "OS:            {} {} ({})\n",
            info.host_os, info.host_os_version, info.host_os_family
        ));
        output.push_str(&format!(
            "Model:         {} ({}){}\n",
            info.host_model,
            info.host_architecture,
            if info.is_virtual { " [virtual]" } else { "" }
        ));
        output.push_str(&format!(
            "CPU:           {} x {} @ {:.2} GHz\n",
            info.cpu_count, info.cpu_model, info.cpu_speed_ghz
        ));
        output.push_str(&format!(
            "Memory:        {:.0} / {:.0} MB free\n",
            info.memory_free_mb, info.memory_total_mb
        ));
        output.push_str(&format!(
            "Swap:          {:.0} / {:.0} MB free\n",
            info.swap_free_mb, info.swap_total_mb
        ));
        output.push_str(&format!("Timezone:      {}\n", info.timezone));
        output.push_str(&format!("Uptime:        {}s\n", info.uptime_seconds));

        match view.xcode_version {
            Some(xcode) => output.push_str(&format!(
                "Xcode:         {} ({})\n",
                xcode.version, xcode.build_number
            )),
            None => output.push_str("Xcode:         (not set in environment)\n"),
        }

        if let Some(config) = &view.config {
            output.push_str("\nConfiguration:\n");
            for (key, value) in config {
                output.push_str(&format!("  {}: {}\n", key, value));
            }
        }

        output
    }
}

fn report_view(outcome: &PipelineOutcome) -> ReportView<'_> {
    ReportView {
        log_path: outcome.log_path.display().to_string(),
        metrics: &outcome.metrics,
        targets: outcome
            .targets
            .iter()
            .map(|target| TargetView {
                name: &target.name,
                category: target.category,
                compiled_count: target.compiled_count,
            })
            .collect(),
        dropped_steps: outcome.dropped_steps,
        upload: (&outcome.upload).into(),
        elapsed_ms: outcome.elapsed.as_millis() as u64,
    }
}

fn format_target_line(target: &Target, is_last: bool) -> String {
    let connector = if is_last { "\u{2514}" } else { "\u{251C}" };
    let category = target
        .category
        .map(|c| c.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    format!(
        "{}\u{2500} {:<24} {:<12} {} compiled\n",
        connector,
        target.name,
        category,
        target.compiled_count.unwrap_or(0)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::{classify, partition_steps};
    use crate::metrics::assemble;
    use crate::metrics::assembler::tests::system_info;
    use crate::parser::{BuildStepRecord, DetailStepType, StepKind};
    use std::path::PathBuf;
    use std::time::Duration;

    fn outcome(upload: UploadStatus) -> PipelineOutcome {
        let records = vec![
            BuildStepRecord::new("build", "", StepKind::Main).with_duration(4.2),
            BuildStepRecord::new("t1", "build", StepKind::Target).with_title("Build target App"),
            BuildStepRecord::new("s1", "t1", StepKind::Detail)
                .with_detail_type(DetailStepType::SwiftCompilation)
                .cached(true),
            BuildStepRecord::new("s2", "t1", StepKind::Detail)
                .with_detail_type(DetailStepType::SwiftCompilation),
        ];
        let partitioned = partition_steps(&records).unwrap();
        let categorisation = classify(&partitioned.targets, &partitioned.steps);
        let mut targets = partitioned.targets;
        categorisation.annotate(&mut targets);
        let metrics = assemble(
            &categorisation,
            partitioned.build_duration_secs,
            true,
            system_info(),
            Some(XcodeVersion {
                build_number: "15E204a".to_string(),
                version: "1530".to_string(),
            }),
        );

        PipelineOutcome {
            log_path: PathBuf::from("/dd/Logs/Build/A.xcactivitylog"),
            metrics,
            categorisation,
            targets,
            dropped_steps: 0,
            upload,
            elapsed: Duration::from_millis(1500),
        }
    }

    #[test]
    fn test_report_json() {
        let formatter = OutputFormatter::new(OutputFormat::Json);
        let output = formatter.format_report(&outcome(UploadStatus::Delivered)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["metrics"]["buildCategory"], "incremental");
        assert_eq!(value["metrics"]["totalElapsedBuildTimeMs"], 4200);
        assert_eq!(value["targets"][0]["name"], "App");
        assert_eq!(value["targets"][0]["compiledCount"], 1);
        assert_eq!(value["upload"]["status"], "delivered");
        assert_eq!(value["elapsedMs"], 1500);
    }

    #[test]
    fn test_report_json_failed_upload() {
        let formatter = OutputFormatter::new(OutputFormat::Json);
        let output = formatter
            .format_report(&outcome(UploadStatus::Failed("timeout".to_string())))
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["upload"]["status"], "failed");
        assert_eq!(value["upload"]["error"], "timeout");
    }

    #[test]
    fn test_report_yaml() {
        let formatter = OutputFormatter::new(OutputFormat::Yaml);
        let output = formatter.format_report(&outcome(UploadStatus::Skipped)).unwrap();

        assert!(output.contains("buildCategory: incremental"));
        assert!(output.contains("status: skipped"));
    }

    #[test]
    fn test_report_human() {
        let formatter = OutputFormatter::new(OutputFormat::Human);
        let output = formatter.format_report(&outcome(UploadStatus::Skipped)).unwrap();

        assert!(output.contains("incremental build"));
        assert!(output.contains("Build time:    4200ms"));
        assert!(output.contains("App"));
        assert!(output.contains("Xcode:         1530 (15E204a)"));
        assert!(output.contains("Upload: skipped (dry run)"));
    }

    #[test]
    fn test_facts_json_without_xcode() {
        let formatter = OutputFormatter::new(OutputFormat::Json);
        let output = formatter.format_facts(&system_info(), None, None).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["systemInfo"]["hostOsFamily"], "Darwin");
        assert!(value["xcodeVersion"].is_null());
        assert!(value.get("config").is_none());
    }

    #[test]
    fn test_facts_human_with_config() {
        let config = XcdogConfig {
            timeout_secs: 10,
            intake_url: "https://example.com/logs".to_string(),
            request_timeout_secs: 30,
            xclogparser_binary: "xclogparser".to_string(),
            log_level: "info".to_string(),
            log_json: false,
        };
        let formatter = OutputFormatter::new(OutputFormat::Human);
        let output = formatter
            .format_facts(&system_info(), None, Some(&config))
            .unwrap();

        assert!(output.contains("Host Facts"));
        assert!(output.contains("(not set in environment)"));
        assert!(output.contains("intake_url: https://example.com/logs"));
    }
}
