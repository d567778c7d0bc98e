use super::types::BuildStepRecord;
use super::{LogParser, ParseError};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

pub const DEFAULT_XCLOGPARSER_BINARY: &str = "xclogparser";

/// A step as it appears in xclogparser's JSON report, children nested
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportStep {
    #[serde(flatten)]
    record: BuildStepRecord,
    #[serde(default)]
    sub_steps: Vec<ReportStep>,
}

/// Runs `xclogparser parse --reporter json` on a build log
#[derive(Debug, Clone)]
pub struct XcLogParserCli {
    binary: PathBuf,
    machine_name: Option<String>,
}

impl XcLogParserCli {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            machine_name: None,
        }
    }

    /// Machine name recorded in the parsed steps
    pub fn with_machine_name(mut self, machine_name: impl Into<String>) -> Self {
        self.machine_name = Some(machine_name.into());
        self
    }

    fn command(&self, log: &Path) -> Command {
        let mut command = Command::new(&self.binary);
        command
            .arg("parse")
            .arg("--file")
            .arg(log)
            .arg("--reporter")
            .arg("json");
        if let Some(machine_name) = &self.machine_name {
            command.arg("--machine_name").arg(machine_name);
        }
        command
    }
}

impl Default for XcLogParserCli {
    fn default() -> Self {
        Self::new(DEFAULT_XCLOGPARSER_BINARY)
    }
}

impl LogParser for XcLogParserCli {
    fn parse(&self, log: &Path) -> Result<Vec<BuildStepRecord>, ParseError> {
        debug!(binary = %self.binary.display(), log = %log.display(), "Running log parser");

        let output = self.command(log).output().map_err(|source| ParseError::Spawn {
            binary: self.binary.display().to_string(),
            source,
        })?;

        if !output.status.success() {
            return Err(ParseError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let json = String::from_utf8_lossy(&output.stdout);
        let steps = parse_json_tree(&json)?;
        if steps.is_empty() {
            return Err(ParseError::Empty(log.display().to_string()));
        }

        info!(steps = steps.len(), "Parsed build log");
        Ok(steps)
    }
}

/// Decodes an xclogparser JSON report and flattens it depth-first
pub fn parse_json_tree(json: &str) -> Result<Vec<BuildStepRecord>, ParseError> {
    let root: ReportStep = serde_json::from_str(json)?;
    Ok(flatten_report(root))
}

/// Parent before children, children in report order
fn flatten_report(root: ReportStep) -> Vec<BuildStepRecord> {
    let mut records = Vec::new();
    let mut stack = vec![root];
    while let Some(step) = stack.pop() {
        records.push(step.record);
        stack.extend(step.sub_steps.into_iter().rev());
    }
    records
}
