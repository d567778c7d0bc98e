use super::model::{Step, Target};
use crate::parser::{BuildStepRecord, DetailStepType, StepKind};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PartitionError {
    #[error("Build log contains no root build step")]
    MissingRootStep,
}

/// Targets and attributable steps of one build
#[derive(Debug, Clone)]
pub struct PartitionedBuild {
    pub build_identifier: String,
    /// Duration of the root build step, in seconds
    pub build_duration_secs: f64,
    pub targets: Vec<Target>,
    pub steps: Vec<Step>,
    /// Detail steps whose target could not be resolved
    pub dropped_steps: usize,
}

/// Whether a detail step represents compile work worth counting
fn is_countable(detail_type: DetailStepType) -> bool {
    !matches!(
        detail_type,
        DetailStepType::SwiftAggregatedCompilation
            | DetailStepType::Other
            | DetailStepType::ScriptExecution
            | DetailStepType::CopySwiftLibs
    )
}

/// Splits a flattened step list into targets and detail steps.
///
/// A detail step belongs to its parent when the parent is a target. Swift
/// compilations may instead hang off a `swiftAggregatedCompilation` node, in
/// which case the node's parent is the target. Steps resolving to neither are
/// dropped.
pub fn partition_steps(records: &[BuildStepRecord]) -> Result<PartitionedBuild, PartitionError> {
    let root = records
        .iter()
        .find(|record| record.kind == StepKind::Main)
        .ok_or(PartitionError::MissingRootStep)?;
    let build_identifier = root.identifier.as_str();

    let targets: Vec<Target> = records
        .iter()
        .filter(|record| record.kind == StepKind::Target)
        .map(Target::from_record)
        .collect();
    let target_ids: HashSet<&str> = targets.iter().map(|t| t.identifier.as_str()).collect();

    let aggregation_parents: HashMap<&str, &str> = records
        .iter()
        .filter(|record| {
            record.kind == StepKind::Detail && record.detail_step_type.is_aggregation()
        })
        .map(|record| (record.identifier.as_str(), record.parent_identifier.as_str()))
        .collect();

    let resolve_target = |parent: &str| -> Option<String> {
        if target_ids.contains(parent) {
            return Some(parent.to_string());
        }
        aggregation_parents
            .get(parent)
            .filter(|target| target_ids.contains(**target))
            .map(|target| target.to_string())
    };

    let mut steps = Vec::new();
    let mut dropped_steps = 0;
    for record in records
        .iter()
        .filter(|record| record.kind == StepKind::Detail && is_countable(record.detail_step_type))
    {
        match resolve_target(&record.parent_identifier) {
            Some(target_identifier) => {
                steps.push(Step::from_record(record, build_identifier, &target_identifier))
            }
            None => {
                trace!(
                    step = %record.identifier,
                    parent = %record.parent_identifier,
                    "Dropping step without a resolvable target"
                );
                dropped_steps += 1;
            }
        }
    }

    debug!(
        targets = targets.len(),
        steps = steps.len(),
        dropped_steps,
        "Partitioned build steps"
    );

    Ok(PartitionedBuild {
        build_identifier: build_identifier.to_string(),
        build_duration_secs: root.duration,
        targets,
        steps,
        dropped_steps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(id: &str, parent: &str, detail_type: DetailStepType) -> BuildStepRecord {
        BuildStepRecord::new(id, parent, StepKind::Detail).with_detail_type(detail_type)
    }

    fn build() -> Vec<BuildStepRecord> {
        vec![
            BuildStepRecord::new("b", "", StepKind::Main).with_duration(12.75),
            BuildStepRecord::new("A", "b", StepKind::Target).with_title("Build target A"),
            detail("agg", "A", DetailStepType::SwiftAggregatedCompilation),
            detail("swift1", "agg", DetailStepType::SwiftCompilation),
            detail("c1", "A", DetailStepType::CCompilation),
            detail("orphan", "unknown", DetailStepType::SwiftCompilation),
        ]
    }

    #[test]
    fn test_root_and_targets() {
        let partitioned = partition_steps(&build()).unwrap();

        assert_eq!(partitioned.build_identifier, "b");
        assert_eq!(partitioned.build_duration_secs, 12.75);
        assert_eq!(partitioned.targets.len(), 1);
        assert_eq!(partitioned.targets[0].name, "A");
    }

    #[test]
    fn test_step_under_aggregation_node_resolves_to_target() {
        let partitioned = partition_steps(&build()).unwrap();

        let swift = partitioned
            .steps
            .iter()
            .find(|step| step.identifier == "swift1")
            .unwrap();
        assert_eq!(swift.target_identifier, "A");
        assert_eq!(swift.build_identifier, "b");
    }

    #[test]
    fn test_unresolvable_step_is_dropped() {
        let partitioned = partition_steps(&build()).unwrap();

        assert!(partitioned.steps.iter().all(|step| step.identifier != "orphan"));
        assert_eq!(partitioned.dropped_steps, 1);
    }

    #[test]
    fn test_aggregation_nodes_are_not_steps() {
        let partitioned = partition_steps(&build()).unwrap();
        let ids: Vec<_> = partitioned.steps.iter().map(|s| s.identifier.as_str()).collect();

        assert_eq!(ids, vec!["swift1", "c1"]);
    }

    #[test]
    fn test_non_compile_steps_are_excluded() {
        let mut records = build();
        records.push(detail("script", "A", DetailStepType::ScriptExecution));
        records.push(detail("libs", "A", DetailStepType::CopySwiftLibs));
        records.push(detail("misc", "A", DetailStepType::Other));
        records.push(detail("link", "A", DetailStepType::Linker));

        let partitioned = partition_steps(&records).unwrap();
        let ids: Vec<_> = partitioned.steps.iter().map(|s| s.identifier.as_str()).collect();

        assert_eq!(ids, vec!["swift1", "c1", "link"]);
        assert_eq!(partitioned.dropped_steps, 1);
    }

    #[test]
    fn test_aggregation_node_without_target_parent_drops_children() {
        let records = vec![
            BuildStepRecord::new("b", "", StepKind::Main),
            BuildStepRecord::new("A", "b", StepKind::Target),
            detail("agg", "elsewhere", DetailStepType::SwiftAggregatedCompilation),
            detail("swift1", "agg", DetailStepType::SwiftCompilation),
        ];

        let partitioned = partition_steps(&records).unwrap();
        assert!(partitioned.steps.is_empty());
        assert_eq!(partitioned.dropped_steps, 1);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let records = vec![BuildStepRecord::new("A", "b", StepKind::Target)];
        assert_eq!(
            partition_steps(&records).unwrap_err(),
            PartitionError::MissingRootStep
        );
    }
}
