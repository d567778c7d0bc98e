use super::model::{BuildCategorisation, BuildCategory, Step, Target};
use std::collections::BTreeMap;
use tracing::debug;

/// Classifies every target and the overall build.
///
/// A target with no freshly compiled steps is a no-op, one where every step
/// was compiled is clean, anything in between is incremental. Small targets
/// with nothing to compile (script phases, resource bundles) show up as
/// no-ops, so the build counts as clean once more than half of its targets
/// are clean rather than requiring all of them.
pub fn classify(targets: &[Target], steps: &[Step]) -> BuildCategorisation {
    let mut targets_compiled_count: BTreeMap<String, u32> = targets
        .iter()
        .map(|target| (target.identifier.clone(), 0))
        .collect();
    let mut targets_step_count: BTreeMap<&str, u32> = BTreeMap::new();

    for step in steps {
        let Some(compiled) = targets_compiled_count.get_mut(&step.target_identifier) else {
            continue;
        };
        *targets_step_count
            .entry(step.target_identifier.as_str())
            .or_default() += 1;
        if !step.fetched_from_cache {
            *compiled += 1;
        }
    }

    let build_compiled_count = targets_compiled_count.values().sum();

    let targets_category: BTreeMap<String, BuildCategory> = targets_compiled_count
        .iter()
        .map(|(target, &compiled)| {
            let total = targets_step_count
                .get(target.as_str())
                .copied()
                .unwrap_or(0);
            let category = match compiled {
                0 => BuildCategory::Noop,
                n if n == total => BuildCategory::Clean,
                _ => BuildCategory::Incremental,
            };
            (target.clone(), category)
        })
        .collect();

    let build_category = overall_category(&targets_category, targets.len());

    debug!(
        %build_category,
        build_compiled_count,
        targets = targets.len(),
        "Classified build"
    );

    BuildCategorisation {
        build_category,
        build_compiled_count,
        targets_category,
        targets_compiled_count,
    }
}

fn overall_category(
    targets_category: &BTreeMap<String, BuildCategory>,
    target_count: usize,
) -> BuildCategory {
    let clean_targets = targets_category
        .values()
        .filter(|category| **category == BuildCategory::Clean)
        .count();
    let all_noop = !targets_category.is_empty()
        && targets_category
            .values()
            .all(|category| *category == BuildCategory::Noop);

    // Integer division: 1 clean target out of 3 is not a majority, 2 out of 3 is
    if clean_targets > target_count / 2 {
        BuildCategory::Clean
    } else if all_noop {
        BuildCategory::Noop
    } else {
        BuildCategory::Incremental
    }
}
