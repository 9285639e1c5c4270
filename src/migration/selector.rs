//! Selection of the scripts one invocation must run.
//!
//! Identifiers are ordered by plain string comparison. That order is the
//! migration order, so script names need a sortable prefix such as a
//! timestamp or a zero-padded sequence number.

use super::types::{ExecutionPlan, MigrationDirection};
use std::collections::HashSet;
use tracing::debug;

/// Compute the ordered plan.
///
/// `target` must already be normalized (suffix appended). `catalog` is only
/// consulted for [`MigrationDirection::Apply`]. `history` may be given in any
/// order and unbounded; the bound implied by `target` is applied here.
///
/// Apply: catalog scripts `<= target` that are not in `history`, ascending.
///
/// Revert: recorded scripts `> target`, descending. When `target` was never
/// recorded the plan is exactly `[target]`, so a script that failed half way
/// through its apply can still be rolled back on its own.
pub fn compute_plan(
    direction: MigrationDirection,
    target: Option<&str>,
    catalog: &[String],
    history: &[String],
) -> ExecutionPlan {
    let scripts = match direction {
        MigrationDirection::Apply => select_apply(target, catalog, history),
        MigrationDirection::Revert => select_revert(target, history),
    };

    debug!(%direction, target = target.unwrap_or(""), ?scripts, "Found scripts to run");
    ExecutionPlan::new(direction, scripts)
}

fn select_apply(target: Option<&str>, catalog: &[String], history: &[String]) -> Vec<String> {
    let already_ran: HashSet<&str> = history.iter().map(String::as_str).collect();

    let mut scripts: Vec<String> = catalog
        .iter()
        .filter(|name| target.map_or(true, |t| name.as_str() <= t))
        .filter(|name| !already_ran.contains(name.as_str()))
        .cloned()
        .collect();

    scripts.sort();
    scripts.dedup();
    scripts
}

fn select_revert(target: Option<&str>, history: &[String]) -> Vec<String> {
    let mut ran: Vec<&String> = history
        .iter()
        .filter(|name| target.map_or(true, |t| name.as_str() >= t))
        .collect();
    ran.sort_by(|a, b| b.cmp(a));
    ran.dedup();

    match target {
        Some(t) if !ran.iter().any(|name| name.as_str() == t) => {
            debug!(target = t, "Target never ran, returning it as a standalone rollback");
            vec![t.to_string()]
        }
        // The target itself stays applied; it is the last entry in descending order
        Some(t) => ran
            .into_iter()
            .filter(|name| name.as_str() != t)
            .cloned()
            .collect(),
        None => ran.into_iter().cloned().collect(),
    }
}
