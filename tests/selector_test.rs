mod common;

use common::ids;
use script_migrator::{compute_plan, MigrationDirection};
use std::collections::BTreeSet;

/// Small fixed universe of catalogs and histories to check plan properties over
fn cases() -> Vec<(Vec<String>, Vec<String>)> {
    vec![
        (ids(&[]), ids(&[])),
        (ids(&["001_a.js"]), ids(&[])),
        (ids(&["001_a.js", "002_b.js", "003_c.js"]), ids(&["001_a.js"])),
        (ids(&["003_c.js", "001_a.js", "002_b.js"]), ids(&["002_b.js"])),
        (
            ids(&["20240101_init.js", "20240315_users.js", "20241201_index.js"]),
            ids(&["20240101_init.js", "20240315_users.js", "20241201_index.js"]),
        ),
        (ids(&["001_a.js", "010_j.js", "002_b.js"]), ids(&["010_j.js"])),
    ]
}

fn expected_apply(catalog: &[String], history: &[String], target: Option<&str>) -> Vec<String> {
    let ran: BTreeSet<&String> = history.iter().collect();
    catalog
        .iter()
        .filter(|c| !ran.contains(c))
        .filter(|c| target.map_or(true, |t| c.as_str() <= t))
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[test]
fn test_apply_is_catalog_minus_history_ascending() {
    for (catalog, history) in cases() {
        let plan = compute_plan(MigrationDirection::Apply, None, &catalog, &history);
        assert_eq!(
            plan.scripts(),
            expected_apply(&catalog, &history, None).as_slice(),
            "catalog {catalog:?}, history {history:?}"
        );
    }
}

#[test]
fn test_apply_with_target_is_bounded() {
    for (catalog, history) in cases() {
        for target in ["001_a.js", "002_b.js", "20240315_users.js", "999.js"] {
            let plan = compute_plan(MigrationDirection::Apply, Some(target), &catalog, &history);
            assert_eq!(
                plan.scripts(),
                expected_apply(&catalog, &history, Some(target)).as_slice(),
                "catalog {catalog:?}, history {history:?}, target {target}"
            );
        }
    }
}

#[test]
fn test_revert_recorded_target_reverts_later_scripts_descending() {
    let history = ids(&["001_a.js", "002_b.js", "003_c.js", "004_d.js"]);
    for target in &history {
        let plan =
            compute_plan(MigrationDirection::Revert, Some(target.as_str()), &[], &history);

        let mut expected: Vec<String> = history.iter().filter(|h| *h > target).cloned().collect();
        expected.reverse();
        assert_eq!(plan.scripts(), expected.as_slice(), "target {target}");
    }
}

#[test]
fn test_revert_unrecorded_target_is_exactly_target() {
    let history = ids(&["001_a.js", "003_c.js"]);
    for target in ["000_zero.js", "002_b.js", "009_i.js"] {
        let plan = compute_plan(MigrationDirection::Revert, Some(target), &[], &history);
        assert_eq!(plan.scripts(), ids(&[target]).as_slice());
    }
}

#[test]
fn test_string_order_is_migration_order() {
    // "10" sorts before "9": the naming convention must pad numbers
    let catalog = ids(&["9_nine.js", "10_ten.js"]);
    let plan = compute_plan(MigrationDirection::Apply, None, &catalog, &[]);
    assert_eq!(plan.scripts(), ids(&["10_ten.js", "9_nine.js"]).as_slice());
}
