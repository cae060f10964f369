use pretty_assertions::assert_eq;
use seikyu_automation::{resolve_rows, BLOCK_RUN_DATE, BLOCK_RUN_EOM};
use seikyu_model::BlockRow;

fn row(run_date: &str, pairs: &[(&str, &str)]) -> BlockRow {
    BlockRow {
        run_date: run_date.to_string(),
        values: pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    }
}

fn keys(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn grid_resolution_matches_the_editor_preview() {
    // A three-month grid the way the schedule editor builds one: a seed row,
    // then rows that copy and derive from it.
    let rows = vec![
        row(
            "2026-01-31",
            &[
                ("BLOCK_1", "コンサルティング"),
                ("BLOCK_2", "{{MONTH_LABEL}}"),
                ("BLOCK_3", "=CONCAT(BLOCK_1,\" \",BLOCK_2)"),
            ],
        ),
        row(
            "2026-02-28",
            &[
                ("BLOCK_1", "=COPYUP()"),
                ("BLOCK_2", "{{MONTH_LABEL}}"),
                ("BLOCK_3", "=CONCAT(BLOCK_1,\" \",BLOCK_2)"),
            ],
        ),
        row(
            "2026-03-31",
            &[
                ("BLOCK_1", "=COPYUP()"),
                ("BLOCK_2", "{{MONTH_LABEL}}"),
                ("BLOCK_3", "=CONCAT(BLOCK_1,\" \",BLOCK_2)"),
            ],
        ),
    ];
    let block_keys = keys(&["BLOCK_1", "BLOCK_2", "BLOCK_3"]);

    let resolved = resolve_rows(&block_keys, &rows);

    assert_eq!(resolved[0].values["BLOCK_3"], "コンサルティング 2026年1月分");
    assert_eq!(resolved[1].values["BLOCK_1"], "コンサルティング");
    assert_eq!(resolved[1].values["BLOCK_3"], "コンサルティング 2026年2月分");
    assert_eq!(resolved[2].values["BLOCK_3"], "コンサルティング 2026年3月分");
}

#[test]
fn pseudo_blocks_track_each_row() {
    let rows = vec![row("2026-01-31", &[]), row("2026-02-28", &[])];
    let resolved = resolve_rows(&keys(&["BLOCK_1"]), &rows);

    assert_eq!(resolved[0].values[BLOCK_RUN_DATE], "2026-01-31");
    assert_eq!(resolved[0].values[BLOCK_RUN_EOM], "2026-01-31");
    assert_eq!(resolved[1].values[BLOCK_RUN_DATE], "2026-02-28");
    assert_eq!(resolved[1].values[BLOCK_RUN_EOM], "2026-02-28");
}

#[test]
fn resolving_twice_yields_identical_grids() {
    let rows = vec![
        row("2026-04-01", &[("BLOCK_1", "=TEXT(\"{{MM}}\")")]),
        row("2026-05-01", &[("BLOCK_1", "=COPYUP()")]),
    ];
    let block_keys = keys(&["BLOCK_1"]);

    let first = resolve_rows(&block_keys, &rows);
    let second = resolve_rows(&block_keys, &rows);
    assert_eq!(first, second);
}

#[test]
fn copyup_of_an_empty_previous_value_stays_empty() {
    let rows = vec![
        row("2026-04-01", &[]),
        row("2026-05-01", &[("BLOCK_1", "=COPYUP()")]),
    ];
    let resolved = resolve_rows(&keys(&["BLOCK_1"]), &rows);
    assert_eq!(resolved[1].values["BLOCK_1"], "");
}

#[test]
fn empty_grid_resolves_to_no_rows() {
    let resolved = resolve_rows(&keys(&["BLOCK_1"]), &[]);
    assert_eq!(resolved, vec![]);
}
