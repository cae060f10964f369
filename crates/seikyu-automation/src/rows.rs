use std::collections::BTreeMap;

use serde::Serialize;

use seikyu_model::BlockRow;

use crate::cell_formula::{evaluate_cell_expression, EvalContext};
use crate::date_tokens::{build_date_tokens, end_of_month_ymd};

/// Pseudo-block carrying the row's own run date (`YYYY-MM-DD`).
pub const BLOCK_RUN_DATE: &str = "BLOCK_RUN_DATE";

/// Pseudo-block carrying the last calendar day of the run date's month.
pub const BLOCK_RUN_EOM: &str = "BLOCK_RUN_EOM";

/// One row of the block grid after resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedRow {
    pub run_date: String,
    pub values: BTreeMap<String, String>,
}

/// Resolve one row's block values.
///
/// Keys are evaluated in `block_keys` order; each cell sees the keys resolved
/// before it (same row) plus the previous row's full map. A cell that is
/// exactly `=COPYUP()` and evaluated to empty is overridden with the previous
/// row's value for the same key; this is the one place "copy from above" is
/// materialized. Absent or empty cells resolve to the empty string.
pub fn resolve_block_row_values(
    run_date: &str,
    block_keys: &[String],
    row_values: &BTreeMap<String, String>,
    prev_values: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let tokens = build_date_tokens(run_date);
    let mut resolved = BTreeMap::new();
    for key in block_keys {
        let raw = row_values.get(key).map(String::as_str).unwrap_or("");
        if raw.is_empty() {
            resolved.insert(key.clone(), String::new());
            continue;
        }
        let mut value = {
            let ctx = EvalContext {
                tokens: &tokens,
                current_values: &resolved,
                prev_values,
            };
            evaluate_cell_expression(raw, &ctx)
        };
        if value.is_empty() && raw.trim().eq_ignore_ascii_case("=COPYUP()") {
            value = prev_values.get(key).cloned().unwrap_or_default();
        }
        resolved.insert(key.clone(), value);
    }
    resolved
}

/// Resolve an ordered sequence of rows.
///
/// This is a left fold: each row's resolved map becomes the next row's
/// `prev_values`, which is what gives `=COPYUP()` and previous-row references
/// their meaning. Rows must therefore be resolved sequentially, in order.
///
/// After a row resolves, [`BLOCK_RUN_DATE`] and [`BLOCK_RUN_EOM`] are
/// injected, so a row's own cells cannot observe them but the next row can
/// (through `prev_values`), and consumers of the returned maps always can.
pub fn resolve_rows(block_keys: &[String], rows: &[BlockRow]) -> Vec<ResolvedRow> {
    let mut prev = BTreeMap::new();
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let mut values = resolve_block_row_values(&row.run_date, block_keys, &row.values, &prev);
        inject_run_blocks(&mut values, &row.run_date);
        prev = values.clone();
        out.push(ResolvedRow {
            run_date: row.run_date.clone(),
            values,
        });
    }
    out
}

/// Add the run-date pseudo-blocks to a resolved map.
pub fn inject_run_blocks(values: &mut BTreeMap<String, String>, run_date: &str) {
    values.insert(BLOCK_RUN_DATE.to_string(), run_date.to_string());
    values.insert(BLOCK_RUN_EOM.to_string(), end_of_month_ymd(run_date));
}
