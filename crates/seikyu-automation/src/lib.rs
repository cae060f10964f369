#![forbid(unsafe_code)]

//! Template, rule, and cell-formula engine for recurring invoice schedules.
//!
//! Given a run date, the engine derives a set of date tokens (`{{YYYY}}`,
//! `{{PREV_MONTH_LABEL}}`, ...), substitutes them into free-form templates,
//! evaluates the small cell-formula language used by schedule block grids
//! (`=CONCAT(...)`, `=TEXT(...)`, `=COPYUP()`, bare token references), and
//! resolves each row's block values with previous-row carry-over.
//!
//! Everything here follows one contract: malformed input never fails the run.
//! Unparsable dates fall back to today, unknown tokens render empty, unknown
//! references come back literally, and malformed quoting degrades instead of
//! erroring. The output feeds user-facing previews and generated invoices,
//! where a wrong-but-present string beats a hard failure.
//!
//! The [`run`] module layers pure schedule-run stamping on top: it resolves
//! the block grid for one run date and rewrites a template draft's fields
//! (subject, notes, line items, due date) through blocks-then-rules. The
//! [`series`] module holds the editor-side autofill transforms that seed
//! later rows from earlier ones.

pub mod cell_formula;
pub mod date_tokens;
pub mod rows;
pub mod run;
pub mod series;
pub mod template;

pub use cell_formula::{evaluate_cell_expression, EvalContext};
pub use date_tokens::{
    build_date_tokens, end_of_month_ymd, next_month_ymd, today_ymd_jst, DateTokens,
};
pub use rows::{
    inject_run_blocks, resolve_block_row_values, resolve_rows, ResolvedRow, BLOCK_RUN_DATE,
    BLOCK_RUN_EOM,
};
pub use run::{expand_block_placeholders, stamp_draft, ymd_to_ja, RunContext, RunError};
pub use series::{increment_first_number, series_value_by_run_date};
pub use template::{apply_text_rules, render_rule_template};
