use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A literal find/replace rule applied to generated invoice text.
///
/// `pattern` is matched as a plain substring (all occurrences, never a regex);
/// `template` may contain `{{TOKEN}}` placeholders resolved against the run
/// date's tokens at application time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default)]
    pub pattern: String,
    #[serde(default)]
    pub template: String,
}

/// Block values configured for one scheduled run date.
///
/// `values` maps block keys (`BLOCK_1`, ...) to raw cell text: plain strings,
/// `{{TOKEN}}` templates, or `=`-prefixed formulas. Resolution order is the
/// schedule's `block_keys` order, not the map order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockRow {
    /// Run date in `YYYY-MM-DD` form.
    #[serde(default)]
    pub run_date: String,
    #[serde(default)]
    pub values: BTreeMap<String, String>,
}

/// Per-field templates stamped onto generated drafts.
///
/// `None` means "fall back to the template draft's own field"; an empty string
/// is an explicit (blank) template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldTemplates {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note_template: Option<String>,
    /// Indexed by line-item position in the template draft.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub item_name_templates: Vec<String>,
}

/// Outcome of the most recent scheduled run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Ok,
    Error,
}

/// A recurring-invoice schedule document as persisted by the host application.
///
/// Only `name` is required on the wire; everything else defaults so partially
/// filled schedules (fresh from the editor) still deserialize.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDoc {
    pub name: String,
    /// Draft used as the stamping template for every generated invoice.
    #[serde(default)]
    pub template_draft_id: String,
    /// Next run date in `YYYY-MM-DD` form.
    #[serde(default)]
    pub next_run_date: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub auto_send: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_email: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<Rule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_templates: Option<FieldTemplates>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub block_rows: Vec<BlockRow>,
    /// Block resolution order; also the editor's column order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub block_keys: Vec<String>,
    /// Epoch milliseconds.
    #[serde(default)]
    pub created_at: i64,
    /// Epoch milliseconds.
    #[serde(default)]
    pub updated_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run_status: Option<RunStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_draft_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl ScheduleDoc {
    /// The configured block row for `run_date`, if any.
    pub fn block_row_for(&self, run_date: &str) -> Option<&BlockRow> {
        self.block_rows.iter().find(|r| r.run_date == run_date)
    }

    /// Whether the cron sweep should run this schedule on `today` (`YYYY-MM-DD`).
    ///
    /// `YYYY-MM-DD` strings order lexicographically the same as calendar
    /// dates, so this is the same comparison the backing store's range query
    /// performs. A schedule with no next run date is never due.
    pub fn is_due(&self, today: &str) -> bool {
        self.active && !self.next_run_date.is_empty() && self.next_run_date.as_str() <= today
    }
}
