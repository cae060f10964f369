use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use seikyu_model::{
    calculate_totals, DraftItem, InvoiceDraft, ScheduleDoc, MAX_BANK_ACCOUNTS, MAX_DRAFT_ITEMS,
};

use crate::rows::{inject_run_blocks, resolve_rows};
use crate::template::apply_text_rules;

/// Why a schedule run could not produce a draft.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    #[error("schedule is not active")]
    Inactive,
    #[error("template draft mismatch: schedule references `{expected}`, got `{got}`")]
    TemplateMismatch { expected: String, got: String },
}

/// Host-supplied identifiers for one run.
#[derive(Debug, Clone, Copy)]
pub struct RunContext<'a> {
    pub schedule_id: &'a str,
    pub template_draft_id: &'a str,
    /// `YYYY-MM-DD`; becomes the stamped draft's issue date.
    pub run_date: &'a str,
}

fn block_re() -> &'static Regex {
    static BLOCK_RE: OnceLock<Regex> = OnceLock::new();
    BLOCK_RE.get_or_init(|| Regex::new(r"\{\{(BLOCK_[A-Z0-9_]+)\}\}").expect("valid regex"))
}

/// Substitute `{{BLOCK_*}}` placeholders from a resolved row.
///
/// Unknown blocks render as the empty string. The alphabet covers numbered
/// blocks and the run pseudo-blocks alike.
pub fn expand_block_placeholders(text: &str, values: &BTreeMap<String, String>) -> String {
    block_re()
        .replace_all(text, |caps: &regex::Captures<'_>| {
            values.get(&caps[1]).cloned().unwrap_or_default()
        })
        .into_owned()
}

/// Render `YYYY-MM-DD` as `YYYY年MM月DD日`, keeping the digit groups verbatim.
///
/// Strings that are not three dash-separated parts come back unchanged; empty
/// input stays empty. Hosts use this for mail bodies and PDF labels.
pub fn ymd_to_ja(ymd: &str) -> String {
    if ymd.is_empty() {
        return String::new();
    }
    let mut parts = ymd.splitn(3, '-');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(y), Some(m), Some(d)) if !y.is_empty() && !m.is_empty() && !d.is_empty() => {
            format!("{y}年{m}月{d}日")
        }
        _ => ymd.to_string(),
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Stamp a new invoice draft from a schedule and its template draft.
///
/// The block grid is resolved with the full row fold (so `=COPYUP()` chains
/// behave exactly as the editor preview shows them), then every templated
/// field goes through block expansion followed by the schedule's text rules.
/// Per-field templates win over the template draft's own fields when present;
/// item names are matched to templates by line position. Amounts and totals
/// are recomputed, the issue date is the run date, and the invoice number is
/// left for issue time.
pub fn stamp_draft(
    schedule: &ScheduleDoc,
    template: &InvoiceDraft,
    ctx: &RunContext<'_>,
) -> Result<InvoiceDraft, RunError> {
    if !schedule.active {
        return Err(RunError::Inactive);
    }
    if schedule.template_draft_id != ctx.template_draft_id {
        return Err(RunError::TemplateMismatch {
            expected: schedule.template_draft_id.clone(),
            got: ctx.template_draft_id.to_string(),
        });
    }

    let blocks = resolve_rows(&schedule.block_keys, &schedule.block_rows)
        .into_iter()
        .find(|row| row.run_date == ctx.run_date)
        .map(|row| row.values)
        .unwrap_or_else(|| {
            // No configured row for this run date: the grid contributes
            // nothing, but the run pseudo-blocks are still derivable.
            let mut values = BTreeMap::new();
            inject_run_blocks(&mut values, ctx.run_date);
            values
        });

    let apply_all = |text: &str| {
        apply_text_rules(
            &expand_block_placeholders(text, &blocks),
            &schedule.rules,
            ctx.run_date,
        )
    };

    let field_templates = schedule.field_templates.as_ref();

    let items: Vec<DraftItem> = template
        .items
        .iter()
        .take(MAX_DRAFT_ITEMS)
        .enumerate()
        .map(|(idx, item)| {
            let name_template = field_templates
                .and_then(|f| f.item_name_templates.get(idx))
                .map(String::as_str)
                .unwrap_or(&item.name);
            let mut stamped = DraftItem {
                id: item.id.clone(),
                code: item.code.as_deref().map(apply_all),
                name: apply_all(name_template),
                qty: item.qty,
                unit: apply_all(&item.unit),
                unit_price: item.unit_price,
                tax_rate: item.tax_rate,
                amount: 0,
            };
            stamped.amount = stamped.computed_amount();
            stamped
        })
        .collect();
    let totals = calculate_totals(&items);

    let subject_template = field_templates
        .and_then(|f| f.subject_template.as_deref())
        .unwrap_or(&template.subject);
    let note_template = field_templates
        .and_then(|f| f.note_template.as_deref())
        .unwrap_or(&template.notes);

    let now = now_ms();
    Ok(InvoiceDraft {
        client_id: template.client_id.clone(),
        issue_date: ctx.run_date.to_string(),
        due_date: template
            .due_date
            .as_deref()
            .filter(|d| !d.is_empty())
            .map(apply_all),
        invoice_no: String::new(),
        subject: apply_all(subject_template),
        issuer_id: template.issuer_id.clone(),
        items,
        sub_total: totals.sub_total,
        tax_total: totals.tax_total,
        grand_total: totals.grand_total,
        notes: apply_all(note_template),
        bank_account_ids: template
            .bank_account_ids
            .iter()
            .take(MAX_BANK_ACCOUNTS)
            .cloned()
            .collect(),
        raw_instruction: template.raw_instruction.as_deref().map(apply_all),
        created_at: now,
        updated_at: now,
        source_draft_id: Some(ctx.template_draft_id.to_string()),
        generated_by_schedule_id: Some(ctx.schedule_id.to_string()),
    })
}
