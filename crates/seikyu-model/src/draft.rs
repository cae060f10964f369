use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Maximum line items a draft may carry.
pub const MAX_DRAFT_ITEMS: usize = 80;

/// Maximum bank accounts attachable to one draft.
pub const MAX_BANK_ACCOUNTS: usize = 10;

/// One invoice line item. Monetary values are yen as integers; `amount` is
/// derived (`round(qty * unit_price)`) and recomputed whenever a draft is
/// stamped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftItem {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default = "crate::serde_defaults::default_qty")]
    pub qty: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub unit_price: i64,
    /// Consumption tax percent (0, 8, or 10 in practice).
    #[serde(default = "crate::serde_defaults::default_tax_rate")]
    pub tax_rate: u8,
    #[serde(default)]
    pub amount: i64,
}

impl Default for DraftItem {
    fn default() -> Self {
        Self {
            id: String::new(),
            code: None,
            name: String::new(),
            qty: crate::serde_defaults::default_qty(),
            unit: String::new(),
            unit_price: 0,
            tax_rate: crate::serde_defaults::default_tax_rate(),
            amount: 0,
        }
    }
}

impl DraftItem {
    /// `round(qty * unit_price)` in yen.
    pub fn computed_amount(&self) -> i64 {
        (self.qty * self.unit_price as f64).round() as i64
    }
}

/// Invoice totals in yen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub sub_total: i64,
    pub tax_total: i64,
    pub grand_total: i64,
}

/// Compute invoice totals from line items.
///
/// Tax is grouped by rate and floored per rate bucket, so two 10% items of
/// ¥105 each contribute `floor(210 * 0.10) = 21`, not `floor(10.5) * 2 = 20`.
pub fn calculate_totals(items: &[DraftItem]) -> Totals {
    let sub_total = items.iter().map(|i| i.amount).sum::<i64>();

    let mut by_rate: BTreeMap<u8, i64> = BTreeMap::new();
    for item in items {
        *by_rate.entry(item.tax_rate).or_insert(0) += item.amount;
    }
    let tax_total = by_rate
        .iter()
        .map(|(rate, amount)| (*amount as f64 * (f64::from(*rate) / 100.0)).floor() as i64)
        .sum::<i64>();

    Totals {
        sub_total,
        tax_total,
        grand_total: sub_total + tax_total,
    }
}

/// An invoice draft document as persisted by the host application.
///
/// Drafts double as templates: a recurring schedule points at one via
/// `templateDraftId` and stamps copies of it per run date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    /// `YYYY-MM-DD`.
    #[serde(default)]
    pub issue_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    /// Assigned at issue time; empty for drafts.
    #[serde(default)]
    pub invoice_no: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<DraftItem>,
    #[serde(default)]
    pub sub_total: i64,
    #[serde(default)]
    pub tax_total: i64,
    #[serde(default)]
    pub grand_total: i64,
    #[serde(default)]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bank_account_ids: Vec<String>,
    /// Free text the draft was originally extracted from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_instruction: Option<String>,
    /// Epoch milliseconds.
    #[serde(default)]
    pub created_at: i64,
    /// Epoch milliseconds.
    #[serde(default)]
    pub updated_at: i64,
    /// Set on drafts generated by a schedule run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_draft_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_by_schedule_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn item(amount: i64, tax_rate: u8) -> DraftItem {
        DraftItem {
            amount,
            tax_rate,
            ..DraftItem::default()
        }
    }

    #[test]
    fn amount_rounds_half_up() {
        let it = DraftItem {
            qty: 1.5,
            unit_price: 333,
            ..DraftItem::default()
        };
        assert_eq!(it.computed_amount(), 500);
    }

    #[test]
    fn totals_floor_tax_per_rate_bucket() {
        let totals = calculate_totals(&[item(105, 10), item(105, 10)]);
        assert_eq!(totals.sub_total, 210);
        // Both items share the 10% bucket: floor(210 * 0.10) = 21.
        assert_eq!(totals.tax_total, 21);
        assert_eq!(totals.grand_total, 231);
    }

    #[test]
    fn totals_keep_rate_buckets_separate() {
        let totals = calculate_totals(&[item(1000, 10), item(108, 8), item(999, 0)]);
        assert_eq!(totals.sub_total, 2107);
        // floor(1000 * 0.10) + floor(108 * 0.08) + floor(999 * 0) = 100 + 8 + 0.
        assert_eq!(totals.tax_total, 108);
        assert_eq!(totals.grand_total, 2215);
    }

    #[test]
    fn empty_items_total_zero() {
        assert_eq!(calculate_totals(&[]), Totals::default());
    }
}
