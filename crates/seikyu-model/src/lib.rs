#![forbid(unsafe_code)]

//! `seikyu-model` defines the plain-data invoice and schedule documents.
//!
//! The crate is intentionally self-contained so it can be reused by:
//! - the automation engine (block/rule resolution, schedule runs)
//! - HTTP handlers and scheduled-run executors via `serde` (JSON-safe schema)
//!
//! Documents keep the camelCase field names of the persisted JSON, so a stored
//! schedule or draft deserializes without a translation layer. Every field a
//! document may legitimately omit carries a serde default.

mod draft;
mod schedule;
mod serde_defaults;
mod ymd;

pub use draft::{
    calculate_totals, DraftItem, InvoiceDraft, Totals, MAX_BANK_ACCOUNTS, MAX_DRAFT_ITEMS,
};
pub use schedule::{BlockRow, FieldTemplates, Rule, RunStatus, ScheduleDoc};
pub use ymd::{format_ymd, parse_ymd, YmdParseError};
