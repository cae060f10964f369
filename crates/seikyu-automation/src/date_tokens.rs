use chrono::{Datelike, FixedOffset, Local, NaiveDate, Utc};
use serde::Serialize;

use seikyu_model::{format_ymd, parse_ymd};

/// String-valued fields derived from one reference date.
///
/// Tokens are recomputed fresh per run date and never persisted. The
/// serialized names are the `{{TOKEN}}` names templates use (`YYYY`, `MM`,
/// `PREV_MONTH_LABEL`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct DateTokens {
    pub yyyy: String,
    pub yy: String,
    pub mm: String,
    pub m: String,
    pub dd: String,
    pub d: String,
    /// `"{year}年{month}月分"`, month unpadded.
    pub month_label: String,
    pub prev_yyyy: String,
    pub prev_mm: String,
    pub prev_m: String,
    pub prev_month_label: String,
    pub next_yyyy: String,
    pub next_mm: String,
    pub next_m: String,
    pub next_month_label: String,
}

impl DateTokens {
    /// Look up a token by its `{{TOKEN}}` name.
    pub fn get(&self, name: &str) -> Option<&str> {
        let value = match name {
            "YYYY" => &self.yyyy,
            "YY" => &self.yy,
            "MM" => &self.mm,
            "M" => &self.m,
            "DD" => &self.dd,
            "D" => &self.d,
            "MONTH_LABEL" => &self.month_label,
            "PREV_YYYY" => &self.prev_yyyy,
            "PREV_MM" => &self.prev_mm,
            "PREV_M" => &self.prev_m,
            "PREV_MONTH_LABEL" => &self.prev_month_label,
            "NEXT_YYYY" => &self.next_yyyy,
            "NEXT_MM" => &self.next_mm,
            "NEXT_M" => &self.next_m,
            "NEXT_MONTH_LABEL" => &self.next_month_label,
            _ => return None,
        };
        Some(value)
    }
}

/// Parse `YYYY-MM-DD`, falling back to today for anything that does not name
/// a real calendar date. Template resolution must never fail on bad input.
fn parse_or_today(input: &str) -> NaiveDate {
    parse_ymd(input).unwrap_or_else(|_| Local::now().date_naive())
}

fn month_label(date: NaiveDate) -> String {
    format!("{}年{}月分", date.year(), date.month())
}

/// Build the token set for one reference date.
pub fn build_date_tokens(run_date: &str) -> DateTokens {
    let base = parse_or_today(run_date);
    let prev = add_months(base, -1);
    let next = add_months(base, 1);

    DateTokens {
        yyyy: base.year().to_string(),
        yy: format!("{:02}", base.year().rem_euclid(100)),
        mm: format!("{:02}", base.month()),
        m: base.month().to_string(),
        dd: format!("{:02}", base.day()),
        d: base.day().to_string(),
        month_label: month_label(base),
        prev_yyyy: prev.year().to_string(),
        prev_mm: format!("{:02}", prev.month()),
        prev_m: prev.month().to_string(),
        prev_month_label: month_label(prev),
        next_yyyy: next.year().to_string(),
        next_mm: format!("{:02}", next.month()),
        next_m: next.month().to_string(),
        next_month_label: month_label(next),
    }
}

/// The run date one calendar month later, as `YYYY-MM-DD`.
///
/// Used by the scheduler to advance `nextRunDate` after a successful run; the
/// day of month is clamped, so a Jan 31 schedule runs next on Feb 28/29.
pub fn next_month_ymd(run_date: &str) -> String {
    format_ymd(add_months(parse_or_today(run_date), 1))
}

/// The last calendar day of the run date's month, as `YYYY-MM-DD`.
pub fn end_of_month_ymd(run_date: &str) -> String {
    let base = parse_or_today(run_date);
    let day = last_day_of_month(base.year(), base.month());
    format_ymd(NaiveDate::from_ymd_opt(base.year(), base.month(), day).expect("valid month end"))
}

/// Today's date in JST as `YYYY-MM-DD`.
///
/// Invoices here are dated in Japan regardless of where the cron host runs,
/// so the daily sweep derives its run date from a fixed +09:00 offset rather
/// than the host timezone.
pub fn today_ymd_jst() -> String {
    let jst = FixedOffset::east_opt(9 * 3600).expect("+09:00 is a valid offset");
    format_ymd(Utc::now().with_timezone(&jst).date_naive())
}

/// Shift by whole calendar months, clamping the day to the target month's
/// last day (Jan 31 + 1 month is Feb 28/29, not Mar 3).
fn add_months(date: NaiveDate, months: i32) -> NaiveDate {
    let total = date.month0() as i32 + months;
    let year = date.year() + total.div_euclid(12);
    let month = (total.rem_euclid(12) + 1) as u32;
    let day = date.day().min(last_day_of_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).expect("clamped day is valid")
}

fn last_day_of_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let first_next =
        NaiveDate::from_ymd_opt(next_year, next_month, 1).expect("valid date for next month");
    first_next.pred_opt().expect("date has a predecessor").day()
}
