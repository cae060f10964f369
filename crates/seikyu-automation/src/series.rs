use std::sync::OnceLock;

use regex::Regex;

use crate::date_tokens::{build_date_tokens, DateTokens};

fn digits_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9]+").expect("valid regex"))
}

fn ja_year_month_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([0-9]{4})年([0-9]{1,2})月").expect("valid regex"))
}

fn sep_year_month_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([0-9]{4})([/-])([0-9]{1,2})").expect("valid regex"))
}

fn bare_month_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([0-9]{1,2})月").expect("valid regex"))
}

fn compact_year_month_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Boundary classes keep a YYYYMM inside a longer digit run (invoice
    // numbers and the like) from being rewritten.
    RE.get_or_init(|| {
        Regex::new(r"(?:^|[^0-9])((?:19|20)[0-9]{2})(0[1-9]|1[0-2])(?:[^0-9]|$)")
            .expect("valid regex")
    })
}

/// Add `delta` to the first run of digits in `text`, preserving its width.
///
/// `INV-007` + 3 becomes `INV-010`; text without digits (or with a digit run
/// too long for `i64`) is returned unchanged.
pub fn increment_first_number(text: &str, delta: i64) -> String {
    let Some(m) = digits_re().find(text) else {
        return text.to_string();
    };
    let Ok(value) = m.as_str().parse::<i64>() else {
        return text.to_string();
    };
    let Some(next) = value.checked_add(delta) else {
        return text.to_string();
    };
    let width = m.as_str().len();
    format!("{}{:0width$}{}", &text[..m.start()], next, &text[m.end()..])
}

fn month_token(tokens: &DateTokens, matched_width: usize) -> &str {
    if matched_width == 2 {
        &tokens.mm
    } else {
        &tokens.m
    }
}

fn splice(text: &str, start: usize, end: usize, replacement: &str) -> String {
    let mut out = String::with_capacity(text.len() + replacement.len());
    out.push_str(&text[..start]);
    out.push_str(replacement);
    out.push_str(&text[end..]);
    out
}

/// Rewrite the first embedded calendar reference in `seed` to `run_date`'s
/// year/month, trying the most specific pattern first: `YYYY年M月`, then
/// `YYYY/M` or `YYYY-M`, then bare `M月`, then compact `YYYYMM`. Zero padding
/// and the `/`-vs-`-` separator of the matched text are preserved. With no
/// calendar pattern, falls back to [`increment_first_number`] with `delta`.
///
/// This is what autofills later schedule rows from an earlier seed value
/// (`2026年1月分` becomes `2026年3月分` for a March run date).
pub fn series_value_by_run_date(seed: &str, run_date: &str, delta: i64) -> String {
    let tokens = build_date_tokens(run_date);

    if let Some(caps) = ja_year_month_re().captures(seed) {
        if let (Some(whole), Some(month)) = (caps.get(0), caps.get(2)) {
            let replacement = format!(
                "{}年{}月",
                tokens.yyyy,
                month_token(&tokens, month.len())
            );
            return splice(seed, whole.start(), whole.end(), &replacement);
        }
    }

    if let Some(caps) = sep_year_month_re().captures(seed) {
        if let (Some(whole), Some(sep), Some(month)) = (caps.get(0), caps.get(2), caps.get(3)) {
            let replacement = format!(
                "{}{}{}",
                tokens.yyyy,
                sep.as_str(),
                month_token(&tokens, month.len())
            );
            return splice(seed, whole.start(), whole.end(), &replacement);
        }
    }

    if let Some(caps) = bare_month_re().captures(seed) {
        if let (Some(whole), Some(month)) = (caps.get(0), caps.get(1)) {
            let replacement = format!("{}月", month_token(&tokens, month.len()));
            return splice(seed, whole.start(), whole.end(), &replacement);
        }
    }

    if let Some(caps) = compact_year_month_re().captures(seed) {
        if let (Some(year), Some(month)) = (caps.get(1), caps.get(2)) {
            let replacement = format!("{}{}", tokens.yyyy, tokens.mm);
            return splice(seed, year.start(), month.end(), &replacement);
        }
    }

    increment_first_number(seed, delta)
}
