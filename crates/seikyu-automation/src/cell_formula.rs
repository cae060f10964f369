use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::date_tokens::DateTokens;
use crate::template::render_rule_template;

/// Lookup environment for one cell evaluation.
///
/// `current_values` holds the blocks already resolved earlier in the same row;
/// `prev_values` holds the previous row's fully resolved blocks. Both take
/// precedence over date tokens, in that order.
pub struct EvalContext<'a> {
    pub tokens: &'a DateTokens,
    pub current_values: &'a BTreeMap<String, String>,
    pub prev_values: &'a BTreeMap<String, String>,
}

fn zero_arg_call_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([A-Z0-9_]+)\(\)$").expect("valid regex"))
}

/// Evaluate one raw cell against the formula grammar.
///
/// Cells without a leading `=` are plain templates. Formula cells support
/// zero-argument token calls (`=MM()`), `=CONCAT(...)`, `=TEXT(...)`,
/// `=COPYUP()` (empty here; materialized by row resolution), and bare
/// references. Anything unrecognized degrades to a literal string; this
/// function never fails.
pub fn evaluate_cell_expression(raw: &str, ctx: &EvalContext<'_>) -> String {
    let Some(expr) = raw.strip_prefix('=') else {
        return render_rule_template(raw, ctx.tokens);
    };
    let expr = expr.trim();

    if let Some(caps) = zero_arg_call_re().captures(expr) {
        let name = &caps[1];
        if name == "COPYUP" {
            return String::new();
        }
        if let Some(value) = ctx.tokens.get(name) {
            return render_rule_template(value, ctx.tokens);
        }
        // Not a token accessor: fall through to the bare-reference branch,
        // which turns the whole call text into a literal.
    }

    if let Some(body) = call_body(expr, "CONCAT") {
        let mut out = String::new();
        for arg in split_args(body) {
            out.push_str(&evaluate_argument(&arg, ctx));
        }
        return render_rule_template(&out, ctx.tokens);
    }

    if let Some(body) = call_body(expr, "TEXT") {
        let value = evaluate_argument(body.trim(), ctx);
        return render_rule_template(&value, ctx.tokens);
    }

    render_rule_template(&resolve_reference(expr, ctx), ctx.tokens)
}

/// One `CONCAT`/`TEXT` argument: a quoted literal (quotes stripped, then
/// token-rendered) or a bare reference.
fn evaluate_argument(arg: &str, ctx: &EvalContext<'_>) -> String {
    if arg.is_empty() {
        return String::new();
    }
    if arg.starts_with('"') || arg.starts_with('\'') {
        return render_rule_template(strip_quotes(arg), ctx.tokens);
    }
    resolve_reference(arg, ctx)
}

/// Resolve a bare identifier: same-row values win, then the previous row,
/// then date tokens; unknown names come back as the literal identifier. A hit
/// counts even when the stored value is the empty string.
fn resolve_reference(arg: &str, ctx: &EvalContext<'_>) -> String {
    let key = arg.trim();
    if let Some(value) = ctx.current_values.get(key) {
        return value.clone();
    }
    if let Some(value) = ctx.prev_values.get(key) {
        return value.clone();
    }
    if let Some(value) = ctx.tokens.get(key) {
        return value.to_string();
    }
    key.to_string()
}

/// `NAME(...)` with a matching trailing paren, greedily: `CONCAT(a),(b)`
/// yields the body `a),(b`.
fn call_body<'e>(expr: &'e str, name: &str) -> Option<&'e str> {
    expr.strip_prefix(name)?.strip_prefix('(')?.strip_suffix(')')
}

/// Split an argument list on commas outside quotes.
///
/// `"` and `'` both open a quote; an unterminated quote swallows the rest of
/// the input rather than erroring. Each fragment is trimmed; interior empty
/// fragments survive, a trailing all-whitespace fragment is dropped.
fn split_args(src: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut cur = String::new();
    let mut quote: Option<char> = None;
    for ch in src.chars() {
        match quote {
            None => match ch {
                '"' | '\'' => {
                    quote = Some(ch);
                    cur.push(ch);
                }
                ',' => {
                    out.push(cur.trim().to_string());
                    cur.clear();
                }
                _ => cur.push(ch),
            },
            Some(q) => {
                if ch == q {
                    quote = None;
                }
                cur.push(ch);
            }
        }
    }
    if !cur.trim().is_empty() {
        out.push(cur.trim().to_string());
    }
    out
}

/// Strip one matching pair of surrounding quotes, if present.
fn strip_quotes(arg: &str) -> &str {
    let trimmed = arg.trim();
    let bytes = trimmed.as_bytes();
    let quoted = bytes.len() >= 2
        && (bytes[0] == b'"' || bytes[0] == b'\'')
        && bytes[bytes.len() - 1] == bytes[0];
    if quoted {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    }
}
