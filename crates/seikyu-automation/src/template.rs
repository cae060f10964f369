use std::sync::OnceLock;

use regex::Regex;

use seikyu_model::Rule;

use crate::date_tokens::{build_date_tokens, DateTokens};

fn token_re() -> &'static Regex {
    static TOKEN_RE: OnceLock<Regex> = OnceLock::new();
    TOKEN_RE.get_or_init(|| Regex::new(r"\{\{([A-Z0-9_]+)\}\}").expect("valid regex"))
}

/// Substitute `{{TOKEN}}` placeholders from `tokens`.
///
/// Single pass: a token's own value is never re-scanned for further
/// placeholders, and unknown tokens render as the empty string.
pub fn render_rule_template(template: &str, tokens: &DateTokens) -> String {
    token_re()
        .replace_all(template, |caps: &regex::Captures<'_>| {
            tokens.get(&caps[1]).unwrap_or_default().to_string()
        })
        .into_owned()
}

/// Apply literal find/replace rules to `text`, in order.
///
/// Each rule's replacement template is expanded against `run_date`'s tokens
/// first. Patterns are plain substrings (all occurrences); empty patterns are
/// skipped. Later rules operate on earlier rules' output, so chains like
/// "last month's label -> this month's label" compose.
pub fn apply_text_rules(text: &str, rules: &[Rule], run_date: &str) -> String {
    let tokens = build_date_tokens(run_date);
    let mut out = text.to_string();
    for rule in rules {
        if rule.pattern.is_empty() {
            continue;
        }
        let replacement = render_rule_template(&rule.template, &tokens);
        out = out.replace(&rule.pattern, &replacement);
    }
    out
}
