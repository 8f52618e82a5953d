//! Text formatting helpers for console reports

use crate::domain::{Confidence, RuleMatch};
use std::collections::BTreeSet;

/// `"1 row"`, `"2 rows"`
pub fn pluralize(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

/// Plural form of a noun without a count (`"no tables"`)
pub fn plural_noun(noun: &str) -> String {
    format!("{noun}s")
}

/// One report line for a match
///
/// `users.email: found emails (2 rows)` for High matches,
/// `users.notes: possible phone numbers (1 row)` for Low ones.
pub fn match_line(m: &RuleMatch, noun: &str) -> String {
    let verb = match m.confidence {
        Confidence::High => "found",
        Confidence::Low => "possible",
    };
    format!(
        "{}: {verb} {} ({})",
        m.location,
        m.description,
        pluralize(m.matched_count, noun)
    )
}

/// Indented, comma joined sample values
pub fn sample_line(m: &RuleMatch) -> String {
    format!("    {}", m.sample_values.join(", "))
}

/// Hint for rules that only produced low confidence matches, if any
///
/// Descriptions are listed in first-seen order.
pub fn low_confidence_hint(matches: &[RuleMatch]) -> Option<String> {
    let high: BTreeSet<&str> = matches
        .iter()
        .filter(|m| m.is_high())
        .map(|m| m.rule_name.as_str())
        .collect();

    let mut seen = BTreeSet::new();
    let descriptions: Vec<&str> = matches
        .iter()
        .filter(|m| !m.is_high() && !high.contains(m.rule_name.as_str()))
        .filter(|m| seen.insert(m.rule_name.as_str()))
        .map(|m| m.description.as_str())
        .collect();

    if descriptions.is_empty() {
        return None;
    }

    Some(format!(
        "Also found {} with low confidence. Use --show-all to view them",
        descriptions.join(", ")
    ))
}
