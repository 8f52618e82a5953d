//! Match engine
//!
//! Runs every active content rule over sampled values and resolves the
//! name heuristic for structured fields. Composite rules are evaluated per
//! unit from whole rows, after single-field buckets.

use super::bucket::MatchBucket;
use crate::domain::{TableSample, MAX_SAMPLE_VALUES};
use crate::rules::{NameTokenizer, Rule, RuleCatalog};
use std::sync::Arc;

/// Sibling fields of a composite rule that both hold values in a unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeHit {
    /// Catalog index of the composite rule
    pub rule_index: usize,
    /// Field matched as the first sibling
    pub first_field: String,
    /// Field matched as the second sibling
    pub second_field: String,
    /// Value pairs formed from the two siblings
    pub matched: usize,
    /// Rows inspected
    pub total: usize,
    /// Distinct `first,second` value pairs, at most [`MAX_SAMPLE_VALUES`]
    pub samples: Vec<String>,
}

/// Evaluates sampled values against the active catalog
#[derive(Debug, Clone)]
pub struct MatchEngine {
    catalog: Arc<RuleCatalog>,
}

impl MatchEngine {
    /// Creates an engine over a catalog
    pub fn new(catalog: Arc<RuleCatalog>) -> Self {
        Self { catalog }
    }

    /// The active catalog
    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    /// Empty bucket sized for the active catalog
    pub fn new_bucket(&self) -> MatchBucket {
        MatchBucket::new(self.catalog.slot_count())
    }

    /// Evaluates one field's sampled values
    ///
    /// Every value is tested against every content rule. If the field name
    /// resolves to a rule through its keywords, every non-empty value is also
    /// recorded in the name-heuristic slot.
    pub fn evaluate<S: AsRef<str>>(&self, field_name: &str, values: &[S]) -> MatchBucket {
        let mut bucket = self.new_bucket();
        let name_rule = self.resolve_name_rule(field_name);
        bucket.set_name_rule(name_rule);

        for value in values {
            let value = value.as_ref();
            self.observe(&mut bucket, value);
            if name_rule.is_some() && !value.is_empty() {
                bucket.record_name_hit(value);
            }
        }

        bucket
    }

    /// Records one value (a file line, or a field value) against the content
    /// rules, without any name heuristic
    pub fn observe(&self, bucket: &mut MatchBucket, value: &str) {
        bucket.record_value(value);
        if value.is_empty() {
            return;
        }

        for (index, rule) in self.catalog.rules().iter().enumerate() {
            let Some(regex) = &rule.regex else {
                continue;
            };
            let mut found = regex.find_iter(value).map(|m| m.as_str()).peekable();
            if found.peek().is_some() {
                bucket.record_rule_hit(index, found);
            }
        }
    }

    /// Catalog index of the rule owning the field name, if that rule is
    /// active
    pub fn resolve_name_rule(&self, field_name: &str) -> Option<usize> {
        let tokens = NameTokenizer::tokenize(field_name);
        if tokens.is_empty() {
            return None;
        }
        let owner = self.catalog.name_owner(&tokens)?;
        self.catalog.rules().iter().position(|rule| rule.name == owner)
    }

    /// Evaluates the composite rules over a unit's sampled rows
    ///
    /// A composite rule applies when one field matches its first sibling
    /// names, a different field matches its second, and each of the two has
    /// at least one non-empty value in the unit. The n-th non-empty value of
    /// one sibling pairs with the n-th of the other, which is row pairing
    /// whenever both are populated together.
    pub fn evaluate_composites(&self, sample: &TableSample) -> Vec<CompositeHit> {
        self.catalog
            .rules()
            .iter()
            .enumerate()
            .filter_map(|(index, rule)| self.composite_hit(index, rule, sample))
            .collect()
    }

    fn composite_hit(&self, index: usize, rule: &Rule, sample: &TableSample) -> Option<CompositeHit> {
        let key = rule.composite.as_ref()?;

        let find = |names: &[String], skip: Option<usize>| {
            sample.field_names.iter().enumerate().position(|(i, field)| {
                Some(i) != skip
                    && NameTokenizer::any_matches(&NameTokenizer::tokenize(field), names)
            })
        };
        let first = find(&key.first, None)?;
        let second = find(&key.second, Some(first))?;

        let present = |index: usize| sample.column(index).into_iter().filter(|v| !v.is_empty());

        let mut samples: Vec<String> = Vec::new();
        let mut matched = 0;
        for (a, b) in present(first).zip(present(second)) {
            matched += 1;
            let pair = format!("{a},{b}");
            if samples.len() < MAX_SAMPLE_VALUES && !samples.contains(&pair) {
                samples.push(pair);
            }
        }

        if matched == 0 {
            return None;
        }

        Some(CompositeHit {
            rule_index: index,
            first_field: sample.field_names[first].clone(),
            second_field: sample.field_names[second].clone(),
            matched,
            total: sample.rows.len(),
            samples,
        })
    }
}
