//! Confidence classification
//!
//! Turns bucket counts into tiered [`RuleMatch`] records. A rule fires once
//! it has at least `min_count` hits; it is High when its hit ratio reaches the
//! rule threshold and Low otherwise. A field name that resolves to a rule is
//! strong evidence on its own, so name-heuristic matches are always High.

use super::bucket::{MatchBucket, Slot};
use super::engine::CompositeHit;
use crate::domain::{Confidence, RuleMatch, TableUnit};
use crate::rules::{Rule, RuleCatalog};
use std::sync::Arc;

/// Classifies buckets produced by the [`MatchEngine`](super::MatchEngine)
#[derive(Debug, Clone)]
pub struct ConfidenceClassifier {
    catalog: Arc<RuleCatalog>,
}

impl ConfidenceClassifier {
    /// Creates a classifier over the same catalog the buckets were built with
    pub fn new(catalog: Arc<RuleCatalog>) -> Self {
        Self { catalog }
    }

    /// Classifies one field (or file) bucket
    ///
    /// Emits at most one match per rule for `location`.
    pub fn classify(&self, location: &str, bucket: &MatchBucket, min_count: usize) -> Vec<RuleMatch> {
        let min_count = min_count.max(1);
        let denominator = bucket.non_empty();
        let mut matches = Vec::new();

        let name_rule = bucket
            .name_rule()
            .filter(|_| bucket.name_slot().hits() >= min_count);

        for (index, rule) in self.catalog.rules().iter().enumerate() {
            let Some(slot) = bucket.rule_slot(index) else {
                continue;
            };
            let content_fires = slot.hits() >= min_count;

            if name_rule == Some(index) {
                // name and content agree: a single High match
                let source = if content_fires { slot } else { bucket.name_slot() };
                matches.push(build(location, rule, source, denominator, Confidence::High));
                continue;
            }

            if content_fires {
                let confidence = tier(rule, slot.hits(), denominator);
                matches.push(build(location, rule, slot, denominator, confidence));
            }
        }

        matches
    }

    /// Classifies a composite hit on a table
    ///
    /// Reported under `table.first+second` once both siblings are populated
    /// in at least `min_count` rows.
    pub fn classify_composite(
        &self,
        unit: &TableUnit,
        hit: &CompositeHit,
        min_count: usize,
    ) -> Option<RuleMatch> {
        if hit.matched < min_count.max(1) {
            return None;
        }
        let rule = self.catalog.rules().get(hit.rule_index)?;
        let location = unit.field_location(&format!("{}+{}", hit.first_field, hit.second_field));

        Some(RuleMatch {
            location,
            rule_name: rule.name.clone(),
            category: rule.category,
            description: rule.description.clone(),
            confidence: tier(rule, hit.matched, hit.total),
            sample_values: hit.samples.clone(),
            matched_count: hit.matched,
            total_count: hit.total,
        })
    }
}

fn tier(rule: &Rule, hits: usize, total: usize) -> Confidence {
    if total == 0 {
        return Confidence::Low;
    }
    if hits as f64 / total as f64 >= rule.threshold {
        Confidence::High
    } else {
        Confidence::Low
    }
}

fn build(location: &str, rule: &Rule, slot: &Slot, total: usize, confidence: Confidence) -> RuleMatch {
    RuleMatch {
        location: location.to_string(),
        rule_name: rule.name.clone(),
        category: rule.category,
        description: rule.description.clone(),
        confidence,
        sample_values: slot.samples().to_vec(),
        matched_count: slot.hits(),
        total_count: total.max(slot.hits()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::MatchEngine;
    use crate::domain::TableSample;

    fn setup() -> (MatchEngine, ConfidenceClassifier) {
        let catalog = Arc::new(RuleCatalog::load().unwrap());
        (
            MatchEngine::new(Arc::clone(&catalog)),
            ConfidenceClassifier::new(catalog),
        )
    }

    #[test]
    fn test_high_when_ratio_reaches_threshold() {
        let (engine, classifier) = setup();
        let bucket = engine.evaluate("contact", &["555-555-5555", "555-555-1234"]);
        let matches = classifier.classify("users.contact", &bucket, 1);

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].rule_name, "phone");
        assert_eq!(matches[0].confidence, Confidence::High);
        assert_eq!(matches[0].matched_count, 2);
    }

    #[test]
    fn test_low_when_ratio_below_threshold() {
        let (engine, classifier) = setup();
        let bucket = engine.evaluate("notes", &["555-555-5555", "a", "b", "c"]);
        let matches = classifier.classify("users.notes", &bucket, 1);

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].confidence, Confidence::Low);
    }

    #[test]
    fn test_min_count_floor() {
        let (engine, classifier) = setup();
        let bucket = engine.evaluate("notes", &["alice@example.org", "bob@example.org"]);

        assert_eq!(classifier.classify("t.notes", &bucket, 2).len(), 1);
        assert!(classifier.classify("t.notes", &bucket, 3).is_empty());
    }

    #[test]
    fn test_name_and_content_collapse() {
        let (engine, classifier) = setup();
        let bucket = engine.evaluate("email", &["alice@example.org", "x", "y", "z"]);
        let matches = classifier.classify("users.email", &bucket, 1);

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].rule_name, "email");
        assert_eq!(matches[0].confidence, Confidence::High);
        assert_eq!(matches[0].sample_values, vec!["alice@example.org"]);
    }

    #[test]
    fn test_name_only_rule() {
        let (engine, classifier) = setup();
        let bucket = engine.evaluate("last_name", &["Smith", "Jones"]);
        let matches = classifier.classify("users.last_name", &bucket, 1);

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].description, "last names");
        assert_eq!(matches[0].confidence, Confidence::High);
    }

    #[test]
    fn test_name_rule_without_values_does_not_fire() {
        let (engine, classifier) = setup();
        let bucket = engine.evaluate("last_name", &["", ""]);
        assert!(classifier.classify("users.last_name", &bucket, 1).is_empty());
    }

    #[test]
    fn test_classify_composite() {
        let (engine, classifier) = setup();
        let unit = TableUnit::new("users", vec!["latitude".into(), "longitude".into()]);
        let sample = TableSample::new(
            unit.fields.clone(),
            vec![vec!["1.2".to_string(), "3.4".to_string()]],
        );
        let hits = engine.evaluate_composites(&sample);
        let m = classifier.classify_composite(&unit, &hits[0], 1).unwrap();

        assert_eq!(m.location, "users.latitude+longitude");
        assert_eq!(m.rule_name, "location");
        assert!(m.is_high());
        assert!(classifier.classify_composite(&unit, &hits[0], 2).is_none());
    }
}
