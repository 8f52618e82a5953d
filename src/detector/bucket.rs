//! Per-field match accumulator

use crate::domain::MAX_SAMPLE_VALUES;

/// Hits recorded for one rule (or the name heuristic)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Slot {
    hits: usize,
    samples: Vec<String>,
}

impl Slot {
    /// Number of sampled values that matched
    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Distinct matched values in first-seen order, at most [`MAX_SAMPLE_VALUES`]
    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    /// Whether nothing matched
    pub fn is_empty(&self) -> bool {
        self.hits == 0
    }

    fn record_hit(&mut self) {
        self.hits += 1;
    }

    fn add_sample(&mut self, value: &str) {
        if self.samples.len() < MAX_SAMPLE_VALUES && !self.samples.iter().any(|s| s == value) {
            self.samples.push(value.to_string());
        }
    }

    fn merge(&mut self, other: Slot) {
        self.hits += other.hits;
        for value in other.samples {
            self.add_sample(&value);
        }
    }
}

/// Match accumulator for one field (or one file)
///
/// Holds one slot per catalog rule plus a trailing slot for the name
/// heuristic. The slot count is fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchBucket {
    slots: Vec<Slot>,
    total: usize,
    non_empty: usize,
    name_rule: Option<usize>,
}

impl MatchBucket {
    /// Creates an empty bucket with `slot_count` slots
    /// (`catalog.len() + 1`)
    pub fn new(slot_count: usize) -> Self {
        Self {
            slots: vec![Slot::default(); slot_count.max(1)],
            total: 0,
            non_empty: 0,
            name_rule: None,
        }
    }

    /// Number of slots including the name-heuristic slot
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Slot of the rule at `index` in catalog order
    pub fn rule_slot(&self, index: usize) -> Option<&Slot> {
        if index + 1 < self.slots.len() {
            self.slots.get(index)
        } else {
            None
        }
    }

    /// The trailing name-heuristic slot
    pub fn name_slot(&self) -> &Slot {
        // never empty: new() allocates at least one slot
        &self.slots[self.slots.len() - 1]
    }

    /// Catalog index of the rule the field name resolved to
    pub fn name_rule(&self) -> Option<usize> {
        self.name_rule
    }

    /// Number of values (rows or lines) inspected
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of inspected values that were not empty
    pub fn non_empty(&self) -> usize {
        self.non_empty
    }

    /// Whether no rule and no name heuristic recorded a hit
    pub fn has_hits(&self) -> bool {
        self.slots.iter().any(|s| !s.is_empty())
    }

    /// Folds another bucket of the same catalog into this one
    ///
    /// Used to combine the entries of an archive into one result.
    pub fn merge(&mut self, other: MatchBucket) {
        debug_assert_eq!(self.slots.len(), other.slots.len());
        self.total += other.total;
        self.non_empty += other.non_empty;
        if self.name_rule.is_none() {
            self.name_rule = other.name_rule;
        }
        for (slot, other) in self.slots.iter_mut().zip(other.slots) {
            slot.merge(other);
        }
    }

    pub(crate) fn set_name_rule(&mut self, index: Option<usize>) {
        self.name_rule = index;
    }

    pub(crate) fn record_value(&mut self, value: &str) {
        self.total += 1;
        if !value.is_empty() {
            self.non_empty += 1;
        }
    }

    pub(crate) fn record_rule_hit<'a, I>(&mut self, index: usize, matched: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.record_hit();
            for value in matched {
                slot.add_sample(value);
            }
        }
    }

    pub(crate) fn record_name_hit(&mut self, value: &str) {
        let last = self.slots.len() - 1;
        let slot = &mut self.slots[last];
        slot.record_hit();
        slot.add_sample(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_bucket_is_empty() {
        let bucket = MatchBucket::new(3);
        assert_eq!(bucket.slot_count(), 3);
        assert!(!bucket.has_hits());
        assert!(bucket.rule_slot(1).is_some());
        assert!(bucket.rule_slot(2).is_none());
    }

    #[test]
    fn test_samples_are_deduplicated() {
        let mut bucket = MatchBucket::new(2);
        bucket.record_rule_hit(0, ["a@example.org"]);
        bucket.record_rule_hit(0, ["a@example.org"]);
        let slot = bucket.rule_slot(0).unwrap();
        assert_eq!(slot.hits(), 2);
        assert_eq!(slot.samples(), ["a@example.org"]);
    }

    #[test]
    fn test_samples_are_bounded() {
        let mut bucket = MatchBucket::new(2);
        for i in 0..(MAX_SAMPLE_VALUES + 10) {
            let value = format!("v{i}");
            bucket.record_name_hit(&value);
        }
        assert_eq!(bucket.name_slot().hits(), MAX_SAMPLE_VALUES + 10);
        assert_eq!(bucket.name_slot().samples().len(), MAX_SAMPLE_VALUES);
    }

    #[test]
    fn test_merge_adds_counts() {
        let mut a = MatchBucket::new(2);
        a.record_value("x");
        a.record_rule_hit(0, ["x"]);

        let mut b = MatchBucket::new(2);
        b.record_value("");
        b.record_value("y");
        b.record_rule_hit(0, ["y"]);

        a.merge(b);
        assert_eq!(a.total(), 3);
        assert_eq!(a.non_empty(), 2);
        assert_eq!(a.rule_slot(0).unwrap().hits(), 2);
        assert_eq!(a.rule_slot(0).unwrap().samples(), ["x", "y"]);
    }
}
