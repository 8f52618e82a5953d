//! Rule catalog
//!
//! The catalog is the immutable, ordered set of detection rules used for a
//! run. It is built once (from the embedded builtin definitions, or from a
//! single user pattern) and shared by reference with every scan task.

use super::builtin::BUILTIN_RULES;
use crate::domain::{Category, Result, ScanError};
use regex::Regex;
use serde::Deserialize;
use super::tokenizer::NameTokenizer;
use std::collections::{BTreeSet, HashSet};

/// Default share of matching values required for the high confidence tier
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Name of the rule created by a `--pattern` override
pub const PATTERN_RULE_NAME: &str = "pattern";

/// Rule definition from TOML
#[derive(Debug, Clone, Deserialize)]
struct RuleDefinition {
    name: String,
    category: Category,
    description: String,
    #[serde(default)]
    pattern: Option<String>,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default = "default_threshold")]
    threshold: f64,
    #[serde(default)]
    composite: Option<CompositeKey>,
}

/// Rule library container
#[derive(Debug, Deserialize)]
struct RuleLibrary {
    rules: Vec<RuleDefinition>,
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

/// Sibling-field linkage of a composite rule
///
/// Each side lists the field names (as normalized tokens) that qualify as
/// that sibling, e.g. `latitude`/`lat` and `longitude`/`lon`/`lng`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CompositeKey {
    /// Names accepted for the first sibling
    pub first: Vec<String>,
    /// Names accepted for the second sibling
    pub second: Vec<String>,
}

/// A named detection rule
#[derive(Debug, Clone)]
pub struct Rule {
    /// Unique rule name
    pub name: String,

    /// Category of data the rule detects
    pub category: Category,

    /// Plural description used in reports
    pub description: String,

    /// Content regex; `None` for name-only and composite rules
    pub regex: Option<Regex>,

    /// Field-name keywords for the name heuristic
    pub keywords: Vec<String>,

    /// Sibling linkage for composite rules
    pub composite: Option<CompositeKey>,

    /// Minimum match ratio for the high confidence tier
    pub threshold: f64,

    /// Whether the rule ships with privscan
    pub builtin: bool,
}

impl Rule {
    /// Whether this rule requires two sibling fields
    pub fn is_composite(&self) -> bool {
        self.composite.is_some()
    }
}

/// Keyword set of a rule taking part in the name heuristic
#[derive(Debug, Clone)]
struct NameOwner {
    rule: String,
    keywords: Vec<String>,
}

/// Ordered, immutable set of rules keyed by name
#[derive(Debug, Clone)]
pub struct RuleCatalog {
    rules: Vec<Rule>,
    // owners of the catalog this one was narrowed from, in its order
    name_owners: Vec<NameOwner>,
}

impl RuleCatalog {
    /// Builds the builtin catalog
    pub fn load() -> Result<Self> {
        Self::from_toml(BUILTIN_RULES)
    }

    /// Builds a catalog from TOML rule definitions
    ///
    /// Rules defined this way are marked builtin.
    pub fn from_toml(content: &str) -> Result<Self> {
        let library: RuleLibrary = toml::from_str(content)?;

        let rules = library
            .rules
            .into_iter()
            .map(|def| {
                let regex = def
                    .pattern
                    .as_deref()
                    .map(Regex::new)
                    .transpose()
                    .map_err(|e| {
                        ScanError::Configuration(format!("Invalid regex in rule '{}': {e}", def.name))
                    })?;

                Ok(Rule {
                    name: def.name,
                    category: def.category,
                    description: def.description,
                    regex,
                    keywords: def.keywords,
                    composite: def.composite,
                    threshold: def.threshold.clamp(0.0, 1.0),
                    builtin: true,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Self::from_rules(rules)
    }

    /// Builds a catalog from already constructed rules
    ///
    /// # Errors
    ///
    /// Returns a configuration error if two rules share a name.
    pub fn from_rules(rules: Vec<Rule>) -> Result<Self> {
        let mut seen = HashSet::new();
        for rule in &rules {
            if !seen.insert(rule.name.as_str()) {
                return Err(ScanError::Configuration(format!(
                    "Duplicate rule name: {}",
                    rule.name
                )));
            }
        }
        let name_owners = rules
            .iter()
            .filter(|r| !r.is_composite() && !r.keywords.is_empty())
            .map(|r| NameOwner {
                rule: r.name.clone(),
                keywords: r.keywords.clone(),
            })
            .collect();
        Ok(Self { rules, name_owners })
    }

    /// Replaces the whole catalog with a single rule compiled from `pattern`
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Pattern`] carrying the regex parse diagnostic if
    /// the expression is malformed.
    pub fn with_override(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)?;
        Self::from_rules(vec![Rule {
            name: PATTERN_RULE_NAME.to_string(),
            category: Category::Custom,
            description: "pattern matches".to_string(),
            regex: Some(regex),
            keywords: Vec::new(),
            composite: None,
            threshold: 0.0,
            builtin: false,
        }])
    }

    /// Rules in catalog order
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the catalog has no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Number of slots in a match bucket for this catalog
    /// (one per rule plus the trailing name-heuristic slot)
    pub fn slot_count(&self) -> usize {
        self.rules.len() + 1
    }

    /// Looks up a rule by name
    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }

    /// Whether a rule with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Alphabetically sorted rule names
    pub fn sorted_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.rules.iter().map(|r| r.name.clone()).collect();
        names.sort();
        names
    }

    /// Name of the rule that owns a field name through its keywords
    ///
    /// Ownership is decided over the full rule set the catalog was narrowed
    /// from: the first keyword match wins even when that rule is no longer
    /// active, so narrowing never hands a field to a different rule.
    pub fn name_owner(&self, tokens: &BTreeSet<String>) -> Option<&str> {
        self.name_owners
            .iter()
            .find(|owner| NameTokenizer::any_matches(tokens, &owner.keywords))
            .map(|owner| owner.rule.as_str())
    }

    /// Checks that every name refers to a rule in this catalog
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidRule`] for the first unknown name, carrying
    /// the sorted list of valid names.
    pub fn validate<S: AsRef<str>>(&self, names: &[S]) -> Result<()> {
        for name in names {
            let name = name.as_ref();
            if !self.contains(name) {
                return Err(ScanError::InvalidRule {
                    name: name.to_string(),
                    valid: self.sorted_names(),
                });
            }
        }
        Ok(())
    }

    /// New catalog with the rules matching `keep`, order preserved
    pub(crate) fn retain<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&Rule) -> bool,
    {
        Self {
            rules: self.rules.iter().filter(|r| keep(r)).cloned().collect(),
            name_owners: self.name_owners.clone(),
        }
    }
}
