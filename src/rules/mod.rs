//! Detection rules
//!
//! - [`RuleCatalog`]: the ordered, immutable rule set for a run
//! - [`NameTokenizer`]: field-name normalization for the name heuristic
//! - [`RuleFilter`]: `--only` / `--except` / `--pattern` selection

pub mod builtin;
pub mod catalog;
pub mod filter;
pub mod tokenizer;

pub use catalog::{CompositeKey, Rule, RuleCatalog, PATTERN_RULE_NAME};
pub use filter::{RuleFilter, RuleSelection};
pub use tokenizer::NameTokenizer;
