//! Sensitive data detection
//!
//! [`MatchEngine`] fills a [`MatchBucket`] per field from sampled values;
//! [`ConfidenceClassifier`] turns buckets into tiered matches.

pub mod bucket;
pub mod classifier;
pub mod engine;

pub use bucket::{MatchBucket, Slot};
pub use classifier::ConfidenceClassifier;
pub use engine::{CompositeHit, MatchEngine};
