//! Match records produced by the classifier

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of sample values kept per match
pub const MAX_SAMPLE_VALUES: usize = 50;

/// Confidence tier of a firing rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Shown by default
    High,
    /// Only shown with `--show-all`, otherwise summarized in a hint
    Low,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::High => f.write_str("high"),
            Confidence::Low => f.write_str("low"),
        }
    }
}

/// Sensitive data category a rule detects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Email addresses
    Email,
    /// Telephone numbers
    Phone,
    /// Credit card numbers
    CreditCard,
    /// National identifiers (e.g. SSN)
    NationalId,
    /// IP addresses
    IpAddress,
    /// MAC addresses
    MacAddress,
    /// Street addresses and postal codes
    Address,
    /// Latitude/longitude pairs
    Location,
    /// Access and refresh tokens
    AccessToken,
    /// Personal names
    Name,
    /// Dates of birth
    DateOfBirth,
    /// Matches of a user supplied pattern
    Custom,
}

/// A rule that fired for one field of one unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleMatch {
    /// `unit.field` for structured sources, the file path for files
    pub location: String,

    /// Name of the rule that fired
    pub rule_name: String,

    /// Category of the rule
    pub category: Category,

    /// Human readable plural description (e.g. "emails")
    pub description: String,

    /// Confidence tier
    pub confidence: Confidence,

    /// Deduplicated sample of matched values, at most [`MAX_SAMPLE_VALUES`]
    pub sample_values: Vec<String>,

    /// Number of sampled values (rows or lines) that matched
    pub matched_count: usize,

    /// Number of sampled values inspected
    pub total_count: usize,
}

impl RuleMatch {
    /// Whether the match is in the high confidence tier
    pub fn is_high(&self) -> bool {
        self.confidence == Confidence::High
    }
}
