//! Builtin rule definitions embedded at compile time

/// TOML source of the builtin rules
pub const BUILTIN_RULES: &str = include_str!("../../rules/builtin.toml");
