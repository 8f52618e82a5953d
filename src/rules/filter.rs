//! Rule selection
//!
//! `--only`, `--except` and `--pattern` narrow or replace the catalog. All
//! names are validated against the full catalog before any backend I/O.

use super::catalog::RuleCatalog;
use crate::domain::{Result, ScanError};
use std::collections::HashSet;

/// Requested rule selection mode
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RuleSelection {
    /// Every builtin rule
    #[default]
    All,
    /// Only the named rules
    Only(Vec<String>),
    /// Every rule except the named ones
    Except(Vec<String>),
    /// A single ad hoc rule compiled from a regular expression
    Pattern(String),
}

impl RuleSelection {
    /// Builds a selection from raw option values
    ///
    /// `only` and `except` are comma separated lists. A pattern takes
    /// precedence over both.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if both `only` and `except` are given.
    pub fn from_options(
        only: Option<&str>,
        except: Option<&str>,
        pattern: Option<&str>,
    ) -> Result<Self> {
        let only = only.map(parse_list).filter(|l| !l.is_empty());
        let except = except.map(parse_list).filter(|l| !l.is_empty());

        if only.is_some() && except.is_some() {
            return Err(ScanError::Configuration(
                "--only and --except cannot be used together".to_string(),
            ));
        }

        if let Some(pattern) = pattern.filter(|p| !p.is_empty()) {
            if only.is_some() || except.is_some() {
                tracing::warn!("--pattern replaces all rules; --only/--except ignored");
            }
            return Ok(RuleSelection::Pattern(pattern.to_string()));
        }

        Ok(match (only, except) {
            (Some(names), None) => RuleSelection::Only(names),
            (None, Some(names)) => RuleSelection::Except(names),
            _ => RuleSelection::All,
        })
    }
}

/// Splits a comma separated rule list, trimming entries and dropping empty ones
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Applies a [`RuleSelection`] to a catalog
pub struct RuleFilter;

impl RuleFilter {
    /// Resolves the active catalog for a selection
    pub fn resolve(catalog: &RuleCatalog, selection: &RuleSelection) -> Result<RuleCatalog> {
        match selection {
            RuleSelection::All => Ok(catalog.clone()),
            RuleSelection::Only(names) => Self::apply_only(catalog, names),
            RuleSelection::Except(names) => Self::apply_except(catalog, names),
            RuleSelection::Pattern(pattern) => RuleCatalog::with_override(pattern),
        }
    }

    /// Keeps only the named rules
    pub fn apply_only<S: AsRef<str>>(catalog: &RuleCatalog, names: &[S]) -> Result<RuleCatalog> {
        catalog.validate(names)?;
        let keep: HashSet<&str> = names.iter().map(AsRef::as_ref).collect();
        Ok(catalog.retain(|rule| keep.contains(rule.name.as_str())))
    }

    /// Drops the named rules
    pub fn apply_except<S: AsRef<str>>(
        catalog: &RuleCatalog,
        names: &[S],
    ) -> Result<RuleCatalog> {
        catalog.validate(names)?;
        let drop: HashSet<&str> = names.iter().map(AsRef::as_ref).collect();
        Ok(catalog.retain(|rule| !drop.contains(rule.name.as_str())))
    }
}
