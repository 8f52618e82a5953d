//! Scan units
//!
//! A scan unit is the granularity at which sampling and concurrency are
//! applied: one table (or collection, index, key pattern) for structured
//! sources, one file for file sources.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A table-like unit discovered from a structured source
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableUnit {
    /// Namespace the table lives in, if it differs from the default one
    pub schema: Option<String>,

    /// Table name
    pub name: String,

    /// Field (column) names known at discovery time
    pub fields: Vec<String>,
}

impl TableUnit {
    /// Creates a table unit in the default namespace
    pub fn new(name: impl Into<String>, fields: Vec<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
            fields,
        }
    }

    /// Sets the namespace
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Name used as the location prefix in reports
    pub fn display_name(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{schema}.{}", self.name),
            None => self.name.clone(),
        }
    }

    /// Location of a field of this table (`table.field`)
    pub fn field_location(&self, field: &str) -> String {
        format!("{}.{field}", self.display_name())
    }
}

impl fmt::Display for TableUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

/// Sampled data for one table
///
/// Every row is aligned with `field_names`; absent or NULL values are empty
/// strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableSample {
    /// Field names in column order
    pub field_names: Vec<String>,

    /// Sampled rows
    pub rows: Vec<Vec<String>>,
}

impl TableSample {
    /// Creates a sample
    pub fn new(field_names: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { field_names, rows }
    }

    /// Values of the column at `index`, one per row
    pub fn column(&self, index: usize) -> Vec<&str> {
        self.rows
            .iter()
            .map(|row| row.get(index).map(String::as_str).unwrap_or(""))
            .collect()
    }
}

/// A file-like unit discovered from a file source
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileLocator {
    /// Path (or object key) of the file
    pub path: PathBuf,
}

impl FileLocator {
    /// Creates a locator
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location used in reports
    pub fn location(&self) -> String {
        self.path.display().to_string()
    }
}

impl fmt::Display for FileLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_display_name() {
        let table = TableUnit::new("users", vec!["email".to_string()]);
        assert_eq!(table.display_name(), "users");
        assert_eq!(table.field_location("email"), "users.email");

        let table = table.with_schema("audit");
        assert_eq!(table.display_name(), "audit.users");
        assert_eq!(table.field_location("email"), "audit.users.email");
    }

    #[test]
    fn test_sample_column_pads_short_rows() {
        let sample = TableSample::new(
            vec!["a".to_string(), "b".to_string()],
            vec![
                vec!["1".to_string(), "2".to_string()],
                vec!["3".to_string()],
            ],
        );
        assert_eq!(sample.column(1), vec!["2", ""]);
    }

    #[test]
    fn test_file_location() {
        let file = FileLocator::new("data/email.txt");
        assert_eq!(file.location(), "data/email.txt");
    }
}
