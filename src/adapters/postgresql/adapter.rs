//! PostgreSQL structured source
//!
//! Discovers every user table from `information_schema.columns` and samples
//! rows with all columns cast to text.

use crate::adapters::postgresql::client::PostgresClient;
use crate::adapters::traits::StructuredSource;
use crate::config::{PostgresConfig, SecretString};
use crate::domain::{Result, ScanError, TableSample, TableUnit};
use async_trait::async_trait;

const DEFAULT_SCHEMA: &str = "public";

const DISCOVERY_QUERY: &str = r#"
    SELECT table_schema::text, table_name::text, column_name::text
    FROM information_schema.columns
    WHERE table_schema NOT IN ('pg_catalog', 'information_schema')
      AND table_schema NOT LIKE 'pg_toast%'
    ORDER BY table_schema, table_name, ordinal_position
"#;

/// Samples tables of a PostgreSQL database
#[derive(Debug)]
pub struct PostgresSource {
    config: PostgresConfig,
    client: Option<PostgresClient>,
}

impl PostgresSource {
    /// Creates an unconnected source
    pub fn new(config: PostgresConfig) -> Self {
        Self {
            config,
            client: None,
        }
    }

    fn client(&self) -> Result<&PostgresClient> {
        self.client
            .as_ref()
            .ok_or_else(|| ScanError::Other("PostgreSQL source used before init".to_string()))
    }
}

/// Double-quotes an identifier
pub(crate) fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Builds the sampling query for a unit; the row limit is bound as `$1`
pub(crate) fn sample_query(unit: &TableUnit) -> String {
    let columns = unit
        .fields
        .iter()
        .map(|f| format!("{}::text", quote_ident(f)))
        .collect::<Vec<_>>()
        .join(", ");
    let schema = unit.schema.as_deref().unwrap_or(DEFAULT_SCHEMA);
    format!(
        "SELECT {columns} FROM {}.{} LIMIT $1",
        quote_ident(schema),
        quote_ident(&unit.name)
    )
}

/// Groups ordered `(schema, table, column)` triples into units
pub(crate) fn group_columns<I>(columns: I) -> Vec<TableUnit>
where
    I: IntoIterator<Item = (String, String, String)>,
{
    let mut units: Vec<TableUnit> = Vec::new();
    for (schema, table, column) in columns {
        let schema = (schema != DEFAULT_SCHEMA).then_some(schema);
        match units.last_mut() {
            Some(last) if last.schema == schema && last.name == table => last.fields.push(column),
            _ => {
                let mut unit = TableUnit::new(table, vec![column]);
                unit.schema = schema;
                units.push(unit);
            }
        }
    }
    units
}

#[async_trait]
impl StructuredSource for PostgresSource {
    async fn init(&mut self, locator: &str) -> Result<()> {
        let locator = SecretString::new(locator.to_string());
        let client = PostgresClient::new(&locator, self.config.clone())?;
        tracing::info!(locator = %client.redacted_locator(), "Connecting to PostgreSQL");
        client.test_connection().await?;
        self.client = Some(client);
        Ok(())
    }

    fn unit_noun(&self) -> &str {
        "table"
    }

    fn row_noun(&self) -> &str {
        "row"
    }

    async fn discover_units(&self) -> Result<Vec<TableUnit>> {
        let rows = self.client()?.query(DISCOVERY_QUERY, &[]).await?;
        let mut columns = Vec::with_capacity(rows.len());
        for row in rows {
            columns.push((
                row.try_get::<_, String>(0)?,
                row.try_get::<_, String>(1)?,
                row.try_get::<_, String>(2)?,
            ));
        }
        let units = group_columns(columns);
        tracing::debug!(tables = units.len(), "Discovered PostgreSQL tables");
        Ok(units)
    }

    async fn sample_unit(&self, unit: &TableUnit, limit: usize) -> Result<TableSample> {
        if unit.fields.is_empty() {
            return Ok(TableSample::new(Vec::new(), Vec::new()));
        }

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = self
            .client()?
            .query(&sample_query(unit), &[&limit])
            .await
            .map_err(|e| ScanError::unit(unit.display_name(), e))?;

        let mut sampled = Vec::with_capacity(rows.len());
        for row in rows {
            let mut values = Vec::with_capacity(unit.fields.len());
            for index in 0..unit.fields.len() {
                let value: Option<String> = row
                    .try_get(index)
                    .map_err(|e| ScanError::unit(unit.display_name(), e))?;
                values.push(value.unwrap_or_default());
            }
            sampled.push(values);
        }

        Ok(TableSample::new(unit.fields.clone(), sampled))
    }
}
