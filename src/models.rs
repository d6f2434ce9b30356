// ABOUTME: Shared data models for mssql-manager
// ABOUTME: Endpoint identity, tabular payloads, and populate modes

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Default schema for all table operations.
pub const DEFAULT_SCHEMA: &str = "dbo";

/// Column type used when a created column has no override.
pub const DEFAULT_COLUMN_TYPE: &str = "NVARCHAR(255) NULL";

/// Identifies a target database as a (server, database) pair.
///
/// The server part may carry a `host,port` suffix as accepted by other
/// SQL Server tooling; [`Endpoint::host_and_port`] splits it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub server: String,
    pub database: String,
}

impl Endpoint {
    pub fn new(server: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            database: database.into(),
        }
    }

    /// Parse a `server/database` string. Anything other than exactly two
    /// non-empty parts is rejected before any connection is attempted.
    pub fn parse(s: &str) -> Result<Self, InvalidEndpoint> {
        let parts: Vec<&str> = s.split('/').collect();
        match parts.as_slice() {
            [server, database] if !server.is_empty() && !database.is_empty() => {
                Ok(Self::new(*server, *database))
            }
            _ => Err(InvalidEndpoint(s.to_string())),
        }
    }

    /// Split the server part into (host, port), defaulting to 1433.
    pub fn host_and_port(&self) -> (String, u16) {
        if let Some((host, port_str)) = self.server.split_once(',') {
            let port = port_str.trim().parse::<u16>().unwrap_or(1433);
            (host.to_string(), port)
        } else {
            (self.server.clone(), 1433)
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.server, self.database)
    }
}

/// Error for an endpoint string that is not a `server/database` pair.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid endpoint '{0}': expected the form server/database")]
pub struct InvalidEndpoint(pub String);

/// How to treat an existing table when populating it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IfExists {
    /// Add rows to the existing table.
    Append,
    /// Drop and recreate the table before inserting.
    Replace,
    /// Error out if the table already exists.
    Fail,
}

impl Default for IfExists {
    fn default() -> Self {
        IfExists::Append
    }
}

impl FromStr for IfExists {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "append" => Ok(IfExists::Append),
            "replace" => Ok(IfExists::Replace),
            "fail" => Ok(IfExists::Fail),
            other => Err(format!(
                "unknown populate mode '{}': expected append, replace, or fail",
                other
            )),
        }
    }
}

impl fmt::Display for IfExists {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IfExists::Append => "append",
            IfExists::Replace => "replace",
            IfExists::Fail => "fail",
        };
        f.write_str(s)
    }
}

/// An in-memory table: ordered column names plus rows of optional text
/// cells. `None` is SQL NULL. This is the payload every operation reads
/// or writes; no schema beyond the column names is retained.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl DataTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self { columns, rows }
    }

    /// (rows, columns).
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len())
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push_row(&mut self, row: Vec<Option<String>>) {
        self.rows.push(row);
    }

    /// Index of a named column, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Render as an array of column→value objects, one per row.
    pub fn to_json(&self) -> serde_json::Value {
        let rows: Vec<serde_json::Value> = self
            .rows
            .iter()
            .map(|row| {
                let obj: serde_json::Map<String, serde_json::Value> = self
                    .columns
                    .iter()
                    .zip(row)
                    .map(|(col, cell)| {
                        let value = match cell {
                            Some(v) => serde_json::Value::String(v.clone()),
                            None => serde_json::Value::Null,
                        };
                        (col.clone(), value)
                    })
                    .collect();
                serde_json::Value::Object(obj)
            })
            .collect();
        serde_json::Value::Array(rows)
    }
}

/// Aligned text table, the same layout the CLI prints.
impl fmt::Display for DataTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.columns.is_empty() {
            return writeln!(f, "(0 rows)");
        }

        // Column widths from headers and data
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                let max_data = self
                    .rows
                    .iter()
                    .map(|r| r.get(i).map(cell_width).unwrap_or(0))
                    .max()
                    .unwrap_or(0);
                col.len().max(max_data)
            })
            .collect();

        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<width$}", c, width = w))
            .collect();
        writeln!(f, "{}", header.join(" | "))?;

        let sep: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        writeln!(f, "{}", sep.join("-+-"))?;

        for row in &self.rows {
            let cells: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(cell, w)| format!("{:<width$}", cell_text(cell), width = w))
                .collect();
            writeln!(f, "{}", cells.join(" | "))?;
        }

        writeln!(f, "({} rows)", self.rows.len())
    }
}

fn cell_text(cell: &Option<String>) -> &str {
    cell.as_deref().unwrap_or("NULL")
}

fn cell_width(cell: &Option<String>) -> usize {
    cell_text(cell).len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataTable {
        DataTable::from_rows(
            vec!["Name".to_string(), "Age".to_string()],
            vec![
                vec![Some("Sam".to_string()), Some("29".to_string())],
                vec![Some("Ana".to_string()), None],
                vec![Some("Lee".to_string()), Some("41".to_string())],
            ],
        )
    }

    #[test]
    fn test_endpoint_parse() {
        let ep = Endpoint::parse("myserver/mydb").unwrap();
        assert_eq!(ep.server, "myserver");
        assert_eq!(ep.database, "mydb");
    }

    #[test]
    fn test_endpoint_parse_wrong_arity() {
        assert!(Endpoint::parse("justserver").is_err());
        assert!(Endpoint::parse("a/b/c").is_err());
        assert!(Endpoint::parse("/db").is_err());
        assert!(Endpoint::parse("server/").is_err());
    }

    #[test]
    fn test_endpoint_host_and_port() {
        let ep = Endpoint::new("myhost,1533", "mydb");
        assert_eq!(ep.host_and_port(), ("myhost".to_string(), 1533));

        let ep = Endpoint::new("myhost", "mydb");
        assert_eq!(ep.host_and_port(), ("myhost".to_string(), 1433));
    }

    #[test]
    fn test_if_exists_from_str() {
        assert_eq!("append".parse::<IfExists>().unwrap(), IfExists::Append);
        assert_eq!("Replace".parse::<IfExists>().unwrap(), IfExists::Replace);
        assert_eq!("FAIL".parse::<IfExists>().unwrap(), IfExists::Fail);
        assert!("upsert".parse::<IfExists>().is_err());
    }

    #[test]
    fn test_shape() {
        let table = sample();
        assert_eq!(table.shape(), (3, 2));
        assert_eq!(table.column_index("Age"), Some(1));
        assert_eq!(table.column_index("Missing"), None);
    }

    #[test]
    fn test_display_renders_nulls_and_count() {
        let rendered = sample().to_string();
        assert!(rendered.contains("Name | Age"));
        assert!(rendered.contains("NULL"));
        assert!(rendered.contains("(3 rows)"));
    }

    #[test]
    fn test_to_json() {
        let json = sample().to_json();
        let rows = json.as_array().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["Name"], "Sam");
        assert!(rows[1]["Age"].is_null());
    }
}
