// ABOUTME: SQL Server session management using tiberius
// ABOUTME: Connection lifecycle, statement execution, and result-set capture

use thiserror::Error;
use tiberius::{AuthMethod, Client, ColumnData, Config, Row, ToSql};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

use crate::config::ConnectOptions;
use crate::models::{DataTable, Endpoint};

#[derive(Error, Debug)]
pub enum SqlServerError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Query failed: {0}")]
    QueryFailed(String),
    #[error("Tiberius error: {0}")]
    Tiberius(#[from] tiberius::error::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Table already exists: {0}")]
    TableExists(String),
    #[error("At least one column = value filter is required; use truncate_table to clear a table")]
    NoFilters,
    #[error("Tabular payload has no columns")]
    NoColumns,
}

/// One live connection to a (server, database) endpoint. Built per call by
/// the one-shot operations, or constructed and owned by the caller for the
/// `*_with` variants.
pub struct SqlSession {
    client: Client<Compat<TcpStream>>,
    endpoint: Endpoint,
}

impl SqlSession {
    /// Connect to the endpoint's database with the given options.
    pub async fn connect(
        endpoint: &Endpoint,
        options: &ConnectOptions,
    ) -> Result<Self, SqlServerError> {
        // A "host,port" server string wins over the configured port.
        let (host, server_port) = endpoint.host_and_port();
        let port = if endpoint.server.contains(',') {
            server_port
        } else {
            options.port
        };

        let mut config = Config::new();
        config.host(&host);
        config.port(port);
        config.database(&endpoint.database);
        config.authentication(AuthMethod::sql_server(&options.username, &options.password));

        if options.trust_certificate {
            config.trust_cert();
        }

        let tcp = TcpStream::connect(config.get_addr())
            .await
            .map_err(|e| SqlServerError::ConnectionFailed(e.to_string()))?;

        tcp.set_nodelay(true)?;

        let client = Client::connect(config, tcp.compat_write())
            .await
            .map_err(|e| SqlServerError::ConnectionFailed(e.to_string()))?;

        log::info!("Connected to {}", endpoint);

        Ok(Self {
            client,
            endpoint: endpoint.clone(),
        })
    }

    /// The database this session is attached to.
    pub fn database(&self) -> &str {
        &self.endpoint.database
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Run arbitrary SQL text and capture the first result set.
    pub async fn query_table(&mut self, sql: &str) -> Result<DataTable, SqlServerError> {
        let mut stream = self.client.simple_query(sql).await?;

        let columns: Vec<String> = match stream.columns().await? {
            Some(cols) => cols.iter().map(|c| c.name().to_string()).collect(),
            None => Vec::new(),
        };

        let rows = stream.into_first_result().await?;
        Ok(collect_table(columns, &rows))
    }

    /// Run a parameterized SELECT (`@P1`-style placeholders) and capture
    /// the first result set.
    pub async fn query_table_params(
        &mut self,
        sql: &str,
        params: &[&dyn ToSql],
    ) -> Result<DataTable, SqlServerError> {
        let mut stream = self.client.query(sql, params).await?;

        let columns: Vec<String> = match stream.columns().await? {
            Some(cols) => cols.iter().map(|c| c.name().to_string()).collect(),
            None => Vec::new(),
        };

        let rows = stream.into_first_result().await?;
        Ok(collect_table(columns, &rows))
    }

    /// Execute a statement that returns no result set; yields the total
    /// rows affected.
    pub async fn execute(
        &mut self,
        sql: &str,
        params: &[&dyn ToSql],
    ) -> Result<u64, SqlServerError> {
        let result = self.client.execute(sql, params).await?;
        Ok(result.total())
    }

    /// Whether a table exists in the session's database.
    pub async fn table_exists(
        &mut self,
        schema: &str,
        table: &str,
    ) -> Result<bool, SqlServerError> {
        let sql = super::statement::table_exists(self.database());
        let rows = self
            .client
            .query(&sql, &[&schema, &table])
            .await?
            .into_first_result()
            .await?;
        Ok(!rows.is_empty())
    }

    /// Close the connection. Only meaningful on the normal path; error
    /// paths drop the session instead.
    pub async fn close(self) -> Result<(), SqlServerError> {
        let endpoint = self.endpoint;
        self.client.close().await?;
        log::info!("Closed connection to {}", endpoint);
        Ok(())
    }
}

fn collect_table(columns: Vec<String>, rows: &[Row]) -> DataTable {
    let mut table = DataTable::new(columns);
    for row in rows {
        table.push_row(row_to_cells(row));
    }
    table
}

/// Flatten a tiberius row into optional text cells. Temporal types go
/// through the typed chrono getters; everything else renders from the
/// raw column data.
fn row_to_cells(row: &Row) -> Vec<Option<String>> {
    row.cells()
        .enumerate()
        .map(|(i, (_col, data))| cell_to_text(row, i, data))
        .collect()
}

fn cell_to_text(row: &Row, i: usize, data: &ColumnData<'_>) -> Option<String> {
    match data {
        ColumnData::Bit(v) => v.map(|b| b.to_string()),
        ColumnData::U8(v) => v.map(|n| n.to_string()),
        ColumnData::I16(v) => v.map(|n| n.to_string()),
        ColumnData::I32(v) => v.map(|n| n.to_string()),
        ColumnData::I64(v) => v.map(|n| n.to_string()),
        ColumnData::F32(v) => v.map(|n| n.to_string()),
        ColumnData::F64(v) => v.map(|n| n.to_string()),
        ColumnData::Numeric(v) => v.as_ref().map(|n| n.to_string()),
        ColumnData::String(v) => v.as_ref().map(|s| s.to_string()),
        ColumnData::Guid(v) => v.map(|g| g.to_string()),
        ColumnData::Binary(v) => v.as_ref().map(|b| format!("0x{}", hex_encode(b))),
        ColumnData::Xml(v) => v.as_ref().map(|x| x.to_string()),
        ColumnData::DateTime(_) | ColumnData::SmallDateTime(_) | ColumnData::DateTime2(_) => row
            .try_get::<chrono::NaiveDateTime, _>(i)
            .ok()
            .flatten()
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S%.f").to_string()),
        ColumnData::DateTimeOffset(_) => row
            .try_get::<chrono::DateTime<chrono::Utc>, _>(i)
            .ok()
            .flatten()
            .map(|dt| dt.to_rfc3339()),
        ColumnData::Date(_) => row
            .try_get::<chrono::NaiveDate, _>(i)
            .ok()
            .flatten()
            .map(|d| d.format("%Y-%m-%d").to_string()),
        ColumnData::Time(_) => row
            .try_get::<chrono::NaiveTime, _>(i)
            .ok()
            .flatten()
            .map(|t| t.format("%H:%M:%S%.f").to_string()),
        #[allow(unreachable_patterns)]
        _ => None,
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02X}", b)).collect()
}
