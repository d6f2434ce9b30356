// ABOUTME: Read operations - full-table import and arbitrary queries
// ABOUTME: One-shot functions open and close their own session; _with variants borrow one

use crate::config::ConnectOptions;
use crate::db::statement;
use crate::db::{SqlServerError, SqlSession};
use crate::models::{DataTable, Endpoint};

/// Import a full table into a [`DataTable`], opening and closing a
/// connection for the call.
pub async fn import_table(
    endpoint: &Endpoint,
    options: &ConnectOptions,
    schema: &str,
    table_name: &str,
    show_progress: bool,
) -> Result<DataTable, SqlServerError> {
    let mut session = SqlSession::connect(endpoint, options).await?;
    let data = import_table_with(&mut session, schema, table_name, show_progress).await?;
    session.close().await?;
    Ok(data)
}

/// Import a full table using a caller-owned session.
pub async fn import_table_with(
    session: &mut SqlSession,
    schema: &str,
    table_name: &str,
    show_progress: bool,
) -> Result<DataTable, SqlServerError> {
    if show_progress {
        println!(
            "Importing table [{}] from {}...",
            table_name,
            session.database()
        );
    }

    let qualified = statement::qualified_name(session.database(), schema, table_name);
    let data = session.query_table(&statement::select_all(&qualified)).await?;

    log::info!(
        "Imported {}: {} rows, {} columns",
        qualified,
        data.row_count(),
        data.column_count()
    );
    if show_progress {
        println!(
            "\tSuccessfully imported {}: {:?}",
            table_name,
            data.shape()
        );
    }

    Ok(data)
}

/// Run a caller-supplied SQL string and return the first result set.
/// The query text is passed through verbatim.
pub async fn custom_query(
    endpoint: &Endpoint,
    options: &ConnectOptions,
    query: &str,
) -> Result<DataTable, SqlServerError> {
    let mut session = SqlSession::connect(endpoint, options).await?;
    let data = custom_query_with(&mut session, query).await?;
    session.close().await?;
    Ok(data)
}

/// Run a caller-supplied SQL string using a caller-owned session.
pub async fn custom_query_with(
    session: &mut SqlSession,
    query: &str,
) -> Result<DataTable, SqlServerError> {
    session.query_table(query).await
}

/// Execute a caller-supplied DML/DDL statement; returns rows affected.
pub async fn execute_statement(
    endpoint: &Endpoint,
    options: &ConnectOptions,
    sql: &str,
) -> Result<u64, SqlServerError> {
    let mut session = SqlSession::connect(endpoint, options).await?;
    let affected = execute_statement_with(&mut session, sql).await?;
    session.close().await?;
    Ok(affected)
}

/// Execute a caller-supplied statement using a caller-owned session.
pub async fn execute_statement_with(
    session: &mut SqlSession,
    sql: &str,
) -> Result<u64, SqlServerError> {
    session.execute(sql, &[]).await
}
