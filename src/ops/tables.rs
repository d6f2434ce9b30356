// ABOUTME: Table lifecycle operations - create, populate, drop, truncate
// ABOUTME: Statement text comes from db::statement; execution goes through SqlSession

use crate::config::ConnectOptions;
use crate::db::statement;
use crate::db::{SqlServerError, SqlSession};
use crate::models::{DataTable, Endpoint, IfExists};

/// Create a table shaped like the payload and populate it with the
/// payload's rows. Column types come from `type_overrides` (exact column
/// name match); everything else gets the default text type. An existing
/// table surfaces the server's own error.
pub async fn create_table(
    endpoint: &Endpoint,
    options: &ConnectOptions,
    schema: &str,
    table_name: &str,
    payload: &DataTable,
    type_overrides: &[(String, String)],
    show_progress: bool,
) -> Result<(), SqlServerError> {
    if payload.columns.is_empty() {
        return Err(SqlServerError::NoColumns);
    }

    let mut session = SqlSession::connect(endpoint, options).await?;
    create_table_with(
        &mut session,
        schema,
        table_name,
        payload,
        type_overrides,
        show_progress,
    )
    .await?;
    session.close().await?;
    Ok(())
}

/// Create-and-populate using a caller-owned session.
pub async fn create_table_with(
    session: &mut SqlSession,
    schema: &str,
    table_name: &str,
    payload: &DataTable,
    type_overrides: &[(String, String)],
    show_progress: bool,
) -> Result<(), SqlServerError> {
    if payload.columns.is_empty() {
        return Err(SqlServerError::NoColumns);
    }

    let qualified = statement::qualified_name(session.database(), schema, table_name);
    let sql = statement::create_table(&qualified, &payload.columns, type_overrides);
    session.execute(&sql, &[]).await?;

    log::info!("Created table {}", qualified);
    if show_progress {
        println!("{} has been created in {}.", table_name, session.database());
    }

    populate_table_with(
        session,
        schema,
        table_name,
        payload,
        IfExists::Append,
        show_progress,
    )
    .await?;
    Ok(())
}

/// Bulk-append (or replace/fail, per `mode`) the payload's rows into a
/// table, creating it with all-default text columns when absent. Inserts
/// go out in fixed-size chunks with every value rendered as quoted text;
/// the server converts into the declared column types. Returns rows
/// inserted.
pub async fn populate_table(
    endpoint: &Endpoint,
    options: &ConnectOptions,
    schema: &str,
    table_name: &str,
    payload: &DataTable,
    mode: IfExists,
    show_progress: bool,
) -> Result<u64, SqlServerError> {
    if payload.columns.is_empty() {
        return Err(SqlServerError::NoColumns);
    }

    let mut session = SqlSession::connect(endpoint, options).await?;
    let inserted = populate_table_with(
        &mut session,
        schema,
        table_name,
        payload,
        mode,
        show_progress,
    )
    .await?;
    session.close().await?;
    Ok(inserted)
}

/// Populate using a caller-owned session.
pub async fn populate_table_with(
    session: &mut SqlSession,
    schema: &str,
    table_name: &str,
    payload: &DataTable,
    mode: IfExists,
    show_progress: bool,
) -> Result<u64, SqlServerError> {
    if payload.columns.is_empty() {
        return Err(SqlServerError::NoColumns);
    }

    let qualified = statement::qualified_name(session.database(), schema, table_name);
    let mut exists = session.table_exists(schema, table_name).await?;

    match mode {
        IfExists::Fail if exists => {
            return Err(SqlServerError::TableExists(table_name.to_string()));
        }
        IfExists::Replace if exists => {
            session
                .execute(&statement::drop_table(&qualified), &[])
                .await?;
            log::info!("Dropped {} before replace", qualified);
            exists = false;
        }
        _ => {}
    }

    if !exists {
        // Missing targets get every column as the default text type.
        let sql = statement::create_table(&qualified, &payload.columns, &[]);
        session.execute(&sql, &[]).await?;
        log::info!(
            "Created {} with {} default text columns",
            qualified,
            payload.column_count()
        );
    }

    let mut inserted = 0u64;
    for chunk in statement::chunked_rows(payload) {
        let sql = statement::insert_chunk(&qualified, &payload.columns, chunk);
        inserted += session.execute(&sql, &[]).await?;
    }

    log::info!("Inserted {} rows into {}", inserted, qualified);
    if show_progress {
        println!(
            "{} rows added to {} in {}.",
            inserted,
            table_name,
            session.database()
        );
    }

    Ok(inserted)
}

/// Drop a table, opening and closing a connection for the call.
pub async fn drop_table(
    endpoint: &Endpoint,
    options: &ConnectOptions,
    schema: &str,
    table_name: &str,
    show_progress: bool,
) -> Result<(), SqlServerError> {
    let mut session = SqlSession::connect(endpoint, options).await?;
    drop_table_with(&mut session, schema, table_name, show_progress).await?;
    session.close().await?;
    Ok(())
}

/// Drop a table using a caller-owned session.
pub async fn drop_table_with(
    session: &mut SqlSession,
    schema: &str,
    table_name: &str,
    show_progress: bool,
) -> Result<(), SqlServerError> {
    let qualified = statement::qualified_name(session.database(), schema, table_name);
    session
        .execute(&statement::drop_table(&qualified), &[])
        .await?;

    log::info!("Dropped table {}", qualified);
    if show_progress {
        println!("{} dropped from {}.", table_name, session.database());
    }
    Ok(())
}

/// Remove all rows from a table while preserving its schema.
pub async fn truncate_table(
    endpoint: &Endpoint,
    options: &ConnectOptions,
    schema: &str,
    table_name: &str,
    show_progress: bool,
) -> Result<(), SqlServerError> {
    let mut session = SqlSession::connect(endpoint, options).await?;
    truncate_table_with(&mut session, schema, table_name, show_progress).await?;
    session.close().await?;
    Ok(())
}

/// Truncate using a caller-owned session.
pub async fn truncate_table_with(
    session: &mut SqlSession,
    schema: &str,
    table_name: &str,
    show_progress: bool,
) -> Result<(), SqlServerError> {
    let qualified = statement::qualified_name(session.database(), schema, table_name);
    session
        .execute(&statement::truncate_table(&qualified), &[])
        .await?;

    log::info!("Truncated table {}", qualified);
    if show_progress {
        println!("{} truncated in {}.", table_name, session.database());
    }
    Ok(())
}
