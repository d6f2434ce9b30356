// ABOUTME: Filtered row deletion with preview and interactive confirmation
// ABOUTME: Requires at least one equality filter; full clears go through truncate

use std::io::{self, BufRead, Write};

use tiberius::ToSql;

use crate::config::ConnectOptions;
use crate::db::statement;
use crate::db::{SqlServerError, SqlSession};
use crate::models::Endpoint;

/// Delete rows matching every `(column, value)` equality filter, after
/// printing the affected rows and asking for confirmation on the console.
/// Zero filters is an error raised before any connection is attempted.
/// Returns the number of rows deleted (zero when the user declines).
pub async fn delete_rows(
    endpoint: &Endpoint,
    options: &ConnectOptions,
    schema: &str,
    table_name: &str,
    filters: &[(String, String)],
) -> Result<u64, SqlServerError> {
    if filters.is_empty() {
        return Err(SqlServerError::NoFilters);
    }

    let mut session = SqlSession::connect(endpoint, options).await?;
    let deleted = delete_rows_with(&mut session, schema, table_name, filters).await?;
    session.close().await?;
    Ok(deleted)
}

/// Delete rows using a caller-owned session.
pub async fn delete_rows_with(
    session: &mut SqlSession,
    schema: &str,
    table_name: &str,
    filters: &[(String, String)],
) -> Result<u64, SqlServerError> {
    if filters.is_empty() {
        return Err(SqlServerError::NoFilters);
    }

    let qualified = statement::qualified_name(session.database(), schema, table_name);
    let clause = statement::where_clause(filters);
    let params: Vec<&dyn ToSql> = filters.iter().map(|(_, value)| value as &dyn ToSql).collect();

    // Preview first: show exactly what the DELETE would remove.
    let preview = session
        .query_table_params(&statement::select_where(&qualified, &clause), &params)
        .await?;

    print!("{}", preview);
    println!(
        "The above {} row(s) will be deleted from {}.",
        preview.row_count(),
        table_name
    );

    if !confirm_on_console()? {
        println!("No rows deleted.");
        return Ok(0);
    }

    let deleted = session
        .execute(&statement::delete_where(&qualified, &clause), &params)
        .await?;

    log::info!(
        "{} deleted {} row(s) from {}",
        whoami::username(),
        deleted,
        qualified
    );
    println!("Deleted {} row(s).", deleted);

    Ok(deleted)
}

/// Prompt for yes/no on the console, blocking on stdin.
fn confirm_on_console() -> Result<bool, SqlServerError> {
    print!("Do you want to proceed? (Y/N) ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(parse_confirmation(&line))
}

/// Accepts y/ye/yes in any case; everything else declines.
pub fn parse_confirmation(input: &str) -> bool {
    matches!(
        input.trim().to_ascii_uppercase().as_str(),
        "Y" | "YE" | "YES"
    )
}
