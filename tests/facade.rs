//! Integration tests for the operation facade that need no live server:
//! precondition checks, statement construction, and payload handling.

use mssql_manager::db::statement;
use mssql_manager::{ops, ConnectOptions, DataTable, Endpoint, IfExists, SqlServerError};

fn unreachable_endpoint() -> Endpoint {
    // Never dialed by the tests below; preconditions fire first.
    Endpoint::new("sql-test-host,1433", "Payroll")
}

fn employees() -> DataTable {
    DataTable::from_rows(
        vec!["Name".to_string(), "Age".to_string()],
        vec![
            vec![Some("Sam".to_string()), Some("29".to_string())],
            vec![Some("Ana".to_string()), Some("35".to_string())],
            vec![Some("Lee".to_string()), Some("41".to_string())],
        ],
    )
}

#[tokio::test]
async fn delete_with_no_filters_fails_before_connecting() {
    let err = ops::delete_rows(
        &unreachable_endpoint(),
        &ConnectOptions::default(),
        "dbo",
        "Employees",
        &[],
    )
    .await
    .unwrap_err();

    // NoFilters, not ConnectionFailed: the precondition fires before any
    // network activity.
    assert!(matches!(err, SqlServerError::NoFilters));
    let message = err.to_string();
    assert!(message.contains("truncate_table"));
}

#[tokio::test]
async fn create_with_no_columns_fails_before_connecting() {
    let empty = DataTable::default();
    let err = ops::create_table(
        &unreachable_endpoint(),
        &ConnectOptions::default(),
        "dbo",
        "Employees",
        &empty,
        &[],
        false,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, SqlServerError::NoColumns));
}

#[tokio::test]
async fn populate_with_no_columns_fails_before_connecting() {
    let empty = DataTable::default();
    let err = ops::populate_table(
        &unreachable_endpoint(),
        &ConnectOptions::default(),
        "dbo",
        "Employees",
        &empty,
        IfExists::Append,
        false,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, SqlServerError::NoColumns));
}

#[test]
fn endpoint_parse_requires_server_and_database() {
    assert!(Endpoint::parse("myserver/Payroll").is_ok());
    assert!(Endpoint::parse("myserver").is_err());
    assert!(Endpoint::parse("a/b/c").is_err());
}

#[test]
fn create_statement_matches_employees_example() {
    let payload = employees();
    let overrides = vec![("Age".to_string(), "INT".to_string())];
    let qualified = statement::qualified_name("Payroll", "dbo", "Employees");
    let sql = statement::create_table(&qualified, &payload.columns, &overrides);

    assert_eq!(
        sql,
        "CREATE TABLE [Payroll].[dbo].[Employees] ([Name] NVARCHAR(255) NULL, [Age] INT)"
    );
}

#[test]
fn insert_statements_cover_whole_payload_in_order() {
    let payload = employees();
    let qualified = statement::qualified_name("Payroll", "dbo", "Employees");

    let statements: Vec<String> = statement::chunked_rows(&payload)
        .map(|chunk| statement::insert_chunk(&qualified, &payload.columns, chunk))
        .collect();

    assert_eq!(statements.len(), 1);
    assert_eq!(
        statements[0],
        "INSERT INTO [Payroll].[dbo].[Employees] ([Name], [Age]) \
         VALUES ('Sam', '29'), ('Ana', '35'), ('Lee', '41')"
    );
}

#[test]
fn filter_clause_preserves_caller_order() {
    let filters = vec![
        ("LastName".to_string(), "I Am".to_string()),
        ("FirstName".to_string(), "Sam".to_string()),
    ];
    assert_eq!(
        statement::where_clause(&filters),
        "[LastName] = @P1 AND [FirstName] = @P2"
    );
}

#[test]
fn preview_and_delete_statements_share_one_clause() {
    let qualified = statement::qualified_name("Payroll", "dbo", "Employees");
    let clause = statement::where_clause(&[("Name".to_string(), "Sam".to_string())]);

    assert_eq!(
        statement::select_where(&qualified, &clause),
        "SELECT * FROM [Payroll].[dbo].[Employees] WHERE [Name] = @P1"
    );
    assert_eq!(
        statement::delete_where(&qualified, &clause),
        "DELETE FROM [Payroll].[dbo].[Employees] WHERE [Name] = @P1"
    );
}

#[test]
fn payload_shape_survives_renderings() {
    let payload = employees();
    assert_eq!(payload.shape(), (3, 2));

    let rendered = payload.to_string();
    assert!(rendered.contains("(3 rows)"));

    let json = payload.to_json();
    assert_eq!(json.as_array().unwrap().len(), 3);
}
