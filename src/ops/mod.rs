// ABOUTME: Operation facade for mssql-manager
// ABOUTME: One-shot connection-per-call functions plus _with variants for caller-owned sessions

pub mod delete;
pub mod query;
pub mod tables;

pub use delete::{delete_rows, delete_rows_with};
pub use query::{
    custom_query, custom_query_with, execute_statement, execute_statement_with, import_table,
    import_table_with,
};
pub use tables::{
    create_table, create_table_with, drop_table, drop_table_with, populate_table,
    populate_table_with, truncate_table, truncate_table_with,
};
