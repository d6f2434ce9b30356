// ABOUTME: Database module exports for mssql-manager
// ABOUTME: Contains the tiberius session layer and SQL statement builders

pub mod sqlserver;
pub mod statement;

pub use sqlserver::{SqlServerError, SqlSession};
