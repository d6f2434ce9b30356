// ABOUTME: Main library for mssql-manager
// ABOUTME: Module declarations and public re-exports

//! # mssql-manager
//!
//! A thin convenience layer for SQL Server table management. Each
//! operation opens a connection from an [`Endpoint`] plus
//! [`ConnectOptions`], performs one logical SQL action, and closes the
//! connection; the `*_with` variants run against a caller-owned
//! [`SqlSession`] instead.
//!
//! ```rust,no_run
//! use mssql_manager::{ops, ConnectOptions, Endpoint};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let endpoint = Endpoint::new("localhost", "Payroll");
//!     let options = ConnectOptions::default();
//!
//!     let employees =
//!         ops::import_table(&endpoint, &options, "dbo", "Employees", false).await?;
//!     println!("{}", employees);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod db;
pub mod models;
pub mod ops;

pub use config::{AppConfig, ConnectOptions, ConnectionProfile, ConfigError};
pub use db::{SqlServerError, SqlSession};
pub use models::{
    DataTable, Endpoint, IfExists, InvalidEndpoint, DEFAULT_COLUMN_TYPE, DEFAULT_SCHEMA,
};
