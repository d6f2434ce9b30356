// ABOUTME: CLI front end for mssql-manager
// ABOUTME: Subcommands over the operation facade with table/CSV/JSON output

use std::io::{self, Write};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use mssql_manager::{
    ops, AppConfig, ConnectOptions, ConnectionProfile, DataTable, Endpoint, DEFAULT_SCHEMA,
};

/// SQL Server table management from the command line.
#[derive(Parser, Debug)]
#[command(name = "mssql-manager", version, about = "SQL Server table management toolkit")]
struct Cli {
    /// Target as server/database (server may be host,port). Overrides the
    /// configured profile's endpoint.
    #[arg(short = 'e', long = "endpoint")]
    endpoint: Option<String>,

    /// Named connection profile from the config file
    #[arg(long = "profile")]
    profile: Option<String>,

    /// SQL login username (overrides the profile)
    #[arg(short = 'U', long = "user")]
    user: Option<String>,

    /// SQL login password (overrides the profile)
    #[arg(short = 'P', long = "password")]
    password: Option<String>,

    /// Schema for table operations
    #[arg(short = 's', long = "schema", default_value = DEFAULT_SCHEMA)]
    schema: String,

    /// Output format: table, csv, json
    #[arg(long = "format", default_value = "table")]
    format: String,

    /// Print progress messages
    #[arg(long = "progress")]
    progress: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch all rows of a table
    Import { table: String },
    /// Run a SQL query and print the result set
    Query { sql: String },
    /// Execute a statement and print rows affected
    Exec { sql: String },
    /// Drop a table
    Drop { table: String },
    /// Truncate a table (removes all rows, keeps the schema)
    Truncate { table: String },
    /// Delete rows matching column=value filters, with preview and confirmation
    Delete {
        table: String,
        /// Equality filter, repeatable: -w Col=Value (AND-joined)
        #[arg(short = 'w', long = "where", value_name = "COL=VALUE")]
        filters: Vec<String>,
    },
    /// List configured connection profiles
    Profiles,
    /// Add or update a connection profile
    ProfileAdd {
        /// Profile key in the config file
        key: String,
        #[arg(long)]
        server: String,
        #[arg(long)]
        database: String,
        #[arg(long, default_value = "sa")]
        user: String,
        #[arg(long, default_value = "")]
        password: String,
        #[arg(long, default_value_t = 1433)]
        port: u16,
        /// Do not trust the server certificate
        #[arg(long)]
        no_trust_cert: bool,
        /// Make this the active profile
        #[arg(long)]
        activate: bool,
    },
    /// Set the active profile
    ProfileUse { key: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match &cli.command {
        Command::Profiles => return list_profiles(),
        Command::ProfileAdd { .. } => return add_profile(&cli.command),
        Command::ProfileUse { key } => return use_profile(key),
        _ => {}
    }

    let (endpoint, options) = resolve_connection(&cli)?;

    match &cli.command {
        Command::Import { table } => {
            let data =
                ops::import_table(&endpoint, &options, &cli.schema, table, cli.progress).await?;
            write_output(&data, &cli.format)?;
        }
        Command::Query { sql } => {
            let data = ops::custom_query(&endpoint, &options, sql).await?;
            write_output(&data, &cli.format)?;
        }
        Command::Exec { sql } => {
            let affected = ops::execute_statement(&endpoint, &options, sql).await?;
            println!("({} rows affected)", affected);
        }
        Command::Drop { table } => {
            ops::drop_table(&endpoint, &options, &cli.schema, table, cli.progress).await?;
        }
        Command::Truncate { table } => {
            ops::truncate_table(&endpoint, &options, &cli.schema, table, cli.progress).await?;
        }
        Command::Delete { table, filters } => {
            let filters = parse_filters(filters)?;
            ops::delete_rows(&endpoint, &options, &cli.schema, table, &filters).await?;
        }
        Command::Profiles | Command::ProfileAdd { .. } | Command::ProfileUse { .. } => {
            unreachable!("handled above")
        }
    }

    Ok(())
}

/// Resolve endpoint and connect options from the profile store and CLI
/// overrides.
fn resolve_connection(cli: &Cli) -> anyhow::Result<(Endpoint, ConnectOptions)> {
    let config = AppConfig::load().context("failed to load config")?;

    let profile = match &cli.profile {
        Some(key) => config.profile(key)?,
        None => config.active_profile()?,
    };
    let (mut endpoint, mut options) = profile.to_connection();

    if let Some(raw) = &cli.endpoint {
        endpoint = Endpoint::parse(raw)?;
    }
    if let Some(user) = &cli.user {
        options.username = user.clone();
    }
    if let Some(password) = &cli.password {
        options.password = password.clone();
    }

    Ok((endpoint, options))
}

fn list_profiles() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load config")?;
    let path = AppConfig::config_path()?;

    println!("Profiles in {}:", path.display());
    let mut keys: Vec<&String> = config.profiles.keys().collect();
    keys.sort();
    for key in keys {
        let p = &config.profiles[key];
        let marker = if *key == config.active_profile { "*" } else { " " };
        println!(
            "{} {:<16} {} / {} (user {})",
            marker, key, p.server, p.database, p.username
        );
    }
    Ok(())
}

fn add_profile(command: &Command) -> anyhow::Result<()> {
    let Command::ProfileAdd {
        key,
        server,
        database,
        user,
        password,
        port,
        no_trust_cert,
        activate,
    } = command
    else {
        unreachable!("caller matched ProfileAdd");
    };

    let mut config = AppConfig::load().context("failed to load config")?;
    config.set_profile(
        key.clone(),
        ConnectionProfile {
            name: key.clone(),
            server: server.clone(),
            database: database.clone(),
            username: user.clone(),
            password: password.clone(),
            port: *port,
            trust_certificate: !no_trust_cert,
        },
    );
    if *activate {
        config.active_profile = key.clone();
    }
    config.save().context("failed to save config")?;

    println!("Saved profile '{}'.", key);
    Ok(())
}

fn use_profile(key: &str) -> anyhow::Result<()> {
    let mut config = AppConfig::load().context("failed to load config")?;
    config.profile(key)?;
    config.active_profile = key.to_string();
    config.save().context("failed to save config")?;

    println!("Active profile is now '{}'.", key);
    Ok(())
}

/// Parse repeated `Col=Value` arguments into ordered filter pairs.
fn parse_filters(raw: &[String]) -> anyhow::Result<Vec<(String, String)>> {
    let mut filters = Vec::with_capacity(raw.len());
    for item in raw {
        match item.split_once('=') {
            Some((column, value)) if !column.is_empty() => {
                filters.push((column.to_string(), value.to_string()));
            }
            _ => bail!("invalid filter '{}': expected COL=VALUE", item),
        }
    }
    Ok(filters)
}

fn write_output(data: &DataTable, format: &str) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut writer = io::BufWriter::new(stdout.lock());

    match format {
        "csv" => write_csv(&mut writer, data)?,
        "json" => writeln!(writer, "{}", serde_json::to_string_pretty(&data.to_json())?)?,
        _ => write!(writer, "{}", data)?,
    }

    writer.flush()?;
    Ok(())
}

/// CSV with RFC-style quoting; NULL cells come out empty.
fn write_csv(writer: &mut dyn Write, data: &DataTable) -> io::Result<()> {
    writeln!(writer, "{}", data.columns.join(","))?;
    for row in &data.rows {
        let escaped: Vec<String> = row
            .iter()
            .map(|cell| match cell {
                Some(v) if v.contains(',') || v.contains('"') || v.contains('\n') => {
                    format!("\"{}\"", v.replace('"', "\"\""))
                }
                Some(v) => v.clone(),
                None => String::new(),
            })
            .collect();
        writeln!(writer, "{}", escaped.join(","))?;
    }
    Ok(())
}
