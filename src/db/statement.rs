// ABOUTME: SQL statement construction for table operations
// ABOUTME: Bracket-quoted identifiers, literal escaping, and WHERE clause building

use crate::models::{DataTable, DEFAULT_COLUMN_TYPE};

/// Rows per INSERT statement. Matches the T-SQL limit on row constructors
/// in a single `INSERT ... VALUES`.
pub const INSERT_CHUNK_ROWS: usize = 1000;

/// SQL Server uses square brackets for identifier quoting.
pub fn quote_ident(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}

/// Single-quoted string literal with embedded quotes doubled.
pub fn quote_str(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Fully qualified `[database].[schema].[table]` name.
pub fn qualified_name(database: &str, schema: &str, table: &str) -> String {
    format!(
        "{}.{}.{}",
        quote_ident(database),
        quote_ident(schema),
        quote_ident(table)
    )
}

/// `CREATE TABLE` statement enumerating each payload column with its
/// override type, or the default text type when no override is given.
/// Override lookup is by exact column name; caller order is preserved
/// for columns, override order is irrelevant.
pub fn create_table(
    qualified: &str,
    columns: &[String],
    type_overrides: &[(String, String)],
) -> String {
    let defs: Vec<String> = columns
        .iter()
        .map(|col| {
            let column_type = type_overrides
                .iter()
                .find(|(name, _)| name == col)
                .map(|(_, ty)| ty.as_str())
                .unwrap_or(DEFAULT_COLUMN_TYPE);
            format!("{} {}", quote_ident(col), column_type)
        })
        .collect();

    format!("CREATE TABLE {} ({})", qualified, defs.join(", "))
}

/// Multi-row `INSERT ... VALUES` for one chunk of payload rows. Every cell
/// is written as a quoted text literal (NULL for missing cells); the server
/// converts into the column's declared type.
pub fn insert_chunk(qualified: &str, columns: &[String], rows: &[Vec<Option<String>>]) -> String {
    let column_list: Vec<String> = columns.iter().map(|c| quote_ident(c)).collect();

    let tuples: Vec<String> = rows
        .iter()
        .map(|row| {
            let values: Vec<String> = (0..columns.len())
                .map(|i| match row.get(i) {
                    Some(Some(value)) => quote_str(value),
                    _ => "NULL".to_string(),
                })
                .collect();
            format!("({})", values.join(", "))
        })
        .collect();

    format!(
        "INSERT INTO {} ({}) VALUES {}",
        qualified,
        column_list.join(", "),
        tuples.join(", ")
    )
}

/// AND-joined equality predicates against positional TDS parameters:
/// `[a] = @P1 AND [b] = @P2`. Values travel separately as parameters.
pub fn where_clause(filters: &[(String, String)]) -> String {
    filters
        .iter()
        .enumerate()
        .map(|(i, (column, _))| format!("{} = @P{}", quote_ident(column), i + 1))
        .collect::<Vec<_>>()
        .join(" AND ")
}

pub fn select_all(qualified: &str) -> String {
    format!("SELECT * FROM {}", qualified)
}

pub fn select_where(qualified: &str, clause: &str) -> String {
    format!("SELECT * FROM {} WHERE {}", qualified, clause)
}

pub fn delete_where(qualified: &str, clause: &str) -> String {
    format!("DELETE FROM {} WHERE {}", qualified, clause)
}

pub fn drop_table(qualified: &str) -> String {
    format!("DROP TABLE {}", qualified)
}

pub fn truncate_table(qualified: &str) -> String {
    format!("TRUNCATE TABLE {}", qualified)
}

/// Existence probe over INFORMATION_SCHEMA; schema and table names are
/// bound as @P1/@P2.
pub fn table_exists(database: &str) -> String {
    format!(
        "SELECT 1 FROM {}.INFORMATION_SCHEMA.TABLES WHERE TABLE_SCHEMA = @P1 AND TABLE_NAME = @P2",
        quote_ident(database)
    )
}

/// Split a payload into insert-sized chunks of rows.
pub fn chunked_rows(table: &DataTable) -> impl Iterator<Item = &[Vec<Option<String>>]> {
    table.rows.chunks(INSERT_CHUNK_ROWS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DataTable;

    #[test]
    fn test_quote_ident_doubles_closing_bracket() {
        assert_eq!(quote_ident("plain"), "[plain]");
        assert_eq!(quote_ident("odd]name"), "[odd]]name]");
    }

    #[test]
    fn test_quote_str_doubles_quotes() {
        assert_eq!(quote_str("Sam"), "'Sam'");
        assert_eq!(quote_str("I'Am"), "'I''Am'");
    }

    #[test]
    fn test_qualified_name() {
        assert_eq!(
            qualified_name("Payroll", "dbo", "Employees"),
            "[Payroll].[dbo].[Employees]"
        );
    }

    #[test]
    fn test_create_table_with_override() {
        let columns = vec!["Name".to_string(), "Age".to_string()];
        let overrides = vec![("Age".to_string(), "INT".to_string())];
        let sql = create_table("[Payroll].[dbo].[Employees]", &columns, &overrides);
        assert_eq!(
            sql,
            "CREATE TABLE [Payroll].[dbo].[Employees] \
             ([Name] NVARCHAR(255) NULL, [Age] INT)"
        );
    }

    #[test]
    fn test_create_table_all_defaults() {
        let columns = vec!["A".to_string(), "B".to_string()];
        let sql = create_table("[d].[dbo].[t]", &columns, &[]);
        assert_eq!(
            sql,
            "CREATE TABLE [d].[dbo].[t] ([A] NVARCHAR(255) NULL, [B] NVARCHAR(255) NULL)"
        );
    }

    #[test]
    fn test_insert_chunk_quotes_and_nulls() {
        let columns = vec!["Name".to_string(), "Age".to_string()];
        let rows = vec![
            vec![Some("Sam".to_string()), Some("29".to_string())],
            vec![Some("O'Hara".to_string()), None],
        ];
        let sql = insert_chunk("[d].[dbo].[t]", &columns, &rows);
        assert_eq!(
            sql,
            "INSERT INTO [d].[dbo].[t] ([Name], [Age]) \
             VALUES ('Sam', '29'), ('O''Hara', NULL)"
        );
    }

    #[test]
    fn test_insert_chunk_pads_short_rows_with_null() {
        let columns = vec!["A".to_string(), "B".to_string()];
        let rows = vec![vec![Some("1".to_string())]];
        let sql = insert_chunk("[d].[dbo].[t]", &columns, &rows);
        assert!(sql.ends_with("VALUES ('1', NULL)"));
    }

    #[test]
    fn test_where_clause_numbering_and_order() {
        let filters = vec![
            ("FirstName".to_string(), "Sam".to_string()),
            ("LastName".to_string(), "I Am".to_string()),
        ];
        assert_eq!(
            where_clause(&filters),
            "[FirstName] = @P1 AND [LastName] = @P2"
        );
    }

    #[test]
    fn test_select_and_delete_share_clause() {
        let clause = where_clause(&[("Id".to_string(), "7".to_string())]);
        assert_eq!(
            select_where("[d].[dbo].[t]", &clause),
            "SELECT * FROM [d].[dbo].[t] WHERE [Id] = @P1"
        );
        assert_eq!(
            delete_where("[d].[dbo].[t]", &clause),
            "DELETE FROM [d].[dbo].[t] WHERE [Id] = @P1"
        );
    }

    #[test]
    fn test_table_exists_probe() {
        let sql = table_exists("Payroll");
        assert!(sql.starts_with("SELECT 1 FROM [Payroll].INFORMATION_SCHEMA.TABLES"));
        assert!(sql.contains("@P1") && sql.contains("@P2"));
    }

    #[test]
    fn test_chunking() {
        let mut table = DataTable::new(vec!["A".to_string()]);
        for i in 0..2500 {
            table.push_row(vec![Some(i.to_string())]);
        }
        let sizes: Vec<usize> = chunked_rows(&table).map(|c| c.len()).collect();
        assert_eq!(sizes, vec![1000, 1000, 500]);
    }
}
