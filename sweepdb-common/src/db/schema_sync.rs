//! Automatic schema synchronization
//!
//! Each catalog table declares its expected columns in code. On startup (and
//! at the start of every sync run) missing columns are added with
//! `ALTER TABLE ... ADD COLUMN`, which makes schema evolution additive and
//! idempotent: running it against an up-to-date database is a no-op.
//!
//! Table creation itself stays with `CREATE TABLE IF NOT EXISTS` in
//! [`crate::db::init`]; this module only fills in columns added later.
//!
//! What cannot be fixed automatically (type or constraint changes) is
//! reported as [`SchemaDrift`] and logged, never applied.
//!
//! Everything here runs on a single connection so callers can evolve the
//! schema inside their own transaction; SQLite rolls `ALTER TABLE` back with
//! the rest of it.

use crate::Result;
use sqlx::{Row, SqliteConnection};
use tracing::{debug, info, warn};

/// Column definition with SQL constraints
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: String,
    /// SQL type (e.g., "TEXT", "INTEGER", "REAL", "TIMESTAMP")
    pub sql_type: String,
    pub not_null: bool,
    pub primary_key: bool,
    pub default_value: Option<String>,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            not_null: false,
            primary_key: false,
            default_value: None,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Set DEFAULT value (raw SQL, e.g. `'json'` or `CURRENT_TIMESTAMP`)
    pub fn default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// `ALTER TABLE ADD COLUMN` clause for this column
    ///
    /// SQLite cannot add PRIMARY KEY columns, and NOT NULL only with a DEFAULT;
    /// those constraints are dropped with a warning.
    fn add_column_sql(&self, table: &str) -> String {
        let mut sql = format!("ALTER TABLE {} ADD COLUMN {} {}", table, self.name, self.sql_type);

        if self.primary_key {
            warn!(
                "Cannot add PRIMARY KEY column {}.{} via ALTER TABLE; adding without constraint",
                table, self.name
            );
        }

        match (&self.default_value, self.not_null) {
            (Some(default), true) => sql.push_str(&format!(" NOT NULL DEFAULT {}", default)),
            (Some(default), false) => sql.push_str(&format!(" DEFAULT {}", default)),
            (None, true) => warn!(
                "Cannot add NOT NULL column {}.{} without DEFAULT; column will be nullable",
                table, self.name
            ),
            (None, false) => {}
        }

        sql
    }
}

/// Column as reported by `PRAGMA table_info`
#[derive(Debug, Clone)]
pub struct ActualColumn {
    pub cid: i32,
    pub name: String,
    pub type_name: String,
    pub not_null: bool,
    pub default_value: Option<String>,
    pub pk: bool,
}

/// Difference between declared and actual schema
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaDrift {
    /// Column missing from database (auto-fixable)
    MissingColumn { table: String, column: ColumnDefinition },
    /// Column type differs in affinity (manual migration required)
    TypeMismatch {
        table: String,
        column: String,
        expected: String,
        actual: String,
    },
}

/// Declared schema for one catalog table
pub trait TableSchema {
    fn table_name() -> &'static str;

    /// Expected columns, including those added after the table was first created
    fn expected_columns() -> Vec<ColumnDefinition>;
}

/// Read actual columns via `PRAGMA table_info`, ordered by cid
pub async fn introspect_table(conn: &mut SqliteConnection, table_name: &str) -> Result<Vec<ActualColumn>> {
    let rows = sqlx::query(&format!("PRAGMA table_info({})", table_name))
        .fetch_all(&mut *conn)
        .await?;

    let mut columns: Vec<ActualColumn> = rows
        .iter()
        .map(|row| ActualColumn {
            cid: row.get("cid"),
            name: row.get("name"),
            type_name: row.get("type"),
            not_null: row.get::<i32, _>("notnull") != 0,
            default_value: row.get("dflt_value"),
            pk: row.get::<i32, _>("pk") != 0,
        })
        .collect();

    columns.sort_by_key(|c| c.cid);
    Ok(columns)
}

pub async fn table_exists(conn: &mut SqliteConnection, table_name: &str) -> Result<bool> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?)",
    )
    .bind(table_name)
    .fetch_one(&mut *conn)
    .await?;

    Ok(exists)
}

/// Compare declared columns against the database
pub fn compare(table_name: &str, expected: &[ColumnDefinition], actual: &[ActualColumn]) -> Vec<SchemaDrift> {
    expected
        .iter()
        .filter_map(|col| match actual.iter().find(|a| a.name == col.name) {
            None => Some(SchemaDrift::MissingColumn {
                table: table_name.to_string(),
                column: col.clone(),
            }),
            Some(a) if affinity(&col.sql_type) != affinity(&a.type_name) => Some(SchemaDrift::TypeMismatch {
                table: table_name.to_string(),
                column: col.name.clone(),
                expected: col.sql_type.clone(),
                actual: a.type_name.clone(),
            }),
            Some(_) => None,
        })
        .collect()
}

/// SQLite type affinity for a declared type name (section 3.1 of the SQLite docs)
fn affinity(type_name: &str) -> &'static str {
    let t = type_name.to_uppercase();
    if t.contains("INT") {
        "INTEGER"
    } else if t.contains("CHAR") || t.contains("CLOB") || t.contains("TEXT") {
        "TEXT"
    } else if t.contains("REAL") || t.contains("FLOA") || t.contains("DOUB") {
        "REAL"
    } else if t.is_empty() || t.contains("BLOB") {
        "BLOB"
    } else {
        "NUMERIC"
    }
}

/// Add every missing declared column to `T`'s table
///
/// Returns the names of the columns that were added.
pub async fn sync_table<T: TableSchema>(conn: &mut SqliteConnection) -> Result<Vec<String>> {
    let table = T::table_name();

    if !table_exists(conn, table).await? {
        warn!("Schema sync: table '{}' does not exist, skipping", table);
        return Ok(Vec::new());
    }

    let actual = introspect_table(conn, table).await?;
    let mut added = Vec::new();

    for drift in compare(table, &T::expected_columns(), &actual) {
        match drift {
            SchemaDrift::MissingColumn { table, column } => {
                if add_column(conn, &table, &column).await? {
                    added.push(column.name);
                }
            }
            SchemaDrift::TypeMismatch {
                table,
                column,
                expected,
                actual,
            } => {
                warn!(
                    "Type mismatch in {}.{}: expected '{}', found '{}'. Manual migration required.",
                    table, column, expected, actual
                );
            }
        }
    }

    if added.is_empty() {
        debug!("Schema up to date for '{}'", table);
    }

    Ok(added)
}

/// Returns false when another connection added the column first
async fn add_column(conn: &mut SqliteConnection, table: &str, column: &ColumnDefinition) -> Result<bool> {
    info!("Adding column: {}.{} ({})", table, column.name, column.sql_type);

    match sqlx::query(&column.add_column_sql(table)).execute(&mut *conn).await {
        Ok(_) => Ok(true),
        Err(sqlx::Error::Database(db_err)) if db_err.message().contains("duplicate column") => {
            info!("Column {}.{} already added concurrently", table, column.name);
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}
