//! Database connections the migrator executes against.

use crate::model::DatabaseName;
use crate::sql::SQLITE_PROVIDER;
use crate::Result;
use rusqlite::types::ValueRef;
use std::path::Path;
use std::time::Duration;

/// A value read back from the database.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl SqlValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            SqlValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            SqlValue::Blob(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            SqlValue::Integer(value) => Some(*value),
            _ => None,
        }
    }
}

impl From<ValueRef<'_>> for SqlValue {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => SqlValue::Null,
            ValueRef::Integer(value) => SqlValue::Integer(value),
            ValueRef::Real(value) => SqlValue::Real(value),
            ValueRef::Text(text) => SqlValue::Text(String::from_utf8_lossy(text).into_owned()),
            ValueRef::Blob(bytes) => SqlValue::Blob(bytes.to_vec()),
        }
    }
}

/// A connection able to run migration SQL.
///
/// Transactions are explicit: the executor decides where batches begin and
/// end. Command timeouts are enforced by the connection, never by the
/// migrator.
pub trait DatabaseConnection {
    /// Provider token used to pick the SQL generator.
    fn provider_token(&self) -> &str;

    /// Execute one statement (or batch) without results.
    fn execute(&self, sql: &str) -> Result<()>;

    fn begin_transaction(&self) -> Result<()>;

    fn commit(&self) -> Result<()>;

    fn rollback(&self) -> Result<()>;

    /// Whether `table` exists. Providers without schemas ignore the schema.
    fn table_exists(&self, table: &DatabaseName) -> Result<bool>;

    /// Run a query and return every row.
    fn query(&self, sql: &str) -> Result<Vec<Vec<SqlValue>>>;

    fn set_command_timeout(&self, timeout: Duration) -> Result<()>;
}

/// A SQLite database accessed through rusqlite.
pub struct SqliteConnection {
    connection: rusqlite::Connection,
}

impl SqliteConnection {
    /// Open (or create) the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_connection(rusqlite::Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(rusqlite::Connection::open_in_memory()?)
    }

    /// Wrap an existing connection, enforcing foreign keys.
    pub fn from_connection(connection: rusqlite::Connection) -> Result<Self> {
        connection.pragma_update(None, "foreign_keys", true)?;
        Ok(Self { connection })
    }

    /// The underlying rusqlite connection.
    pub fn inner(&self) -> &rusqlite::Connection {
        &self.connection
    }
}

impl std::fmt::Debug for SqliteConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteConnection")
            .field("path", &self.connection.path())
            .finish()
    }
}

impl DatabaseConnection for SqliteConnection {
    fn provider_token(&self) -> &str {
        SQLITE_PROVIDER
    }

    fn execute(&self, sql: &str) -> Result<()> {
        self.connection.execute_batch(sql)?;
        Ok(())
    }

    fn begin_transaction(&self) -> Result<()> {
        self.execute("BEGIN")
    }

    fn commit(&self) -> Result<()> {
        self.execute("COMMIT")
    }

    fn rollback(&self) -> Result<()> {
        self.execute("ROLLBACK")
    }

    fn table_exists(&self, table: &DatabaseName) -> Result<bool> {
        let count: i64 = self.connection.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1 COLLATE NOCASE",
            [table.name()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn query(&self, sql: &str) -> Result<Vec<Vec<SqlValue>>> {
        let mut statement = self.connection.prepare(sql)?;
        let columns = statement.column_count();
        let mut rows = statement.query([])?;
        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(columns);
            for index in 0..columns {
                values.push(SqlValue::from(row.get_ref(index)?));
            }
            result.push(values);
        }
        Ok(result)
    }

    fn set_command_timeout(&self, timeout: Duration) -> Result<()> {
        self.connection.busy_timeout(timeout)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_and_table_exists() {
        let connection = SqliteConnection::open_in_memory().unwrap();
        connection
            .execute("CREATE TABLE \"Customers\" (\"Id\" INTEGER, \"Name\" TEXT, \"Photo\" BLOB)")
            .unwrap();
        connection
            .execute("INSERT INTO \"Customers\" VALUES (1, 'Ann', X'0102'), (2, NULL, NULL)")
            .unwrap();

        assert!(connection.table_exists(&DatabaseName::parse("dbo.customers")).unwrap());
        assert!(!connection.table_exists(&DatabaseName::parse("Orders")).unwrap());

        let rows = connection
            .query("SELECT \"Id\", \"Name\", \"Photo\" FROM \"Customers\" ORDER BY \"Id\"")
            .unwrap();
        assert_eq!(
            rows,
            vec![
                vec![
                    SqlValue::Integer(1),
                    SqlValue::Text("Ann".to_string()),
                    SqlValue::Blob(vec![1, 2])
                ],
                vec![SqlValue::Integer(2), SqlValue::Null, SqlValue::Null],
            ]
        );
    }

    #[test]
    fn test_rollback_discards_changes() {
        let connection = SqliteConnection::open_in_memory().unwrap();
        connection.begin_transaction().unwrap();
        connection.execute("CREATE TABLE \"Foo\" (\"Id\" INTEGER)").unwrap();
        connection.rollback().unwrap();
        assert!(!connection.table_exists(&DatabaseName::parse("Foo")).unwrap());
    }

    #[test]
    fn test_foreign_keys_enforced() {
        let connection = SqliteConnection::open_in_memory().unwrap();
        connection
            .execute(
                "CREATE TABLE \"P\" (\"Id\" INTEGER PRIMARY KEY);\n\
                 CREATE TABLE \"D\" (\"PId\" INTEGER REFERENCES \"P\" (\"Id\"));",
            )
            .unwrap();
        assert!(connection.execute("INSERT INTO \"D\" VALUES (7)").is_err());
    }
}
