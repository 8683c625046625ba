//! Operation to SQL translation.
//!
//! Each provider implements [`MigrationSqlGenerator`]. Generators keep the
//! order of the operations they are given; the only reordering is within a
//! single operation's statements.

pub mod sqlite;
pub mod sqlserver;

use crate::error::MigrationError;
use crate::model::{DatabaseName, MigrationOperation};
use crate::Result;

pub use sqlite::SqliteMigrationSqlGenerator;
pub use sqlserver::SqlServerMigrationSqlGenerator;

/// Provider token of the SQL Server generator.
pub const SQL_SERVER_PROVIDER: &str = "System.Data.SqlClient";

/// Provider token of the SQLite generator.
pub const SQLITE_PROVIDER: &str = "System.Data.SQLite";

/// One statement ready to be executed or scripted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatement {
    pub sql: String,
    /// Execute outside the migration transaction.
    pub suppress_transaction: bool,
    /// Line written after this statement when scripting (`GO`).
    pub batch_terminator: Option<String>,
}

impl MigrationStatement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            suppress_transaction: false,
            batch_terminator: None,
        }
    }

    pub fn suppress_transaction(mut self, suppress: bool) -> Self {
        self.suppress_transaction = suppress;
        self
    }

    pub fn with_batch_terminator(mut self, terminator: impl Into<String>) -> Self {
        self.batch_terminator = Some(terminator.into());
        self
    }
}

/// Translates migration operations into provider SQL.
pub trait MigrationSqlGenerator: Send + Sync {
    /// Provider token this generator answers to.
    fn provider_name(&self) -> &'static str;

    /// Translate `operations`, in order.
    fn generate(&self, operations: &[MigrationOperation]) -> Result<Vec<MigrationStatement>>;

    fn quote_identifier(&self, identifier: &str) -> String;

    /// Quote a possibly schema-qualified table name.
    fn quote_table(&self, name: &DatabaseName) -> String;

    fn string_literal(&self, value: &str) -> String;

    fn binary_literal(&self, value: &[u8]) -> String;
}

/// The generator registered for `provider`.
pub fn generator_for(provider: &str) -> Result<Box<dyn MigrationSqlGenerator>> {
    match provider {
        SQL_SERVER_PROVIDER => Ok(Box::new(SqlServerMigrationSqlGenerator::new())),
        SQLITE_PROVIDER => Ok(Box::new(SqliteMigrationSqlGenerator::new())),
        _ => Err(MigrationError::UnknownProvider {
            provider: provider.to_string(),
        }),
    }
}

pub(crate) fn unsupported(operation: &MigrationOperation, provider: &str) -> MigrationError {
    MigrationError::UnsupportedOperation {
        operation: operation.to_string(),
        provider: provider.to_string(),
    }
}

/// `'value'` with embedded quotes doubled.
pub(crate) fn quoted_text(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_lookup() {
        assert_eq!(generator_for(SQLITE_PROVIDER).unwrap().provider_name(), SQLITE_PROVIDER);
        assert_eq!(
            generator_for(SQL_SERVER_PROVIDER).unwrap().provider_name(),
            SQL_SERVER_PROVIDER
        );
        assert!(matches!(
            generator_for("System.Data.Oracle"),
            Err(MigrationError::UnknownProvider { provider }) if provider == "System.Data.Oracle"
        ));
    }

    #[test]
    fn test_text_quoting() {
        assert_eq!(quoted_text("O'Brien"), "'O''Brien'");
    }
}
