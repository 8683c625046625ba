//! Statement execution.

use crate::connection::DatabaseConnection;
use crate::sql::MigrationStatement;
use crate::Result;
use tracing::{debug, warn};

/// Runs the statements of one migration step in a single transaction.
///
/// Statements marked `suppress_transaction` commit whatever came before them
/// and run on their own; they are not undone if a later statement fails.
pub struct TransactionalExecutor<'c> {
    connection: &'c dyn DatabaseConnection,
}

impl<'c> TransactionalExecutor<'c> {
    pub fn new(connection: &'c dyn DatabaseConnection) -> Self {
        Self { connection }
    }

    /// Execute `statements` in order. On failure the open transaction is
    /// rolled back and the provider error returned unchanged.
    pub fn execute(&self, statements: &[MigrationStatement]) -> Result<()> {
        let mut in_transaction = false;
        for statement in statements {
            if statement.suppress_transaction {
                if in_transaction {
                    self.connection.commit()?;
                    in_transaction = false;
                }
                debug!(sql = %statement.sql, "Executing statement outside transaction");
                self.connection.execute(&statement.sql)?;
                continue;
            }

            if !in_transaction {
                self.connection.begin_transaction()?;
                in_transaction = true;
            }
            debug!(sql = %statement.sql, "Executing statement");
            if let Err(err) = self.connection.execute(&statement.sql) {
                if let Err(rollback) = self.connection.rollback() {
                    warn!(error = %rollback, "Rollback failed");
                }
                return Err(err);
            }
        }
        if in_transaction {
            self.connection.commit()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::SqliteConnection;
    use crate::model::DatabaseName;

    fn exists(connection: &SqliteConnection, table: &str) -> bool {
        connection.table_exists(&DatabaseName::parse(table)).unwrap()
    }

    #[test]
    fn test_failure_rolls_back_batch() {
        let connection = SqliteConnection::open_in_memory().unwrap();
        let statements = [
            MigrationStatement::new("CREATE TABLE \"Foo\" (\"Id\" INTEGER)"),
            MigrationStatement::new("CREATE TABLE \"Foo\" (\"Id\" INTEGER)"),
        ];
        assert!(TransactionalExecutor::new(&connection).execute(&statements).is_err());
        assert!(!exists(&connection, "Foo"));
    }

    #[test]
    fn test_suppressed_statement_survives_later_failure() {
        let connection = SqliteConnection::open_in_memory().unwrap();
        let statements = [
            MigrationStatement::new("CREATE TABLE \"Kept\" (\"Id\" INTEGER)").suppress_transaction(true),
            MigrationStatement::new("CREATE TABLE \"Lost\" (\"Id\" INTEGER)"),
            MigrationStatement::new("CREATE TABLE \"Lost\" (\"Id\" INTEGER)"),
        ];
        assert!(TransactionalExecutor::new(&connection).execute(&statements).is_err());
        assert!(exists(&connection, "Kept"));
        assert!(!exists(&connection, "Lost"));
    }

    #[test]
    fn test_success_commits() {
        let connection = SqliteConnection::open_in_memory().unwrap();
        let statements = [
            MigrationStatement::new("CREATE TABLE \"A\" (\"Id\" INTEGER)"),
            MigrationStatement::new("CREATE TABLE \"B\" (\"Id\" INTEGER)").suppress_transaction(true),
            MigrationStatement::new("CREATE TABLE \"C\" (\"Id\" INTEGER)"),
        ];
        TransactionalExecutor::new(&connection).execute(&statements).unwrap();
        assert!(exists(&connection, "A") && exists(&connection, "B") && exists(&connection, "C"));
    }
}
