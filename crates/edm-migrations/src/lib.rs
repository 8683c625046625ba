//! EDM Migrations - evolve a relational schema alongside an EDM store model.
//!
//! This crate provides:
//! - A model differ turning two store models into schema operations
//! - An operation model that can be inverted and serialized
//! - SQL generators for SQL Server and SQLite
//! - A migrator applying explicit and automatic migrations transactionally
//! - A history repository recording applied migrations and model snapshots
//! - Scripting and logging decorators, and a migration scaffolder
//!
//! # Example
//!
//! ```ignore
//! use edm_migrations::{DbMigrator, MigrationSet, MigrationsConfiguration, MigratorBase, SqliteConnection};
//!
//! let config = MigrationsConfiguration::new("Blogging").with_automatic_migrations(true);
//! let connection = SqliteConnection::open("blogging.db")?;
//! let mut migrator = DbMigrator::new(config, MigrationSet::new(), model, Box::new(connection))?;
//!
//! migrator.update(None)?;
//! assert!(migrator.pending_migrations()?.is_empty());
//! ```

pub mod config;
pub mod connection;
pub mod decorators;
pub mod differ;
pub mod error;
pub mod executor;
pub mod history;
pub mod migration;
pub mod migrator;
pub mod model;
pub mod scaffolder;
pub mod sql;

pub use config::{
    HistoryTableConfig, MigrationsConfiguration, DEFAULT_CONTEXT_KEY, DEFAULT_HISTORY_TABLE, DEFAULT_SCHEMA,
    INITIAL_DATABASE,
};
pub use connection::{DatabaseConnection, SqlValue, SqliteConnection};
pub use decorators::{LoggingDecorator, MigrationsLogger, ScriptingDecorator, TracingLogger};
pub use differ::EdmModelDiffer;
pub use error::MigrationError;
pub use executor::TransactionalExecutor;
pub use history::HistoryRepository;
pub use migration::{Migration, MigrationSet, AUTOMATIC_MIGRATION};
pub use migrator::{DbMigrator, MigrationHooks, MigratorBase, MigratorState, NoHooks};
pub use model::{ColumnModel, ColumnValue, DatabaseName, MigrationOperation};
pub use scaffolder::{MigrationScaffolder, ScaffoldedMigration};
pub use sql::{
    generator_for, MigrationSqlGenerator, MigrationStatement, SqlServerMigrationSqlGenerator,
    SqliteMigrationSqlGenerator, SQLITE_PROVIDER, SQL_SERVER_PROVIDER,
};

/// Result type for migration operations.
pub type Result<T> = std::result::Result<T, MigrationError>;
