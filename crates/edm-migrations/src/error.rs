//! Migration error types.

use edm_metadata::MetadataError;
use thiserror::Error;

/// Errors raised while diffing, generating or applying migrations.
///
/// Everything except [`MigrationError::Sqlite`] is raised before any
/// statement reaches the database.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// A source or target model is malformed.
    #[error("model validation failed: {0}")]
    ModelValidation(#[from] MetadataError),

    /// An automatic migration would discard data.
    #[error(
        "automatic migration {migration_id} was not applied because it would result in data loss: {}",
        operations.join(", ")
    )]
    AutomaticDataLoss {
        /// Id of the automatic migration.
        migration_id: String,
        /// The destructive operations, described.
        operations: Vec<String>,
    },

    /// An automatic migration would have to regenerate stored procedures.
    #[error(
        "automatic migration {migration_id} was not applied because it would change stored procedures that are no longer current"
    )]
    AutomaticStaleFunctions {
        /// Id of the automatic migration.
        migration_id: String,
    },

    /// The model changed but automatic migrations are turned off.
    #[error("pending model changes cannot be applied because automatic migrations are disabled")]
    AutomaticMigrationsDisabled,

    /// A foreign key references a principal whose key cannot be found.
    #[error(
        "foreign key on {dependent_table}({}) has no principal columns and the principal key could not be found",
        dependent_columns.join(", ")
    )]
    PartialForeignKeyOperation {
        /// The dependent table.
        dependent_table: String,
        /// The dependent columns.
        dependent_columns: Vec<String>,
    },

    /// The requested migration is not registered or applied.
    #[error("migration '{migration}' was not found")]
    MigrationNotFound {
        /// The id or name requested.
        migration: String,
    },

    /// A plan starting from a source migration would revert migrations.
    #[error("cannot script a downgrade from {from} to {to}")]
    DowngradeScript {
        /// The source migration requested.
        from: String,
        /// The resolved target id.
        to: String,
    },

    /// "AutomaticMigration" was passed as an update target.
    #[error("an automatic migration cannot be used as an update target")]
    AutoNotValidTarget,

    /// An operation has no inverse, so its migration cannot be reverted.
    #[error("migration {migration_id} cannot be reverted: {operation} has no inverse")]
    IrreversibleOperation {
        /// The migration being reverted.
        migration_id: String,
        /// The operation kind.
        operation: String,
    },

    /// The provider cannot express an operation.
    #[error("{provider} cannot generate SQL for {operation}")]
    UnsupportedOperation {
        /// The operation, described.
        operation: String,
        /// The provider name.
        provider: String,
    },

    /// No SQL generator is registered for a provider token.
    #[error("no SQL generator for provider '{provider}'")]
    UnknownProvider {
        /// The requested provider token.
        provider: String,
    },

    /// A migration id does not have the `{timestamp}_{name}` shape.
    #[error("'{id}' is not a valid migration id")]
    InvalidMigrationId {
        /// The rejected id.
        id: String,
    },

    /// Two registered migrations share an id.
    #[error("migration {id} is registered twice")]
    DuplicateMigration {
        /// The duplicated id.
        id: String,
    },

    /// History rows could not be read or decoded.
    #[error("history error: {0}")]
    History(String),

    /// The database rejected a statement.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl From<std::io::Error> for MigrationError {
    fn from(err: std::io::Error) -> Self {
        MigrationError::History(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offender() {
        let err = MigrationError::PartialForeignKeyOperation {
            dependent_table: "dbo.OrderLines".to_string(),
            dependent_columns: vec!["ProductId".to_string(), "Sku".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "foreign key on dbo.OrderLines(ProductId, Sku) has no principal columns and the principal key could not be found"
        );

        let err = MigrationError::AutomaticDataLoss {
            migration_id: "201501010000000_AutomaticMigration".to_string(),
            operations: vec!["DropTable dbo.Customers".to_string()],
        };
        assert!(err.to_string().contains("DropTable dbo.Customers"));
    }

    #[test]
    fn test_metadata_errors_convert() {
        let err: MigrationError = MetadataError::Serialization("bad".to_string()).into();
        assert!(matches!(err, MigrationError::ModelValidation(_)));
    }
}
