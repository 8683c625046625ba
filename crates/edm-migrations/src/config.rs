//! Migrations configuration.

use crate::model::DatabaseName;
use std::time::Duration;

/// Default database schema for tables without an explicit schema.
pub const DEFAULT_SCHEMA: &str = "dbo";

/// Default name of the migration history table.
pub const DEFAULT_HISTORY_TABLE: &str = "__MigrationHistory";

/// Update target that reverts every migration.
pub const INITIAL_DATABASE: &str = "0";

/// Default context key recorded in history rows.
pub const DEFAULT_CONTEXT_KEY: &str = "DefaultContext";

/// Product version written to history rows.
pub const PRODUCT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Location of the migration history table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryTableConfig {
    /// Schema of the table.
    pub schema: String,
    /// Table name.
    pub table: String,
}

impl HistoryTableConfig {
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
        }
    }

    /// Schema-qualified table name.
    pub fn database_name(&self) -> DatabaseName {
        DatabaseName::new(Some(self.schema.clone()), self.table.clone())
    }
}

impl Default for HistoryTableConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SCHEMA, DEFAULT_HISTORY_TABLE)
    }
}

/// Configuration for a migrator.
#[derive(Debug, Clone)]
pub struct MigrationsConfiguration {
    /// Identity of the owning context; separates contexts sharing one history table.
    pub context_key: String,

    /// Whether model changes not covered by explicit migrations are applied automatically.
    pub automatic_migrations_enabled: bool,

    /// Whether automatic migrations may drop tables, columns or narrow columns.
    pub automatic_migration_data_loss_allowed: bool,

    /// SQL generator to use. None selects the connection's provider.
    pub provider_token: Option<String>,

    /// Schema for tables that do not name one.
    pub default_schema: String,

    /// Version string written to history rows.
    pub product_version: String,

    /// History table location.
    pub history_table: HistoryTableConfig,

    /// Command timeout handed to the connection. The engine never enforces it.
    pub command_timeout: Option<Duration>,
}

impl MigrationsConfiguration {
    /// Create a configuration for the given context key.
    pub fn new(context_key: impl Into<String>) -> Self {
        Self {
            context_key: context_key.into(),
            automatic_migrations_enabled: false,
            automatic_migration_data_loss_allowed: false,
            provider_token: None,
            default_schema: DEFAULT_SCHEMA.to_string(),
            product_version: PRODUCT_VERSION.to_string(),
            history_table: HistoryTableConfig::default(),
            command_timeout: None,
        }
    }

    /// Enable automatic migrations.
    pub fn with_automatic_migrations(mut self, enabled: bool) -> Self {
        self.automatic_migrations_enabled = enabled;
        self
    }

    /// Allow automatic migrations to lose data.
    pub fn with_data_loss_allowed(mut self, allowed: bool) -> Self {
        self.automatic_migration_data_loss_allowed = allowed;
        self
    }

    /// Select the SQL generator by provider token.
    pub fn with_provider(mut self, provider_token: impl Into<String>) -> Self {
        self.provider_token = Some(provider_token.into());
        self
    }

    pub fn with_default_schema(mut self, schema: impl Into<String>) -> Self {
        self.default_schema = schema.into();
        self
    }

    pub fn with_product_version(mut self, version: impl Into<String>) -> Self {
        self.product_version = version.into();
        self
    }

    /// Set the history table location.
    pub fn with_history_table(mut self, history_table: HistoryTableConfig) -> Self {
        self.history_table = history_table;
        self
    }

    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = Some(timeout);
        self
    }
}

impl Default for MigrationsConfiguration {
    fn default() -> Self {
        Self::new(DEFAULT_CONTEXT_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MigrationsConfiguration::default();
        assert_eq!(config.context_key, DEFAULT_CONTEXT_KEY);
        assert!(!config.automatic_migrations_enabled);
        assert!(!config.automatic_migration_data_loss_allowed);
        assert_eq!(config.history_table.database_name().to_string(), "dbo.__MigrationHistory");
        assert!(config.command_timeout.is_none());
    }

    #[test]
    fn test_builder_chain() {
        let config = MigrationsConfiguration::new("Shop")
            .with_automatic_migrations(true)
            .with_data_loss_allowed(true)
            .with_provider("SqlServer")
            .with_history_table(HistoryTableConfig::new("audit", "History"))
            .with_command_timeout(Duration::from_secs(5));

        assert!(config.automatic_migrations_enabled);
        assert!(config.automatic_migration_data_loss_allowed);
        assert_eq!(config.provider_token.as_deref(), Some("SqlServer"));
        assert_eq!(config.history_table.database_name().to_string(), "audit.History");
        assert_eq!(config.command_timeout, Some(Duration::from_secs(5)));
    }
}
