//! Migration history repository.
//!
//! The history table records which migrations have been applied, together
//! with a compressed snapshot of the store model each one produced. Several
//! contexts may share one table; every read and write is scoped to this
//! repository's context key.

use crate::config::{MigrationsConfiguration, INITIAL_DATABASE};
use crate::connection::{DatabaseConnection, SqlValue};
use crate::error::MigrationError;
use crate::model::{DatabaseName, HistoryCommand, HistoryOperation, HistoryRow, MigrationOperation};
use crate::sql::MigrationSqlGenerator;
use crate::Result;
use edm_metadata::{DataSpace, EdmModel, EdmProperty, EntitySet, EntityType, MaxLength, PrimitiveTypeKind};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{Read, Write};
use std::sync::Arc;
use tracing::debug;

/// Namespace of the history entity type.
const HISTORY_NAMESPACE: &str = "CodeFirstDatabaseSchema";

pub const MIGRATION_ID_MAX_LENGTH: u32 = 150;
pub const CONTEXT_KEY_MAX_LENGTH: u32 = 300;
pub const PRODUCT_VERSION_MAX_LENGTH: u32 = 32;

/// Gzip-compress the JSON document of `model`.
pub fn compress_model(model: &EdmModel) -> Result<Vec<u8>> {
    let json = model.to_json()?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(json.as_bytes())?;
    Ok(encoder.finish()?)
}

/// Inverse of [`compress_model`].
pub fn decompress_model(bytes: &[u8]) -> Result<EdmModel> {
    let mut json = String::new();
    GzDecoder::new(bytes).read_to_string(&mut json)?;
    Ok(EdmModel::from_json(&json)?)
}

/// Reads and writes the migration history table for one context.
pub struct HistoryRepository {
    table: DatabaseName,
    context_key: String,
    product_version: String,
    generator: Arc<dyn MigrationSqlGenerator>,
}

impl std::fmt::Debug for HistoryRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryRepository")
            .field("table", &self.table)
            .field("context_key", &self.context_key)
            .field("provider", &self.generator.provider_name())
            .finish()
    }
}

impl HistoryRepository {
    pub fn new(
        table: DatabaseName,
        context_key: impl Into<String>,
        product_version: impl Into<String>,
        generator: Arc<dyn MigrationSqlGenerator>,
    ) -> Self {
        Self {
            table,
            context_key: context_key.into(),
            product_version: product_version.into(),
            generator,
        }
    }

    pub fn from_config(config: &MigrationsConfiguration, generator: Arc<dyn MigrationSqlGenerator>) -> Self {
        Self::new(
            config.history_table.database_name(),
            config.context_key.clone(),
            config.product_version.clone(),
            generator,
        )
    }

    pub fn table(&self) -> &DatabaseName {
        &self.table
    }

    pub fn context_key(&self) -> &str {
        &self.context_key
    }

    /// Store model containing only the history table.
    pub fn history_model(&self) -> Result<EdmModel> {
        let bounded = |name: &str, length: u32| {
            EdmProperty::required(name, PrimitiveTypeKind::String).with_max_length(MaxLength::Fixed(length))
        };
        let entity = EntityType::builder(HISTORY_NAMESPACE, "HistoryRow", DataSpace::SSpace)
            .key_property(bounded("MigrationId", MIGRATION_ID_MAX_LENGTH))
            .key_property(bounded("ContextKey", CONTEXT_KEY_MAX_LENGTH))
            .property(EdmProperty::required("Model", PrimitiveTypeKind::Binary).with_max_length(MaxLength::Max))
            .property(bounded("ProductVersion", PRODUCT_VERSION_MAX_LENGTH))
            .build()?;
        let mut set = EntitySet::new("HistoryRows", entity.identity()).with_table(self.table.name());
        if let Some(schema) = self.table.schema() {
            set = set.with_schema(schema);
        }
        Ok(EdmModel::builder(DataSpace::SSpace)?
            .with_item(entity)?
            .with_entity_set(set)?
            .build()?)
    }

    pub fn exists(&self, connection: &dyn DatabaseConnection) -> Result<bool> {
        connection.table_exists(&self.table)
    }

    /// Applied migration ids, oldest first.
    pub fn get_migrations(&self, connection: &dyn DatabaseConnection) -> Result<Vec<String>> {
        if !self.exists(connection)? {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {id} FROM {table} WHERE {key} = {value} ORDER BY {id}",
            id = self.column("MigrationId"),
            table = self.quoted_table(),
            key = self.column("ContextKey"),
            value = self.generator.string_literal(&self.context_key),
        );
        connection.query(&sql)?.iter().map(|row| text(row, 0)).collect()
    }

    /// Local migrations not recorded in the history table, in local order.
    pub fn get_pending(&self, connection: &dyn DatabaseConnection, local: &[String]) -> Result<Vec<String>> {
        let applied = self.get_migrations(connection)?;
        Ok(local
            .iter()
            .filter(|id| !applied.iter().any(|applied| applied == *id))
            .cloned()
            .collect())
    }

    /// Applied migrations after `migration_id`, newest first. `"0"` returns
    /// every applied migration.
    pub fn get_migrations_since(&self, connection: &dyn DatabaseConnection, migration_id: &str) -> Result<Vec<String>> {
        let mut applied = self.get_migrations(connection)?;
        if migration_id != INITIAL_DATABASE {
            applied.retain(|id| id.as_str() > migration_id);
        }
        applied.reverse();
        Ok(applied)
    }

    /// The most recent migration and its model.
    pub fn get_last_model(&self, connection: &dyn DatabaseConnection) -> Result<Option<(String, EdmModel)>> {
        let Some(last) = self.get_migrations(connection)?.pop() else {
            return Ok(None);
        };
        Ok(self.get_model(connection, &last)?.map(|model| (last, model)))
    }

    /// The model recorded for `migration_id`.
    pub fn get_model(&self, connection: &dyn DatabaseConnection, migration_id: &str) -> Result<Option<EdmModel>> {
        if !self.exists(connection)? {
            return Ok(None);
        }
        let sql = format!(
            "SELECT {model} FROM {table} WHERE {id} = {id_value} AND {key} = {value}",
            model = self.column("Model"),
            table = self.quoted_table(),
            id = self.column("MigrationId"),
            id_value = self.generator.string_literal(migration_id),
            key = self.column("ContextKey"),
            value = self.generator.string_literal(&self.context_key),
        );
        connection.query(&sql)?.first().map(|row| model(row, 0)).transpose()
    }

    /// Whether other contexts also record migrations in this table.
    pub fn is_shared(&self, connection: &dyn DatabaseConnection) -> Result<bool> {
        if !self.exists(connection)? {
            return Ok(false);
        }
        let sql = format!(
            "SELECT COUNT(*) FROM {table} WHERE {key} <> {value}",
            table = self.quoted_table(),
            key = self.column("ContextKey"),
            value = self.generator.string_literal(&self.context_key),
        );
        let rows = connection.query(&sql)?;
        let count = rows.first().and_then(|row| row.first()).and_then(SqlValue::as_integer).unwrap_or(0);
        debug!(table = %self.table, others = count, "Checked history table sharing");
        Ok(count > 0)
    }

    /// Records `migration_id` with a snapshot of `model`.
    pub fn create_insert_operation(&self, migration_id: &str, model: &EdmModel) -> Result<MigrationOperation> {
        Ok(MigrationOperation::History(HistoryOperation {
            table: self.table.to_string(),
            command: HistoryCommand::Insert(HistoryRow {
                migration_id: migration_id.to_string(),
                context_key: self.context_key.clone(),
                model: compress_model(model)?,
                product_version: self.product_version.clone(),
            }),
        }))
    }

    pub fn create_delete_operation(&self, migration_id: &str) -> MigrationOperation {
        MigrationOperation::History(HistoryOperation {
            table: self.table.to_string(),
            command: HistoryCommand::Delete {
                migration_id: migration_id.to_string(),
                context_key: self.context_key.clone(),
            },
        })
    }

    fn quoted_table(&self) -> String {
        self.generator.quote_table(&self.table)
    }

    fn column(&self, name: &str) -> String {
        self.generator.quote_identifier(name)
    }
}

fn text(row: &[SqlValue], index: usize) -> Result<String> {
    row.get(index)
        .and_then(SqlValue::as_text)
        .map(str::to_string)
        .ok_or_else(|| MigrationError::History(format!("column {index} of a history row is not text")))
}

fn model(row: &[SqlValue], index: usize) -> Result<EdmModel> {
    let bytes = row
        .get(index)
        .and_then(SqlValue::as_blob)
        .ok_or_else(|| MigrationError::History(format!("column {index} of a history row is not binary")))?;
    decompress_model(bytes)
}
