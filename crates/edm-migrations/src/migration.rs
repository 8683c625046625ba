//! Explicit migrations and their ids.
//!
//! A migration id is a 15 digit timestamp (`yyyyMMddHHmmssf`, the last digit
//! being tenths of a second) followed by `_` and the migration name. Ids sort
//! lexically in the order migrations were created.

use crate::error::MigrationError;
use crate::model::{inverse_all, MigrationOperation};
use crate::Result;
use chrono::Utc;
use edm_metadata::{DataSpace, EdmModel, MetadataError};

/// Name given to automatic migrations.
pub const AUTOMATIC_MIGRATION: &str = "AutomaticMigration";

const TIMESTAMP_LENGTH: usize = 15;

/// Whether `id` has the `yyyyMMddHHmmssf_Name` shape.
pub fn is_valid_migration_id(id: &str) -> bool {
    let bytes = id.as_bytes();
    bytes.len() > TIMESTAMP_LENGTH + 1
        && bytes[..TIMESTAMP_LENGTH].iter().all(u8::is_ascii_digit)
        && bytes[TIMESTAMP_LENGTH] == b'_'
}

/// The name part of a migration id, or `id` itself when it is not one.
pub fn migration_name(id: &str) -> &str {
    if is_valid_migration_id(id) {
        &id[TIMESTAMP_LENGTH + 1..]
    } else {
        id
    }
}

/// A new id for `name`, stamped with the current UTC time.
pub fn create_migration_id(name: &str) -> String {
    let now = Utc::now();
    format!(
        "{}{}_{}",
        now.format("%Y%m%d%H%M%S"),
        now.timestamp_subsec_millis() / 100,
        name
    )
}

/// A new automatic migration id sorting after `last`, the newest id known.
///
/// Two automatic migrations created within the same tenth of a second would
/// otherwise share an id.
pub fn next_automatic_migration_id(last: Option<&str>) -> String {
    let id = create_migration_id(AUTOMATIC_MIGRATION);
    let Some(timestamp) = last
        .filter(|last| id.as_str() <= *last)
        .and_then(|last| last.get(..TIMESTAMP_LENGTH))
        .and_then(|digits| digits.parse::<u64>().ok())
    else {
        return id;
    };
    format!(
        "{:0width$}_{}",
        timestamp + 1,
        AUTOMATIC_MIGRATION,
        width = TIMESTAMP_LENGTH
    )
}

/// Id of the automatic migration applied just before `migration_id`.
pub fn to_automatic_migration_id(migration_id: &str) -> Result<String> {
    let timestamp: u64 = migration_id
        .get(..TIMESTAMP_LENGTH)
        .filter(|_| is_valid_migration_id(migration_id))
        .and_then(|digits| digits.parse().ok())
        .ok_or_else(|| MigrationError::InvalidMigrationId {
            id: migration_id.to_string(),
        })?;
    Ok(format!(
        "{:0width$}_{}",
        timestamp.saturating_sub(1),
        AUTOMATIC_MIGRATION,
        width = TIMESTAMP_LENGTH
    ))
}

pub fn is_automatic_migration(migration_id: &str) -> bool {
    is_valid_migration_id(migration_id) && migration_name(migration_id) == AUTOMATIC_MIGRATION
}

/// An explicitly authored migration.
#[derive(Debug, Clone)]
pub struct Migration {
    id: String,
    up: Vec<MigrationOperation>,
    down: Vec<MigrationOperation>,
    target_model: EdmModel,
    source_model: Option<EdmModel>,
}

impl Migration {
    /// Create a migration producing `target_model`, a store model.
    pub fn new(id: impl Into<String>, target_model: EdmModel) -> Result<Self> {
        let id = id.into();
        if !is_valid_migration_id(&id) {
            return Err(MigrationError::InvalidMigrationId { id });
        }
        check_store_model(&target_model)?;
        Ok(Self {
            id,
            up: Vec::new(),
            down: Vec::new(),
            target_model,
            source_model: None,
        })
    }

    pub fn with_up(mut self, operations: Vec<MigrationOperation>) -> Self {
        self.up = operations;
        self
    }

    pub fn with_down(mut self, operations: Vec<MigrationOperation>) -> Self {
        self.down = operations;
        self
    }

    /// The model this migration was authored against. When the database is
    /// elsewhere, an automatic migration brings it here first.
    pub fn with_source_model(mut self, source_model: EdmModel) -> Result<Self> {
        check_store_model(&source_model)?;
        self.source_model = Some(source_model);
        Ok(self)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        migration_name(&self.id)
    }

    pub fn up(&self) -> &[MigrationOperation] {
        &self.up
    }

    pub fn down(&self) -> &[MigrationOperation] {
        &self.down
    }

    pub fn target_model(&self) -> &EdmModel {
        &self.target_model
    }

    pub fn source_model(&self) -> Option<&EdmModel> {
        self.source_model.as_ref()
    }

    /// Operations that revert this migration: the declared down operations,
    /// or the inverse of the up operations.
    pub fn down_operations(&self) -> Result<Vec<MigrationOperation>> {
        if !self.down.is_empty() {
            return Ok(self.down.clone());
        }
        inverse_all(&self.up).ok_or_else(|| {
            let operation = self
                .up
                .iter()
                .find(|operation| operation.inverse().is_none())
                .map(|operation| operation.kind_name().to_string())
                .unwrap_or_default();
            MigrationError::IrreversibleOperation {
                migration_id: self.id.clone(),
                operation,
            }
        })
    }
}

fn check_store_model(model: &EdmModel) -> Result<()> {
    if model.data_space() != DataSpace::SSpace {
        return Err(MetadataError::DataSpaceMismatch {
            identity: model.container().name().to_string(),
            expected: DataSpace::SSpace,
            actual: model.data_space(),
        }
        .into());
    }
    Ok(())
}

/// The ordered list of known migrations.
#[derive(Debug, Clone, Default)]
pub struct MigrationSet {
    migrations: Vec<Migration>,
}

impl MigrationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from migrations in any order.
    pub fn from_migrations(migrations: impl IntoIterator<Item = Migration>) -> Result<Self> {
        let mut set = Self::new();
        for migration in migrations {
            set.add(migration)?;
        }
        Ok(set)
    }

    /// Register a migration, keeping the set sorted by id.
    pub fn add(&mut self, migration: Migration) -> Result<()> {
        match self.migrations.binary_search_by(|m| m.id.as_str().cmp(&migration.id)) {
            Ok(_) => Err(MigrationError::DuplicateMigration { id: migration.id }),
            Err(position) => {
                self.migrations.insert(position, migration);
                Ok(())
            }
        }
    }

    pub fn with(mut self, migration: Migration) -> Result<Self> {
        self.add(migration)?;
        Ok(self)
    }

    pub fn get(&self, id: &str) -> Option<&Migration> {
        self.migrations.iter().find(|m| m.id == id)
    }

    /// Look up by full id, or by name.
    pub fn find(&self, id_or_name: &str) -> Option<&Migration> {
        self.get(id_or_name).or_else(|| {
            self.migrations
                .iter()
                .find(|m| m.name().eq_ignore_ascii_case(id_or_name))
        })
    }

    pub fn ids(&self) -> Vec<String> {
        self.migrations.iter().map(|m| m.id.clone()).collect()
    }

    pub fn last(&self) -> Option<&Migration> {
        self.migrations.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Migration> {
        self.migrations.iter()
    }

    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }
}

impl<'a> IntoIterator for &'a MigrationSet {
    type Item = &'a Migration;
    type IntoIter = std::slice::Iter<'a, Migration>;

    fn into_iter(self) -> Self::IntoIter {
        self.migrations.iter()
    }
}
