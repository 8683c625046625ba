//! Scaffold new explicit migrations from model changes.

use crate::migration::{create_migration_id, Migration};
use crate::migrator::{DbMigrator, MigratorBase};
use crate::model::MigrationOperation;
use crate::Result;
use edm_metadata::{DataSpace, EdmModel};
use serde::{Deserialize, Serialize};
use tracing::info;

/// A migration generated from the difference between two models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaffoldedMigration {
    pub migration_id: String,
    pub up: Vec<MigrationOperation>,
    pub down: Vec<MigrationOperation>,
    pub target_model: EdmModel,
    pub source_model: EdmModel,
}

impl ScaffoldedMigration {
    /// Whether the models were already equivalent.
    pub fn is_empty(&self) -> bool {
        self.up.is_empty()
    }

    /// Turn the scaffold into a migration ready for registration.
    pub fn into_migration(self) -> Result<Migration> {
        Migration::new(self.migration_id, self.target_model)?
            .with_up(self.up)
            .with_down(self.down)
            .with_source_model(self.source_model)
    }
}

/// Generates the next explicit migration for a migrator's current model.
#[derive(Debug)]
pub struct MigrationScaffolder<'m> {
    migrator: &'m DbMigrator,
}

impl<'m> MigrationScaffolder<'m> {
    pub fn new(migrator: &'m DbMigrator) -> Self {
        Self { migrator }
    }

    /// Scaffold a migration called `name` covering every change since the
    /// last applied migration, or since the last registered one when
    /// migrations are still pending.
    pub fn scaffold(&self, name: &str) -> Result<ScaffoldedMigration> {
        let source_model = self.source_model()?;
        let current = self.migrator.current_model();
        let differ = self.migrator.differ();

        let scaffolded = ScaffoldedMigration {
            migration_id: create_migration_id(name),
            up: differ.diff(&source_model, current)?,
            down: differ.diff(current, &source_model)?,
            target_model: current.clone(),
            source_model,
        };
        info!(
            migration_id = %scaffolded.migration_id,
            operations = scaffolded.up.len(),
            "Scaffolded migration"
        );
        Ok(scaffolded)
    }

    fn source_model(&self) -> Result<EdmModel> {
        if self.migrator.pending_migrations()?.is_empty() {
            if let Some((_, model)) = self.migrator.history().get_last_model(self.migrator.connection())? {
                return Ok(model);
            }
        } else if let Some(migration) = self.migrator.migrations().last() {
            return Ok(migration.target_model().clone());
        }
        Ok(EdmModel::empty(DataSpace::SSpace)?)
    }
}
