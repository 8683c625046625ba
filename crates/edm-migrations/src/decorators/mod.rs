//! Decorators wrapping a migrator.
//!
//! A decorator implements [`MigratorBase`](crate::migrator::MigratorBase)
//! over an inner migrator and adds its own hooks to the ones it is given.
//! Decorators nest in any order.

pub mod logging;
pub mod scripting;

pub use logging::{LoggingDecorator, MigrationsLogger, TracingLogger};
pub use scripting::ScriptingDecorator;

use crate::migrator::MigrationHooks;
use crate::sql::MigrationStatement;
use crate::Result;

/// Outer hooks followed by a decorator's own.
///
/// Statements execute only if both layers agree.
pub(crate) struct LayeredHooks<'a> {
    outer: &'a mut dyn MigrationHooks,
    inner: &'a mut dyn MigrationHooks,
}

impl<'a> LayeredHooks<'a> {
    pub(crate) fn new(outer: &'a mut dyn MigrationHooks, inner: &'a mut dyn MigrationHooks) -> Self {
        Self { outer, inner }
    }
}

impl MigrationHooks for LayeredHooks<'_> {
    fn upgrading(&mut self, migration_ids: &[String]) {
        self.outer.upgrading(migration_ids);
        self.inner.upgrading(migration_ids);
    }

    fn downgrading(&mut self, migration_ids: &[String]) {
        self.outer.downgrading(migration_ids);
        self.inner.downgrading(migration_ids);
    }

    fn applying_migration(&mut self, migration_id: &str) {
        self.outer.applying_migration(migration_id);
        self.inner.applying_migration(migration_id);
    }

    fn reverting_migration(&mut self, migration_id: &str) {
        self.outer.reverting_migration(migration_id);
        self.inner.reverting_migration(migration_id);
    }

    fn auto_migrating(&mut self, migration_id: &str) {
        self.outer.auto_migrating(migration_id);
        self.inner.auto_migrating(migration_id);
    }

    fn executing_statements(&mut self, migration_id: &str, statements: &[MigrationStatement]) -> Result<bool> {
        let outer = self.outer.executing_statements(migration_id, statements)?;
        let inner = self.inner.executing_statements(migration_id, statements)?;
        Ok(outer && inner)
    }
}
