//! Report migrator progress to a logger.

use crate::decorators::LayeredHooks;
use crate::migrator::{MigrationHooks, MigratorBase};
use crate::sql::MigrationStatement;
use crate::Result;
use tracing::{debug, info, warn};

/// Receives migrator progress messages.
pub trait MigrationsLogger {
    fn info(&self, message: &str);

    fn warning(&self, message: &str);

    /// Detail such as the SQL being executed.
    fn verbose(&self, message: &str);
}

/// Logger forwarding to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl MigrationsLogger for TracingLogger {
    fn info(&self, message: &str) {
        info!(target: "edm_migrations", "{message}");
    }

    fn warning(&self, message: &str) {
        warn!(target: "edm_migrations", "{message}");
    }

    fn verbose(&self, message: &str) {
        debug!(target: "edm_migrations", "{message}");
    }
}

struct LogWriter<'a> {
    logger: &'a dyn MigrationsLogger,
}

impl MigrationHooks for LogWriter<'_> {
    fn upgrading(&mut self, migration_ids: &[String]) {
        self.logger
            .info(&format!("Applying explicit migrations: [{}].", migration_ids.join(", ")));
    }

    fn downgrading(&mut self, migration_ids: &[String]) {
        self.logger
            .info(&format!("Reverting migrations: [{}].", migration_ids.join(", ")));
    }

    fn applying_migration(&mut self, migration_id: &str) {
        self.logger
            .info(&format!("Applying explicit migration: {migration_id}."));
    }

    fn reverting_migration(&mut self, migration_id: &str) {
        self.logger.info(&format!("Reverting migration: {migration_id}."));
    }

    fn auto_migrating(&mut self, migration_id: &str) {
        self.logger
            .info(&format!("Applying automatic migration: {migration_id}."));
    }

    fn executing_statements(&mut self, migration_id: &str, statements: &[MigrationStatement]) -> Result<bool> {
        for statement in statements {
            if statement.suppress_transaction {
                self.logger.warning(&format!(
                    "Statement in {migration_id} runs outside the migration transaction."
                ));
            }
            self.logger.verbose(&statement.sql);
        }
        Ok(true)
    }
}

/// A migrator that logs what it does.
pub struct LoggingDecorator<M> {
    inner: M,
    logger: Box<dyn MigrationsLogger>,
}

impl<M: MigratorBase> LoggingDecorator<M> {
    /// Log through `tracing`.
    pub fn new(inner: M) -> Self {
        Self::with_logger(inner, Box::new(TracingLogger))
    }

    pub fn with_logger(inner: M, logger: Box<dyn MigrationsLogger>) -> Self {
        Self { inner, logger }
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut M {
        &mut self.inner
    }

    pub fn into_inner(self) -> M {
        self.inner
    }
}

impl<M: MigratorBase> MigratorBase for LoggingDecorator<M> {
    fn update_from_with(
        &mut self,
        source: Option<&str>,
        target: Option<&str>,
        hooks: &mut dyn MigrationHooks,
    ) -> Result<()> {
        if let Some(source) = source {
            self.logger.info(&format!("Source migration: {source}."));
        }
        match target {
            Some(target) => self.logger.info(&format!("Target migration: {target}.")),
            None => self.logger.info("Target migration: current model."),
        }
        let mut writer = LogWriter {
            logger: self.logger.as_ref(),
        };
        let mut layered = LayeredHooks::new(hooks, &mut writer);
        let result = self.inner.update_from_with(source, target, &mut layered);
        if let Err(err) = &result {
            self.logger.warning(&format!("Update failed: {err}"));
        }
        result
    }

    fn local_migrations(&self) -> Vec<String> {
        self.inner.local_migrations()
    }

    fn database_migrations(&self) -> Result<Vec<String>> {
        self.inner.database_migrations()
    }

    fn pending_migrations(&self) -> Result<Vec<String>> {
        self.inner.pending_migrations()
    }
}

impl<M: std::fmt::Debug> std::fmt::Debug for LoggingDecorator<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggingDecorator").field("inner", &self.inner).finish()
    }
}
