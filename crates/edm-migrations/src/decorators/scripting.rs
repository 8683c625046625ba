//! Produce the SQL of an update without running it.

use crate::decorators::LayeredHooks;
use crate::migrator::{MigrationHooks, MigratorBase, NoHooks};
use crate::sql::MigrationStatement;
use crate::Result;

/// Collects statements instead of executing them.
#[derive(Debug, Default)]
struct ScriptWriter {
    script: String,
}

impl MigrationHooks for ScriptWriter {
    fn executing_statements(&mut self, _migration_id: &str, statements: &[MigrationStatement]) -> Result<bool> {
        for statement in statements {
            self.script.push_str(&statement.sql);
            self.script.push('\n');
            if let Some(terminator) = &statement.batch_terminator {
                self.script.push_str(terminator);
                self.script.push('\n');
            }
        }
        Ok(false)
    }
}

/// A migrator whose updates are written to a script.
///
/// Without a source migration the script starts from the database's
/// current state: the history table is read, never written.
#[derive(Debug)]
pub struct ScriptingDecorator<M> {
    inner: M,
    writer: ScriptWriter,
}

impl<M: MigratorBase> ScriptingDecorator<M> {
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            writer: ScriptWriter::default(),
        }
    }

    /// The script that brings a database from `source` to `target`.
    ///
    /// A `None` source is the connected database's current state. A source
    /// migration (or `"0"`) produces a script for any database at that
    /// migration, without reading the history table.
    pub fn script_update(&mut self, source: Option<&str>, target: Option<&str>) -> Result<String> {
        self.writer.script.clear();
        self.update_from_with(source, target, &mut NoHooks)?;
        Ok(self.take_script())
    }

    /// Script collected by the updates since the last call.
    pub fn take_script(&mut self) -> String {
        std::mem::take(&mut self.writer.script)
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }

    pub fn into_inner(self) -> M {
        self.inner
    }
}

impl<M: MigratorBase> MigratorBase for ScriptingDecorator<M> {
    fn update_from_with(
        &mut self,
        source: Option<&str>,
        target: Option<&str>,
        hooks: &mut dyn MigrationHooks,
    ) -> Result<()> {
        let mut layered = LayeredHooks::new(hooks, &mut self.writer);
        self.inner.update_from_with(source, target, &mut layered)
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

#[cfg(test)]
mod tests {
    use super::*;

    /// Statements a fake migrator hands to its hooks.
    struct FakeMigrator {
        statements: Vec<MigrationStatement>,
        executed: usize,
    }

    impl MigratorBase for FakeMigrator {
        fn update_from_with(
            &mut self,
            _source: Option<&str>,
            _target: Option<&str>,
            hooks: &mut dyn MigrationHooks,
        ) -> Result<()> {
            hooks.applying_migration("201501011200000_Init");
            if hooks.executing_statements("201501011200000_Init", &self.statements)? {
                self.executed += 1;
            }
            Ok(())
        }

        fn local_migrations(&self) -> Vec<String> {
            vec!["201501011200000_Init".to_string()]
        }

        fn database_migrations(&self) -> Result<Vec<String>> {
            Ok(Vec::new())
        }

        fn pending_migrations(&self) -> Result<Vec<String>> {
            Ok(self.local_migrations())
        }
    }

    #[test]
    fn test_script_skips_execution() {
        let fake = FakeMigrator {
            statements: vec![
                MigrationStatement::new("CREATE TABLE [Foo] ([Id] [int])"),
                MigrationStatement::new("CREATE PROCEDURE [dbo].[P] AS\nSELECT 1").with_batch_terminator("GO"),
            ],
            executed: 0,
        };
        let mut scripting = ScriptingDecorator::new(fake);
        let script = scripting.script_update(None, None).unwrap();
        assert_eq!(
            script,
            "CREATE TABLE [Foo] ([Id] [int])\nCREATE PROCEDURE [dbo].[P] AS\nSELECT 1\nGO\n"
        );
        assert_eq!(scripting.inner().executed, 0);
        assert_eq!(scripting.pending_migrations().unwrap(), vec!["201501011200000_Init"]);
    }

    #[test]
    fn test_script_is_reset_between_calls() {
        let fake = FakeMigrator {
            statements: vec![MigrationStatement::new("SELECT 1")],
            executed: 0,
        };
        let mut scripting = ScriptingDecorator::new(fake);
        scripting.script_update(None, None).unwrap();
        assert_eq!(scripting.script_update(None, None).unwrap(), "SELECT 1\n");
    }
}
