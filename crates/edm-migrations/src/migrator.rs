//! The migration engine.
//!
//! An update is planned completely before anything runs: pending and
//! reverted migrations are resolved, automatic migrations diffed, data loss
//! and stale procedures checked and every statement generated. Only then are
//! the steps executed, each in its own transaction together with its history
//! row.
//!
//! Concurrent updates of the same database and context key are not
//! coordinated here; the history read and the following write are not
//! locked.

use crate::config::{MigrationsConfiguration, INITIAL_DATABASE};
use crate::connection::DatabaseConnection;
use crate::differ::EdmModelDiffer;
use crate::error::MigrationError;
use crate::executor::TransactionalExecutor;
use crate::history::HistoryRepository;
use crate::migration::{
    is_automatic_migration, is_valid_migration_id, migration_name, next_automatic_migration_id,
    to_automatic_migration_id, MigrationSet, AUTOMATIC_MIGRATION,
};
use crate::model::{DatabaseName, MigrationOperation};
use crate::sql::{generator_for, MigrationSqlGenerator, MigrationStatement};
use crate::Result;
use edm_metadata::{DataSpace, EdmModel, MetadataError};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Where an update currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MigratorState {
    Idle,
    ComputingPending,
    Diffing,
    ApplyingExplicit,
    ApplyingAutomatic,
    RecordingHistory,
    /// The last update failed.
    Error,
}

/// Callbacks raised while an update runs.
///
/// Every method has a no-op default. Returning `false` from
/// [`executing_statements`](MigrationHooks::executing_statements) skips
/// execution of that step, which is how scripting works.
pub trait MigrationHooks {
    /// Explicit migrations about to be applied.
    fn upgrading(&mut self, _migration_ids: &[String]) {}

    /// Migrations about to be reverted, newest first.
    fn downgrading(&mut self, _migration_ids: &[String]) {}

    fn applying_migration(&mut self, _migration_id: &str) {}

    fn reverting_migration(&mut self, _migration_id: &str) {}

    fn auto_migrating(&mut self, _migration_id: &str) {}

    /// Called with the statements of one step before they run.
    fn executing_statements(&mut self, _migration_id: &str, _statements: &[MigrationStatement]) -> Result<bool> {
        Ok(true)
    }
}

/// Hooks that observe nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl MigrationHooks for NoHooks {}

/// Common surface of the migrator and its decorators.
pub trait MigratorBase {
    /// Update to `target`, planned as if `source` were the last migration
    /// applied. Both name an id, a migration name or `"0"`; a `None` target
    /// is the current model.
    ///
    /// With a `source` the history table is not read. Such plans only
    /// upgrade and are meant for hooks that skip execution.
    fn update_from_with(
        &mut self,
        source: Option<&str>,
        target: Option<&str>,
        hooks: &mut dyn MigrationHooks,
    ) -> Result<()>;

    /// Update the database from its recorded history to `target`.
    fn update_with(&mut self, target: Option<&str>, hooks: &mut dyn MigrationHooks) -> Result<()> {
        self.update_from_with(None, target, hooks)
    }

    fn update(&mut self, target: Option<&str>) -> Result<()> {
        self.update_with(target, &mut NoHooks)
    }

    /// Ids of the registered migrations, oldest first.
    fn local_migrations(&self) -> Vec<String>;

    /// Ids recorded in the history table for this context, oldest first.
    fn database_migrations(&self) -> Result<Vec<String>>;

    /// Registered migrations not yet applied.
    fn pending_migrations(&self) -> Result<Vec<String>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StepKind {
    Explicit,
    Automatic,
    Revert,
}

#[derive(Debug)]
struct PlannedStep {
    migration_id: String,
    kind: StepKind,
    statements: Vec<MigrationStatement>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Up,
    Down { to_initial: bool },
}

#[derive(Debug, Default)]
struct Plan {
    upgrading: Vec<String>,
    downgrading: Vec<String>,
    steps: Vec<PlannedStep>,
}

/// Facts about the database gathered once per update.
struct Planning {
    /// Applied ids, oldest first.
    applied: Vec<String>,
    /// Newest applied or registered id.
    last_id: Option<String>,
    /// Model produced by the last applied migration.
    last_model: EdmModel,
    history_exists: bool,
    history_shared: bool,
    empty: EdmModel,
}

/// Applies and reverts migrations against one database.
pub struct DbMigrator {
    configuration: MigrationsConfiguration,
    migrations: MigrationSet,
    current_model: EdmModel,
    connection: Box<dyn DatabaseConnection>,
    generator: Arc<dyn MigrationSqlGenerator>,
    history: HistoryRepository,
    differ: EdmModelDiffer,
    state: MigratorState,
}

impl DbMigrator {
    /// Create a migrator bringing the database behind `connection` to
    /// `current_model`, a store model.
    pub fn new(
        configuration: MigrationsConfiguration,
        migrations: MigrationSet,
        current_model: EdmModel,
        connection: Box<dyn DatabaseConnection>,
    ) -> Result<Self> {
        if current_model.data_space() != DataSpace::SSpace {
            return Err(MetadataError::DataSpaceMismatch {
                identity: current_model.container().name().to_string(),
                expected: DataSpace::SSpace,
                actual: current_model.data_space(),
            }
            .into());
        }

        let provider = configuration
            .provider_token
            .clone()
            .unwrap_or_else(|| connection.provider_token().to_string());
        let generator: Arc<dyn MigrationSqlGenerator> = Arc::from(generator_for(&provider)?);
        if let Some(timeout) = configuration.command_timeout {
            connection.set_command_timeout(timeout)?;
        }
        let history = HistoryRepository::from_config(&configuration, Arc::clone(&generator));
        let differ = EdmModelDiffer::new(configuration.default_schema.clone());

        debug!(
            context_key = %configuration.context_key,
            provider = %provider,
            migrations = migrations.len(),
            "Created migrator"
        );
        Ok(Self {
            configuration,
            migrations,
            current_model,
            connection,
            generator,
            history,
            differ,
            state: MigratorState::Idle,
        })
    }

    pub fn configuration(&self) -> &MigrationsConfiguration {
        &self.configuration
    }

    pub fn migrations(&self) -> &MigrationSet {
        &self.migrations
    }

    pub fn current_model(&self) -> &EdmModel {
        &self.current_model
    }

    pub fn connection(&self) -> &dyn DatabaseConnection {
        self.connection.as_ref()
    }

    pub fn generator(&self) -> &dyn MigrationSqlGenerator {
        self.generator.as_ref()
    }

    pub fn history(&self) -> &HistoryRepository {
        &self.history
    }

    pub fn differ(&self) -> &EdmModelDiffer {
        &self.differ
    }

    pub fn state(&self) -> MigratorState {
        self.state
    }

    fn transition(&mut self, state: MigratorState) {
        debug!(from = ?self.state, to = ?state, "Migrator state");
        self.state = state;
    }

    fn plan(&mut self, source: Option<&str>, target: Option<&str>) -> Result<Plan> {
        self.transition(MigratorState::ComputingPending);
        let local = self.migrations.ids();
        let mut planning = match source {
            None => self.database_baseline(&local)?,
            Some(source) => self.migration_baseline(source, &local)?,
        };
        let pending: Vec<String> = local
            .iter()
            .filter(|id| !planning.applied.contains(id))
            .cloned()
            .collect();
        let target_id = target
            .map(|target| self.resolve_target(target, &local, &planning.applied))
            .transpose()?;

        self.transition(MigratorState::Diffing);
        let Some(target_id) = target_id else {
            return self.plan_upgrade(&pending, true, &mut planning);
        };
        if let Some(position) = pending.iter().position(|id| *id == target_id) {
            return self.plan_upgrade(&pending[..=position], false, &mut planning);
        }

        let since = match source {
            None => self
                .history
                .get_migrations_since(self.connection.as_ref(), &target_id)?,
            Some(_) if planning.applied.last() == Some(&target_id) || planning.applied.is_empty() => Vec::new(),
            Some(source) => {
                return Err(MigrationError::DowngradeScript {
                    from: source.to_string(),
                    to: target_id,
                })
            }
        };
        if since.is_empty() {
            return Ok(Plan::default());
        }
        self.plan_downgrade(&since, &target_id, &mut planning)
    }

    /// Planning facts read from the history table.
    fn database_baseline(&self, local: &[String]) -> Result<Planning> {
        let connection = self.connection.as_ref();
        let applied = self.history.get_migrations(connection)?;
        let empty = EdmModel::empty(DataSpace::SSpace)?;
        let last_model = match self.history.get_last_model(connection)? {
            Some((_, model)) => model,
            None => empty.clone(),
        };
        Ok(Planning {
            last_id: applied.iter().chain(local).max().cloned(),
            applied,
            last_model,
            history_exists: self.history.exists(connection)?,
            history_shared: self.history.is_shared(connection)?,
            empty,
        })
    }

    /// Planning facts of a database on which `source` is the last
    /// registered migration applied.
    fn migration_baseline(&self, source: &str, local: &[String]) -> Result<Planning> {
        let source_id = self.resolve_target(source, local, &[])?;
        let empty = EdmModel::empty(DataSpace::SSpace)?;
        let applied = match local.iter().position(|id| *id == source_id) {
            Some(position) => local[..=position].to_vec(),
            None => Vec::new(),
        };
        let last_model = match self.migrations.get(&source_id) {
            Some(migration) => migration.target_model().clone(),
            None => empty.clone(),
        };
        debug!(source = %source_id, applied = applied.len(), "Planning from a source migration");
        Ok(Planning {
            last_id: local.iter().max().cloned(),
            history_exists: !applied.is_empty(),
            applied,
            last_model,
            history_shared: false,
            empty,
        })
    }

    fn resolve_target(&self, target: &str, local: &[String], applied: &[String]) -> Result<String> {
        if target == INITIAL_DATABASE {
            return Ok(INITIAL_DATABASE.to_string());
        }
        if !is_valid_migration_id(target) && target.eq_ignore_ascii_case(AUTOMATIC_MIGRATION) {
            return Err(MigrationError::AutoNotValidTarget);
        }
        let by_name = !is_valid_migration_id(target);
        let matches = |id: &str| id == target || (by_name && migration_name(id).eq_ignore_ascii_case(target));
        local
            .iter()
            .find(|id| matches(id.as_str()))
            .or_else(|| applied.iter().find(|id| matches(id.as_str())))
            .cloned()
            .ok_or_else(|| MigrationError::MigrationNotFound {
                migration: target.to_string(),
            })
    }

    fn plan_upgrade(&self, pending: &[String], trailing_automatic: bool, planning: &mut Planning) -> Result<Plan> {
        let mut last_model = planning.last_model.clone();
        let mut plan = Plan {
            upgrading: pending.to_vec(),
            ..Plan::default()
        };

        for migration_id in pending {
            let migration = self
                .migrations
                .get(migration_id)
                .ok_or_else(|| MigrationError::MigrationNotFound {
                    migration: migration_id.clone(),
                })?;

            if let Some(source) = migration.source_model() {
                if !self.differ.is_same(&last_model, source)? {
                    if !self.configuration.automatic_migrations_enabled {
                        return Err(MigrationError::AutomaticMigrationsDisabled);
                    }
                    let auto_id = to_automatic_migration_id(migration_id)?;
                    plan.steps
                        .push(self.plan_automatic(&auto_id, &last_model, source, Direction::Up, planning)?);
                    last_model = source.clone();
                }
            }

            let mut system_operations = Vec::new();
            if last_model.is_empty() && !planning.history_exists {
                system_operations = self.create_history_operations(&planning.empty)?;
                planning.history_exists = true;
            }
            let statements = self.generate_statements(
                migration_id,
                migration.up().to_vec(),
                system_operations,
                migration.target_model(),
                false,
                false,
            )?;
            plan.steps.push(PlannedStep {
                migration_id: migration_id.clone(),
                kind: StepKind::Explicit,
                statements,
            });
            last_model = migration.target_model().clone();
        }

        if trailing_automatic && !self.differ.is_same(&last_model, &self.current_model)? {
            if !self.configuration.automatic_migrations_enabled {
                return Err(MigrationError::AutomaticMigrationsDisabled);
            }
            let auto_id = next_automatic_migration_id(planning.last_id.as_deref());
            plan.steps
                .push(self.plan_automatic(&auto_id, &last_model, &self.current_model, Direction::Up, planning)?);
        }
        Ok(plan)
    }

    fn plan_downgrade(&self, since: &[String], target_id: &str, planning: &mut Planning) -> Result<Plan> {
        let connection = self.connection.as_ref();
        let mut plan = Plan {
            downgrading: since.to_vec(),
            ..Plan::default()
        };

        for (index, migration_id) in since.iter().enumerate() {
            let next = since.get(index + 1).map(String::as_str).unwrap_or(target_id);
            let to_initial = next == INITIAL_DATABASE;
            let target_model = if to_initial {
                planning.empty.clone()
            } else {
                self.history
                    .get_model(connection, next)?
                    .ok_or_else(|| MigrationError::MigrationNotFound {
                        migration: next.to_string(),
                    })?
            };

            if let Some(migration) = self.migrations.get(migration_id) {
                let mut system_operations = Vec::new();
                if to_initial && !planning.history_shared {
                    system_operations = self.drop_history_operations(&planning.empty)?;
                }
                let statements = self.generate_statements(
                    migration_id,
                    migration.down_operations()?,
                    system_operations,
                    &target_model,
                    true,
                    false,
                )?;
                plan.steps.push(PlannedStep {
                    migration_id: migration_id.clone(),
                    kind: StepKind::Revert,
                    statements,
                });
            } else if is_automatic_migration(migration_id) {
                let source = self
                    .history
                    .get_model(connection, migration_id)?
                    .ok_or_else(|| MigrationError::MigrationNotFound {
                        migration: migration_id.clone(),
                    })?;
                plan.steps.push(self.plan_automatic(
                    migration_id,
                    &source,
                    &target_model,
                    Direction::Down { to_initial },
                    planning,
                )?);
            } else {
                return Err(MigrationError::MigrationNotFound {
                    migration: migration_id.clone(),
                });
            }
        }
        Ok(plan)
    }

    fn plan_automatic(
        &self,
        migration_id: &str,
        source: &EdmModel,
        target: &EdmModel,
        direction: Direction,
        planning: &mut Planning,
    ) -> Result<PlannedStep> {
        let operations = self.differ.diff(source, target)?;
        let downgrading = matches!(direction, Direction::Down { .. });

        let mut system_operations = Vec::new();
        if !planning.history_shared {
            if direction == (Direction::Down { to_initial: true }) {
                system_operations = self.drop_history_operations(&planning.empty)?;
            } else if source.is_empty() && !planning.history_exists {
                system_operations = self.create_history_operations(&planning.empty)?;
                planning.history_exists = true;
            }
        }

        let destructive: Vec<String> = operations
            .iter()
            .filter(|operation| operation.is_destructive())
            .map(ToString::to_string)
            .collect();
        if !destructive.is_empty() && !self.configuration.automatic_migration_data_loss_allowed {
            return Err(MigrationError::AutomaticDataLoss {
                migration_id: migration_id.to_string(),
                operations: destructive,
            });
        }

        if operations.iter().any(MigrationOperation::is_procedure_operation)
            && !self.differ.is_same(target, &self.current_model)?
        {
            return Err(MigrationError::AutomaticStaleFunctions {
                migration_id: migration_id.to_string(),
            });
        }

        let statements =
            self.generate_statements(migration_id, operations, system_operations, target, downgrading, true)?;
        Ok(PlannedStep {
            migration_id: migration_id.to_string(),
            kind: if downgrading { StepKind::Revert } else { StepKind::Automatic },
            statements,
        })
    }

    fn create_history_operations(&self, empty: &EdmModel) -> Result<Vec<MigrationOperation>> {
        self.differ.diff(empty, &self.history.history_model()?)
    }

    fn drop_history_operations(&self, empty: &EdmModel) -> Result<Vec<MigrationOperation>> {
        self.differ.diff(&self.history.history_model()?, empty)
    }

    /// Operations of one step plus its history row, translated to SQL.
    fn generate_statements(
        &self,
        migration_id: &str,
        operations: Vec<MigrationOperation>,
        system_operations: Vec<MigrationOperation>,
        target_model: &EdmModel,
        downgrading: bool,
        automatic: bool,
    ) -> Result<Vec<MigrationStatement>> {
        let operations = self.fill_foreign_keys(operations, target_model)?;

        let created = |table: &str| {
            operations.iter().any(|operation| {
                matches!(operation, MigrationOperation::CreateTable(create)
                    if DatabaseName::parse(&create.name).matches(&DatabaseName::parse(table), &self.configuration.default_schema))
            })
        };
        let (new_table_foreign_keys, others): (Vec<MigrationOperation>, Vec<MigrationOperation>) =
            operations.iter().cloned().partition(|operation| {
                matches!(operation, MigrationOperation::AddForeignKey(fk) if created(&fk.dependent_table))
            });

        let history_table = self.history.table();
        let drops_history = system_operations.iter().any(|operation| {
            matches!(operation, MigrationOperation::DropTable(drop)
                if DatabaseName::parse(&drop.name).matches(history_table, &self.configuration.default_schema))
        });

        let mut all = others;
        all.extend(new_table_foreign_keys);
        all.extend(system_operations);
        if !downgrading {
            all.push(self.history.create_insert_operation(migration_id, target_model)?);
        } else if !drops_history {
            all.push(self.history.create_delete_operation(migration_id));
        }

        let mut statements = self.generator.generate(&all)?;
        if automatic {
            let mut seen = HashSet::new();
            statements.retain(|statement| seen.insert(statement.sql.clone()));
        }
        Ok(statements)
    }

    /// Give foreign keys without principal columns the principal's key,
    /// taken from the target model or from a table created alongside.
    fn fill_foreign_keys(
        &self,
        operations: Vec<MigrationOperation>,
        target_model: &EdmModel,
    ) -> Result<Vec<MigrationOperation>> {
        let default_schema = self.configuration.default_schema.as_str();
        let mut filled = Vec::with_capacity(operations.len());
        for operation in &operations {
            let MigrationOperation::AddForeignKey(fk) = operation else {
                filled.push(operation.clone());
                continue;
            };
            if fk.has_principal_columns() {
                filled.push(operation.clone());
                continue;
            }

            let principal = DatabaseName::parse(&fk.principal_table);
            let from_model = target_model
                .entity_sets()
                .find(|(set, _)| {
                    let table = DatabaseName::new(Some(set.schema_or(default_schema).to_string()), set.table_name());
                    table.matches(&principal, default_schema)
                })
                .map(|(_, entity)| entity.key_members().to_vec());
            let from_operations = || {
                operations.iter().find_map(|operation| match operation {
                    MigrationOperation::CreateTable(create)
                        if DatabaseName::parse(&create.name).matches(&principal, default_schema) =>
                    {
                        create.primary_key.as_ref().map(|pk| pk.columns.clone())
                    }
                    _ => None,
                })
            };

            let columns = from_model
                .or_else(from_operations)
                .filter(|columns| !columns.is_empty())
                .ok_or_else(|| MigrationError::PartialForeignKeyOperation {
                    dependent_table: fk.dependent_table.clone(),
                    dependent_columns: fk.dependent_columns.clone(),
                })?;
            let mut fk = fk.clone();
            fk.principal_columns = columns;
            filled.push(MigrationOperation::AddForeignKey(fk));
        }
        Ok(filled)
    }

    fn run(&mut self, plan: Plan, hooks: &mut dyn MigrationHooks) -> Result<()> {
        if !plan.upgrading.is_empty() {
            info!(migrations = ?plan.upgrading, "Applying explicit migrations");
            hooks.upgrading(&plan.upgrading);
        }
        if !plan.downgrading.is_empty() {
            info!(migrations = ?plan.downgrading, "Reverting migrations");
            hooks.downgrading(&plan.downgrading);
        }

        for step in &plan.steps {
            match step.kind {
                StepKind::Explicit => {
                    self.transition(MigratorState::ApplyingExplicit);
                    info!(migration_id = %step.migration_id, "Applying explicit migration");
                    hooks.applying_migration(&step.migration_id);
                }
                StepKind::Automatic => {
                    self.transition(MigratorState::ApplyingAutomatic);
                    info!(migration_id = %step.migration_id, "Applying automatic migration");
                    hooks.auto_migrating(&step.migration_id);
                }
                StepKind::Revert => {
                    let state = if is_automatic_migration(&step.migration_id) {
                        MigratorState::ApplyingAutomatic
                    } else {
                        MigratorState::ApplyingExplicit
                    };
                    self.transition(state);
                    info!(migration_id = %step.migration_id, "Reverting migration");
                    hooks.reverting_migration(&step.migration_id);
                }
            }

            if hooks.executing_statements(&step.migration_id, &step.statements)? {
                TransactionalExecutor::new(self.connection.as_ref()).execute(&step.statements)?;
            }
            self.transition(MigratorState::RecordingHistory);
        }
        Ok(())
    }
}

impl MigratorBase for DbMigrator {
    fn update_from_with(
        &mut self,
        source: Option<&str>,
        target: Option<&str>,
        hooks: &mut dyn MigrationHooks,
    ) -> Result<()> {
        let result = self.plan(source, target).and_then(|plan| self.run(plan, hooks));
        match result {
            Ok(()) => {
                self.transition(MigratorState::Idle);
                Ok(())
            }
            Err(err) => {
                self.transition(MigratorState::Error);
                Err(err)
            }
        }
    }

    fn local_migrations(&self) -> Vec<String> {
        self.migrations.ids()
    }

    fn database_migrations(&self) -> Result<Vec<String>> {
        self.history.get_migrations(self.connection.as_ref())
    }

    fn pending_migrations(&self) -> Result<Vec<String>> {
        self.history
            .get_pending(self.connection.as_ref(), &self.migrations.ids())
    }
}

impl std::fmt::Debug for DbMigrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbMigrator")
            .field("context_key", &self.configuration.context_key)
            .field("migrations", &self.migrations.len())
            .field("history", &self.history)
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::SqliteConnection;
    use crate::migration::Migration;
    use crate::model::{ColumnModel, CreateTableOperation, ForeignKeyModel};
    use edm_metadata::{EdmProperty, EntitySet, EntityType, PrimitiveTypeKind};

    const NS: &str = "CodeFirstDatabaseSchema";

    fn store() -> EdmModel {
        EdmModel::empty(DataSpace::SSpace).unwrap()
    }

    fn customers_model() -> EdmModel {
        EdmModel::builder(DataSpace::SSpace)
            .unwrap()
            .with_item(
                EntityType::builder(NS, "Customer", DataSpace::SSpace)
                    .key_property(EdmProperty::primitive("Id", PrimitiveTypeKind::Int32).identity())
                    .property(EdmProperty::primitive("Name", PrimitiveTypeKind::String))
                    .build()
                    .unwrap(),
            )
            .unwrap()
            .with_entity_set(EntitySet::new("Customers", format!("{NS}.Customer")))
            .unwrap()
            .build()
            .unwrap()
    }

    fn migrator(migrations: MigrationSet, model: EdmModel) -> DbMigrator {
        DbMigrator::new(
            MigrationsConfiguration::new("Shop"),
            migrations,
            model,
            Box::new(SqliteConnection::open_in_memory().unwrap()),
        )
        .unwrap()
    }

    #[test]
    fn test_unknown_targets() {
        let mut migrator = migrator(MigrationSet::new(), store());
        assert!(matches!(migrator.update(Some("AutomaticMigration")), Err(MigrationError::AutoNotValidTarget)));
        assert_eq!(migrator.state(), MigratorState::Error);
        assert!(matches!(
            migrator.update(Some("Missing")),
            Err(MigrationError::MigrationNotFound { migration }) if migration == "Missing"
        ));
    }

    #[test]
    fn test_empty_update_is_noop() {
        let mut migrator = migrator(MigrationSet::new(), store());
        migrator.update(None).unwrap();
        assert_eq!(migrator.state(), MigratorState::Idle);
        assert!(!migrator.history().exists(migrator.connection()).unwrap());
    }

    #[test]
    fn test_disabled_automatic_migrations() {
        let mut migrator = migrator(MigrationSet::new(), customers_model());
        assert!(matches!(migrator.update(None), Err(MigrationError::AutomaticMigrationsDisabled)));
        assert!(!migrator.history().exists(migrator.connection()).unwrap());
    }

    #[test]
    fn test_queries() {
        let init = Migration::new("201501011200000_Init", customers_model())
            .unwrap()
            .with_up(vec![MigrationOperation::create_table(
                CreateTableOperation::new("dbo.Customers")
                    .column(ColumnModel::new("Id", PrimitiveTypeKind::Int32).not_null().identity())
                    .column(ColumnModel::new("Name", PrimitiveTypeKind::String))
                    .primary_key(["Id"]),
            )]);
        let mut migrator = migrator(MigrationSet::from_migrations([init]).unwrap(), customers_model());
        assert_eq!(migrator.pending_migrations().unwrap(), vec!["201501011200000_Init"]);
        migrator.update(None).unwrap();
        assert!(migrator.pending_migrations().unwrap().is_empty());
        assert_eq!(migrator.database_migrations().unwrap(), migrator.local_migrations());
    }

    #[test]
    fn test_partial_foreign_key_fails_before_execution() {
        let migration = Migration::new("201501011200000_Orders", store())
            .unwrap()
            .with_up(vec![MigrationOperation::AddForeignKey(ForeignKeyModel::new(
                "Orders",
                ["CustomerId"],
                "Nowhere",
            ))]);
        let mut migrator = migrator(MigrationSet::from_migrations([migration]).unwrap(), store());
        assert!(matches!(
            migrator.update(None),
            Err(MigrationError::PartialForeignKeyOperation { dependent_table, .. }) if dependent_table == "Orders"
        ));
        assert!(!migrator.history().exists(migrator.connection()).unwrap());
    }
}
