//! Store model diffing.
//!
//! Compares two store models and produces the ordered operations that turn a
//! database matching the source into one matching the target.

use crate::config::DEFAULT_SCHEMA;
use crate::error::MigrationError;
use crate::model::names;
use crate::model::{
    AlterColumnOperation, AlterProcedureOperation, ColumnModel, CreateTableOperation, DatabaseName, DropColumnOperation,
    DropProcedureOperation, DropTableOperation, ForeignKeyModel, IndexModel, MigrationOperation,
    MoveProcedureOperation, MoveTableOperation, PrimaryKeyModel, ProcedureModel,
    RenameColumnOperation, RenameProcedureOperation, RenameTableOperation,
};
use edm_metadata::{
    AssociationType, DataSpace, EdmFunction, EdmModel, EdmProperty, EntitySet, EntityType,
    MetadataError,
};
use tracing::debug;

/// Prefix of temporary names used to break rename cycles.
pub const TEMP_RENAME_PREFIX: &str = "__mig_tmp__";

/// Computes migration operations between two store models.
#[derive(Debug, Clone)]
pub struct EdmModelDiffer {
    default_schema: String,
}

impl Default for EdmModelDiffer {
    fn default() -> Self {
        Self::new(DEFAULT_SCHEMA)
    }
}

impl EdmModelDiffer {
    /// Create a differ placing unqualified tables in `default_schema`.
    pub fn new(default_schema: impl Into<String>) -> Self {
        Self {
            default_schema: default_schema.into(),
        }
    }

    pub fn default_schema(&self) -> &str {
        &self.default_schema
    }

    /// Diff `source` against `target`. Both must be store models.
    ///
    /// The result is ordered so it can be replayed as is: renames and moves
    /// first, then constraint and index drops, column renames, new tables and
    /// columns, altered columns and keys, new indexes and foreign keys,
    /// dropped columns and tables, and finally stored procedures.
    pub fn diff(&self, source: &EdmModel, target: &EdmModel) -> Result<Vec<MigrationOperation>, MigrationError> {
        for model in [source, target] {
            if model.data_space() != DataSpace::SSpace {
                return Err(MetadataError::DataSpaceMismatch {
                    identity: model.container().name().to_string(),
                    expected: DataSpace::SSpace,
                    actual: model.data_space(),
                }
                .into());
            }
        }

        let context = DiffContext::new(&self.default_schema, source, target);
        let operations = context.operations();
        debug!(operations = operations.len(), "Diffed store models");
        Ok(operations)
    }

    /// Whether `source` and `target` describe the same schema.
    pub fn is_same(&self, source: &EdmModel, target: &EdmModel) -> Result<bool, MigrationError> {
        Ok(self.diff(source, target)?.is_empty())
    }
}

/// One entity set and the table it maps to.
struct Table<'a> {
    set: &'a EntitySet,
    entity: &'a EntityType,
    name: String,
}

struct Snapshot<'a> {
    model: &'a EdmModel,
    tables: Vec<Table<'a>>,
}

impl<'a> Snapshot<'a> {
    fn new(model: &'a EdmModel, default_schema: &str) -> Self {
        let tables = model
            .entity_sets()
            .map(|(set, entity)| Table {
                set,
                entity,
                name: format!("{}.{}", set.schema_or(default_schema), set.table_name()),
            })
            .collect();
        Self { model, tables }
    }

    fn table_index_of(&self, entity_type: &str) -> Option<usize> {
        self.tables.iter().position(|table| table.entity.identity() == entity_type)
    }
}

struct TablePair<'a> {
    source: usize,
    target: usize,
    /// Matched columns, source then target.
    columns: Vec<(&'a EdmProperty, &'a EdmProperty)>,
}

/// A foreign key together with the index backing it, when one is needed.
struct ForeignKeyDef {
    association: String,
    foreign_key: ForeignKeyModel,
    index: Option<IndexModel>,
}

struct DiffContext<'a> {
    default_schema: &'a str,
    source: Snapshot<'a>,
    target: Snapshot<'a>,
    pairs: Vec<TablePair<'a>>,
}

impl<'a> DiffContext<'a> {
    fn new(default_schema: &'a str, source: &'a EdmModel, target: &'a EdmModel) -> Self {
        let source = Snapshot::new(source, default_schema);
        let target = Snapshot::new(target, default_schema);
        let pairs = source
            .tables
            .iter()
            .enumerate()
            .filter_map(|(source_index, source_table)| {
                let target_index = target
                    .tables
                    .iter()
                    .position(|t| t.set.name.eq_ignore_ascii_case(&source_table.set.name))?;
                let columns = pair_columns(source_table.entity, target.tables[target_index].entity);
                Some(TablePair {
                    source: source_index,
                    target: target_index,
                    columns,
                })
            })
            .collect();

        Self {
            default_schema,
            source,
            target,
            pairs,
        }
    }

    fn operations(&self) -> Vec<MigrationOperation> {
        let renamed_columns = self.renamed_columns();
        let altered_columns = self.altered_columns();
        let (pk_drop_fks, dropped_keys, added_keys, pk_add_fks) = self.altered_primary_keys(&altered_columns);

        let source_fks = self.foreign_keys(&self.source, true);
        let target_fks = self.foreign_keys(&self.target, false);
        let (dropped_fks, added_fks) = changed_foreign_keys(&source_fks, &target_fks);

        let source_indexes = self.indexes(&self.source, &source_fks, true);
        let target_indexes = self.indexes(&self.target, &target_fks, false);

        let mut operations = Vec::new();

        operations.extend(self.moved_tables(true));
        operations.extend(
            resolve_transitive_renames(self.renamed_tables())
                .into_iter()
                .map(MigrationOperation::RenameTable),
        );
        operations.extend(self.moved_tables(false));

        let all_dropped_fks: Vec<&ForeignKeyDef> = dropped_fks.iter().copied().chain(pk_drop_fks.iter()).collect();
        let mut fk_drops: Vec<ForeignKeyModel> = Vec::new();
        for def in &all_dropped_fks {
            push_distinct_fk(&mut fk_drops, def.foreign_key.clone());
        }
        operations.extend(fk_drops.into_iter().map(MigrationOperation::DropForeignKey));

        let mut index_drops: Vec<IndexModel> = Vec::new();
        for def in &all_dropped_fks {
            if let Some(index) = &def.index {
                push_distinct_index(&mut index_drops, index.clone());
            }
        }
        for index in source_indexes.iter().filter(|index| !target_indexes.contains(index)) {
            push_distinct_index(&mut index_drops, index.clone());
        }
        operations.extend(index_drops.into_iter().map(MigrationOperation::DropIndex));

        let (orphaned, dropped_columns) = self.dropped_columns(&renamed_columns);
        operations.extend(orphaned);
        operations.extend(
            resolve_transitive_renames(renamed_columns)
                .into_iter()
                .map(MigrationOperation::RenameColumn),
        );
        operations.extend(dropped_keys.into_iter().map(MigrationOperation::DropPrimaryKey));
        operations.extend(self.added_tables());
        operations.extend(self.added_columns());
        operations.extend(altered_columns.into_iter().map(MigrationOperation::AlterColumn));
        operations.extend(added_keys.into_iter().map(MigrationOperation::AddPrimaryKey));

        let all_added_fks: Vec<&ForeignKeyDef> = added_fks.iter().copied().chain(pk_add_fks.iter()).collect();
        let mut index_creates: Vec<IndexModel> = Vec::new();
        for def in &all_added_fks {
            if let Some(index) = &def.index {
                push_distinct_index(&mut index_creates, index.clone());
            }
        }
        for index in target_indexes.iter().filter(|index| !source_indexes.contains(index)) {
            push_distinct_index(&mut index_creates, index.clone());
        }
        operations.extend(index_creates.into_iter().map(MigrationOperation::CreateIndex));

        let mut fk_adds: Vec<ForeignKeyModel> = Vec::new();
        for def in &all_added_fks {
            push_distinct_fk(&mut fk_adds, def.foreign_key.clone());
        }
        operations.extend(fk_adds.into_iter().map(MigrationOperation::AddForeignKey));

        operations.extend(dropped_columns);
        operations.extend(self.dropped_tables());
        operations.extend(self.procedure_operations());
        operations
    }

    fn source_table(&self, pair: &TablePair<'a>) -> &Table<'a> {
        &self.source.tables[pair.source]
    }

    fn target_table(&self, pair: &TablePair<'a>) -> &Table<'a> {
        &self.target.tables[pair.target]
    }

    fn pair_of_source(&self, source_index: usize) -> Option<&TablePair<'a>> {
        self.pairs.iter().find(|pair| pair.source == source_index)
    }

    /// Name a source table has once renames and moves are applied.
    fn current_name(&self, source_index: usize) -> String {
        match self.pair_of_source(source_index) {
            Some(pair) => self.target_table(pair).name.clone(),
            None => self.source.tables[source_index].name.clone(),
        }
    }

    /// Name a source column has once column renames are applied.
    fn current_column(&self, source_index: usize, column: &str) -> String {
        self.pair_of_source(source_index)
            .and_then(|pair| {
                pair.columns
                    .iter()
                    .find(|(source, _)| source.name.eq_ignore_ascii_case(column))
                    .map(|(_, target)| target.name.clone())
            })
            .unwrap_or_else(|| column.to_string())
    }

    /// Schemas of a paired table, source then target.
    fn schemas(&self, pair: &TablePair<'a>) -> (&str, &str) {
        (
            self.source_table(pair).set.schema_or(self.default_schema),
            self.target_table(pair).set.schema_or(self.default_schema),
        )
    }

    /// Whether the table changes schema before it is renamed. A table moving
    /// to a schema that sorts earlier moves first, so the diff of the
    /// reversed models lists the same steps in reverse.
    fn moves_first(&self, pair: &TablePair<'a>) -> bool {
        let (old_schema, new_schema) = self.schemas(pair);
        old_schema.to_ascii_lowercase() > new_schema.to_ascii_lowercase()
    }

    fn renamed_tables(&self) -> Vec<RenameTableOperation> {
        self.pairs
            .iter()
            .filter(|pair| {
                !self
                    .source_table(pair)
                    .set
                    .table_name()
                    .eq_ignore_ascii_case(self.target_table(pair).set.table_name())
            })
            .map(|pair| {
                let source = self.source_table(pair);
                let name = if self.moves_first(pair) {
                    format!("{}.{}", self.schemas(pair).1, source.set.table_name())
                } else {
                    source.name.clone()
                };
                RenameTableOperation {
                    name,
                    new_name: self.target_table(pair).set.table_name().to_string(),
                }
            })
            .collect()
    }

    /// Schema moves of the tables that move before (`true`) or after their
    /// renames.
    fn moved_tables(&self, before_renames: bool) -> Vec<MigrationOperation> {
        self.pairs
            .iter()
            .filter(|pair| self.moves_first(pair) == before_renames)
            .filter_map(|pair| {
                let (old_schema, new_schema) = self.schemas(pair);
                if old_schema.eq_ignore_ascii_case(new_schema) {
                    return None;
                }
                let table = if before_renames {
                    self.source_table(pair).set.table_name()
                } else {
                    self.target_table(pair).set.table_name()
                };
                Some(MigrationOperation::MoveTable(MoveTableOperation {
                    name: format!("{old_schema}.{table}"),
                    new_schema: Some(new_schema.to_string()),
                }))
            })
            .collect()
    }

    fn added_tables(&self) -> Vec<MigrationOperation> {
        self.target
            .tables
            .iter()
            .enumerate()
            .filter(|(index, _)| !self.pairs.iter().any(|pair| pair.target == *index))
            .map(|(_, table)| MigrationOperation::CreateTable(create_table(table)))
            .collect()
    }

    fn dropped_tables(&self) -> Vec<MigrationOperation> {
        self.source
            .tables
            .iter()
            .enumerate()
            .filter(|(index, _)| self.pair_of_source(*index).is_none())
            .map(|(_, table)| {
                MigrationOperation::DropTable(DropTableOperation {
                    name: table.name.clone(),
                    definition: Some(create_table(table)),
                })
            })
            .collect()
    }

    fn renamed_columns(&self) -> Vec<RenameColumnOperation> {
        self.pairs
            .iter()
            .flat_map(|pair| {
                let table = self.target_table(pair).name.clone();
                pair.columns
                    .iter()
                    .filter(|(source, target)| !source.name.eq_ignore_ascii_case(&target.name))
                    .map(move |(source, target)| RenameColumnOperation {
                        table: table.clone(),
                        name: source.name.clone(),
                        new_name: target.name.clone(),
                    })
            })
            .collect()
    }

    fn added_columns(&self) -> Vec<MigrationOperation> {
        let mut operations = Vec::new();
        for pair in &self.pairs {
            let target = self.target_table(pair);
            for property in target.entity.properties() {
                let matched = pair.columns.iter().any(|(_, t)| std::ptr::eq(*t, property));
                if matched {
                    continue;
                }
                if let Some(column) = ColumnModel::from_property(property) {
                    operations.push(MigrationOperation::add_column(target.name.clone(), column));
                }
            }
        }
        operations
    }

    /// Unmatched source columns, split into those that must go before the
    /// column renames (their name is being reused) and the rest.
    fn dropped_columns(
        &self,
        renamed_columns: &[RenameColumnOperation],
    ) -> (Vec<MigrationOperation>, Vec<MigrationOperation>) {
        let mut orphaned = Vec::new();
        let mut dropped = Vec::new();
        for pair in &self.pairs {
            let source = self.source_table(pair);
            let table = self.target_table(pair).name.clone();
            for property in source.entity.properties() {
                let matched = pair.columns.iter().any(|(s, _)| std::ptr::eq(*s, property));
                if matched {
                    continue;
                }
                let operation = MigrationOperation::DropColumn(DropColumnOperation {
                    table: table.clone(),
                    name: property.name.clone(),
                    definition: ColumnModel::from_property(property),
                });
                let name_reused = renamed_columns.iter().any(|rename| {
                    rename.table.eq_ignore_ascii_case(&table) && rename.new_name.eq_ignore_ascii_case(&property.name)
                });
                if name_reused {
                    orphaned.push(operation);
                } else {
                    dropped.push(operation);
                }
            }
        }
        (orphaned, dropped)
    }

    fn altered_columns(&self) -> Vec<AlterColumnOperation> {
        let mut operations = Vec::new();
        for pair in &self.pairs {
            let table = &self.target_table(pair).name;
            for (source, target) in &pair.columns {
                let (Some(mut previous), Some(column)) =
                    (ColumnModel::from_property(source), ColumnModel::from_property(target))
                else {
                    continue;
                };
                previous.name = column.name.clone();
                if previous == column {
                    continue;
                }
                if let MigrationOperation::AlterColumn(operation) =
                    MigrationOperation::alter_column(table.clone(), column, Some(previous))
                {
                    operations.push(operation);
                }
            }
        }
        operations
    }

    /// Key changes on matched tables: foreign keys referencing the key are
    /// dropped first and re-added after the key is rebuilt.
    #[allow(clippy::type_complexity)]
    fn altered_primary_keys(
        &self,
        altered_columns: &[AlterColumnOperation],
    ) -> (Vec<ForeignKeyDef>, Vec<PrimaryKeyModel>, Vec<PrimaryKeyModel>, Vec<ForeignKeyDef>) {
        let mut drop_fks = Vec::new();
        let mut dropped = Vec::new();
        let mut added = Vec::new();
        let mut add_fks = Vec::new();

        for pair in &self.pairs {
            let source = self.source_table(pair);
            let target = self.target_table(pair);
            let source_keys: Vec<String> = source
                .entity
                .key_members()
                .iter()
                .map(|member| self.current_column(pair.source, member))
                .collect();
            let target_keys = target.entity.key_members();

            let key_changed = !same_names(&source_keys, target_keys);
            let key_altered = target_keys.iter().any(|key| {
                altered_columns
                    .iter()
                    .any(|alter| alter.table.eq_ignore_ascii_case(&target.name) && alter.column.name.eq_ignore_ascii_case(key))
            });
            if !key_changed && !key_altered {
                continue;
            }

            let referencing: Vec<ForeignKeyDef> = self
                .foreign_keys(&self.target, false)
                .into_iter()
                .filter(|def| {
                    def.foreign_key.principal_table.eq_ignore_ascii_case(&target.name)
                        && same_names(&def.foreign_key.principal_columns, target_keys)
                })
                .collect();

            for def in &referencing {
                drop_fks.push(ForeignKeyDef {
                    association: def.association.clone(),
                    foreign_key: def.foreign_key.clone(),
                    index: def.index.clone(),
                });
            }
            dropped.push(PrimaryKeyModel::new(target.name.clone(), source_keys));
            added.push(PrimaryKeyModel::new(target.name.clone(), target_keys.to_vec()));
            add_fks.extend(referencing);
        }

        (drop_fks, dropped, added, add_fks)
    }

    /// Foreign keys of a snapshot. Source keys are expressed with the table
    /// and column names they have once renames are applied.
    fn foreign_keys(&self, snapshot: &Snapshot<'a>, is_source: bool) -> Vec<ForeignKeyDef> {
        snapshot
            .model
            .association_types()
            .filter_map(|association| self.foreign_key(snapshot, association, is_source))
            .collect()
    }

    fn foreign_key(
        &self,
        snapshot: &Snapshot<'a>,
        association: &AssociationType,
        is_source: bool,
    ) -> Option<ForeignKeyDef> {
        let constraint = association.constraint()?;
        let principal = snapshot.table_index_of(&association.principal_end()?.entity_type)?;
        let dependent = snapshot.table_index_of(&association.dependent_end()?.entity_type)?;
        let principal_table = &snapshot.tables[principal];
        let dependent_table = &snapshot.tables[dependent];

        let name = names::foreign_key_name(
            &dependent_table.name,
            &principal_table.name,
            &constraint.dependent_properties,
        );
        let mut index = fk_index_needed(dependent_table.entity, &constraint.dependent_properties).then(|| {
            IndexModel::new(dependent_table.name.clone(), constraint.dependent_properties.clone())
                .named(names::index_name(&dependent_table.name, &constraint.dependent_properties))
        });

        let mut foreign_key = ForeignKeyModel {
            name: Some(name),
            dependent_table: dependent_table.name.clone(),
            dependent_columns: constraint.dependent_properties.clone(),
            principal_table: principal_table.name.clone(),
            principal_columns: constraint.principal_properties.clone(),
            cascade_delete: association.cascades_on_delete(),
        };

        if is_source {
            foreign_key.dependent_table = self.current_name(dependent);
            foreign_key.principal_table = self.current_name(principal);
            foreign_key.dependent_columns = constraint
                .dependent_properties
                .iter()
                .map(|column| self.current_column(dependent, column))
                .collect();
            foreign_key.principal_columns = constraint
                .principal_properties
                .iter()
                .map(|column| self.current_column(principal, column))
                .collect();
            if let Some(index) = index.as_mut() {
                index.table = foreign_key.dependent_table.clone();
                index.columns = foreign_key.dependent_columns.clone();
            }
        }

        Some(ForeignKeyDef {
            association: association.identity().to_string(),
            foreign_key,
            index,
        })
    }

    /// Explicit and foreign key indexes of a snapshot, named from the
    /// snapshot's own tables and, for the source, placed on renamed tables
    /// and columns.
    fn indexes(&self, snapshot: &Snapshot<'a>, foreign_keys: &[ForeignKeyDef], is_source: bool) -> Vec<IndexModel> {
        let mut indexes = Vec::new();
        for (table_index, table) in snapshot.tables.iter().enumerate() {
            for def in table.entity.indexes() {
                let name = def
                    .name
                    .clone()
                    .unwrap_or_else(|| names::index_name(&table.name, &def.columns));
                let (table_name, columns) = if is_source {
                    (
                        self.current_name(table_index),
                        def.columns
                            .iter()
                            .map(|column| self.current_column(table_index, column))
                            .collect(),
                    )
                } else {
                    (table.name.clone(), def.columns.clone())
                };
                push_distinct_index(
                    &mut indexes,
                    IndexModel {
                        name: Some(name),
                        table: table_name,
                        columns,
                        unique: def.unique,
                        clustered: def.clustered,
                    },
                );
            }
        }
        for def in foreign_keys {
            if let Some(index) = &def.index {
                push_distinct_index(&mut indexes, index.clone());
            }
        }
        indexes
    }

    fn procedure_operations(&self) -> Vec<MigrationOperation> {
        let source: Vec<&EdmFunction> = procedures(self.source.model).collect();
        let target: Vec<&EdmFunction> = procedures(self.target.model).collect();
        let pairs: Vec<(&EdmFunction, &EdmFunction)> = source
            .iter()
            .filter_map(|s| {
                target
                    .iter()
                    .find(|t| procedure_identity(t).eq_ignore_ascii_case(&procedure_identity(s)))
                    .map(|t| (*s, *t))
            })
            .collect();

        let mut added = Vec::new();
        let mut moved = Vec::new();
        let mut renamed = Vec::new();
        let mut altered = Vec::new();
        let mut removed = Vec::new();

        for function in &target {
            if !pairs.iter().any(|(_, t)| std::ptr::eq(*t, *function)) {
                added.push(MigrationOperation::CreateProcedure(self.procedure_model(function)));
            }
        }

        for (source, target) in &pairs {
            let old_schema = source.schema().unwrap_or(self.default_schema);
            let new_schema = target.schema().unwrap_or(self.default_schema);
            if !old_schema.eq_ignore_ascii_case(new_schema) {
                moved.push(MigrationOperation::MoveProcedure(MoveProcedureOperation {
                    name: format!("{}.{}", old_schema, source.store_name()),
                    new_schema: Some(new_schema.to_string()),
                }));
            }
            if !source.store_name().eq_ignore_ascii_case(target.store_name()) {
                renamed.push(MigrationOperation::RenameProcedure(RenameProcedureOperation {
                    name: format!("{}.{}", new_schema, source.store_name()),
                    new_name: target.store_name().to_string(),
                }));
            }
            let procedure = self.procedure_model(target);
            let mut previous = self.procedure_model(source);
            previous.name = procedure.name.clone();
            if previous != procedure {
                altered.push(MigrationOperation::AlterProcedure(AlterProcedureOperation {
                    procedure,
                    previous: Some(previous),
                }));
            }
        }

        for function in &source {
            if !pairs.iter().any(|(s, _)| std::ptr::eq(*s, *function)) {
                let definition = self.procedure_model(function);
                removed.push(MigrationOperation::DropProcedure(DropProcedureOperation {
                    name: definition.name.clone(),
                    definition: Some(definition),
                }));
            }
        }

        added
            .into_iter()
            .chain(moved)
            .chain(renamed)
            .chain(altered)
            .chain(removed)
            .collect()
    }

    fn procedure_model(&self, function: &EdmFunction) -> ProcedureModel {
        ProcedureModel {
            name: DatabaseName::new(
                Some(function.schema().unwrap_or(self.default_schema).to_string()),
                function.store_name(),
            )
            .to_string(),
            parameters: function.parameters().as_slice().to_vec(),
            body: function.body().unwrap_or_default().to_string(),
        }
    }
}

/// Match columns of two versions of a table: first by their pinned
/// conceptual member (or name), then by name.
fn pair_columns<'a>(source: &'a EntityType, target: &'a EntityType) -> Vec<(&'a EdmProperty, &'a EdmProperty)> {
    fn key(property: &EdmProperty) -> &str {
        property.mapped_member.as_deref().unwrap_or(&property.name)
    }

    let mut pairs: Vec<(&EdmProperty, &EdmProperty)> = Vec::new();
    for t in target.properties() {
        if let Some(s) = source.properties().iter().find(|s| key(s).eq_ignore_ascii_case(key(t))) {
            if !pairs.iter().any(|(matched, _)| std::ptr::eq(*matched, s)) {
                pairs.push((s, t));
            }
        }
    }
    for t in target.properties() {
        if pairs.iter().any(|(_, matched)| std::ptr::eq(*matched, t)) {
            continue;
        }
        let candidate = source.properties().iter().find(|s| {
            s.name.eq_ignore_ascii_case(&t.name) && !pairs.iter().any(|(matched, _)| std::ptr::eq(*matched, *s))
        });
        if let Some(s) = candidate {
            pairs.push((s, t));
        }
    }
    pairs
}

fn create_table(table: &Table<'_>) -> CreateTableOperation {
    let columns = table
        .entity
        .properties()
        .iter()
        .filter_map(ColumnModel::from_property)
        .collect();
    let keys = table.entity.key_members();
    CreateTableOperation {
        name: table.name.clone(),
        columns,
        primary_key: (!keys.is_empty()).then(|| PrimaryKeyModel::new(table.name.clone(), keys.to_vec())),
    }
}

/// Foreign key columns need their own index unless an explicit index or the
/// primary key already starts with them.
fn fk_index_needed(entity: &EntityType, columns: &[String]) -> bool {
    let starts_with = |candidate: &[String]| {
        candidate.len() >= columns.len() && same_names(&candidate[..columns.len()], columns)
    };
    !starts_with(entity.key_members()) && !entity.indexes().iter().any(|index| starts_with(&index.columns))
}

fn same_names(left: &[String], right: &[String]) -> bool {
    left.len() == right.len() && left.iter().zip(right).all(|(l, r)| l.eq_ignore_ascii_case(r))
}

fn changed_foreign_keys<'d>(
    source: &'d [ForeignKeyDef],
    target: &'d [ForeignKeyDef],
) -> (Vec<&'d ForeignKeyDef>, Vec<&'d ForeignKeyDef>) {
    let matching = |def: &ForeignKeyDef, others: &'d [ForeignKeyDef]| {
        others
            .iter()
            .find(|other| other.association.eq_ignore_ascii_case(&def.association))
    };
    let dropped = source
        .iter()
        .filter(|def| matching(def, target).map_or(true, |other| other.foreign_key != def.foreign_key))
        .collect();
    let added = target
        .iter()
        .filter(|def| matching(def, source).map_or(true, |other| other.foreign_key != def.foreign_key))
        .collect();
    (dropped, added)
}

fn push_distinct_index(indexes: &mut Vec<IndexModel>, index: IndexModel) {
    let duplicate = indexes.iter().any(|existing| {
        existing.table.eq_ignore_ascii_case(&index.table)
            && existing.resolved_name().eq_ignore_ascii_case(&index.resolved_name())
    });
    if !duplicate {
        indexes.push(index);
    }
}

fn push_distinct_fk(foreign_keys: &mut Vec<ForeignKeyModel>, foreign_key: ForeignKeyModel) {
    let duplicate = foreign_keys.iter().any(|existing| {
        existing.dependent_table.eq_ignore_ascii_case(&foreign_key.dependent_table)
            && existing.resolved_name().eq_ignore_ascii_case(&foreign_key.resolved_name())
    });
    if !duplicate {
        foreign_keys.push(foreign_key);
    }
}

/// Store functions with a body are stored procedures.
fn procedures(model: &EdmModel) -> impl Iterator<Item = &EdmFunction> {
    model.functions().filter(|function| function.body().is_some())
}

/// Identity that survives renames: the modification mapping when present.
fn procedure_identity(function: &EdmFunction) -> String {
    function
        .mapping()
        .map(|mapping| mapping.key())
        .unwrap_or_else(|| function.identity().to_string())
}

trait Rename: Clone {
    /// Whether applying `self` first would collide with `later`.
    fn blocks(&self, later: &Self) -> bool;
    /// Redirect `self` to `temp`, returning the rename that finishes it.
    fn via_temp(&mut self, temp: &str) -> Self;
}

impl Rename for RenameTableOperation {
    fn blocks(&self, later: &Self) -> bool {
        let mine = DatabaseName::parse(&self.name);
        let theirs = DatabaseName::parse(&later.name);
        mine.schema().map(str::to_ascii_lowercase) == theirs.schema().map(str::to_ascii_lowercase)
            && self.new_name.eq_ignore_ascii_case(theirs.name())
    }

    fn via_temp(&mut self, temp: &str) -> Self {
        let follow_up = RenameTableOperation {
            name: DatabaseName::parse(&self.name).with_name(temp).to_string(),
            new_name: self.new_name.clone(),
        };
        self.new_name = temp.to_string();
        follow_up
    }
}

impl Rename for RenameColumnOperation {
    fn blocks(&self, later: &Self) -> bool {
        self.table.eq_ignore_ascii_case(&later.table) && self.new_name.eq_ignore_ascii_case(&later.name)
    }

    fn via_temp(&mut self, temp: &str) -> Self {
        let follow_up = RenameColumnOperation {
            table: self.table.clone(),
            name: temp.to_string(),
            new_name: self.new_name.clone(),
        };
        self.new_name = temp.to_string();
        follow_up
    }
}

/// Order renames so none collides with a name still in use, going through
/// temporary names for cycles such as `A -> B, B -> A`.
fn resolve_transitive_renames<T: Rename>(renames: Vec<T>) -> Vec<T> {
    let mut ordered = Vec::with_capacity(renames.len());
    let mut follow_ups = Vec::new();
    for (i, rename) in renames.iter().enumerate() {
        let mut rename = rename.clone();
        if renames[i + 1..].iter().any(|later| rename.blocks(later)) {
            let temp = format!("{}{}", TEMP_RENAME_PREFIX, follow_ups.len());
            follow_ups.push(rename.via_temp(&temp));
        }
        ordered.push(rename);
    }
    ordered.extend(follow_ups);
    ordered
}
