//! Migration operations.
//!
//! Every schema change is one variant of [`MigrationOperation`]. Operations
//! know whether they destroy data and, where they carry enough information,
//! how to undo themselves.

use super::column::ColumnModel;
use super::names::{self, DatabaseName};
use edm_metadata::FunctionParameter;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Primary key of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryKeyModel {
    /// Constraint name. `None` means `PK_{table}`.
    pub name: Option<String>,
    pub table: String,
    pub columns: Vec<String>,
    pub clustered: bool,
}

impl PrimaryKeyModel {
    pub fn new<I, S>(table: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: None,
            table: table.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            clustered: true,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn nonclustered(mut self) -> Self {
        self.clustered = false;
        self
    }

    /// The explicit or default constraint name.
    pub fn resolved_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| names::primary_key_name(&self.table))
    }
}

/// A foreign key constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyModel {
    /// Constraint name. `None` means `FK_{dependent}_{principal}_{columns}`.
    pub name: Option<String>,
    pub dependent_table: String,
    pub dependent_columns: Vec<String>,
    pub principal_table: String,
    /// Empty until filled in from the principal's key.
    pub principal_columns: Vec<String>,
    pub cascade_delete: bool,
}

impl ForeignKeyModel {
    /// A foreign key whose principal columns are resolved from the principal key.
    pub fn new<I, S>(dependent_table: impl Into<String>, dependent_columns: I, principal_table: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: None,
            dependent_table: dependent_table.into(),
            dependent_columns: dependent_columns.into_iter().map(Into::into).collect(),
            principal_table: principal_table.into(),
            principal_columns: Vec::new(),
            cascade_delete: false,
        }
    }

    pub fn references<I, S>(mut self, principal_columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.principal_columns = principal_columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn cascade_delete(mut self) -> Self {
        self.cascade_delete = true;
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn has_principal_columns(&self) -> bool {
        !self.principal_columns.is_empty()
    }

    /// The explicit or default constraint name.
    pub fn resolved_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| {
            names::foreign_key_name(&self.dependent_table, &self.principal_table, &self.dependent_columns)
        })
    }

    /// Index supporting this key on the dependent table.
    pub fn dependent_index(&self) -> IndexModel {
        IndexModel::new(self.dependent_table.clone(), self.dependent_columns.clone())
    }
}

/// An index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexModel {
    /// Index name. `None` means `IX_{table}_{columns}`.
    pub name: Option<String>,
    pub table: String,
    pub columns: Vec<String>,
    pub unique: bool,
    pub clustered: bool,
}

impl IndexModel {
    pub fn new<I, S>(table: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: None,
            table: table.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            unique: false,
            clustered: false,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn clustered(mut self) -> Self {
        self.clustered = true;
        self
    }

    pub fn resolved_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| names::index_name(&self.table, &self.columns))
    }
}

/// Creates a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTableOperation {
    pub name: String,
    pub columns: Vec<ColumnModel>,
    pub primary_key: Option<PrimaryKeyModel>,
}

impl CreateTableOperation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            primary_key: None,
        }
    }

    pub fn column(mut self, column: ColumnModel) -> Self {
        self.columns.push(column);
        self
    }

    /// Set the primary key over the given columns.
    pub fn primary_key<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = Some(PrimaryKeyModel::new(self.name.clone(), columns));
        self
    }
}

/// Drops a table, optionally remembering how to recreate it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropTableOperation {
    pub name: String,
    pub definition: Option<CreateTableOperation>,
}

/// Renames a table. `new_name` is unqualified; the schema is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameTableOperation {
    pub name: String,
    pub new_name: String,
}

/// Moves a table into another schema. `None` moves it to the default schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveTableOperation {
    pub name: String,
    pub new_schema: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddColumnOperation {
    pub table: String,
    pub column: ColumnModel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropColumnOperation {
    pub table: String,
    pub name: String,
    /// The dropped column, needed to add it back.
    pub definition: Option<ColumnModel>,
}

/// Changes a column's type, facets or nullability in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterColumnOperation {
    pub table: String,
    pub column: ColumnModel,
    /// The column before the change.
    pub previous: Option<ColumnModel>,
    pub is_destructive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameColumnOperation {
    pub table: String,
    pub name: String,
    pub new_name: String,
}

/// A stored procedure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureModel {
    pub name: String,
    pub parameters: Vec<FunctionParameter>,
    pub body: String,
}

impl ProcedureModel {
    pub fn new(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            body: body.into(),
        }
    }

    pub fn parameter(mut self, parameter: FunctionParameter) -> Self {
        self.parameters.push(parameter);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlterProcedureOperation {
    pub procedure: ProcedureModel,
    pub previous: Option<ProcedureModel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropProcedureOperation {
    pub name: String,
    pub definition: Option<ProcedureModel>,
}

/// Renames a procedure. `new_name` is unqualified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameProcedureOperation {
    pub name: String,
    pub new_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveProcedureOperation {
    pub name: String,
    pub new_schema: Option<String>,
}

/// Raw SQL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlOperation {
    pub sql: String,
    /// Run outside the migration transaction.
    pub suppress_transaction: bool,
}

impl SqlOperation {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            suppress_transaction: false,
        }
    }

    pub fn suppress_transaction(mut self) -> Self {
        self.suppress_transaction = true;
        self
    }
}

/// A row of the migration history table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRow {
    pub migration_id: String,
    pub context_key: String,
    /// Compressed model snapshot.
    pub model: Vec<u8>,
    pub product_version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoryCommand {
    Insert(HistoryRow),
    Delete {
        migration_id: String,
        context_key: String,
    },
}

/// Writes to the migration history table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryOperation {
    pub table: String,
    pub command: HistoryCommand,
}

/// A single schema change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation")]
pub enum MigrationOperation {
    CreateTable(CreateTableOperation),
    DropTable(DropTableOperation),
    RenameTable(RenameTableOperation),
    MoveTable(MoveTableOperation),
    AddColumn(AddColumnOperation),
    AlterColumn(AlterColumnOperation),
    DropColumn(DropColumnOperation),
    RenameColumn(RenameColumnOperation),
    AddForeignKey(ForeignKeyModel),
    DropForeignKey(ForeignKeyModel),
    CreateIndex(IndexModel),
    DropIndex(IndexModel),
    AddPrimaryKey(PrimaryKeyModel),
    DropPrimaryKey(PrimaryKeyModel),
    CreateProcedure(ProcedureModel),
    AlterProcedure(AlterProcedureOperation),
    DropProcedure(DropProcedureOperation),
    RenameProcedure(RenameProcedureOperation),
    MoveProcedure(MoveProcedureOperation),
    Sql(SqlOperation),
    History(HistoryOperation),
}

impl MigrationOperation {
    pub fn create_table(operation: CreateTableOperation) -> Self {
        MigrationOperation::CreateTable(operation)
    }

    /// Drop a table without a captured definition.
    pub fn drop_table(name: impl Into<String>) -> Self {
        MigrationOperation::DropTable(DropTableOperation {
            name: name.into(),
            definition: None,
        })
    }

    pub fn rename_table(name: impl Into<String>, new_name: impl Into<String>) -> Self {
        MigrationOperation::RenameTable(RenameTableOperation {
            name: name.into(),
            new_name: new_name.into(),
        })
    }

    pub fn move_table(name: impl Into<String>, new_schema: Option<String>) -> Self {
        MigrationOperation::MoveTable(MoveTableOperation {
            name: name.into(),
            new_schema,
        })
    }

    pub fn add_column(table: impl Into<String>, column: ColumnModel) -> Self {
        MigrationOperation::AddColumn(AddColumnOperation {
            table: table.into(),
            column,
        })
    }

    /// Drop a column without a captured definition.
    pub fn drop_column(table: impl Into<String>, name: impl Into<String>) -> Self {
        MigrationOperation::DropColumn(DropColumnOperation {
            table: table.into(),
            name: name.into(),
            definition: None,
        })
    }

    /// Alter a column, classifying the change against `previous`.
    pub fn alter_column(table: impl Into<String>, column: ColumnModel, previous: Option<ColumnModel>) -> Self {
        let is_destructive = previous
            .as_ref()
            .is_some_and(|previous| column.is_narrower_than(previous));
        MigrationOperation::AlterColumn(AlterColumnOperation {
            table: table.into(),
            column,
            previous,
            is_destructive,
        })
    }

    pub fn rename_column(table: impl Into<String>, name: impl Into<String>, new_name: impl Into<String>) -> Self {
        MigrationOperation::RenameColumn(RenameColumnOperation {
            table: table.into(),
            name: name.into(),
            new_name: new_name.into(),
        })
    }

    pub fn sql(sql: impl Into<String>) -> Self {
        MigrationOperation::Sql(SqlOperation::new(sql))
    }

    /// Short name of the variant.
    pub fn kind_name(&self) -> &'static str {
        match self {
            MigrationOperation::CreateTable(_) => "CreateTable",
            MigrationOperation::DropTable(_) => "DropTable",
            MigrationOperation::RenameTable(_) => "RenameTable",
            MigrationOperation::MoveTable(_) => "MoveTable",
            MigrationOperation::AddColumn(_) => "AddColumn",
            MigrationOperation::AlterColumn(_) => "AlterColumn",
            MigrationOperation::DropColumn(_) => "DropColumn",
            MigrationOperation::RenameColumn(_) => "RenameColumn",
            MigrationOperation::AddForeignKey(_) => "AddForeignKey",
            MigrationOperation::DropForeignKey(_) => "DropForeignKey",
            MigrationOperation::CreateIndex(_) => "CreateIndex",
            MigrationOperation::DropIndex(_) => "DropIndex",
            MigrationOperation::AddPrimaryKey(_) => "AddPrimaryKey",
            MigrationOperation::DropPrimaryKey(_) => "DropPrimaryKey",
            MigrationOperation::CreateProcedure(_) => "CreateProcedure",
            MigrationOperation::AlterProcedure(_) => "AlterProcedure",
            MigrationOperation::DropProcedure(_) => "DropProcedure",
            MigrationOperation::RenameProcedure(_) => "RenameProcedure",
            MigrationOperation::MoveProcedure(_) => "MoveProcedure",
            MigrationOperation::Sql(_) => "Sql",
            MigrationOperation::History(_) => "History",
        }
    }

    /// Whether applying this operation discards data.
    pub fn is_destructive(&self) -> bool {
        match self {
            MigrationOperation::DropTable(_) | MigrationOperation::DropColumn(_) => true,
            MigrationOperation::AlterColumn(op) => op.is_destructive,
            _ => false,
        }
    }

    /// Whether this operation touches stored procedures.
    pub fn is_procedure_operation(&self) -> bool {
        matches!(
            self,
            MigrationOperation::CreateProcedure(_)
                | MigrationOperation::AlterProcedure(_)
                | MigrationOperation::DropProcedure(_)
                | MigrationOperation::RenameProcedure(_)
                | MigrationOperation::MoveProcedure(_)
        )
    }

    /// The operation that undoes this one, when it can be derived.
    pub fn inverse(&self) -> Option<MigrationOperation> {
        let inverse = match self {
            MigrationOperation::CreateTable(op) => MigrationOperation::DropTable(DropTableOperation {
                name: op.name.clone(),
                definition: Some(op.clone()),
            }),
            MigrationOperation::DropTable(op) => MigrationOperation::CreateTable(op.definition.clone()?),
            MigrationOperation::RenameTable(op) => {
                let name = DatabaseName::parse(&op.name);
                MigrationOperation::RenameTable(RenameTableOperation {
                    name: name.with_name(op.new_name.clone()).to_string(),
                    new_name: name.name().to_string(),
                })
            }
            MigrationOperation::MoveTable(op) => {
                let (name, new_schema) = invert_move(&op.name, &op.new_schema);
                MigrationOperation::MoveTable(MoveTableOperation { name, new_schema })
            }
            MigrationOperation::AddColumn(op) => MigrationOperation::DropColumn(DropColumnOperation {
                table: op.table.clone(),
                name: op.column.name.clone(),
                definition: Some(op.column.clone()),
            }),
            MigrationOperation::DropColumn(op) => MigrationOperation::AddColumn(AddColumnOperation {
                table: op.table.clone(),
                column: op.definition.clone()?,
            }),
            MigrationOperation::AlterColumn(op) => {
                let previous = op.previous.clone()?;
                MigrationOperation::alter_column(op.table.clone(), previous, Some(op.column.clone()))
            }
            MigrationOperation::RenameColumn(op) => MigrationOperation::RenameColumn(RenameColumnOperation {
                table: op.table.clone(),
                name: op.new_name.clone(),
                new_name: op.name.clone(),
            }),
            MigrationOperation::AddForeignKey(fk) => MigrationOperation::DropForeignKey(fk.clone()),
            MigrationOperation::DropForeignKey(fk) => MigrationOperation::AddForeignKey(fk.clone()),
            MigrationOperation::CreateIndex(index) => MigrationOperation::DropIndex(index.clone()),
            MigrationOperation::DropIndex(index) => MigrationOperation::CreateIndex(index.clone()),
            MigrationOperation::AddPrimaryKey(pk) => MigrationOperation::DropPrimaryKey(pk.clone()),
            MigrationOperation::DropPrimaryKey(pk) => MigrationOperation::AddPrimaryKey(pk.clone()),
            MigrationOperation::CreateProcedure(procedure) => {
                MigrationOperation::DropProcedure(DropProcedureOperation {
                    name: procedure.name.clone(),
                    definition: Some(procedure.clone()),
                })
            }
            MigrationOperation::AlterProcedure(op) => MigrationOperation::AlterProcedure(AlterProcedureOperation {
                procedure: op.previous.clone()?,
                previous: Some(op.procedure.clone()),
            }),
            MigrationOperation::DropProcedure(op) => MigrationOperation::CreateProcedure(op.definition.clone()?),
            MigrationOperation::RenameProcedure(op) => {
                let name = DatabaseName::parse(&op.name);
                MigrationOperation::RenameProcedure(RenameProcedureOperation {
                    name: name.with_name(op.new_name.clone()).to_string(),
                    new_name: name.name().to_string(),
                })
            }
            MigrationOperation::MoveProcedure(op) => {
                let (name, new_schema) = invert_move(&op.name, &op.new_schema);
                MigrationOperation::MoveProcedure(MoveProcedureOperation { name, new_schema })
            }
            MigrationOperation::Sql(_) => return None,
            MigrationOperation::History(op) => match &op.command {
                HistoryCommand::Insert(row) => MigrationOperation::History(HistoryOperation {
                    table: op.table.clone(),
                    command: HistoryCommand::Delete {
                        migration_id: row.migration_id.clone(),
                        context_key: row.context_key.clone(),
                    },
                }),
                HistoryCommand::Delete { .. } => return None,
            },
        };
        Some(inverse)
    }
}

fn invert_move(name: &str, new_schema: &Option<String>) -> (String, Option<String>) {
    let name = DatabaseName::parse(name);
    let moved = name.with_schema(new_schema.clone());
    (moved.to_string(), name.schema().map(str::to_string))
}

/// Inverses of `operations` in reverse order, or `None` if any has no inverse.
pub fn inverse_all(operations: &[MigrationOperation]) -> Option<Vec<MigrationOperation>> {
    operations.iter().rev().map(MigrationOperation::inverse).collect()
}

impl fmt::Display for MigrationOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = self.kind_name();
        match self {
            MigrationOperation::CreateTable(op) => write!(f, "{kind} {}", op.name),
            MigrationOperation::DropTable(op) => write!(f, "{kind} {}", op.name),
            MigrationOperation::RenameTable(op) => write!(f, "{kind} {} to {}", op.name, op.new_name),
            MigrationOperation::MoveTable(op) => {
                write!(f, "{kind} {} to {}", op.name, op.new_schema.as_deref().unwrap_or("default schema"))
            }
            MigrationOperation::AddColumn(op) => write!(f, "{kind} {}.{}", op.table, op.column.name),
            MigrationOperation::AlterColumn(op) => write!(f, "{kind} {}.{}", op.table, op.column.name),
            MigrationOperation::DropColumn(op) => write!(f, "{kind} {}.{}", op.table, op.name),
            MigrationOperation::RenameColumn(op) => {
                write!(f, "{kind} {}.{} to {}", op.table, op.name, op.new_name)
            }
            MigrationOperation::AddForeignKey(fk) | MigrationOperation::DropForeignKey(fk) => {
                write!(f, "{kind} {} on {}", fk.resolved_name(), fk.dependent_table)
            }
            MigrationOperation::CreateIndex(index) | MigrationOperation::DropIndex(index) => {
                write!(f, "{kind} {} on {}", index.resolved_name(), index.table)
            }
            MigrationOperation::AddPrimaryKey(pk) | MigrationOperation::DropPrimaryKey(pk) => {
                write!(f, "{kind} {} on {}", pk.resolved_name(), pk.table)
            }
            MigrationOperation::CreateProcedure(procedure) => write!(f, "{kind} {}", procedure.name),
            MigrationOperation::AlterProcedure(op) => write!(f, "{kind} {}", op.procedure.name),
            MigrationOperation::DropProcedure(op) => write!(f, "{kind} {}", op.name),
            MigrationOperation::RenameProcedure(op) => write!(f, "{kind} {} to {}", op.name, op.new_name),
            MigrationOperation::MoveProcedure(op) => {
                write!(f, "{kind} {} to {}", op.name, op.new_schema.as_deref().unwrap_or("default schema"))
            }
            MigrationOperation::Sql(op) => write!(f, "{kind} ({} chars)", op.sql.len()),
            MigrationOperation::History(op) => match &op.command {
                HistoryCommand::Insert(row) => write!(f, "{kind} insert {}", row.migration_id),
                HistoryCommand::Delete { migration_id, .. } => write!(f, "{kind} delete {migration_id}"),
            },
        }
    }
}

macro_rules! impl_from_operation {
    ($($payload:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$payload> for MigrationOperation {
                fn from(operation: $payload) -> Self {
                    MigrationOperation::$variant(operation)
                }
            }
        )*
    };
}

impl_from_operation! {
    CreateTableOperation => CreateTable,
    DropTableOperation => DropTable,
    RenameTableOperation => RenameTable,
    MoveTableOperation => MoveTable,
    AddColumnOperation => AddColumn,
    AlterColumnOperation => AlterColumn,
    DropColumnOperation => DropColumn,
    RenameColumnOperation => RenameColumn,
    ProcedureModel => CreateProcedure,
    AlterProcedureOperation => AlterProcedure,
    DropProcedureOperation => DropProcedure,
    RenameProcedureOperation => RenameProcedure,
    MoveProcedureOperation => MoveProcedure,
    SqlOperation => Sql,
    HistoryOperation => History,
}

#[cfg(test)]
mod tests {
    use super::*;
    use edm_metadata::PrimitiveTypeKind;
    use pretty_assertions::assert_eq;

    fn customers() -> CreateTableOperation {
        CreateTableOperation::new("dbo.Customers")
            .column(ColumnModel::new("Id", PrimitiveTypeKind::Int32).not_null().identity())
            .column(ColumnModel::new("Name", PrimitiveTypeKind::String))
            .primary_key(["Id"])
    }

    #[test]
    fn test_destructive_classification() {
        assert!(MigrationOperation::drop_table("dbo.Customers").is_destructive());
        assert!(MigrationOperation::drop_column("dbo.Customers", "Name").is_destructive());
        assert!(!MigrationOperation::create_table(customers()).is_destructive());
        assert!(!MigrationOperation::rename_table("dbo.Customers", "Clients").is_destructive());

        let wide = ColumnModel::new("Name", PrimitiveTypeKind::String);
        let narrow = wide.clone().with_max_length(edm_metadata::MaxLength::Fixed(10));
        assert!(MigrationOperation::alter_column("dbo.Customers", narrow.clone(), Some(wide.clone())).is_destructive());
        assert!(!MigrationOperation::alter_column("dbo.Customers", wide, Some(narrow)).is_destructive());
    }

    #[test]
    fn test_create_table_round_trips_through_inverse() {
        let create = MigrationOperation::create_table(customers());
        let drop = create.inverse().unwrap();
        assert!(matches!(&drop, MigrationOperation::DropTable(op) if op.definition.is_some()));
        assert_eq!(drop.inverse().unwrap(), create);
    }

    #[test]
    fn test_rename_and_move_inverses() {
        let rename = MigrationOperation::rename_table("sales.Customers", "Clients");
        assert_eq!(
            rename.inverse().unwrap(),
            MigrationOperation::rename_table("sales.Clients", "Customers")
        );

        let moved = MigrationOperation::move_table("dbo.Customers", Some("sales".to_string()));
        assert_eq!(
            moved.inverse().unwrap(),
            MigrationOperation::move_table("sales.Customers", Some("dbo".to_string()))
        );

        let column = MigrationOperation::rename_column("dbo.Customers", "Name", "FullName");
        assert_eq!(
            column.inverse().unwrap(),
            MigrationOperation::rename_column("dbo.Customers", "FullName", "Name")
        );
    }

    #[test]
    fn test_operations_without_inverse() {
        assert!(MigrationOperation::drop_table("dbo.Customers").inverse().is_none());
        assert!(MigrationOperation::drop_column("dbo.Customers", "Name").inverse().is_none());
        assert!(MigrationOperation::sql("SELECT 1").inverse().is_none());
        let alter = MigrationOperation::alter_column(
            "dbo.Customers",
            ColumnModel::new("Name", PrimitiveTypeKind::String),
            None,
        );
        assert!(alter.inverse().is_none());
    }

    #[test]
    fn test_inverse_all_reverses_order() {
        let fk = ForeignKeyModel::new("dbo.Orders", ["CustomerId"], "dbo.Customers").references(["Id"]);
        let operations = vec![
            MigrationOperation::CreateIndex(fk.dependent_index()),
            MigrationOperation::AddForeignKey(fk.clone()),
        ];
        let inverse = inverse_all(&operations).unwrap();
        assert_eq!(
            inverse,
            vec![
                MigrationOperation::DropForeignKey(fk.clone()),
                MigrationOperation::DropIndex(fk.dependent_index()),
            ]
        );

        let mut with_sql = operations;
        with_sql.push(MigrationOperation::sql("UPDATE x SET y = 1"));
        assert!(inverse_all(&with_sql).is_none());
    }

    #[test]
    fn test_default_names() {
        let fk = ForeignKeyModel::new("OrderLines", ["ProductId", "Sku"], "MigrationsProducts");
        assert_eq!(fk.resolved_name(), "FK_OrderLines_MigrationsProducts_ProductId_Sku");
        assert_eq!(fk.dependent_index().resolved_name(), "IX_OrderLines_ProductId_Sku");
        assert_eq!(customers().primary_key.unwrap().resolved_name(), "PK_Customers");
    }

    #[test]
    fn test_operations_serialize_with_tag() {
        let operation = MigrationOperation::rename_column("dbo.Customers", "Name", "FullName");
        let json = serde_json::to_value(&operation).unwrap();
        assert_eq!(json["operation"], "RenameColumn");
        let back: MigrationOperation = serde_json::from_value(json).unwrap();
        assert_eq!(back, operation);
    }

    #[test]
    fn test_display_names_the_target() {
        assert_eq!(
            MigrationOperation::drop_column("dbo.Customers", "Name").to_string(),
            "DropColumn dbo.Customers.Name"
        );
    }
}
