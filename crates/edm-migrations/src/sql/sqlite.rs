//! SQLite dialect.
//!
//! SQLite has no schemas and cannot alter constraints on existing tables.
//! Schema names are dropped, moves generate nothing, and foreign keys are
//! written inline when their dependent table is created in the same batch.

use super::{quoted_text, unsupported, MigrationSqlGenerator, MigrationStatement, SQLITE_PROVIDER};
use crate::model::names::{self, DatabaseName};
use crate::model::{
    ColumnModel, ColumnValue, CreateTableOperation, ForeignKeyModel, HistoryCommand, HistoryOperation,
    MigrationOperation,
};
use crate::Result;
use edm_metadata::PrimitiveTypeKind;

/// Generates SQL executable by SQLite.
#[derive(Debug, Clone, Default)]
pub struct SqliteMigrationSqlGenerator;

impl SqliteMigrationSqlGenerator {
    pub fn new() -> Self {
        Self
    }

    fn table(&self, name: &str) -> String {
        self.quote_table(&DatabaseName::parse(name))
    }

    fn create_table(&self, operation: &CreateTableOperation, foreign_keys: &[&ForeignKeyModel]) -> String {
        let pk = operation.primary_key.as_ref();
        // A single integer identity key becomes the rowid alias.
        let rowid_key = pk.and_then(|pk| match pk.columns.as_slice() {
            [key] => operation
                .columns
                .iter()
                .find(|column| column.name.eq_ignore_ascii_case(key) && column.identity && column.kind.is_integer()),
            _ => None,
        });

        let mut lines = Vec::new();
        for column in &operation.columns {
            let mut line = format!("    {}", self.column_definition(column));
            if let (Some(key), Some(pk)) = (rowid_key, pk) {
                if std::ptr::eq(key, column) {
                    line.push_str(&format!(
                        " CONSTRAINT {} PRIMARY KEY AUTOINCREMENT",
                        self.quote_identifier(&pk.resolved_name())
                    ));
                }
            }
            lines.push(line);
        }
        if let Some(pk) = pk.filter(|_| rowid_key.is_none()) {
            lines.push(format!(
                "    CONSTRAINT {} PRIMARY KEY ({})",
                self.quote_identifier(&pk.resolved_name()),
                self.column_list(&pk.columns)
            ));
        }
        for fk in foreign_keys {
            let mut line = format!(
                "    CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {}",
                self.quote_identifier(&fk.resolved_name()),
                self.column_list(&fk.dependent_columns),
                self.table(&fk.principal_table)
            );
            if fk.has_principal_columns() {
                line.push_str(&format!(" ({})", self.column_list(&fk.principal_columns)));
            }
            if fk.cascade_delete {
                line.push_str(" ON DELETE CASCADE");
            }
            lines.push(line);
        }
        format!("CREATE TABLE {} (\n{}\n)", self.table(&operation.name), lines.join(",\n"))
    }

    fn history(&self, operation: &HistoryOperation) -> String {
        let table = self.table(&operation.table);
        match &operation.command {
            HistoryCommand::Insert(row) => format!(
                "INSERT INTO {table} (\"MigrationId\", \"ContextKey\", \"Model\", \"ProductVersion\") VALUES ({}, {}, {}, {})",
                self.string_literal(&row.migration_id),
                self.string_literal(&row.context_key),
                self.binary_literal(&row.model),
                self.string_literal(&row.product_version)
            ),
            HistoryCommand::Delete {
                migration_id,
                context_key,
            } => format!(
                "DELETE FROM {table} WHERE \"MigrationId\" = {} AND \"ContextKey\" = {}",
                self.string_literal(migration_id),
                self.string_literal(context_key)
            ),
        }
    }

    fn column_list(&self, columns: &[String]) -> String {
        columns
            .iter()
            .map(|column| self.quote_identifier(column))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn column_definition(&self, column: &ColumnModel) -> String {
        let mut sql = format!("{} {}", self.quote_identifier(&column.name), self.column_type(column));
        if !column.nullable {
            sql.push_str(" NOT NULL");
        }
        if let Some(default) = self.default_sql(column) {
            sql.push_str(" DEFAULT ");
            sql.push_str(&default);
        }
        if let Some(collation) = &column.collation {
            sql.push_str(" COLLATE ");
            sql.push_str(collation);
        }
        sql
    }

    fn default_sql(&self, column: &ColumnModel) -> Option<String> {
        if let Some(sql) = column.default_value_sql.as_deref().filter(|sql| !sql.trim().is_empty()) {
            return Some(format!("({sql})"));
        }
        column.default_value.as_ref().map(|value| match value {
            ColumnValue::Boolean(value) => (if *value { "1" } else { "0" }).to_string(),
            ColumnValue::Integer(value) => value.to_string(),
            ColumnValue::Float(value) => value.to_string(),
            ColumnValue::Decimal(value) => value.clone(),
            ColumnValue::Text(value) => self.string_literal(value),
            ColumnValue::Binary(value) => self.binary_literal(value),
            ColumnValue::DateTime(value) => quoted_text(&value.format("%Y-%m-%d %H:%M:%S%.3f").to_string()),
            ColumnValue::Guid(value) => quoted_text(value),
        })
    }

    fn column_type(&self, column: &ColumnModel) -> String {
        if let Some(store_type) = &column.store_type {
            return store_type.clone();
        }
        use PrimitiveTypeKind::*;
        let affinity = match column.kind {
            Boolean | Byte | Int16 | Int32 | Int64 => "INTEGER",
            Single | Double => "REAL",
            Decimal => "NUMERIC",
            String | DateTime | DateTimeOffset | Time | Guid => "TEXT",
            Binary | Geography | Geometry => "BLOB",
        };
        affinity.to_string()
    }
}

impl MigrationSqlGenerator for SqliteMigrationSqlGenerator {
    fn provider_name(&self) -> &'static str {
        SQLITE_PROVIDER
    }

    fn generate(&self, operations: &[MigrationOperation]) -> Result<Vec<MigrationStatement>> {
        let same_table = |a: &str, b: &str| names::strip_schema(a).eq_ignore_ascii_case(names::strip_schema(b));
        let created = |table: &str| {
            operations
                .iter()
                .any(|op| matches!(op, MigrationOperation::CreateTable(create) if same_table(&create.name, table)))
        };
        let dropped = |table: &str| {
            operations
                .iter()
                .any(|op| matches!(op, MigrationOperation::DropTable(drop) if same_table(&drop.name, table)))
        };

        let mut statements = Vec::new();
        for operation in operations {
            let sql = match operation {
                MigrationOperation::CreateTable(op) => {
                    let foreign_keys: Vec<&ForeignKeyModel> = operations
                        .iter()
                        .filter_map(|op| match op {
                            MigrationOperation::AddForeignKey(fk) => Some(fk),
                            _ => None,
                        })
                        .filter(|fk| same_table(&fk.dependent_table, &op.name))
                        .collect();
                    self.create_table(op, &foreign_keys)
                }
                MigrationOperation::AddForeignKey(fk) if created(&fk.dependent_table) => continue,
                MigrationOperation::DropForeignKey(fk) if dropped(&fk.dependent_table) => continue,
                MigrationOperation::MoveTable(_) | MigrationOperation::MoveProcedure(_) => continue,
                MigrationOperation::DropTable(op) => format!("DROP TABLE {}", self.table(&op.name)),
                MigrationOperation::RenameTable(op) => format!(
                    "ALTER TABLE {} RENAME TO {}",
                    self.table(&op.name),
                    self.quote_identifier(&op.new_name)
                ),
                MigrationOperation::AddColumn(op) => {
                    let mut column = op.column.clone();
                    if !column.nullable && !column.has_default() {
                        column.default_value = column.clr_default_value();
                    }
                    format!(
                        "ALTER TABLE {} ADD COLUMN {}",
                        self.table(&op.table),
                        self.column_definition(&column)
                    )
                }
                MigrationOperation::DropColumn(op) => format!(
                    "ALTER TABLE {} DROP COLUMN {}",
                    self.table(&op.table),
                    self.quote_identifier(&op.name)
                ),
                MigrationOperation::RenameColumn(op) => format!(
                    "ALTER TABLE {} RENAME COLUMN {} TO {}",
                    self.table(&op.table),
                    self.quote_identifier(&op.name),
                    self.quote_identifier(&op.new_name)
                ),
                MigrationOperation::CreateIndex(index) => format!(
                    "CREATE {}INDEX {} ON {} ({})",
                    if index.unique { "UNIQUE " } else { "" },
                    self.quote_identifier(&index.resolved_name()),
                    self.table(&index.table),
                    self.column_list(&index.columns)
                ),
                MigrationOperation::DropIndex(index) => {
                    format!("DROP INDEX {}", self.quote_identifier(&index.resolved_name()))
                }
                MigrationOperation::Sql(op) => {
                    statements.push(MigrationStatement::new(op.sql.clone()).suppress_transaction(op.suppress_transaction));
                    continue;
                }
                MigrationOperation::History(op) => self.history(op),
                MigrationOperation::AddForeignKey(_)
                | MigrationOperation::DropForeignKey(_)
                | MigrationOperation::AlterColumn(_)
                | MigrationOperation::AddPrimaryKey(_)
                | MigrationOperation::DropPrimaryKey(_)
                | MigrationOperation::CreateProcedure(_)
                | MigrationOperation::AlterProcedure(_)
                | MigrationOperation::DropProcedure(_)
                | MigrationOperation::RenameProcedure(_) => return Err(unsupported(operation, SQLITE_PROVIDER)),
            };
            statements.push(MigrationStatement::new(sql));
        }
        Ok(statements)
    }

    fn quote_identifier(&self, identifier: &str) -> String {
        format!("\"{}\"", identifier.replace('"', "\"\""))
    }

    /// Schemas do not exist in SQLite; only the name is kept.
    fn quote_table(&self, name: &DatabaseName) -> String {
        self.quote_identifier(name.name())
    }

    fn string_literal(&self, value: &str) -> String {
        quoted_text(value)
    }

    fn binary_literal(&self, value: &[u8]) -> String {
        format!("X'{}'", hex::encode_upper(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MigrationError;
    use crate::model::{IndexModel, PrimaryKeyModel};
    use pretty_assertions::assert_eq;

    fn sql(operations: &[MigrationOperation]) -> Vec<String> {
        SqliteMigrationSqlGenerator::new()
            .generate(operations)
            .unwrap()
            .into_iter()
            .map(|statement| statement.sql)
            .collect()
    }

    fn products() -> CreateTableOperation {
        CreateTableOperation::new("dbo.MigrationsProducts")
            .column(ColumnModel::new("ProductId", PrimitiveTypeKind::Int32).not_null())
            .column(ColumnModel::new("Sku", PrimitiveTypeKind::String).not_null())
            .column(ColumnModel::new("Name", PrimitiveTypeKind::String))
            .primary_key(["ProductId", "Sku"])
    }

    #[test]
    fn test_identity_key_becomes_autoincrement() {
        let create = CreateTableOperation::new("dbo.Customers")
            .column(ColumnModel::new("Id", PrimitiveTypeKind::Int32).not_null().identity())
            .column(ColumnModel::new("Name", PrimitiveTypeKind::String))
            .primary_key(["Id"]);
        assert_eq!(
            sql(&[create.into()]),
            vec!["CREATE TABLE \"Customers\" (\n    \"Id\" INTEGER NOT NULL CONSTRAINT \"PK_Customers\" PRIMARY KEY AUTOINCREMENT,\n    \"Name\" TEXT\n)"]
        );
    }

    #[test]
    fn test_foreign_key_inlined_into_create_table() {
        let lines = CreateTableOperation::new("OrderLines")
            .column(ColumnModel::new("Id", PrimitiveTypeKind::Int32).not_null())
            .column(ColumnModel::new("ProductId", PrimitiveTypeKind::Int32).not_null())
            .column(ColumnModel::new("Sku", PrimitiveTypeKind::String).not_null())
            .primary_key(["Id"]);
        let fk = ForeignKeyModel::new("OrderLines", ["ProductId", "Sku"], "MigrationsProducts");
        let statements = sql(&[products().into(), lines.into(), MigrationOperation::AddForeignKey(fk)]);

        assert_eq!(statements.len(), 2);
        assert!(statements[0].contains("CONSTRAINT \"PK_MigrationsProducts\" PRIMARY KEY (\"ProductId\", \"Sku\")"));
        assert!(statements[1].ends_with(
            "    CONSTRAINT \"FK_OrderLines_MigrationsProducts_ProductId_Sku\" FOREIGN KEY (\"ProductId\", \"Sku\") REFERENCES \"MigrationsProducts\"\n)"
        ));
    }

    #[test]
    fn test_column_statements() {
        let statements = sql(&[
            MigrationOperation::add_column(
                "dbo.MigrationsCustomers",
                ColumnModel::new("new_col", PrimitiveTypeKind::Int32).not_null(),
            ),
            MigrationOperation::rename_column("dbo.MigrationsCustomers", "new_col", "Rating"),
            MigrationOperation::drop_column("dbo.MigrationsCustomers", "Rating"),
            MigrationOperation::rename_table("dbo.MigrationsCustomers", "Customers"),
            MigrationOperation::move_table("dbo.Customers", Some("sales".to_string())),
        ]);
        assert_eq!(
            statements,
            vec![
                "ALTER TABLE \"MigrationsCustomers\" ADD COLUMN \"new_col\" INTEGER NOT NULL DEFAULT 0",
                "ALTER TABLE \"MigrationsCustomers\" RENAME COLUMN \"new_col\" TO \"Rating\"",
                "ALTER TABLE \"MigrationsCustomers\" DROP COLUMN \"Rating\"",
                "ALTER TABLE \"MigrationsCustomers\" RENAME TO \"Customers\"",
            ]
        );
    }

    #[test]
    fn test_foreign_key_drop_elided_with_its_table() {
        let fk = ForeignKeyModel::new("dbo.Orders", ["CustomerId"], "dbo.Customers").references(["Id"]);
        let index = IndexModel::new("dbo.Orders", ["CustomerId"]);
        let statements = sql(&[
            MigrationOperation::DropForeignKey(fk),
            MigrationOperation::DropIndex(index),
            MigrationOperation::drop_table("dbo.Orders"),
        ]);
        assert_eq!(statements, vec!["DROP INDEX \"IX_Orders_CustomerId\"", "DROP TABLE \"Orders\""]);
    }

    #[test]
    fn test_unsupported_operations() {
        let generator = SqliteMigrationSqlGenerator::new();
        let fk = ForeignKeyModel::new("Orders", ["CustomerId"], "Customers");
        for operation in [
            MigrationOperation::AddForeignKey(fk),
            MigrationOperation::AddPrimaryKey(PrimaryKeyModel::new("Orders", ["Id"])),
            MigrationOperation::alter_column("Orders", ColumnModel::new("Total", PrimitiveTypeKind::Decimal), None),
        ] {
            let err = generator.generate(&[operation]).unwrap_err();
            assert!(matches!(err, MigrationError::UnsupportedOperation { ref provider, .. } if provider == SQLITE_PROVIDER));
        }
    }
}
