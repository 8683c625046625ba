//! SQL Server dialect.

use super::{quoted_text, MigrationSqlGenerator, MigrationStatement, SQL_SERVER_PROVIDER};
use crate::config::DEFAULT_SCHEMA;
use crate::model::column::{DEFAULT_DECIMAL_PRECISION, DEFAULT_DECIMAL_SCALE};
use crate::model::names::{self, DatabaseName};
use crate::model::{
    AlterColumnOperation, ColumnModel, ColumnValue, CreateTableOperation, ForeignKeyModel, HistoryCommand,
    HistoryOperation, IndexModel, MigrationOperation, PrimaryKeyModel, ProcedureModel,
};
use crate::Result;
use edm_metadata::{MaxLength, ParameterMode, PrimitiveTypeKind};

/// Terminator written after procedure definitions when scripting.
pub const BATCH_TERMINATOR: &str = "GO";

/// Length used for fixed-length columns without one.
const DEFAULT_FIXED_LENGTH: u32 = 128;

/// Generates T-SQL.
#[derive(Debug, Clone, Default)]
pub struct SqlServerMigrationSqlGenerator;

impl SqlServerMigrationSqlGenerator {
    pub fn new() -> Self {
        Self
    }

    fn table(&self, name: &str) -> String {
        self.quote_table(&DatabaseName::parse(name))
    }

    fn create_schema(&self, schema: &str) -> MigrationStatement {
        MigrationStatement::new(format!(
            "IF schema_id({}) IS NULL\n    EXECUTE('CREATE SCHEMA {}')",
            quoted_text(schema),
            self.quote_identifier(schema).replace('\'', "''")
        ))
    }

    fn create_table(&self, operation: &CreateTableOperation) -> String {
        let mut lines: Vec<String> = operation
            .columns
            .iter()
            .map(|column| format!("    {}", self.column_definition(column, true)))
            .collect();
        if let Some(pk) = &operation.primary_key {
            lines.push(format!(
                "    CONSTRAINT {} PRIMARY KEY{} ({})",
                self.quote_identifier(&pk.resolved_name()),
                if pk.clustered { "" } else { " NONCLUSTERED" },
                self.column_list(&pk.columns)
            ));
        }
        format!("CREATE TABLE {} (\n{}\n)", self.table(&operation.name), lines.join(",\n"))
    }

    fn rename_table(&self, name: &str, new_name: &str) -> MigrationStatement {
        let old = DatabaseName::parse(name);
        let old_pk = DatabaseName::new(old.schema().map(str::to_string), names::primary_key_name(old.name()));
        MigrationStatement::new(format!(
            "EXECUTE sp_rename @objname = {}, @newname = {}, @objtype = N'OBJECT'\n\
             IF object_id({}) IS NOT NULL BEGIN\n    \
             EXECUTE sp_rename @objname = {}, @newname = {}, @objtype = N'OBJECT'\n\
             END",
            self.string_literal(&old.to_string()),
            self.string_literal(new_name),
            self.string_literal(&self.quote_table(&old_pk)),
            self.string_literal(&self.quote_table(&old_pk)),
            self.string_literal(&names::primary_key_name(new_name)),
        ))
    }

    fn transfer(&self, name: &str, new_schema: Option<&str>) -> String {
        format!(
            "ALTER SCHEMA {} TRANSFER {}",
            self.quote_identifier(new_schema.unwrap_or(DEFAULT_SCHEMA)),
            self.table(name)
        )
    }

    fn add_column(&self, table: &str, column: &ColumnModel) -> String {
        let mut column = column.clone();
        if !column.nullable && !column.has_default() && !column.identity && !column.timestamp {
            column.default_value = column.clr_default_value();
        }
        format!(
            "ALTER TABLE {} ADD {}",
            self.table(table),
            self.column_definition(&column, true)
        )
    }

    /// Drops the default constraint SQL Server attaches to a column.
    fn drop_default_constraint(&self, table: &str, column: &str, variable: usize) -> String {
        let var = format!("@var{variable}");
        format!(
            "DECLARE {var} nvarchar(128)\n\
             SELECT {var} = name\n\
             FROM sys.default_constraints\n\
             WHERE parent_object_id = object_id({})\n\
             AND col_name(parent_object_id, parent_column_id) = {};\n\
             IF {var} IS NOT NULL\n    \
             EXECUTE('ALTER TABLE {} DROP CONSTRAINT [' + {var} + ']')",
            self.string_literal(&DatabaseName::parse(table).to_string()),
            quoted_text(column),
            self.table(table).replace('\'', "''"),
        )
    }

    fn alter_column(&self, operation: &AlterColumnOperation, variable: usize) -> String {
        let table = self.table(&operation.table);
        let column = &operation.column;
        let name = self.quote_identifier(&column.name);
        let mut sql = self.drop_default_constraint(&operation.table, &column.name, variable);

        if let Some(default) = self.default_sql(column) {
            let constraint = names::restrict(format!(
                "DF_{}_{}",
                names::strip_schema(&operation.table),
                column.name
            ));
            sql.push_str(&format!(
                "\nALTER TABLE {table} ADD CONSTRAINT {} DEFAULT {default} FOR {name}",
                self.quote_identifier(&constraint)
            ));
            if !column.nullable {
                sql.push_str(&format!("\nUPDATE {table} SET {name} = {default} WHERE {name} IS NULL"));
            }
        }

        let mut bare = column.clone();
        bare.default_value = None;
        bare.default_value_sql = None;
        bare.identity = false;
        sql.push_str(&format!(
            "\nALTER TABLE {table} ALTER COLUMN {}",
            self.column_definition(&bare, false)
        ));
        sql
    }

    fn add_foreign_key(&self, fk: &ForeignKeyModel) -> String {
        let mut sql = format!(
            "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {}",
            self.table(&fk.dependent_table),
            self.quote_identifier(&fk.resolved_name()),
            self.column_list(&fk.dependent_columns),
            self.table(&fk.principal_table)
        );
        if fk.has_principal_columns() {
            sql.push_str(&format!(" ({})", self.column_list(&fk.principal_columns)));
        }
        if fk.cascade_delete {
            sql.push_str(" ON DELETE CASCADE");
        }
        sql
    }

    fn create_index(&self, index: &IndexModel) -> String {
        format!(
            "CREATE {}{}INDEX {} ON {}({})",
            if index.unique { "UNIQUE " } else { "" },
            if index.clustered { "CLUSTERED " } else { "" },
            self.quote_identifier(&index.resolved_name()),
            self.table(&index.table),
            self.column_list(&index.columns)
        )
    }

    fn add_primary_key(&self, pk: &PrimaryKeyModel) -> String {
        format!(
            "ALTER TABLE {} ADD CONSTRAINT {} PRIMARY KEY{} ({})",
            self.table(&pk.table),
            self.quote_identifier(&pk.resolved_name()),
            if pk.clustered { "" } else { " NONCLUSTERED" },
            self.column_list(&pk.columns)
        )
    }

    fn procedure(&self, verb: &str, procedure: &ProcedureModel) -> MigrationStatement {
        let parameters: Vec<String> = procedure
            .parameters
            .iter()
            .map(|parameter| {
                let mut column = ColumnModel::new(parameter.name.clone(), parameter.kind);
                column.max_length = parameter.facets.max_length;
                column.precision = parameter.facets.precision;
                column.scale = parameter.facets.scale;
                column.fixed_length = parameter.facets.fixed_length;
                column.unicode = parameter.facets.unicode;
                column.store_type = parameter.store_type.clone();
                let out = match parameter.mode {
                    ParameterMode::Out | ParameterMode::InOut => " OUT",
                    ParameterMode::In | ParameterMode::ReturnValue => "",
                };
                format!("    @{} {}{}", parameter.name, self.column_type(&column), out)
            })
            .collect();

        let mut sql = format!("{verb} PROCEDURE {}", self.table(&procedure.name));
        if !parameters.is_empty() {
            sql.push('\n');
            sql.push_str(&parameters.join(",\n"));
        }
        sql.push_str("\nAS\nBEGIN\n");
        for line in procedure.body.lines() {
            sql.push_str("    ");
            sql.push_str(line);
            sql.push('\n');
        }
        sql.push_str("END");
        MigrationStatement::new(sql).with_batch_terminator(BATCH_TERMINATOR)
    }

    fn history(&self, operation: &HistoryOperation) -> String {
        let table = self.table(&operation.table);
        match &operation.command {
            HistoryCommand::Insert(row) => format!(
                "INSERT {table}([MigrationId], [ContextKey], [Model], [ProductVersion])\nVALUES ({}, {}, {}, {})",
                self.string_literal(&row.migration_id),
                self.string_literal(&row.context_key),
                self.binary_literal(&row.model),
                self.string_literal(&row.product_version)
            ),
            HistoryCommand::Delete {
                migration_id,
                context_key,
            } => format!(
                "DELETE {table}\nWHERE (([MigrationId] = {}) AND ([ContextKey] = {}))",
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

    /// `[name] type [COLLATE c] [NOT NULL] [DEFAULT d] [IDENTITY]`.
    fn column_definition(&self, column: &ColumnModel, with_default: bool) -> String {
        let mut sql = format!("{} {}", self.quote_identifier(&column.name), self.column_type(column));
        if let Some(collation) = &column.collation {
            sql.push_str(" COLLATE ");
            sql.push_str(collation);
        }
        if !column.nullable {
            sql.push_str(" NOT NULL");
        }
        if with_default {
            if let Some(default) = self.default_sql(column) {
                sql.push_str(" DEFAULT ");
                sql.push_str(&default);
            }
        }
        if column.identity {
            sql.push_str(" IDENTITY");
        }
        sql
    }

    fn default_sql(&self, column: &ColumnModel) -> Option<String> {
        if let Some(sql) = column.default_value_sql.as_deref().filter(|sql| !sql.trim().is_empty()) {
            return Some(sql.to_string());
        }
        column.default_value.as_ref().map(|value| self.literal(value))
    }

    fn literal(&self, value: &ColumnValue) -> String {
        match value {
            ColumnValue::Boolean(value) => (if *value { "1" } else { "0" }).to_string(),
            ColumnValue::Integer(value) => value.to_string(),
            ColumnValue::Float(value) => value.to_string(),
            ColumnValue::Decimal(value) => value.clone(),
            ColumnValue::Text(value) => self.string_literal(value),
            ColumnValue::Binary(value) => self.binary_literal(value),
            ColumnValue::DateTime(value) => quoted_text(&value.format("%Y-%m-%dT%H:%M:%S%.3f").to_string()),
            ColumnValue::Guid(value) => quoted_text(value),
        }
    }

    /// Store type of a column, e.g. `[nvarchar](max)`.
    fn column_type(&self, column: &ColumnModel) -> String {
        if let Some(store_type) = &column.store_type {
            return store_type.clone();
        }
        let fixed = column.fixed_length == Some(true);
        let length = |fixed_default: bool| match column.max_length {
            Some(MaxLength::Fixed(length)) => length.to_string(),
            _ if fixed_default => DEFAULT_FIXED_LENGTH.to_string(),
            _ => "max".to_string(),
        };
        use PrimitiveTypeKind::*;
        match column.kind {
            String => {
                let unicode = column.unicode != Some(false);
                let base = match (unicode, fixed) {
                    (true, true) => "nchar",
                    (true, false) => "nvarchar",
                    (false, true) => "char",
                    (false, false) => "varchar",
                };
                format!("[{base}]({})", length(fixed))
            }
            Binary if column.timestamp => "rowversion".to_string(),
            Binary => {
                let base = if fixed { "binary" } else { "varbinary" };
                format!("[{base}]({})", length(fixed))
            }
            Decimal => format!(
                "[decimal]({}, {})",
                column.precision.unwrap_or(DEFAULT_DECIMAL_PRECISION),
                column.scale.unwrap_or(DEFAULT_DECIMAL_SCALE)
            ),
            Boolean => "[bit]".to_string(),
            Byte => "[tinyint]".to_string(),
            Int16 => "[smallint]".to_string(),
            Int32 => "[int]".to_string(),
            Int64 => "[bigint]".to_string(),
            Double => "[float]".to_string(),
            Single => "[real]".to_string(),
            DateTime => "[datetime]".to_string(),
            DateTimeOffset => "[datetimeoffset]".to_string(),
            Time => "[time]".to_string(),
            Guid => "[uniqueidentifier]".to_string(),
            Geography => "[geography]".to_string(),
            Geometry => "[geometry]".to_string(),
        }
    }
}

impl MigrationSqlGenerator for SqlServerMigrationSqlGenerator {
    fn provider_name(&self) -> &'static str {
        SQL_SERVER_PROVIDER
    }

    fn generate(&self, operations: &[MigrationOperation]) -> Result<Vec<MigrationStatement>> {
        let mut statements = Vec::new();
        let mut schemas: Vec<String> = Vec::new();
        let mut variables = 0usize;

        for operation in operations {
            let new_schema = match operation {
                MigrationOperation::CreateTable(op) => DatabaseName::parse(&op.name).schema().map(str::to_string),
                MigrationOperation::CreateProcedure(op) => DatabaseName::parse(&op.name).schema().map(str::to_string),
                MigrationOperation::MoveTable(op) => op.new_schema.clone(),
                MigrationOperation::MoveProcedure(op) => op.new_schema.clone(),
                _ => None,
            };
            if let Some(schema) = new_schema {
                let known = schema.eq_ignore_ascii_case(DEFAULT_SCHEMA)
                    || schemas.iter().any(|s| s.eq_ignore_ascii_case(&schema));
                if !known {
                    statements.push(self.create_schema(&schema));
                    schemas.push(schema);
                }
            }

            let statement = match operation {
                MigrationOperation::CreateTable(op) => MigrationStatement::new(self.create_table(op)),
                MigrationOperation::DropTable(op) => {
                    MigrationStatement::new(format!("DROP TABLE {}", self.table(&op.name)))
                }
                MigrationOperation::RenameTable(op) => self.rename_table(&op.name, &op.new_name),
                MigrationOperation::MoveTable(op) => {
                    MigrationStatement::new(self.transfer(&op.name, op.new_schema.as_deref()))
                }
                MigrationOperation::AddColumn(op) => MigrationStatement::new(self.add_column(&op.table, &op.column)),
                MigrationOperation::AlterColumn(op) => {
                    variables += 1;
                    MigrationStatement::new(self.alter_column(op, variables - 1))
                }
                MigrationOperation::DropColumn(op) => {
                    variables += 1;
                    let mut sql = self.drop_default_constraint(&op.table, &op.name, variables - 1);
                    sql.push_str(&format!(
                        "\nALTER TABLE {} DROP COLUMN {}",
                        self.table(&op.table),
                        self.quote_identifier(&op.name)
                    ));
                    MigrationStatement::new(sql)
                }
                MigrationOperation::RenameColumn(op) => MigrationStatement::new(format!(
                    "EXECUTE sp_rename @objname = {}, @newname = {}, @objtype = N'COLUMN'",
                    self.string_literal(&format!("{}.{}", DatabaseName::parse(&op.table), op.name)),
                    self.string_literal(&op.new_name)
                )),
                MigrationOperation::AddForeignKey(fk) => MigrationStatement::new(self.add_foreign_key(fk)),
                MigrationOperation::DropForeignKey(fk) => MigrationStatement::new(format!(
                    "ALTER TABLE {} DROP CONSTRAINT {}",
                    self.table(&fk.dependent_table),
                    self.quote_identifier(&fk.resolved_name())
                )),
                MigrationOperation::CreateIndex(index) => MigrationStatement::new(self.create_index(index)),
                MigrationOperation::DropIndex(index) => MigrationStatement::new(format!(
                    "DROP INDEX {} ON {}",
                    self.quote_identifier(&index.resolved_name()),
                    self.table(&index.table)
                )),
                MigrationOperation::AddPrimaryKey(pk) => MigrationStatement::new(self.add_primary_key(pk)),
                MigrationOperation::DropPrimaryKey(pk) => MigrationStatement::new(format!(
                    "ALTER TABLE {} DROP CONSTRAINT {}",
                    self.table(&pk.table),
                    self.quote_identifier(&pk.resolved_name())
                )),
                MigrationOperation::CreateProcedure(procedure) => self.procedure("CREATE", procedure),
                MigrationOperation::AlterProcedure(op) => self.procedure("ALTER", &op.procedure),
                MigrationOperation::DropProcedure(op) => {
                    MigrationStatement::new(format!("DROP PROCEDURE {}", self.table(&op.name)))
                }
                MigrationOperation::RenameProcedure(op) => MigrationStatement::new(format!(
                    "EXECUTE sp_rename @objname = {}, @newname = {}, @objtype = N'OBJECT'",
                    self.string_literal(&DatabaseName::parse(&op.name).to_string()),
                    self.string_literal(&op.new_name)
                )),
                MigrationOperation::MoveProcedure(op) => {
                    MigrationStatement::new(self.transfer(&op.name, op.new_schema.as_deref()))
                }
                MigrationOperation::Sql(op) => {
                    MigrationStatement::new(op.sql.clone()).suppress_transaction(op.suppress_transaction)
                }
                MigrationOperation::History(op) => MigrationStatement::new(self.history(op)),
            };
            statements.push(statement);
        }
        Ok(statements)
    }

    fn quote_identifier(&self, identifier: &str) -> String {
        format!("[{}]", identifier.replace(']', "]]"))
    }

    fn quote_table(&self, name: &DatabaseName) -> String {
        match name.schema() {
            Some(schema) => format!("{}.{}", self.quote_identifier(schema), self.quote_identifier(name.name())),
            None => self.quote_identifier(name.name()),
        }
    }

    fn string_literal(&self, value: &str) -> String {
        format!("N{}", quoted_text(value))
    }

    fn binary_literal(&self, value: &[u8]) -> String {
        format!("0x{}", hex::encode_upper(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HistoryRow, SqlOperation};
    use chrono::NaiveDate;
    use edm_metadata::FunctionParameter;
    use pretty_assertions::assert_eq;

    fn sql(operations: Vec<MigrationOperation>) -> Vec<String> {
        SqlServerMigrationSqlGenerator::new()
            .generate(&operations)
            .unwrap()
            .into_iter()
            .map(|statement| statement.sql)
            .collect()
    }

    #[test]
    fn test_create_table_in_new_schema() {
        let create = CreateTableOperation::new("sales.Customers")
            .column(ColumnModel::new("Id", PrimitiveTypeKind::Int32).not_null().identity())
            .column(ColumnModel::new("Name", PrimitiveTypeKind::String).with_max_length(MaxLength::Fixed(64)))
            .column(ColumnModel::new("Balance", PrimitiveTypeKind::Decimal))
            .primary_key(["Id"]);

        assert_eq!(
            sql(vec![create.into()]),
            vec![
                "IF schema_id('sales') IS NULL\n    EXECUTE('CREATE SCHEMA [sales]')".to_string(),
                "CREATE TABLE [sales].[Customers] (\n    [Id] [int] NOT NULL IDENTITY,\n    [Name] [nvarchar](64),\n    [Balance] [decimal](18, 2),\n    CONSTRAINT [PK_Customers] PRIMARY KEY ([Id])\n)".to_string(),
            ]
        );
    }

    #[test]
    fn test_schema_created_once() {
        let statements = sql(vec![
            MigrationOperation::move_table("dbo.A", Some("sales".to_string())),
            MigrationOperation::move_table("dbo.B", Some("sales".to_string())),
            MigrationOperation::move_table("sales.C", None),
        ]);
        assert_eq!(statements.len(), 4);
        assert_eq!(statements[1], "ALTER SCHEMA [sales] TRANSFER [dbo].[A]");
        assert_eq!(statements[3], "ALTER SCHEMA [dbo] TRANSFER [sales].[C]");
    }

    #[test]
    fn test_add_required_column_gets_clr_default() {
        let statements = sql(vec![MigrationOperation::add_column(
            "dbo.Customers",
            ColumnModel::new("Age", PrimitiveTypeKind::Int32).not_null(),
        )]);
        assert_eq!(statements, vec!["ALTER TABLE [dbo].[Customers] ADD [Age] [int] NOT NULL DEFAULT 0"]);

        let at = NaiveDate::from_ymd_opt(2020, 5, 1).and_then(|d| d.and_hms_milli_opt(13, 4, 5, 60)).unwrap();
        let statements = sql(vec![MigrationOperation::add_column(
            "dbo.Customers",
            ColumnModel::new("Joined", PrimitiveTypeKind::DateTime).not_null().with_default(ColumnValue::DateTime(at)),
        )]);
        assert_eq!(
            statements,
            vec!["ALTER TABLE [dbo].[Customers] ADD [Joined] [datetime] NOT NULL DEFAULT '2020-05-01T13:04:05.060'"]
        );
    }

    #[test]
    fn test_drop_column_drops_default_constraint() {
        let statements = sql(vec![MigrationOperation::drop_column("dbo.Customers", "Name")]);
        assert_eq!(statements.len(), 1);
        assert!(statements[0].starts_with("DECLARE @var0 nvarchar(128)"));
        assert!(statements[0].contains("AND col_name(parent_object_id, parent_column_id) = 'Name';"));
        assert!(statements[0].ends_with("ALTER TABLE [dbo].[Customers] DROP COLUMN [Name]"));
    }

    #[test]
    fn test_alter_column_with_default() {
        let column = ColumnModel::new("Rating", PrimitiveTypeKind::Int32)
            .not_null()
            .with_default(ColumnValue::Integer(3));
        let statements = sql(vec![MigrationOperation::alter_column("dbo.Customers", column, None)]);
        let lines: Vec<&str> = statements[0].lines().collect();
        assert_eq!(
            &lines[lines.len() - 3..],
            &[
                "ALTER TABLE [dbo].[Customers] ADD CONSTRAINT [DF_Customers_Rating] DEFAULT 3 FOR [Rating]",
                "UPDATE [dbo].[Customers] SET [Rating] = 3 WHERE [Rating] IS NULL",
                "ALTER TABLE [dbo].[Customers] ALTER COLUMN [Rating] [int] NOT NULL",
            ]
        );
    }

    #[test]
    fn test_rename_table_renames_primary_key() {
        let statements = sql(vec![MigrationOperation::rename_table("dbo.Customers", "Clients")]);
        assert_eq!(
            statements[0],
            "EXECUTE sp_rename @objname = N'dbo.Customers', @newname = N'Clients', @objtype = N'OBJECT'\n\
             IF object_id(N'[dbo].[PK_Customers]') IS NOT NULL BEGIN\n    \
             EXECUTE sp_rename @objname = N'[dbo].[PK_Customers]', @newname = N'PK_Clients', @objtype = N'OBJECT'\n\
             END"
        );
    }

    #[test]
    fn test_keys_and_indexes() {
        let fk = ForeignKeyModel::new("dbo.OrderLines", ["ProductId", "Sku"], "dbo.MigrationsProducts")
            .references(["ProductId", "Sku"])
            .cascade_delete();
        let statements = sql(vec![
            MigrationOperation::AddForeignKey(fk.clone()),
            MigrationOperation::DropForeignKey(fk),
            MigrationOperation::CreateIndex(IndexModel::new("dbo.Orders", ["CustomerId"]).unique().clustered()),
            MigrationOperation::DropIndex(IndexModel::new("dbo.Orders", ["CustomerId"])),
            MigrationOperation::AddPrimaryKey(PrimaryKeyModel::new("dbo.Orders", ["Id"]).nonclustered()),
        ]);
        assert_eq!(
            statements,
            vec![
                "ALTER TABLE [dbo].[OrderLines] ADD CONSTRAINT [FK_OrderLines_MigrationsProducts_ProductId_Sku] FOREIGN KEY ([ProductId], [Sku]) REFERENCES [dbo].[MigrationsProducts] ([ProductId], [Sku]) ON DELETE CASCADE",
                "ALTER TABLE [dbo].[OrderLines] DROP CONSTRAINT [FK_OrderLines_MigrationsProducts_ProductId_Sku]",
                "CREATE UNIQUE CLUSTERED INDEX [IX_Orders_CustomerId] ON [dbo].[Orders]([CustomerId])",
                "DROP INDEX [IX_Orders_CustomerId] ON [dbo].[Orders]",
                "ALTER TABLE [dbo].[Orders] ADD CONSTRAINT [PK_Orders] PRIMARY KEY NONCLUSTERED ([Id])",
            ]
        );
    }

    #[test]
    fn test_procedures_carry_batch_terminator() {
        let procedure = ProcedureModel::new("dbo.Customer_Insert", "INSERT [dbo].[Customers]([Name]) VALUES (@Name)")
            .parameter(FunctionParameter::new("Name", PrimitiveTypeKind::String))
            .parameter(FunctionParameter::new("Id", PrimitiveTypeKind::Int32).with_mode(ParameterMode::Out));
        let statements = SqlServerMigrationSqlGenerator::new()
            .generate(&[MigrationOperation::CreateProcedure(procedure)])
            .unwrap();
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].batch_terminator.as_deref(), Some(BATCH_TERMINATOR));
        assert_eq!(
            statements[0].sql,
            "CREATE PROCEDURE [dbo].[Customer_Insert]\n    @Name [nvarchar](max),\n    @Id [int] OUT\nAS\nBEGIN\n    INSERT [dbo].[Customers]([Name]) VALUES (@Name)\nEND"
        );
    }

    #[test]
    fn test_history_rows() {
        let table = "dbo.__MigrationHistory".to_string();
        let statements = sql(vec![
            MigrationOperation::History(HistoryOperation {
                table: table.clone(),
                command: HistoryCommand::Insert(HistoryRow {
                    migration_id: "201501011200000_Init".to_string(),
                    context_key: "Shop".to_string(),
                    model: vec![0x1f, 0x8b],
                    product_version: "0.1.0".to_string(),
                }),
            }),
            MigrationOperation::History(HistoryOperation {
                table,
                command: HistoryCommand::Delete {
                    migration_id: "201501011200000_Init".to_string(),
                    context_key: "Shop".to_string(),
                },
            }),
        ]);
        assert_eq!(
            statements,
            vec![
                "INSERT [dbo].[__MigrationHistory]([MigrationId], [ContextKey], [Model], [ProductVersion])\nVALUES (N'201501011200000_Init', N'Shop', 0x1F8B, N'0.1.0')",
                "DELETE [dbo].[__MigrationHistory]\nWHERE (([MigrationId] = N'201501011200000_Init') AND ([ContextKey] = N'Shop'))",
            ]
        );
    }

    #[test]
    fn test_column_types() {
        let generator = SqlServerMigrationSqlGenerator::new();
        let ty = |column: ColumnModel| generator.column_type(&column);
        assert_eq!(ty(ColumnModel::new("A", PrimitiveTypeKind::String).with_unicode(false)), "[varchar](max)");
        assert_eq!(ty(ColumnModel::new("A", PrimitiveTypeKind::String).with_fixed_length(true)), "[nchar](128)");
        assert_eq!(ty(ColumnModel::new("A", PrimitiveTypeKind::Binary).timestamp()), "rowversion");
        assert_eq!(ty(ColumnModel::new("A", PrimitiveTypeKind::Decimal).with_precision(10, 4)), "[decimal](10, 4)");
        assert_eq!(ty(ColumnModel::new("A", PrimitiveTypeKind::Guid)), "[uniqueidentifier]");
        assert_eq!(ty(ColumnModel::new("A", PrimitiveTypeKind::String).with_store_type("xml")), "xml");
    }

    #[test]
    fn test_sql_passthrough_keeps_transaction_flag() {
        let statements = SqlServerMigrationSqlGenerator::new()
            .generate(&[SqlOperation::new("CREATE DATABASE Foo").suppress_transaction().into()])
            .unwrap();
        assert!(statements[0].suppress_transaction);
        assert_eq!(statements[0].sql, "CREATE DATABASE Foo");
    }
}
