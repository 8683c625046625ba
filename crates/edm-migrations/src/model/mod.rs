//! Operation model: the schema changes migrations are made of.

pub mod column;
pub mod names;
pub mod operation;

pub use column::{ColumnModel, ColumnValue};
pub use names::DatabaseName;
pub use operation::{
    inverse_all, AddColumnOperation, AlterColumnOperation, AlterProcedureOperation,
    CreateTableOperation, DropColumnOperation, DropProcedureOperation, DropTableOperation,
    ForeignKeyModel, HistoryCommand, HistoryOperation, HistoryRow, IndexModel, MigrationOperation,
    MoveProcedureOperation, MoveTableOperation, PrimaryKeyModel, ProcedureModel,
    RenameColumnOperation, RenameProcedureOperation, RenameTableOperation, SqlOperation,
};
