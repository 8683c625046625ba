//! Shared fixtures for the SQLite integration tests.

#![allow(dead_code)]

use edm_metadata::{
    AssociationEndMember, AssociationSet, AssociationType, DataSpace, EdmModel, EdmProperty, EntitySet,
    EntityType, Multiplicity, PrimitiveTypeKind, ReferentialConstraint,
};
use edm_migrations::model::CreateTableOperation;
use edm_migrations::{
    ColumnModel, DbMigrator, Migration, MigrationOperation, MigrationSet, MigrationsConfiguration,
    SqliteConnection,
};
use std::path::PathBuf;
use tempfile::TempDir;

pub const STORE: &str = "CodeFirstDatabaseSchema";
pub const INIT: &str = "201501011200000_Init";
pub const ADD_AGE: &str = "201501021200000_AddAge";

/// A SQLite file inspected through its own connection.
pub struct TestDatabase {
    _dir: TempDir,
    path: PathBuf,
}

impl TestDatabase {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("migrations.db");
        Self { _dir: dir, path }
    }

    pub fn connection(&self) -> Box<SqliteConnection> {
        Box::new(SqliteConnection::open(&self.path).unwrap())
    }

    pub fn raw(&self) -> rusqlite::Connection {
        rusqlite::Connection::open(&self.path).unwrap()
    }

    pub fn migrator(&self, config: MigrationsConfiguration, migrations: MigrationSet, model: EdmModel) -> DbMigrator {
        DbMigrator::new(config, migrations, model, self.connection()).unwrap()
    }

    /// User tables, sorted.
    pub fn tables(&self) -> Vec<String> {
        let raw = self.raw();
        let mut statement = raw
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name")
            .unwrap();
        let names = statement
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        names
    }

    /// `(name, notnull, dflt_value)` for every column of `table`.
    pub fn columns(&self, table: &str) -> Vec<(String, bool, Option<String>)> {
        let raw = self.raw();
        let mut statement = raw.prepare(&format!("PRAGMA table_info(\"{table}\")")).unwrap();
        let columns = statement
            .query_map([], |row| Ok((row.get(1)?, row.get::<_, i64>(3)? == 1, row.get(4)?)))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        columns
    }

    pub fn table_sql(&self, table: &str) -> String {
        self.raw()
            .query_row(
                "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [table],
                |row| row.get(0),
            )
            .unwrap()
    }

    pub fn count(&self, table: &str) -> i64 {
        self.raw()
            .query_row(&format!("SELECT COUNT(*) FROM \"{table}\""), [], |row| row.get(0))
            .unwrap()
    }
}

pub fn empty_model() -> EdmModel {
    EdmModel::empty(DataSpace::SSpace).unwrap()
}

fn customer(with_age: bool) -> EntityType {
    let mut builder = EntityType::builder(STORE, "Customer", DataSpace::SSpace)
        .key_property(EdmProperty::primitive("Id", PrimitiveTypeKind::Int32).identity())
        .property(EdmProperty::primitive("Name", PrimitiveTypeKind::String));
    if with_age {
        builder = builder.property(EdmProperty::required("Age", PrimitiveTypeKind::Int32));
    }
    builder.build().unwrap()
}

/// `dbo.Customers`, optionally with a required `Age`.
pub fn customers_model(with_age: bool) -> EdmModel {
    EdmModel::builder(DataSpace::SSpace)
        .unwrap()
        .with_item(customer(with_age))
        .unwrap()
        .with_entity_set(EntitySet::new("Customers", format!("{STORE}.Customer")))
        .unwrap()
        .build()
        .unwrap()
}

/// Customers stored as `sales.Clients`.
pub fn clients_model() -> EdmModel {
    EdmModel::builder(DataSpace::SSpace)
        .unwrap()
        .with_item(customer(false))
        .unwrap()
        .with_entity_set(
            EntitySet::new("Customers", format!("{STORE}.Customer"))
                .with_table("Clients")
                .with_schema("sales"),
        )
        .unwrap()
        .build()
        .unwrap()
}

/// Customers with dependent orders.
pub fn customers_and_orders_model() -> EdmModel {
    let order = EntityType::builder(STORE, "Order", DataSpace::SSpace)
        .key_property(EdmProperty::primitive("Id", PrimitiveTypeKind::Int32).identity())
        .property(EdmProperty::required("CustomerId", PrimitiveTypeKind::Int32))
        .build()
        .unwrap();
    let order_customer = AssociationType::builder(STORE, "Order_Customer", DataSpace::SSpace)
        .source(AssociationEndMember::new("Customer", format!("{STORE}.Customer"), Multiplicity::One).cascade_delete())
        .target(AssociationEndMember::new("Order", format!("{STORE}.Order"), Multiplicity::Many))
        .constraint(ReferentialConstraint::new("Customer", ["Id"], "Order", ["CustomerId"]))
        .build()
        .unwrap();
    EdmModel::builder(DataSpace::SSpace)
        .unwrap()
        .with_item(customer(false))
        .unwrap()
        .with_item(order)
        .unwrap()
        .with_item(order_customer)
        .unwrap()
        .with_entity_set(EntitySet::new("Customers", format!("{STORE}.Customer")))
        .unwrap()
        .with_entity_set(EntitySet::new("Orders", format!("{STORE}.Order")))
        .unwrap()
        .with_association_set(AssociationSet::new(
            "Order_Customer",
            format!("{STORE}.Order_Customer"),
            "Customers",
            "Orders",
        ))
        .unwrap()
        .build()
        .unwrap()
}

pub fn create_customers() -> MigrationOperation {
    MigrationOperation::create_table(
        CreateTableOperation::new("dbo.Customers")
            .column(ColumnModel::new("Id", PrimitiveTypeKind::Int32).not_null().identity())
            .column(ColumnModel::new("Name", PrimitiveTypeKind::String))
            .primary_key(["Id"]),
    )
}

/// `Init` creating customers.
pub fn init_migration() -> Migration {
    Migration::new(INIT, customers_model(false))
        .unwrap()
        .with_up(vec![create_customers()])
}

/// `AddAge` adding a required column with no explicit default.
pub fn add_age_migration() -> Migration {
    Migration::new(ADD_AGE, customers_model(true))
        .unwrap()
        .with_up(vec![MigrationOperation::add_column(
            "dbo.Customers",
            ColumnModel::new("Age", PrimitiveTypeKind::Int32).not_null(),
        )])
}

pub fn explicit_migrations() -> MigrationSet {
    MigrationSet::from_migrations([init_migration(), add_age_migration()]).unwrap()
}
