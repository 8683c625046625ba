//! Entity containers and their sets.

use crate::collection::{Identified, ItemCollection};
use crate::types::DataSpace;
use serde::{Deserialize, Serialize};

/// A set of entities of one type. In store space, a table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntitySet {
    pub name: String,
    /// Identity of the element type.
    pub entity_type: String,
    /// Database schema; the provider default applies when absent.
    pub schema: Option<String>,
    /// Table name; the set name applies when absent.
    pub table: Option<String>,
}

impl EntitySet {
    pub fn new(name: impl Into<String>, entity_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entity_type: entity_type.into(),
            schema: None,
            table: None,
        }
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn table_name(&self) -> &str {
        self.table.as_deref().unwrap_or(&self.name)
    }

    pub fn schema_or<'a>(&'a self, default_schema: &'a str) -> &'a str {
        self.schema.as_deref().unwrap_or(default_schema)
    }
}

impl Identified for EntitySet {
    fn identity(&self) -> &str {
        &self.name
    }
}

/// A set of relationship instances between two entity sets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssociationSet {
    pub name: String,
    /// Identity of the association type.
    pub association_type: String,
    /// Entity set at the source end.
    pub source_set: String,
    /// Entity set at the target end.
    pub target_set: String,
}

impl AssociationSet {
    pub fn new(
        name: impl Into<String>,
        association_type: impl Into<String>,
        source_set: impl Into<String>,
        target_set: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            association_type: association_type.into(),
            source_set: source_set.into(),
            target_set: target_set.into(),
        }
    }
}

impl Identified for AssociationSet {
    fn identity(&self) -> &str {
        &self.name
    }
}

/// Exposes a function through the container.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionImport {
    pub name: String,
    /// Identity of the imported function.
    pub function: String,
}

impl FunctionImport {
    pub fn new(name: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            function: function.into(),
        }
    }
}

impl Identified for FunctionImport {
    fn identity(&self) -> &str {
        &self.name
    }
}

/// A sealed entity container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityContainer {
    name: String,
    data_space: DataSpace,
    entity_sets: ItemCollection<EntitySet>,
    association_sets: ItemCollection<AssociationSet>,
    function_imports: ItemCollection<FunctionImport>,
}

impl EntityContainer {
    pub(crate) fn new(
        name: String,
        data_space: DataSpace,
        entity_sets: ItemCollection<EntitySet>,
        association_sets: ItemCollection<AssociationSet>,
        function_imports: ItemCollection<FunctionImport>,
    ) -> Self {
        Self {
            name,
            data_space,
            entity_sets,
            association_sets,
            function_imports,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_space(&self) -> DataSpace {
        self.data_space
    }

    pub fn entity_sets(&self) -> &ItemCollection<EntitySet> {
        &self.entity_sets
    }

    pub fn association_sets(&self) -> &ItemCollection<AssociationSet> {
        &self.association_sets
    }

    pub fn function_imports(&self) -> &ItemCollection<FunctionImport> {
        &self.function_imports
    }

    /// The entity set holding the given entity type, if any.
    pub fn entity_set_for(&self, entity_type: &str) -> Option<&EntitySet> {
        self.entity_sets
            .iter()
            .find(|set| set.entity_type == entity_type)
    }

    /// Association sets of the given association type.
    pub fn association_sets_of<'a>(
        &'a self,
        association_type: &'a str,
    ) -> impl Iterator<Item = &'a AssociationSet> + 'a {
        self.association_sets
            .iter()
            .filter(move |set| set.association_type == association_type)
    }
}

impl Identified for EntityContainer {
    fn identity(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_set_table_defaults() {
        let set = EntitySet::new("Customers", "Store.Customer");
        assert_eq!(set.table_name(), "Customers");
        assert_eq!(set.schema_or("dbo"), "dbo");

        let mapped = set.with_schema("sales").with_table("tblCustomer");
        assert_eq!(mapped.table_name(), "tblCustomer");
        assert_eq!(mapped.schema_or("dbo"), "sales");
    }
}
