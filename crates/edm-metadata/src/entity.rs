//! Entity types.

use crate::collection::{Identified, ItemCollection};
use crate::error::MetadataError;
use crate::property::{EdmProperty, NavigationProperty};
use crate::types::DataSpace;
use crate::validation;
use crate::Result;
use serde::{Deserialize, Serialize};

/// An explicitly declared index over columns of a store entity type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexDef {
    /// Index name; defaults to `IX_{table}_{columns}` when absent.
    pub name: Option<String>,
    /// Indexed columns, in order.
    pub columns: Vec<String>,
    /// Whether the index enforces uniqueness.
    pub unique: bool,
    /// Whether the index is clustered.
    pub clustered: bool,
}

impl IndexDef {
    /// Create a non-unique index over the given columns.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: None,
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
}

/// A sealed entity type.
///
/// In store space an entity type describes the shape of a table: its
/// properties are the columns and its key is the primary key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityType {
    namespace: String,
    name: String,
    identity: String,
    data_space: DataSpace,
    properties: ItemCollection<EdmProperty>,
    key_members: Vec<String>,
    navigation_properties: ItemCollection<NavigationProperty>,
    indexes: Vec<IndexDef>,
}

impl EntityType {
    /// Start building an entity type.
    pub fn builder(
        namespace: impl Into<String>,
        name: impl Into<String>,
        data_space: DataSpace,
    ) -> EntityTypeBuilder {
        EntityTypeBuilder {
            namespace: namespace.into(),
            name: name.into(),
            data_space,
            properties: Vec::new(),
            key_members: Vec::new(),
            navigation_properties: Vec::new(),
            indexes: Vec::new(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `Namespace.Name`.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn data_space(&self) -> DataSpace {
        self.data_space
    }

    pub fn properties(&self) -> &ItemCollection<EdmProperty> {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&EdmProperty> {
        self.properties.get(name)
    }

    /// Names of the key members, in key order.
    pub fn key_members(&self) -> &[String] {
        &self.key_members
    }

    /// Key properties, in key order.
    pub fn key_properties(&self) -> Vec<&EdmProperty> {
        self.key_members
            .iter()
            .filter_map(|member| self.properties.get(member))
            .collect()
    }

    pub fn is_key_member(&self, name: &str) -> bool {
        self.key_members.iter().any(|member| member == name)
    }

    pub fn navigation_properties(&self) -> &ItemCollection<NavigationProperty> {
        &self.navigation_properties
    }

    pub fn indexes(&self) -> &[IndexDef] {
        &self.indexes
    }

    /// Reopen as a builder holding a copy of this type.
    pub fn to_builder(&self) -> EntityTypeBuilder {
        EntityTypeBuilder {
            namespace: self.namespace.clone(),
            name: self.name.clone(),
            data_space: self.data_space,
            properties: self.properties.as_slice().to_vec(),
            key_members: self.key_members.clone(),
            navigation_properties: self.navigation_properties.as_slice().to_vec(),
            indexes: self.indexes.clone(),
        }
    }
}

impl Identified for EntityType {
    fn identity(&self) -> &str {
        &self.identity
    }
}

/// Mutable construction state for an [`EntityType`].
#[derive(Debug, Clone)]
pub struct EntityTypeBuilder {
    namespace: String,
    name: String,
    data_space: DataSpace,
    properties: Vec<EdmProperty>,
    key_members: Vec<String>,
    navigation_properties: Vec<NavigationProperty>,
    indexes: Vec<IndexDef>,
}

impl EntityTypeBuilder {
    /// Add a property.
    pub fn property(mut self, property: EdmProperty) -> Self {
        self.properties.push(property);
        self
    }

    /// Add a property and make it part of the key.
    ///
    /// Key properties are never nullable.
    pub fn key_property(mut self, property: EdmProperty) -> Self {
        self.key_members.push(property.name.clone());
        self.properties.push(property.not_null());
        self
    }

    /// Replace the key with the given member names.
    pub fn key<I, S>(mut self, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.key_members = members.into_iter().map(Into::into).collect();
        self
    }

    pub fn navigation(mut self, navigation: NavigationProperty) -> Self {
        self.navigation_properties.push(navigation);
        self
    }

    pub fn index(mut self, index: IndexDef) -> Self {
        self.indexes.push(index);
        self
    }

    /// Remove a property (and its key membership). Absent names are ignored.
    pub fn remove_property(mut self, name: &str) -> Self {
        self.properties.retain(|p| p.name != name);
        self.key_members.retain(|m| m != name);
        self
    }

    /// Rename the type.
    pub fn rename(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Seal the type.
    pub fn build(self) -> Result<EntityType> {
        let identity = format!("{}.{}", self.namespace, self.name);
        let properties =
            ItemCollection::new(self.properties).map_err(|member| MetadataError::DuplicateMember {
                type_name: identity.clone(),
                member,
            })?;
        let navigation_properties = ItemCollection::new(self.navigation_properties).map_err(
            |member| MetadataError::DuplicateMember {
                type_name: identity.clone(),
                member,
            },
        )?;
        let entity = EntityType {
            namespace: self.namespace,
            name: self.name,
            identity,
            data_space: self.data_space,
            properties,
            key_members: self.key_members,
            navigation_properties,
            indexes: self.indexes,
        };
        validation::validate_entity_type(&entity)?;
        Ok(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PrimitiveTypeKind;

    fn customer() -> EntityTypeBuilder {
        EntityType::builder("CodeFirstDatabaseSchema", "Customer", DataSpace::SSpace)
            .key_property(EdmProperty::primitive("Id", PrimitiveTypeKind::Int32).identity())
            .property(EdmProperty::primitive("Name", PrimitiveTypeKind::String))
    }

    #[test]
    fn test_entity_builder() {
        let entity = customer().build().unwrap();

        assert_eq!(entity.identity(), "CodeFirstDatabaseSchema.Customer");
        assert_eq!(entity.properties().len(), 2);
        assert_eq!(entity.key_members(), ["Id".to_string()]);
        assert!(!entity.property("Id").unwrap().nullable);
        assert!(entity.is_key_member("Id"));
        assert!(!entity.is_key_member("Name"));
    }

    #[test]
    fn test_duplicate_property_rejected() {
        let err = customer()
            .property(EdmProperty::primitive("Name", PrimitiveTypeKind::String))
            .build()
            .unwrap_err();
        assert!(matches!(err, MetadataError::DuplicateMember { member, .. } if member == "Name"));
    }

    #[test]
    fn test_unknown_key_member_rejected() {
        let err = customer().key(["Missing"]).build().unwrap_err();
        assert!(matches!(err, MetadataError::InvalidKey { member, .. } if member == "Missing"));
    }

    #[test]
    fn test_invalid_name_rejected() {
        let err = EntityType::builder("Store", "Bad Name", DataSpace::SSpace)
            .key_property(EdmProperty::primitive("Id", PrimitiveTypeKind::Int32))
            .build()
            .unwrap_err();
        assert!(matches!(err, MetadataError::InvalidName { .. }));
    }

    #[test]
    fn test_to_builder_round_trip() {
        let entity = customer().build().unwrap();
        let widened = entity
            .to_builder()
            .property(EdmProperty::primitive("Email", PrimitiveTypeKind::String))
            .build()
            .unwrap();

        assert_eq!(entity.properties().len(), 2);
        assert_eq!(widened.properties().len(), 3);
    }
}
