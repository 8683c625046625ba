//! The model root and its builder.

use crate::association::AssociationType;
use crate::collection::ItemCollection;
use crate::complex::{ComplexType, EnumType};
use crate::container::{AssociationSet, EntityContainer, EntitySet, FunctionImport};
use crate::entity::EntityType;
use crate::error::MetadataError;
use crate::function::EdmFunction;
use crate::item::NamespaceItem;
use crate::types::DataSpace;
use crate::validation;
use crate::Result;
use tracing::debug;

/// Default container name of conceptual models.
pub const CONCEPTUAL_CONTAINER: &str = "CodeFirstContainer";
/// Default container name of store models.
pub const STORE_CONTAINER: &str = "CodeFirstDatabase";

/// A sealed metadata model for one data space.
///
/// Models are immutable: every accessor hands out shared references and
/// the only way to derive a changed model is [`EdmModel::to_builder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdmModel {
    data_space: DataSpace,
    items: ItemCollection<NamespaceItem>,
    container: EntityContainer,
}

impl EdmModel {
    /// Start building a model. Only conceptual and store space are allowed.
    pub fn builder(data_space: DataSpace) -> Result<EdmModelBuilder> {
        if !data_space.supports_model() {
            return Err(MetadataError::UnsupportedDataSpace { data_space });
        }
        let container_name = match data_space {
            DataSpace::SSpace => STORE_CONTAINER,
            _ => CONCEPTUAL_CONTAINER,
        };
        Ok(EdmModelBuilder {
            data_space,
            items: Vec::new(),
            container_name: container_name.to_string(),
            entity_sets: Vec::new(),
            association_sets: Vec::new(),
            function_imports: Vec::new(),
        })
    }

    /// A model with no items.
    pub fn empty(data_space: DataSpace) -> Result<EdmModel> {
        EdmModel::builder(data_space)?.build()
    }

    pub fn data_space(&self) -> DataSpace {
        self.data_space
    }

    /// Whether the model declares no items and no sets.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
            && self.container.entity_sets().is_empty()
            && self.container.association_sets().is_empty()
            && self.container.function_imports().is_empty()
    }

    pub fn items(&self) -> &ItemCollection<NamespaceItem> {
        &self.items
    }

    pub fn item(&self, identity: &str) -> Option<&NamespaceItem> {
        self.items.get(identity)
    }

    pub fn container(&self) -> &EntityContainer {
        &self.container
    }

    pub fn entity_types(&self) -> impl Iterator<Item = &EntityType> {
        self.items.iter().filter_map(NamespaceItem::as_entity_type)
    }

    pub fn association_types(&self) -> impl Iterator<Item = &AssociationType> {
        self.items.iter().filter_map(NamespaceItem::as_association_type)
    }

    pub fn functions(&self) -> impl Iterator<Item = &EdmFunction> {
        self.items.iter().filter_map(NamespaceItem::as_function)
    }

    pub fn complex_types(&self) -> impl Iterator<Item = &ComplexType> {
        self.items.iter().filter_map(|item| match item {
            NamespaceItem::ComplexType(t) => Some(t),
            _ => None,
        })
    }

    pub fn enum_types(&self) -> impl Iterator<Item = &EnumType> {
        self.items.iter().filter_map(|item| match item {
            NamespaceItem::EnumType(t) => Some(t),
            _ => None,
        })
    }

    pub fn entity_type(&self, identity: &str) -> Option<&EntityType> {
        self.items.get(identity).and_then(NamespaceItem::as_entity_type)
    }

    pub fn association_type(&self, identity: &str) -> Option<&AssociationType> {
        self.items
            .get(identity)
            .and_then(NamespaceItem::as_association_type)
    }

    pub fn function(&self, identity: &str) -> Option<&EdmFunction> {
        self.items.get(identity).and_then(NamespaceItem::as_function)
    }

    /// Entity sets paired with their element types.
    pub fn entity_sets(&self) -> impl Iterator<Item = (&EntitySet, &EntityType)> {
        self.container
            .entity_sets()
            .iter()
            .filter_map(|set| self.entity_type(&set.entity_type).map(|t| (set, t)))
    }

    /// The entity set holding the given entity type.
    pub fn entity_set_for(&self, entity_type: &str) -> Option<&EntitySet> {
        self.container.entity_set_for(entity_type)
    }

    /// Reopen as a builder holding a copy of this model.
    pub fn to_builder(&self) -> EdmModelBuilder {
        EdmModelBuilder {
            data_space: self.data_space,
            items: self.items.as_slice().to_vec(),
            container_name: self.container.name().to_string(),
            entity_sets: self.container.entity_sets().as_slice().to_vec(),
            association_sets: self.container.association_sets().as_slice().to_vec(),
            function_imports: self.container.function_imports().as_slice().to_vec(),
        }
    }
}

/// Mutable construction state for an [`EdmModel`].
#[derive(Debug, Clone)]
pub struct EdmModelBuilder {
    data_space: DataSpace,
    items: Vec<NamespaceItem>,
    container_name: String,
    entity_sets: Vec<EntitySet>,
    association_sets: Vec<AssociationSet>,
    function_imports: Vec<FunctionImport>,
}

impl EdmModelBuilder {
    pub fn data_space(&self) -> DataSpace {
        self.data_space
    }

    /// Add an item.
    ///
    /// Fails when the item belongs to another data space or when an item
    /// with the same identity is already present.
    pub fn add_item(&mut self, item: impl Into<NamespaceItem>) -> Result<()> {
        let item = item.into();
        if item.data_space() != self.data_space {
            return Err(MetadataError::DataSpaceMismatch {
                identity: item.identity().to_string(),
                expected: self.data_space,
                actual: item.data_space(),
            });
        }
        if self.item(item.identity()).is_some() {
            return Err(MetadataError::DuplicateItem {
                identity: item.identity().to_string(),
            });
        }
        self.items.push(item);
        Ok(())
    }

    /// Chaining form of [`add_item`](Self::add_item).
    pub fn with_item(mut self, item: impl Into<NamespaceItem>) -> Result<Self> {
        self.add_item(item)?;
        Ok(self)
    }

    pub fn item(&self, identity: &str) -> Option<&NamespaceItem> {
        self.items.iter().find(|item| item.identity() == identity)
    }

    /// Remove an item and every container member referring to it.
    ///
    /// Returns `false` when no item has that identity.
    pub fn remove_item(&mut self, identity: &str) -> bool {
        let Some(position) = self.items.iter().position(|item| item.identity() == identity) else {
            return false;
        };
        let removed = self.items.remove(position);
        match &removed {
            NamespaceItem::EntityType(entity) => {
                let dropped: Vec<String> = self
                    .entity_sets
                    .iter()
                    .filter(|set| set.entity_type == entity.identity())
                    .map(|set| set.name.clone())
                    .collect();
                self.entity_sets.retain(|set| set.entity_type != entity.identity());
                self.association_sets.retain(|set| {
                    !dropped.contains(&set.source_set) && !dropped.contains(&set.target_set)
                });
            }
            NamespaceItem::AssociationType(association) => {
                self.association_sets
                    .retain(|set| set.association_type != association.identity());
            }
            NamespaceItem::Function(function) => {
                self.function_imports
                    .retain(|import| import.function != function.identity());
            }
            NamespaceItem::ComplexType(_) | NamespaceItem::EnumType(_) => {}
        }
        debug!(identity, kind = removed.kind_name(), "Removed item from model");
        true
    }

    /// Replace an existing item with a new version of the same identity.
    pub fn replace_item(&mut self, item: impl Into<NamespaceItem>) -> Result<()> {
        let item = item.into();
        match self
            .items
            .iter_mut()
            .find(|existing| existing.identity() == item.identity())
        {
            Some(existing) => {
                *existing = item;
                Ok(())
            }
            None => Err(MetadataError::UnknownType {
                referenced_by: self.container_name.clone(),
                type_name: item.identity().to_string(),
            }),
        }
    }

    pub fn with_container_name(mut self, name: impl Into<String>) -> Self {
        self.container_name = name.into();
        self
    }

    pub fn add_entity_set(&mut self, set: EntitySet) -> Result<()> {
        self.check_set_name(&set.name)?;
        self.entity_sets.push(set);
        Ok(())
    }

    pub fn with_entity_set(mut self, set: EntitySet) -> Result<Self> {
        self.add_entity_set(set)?;
        Ok(self)
    }

    pub fn entity_set_mut(&mut self, name: &str) -> Option<&mut EntitySet> {
        self.entity_sets.iter_mut().find(|set| set.name == name)
    }

    /// Remove an entity set and the association sets using it.
    pub fn remove_entity_set(&mut self, name: &str) -> bool {
        let before = self.entity_sets.len();
        self.entity_sets.retain(|set| set.name != name);
        self.association_sets
            .retain(|set| set.source_set != name && set.target_set != name);
        self.entity_sets.len() != before
    }

    pub fn add_association_set(&mut self, set: AssociationSet) -> Result<()> {
        self.check_set_name(&set.name)?;
        self.association_sets.push(set);
        Ok(())
    }

    pub fn with_association_set(mut self, set: AssociationSet) -> Result<Self> {
        self.add_association_set(set)?;
        Ok(self)
    }

    pub fn add_function_import(&mut self, import: FunctionImport) -> Result<()> {
        if self.function_imports.iter().any(|f| f.name == import.name) {
            return Err(MetadataError::DuplicateItem {
                identity: format!("{}.{}", self.container_name, import.name),
            });
        }
        self.function_imports.push(import);
        Ok(())
    }

    fn check_set_name(&self, name: &str) -> Result<()> {
        let taken = self.entity_sets.iter().any(|set| set.name == name)
            || self.association_sets.iter().any(|set| set.name == name);
        if taken {
            return Err(MetadataError::DuplicateItem {
                identity: format!("{}.{}", self.container_name, name),
            });
        }
        Ok(())
    }

    /// Seal the model, validating the whole item graph.
    pub fn build(self) -> Result<EdmModel> {
        let container_name = self.container_name.clone();
        let duplicate = |name: String| MetadataError::DuplicateItem {
            identity: format!("{container_name}.{name}"),
        };
        let container = EntityContainer::new(
            self.container_name.clone(),
            self.data_space,
            ItemCollection::new(self.entity_sets).map_err(duplicate)?,
            ItemCollection::new(self.association_sets).map_err(duplicate)?,
            ItemCollection::new(self.function_imports).map_err(duplicate)?,
        );

        validation::validate_model(self.data_space, &self.items, std::slice::from_ref(&container))?;

        let items = ItemCollection::new(self.items)
            .map_err(|identity| MetadataError::DuplicateItem { identity })?;
        debug!(
            data_space = %self.data_space,
            items = items.len(),
            entity_sets = container.entity_sets().len(),
            "Sealed model"
        );
        Ok(EdmModel {
            data_space: self.data_space,
            items,
            container,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::association::{AssociationEndMember, ReferentialConstraint};
    use crate::property::EdmProperty;
    use crate::types::{Multiplicity, PrimitiveTypeKind};

    fn entity(name: &str, data_space: DataSpace) -> EntityType {
        EntityType::builder("Store", name, data_space)
            .key_property(EdmProperty::primitive("Id", PrimitiveTypeKind::Int32))
            .property(EdmProperty::primitive("CustomerId", PrimitiveTypeKind::Int32))
            .build()
            .unwrap()
    }

    #[test]
    fn test_model_requires_conceptual_or_store_space() {
        for data_space in [DataSpace::OSpace, DataSpace::OCSpace, DataSpace::CSSpace] {
            let err = EdmModel::builder(data_space).unwrap_err();
            assert_eq!(err, MetadataError::UnsupportedDataSpace { data_space });
        }
        assert!(EdmModel::builder(DataSpace::CSpace).is_ok());
    }

    #[test]
    fn test_add_item_rejects_other_data_space() {
        let mut builder = EdmModel::builder(DataSpace::CSpace).unwrap();
        let err = builder.add_item(entity("Customer", DataSpace::SSpace)).unwrap_err();
        assert!(matches!(err, MetadataError::DataSpaceMismatch { .. }));
    }

    #[test]
    fn test_add_item_rejects_duplicate_identity() {
        let mut builder = EdmModel::builder(DataSpace::SSpace).unwrap();
        builder.add_item(entity("Customer", DataSpace::SSpace)).unwrap();
        let err = builder.add_item(entity("Customer", DataSpace::SSpace)).unwrap_err();
        assert_eq!(
            err,
            MetadataError::DuplicateItem {
                identity: "Store.Customer".to_string()
            }
        );
    }

    #[test]
    fn test_remove_absent_item_is_silent() {
        let mut builder = EdmModel::builder(DataSpace::SSpace).unwrap();
        assert!(!builder.remove_item("Store.Missing"));
    }

    #[test]
    fn test_remove_association_unlinks_sets() {
        let association = AssociationType::builder("Store", "Order_Customer", DataSpace::SSpace)
            .source(AssociationEndMember::new("Customer", "Store.Customer", Multiplicity::One))
            .target(AssociationEndMember::new("Order", "Store.Order", Multiplicity::Many))
            .constraint(ReferentialConstraint::new("Customer", ["Id"], "Order", ["CustomerId"]))
            .build()
            .unwrap();

        let mut builder = EdmModel::builder(DataSpace::SSpace)
            .unwrap()
            .with_item(entity("Customer", DataSpace::SSpace))
            .unwrap()
            .with_item(entity("Order", DataSpace::SSpace))
            .unwrap()
            .with_item(association)
            .unwrap()
            .with_entity_set(EntitySet::new("Customers", "Store.Customer"))
            .unwrap()
            .with_entity_set(EntitySet::new("Orders", "Store.Order"))
            .unwrap()
            .with_association_set(AssociationSet::new(
                "Order_Customer",
                "Store.Order_Customer",
                "Customers",
                "Orders",
            ))
            .unwrap();

        assert!(builder.remove_item("Store.Order_Customer"));
        let model = builder.build().unwrap();
        assert!(model.container().association_sets().is_empty());
        assert_eq!(model.container().entity_sets().len(), 2);
    }

    #[test]
    fn test_build_rejects_dangling_entity_set() {
        let builder = EdmModel::builder(DataSpace::SSpace)
            .unwrap()
            .with_entity_set(EntitySet::new("Customers", "Store.Customer"))
            .unwrap();
        let err = builder.build().unwrap_err();
        assert!(matches!(err, MetadataError::UnknownType { .. }));
    }

    #[test]
    fn test_sealed_collections_are_stable() {
        let model = EdmModel::builder(DataSpace::SSpace)
            .unwrap()
            .with_item(entity("Customer", DataSpace::SSpace))
            .unwrap()
            .build()
            .unwrap();

        let first = model.items() as *const _;
        let second = model.items() as *const _;
        assert_eq!(first, second);
        assert_eq!(model.entity_types().count(), 1);
    }
}
