//! The closed set of items a model namespace can hold.

use crate::association::AssociationType;
use crate::collection::Identified;
use crate::complex::{ComplexType, EnumType};
use crate::entity::EntityType;
use crate::function::EdmFunction;
use crate::types::DataSpace;
use crate::Result;
use serde::{Deserialize, Serialize};

/// An item declared in a model namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum NamespaceItem {
    EntityType(EntityType),
    ComplexType(ComplexType),
    EnumType(EnumType),
    AssociationType(AssociationType),
    Function(EdmFunction),
}

impl NamespaceItem {
    /// `Namespace.Name`.
    pub fn identity(&self) -> &str {
        match self {
            NamespaceItem::EntityType(t) => t.identity(),
            NamespaceItem::ComplexType(t) => t.identity(),
            NamespaceItem::EnumType(t) => t.identity(),
            NamespaceItem::AssociationType(t) => t.identity(),
            NamespaceItem::Function(f) => f.identity(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            NamespaceItem::EntityType(t) => t.name(),
            NamespaceItem::ComplexType(t) => t.name(),
            NamespaceItem::EnumType(t) => t.name(),
            NamespaceItem::AssociationType(t) => t.name(),
            NamespaceItem::Function(f) => f.name(),
        }
    }

    pub fn namespace(&self) -> &str {
        match self {
            NamespaceItem::EntityType(t) => t.namespace(),
            NamespaceItem::ComplexType(t) => t.namespace(),
            NamespaceItem::EnumType(t) => t.namespace(),
            NamespaceItem::AssociationType(t) => t.namespace(),
            NamespaceItem::Function(f) => f.namespace(),
        }
    }

    pub fn data_space(&self) -> DataSpace {
        match self {
            NamespaceItem::EntityType(t) => t.data_space(),
            NamespaceItem::ComplexType(t) => t.data_space(),
            NamespaceItem::EnumType(t) => t.data_space(),
            NamespaceItem::AssociationType(t) => t.data_space(),
            NamespaceItem::Function(f) => f.data_space(),
        }
    }

    /// Human-readable kind, used in log output.
    pub fn kind_name(&self) -> &'static str {
        match self {
            NamespaceItem::EntityType(_) => "entity type",
            NamespaceItem::ComplexType(_) => "complex type",
            NamespaceItem::EnumType(_) => "enum type",
            NamespaceItem::AssociationType(_) => "association type",
            NamespaceItem::Function(_) => "function",
        }
    }

    /// Rebuild through the item's builder, recomputing derived state and
    /// re-running its validation.
    pub(crate) fn reseal(&self) -> Result<NamespaceItem> {
        Ok(match self {
            NamespaceItem::EntityType(t) => t.to_builder().build()?.into(),
            NamespaceItem::ComplexType(t) => t.to_builder().build()?.into(),
            NamespaceItem::EnumType(t) => t.to_builder().build()?.into(),
            NamespaceItem::AssociationType(t) => t.to_builder().build()?.into(),
            NamespaceItem::Function(f) => f.to_builder().build()?.into(),
        })
    }

    pub fn as_entity_type(&self) -> Option<&EntityType> {
        match self {
            NamespaceItem::EntityType(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_association_type(&self) -> Option<&AssociationType> {
        match self {
            NamespaceItem::AssociationType(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&EdmFunction> {
        match self {
            NamespaceItem::Function(f) => Some(f),
            _ => None,
        }
    }
}

impl Identified for NamespaceItem {
    fn identity(&self) -> &str {
        NamespaceItem::identity(self)
    }
}

impl From<EntityType> for NamespaceItem {
    fn from(t: EntityType) -> Self {
        NamespaceItem::EntityType(t)
    }
}

impl From<ComplexType> for NamespaceItem {
    fn from(t: ComplexType) -> Self {
        NamespaceItem::ComplexType(t)
    }
}

impl From<EnumType> for NamespaceItem {
    fn from(t: EnumType) -> Self {
        NamespaceItem::EnumType(t)
    }
}

impl From<AssociationType> for NamespaceItem {
    fn from(t: AssociationType) -> Self {
        NamespaceItem::AssociationType(t)
    }
}

impl From<EdmFunction> for NamespaceItem {
    fn from(f: EdmFunction) -> Self {
        NamespaceItem::Function(f)
    }
}
