//! EDM Metadata - conceptual and store metadata model.
//!
//! This crate provides the sealed type graph consumed by the migrations
//! engine:
//! - Entity, complex, enum and association types built through builders
//! - Entity containers with entity, association and function sets
//! - Store functions with modification mappings
//! - Whole-model validation, JSON documents and fingerprints
//! - An injectable cache of sealed models
//!
//! # Example
//!
//! ```ignore
//! use edm_metadata::{DataSpace, EdmModel, EdmProperty, EntitySet, EntityType, PrimitiveTypeKind};
//!
//! let customer = EntityType::builder("CodeFirstDatabaseSchema", "Customer", DataSpace::SSpace)
//!     .key_property(EdmProperty::primitive("Id", PrimitiveTypeKind::Int32).identity())
//!     .property(EdmProperty::primitive("Name", PrimitiveTypeKind::String))
//!     .build()?;
//!
//! let model = EdmModel::builder(DataSpace::SSpace)?
//!     .with_item(customer)?
//!     .with_entity_set(EntitySet::new("Customers", "CodeFirstDatabaseSchema.Customer"))?
//!     .build()?;
//! ```

pub mod association;
pub mod cache;
pub mod collection;
pub mod complex;
pub mod container;
pub mod entity;
pub mod error;
pub mod function;
pub mod item;
pub mod model;
pub mod property;
pub mod serialization;
pub mod types;
pub mod validation;

pub use association::{AssociationEndMember, AssociationType, AssociationTypeBuilder, ReferentialConstraint};
pub use cache::MetadataCache;
pub use collection::{Identified, ItemCollection};
pub use complex::{ComplexType, ComplexTypeBuilder, EnumMember, EnumType, EnumTypeBuilder};
pub use container::{AssociationSet, EntityContainer, EntitySet, FunctionImport};
pub use entity::{EntityType, EntityTypeBuilder, IndexDef};
pub use error::MetadataError;
pub use function::{
    EdmFunction, EdmFunctionBuilder, FunctionParameter, ModificationFunctionKind,
    ModificationFunctionMapping,
};
pub use item::NamespaceItem;
pub use model::{EdmModel, EdmModelBuilder, CONCEPTUAL_CONTAINER, STORE_CONTAINER};
pub use property::{EdmProperty, Facets, MaxLength, NavigationProperty, TypeRef};
pub use types::{
    ConcurrencyMode, DataSpace, Multiplicity, OperationAction, ParameterMode, PrimitiveTypeKind,
    StoreGeneratedPattern,
};

/// Result type for metadata operations.
pub type Result<T> = std::result::Result<T, MetadataError>;
