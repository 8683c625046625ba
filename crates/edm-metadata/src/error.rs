//! Metadata validation errors.

use crate::types::DataSpace;
use thiserror::Error;

/// Errors raised while building, validating or loading a metadata model.
///
/// These are detected before any diffing takes place and never reach SQL
/// generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetadataError {
    /// A name is not a valid simple identifier (or dotted namespace).
    #[error("'{name}' is not a valid {kind} name")]
    InvalidName {
        /// The kind of element being named.
        kind: &'static str,
        /// The rejected name.
        name: String,
    },

    /// Models can only be built for the conceptual or store data space.
    #[error("a model cannot be created for data space {data_space}")]
    UnsupportedDataSpace {
        /// The rejected data space.
        data_space: DataSpace,
    },

    /// An item was added to a model of a different data space.
    #[error("item '{identity}' belongs to {actual} but the model is {expected}")]
    DataSpaceMismatch {
        /// Identity of the offending item.
        identity: String,
        /// The model's data space.
        expected: DataSpace,
        /// The item's data space.
        actual: DataSpace,
    },

    /// An item with the same identity already exists.
    #[error("an item with identity '{identity}' already exists")]
    DuplicateItem {
        /// Identity of the duplicate item.
        identity: String,
    },

    /// A member name occurs twice within one type.
    #[error("type '{type_name}' declares member '{member}' more than once")]
    DuplicateMember {
        /// The declaring type.
        type_name: String,
        /// The repeated member.
        member: String,
    },

    /// A referenced type does not exist in the model.
    #[error("'{referenced_by}' refers to unknown type '{type_name}'")]
    UnknownType {
        /// The element holding the reference.
        referenced_by: String,
        /// The missing type identity.
        type_name: String,
    },

    /// A key member does not name a property of the declaring type.
    #[error("key member '{member}' is not a property of '{type_name}'")]
    InvalidKey {
        /// The declaring type.
        type_name: String,
        /// The unknown key member.
        member: String,
    },

    /// An entity type declares no key.
    #[error("entity type '{type_name}' has no key")]
    MissingKey {
        /// The declaring type.
        type_name: String,
    },

    /// A member referenced by an index does not exist.
    #[error("'{type_name}' has no member '{member}'")]
    UnknownMember {
        /// The declaring type.
        type_name: String,
        /// The missing member.
        member: String,
    },

    /// A referential constraint is malformed.
    #[error("invalid referential constraint on '{association}': {reason}")]
    InvalidReferentialConstraint {
        /// The association owning the constraint.
        association: String,
        /// What is wrong with it.
        reason: String,
    },

    /// An association set does not line up with its association type.
    #[error("invalid association set '{set}': {reason}")]
    InvalidAssociationSet {
        /// The offending set.
        set: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A property uses a type that is not allowed in its data space.
    #[error("property '{type_name}.{property}' has a type not allowed in {data_space}")]
    InvalidPropertyType {
        /// The declaring type.
        type_name: String,
        /// The offending property.
        property: String,
        /// The model's data space.
        data_space: DataSpace,
    },

    /// A serialized model document could not be read or written.
    #[error("model serialization failed: {0}")]
    Serialization(String),
}

impl MetadataError {
    pub(crate) fn invalid_name(kind: &'static str, name: impl Into<String>) -> Self {
        MetadataError::InvalidName {
            kind,
            name: name.into(),
        }
    }
}

impl From<serde_json::Error> for MetadataError {
    fn from(e: serde_json::Error) -> Self {
        MetadataError::Serialization(e.to_string())
    }
}
