//! Properties, facets and navigation properties.

use crate::collection::Identified;
use crate::types::{ConcurrencyMode, PrimitiveTypeKind, StoreGeneratedPattern};
use serde::{Deserialize, Serialize};

/// Maximum length facet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaxLength {
    /// Bounded length.
    Fixed(u32),
    /// Provider maximum (`max`).
    Max,
}

impl MaxLength {
    /// Whether `self` can hold every value `other` can.
    pub fn covers(self, other: MaxLength) -> bool {
        match (self, other) {
            (MaxLength::Max, _) => true,
            (MaxLength::Fixed(_), MaxLength::Max) => false,
            (MaxLength::Fixed(a), MaxLength::Fixed(b)) => a >= b,
        }
    }
}

/// Facets refining a property's type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Facets {
    pub max_length: Option<MaxLength>,
    pub precision: Option<u8>,
    pub scale: Option<u8>,
    pub fixed_length: Option<bool>,
    pub unicode: Option<bool>,
    pub store_generated_pattern: StoreGeneratedPattern,
    pub concurrency_mode: ConcurrencyMode,
    pub collation: Option<String>,
}

/// Reference to the type of a property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeRef {
    /// A primitive type.
    Primitive(PrimitiveTypeKind),
    /// An enum type, by identity.
    Enum(String),
    /// A complex type, by identity.
    Complex(String),
}

impl TypeRef {
    /// The primitive kind, if this is a primitive reference.
    pub fn primitive(&self) -> Option<PrimitiveTypeKind> {
        match self {
            TypeRef::Primitive(kind) => Some(*kind),
            _ => None,
        }
    }
}

/// A structural property of an entity or complex type.
///
/// In store space a property is a column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdmProperty {
    /// Property name (the column name in store space).
    pub name: String,
    /// Property type.
    pub type_ref: TypeRef,
    /// Whether the property accepts null.
    pub nullable: bool,
    /// Type facets.
    pub facets: Facets,
    /// Store-specific type name overriding the provider default.
    pub store_type: Option<String>,
    /// Conceptual member this column is mapped from.
    ///
    /// Stays the same when the column is renamed, so the differ can emit a
    /// rename instead of a drop and add.
    pub mapped_member: Option<String>,
}

impl EdmProperty {
    /// Create a nullable primitive property.
    pub fn primitive(name: impl Into<String>, kind: PrimitiveTypeKind) -> Self {
        Self {
            name: name.into(),
            type_ref: TypeRef::Primitive(kind),
            nullable: true,
            facets: Facets::default(),
            store_type: None,
            mapped_member: None,
        }
    }

    /// Create a non-nullable primitive property.
    pub fn required(name: impl Into<String>, kind: PrimitiveTypeKind) -> Self {
        Self::primitive(name, kind).not_null()
    }

    /// Create a property of an enum type.
    pub fn enumeration(name: impl Into<String>, enum_type: impl Into<String>) -> Self {
        Self {
            type_ref: TypeRef::Enum(enum_type.into()),
            ..Self::primitive(name, PrimitiveTypeKind::Int32)
        }
    }

    /// Create a property of a complex type.
    pub fn complex(name: impl Into<String>, complex_type: impl Into<String>) -> Self {
        Self {
            type_ref: TypeRef::Complex(complex_type.into()),
            nullable: false,
            ..Self::primitive(name, PrimitiveTypeKind::Int32)
        }
    }

    /// Mark as non-nullable.
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn with_max_length(mut self, max_length: MaxLength) -> Self {
        self.facets.max_length = Some(max_length);
        self
    }

    pub fn with_precision(mut self, precision: u8, scale: u8) -> Self {
        self.facets.precision = Some(precision);
        self.facets.scale = Some(scale);
        self
    }

    pub fn with_fixed_length(mut self, fixed_length: bool) -> Self {
        self.facets.fixed_length = Some(fixed_length);
        self
    }

    pub fn with_unicode(mut self, unicode: bool) -> Self {
        self.facets.unicode = Some(unicode);
        self
    }

    pub fn with_collation(mut self, collation: impl Into<String>) -> Self {
        self.facets.collation = Some(collation.into());
        self
    }

    /// Mark as store-generated identity.
    pub fn identity(mut self) -> Self {
        self.facets.store_generated_pattern = StoreGeneratedPattern::Identity;
        self
    }

    /// Mark as store-computed.
    pub fn computed(mut self) -> Self {
        self.facets.store_generated_pattern = StoreGeneratedPattern::Computed;
        self
    }

    /// Mark as an optimistic concurrency token.
    pub fn concurrency_token(mut self) -> Self {
        self.facets.concurrency_mode = ConcurrencyMode::Fixed;
        self
    }

    /// Override the provider store type.
    pub fn with_store_type(mut self, store_type: impl Into<String>) -> Self {
        self.store_type = Some(store_type.into());
        self
    }

    /// Pin the column to a conceptual member.
    pub fn mapped_from(mut self, member: impl Into<String>) -> Self {
        self.mapped_member = Some(member.into());
        self
    }

    /// The primitive kind of this property, if primitive.
    pub fn primitive_kind(&self) -> Option<PrimitiveTypeKind> {
        self.type_ref.primitive()
    }

    pub fn is_identity(&self) -> bool {
        self.facets.store_generated_pattern == StoreGeneratedPattern::Identity
    }

    /// Whether this is a row-version style column (binary, computed, concurrency token).
    pub fn is_timestamp(&self) -> bool {
        self.primitive_kind() == Some(PrimitiveTypeKind::Binary)
            && self.facets.store_generated_pattern == StoreGeneratedPattern::Computed
            && self.facets.concurrency_mode == ConcurrencyMode::Fixed
    }
}

impl Identified for EdmProperty {
    fn identity(&self) -> &str {
        &self.name
    }
}

/// Navigation from one end of an association to the other.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NavigationProperty {
    /// Navigation property name.
    pub name: String,
    /// Identity of the association type traversed.
    pub relationship: String,
    /// Role of the declaring end.
    pub from_role: String,
    /// Role of the target end.
    pub to_role: String,
}

impl NavigationProperty {
    pub fn new(
        name: impl Into<String>,
        relationship: impl Into<String>,
        from_role: impl Into<String>,
        to_role: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            relationship: relationship.into(),
            from_role: from_role.into(),
            to_role: to_role.into(),
        }
    }
}

impl Identified for NavigationProperty {
    fn identity(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_builder() {
        let property = EdmProperty::required("Name", PrimitiveTypeKind::String)
            .with_max_length(MaxLength::Fixed(128))
            .with_unicode(false);

        assert!(!property.nullable);
        assert_eq!(property.facets.max_length, Some(MaxLength::Fixed(128)));
        assert_eq!(property.facets.unicode, Some(false));
        assert_eq!(property.primitive_kind(), Some(PrimitiveTypeKind::String));
    }

    #[test]
    fn test_timestamp_detection() {
        let rowversion = EdmProperty::required("RowVersion", PrimitiveTypeKind::Binary)
            .computed()
            .concurrency_token();
        assert!(rowversion.is_timestamp());

        let blob = EdmProperty::primitive("Photo", PrimitiveTypeKind::Binary);
        assert!(!blob.is_timestamp());
    }

    #[test]
    fn test_max_length_covers() {
        assert!(MaxLength::Max.covers(MaxLength::Fixed(10)));
        assert!(MaxLength::Fixed(20).covers(MaxLength::Fixed(10)));
        assert!(!MaxLength::Fixed(10).covers(MaxLength::Fixed(20)));
        assert!(!MaxLength::Fixed(4000).covers(MaxLength::Max));
    }
}
