//! Core enumerations shared across the metadata model.

use serde::{Deserialize, Serialize};

/// The space a piece of metadata lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataSpace {
    /// Object (CLR-like) space.
    OSpace,
    /// Conceptual space: the logical entity/relationship graph.
    CSpace,
    /// Store space: the physical database schema.
    SSpace,
    /// Object/conceptual mapping space.
    OCSpace,
    /// Conceptual/store mapping space.
    CSSpace,
}

impl DataSpace {
    /// Whether an `EdmModel` may be built for this space.
    pub fn supports_model(self) -> bool {
        matches!(self, DataSpace::CSpace | DataSpace::SSpace)
    }
}

impl std::fmt::Display for DataSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataSpace::OSpace => write!(f, "OSpace"),
            DataSpace::CSpace => write!(f, "CSpace"),
            DataSpace::SSpace => write!(f, "SSpace"),
            DataSpace::OCSpace => write!(f, "OCSpace"),
            DataSpace::CSSpace => write!(f, "CSSpace"),
        }
    }
}

/// Primitive types understood by every provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveTypeKind {
    Binary,
    Boolean,
    Byte,
    DateTime,
    DateTimeOffset,
    Decimal,
    Double,
    Guid,
    Int16,
    Int32,
    Int64,
    Single,
    String,
    Time,
    Geography,
    Geometry,
}

impl PrimitiveTypeKind {
    /// Whether values of this type are integers.
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            PrimitiveTypeKind::Byte
                | PrimitiveTypeKind::Int16
                | PrimitiveTypeKind::Int32
                | PrimitiveTypeKind::Int64
        )
    }

    /// Whether converting from `self` to `other` never loses data.
    pub fn widens_to(self, other: PrimitiveTypeKind) -> bool {
        use PrimitiveTypeKind::*;
        if self == other {
            return true;
        }
        matches!(
            (self, other),
            (Byte, Int16 | Int32 | Int64 | Decimal | Double)
                | (Int16, Int32 | Int64 | Decimal | Double)
                | (Int32, Int64 | Decimal | Double)
                | (Int64, Decimal)
                | (Single, Double)
                | (DateTime, DateTimeOffset)
        )
    }

    /// Whether this type supports the `MaxLength` facet.
    pub fn has_length(self) -> bool {
        matches!(self, PrimitiveTypeKind::String | PrimitiveTypeKind::Binary)
    }

    /// Whether this type is a spatial type.
    pub fn is_spatial(self) -> bool {
        matches!(self, PrimitiveTypeKind::Geography | PrimitiveTypeKind::Geometry)
    }
}

/// Multiplicity of an association end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Multiplicity {
    /// Zero or one.
    ZeroOrOne,
    /// Exactly one.
    One,
    /// Zero or more.
    Many,
}

/// Action taken on the dependent end when the principal is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OperationAction {
    /// No action.
    #[default]
    None,
    /// Delete dependents.
    Cascade,
}

/// How the store generates a column value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StoreGeneratedPattern {
    /// Value supplied by the client.
    #[default]
    None,
    /// Generated on insert.
    Identity,
    /// Generated on insert and update.
    Computed,
}

/// Optimistic concurrency participation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConcurrencyMode {
    #[default]
    None,
    Fixed,
}

/// Direction of a function parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ParameterMode {
    #[default]
    In,
    Out,
    InOut,
    ReturnValue,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_conceptual_and_store_spaces_support_models() {
        assert!(DataSpace::CSpace.supports_model());
        assert!(DataSpace::SSpace.supports_model());
        assert!(!DataSpace::OSpace.supports_model());
        assert!(!DataSpace::OCSpace.supports_model());
        assert!(!DataSpace::CSSpace.supports_model());
    }

    #[test]
    fn test_widening() {
        assert!(PrimitiveTypeKind::Int32.widens_to(PrimitiveTypeKind::Int64));
        assert!(!PrimitiveTypeKind::Int64.widens_to(PrimitiveTypeKind::Int32));
        assert!(!PrimitiveTypeKind::String.widens_to(PrimitiveTypeKind::Int32));
        assert!(PrimitiveTypeKind::Guid.widens_to(PrimitiveTypeKind::Guid));
    }
}
