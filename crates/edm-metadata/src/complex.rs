//! Complex and enum types.

use crate::collection::{Identified, ItemCollection};
use crate::error::MetadataError;
use crate::property::EdmProperty;
use crate::types::{DataSpace, PrimitiveTypeKind};
use crate::validation;
use crate::Result;
use serde::{Deserialize, Serialize};

/// A keyless structural type embedded in entity types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexType {
    namespace: String,
    name: String,
    identity: String,
    data_space: DataSpace,
    properties: ItemCollection<EdmProperty>,
}

impl ComplexType {
    pub fn builder(
        namespace: impl Into<String>,
        name: impl Into<String>,
        data_space: DataSpace,
    ) -> ComplexTypeBuilder {
        ComplexTypeBuilder {
            namespace: namespace.into(),
            name: name.into(),
            data_space,
            properties: Vec::new(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn data_space(&self) -> DataSpace {
        self.data_space
    }

    pub fn properties(&self) -> &ItemCollection<EdmProperty> {
        &self.properties
    }

    pub fn to_builder(&self) -> ComplexTypeBuilder {
        ComplexTypeBuilder {
            namespace: self.namespace.clone(),
            name: self.name.clone(),
            data_space: self.data_space,
            properties: self.properties.as_slice().to_vec(),
        }
    }
}

/// Mutable construction state for a [`ComplexType`].
#[derive(Debug, Clone)]
pub struct ComplexTypeBuilder {
    namespace: String,
    name: String,
    data_space: DataSpace,
    properties: Vec<EdmProperty>,
}

impl ComplexTypeBuilder {
    pub fn property(mut self, property: EdmProperty) -> Self {
        self.properties.push(property);
        self
    }

    pub fn build(self) -> Result<ComplexType> {
        let identity = format!("{}.{}", self.namespace, self.name);
        let properties =
            ItemCollection::new(self.properties).map_err(|member| MetadataError::DuplicateMember {
                type_name: identity.clone(),
                member,
            })?;
        let complex = ComplexType {
            namespace: self.namespace,
            name: self.name,
            identity,
            data_space: self.data_space,
            properties,
        };
        validation::validate_complex_type(&complex)?;
        Ok(complex)
    }
}

/// A named enum member.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumMember {
    pub name: String,
    pub value: i64,
}

impl Identified for EnumMember {
    fn identity(&self) -> &str {
        &self.name
    }
}

/// An enumeration over an integral underlying type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumType {
    namespace: String,
    name: String,
    identity: String,
    data_space: DataSpace,
    underlying_type: PrimitiveTypeKind,
    is_flags: bool,
    members: ItemCollection<EnumMember>,
}

impl EnumType {
    pub fn builder(namespace: impl Into<String>, name: impl Into<String>) -> EnumTypeBuilder {
        EnumTypeBuilder {
            namespace: namespace.into(),
            name: name.into(),
            underlying_type: PrimitiveTypeKind::Int32,
            is_flags: false,
            members: Vec::new(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Enum types only exist in conceptual space.
    pub fn data_space(&self) -> DataSpace {
        self.data_space
    }

    pub fn underlying_type(&self) -> PrimitiveTypeKind {
        self.underlying_type
    }

    pub fn is_flags(&self) -> bool {
        self.is_flags
    }

    pub fn members(&self) -> &ItemCollection<EnumMember> {
        &self.members
    }

    pub fn to_builder(&self) -> EnumTypeBuilder {
        EnumTypeBuilder {
            namespace: self.namespace.clone(),
            name: self.name.clone(),
            underlying_type: self.underlying_type,
            is_flags: self.is_flags,
            members: self.members.as_slice().to_vec(),
        }
    }
}

/// Mutable construction state for an [`EnumType`].
#[derive(Debug, Clone)]
pub struct EnumTypeBuilder {
    namespace: String,
    name: String,
    underlying_type: PrimitiveTypeKind,
    is_flags: bool,
    members: Vec<EnumMember>,
}

impl EnumTypeBuilder {
    pub fn underlying_type(mut self, kind: PrimitiveTypeKind) -> Self {
        self.underlying_type = kind;
        self
    }

    pub fn flags(mut self) -> Self {
        self.is_flags = true;
        self
    }

    pub fn member(mut self, name: impl Into<String>, value: i64) -> Self {
        self.members.push(EnumMember {
            name: name.into(),
            value,
        });
        self
    }

    pub fn build(self) -> Result<EnumType> {
        let identity = format!("{}.{}", self.namespace, self.name);
        let members =
            ItemCollection::new(self.members).map_err(|member| MetadataError::DuplicateMember {
                type_name: identity.clone(),
                member,
            })?;
        let enum_type = EnumType {
            namespace: self.namespace,
            name: self.name,
            identity,
            data_space: DataSpace::CSpace,
            underlying_type: self.underlying_type,
            is_flags: self.is_flags,
            members,
        };
        validation::validate_enum_type(&enum_type)?;
        Ok(enum_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complex_type() {
        let address = ComplexType::builder("Model", "Address", DataSpace::CSpace)
            .property(EdmProperty::primitive("Street", PrimitiveTypeKind::String))
            .property(EdmProperty::primitive("City", PrimitiveTypeKind::String))
            .build()
            .unwrap();
        assert_eq!(address.identity(), "Model.Address");
        assert!(address.properties().get("City").is_some());
    }

    #[test]
    fn test_enum_requires_integral_underlying_type() {
        let err = EnumType::builder("Model", "Color")
            .underlying_type(PrimitiveTypeKind::String)
            .member("Red", 0)
            .build()
            .unwrap_err();
        assert!(matches!(err, MetadataError::InvalidPropertyType { .. }));
    }

    #[test]
    fn test_enum_members_unique() {
        let err = EnumType::builder("Model", "Color")
            .member("Red", 0)
            .member("Red", 1)
            .build()
            .unwrap_err();
        assert!(matches!(err, MetadataError::DuplicateMember { .. }));
    }
}
