//! Structural validation of metadata items and whole models.

use crate::association::AssociationType;
use crate::complex::{ComplexType, EnumType};
use crate::container::EntityContainer;
use crate::entity::EntityType;
use crate::error::MetadataError;
use crate::function::EdmFunction;
use crate::item::NamespaceItem;
use crate::property::{EdmProperty, TypeRef};
use crate::types::DataSpace;
use crate::Result;
use std::collections::{HashMap, HashSet};

/// Whether `name` is a simple identifier: a letter or `_` followed by
/// letters, digits or `_`.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Whether `namespace` is a dot-separated list of identifiers.
pub fn is_valid_namespace(namespace: &str) -> bool {
    !namespace.is_empty() && namespace.split('.').all(is_valid_identifier)
}

pub(crate) fn check_identifier(kind: &'static str, name: &str) -> Result<()> {
    if is_valid_identifier(name) {
        Ok(())
    } else {
        Err(MetadataError::invalid_name(kind, name))
    }
}

pub(crate) fn check_namespace(namespace: &str) -> Result<()> {
    if is_valid_namespace(namespace) {
        Ok(())
    } else {
        Err(MetadataError::invalid_name("namespace", namespace))
    }
}

/// Reject a member name declared twice on one type.
pub(crate) fn check_unique_members<'a>(
    type_name: &str,
    names: impl IntoIterator<Item = &'a str>,
) -> Result<()> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(MetadataError::DuplicateMember {
                type_name: type_name.to_string(),
                member: name.to_string(),
            });
        }
    }
    Ok(())
}

fn check_properties(type_name: &str, properties: &[EdmProperty]) -> Result<()> {
    for property in properties {
        check_identifier("property", &property.name)?;
    }
    check_unique_members(type_name, properties.iter().map(|p| p.name.as_str()))
}

pub(crate) fn validate_entity_type(entity: &EntityType) -> Result<()> {
    check_namespace(entity.namespace())?;
    check_identifier("entity type", entity.name())?;
    check_properties(entity.identity(), entity.properties().as_slice())?;
    for navigation in entity.navigation_properties() {
        check_identifier("navigation property", &navigation.name)?;
    }
    check_unique_members(
        entity.identity(),
        entity
            .properties()
            .iter()
            .map(|p| p.name.as_str())
            .chain(entity.navigation_properties().iter().map(|n| n.name.as_str())),
    )?;

    if entity.key_members().is_empty() {
        return Err(MetadataError::MissingKey {
            type_name: entity.identity().to_string(),
        });
    }
    check_unique_members(entity.identity(), entity.key_members().iter().map(String::as_str))?;
    for member in entity.key_members() {
        if !entity.properties().contains(member) {
            return Err(MetadataError::InvalidKey {
                type_name: entity.identity().to_string(),
                member: member.clone(),
            });
        }
    }

    for index in entity.indexes() {
        for column in &index.columns {
            if !entity.properties().contains(column) {
                return Err(MetadataError::UnknownMember {
                    type_name: entity.identity().to_string(),
                    member: column.clone(),
                });
            }
        }
    }
    Ok(())
}

pub(crate) fn validate_complex_type(complex: &ComplexType) -> Result<()> {
    check_namespace(complex.namespace())?;
    check_identifier("complex type", complex.name())?;
    check_properties(complex.identity(), complex.properties().as_slice())
}

pub(crate) fn validate_enum_type(enum_type: &EnumType) -> Result<()> {
    check_namespace(enum_type.namespace())?;
    check_identifier("enum type", enum_type.name())?;
    for member in enum_type.members() {
        check_identifier("enum member", &member.name)?;
    }
    if !enum_type.underlying_type().is_integer() {
        return Err(MetadataError::InvalidPropertyType {
            type_name: enum_type.identity().to_string(),
            property: "UnderlyingType".to_string(),
            data_space: enum_type.data_space(),
        });
    }
    Ok(())
}

pub(crate) fn validate_association_type(association: &AssociationType) -> Result<()> {
    check_namespace(association.namespace())?;
    check_identifier("association", association.name())?;
    check_identifier("association end", &association.source_end().name)?;
    check_identifier("association end", &association.target_end().name)?;

    if let Some(constraint) = association.constraint() {
        let invalid = |reason: &str| MetadataError::InvalidReferentialConstraint {
            association: association.identity().to_string(),
            reason: reason.to_string(),
        };
        let roles = [
            association.source_end().name.as_str(),
            association.target_end().name.as_str(),
        ];
        if !roles.contains(&constraint.principal_role.as_str())
            || !roles.contains(&constraint.dependent_role.as_str())
            || constraint.principal_role == constraint.dependent_role
        {
            return Err(invalid("roles must name the two distinct ends"));
        }
        if constraint.dependent_properties.is_empty() {
            return Err(invalid("no dependent properties"));
        }
        if constraint.principal_properties.len() != constraint.dependent_properties.len() {
            return Err(invalid("principal and dependent property counts differ"));
        }
    }
    Ok(())
}

pub(crate) fn validate_function(function: &EdmFunction) -> Result<()> {
    check_namespace(function.namespace())?;
    check_identifier("function", function.name())?;
    if let Some(schema) = function.schema() {
        check_identifier("schema", schema)?;
    }
    for parameter in function.parameters() {
        check_identifier("parameter", &parameter.name)?;
    }
    Ok(())
}

pub(crate) fn validate_item(item: &NamespaceItem) -> Result<()> {
    match item {
        NamespaceItem::EntityType(t) => validate_entity_type(t),
        NamespaceItem::ComplexType(t) => validate_complex_type(t),
        NamespaceItem::EnumType(t) => validate_enum_type(t),
        NamespaceItem::AssociationType(t) => validate_association_type(t),
        NamespaceItem::Function(f) => validate_function(f),
    }
}

/// Cross-item checks run when a model is built.
pub(crate) fn validate_model(
    data_space: DataSpace,
    items: &[NamespaceItem],
    containers: &[EntityContainer],
) -> Result<()> {
    let by_identity: HashMap<&str, &NamespaceItem> =
        items.iter().map(|item| (item.identity(), item)).collect();

    for item in items {
        if item.data_space() != data_space {
            return Err(MetadataError::DataSpaceMismatch {
                identity: item.identity().to_string(),
                expected: data_space,
                actual: item.data_space(),
            });
        }
        validate_item(item)?;
    }

    for item in items {
        match item {
            NamespaceItem::EntityType(entity) => {
                check_property_types(data_space, entity.identity(), entity.properties().as_slice(), &by_identity)?;
                for navigation in entity.navigation_properties() {
                    match by_identity.get(navigation.relationship.as_str()) {
                        Some(NamespaceItem::AssociationType(_)) => {}
                        _ => {
                            return Err(MetadataError::UnknownType {
                                referenced_by: format!("{}.{}", entity.identity(), navigation.name),
                                type_name: navigation.relationship.clone(),
                            })
                        }
                    }
                }
            }
            NamespaceItem::ComplexType(complex) => {
                check_property_types(data_space, complex.identity(), complex.properties().as_slice(), &by_identity)?;
            }
            NamespaceItem::AssociationType(association) => {
                validate_association_ends(association, &by_identity)?;
            }
            NamespaceItem::EnumType(_) | NamespaceItem::Function(_) => {}
        }
    }

    for container in containers {
        validate_container(data_space, container, &by_identity)?;
    }
    Ok(())
}

fn check_property_types(
    data_space: DataSpace,
    type_name: &str,
    properties: &[EdmProperty],
    by_identity: &HashMap<&str, &NamespaceItem>,
) -> Result<()> {
    for property in properties {
        let referenced = match &property.type_ref {
            TypeRef::Primitive(_) => continue,
            TypeRef::Enum(name) | TypeRef::Complex(name) => name,
        };
        if data_space == DataSpace::SSpace {
            return Err(MetadataError::InvalidPropertyType {
                type_name: type_name.to_string(),
                property: property.name.clone(),
                data_space,
            });
        }
        let resolved = by_identity.get(referenced.as_str());
        let matches = matches!(
            (&property.type_ref, resolved),
            (TypeRef::Enum(_), Some(NamespaceItem::EnumType(_)))
                | (TypeRef::Complex(_), Some(NamespaceItem::ComplexType(_)))
        );
        if !matches {
            return Err(MetadataError::UnknownType {
                referenced_by: format!("{}.{}", type_name, property.name),
                type_name: referenced.clone(),
            });
        }
    }
    Ok(())
}

fn entity_type<'a>(
    by_identity: &HashMap<&str, &'a NamespaceItem>,
    referenced_by: &str,
    identity: &str,
) -> Result<&'a EntityType> {
    match by_identity.get(identity) {
        Some(NamespaceItem::EntityType(entity)) => Ok(entity),
        _ => Err(MetadataError::UnknownType {
            referenced_by: referenced_by.to_string(),
            type_name: identity.to_string(),
        }),
    }
}

fn validate_association_ends(
    association: &AssociationType,
    by_identity: &HashMap<&str, &NamespaceItem>,
) -> Result<()> {
    let source = entity_type(by_identity, association.identity(), &association.source_end().entity_type)?;
    let target = entity_type(by_identity, association.identity(), &association.target_end().entity_type)?;

    let Some(constraint) = association.constraint() else {
        return Ok(());
    };
    let (principal, dependent) = if constraint.principal_role == association.source_end().name {
        (source, target)
    } else {
        (target, source)
    };

    let invalid = |reason: String| MetadataError::InvalidReferentialConstraint {
        association: association.identity().to_string(),
        reason,
    };
    for name in &constraint.principal_properties {
        if !principal.properties().contains(name) {
            return Err(invalid(format!("'{}' has no property '{}'", principal.identity(), name)));
        }
    }
    for name in &constraint.dependent_properties {
        if !dependent.properties().contains(name) {
            return Err(invalid(format!("'{}' has no property '{}'", dependent.identity(), name)));
        }
    }
    let principal_set: HashSet<&str> = constraint.principal_properties.iter().map(String::as_str).collect();
    let key_set: HashSet<&str> = principal.key_members().iter().map(String::as_str).collect();
    if principal_set != key_set {
        return Err(invalid(format!(
            "principal properties must be the key of '{}'",
            principal.identity()
        )));
    }
    Ok(())
}

fn validate_container(
    data_space: DataSpace,
    container: &EntityContainer,
    by_identity: &HashMap<&str, &NamespaceItem>,
) -> Result<()> {
    check_identifier("entity container", container.name())?;
    if container.data_space() != data_space {
        return Err(MetadataError::DataSpaceMismatch {
            identity: container.name().to_string(),
            expected: data_space,
            actual: container.data_space(),
        });
    }

    let mut tables = HashSet::new();
    for set in container.entity_sets() {
        check_identifier("entity set", &set.name)?;
        entity_type(by_identity, &set.name, &set.entity_type)?;
        if let Some(schema) = &set.schema {
            check_identifier("schema", schema)?;
        }
        if data_space == DataSpace::SSpace {
            let table = (set.schema.as_deref(), set.table_name());
            if !tables.insert(table) {
                return Err(MetadataError::DuplicateItem {
                    identity: match set.schema.as_deref() {
                        Some(schema) => format!("{}.{}", schema, set.table_name()),
                        None => set.table_name().to_string(),
                    },
                });
            }
        }
    }

    for set in container.association_sets() {
        check_identifier("association set", &set.name)?;
        let association = match by_identity.get(set.association_type.as_str()) {
            Some(NamespaceItem::AssociationType(a)) => a,
            _ => {
                return Err(MetadataError::UnknownType {
                    referenced_by: set.name.clone(),
                    type_name: set.association_type.clone(),
                })
            }
        };
        let invalid = |reason: String| MetadataError::InvalidAssociationSet {
            set: set.name.clone(),
            reason,
        };
        for (set_name, end) in [
            (&set.source_set, association.source_end()),
            (&set.target_set, association.target_end()),
        ] {
            let entity_set = container
                .entity_sets()
                .get(set_name)
                .ok_or_else(|| invalid(format!("unknown entity set '{set_name}'")))?;
            if entity_set.entity_type != end.entity_type {
                return Err(invalid(format!(
                    "entity set '{}' does not hold '{}'",
                    set_name, end.entity_type
                )));
            }
        }
    }

    for import in container.function_imports() {
        check_identifier("function import", &import.name)?;
        match by_identity.get(import.function.as_str()) {
            Some(NamespaceItem::Function(_)) => {}
            _ => {
                return Err(MetadataError::UnknownType {
                    referenced_by: import.name.clone(),
                    type_name: import.function.clone(),
                })
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifiers() {
        assert!(is_valid_identifier("Customers"));
        assert!(is_valid_identifier("_tmp1"));
        assert!(!is_valid_identifier("1st"));
        assert!(!is_valid_identifier("has space"));
        assert!(!is_valid_identifier(""));
    }

    #[test]
    fn test_namespaces() {
        assert!(is_valid_namespace("CodeFirstDatabaseSchema"));
        assert!(is_valid_namespace("My.App.Models"));
        assert!(!is_valid_namespace("My..Models"));
        assert!(!is_valid_namespace(""));
    }
}
