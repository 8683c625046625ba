//! Associations: relationships between entity types.

use crate::error::MetadataError;
use crate::types::{DataSpace, Multiplicity, OperationAction};
use crate::validation;
use crate::Result;
use serde::{Deserialize, Serialize};

/// One end of an association.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssociationEndMember {
    /// Role name.
    pub name: String,
    /// Identity of the entity type at this end.
    pub entity_type: String,
    pub multiplicity: Multiplicity,
    /// Action applied to the other end when this end is deleted.
    pub delete_action: OperationAction,
}

impl AssociationEndMember {
    pub fn new(
        name: impl Into<String>,
        entity_type: impl Into<String>,
        multiplicity: Multiplicity,
    ) -> Self {
        Self {
            name: name.into(),
            entity_type: entity_type.into(),
            multiplicity,
            delete_action: OperationAction::None,
        }
    }

    /// Delete dependents when this end is deleted.
    pub fn cascade_delete(mut self) -> Self {
        self.delete_action = OperationAction::Cascade;
        self
    }
}

/// Foreign key semantics of an association.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferentialConstraint {
    /// Role of the referenced (principal) end.
    pub principal_role: String,
    /// Role of the referencing (dependent) end.
    pub dependent_role: String,
    /// Principal key properties, paired by position with the dependent ones.
    pub principal_properties: Vec<String>,
    /// Dependent foreign key properties.
    pub dependent_properties: Vec<String>,
}

impl ReferentialConstraint {
    pub fn new<P, D, S, T>(
        principal_role: impl Into<String>,
        principal_properties: P,
        dependent_role: impl Into<String>,
        dependent_properties: D,
    ) -> Self
    where
        P: IntoIterator<Item = S>,
        S: Into<String>,
        D: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            principal_role: principal_role.into(),
            dependent_role: dependent_role.into(),
            principal_properties: principal_properties.into_iter().map(Into::into).collect(),
            dependent_properties: dependent_properties.into_iter().map(Into::into).collect(),
        }
    }
}

/// A sealed association type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationType {
    namespace: String,
    name: String,
    identity: String,
    data_space: DataSpace,
    source_end: AssociationEndMember,
    target_end: AssociationEndMember,
    constraint: Option<ReferentialConstraint>,
}

impl AssociationType {
    pub fn builder(
        namespace: impl Into<String>,
        name: impl Into<String>,
        data_space: DataSpace,
    ) -> AssociationTypeBuilder {
        AssociationTypeBuilder {
            namespace: namespace.into(),
            name: name.into(),
            data_space,
            source_end: None,
            target_end: None,
            constraint: None,
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

    pub fn source_end(&self) -> &AssociationEndMember {
        &self.source_end
    }

    pub fn target_end(&self) -> &AssociationEndMember {
        &self.target_end
    }

    pub fn constraint(&self) -> Option<&ReferentialConstraint> {
        self.constraint.as_ref()
    }

    pub fn is_self_referencing(&self) -> bool {
        self.source_end.entity_type == self.target_end.entity_type
    }

    /// The end named as principal by the constraint.
    pub fn principal_end(&self) -> Option<&AssociationEndMember> {
        let constraint = self.constraint.as_ref()?;
        self.end(&constraint.principal_role)
    }

    /// The end named as dependent by the constraint.
    pub fn dependent_end(&self) -> Option<&AssociationEndMember> {
        let constraint = self.constraint.as_ref()?;
        self.end(&constraint.dependent_role)
    }

    /// Whether deleting a principal cascades to its dependents.
    pub fn cascades_on_delete(&self) -> bool {
        self.principal_end()
            .map(|end| end.delete_action == OperationAction::Cascade)
            .unwrap_or(false)
    }

    fn end(&self, role: &str) -> Option<&AssociationEndMember> {
        [&self.source_end, &self.target_end]
            .into_iter()
            .find(|end| end.name == role)
    }

    pub fn to_builder(&self) -> AssociationTypeBuilder {
        AssociationTypeBuilder {
            namespace: self.namespace.clone(),
            name: self.name.clone(),
            data_space: self.data_space,
            source_end: Some(self.source_end.clone()),
            target_end: Some(self.target_end.clone()),
            constraint: self.constraint.clone(),
        }
    }
}

/// Mutable construction state for an [`AssociationType`].
#[derive(Debug, Clone)]
pub struct AssociationTypeBuilder {
    namespace: String,
    name: String,
    data_space: DataSpace,
    source_end: Option<AssociationEndMember>,
    target_end: Option<AssociationEndMember>,
    constraint: Option<ReferentialConstraint>,
}

impl AssociationTypeBuilder {
    pub fn source(mut self, end: AssociationEndMember) -> Self {
        self.source_end = Some(end);
        self
    }

    pub fn target(mut self, end: AssociationEndMember) -> Self {
        self.target_end = Some(end);
        self
    }

    pub fn constraint(mut self, constraint: ReferentialConstraint) -> Self {
        self.constraint = Some(constraint);
        self
    }

    /// Seal the association.
    ///
    /// When both ends carry the same role name (a self reference built from
    /// the entity name), the target role gets a `1` suffix, and a constraint
    /// naming that role follows it.
    pub fn build(self) -> Result<AssociationType> {
        let identity = format!("{}.{}", self.namespace, self.name);
        let missing = |end: &str| MetadataError::InvalidReferentialConstraint {
            association: identity.clone(),
            reason: format!("missing {end} end"),
        };
        let source_end = self.source_end.ok_or_else(|| missing("source"))?;
        let mut target_end = self.target_end.ok_or_else(|| missing("target"))?;
        let mut constraint = self.constraint;

        if target_end.name == source_end.name {
            target_end.name = format!("{}1", target_end.name);
            if let Some(constraint) = constraint.as_mut() {
                // The dependent side of a self reference is the target end.
                if constraint.dependent_role == source_end.name
                    && constraint.principal_role == source_end.name
                {
                    constraint.dependent_role = target_end.name.clone();
                }
            }
        }

        let association = AssociationType {
            namespace: self.namespace,
            name: self.name,
            identity,
            data_space: self.data_space,
            source_end,
            target_end,
            constraint,
        };
        validation::validate_association_type(&association)?;
        Ok(association)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order_customer() -> AssociationTypeBuilder {
        AssociationType::builder("Store", "Order_Customer", DataSpace::SSpace)
            .source(AssociationEndMember::new("Customer", "Store.Customer", Multiplicity::One).cascade_delete())
            .target(AssociationEndMember::new("Order", "Store.Order", Multiplicity::Many))
    }

    #[test]
    fn test_principal_and_dependent_ends() {
        let association = order_customer()
            .constraint(ReferentialConstraint::new("Customer", ["Id"], "Order", ["CustomerId"]))
            .build()
            .unwrap();

        assert_eq!(association.principal_end().unwrap().entity_type, "Store.Customer");
        assert_eq!(association.dependent_end().unwrap().entity_type, "Store.Order");
        assert!(association.cascades_on_delete());
    }

    #[test]
    fn test_self_reference_renames_target_end() {
        let association = AssociationType::builder("Store", "Employee_Manager", DataSpace::SSpace)
            .source(AssociationEndMember::new("Employee", "Store.Employee", Multiplicity::ZeroOrOne))
            .target(AssociationEndMember::new("Employee", "Store.Employee", Multiplicity::Many))
            .constraint(ReferentialConstraint::new("Employee", ["Id"], "Employee", ["ManagerId"]))
            .build()
            .unwrap();

        assert!(association.is_self_referencing());
        assert_eq!(association.source_end().name, "Employee");
        assert_eq!(association.target_end().name, "Employee1");
        assert_eq!(association.constraint().unwrap().dependent_role, "Employee1");
    }

    #[test]
    fn test_mismatched_constraint_rejected() {
        let err = order_customer()
            .constraint(ReferentialConstraint::new("Customer", ["Id"], "Order", ["CustomerId", "Extra"]))
            .build()
            .unwrap_err();
        assert!(matches!(err, MetadataError::InvalidReferentialConstraint { .. }));
    }

    #[test]
    fn test_missing_end_rejected() {
        let err = AssociationType::builder("Store", "Broken", DataSpace::SSpace)
            .source(AssociationEndMember::new("A", "Store.A", Multiplicity::One))
            .build()
            .unwrap_err();
        assert!(matches!(err, MetadataError::InvalidReferentialConstraint { .. }));
    }
}
