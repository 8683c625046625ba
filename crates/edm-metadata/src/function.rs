//! Store functions and modification function mappings.

use crate::collection::{Identified, ItemCollection};
use crate::error::MetadataError;
use crate::property::Facets;
use crate::types::{DataSpace, ParameterMode, PrimitiveTypeKind};
use crate::validation;
use crate::Result;
use serde::{Deserialize, Serialize};

/// A function parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionParameter {
    pub name: String,
    pub kind: PrimitiveTypeKind,
    pub mode: ParameterMode,
    pub facets: Facets,
    pub store_type: Option<String>,
}

impl FunctionParameter {
    pub fn new(name: impl Into<String>, kind: PrimitiveTypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            mode: ParameterMode::In,
            facets: Facets::default(),
            store_type: None,
        }
    }

    pub fn with_mode(mut self, mode: ParameterMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_facets(mut self, facets: Facets) -> Self {
        self.facets = facets;
        self
    }

    pub fn with_store_type(mut self, store_type: impl Into<String>) -> Self {
        self.store_type = Some(store_type.into());
        self
    }
}

impl Identified for FunctionParameter {
    fn identity(&self) -> &str {
        &self.name
    }
}

/// Which modification a mapped procedure performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModificationFunctionKind {
    Insert,
    Update,
    Delete,
}

impl std::fmt::Display for ModificationFunctionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModificationFunctionKind::Insert => write!(f, "Insert"),
            ModificationFunctionKind::Update => write!(f, "Update"),
            ModificationFunctionKind::Delete => write!(f, "Delete"),
        }
    }
}

/// Binds a store procedure to the modification of an entity set.
///
/// This binding is stable while the procedure itself is renamed or moved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModificationFunctionMapping {
    /// Name of the mapped entity set.
    pub entity_set: String,
    pub kind: ModificationFunctionKind,
}

impl ModificationFunctionMapping {
    pub fn new(entity_set: impl Into<String>, kind: ModificationFunctionKind) -> Self {
        Self {
            entity_set: entity_set.into(),
            kind,
        }
    }

    /// `{entity_set}.{kind}`.
    pub fn key(&self) -> String {
        format!("{}.{}", self.entity_set, self.kind)
    }
}

/// A sealed function. In store space, a stored procedure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdmFunction {
    namespace: String,
    name: String,
    identity: String,
    data_space: DataSpace,
    schema: Option<String>,
    store_function_name: Option<String>,
    parameters: ItemCollection<FunctionParameter>,
    body: Option<String>,
    mapping: Option<ModificationFunctionMapping>,
}

impl EdmFunction {
    pub fn builder(
        namespace: impl Into<String>,
        name: impl Into<String>,
        data_space: DataSpace,
    ) -> EdmFunctionBuilder {
        EdmFunctionBuilder {
            namespace: namespace.into(),
            name: name.into(),
            data_space,
            schema: None,
            store_function_name: None,
            parameters: Vec::new(),
            body: None,
            mapping: None,
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

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// Name of the procedure in the database.
    pub fn store_name(&self) -> &str {
        self.store_function_name.as_deref().unwrap_or(&self.name)
    }

    pub fn parameters(&self) -> &ItemCollection<FunctionParameter> {
        &self.parameters
    }

    /// Procedure body (command text).
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn mapping(&self) -> Option<&ModificationFunctionMapping> {
        self.mapping.as_ref()
    }

    pub fn to_builder(&self) -> EdmFunctionBuilder {
        EdmFunctionBuilder {
            namespace: self.namespace.clone(),
            name: self.name.clone(),
            data_space: self.data_space,
            schema: self.schema.clone(),
            store_function_name: self.store_function_name.clone(),
            parameters: self.parameters.as_slice().to_vec(),
            body: self.body.clone(),
            mapping: self.mapping.clone(),
        }
    }
}

/// Mutable construction state for an [`EdmFunction`].
#[derive(Debug, Clone)]
pub struct EdmFunctionBuilder {
    namespace: String,
    name: String,
    data_space: DataSpace,
    schema: Option<String>,
    store_function_name: Option<String>,
    parameters: Vec<FunctionParameter>,
    body: Option<String>,
    mapping: Option<ModificationFunctionMapping>,
}

impl EdmFunctionBuilder {
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Database name, when it differs from the function name.
    pub fn store_name(mut self, name: impl Into<String>) -> Self {
        self.store_function_name = Some(name.into());
        self
    }

    pub fn parameter(mut self, parameter: FunctionParameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn mapping(mut self, mapping: ModificationFunctionMapping) -> Self {
        self.mapping = Some(mapping);
        self
    }

    pub fn build(self) -> Result<EdmFunction> {
        let identity = format!("{}.{}", self.namespace, self.name);
        let parameters =
            ItemCollection::new(self.parameters).map_err(|member| MetadataError::DuplicateMember {
                type_name: identity.clone(),
                member,
            })?;
        let function = EdmFunction {
            namespace: self.namespace,
            name: self.name,
            identity,
            data_space: self.data_space,
            schema: self.schema,
            store_function_name: self.store_function_name,
            parameters,
            body: self.body,
            mapping: self.mapping,
        };
        validation::validate_function(&function)?;
        Ok(function)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_name_defaults_to_name() {
        let function = EdmFunction::builder("Store", "Order_Insert", DataSpace::SSpace)
            .parameter(FunctionParameter::new("Id", PrimitiveTypeKind::Int32))
            .mapping(ModificationFunctionMapping::new("Orders", ModificationFunctionKind::Insert))
            .build()
            .unwrap();

        assert_eq!(function.store_name(), "Order_Insert");
        assert_eq!(function.mapping().unwrap().key(), "Orders.Insert");

        let renamed = function.to_builder().store_name("InsertOrder").build().unwrap();
        assert_eq!(renamed.store_name(), "InsertOrder");
        assert_eq!(renamed.identity(), function.identity());
    }

    #[test]
    fn test_duplicate_parameter_rejected() {
        let err = EdmFunction::builder("Store", "F", DataSpace::SSpace)
            .parameter(FunctionParameter::new("Id", PrimitiveTypeKind::Int32))
            .parameter(FunctionParameter::new("Id", PrimitiveTypeKind::Int64))
            .build()
            .unwrap_err();
        assert!(matches!(err, MetadataError::DuplicateMember { .. }));
    }
}
