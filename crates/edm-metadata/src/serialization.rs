//! JSON documents and fingerprints for sealed models.

use crate::container::{AssociationSet, EntitySet, FunctionImport};
use crate::error::MetadataError;
use crate::item::NamespaceItem;
use crate::model::EdmModel;
use crate::types::DataSpace;
use crate::Result;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Current document format version.
pub const DOCUMENT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct ModelDocument {
    version: u32,
    data_space: DataSpace,
    container: String,
    items: Vec<NamespaceItem>,
    entity_sets: Vec<EntitySet>,
    #[serde(default)]
    association_sets: Vec<AssociationSet>,
    #[serde(default)]
    function_imports: Vec<FunctionImport>,
}

impl ModelDocument {
    fn from_model(model: &EdmModel) -> Self {
        let container = model.container();
        Self {
            version: DOCUMENT_VERSION,
            data_space: model.data_space(),
            container: container.name().to_string(),
            items: model.items().as_slice().to_vec(),
            entity_sets: container.entity_sets().as_slice().to_vec(),
            association_sets: container.association_sets().as_slice().to_vec(),
            function_imports: container.function_imports().as_slice().to_vec(),
        }
    }

    fn into_model(self) -> Result<EdmModel> {
        if self.version != DOCUMENT_VERSION {
            return Err(MetadataError::Serialization(format!(
                "unsupported document version {}",
                self.version
            )));
        }
        let mut builder = EdmModel::builder(self.data_space)?.with_container_name(self.container);
        for item in &self.items {
            builder.add_item(item.reseal()?)?;
        }
        for set in self.entity_sets {
            builder.add_entity_set(set)?;
        }
        for set in self.association_sets {
            builder.add_association_set(set)?;
        }
        for import in self.function_imports {
            builder.add_function_import(import)?;
        }
        builder.build()
    }
}

impl EdmModel {
    /// Serialize to a compact JSON document.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&ModelDocument::from_model(self))?)
    }

    /// Serialize to an indented JSON document.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&ModelDocument::from_model(self))?)
    }

    /// Load a model from JSON. Every item is rebuilt and the whole model is
    /// validated again.
    pub fn from_json(json: &str) -> Result<EdmModel> {
        let document: ModelDocument = serde_json::from_str(json)?;
        document.into_model()
    }

    /// Load a model from JSON bytes.
    pub fn from_json_slice(bytes: &[u8]) -> Result<EdmModel> {
        let document: ModelDocument = serde_json::from_slice(bytes)?;
        document.into_model()
    }

    /// Stable hex digest of the compact document.
    ///
    /// Two models have the same fingerprint exactly when they serialize to
    /// the same document.
    pub fn fingerprint(&self) -> Result<String> {
        let json = self.to_json()?;
        Ok(hex::encode(blake3::hash(json.as_bytes()).as_bytes()))
    }
}

impl Serialize for EdmModel {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        ModelDocument::from_model(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for EdmModel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let document = ModelDocument::deserialize(deserializer)?;
        document.into_model().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityType;
    use crate::property::EdmProperty;
    use crate::types::PrimitiveTypeKind;

    fn model(extra_column: bool) -> EdmModel {
        let mut entity = EntityType::builder("Store", "Customer", DataSpace::SSpace)
            .key_property(EdmProperty::primitive("Id", PrimitiveTypeKind::Int32).identity());
        if extra_column {
            entity = entity.property(EdmProperty::primitive("Name", PrimitiveTypeKind::String));
        }
        EdmModel::builder(DataSpace::SSpace)
            .unwrap()
            .with_item(entity.build().unwrap())
            .unwrap()
            .with_entity_set(EntitySet::new("Customers", "Store.Customer").with_schema("dbo"))
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn test_json_reload_is_equal() {
        let original = model(true);
        let json = original.to_json().unwrap();
        let loaded = EdmModel::from_json(&json).unwrap();
        assert_eq!(original, loaded);
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        assert_eq!(model(true).fingerprint().unwrap(), model(true).fingerprint().unwrap());
        assert_ne!(model(true).fingerprint().unwrap(), model(false).fingerprint().unwrap());
        assert_eq!(model(false).fingerprint().unwrap().len(), 64);
    }

    #[test]
    fn test_from_json_revalidates() {
        let json = model(true).to_json().unwrap().replace("\"Customers\"", "\"Bad Set\"");
        let err = EdmModel::from_json(&json).unwrap_err();
        assert!(matches!(err, MetadataError::InvalidName { .. }));
    }

    #[test]
    fn test_model_embeds_in_other_documents() {
        let original = model(false);
        let value = serde_json::to_value(vec![original.clone()]).unwrap();
        let loaded: Vec<EdmModel> = serde_json::from_value(value).unwrap();
        assert_eq!(loaded, vec![original]);
        assert!(EdmModel::empty(DataSpace::SSpace).unwrap().is_empty());
        assert!(!model(false).is_empty());
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = EdmModel::from_json("{not json").unwrap_err();
        assert!(matches!(err, MetadataError::Serialization(_)));
    }
}
