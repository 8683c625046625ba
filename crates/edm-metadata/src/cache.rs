//! Shared cache of sealed models.

use crate::model::EdmModel;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::trace;

/// Cache of sealed models keyed by caller-chosen strings (a connection
/// identity, a migration id, a document fingerprint).
///
/// Construct one per application root and hand out `Arc<MetadataCache>`.
#[derive(Debug, Default)]
pub struct MetadataCache {
    models: DashMap<String, Arc<EdmModel>>,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Arc<EdmModel>> {
        self.models.get(key).map(|entry| Arc::clone(entry.value()))
    }

    /// Insert a model, returning the shared handle now stored under `key`.
    pub fn insert(&self, key: impl Into<String>, model: EdmModel) -> Arc<EdmModel> {
        let model = Arc::new(model);
        self.models.insert(key.into(), Arc::clone(&model));
        model
    }

    /// Return the cached model, or load and cache it.
    ///
    /// Loader errors are returned and nothing is cached.
    pub fn get_or_try_insert_with<E>(
        &self,
        key: &str,
        load: impl FnOnce() -> Result<EdmModel, E>,
    ) -> Result<Arc<EdmModel>, E> {
        if let Some(model) = self.get(key) {
            trace!(key, "Metadata cache hit");
            return Ok(model);
        }
        trace!(key, "Metadata cache miss");
        let model = Arc::new(load()?);
        let entry = self
            .models
            .entry(key.to_string())
            .or_insert_with(|| Arc::clone(&model));
        Ok(Arc::clone(entry.value()))
    }

    pub fn remove(&self, key: &str) -> Option<Arc<EdmModel>> {
        self.models.remove(key).map(|(_, model)| model)
    }

    pub fn clear(&self) {
        self.models.clear();
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MetadataError;
    use crate::types::DataSpace;

    #[test]
    fn test_loader_runs_once() {
        let cache = MetadataCache::new();
        let mut calls = 0;

        for _ in 0..3 {
            let model = cache
                .get_or_try_insert_with::<MetadataError>("store", || {
                    calls += 1;
                    EdmModel::empty(DataSpace::SSpace)
                })
                .unwrap();
            assert_eq!(model.data_space(), DataSpace::SSpace);
        }
        assert_eq!(calls, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let cache = MetadataCache::new();
        let result = cache.get_or_try_insert_with("bad", || EdmModel::empty(DataSpace::OSpace));
        assert!(result.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_instances_are_independent() {
        let first = Arc::new(MetadataCache::new());
        let second = Arc::new(MetadataCache::new());
        first.insert("m", EdmModel::empty(DataSpace::CSpace).unwrap());
        assert!(first.get("m").is_some());
        assert!(second.get("m").is_none());
    }
}
