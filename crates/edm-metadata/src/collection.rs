//! Ordered, identity-indexed collections of metadata items.

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};
use std::collections::HashMap;

/// Something that can be looked up by identity inside an [`ItemCollection`].
pub trait Identified {
    /// The identity of the item within its collection.
    fn identity(&self) -> &str;
}

/// Read-only collection that keeps insertion order and indexes items by identity.
///
/// Once constructed the collection never changes, so the index is computed a
/// single time and every lookup reads the same cached view.
#[derive(Debug, Clone)]
pub struct ItemCollection<T> {
    items: Vec<T>,
    index: HashMap<String, usize>,
    folded: HashMap<String, usize>,
}

impl<T: Identified> ItemCollection<T> {
    /// Build a collection, failing with the first repeated identity.
    pub fn new(items: Vec<T>) -> Result<Self, String> {
        let mut index = HashMap::with_capacity(items.len());
        let mut folded = HashMap::with_capacity(items.len());
        for (position, item) in items.iter().enumerate() {
            let identity = item.identity();
            if index.insert(identity.to_string(), position).is_some() {
                return Err(identity.to_string());
            }
            folded.entry(identity.to_lowercase()).or_insert(position);
        }
        Ok(Self {
            items,
            index,
            folded,
        })
    }

    /// Exact lookup.
    pub fn get(&self, identity: &str) -> Option<&T> {
        self.index.get(identity).map(|&i| &self.items[i])
    }

    /// Case-insensitive lookup. Returns the first item inserted when several
    /// identities differ only by case.
    pub fn get_ignore_case(&self, identity: &str) -> Option<&T> {
        self.folded
            .get(&identity.to_lowercase())
            .map(|&i| &self.items[i])
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.index.contains_key(identity)
    }

    /// Position of an item in insertion order.
    pub fn position(&self, identity: &str) -> Option<usize> {
        self.index.get(identity).copied()
    }
}

impl<T> ItemCollection<T> {
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<T> Default for ItemCollection<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
            folded: HashMap::new(),
        }
    }
}

impl<T: PartialEq> PartialEq for ItemCollection<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<T: Eq> Eq for ItemCollection<T> {}

impl<'a, T> IntoIterator for &'a ItemCollection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: Serialize> Serialize for ItemCollection<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}

impl<'de, T: Identified + Deserialize<'de>> Deserialize<'de> for ItemCollection<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = Vec::<T>::deserialize(deserializer)?;
        ItemCollection::new(items)
            .map_err(|dup| serde::de::Error::custom(format!("duplicate identity '{dup}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Named(&'static str);

    impl Identified for Named {
        fn identity(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn test_lookup_preserves_order() {
        let items = ItemCollection::new(vec![Named("b"), Named("a"), Named("c")]).unwrap();
        let order: Vec<_> = items.iter().map(|n| n.0).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
        assert_eq!(items.position("a"), Some(1));
        assert_eq!(items.get("c"), Some(&Named("c")));
        assert!(items.get("C").is_none());
    }

    #[test]
    fn test_ignore_case_lookup() {
        let items = ItemCollection::new(vec![Named("Customers"), Named("CUSTOMERS")]).unwrap();
        assert_eq!(items.get_ignore_case("customers"), Some(&Named("Customers")));
        assert_eq!(items.get("CUSTOMERS"), Some(&Named("CUSTOMERS")));
    }

    #[test]
    fn test_duplicate_identity_rejected() {
        let err = ItemCollection::new(vec![Named("a"), Named("a")]).unwrap_err();
        assert_eq!(err, "a");
    }
}
