//! In-process key-value store. The sole source of truth: entities and the
//! denormalized index lists all live here under the keys in [`keys`].

pub mod keys;

use dashmap::DashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::AppError;

pub struct MemoryStore {
    entries: DashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AppError> {
        match self.entries.get(key) {
            Some(entry) => {
                let value = serde_json::from_value(entry.value().clone()).map_err(|err| {
                    AppError::Internal(format!("corrupt value at {key}: {err}"))
                })?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    pub fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<(), AppError> {
        let raw = serde_json::to_value(value)
            .map_err(|err| AppError::Internal(format!("serialize {key}: {err}")))?;
        self.entries.insert(key.to_string(), raw);
        Ok(())
    }

    pub fn remove(&self, key: &str) {
        self.entries.remove(key);
    }

    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.key().starts_with(prefix))
            .count()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryStore;
    use super::keys;

    #[test]
    fn get_returns_what_put_stored() {
        let store = MemoryStore::new();
        store.put("order:abc", &vec![1, 2, 3]).unwrap();

        let value: Option<Vec<i32>> = store.get("order:abc").unwrap();
        assert_eq!(value, Some(vec![1, 2, 3]));
    }

    #[test]
    fn missing_key_is_none() {
        let store = MemoryStore::new();
        let value: Option<String> = store.get("order:missing").unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn count_prefix_only_counts_matching_keys() {
        let store = MemoryStore::new();
        store.put(&keys::order("a"), &1).unwrap();
        store.put(&keys::order("b"), &2).unwrap();
        store.put(&keys::wallet("a"), &3).unwrap();

        assert_eq!(store.count_prefix("order:"), 2);
        assert_eq!(store.count_prefix("wallet:"), 1);
    }
}
