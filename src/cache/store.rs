//! Cache Store Module
//!
//! The swappable blob-store seam: a partitioned async key→bytes store.
//! A missing key is a normal `Ok(None)`, never a failure; only real
//! storage faults surface as errors, and callers are expected to absorb
//! those without aborting unrelated work.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;

// == Cache Store Trait ==
/// Persistent key→bytes store with named partitions.
///
/// Partitions are created implicitly on first write and removed as a
/// whole; individual records are never deleted except with their
/// partition.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Writes a record, creating the partition if needed. Overwrites
    /// any existing record under the same key.
    async fn put(&self, partition: &str, key: &str, value: Vec<u8>) -> Result<()>;

    /// Reads a record. Missing partition or key yields `Ok(None)`.
    async fn get(&self, partition: &str, key: &str) -> Result<Option<Vec<u8>>>;

    /// Lists the keys of a partition; empty for a missing partition.
    async fn list_keys(&self, partition: &str) -> Result<Vec<String>>;

    /// Counts the records in a partition.
    async fn count(&self, partition: &str) -> Result<usize> {
        Ok(self.list_keys(partition).await?.len())
    }

    /// Deletes a whole partition. Returns true if it existed.
    async fn delete_partition(&self, partition: &str) -> Result<bool>;

    /// Lists all partition names, including ones not owned by this
    /// subsystem.
    async fn list_partitions(&self) -> Result<Vec<String>>;
}

// == Memory Store ==
/// In-process store used in tests and when no cache directory is
/// configured. Lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    partitions: RwLock<HashMap<String, HashMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn put(&self, partition: &str, key: &str, value: Vec<u8>) -> Result<()> {
        let mut partitions = self.partitions.write().await;
        partitions
            .entry(partition.to_string())
            .or_default()
            .insert(key.to_string(), value);
        Ok(())
    }

    async fn get(&self, partition: &str, key: &str) -> Result<Option<Vec<u8>>> {
        let partitions = self.partitions.read().await;
        Ok(partitions
            .get(partition)
            .and_then(|records| records.get(key))
            .cloned())
    }

    async fn list_keys(&self, partition: &str) -> Result<Vec<String>> {
        let partitions = self.partitions.read().await;
        let mut keys: Vec<String> = partitions
            .get(partition)
            .map(|records| records.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        Ok(keys)
    }

    async fn delete_partition(&self, partition: &str) -> Result<bool> {
        let mut partitions = self.partitions.write().await;
        Ok(partitions.remove(partition).is_some())
    }

    async fn list_partitions(&self) -> Result<Vec<String>> {
        let partitions = self.partitions.read().await;
        let mut names: Vec<String> = partitions.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_and_get() {
        let store = MemoryStore::new();
        store.put("p1", "key", b"value".to_vec()).await.unwrap();

        let value = store.get("p1", "key").await.unwrap();
        assert_eq!(value, Some(b"value".to_vec()));
    }

    #[tokio::test]
    async fn test_missing_key_is_none_not_error() {
        let store = MemoryStore::new();
        assert_eq!(store.get("p1", "absent").await.unwrap(), None);

        store.put("p1", "key", b"v".to_vec()).await.unwrap();
        assert_eq!(store.get("p1", "absent").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_overwrite_replaces_value() {
        let store = MemoryStore::new();
        store.put("p1", "key", b"old".to_vec()).await.unwrap();
        store.put("p1", "key", b"new".to_vec()).await.unwrap();

        assert_eq!(store.get("p1", "key").await.unwrap(), Some(b"new".to_vec()));
        assert_eq!(store.count("p1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_partitions_are_isolated() {
        let store = MemoryStore::new();
        store.put("payload", "key", b"body".to_vec()).await.unwrap();
        store.put("meta", "key", b"12345".to_vec()).await.unwrap();

        assert_eq!(
            store.get("payload", "key").await.unwrap(),
            Some(b"body".to_vec())
        );
        assert_eq!(
            store.get("meta", "key").await.unwrap(),
            Some(b"12345".to_vec())
        );

        store.delete_partition("meta").await.unwrap();
        assert_eq!(store.get("meta", "key").await.unwrap(), None);
        assert!(store.get("payload", "key").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_partition_reports_existence() {
        let store = MemoryStore::new();
        store.put("p1", "key", b"v".to_vec()).await.unwrap();

        assert!(store.delete_partition("p1").await.unwrap());
        assert!(!store.delete_partition("p1").await.unwrap());
    }

    #[tokio::test]
    async fn test_list_partitions_and_keys_sorted() {
        let store = MemoryStore::new();
        store.put("b", "z", b"1".to_vec()).await.unwrap();
        store.put("a", "y", b"2".to_vec()).await.unwrap();
        store.put("a", "x", b"3".to_vec()).await.unwrap();

        assert_eq!(store.list_partitions().await.unwrap(), vec!["a", "b"]);
        assert_eq!(store.list_keys("a").await.unwrap(), vec!["x", "y"]);
        assert!(store.list_keys("missing").await.unwrap().is_empty());
    }
}
