//! File Store Module
//!
//! Persistent [`CacheStore`] implementation backing each partition with
//! a directory and each record with a single file. Records survive
//! process restarts, which is what lets the gateway serve traffic after
//! a cold start with the network down.
//!
//! Keys are absolute URLs, so filenames are the hex encoding of the key
//! bytes; decoding a directory listing recovers the exact key set.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use directories::ProjectDirs;
use tokio::fs;

use crate::cache::store::CacheStore;
use crate::error::{GatewayError, Result};

const RECORD_EXTENSION: &str = "bin";

// == File Store ==
/// Disk-backed partitioned blob store rooted at one directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at the given directory. The directory is
    /// created lazily on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the platform cache directory for the gateway, e.g.
    /// `~/.cache/offline-gateway/` on Linux. `None` when no home
    /// directory can be determined.
    pub fn default_dir() -> Option<PathBuf> {
        let dirs = ProjectDirs::from("", "", "offline-gateway")?;
        Some(dirs.cache_dir().to_path_buf())
    }

    fn partition_dir(&self, partition: &str) -> PathBuf {
        self.root.join(partition)
    }

    fn record_path(&self, partition: &str, key: &str) -> PathBuf {
        let mut path = self.partition_dir(partition).join(hex::encode(key));
        path.set_extension(RECORD_EXTENSION);
        path
    }
}

fn store_err(context: &str, err: std::io::Error) -> GatewayError {
    GatewayError::Store(format!("{context}: {err}"))
}

fn key_from_path(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let bytes = hex::decode(stem).ok()?;
    String::from_utf8(bytes).ok()
}

#[async_trait]
impl CacheStore for FileStore {
    async fn put(&self, partition: &str, key: &str, value: Vec<u8>) -> Result<()> {
        let dir = self.partition_dir(partition);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| store_err("create partition", e))?;
        fs::write(self.record_path(partition, key), value)
            .await
            .map_err(|e| store_err("write record", e))
    }

    async fn get(&self, partition: &str, key: &str) -> Result<Option<Vec<u8>>> {
        match fs::read(self.record_path(partition, key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(store_err("read record", e)),
        }
    }

    async fn list_keys(&self, partition: &str) -> Result<Vec<String>> {
        let mut entries = match fs::read_dir(self.partition_dir(partition)).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(store_err("list partition", e)),
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| store_err("list partition", e))?
        {
            if let Some(key) = key_from_path(&entry.path()) {
                keys.push(key);
            }
        }
        keys.sort();
        Ok(keys)
    }

    async fn delete_partition(&self, partition: &str) -> Result<bool> {
        match fs::remove_dir_all(self.partition_dir(partition)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(store_err("delete partition", e)),
        }
    }

    async fn list_partitions(&self) -> Result<Vec<String>> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(store_err("list partitions", e)),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| store_err("list partitions", e))?
        {
            let is_dir = entry
                .file_type()
                .await
                .map_err(|e| store_err("list partitions", e))?
                .is_dir();
            if is_dir {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}
