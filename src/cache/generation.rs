//! Cache Generation Module
//!
//! One generation is one cache epoch, identified by a version tag.
//! Exactly one generation is current at any time; activation deletes
//! every other generation carrying this subsystem's prefix.

use crate::cache::CACHE_PREFIX;

// == Partition Kind ==
/// The two partitions a generation owns.
///
/// A cache record is addressed by the composite (partition kind,
/// resource key): payload bytes live in `Payload`, the paired
/// last-fetched timestamp lives in `Meta` under the same resource key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionKind {
    /// Response bytes and headers
    Payload,
    /// Last-fetched epoch-millis timestamps
    Meta,
}

// == Cache Generation ==
/// Identifies one cache epoch and derives its partition names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheGeneration {
    prefix: String,
    version: String,
}

impl CacheGeneration {
    /// Creates a generation for the given semantic version under the
    /// subsystem prefix.
    pub fn new(version: impl Into<String>) -> Self {
        Self::with_prefix(CACHE_PREFIX, version)
    }

    /// Creates a generation under an explicit prefix.
    pub fn with_prefix(prefix: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            version: version.into(),
        }
    }

    /// Returns the version tag.
    pub fn version(&self) -> &str {
        &self.version
    }

    // == Partition Naming ==
    /// Returns the partition name for the given kind:
    /// `<prefix>-v<version>` for payloads, `<prefix>-v<version>-meta`
    /// for timestamps.
    pub fn partition(&self, kind: PartitionKind) -> String {
        match kind {
            PartitionKind::Payload => format!("{}-v{}", self.prefix, self.version),
            PartitionKind::Meta => format!("{}-v{}-meta", self.prefix, self.version),
        }
    }

    /// Returns the payload partition name.
    pub fn payload_partition(&self) -> String {
        self.partition(PartitionKind::Payload)
    }

    /// Returns the meta partition name.
    pub fn meta_partition(&self) -> String {
        self.partition(PartitionKind::Meta)
    }

    // == Ownership Checks ==
    /// Returns true if the partition name carries this subsystem's
    /// prefix, regardless of version. Activation only ever deletes
    /// names for which this holds.
    pub fn owns_prefix(&self, partition_name: &str) -> bool {
        partition_name.starts_with(&format!("{}-v", self.prefix))
    }

    /// Returns true if the partition name belongs to this generation.
    pub fn is_current(&self, partition_name: &str) -> bool {
        partition_name == self.payload_partition() || partition_name == self.meta_partition()
    }
}
