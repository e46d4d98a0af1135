//! Read-only object snapshots.

use jiff::Timestamp;
use serde::Serialize;
use url::Url;

use super::ObjectMetadata;
use crate::transport::ObjectResource;

/// Generation identifiers of an object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectGeneration {
    /// Content generation; changes on every write of the object.
    pub object_generation: String,
    /// Metadata generation; increases on every metadata change.
    pub metageneration: i64,
}

/// Snapshot of an object as reported by the service.
///
/// Only produced from service responses; there is no public constructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectInfo {
    name: String,
    size: u64,
    updated: Timestamp,
    md5_hash: Option<String>,
    crc32c: Option<String>,
    download_link: Option<Url>,
    generation: ObjectGeneration,
    metadata: ObjectMetadata,
}

impl ObjectInfo {
    /// Object name relative to its bucket.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Content length in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Last modification time.
    pub fn updated(&self) -> Timestamp {
        self.updated
    }

    /// Base64 encoded content digest.
    pub fn md5_hash(&self) -> Option<&str> {
        self.md5_hash.as_deref()
    }

    /// Base64 encoded CRC32C checksum.
    pub fn crc32c(&self) -> Option<&str> {
        self.crc32c.as_deref()
    }

    /// Direct download link.
    pub fn download_link(&self) -> Option<&Url> {
        self.download_link.as_ref()
    }

    /// Generation identifiers.
    pub fn generation(&self) -> &ObjectGeneration {
        &self.generation
    }

    /// Metadata; the ACL slot is never populated.
    pub fn metadata(&self) -> &ObjectMetadata {
        &self.metadata
    }
}

impl From<ObjectResource> for ObjectInfo {
    fn from(resource: ObjectResource) -> Self {
        let metadata = ObjectMetadata::from_resource(&resource);
        let download_link = resource
            .media_link
            .as_deref()
            .and_then(|link| Url::parse(link).ok());

        Self {
            name: resource.name,
            size: resource.size,
            updated: resource.updated,
            md5_hash: resource.md5_hash,
            crc32c: resource.crc32c,
            download_link,
            generation: ObjectGeneration {
                object_generation: resource.generation,
                metageneration: resource.metageneration,
            },
            metadata,
        }
    }
}
