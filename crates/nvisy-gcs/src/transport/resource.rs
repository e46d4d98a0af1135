//! Wire resources exchanged with the storage service.
//!
//! Field names follow the service's JSON API (camelCase); field types do not
//! always. The service sends int64 fields such as `size` and `metageneration`
//! as JSON strings, and the transport converts them to the numeric fields
//! here. Marshalling to and from JSON is the transport's job.

use std::collections::HashMap;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// A single access control as sent on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessControl {
    /// Grantee, e.g. `user-<id>` or `allUsers`.
    pub entity: String,
    /// Role, one of `READER`, `WRITER` or `OWNER`.
    pub role: String,
}

impl AccessControl {
    /// Creates a new access control.
    pub fn new(entity: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            role: role.into(),
        }
    }
}

/// Bucket resource returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketResource {
    /// Bucket name.
    pub name: String,
    /// Creation time.
    pub time_created: Timestamp,
}

/// Object resource returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectResource {
    /// Owning bucket.
    pub bucket: String,
    /// Object name relative to the bucket.
    pub name: String,
    /// Content length in bytes.
    pub size: u64,
    /// Last modification time.
    pub updated: Timestamp,
    /// Base64 encoded content digest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md5_hash: Option<String>,
    /// Base64 encoded CRC32C checksum.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crc32c: Option<String>,
    /// Direct download link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_link: Option<String>,
    /// Content generation.
    pub generation: String,
    /// Metadata generation, bumped on every metadata change.
    pub metageneration: i64,
    /// MIME type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Content encoding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_encoding: Option<String>,
    /// Cache-Control directive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<String>,
    /// Content-Disposition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_disposition: Option<String>,
    /// Content language.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_language: Option<String>,
    /// User-provided key/value metadata.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
    /// Access controls, only present on full projections.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub acl: Vec<AccessControl>,
}

/// Writable object fields.
///
/// Used both as the resource of an upload and as the body of a partial
/// metadata update. `None` means "not supplied"; the service keeps the
/// current value in that case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectPatch {
    /// MIME type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Content encoding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_encoding: Option<String>,
    /// Cache-Control directive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<String>,
    /// Content-Disposition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_disposition: Option<String>,
    /// Content language.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_language: Option<String>,
    /// User-provided key/value metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,
    /// Explicit access controls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acl: Option<Vec<AccessControl>>,
}

/// One page of an object listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListObjectsResponse {
    /// Concrete objects.
    #[serde(default)]
    pub items: Vec<ObjectResource>,
    /// Common prefixes collapsed at the delimiter.
    #[serde(default)]
    pub prefixes: Vec<String>,
    /// Continuation token, absent on the last page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

/// One page of a bucket listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBucketsResponse {
    /// Buckets of this page.
    #[serde(default)]
    pub items: Vec<BucketResource>,
    /// Continuation token, absent on the last page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}
