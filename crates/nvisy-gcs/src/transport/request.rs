//! Requests issued to a [`StorageTransport`](super::StorageTransport).

use bytes::Bytes;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use super::{AccessControl, ObjectPatch};
use crate::Result;
use crate::acl::PredefinedAcl;

/// Body of an upload: chunks pushed by the caller.
///
/// An `Err` item means the producer abandoned the upload; the transport must
/// fail the request without committing the object.
pub type UploadBody = BoxStream<'static, Result<Bytes>>;

/// Bucket creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertBucketRequest {
    /// Bucket name.
    pub name: String,
    /// Template forwarded as the `predefinedAcl` query parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predefined_acl: Option<PredefinedAcl>,
    /// Explicit entries sent in the resource body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acl: Option<Vec<AccessControl>>,
}

/// How an upload is carried over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum UploadStrategy {
    /// Single request with a known content length.
    Simple {
        /// Declared content length.
        length: u64,
    },
    /// Chunked session for payloads of unknown length.
    Resumable,
}

impl UploadStrategy {
    /// Selects the strategy for an optional declared length.
    pub fn for_length(length: Option<u64>) -> Self {
        match length {
            Some(length) => Self::Simple { length },
            None => Self::Resumable,
        }
    }

    /// Declared length, if known.
    pub fn length(self) -> Option<u64> {
        match self {
            Self::Simple { length } => Some(length),
            Self::Resumable => None,
        }
    }
}

/// Object upload request. The body travels separately as an [`UploadBody`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    /// Target bucket.
    pub bucket: String,
    /// Target object name.
    pub name: String,
    /// Transfer strategy.
    pub strategy: UploadStrategy,
    /// Template forwarded as the `predefinedAcl` query parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predefined_acl: Option<PredefinedAcl>,
    /// Object resource, including any explicit ACL.
    pub resource: ObjectPatch,
}

/// Ranged object read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadRequest {
    /// Source bucket.
    pub bucket: String,
    /// Object name.
    pub name: String,
    /// First byte to return.
    pub offset: u64,
    /// Maximum number of bytes; `None` reads to the end.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u64>,
}

/// Object listing request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListObjectsRequest {
    /// Bucket to list.
    pub bucket: String,
    /// Only names starting with this prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// Collapse names at the first delimiter after the prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,
    /// Opaque continuation token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
    /// Upper bound on items plus prefixes returned.
    pub max_results: u32,
}

/// Bucket listing request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBucketsRequest {
    /// Opaque continuation token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
    /// Upper bound on buckets returned.
    pub max_results: u32,
}

/// Server-side copy request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyRequest {
    /// Source bucket.
    pub source_bucket: String,
    /// Source object name.
    pub source_object: String,
    /// Destination bucket.
    pub destination_bucket: String,
    /// Destination object name.
    pub destination_object: String,
}
