//! Read-only bucket snapshots.

use jiff::Timestamp;
use serde::Serialize;

use crate::transport::BucketResource;

/// Information about a bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketInfo {
    name: String,
    created: Timestamp,
}

impl BucketInfo {
    /// Bucket name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Creation time.
    pub fn created(&self) -> Timestamp {
        self.created
    }
}

impl From<BucketResource> for BucketInfo {
    fn from(resource: BucketResource) -> Self {
        Self {
            name: resource.name,
            created: resource.time_created,
        }
    }
}
