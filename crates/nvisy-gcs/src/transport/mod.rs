//! Transport seam between the clients and the storage service.
//!
//! [`StorageTransport`] is implemented by whatever carries requests to the
//! service: an authenticated HTTP client in production, or
//! [`InMemoryTransport`](crate::mock::InMemoryTransport) in tests.
//! Implementations own connection handling, authentication, retries and JSON
//! marshalling; the clients above never retry.

mod request;
mod resource;

use bytes::Bytes;

pub use self::request::{
    CopyRequest, InsertBucketRequest, ListBucketsRequest, ListObjectsRequest, ReadRequest,
    UploadBody, UploadRequest, UploadStrategy,
};
pub use self::resource::{
    AccessControl, BucketResource, ListBucketsResponse, ListObjectsResponse, ObjectPatch,
    ObjectResource,
};
use crate::Result;

/// Operations the storage service exposes.
///
/// Errors must be classified with the crate's [`ErrorKind`](crate::ErrorKind):
/// a missing bucket or object is `NotFound`, a name collision is
/// `AlreadyExists`, deleting a non-empty bucket is `BucketNotEmpty`,
/// authorisation failures are `PermissionDenied` or `Authentication`, and
/// everything else is `Transport`.
#[async_trait::async_trait]
pub trait StorageTransport: Send + Sync + 'static {
    /// Creates a bucket.
    async fn insert_bucket(&self, request: InsertBucketRequest) -> Result<BucketResource>;

    /// Deletes an empty bucket.
    async fn delete_bucket(&self, bucket: &str) -> Result<()>;

    /// Fetches a bucket resource.
    async fn get_bucket(&self, bucket: &str) -> Result<BucketResource>;

    /// Lists one page of buckets.
    async fn list_buckets(&self, request: ListBucketsRequest) -> Result<ListBucketsResponse>;

    /// Uploads an object, consuming `body` until it ends.
    ///
    /// The object is committed only when the body ends without an error item.
    async fn upload_object(&self, request: UploadRequest, body: UploadBody)
    -> Result<ObjectResource>;

    /// Reads a byte range of an object.
    ///
    /// Returns an empty buffer when `offset` is at or past the end.
    async fn read_object(&self, request: ReadRequest) -> Result<Bytes>;

    /// Fetches an object resource.
    async fn get_object(&self, bucket: &str, name: &str) -> Result<ObjectResource>;

    /// Applies a partial metadata update.
    async fn patch_object(
        &self,
        bucket: &str,
        name: &str,
        patch: ObjectPatch,
    ) -> Result<ObjectResource>;

    /// Deletes an object.
    async fn delete_object(&self, bucket: &str, name: &str) -> Result<()>;

    /// Lists one page of objects.
    async fn list_objects(&self, request: ListObjectsRequest) -> Result<ListObjectsResponse>;

    /// Copies an object on the service side.
    async fn copy_object(&self, request: CopyRequest) -> Result<ObjectResource>;
}
