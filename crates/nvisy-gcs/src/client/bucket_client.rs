//! Bucket-scoped client: object transfers, metadata and listings.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use futures::stream::BoxStream;
use tracing::{debug, error, info, instrument};

use super::StorageConfig;
use crate::acl::{Acl, PredefinedAcl};
use crate::page::{Page, PageResponse, PageSource, SharedPageSource, paginate};
use crate::streams::{ObjectReadStream, ObjectWriter};
use crate::transport::{ListObjectsRequest, StorageTransport, UploadRequest, UploadStrategy};
use crate::types::{BucketEntry, ObjectInfo, ObjectMetadata, ObjectName};
use crate::{Result, TRACING_TARGET_OBJECTS};

/// Content type sent when neither the options nor the metadata name one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Delimiter that turns flat object names into a directory view.
const DIRECTORY_DELIMITER: &str = "/";

/// Per-upload options for [`BucketClient::write`].
///
/// When neither `acl` nor `predefined_acl` is given and the metadata carries
/// no ACL either, the bucket client's default policy applies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Exact content length, if known up front.
    pub length: Option<u64>,
    /// Metadata stored with the object.
    pub metadata: Option<ObjectMetadata>,
    /// Explicit ACL. Takes precedence over the ACL in `metadata`.
    pub acl: Option<Acl>,
    /// Predefined ACL template.
    pub predefined_acl: Option<PredefinedAcl>,
    /// MIME type. Takes precedence over the content type in `metadata`.
    pub content_type: Option<String>,
}

impl WriteOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares the exact content length.
    pub fn with_length(mut self, length: u64) -> Self {
        self.length = Some(length);
        self
    }

    /// Sets the object metadata.
    pub fn with_metadata(mut self, metadata: ObjectMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Sets an explicit ACL.
    pub fn with_acl(mut self, acl: Acl) -> Self {
        self.acl = Some(acl);
        self
    }

    /// Sets a predefined ACL template.
    pub fn with_predefined_acl(mut self, predefined_acl: PredefinedAcl) -> Self {
        self.predefined_acl = Some(predefined_acl);
        self
    }

    /// Sets the MIME type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Client bound to a single bucket.
///
/// Obtained from [`StorageClient::bucket`](crate::StorageClient::bucket).
/// The default object ACL policy is fixed at construction.
#[derive(Clone)]
pub struct BucketClient {
    transport: Arc<dyn StorageTransport>,
    config: Arc<StorageConfig>,
    bucket: String,
    default_predefined_acl: Option<PredefinedAcl>,
    default_acl: Option<Acl>,
}

impl BucketClient {
    pub(crate) fn new(
        transport: Arc<dyn StorageTransport>,
        config: Arc<StorageConfig>,
        bucket: String,
        default_predefined_acl: Option<PredefinedAcl>,
        default_acl: Option<Acl>,
    ) -> Self {
        Self {
            transport,
            config,
            bucket,
            default_predefined_acl,
            default_acl,
        }
    }

    /// Name of the bound bucket.
    pub fn bucket_name(&self) -> &str {
        &self.bucket
    }

    /// Absolute reference of an object in this bucket, `gs://<bucket>/<name>`.
    pub fn absolute_object_name(&self, name: &str) -> String {
        ObjectName::new(self.bucket.as_str(), name).to_string()
    }

    /// Starts a streaming upload.
    ///
    /// With a declared length the upload is a single request; without one it
    /// uses a chunked session. Must be called inside a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Fails with `Configuration`, before anything is sent, if an ACL entry
    /// has an empty identifier or no Tokio runtime is available.
    #[instrument(
        skip(self, options),
        target = TRACING_TARGET_OBJECTS,
        fields(bucket = %self.bucket)
    )]
    pub fn write(&self, name: &str, options: WriteOptions) -> Result<ObjectWriter> {
        let request = self.upload_request(name, options)?;
        ObjectWriter::spawn(
            self.transport.clone(),
            request,
            self.config.effective_upload_buffer_chunks(),
        )
    }

    /// Uploads `data` in one chunk with a known length.
    #[instrument(
        skip(self, data, options),
        target = TRACING_TARGET_OBJECTS,
        fields(bucket = %self.bucket)
    )]
    pub async fn write_bytes(
        &self,
        name: &str,
        data: impl Into<Bytes>,
        options: WriteOptions,
    ) -> Result<ObjectInfo> {
        let data = data.into();
        let options = WriteOptions {
            length: options.length.or(Some(data.len() as u64)),
            ..options
        };

        let start = Instant::now();
        let mut writer = self.write(name, options)?;
        writer.write(data).await?;
        let info = writer.finish().await.map_err(|e| {
            error!(
                target: TRACING_TARGET_OBJECTS,
                error = %e,
                elapsed = ?start.elapsed(),
                "Failed to upload object"
            );
            e
        })?;

        info!(
            target: TRACING_TARGET_OBJECTS,
            size = info.size(),
            elapsed = ?start.elapsed(),
            "Object uploaded"
        );
        Ok(info)
    }

    /// Streams an object's content starting at `offset`.
    ///
    /// `length` of `None` reads to the end. Nothing is requested until the
    /// stream is polled; a missing object surfaces as a `NotFound` item.
    pub fn read(&self, name: &str, offset: u64, length: Option<u64>) -> ObjectReadStream {
        debug!(
            target: TRACING_TARGET_OBJECTS,
            bucket = %self.bucket,
            object = %name,
            offset,
            length,
            "Opening read stream"
        );

        ObjectReadStream::new(
            self.transport.clone(),
            self.bucket.clone(),
            name.to_owned(),
            offset,
            length,
            self.config.effective_read_chunk_size(),
        )
    }

    /// Fetches object information.
    #[instrument(skip(self), target = TRACING_TARGET_OBJECTS, fields(bucket = %self.bucket))]
    pub async fn info(&self, name: &str) -> Result<ObjectInfo> {
        let resource = self.transport.get_object(&self.bucket, name).await?;
        Ok(resource.into())
    }

    /// Deletes an object.
    #[instrument(skip(self), target = TRACING_TARGET_OBJECTS, fields(bucket = %self.bucket))]
    pub async fn delete(&self, name: &str) -> Result<()> {
        let start = Instant::now();
        self.transport.delete_object(&self.bucket, name).await.map_err(|e| {
            error!(
                target: TRACING_TARGET_OBJECTS,
                error = %e,
                elapsed = ?start.elapsed(),
                "Failed to delete object"
            );
            e
        })?;

        info!(
            target: TRACING_TARGET_OBJECTS,
            elapsed = ?start.elapsed(),
            "Object deleted"
        );
        Ok(())
    }

    /// Applies `metadata` as a partial update.
    ///
    /// Fields left unset keep their stored values. The custom map, when
    /// non-empty, replaces the stored one.
    #[instrument(
        skip(self, metadata),
        target = TRACING_TARGET_OBJECTS,
        fields(bucket = %self.bucket)
    )]
    pub async fn update_metadata(
        &self,
        name: &str,
        metadata: &ObjectMetadata,
    ) -> Result<ObjectInfo> {
        let patch = metadata.to_patch()?;

        let start = Instant::now();
        let resource = self
            .transport
            .patch_object(&self.bucket, name, patch)
            .await
            .map_err(|e| {
                error!(
                    target: TRACING_TARGET_OBJECTS,
                    error = %e,
                    elapsed = ?start.elapsed(),
                    "Failed to update object metadata"
                );
                e
            })?;

        debug!(
            target: TRACING_TARGET_OBJECTS,
            metageneration = resource.metageneration,
            elapsed = ?start.elapsed(),
            "Object metadata updated"
        );
        Ok(resource.into())
    }

    /// Lazily streams the entries directly under `prefix`.
    ///
    /// Names are grouped at `/`: deeper names collapse into one
    /// [`BucketEntry::Directory`]. Within each page, directories come before
    /// objects.
    pub fn list(&self, prefix: Option<&str>) -> BoxStream<'static, Result<BucketEntry>> {
        paginate(
            self.listing(prefix, true),
            self.config.effective_page_size(),
        )
    }

    /// Lazily streams every object whose name starts with `prefix`.
    ///
    /// No grouping happens, so every entry is a [`BucketEntry::Object`].
    pub fn list_recursive(&self, prefix: Option<&str>) -> BoxStream<'static, Result<BucketEntry>> {
        paginate(
            self.listing(prefix, false),
            self.config.effective_page_size(),
        )
    }

    /// Fetches the first page of the entries directly under `prefix`.
    ///
    /// `None` uses the configured default page size.
    #[instrument(skip(self), target = TRACING_TARGET_OBJECTS, fields(bucket = %self.bucket))]
    pub async fn page(
        &self,
        prefix: Option<&str>,
        page_size: Option<u32>,
    ) -> Result<Page<BucketEntry>> {
        let page_size = page_size.unwrap_or_else(|| self.config.effective_page_size());
        Page::first(self.listing(prefix, true), page_size).await
    }

    fn listing(&self, prefix: Option<&str>, grouped: bool) -> SharedPageSource<BucketEntry> {
        Arc::new(ObjectListing {
            transport: self.transport.clone(),
            bucket: self.bucket.clone(),
            prefix: prefix.map(str::to_owned),
            delimiter: grouped.then(|| DIRECTORY_DELIMITER.to_owned()),
        })
    }

    fn upload_request(&self, name: &str, options: WriteOptions) -> Result<UploadRequest> {
        let WriteOptions {
            length,
            metadata,
            acl,
            predefined_acl,
            content_type,
        } = options;

        let mut metadata = metadata.unwrap_or_default();
        // Only the ACL that wins below is serialized.
        let metadata_acl = metadata.acl.take();
        let mut resource = metadata.to_patch()?;

        let (acl, predefined_acl) = match (acl, predefined_acl, metadata_acl) {
            (None, None, None) => (self.default_acl.clone(), self.default_predefined_acl),
            (acl, predefined_acl, metadata_acl) => (acl.or(metadata_acl), predefined_acl),
        };
        resource.acl = acl.as_ref().map(Acl::to_object_access_controls).transpose()?;
        resource.content_type = Some(
            content_type
                .or(resource.content_type)
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_owned()),
        );

        Ok(UploadRequest {
            bucket: self.bucket.clone(),
            name: name.to_owned(),
            strategy: UploadStrategy::for_length(length),
            predefined_acl,
            resource,
        })
    }
}

impl std::fmt::Debug for BucketClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BucketClient")
            .field("bucket", &self.bucket)
            .field("default_predefined_acl", &self.default_predefined_acl)
            .field("default_acl", &self.default_acl)
            .finish_non_exhaustive()
    }
}

/// Object listing of one bucket as a page source.
struct ObjectListing {
    transport: Arc<dyn StorageTransport>,
    bucket: String,
    prefix: Option<String>,
    delimiter: Option<String>,
}

#[async_trait::async_trait]
impl PageSource for ObjectListing {
    type Item = BucketEntry;

    async fn fetch_page(
        &self,
        token: Option<String>,
        page_size: u32,
    ) -> Result<PageResponse<BucketEntry>> {
        let response = self
            .transport
            .list_objects(ListObjectsRequest {
                bucket: self.bucket.clone(),
                prefix: self.prefix.clone(),
                delimiter: self.delimiter.clone(),
                page_token: token,
                max_results: page_size,
            })
            .await?;

        let entries = response
            .prefixes
            .into_iter()
            .map(BucketEntry::Directory)
            .chain(response.items.into_iter().map(|o| BucketEntry::Object(o.name)))
            .collect();
        Ok(PageResponse::new(entries, response.next_page_token))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use futures::{StreamExt, TryStreamExt};

    use super::*;
    use crate::acl::{AclEntry, AclPermission, AclScope};
    use crate::mock::InMemoryTransport;
    use crate::transport::AccessControl;
    use crate::types::MetadataOverrides;
    use crate::{ErrorKind, StorageClient};

    async fn bucket(names: &[&str]) -> (Arc<InMemoryTransport>, BucketClient) {
        let transport = Arc::new(InMemoryTransport::new());
        let client = StorageClient::new(transport.clone());
        client.create_bucket("b", None, None).await.unwrap();
        let bucket = client.bucket("b", None, None);
        for name in names {
            bucket.write_bytes(name, "x", WriteOptions::new()).await.unwrap();
        }
        (transport, bucket)
    }

    fn readers() -> Acl {
        Acl::new([AclEntry::new(AclScope::AllUsers, AclPermission::Read)])
    }

    #[tokio::test]
    async fn test_absolute_object_name() {
        let (_, bucket) = bucket(&[]).await;
        assert_eq!(bucket.bucket_name(), "b");
        assert_eq!(bucket.absolute_object_name("foo"), "gs://b/foo");
    }

    #[tokio::test]
    async fn test_write_with_declared_length() {
        let (transport, bucket) = bucket(&[]).await;
        let mut writer = bucket
            .write("data.bin", WriteOptions::new().with_length(6))
            .unwrap();
        writer.write("abc").await.unwrap();
        writer.write("def").await.unwrap();
        let info = writer.finish().await.unwrap();

        assert_eq!(info.size(), 6);
        assert_eq!(info.name(), "data.bin");
        assert!(info.download_link().is_some());
        assert_eq!(
            transport.uploads().await[0].strategy,
            UploadStrategy::Simple { length: 6 }
        );
    }

    #[tokio::test]
    async fn test_write_more_than_declared() {
        let (transport, bucket) = bucket(&[]).await;
        let mut writer = bucket.write("o", WriteOptions::new().with_length(4)).unwrap();
        writer.write("abc").await.unwrap();
        let err = writer.write("def").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::LengthMismatch);

        let err = writer.finish().await.unwrap_err();
        assert!(err.is_configuration());

        let outcomes = transport.settled_uploads(1).await;
        assert_eq!(outcomes, vec![Err(ErrorKind::Cancelled)]);
        assert!(!transport.contains_object("b", "o").await);
    }

    #[tokio::test]
    async fn test_write_less_than_declared() {
        let (transport, bucket) = bucket(&[]).await;
        let mut writer = bucket.write("o", WriteOptions::new().with_length(10)).unwrap();
        writer.write("abc").await.unwrap();
        let err = writer.finish().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::LengthMismatch);
        assert!(!transport.contains_object("b", "o").await);
    }

    #[tokio::test]
    async fn test_write_unknown_length_is_chunked() {
        let (transport, bucket) = bucket(&[]).await;
        let mut writer = bucket.write("o", WriteOptions::new()).unwrap();
        writer.write_all(["ab", "cd", "e"]).await.unwrap();
        assert_eq!(writer.bytes_written(), 5);
        let info = writer.finish().await.unwrap();

        assert_eq!(info.size(), 5);
        assert_eq!(transport.uploads().await[0].strategy, UploadStrategy::Resumable);
        assert_eq!(transport.object_bytes("b", "o").await.unwrap(), "abcde");
    }

    #[tokio::test]
    async fn test_dropped_writer_does_not_commit() {
        let (transport, bucket) = bucket(&[]).await;
        let mut writer = bucket.write("o", WriteOptions::new()).unwrap();
        writer.write("abc").await.unwrap();
        drop(writer);

        let outcomes = transport.settled_uploads(1).await;
        assert_eq!(outcomes, vec![Err(ErrorKind::Cancelled)]);
        assert!(!transport.contains_object("b", "o").await);
    }

    #[tokio::test]
    async fn test_write_waits_for_buffer_space() {
        let transport = Arc::new(InMemoryTransport::new());
        let config = StorageConfig::new().with_upload_buffer_chunks(2);
        let client = StorageClient::with_config(transport.clone(), config).unwrap();
        client.create_bucket("b", None, None).await.unwrap();
        let bucket = client.bucket("b", None, None);

        transport.pause_uploads();
        let mut writer = bucket.write("o", WriteOptions::new()).unwrap();
        writer.write("a").await.unwrap();
        writer.write("b").await.unwrap();

        let blocked = tokio::time::timeout(Duration::from_millis(200), writer.write("c")).await;
        assert!(blocked.is_err(), "third chunk should wait for the upload to drain");

        transport.resume_uploads();
        writer.write("c").await.unwrap();
        let info = writer.finish().await.unwrap();
        assert_eq!(info.size(), 3);
        assert_eq!(transport.object_bytes("b", "o").await.unwrap(), "abc");
    }

    #[tokio::test]
    async fn test_write_into_missing_bucket() {
        let transport = Arc::new(InMemoryTransport::new());
        let bucket = StorageClient::new(transport).bucket("nope", None, None);
        let err = bucket
            .write_bytes("o", "abc", WriteOptions::new())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_default_content_type() {
        let (transport, bucket) = bucket(&[]).await;
        bucket.write_bytes("a", "x", WriteOptions::new()).await.unwrap();
        bucket
            .write_bytes("b", "x", WriteOptions::new().with_content_type("text/plain"))
            .await
            .unwrap();

        let uploads = transport.uploads().await;
        assert_eq!(
            uploads[0].resource.content_type.as_deref(),
            Some(DEFAULT_CONTENT_TYPE)
        );
        assert_eq!(uploads[1].resource.content_type.as_deref(), Some("text/plain"));
    }

    #[tokio::test]
    async fn test_default_acl_policy_fallback() {
        let transport = Arc::new(InMemoryTransport::new());
        let client = StorageClient::new(transport.clone());
        client.create_bucket("b", None, None).await.unwrap();
        let bucket = client.bucket("b", Some(PredefinedAcl::PublicRead), Some(readers()));

        bucket.write_bytes("default", "x", WriteOptions::new()).await.unwrap();
        bucket
            .write_bytes(
                "explicit",
                "x",
                WriteOptions::new().with_predefined_acl(PredefinedAcl::Private),
            )
            .await
            .unwrap();

        let uploads = transport.uploads().await;
        assert_eq!(uploads[0].predefined_acl, Some(PredefinedAcl::PublicRead));
        assert_eq!(
            uploads[0].resource.acl,
            Some(vec![AccessControl::new("allUsers", "READER")])
        );
        assert_eq!(uploads[1].predefined_acl, Some(PredefinedAcl::Private));
        assert_eq!(uploads[1].resource.acl, None);
    }

    #[tokio::test]
    async fn test_explicit_and_predefined_acl_forwarded_separately() {
        let (transport, bucket) = bucket(&[]).await;
        let acl = Acl::new([AclEntry::new(
            AclScope::domain("example.com"),
            AclPermission::Write,
        )]);
        bucket
            .write_bytes(
                "o",
                "x",
                WriteOptions::new()
                    .with_acl(acl)
                    .with_predefined_acl(PredefinedAcl::ProjectPrivate),
            )
            .await
            .unwrap();

        let uploads = transport.uploads().await;
        let upload = &uploads[0];
        assert_eq!(upload.predefined_acl, Some(PredefinedAcl::ProjectPrivate));
        assert_eq!(
            upload.resource.acl,
            Some(vec![AccessControl::new("domain-example.com", "OWNER")])
        );
    }

    #[tokio::test]
    async fn test_metadata_acl_suppresses_defaults() {
        let transport = Arc::new(InMemoryTransport::new());
        let client = StorageClient::new(transport.clone());
        client.create_bucket("b", None, None).await.unwrap();
        let bucket = client.bucket("b", Some(PredefinedAcl::PublicRead), None);

        let metadata = ObjectMetadata::new().with_acl(readers());
        bucket
            .write_bytes("o", "x", WriteOptions::new().with_metadata(metadata))
            .await
            .unwrap();

        let uploads = transport.uploads().await;
        let upload = &uploads[0];
        assert_eq!(upload.predefined_acl, None);
        assert_eq!(
            upload.resource.acl,
            Some(vec![AccessControl::new("allUsers", "READER")])
        );
    }

    #[tokio::test]
    async fn test_explicit_acl_replaces_metadata_acl() {
        let (transport, bucket) = bucket(&[]).await;
        // Never converted, so its empty identifier is not an error.
        let unused = Acl::new([AclEntry::new(AclScope::group(""), AclPermission::Read)]);
        let metadata = ObjectMetadata::new().with_acl(unused);
        bucket
            .write_bytes(
                "o",
                "x",
                WriteOptions::new().with_metadata(metadata).with_acl(readers()),
            )
            .await
            .unwrap();

        let uploads = transport.uploads().await;
        assert_eq!(
            uploads[0].resource.acl,
            Some(vec![AccessControl::new("allUsers", "READER")])
        );
    }

    #[tokio::test]
    async fn test_read_is_chunked_and_ranged() {
        let transport = Arc::new(InMemoryTransport::new());
        let config = StorageConfig::new().with_read_chunk_size(4);
        let client = StorageClient::with_config(transport.clone(), config).unwrap();
        client.create_bucket("b", None, None).await.unwrap();
        let bucket = client.bucket("b", None, None);
        bucket
            .write_bytes("o", "0123456789", WriteOptions::new())
            .await
            .unwrap();

        let chunks: Vec<Bytes> = bucket.read("o", 0, None).try_collect().await.unwrap();
        assert_eq!(chunks, vec!["0123", "4567", "89"]);

        let range = bucket.read("o", 3, Some(5)).read_to_end().await.unwrap();
        assert_eq!(range, "34567");
        let tail = bucket.read("o", 12, None).read_to_end().await.unwrap();
        assert!(tail.is_empty());
    }

    #[tokio::test]
    async fn test_read_is_lazy() {
        let (transport, bucket) = bucket(&[]).await;
        let mut stream = bucket.read("missing", 0, None);
        assert!(transport.reads().await.is_empty());

        let err = stream.next().await.unwrap().unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(transport.reads().await.len(), 1);
    }

    #[tokio::test]
    async fn test_info_and_delete() {
        let (_, bucket) = bucket(&["o"]).await;
        let info = bucket.info("o").await.unwrap();
        assert_eq!(info.size(), 1);
        assert!(info.metadata().acl.is_none());

        bucket.delete("o").await.unwrap();
        assert!(bucket.info("o").await.unwrap_err().is_not_found());
        assert!(bucket.delete("o").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_update_metadata_is_partial() {
        let (_, bucket) = bucket(&[]).await;
        let metadata = ObjectMetadata::new().with_cache_control("x");
        bucket
            .write_bytes("o", "x", WriteOptions::new().with_metadata(metadata.clone()))
            .await
            .unwrap();

        let overrides = MetadataOverrides {
            content_type: Some("text/plain".into()),
            ..Default::default()
        };
        let updated = metadata.replace(overrides);
        let info = bucket.update_metadata("o", &updated).await.unwrap();

        assert_eq!(info.metadata().cache_control.as_deref(), Some("x"));
        assert_eq!(info.metadata().content_type.as_deref(), Some("text/plain"));
        assert_eq!(info.generation().metageneration, 2);
    }

    #[tokio::test]
    async fn test_list_groups_directories() {
        let (_, bucket) = bucket(&["a/b/x", "a/b/y", "a/c"]).await;
        let entries: Vec<BucketEntry> = bucket.list(Some("a/")).try_collect().await.unwrap();
        assert_eq!(
            entries,
            vec![
                BucketEntry::Directory("a/b/".into()),
                BucketEntry::Object("a/c".into()),
            ]
        );
    }

    #[tokio::test]
    async fn test_list_recursive_is_flat() {
        let (_, bucket) = bucket(&["a/b/x", "a/b/y", "a/c", "z"]).await;
        let entries: Vec<BucketEntry> = bucket
            .list_recursive(Some("a/"))
            .try_collect()
            .await
            .unwrap();
        assert!(entries.iter().all(BucketEntry::is_object));
        let names: Vec<&str> = entries.iter().map(BucketEntry::name).collect();
        assert_eq!(names, vec!["a/b/x", "a/b/y", "a/c"]);
    }

    #[tokio::test]
    async fn test_page_walk() {
        let (_, bucket) = bucket(&["1", "2", "3", "4", "5"]).await;

        let first = bucket.page(None, Some(2)).await.unwrap();
        let second = first.next_page().await.unwrap();
        let third = second.next_page().await.unwrap();

        let sizes: Vec<usize> = [&first, &second, &third].iter().map(|p| p.items().len()).collect();
        assert_eq!(sizes, vec![2, 2, 1]);
        let more: Vec<bool> = [&first, &second, &third].iter().map(|p| p.has_more()).collect();
        assert_eq!(more, vec![true, true, false]);

        let err = third.next_page().await.unwrap_err();
        assert!(err.is_configuration());
    }

    #[tokio::test]
    async fn test_page_rejects_zero_size() {
        let (_, bucket) = bucket(&["1"]).await;
        assert!(bucket.page(None, Some(0)).await.unwrap_err().is_configuration());
    }
}
