//! In-memory storage service for testing.
//!
//! [`InMemoryTransport`] implements [`StorageTransport`] against process-local
//! maps. It follows the service's observable behavior closely enough to
//! exercise the clients: delimiter listings with opaque continuation tokens,
//! ranged reads, uploads that commit only on a clean body end, and the error
//! classification the clients rely on. It also records the requests it
//! receives and can be told to fail the next call.
//!
//! # Feature Flag
//!
//! This module is only available when the `test-utils` feature is enabled:
//!
//! ```toml
//! [dev-dependencies]
//! nvisy-gcs = { version = "...", features = ["test-utils"] }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use nvisy_gcs::StorageClient;
//! use nvisy_gcs::mock::InMemoryTransport;
//!
//! let transport = Arc::new(InMemoryTransport::new());
//! let client = StorageClient::new(transport.clone());
//! client.create_bucket("photos", None, None).await?;
//! assert!(client.bucket_exists("photos").await?);
//! ```

use std::collections::{BTreeMap, VecDeque};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use jiff::Timestamp;
use sha2::{Digest, Sha256};
use tokio::sync::{Notify, RwLock, watch};

use crate::transport::{
    BucketResource, CopyRequest, InsertBucketRequest, ListBucketsRequest, ListBucketsResponse,
    ListObjectsRequest, ListObjectsResponse, ObjectPatch, ObjectResource, ReadRequest,
    StorageTransport, UploadBody, UploadRequest, UploadStrategy,
};
use crate::{Error, ErrorKind, Result, TRACING_TARGET_MOCK};

/// Base of the download links handed out for stored objects.
const MEDIA_LINK_BASE: &str = "https://storage.invalid/download/storage/v1";

/// Content type the service assigns when an upload names none.
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Process-local storage service.
#[derive(Debug)]
pub struct InMemoryTransport {
    state: RwLock<State>,
    /// `false` while uploads are held before their body is read.
    intake_open: watch::Sender<bool>,
    upload_settled: Notify,
}

impl Default for InMemoryTransport {
    fn default() -> Self {
        Self {
            state: RwLock::default(),
            intake_open: watch::Sender::new(true),
            upload_settled: Notify::new(),
        }
    }
}

#[derive(Debug, Default)]
struct State {
    buckets: BTreeMap<String, StoredBucket>,
    generation: u64,
    failures: VecDeque<Error>,
    bucket_inserts: Vec<InsertBucketRequest>,
    uploads: Vec<UploadRequest>,
    reads: Vec<ReadRequest>,
    upload_outcomes: Vec<Result<(), ErrorKind>>,
}

#[derive(Debug)]
struct StoredBucket {
    resource: BucketResource,
    objects: BTreeMap<String, StoredObject>,
}

#[derive(Debug, Clone)]
struct StoredObject {
    resource: ObjectResource,
    data: Bytes,
}

/// Decoded continuation token of an object listing.
enum Resume {
    Object(String),
    Prefix(String),
}

impl Resume {
    fn decode(token: &str) -> Result<Self> {
        if let Some(name) = token.strip_prefix("o:") {
            Ok(Self::Object(name.to_owned()))
        } else if let Some(prefix) = token.strip_prefix("p:") {
            Ok(Self::Prefix(prefix.to_owned()))
        } else {
            Err(Error::transport(format!("invalid page token '{token}'")))
        }
    }

    fn encode(&self) -> String {
        match self {
            Self::Object(name) => format!("o:{name}"),
            Self::Prefix(prefix) => format!("p:{prefix}"),
        }
    }

    /// Whether `name` was already covered by the previous page.
    fn covers(&self, name: &str) -> bool {
        match self {
            Self::Object(last) => name <= last.as_str(),
            Self::Prefix(prefix) => name <= prefix.as_str() || name.starts_with(prefix.as_str()),
        }
    }
}

impl InMemoryTransport {
    /// Creates an empty service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next transport call fail with `error`.
    ///
    /// Queued failures are consumed one per call, in order.
    pub async fn fail_next(&self, error: Error) {
        self.state.write().await.failures.push_back(error);
    }

    /// Bucket creation requests received so far.
    pub async fn bucket_inserts(&self) -> Vec<InsertBucketRequest> {
        self.state.read().await.bucket_inserts.clone()
    }

    /// Upload requests received so far, committed or not.
    pub async fn uploads(&self) -> Vec<UploadRequest> {
        self.state.read().await.uploads.clone()
    }

    /// Holds every upload before it reads its body, until
    /// [`resume_uploads`](Self::resume_uploads) is called.
    pub fn pause_uploads(&self) {
        self.intake_open.send_replace(false);
    }

    /// Lets held and future uploads read their bodies.
    pub fn resume_uploads(&self) {
        self.intake_open.send_replace(true);
    }

    /// Waits until `count` uploads have settled and returns every outcome so
    /// far, in settlement order.
    pub async fn settled_uploads(&self, count: usize) -> Vec<Result<(), ErrorKind>> {
        loop {
            let settled = self.upload_settled.notified();
            {
                let state = self.state.read().await;
                if state.upload_outcomes.len() >= count {
                    return state.upload_outcomes.clone();
                }
            }
            settled.await;
        }
    }

    /// Ranged read requests received so far.
    pub async fn reads(&self) -> Vec<ReadRequest> {
        self.state.read().await.reads.clone()
    }

    /// Content of a committed object.
    pub async fn object_bytes(&self, bucket: &str, name: &str) -> Option<Bytes> {
        let state = self.state.read().await;
        let object = state.buckets.get(bucket)?.objects.get(name)?;
        Some(object.data.clone())
    }

    /// Whether a committed object exists.
    pub async fn contains_object(&self, bucket: &str, name: &str) -> bool {
        self.object_bytes(bucket, name).await.is_some()
    }

    async fn store_upload(
        &self,
        request: UploadRequest,
        mut body: UploadBody,
    ) -> Result<ObjectResource> {
        {
            let mut state = self.state.write().await;
            state.uploads.push(request.clone());
            state.bucket(&request.bucket)?;
        }

        // The sender lives as long as `self`, so this only waits for resume.
        let _ = self.intake_open.subscribe().wait_for(|open| *open).await;

        let mut data = BytesMut::new();
        while let Some(chunk) = body.next().await {
            data.extend_from_slice(&chunk?);
        }
        let data = data.freeze();

        if let UploadStrategy::Simple { length } = request.strategy
            && data.len() as u64 != length
        {
            return Err(Error::length_mismatch(length, data.len() as u64));
        }

        let mut state = self.state.write().await;
        let generation = state.next_generation();
        let mut resource = new_resource(&request.bucket, &request.name, &data, generation);
        apply_patch(&mut resource, request.resource);
        if resource.content_type.is_none() {
            resource.content_type = Some(FALLBACK_CONTENT_TYPE.to_owned());
        }

        tracing::debug!(
            target: TRACING_TARGET_MOCK,
            bucket = %request.bucket,
            object = %request.name,
            size = data.len(),
            "Object committed"
        );

        state.bucket_mut(&request.bucket)?.objects.insert(
            request.name,
            StoredObject {
                resource: resource.clone(),
                data,
            },
        );
        Ok(resource)
    }

    async fn injected_failure(&self) -> Result<()> {
        match self.state.write().await.failures.pop_front() {
            Some(error) => {
                tracing::debug!(target: TRACING_TARGET_MOCK, error = %error, "Injected failure");
                Err(error)
            }
            None => Ok(()),
        }
    }
}

impl State {
    fn bucket(&self, bucket: &str) -> Result<&StoredBucket> {
        self.buckets
            .get(bucket)
            .ok_or_else(|| Error::not_found(format!("bucket '{bucket}' does not exist")))
    }

    fn bucket_mut(&mut self, bucket: &str) -> Result<&mut StoredBucket> {
        self.buckets
            .get_mut(bucket)
            .ok_or_else(|| Error::not_found(format!("bucket '{bucket}' does not exist")))
    }

    fn object(&self, bucket: &str, name: &str) -> Result<&StoredObject> {
        self.bucket(bucket)?
            .objects
            .get(name)
            .ok_or_else(|| Error::not_found(format!("object '{bucket}/{name}' does not exist")))
    }

    fn next_generation(&mut self) -> String {
        self.generation += 1;
        self.generation.to_string()
    }
}

fn content_digest(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    STANDARD.encode(&digest[..16])
}

fn media_link(bucket: &str, name: &str, generation: &str) -> String {
    format!("{MEDIA_LINK_BASE}/b/{bucket}/o/{name}?generation={generation}&alt=media")
}

fn apply_patch(resource: &mut ObjectResource, patch: ObjectPatch) {
    let ObjectPatch {
        content_type,
        content_encoding,
        cache_control,
        content_disposition,
        content_language,
        metadata,
        acl,
    } = patch;

    if content_type.is_some() {
        resource.content_type = content_type;
    }
    if content_encoding.is_some() {
        resource.content_encoding = content_encoding;
    }
    if cache_control.is_some() {
        resource.cache_control = cache_control;
    }
    if content_disposition.is_some() {
        resource.content_disposition = content_disposition;
    }
    if content_language.is_some() {
        resource.content_language = content_language;
    }
    if let Some(metadata) = metadata {
        resource.metadata = metadata;
    }
    if let Some(acl) = acl {
        resource.acl = acl;
    }
}

fn new_resource(bucket: &str, name: &str, data: &Bytes, generation: String) -> ObjectResource {
    ObjectResource {
        bucket: bucket.to_owned(),
        name: name.to_owned(),
        size: data.len() as u64,
        updated: Timestamp::now(),
        md5_hash: Some(content_digest(data)),
        crc32c: None,
        media_link: Some(media_link(bucket, name, &generation)),
        generation,
        metageneration: 1,
        content_type: None,
        content_encoding: None,
        cache_control: None,
        content_disposition: None,
        content_language: None,
        metadata: Default::default(),
        acl: Vec::new(),
    }
}

#[async_trait::async_trait]
impl StorageTransport for InMemoryTransport {
    async fn insert_bucket(&self, request: InsertBucketRequest) -> Result<BucketResource> {
        self.injected_failure().await?;
        let mut state = self.state.write().await;
        state.bucket_inserts.push(request.clone());

        if state.buckets.contains_key(&request.name) {
            return Err(Error::already_exists(format!(
                "bucket '{}' already exists",
                request.name
            )));
        }

        let resource = BucketResource {
            name: request.name.clone(),
            time_created: Timestamp::now(),
        };
        state.buckets.insert(
            request.name,
            StoredBucket {
                resource: resource.clone(),
                objects: BTreeMap::new(),
            },
        );
        Ok(resource)
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        self.injected_failure().await?;
        let mut state = self.state.write().await;
        if !state.bucket(bucket)?.objects.is_empty() {
            return Err(Error::bucket_not_empty(bucket));
        }
        state.buckets.remove(bucket);
        Ok(())
    }

    async fn get_bucket(&self, bucket: &str) -> Result<BucketResource> {
        self.injected_failure().await?;
        let state = self.state.read().await;
        Ok(state.bucket(bucket)?.resource.clone())
    }

    async fn list_buckets(&self, request: ListBucketsRequest) -> Result<ListBucketsResponse> {
        self.injected_failure().await?;
        let state = self.state.read().await;
        let limit = request.max_results.max(1) as usize;

        let mut remaining = state
            .buckets
            .values()
            .filter(|b| request.page_token.as_deref().is_none_or(|t| b.resource.name.as_str() > t));
        let items: Vec<BucketResource> = remaining
            .by_ref()
            .take(limit)
            .map(|b| b.resource.clone())
            .collect();
        let next_page_token = match remaining.next() {
            Some(_) => items.last().map(|b| b.name.clone()),
            None => None,
        };

        Ok(ListBucketsResponse {
            items,
            next_page_token,
        })
    }

    async fn upload_object(
        &self,
        request: UploadRequest,
        body: UploadBody,
    ) -> Result<ObjectResource> {
        self.injected_failure().await?;
        let outcome = self.store_upload(request, body).await;

        let settled = outcome.as_ref().map(|_| ()).map_err(|e| e.kind);
        self.state.write().await.upload_outcomes.push(settled);
        self.upload_settled.notify_waiters();
        outcome
    }

    async fn read_object(&self, request: ReadRequest) -> Result<Bytes> {
        self.injected_failure().await?;
        let mut state = self.state.write().await;
        state.reads.push(request.clone());
        let data = &state.object(&request.bucket, &request.name)?.data;

        let size = data.len() as u64;
        if request.offset >= size {
            return Ok(Bytes::new());
        }
        let end = match request.length {
            Some(length) => request.offset.saturating_add(length).min(size),
            None => size,
        };
        Ok(data.slice(request.offset as usize..end as usize))
    }

    async fn get_object(&self, bucket: &str, name: &str) -> Result<ObjectResource> {
        self.injected_failure().await?;
        let state = self.state.read().await;
        Ok(state.object(bucket, name)?.resource.clone())
    }

    async fn patch_object(
        &self,
        bucket: &str,
        name: &str,
        patch: ObjectPatch,
    ) -> Result<ObjectResource> {
        self.injected_failure().await?;
        let mut state = self.state.write().await;
        let object = state
            .bucket_mut(bucket)?
            .objects
            .get_mut(name)
            .ok_or_else(|| Error::not_found(format!("object '{bucket}/{name}' does not exist")))?;

        apply_patch(&mut object.resource, patch);
        object.resource.metageneration += 1;
        object.resource.updated = Timestamp::now();
        Ok(object.resource.clone())
    }

    async fn delete_object(&self, bucket: &str, name: &str) -> Result<()> {
        self.injected_failure().await?;
        let mut state = self.state.write().await;
        state
            .bucket_mut(bucket)?
            .objects
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| Error::not_found(format!("object '{bucket}/{name}' does not exist")))
    }

    async fn list_objects(&self, request: ListObjectsRequest) -> Result<ListObjectsResponse> {
        self.injected_failure().await?;
        let state = self.state.read().await;
        let bucket = state.bucket(&request.bucket)?;

        let prefix = request.prefix.as_deref().unwrap_or("");
        let delimiter = request.delimiter.as_deref().filter(|d| !d.is_empty());
        let resume = request.page_token.as_deref().map(Resume::decode).transpose()?;
        let limit = request.max_results.max(1) as usize;

        let mut response = ListObjectsResponse::default();
        let mut last: Option<Resume> = None;

        for (name, object) in bucket.objects.range(prefix.to_owned()..) {
            if !name.starts_with(prefix) {
                break;
            }
            if resume.as_ref().is_some_and(|r| r.covers(name)) {
                continue;
            }

            let collapsed = delimiter.and_then(|d| {
                name[prefix.len()..]
                    .find(d)
                    .map(|i| name[..prefix.len() + i + d.len()].to_owned())
            });

            if let Some(common) = &collapsed
                && response.prefixes.last() == Some(common)
            {
                continue;
            }

            if response.items.len() + response.prefixes.len() == limit {
                response.next_page_token = last.as_ref().map(Resume::encode);
                break;
            }

            match collapsed {
                Some(common) => {
                    last = Some(Resume::Prefix(common.clone()));
                    response.prefixes.push(common);
                }
                None => {
                    last = Some(Resume::Object(name.clone()));
                    response.items.push(object.resource.clone());
                }
            }
        }

        Ok(response)
    }

    async fn copy_object(&self, request: CopyRequest) -> Result<ObjectResource> {
        self.injected_failure().await?;
        let mut state = self.state.write().await;
        let source = state
            .object(&request.source_bucket, &request.source_object)?
            .clone();
        state.bucket(&request.destination_bucket)?;

        let generation = state.next_generation();
        let mut resource = new_resource(
            &request.destination_bucket,
            &request.destination_object,
            &source.data,
            generation,
        );
        resource.content_type = source.resource.content_type;
        resource.content_encoding = source.resource.content_encoding;
        resource.cache_control = source.resource.cache_control;
        resource.content_disposition = source.resource.content_disposition;
        resource.content_language = source.resource.content_language;
        resource.metadata = source.resource.metadata;

        state.bucket_mut(&request.destination_bucket)?.objects.insert(
            request.destination_object,
            StoredObject {
                resource: resource.clone(),
                data: source.data,
            },
        );
        Ok(resource)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use futures::stream;

    use super::*;

    fn body(chunks: &[&'static str]) -> UploadBody {
        let items: Vec<Result<Bytes>> = chunks
            .iter()
            .map(|c| Ok(Bytes::from_static(c.as_bytes())))
            .collect();
        stream::iter(items).boxed()
    }

    fn upload(bucket: &str, name: &str, length: Option<u64>) -> UploadRequest {
        UploadRequest {
            bucket: bucket.into(),
            name: name.into(),
            strategy: UploadStrategy::for_length(length),
            predefined_acl: None,
            resource: ObjectPatch::default(),
        }
    }

    async fn seeded(names: &[&str]) -> InMemoryTransport {
        let transport = InMemoryTransport::new();
        transport
            .insert_bucket(InsertBucketRequest {
                name: "b".into(),
                predefined_acl: None,
                acl: None,
            })
            .await
            .unwrap();
        for name in names {
            transport
                .upload_object(upload("b", name, None), body(&["x"]))
                .await
                .unwrap();
        }
        transport
    }

    fn listing(
        prefix: Option<&str>,
        token: Option<String>,
        max_results: u32,
    ) -> ListObjectsRequest {
        ListObjectsRequest {
            bucket: "b".into(),
            prefix: prefix.map(str::to_owned),
            delimiter: Some("/".into()),
            page_token: token,
            max_results,
        }
    }

    #[tokio::test]
    async fn test_upload_outcomes_are_recorded() {
        let transport = seeded(&["a"]).await;
        let err = transport
            .upload_object(upload("missing", "o", None), body(&["x"]))
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let outcomes = transport.settled_uploads(2).await;
        assert_eq!(outcomes, vec![Ok(()), Err(ErrorKind::NotFound)]);
    }

    #[tokio::test]
    async fn test_paused_upload_commits_after_resume() {
        let transport = Arc::new(seeded(&[]).await);
        transport.pause_uploads();

        let task = tokio::spawn({
            let transport = transport.clone();
            async move {
                transport
                    .upload_object(upload("b", "o", None), body(&["ab", "c"]))
                    .await
            }
        });
        tokio::task::yield_now().await;
        assert!(!transport.contains_object("b", "o").await);

        transport.resume_uploads();
        task.await.unwrap().unwrap();
        assert_eq!(transport.object_bytes("b", "o").await.unwrap(), "abc");
        assert_eq!(transport.settled_uploads(1).await, vec![Ok(())]);
    }

    #[tokio::test]
    async fn test_delimiter_listing_collapses_prefixes() {
        let transport = seeded(&["a/b/c", "a/b/d", "a/c", "z"]).await;
        let page = transport.list_objects(listing(Some("a/"), None, 10)).await.unwrap();
        assert_eq!(page.prefixes, vec!["a/b/".to_owned()]);
        let names: Vec<_> = page.items.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["a/c"]);
        assert!(page.next_page_token.is_none());
    }

    #[tokio::test]
    async fn test_listing_tokens_skip_collapsed_prefixes() {
        let transport = seeded(&["a/1", "a/2", "b", "c/1", "d"]).await;

        let first = transport.list_objects(listing(None, None, 2)).await.unwrap();
        assert_eq!(first.prefixes, vec!["a/".to_owned()]);
        assert_eq!(first.items[0].name, "b");

        let second = transport
            .list_objects(listing(None, first.next_page_token, 2))
            .await
            .unwrap();
        assert_eq!(second.prefixes, vec!["c/".to_owned()]);
        assert_eq!(second.items[0].name, "d");
        assert!(second.next_page_token.is_none());
    }

    #[tokio::test]
    async fn test_ranged_reads() {
        let transport = seeded(&[]).await;
        transport
            .upload_object(upload("b", "o", Some(6)), body(&["abc", "def"]))
            .await
            .unwrap();

        let read = |offset, length| ReadRequest {
            bucket: "b".into(),
            name: "o".into(),
            offset,
            length,
        };
        assert_eq!(transport.read_object(read(2, Some(3))).await.unwrap(), "cde");
        assert_eq!(transport.read_object(read(4, None)).await.unwrap(), "ef");
        assert!(transport.read_object(read(6, Some(1))).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_abandoned_body_is_not_committed() {
        let transport = seeded(&[]).await;
        let items: Vec<Result<Bytes>> = vec![
            Ok(Bytes::from_static(b"abc")),
            Err(Error::cancelled("gone")),
        ];
        let err = transport
            .upload_object(upload("b", "o", None), stream::iter(items).boxed())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Cancelled);
        assert!(!transport.contains_object("b", "o").await);
    }

    #[tokio::test]
    async fn test_delete_non_empty_bucket() {
        let transport = seeded(&["o"]).await;
        let err = transport.delete_bucket("b").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::BucketNotEmpty);
    }

    #[tokio::test]
    async fn test_injected_failure_is_one_shot() {
        let transport = seeded(&[]).await;
        transport.fail_next(Error::transport("reset")).await;
        assert!(transport.get_bucket("b").await.unwrap_err().is_retryable());
        assert!(transport.get_bucket("b").await.is_ok());
    }
}
