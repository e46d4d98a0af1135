//! Account-level client: bucket lifecycle and cross-bucket copies.

use std::sync::Arc;
use std::time::Instant;

use futures::stream::BoxStream;
use tracing::{debug, error, info, instrument};

use super::{BucketClient, StorageConfig};
use crate::acl::{Acl, PredefinedAcl};
use crate::page::{Page, PageResponse, PageSource, SharedPageSource, paginate};
use crate::transport::{CopyRequest, InsertBucketRequest, ListBucketsRequest, StorageTransport};
use crate::types::{BucketInfo, ObjectInfo, ObjectName};
use crate::{Result, TRACING_TARGET_BUCKETS, TRACING_TARGET_CLIENT, TRACING_TARGET_OBJECTS};

/// Entry point for bucket management.
///
/// The client is a cheap handle around a shared [`StorageTransport`]; clone it
/// freely. It holds no locks and never retries; retry policy belongs to the
/// transport.
///
/// # Examples
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use nvisy_gcs::StorageClient;
///
/// let client = StorageClient::new(transport);
/// if !client.bucket_exists("photos").await? {
///     client.create_bucket("photos", None, None).await?;
/// }
/// let photos = client.bucket("photos", None, None);
/// ```
#[derive(Clone)]
pub struct StorageClient {
    transport: Arc<dyn StorageTransport>,
    config: Arc<StorageConfig>,
}

impl StorageClient {
    /// Creates a client with the default configuration.
    pub fn new(transport: Arc<dyn StorageTransport>) -> Self {
        Self {
            transport,
            config: Arc::new(StorageConfig::default()),
        }
    }

    /// Creates a client with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` fails validation.
    #[instrument(skip_all, target = TRACING_TARGET_CLIENT)]
    pub fn with_config(
        transport: Arc<dyn StorageTransport>,
        config: StorageConfig,
    ) -> Result<Self> {
        config.validate().map_err(|e| {
            error!(target: TRACING_TARGET_CLIENT, error = %e, "Configuration validation failed");
            e
        })?;

        debug!(
            target: TRACING_TARGET_CLIENT,
            upload_buffer_chunks = config.effective_upload_buffer_chunks(),
            read_chunk_size = config.effective_read_chunk_size(),
            page_size = config.effective_page_size(),
            "Storage client initialized"
        );

        Ok(Self {
            transport,
            config: Arc::new(config),
        })
    }

    /// Configuration shared with every bucket client.
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Creates a bucket.
    ///
    /// `predefined_acl` and `acl` are forwarded as given: the template as a
    /// request parameter and the explicit entries in the bucket resource.
    ///
    /// # Errors
    ///
    /// * `AlreadyExists` if the name is taken.
    /// * `Configuration` if an ACL entry has an empty identifier.
    #[instrument(skip(self, acl), target = TRACING_TARGET_BUCKETS, fields(bucket = %name))]
    pub async fn create_bucket(
        &self,
        name: &str,
        predefined_acl: Option<PredefinedAcl>,
        acl: Option<&Acl>,
    ) -> Result<BucketInfo> {
        let acl = acl.map(Acl::to_bucket_access_controls).transpose()?;
        let request = InsertBucketRequest {
            name: name.to_owned(),
            predefined_acl,
            acl,
        };

        let start = Instant::now();
        let resource = self.transport.insert_bucket(request).await.map_err(|e| {
            error!(
                target: TRACING_TARGET_BUCKETS,
                error = %e,
                elapsed = ?start.elapsed(),
                "Failed to create bucket"
            );
            e
        })?;

        info!(
            target: TRACING_TARGET_BUCKETS,
            elapsed = ?start.elapsed(),
            "Bucket created"
        );
        Ok(resource.into())
    }

    /// Deletes an empty bucket.
    ///
    /// # Errors
    ///
    /// * `NotFound` if the bucket does not exist.
    /// * `BucketNotEmpty` if objects remain.
    #[instrument(skip(self), target = TRACING_TARGET_BUCKETS, fields(bucket = %name))]
    pub async fn delete_bucket(&self, name: &str) -> Result<()> {
        let start = Instant::now();
        self.transport.delete_bucket(name).await.map_err(|e| {
            error!(
                target: TRACING_TARGET_BUCKETS,
                error = %e,
                elapsed = ?start.elapsed(),
                "Failed to delete bucket"
            );
            e
        })?;

        info!(
            target: TRACING_TARGET_BUCKETS,
            elapsed = ?start.elapsed(),
            "Bucket deleted"
        );
        Ok(())
    }

    /// Returns whether a bucket exists.
    ///
    /// Only `NotFound` maps to `false`; every other failure propagates.
    #[instrument(skip(self), target = TRACING_TARGET_BUCKETS, fields(bucket = %name))]
    pub async fn bucket_exists(&self, name: &str) -> Result<bool> {
        match self.transport.get_bucket(name).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => {
                error!(target: TRACING_TARGET_BUCKETS, error = %e, "Bucket lookup failed");
                Err(e)
            }
        }
    }

    /// Fetches bucket information.
    #[instrument(skip(self), target = TRACING_TARGET_BUCKETS, fields(bucket = %name))]
    pub async fn bucket_info(&self, name: &str) -> Result<BucketInfo> {
        let resource = self.transport.get_bucket(name).await?;
        Ok(resource.into())
    }

    /// Returns a client bound to one bucket.
    ///
    /// The defaults apply to every upload through the returned client that
    /// supplies no ACL of its own. Nothing is sent to the service.
    pub fn bucket(
        &self,
        name: impl Into<String>,
        default_predefined_object_acl: Option<PredefinedAcl>,
        default_object_acl: Option<Acl>,
    ) -> BucketClient {
        BucketClient::new(
            self.transport.clone(),
            self.config.clone(),
            name.into(),
            default_predefined_object_acl,
            default_object_acl,
        )
    }

    /// Lazily streams the names of every bucket visible to the caller.
    pub fn list_bucket_names(&self) -> BoxStream<'static, Result<String>> {
        paginate(self.bucket_names(), self.config.effective_page_size())
    }

    /// Fetches the first page of bucket names.
    ///
    /// `None` uses the configured default page size.
    #[instrument(skip(self), target = TRACING_TARGET_BUCKETS)]
    pub async fn page_bucket_names(&self, page_size: Option<u32>) -> Result<Page<String>> {
        let page_size = page_size.unwrap_or_else(|| self.config.effective_page_size());
        Page::first(self.bucket_names(), page_size).await
    }

    /// Copies an object on the service side.
    ///
    /// Both arguments are absolute references of the form
    /// `gs://<bucket>/<object>`.
    ///
    /// # Errors
    ///
    /// * `Configuration` if either reference is malformed. Nothing is sent.
    /// * `NotFound` if the source object or the destination bucket is missing.
    #[instrument(skip(self), target = TRACING_TARGET_OBJECTS)]
    pub async fn copy_object(&self, source: &str, destination: &str) -> Result<ObjectInfo> {
        let source: ObjectName = source.parse()?;
        let destination: ObjectName = destination.parse()?;

        let request = CopyRequest {
            source_bucket: source.bucket().to_owned(),
            source_object: source.name().to_owned(),
            destination_bucket: destination.bucket().to_owned(),
            destination_object: destination.name().to_owned(),
        };

        let start = Instant::now();
        let resource = self.transport.copy_object(request).await.map_err(|e| {
            error!(
                target: TRACING_TARGET_OBJECTS,
                error = %e,
                elapsed = ?start.elapsed(),
                "Failed to copy object"
            );
            e
        })?;

        info!(
            target: TRACING_TARGET_OBJECTS,
            source = %source,
            destination = %destination,
            elapsed = ?start.elapsed(),
            "Object copied"
        );
        Ok(resource.into())
    }

    fn bucket_names(&self) -> SharedPageSource<String> {
        Arc::new(BucketNames {
            transport: self.transport.clone(),
        })
    }
}

impl std::fmt::Debug for StorageClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Bucket listing as a page source.
struct BucketNames {
    transport: Arc<dyn StorageTransport>,
}

#[async_trait::async_trait]
impl PageSource for BucketNames {
    type Item = String;

    async fn fetch_page(
        &self,
        token: Option<String>,
        page_size: u32,
    ) -> Result<PageResponse<String>> {
        let response = self
            .transport
            .list_buckets(ListBucketsRequest {
                page_token: token,
                max_results: page_size,
            })
            .await?;

        let names = response.items.into_iter().map(|b| b.name).collect();
        Ok(PageResponse::new(names, response.next_page_token))
    }
}
