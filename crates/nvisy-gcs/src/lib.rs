#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

// Tracing target constants for consistent logging
pub const TRACING_TARGET_CLIENT: &str = "nvisy_gcs::client";
pub const TRACING_TARGET_BUCKETS: &str = "nvisy_gcs::buckets";
pub const TRACING_TARGET_OBJECTS: &str = "nvisy_gcs::objects";
pub const TRACING_TARGET_STREAMS: &str = "nvisy_gcs::streams";
pub const TRACING_TARGET_PAGES: &str = "nvisy_gcs::pages";
pub const TRACING_TARGET_MOCK: &str = "nvisy_gcs::mock";

pub mod acl;
pub mod client;
mod error;
#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub mod mock;
pub mod page;
pub mod streams;
pub mod transport;
pub mod types;

pub use crate::acl::{Acl, AclEntry, AclPermission, AclScope, PredefinedAcl};
pub use crate::client::{BucketClient, StorageClient, StorageConfig, WriteOptions};
pub use crate::error::{BoxedError, Error, ErrorKind, Result};
pub use crate::page::{Page, PageResponse, PageSource};
pub use crate::streams::{ObjectReadStream, ObjectWriter};
pub use crate::transport::StorageTransport;
pub use crate::types::{
    BucketEntry, BucketInfo, MetadataOverrides, ObjectGeneration, ObjectInfo, ObjectMetadata,
    ObjectName,
};
