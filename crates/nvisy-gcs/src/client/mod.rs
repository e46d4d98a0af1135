//! Storage and bucket clients.

mod bucket_client;
mod config;
mod storage_client;

pub use bucket_client::{BucketClient, DEFAULT_CONTENT_TYPE, WriteOptions};
pub use config::{
    DEFAULT_PAGE_SIZE, DEFAULT_READ_CHUNK_SIZE, DEFAULT_UPLOAD_BUFFER_CHUNKS, StorageConfig,
};
pub use storage_client::StorageClient;
