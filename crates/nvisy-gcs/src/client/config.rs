//! Client tuning configuration.

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default number of upload chunks buffered ahead of the transport.
pub const DEFAULT_UPLOAD_BUFFER_CHUNKS: usize = 16;

/// Default size of one ranged read: 256 KiB.
pub const DEFAULT_READ_CHUNK_SIZE: u64 = 256 * 1024;

/// Default page size of lazy listings.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Tuning knobs shared by [`StorageClient`] and every [`BucketClient`] it
/// hands out.
///
/// [`StorageClient`]: crate::StorageClient
/// [`BucketClient`]: crate::BucketClient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct StorageConfig {
    /// Chunks an upload may buffer before `write` waits on the transport.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "gcs-upload-buffer-chunks",
            env = "GCS_UPLOAD_BUFFER_CHUNKS",
            default_value_t = DEFAULT_UPLOAD_BUFFER_CHUNKS
        )
    )]
    #[serde(default = "default_upload_buffer_chunks")]
    pub upload_buffer_chunks: usize,

    /// Bytes requested by each ranged read of a download stream.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "gcs-read-chunk-size",
            env = "GCS_READ_CHUNK_SIZE",
            default_value_t = DEFAULT_READ_CHUNK_SIZE
        )
    )]
    #[serde(default = "default_read_chunk_size")]
    pub read_chunk_size: u64,

    /// Page size used by lazy listings.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "gcs-default-page-size",
            env = "GCS_DEFAULT_PAGE_SIZE",
            default_value_t = DEFAULT_PAGE_SIZE
        )
    )]
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
}

fn default_upload_buffer_chunks() -> usize {
    DEFAULT_UPLOAD_BUFFER_CHUNKS
}

fn default_read_chunk_size() -> u64 {
    DEFAULT_READ_CHUNK_SIZE
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_buffer_chunks: DEFAULT_UPLOAD_BUFFER_CHUNKS,
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl StorageConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the upload buffer depth.
    pub fn with_upload_buffer_chunks(mut self, chunks: usize) -> Self {
        self.upload_buffer_chunks = chunks;
        self
    }

    /// Sets the ranged read size.
    pub fn with_read_chunk_size(mut self, bytes: u64) -> Self {
        self.read_chunk_size = bytes;
        self
    }

    /// Sets the page size of lazy listings.
    pub fn with_default_page_size(mut self, page_size: u32) -> Self {
        self.default_page_size = page_size;
        self
    }

    /// Returns the effective upload buffer depth, using default if zero.
    pub fn effective_upload_buffer_chunks(&self) -> usize {
        if self.upload_buffer_chunks == 0 {
            DEFAULT_UPLOAD_BUFFER_CHUNKS
        } else {
            self.upload_buffer_chunks
        }
    }

    /// Returns the effective ranged read size, using default if zero.
    pub fn effective_read_chunk_size(&self) -> u64 {
        if self.read_chunk_size == 0 {
            DEFAULT_READ_CHUNK_SIZE
        } else {
            self.read_chunk_size
        }
    }

    /// Returns the effective listing page size, using default if zero.
    pub fn effective_page_size(&self) -> u32 {
        if self.default_page_size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            self.default_page_size
        }
    }

    /// Rejects values that would make transfers degenerate.
    ///
    /// Zero means "use the default" and is accepted.
    pub fn validate(&self) -> Result<()> {
        if self.upload_buffer_chunks > 4096 {
            return Err(Error::configuration(
                "upload buffer must not exceed 4096 chunks",
            ));
        }
        if self.read_chunk_size > 64 * 1024 * 1024 {
            return Err(Error::configuration(
                "read chunk size must not exceed 64 MiB",
            ));
        }
        Ok(())
    }
}
