//! Pull-driven download stream.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::{Bytes, BytesMut};
use futures::stream::{self, BoxStream};
use futures::{Stream, StreamExt, TryStreamExt};

use crate::transport::{ReadRequest, StorageTransport};
use crate::{Result, TRACING_TARGET_STREAMS};

/// Byte stream of one object's content, returned by
/// [`BucketClient::read`](crate::BucketClient::read).
///
/// Each poll issues at most one ranged read, so nothing is requested until the
/// consumer asks and slow consumers never cause buffering beyond one chunk.
/// Dropping the stream stops the download.
pub struct ObjectReadStream {
    inner: BoxStream<'static, Result<Bytes>>,
}

struct ReadCursor {
    transport: Arc<dyn StorageTransport>,
    bucket: String,
    name: String,
    offset: u64,
    remaining: Option<u64>,
    chunk_size: u64,
    exhausted: bool,
}

impl ObjectReadStream {
    pub(crate) fn new(
        transport: Arc<dyn StorageTransport>,
        bucket: String,
        name: String,
        offset: u64,
        length: Option<u64>,
        chunk_size: u64,
    ) -> Self {
        let cursor = ReadCursor {
            transport,
            bucket,
            name,
            offset,
            remaining: length,
            chunk_size: chunk_size.max(1),
            exhausted: false,
        };

        Self {
            inner: stream::try_unfold(cursor, next_chunk).boxed(),
        }
    }

    /// Drains the stream into one contiguous buffer.
    pub async fn read_to_end(self) -> Result<Bytes> {
        let buffer = self
            .inner
            .try_fold(BytesMut::new(), |mut buffer, chunk| async move {
                buffer.extend_from_slice(&chunk);
                Ok(buffer)
            })
            .await?;
        Ok(buffer.freeze())
    }
}

async fn next_chunk(mut cursor: ReadCursor) -> Result<Option<(Bytes, ReadCursor)>> {
    if cursor.exhausted || cursor.remaining == Some(0) {
        return Ok(None);
    }

    let wanted = match cursor.remaining {
        Some(remaining) => remaining.min(cursor.chunk_size),
        None => cursor.chunk_size,
    };

    let chunk = cursor
        .transport
        .read_object(ReadRequest {
            bucket: cursor.bucket.clone(),
            name: cursor.name.clone(),
            offset: cursor.offset,
            length: Some(wanted),
        })
        .await?;

    if chunk.is_empty() {
        return Ok(None);
    }

    let received = chunk.len() as u64;
    cursor.offset += received;
    cursor.remaining = cursor.remaining.map(|r| r.saturating_sub(received));
    // A short read means the end of the object was reached.
    cursor.exhausted = received < wanted;

    tracing::trace!(
        target: TRACING_TARGET_STREAMS,
        object = %cursor.name,
        offset = cursor.offset,
        received,
        "Chunk read"
    );

    Ok(Some((chunk, cursor)))
}

impl Stream for ObjectReadStream {
    type Item = Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

impl std::fmt::Debug for ObjectReadStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectReadStream").finish_non_exhaustive()
    }
}
