//! Push-style upload sink backed by a bounded channel.

use std::sync::Arc;

use bytes::Bytes;
use futures::StreamExt;
use futures::stream;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::transport::{StorageTransport, UploadBody, UploadRequest};
use crate::types::ObjectInfo;
use crate::{Error, Result, TRACING_TARGET_STREAMS};

/// Frames travelling from the writer to the upload task.
#[derive(Debug)]
enum Frame {
    Data(Bytes),
    End,
}

/// Upload sink returned by [`BucketClient::write`](crate::BucketClient::write).
///
/// Chunks pushed with [`write`](Self::write) go through a bounded channel to
/// a background upload task, so a push waits whenever the transport falls
/// behind. [`finish`](Self::finish) completes the upload and resolves with the
/// stored object's [`ObjectInfo`].
///
/// When a length was declared, pushing past it fails immediately and finishing
/// short of it fails too, both with
/// [`ErrorKind::LengthMismatch`](crate::ErrorKind::LengthMismatch). Dropping
/// the writer, calling [`abort`](Self::abort), or any length mismatch leaves
/// the object uncommitted; bytes already sent are not rolled back.
pub struct ObjectWriter {
    name: String,
    declared_length: Option<u64>,
    written: u64,
    sender: Option<mpsc::Sender<Frame>>,
    completion: Option<JoinHandle<Result<ObjectInfo>>>,
}

impl ObjectWriter {
    /// Starts the upload task on the current Tokio runtime.
    pub(crate) fn spawn(
        transport: Arc<dyn StorageTransport>,
        request: UploadRequest,
        buffer_chunks: usize,
    ) -> Result<Self> {
        let handle = Handle::try_current().map_err(|e| {
            Error::configuration("uploads must be started inside a Tokio runtime").with_source(e)
        })?;

        let (sender, receiver) = mpsc::channel(buffer_chunks.max(1));
        let name = request.name.clone();
        let declared_length = request.strategy.length();

        tracing::debug!(
            target: TRACING_TARGET_STREAMS,
            bucket = %request.bucket,
            object = %name,
            strategy = ?request.strategy,
            "Starting upload"
        );

        let body = upload_body(receiver);
        let completion = handle.spawn(async move {
            transport
                .upload_object(request, body)
                .await
                .map(ObjectInfo::from)
        });

        Ok(Self {
            name,
            declared_length,
            written: 0,
            sender: Some(sender),
            completion: Some(completion),
        })
    }

    /// Object name this writer uploads to.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bytes accepted so far.
    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    /// Pushes one chunk, waiting while the transport cannot accept more.
    pub async fn write(&mut self, chunk: impl Into<Bytes>) -> Result<()> {
        let chunk = chunk.into();
        let Some(sender) = self.sender.clone() else {
            return Err(Error::configuration("writer is closed"));
        };

        let written = self.written + chunk.len() as u64;
        if let Some(declared) = self.declared_length
            && written > declared
        {
            self.abandon();
            return Err(Error::length_mismatch(declared, written));
        }

        if chunk.is_empty() {
            return Ok(());
        }

        if sender.send(Frame::Data(chunk)).await.is_err() {
            return Err(self.upload_failure().await);
        }
        self.written = written;
        Ok(())
    }

    /// Pushes every chunk of `chunks` in order.
    pub async fn write_all<I>(&mut self, chunks: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<Bytes>,
    {
        for chunk in chunks {
            self.write(chunk).await?;
        }
        Ok(())
    }

    /// Completes the upload and waits for the service to acknowledge it.
    pub async fn finish(mut self) -> Result<ObjectInfo> {
        let Some(sender) = self.sender.take() else {
            return Err(Error::configuration("writer is closed"));
        };

        if let Some(declared) = self.declared_length
            && self.written != declared
        {
            drop(sender);
            self.abandon();
            return Err(Error::length_mismatch(declared, self.written));
        }

        // A closed channel means the task already ended; its result says why.
        let _ = sender.send(Frame::End).await;
        drop(sender);

        let Some(completion) = self.completion.take() else {
            return Err(Error::configuration("writer is closed"));
        };
        let info = completion.await??;

        tracing::info!(
            target: TRACING_TARGET_STREAMS,
            object = %self.name,
            size = info.size(),
            "Upload finished"
        );
        Ok(info)
    }

    /// Abandons the upload without committing the object.
    pub fn abort(mut self) {
        self.abandon();
    }

    fn abandon(&mut self) {
        if self.sender.take().is_some() {
            tracing::debug!(
                target: TRACING_TARGET_STREAMS,
                object = %self.name,
                written = self.written,
                "Upload abandoned"
            );
        }
        // The task sees the closed channel as an abandoned body and fails on
        // its own; it is left to run so the transport can clean up.
        self.completion = None;
    }

    async fn upload_failure(&mut self) -> Error {
        self.sender = None;
        let Some(completion) = self.completion.take() else {
            return Error::configuration("writer is closed");
        };

        match completion.await {
            Ok(Err(err)) => err,
            Ok(Ok(_)) => Error::transport("upload completed before all chunks were sent"),
            Err(err) => err.into(),
        }
    }
}

impl Drop for ObjectWriter {
    fn drop(&mut self) {
        if self.sender.is_some() {
            tracing::warn!(
                target: TRACING_TARGET_STREAMS,
                object = %self.name,
                "Upload writer dropped before finish; object will not be committed"
            );
        }
    }
}

impl std::fmt::Debug for ObjectWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectWriter")
            .field("name", &self.name)
            .field("declared_length", &self.declared_length)
            .field("written", &self.written)
            .field("open", &self.sender.is_some())
            .finish_non_exhaustive()
    }
}

/// Adapts the channel into an upload body.
///
/// The body ends cleanly only after an explicit end frame; a channel closed
/// without one yields a cancellation error so the transport does not commit.
fn upload_body(receiver: mpsc::Receiver<Frame>) -> UploadBody {
    stream::unfold(Some(receiver), |state| async move {
        let mut receiver = state?;
        match receiver.recv().await {
            Some(Frame::Data(chunk)) => Some((Ok(chunk), Some(receiver))),
            Some(Frame::End) => None,
            None => Some((
                Err(Error::cancelled("upload abandoned before it was finished")),
                None,
            )),
        }
    })
    .boxed()
}
