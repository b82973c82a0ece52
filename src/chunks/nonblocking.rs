use std::io::{self, ErrorKind};
use std::num::NonZeroUsize;

use futures::Stream;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::sync::CancellationToken;

use super::ChunkState;
use crate::config::ChunkConfig;
use crate::{Result, StreamError};

async fn read_once<R: AsyncRead + Unpin + ?Sized>(
    reader: &mut R,
    buf: &mut [u8],
) -> io::Result<usize> {
    loop {
        match reader.read(buf).await {
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            result => return result,
        }
    }
}

/// One read that gives up as soon as `cancel` fires, including while the
/// read is pending. `AsyncReadExt::read` is cancel safe, so an abandoned
/// read loses no data.
async fn read_cancellable<R: AsyncRead + Unpin + ?Sized>(
    reader: &mut R,
    buf: &mut [u8],
    cancel: Option<&CancellationToken>,
) -> Result<usize> {
    let Some(token) = cancel else {
        return Ok(read_once(reader, buf).await?);
    };
    if token.is_cancelled() {
        return Err(StreamError::Cancelled);
    }

    tokio::select! {
        biased;
        _ = token.cancelled() => Err(StreamError::Cancelled),
        read = read_once(reader, buf) => Ok(read?),
    }
}

/// Fixed-size chunks of an async reader, with optional cooperative
/// cancellation.
///
/// Each step is a single read and the only suspension point. Chunks come
/// in reader order with at most one read in flight. Once cancelled, the
/// step reports [`StreamError::Cancelled`] and iteration is over.
#[derive(Debug)]
pub struct AsyncChunks<R> {
    reader: R,
    state: ChunkState<u8>,
    cancel: Option<CancellationToken>,
}

impl<R: AsyncRead + Unpin> AsyncChunks<R> {
    pub fn new(
        reader: R,
        chunk_size: usize,
        cancel: Option<CancellationToken>,
    ) -> Result<Self> {
        let state = ChunkState::new(chunk_size)?;
        log::debug!(
            "chunks: async iteration with chunk size {} (cancellable: {})",
            chunk_size,
            cancel.is_some()
        );
        Ok(Self {
            reader,
            state,
            cancel,
        })
    }

    pub fn with_config(
        reader: R,
        config: &ChunkConfig,
        cancel: Option<CancellationToken>,
    ) -> Result<Self> {
        config.validate()?;
        Self::new(reader, config.chunk_size, cancel)
    }

    pub(crate) fn with_size(
        reader: R,
        chunk_size: NonZeroUsize,
        cancel: Option<CancellationToken>,
    ) -> Self {
        Self {
            reader,
            state: ChunkState::with_size(chunk_size),
            cancel,
        }
    }

    /// Async counterpart of [`super::Chunks::next_chunk`].
    pub async fn next_chunk(&mut self) -> Option<Result<&[u8]>> {
        let read = match self.state.spare() {
            Some(buf) => {
                read_cancellable(&mut self.reader, buf, self.cancel.as_ref())
                    .await
            }
            None => return None,
        };

        match read {
            Ok(count) => {
                log::trace!("chunks: read {} bytes", count);
                self.state.commit(count).map(Ok)
            }
            Err(err) => {
                if err.is_cancelled() {
                    log::debug!("chunks: iteration cancelled");
                } else {
                    log::debug!("chunks: read failed: {}", err);
                }
                self.state.finish();
                Some(Err(err))
            }
        }
    }

    /// Turns the iterator into a [`Stream`] of owned chunks.
    ///
    /// The stream is not `Unpin`; pin it (e.g. `futures::pin_mut!`) before
    /// calling `StreamExt::next`.
    pub fn into_stream(self) -> impl Stream<Item = Result<Vec<u8>>> {
        futures::stream::unfold(self, |mut chunks| async move {
            let chunk = chunks.next_chunk().await?.map(<[u8]>::to_vec);
            Some((chunk, chunks))
        })
    }

    pub(crate) fn current(&self) -> &[u8] {
        self.state.current()
    }
}

impl<R> AsyncChunks<R> {
    pub fn chunk_size(&self) -> usize {
        self.state.chunk_size()
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_done()
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}
