use std::io::Read;
use std::iter::FusedIterator;

use futures::Stream;
use tokio::io::AsyncRead;
use tokio_util::sync::CancellationToken;

use crate::chunks::{AsyncChunks, Chunks, DEFAULT_SIZE};
use crate::config::ChunkConfig;
use crate::Result;

/// Byte-by-byte view of a reader, pulled one chunk at a time so memory
/// stays bounded by the chunk size.
#[derive(Debug)]
pub struct Elements<R> {
    chunks: Chunks<R>,
    offset: usize,
}

impl<R: Read> Elements<R> {
    /// Reads in [`crate::DEFAULT_CHUNK_SIZE`] chunks.
    pub fn new(reader: R) -> Self {
        Self {
            chunks: Chunks::with_size(reader, DEFAULT_SIZE),
            offset: 0,
        }
    }

    pub fn with_config(reader: R, config: &ChunkConfig) -> Result<Self> {
        Ok(Self {
            chunks: Chunks::with_config(reader, config)?,
            offset: 0,
        })
    }
}

impl<R> Elements<R> {
    pub fn chunk_size(&self) -> usize {
        self.chunks.chunk_size()
    }

    pub fn into_inner(self) -> R {
        self.chunks.into_inner()
    }
}

impl<R: Read> Iterator for Elements<R> {
    type Item = Result<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(&byte) = self.chunks.current().get(self.offset) {
                self.offset += 1;
                return Some(Ok(byte));
            }
            match self.chunks.next_chunk()? {
                Ok(_) => self.offset = 0,
                Err(err) => return Some(Err(err)),
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        // the chunk state empties on end and error, the offset does not
        let buffered =
            self.chunks.current().len().saturating_sub(self.offset);
        if self.chunks.is_finished() {
            (buffered, Some(buffered))
        } else {
            (buffered, None)
        }
    }
}

impl<R: Read> FusedIterator for Elements<R> {}

/// Async counterpart of [`Elements`], cancellable like [`AsyncChunks`].
#[derive(Debug)]
pub struct AsyncElements<R> {
    chunks: AsyncChunks<R>,
    offset: usize,
}

impl<R: AsyncRead + Unpin> AsyncElements<R> {
    pub fn new(reader: R, cancel: Option<CancellationToken>) -> Self {
        Self {
            chunks: AsyncChunks::with_size(reader, DEFAULT_SIZE, cancel),
            offset: 0,
        }
    }

    pub fn with_config(
        reader: R,
        config: &ChunkConfig,
        cancel: Option<CancellationToken>,
    ) -> Result<Self> {
        Ok(Self {
            chunks: AsyncChunks::with_config(reader, config, cancel)?,
            offset: 0,
        })
    }

    /// Next byte; a read (and a suspension) only happens once the current
    /// chunk is used up.
    pub async fn next_element(&mut self) -> Option<Result<u8>> {
        loop {
            if let Some(&byte) = self.chunks.current().get(self.offset) {
                self.offset += 1;
                return Some(Ok(byte));
            }
            match self.chunks.next_chunk().await? {
                Ok(_) => self.offset = 0,
                Err(err) => return Some(Err(err)),
            }
        }
    }

    /// Not `Unpin`, see [`AsyncChunks::into_stream`].
    pub fn into_stream(self) -> impl Stream<Item = Result<u8>> {
        futures::stream::unfold(self, |mut elements| async move {
            let element = elements.next_element().await?;
            Some((element, elements))
        })
    }
}

impl<R> AsyncElements<R> {
    pub fn chunk_size(&self) -> usize {
        self.chunks.chunk_size()
    }

    pub fn into_inner(self) -> R {
        self.chunks.into_inner()
    }
}
