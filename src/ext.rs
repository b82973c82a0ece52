//! Method-call entry points for the iterators, implemented for every
//! reader.
//!
//! Methods taking `self` consume the reader. Pass `&mut reader` to keep
//! it, e.g. to seek back and iterate again.

use std::io::{BufRead, Read, Write};

use tokio::io::AsyncRead;
use tokio_util::sync::CancellationToken;

use crate::chunks::{AsyncChunks, Chunks};
use crate::config::ChunkConfig;
use crate::elements::{AsyncElements, Elements};
use crate::text::{CharChunks, Chars};
use crate::Result;

pub trait ReadExt: Read {
    /// See [`Chunks::new`].
    fn read_chunks(self, chunk_size: usize) -> Result<Chunks<Self>>
    where
        Self: Sized,
    {
        Chunks::new(self, chunk_size)
    }

    fn read_chunks_with(self, config: &ChunkConfig) -> Result<Chunks<Self>>
    where
        Self: Sized,
    {
        Chunks::with_config(self, config)
    }

    fn read_elements(self) -> Elements<Self>
    where
        Self: Sized,
    {
        Elements::new(self)
    }

    fn read_elements_with(
        self,
        config: &ChunkConfig,
    ) -> Result<Elements<Self>>
    where
        Self: Sized,
    {
        Elements::with_config(self, config)
    }

    /// Copies the rest of the reader into `writer` one chunk at a time and
    /// flushes it. Returns the number of bytes copied.
    fn copy_chunked_to<W: Write + ?Sized>(
        &mut self,
        writer: &mut W,
        chunk_size: usize,
    ) -> Result<u64> {
        let mut chunks = Chunks::new(self, chunk_size)?;
        let mut copied: u64 = 0;
        while let Some(chunk) = chunks.next_chunk() {
            let chunk = chunk?;
            writer.write_all(chunk)?;
            copied += chunk.len() as u64;
        }
        writer.flush()?;

        log::debug!("chunks: copied {} bytes", copied);
        Ok(copied)
    }
}

impl<R: Read + ?Sized> ReadExt for R {}

pub trait AsyncReadChunksExt: AsyncRead + Unpin {
    /// See [`AsyncChunks::new`].
    fn read_chunks_async(
        self,
        chunk_size: usize,
        cancel: Option<CancellationToken>,
    ) -> Result<AsyncChunks<Self>>
    where
        Self: Sized,
    {
        AsyncChunks::new(self, chunk_size, cancel)
    }

    fn read_elements_async(
        self,
        cancel: Option<CancellationToken>,
    ) -> AsyncElements<Self>
    where
        Self: Sized,
    {
        AsyncElements::new(self, cancel)
    }
}

impl<R: AsyncRead + Unpin + ?Sized> AsyncReadChunksExt for R {}

pub trait TextExt: BufRead {
    fn char_chunks(self, chunk_size: usize) -> Result<CharChunks<Self>>
    where
        Self: Sized,
    {
        CharChunks::new(self, chunk_size)
    }

    fn text_chars(self) -> Chars<Self>
    where
        Self: Sized,
    {
        Chars::new(self)
    }
}

impl<R: BufRead + ?Sized> TextExt for R {}
