//! Lazy chunked iteration over blocking and async readers.
//!
//! Both flavours run the same loop over a [`ChunkState`]: take the spare
//! buffer, perform exactly one read into it, commit the count. A zero
//! count is the only end-of-input signal; a short read still yields its
//! elements and iteration ends on the following zero read.

use std::io::{self, ErrorKind, Read};
use std::iter::FusedIterator;
use std::num::NonZeroUsize;

use crate::config::ChunkConfig;
use crate::{Result, StreamError, DEFAULT_CHUNK_SIZE};

pub mod nonblocking;

pub use nonblocking::AsyncChunks;

pub(crate) const DEFAULT_SIZE: NonZeroUsize =
    match NonZeroUsize::new(DEFAULT_CHUNK_SIZE) {
        Some(size) => size,
        None => panic!("DEFAULT_CHUNK_SIZE must be positive"),
    };

/// The reusable buffer and cursor of one iteration.
#[derive(Debug)]
pub(crate) struct ChunkState<T> {
    buf: Box<[T]>,
    filled: usize,
    done: bool,
}

impl<T: Copy + Default> ChunkState<T> {
    pub(crate) fn new(chunk_size: usize) -> Result<Self> {
        match NonZeroUsize::new(chunk_size) {
            Some(size) => Ok(Self::with_size(size)),
            None => Err(StreamError::InvalidArgument(
                "chunk size must be positive".to_owned(),
            )),
        }
    }

    pub(crate) fn with_size(chunk_size: NonZeroUsize) -> Self {
        Self {
            buf: vec![T::default(); chunk_size.get()].into_boxed_slice(),
            filled: 0,
            done: false,
        }
    }
}

impl<T> ChunkState<T> {
    pub(crate) fn chunk_size(&self) -> usize {
        self.buf.len()
    }

    pub(crate) fn is_done(&self) -> bool {
        self.done
    }

    /// Buffer for the next read, `None` once iteration is over.
    pub(crate) fn spare(&mut self) -> Option<&mut [T]> {
        if self.done {
            None
        } else {
            Some(&mut self.buf[..])
        }
    }

    /// Records the result of one read. Zero ends the iteration.
    pub(crate) fn commit(&mut self, read: usize) -> Option<&[T]> {
        assert!(read <= self.buf.len(), "reader overfilled the buffer");
        self.filled = read;
        if read == 0 {
            self.done = true;
            return None;
        }
        Some(&self.buf[..read])
    }

    /// Ends the iteration without a chunk, after an error or cancellation.
    pub(crate) fn finish(&mut self) {
        self.filled = 0;
        self.done = true;
    }

    /// Elements of the last committed chunk.
    pub(crate) fn current(&self) -> &[T] {
        &self.buf[..self.filled]
    }
}

/// Reads into `buf` once, retrying only on `ErrorKind::Interrupted`.
pub(crate) fn read_once<R: Read + ?Sized>(
    reader: &mut R,
    buf: &mut [u8],
) -> io::Result<usize> {
    loop {
        match reader.read(buf) {
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            result => return result,
        }
    }
}

/// Fixed-size chunks of a blocking reader.
///
/// Use [`Chunks::next_chunk`] to borrow each chunk straight from the
/// internal buffer; the borrow ends when the next chunk is requested. The
/// [`Iterator`] impl copies every chunk into its own `Vec`.
///
/// Iteration cannot be restarted: once the reader is exhausted, or after
/// an error, no more chunks are produced.
#[derive(Debug)]
pub struct Chunks<R> {
    reader: R,
    state: ChunkState<u8>,
}

impl<R: Read> Chunks<R> {
    /// Fails with [`StreamError::InvalidArgument`] when `chunk_size` is
    /// zero. Nothing is read before the first step.
    pub fn new(reader: R, chunk_size: usize) -> Result<Self> {
        let state = ChunkState::new(chunk_size)?;
        log::debug!("chunks: iterating with chunk size {}", chunk_size);
        Ok(Self { reader, state })
    }

    /// Same as [`Chunks::new`] for sizes coming from signed arithmetic;
    /// zero and negative sizes are rejected.
    pub fn with_signed_size(reader: R, chunk_size: i64) -> Result<Self> {
        if chunk_size <= 0 {
            return Err(StreamError::InvalidArgument(format!(
                "chunk size must be positive, got {chunk_size}"
            )));
        }
        let chunk_size = usize::try_from(chunk_size).map_err(|_| {
            StreamError::InvalidArgument(format!(
                "chunk size {chunk_size} does not fit in memory"
            ))
        })?;
        Self::new(reader, chunk_size)
    }

    pub fn with_config(reader: R, config: &ChunkConfig) -> Result<Self> {
        config.validate()?;
        Self::new(reader, config.chunk_size)
    }

    pub(crate) fn with_size(reader: R, chunk_size: NonZeroUsize) -> Self {
        Self {
            reader,
            state: ChunkState::with_size(chunk_size),
        }
    }

    /// Performs one read and returns the bytes it produced, or `None` once
    /// a read returned zero bytes.
    pub fn next_chunk(&mut self) -> Option<Result<&[u8]>> {
        let read = match self.state.spare() {
            Some(buf) => read_once(&mut self.reader, buf),
            None => return None,
        };

        match read {
            Ok(count) => {
                log::trace!("chunks: read {} bytes", count);
                self.state.commit(count).map(Ok)
            }
            Err(err) => {
                log::debug!("chunks: read failed: {}", err);
                self.state.finish();
                Some(Err(err.into()))
            }
        }
    }

    pub(crate) fn current(&self) -> &[u8] {
        self.state.current()
    }
}

impl<R> Chunks<R> {
    pub fn chunk_size(&self) -> usize {
        self.state.chunk_size()
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_done()
    }

    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Gives the reader back, e.g. to seek it to the start and iterate
    /// again with a new `Chunks`.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> Iterator for Chunks<R> {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_chunk().map(|chunk| chunk.map(<[u8]>::to_vec))
    }
}

impl<R: Read> FusedIterator for Chunks<R> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStream;
    use quickcheck_macros::quickcheck;
    use rstest::rstest;
    use std::io::{Cursor, Seek, SeekFrom};

    /// Hands out its data in pieces of at most `step` bytes.
    struct Trickle {
        data: Vec<u8>,
        step: usize,
        reads: usize,
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.reads += 1;
            let count = self.step.min(buf.len()).min(self.data.len());
            buf[..count].copy_from_slice(&self.data[..count]);
            self.data.drain(..count);
            Ok(count)
        }
    }

    /// Fails every other call with `Interrupted`, then with `fail`
    /// once the data runs out.
    struct Flaky {
        data: Vec<u8>,
        interrupt: bool,
        fail: ErrorKind,
    }

    impl Read for Flaky {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.interrupt = !self.interrupt;
            if self.interrupt {
                return Err(ErrorKind::Interrupted.into());
            }
            if self.data.is_empty() {
                return Err(io::Error::new(self.fail, "device gone"));
            }
            let count = buf.len().min(self.data.len());
            buf[..count].copy_from_slice(&self.data[..count]);
            self.data.drain(..count);
            Ok(count)
        }
    }

    fn collect(chunks: Chunks<impl Read>) -> Vec<Vec<u8>> {
        chunks.map(|chunk| chunk.unwrap()).collect()
    }

    #[test]
    fn five_bytes_in_pairs() {
        let chunks = Chunks::new(&[1u8, 2, 3, 4, 5][..], 2).unwrap();
        assert_eq!(collect(chunks), vec![vec![1, 2], vec![3, 4], vec![5]]);
    }

    #[test]
    fn empty_reader_yields_nothing() {
        let mut chunks = Chunks::new(Cursor::new(Vec::<u8>::new()), 4).unwrap();
        assert!(chunks.next_chunk().is_none());
        assert!(chunks.is_finished());
        assert!(chunks.next().is_none());
    }

    #[rstest]
    #[case(0)]
    #[case(-1)]
    #[case(i64::MIN)]
    fn non_positive_sizes_are_rejected(#[case] size: i64) {
        let mut reader = Trickle {
            data: vec![1, 2, 3],
            step: 3,
            reads: 0,
        };
        let result = Chunks::with_signed_size(&mut reader, size);
        assert!(matches!(result, Err(StreamError::InvalidArgument(_))));
        assert_eq!(reader.reads, 0);
    }

    #[test]
    fn zero_size_is_rejected() {
        assert!(matches!(
            Chunks::new(&b"abc"[..], 0),
            Err(StreamError::InvalidArgument(_))
        ));
    }

    #[test]
    fn short_read_ends_on_the_next_read() {
        let mut reader = Trickle {
            data: vec![7; 5],
            step: 3,
            reads: 0,
        };
        let mut chunks = Chunks::new(&mut reader, 4).unwrap();

        assert_eq!(chunks.next_chunk().unwrap().unwrap(), &[7, 7, 7]);
        assert_eq!(chunks.next_chunk().unwrap().unwrap(), &[7, 7]);
        assert!(chunks.next_chunk().is_none());
        drop(chunks);

        // two data reads and the terminating zero read
        assert_eq!(reader.reads, 3);
    }

    #[test]
    fn no_reads_after_exhaustion() {
        let mut reader = Trickle {
            data: vec![1],
            step: 1,
            reads: 0,
        };
        let mut chunks = Chunks::new(&mut reader, 8).unwrap();
        while chunks.next_chunk().is_some() {}
        assert!(chunks.next_chunk().is_none());
        assert!(chunks.next_chunk().is_none());
        drop(chunks);
        assert_eq!(reader.reads, 2);
    }

    #[test]
    fn buffer_is_reused_between_steps() {
        let mut chunks = Chunks::new(&[1u8, 2, 3, 4][..], 2).unwrap();
        let first = chunks.next_chunk().unwrap().unwrap().as_ptr();
        let second = chunks.next_chunk().unwrap().unwrap().as_ptr();
        assert_eq!(first, second);
    }

    #[test]
    fn interrupted_reads_are_retried_and_errors_fuse() {
        let reader = Flaky {
            data: vec![1, 2, 3],
            interrupt: false,
            fail: ErrorKind::ConnectionReset,
        };
        let mut chunks = Chunks::new(reader, 2).unwrap();

        assert_eq!(chunks.next().unwrap().unwrap(), vec![1, 2]);
        assert_eq!(chunks.next().unwrap().unwrap(), vec![3]);
        match chunks.next() {
            Some(Err(StreamError::Io(err))) => {
                assert_eq!(err.kind(), ErrorKind::ConnectionReset)
            }
            other => panic!("unexpected step: {other:?}"),
        }
        assert!(chunks.next().is_none());
    }

    #[test]
    fn iterates_remaining_bytes_only() {
        let mut stream = MemoryStream::from_bytes((0..10).collect());
        stream.seek(SeekFrom::Start(6)).unwrap();

        let chunks = Chunks::new(&mut stream, 3).unwrap();
        assert_eq!(collect(chunks), vec![vec![6, 7, 8], vec![9]]);

        // restarting takes an explicit rewind and a new iterator
        stream.seek(SeekFrom::Start(0)).unwrap();
        let chunks = Chunks::new(stream, 8).unwrap();
        assert_eq!(collect(chunks).concat(), (0..10).collect::<Vec<u8>>());
    }

    #[quickcheck]
    fn prop_chunks_concatenate_to_input(data: Vec<u8>, size: u8) -> bool {
        let size = usize::from(size) + 1;
        let chunks =
            collect(Chunks::new(Cursor::new(data.clone()), size).unwrap());
        chunks.concat() == data
    }

    #[quickcheck]
    fn prop_only_last_chunk_is_short(data: Vec<u8>, size: u8) -> bool {
        let size = usize::from(size) + 1;
        let chunks = collect(Chunks::new(&data[..], size).unwrap());
        match chunks.split_last() {
            None => data.is_empty(),
            Some((last, rest)) => {
                rest.iter().all(|chunk| chunk.len() == size)
                    && (1..=size).contains(&last.len())
            }
        }
    }
}
