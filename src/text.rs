//! Character chunks over UTF-8 text, built on the same chunk core as the
//! byte iterators.

use std::io::{self, BufRead, ErrorKind};
use std::iter::FusedIterator;
use std::num::NonZeroUsize;

use crate::chunks::{ChunkState, DEFAULT_SIZE};
use crate::{Result, StreamError};

/// Longest UTF-8 encoding of a char.
const MAX_UTF8_LEN: usize = 4;

fn invalid_utf8(message: &str) -> io::Error {
    io::Error::new(ErrorKind::InvalidData, message.to_owned())
}

/// Decodes chars out of a buffered reader. Sequences split across two
/// buffer refills are stitched back together.
#[derive(Debug)]
pub struct Utf8Source<R> {
    reader: R,
    pending: Vec<u8>,
}

impl<R: BufRead> Utf8Source<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: Vec::with_capacity(MAX_UTF8_LEN),
        }
    }

    /// Decodes up to `buf.len()` chars from what the reader has buffered,
    /// refilling it only when nothing could be decoded yet. Returns 0 only
    /// at the end of the input.
    pub fn read_chars(&mut self, buf: &mut [char]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        let mut count = 0;
        loop {
            let available = match self.reader.fill_buf() {
                Ok(available) => available,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            };

            if available.is_empty() {
                if self.pending.is_empty() || count > 0 {
                    return Ok(count);
                }
                self.pending.clear();
                return Err(invalid_utf8("input ends inside a UTF-8 sequence"));
            }

            if !self.pending.is_empty() {
                let byte = available[0];
                self.reader.consume(1);
                self.pending.push(byte);
                match std::str::from_utf8(&self.pending) {
                    Ok(decoded) => {
                        if let Some(c) = decoded.chars().next() {
                            buf[count] = c;
                            count += 1;
                        }
                        self.pending.clear();
                        if count == buf.len() {
                            return Ok(count);
                        }
                    }
                    Err(err) if err.error_len().is_none() => {}
                    Err(_) => {
                        self.pending.clear();
                        return Err(invalid_utf8("invalid UTF-8 sequence"));
                    }
                }
                continue;
            }

            let valid = match std::str::from_utf8(available) {
                Ok(_) => available.len(),
                Err(err) if err.valid_up_to() > 0 => err.valid_up_to(),
                Err(err) if err.error_len().is_none() => {
                    // a sequence cut off by the end of the buffer
                    let cut = available.len();
                    self.pending.extend_from_slice(available);
                    self.reader.consume(cut);
                    if count > 0 {
                        return Ok(count);
                    }
                    continue;
                }
                Err(_) => {
                    // hand out what was decoded, the next call reports it
                    if count > 0 {
                        return Ok(count);
                    }
                    return Err(invalid_utf8("invalid UTF-8 sequence"));
                }
            };

            let text = std::str::from_utf8(&available[..valid])
                .map_err(|_| invalid_utf8("invalid UTF-8 sequence"))?;
            let mut consumed = 0;
            for c in text.chars().take(buf.len() - count) {
                buf[count] = c;
                count += 1;
                consumed += c.len_utf8();
            }
            self.reader.consume(consumed);
            return Ok(count);
        }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

/// Chunks of at most `chunk_size` chars. Same termination rules as
/// [`crate::Chunks`].
#[derive(Debug)]
pub struct CharChunks<R> {
    source: Utf8Source<R>,
    state: ChunkState<char>,
}

impl<R: BufRead> CharChunks<R> {
    pub fn new(reader: R, chunk_size: usize) -> Result<Self> {
        let state = ChunkState::new(chunk_size)?;
        Ok(Self::with_state(reader, state))
    }

    pub(crate) fn with_size(reader: R, chunk_size: NonZeroUsize) -> Self {
        Self::with_state(reader, ChunkState::with_size(chunk_size))
    }

    fn with_state(reader: R, state: ChunkState<char>) -> Self {
        log::debug!(
            "chunks: text iteration with chunk size {}",
            state.chunk_size()
        );
        Self {
            source: Utf8Source::new(reader),
            state,
        }
    }

    pub fn next_chunk(&mut self) -> Option<Result<&[char]>> {
        let read = match self.state.spare() {
            Some(buf) => self.source.read_chars(buf),
            None => return None,
        };

        match read {
            Ok(count) => {
                log::trace!("chunks: decoded {} chars", count);
                self.state.commit(count).map(Ok)
            }
            Err(err) => {
                log::debug!("chunks: text read failed: {}", err);
                self.state.finish();
                Some(Err(StreamError::from(err)))
            }
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.state.chunk_size()
    }

    pub fn into_inner(self) -> R {
        self.source.into_inner()
    }
}

impl<R: BufRead> Iterator for CharChunks<R> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_chunk()
            .map(|chunk| chunk.map(|chars| chars.iter().collect()))
    }
}

impl<R: BufRead> FusedIterator for CharChunks<R> {}

/// Char-by-char view of UTF-8 text, pulled one chunk at a time.
#[derive(Debug)]
pub struct Chars<R> {
    chunks: CharChunks<R>,
    offset: usize,
}

impl<R: BufRead> Chars<R> {
    pub fn new(reader: R) -> Self {
        Self {
            chunks: CharChunks::with_size(reader, DEFAULT_SIZE),
            offset: 0,
        }
    }
}

impl<R: BufRead> Iterator for Chars<R> {
    type Item = Result<char>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(&c) = self.chunks.state.current().get(self.offset) {
                self.offset += 1;
                return Some(Ok(c));
            }
            match self.chunks.next_chunk()? {
                Ok(_) => self.offset = 0,
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

impl<R: BufRead> FusedIterator for Chars<R> {}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::{BufReader, Read};

    /// Hands out one byte per read, so every multi-byte char is split
    /// across refills.
    struct OneByte<'a>(&'a [u8]);

    impl Read for OneByte<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.0.is_empty() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.0[0];
            self.0 = &self.0[1..];
            Ok(1)
        }
    }

    #[rstest]
    #[case("", 3, vec![])]
    #[case("abcde", 2, vec!["ab", "cd", "e"])]
    #[case("héllo wörld", 4, vec!["héll", "o wö", "rld"])]
    #[case("日本語テキスト", 3, vec!["日本語", "テキス", "ト"])]
    fn chunks_by_chars(
        #[case] text: &str,
        #[case] size: usize,
        #[case] expected: Vec<&str>,
    ) {
        let chunks: Vec<String> = CharChunks::new(text.as_bytes(), size)
            .unwrap()
            .map(|chunk| chunk.unwrap())
            .collect();
        assert_eq!(chunks, expected);
    }

    #[test]
    fn split_sequences_are_stitched() {
        let text = "añb🎉c";
        let reader = BufReader::with_capacity(1, OneByte(text.as_bytes()));
        let chars: String =
            Chars::new(reader).map(|c| c.unwrap()).collect();
        assert_eq!(chars, text);
    }

    #[test]
    fn invalid_utf8_is_invalid_data() {
        let mut chunks = CharChunks::new(&b"ok\xff\xfe"[..], 8).unwrap();
        assert_eq!(chunks.next().unwrap().unwrap(), "ok");
        match chunks.next() {
            Some(Err(StreamError::Io(err))) => {
                assert_eq!(err.kind(), ErrorKind::InvalidData)
            }
            other => panic!("unexpected step: {other:?}"),
        }
        assert!(chunks.next().is_none());
    }

    #[test]
    fn truncated_sequence_at_end_is_invalid_data() {
        // first two bytes of "€"
        let mut chars = Chars::new(&b"x\xe2\x82"[..]);
        assert_eq!(chars.next().unwrap().unwrap(), 'x');
        assert!(matches!(chars.next(), Some(Err(StreamError::Io(_)))));
        assert!(chars.next().is_none());
    }

    #[test]
    fn completed_char_survives_following_invalid_byte() {
        // "ñ" split over two refills, then a byte that never starts a char
        let reader = BufReader::with_capacity(1, OneByte(b"\xc3\xb1\xff"));
        let mut chars = Chars::new(reader);

        assert_eq!(chars.next().unwrap().unwrap(), 'ñ');
        match chars.next() {
            Some(Err(StreamError::Io(err))) => {
                assert_eq!(err.kind(), ErrorKind::InvalidData)
            }
            other => panic!("unexpected step: {other:?}"),
        }
        assert!(chars.next().is_none());
    }

    #[test_log::test]
    fn chars_read_default_sized_chunks() {
        let chars = Chars::new(&b"abc"[..]);
        assert_eq!(chars.chunks.chunk_size(), crate::DEFAULT_CHUNK_SIZE);
        assert_eq!(chars.map(|c| c.unwrap()).collect::<String>(), "abc");
    }

    #[test]
    fn zero_size_is_rejected() {
        assert!(matches!(
            CharChunks::new(&b"abc"[..], 0),
            Err(StreamError::InvalidArgument(_))
        ));
    }
}
