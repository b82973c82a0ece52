//! Start, end and emptiness checks.
//!
//! Seekable resources answer from their position and length. Forward-only
//! resources can only answer by looking ahead, which needs a buffer to
//! keep the peeked bytes: see [`LookaheadExt`].

use std::io::{self, BufRead, ErrorKind, Seek, SeekFrom};

use crate::Result;

/// Current position and total length. The position is restored before
/// returning.
fn position_and_len<S: Seek + ?Sized>(
    stream: &mut S,
) -> io::Result<(u64, u64)> {
    let position = stream.stream_position()?;
    let len = stream.seek(SeekFrom::End(0))?;
    if position != len {
        stream.seek(SeekFrom::Start(position))?;
    }
    Ok((position, len))
}

/// Predicates for seekable resources.
///
/// On a forward-only [`crate::Restricted`] view every method fails with
/// [`crate::StreamError::UnsupportedOperation`].
pub trait SeekExt: Seek {
    fn is_at_start(&mut self) -> Result<bool> {
        Ok(self.stream_position()? == 0)
    }

    /// A position past the end also counts as the end.
    fn is_at_end(&mut self) -> Result<bool> {
        let (position, len) = position_and_len(self)?;
        log::trace!("position: at {} of {}", position, len);
        Ok(position >= len)
    }

    /// Zero length, wherever the position is.
    fn is_stream_empty(&mut self) -> Result<bool> {
        let (_, len) = position_and_len(self)?;
        Ok(len == 0)
    }
}

impl<S: Seek + ?Sized> SeekExt for S {}

/// Predicates for forward-only resources.
///
/// The lookahead goes through `fill_buf`, so nothing is consumed and the
/// check can be repeated: the peeked bytes are the first ones the next
/// read returns.
pub trait LookaheadExt: BufRead {
    fn is_at_end_lookahead(&mut self) -> Result<bool> {
        loop {
            match self.fill_buf() {
                Ok(buffered) => return Ok(buffered.is_empty()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Nothing left to read. For a resource that has not been read from,
    /// this means it is empty.
    fn is_empty_lookahead(&mut self) -> Result<bool> {
        self.is_at_end_lookahead()
    }
}

impl<R: BufRead + ?Sized> LookaheadExt for R {}
