use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};

use crate::capability::Capabilities;
use crate::StreamError;

/// In-memory resource that can always be read and sought, and written to
/// unless it was created read-only.
#[derive(Clone, Debug, Default)]
pub struct MemoryStream {
    cursor: Cursor<Vec<u8>>,
    writable: bool,
}

impl MemoryStream {
    /// Empty and writable.
    pub fn new() -> Self {
        Self::from_bytes(vec![])
    }

    /// Writable, positioned at the start of `data`.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self {
            cursor: Cursor::new(data),
            writable: true,
        }
    }

    pub fn read_only(data: Vec<u8>) -> Self {
        Self {
            cursor: Cursor::new(data),
            writable: false,
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        self.cursor.get_ref()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.cursor.into_inner()
    }
}

impl From<Vec<u8>> for MemoryStream {
    fn from(data: Vec<u8>) -> Self {
        Self::from_bytes(data)
    }
}

impl Capabilities for MemoryStream {
    fn can_read(&self) -> bool {
        true
    }

    fn can_write(&self) -> bool {
        self.writable
    }

    fn can_seek(&self) -> bool {
        true
    }
}

impl Read for MemoryStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.cursor.read(buf)
    }
}

impl Write for MemoryStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.writable {
            return Err(StreamError::unsupported_io("write"));
        }
        self.cursor.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for MemoryStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.cursor.seek(pos)
    }
}
