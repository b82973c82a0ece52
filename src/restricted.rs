use std::io::{self, IoSlice, IoSliceMut, Read, Seek, SeekFrom, Write};

use crate::capability::{Access, Capabilities};
use crate::{Result, StreamError};

/// A view over a resource that only lets a fixed subset of operations
/// through.
///
/// The view owns the resource: dropping it closes the resource. Rejected
/// operations fail with an `io::Error` of kind `Unsupported`, which
/// converts back into [`StreamError::UnsupportedOperation`].
#[derive(Debug)]
pub struct Restricted<S> {
    inner: S,
    access: Access,
}

impl<S: Capabilities> Restricted<S> {
    /// Fails if `inner` cannot read when `access` allows reads, or cannot
    /// write when `access` allows writes. Seeking is passed through.
    pub fn new(inner: S, access: Access) -> Result<Self> {
        let direction = Access {
            seek: false,
            ..access
        };
        let missing = direction.missing_from(&inner);
        if !missing.is_empty() {
            log::debug!(
                "restricted: resource lacks {} for {:?}",
                missing.join(", "),
                access
            );
            return Err(StreamError::UnsupportedOperation(format!(
                "underlying resource does not support {}",
                missing.join(", ")
            )));
        }

        log::debug!("restricted: created view with {:?}", access);
        Ok(Self { inner, access })
    }

    pub fn read_only(inner: S) -> Result<Self> {
        Self::new(inner, Access::READ_SEEKABLE)
    }

    /// Read-only and without seek, position or length.
    pub fn read_only_forward(inner: S) -> Result<Self> {
        Self::new(inner, Access::READ_FORWARD)
    }

    pub fn write_only(inner: S) -> Result<Self> {
        Self::new(inner, Access::WRITE_SEEKABLE)
    }

    /// Write-only and without seek, position or length.
    pub fn write_only_forward(inner: S) -> Result<Self> {
        Self::new(inner, Access::WRITE_FORWARD)
    }
}

impl<S> Restricted<S> {
    pub fn access(&self) -> Access {
        self.access
    }

    fn check(&self, allowed: bool, operation: &str) -> io::Result<()> {
        if allowed {
            Ok(())
        } else {
            log::debug!(
                "restricted: rejected {} on {:?}",
                operation,
                self.access
            );
            Err(StreamError::unsupported_io(operation))
        }
    }
}

impl<S: Seek> Restricted<S> {
    pub fn position(&mut self) -> Result<u64> {
        Ok(self.stream_position()?)
    }

    pub fn set_position(&mut self, position: u64) -> Result<()> {
        self.seek(SeekFrom::Start(position))?;
        Ok(())
    }

    /// Length of the resource; the position is left unchanged.
    pub fn stream_len(&mut self) -> Result<u64> {
        self.check(self.access.seek, "length")?;
        let position = self.inner.stream_position()?;
        let len = self.inner.seek(SeekFrom::End(0))?;
        if position != len {
            self.inner.seek(SeekFrom::Start(position))?;
        }
        Ok(len)
    }
}

impl<S: Capabilities> Capabilities for Restricted<S> {
    fn can_read(&self) -> bool {
        self.access.read && self.inner.can_read()
    }

    fn can_write(&self) -> bool {
        self.access.write && self.inner.can_write()
    }

    fn can_seek(&self) -> bool {
        self.access.seek && self.inner.can_seek()
    }
}

impl<S: Read> Read for Restricted<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.check(self.access.read, "read")?;
        self.inner.read(buf)
    }

    fn read_vectored(
        &mut self,
        bufs: &mut [IoSliceMut<'_>],
    ) -> io::Result<usize> {
        self.check(self.access.read, "read")?;
        self.inner.read_vectored(bufs)
    }
}

impl<S: Write> Write for Restricted<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.check(self.access.write, "write")?;
        self.inner.write(buf)
    }

    fn write_vectored(&mut self, bufs: &[IoSlice<'_>]) -> io::Result<usize> {
        self.check(self.access.write, "write")?;
        self.inner.write_vectored(bufs)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.check(self.access.write, "flush")?;
        self.inner.flush()
    }
}

impl<S: Seek> Seek for Restricted<S> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.check(self.access.seek, "seek")?;
        self.inner.seek(pos)
    }

    fn stream_position(&mut self) -> io::Result<u64> {
        self.check(self.access.seek, "position")?;
        self.inner.stream_position()
    }
}
