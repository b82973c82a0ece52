//! Runtime capability reporting for I/O resources.
//!
//! `Read`, `Write` and `Seek` say what a type can do at compile time. A
//! `File` opened read-only still implements `Write`, so resources report
//! what they can actually do through [`Capabilities`].

use std::io::{
    BufReader, BufWriter, Cursor, Empty, Sink, Stderr, Stdin, Stdout, Write,
};
use std::net::TcpStream;

pub trait Capabilities {
    fn can_read(&self) -> bool;

    fn can_write(&self) -> bool;

    /// Whether seeking, position and length queries are available.
    fn can_seek(&self) -> bool;
}

/// Fixed set of operations a restricted view lets through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Access {
    pub read: bool,
    pub write: bool,
    pub seek: bool,
}

impl Access {
    pub const READ_SEEKABLE: Access = Access {
        read: true,
        write: false,
        seek: true,
    };
    pub const READ_FORWARD: Access = Access {
        read: true,
        write: false,
        seek: false,
    };
    pub const WRITE_SEEKABLE: Access = Access {
        read: false,
        write: true,
        seek: true,
    };
    pub const WRITE_FORWARD: Access = Access {
        read: false,
        write: true,
        seek: false,
    };

    /// Capabilities of `resource` that are not covered by `self`, as the
    /// names of the missing operations.
    pub fn missing_from<S: Capabilities + ?Sized>(
        &self,
        resource: &S,
    ) -> Vec<&'static str> {
        let mut missing = vec![];
        if self.read && !resource.can_read() {
            missing.push("read");
        }
        if self.write && !resource.can_write() {
            missing.push("write");
        }
        if self.seek && !resource.can_seek() {
            missing.push("seek");
        }
        missing
    }
}

impl<S: Capabilities + ?Sized> Capabilities for &mut S {
    fn can_read(&self) -> bool {
        (**self).can_read()
    }

    fn can_write(&self) -> bool {
        (**self).can_write()
    }

    fn can_seek(&self) -> bool {
        (**self).can_seek()
    }
}

impl<S: Capabilities + ?Sized> Capabilities for Box<S> {
    fn can_read(&self) -> bool {
        (**self).can_read()
    }

    fn can_write(&self) -> bool {
        (**self).can_write()
    }

    fn can_seek(&self) -> bool {
        (**self).can_seek()
    }
}

impl Capabilities for Cursor<Vec<u8>> {
    fn can_read(&self) -> bool {
        true
    }

    fn can_write(&self) -> bool {
        true
    }

    fn can_seek(&self) -> bool {
        true
    }
}

impl Capabilities for Cursor<&[u8]> {
    fn can_read(&self) -> bool {
        true
    }

    fn can_write(&self) -> bool {
        false
    }

    fn can_seek(&self) -> bool {
        true
    }
}

impl Capabilities for &[u8] {
    fn can_read(&self) -> bool {
        true
    }

    fn can_write(&self) -> bool {
        false
    }

    fn can_seek(&self) -> bool {
        false
    }
}

impl Capabilities for Vec<u8> {
    fn can_read(&self) -> bool {
        false
    }

    fn can_write(&self) -> bool {
        true
    }

    fn can_seek(&self) -> bool {
        false
    }
}

impl Capabilities for TcpStream {
    fn can_read(&self) -> bool {
        true
    }

    fn can_write(&self) -> bool {
        true
    }

    fn can_seek(&self) -> bool {
        false
    }
}

impl Capabilities for Stdin {
    fn can_read(&self) -> bool {
        true
    }

    fn can_write(&self) -> bool {
        false
    }

    fn can_seek(&self) -> bool {
        false
    }
}

impl Capabilities for Stdout {
    fn can_read(&self) -> bool {
        false
    }

    fn can_write(&self) -> bool {
        true
    }

    fn can_seek(&self) -> bool {
        false
    }
}

impl Capabilities for Stderr {
    fn can_read(&self) -> bool {
        false
    }

    fn can_write(&self) -> bool {
        true
    }

    fn can_seek(&self) -> bool {
        false
    }
}

impl Capabilities for Empty {
    fn can_read(&self) -> bool {
        true
    }

    fn can_write(&self) -> bool {
        false
    }

    fn can_seek(&self) -> bool {
        false
    }
}

impl Capabilities for Sink {
    fn can_read(&self) -> bool {
        false
    }

    fn can_write(&self) -> bool {
        true
    }

    fn can_seek(&self) -> bool {
        false
    }
}

/// Buffering does not change direction; seeking through a `BufReader`
/// discards its buffer but stays correct.
impl<S: Capabilities> Capabilities for BufReader<S> {
    fn can_read(&self) -> bool {
        self.get_ref().can_read()
    }

    fn can_write(&self) -> bool {
        false
    }

    fn can_seek(&self) -> bool {
        self.get_ref().can_seek()
    }
}

impl<S: Capabilities + Write> Capabilities for BufWriter<S> {
    fn can_read(&self) -> bool {
        false
    }

    fn can_write(&self) -> bool {
        self.get_ref().can_write()
    }

    fn can_seek(&self) -> bool {
        self.get_ref().can_seek()
    }
}
