use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::capability::Capabilities;
use crate::Result;

/// Direction a [`FileStream`] was opened for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileAccess {
    Read,
    Write,
    ReadWrite,
}

/// A file that remembers how it was opened, so its capabilities can be
/// checked at runtime. The OS enforces the same access on every call.
#[derive(Debug)]
pub struct FileStream {
    file: File,
    path: PathBuf,
    access: FileAccess,
}

impl FileStream {
    /// `Write` and `ReadWrite` create the file if missing; `Write` also
    /// truncates it.
    pub fn open(path: impl AsRef<Path>, access: FileAccess) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut options = OpenOptions::new();
        match access {
            FileAccess::Read => options.read(true),
            FileAccess::Write => {
                options.write(true).create(true).truncate(true)
            }
            FileAccess::ReadWrite => {
                options.read(true).write(true).create(true)
            }
        };
        let file = options.open(&path)?;
        log::debug!("file: opened {} for {:?}", path.display(), access);

        Ok(Self { file, path, access })
    }

    pub fn access(&self) -> FileAccess {
        self.access
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flushes file contents to disk.
    pub fn sync_data(&self) -> Result<()> {
        self.file.sync_data()?;
        Ok(())
    }
}

impl Capabilities for FileStream {
    fn can_read(&self) -> bool {
        matches!(self.access, FileAccess::Read | FileAccess::ReadWrite)
    }

    fn can_write(&self) -> bool {
        matches!(self.access, FileAccess::Write | FileAccess::ReadWrite)
    }

    fn can_seek(&self) -> bool {
        true
    }
}

impl Read for FileStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl Write for FileStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl Seek for FileStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file.seek(pos)
    }
}
