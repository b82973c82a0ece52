//! Stream extensions: capability-restricted views over I/O resources,
//! lazy chunked and element-wise iteration over blocking and async
//! readers, and position predicates.
//!
//! ```
//! use std::io::Cursor;
//! use streamext::{ReadExt, Restricted, SeekExt};
//!
//! let mut view = Restricted::read_only(Cursor::new(vec![1u8, 2, 3]))?;
//! assert!(!view.is_stream_empty()?);
//!
//! for chunk in (&mut view).read_chunks(2)? {
//!     println!("{:?}", chunk?);
//! }
//! assert!(view.is_at_end()?);
//! # Ok::<(), streamext::StreamError>(())
//! ```

pub mod capability;
pub mod chunks;
pub mod config;
pub mod elements;
pub mod errors;
pub mod ext;
pub mod file;
pub mod memory;
pub mod position;
pub mod restricted;
pub mod text;

pub use capability::{Access, Capabilities};
pub use chunks::{AsyncChunks, Chunks};
pub use config::ChunkConfig;
pub use elements::{AsyncElements, Elements};
pub use errors::{Result, StreamError};
pub use ext::{AsyncReadChunksExt, ReadExt, TextExt};
pub use file::{FileAccess, FileStream};
pub use memory::MemoryStream;
pub use position::{LookaheadExt, SeekExt};
pub use restricted::Restricted;
pub use text::{CharChunks, Chars, Utf8Source};

pub use tokio_util::sync::CancellationToken;

pub const KILOBYTE: usize = 1024;

/// Chunk size of the element iterators and of [`ChunkConfig::default`].
pub const DEFAULT_CHUNK_SIZE: usize = 4 * KILOBYTE;
