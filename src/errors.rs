use std::io::{self, ErrorKind};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StreamError>;

#[derive(Error, Debug)]
pub enum StreamError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),
    #[error("Operation was cancelled")]
    Cancelled,
    #[error("IO error: {0}")]
    Io(io::Error),
    #[error("Config error: {0}")]
    Config(String),
}

impl StreamError {
    pub(crate) fn unsupported(operation: &str) -> Self {
        Self::UnsupportedOperation(operation.to_owned())
    }

    /// Rejection raised from inside `Read`/`Write`/`Seek` impls, where
    /// only an `io::Error` can be returned.
    pub(crate) fn unsupported_io(operation: &str) -> io::Error {
        Self::unsupported(operation).into()
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// `io::Error`s that carry a `StreamError` payload are unwrapped back into
/// it, every other error is kept as is.
impl From<io::Error> for StreamError {
    fn from(err: io::Error) -> Self {
        match err.downcast::<StreamError>() {
            Ok(inner) => inner,
            Err(err) => Self::Io(err),
        }
    }
}

impl From<StreamError> for io::Error {
    fn from(err: StreamError) -> Self {
        let kind = match err {
            StreamError::Io(inner) => return inner,
            StreamError::InvalidArgument(_) => ErrorKind::InvalidInput,
            StreamError::UnsupportedOperation(_) => ErrorKind::Unsupported,
            StreamError::Cancelled => ErrorKind::Other,
            StreamError::Config(_) => ErrorKind::InvalidData,
        };
        io::Error::new(kind, err)
    }
}

impl From<serde_json::Error> for StreamError {
    fn from(e: serde_json::Error) -> Self {
        Self::Config(e.to_string())
    }
}
