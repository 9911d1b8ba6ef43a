use std::io;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors surfaced by [`FileStream`](crate::FileStream) and the range sources.
///
/// Every variant is returned to the caller of the operation that triggered it;
/// nothing is retried or logged on the way out.
#[derive(Debug, Error)]
pub enum Error {
    /// The remote cannot back a random-access stream (no length, no range
    /// support, failed probe) or the options could not be applied.
    #[error("cannot open remote resource: {0}")]
    Configuration(String),

    #[error("I/O operation on closed resource")]
    Closed,

    /// Bad `whence`, or a seek target outside `[0, length]`.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0} not supported on a read-only resource")]
    Unsupported(&'static str),

    /// A range fetch failed in the transport.
    #[error("range fetch failed: {0}")]
    Network(String),
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        Self::Network(value.to_string())
    }
}

impl From<Error> for io::Error {
    fn from(value: Error) -> Self {
        let kind = match &value {
            Error::Configuration(_) => io::ErrorKind::InvalidData,
            Error::Closed => io::ErrorKind::NotConnected,
            Error::InvalidArgument(_) => io::ErrorKind::InvalidInput,
            Error::Unsupported(_) => io::ErrorKind::Unsupported,
            Error::Network(_) => io::ErrorKind::Other,
        };
        io::Error::new(kind, value)
    }
}
