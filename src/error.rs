//! Unified error type.

/// Boxed error returned by parameter loaders.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error type returned by the crate's fallible operations.
///
/// Application-level errors (404, 422, etc.) are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s. This type surfaces
/// setup mistakes and infrastructure failures: an unknown parameter name, a
/// bad bind address, or a failure to accept connections.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid socket address `{0}`")]
    InvalidAddress(String),

    /// A middleware was requested for a parameter with no definition.
    #[error("Definition for param: '{0}' not found!")]
    UnknownParam(String),
}
