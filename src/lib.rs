//! Network share stream plumbing
//!
//! Building blocks used together by a share-backed storage facade:
//! - **stream**: makes a forward-only byte source seekable within a bounded
//!   backward window
//! - **share**: reference-counted pool of network share connections handing
//!   out scoped leases
//! - **infrastructure**: logging, metrics, configuration

pub mod infrastructure;
pub mod share;
pub mod stream;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types
pub use infrastructure::config::{Config, StreamConfig};
pub use share::{ConnectionKey, ConnectionPool, Credentials, Lease, ShareConnector, ShareStream};
pub use stream::{SeekableReader, StreamError};

use thiserror::Error;

/// Main error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("Stream error: {0}")]
    Stream(#[from] StreamError),

    #[error("Configuration error: {0}")]
    Config(#[from] infrastructure::ConfigError),

    #[error("Connection string error: {0}")]
    ConnectionString(#[from] share::ConnectionStringError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
