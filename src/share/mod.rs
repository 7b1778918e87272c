//! Shared network share connections

pub mod connection_string;
pub mod connector;
pub mod key;
pub mod pool;
pub mod scoped;

pub use connection_string::{ConnectionStringError, ShareSettings};
pub use connector::ShareConnector;
pub use key::{ConnectionKey, Credentials};
pub use pool::{ConnectionPool, Lease, PoolStats};
pub use scoped::ShareStream;
