//! External connect/disconnect capability consumed by the pool

use super::key::Credentials;

/// Opens and closes the real network share connection
///
/// Implementations own any timeout or retry policy; the pool calls
/// [`establish`](Self::establish) once per key and propagates its error untouched.
pub trait ShareConnector: Send + Sync {
    /// Opaque connection handle shared by all lease holders of one key
    type Handle: Send + Sync;
    /// Establishment failure
    type Error: std::error::Error + Send + Sync + 'static;

    /// Connect to `share` as `credentials`
    fn establish(&self, share: &str, credentials: &Credentials)
        -> Result<Self::Handle, Self::Error>;

    /// Disconnect a handle whose last lease has been released
    fn teardown(&self, handle: &Self::Handle);
}
