//! Reference-counted network share connection pool
//!
//! One connection per [`ConnectionKey`], shared by every caller holding a
//! [`Lease`] for that key. The first acquire establishes the connection,
//! the release that drops the lease count to zero tears it down.
//!
//! A single lock serializes acquire and release across all keys and is held
//! for the duration of the external establish/teardown call.

use super::connector::ShareConnector;
use super::key::{ConnectionKey, Credentials};
use crate::infrastructure::metrics::{MetricsSnapshot, PoolMetrics};
use crate::log_share;
use parking_lot::Mutex;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::Level;

/// Shared connection with its live lease count
struct ConnectionEntry<H> {
    /// Connection handle shared by lease holders
    handle: Arc<H>,
    /// Live leases, always > 0 while the entry is in the map
    leases: usize,
    /// Distinguishes successive connections for the same key
    generation: u64,
    /// Establishment time
    established_at: Instant,
}

/// Map state guarded by the pool lock
struct PoolState<H> {
    entries: HashMap<ConnectionKey, ConnectionEntry<H>>,
    next_generation: u64,
}

struct PoolInner<C: ShareConnector> {
    connector: C,
    state: Mutex<PoolState<C::Handle>>,
    metrics: PoolMetrics,
}

/// Pool statistics
#[derive(Debug, Clone)]
pub struct PoolStats {
    /// Open connections
    pub connections: usize,
    /// Live leases across all connections
    pub leases: usize,
    pub metrics: MetricsSnapshot,
}

/// Pool of shared network share connections
///
/// Cloning yields another handle to the same pool.
///
/// # Example
/// ```ignore
/// let pool = ConnectionPool::new(connector);
/// let lease = pool.acquire(r"\\files\media", &credentials)?;
/// // ... use lease.handle() ...
/// drop(lease); // tears the connection down if this was the last lease
/// ```
pub struct ConnectionPool<C: ShareConnector> {
    inner: Arc<PoolInner<C>>,
}

impl<C: ShareConnector> Clone for ConnectionPool<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: ShareConnector> ConnectionPool<C> {
    /// Create an empty pool around `connector`
    pub fn new(connector: C) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                connector,
                state: Mutex::new(PoolState {
                    entries: HashMap::new(),
                    next_generation: 0,
                }),
                metrics: PoolMetrics::new(),
            }),
        }
    }

    /// Lease the connection to `share` for `credentials`
    ///
    /// Establishes the connection if no lease for the key is live, otherwise
    /// shares the existing handle.
    ///
    /// # Errors
    /// Returns the connector's establishment error unchanged; no entry is
    /// left behind.
    pub fn acquire(&self, share: &str, credentials: &Credentials) -> Result<Lease<C>, C::Error> {
        let key = ConnectionKey::new(share, credentials);
        let inner = &self.inner;

        let mut guard = inner.state.lock();
        let state = &mut *guard;
        let (handle, generation) = match state.entries.entry(key.clone()) {
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                entry.leases += 1;
                log_share!(Level::TRACE, key = %key, leases = entry.leases, "connection shared");
                (Arc::clone(&entry.handle), entry.generation)
            }
            Entry::Vacant(vacant) => {
                let handle = match inner.connector.establish(share, credentials) {
                    Ok(handle) => Arc::new(handle),
                    Err(e) => {
                        inner.metrics.record_establish_failure();
                        log_share!(Level::WARN, key = %key, error = %e, "failed to establish connection");
                        return Err(e);
                    }
                };
                let generation = state.next_generation;
                state.next_generation += 1;
                vacant.insert(ConnectionEntry {
                    handle: Arc::clone(&handle),
                    leases: 1,
                    generation,
                    established_at: Instant::now(),
                });
                inner.metrics.record_establish();
                log_share!(Level::INFO, key = %key, "connection established");
                (handle, generation)
            }
        };
        drop(guard);

        inner.metrics.record_acquire();
        Ok(Lease {
            pool: Arc::clone(inner),
            key,
            generation,
            handle,
        })
    }

    /// Return a lease; equivalent to dropping it
    pub fn release(&self, lease: Lease<C>) {
        drop(lease);
    }

    /// Live leases for `key` (0 when no connection is open)
    pub fn lease_count(&self, key: &ConnectionKey) -> usize {
        self.inner
            .state
            .lock()
            .entries
            .get(key)
            .map(|entry| entry.leases)
            .unwrap_or(0)
    }

    /// Get pool statistics
    pub fn stats(&self) -> PoolStats {
        let state = self.inner.state.lock();
        PoolStats {
            connections: state.entries.len(),
            leases: state.entries.values().map(|entry| entry.leases).sum(),
            metrics: self.inner.metrics.snapshot(),
        }
    }

    /// Underlying connector
    pub fn connector(&self) -> &C {
        &self.inner.connector
    }

    /// Tear down every open connection
    ///
    /// Meant for process shutdown. Leases still alive afterwards hold a
    /// disconnected handle; dropping them later is harmless. Returns the
    /// number of connections torn down.
    pub fn shutdown(&self) -> usize {
        let mut state = self.inner.state.lock();
        let count = state.entries.len();
        for (key, entry) in state.entries.drain() {
            log_share!(
                Level::WARN,
                key = %key,
                leases = entry.leases,
                "tearing down connection with live leases at shutdown"
            );
            self.inner.connector.teardown(&entry.handle);
            self.inner.metrics.record_teardown();
        }
        count
    }
}

impl<C: ShareConnector> PoolInner<C> {
    /// Drop one lease for `key`, tearing the connection down on the last one
    fn release(&self, key: &ConnectionKey, generation: u64) {
        let mut state = self.state.lock();
        self.metrics.record_release();

        let entry = match state.entries.get_mut(key) {
            Some(entry) if entry.generation == generation => entry,
            // Torn down by shutdown; a newer connection may own the key
            _ => {
                log_share!(Level::DEBUG, key = %key, "released lease of closed connection");
                return;
            }
        };

        entry.leases -= 1;
        if entry.leases > 0 {
            log_share!(Level::TRACE, key = %key, leases = entry.leases, "lease released");
            return;
        }

        if let Some(entry) = state.entries.remove(key) {
            self.connector.teardown(&entry.handle);
            self.metrics.record_teardown();
            log_share!(
                Level::INFO,
                key = %key,
                open_for = ?entry.established_at.elapsed(),
                "connection closed"
            );
        }
    }
}

/// Scoped claim on a shared connection
///
/// Released exactly once, when dropped or passed to [`ConnectionPool::release`].
#[must_use = "dropping a lease releases the connection immediately"]
pub struct Lease<C: ShareConnector> {
    pool: Arc<PoolInner<C>>,
    key: ConnectionKey,
    generation: u64,
    handle: Arc<C::Handle>,
}

impl<C: ShareConnector> Lease<C> {
    /// Key of the leased connection
    #[inline]
    pub fn key(&self) -> &ConnectionKey {
        &self.key
    }

    /// Shared connection handle
    #[inline]
    pub fn handle(&self) -> &Arc<C::Handle> {
        &self.handle
    }

    /// Release the lease explicitly
    pub fn release(self) {
        drop(self);
    }
}

impl<C: ShareConnector> Drop for Lease<C> {
    fn drop(&mut self) {
        self.pool.release(&self.key, self.generation);
    }
}

impl<C: ShareConnector> fmt::Debug for Lease<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lease")
            .field("key", &self.key)
            .field("generation", &self.generation)
            .finish()
    }
}
