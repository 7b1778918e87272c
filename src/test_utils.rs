//! Test doubles for byte sources and share connectors

use crate::share::{Credentials, ShareConnector};
use crate::stream::ByteSource;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io::{self, Read};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Deterministic pseudo-random bytes (xorshift64*)
pub fn pseudo_random_bytes(len: usize, seed: u64) -> Vec<u8> {
    let mut state = seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1;
    (0..len)
        .map(|_| {
            state ^= state >> 12;
            state ^= state << 25;
            state ^= state >> 27;
            (state.wrapping_mul(0x2545_F491_4F6C_DD1D) >> 56) as u8
        })
        .collect()
}

/// Forward-only source returning at most `chunk` bytes per read
pub struct TrickleSource {
    data: Vec<u8>,
    offset: usize,
    chunk: usize,
}

impl TrickleSource {
    pub fn new(data: Vec<u8>, chunk: usize) -> Self {
        Self {
            data,
            offset: 0,
            chunk: chunk.max(1),
        }
    }
}

impl Read for TrickleSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf
            .len()
            .min(self.chunk)
            .min(self.data.len() - self.offset);
        buf[..n].copy_from_slice(&self.data[self.offset..self.offset + n]);
        self.offset += n;
        Ok(n)
    }
}

impl ByteSource for TrickleSource {}

/// Source that fails once with `kind` when it reaches offset `fail_at`
pub struct FlakySource {
    data: Vec<u8>,
    offset: usize,
    fail_at: usize,
    kind: io::ErrorKind,
    failed: bool,
}

impl FlakySource {
    pub fn new(data: Vec<u8>, fail_at: usize, kind: io::ErrorKind) -> Self {
        Self {
            data,
            offset: 0,
            fail_at,
            kind,
            failed: false,
        }
    }
}

impl Read for FlakySource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.failed && self.offset == self.fail_at {
            self.failed = true;
            return Err(io::Error::new(self.kind, "injected failure"));
        }
        // Reads stop short of the failure point until it has fired
        let limit = if self.failed {
            self.data.len()
        } else {
            self.fail_at.min(self.data.len())
        };
        let n = buf.len().min(limit - self.offset);
        buf[..n].copy_from_slice(&self.data[self.offset..self.offset + n]);
        self.offset += n;
        Ok(n)
    }
}

impl ByteSource for FlakySource {}

/// Source that refuses reads
#[derive(Default)]
pub struct WriteOnlySource;

impl Read for WriteOnlySource {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "write-only"))
    }
}

impl ByteSource for WriteOnlySource {
    fn is_readable(&self) -> bool {
        false
    }
}

/// Handle produced by [`RecordingConnector`]
#[derive(Debug)]
pub struct FakeHandle {
    pub id: u64,
    pub share: String,
    pub logon: String,
}

/// Establishment failure produced by [`RecordingConnector`]
#[derive(Debug, thiserror::Error)]
#[error("Error connecting to remote share {share} (code {code})")]
pub struct ConnectError {
    pub share: String,
    pub code: i32,
}

/// Connector that records every establish/teardown call
#[derive(Default)]
pub struct RecordingConnector {
    next_id: AtomicU64,
    establish_calls: Mutex<HashMap<String, usize>>,
    teardowns: Mutex<Vec<u64>>,
    failing: Vec<String>,
    delay: Duration,
}

impl RecordingConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every establish call for `share`
    pub fn failing(mut self, share: &str) -> Self {
        self.failing.push(share.to_string());
        self
    }

    /// Sleep inside establish to widen race windows
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn establish_count(&self) -> usize {
        self.establish_calls.lock().values().sum()
    }

    pub fn establish_count_for(&self, share: &str) -> usize {
        self.establish_calls.lock().get(share).copied().unwrap_or(0)
    }

    pub fn teardown_count(&self) -> usize {
        self.teardowns.lock().len()
    }
}

impl ShareConnector for RecordingConnector {
    type Handle = FakeHandle;
    type Error = ConnectError;

    fn establish(&self, share: &str, credentials: &Credentials) -> Result<FakeHandle, ConnectError> {
        *self
            .establish_calls
            .lock()
            .entry(share.to_string())
            .or_insert(0) += 1;

        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }

        if self.failing.iter().any(|s| s == share) {
            return Err(ConnectError {
                share: share.to_string(),
                code: 53,
            });
        }

        Ok(FakeHandle {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            share: share.to_string(),
            logon: credentials.logon_name(),
        })
    }

    fn teardown(&self, handle: &FakeHandle) {
        self.teardowns.lock().push(handle.id);
    }
}
