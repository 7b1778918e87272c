//! Seekable stream opened under a connection lease
//!
//! The storage facade opens files on a share while holding a [`Lease`];
//! [`ShareStream`] ties both lifetimes together so the connection outlives
//! the stream on every exit path.

use super::connector::ShareConnector;
use super::pool::Lease;
use crate::infrastructure::config::StreamConfig;
use crate::stream::{ByteSource, SeekableReader, StreamError};
use std::io::{self, Read, Seek, SeekFrom, Write};

/// Seekable reader plus the lease keeping its share connected
pub struct ShareStream<S: ByteSource, C: ShareConnector> {
    // Field order matters: the reader is dropped before the lease
    reader: SeekableReader<S>,
    lease: Lease<C>,
}

impl<S: ByteSource, C: ShareConnector> ShareStream<S, C> {
    /// Open a source on the leased connection
    ///
    /// `opener` receives the connection handle and returns the raw
    /// forward-only source. On any error the lease is released.
    pub fn open<F>(lease: Lease<C>, config: &StreamConfig, opener: F) -> crate::Result<Self>
    where
        F: FnOnce(&C::Handle) -> io::Result<S>,
    {
        let source = opener(lease.handle())?;
        let reader = SeekableReader::new(source, config.window_size)?;
        crate::log_stream!(
            tracing::Level::DEBUG,
            key = %lease.key(),
            window = config.window_size,
            "opened share stream"
        );
        Ok(Self { reader, lease })
    }

    /// Lease held by this stream
    pub fn lease(&self) -> &Lease<C> {
        &self.lease
    }

    /// Wrapped reader
    pub fn reader(&self) -> &SeekableReader<S> {
        &self.reader
    }

    /// Current logical position
    pub fn position(&self) -> u64 {
        self.reader.position()
    }

    /// Seek with the adapter's typed errors
    pub fn seek_to(&mut self, pos: SeekFrom) -> Result<u64, StreamError> {
        self.reader.seek_to(pos)
    }

    /// Close the stream, then release the lease
    pub fn close(self) {
        let Self { reader, lease } = self;
        drop(reader);
        lease.release();
    }
}

impl<S: ByteSource, C: ShareConnector> Read for ShareStream<S, C> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl<S: ByteSource, C: ShareConnector> Seek for ShareStream<S, C> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.reader.seek(pos)
    }
}

impl<S: ByteSource + Write, C: ShareConnector> Write for ShareStream<S, C> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.reader.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.reader.flush()
    }
}
