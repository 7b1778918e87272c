//! Seekable adapter over a forward-only byte source
//!
//! Keeps the last `W` bytes read from the source in a [`SeekWindow`] so that
//! callers can seek backwards by up to `W` bytes without re-reading the source.
//! Forward seeks read and discard source bytes, still feeding the window, so a
//! later backward seek within `W` keeps working.
//!
//! Reported position is always `underlying_position - window.unread()`.
//!
//! Not synchronized: one instance serves one caller at a time.

use super::source::ByteSource;
use super::window::SeekWindow;
use std::io::{self, Read, Seek, SeekFrom, Write};

/// Errors raised by [`SeekableReader`]
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("Source is not readable")]
    SourceNotReadable,
    #[error("Seek window must hold at least one byte")]
    InvalidWindow,
    #[error("Reached end of stream seeking forward to {requested} (stream ends at {reached})")]
    ForwardSeekPastEnd { requested: u64, reached: u64 },
    #[error("Cannot seek back {requested} bytes, only {available} are retained")]
    SeekOutOfWindow { requested: u64, available: u64 },
    #[error("Source IO error: {0}")]
    Io(#[from] io::Error),
}

impl From<StreamError> for io::Error {
    fn from(err: StreamError) -> Self {
        let kind = match err {
            StreamError::Io(e) => return e,
            StreamError::SourceNotReadable => io::ErrorKind::Unsupported,
            StreamError::InvalidWindow | StreamError::SeekOutOfWindow { .. } => {
                io::ErrorKind::InvalidInput
            }
            StreamError::ForwardSeekPastEnd { .. } => io::ErrorKind::UnexpectedEof,
        };
        io::Error::new(kind, err)
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, StreamError>;

/// Forward-only source made seekable within a bounded window
///
/// # Example
/// ```
/// use shareio::stream::SeekableReader;
/// use std::io::{Read, Seek, SeekFrom};
///
/// let source: &[u8] = b"ABCDEFGH";
/// let mut reader = SeekableReader::new(source, 4).unwrap();
///
/// let mut buf = [0u8; 4];
/// reader.read_exact(&mut buf).unwrap();
/// assert_eq!(reader.seek(SeekFrom::Current(-2)).unwrap(), 2);
/// ```
pub struct SeekableReader<S: ByteSource> {
    /// Exclusively owned source
    source: S,
    /// Backlog of the most recent bytes
    window: SeekWindow,
    /// Discard buffer for forward seeks, allocated on first use
    scratch: Vec<u8>,
    /// Bytes consumed from the source so far
    underlying_position: u64,
    /// Source failure held back behind a short read
    pending_error: Option<io::Error>,
}

impl<S: ByteSource> SeekableReader<S> {
    /// Wrap `source`, retaining up to `window_size` bytes for backward seeks
    ///
    /// # Errors
    /// - [`StreamError::InvalidWindow`] when `window_size == 0`
    /// - [`StreamError::SourceNotReadable`] when the source cannot be read
    pub fn new(source: S, window_size: usize) -> Result<Self> {
        let window = SeekWindow::new(window_size).ok_or(StreamError::InvalidWindow)?;
        if !source.is_readable() {
            return Err(StreamError::SourceNotReadable);
        }

        Ok(Self {
            source,
            window,
            scratch: Vec::new(),
            underlying_position: 0,
            pending_error: None,
        })
    }

    /// Current logical position
    #[inline]
    pub fn position(&self) -> u64 {
        self.underlying_position - self.window.unread() as u64
    }

    /// Seek to an absolute position, equivalent to `seek_to(SeekFrom::Start(pos))`
    pub fn set_position(&mut self, pos: u64) -> Result<u64> {
        self.seek_to(SeekFrom::Start(pos))
    }

    /// Bytes consumed from the source so far
    #[inline]
    pub fn underlying_position(&self) -> u64 {
        self.underlying_position
    }

    /// Retained backlog
    #[inline]
    pub fn window(&self) -> &SeekWindow {
        &self.window
    }

    /// Reference to the wrapped source
    pub fn get_ref(&self) -> &S {
        &self.source
    }

    /// Unwrap the source; retained window bytes are discarded
    pub fn into_inner(self) -> S {
        self.source
    }

    /// Length of the wrapped source (pass-through)
    pub fn stream_len(&self) -> io::Result<u64> {
        self.source.stream_len()
    }

    /// Resize the wrapped source (pass-through, no buffering)
    pub fn set_len(&mut self, len: u64) -> io::Result<()> {
        self.source.set_len(len)
    }

    /// Seek within the retained window, reading ahead on forward motion
    ///
    /// # Errors
    /// - [`StreamError::ForwardSeekPastEnd`] if the source ends before the target
    /// - [`StreamError::SeekOutOfWindow`] if the target lies before the window
    /// - [`StreamError::Io`] on source failure
    ///
    /// The window invariants hold after every error.
    pub fn seek_to(&mut self, pos: SeekFrom) -> Result<u64> {
        match pos {
            SeekFrom::End(offset) => self.seek_from_end(offset.min(0).unsigned_abs()),
            SeekFrom::Current(0) => Ok(self.position()),
            SeekFrom::Current(offset) if offset > 0 => self.seek_forward(offset as u64),
            SeekFrom::Current(offset) => self.seek_backward(offset.unsigned_abs()),
            SeekFrom::Start(target) => {
                let current = self.position();
                if target >= current {
                    self.seek_forward(target - current)
                } else {
                    self.seek_backward(current - target)
                }
            }
        }
    }

    fn seek_forward(&mut self, delta: u64) -> Result<u64> {
        let requested = self.position().saturating_add(delta);
        let skipped = self.window.advance(delta);
        let mut remaining = delta - skipped as u64;

        while remaining > 0 {
            let want = remaining.min(self.window.capacity() as u64) as usize;
            let read = self.pull(want)?;
            if read == 0 {
                crate::log_stream!(
                    tracing::Level::DEBUG,
                    requested,
                    reached = self.position(),
                    "forward seek hit end of source"
                );
                return Err(StreamError::ForwardSeekPastEnd {
                    requested,
                    reached: self.position(),
                });
            }
            remaining -= read as u64;
        }

        Ok(self.position())
    }

    fn seek_backward(&mut self, delta: u64) -> Result<u64> {
        if !self.window.retreat(delta) {
            return Err(StreamError::SeekOutOfWindow {
                requested: delta,
                available: self.window.cursor() as u64,
            });
        }
        Ok(self.position())
    }

    fn seek_from_end(&mut self, distance: u64) -> Result<u64> {
        let capacity = self.window.capacity() as u64;
        if distance > capacity {
            return Err(StreamError::SeekOutOfWindow {
                requested: distance,
                available: capacity,
            });
        }

        // Drain to end of source; the window keeps the last `capacity` bytes
        let before = self.position();
        let drained_from = self.underlying_position;
        while self.pull(self.window.capacity())? > 0 {}
        crate::log_stream!(
            tracing::Level::TRACE,
            drained = self.underlying_position - drained_from,
            "drained source to end"
        );

        if !self.window.rewind_from_end(distance) {
            // Whole source fits in the window here, so the old position is retained
            let restored = self.window.rewind_from_end(self.underlying_position - before);
            debug_assert!(restored);
            return Err(StreamError::SeekOutOfWindow {
                requested: distance,
                available: self.window.fill() as u64,
            });
        }
        Ok(self.position())
    }

    /// Read up to `want` bytes from the source into the window via scratch
    fn pull(&mut self, want: usize) -> Result<usize> {
        if let Some(e) = self.pending_error.take() {
            return Err(StreamError::Io(e));
        }
        if self.scratch.len() < want {
            self.scratch.resize(self.window.capacity(), 0);
        }

        let read = read_retrying(&mut self.source, &mut self.scratch[..want])?;
        if read > 0 {
            self.window.append(&self.scratch[..read]);
            self.underlying_position += read as u64;
        }
        Ok(read)
    }
}

/// Single read from the source, retrying on `Interrupted`
fn read_retrying<R: Read + ?Sized>(source: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match source.read(buf) {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            other => return other,
        }
    }
}

impl<S: ByteSource> Read for SeekableReader<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if let Some(e) = self.pending_error.take() {
            return Err(e);
        }

        let from_window = self.window.read_unread(buf);
        let rest = &mut buf[from_window..];
        if rest.is_empty() {
            return Ok(from_window);
        }

        let fresh = match read_retrying(&mut self.source, rest) {
            Ok(n) => n,
            // Hand out what the window produced; the error is returned by the next call
            Err(e) if from_window > 0 => {
                crate::log_stream!(
                    tracing::Level::DEBUG,
                    served = from_window,
                    error = %e,
                    "source failed after window read, deferring error"
                );
                self.pending_error = Some(e);
                return Ok(from_window);
            }
            Err(e) => return Err(e),
        };

        if fresh > 0 {
            self.underlying_position += fresh as u64;
            self.window.append(&rest[..fresh]);
        }
        Ok(from_window + fresh)
    }
}

impl<S: ByteSource> Seek for SeekableReader<S> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.seek_to(pos).map_err(io::Error::from)
    }

    fn stream_position(&mut self) -> io::Result<u64> {
        Ok(self.position())
    }
}

/// Writes go straight to the source; the window is not updated
impl<S: ByteSource + Write> Write for SeekableReader<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.source.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.source.flush()
    }
}

impl<S: ByteSource> std::fmt::Debug for SeekableReader<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeekableReader")
            .field("position", &self.position())
            .field("underlying_position", &self.underlying_position)
            .field("fill", &self.window.fill())
            .field("cursor", &self.window.cursor())
            .field("capacity", &self.window.capacity())
            .finish()
    }
}
