//! Ring window over the tail of a forward-only byte stream
//!
//! Stores the most recent `capacity` bytes read from a source.
//! Two logical cursors are kept:
//! - `fill` - number of valid bytes retained (write side)
//! - `cursor` - read position inside the retained bytes (seek side)
//!
//! Zero allocation after initialization.
//!
//! # Invariants
//! - `0 <= cursor <= fill <= capacity`
//! - logical byte `i` lives at physical slot `(head + i) % capacity`

/// Fixed-capacity backlog of recently read bytes
#[derive(Debug, Clone)]
pub struct SeekWindow {
    buffer: Box<[u8]>,
    head: usize,
    fill: usize,
    cursor: usize,
}

impl SeekWindow {
    /// Create an empty window, or `None` when `capacity == 0`
    pub fn new(capacity: usize) -> Option<Self> {
        if capacity == 0 {
            return None;
        }
        Some(Self {
            buffer: vec![0u8; capacity].into_boxed_slice(),
            head: 0,
            fill: 0,
            cursor: 0,
        })
    }

    /// Maximum number of retained bytes
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Number of valid bytes currently retained
    #[inline]
    pub fn fill(&self) -> usize {
        self.fill
    }

    /// Read position within the retained bytes
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Bytes retained ahead of the cursor (sought back over, not yet re-read)
    #[inline]
    pub fn unread(&self) -> usize {
        self.fill - self.cursor
    }

    /// Copy unread bytes into `out`, advancing the cursor
    ///
    /// Returns the number of bytes copied.
    pub fn read_unread(&mut self, out: &mut [u8]) -> usize {
        let count = out.len().min(self.unread());
        if count == 0 {
            return 0;
        }

        let cap = self.capacity();
        let start = (self.head + self.cursor) % cap;
        let first = count.min(cap - start);
        out[..first].copy_from_slice(&self.buffer[start..start + first]);
        out[first..count].copy_from_slice(&self.buffer[..count - first]);

        self.cursor += count;
        count
    }

    /// Append freshly read bytes, evicting the oldest ones once full
    ///
    /// The cursor is moved to the end of the window: appended bytes have
    /// just been handed to (or skipped by) the caller.
    pub fn append(&mut self, data: &[u8]) {
        let cap = self.capacity();
        // Only the last `cap` bytes can survive
        let data = if data.len() > cap {
            &data[data.len() - cap..]
        } else {
            data
        };

        let overflow = (self.fill + data.len()).saturating_sub(cap);
        self.head = (self.head + overflow) % cap;
        self.fill -= overflow;

        let tail = (self.head + self.fill) % cap;
        let first = data.len().min(cap - tail);
        self.buffer[tail..tail + first].copy_from_slice(&data[..first]);
        self.buffer[..data.len() - first].copy_from_slice(&data[first..]);

        self.fill += data.len();
        self.cursor = self.fill;
    }

    /// Move the cursor forward over unread bytes
    ///
    /// Returns how far the cursor actually moved (at most `unread()`).
    #[inline]
    pub fn advance(&mut self, count: u64) -> usize {
        let step = count.min(self.unread() as u64) as usize;
        self.cursor += step;
        step
    }

    /// Move the cursor back by `count` bytes
    ///
    /// Returns `false` and leaves the cursor untouched when fewer than
    /// `count` bytes precede it.
    #[inline]
    pub fn retreat(&mut self, count: u64) -> bool {
        if count > self.cursor as u64 {
            return false;
        }
        self.cursor -= count as usize;
        true
    }

    /// Place the cursor `distance` bytes before the end of the window
    ///
    /// Returns `false` and leaves the cursor untouched when fewer than
    /// `distance` bytes are retained.
    #[inline]
    pub fn rewind_from_end(&mut self, distance: u64) -> bool {
        if distance > self.fill as u64 {
            return false;
        }
        self.cursor = self.fill - distance as usize;
        true
    }

    /// Copy of the retained bytes in stream order (diagnostics and tests)
    pub fn to_vec(&self) -> Vec<u8> {
        let cap = self.capacity();
        (0..self.fill)
            .map(|i| self.buffer[(self.head + i) % cap])
            .collect()
    }
}
