//! Forward-only byte sources accepted by [`SeekableReader`](super::SeekableReader)

use std::fs::File;
use std::io::{self, Cursor, Read};

/// A readable byte source that may not support seeking
///
/// Resizing and length queries are optional capabilities; the defaults
/// report [`io::ErrorKind::Unsupported`].
pub trait ByteSource: Read {
    /// Whether the source can be read at all
    fn is_readable(&self) -> bool {
        true
    }

    /// Truncate or extend the source
    fn set_len(&mut self, _len: u64) -> io::Result<()> {
        Err(unsupported("source cannot be resized"))
    }

    /// Total length of the source in bytes
    fn stream_len(&self) -> io::Result<u64> {
        Err(unsupported("source length is unknown"))
    }
}

fn unsupported(msg: &'static str) -> io::Error {
    io::Error::new(io::ErrorKind::Unsupported, msg)
}

impl ByteSource for File {
    fn set_len(&mut self, len: u64) -> io::Result<()> {
        File::set_len(self, len)
    }

    fn stream_len(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }
}

impl ByteSource for &[u8] {
    fn stream_len(&self) -> io::Result<u64> {
        Ok(<[u8]>::len(self) as u64)
    }
}

impl ByteSource for Cursor<&[u8]> {
    fn stream_len(&self) -> io::Result<u64> {
        Ok(self.get_ref().len() as u64)
    }
}

impl ByteSource for Cursor<Vec<u8>> {
    fn set_len(&mut self, len: u64) -> io::Result<()> {
        let len = usize::try_from(len)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "length exceeds memory"))?;
        self.get_mut().resize(len, 0);
        Ok(())
    }

    fn stream_len(&self) -> io::Result<u64> {
        Ok(self.get_ref().len() as u64)
    }
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn is_readable(&self) -> bool {
        (**self).is_readable()
    }

    fn set_len(&mut self, len: u64) -> io::Result<()> {
        (**self).set_len(len)
    }

    fn stream_len(&self) -> io::Result<u64> {
        (**self).stream_len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_source_len() {
        let data: &[u8] = b"hello";
        assert_eq!(data.stream_len().unwrap(), 5);
        assert!(data.is_readable());
    }

    #[test]
    fn test_slice_source_cannot_resize() {
        let mut data: &[u8] = b"hello";
        let err = ByteSource::set_len(&mut data, 1).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Unsupported);
    }

    #[test]
    fn test_vec_cursor_resize() {
        let mut cursor = Cursor::new(vec![1u8, 2, 3]);
        ByteSource::set_len(&mut cursor, 5).unwrap();
        assert_eq!(cursor.get_ref(), &vec![1, 2, 3, 0, 0]);
        assert_eq!(cursor.stream_len().unwrap(), 5);
    }

    #[test]
    fn test_boxed_source_delegates() {
        let boxed: Box<dyn ByteSource> = Box::new(Cursor::new(vec![0u8; 7]));
        assert_eq!(boxed.stream_len().unwrap(), 7);
    }
}
