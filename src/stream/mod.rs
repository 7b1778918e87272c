//! Bounded backward-seek over forward-only byte sources

pub mod seekable;
pub mod source;
pub mod window;

pub use seekable::{SeekableReader, StreamError};
pub use source::ByteSource;
pub use window::SeekWindow;
