use std::io;

use bytes::Bytes;

use crate::constants;

/// A sequential, non-seekable source of response body bytes.
///
/// Implementations are positioned at the first byte of the body when handed
/// to [`handle_response`](crate::handle_response).
pub trait BodyStream {
    /// Reads up to `max` bytes.
    ///
    /// Fewer than `max` bytes are returned only when the end of the stream
    /// was reached; an empty chunk means the stream is exhausted.
    fn read(&mut self, max: usize) -> io::Result<Bytes>;

    /// Reads one line, including its terminating `\n`.
    ///
    /// The last line of a stream may come without terminator; an empty chunk
    /// means the stream is exhausted.
    fn read_line(&mut self) -> io::Result<Bytes>;
}

impl<T: BodyStream + ?Sized> BodyStream for &mut T {
    fn read(&mut self, max: usize) -> io::Result<Bytes> {
        (**self).read(max)
    }

    fn read_line(&mut self) -> io::Result<Bytes> {
        (**self).read_line()
    }
}

impl<T: BodyStream + ?Sized> BodyStream for Box<T> {
    fn read(&mut self, max: usize) -> io::Result<Bytes> {
        (**self).read(max)
    }

    fn read_line(&mut self) -> io::Result<Bytes> {
        (**self).read_line()
    }
}

/// A body that is already fully in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryBody {
    data: Bytes,
}

impl MemoryBody {
    pub fn new<B: Into<Bytes>>(data: B) -> MemoryBody {
        MemoryBody { data: data.into() }
    }

    /// Number of bytes not consumed yet.
    pub fn remaining(&self) -> usize {
        self.data.len()
    }
}

impl BodyStream for MemoryBody {
    fn read(&mut self, max: usize) -> io::Result<Bytes> {
        let len = max.min(self.data.len());
        Ok(self.data.split_to(len))
    }

    fn read_line(&mut self) -> io::Result<Bytes> {
        let len = match memchr::memchr(constants::LF, &self.data) {
            Some(idx) => idx + 1,
            None => self.data.len(),
        };
        Ok(self.data.split_to(len))
    }
}
