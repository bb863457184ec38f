use std::io::{self, Read};

use bytes::{Bytes, BytesMut};

use crate::body::BodyStream;
use crate::constants;

/// A [`BodyStream`] over any blocking reader, typically a socket.
///
/// Data is pulled from the reader in chunks of at most 8 KiB and kept in an
/// internal buffer until it is consumed, so that lines can be split off
/// without reading the stream byte by byte.
#[derive(Debug)]
pub struct StreamBuffer<R> {
    pub(crate) eof: bool,
    pub(crate) buf: BytesMut,
    pub(crate) stream: R,
}

impl<R: Read> StreamBuffer<R> {
    pub fn new(stream: R) -> Self {
        StreamBuffer {
            eof: false,
            buf: BytesMut::new(),
            stream,
        }
    }

    /// Consumes the buffer, returning the reader and the bytes read from it
    /// but not consumed yet.
    pub fn into_parts(self) -> (R, Bytes) {
        (self.stream, self.buf.freeze())
    }

    // Appends at most one chunk from the reader to `buf`.
    fn fill(&mut self) -> io::Result<()> {
        if self.eof {
            return Ok(());
        }

        let old_len = self.buf.len();
        self.buf.resize(old_len + constants::IO_BUFFER_SIZE, 0);

        loop {
            match self.stream.read(&mut self.buf[old_len..]) {
                Ok(n) => {
                    self.buf.truncate(old_len + n);
                    if n == 0 {
                        self.eof = true;
                    }
                    return Ok(());
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    self.buf.truncate(old_len);
                    return Err(err);
                }
            }
        }
    }

    pub(crate) fn read_exact(&mut self, size: usize) -> Option<Bytes> {
        if size <= self.buf.len() {
            Some(self.buf.split_to(size).freeze())
        } else {
            None
        }
    }

    pub(crate) fn read_full_buf(&mut self) -> Bytes {
        self.buf.split_to(self.buf.len()).freeze()
    }
}

impl<R: Read> BodyStream for StreamBuffer<R> {
    fn read(&mut self, max: usize) -> io::Result<Bytes> {
        while self.buf.len() < max && !self.eof {
            self.fill()?;
        }

        match self.read_exact(max) {
            Some(bytes) => Ok(bytes),
            None => Ok(self.read_full_buf()),
        }
    }

    fn read_line(&mut self) -> io::Result<Bytes> {
        // Only the newly appended bytes need scanning.
        let mut scanned = 0;

        loop {
            if let Some(idx) = memchr::memchr(constants::LF, &self.buf[scanned..]) {
                return Ok(self.buf.split_to(scanned + idx + 1).freeze());
            }

            if self.eof {
                return Ok(self.read_full_buf());
            }

            if self.buf.len() > constants::MAX_LINE_LEN {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("line exceeds {} bytes", constants::MAX_LINE_LEN),
                ));
            }

            scanned = self.buf.len();
            self.fill()?;
        }
    }
}
