use std::io::{self, SeekFrom};

use bytes::{Bytes, BytesMut};
use http::HeaderMap;

use crate::body::BodyStream;
use crate::content_range::ContentRange;
use crate::multipart::BoundaryReader;
use crate::size_limit::SizeLimit;
use crate::state::{RangeWindow, ReaderState};

/// Sequential access to the ranges carried by an HTTP response body.
///
/// Only one range is available at a given time and the stream can't be
/// rewound, so all accesses must happen at monotonically increasing offsets.
/// Seeking forward is emulated by reading and discarding data.
///
/// Build one with [`handle_response`](crate::handle_response), which inspects
/// the status code and headers and sets up the first range.
///
/// # Examples
///
/// ```
/// use byterange::{MemoryBody, RangeFile};
/// use std::io::SeekFrom;
///
/// # fn run() -> byterange::Result<()> {
/// let body = "--X\r\nContent-Range: bytes 0-4/100\r\n\r\nhello\r\n\
///             --X\r\nContent-Range: bytes 50-54/100\r\n\r\nworld\r\n--X--\r\n";
/// let mut file = RangeFile::new("http://example.com/big", MemoryBody::new(body));
/// file.set_boundary("X")?;
///
/// assert_eq!(&file.read(5)?[..], b"hello");
/// file.seek(SeekFrom::Start(52))?;
/// assert_eq!(&file.read(3)?[..], b"rld");
/// assert_eq!(file.tell(), 55);
/// # Ok(())
/// # }
/// # run().unwrap();
/// ```
#[derive(Debug)]
pub struct RangeFile<S> {
    url: String,
    body: S,
    multipart: Option<BoundaryReader>,
    closed: bool,
    part_headers: Option<HeaderMap>,
    window: RangeWindow,
    size_limit: SizeLimit,
}

impl<S: BodyStream> RangeFile<S> {
    /// Wraps a body positioned at its first byte, exposing it as the whole
    /// resource of unknown size.
    ///
    /// `url` is only used for error reports.
    pub fn new<U: Into<String>>(url: U, body: S) -> RangeFile<S> {
        RangeFile::with_size_limit(url, body, SizeLimit::default())
    }

    /// Same as [`RangeFile::new`] with custom read limits.
    pub fn with_size_limit<U: Into<String>>(url: U, body: S, size_limit: SizeLimit) -> RangeFile<S> {
        RangeFile {
            url: url.into(),
            body,
            multipart: None,
            closed: false,
            part_headers: None,
            window: RangeWindow::new(0, None),
            size_limit,
        }
    }

    /// Replaces the current window; the position moves to its start.
    ///
    /// A `size` of `None` exposes everything up to the end of the stream.
    pub fn set_range(&mut self, start: u64, size: Option<u64>) {
        log::debug!("{}: range set to start {} size {:?}", self.url, start, size);
        self.window = RangeWindow::new(start, size);
    }

    /// Parses a `Content-Range` value and installs the range it describes.
    pub fn set_range_from_header(&mut self, content_range: &str) -> crate::Result<()> {
        let range = ContentRange::parse(&self.url, content_range)?;
        self.set_range(range.start, Some(range.size));
        Ok(())
    }

    /// Switches to `multipart/byteranges` mode.
    ///
    /// The body must be at its first byte: the first boundary and header block
    /// are consumed and the first range installed.
    pub fn set_boundary<B: Into<String>>(&mut self, boundary: B) -> crate::Result<()> {
        self.multipart = Some(BoundaryReader::new(boundary));
        self.closed = false;

        match self.seek_to_next_range() {
            Err(_) if self.closed => Err(crate::Error::invalid_response(
                &self.url,
                "multipart response without any range",
            )),
            result => result,
        }
    }

    /// The url given at construction.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The multipart boundary, if the body is `multipart/byteranges`.
    pub fn boundary(&self) -> Option<&str> {
        self.multipart.as_ref().map(|reader| reader.boundary())
    }

    /// Headers of the multipart part currently read.
    pub fn part_headers(&self) -> Option<&HeaderMap> {
        self.part_headers.as_ref()
    }

    /// Start and size of the current range.
    pub fn range(&self) -> (u64, Option<u64>) {
        (self.window.start, self.window.size)
    }

    pub fn state(&self) -> ReaderState {
        self.window.state(self.has_next_range())
    }

    fn has_next_range(&self) -> bool {
        self.multipart.is_some() && !self.closed
    }

    /// Returns the current position in the resource.
    pub fn tell(&self) -> u64 {
        self.window.pos
    }

    /// Consumes the reader, returning the underlying body.
    ///
    /// Whatever follows the current position (the rest of the range, closing
    /// boundary) is left unread in it.
    pub fn into_inner(self) -> S {
        self.body
    }

    /// Reads `size` bytes at the current position.
    ///
    /// Reads never cross range boundaries: asking for more bytes than remain
    /// in the current range is an [`InvalidRange`](crate::ErrorKind::InvalidRange)
    /// error. Once a range is fully consumed the next read moves to the
    /// following part of a multipart body. When the size of the range is
    /// unknown, fewer bytes are returned at the end of the stream.
    pub fn read(&mut self, size: usize) -> crate::Result<Bytes> {
        self.read_range(Some(size as u64))
    }

    /// Reads everything left in the current range, or up to the end of the
    /// stream if its size is unknown.
    pub fn read_to_end_of_range(&mut self) -> crate::Result<Bytes> {
        self.read_range(None)
    }

    fn read_range(&mut self, size: Option<u64>) -> crate::Result<Bytes> {
        if self.window.at_end() {
            // An empty resource reads as empty, not as exhausted.
            if size == Some(0) || (self.window.size == Some(0) && !self.has_next_range()) {
                return Ok(Bytes::new());
            }
            self.seek_to_next_range()?;
        } else if self.window.pos < self.window.start {
            return Err(crate::Error::invalid_range(
                &self.url,
                self.window.pos,
                format!(
                    "can't read {:?} bytes before range ({}, {:?})",
                    size, self.window.start, self.window.size
                ),
            ));
        }

        let limited = match (self.window.remaining(), size) {
            (Some(remaining), Some(size)) => {
                if size > remaining {
                    return Err(crate::Error::invalid_range(
                        &self.url,
                        self.window.pos,
                        format!(
                            "read crosses range boundary: can't read {} bytes across range ({}, {:?})",
                            size, self.window.start, self.window.size
                        ),
                    ));
                }
                Some(size)
            }
            (Some(remaining), None) => Some(remaining),
            (None, size) => size,
        };

        let data = self.pump(limited)?;

        if let (Some(expected), Some(_)) = (limited, self.window.size) {
            let actual = data.len() as u64;
            if actual < expected {
                return Err(crate::Error::ShortRead {
                    url: self.url.clone(),
                    offset: self.window.pos,
                    expected,
                    actual,
                });
            }
        }

        self.window.pos += data.len() as u64;
        Ok(data)
    }

    // Reads `limit` bytes, or up to the end of the stream, in calls of at most
    // `max_read_size` bytes. Stops early at the end of the stream.
    fn pump(&mut self, limit: Option<u64>) -> crate::Result<Bytes> {
        let max_read_size = self.size_limit.max_read_size;
        let capacity = limit.map_or(max_read_size as u64, |limit| limit.min(max_read_size as u64));
        let mut buf = BytesMut::with_capacity(capacity as usize);
        let mut remaining = limit;

        while remaining != Some(0) {
            let want = remaining.map_or(max_read_size, |r| r.min(max_read_size as u64) as usize);
            let chunk = self
                .body
                .read(want)
                .map_err(|err| crate::Error::stream_read_failed(&self.url, err))?;

            buf.extend_from_slice(&chunk);
            remaining = remaining.map(|r| r - chunk.len() as u64);

            if chunk.len() < want {
                break;
            }
        }

        Ok(buf.freeze())
    }

    /// Moves to an absolute position, possibly in a later range.
    ///
    /// Seeking backward is an [`InvalidRange`](crate::ErrorKind::InvalidRange)
    /// error, as is seeking from the end when the size of the current range is
    /// unknown. Skipped bytes are read and discarded. Returns the new position.
    pub fn seek(&mut self, pos: SeekFrom) -> crate::Result<u64> {
        let current = self.window.pos;
        let target = match pos {
            SeekFrom::Start(offset) => i128::from(offset),
            SeekFrom::Current(offset) => i128::from(current) + i128::from(offset),
            SeekFrom::End(offset) => match self.window.end() {
                Some(end) => i128::from(end) + i128::from(offset),
                None => {
                    return Err(crate::Error::invalid_range(
                        &self.url,
                        current,
                        "can't seek from end while size is unknown",
                    ));
                }
            },
        };

        if target < i128::from(current) {
            return Err(crate::Error::invalid_range(
                &self.url,
                current,
                format!("cannot seek backward to {}", target),
            ));
        }

        let target = u64::try_from(target).map_err(|_| {
            crate::Error::invalid_range(&self.url, current, format!("seek target {} out of range", target))
        })?;

        while let Some(end) = self.window.end() {
            if target <= end {
                break;
            }
            let remaining = end - self.window.pos;
            if remaining > 0 {
                self.checked_discard(remaining)?;
            }
            self.seek_to_next_range()?;
        }

        // A new range may start past the target.
        if target > self.window.pos {
            self.checked_discard(target - self.window.pos)?;
        }

        Ok(self.window.pos)
    }

    // Drops `size` bytes, failing if the stream ends first.
    fn checked_discard(&mut self, size: u64) -> crate::Result<()> {
        log::trace!("{}: discarding {} bytes at {}", self.url, size, self.window.pos);

        let chunk_size = self.size_limit.discard_chunk as u64;
        let mut remaining = size;

        while remaining > 0 {
            let want = remaining.min(chunk_size);
            let data = self
                .body
                .read(want as usize)
                .map_err(|err| crate::Error::stream_read_failed(&self.url, err))?;

            remaining -= data.len() as u64;

            if (data.len() as u64) < want {
                return Err(crate::Error::ShortRead {
                    url: self.url.clone(),
                    offset: self.window.pos,
                    expected: size,
                    actual: size - remaining,
                });
            }
        }

        self.window.pos += size;
        Ok(())
    }

    fn seek_to_next_range(&mut self) -> crate::Result<()> {
        let reader = match &self.multipart {
            Some(reader) if !self.closed => reader,
            _ => return Err(self.exhausted()),
        };

        if !reader.read_boundary(&self.url, &mut self.body)? {
            log::debug!("{}: closing boundary reached at {}", self.url, self.window.pos);
            self.closed = true;
            return Err(self.exhausted());
        }
        let (headers, range) =
            reader.read_range_definition(&self.url, &mut self.body, self.size_limit.part_headers)?;

        self.part_headers = Some(headers);
        self.set_range(range.start, Some(range.size));
        Ok(())
    }
}

impl<S> RangeFile<S> {
    fn exhausted(&self) -> crate::Error {
        crate::Error::invalid_range(
            &self.url,
            self.window.pos,
            format!("range ({}, {:?}) exhausted", self.window.start, self.window.size),
        )
    }
}

impl<S: BodyStream> io::Read for RangeFile<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        // Empty parts are skipped.
        while self.window.at_end() {
            if self.state() == ReaderState::Exhausted {
                return Ok(0);
            }
            match self.seek_to_next_range() {
                Ok(()) => {}
                Err(_) if self.closed => return Ok(0),
                Err(err) => return Err(err.into()),
            }
        }

        let want = match self.window.remaining() {
            Some(remaining) => remaining.min(buf.len() as u64) as usize,
            None => buf.len(),
        };

        let data = self.read_range(Some(want as u64))?;
        buf[..data.len()].copy_from_slice(&data);
        Ok(data.len())
    }
}

impl<S: BodyStream> io::Seek for RangeFile<S> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        RangeFile::seek(self, pos).map_err(Into::into)
    }

    fn stream_position(&mut self) -> io::Result<u64> {
        Ok(self.tell())
    }
}
