//! A sequential reader for HTTP responses to byte-range requests.
//!
//! A client asking for one or more ranges of a remote resource may get back
//! the whole resource (`200`), a single range (`206` with `Content-Range`) or
//! several ranges in a `multipart/byteranges` body. [`handle_response`]
//! inspects the status code and headers and returns a [`RangeFile`] that
//! exposes the ranges as one forward-only stream over the resource offsets:
//! reads and seeks use positions in the resource, and the boundaries and part
//! headers of a multipart body are consumed transparently.
//!
//! The body is never buffered as a whole: reads are capped per call, forward
//! seeks discard data in small chunks, and a stream ending in the middle of a
//! range is reported as [`ErrorKind::ShortRead`] rather than a short result.
//!
//! # Examples
//!
//! ```
//! use byterange::http::{header, HeaderMap, HeaderValue, StatusCode};
//! use byterange::{handle_response, StreamBuffer};
//! use std::io::SeekFrom;
//!
//! # fn run() -> byterange::Result<()> {
//! let mut headers = HeaderMap::new();
//! headers.insert(
//!     header::CONTENT_TYPE,
//!     HeaderValue::from_static("multipart/byteranges; boundary=SEP"),
//! );
//!
//! let data: &[u8] = b"--SEP\r\nContent-Range: bytes 0-4/100\r\n\r\n01234\r\n\
//!                     --SEP\r\nContent-Range: bytes 50-54/100\r\n\r\nabcde\r\n--SEP--\r\n";
//! // Any `std::io::Read`, such as a `TcpStream`, can back the body.
//! let body = StreamBuffer::new(data);
//!
//! let mut file = handle_response("http://example.com/f", StatusCode::PARTIAL_CONTENT, &headers, body)?;
//! assert_eq!(&file.read(5)?[..], b"01234");
//! file.seek(SeekFrom::Start(52))?;
//! assert_eq!(&file.read(3)?[..], b"cde");
//! assert_eq!(file.tell(), 55);
//! # Ok(())
//! # }
//! # run().unwrap();
//! ```

pub use bytes;
pub use http;

pub use body::{BodyStream, MemoryBody};
pub use buffer::StreamBuffer;
pub use content_range::ContentRange;
pub use error::{Error, ErrorKind};
pub use range_file::RangeFile;
pub use response::{classify, handle_response, handle_response_with_size_limit, ResponseShape};
pub use size_limit::SizeLimit;
pub use state::ReaderState;

mod body;
mod buffer;
mod constants;
mod content_range;
mod error;
mod helpers;
mod multipart;
mod range_file;
mod response;
mod size_limit;
mod state;

/// A Result type often returned from methods that can have `byterange` errors.
pub type Result<T> = std::result::Result<T, Error>;

/// Parses a `multipart/byteranges` `Content-Type` value to extract the boundary.
///
/// Returns `None` for any other media type or when the boundary parameter is
/// missing.
pub fn parse_boundary<T: AsRef<str>>(content_type: T) -> Option<String> {
    let m = content_type.as_ref().parse::<mime::Mime>().ok()?;

    if !helpers::is_byteranges(&m) {
        return None;
    }

    m.get_param(mime::BOUNDARY)
        .map(|name| name.as_str().trim_matches('"').to_owned())
        .filter(|boundary| !boundary.is_empty())
}
