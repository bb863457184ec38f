use std::fmt::{self, Debug, Display, Formatter};
use std::io;

use derive_more::Display;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A set of errors that can occur while classifying a response and reading
/// its ranges.
///
/// Every variant carries the url of the response it was raised for. Use
/// [`Error::kind`] to branch on the broad category.
#[derive(Display)]
#[non_exhaustive]
pub enum Error {
    /// The response has a shape this reader can't handle: unknown status
    /// code, missing header, unexpected boundary line or part headers.
    #[display(fmt = "invalid http response for {}: {}", url, reason)]
    InvalidHttpResponse { url: String, reason: String },

    /// A `Content-Range` value is malformed.
    #[display(fmt = "invalid http range {:?} for {}: {}", range, url, reason)]
    InvalidHttpRange { url: String, range: String, reason: String },

    /// The reader was driven out of sequence: backward seek, read across a
    /// range boundary or past the last available range.
    #[display(fmt = "invalid range access in {} at {}: {}", url, offset, reason)]
    InvalidRange { url: String, offset: u64, reason: String },

    /// The stream ended before a range was fully delivered.
    #[display(
        fmt = "read {} bytes rather than {} bytes at {} for {}",
        actual,
        expected,
        offset,
        url
    )]
    ShortRead {
        url: String,
        offset: u64,
        expected: u64,
        actual: u64,
    },

    /// Reading from the underlying stream failed.
    #[display(fmt = "stream read failed for {}: {}", url, cause)]
    StreamReadFailed { url: String, cause: BoxError },
}

/// The broad category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidHttpResponse,
    InvalidHttpRange,
    InvalidRange,
    ShortRead,
    Io,
}

impl Error {
    pub(crate) fn invalid_response<R: Into<String>>(url: &str, reason: R) -> Error {
        Error::InvalidHttpResponse {
            url: url.to_owned(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_http_range<R: Into<String>>(url: &str, range: &str, reason: R) -> Error {
        Error::InvalidHttpRange {
            url: url.to_owned(),
            range: range.to_owned(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_range<R: Into<String>>(url: &str, offset: u64, reason: R) -> Error {
        Error::InvalidRange {
            url: url.to_owned(),
            offset,
            reason: reason.into(),
        }
    }

    pub(crate) fn stream_read_failed(url: &str, cause: io::Error) -> Error {
        Error::StreamReadFailed {
            url: url.to_owned(),
            cause: cause.into(),
        }
    }

    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidHttpResponse { .. } => ErrorKind::InvalidHttpResponse,
            Error::InvalidHttpRange { .. } => ErrorKind::InvalidHttpRange,
            Error::InvalidRange { .. } => ErrorKind::InvalidRange,
            Error::ShortRead { .. } => ErrorKind::ShortRead,
            Error::StreamReadFailed { .. } => ErrorKind::Io,
        }
    }

    /// Whether the response must be abandoned after this error.
    ///
    /// Only [`ErrorKind::InvalidRange`] leaves the stream where it was; it
    /// reports a sequencing mistake by the caller.
    pub fn is_fatal(&self) -> bool {
        self.kind() != ErrorKind::InvalidRange
    }

    /// The url of the response this error was raised for.
    pub fn url(&self) -> &str {
        match self {
            Error::InvalidHttpResponse { url, .. }
            | Error::InvalidHttpRange { url, .. }
            | Error::InvalidRange { url, .. }
            | Error::ShortRead { url, .. }
            | Error::StreamReadFailed { url, .. } => url,
        }
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::StreamReadFailed { cause, .. } => Some(cause.as_ref()),
            _ => None,
        }
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.to_string().eq(&other.to_string())
    }
}

impl Eq for Error {}

impl From<Error> for io::Error {
    fn from(err: Error) -> io::Error {
        let kind = match err.kind() {
            ErrorKind::ShortRead => io::ErrorKind::UnexpectedEof,
            ErrorKind::InvalidRange => io::ErrorKind::InvalidInput,
            ErrorKind::InvalidHttpResponse | ErrorKind::InvalidHttpRange => io::ErrorKind::InvalidData,
            ErrorKind::Io => io::ErrorKind::Other,
        };

        io::Error::new(kind, err)
    }
}
