use std::io;

use bytes::{Bytes, BytesMut};
use http::header::{self, HeaderMap};

use crate::body::BodyStream;
use crate::content_range::ContentRange;
use crate::{constants, helpers};

/// Reads the delimiters of a `multipart/byteranges` body: boundary lines and
/// the header block in front of each part.
///
/// ```text
/// multiple_range: boundary (content_range_header data boundary)+
/// ```
#[derive(Debug, Clone)]
pub(crate) struct BoundaryReader {
    boundary: String,
    expected_line: String,
    closing_line: String,
}

impl BoundaryReader {
    pub(crate) fn new<B: Into<String>>(boundary: B) -> BoundaryReader {
        let boundary = boundary.into();
        let expected_line = constants::boundary_line(&boundary);
        let closing_line = constants::closing_line(&boundary);

        BoundaryReader {
            boundary,
            expected_line,
            closing_line,
        }
    }

    pub(crate) fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Consumes the boundary line starting the next part.
    ///
    /// Any number of bare CRLF lines may precede it (RFC 2616 19.2 allows them
    /// before the first boundary, they are tolerated before every one).
    /// Returns `false` when the closing delimiter was read instead.
    pub(crate) fn read_boundary<S: BodyStream>(&self, url: &str, body: &mut S) -> crate::Result<bool> {
        let mut line = read_line(url, body)?;
        while &line[..] == constants::CRLF.as_bytes() {
            log::trace!("skipping blank line before boundary in {}", url);
            line = read_line(url, body)?;
        }

        if &line[..] == self.expected_line.as_bytes() {
            return Ok(true);
        }

        if strip_line_break(&line) == self.closing_line.as_bytes() {
            return Ok(false);
        }

        // Compatibility: IIS 6 and 7 wrap the boundary token in angle brackets
        // on the delimiter line while announcing it bare in Content-Type.
        if let Some(unquoted) = unquote_boundary_line(&line) {
            if unquoted == self.expected_line.as_bytes() {
                log::warn!("accepting quoted boundary line {:?} in {}", String::from_utf8_lossy(&line), url);
                return Ok(true);
            }
        }

        Err(crate::Error::invalid_response(
            url,
            format!(
                "expected boundary line for {:?}, got {:?}",
                self.boundary,
                String::from_utf8_lossy(&line)
            ),
        ))
    }

    /// Consumes the header block of a part, including the blank line ending it,
    /// and returns its headers with the range it announces.
    pub(crate) fn read_range_definition<S: BodyStream>(
        &self,
        url: &str,
        body: &mut S,
        size_limit: usize,
    ) -> crate::Result<(HeaderMap, ContentRange)> {
        let block = read_header_block(url, body, size_limit)?;

        let mut raw_headers = [httparse::EMPTY_HEADER; constants::MAX_HEADERS];
        let headers = match httparse::parse_headers(&block, &mut raw_headers) {
            Ok(httparse::Status::Complete((_, raw_headers))) => {
                helpers::convert_raw_headers_to_header_map(url, raw_headers)?
            }
            Ok(httparse::Status::Partial) => {
                return Err(crate::Error::invalid_response(url, "incomplete part headers"));
            }
            Err(err) => {
                return Err(crate::Error::invalid_response(
                    url,
                    format!("failed to read part headers: {}", err),
                ));
            }
        };

        let content_range = helpers::header_str(&headers, &header::CONTENT_RANGE)
            .ok_or_else(|| crate::Error::invalid_response(url, "missing Content-Range in part"))?;
        let range = ContentRange::parse(url, content_range)?;

        Ok((headers, range))
    }
}

fn read_line<S: BodyStream>(url: &str, body: &mut S) -> crate::Result<Bytes> {
    let line = body
        .read_line()
        .map_err(|err| line_read_failed(url, err))?;

    if line.is_empty() {
        return Err(crate::Error::invalid_response(
            url,
            "expected boundary line, got end of stream",
        ));
    }

    Ok(line)
}

// Reads lines up to and including the first blank one.
fn read_header_block<S: BodyStream>(url: &str, body: &mut S, size_limit: usize) -> crate::Result<Bytes> {
    let mut block = BytesMut::new();

    loop {
        let line = body
            .read_line()
            .map_err(|err| line_read_failed(url, err))?;

        if line.is_empty() {
            return Err(crate::Error::invalid_response(url, "incomplete part headers"));
        }

        if block.len() + line.len() > size_limit {
            return Err(crate::Error::invalid_response(
                url,
                format!("part headers exceed {} bytes", size_limit),
            ));
        }

        block.extend_from_slice(&line);

        if &line[..] == constants::CRLF.as_bytes() || &line[..] == b"\n" {
            return Ok(block.freeze());
        }
    }
}

// An overlong line is a malformed response, not a transport failure.
fn line_read_failed(url: &str, err: io::Error) -> crate::Error {
    if err.kind() == io::ErrorKind::InvalidData {
        crate::Error::invalid_response(url, format!("unreadable multipart line: {}", err))
    } else {
        crate::Error::stream_read_failed(url, err)
    }
}

fn strip_line_break(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Strips one pair of `<>` or `""` around the token of a delimiter line.
fn unquote_boundary_line(line: &[u8]) -> Option<Vec<u8>> {
    let prefix = constants::BOUNDARY_EXT.as_bytes();
    let suffix = constants::CRLF.as_bytes();

    let token = line.strip_prefix(prefix)?.strip_suffix(suffix)?;
    let inner = match token {
        [b'<', inner @ .., b'>'] | [b'"', inner @ .., b'"'] => inner,
        _ => return None,
    };

    let mut unquoted = Vec::with_capacity(line.len());
    unquoted.extend_from_slice(prefix);
    unquoted.extend_from_slice(inner);
    unquoted.extend_from_slice(suffix);
    Some(unquoted)
}
