use http::header::{self, HeaderMap};
use http::StatusCode;

use crate::body::BodyStream;
use crate::content_range::ContentRange;
use crate::helpers;
use crate::range_file::RangeFile;
use crate::size_limit::SizeLimit;

/// How the body of a response maps onto the requested resource.
///
/// ```text
/// file: whole_file | single_range | multiple_range
/// whole_file: [content_length_header] data
/// single_range: content_range_header data
/// multiple_range: boundary_header boundary (content_range_header data boundary)+
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseShape {
    /// `200 OK`: the complete resource, with its length when announced.
    WholeFile { size: Option<u64> },
    /// `206 Partial Content` carrying one range.
    SingleRange { start: u64, size: u64 },
    /// `206 Partial Content` with a `multipart/byteranges` body.
    Multipart { boundary: String },
}

/// Decides what a response body contains from its status code and headers.
///
/// Header lookups are case-insensitive and use the first value of each
/// header. `url` is only used for error reports.
pub fn classify(url: &str, status: StatusCode, headers: &HeaderMap) -> crate::Result<ResponseShape> {
    match status {
        StatusCode::OK => {
            let size = match headers.get(header::CONTENT_LENGTH) {
                None => None,
                Some(value) => Some(
                    value
                        .to_str()
                        .ok()
                        .and_then(|value| value.trim().parse::<u64>().ok())
                        .ok_or_else(|| {
                            crate::Error::invalid_response(url, format!("invalid Content-Length {:?}", value))
                        })?,
                ),
            };
            Ok(ResponseShape::WholeFile { size })
        }
        StatusCode::PARTIAL_CONTENT => {
            // Without Content-Type the body is application/octet-stream
            // (RFC 2616 7.2.1), so never multipart.
            if let Some(content_type) = helpers::header_str(headers, &header::CONTENT_TYPE) {
                if is_byteranges(content_type) {
                    let boundary = crate::parse_boundary(content_type).ok_or_else(|| {
                        crate::Error::invalid_response(
                            url,
                            format!("no boundary in multipart Content-Type {:?}", content_type),
                        )
                    })?;
                    return Ok(ResponseShape::Multipart { boundary });
                }
            }

            let content_range = headers
                .get(header::CONTENT_RANGE)
                .ok_or_else(|| {
                    crate::Error::invalid_response(url, "missing the Content-Range header in a 206 range response")
                })?
                .to_str()
                .map_err(|_| crate::Error::invalid_response(url, "non-ASCII Content-Range header"))?;

            let range = ContentRange::parse(url, content_range)?;
            Ok(ResponseShape::SingleRange {
                start: range.start,
                size: range.size,
            })
        }
        status => Err(crate::Error::invalid_response(
            url,
            format!("unknown response code {}", status.as_u16()),
        )),
    }
}

/// Interprets the status code and headers of a response and wraps its body
/// in a [`RangeFile`] exposing the ranges it carries.
///
/// `body` must be positioned at the first byte of the response body. For a
/// multipart body the first boundary and part headers are consumed before
/// returning.
///
/// # Examples
///
/// ```
/// use byterange::http::{header, HeaderMap, HeaderValue, StatusCode};
/// use byterange::{handle_response, MemoryBody};
///
/// # fn run() -> byterange::Result<()> {
/// let mut headers = HeaderMap::new();
/// headers.insert(header::CONTENT_RANGE, HeaderValue::from_static("bytes 10-19/100"));
///
/// let body = MemoryBody::new("0123456789");
/// let mut file = handle_response("http://example.com/f", StatusCode::PARTIAL_CONTENT, &headers, body)?;
///
/// assert_eq!(file.tell(), 10);
/// assert_eq!(&file.read(10)?[..], b"0123456789");
/// assert!(file.read(1).is_err());
/// # Ok(())
/// # }
/// # run().unwrap();
/// ```
pub fn handle_response<U, S>(url: U, status: StatusCode, headers: &HeaderMap, body: S) -> crate::Result<RangeFile<S>>
where
    U: Into<String>,
    S: BodyStream,
{
    handle_response_with_size_limit(url, status, headers, body, SizeLimit::default())
}

/// Same as [`handle_response`] with custom read limits.
pub fn handle_response_with_size_limit<U, S>(
    url: U,
    status: StatusCode,
    headers: &HeaderMap,
    body: S,
    size_limit: SizeLimit,
) -> crate::Result<RangeFile<S>>
where
    U: Into<String>,
    S: BodyStream,
{
    let url = url.into();
    let shape = classify(&url, status, headers)?;
    log::debug!("{}: {} response handled as {:?}", url, status, shape);

    let mut file = RangeFile::with_size_limit(url, body, size_limit);
    match shape {
        ResponseShape::WholeFile { size } => file.set_range(0, size),
        ResponseShape::SingleRange { start, size } => file.set_range(start, Some(size)),
        ResponseShape::Multipart { boundary } => file.set_boundary(boundary)?,
    }

    Ok(file)
}

fn is_byteranges(content_type: &str) -> bool {
    content_type
        .parse::<mime::Mime>()
        .map(|m| helpers::is_byteranges(&m))
        .unwrap_or(false)
}
