use http::header::{HeaderMap, HeaderName, HeaderValue};
use httparse::Header;

use crate::constants;

pub(crate) fn convert_raw_headers_to_header_map(url: &str, raw_headers: &[Header]) -> crate::Result<HeaderMap> {
    let mut headers = HeaderMap::with_capacity(raw_headers.len());

    for raw_header in raw_headers {
        let name = HeaderName::try_from(raw_header.name).map_err(|err| {
            crate::Error::invalid_response(url, format!("invalid part header name {:?}: {}", raw_header.name, err))
        })?;

        let value = HeaderValue::try_from(raw_header.value)
            .map_err(|err| crate::Error::invalid_response(url, format!("invalid value for part header {}: {}", name, err)))?;

        headers.append(name, value);
    }

    Ok(headers)
}

/// Returns the first value of `name` as text, if present and visible ASCII.
pub(crate) fn header_str<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|val| val.to_str().ok())
}

pub(crate) fn is_byteranges(m: &mime::Mime) -> bool {
    m.type_().as_str().eq_ignore_ascii_case(mime::MULTIPART.as_str())
        && m.subtype().as_str().eq_ignore_ascii_case(constants::BYTERANGES_SUBTYPE)
}
