use crate::constants;

/// A parsed `Content-Range` value, `bytes start-end/total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentRange {
    /// First byte of the range.
    pub start: u64,
    /// Number of bytes in the range, always positive.
    pub size: u64,
    /// Length of the complete resource, `None` when the server sent `*`.
    pub total: Option<u64>,
}

impl ContentRange {
    /// Parses a `Content-Range` header value.
    ///
    /// `url` is only used for error reports.
    pub fn parse(url: &str, value: &str) -> crate::Result<ContentRange> {
        let malformed = || crate::Error::invalid_http_range(url, value, "malformed header");

        let mut fields = value.split_whitespace();
        let (unit, spec) = match (fields.next(), fields.next(), fields.next()) {
            (Some(unit), Some(spec), None) => (unit, spec),
            _ => return Err(malformed()),
        };

        if unit != constants::BYTES_UNIT {
            return Err(crate::Error::invalid_http_range(
                url,
                value,
                format!("unsupported range type '{}'", unit),
            ));
        }

        let (start_end, total) = spec.split_once('/').ok_or_else(malformed)?;
        let (start, end) = start_end.split_once('-').ok_or_else(malformed)?;

        let start = parse_position(start).ok_or_else(malformed)?;
        let end = parse_position(end).ok_or_else(malformed)?;
        let total = match total {
            constants::UNKNOWN_TOTAL => None,
            total => Some(parse_position(total).ok_or_else(malformed)?),
        };

        if start > end {
            return Err(malformed());
        }

        let size = (end - start)
            .checked_add(1)
            .filter(|size| *size > 0 && start.checked_add(*size).is_some())
            .ok_or_else(|| crate::Error::invalid_http_range(url, value, "non-positive size"))?;

        Ok(ContentRange { start, size, total })
    }

    /// Offset one past the last byte of the range.
    pub fn end_exclusive(&self) -> u64 {
        self.start + self.size
    }
}

// Digits only: `u64::from_str` would also take a leading `+`.
fn parse_position(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
