pub(crate) const DEFAULT_MAX_READ_SIZE: usize = 512 * 1024;
pub(crate) const DEFAULT_DISCARD_CHUNK_SIZE: usize = 8 * 1024;
pub(crate) const DEFAULT_PART_HEADERS_SIZE_LIMIT: usize = 16 * 1024;

pub(crate) const IO_BUFFER_SIZE: usize = 8 * 1024;
pub(crate) const MAX_LINE_LEN: usize = 64 * 1024;

pub(crate) const MAX_HEADERS: usize = 32;
pub(crate) const BOUNDARY_EXT: &str = "--";
pub(crate) const CRLF: &str = "\r\n";
pub(crate) const LF: u8 = b'\n';

pub(crate) const BYTES_UNIT: &str = "bytes";
pub(crate) const BYTERANGES_SUBTYPE: &str = "byteranges";
pub(crate) const UNKNOWN_TOTAL: &str = "*";

/// The exact line expected before each part of a `multipart/byteranges` body.
pub(crate) fn boundary_line(boundary: &str) -> String {
    format!("{}{}{}", BOUNDARY_EXT, boundary, CRLF)
}

/// The line ending a `multipart/byteranges` body, without its line break.
pub(crate) fn closing_line(boundary: &str) -> String {
    format!("{}{}{}", BOUNDARY_EXT, boundary, BOUNDARY_EXT)
}
