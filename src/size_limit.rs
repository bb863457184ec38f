use crate::constants;

/// Bounds on how much memory a single operation of a [`RangeFile`](crate::RangeFile)
/// may use, independent of the sizes requested by the caller.
///
/// # Examples
///
/// ```
/// use byterange::SizeLimit;
///
/// let limit = SizeLimit::new().max_read_size(64 * 1024).discard_chunk(4096);
/// # let _ = limit;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeLimit {
    pub(crate) max_read_size: usize,
    pub(crate) discard_chunk: usize,
    pub(crate) part_headers: usize,
}

impl SizeLimit {
    /// Creates the default limits: reads of at most 512 KiB per underlying
    /// call, 8 KiB discard chunks and 16 KiB per part header block.
    pub fn new() -> SizeLimit {
        SizeLimit::default()
    }

    /// Sets the largest request made to the underlying stream in one call.
    ///
    /// Bigger reads are served by several calls. Zero is clamped to one.
    pub fn max_read_size(mut self, limit: usize) -> SizeLimit {
        self.max_read_size = limit.max(1);
        self
    }

    /// Sets the chunk size used to drop bytes when seeking forward.
    ///
    /// Zero is clamped to one.
    pub fn discard_chunk(mut self, limit: usize) -> SizeLimit {
        self.discard_chunk = limit.max(1);
        self
    }

    /// Sets the maximum size of the header block preceding each part of a
    /// `multipart/byteranges` body.
    pub fn part_headers(mut self, limit: usize) -> SizeLimit {
        self.part_headers = limit;
        self
    }
}

impl Default for SizeLimit {
    fn default() -> Self {
        SizeLimit {
            max_read_size: constants::DEFAULT_MAX_READ_SIZE,
            discard_chunk: constants::DEFAULT_DISCARD_CHUNK_SIZE,
            part_headers: constants::DEFAULT_PART_HEADERS_SIZE_LIMIT,
        }
    }
}
