/// The slice of the resource currently exposed by a [`RangeFile`](crate::RangeFile).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RangeWindow {
    pub(crate) start: u64,
    /// `None` when the length is unknown and the window runs to the end of
    /// the stream.
    pub(crate) size: Option<u64>,
    pub(crate) pos: u64,
}

/// Where a [`RangeFile`](crate::RangeFile) stands relative to its current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderState {
    /// Bytes of the current window remain, or its size is unknown.
    InWindow,
    /// The current window is consumed and another part may follow.
    AtBoundary,
    /// The current window is consumed and no part can follow.
    Exhausted,
}

impl RangeWindow {
    pub(crate) fn new(start: u64, size: Option<u64>) -> RangeWindow {
        RangeWindow { start, size, pos: start }
    }

    /// Offset one past the last byte, when the size is known.
    pub(crate) fn end(&self) -> Option<u64> {
        self.size.map(|size| self.start.saturating_add(size))
    }

    pub(crate) fn remaining(&self) -> Option<u64> {
        self.end().map(|end| end.saturating_sub(self.pos))
    }

    pub(crate) fn at_end(&self) -> bool {
        self.end() == Some(self.pos)
    }

    pub(crate) fn state(&self, has_boundary: bool) -> ReaderState {
        match (self.at_end(), has_boundary) {
            (false, _) => ReaderState::InWindow,
            (true, true) => ReaderState::AtBoundary,
            (true, false) => ReaderState::Exhausted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_size_window() {
        let mut window = RangeWindow::new(10, Some(10));
        assert_eq!(window.end(), Some(20));
        assert_eq!(window.remaining(), Some(10));
        assert_eq!(window.state(false), ReaderState::InWindow);

        window.pos = 20;
        assert!(window.at_end());
        assert_eq!(window.state(true), ReaderState::AtBoundary);
        assert_eq!(window.state(false), ReaderState::Exhausted);
    }

    #[test]
    fn test_unknown_size_window() {
        let mut window = RangeWindow::new(0, None);
        window.pos = 1 << 20;
        assert_eq!(window.end(), None);
        assert_eq!(window.remaining(), None);
        assert!(!window.at_end());
        assert_eq!(window.state(false), ReaderState::InWindow);
    }

    #[test]
    fn test_empty_window_starts_at_boundary() {
        let window = RangeWindow::new(0, Some(0));
        assert!(window.at_end());
        assert_eq!(window.remaining(), Some(0));
        assert_eq!(window.state(false), ReaderState::Exhausted);
    }
}
