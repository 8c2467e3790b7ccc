use serde::Serialize;
use std::iter::FusedIterator;

///
/// BatchWindow
///
/// The `(skip, limit)` slice of the ordered result set covered by one batch.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
pub struct BatchWindow {
    pub skip: u64,
    pub limit: u64,
}

impl BatchWindow {
    #[must_use]
    pub const fn new(skip: u64, limit: u64) -> Self {
        Self { skip, limit }
    }

    /// Exclusive end index of the window.
    #[must_use]
    pub const fn end(&self) -> u64 {
        self.skip + self.limit
    }
}

///
/// Partition
///
/// Lazy walk over `[offset, to)` in steps of `batch_size`.
/// Yields full windows while at least `batch_size` records remain, then one
/// remainder window if anything is left. The cursor never passes `to`.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Partition {
    cursor: u64,
    to: u64,
    batch_size: u64,
}

impl Partition {
    /// Callers guarantee `batch_size > 0` and `offset <= to`.
    pub(crate) const fn new(offset: u64, to: u64, batch_size: u64) -> Self {
        debug_assert!(batch_size > 0);
        debug_assert!(offset <= to);

        Self {
            cursor: offset,
            to,
            batch_size,
        }
    }

    /// Start of the next window.
    #[must_use]
    pub const fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Windows not yet yielded.
    #[must_use]
    pub const fn remaining(&self) -> u64 {
        (self.to - self.cursor).div_ceil(self.batch_size)
    }
}

impl Iterator for Partition {
    type Item = BatchWindow;

    fn next(&mut self) -> Option<Self::Item> {
        let left = self.to - self.cursor;
        if left == 0 {
            return None;
        }

        let window = BatchWindow::new(self.cursor, left.min(self.batch_size));
        self.cursor = window.end();

        Some(window)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.remaining()).unwrap_or(usize::MAX);

        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Partition {}

impl FusedIterator for Partition {}
