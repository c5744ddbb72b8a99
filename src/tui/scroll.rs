//! Vertical offset into the quotes table.

/// Offset bounded by `max(0, ticker_count - visible_rows)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollOffset {
    offset: usize,
    visible_rows: usize,
}

impl ScrollOffset {
    pub fn new(visible_rows: usize) -> Self {
        Self {
            offset: 0,
            visible_rows,
        }
    }

    pub fn get(&self) -> usize {
        self.offset
    }

    /// Adopt a new table height (after a resize).
    pub fn set_visible_rows(&mut self, rows: usize) {
        self.visible_rows = rows;
    }

    pub fn increase(&mut self, step: usize, ticker_count: usize) {
        self.offset = self
            .offset
            .saturating_add(step)
            .min(self.max_offset(ticker_count));
    }

    pub fn decrease(&mut self, step: usize) {
        self.offset = self.offset.saturating_sub(step);
    }

    /// Pull the offset back in range after the ticker list shrank.
    pub fn clamp(&mut self, ticker_count: usize) {
        self.offset = self.offset.min(self.max_offset(ticker_count));
    }

    fn max_offset(&self, ticker_count: usize) -> usize {
        ticker_count.saturating_sub(self.visible_rows)
    }
}
