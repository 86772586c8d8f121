/// Size of the character grid the pages draw into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportMetrics {
    pub rows: usize,
    pub columns: usize,
}

impl ViewportMetrics {
    /// Both dimensions are clamped to at least one cell.
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows: rows.max(1),
            columns: columns.max(1),
        }
    }

    /// Widest line a page may produce; the last column stays free.
    pub fn text_width(&self) -> usize {
        self.columns.saturating_sub(1).max(1)
    }

    /// Rows above the status bar.
    pub fn body_rows(&self) -> usize {
        self.rows.saturating_sub(1).max(1)
    }

    /// Same grid with one body row taken, e.g. by an error line.
    pub fn without_row(&self) -> Self {
        Self::new(self.rows.saturating_sub(1), self.columns)
    }
}

impl Default for ViewportMetrics {
    fn default() -> Self {
        Self::new(24, 80)
    }
}
