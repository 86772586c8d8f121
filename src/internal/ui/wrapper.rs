use crate::internal::ui::viewport::ViewportMetrics;
use crate::utils::text::{normalize, truncate};

/// Turns free text into viewport-sized display lines and tracks how far the
/// reader has scrolled through them.
///
/// Text is normalised before wrapping: only printable ASCII, space and newline
/// survive, everything else is dropped. This is an intentional, lossy
/// limitation that keeps one character equal to one cell.
///
/// The window is `body_rows()` tall, not the full viewport height, because
/// the last row belongs to the status bar. Scrolling is bounded by
/// `max(lines - body_rows, 0)` accordingly.
#[derive(Debug, Clone, PartialEq)]
pub struct LineWrapper {
    source_text: String,
    lines: Vec<String>,
    scroll_offset: usize,
    viewport: ViewportMetrics,
}

impl LineWrapper {
    pub fn new(text: &str, viewport: ViewportMetrics) -> Self {
        let source_text = normalize(text);
        let lines = wrap_lines(&source_text, viewport.text_width());
        Self {
            source_text,
            lines,
            scroll_offset: 0,
            viewport,
        }
    }

    /// Replaces the text, keeping the scroll position where it still fits.
    pub fn set_text(&mut self, text: &str) {
        self.source_text = normalize(text);
        self.lines = wrap_lines(&self.source_text, self.viewport.text_width());
        self.clamp_offset();
    }

    /// Re-wraps the held text for a new viewport size.
    pub fn rewrap(&mut self, viewport: ViewportMetrics) {
        self.viewport = viewport;
        self.lines = wrap_lines(&self.source_text, viewport.text_width());
        self.clamp_offset();
    }

    pub fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        self.scroll_offset = (self.scroll_offset + 1).min(self.max_offset());
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll_offset = 0;
    }

    /// Lines currently on screen, starting at the scroll offset.
    pub fn visible(&self) -> &[String] {
        let end = (self.scroll_offset + self.viewport.body_rows()).min(self.lines.len());
        &self.lines[self.scroll_offset.min(end)..end]
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn max_offset(&self) -> usize {
        self.lines.len().saturating_sub(self.viewport.body_rows())
    }

    fn clamp_offset(&mut self) {
        self.scroll_offset = self.scroll_offset.min(self.max_offset());
    }
}

/// Wraps every paragraph independently to `width` cells. Empty paragraphs
/// become empty lines; words longer than `width` are hard-broken.
pub fn wrap_lines(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    text.split('\n')
        .flat_map(|paragraph| {
            textwrap::wrap(paragraph, width)
                .into_iter()
                .map(move |line| truncate(&line, width).to_string())
        })
        .collect()
}
