use std::sync::Arc;

use crate::internal::models::Comment;
use crate::internal::ui::app::Action;
use crate::internal::ui::pages::{Page, PageEffect};
use crate::internal::ui::viewport::ViewportMetrics;
use crate::internal::ui::wrapper::LineWrapper;

pub const NO_COMMENTS: &str = "No comments";
const DEPTH_MARKER: char = '#';

/// Browses one sibling list of the comment tree, one comment per screen.
/// Deeper replies open in a new page one level down.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadPage {
    siblings: Arc<[Comment]>,
    depth: usize,
    cursor: usize,
    wrapper: LineWrapper,
    viewport: ViewportMetrics,
}

impl ThreadPage {
    pub fn new(siblings: Arc<[Comment]>, depth: usize, viewport: ViewportMetrics) -> Self {
        let mut page = Self {
            siblings,
            depth: depth.max(1),
            cursor: 0,
            wrapper: LineWrapper::new("", viewport),
            viewport,
        };
        page.build_view();
        page
    }

    pub fn handle(&mut self, action: Action) -> PageEffect {
        match action {
            Action::NavigateUp => self.previous(),
            Action::NavigateDown => self.next(),
            Action::ScrollUp => self.wrapper.scroll_up(),
            Action::ScrollDown => self.wrapper.scroll_down(),
            Action::Open => {
                return self.descend().map_or(PageEffect::None, PageEffect::Push);
            }
            _ => {}
        }
        PageEffect::None
    }

    /// Text for the selected comment: score line, depth marker, blank line,
    /// body. The marker is never longer than the viewport is tall.
    pub fn view_text(&self) -> String {
        match self.siblings.get(self.cursor) {
            None => NO_COMMENTS.to_string(),
            Some(comment) => format!(
                "[{}/{}] {}\n{}\n\n{}",
                comment.upvotes,
                comment.downvotes,
                comment.author,
                DEPTH_MARKER
                    .to_string()
                    .repeat(self.viewport.rows.min(self.depth)),
                comment.body
            ),
        }
    }

    pub fn build_view(&mut self) {
        let text = self.view_text();
        self.wrapper.set_text(&text);
    }

    pub fn next(&mut self) {
        self.select(self.cursor + 1);
    }

    pub fn previous(&mut self) {
        self.select(self.cursor.saturating_sub(1));
    }

    fn select(&mut self, index: usize) {
        let Some(last) = self.siblings.len().checked_sub(1) else {
            return;
        };
        self.cursor = index.min(last);
        self.wrapper.scroll_to_top();
        self.build_view();
    }

    /// Opens the replies of the selected comment one level deeper.
    pub fn descend(&self) -> Option<Page> {
        let comment = self.siblings.get(self.cursor)?;
        tracing::debug!(depth = self.depth + 1, replies = comment.reply_count(), "descending");
        Some(Page::Thread(ThreadPage::new(
            comment.children.clone(),
            self.depth + 1,
            self.viewport,
        )))
    }

    pub fn scroll_up(&mut self) {
        self.wrapper.scroll_up();
    }

    pub fn scroll_down(&mut self) {
        self.wrapper.scroll_down();
    }

    pub fn resize(&mut self, viewport: ViewportMetrics) {
        self.viewport = viewport;
        self.wrapper.rewrap(viewport);
        self.build_view();
    }

    pub fn status_line(&self) -> String {
        match self.siblings.get(self.cursor) {
            None => format!("  depth {}", self.depth),
            Some(comment) => format!(
                "  depth {} | {}/{} | {} replies ({} below)",
                self.depth,
                self.cursor + 1,
                self.siblings.len(),
                comment.reply_count(),
                comment.descendant_count()
            ),
        }
    }

    pub fn siblings(&self) -> &[Comment] {
        &self.siblings
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn wrapper(&self) -> &LineWrapper {
        &self.wrapper
    }
}
