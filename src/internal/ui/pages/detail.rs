use std::sync::Arc;

use crate::api::{ApiError, ContentProvider, FetchRequest};
use crate::internal::models::{Comment, FetchState, Item, SortOrder};
use crate::internal::ui::app::Action;
use crate::internal::ui::pages::{Page, PageEffect, ThreadPage};
use crate::internal::ui::viewport::ViewportMetrics;
use crate::internal::ui::wrapper::LineWrapper;

/// Title and body of one item, plus the root comments fetched for it.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailPage {
    item: Item,
    root_comments: Arc<[Comment]>,
    sort: SortOrder,
    wrapper: LineWrapper,
    state: FetchState,
    viewport: ViewportMetrics,
    /// Order in effect before an unconfirmed sort change.
    rollback_sort: Option<SortOrder>,
}

fn detail_text(item: &Item, viewport: ViewportMetrics) -> String {
    format!(
        "{}\n{}\n{}",
        item.title,
        "-".repeat(viewport.text_width()),
        item.body
    )
}

impl DetailPage {
    pub fn new(item: Item, sort: SortOrder, viewport: ViewportMetrics) -> Self {
        let wrapper = LineWrapper::new(&detail_text(&item, viewport), viewport);
        Self {
            item,
            root_comments: Arc::from(Vec::new()),
            sort,
            wrapper,
            state: FetchState::Idle,
            viewport,
            rollback_sort: None,
        }
    }

    pub fn handle(&mut self, action: Action) -> PageEffect {
        match action {
            Action::ScrollUp => {
                self.scroll_up();
                PageEffect::None
            }
            Action::ScrollDown => {
                self.scroll_down();
                PageEffect::None
            }
            Action::Sort(order) => PageEffect::Fetch(self.set_sort_order(order)),
            Action::Open => self.open_thread().map_or(PageEffect::None, PageEffect::Push),
            _ => PageEffect::None,
        }
    }

    pub fn begin_load(&mut self) -> FetchRequest {
        tracing::info!(permalink = %self.item.permalink, sort = %self.sort, "loading comments");
        self.state = FetchState::Loading;
        self.wrapper.rewrap(self.window());
        FetchRequest::Comments {
            permalink: self.item.permalink.clone(),
            sort: self.sort,
        }
    }

    pub fn finish_load(&mut self, result: Result<Vec<Comment>, ApiError>) {
        match result {
            Ok(comments) => {
                self.root_comments = comments.into();
                self.state = FetchState::Idle;
                self.rollback_sort = None;
                self.wrapper.rewrap(self.window());
                self.rebuild_text();
            }
            Err(e) => {
                tracing::warn!(permalink = %self.item.permalink, error = %e, "comment fetch failed");
                if let Some(sort) = self.rollback_sort.take() {
                    self.sort = sort;
                }
                self.state = FetchState::Failed(e.to_string());
                self.wrapper.rewrap(self.window());
            }
        }
    }

    pub fn load(&mut self, provider: &dyn ContentProvider) {
        self.begin_load();
        let result = provider.fetch_comment_tree(&self.item.permalink, self.sort);
        self.finish_load(result);
    }

    /// Switches the order. The previous one comes back if the fetch fails.
    pub fn set_sort_order(&mut self, order: SortOrder) -> FetchRequest {
        self.rollback_sort.get_or_insert(self.sort);
        self.sort = order;
        self.begin_load()
    }

    pub fn scroll_up(&mut self) {
        self.wrapper.scroll_up();
    }

    pub fn scroll_down(&mut self) {
        self.wrapper.scroll_down();
    }

    /// Starts browsing the root comments. Not available until the comment
    /// fetch has finished.
    pub fn open_thread(&self) -> Option<Page> {
        if self.state.is_loading() {
            return None;
        }
        Some(Page::Thread(ThreadPage::new(
            self.root_comments.clone(),
            1,
            self.viewport,
        )))
    }

    pub fn rebuild_text(&mut self) {
        self.wrapper.set_text(&detail_text(&self.item, self.viewport));
    }

    pub fn resize(&mut self, viewport: ViewportMetrics) {
        self.viewport = viewport;
        self.wrapper.rewrap(self.window());
        self.rebuild_text();
    }

    /// Grid left for the text once an error line takes the top body row.
    fn window(&self) -> ViewportMetrics {
        match self.state {
            FetchState::Failed(_) => self.viewport.without_row(),
            _ => self.viewport,
        }
    }

    pub fn status_line(&self) -> String {
        match self.state {
            FetchState::Loading => format!("  loading comments [{}]...", self.sort),
            _ => format!(
                "  {} comments [{}]",
                self.root_comments.len(),
                self.sort
            ),
        }
    }

    pub fn item(&self) -> &Item {
        &self.item
    }

    pub fn root_comments(&self) -> &[Comment] {
        &self.root_comments
    }

    pub fn sort(&self) -> SortOrder {
        self.sort
    }

    pub fn wrapper(&self) -> &LineWrapper {
        &self.wrapper
    }

    pub fn state(&self) -> &FetchState {
        &self.state
    }
}
