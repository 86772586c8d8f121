use crate::api::{ApiError, ContentProvider, FetchRequest};
use crate::internal::models::{FetchState, Item, SortOrder};
use crate::internal::ui::app::Action;
use crate::internal::ui::pages::{DetailPage, Page, PageContext, PageEffect};
use crate::internal::ui::viewport::ViewportMetrics;
use crate::utils::text::{normalize, truncate};

/// One rendered row of the listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingRow {
    pub text: String,
    pub selected: bool,
}

/// Scrollable list of a collection's items with a selection cursor.
///
/// The cursor always stays inside the visible window
/// `[scroll_offset, scroll_offset + window_rows - 1]`, where the window loses
/// one row to the error line while the last fetch failed.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingPage {
    collection: String,
    sort: SortOrder,
    items: Vec<Item>,
    scroll_offset: usize,
    cursor: usize,
    state: FetchState,
    viewport: ViewportMetrics,
    /// Collection and sort shown before an unconfirmed switch.
    rollback: Option<(String, SortOrder)>,
}

impl ListingPage {
    pub fn new(collection: impl Into<String>, sort: SortOrder, viewport: ViewportMetrics) -> Self {
        Self {
            collection: collection.into(),
            sort,
            items: Vec::new(),
            scroll_offset: 0,
            cursor: 0,
            state: FetchState::Idle,
            viewport,
            rollback: None,
        }
    }

    pub fn handle(&mut self, action: Action, ctx: &PageContext<'_>) -> PageEffect {
        match action {
            Action::NavigateUp => {
                self.move_cursor(-1);
                PageEffect::None
            }
            Action::NavigateDown => {
                self.move_cursor(1);
                PageEffect::None
            }
            Action::NextCollection => self
                .cycle_collection(1, ctx.preferred)
                .map_or(PageEffect::None, PageEffect::Fetch),
            Action::PrevCollection => self
                .cycle_collection(-1, ctx.preferred)
                .map_or(PageEffect::None, PageEffect::Fetch),
            Action::Sort(order) => PageEffect::Fetch(self.set_sort_order(order)),
            Action::Open => self
                .open_detail(ctx.comment_sort)
                .map_or(PageEffect::None, PageEffect::Push),
            _ => PageEffect::None,
        }
    }

    pub fn begin_load(&mut self) -> FetchRequest {
        tracing::info!(collection = %self.collection, sort = %self.sort, "loading listing");
        self.state = FetchState::Loading;
        FetchRequest::Listing {
            collection: self.collection.clone(),
            sort: self.sort,
        }
    }

    /// Replaces the items and resets the selection, or records the failure
    /// while keeping the previous items.
    pub fn finish_load(&mut self, result: Result<Vec<Item>, ApiError>) {
        match result {
            Ok(items) => {
                self.items = items;
                self.cursor = 0;
                self.scroll_offset = 0;
                self.state = FetchState::Idle;
                self.rollback = None;
            }
            Err(e) => {
                tracing::warn!(collection = %self.collection, error = %e, "listing fetch failed");
                if let Some((collection, sort)) = self.rollback.take() {
                    self.collection = collection;
                    self.sort = sort;
                }
                self.state = FetchState::Failed(e.to_string());
                self.ensure_cursor_visible();
            }
        }
    }

    pub fn load(&mut self, provider: &dyn ContentProvider) {
        self.begin_load();
        let result = provider.fetch_listing(&self.collection, self.sort);
        self.finish_load(result);
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let Some(last) = self.items.len().checked_sub(1) else {
            return;
        };
        self.cursor = self.cursor.saturating_add_signed(delta).min(last);

        let rows = self.window_rows();
        if delta > 0 {
            self.scroll_offset = self.scroll_offset.max((self.cursor + 1).saturating_sub(rows));
        } else if delta < 0 {
            self.scroll_offset = self.scroll_offset.min(self.cursor);
        }
    }

    /// Switches the order. The previous one comes back if the fetch fails.
    pub fn set_sort_order(&mut self, order: SortOrder) -> FetchRequest {
        self.remember_committed();
        self.sort = order;
        self.begin_load()
    }

    /// Switches the collection. The previous one comes back if the fetch
    /// fails.
    pub fn set_collection(&mut self, name: impl Into<String>) -> FetchRequest {
        self.remember_committed();
        self.collection = name.into();
        self.begin_load()
    }

    /// Keeps the last loaded collection and sort until a fetch settles.
    fn remember_committed(&mut self) {
        if self.rollback.is_none() {
            self.rollback = Some((self.collection.clone(), self.sort));
        }
    }

    /// Moves circularly through `preferred`. Does nothing when the current
    /// collection is not one of them; callers only offer cycling from a
    /// preferred collection.
    pub fn cycle_collection(
        &mut self,
        direction: isize,
        preferred: &[String],
    ) -> Option<FetchRequest> {
        let index = preferred.iter().position(|name| *name == self.collection)?;
        let next = (index as isize + direction).rem_euclid(preferred.len() as isize) as usize;
        Some(self.set_collection(preferred[next].clone()))
    }

    pub fn open_detail(&self, comment_sort: SortOrder) -> Option<Page> {
        let item = self.items.get(self.cursor)?;
        tracing::info!(title = %item.title, "opening item");
        Some(Page::Detail(DetailPage::new(
            item.clone(),
            comment_sort,
            self.viewport,
        )))
    }

    pub fn resize(&mut self, viewport: ViewportMetrics) {
        self.viewport = viewport;
        self.ensure_cursor_visible();
    }

    /// Pulls the scroll window back over the cursor after the row count
    /// changed.
    pub fn ensure_cursor_visible(&mut self) {
        let rows = self.window_rows();
        self.scroll_offset = self
            .scroll_offset
            .min(self.cursor)
            .max((self.cursor + 1).saturating_sub(rows));
    }

    /// Rows to draw, top to bottom, already cut to the text width.
    pub fn visible_rows(&self) -> Vec<ListingRow> {
        let width = self.viewport.text_width();
        self.items
            .iter()
            .enumerate()
            .skip(self.scroll_offset)
            .take(self.window_rows())
            .map(|(index, item)| {
                let text = normalize(&format!("[{:>4}] {}", item.score, item.title));
                ListingRow {
                    text: truncate(&text, width).to_string(),
                    selected: index == self.cursor,
                }
            })
            .collect()
    }

    /// Item rows on screen: the body, less the error line if one is shown.
    pub fn window_rows(&self) -> usize {
        match self.state {
            FetchState::Failed(_) => self.viewport.without_row().body_rows(),
            _ => self.viewport.body_rows(),
        }
    }

    pub fn status_line(&self) -> String {
        let mut status = format!("  {} [{}]", self.collection, self.sort);
        if self.state.is_loading() {
            status.push_str(" loading...");
        }
        status
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn sort(&self) -> SortOrder {
        self.sort
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn state(&self) -> &FetchState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internal::ui::pages::testing::FakeProvider;

    fn preferred() -> Vec<String> {
        ["all", "linux", "ubuntu"].map(String::from).to_vec()
    }

    fn loaded(count: usize, rows: usize) -> ListingPage {
        let mut page = ListingPage::new("all", SortOrder::Hot, ViewportMetrics::new(rows, 40));
        page.load(&FakeProvider::with_items(count));
        page
    }

    #[test]
    fn load_resets_cursor_and_scroll() {
        let mut page = loaded(30, 6);
        page.move_cursor(12);
        assert_ne!(page.scroll_offset(), 0);

        page.load(&FakeProvider::with_items(3));
        assert_eq!(page.items().len(), 3);
        assert_eq!(page.cursor(), 0);
        assert_eq!(page.scroll_offset(), 0);
        assert_eq!(page.state(), &FetchState::Idle);
    }

    #[test]
    fn cursor_is_clamped_to_items() {
        let mut page = loaded(3, 10);
        page.move_cursor(-1);
        assert_eq!(page.cursor(), 0);
        page.move_cursor(10);
        assert_eq!(page.cursor(), 2);
    }

    #[test]
    fn moving_down_scrolls_once_past_the_last_body_row() {
        // 6 rows -> 5 body rows
        let mut page = loaded(20, 6);
        for _ in 0..4 {
            page.move_cursor(1);
        }
        assert_eq!((page.cursor(), page.scroll_offset()), (4, 0));
        page.move_cursor(1);
        assert_eq!((page.cursor(), page.scroll_offset()), (5, 1));
    }

    #[test]
    fn moving_up_scrolls_back_to_cursor() {
        let mut page = loaded(20, 6);
        page.move_cursor(10);
        assert_eq!(page.scroll_offset(), 6);
        for _ in 0..5 {
            page.move_cursor(-1);
        }
        assert_eq!((page.cursor(), page.scroll_offset()), (5, 5));
    }

    #[test]
    fn empty_listing_ignores_cursor_moves() {
        let mut page = loaded(0, 6);
        page.move_cursor(1);
        page.move_cursor(-1);
        assert_eq!((page.cursor(), page.scroll_offset()), (0, 0));
        assert!(page.open_detail(SortOrder::Top).is_none());
    }

    #[test]
    fn cycle_wraps_around() {
        let mut page = ListingPage::new("ubuntu", SortOrder::Hot, ViewportMetrics::default());
        page.cycle_collection(1, &preferred());
        assert_eq!(page.collection(), "all");
        page.cycle_collection(-1, &preferred());
        assert_eq!(page.collection(), "ubuntu");
    }

    #[test]
    fn cycle_returns_fetch_for_new_collection() {
        let mut page = ListingPage::new("all", SortOrder::New, ViewportMetrics::default());
        let request = page.cycle_collection(1, &preferred());
        assert_eq!(
            request,
            Some(FetchRequest::Listing {
                collection: "linux".into(),
                sort: SortOrder::New
            })
        );
        assert!(page.state().is_loading());
    }

    #[test]
    fn cycle_from_unknown_collection_is_a_noop() {
        let mut page = ListingPage::new("rust", SortOrder::Hot, ViewportMetrics::default());
        assert!(page.cycle_collection(1, &preferred()).is_none());
        assert_eq!(page.collection(), "rust");
        assert_eq!(page.state(), &FetchState::Idle);
    }

    #[test]
    fn failed_load_keeps_items() {
        let mut page = loaded(4, 10);
        page.move_cursor(2);
        page.load(&FakeProvider {
            fail: true,
            ..FakeProvider::default()
        });
        assert!(matches!(page.state(), FetchState::Failed(msg) if msg.contains("broken")));
        assert_eq!(page.items().len(), 4);
        assert_eq!(page.cursor(), 2);
    }

    #[test]
    fn failed_collection_change_restores_previous_collection() {
        let mut page = loaded(4, 10);
        page.set_collection("typo");
        assert_eq!(page.collection(), "typo");
        page.finish_load(Err(ApiError::Decode {
            url: "fake://typo".into(),
            reason: "not a listing".into(),
        }));
        assert_eq!(page.collection(), "all");
        assert_eq!(page.status_line(), "  all [hot]");
        assert_eq!(page.items().len(), 4);
    }

    #[test]
    fn failed_cycle_and_sort_restore_what_was_loaded() {
        let failing = FakeProvider {
            fail: true,
            ..FakeProvider::default()
        };
        let mut page = loaded(4, 10);

        // two changes in flight, then one failure: back to the last load
        page.cycle_collection(1, &preferred());
        page.set_sort_order(SortOrder::Top);
        let result = failing.fetch_listing(page.collection(), page.sort());
        page.finish_load(result);
        assert_eq!((page.collection(), page.sort()), ("all", SortOrder::Hot));

        // the next change starts from the restored values
        page.cycle_collection(1, &preferred());
        assert_eq!(page.collection(), "linux");
    }

    #[test]
    fn successful_change_is_kept_after_later_failure() {
        let mut page = loaded(4, 10);
        page.set_sort_order(SortOrder::New);
        page.finish_load(Ok(vec![]));
        page.load(&FakeProvider {
            fail: true,
            ..FakeProvider::default()
        });
        assert_eq!(page.sort(), SortOrder::New);
    }

    #[test]
    fn failure_keeps_cursor_above_the_error_line() {
        // 6 rows -> 5 body rows, 4 while the error line is up
        let mut page = loaded(20, 6);
        page.move_cursor(4);
        assert_eq!((page.cursor(), page.scroll_offset()), (4, 0));

        page.load(&FakeProvider {
            fail: true,
            ..FakeProvider::default()
        });
        assert_eq!(page.window_rows(), 4);
        assert_eq!(page.scroll_offset(), 1);
        let rows = page.visible_rows();
        assert_eq!(rows.len(), 4);
        assert!(rows[3].selected);

        page.move_cursor(1);
        assert_eq!((page.cursor(), page.scroll_offset()), (5, 2));

        page.begin_load();
        assert_eq!(page.window_rows(), 5);
    }

    #[test]
    fn rows_show_right_aligned_score_and_highlight_cursor() {
        let mut page = loaded(3, 10);
        page.move_cursor(1);
        let rows = page.visible_rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].text, "[   0] item0");
        assert!(rows[1].selected);
        assert!(!rows[0].selected);
    }

    #[test]
    fn rows_are_cut_to_text_width() {
        let mut page = ListingPage::new("all", SortOrder::Hot, ViewportMetrics::new(5, 12));
        page.finish_load(Ok(vec![Item {
            title: "a very long title indeed".into(),
            score: 12345,
            permalink: "/x/".into(),
            body: String::new(),
        }]));
        assert_eq!(page.visible_rows()[0].text, "[12345] a v");
    }

    #[test]
    fn shrinking_keeps_cursor_visible() {
        let mut page = loaded(20, 12);
        page.move_cursor(9);
        assert_eq!(page.scroll_offset(), 0);
        page.resize(ViewportMetrics::new(4, 40));
        assert!(page.scroll_offset() <= page.cursor());
        assert!(page.cursor() < page.scroll_offset() + 3);
    }

    #[test]
    fn open_detail_uses_selected_item() {
        let mut page = loaded(3, 10);
        page.move_cursor(2);
        match page.open_detail(SortOrder::Top) {
            Some(Page::Detail(detail)) => assert_eq!(detail.item().title, "item2"),
            other => panic!("expected detail page, got {other:?}"),
        }
    }

    #[test]
    fn status_line_names_collection() {
        let mut page = ListingPage::new("linux", SortOrder::Top, ViewportMetrics::default());
        assert_eq!(page.status_line(), "  linux [top]");
        page.begin_load();
        assert!(page.status_line().ends_with("loading..."));
    }
}
