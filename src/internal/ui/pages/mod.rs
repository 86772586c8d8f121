pub mod detail;
pub mod listing;
pub mod thread;

use crate::api::{ContentProvider, FetchRequest, FetchResponse};
use crate::internal::models::{FetchState, SortOrder};
use crate::internal::ui::app::Action;
use crate::internal::ui::keybindings::KeyBindingContext;
use crate::internal::ui::viewport::ViewportMetrics;

pub use detail::DetailPage;
pub use listing::ListingPage;
pub use thread::ThreadPage;

static IDLE: FetchState = FetchState::Idle;

/// Read-only settings a page consults while handling an action.
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    pub preferred: &'a [String],
    pub comment_sort: SortOrder,
}

/// What the application has to do after a page handled an action.
#[derive(Debug)]
pub enum PageEffect {
    None,
    Push(Page),
    Fetch(FetchRequest),
}

/// One navigable screen. Pages never point at each other; they only meet
/// through the navigation stack.
#[derive(Debug, Clone, PartialEq)]
pub enum Page {
    Listing(ListingPage),
    Detail(DetailPage),
    Thread(ThreadPage),
}

impl Page {
    /// Binding table the dispatcher consults for this page.
    pub fn context(&self) -> KeyBindingContext {
        match self {
            Page::Listing(_) => KeyBindingContext::Listing,
            Page::Detail(_) => KeyBindingContext::Detail,
            Page::Thread(_) => KeyBindingContext::Thread,
        }
    }

    /// Applies a page-level action. Actions a page has no use for are no-ops.
    pub fn handle(&mut self, action: Action, ctx: &PageContext<'_>) -> PageEffect {
        match self {
            Page::Listing(page) => page.handle(action, ctx),
            Page::Detail(page) => page.handle(action),
            Page::Thread(page) => page.handle(action),
        }
    }

    /// Marks the page as loading and returns the fetch it needs, if any.
    pub fn begin_load(&mut self) -> Option<FetchRequest> {
        match self {
            Page::Listing(page) => Some(page.begin_load()),
            Page::Detail(page) => Some(page.begin_load()),
            Page::Thread(_) => None,
        }
    }

    pub fn finish_load(&mut self, response: FetchResponse) {
        match (self, response) {
            (Page::Listing(page), FetchResponse::Listing(result)) => page.finish_load(result),
            (Page::Detail(page), FetchResponse::Comments(result)) => page.finish_load(result),
            (_, response) => {
                tracing::warn!(?response, "fetch response does not belong to this page");
            }
        }
    }

    /// Fetches and applies fresh content on the calling thread.
    pub fn load(&mut self, provider: &dyn ContentProvider) {
        match self.begin_load() {
            Some(request) => {
                let response = request.execute(provider);
                self.finish_load(response);
            }
            None => self.refresh(),
        }
    }

    /// Rebuilds the view from data the page already holds.
    pub fn refresh(&mut self) {
        match self {
            Page::Listing(page) => page.ensure_cursor_visible(),
            Page::Detail(page) => page.rebuild_text(),
            Page::Thread(page) => page.build_view(),
        }
    }

    pub fn resize(&mut self, viewport: ViewportMetrics) {
        match self {
            Page::Listing(page) => page.resize(viewport),
            Page::Detail(page) => page.resize(viewport),
            Page::Thread(page) => page.resize(viewport),
        }
    }

    pub fn state(&self) -> &FetchState {
        match self {
            Page::Listing(page) => page.state(),
            Page::Detail(page) => page.state(),
            Page::Thread(_) => &IDLE,
        }
    }

    pub fn status_line(&self) -> String {
        match self {
            Page::Listing(page) => page.status_line(),
            Page::Detail(page) => page.status_line(),
            Page::Thread(page) => page.status_line(),
        }
    }
}
