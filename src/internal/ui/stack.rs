use thiserror::Error;

use crate::api::FetchRequest;
use crate::internal::ui::pages::Page;
use crate::internal::ui::viewport::ViewportMetrics;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("navigation stack is empty")]
pub struct EmptyStackError;

/// Identity of a pushed page. Fetch results are routed by id so a page that
/// was popped meanwhile is simply not found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(u64);

/// Ordered pages; the last one is active. The root page is never popped.
#[derive(Debug, Default)]
pub struct NavigationStack {
    pages: Vec<(PageId, Page)>,
    next_id: u64,
}

impl NavigationStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, page: Page) -> PageId {
        let id = PageId(self.next_id);
        self.next_id += 1;
        tracing::debug!(?id, depth = self.pages.len() + 1, "push page");
        self.pages.push((id, page));
        id
    }

    /// Removes the active page unless it is the root.
    pub fn pop(&mut self) -> Option<(PageId, Page)> {
        if self.pages.len() <= 1 {
            return None;
        }
        let popped = self.pages.pop();
        tracing::debug!(depth = self.pages.len(), "pop page");
        popped
    }

    pub fn top(&self) -> Result<&Page, EmptyStackError> {
        self.pages.last().map(|(_, page)| page).ok_or(EmptyStackError)
    }

    pub fn top_mut(&mut self) -> Result<&mut Page, EmptyStackError> {
        self.pages
            .last_mut()
            .map(|(_, page)| page)
            .ok_or(EmptyStackError)
    }

    pub fn top_id(&self) -> Result<PageId, EmptyStackError> {
        self.pages.last().map(|(id, _)| *id).ok_or(EmptyStackError)
    }

    pub fn get_mut(&mut self, id: PageId) -> Option<&mut Page> {
        self.pages
            .iter_mut()
            .find(|(page_id, _)| *page_id == id)
            .map(|(_, page)| page)
    }

    /// Redraws the active page from the data it holds.
    pub fn refresh(&mut self) -> Result<(), EmptyStackError> {
        self.top_mut()?.refresh();
        Ok(())
    }

    /// Starts reloading the active page. Pages that hold all their data are
    /// rebuilt in place and yield no request.
    pub fn reload(&mut self) -> Result<Option<(PageId, FetchRequest)>, EmptyStackError> {
        let id = self.top_id()?;
        let page = self.top_mut()?;
        match page.begin_load() {
            Some(request) => Ok(Some((id, request))),
            None => {
                page.refresh();
                Ok(None)
            }
        }
    }

    /// Propagates new terminal dimensions to every page.
    pub fn resize(&mut self, viewport: ViewportMetrics) {
        for (_, page) in &mut self.pages {
            page.resize(viewport);
        }
    }

    /// Number of pages, root included.
    pub fn depth(&self) -> usize {
        self.pages.len()
    }
}
