use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_util::sync::CancellationToken;

use crate::api::{ContentProvider, FetchRequest, FetchResponse};
use crate::config::AppConfig;
use crate::internal::models::SortOrder;
use crate::internal::notification::Notification;
use crate::internal::ui::dispatcher::{CommandDispatcher, Dispatch};
use crate::internal::ui::keybinding_validator::detect_conflicts;
use crate::internal::ui::keybindings_default::create_default_keybindings;
use crate::internal::ui::command::LineCommand;
use crate::internal::ui::pages::{ListingPage, Page, PageContext, PageEffect};
use crate::internal::ui::stack::{NavigationStack, PageId};
use crate::internal::ui::view;
use crate::internal::ui::viewport::ViewportMetrics;

/// Everything a key can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Quit,
    Reload,
    Back,
    EnterCommand,
    NavigateUp,
    NavigateDown,
    Open,
    ScrollUp,
    ScrollDown,
    NextCollection,
    PrevCollection,
    Sort(SortOrder),
}

/// A finished fetch on its way back to the page that asked for it.
#[derive(Debug)]
pub struct FetchOutcome {
    page: PageId,
    token: CancellationToken,
    response: FetchResponse,
}

/// Owns the navigation stack and routes input, fetches and redraws.
pub struct App {
    running: bool,
    viewport: ViewportMetrics,
    stack: NavigationStack,
    dispatcher: CommandDispatcher,
    config: AppConfig,
    provider: Arc<dyn ContentProvider>,
    notification: Option<Notification>,
    inflight: HashMap<PageId, CancellationToken>,
    outcome_tx: UnboundedSender<FetchOutcome>,
    outcome_rx: UnboundedReceiver<FetchOutcome>,
}

impl App {
    /// Builds the key tables and pushes the root listing. Nothing is fetched
    /// until [`App::start`].
    pub fn new(
        config: AppConfig,
        provider: Arc<dyn ContentProvider>,
        viewport: ViewportMetrics,
    ) -> Self {
        let mut bindings = create_default_keybindings();
        bindings.merge_config(&config.keybindings);
        for conflict in detect_conflicts(&bindings, &config.keybindings) {
            tracing::warn!("Keybinding conflict: {}", conflict.description);
        }

        let mut stack = NavigationStack::new();
        stack.push(Page::Listing(ListingPage::new(
            config.default_collection.clone(),
            config.listing_sort,
            viewport,
        )));

        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();

        Self {
            running: true,
            viewport,
            stack,
            dispatcher: CommandDispatcher::new(bindings),
            config,
            provider,
            notification: None,
            inflight: HashMap::new(),
            outcome_tx,
            outcome_rx,
        }
    }

    /// Loads the root page. Must be called from within the runtime.
    pub fn start(&mut self) {
        self.reload();
    }

    pub async fn run(&mut self, mut tui: crate::tui::Tui) -> Result<()> {
        self.start();

        let mut event_interval = tokio::time::interval(Duration::from_millis(16));

        while self.running {
            if self
                .notification
                .as_ref()
                .is_some_and(Notification::is_expired)
            {
                self.notification = None;
            }

            if let Ok(size) = tui.size() {
                self.resize(size.height, size.width);
            }
            tui.draw(|f| view::draw(self, f))?;

            tokio::select! {
                _ = event_interval.tick() => {
                    if event::poll(Duration::from_millis(0))? {
                        match event::read()? {
                            Event::Key(key) if key.kind == KeyEventKind::Press => {
                                self.handle_key_event(key);
                            }
                            Event::Resize(columns, rows) => self.resize(rows, columns),
                            _ => {}
                        }
                    }
                }
                Some(outcome) = self.outcome_rx.recv() => {
                    self.handle_outcome(outcome);
                }
            }
        }

        self.cancel_all();
        Ok(())
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) {
        let context = match self.stack.top() {
            Ok(page) => page.context(),
            Err(e) => {
                tracing::error!("{e}");
                return;
            }
        };

        match self.dispatcher.dispatch(&key, context) {
            Dispatch::Action(action) => self.handle_action(action),
            Dispatch::Command(command) => self.run_line_command(command),
            Dispatch::Pending | Dispatch::Ignored => {}
        }
    }

    pub fn handle_action(&mut self, action: Action) {
        tracing::trace!(?action, "handle action");
        match action {
            Action::Quit => {
                tracing::info!("quit requested");
                self.running = false;
            }
            Action::Back => self.back(),
            Action::Reload => self.reload(),
            Action::EnterCommand => {}
            page_action => {
                let ctx = PageContext {
                    preferred: &self.config.preferred_collections,
                    comment_sort: self.config.comment_sort,
                };
                let effect = match self.stack.top_mut() {
                    Ok(page) => page.handle(page_action, &ctx),
                    Err(e) => {
                        tracing::error!("{e}");
                        return;
                    }
                };
                self.apply_effect(effect);
            }
        }
    }

    fn apply_effect(&mut self, effect: PageEffect) {
        match effect {
            PageEffect::None => {}
            PageEffect::Push(page) => {
                self.stack.push(page);
                self.reload();
            }
            PageEffect::Fetch(request) => match self.stack.top_id() {
                Ok(id) => self.request_load(id, request),
                Err(e) => tracing::error!("{e}"),
            },
        }
    }

    fn back(&mut self) {
        let Some((id, _)) = self.stack.pop() else {
            return;
        };
        if let Some(token) = self.inflight.remove(&id) {
            token.cancel();
        }
        if let Err(e) = self.stack.refresh() {
            tracing::error!("{e}");
        }
    }

    fn reload(&mut self) {
        match self.stack.reload() {
            Ok(Some((id, request))) => self.request_load(id, request),
            Ok(None) => {}
            Err(e) => tracing::error!("{e}"),
        }
    }

    fn run_line_command(&mut self, command: LineCommand) {
        tracing::debug!(?command, "line command");
        match (command.verb.as_str(), command.args.first()) {
            ("r", Some(name)) => {
                let request = match self.stack.top_mut() {
                    Ok(Page::Listing(listing)) => listing.set_collection(name.clone()),
                    Ok(_) => {
                        self.notify(Notification::info("Collections can only be changed from a listing"));
                        return;
                    }
                    Err(e) => {
                        tracing::error!("{e}");
                        return;
                    }
                };
                self.apply_effect(PageEffect::Fetch(request));
            }
            ("r", None) => self.notify(Notification::info("Usage: :r <collection>")),
            (verb, _) => self.notify(Notification::info(format!("Unknown command: {verb}"))),
        }
    }

    /// Runs the fetch on the blocking pool. A newer request for the same
    /// page cancels the older one.
    fn request_load(&mut self, page: PageId, request: FetchRequest) {
        let token = CancellationToken::new();
        if let Some(previous) = self.inflight.insert(page, token.clone()) {
            previous.cancel();
        }

        let provider = Arc::clone(&self.provider);
        let tx = self.outcome_tx.clone();
        tokio::task::spawn_blocking(move || {
            if token.is_cancelled() {
                return;
            }
            let response = request.execute(provider.as_ref());
            if tx
                .send(FetchOutcome {
                    page,
                    token,
                    response,
                })
                .is_err()
            {
                tracing::debug!("app gone before fetch finished");
            }
        });
    }

    /// Applies a finished fetch unless it was cancelled or its page has been
    /// popped since.
    pub fn handle_outcome(&mut self, outcome: FetchOutcome) {
        let FetchOutcome {
            page,
            token,
            response,
        } = outcome;

        if token.is_cancelled() {
            tracing::debug!(?page, "dropping cancelled fetch");
            return;
        }
        self.inflight.remove(&page);

        let Some(target) = self.stack.get_mut(page) else {
            tracing::debug!(?page, "page left the stack before its fetch finished");
            return;
        };

        if let Some(e) = response.error() {
            tracing::error!(error = %e, "fetch failed");
            self.notification = Some(Notification::error(e.to_string()));
        }
        target.finish_load(response);
    }

    /// Waits for the next finished fetch and applies it. Returns false once
    /// no fetch can arrive any more.
    pub async fn process_next_outcome(&mut self) -> bool {
        match self.outcome_rx.recv().await {
            Some(outcome) => {
                self.handle_outcome(outcome);
                true
            }
            None => false,
        }
    }

    pub fn resize(&mut self, rows: u16, columns: u16) {
        let viewport = ViewportMetrics::new(rows as usize, columns as usize);
        if viewport == self.viewport {
            return;
        }
        tracing::debug!(rows, columns, "resize");
        self.viewport = viewport;
        self.stack.resize(viewport);
    }

    fn notify(&mut self, notification: Notification) {
        self.notification = Some(notification);
    }

    fn cancel_all(&mut self) {
        for (_, token) in self.inflight.drain() {
            token.cancel();
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn stack(&self) -> &NavigationStack {
        &self.stack
    }

    pub fn viewport(&self) -> ViewportMetrics {
        self.viewport
    }

    pub fn command_text(&self) -> Option<&str> {
        self.dispatcher.command_text()
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    pub fn pending_fetches(&self) -> usize {
        self.inflight.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internal::models::FetchState;
    use crate::internal::ui::pages::testing::{FakeProvider, comment};
    use crossterm::event::{KeyCode, KeyModifiers};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::empty())
    }

    fn app_with(provider: FakeProvider) -> App {
        App::new(
            AppConfig::default(),
            Arc::new(provider),
            ViewportMetrics::new(10, 40),
        )
    }

    fn listing(app: &App) -> &ListingPage {
        match app.stack().top() {
            Ok(Page::Listing(listing)) => listing,
            other => panic!("expected listing on top, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn start_loads_root_listing() {
        let mut app = app_with(FakeProvider::with_items(3));
        app.start();
        assert!(listing(&app).state().is_loading());
        assert!(app.process_next_outcome().await);

        assert_eq!(listing(&app).items().len(), 3);
        assert_eq!(listing(&app).state(), &FetchState::Idle);
        assert_eq!(app.pending_fetches(), 0);
    }

    #[tokio::test]
    async fn open_and_back_walks_the_stack() {
        let mut provider = FakeProvider::with_items(2);
        provider.comments = vec![comment("alice", "first", vec![comment("bob", "reply", vec![])])];
        let mut app = app_with(provider);
        app.start();
        app.process_next_outcome().await;

        app.handle_key_event(press(KeyCode::Enter));
        assert_eq!(app.stack().depth(), 2);
        app.process_next_outcome().await;

        app.handle_key_event(press(KeyCode::Right));
        assert_eq!(app.stack().depth(), 3);
        match app.stack().top() {
            Ok(Page::Thread(thread)) => assert_eq!(thread.siblings().len(), 1),
            other => panic!("expected thread, got {other:?}"),
        }

        app.handle_key_event(press(KeyCode::Left));
        app.handle_key_event(press(KeyCode::Backspace));
        assert_eq!(app.stack().depth(), 1);
        app.handle_key_event(press(KeyCode::Left));
        assert_eq!(app.stack().depth(), 1);
    }

    #[tokio::test]
    async fn fetch_for_popped_page_is_discarded() {
        let mut app = app_with(FakeProvider::with_items(1));
        app.start();
        app.process_next_outcome().await;

        app.handle_key_event(press(KeyCode::Enter));
        app.handle_key_event(press(KeyCode::Left));
        assert_eq!(app.stack().depth(), 1);
        assert_eq!(app.pending_fetches(), 0);
        assert_eq!(listing(&app).items().len(), 1);
    }

    #[tokio::test]
    async fn failed_fetch_sets_error_state_and_notifies() {
        let mut app = app_with(FakeProvider {
            fail: true,
            ..FakeProvider::default()
        });
        app.start();
        app.process_next_outcome().await;

        assert!(matches!(listing(&app).state(), FetchState::Failed(_)));
        assert!(app.notification().is_some());
        assert!(app.is_running());
    }

    #[tokio::test]
    async fn command_line_switches_collection() {
        let mut app = app_with(FakeProvider::with_items(1));
        for c in ":r rust".chars() {
            app.handle_key_event(press(KeyCode::Char(c)));
        }
        assert_eq!(app.command_text(), Some(":r rust"));
        app.handle_key_event(press(KeyCode::Enter));

        assert_eq!(app.command_text(), None);
        assert_eq!(listing(&app).collection(), "rust");
        app.process_next_outcome().await;
        assert_eq!(listing(&app).items().len(), 1);
    }

    #[tokio::test]
    async fn unknown_command_only_notifies() {
        let mut app = app_with(FakeProvider::default());
        for c in ":zap".chars() {
            app.handle_key_event(press(KeyCode::Char(c)));
        }
        app.handle_key_event(press(KeyCode::Enter));
        assert_eq!(
            app.notification().map(Notification::message),
            Some("Unknown command: zap")
        );
        assert_eq!(app.pending_fetches(), 0);
    }

    #[tokio::test]
    async fn newer_request_supersedes_older() {
        let mut app = app_with(FakeProvider::with_items(2));
        app.start();
        app.handle_key_event(press(KeyCode::Char('n')));
        assert_eq!(app.pending_fetches(), 1);
        assert_eq!(listing(&app).sort(), SortOrder::New);

        // the superseded fetch may or may not report back
        while app.pending_fetches() > 0 {
            assert!(app.process_next_outcome().await);
        }
        assert_eq!(listing(&app).items().len(), 2);
        assert_eq!(app.pending_fetches(), 0);
    }

    #[test]
    fn quit_stops_the_loop() {
        let mut app = app_with(FakeProvider::default());
        app.handle_key_event(press(KeyCode::Char('q')));
        assert!(!app.is_running());
    }

    #[test]
    fn resize_reaches_every_page() {
        let mut app = app_with(FakeProvider::default());
        app.resize(30, 100);
        assert_eq!(app.viewport(), ViewportMetrics::new(30, 100));
    }
}
