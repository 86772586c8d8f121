use std::sync::Arc;

use tui_reddit_app::api::{ApiError, ContentProvider};
use tui_reddit_app::internal::models::{Comment, Item, SortOrder};
use tui_reddit_app::internal::ui::pages::{ListingPage, Page, PageContext, PageEffect};
use tui_reddit_app::internal::ui::app::Action;
use tui_reddit_app::internal::ui::stack::NavigationStack;
use tui_reddit_app::internal::ui::viewport::ViewportMetrics;

struct StaticProvider {
    items: Vec<Item>,
    comments: Vec<Comment>,
}

impl ContentProvider for StaticProvider {
    fn fetch_listing(&self, _collection: &str, _sort: SortOrder) -> Result<Vec<Item>, ApiError> {
        Ok(self.items.clone())
    }

    fn fetch_comment_tree(
        &self,
        _permalink: &str,
        _sort: SortOrder,
    ) -> Result<Vec<Comment>, ApiError> {
        Ok(self.comments.clone())
    }
}

fn comment(author: &str, children: Vec<Comment>) -> Comment {
    Comment {
        body: format!("{author} says hi"),
        upvotes: 2,
        downvotes: 0,
        author: author.to_string(),
        children: Arc::from(children),
    }
}

fn provider() -> StaticProvider {
    StaticProvider {
        items: (0..5)
            .map(|i| Item {
                title: format!("post {i}"),
                score: 100 - i,
                permalink: format!("/r/all/comments/{i}/"),
                body: "text".to_string(),
            })
            .collect(),
        comments: vec![
            comment("alice", vec![comment("bob", vec![comment("carol", vec![])])]),
            comment("dave", vec![]),
        ],
    }
}

/// Applies an action to the top page the way the application does,
/// loading pushed and refetched pages synchronously.
fn act(stack: &mut NavigationStack, provider: &StaticProvider, action: Action) {
    let preferred = vec!["all".to_string(), "rust".to_string()];
    let ctx = PageContext {
        preferred: &preferred,
        comment_sort: SortOrder::Top,
    };
    match stack.top_mut().unwrap().handle(action, &ctx) {
        PageEffect::None => {}
        PageEffect::Push(page) => {
            stack.push(page);
            stack.top_mut().unwrap().load(provider);
        }
        PageEffect::Fetch(request) => {
            let response = request.execute(provider);
            stack.top_mut().unwrap().finish_load(response);
        }
    }
}

fn viewport() -> ViewportMetrics {
    ViewportMetrics::new(12, 60)
}

#[test]
fn open_item_and_thread_then_return() {
    let provider = provider();
    let mut stack = NavigationStack::new();
    stack.push(Page::Listing(ListingPage::new("all", SortOrder::Hot, viewport())));
    stack.top_mut().unwrap().load(&provider);

    act(&mut stack, &provider, Action::NavigateDown);
    let listing_before = stack.top().unwrap().clone();

    act(&mut stack, &provider, Action::Open);
    assert_eq!(stack.depth(), 2);
    let Page::Detail(detail) = stack.top().unwrap() else {
        panic!("expected detail page");
    };
    assert_eq!(detail.item().title, "post 1");
    assert_eq!(detail.root_comments().len(), 2);
    assert_eq!(detail.sort(), SortOrder::Top);

    act(&mut stack, &provider, Action::Open);
    assert_eq!(stack.depth(), 3);
    let Page::Thread(thread) = stack.top().unwrap() else {
        panic!("expected thread page");
    };
    assert_eq!(thread.depth(), 1);
    assert_eq!(thread.siblings()[0].author, "alice");

    act(&mut stack, &provider, Action::Open);
    act(&mut stack, &provider, Action::Open);
    assert_eq!(stack.depth(), 5);
    let Page::Thread(deepest) = stack.top().unwrap() else {
        panic!("expected thread page");
    };
    assert_eq!(deepest.depth(), 3);
    assert_eq!(deepest.siblings()[0].author, "carol");

    for _ in 0..4 {
        stack.pop();
    }
    stack.refresh().unwrap();
    assert_eq!(stack.depth(), 1);
    assert_eq!(stack.top().unwrap(), &listing_before);
}

#[test]
fn thread_with_no_replies_shows_placeholder() {
    let provider = provider();
    let mut stack = NavigationStack::new();
    stack.push(Page::Listing(ListingPage::new("all", SortOrder::Hot, viewport())));
    stack.top_mut().unwrap().load(&provider);

    act(&mut stack, &provider, Action::Open);
    act(&mut stack, &provider, Action::Open);
    act(&mut stack, &provider, Action::NavigateDown);
    act(&mut stack, &provider, Action::Open);

    let Page::Thread(thread) = stack.top().unwrap() else {
        panic!("expected thread page");
    };
    assert!(thread.siblings().is_empty());
    assert_eq!(thread.wrapper().lines(), ["No comments"]);
}

#[test]
fn pop_on_root_changes_nothing() {
    let provider = provider();
    let mut stack = NavigationStack::new();
    stack.push(Page::Listing(ListingPage::new("all", SortOrder::Hot, viewport())));
    stack.top_mut().unwrap().load(&provider);
    let before = stack.top().unwrap().clone();

    assert!(stack.pop().is_none());
    assert_eq!(stack.depth(), 1);
    assert_eq!(stack.top().unwrap(), &before);
}

#[test]
fn cycling_collections_wraps_around() {
    let provider = provider();
    let mut stack = NavigationStack::new();
    stack.push(Page::Listing(ListingPage::new("all", SortOrder::Hot, viewport())));

    act(&mut stack, &provider, Action::PrevCollection);
    let Page::Listing(listing) = stack.top().unwrap() else {
        panic!("expected listing");
    };
    assert_eq!(listing.collection(), "rust");

    act(&mut stack, &provider, Action::NextCollection);
    let Page::Listing(listing) = stack.top().unwrap() else {
        panic!("expected listing");
    };
    assert_eq!(listing.collection(), "all");
    assert_eq!(listing.items().len(), 5);
}
