use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::{Display, EnumString};

use crate::utils::text::decode_entities;

/// Listing `kind` of a reply node. Everything else (`more` stubs, the post
/// itself) is skipped while building a comment tree.
pub const REPLY_KIND: &str = "t1";

/// Sort order used both for listings and for comment trees.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SortOrder {
    #[default]
    Hot,
    New,
    Top,
}

/// One entry of a collection listing.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Item {
    pub title: String,
    pub score: i64,
    pub permalink: String,
    #[serde(rename = "selftext", default = "default_body")]
    pub body: String,
}

fn default_body() -> String {
    "None".to_string()
}

impl Item {
    /// Builds an item from a listing child (`{"kind": "t3", "data": {...}}`).
    pub fn from_thing(thing: &Value) -> Result<Self, serde_json::Error> {
        let mut item = Item::deserialize(&thing["data"])?;
        item.title = decode_entities(&item.title);
        item.body = decode_entities(&item.body);
        Ok(item)
    }
}

#[derive(Debug, Deserialize)]
struct CommentData {
    body: String,
    ups: i64,
    #[serde(default)]
    downs: i64,
    author: String,
    #[serde(default)]
    replies: Value,
}

/// A node of a comment tree. The tree is built once, at fetch time, and never
/// mutated afterwards; child lists are shared so a thread page can hold a
/// sibling list without copying the subtree below it.
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub body: String,
    pub upvotes: i64,
    pub downvotes: i64,
    pub author: String,
    pub children: Arc<[Comment]>,
}

impl Comment {
    /// Builds a comment and its whole reply subtree from a `t1` thing.
    pub fn from_thing(thing: &Value) -> Result<Self, serde_json::Error> {
        let data = CommentData::deserialize(&thing["data"])?;
        let children = reply_things(&data.replies)
            .map(Comment::from_thing)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            body: decode_entities(&data.body),
            upvotes: data.ups,
            downvotes: data.downs,
            author: data.author,
            children: children.into(),
        })
    }

    /// Number of direct replies.
    pub fn reply_count(&self) -> usize {
        self.children.len()
    }

    /// Number of comments in the subtree below this one.
    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| 1 + child.descendant_count())
            .sum()
    }
}

/// Iterates the reply-kind children of a listing value. A missing listing
/// (the API sends `""` for comments without replies) yields nothing.
pub fn reply_things(listing: &Value) -> impl Iterator<Item = &Value> {
    listing
        .pointer("/data/children")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter(|thing| thing.get("kind").and_then(Value::as_str) == Some(REPLY_KIND))
}

/// Load state of a page's content.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FetchState {
    #[default]
    Idle,
    Loading,
    Failed(String),
}

impl FetchState {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    fn comment_json(body: &str, replies: Value) -> Value {
        json!({
            "kind": "t1",
            "data": { "body": body, "ups": 3, "downs": 0, "author": "someone", "replies": replies }
        })
    }

    #[test]
    fn sort_order_parses_and_displays_lowercase() {
        assert_eq!(SortOrder::from_str("top").unwrap(), SortOrder::Top);
        assert_eq!(SortOrder::from_str("NEW").unwrap(), SortOrder::New);
        assert_eq!(SortOrder::Hot.to_string(), "hot");
        assert!(SortOrder::from_str("rising").is_err());
    }

    #[test]
    fn item_defaults_missing_body() {
        let thing = json!({
            "kind": "t3",
            "data": { "title": "Rust &amp; you", "score": 42, "permalink": "/r/rust/comments/x/y/" }
        });
        let item = Item::from_thing(&thing).unwrap();
        assert_eq!(item.title, "Rust & you");
        assert_eq!(item.body, "None");
        assert_eq!(item.score, 42);
    }

    #[test]
    fn item_missing_title_is_an_error() {
        let thing = json!({ "kind": "t3", "data": { "score": 1, "permalink": "/x/" } });
        assert!(Item::from_thing(&thing).is_err());
    }

    #[test]
    fn comment_without_replies_has_no_children() {
        let comment = Comment::from_thing(&comment_json("leaf", json!(""))).unwrap();
        assert_eq!(comment.body, "leaf");
        assert_eq!(comment.reply_count(), 0);
        assert_eq!(comment.descendant_count(), 0);
    }

    #[test]
    fn comment_tree_skips_more_stubs_at_every_level() {
        let grandchild = comment_json("grandchild", json!(""));
        let child = comment_json(
            "child",
            json!({ "kind": "Listing", "data": { "children": [
                grandchild,
                { "kind": "more", "data": { "count": 4 } }
            ]}}),
        );
        let root = comment_json(
            "root",
            json!({ "kind": "Listing", "data": { "children": [
                child,
                { "kind": "more", "data": { "count": 9 } }
            ]}}),
        );

        let comment = Comment::from_thing(&root).unwrap();
        assert_eq!(comment.reply_count(), 1);
        assert_eq!(comment.children[0].body, "child");
        assert_eq!(comment.children[0].children[0].body, "grandchild");
        assert_eq!(comment.descendant_count(), 2);
    }

    #[test]
    fn fetch_state_loading_flag() {
        assert!(FetchState::Loading.is_loading());
        assert!(!FetchState::Failed("x".into()).is_loading());
        assert_eq!(FetchState::default(), FetchState::Idle);
    }
}
