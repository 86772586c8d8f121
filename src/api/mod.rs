use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde_json::Value;
use thiserror::Error;

use crate::config::NetworkConfig;
use crate::internal::models::{Comment, Item, SortOrder, reply_things};

pub const DEFAULT_BASE_URL: &str = "https://www.reddit.com";

/// Failure of a content fetch. `Fetch` and `Status` are transport problems,
/// `Decode` means the response arrived but did not have the expected shape.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("unexpected response from {url}: {reason}")]
    Decode { url: String, reason: String },
}

impl ApiError {
    fn decode(url: &str, reason: impl ToString) -> Self {
        ApiError::Decode {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Source of listings and comment trees.
pub trait ContentProvider: Send + Sync {
    fn fetch_listing(&self, collection: &str, sort: SortOrder) -> Result<Vec<Item>, ApiError>;

    /// Top-level comments under `permalink`, each carrying its full subtree.
    fn fetch_comment_tree(&self, permalink: &str, sort: SortOrder)
    -> Result<Vec<Comment>, ApiError>;
}

/// A fetch a page asked for. Runs against any [`ContentProvider`].
#[derive(Debug, Clone, PartialEq)]
pub enum FetchRequest {
    Listing { collection: String, sort: SortOrder },
    Comments { permalink: String, sort: SortOrder },
}

#[derive(Debug)]
pub enum FetchResponse {
    Listing(Result<Vec<Item>, ApiError>),
    Comments(Result<Vec<Comment>, ApiError>),
}

impl FetchRequest {
    pub fn execute(&self, provider: &dyn ContentProvider) -> FetchResponse {
        match self {
            FetchRequest::Listing { collection, sort } => {
                FetchResponse::Listing(provider.fetch_listing(collection, *sort))
            }
            FetchRequest::Comments { permalink, sort } => {
                FetchResponse::Comments(provider.fetch_comment_tree(permalink, *sort))
            }
        }
    }
}

impl FetchResponse {
    pub fn error(&self) -> Option<&ApiError> {
        match self {
            FetchResponse::Listing(result) => result.as_ref().err(),
            FetchResponse::Comments(result) => result.as_ref().err(),
        }
    }
}

/// The comment endpoint has no `hot` order; its default ranking stands in.
fn comment_sort_param(sort: SortOrder) -> &'static str {
    match sort {
        SortOrder::Hot => "confidence",
        SortOrder::New => "new",
        SortOrder::Top => "top",
    }
}

/// Blocking HTTP client for the public JSON endpoints.
#[derive(Clone)]
pub struct RedditClient {
    client: Client,
    base_url: String,
}

impl RedditClient {
    pub fn new(config: &NetworkConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Client pointed at another host, e.g. a mock server.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn listing_url(&self, collection: &str, sort: SortOrder) -> String {
        format!(
            "{}/r/{}/{}.json",
            self.base_url,
            collection.trim_start_matches("r/"),
            sort
        )
    }

    pub fn comments_url(&self, permalink: &str, sort: SortOrder) -> String {
        format!(
            "{}{}.json?sort={}",
            self.base_url,
            permalink.trim_end_matches('/'),
            comment_sort_param(sort)
        )
    }

    fn get_json(&self, url: &str) -> Result<Value, ApiError> {
        tracing::debug!(url, "GET");
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|source| ApiError::Fetch {
                url: url.to_string(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                url: url.to_string(),
                status,
            });
        }

        resp.json::<Value>().map_err(|e| ApiError::decode(url, e))
    }
}

impl ContentProvider for RedditClient {
    fn fetch_listing(&self, collection: &str, sort: SortOrder) -> Result<Vec<Item>, ApiError> {
        let url = self.listing_url(collection, sort);
        let body = self.get_json(&url)?;

        let children = body
            .pointer("/data/children")
            .and_then(Value::as_array)
            .ok_or_else(|| ApiError::decode(&url, "listing has no children"))?;

        let items = children
            .iter()
            .map(Item::from_thing)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ApiError::decode(&url, e))?;

        tracing::info!(collection, %sort, count = items.len(), "listing fetched");
        Ok(items)
    }

    fn fetch_comment_tree(
        &self,
        permalink: &str,
        sort: SortOrder,
    ) -> Result<Vec<Comment>, ApiError> {
        let url = self.comments_url(permalink, sort);
        let body = self.get_json(&url)?;

        // The response holds the post listing followed by the comment listing;
        // only reply nodes are kept from either.
        let roots = body
            .as_array()
            .ok_or_else(|| ApiError::decode(&url, "expected an array of listings"))?;

        let comments = roots
            .iter()
            .flat_map(reply_things)
            .map(Comment::from_thing)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ApiError::decode(&url, e))?;

        tracing::info!(permalink, %sort, count = comments.len(), "comment tree fetched");
        Ok(comments)
    }
}
