//! Listing queries, the raw post model, and the `PostSource` seam the
//! collector pulls pages through.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};

use crate::errors::ScrapeError;

/// Largest `limit` the listing endpoints honour.
pub const MAX_PAGE_SIZE: usize = 100;

/// Time window for `top` listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindow {
    All,
    Year,
    Month,
    Week,
}

impl TimeWindow {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeWindow::All => "all",
            TimeWindow::Year => "year",
            TimeWindow::Month => "month",
            TimeWindow::Week => "week",
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One listing method against the subreddit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingQuery {
    Hot,
    New,
    Top(TimeWindow),
    Search { term: String, sort: String },
}

impl ListingQuery {
    pub fn search(term: impl Into<String>) -> Self {
        ListingQuery::Search {
            term: term.into(),
            sort: "new".to_string(),
        }
    }

    /// Label used in the per-call summary log line.
    pub fn label(&self) -> String {
        match self {
            ListingQuery::Hot => "Hot Posts".to_string(),
            ListingQuery::New => "New Posts".to_string(),
            ListingQuery::Top(window) => format!("Top ({window})"),
            ListingQuery::Search { .. } => "Search Results".to_string(),
        }
    }

    /// Path segment under `/r/{subreddit}/`.
    pub fn endpoint(&self) -> &'static str {
        match self {
            ListingQuery::Hot => "hot",
            ListingQuery::New => "new",
            ListingQuery::Top(_) => "top",
            ListingQuery::Search { .. } => "search",
        }
    }

    /// The fixed collection order. Earlier queries win on duplicate ids.
    pub fn default_plan(search_term: &str) -> Vec<ListingQuery> {
        vec![
            ListingQuery::Hot,
            ListingQuery::New,
            ListingQuery::Top(TimeWindow::All),
            ListingQuery::Top(TimeWindow::Year),
            ListingQuery::Top(TimeWindow::Month),
            ListingQuery::Top(TimeWindow::Week),
            ListingQuery::search(search_term),
        ]
    }
}

/// A post as reported by the listing API.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RawPost {
    pub id: String,
    pub title: String,
    pub score: i64,
    pub upvote_ratio: f64,
    pub url: String,
    pub num_comments: i64,
    /// Epoch seconds
    pub created_utc: f64,
    #[serde(default, deserialize_with = "deleted_as_none")]
    pub author: Option<String>,
    #[serde(default)]
    pub link_flair_text: Option<String>,
    #[serde(default)]
    pub num_crossposts: i64,
}

fn deleted_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let author = Option::<String>::deserialize(deserializer)?;
    Ok(author.filter(|name| name != "[deleted]"))
}

/// One page of a listing plus the cursor for the next page.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub posts: Vec<RawPost>,
    /// `None` once the listing is exhausted
    pub after: Option<String>,
}

/// Anything that can serve listing pages: the live Reddit client, or a fake in tests.
#[async_trait]
pub trait PostSource {
    async fn fetch_page(
        &self,
        query: &ListingQuery,
        after: Option<&str>,
        page_size: usize,
    ) -> Result<Page, ScrapeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_plan_order_and_labels() {
        let labels: Vec<String> = ListingQuery::default_plan("technology")
            .iter()
            .map(ListingQuery::label)
            .collect();
        assert_eq!(
            labels,
            [
                "Hot Posts",
                "New Posts",
                "Top (all)",
                "Top (year)",
                "Top (month)",
                "Top (week)",
                "Search Results",
            ]
        );
    }

    #[test]
    fn deleted_author_becomes_none() {
        let post: RawPost = serde_json::from_value(serde_json::json!({
            "id": "abc",
            "title": "t",
            "score": 3,
            "upvote_ratio": 0.75,
            "url": "https://example.com",
            "num_comments": 1,
            "created_utc": 1_700_000_000.0,
            "author": "[deleted]",
            "link_flair_text": null,
            "num_crossposts": 0
        }))
        .expect("post");
        assert_eq!(post.author, None);
        assert_eq!(post.link_flair_text, None);
    }
}
