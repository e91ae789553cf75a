//! collector.rs
//!
//! Core collection logic: page through each listing method, drop posts whose
//! id was already collected, estimate vote splits, and accumulate output rows.

use std::collections::HashSet;

use chrono::DateTime;
use serde::Serialize;
use tracing::{debug, info};

use crate::errors::ScrapeError;
use crate::metrics::{DUPLICATES_SKIPPED, POSTS_ACCEPTED};
use crate::source::{ListingQuery, PostSource, RawPost, MAX_PAGE_SIZE};
use crate::votes::estimate;

/// One output row. Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostRow {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Upvotes")]
    pub upvotes: i64,
    #[serde(rename = "Downvotes")]
    pub downvotes: i64,
    /// `upvotes - downvotes`
    #[serde(rename = "Score")]
    pub score: i64,
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "URL")]
    pub url: String,
    #[serde(rename = "Comments")]
    pub comments: i64,
    /// `YYYY-MM-DD` in UTC
    #[serde(rename = "Created_UTC")]
    pub created: String,
    #[serde(rename = "Author")]
    pub author: Option<String>,
    #[serde(rename = "Flair")]
    pub flair: Option<String>,
    #[serde(rename = "Shares")]
    pub shares: i64,
}

impl PostRow {
    pub fn from_post(post: RawPost) -> Self {
        let (upvotes, downvotes) = estimate(post.score, post.upvote_ratio);
        PostRow {
            title: post.title,
            upvotes,
            downvotes,
            score: upvotes.saturating_sub(downvotes),
            id: post.id,
            url: post.url,
            comments: post.num_comments,
            created: utc_date(post.created_utc),
            author: post.author,
            flair: post.link_flair_text,
            shares: post.num_crossposts,
        }
    }
}

fn utc_date(epoch_secs: f64) -> String {
    DateTime::from_timestamp(epoch_secs.floor() as i64, 0)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Rows collected so far plus the ids already taken. Lives for one run.
#[derive(Debug, Default)]
pub struct Collection {
    rows: Vec<PostRow>,
    seen_ids: HashSet<String>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a post unless its id was already collected. Returns whether it was added.
    pub fn insert(&mut self, post: RawPost) -> bool {
        if self.seen_ids.contains(&post.id) {
            DUPLICATES_SKIPPED.inc();
            return false;
        }
        self.seen_ids.insert(post.id.clone());
        self.rows.push(PostRow::from_post(post));
        POSTS_ACCEPTED.inc();
        true
    }

    pub fn rows(&self) -> &[PostRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_rows(self) -> Vec<PostRow> {
        self.rows
    }
}

/// Drives listing queries against a [`PostSource`], capped per query.
pub struct Collector<'a, S> {
    source: &'a S,
    limit: usize,
}

impl<'a, S: PostSource> Collector<'a, S> {
    pub fn new(source: &'a S, limit: usize) -> Self {
        Self { source, limit }
    }

    /// Run one listing query, appending unseen posts to `collection`.
    ///
    /// At most `limit` raw posts are consumed from the source, and collection
    /// stops early once `limit` new posts have been accepted or the listing
    /// runs dry. Returns the number of posts accepted.
    pub async fn fetch(
        &self,
        collection: &mut Collection,
        query: &ListingQuery,
        label: &str,
    ) -> Result<usize, ScrapeError> {
        let mut accepted = 0;
        let mut consumed = 0;
        let mut after: Option<String> = None;

        'pages: while consumed < self.limit {
            let page_size = (self.limit - consumed).min(MAX_PAGE_SIZE);
            let page = self
                .source
                .fetch_page(query, after.as_deref(), page_size)
                .await?;

            if page.posts.is_empty() {
                break;
            }

            for post in page.posts {
                if consumed >= self.limit {
                    break 'pages;
                }
                consumed += 1;
                if collection.insert(post) {
                    accepted += 1;
                }
                if accepted >= self.limit {
                    break 'pages;
                }
            }

            match page.after {
                Some(cursor) => after = Some(cursor),
                None => break,
            }
        }

        debug!(method = %label, consumed, accepted, "Listing finished");
        info!(method = %label, count = accepted, "Collected {accepted} posts from {label}");
        Ok(accepted)
    }

    /// Run every query of `plan` in order.
    pub async fn collect_all(
        &self,
        collection: &mut Collection,
        plan: &[ListingQuery],
    ) -> Result<(), ScrapeError> {
        for query in plan {
            self.fetch(collection, query, &query.label()).await?;
        }
        Ok(())
    }
}
