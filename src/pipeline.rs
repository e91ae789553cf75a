//! One full run: collect every listing method, then export.

use std::time::Instant;

use tracing::info;

use crate::collector::{Collection, Collector};
use crate::config::Settings;
use crate::errors::ScrapeError;
use crate::exporter::{export, ObjectStore, UploadOutcome};
use crate::source::{ListingQuery, PostSource};

/// What a run produced.
#[derive(Debug)]
pub struct RunSummary {
    pub rows: usize,
    pub upload: UploadOutcome,
}

pub async fn run<S, O>(
    settings: &Settings,
    source: &S,
    store: &O,
) -> Result<RunSummary, ScrapeError>
where
    S: PostSource,
    O: ObjectStore,
{
    let start = Instant::now();
    let plan = ListingQuery::default_plan(&settings.collect.search_term);
    let collector = Collector::new(source, settings.collect.post_limit_per_method);

    let mut collection = Collection::new();
    collector.collect_all(&mut collection, &plan).await?;

    let rows = collection.into_rows();
    let upload = export(&rows, &settings.export, store).await?;

    info!(
        subreddit = %settings.reddit.subreddit,
        methods = plan.len(),
        rows = rows.len(),
        uploaded = upload.is_uploaded(),
        run_s = start.elapsed().as_secs_f64(),
        "Run complete"
    );

    Ok(RunSummary {
        rows: rows.len(),
        upload,
    })
}
