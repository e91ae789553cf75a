//! Entrypoint: set up tracing, load settings, authenticate against Reddit,
//! collect every listing method, and export the result to CSV and S3.
//!
//! Configuration comes from `Settings` in `config.rs`:
//!  - `reddit`   – API credentials, subreddit, endpoints, request timeout
//!  - `collect`  – per-method post limit and search term
//!  - `export`   – local CSV path and the S3 bucket/key it is uploaded to

use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use subreddit_exporter::config::Settings;
use subreddit_exporter::errors::ScrapeError;
use subreddit_exporter::exporter::{S3Store, UploadOutcome};
use subreddit_exporter::metrics;
use subreddit_exporter::pipeline;
use subreddit_exporter::reddit::RedditClient;

/// Application entrypoint for the subreddit exporter.
///
/// **Workflow**:
/// 1. Initialise tracing/logging from `RUST_LOG` (or default to `info`).
/// 2. Load defaults, `Config.toml`, and any `APP__…` env-var overrides.
/// 3. Exchange Reddit client credentials for an application token.
/// 4. Run the listing plan and export; only the upload may fail softly.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), ScrapeError> {
    // ───────────────────────────────────────────────────────────────
    // 1. Initialise tracing / logging
    // ───────────────────────────────────────────────────────────────
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();
    info!("Starting subreddit exporter…");

    // ───────────────────────────────────────────────────────────────
    // 2. Load configuration
    // ───────────────────────────────────────────────────────────────
    let settings = Settings::new()?;
    info!(?settings, "Loaded configuration");

    // ───────────────────────────────────────────────────────────────
    // 3. Clients
    // ───────────────────────────────────────────────────────────────
    let reddit = RedditClient::connect(&settings.reddit).await?;
    info!(subreddit = %settings.reddit.subreddit, "Authenticated with Reddit");

    let store = S3Store::from_settings(&settings.export).await;

    // ───────────────────────────────────────────────────────────────
    // 4. Collect & export
    // ───────────────────────────────────────────────────────────────
    let summary = pipeline::run(&settings, &reddit, &store).await?;

    if let UploadOutcome::Failed { error } = &summary.upload {
        warn!(%error, rows = summary.rows, "Finished with local output only");
    }
    debug!(metrics = %metrics::gather_metrics(), "Final metrics");

    Ok(())
}
