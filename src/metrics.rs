//! Prometheus metrics registry and metric definitions.

use once_cell::sync::Lazy;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, Opts, Registry, TextEncoder};

/// Global registry under crate namespace
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    Registry::new_custom(Some("subreddit_exporter".into()), None)
        .expect("failed to create Prometheus registry")
});

fn register_counter(name: &str, help: &str) -> IntCounter {
    let c = IntCounter::with_opts(Opts::new(name, help)).expect("counter opts");
    REGISTRY.register(Box::new(c.clone())).expect("register counter");
    c
}

/// Listing page requests issued
pub static LISTING_REQUESTS: Lazy<IntCounter> = Lazy::new(|| {
    register_counter("listing_requests_total", "Total number of listing page requests")
});

/// Posts accepted into the output table
pub static POSTS_ACCEPTED: Lazy<IntCounter> = Lazy::new(|| {
    register_counter("posts_accepted_total", "Posts accepted after deduplication")
});

/// Posts dropped because their id was already collected
pub static DUPLICATES_SKIPPED: Lazy<IntCounter> = Lazy::new(|| {
    register_counter("duplicates_skipped_total", "Posts skipped as already seen")
});

pub static UPLOAD_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    register_counter("upload_failures_total", "Failed object store uploads")
});

/// Histogram of listing request durations
pub static LISTING_HISTOGRAM: Lazy<Histogram> = Lazy::new(|| {
    let opts = HistogramOpts::new(
        "listing_duration_seconds",
        "Duration of a listing page fetch+decode in seconds",
    );
    let h = Histogram::with_opts(opts).expect("histogram opts");
    REGISTRY.register(Box::new(h.clone())).expect("register histogram");
    h
});

/// Encode all metrics as text
pub fn gather_metrics() -> String {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    let mf = REGISTRY.gather();
    if encoder.encode(&mf, &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
