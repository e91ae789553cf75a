//! Library entrypoint: re‑export modules

pub mod collector;
pub mod config;
pub mod errors;
pub mod exporter;
pub mod metrics;
pub mod pipeline;
pub mod reddit;
pub mod source;
pub mod votes;
