//! Type-safe configuration loader using the `config` crate,
//! with manual environment-variable overrides for core settings.

use config::{Config, ConfigError, File, FileFormat, FileSourceFile};
use serde::Deserialize;
use std::{env, path::PathBuf, time::Duration};

/// Top-level application settings: built-in defaults, then `Config.toml`,
/// then (where applicable) environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub reddit: RedditSettings,
    pub collect: CollectSettings,
    pub export: ExportSettings,
}

/// Credentials and endpoints for the Reddit API.
#[derive(Deserialize, Clone)]
pub struct RedditSettings {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,

    /// Subreddit to collect from, without the `r/` prefix
    pub subreddit: String,

    /// Client-credentials token endpoint
    pub auth_url: String,

    /// Base URL for authenticated listing requests
    pub api_base_url: String,

    /// Per-request timeout (e.g. "30s")
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

// Hand-written so the secret never reaches the logs.
impl std::fmt::Debug for RedditSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedditSettings")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .field("subreddit", &self.subreddit)
            .field("auth_url", &self.auth_url)
            .field("api_base_url", &self.api_base_url)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CollectSettings {
    /// Maximum number of newly accepted posts per listing method
    pub post_limit_per_method: usize,

    /// Term used for the final search query
    pub search_term: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExportSettings {
    /// Local CSV path, overwritten on every run
    pub output_path: PathBuf,

    pub bucket: String,
    pub key: String,

    /// AWS region override; the default provider chain decides otherwise
    #[serde(default)]
    pub region: Option<String>,

    /// Custom S3 endpoint (MinIO, LocalStack, ...)
    #[serde(default)]
    pub endpoint_url: Option<String>,
}

impl Settings {
    /// Load settings from built-in defaults and `Config.toml` (if present),
    /// then apply any overrides from these environment variables:
    ///
    /// - `APP__REDDIT_CLIENT_ID`
    /// - `APP__REDDIT_CLIENT_SECRET`
    /// - `APP__REDDIT_USER_AGENT`
    /// - `APP__SUBREDDIT`
    /// - `APP__POST_LIMIT`
    /// - `APP__OUTPUT_PATH`
    /// - `APP__S3_BUCKET`
    /// - `APP__S3_KEY`
    /// - `APP__REQUEST_TIMEOUT`
    pub fn new() -> Result<Self, ConfigError> {
        Self::load(File::with_name("Config").required(false), |name| env::var(name).ok())
    }

    fn load<F>(file: File<FileSourceFile, FileFormat>, var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // 1) Defaults, then Config.toml
        let cfg = Config::builder()
            .set_default("reddit.client_id", "")?
            .set_default("reddit.client_secret", "")?
            .set_default("reddit.user_agent", "Data_Scraper")?
            .set_default("reddit.subreddit", "technology")?
            .set_default("reddit.auth_url", "https://www.reddit.com/api/v1/access_token")?
            .set_default("reddit.api_base_url", "https://oauth.reddit.com")?
            .set_default("reddit.request_timeout", "30s")?
            .set_default("collect.post_limit_per_method", 1000)?
            .set_default("collect.search_term", "technology")?
            .set_default("export.output_path", "technology_posts.csv")?
            .set_default("export.bucket", "trybucket1010")?
            .set_default("export.key", "reddit_data/technology_posts.csv")?
            .add_source(file)
            .build()?;

        let mut settings: Settings = cfg.try_deserialize()?;

        // 2) Manual overrides for core settings
        if let Some(val) = var("APP__REDDIT_CLIENT_ID") {
            settings.reddit.client_id = val;
        }
        if let Some(val) = var("APP__REDDIT_CLIENT_SECRET") {
            settings.reddit.client_secret = val;
        }
        if let Some(val) = var("APP__REDDIT_USER_AGENT") {
            settings.reddit.user_agent = val;
        }
        if let Some(val) = var("APP__SUBREDDIT") {
            settings.reddit.subreddit = val;
        }
        if let Some(val) = var("APP__POST_LIMIT") {
            settings.collect.post_limit_per_method = val
                .parse()
                .map_err(|e| ConfigError::Foreign(Box::new(e)))?;
        }
        if let Some(val) = var("APP__OUTPUT_PATH") {
            settings.export.output_path = PathBuf::from(val);
        }
        if let Some(val) = var("APP__S3_BUCKET") {
            settings.export.bucket = val;
        }
        if let Some(val) = var("APP__S3_KEY") {
            settings.export.key = val;
        }
        if let Some(val) = var("APP__REQUEST_TIMEOUT") {
            settings.reddit.request_timeout = humantime::parse_duration(&val)
                .map_err(|e| ConfigError::Foreign(Box::new(e)))?;
        }

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.reddit.client_id.trim().is_empty() || self.reddit.client_secret.trim().is_empty() {
            return Err(ConfigError::Message(
                "reddit.client_id and reddit.client_secret must be set".into(),
            ));
        }
        if self.collect.post_limit_per_method == 0 {
            return Err(ConfigError::Message(
                "collect.post_limit_per_method must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
