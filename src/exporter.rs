//! exporter.rs
//!
//! Writes the collected rows to a local CSV file and ships that file to an
//! object store. A failed upload is reported, never fatal.

use std::path::Path;

use async_trait::async_trait;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use tracing::{error, info};

use crate::collector::PostRow;
use crate::config::ExportSettings;
use crate::errors::ScrapeError;
use crate::metrics::UPLOAD_FAILURES;

/// Result of the upload step of an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded { uri: String },
    Failed { error: String },
}

impl UploadOutcome {
    pub fn is_uploaded(&self) -> bool {
        matches!(self, UploadOutcome::Uploaded { .. })
    }
}

/// Destination for the exported file.
#[async_trait]
pub trait ObjectStore {
    async fn upload_file(&self, path: &Path, bucket: &str, key: &str) -> Result<(), ScrapeError>;
}

/// S3 upload through the AWS SDK and its default credential chain.
pub struct S3Store {
    client: aws_sdk_s3::Client,
}

impl S3Store {
    /// Resolve AWS configuration from the environment, applying the optional
    /// region and endpoint overrides from `settings`.
    pub async fn from_settings(settings: &ExportSettings) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = &settings.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let shared = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = &settings.endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self {
            client: aws_sdk_s3::Client::from_conf(builder.build()),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn upload_file(&self, path: &Path, bucket: &str, key: &str) -> Result<(), ScrapeError> {
        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| ScrapeError::Upload(format!("reading {}: {e}", path.display())))?;

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type("text/csv")
            .body(body)
            .send()
            .await
            .map_err(|e| ScrapeError::Upload(DisplayErrorContext(&e).to_string()))?;

        Ok(())
    }
}

/// Write `rows` to `path` as CSV with a header row, replacing any existing file.
pub fn write_csv(path: &Path, rows: &[PostRow]) -> Result<(), ScrapeError> {
    let mut writer = csv::Writer::from_path(path)?;
    if rows.is_empty() {
        // serde only emits headers alongside the first record
        writer.write_record([
            "Title",
            "Upvotes",
            "Downvotes",
            "Score",
            "ID",
            "URL",
            "Comments",
            "Created_UTC",
            "Author",
            "Flair",
            "Shares",
        ])?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Save rows locally, then upload the file.
///
/// Local write errors propagate. Upload errors are logged and returned as
/// [`UploadOutcome::Failed`].
pub async fn export<O: ObjectStore>(
    rows: &[PostRow],
    settings: &ExportSettings,
    store: &O,
) -> Result<UploadOutcome, ScrapeError> {
    let path = settings.output_path.as_path();
    write_csv(path, rows)?;
    info!(path = %path.display(), rows = rows.len(), "Data saved locally at: {}", path.display());

    let uri = format!("s3://{}/{}", settings.bucket, settings.key);
    match store.upload_file(path, &settings.bucket, &settings.key).await {
        Ok(()) => {
            info!(%uri, "CSV uploaded to S3: {uri}");
            Ok(UploadOutcome::Uploaded { uri })
        }
        Err(e) => {
            UPLOAD_FAILURES.inc();
            error!(%uri, error = %e, "Failed to upload CSV to S3: {e}");
            Ok(UploadOutcome::Failed {
                error: e.to_string(),
            })
        }
    }
}
