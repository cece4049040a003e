//! # Remote Sourcing
//!
//! Fetches catalog URLs one at a time, awaiting each response before
//! the next request. A URL that fails is logged and skipped. Each
//! fetched body is handed to a [`ScanVisitor`] as a schema record, so
//! the local census, BOM check and compile visitors run unchanged on
//! remote documents.

use std::time::Duration;

use schemagate_core::SchemaRecord;
use schemagate_scan::ScanVisitor;
use url::Url;

use crate::error::FetchError;

/// HTTP settings for remote sourcing.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds (default: 30).
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

/// Outcome counts of one remote pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchSummary {
    /// URLs fetched and handed to the visitor.
    pub fetched: usize,
    /// URLs skipped because the fetch failed.
    pub skipped: usize,
    /// Fetched documents the visitor reported an error for.
    pub rejected: usize,
}

/// Sequential HTTP fetcher.
#[derive(Debug, Clone)]
pub struct RemoteFetcher {
    client: reqwest::Client,
}

impl RemoteFetcher {
    /// Build a fetcher with `config`.
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client })
    }

    /// Fetch one URL. Non-success statuses are errors.
    pub async fn fetch(&self, url: &str) -> Result<SchemaRecord, FetchError> {
        let parsed = Url::parse(url).map_err(|source| FetchError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        let file_name = parsed
            .path_segments()
            .and_then(|segments| segments.last())
            .filter(|segment| !segment.is_empty())
            .unwrap_or(url)
            .to_string();

        let resp = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|source| FetchError::Http {
                url: url.to_string(),
                source,
            })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = resp.bytes().await.map_err(|source| FetchError::Http {
            url: url.to_string(),
            source,
        })?;
        Ok(SchemaRecord::new(file_name, url, body.to_vec()))
    }

    /// Fetch every URL in order, handing each body to `visitor.schema`,
    /// then call `visitor.schema_done`. Nothing here is fatal.
    pub async fn fetch_each(&self, urls: &[&str], visitor: &mut dyn ScanVisitor) -> FetchSummary {
        let mut summary = FetchSummary::default();
        for url in urls {
            let record = match self.fetch(url).await {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!("skipping remote schema: {e}");
                    summary.skipped += 1;
                    continue;
                }
            };
            summary.fetched += 1;
            if let Err(e) = visitor.schema(&record) {
                tracing::error!("{url}: {e}");
                summary.rejected += 1;
            }
        }
        if let Err(e) = visitor.schema_done() {
            tracing::error!("{e}");
        }
        summary
    }
}
