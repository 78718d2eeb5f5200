use crate::config::SourceConfig;
use crate::error::FetchError;
use crate::source::api_types::{parse_records, SourceRecord};
use crate::source::Fetcher;
use color_eyre::{eyre::eyre, Result};
use std::time::Duration;
use tracing::{debug, info, warn};

/// HTTP client for the brewery listing endpoint
#[derive(Clone)]
pub struct HttpFetcher {
  client: reqwest::Client,
  base_url: String,
}

impl HttpFetcher {
  pub fn new(config: &SourceConfig) -> Result<Self> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .user_agent(concat!("brewcache/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      client,
      base_url: config.base_url.clone(),
    })
  }

  /// Address for a filter: the base URL itself, or `{base}/{filter}`.
  pub fn url_for(&self, filter: &str) -> String {
    let filter = filter.trim();
    if filter.is_empty() {
      return self.base_url.clone();
    }
    format!(
      "{}/{}",
      self.base_url.trim_end_matches('/'),
      filter.trim_start_matches('/')
    )
  }
}

impl Fetcher for HttpFetcher {
  async fn fetch(&self, filter: &str) -> Result<Vec<SourceRecord>, FetchError> {
    let url = self.url_for(filter);
    debug!(%url, "fetching records from remote source");

    let unavailable = |e: reqwest::Error| FetchError::RemoteUnavailable {
      url: url.clone(),
      message: e.to_string(),
    };

    let response = self
      .client
      .get(&url)
      .send()
      .await
      .and_then(|r| r.error_for_status())
      .map_err(unavailable)?;

    let body = response.text().await.map_err(unavailable)?;

    let records = parse_records(&body).map_err(|source| FetchError::MalformedResponse {
      url: url.clone(),
      source,
    })?;

    if records.is_empty() {
      warn!(%url, "remote source returned no records");
    } else {
      info!(%url, count = records.len(), "fetched records from remote source");
    }

    Ok(records)
  }
}
