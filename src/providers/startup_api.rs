use crate::core::record::RawRecord;
use crate::core::source::StartupSource;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, instrument};

/// Reads startups from the REST API via `GET <base>/startups`.
///
/// The full list is requested on every call; there is no paging, retry or
/// authentication.
pub struct StartupApiProvider {
    base_url: String,
    client: reqwest::Client,
}

impl StartupApiProvider {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent("startdash/1.0");
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to build HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self) -> String {
        format!("{}/startups", self.base_url)
    }
}

#[async_trait]
impl StartupSource for StartupApiProvider {
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn fetch_startups(&self) -> Result<Vec<RawRecord>> {
        let url = self.url();
        debug!("Requesting startups from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {url}"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("Startup API returned {status} for {url}"));
        }

        let response_text = response
            .text()
            .await
            .context("Failed to get response text")?;

        let items: Vec<Value> = match serde_json::from_str(&response_text) {
            Ok(items) => items,
            Err(e) => {
                error!(
                    error = ?e,
                    response = %response_text,
                    "Failed to parse startups response"
                );
                return Err(e).context("Failed to parse startups response");
            }
        };

        debug!("Received {} startup records", items.len());
        Ok(items.into_iter().map(RawRecord::from_value).collect())
    }
}
