//! Payload sources: the MEPA backend over HTTP, or a local JSON file.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::payload::{RecommendationPayload, RecommendationSettings};

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 12;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 6;

static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .user_agent("mepa-report/0.1")
        .timeout(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS))
        .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
        .build()
        .expect("failed to build HTTP client")
});

/// Where recommendation payloads come from. The HTTP implementation talks
/// to the backend; the file implementation backs `--payload` and tests.
#[async_trait]
pub trait PayloadSource: Send + Sync {
    async fn fetch_recommendation(&self, consumer_unit: u64) -> Result<RecommendationPayload>;
    async fn fetch_settings(&self) -> Result<RecommendationSettings>;
}

pub struct HttpSource {
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }
}

#[async_trait]
impl PayloadSource for HttpSource {
    async fn fetch_recommendation(&self, consumer_unit: u64) -> Result<RecommendationPayload> {
        let url = format!("{}/api/recommendation/{consumer_unit}/", self.base_url);
        let payload: RecommendationPayload = fetch_json(&url).await?;
        payload
            .validate()
            .with_context(|| format!("invalid recommendation payload from {url}"))?;
        Ok(payload)
    }

    async fn fetch_settings(&self) -> Result<RecommendationSettings> {
        let url = format!("{}/api/recommendation-settings/", self.base_url);
        fetch_json(&url).await
    }
}

pub struct FileSource {
    path: PathBuf,
    settings: RecommendationSettings,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>, settings: RecommendationSettings) -> Self {
        Self {
            path: path.into(),
            settings,
        }
    }
}

#[async_trait]
impl PayloadSource for FileSource {
    async fn fetch_recommendation(&self, _consumer_unit: u64) -> Result<RecommendationPayload> {
        let data = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("failed reading payload file: {}", self.path.display()))?;
        let payload: RecommendationPayload = serde_json::from_str(&data)
            .with_context(|| format!("invalid payload JSON: {}", self.path.display()))?;
        payload
            .validate()
            .with_context(|| format!("invalid payload: {}", self.path.display()))?;
        Ok(payload)
    }

    async fn fetch_settings(&self) -> Result<RecommendationSettings> {
        Ok(self.settings.clone())
    }
}

async fn fetch_json<T: DeserializeOwned>(url: &str) -> Result<T> {
    debug!("GET {url}");
    let response = HTTP_CLIENT
        .get(url)
        .send()
        .await
        .with_context(|| format!("failed GET request: {url}"))?;
    let status = response.status();
    let body = response
        .text()
        .await
        .with_context(|| format!("failed reading response body: {url}"))?;
    if !status.is_success() {
        let preview: String = body.chars().take(180).collect();
        return Err(anyhow!("GET {url} returned {status}: {preview}"));
    }
    serde_json::from_str(&body).with_context(|| format!("invalid JSON response: {url}"))
}

#[cfg(test)]
mod tests {
    use super::{FileSource, PayloadSource};
    use crate::payload::{RecommendationPayload, RecommendationSettings};

    #[tokio::test]
    async fn file_source_reads_and_validates() {
        let dir = std::env::temp_dir().join("mepa-report-fetch-test");
        std::fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("payload.json");
        let payload = RecommendationPayload::sample();
        std::fs::write(&path, serde_json::to_string(&payload).unwrap()).expect("write payload");

        let source = FileSource::new(&path, RecommendationSettings::default());
        let fetched = source.fetch_recommendation(0).await.expect("fetch");
        assert_eq!(fetched, payload);
        let settings = source.fetch_settings().await.expect("settings");
        assert_eq!(settings.minimum_energy_bills_for_recommendation, 6);
    }

    #[tokio::test]
    async fn file_source_rejects_misaligned_payload() {
        let dir = std::env::temp_dir().join("mepa-report-fetch-test");
        std::fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("bad-payload.json");
        let mut payload = RecommendationPayload::sample();
        payload.costs_comparison_plot.total_cost_in_reais_in_current.pop();
        std::fs::write(&path, serde_json::to_string(&payload).unwrap()).expect("write payload");

        let source = FileSource::new(&path, RecommendationSettings::default());
        assert!(source.fetch_recommendation(0).await.is_err());
    }
}
