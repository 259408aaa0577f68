//! Local JSON weather server: the index page links to one record per id
//! (`href="3"`), and each record is a [`WeatherData`] document.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use std::sync::LazyLock;
use tokio::task::JoinSet;

use crate::{
    error::LookupError,
    model::{WeatherData, WeatherRequest},
    provider::truncate_body,
};

use super::{ProviderId, WeatherProvider};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3001";

static RECORD_HREF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"href="(\d+)""#).expect("valid record href regex"));

#[derive(Debug, Clone)]
pub struct MockServerProvider {
    base_url: String,
    http: Client,
}

impl MockServerProvider {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// Fetch every record the server lists, in index order.
    pub async fn fetch_all(&self) -> Result<Vec<WeatherData>> {
        let index_url = format!("{}/", self.base_url);
        let html = self
            .http
            .get(&index_url)
            .send()
            .await
            .context("Failed to send request to local weather server")?
            .text()
            .await
            .context("Failed to read local weather server index")?;

        let ids = record_ids(&html);
        if ids.is_empty() {
            return Err(LookupError::NoData.into());
        }
        tracing::debug!("Local weather server lists {} records", ids.len());

        let mut tasks = JoinSet::new();
        for (position, id) in ids.into_iter().enumerate() {
            let http = self.http.clone();
            let url = format!("{}/{id}", self.base_url);
            tasks.spawn(async move { (position, fetch_record(&http, &url).await) });
        }

        let mut records = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            let (position, record) = joined.context("Weather record fetch task failed")?;
            records.push((position, record?));
        }
        records.sort_by_key(|(position, _)| *position);

        Ok(records.into_iter().map(|(_, record)| record).collect())
    }
}

async fn fetch_record(http: &Client, url: &str) -> Result<WeatherData> {
    let res = http
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to fetch weather record {url}"))?;

    let status = res.status();
    let body = res
        .text()
        .await
        .with_context(|| format!("Failed to read weather record {url}"))?;

    if !status.is_success() {
        return Err(anyhow!(
            "Weather record {url} failed with status {status}: {}",
            truncate_body(&body)
        ));
    }

    serde_json::from_str(&body).with_context(|| format!("Failed to parse weather record {url}"))
}

/// Record ids linked from the server's index page, in document order.
pub fn record_ids(html: &str) -> Vec<String> {
    RECORD_HREF
        .captures_iter(html)
        .map(|caps| caps[1].to_string())
        .collect()
}

#[async_trait]
impl WeatherProvider for MockServerProvider {
    fn id(&self) -> ProviderId {
        ProviderId::MockServer
    }

    async fn get_weather(&self, request: &WeatherRequest) -> Result<WeatherData> {
        let WeatherRequest::City(city) = request else {
            return Err(LookupError::Unsupported {
                provider: ProviderId::MockServer.as_str(),
                what: "coordinate",
            }
            .into());
        };

        let wanted = city.to_lowercase();
        self.fetch_all()
            .await?
            .into_iter()
            .find(|record| record.city.to_lowercase() == wanted)
            .ok_or_else(|| LookupError::CityNotFound.into())
    }
}
