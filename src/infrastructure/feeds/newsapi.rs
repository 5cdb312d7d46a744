use crate::domain::entities::article::Headline;
use crate::domain::entities::instrument::Instrument;
use crate::domain::error::ProviderError;
use crate::domain::ports::news_source::NewsSource;
use crate::infrastructure::http::{client, decode, APP_USER_AGENT};
use async_trait::async_trait;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://newsapi.org";

/// NewsAPI `everything` search, newest first.
pub struct NewsApiSource {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, serde::Deserialize)]
struct EverythingResponse {
    status: String,
    #[serde(default)]
    articles: Vec<Article>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct Article {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

impl NewsApiSource {
    pub fn new(api_key: String, timeout: Duration) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL, timeout)
    }

    pub fn with_base_url(api_key: String, base_url: &str, timeout: Duration) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client: client(APP_USER_AGENT, timeout),
        }
    }
}

#[async_trait]
impl NewsSource for NewsApiSource {
    fn name(&self) -> &str {
        "newsapi"
    }

    async fn headlines(
        &self,
        instrument: &Instrument,
        limit: usize,
    ) -> Result<Vec<Headline>, ProviderError> {
        if limit == 0 {
            return Ok(vec![]);
        }
        let url = format!("{}/v2/everything", self.base_url);
        let page_size = limit.min(100).to_string();

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("q", instrument.symbol()),
                ("language", "en"),
                ("sortBy", "publishedAt"),
                ("pageSize", page_size.as_str()),
            ])
            .header("X-Api-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let data: EverythingResponse = decode("newsapi", resp).await?;
        if data.status != "ok" {
            return Err(ProviderError::NoData(
                data.message.unwrap_or_else(|| format!("status {}", data.status)),
            ));
        }

        Ok(data
            .articles
            .into_iter()
            .filter_map(|a| match (a.title, a.url) {
                (Some(title), Some(url)) if !title.trim().is_empty() => Some(Headline { title, url }),
                _ => None,
            })
            .take(limit)
            .collect())
    }
}
