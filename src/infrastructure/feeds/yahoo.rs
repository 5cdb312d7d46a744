use crate::domain::entities::options::{OptionChainSnapshot, OptionRow};
use crate::domain::error::ProviderError;
use crate::domain::ports::market_data::Quote;
use crate::infrastructure::http::{browser_client, decode};
use chrono::{DateTime, NaiveDate};
use std::time::Duration;
use tracing::warn;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Yahoo Finance quotes (v8 chart API) and option chains (v7 options API). No auth required.
pub struct YahooFinance {
    base_url: String,
    client: reqwest::Client,
}

impl YahooFinance {
    pub fn new(timeout: Duration) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, timeout)
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: browser_client(timeout),
        }
    }
}

#[derive(Debug, serde::Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, serde::Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, serde::Deserialize)]
struct ChartData {
    meta: ChartMeta,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    #[serde(default)]
    regular_market_price: Option<f64>,
    #[serde(default)]
    regular_market_volume: Option<u64>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct OptionsResponse {
    option_chain: OptionsEnvelope,
}

#[derive(Debug, serde::Deserialize)]
struct OptionsEnvelope {
    result: Option<Vec<OptionsResult>>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct OptionsResult {
    #[serde(default)]
    expiration_dates: Vec<i64>,
    #[serde(default)]
    options: Vec<OptionsBlock>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct OptionsBlock {
    expiration_date: i64,
    #[serde(default)]
    calls: Vec<Contract>,
    #[serde(default)]
    puts: Vec<Contract>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct Contract {
    strike: f64,
    #[serde(default)]
    volume: Option<u64>,
    #[serde(default)]
    last_price: Option<f64>,
}

impl YahooFinance {
    pub async fn quote(&self, ticker: &str) -> Result<Quote, ProviderError> {
        let url = format!("{}/v8/finance/chart/{ticker}", self.base_url);

        let resp = self
            .client
            .get(&url)
            .query(&[("range", "1d"), ("interval", "1d")])
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let data: ChartResponse = decode("yahoo_finance", resp).await?;

        if let Some(err) = data.chart.error {
            return Err(ProviderError::Parse(format!("Yahoo error: {err}")));
        }

        let meta = data
            .chart
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| ProviderError::NoData(format!("no chart results for {ticker}")))?
            .meta;

        let price = meta
            .regular_market_price
            .ok_or_else(|| ProviderError::NoData(format!("no price for {ticker}")))?;

        Ok(Quote {
            value: price,
            volume: meta.regular_market_volume,
        })
    }

    /// Nearest `max_expirations` chains. The first request returns the
    /// expiration list along with the nearest chain; later expirations are
    /// fetched one by one and a failure there keeps what was collected.
    pub async fn option_chains(
        &self,
        ticker: &str,
        max_expirations: usize,
    ) -> Result<Vec<OptionChainSnapshot>, ProviderError> {
        if max_expirations == 0 {
            return Ok(vec![]);
        }

        let first = self.fetch_options(ticker, None).await?;
        let mut chains: Vec<OptionChainSnapshot> =
            first.options.into_iter().filter_map(to_snapshot).collect();

        for expiration in first.expiration_dates.iter().skip(1).take(max_expirations - 1) {
            if chains.len() >= max_expirations {
                break;
            }
            match self.fetch_options(ticker, Some(*expiration)).await {
                Ok(result) => chains.extend(result.options.into_iter().filter_map(to_snapshot)),
                Err(e) => {
                    warn!(ticker, expiration, error = %e, "Option chain fetch stopped early");
                    break;
                }
            }
        }

        chains.truncate(max_expirations);
        Ok(chains)
    }

    async fn fetch_options(
        &self,
        ticker: &str,
        date: Option<i64>,
    ) -> Result<OptionsResult, ProviderError> {
        let url = format!("{}/v7/finance/options/{ticker}", self.base_url);
        let mut req = self.client.get(&url);
        if let Some(date) = date {
            req = req.query(&[("date", date.to_string())]);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let data: OptionsResponse = decode("yahoo_finance", resp).await?;

        if let Some(err) = data.option_chain.error {
            return Err(ProviderError::Parse(format!("Yahoo error: {err}")));
        }

        data.option_chain
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| ProviderError::NoData(format!("no option chain for {ticker}")))
    }
}

fn to_snapshot(block: OptionsBlock) -> Option<OptionChainSnapshot> {
    let expiration = expiration_date(block.expiration_date)?;
    Some(OptionChainSnapshot {
        expiration,
        calls: block.calls.into_iter().map(to_row).collect(),
        puts: block.puts.into_iter().map(to_row).collect(),
    })
}

fn to_row(c: Contract) -> OptionRow {
    OptionRow {
        strike: c.strike,
        volume: c.volume,
        last_price: c.last_price.unwrap_or(0.0),
    }
}

fn expiration_date(epoch_secs: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(epoch_secs, 0).map(|dt| dt.date_naive())
}
