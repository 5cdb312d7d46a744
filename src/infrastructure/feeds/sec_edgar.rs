use crate::domain::entities::article::Filing;
use crate::domain::error::ProviderError;
use crate::domain::ports::filings_source::FilingsSource;
use crate::infrastructure::http::{client, decode};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::OnceCell;

const DEFAULT_WWW_URL: &str = "https://www.sec.gov";
const DEFAULT_DATA_URL: &str = "https://data.sec.gov";

/// Recent filings from SEC EDGAR.
///
/// EDGAR keys companies by CIK, so the ticker map (`company_tickers.json`) is
/// downloaded once on first use and kept for the life of the process. A
/// failed download is retried on the next lookup.
pub struct SecEdgar {
    www_url: String,
    data_url: String,
    client: reqwest::Client,
    ciks: OnceCell<HashMap<String, u64>>,
}

#[derive(Debug, serde::Deserialize)]
struct TickerEntry {
    cik_str: u64,
    ticker: String,
}

#[derive(Debug, serde::Deserialize)]
struct Submissions {
    filings: SubmissionFilings,
}

#[derive(Debug, serde::Deserialize)]
struct SubmissionFilings {
    recent: RecentFilings,
}

/// Column-oriented: index `i` of every vector describes the same filing.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecentFilings {
    #[serde(default)]
    accession_number: Vec<String>,
    #[serde(default)]
    form: Vec<String>,
    #[serde(default)]
    filing_date: Vec<String>,
    #[serde(default)]
    primary_document: Vec<String>,
    #[serde(default)]
    primary_doc_description: Vec<String>,
}

impl SecEdgar {
    /// `user_agent` must identify the operator (name and contact e-mail).
    pub fn new(user_agent: &str, timeout: Duration) -> Self {
        Self::with_base_urls(user_agent, DEFAULT_WWW_URL, DEFAULT_DATA_URL, timeout)
    }

    pub fn with_base_urls(user_agent: &str, www_url: &str, data_url: &str, timeout: Duration) -> Self {
        Self {
            www_url: www_url.trim_end_matches('/').to_string(),
            data_url: data_url.trim_end_matches('/').to_string(),
            client: client(user_agent, timeout),
            ciks: OnceCell::new(),
        }
    }

    async fn load_ciks(&self) -> Result<HashMap<String, u64>, ProviderError> {
        let url = format!("{}/files/company_tickers.json", self.www_url);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        let raw: HashMap<String, TickerEntry> = decode("sec_edgar", resp).await?;
        tracing::debug!(companies = raw.len(), "Loaded EDGAR ticker map");
        Ok(raw
            .into_values()
            .map(|e| (e.ticker.to_uppercase(), e.cik_str))
            .collect())
    }

    async fn cik_for(&self, symbol: &str) -> Result<u64, ProviderError> {
        let ciks = self.ciks.get_or_try_init(|| self.load_ciks()).await?;
        ciks.get(&symbol.to_uppercase())
            .copied()
            .ok_or_else(|| ProviderError::NoData(format!("no CIK for {symbol}")))
    }
}

#[async_trait]
impl FilingsSource for SecEdgar {
    fn name(&self) -> &str {
        "sec_edgar"
    }

    async fn recent_filings(&self, symbol: &str, limit: usize) -> Result<Vec<Filing>, ProviderError> {
        if limit == 0 {
            return Ok(vec![]);
        }
        let cik = self.cik_for(symbol).await?;
        let url = format!("{}/submissions/CIK{cik:010}.json", self.data_url);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        let data: Submissions = decode("sec_edgar", resp).await?;
        Ok(to_filings(&self.www_url, cik, &data.filings.recent, limit))
    }
}

fn to_filings(www_url: &str, cik: u64, recent: &RecentFilings, limit: usize) -> Vec<Filing> {
    let rows = recent
        .accession_number
        .len()
        .min(recent.form.len())
        .min(recent.filing_date.len())
        .min(recent.primary_document.len());

    (0..rows)
        .take(limit)
        .map(|i| {
            let form = &recent.form[i];
            let mut title = format!("{form} filed {}", recent.filing_date[i]);
            if let Some(desc) = recent.primary_doc_description.get(i) {
                if !desc.is_empty() && !desc.eq_ignore_ascii_case(form) {
                    title.push_str(&format!(" - {desc}"));
                }
            }
            let accession = recent.accession_number[i].replace('-', "");
            Filing {
                title,
                url: format!(
                    "{www_url}/Archives/edgar/data/{cik}/{accession}/{}",
                    recent.primary_document[i]
                ),
            }
        })
        .collect()
}
