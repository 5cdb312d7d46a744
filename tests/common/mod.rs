//! Shared test helpers: in-memory providers and a recording chat channel.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use marketsignal::application::compose::Providers;
use marketsignal::config::{InstrumentConfig, WatchConfig};
use marketsignal::domain::entities::article::{Filing, Headline};
use marketsignal::domain::entities::instrument::Instrument;
use marketsignal::domain::entities::options::{OptionChainSnapshot, OptionRow};
use marketsignal::domain::error::ProviderError;
use marketsignal::domain::ports::ai_provider::AiProvider;
use marketsignal::domain::ports::chat_channel::ChatChannel;
use marketsignal::domain::ports::filings_source::FilingsSource;
use marketsignal::domain::ports::market_data::{MarketDataProvider, Quote};
use marketsignal::domain::ports::news_source::NewsSource;
use marketsignal::domain::values::instrument_kind::InstrumentKind;
use marketsignal::MarketSignal;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Quotes keyed by symbol; a missing symbol fails with `NoData`.
#[derive(Default)]
pub struct StubMarket {
    quotes: Mutex<HashMap<String, Quote>>,
    chains: Mutex<Vec<OptionChainSnapshot>>,
    chains_fail: Mutex<bool>,
    quote_calls: Mutex<Vec<String>>,
    stalls: Mutex<HashMap<String, Duration>>,
}

impl StubMarket {
    pub fn set(&self, symbol: &str, value: f64) {
        self.set_quote(symbol, value, None);
    }

    pub fn set_quote(&self, symbol: &str, value: f64, volume: Option<u64>) {
        self.quotes
            .lock()
            .unwrap()
            .insert(symbol.to_string(), Quote { value, volume });
    }

    pub fn remove(&self, symbol: &str) {
        self.quotes.lock().unwrap().remove(symbol);
    }

    pub fn set_chains(&self, chains: Vec<OptionChainSnapshot>) {
        *self.chains.lock().unwrap() = chains;
    }

    /// Make quotes for `symbol` take `delay` before answering.
    pub fn stall(&self, symbol: &str, delay: Duration) {
        self.stalls.lock().unwrap().insert(symbol.to_string(), delay);
    }

    pub fn fail_chains(&self) {
        *self.chains_fail.lock().unwrap() = true;
    }

    pub fn quote_calls(&self) -> Vec<String> {
        self.quote_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MarketDataProvider for StubMarket {
    fn name(&self) -> &str {
        "stub_market"
    }

    async fn quote(&self, instrument: &Instrument) -> Result<Quote, ProviderError> {
        self.quote_calls
            .lock()
            .unwrap()
            .push(instrument.symbol().to_string());
        let stall = self.stalls.lock().unwrap().get(instrument.symbol()).copied();
        if let Some(delay) = stall {
            tokio::time::sleep(delay).await;
        }
        self.quotes
            .lock()
            .unwrap()
            .get(instrument.symbol())
            .copied()
            .ok_or_else(|| ProviderError::NoData(instrument.symbol().to_string()))
    }

    async fn option_chains(
        &self,
        _symbol: &str,
        max_expirations: usize,
    ) -> Result<Vec<OptionChainSnapshot>, ProviderError> {
        if *self.chains_fail.lock().unwrap() {
            return Err(ProviderError::Network("options down".into()));
        }
        let mut chains = self.chains.lock().unwrap().clone();
        chains.truncate(max_expirations);
        Ok(chains)
    }
}

#[derive(Default)]
pub struct StubNews {
    pub headlines: Vec<Headline>,
    pub fail: bool,
}

#[async_trait]
impl NewsSource for StubNews {
    fn name(&self) -> &str {
        "stub_news"
    }

    async fn headlines(
        &self,
        _instrument: &Instrument,
        limit: usize,
    ) -> Result<Vec<Headline>, ProviderError> {
        if self.fail {
            return Err(ProviderError::Network("news down".into()));
        }
        Ok(self.headlines.iter().take(limit).cloned().collect())
    }
}

#[derive(Default)]
pub struct StubFilings {
    pub filings: Vec<Filing>,
    pub fail: bool,
}

#[async_trait]
impl FilingsSource for StubFilings {
    fn name(&self) -> &str {
        "stub_filings"
    }

    async fn recent_filings(&self, _symbol: &str, limit: usize) -> Result<Vec<Filing>, ProviderError> {
        if self.fail {
            return Err(ProviderError::Status {
                provider: "stub_filings",
                status: 503,
                body: String::new(),
            });
        }
        Ok(self.filings.iter().take(limit).cloned().collect())
    }
}

/// Replies with a fixed narrative, or fails every call when `fail` is set.
pub struct StubAi {
    reply: String,
    fail: bool,
    stall: Option<Duration>,
    prompts: Mutex<Vec<String>>,
}

impl StubAi {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            fail: false,
            stall: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Replies only after `delay`.
    pub fn stalling(reply: &str, delay: Duration) -> Self {
        Self {
            stall: Some(delay),
            ..Self::replying(reply)
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: String::new(),
            fail: true,
            stall: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl AiProvider for StubAi {
    fn name(&self) -> &str {
        "stub_ai"
    }

    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(delay) = self.stall {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(ProviderError::Network("ai down".into()));
        }
        Ok(self.reply.clone())
    }
}

/// Records every message it accepts.
pub struct RecordingChannel {
    name: String,
    fail: bool,
    sent: Mutex<Vec<String>>,
}

impl RecordingChannel {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fail: false,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(name: &str) -> Self {
        Self {
            fail: true,
            ..Self::new(name)
        }
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatChannel for RecordingChannel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&self, text: &str) -> Result<(), ProviderError> {
        if self.fail {
            return Err(ProviderError::Network(format!("{} unreachable", self.name)));
        }
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

pub struct Harness {
    pub app: MarketSignal,
    pub market: Arc<StubMarket>,
    pub ai: Arc<StubAi>,
    pub channel: Arc<RecordingChannel>,
}

pub fn instrument(symbol: &str, kind: InstrumentKind) -> InstrumentConfig {
    InstrumentConfig {
        symbol: symbol.to_string(),
        kind,
        threshold: None,
    }
}

/// Config watching `instruments` with the header turned off so channels
/// only see signal messages.
pub fn config_with(instruments: Vec<InstrumentConfig>) -> WatchConfig {
    WatchConfig {
        instruments,
        send_header: false,
        ..WatchConfig::default()
    }
}

pub fn setup(config: WatchConfig) -> Harness {
    setup_with(
        config,
        StubNews::default(),
        StubFilings::default(),
        StubAi::replying("BUY. Strong momentum."),
    )
}

pub fn setup_with(config: WatchConfig, news: StubNews, filings: StubFilings, ai: StubAi) -> Harness {
    let market = Arc::new(StubMarket::default());
    let ai = Arc::new(ai);
    let channel = Arc::new(RecordingChannel::new("recording"));
    let providers = Providers {
        market: market.clone(),
        news: Arc::new(news),
        filings: Arc::new(filings),
        ai: ai.clone(),
    };
    let app = MarketSignal::with_providers(
        config,
        providers,
        vec![channel.clone() as Arc<dyn ChatChannel>],
    )
    .unwrap();
    Harness {
        app,
        market,
        ai,
        channel,
    }
}

pub fn row(strike: f64, volume: Option<u64>) -> OptionRow {
    OptionRow {
        strike,
        volume,
        last_price: 1.25,
    }
}

pub fn chain(calls: Vec<OptionRow>, puts: Vec<OptionRow>) -> OptionChainSnapshot {
    OptionChainSnapshot {
        expiration: NaiveDate::from_ymd_opt(2025, 1, 17).unwrap(),
        calls,
        puts,
    }
}

pub fn args(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
