//! Fetch → gather → prompt → AI pipeline shared by the signal loop and the
//! command handler.

use crate::application::prompt::build_prompt;
use crate::application::timeout::with_timeout;
use crate::application::unusual_options::scan_unusual;
use crate::config::{OptionsScanConfig, OutputLimits};
use crate::domain::entities::article::{Filing, Headline};
use crate::domain::entities::instrument::Instrument;
use crate::domain::entities::options::UnusualOption;
use crate::domain::entities::signal_message::{AuxiliaryContext, SignalMessage};
use crate::domain::error::ProviderError;
use crate::domain::ports::ai_provider::AiProvider;
use crate::domain::ports::filings_source::FilingsSource;
use crate::domain::ports::market_data::{MarketDataProvider, Quote};
use crate::domain::ports::news_source::NewsSource;
use crate::domain::values::instrument_kind::InstrumentKind;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Narrative used when the AI provider fails or times out.
pub const AI_FAILURE_PLACEHOLDER: &str = "AI analysis failed";

/// The external collaborators behind the pipeline.
#[derive(Clone)]
pub struct Providers {
    pub market: Arc<dyn MarketDataProvider>,
    pub news: Arc<dyn NewsSource>,
    pub filings: Arc<dyn FilingsSource>,
    pub ai: Arc<dyn AiProvider>,
}

#[derive(Debug, Clone, Copy)]
pub struct ComposeSettings {
    pub timeout: Duration,
    pub options: OptionsScanConfig,
    pub limits: OutputLimits,
    /// Consult the news source at all; `false` leaves the section out.
    pub news: bool,
    /// Consult the filings source for equities; `false` leaves the section out.
    pub filings: bool,
}

pub struct SignalComposer {
    providers: Providers,
    settings: ComposeSettings,
}

impl SignalComposer {
    pub fn new(providers: Providers, settings: ComposeSettings) -> Self {
        Self {
            providers,
            settings,
        }
    }

    pub fn limits(&self) -> &OutputLimits {
        &self.settings.limits
    }

    pub fn options_enabled(&self) -> bool {
        self.settings.options.enabled
    }

    pub async fn fetch_quote(&self, instrument: &Instrument) -> Result<Quote, ProviderError> {
        let quote = with_timeout(
            self.settings.timeout,
            self.providers.market.quote(instrument),
        )
        .await?;
        if !quote.value.is_finite() {
            return Err(ProviderError::Parse(format!(
                "non-finite value {} for {instrument}",
                quote.value
            )));
        }
        Ok(quote)
    }

    /// Options scan for an equity ticker.
    pub async fn unusual_options(&self, symbol: &str) -> Result<Vec<UnusualOption>, ProviderError> {
        let chains = with_timeout(
            self.settings.timeout,
            self.providers
                .market
                .option_chains(symbol, self.settings.options.expirations),
        )
        .await?;
        Ok(scan_unusual(&chains, self.settings.options.multiplier))
    }

    /// Gather the auxiliary sections that apply to `instrument`. Each source
    /// fails independently into an empty section.
    pub async fn gather(&self, instrument: &Instrument) -> AuxiliaryContext {
        let is_equity = instrument.kind() == InstrumentKind::Equity;
        let want_options = is_equity && self.settings.options.enabled;

        let options = async {
            if !want_options {
                return None;
            }
            Some(self.unusual_options(instrument.symbol()).await.unwrap_or_else(|e| {
                warn!(symbol = %instrument, error = %e, "Options scan failed");
                Vec::new()
            }))
        };
        let news = async {
            if !self.settings.news {
                return None;
            }
            Some(self.headlines(instrument).await)
        };
        let filings = async {
            if !(is_equity && self.settings.filings) {
                return None;
            }
            Some(self.filings(instrument.symbol()).await)
        };

        let (unusual_options, headlines, filings) = tokio::join!(options, news, filings);
        AuxiliaryContext {
            unusual_options,
            headlines,
            filings,
        }
    }

    async fn headlines(&self, instrument: &Instrument) -> Vec<Headline> {
        let limit = self.settings.limits.max_headlines;
        match with_timeout(
            self.settings.timeout,
            self.providers.news.headlines(instrument, limit),
        )
        .await
        {
            Ok(mut items) => {
                items.truncate(limit);
                items
            }
            Err(e) => {
                warn!(symbol = %instrument, source = self.providers.news.name(), error = %e, "News lookup failed");
                Vec::new()
            }
        }
    }

    async fn filings(&self, symbol: &str) -> Vec<Filing> {
        let limit = self.settings.limits.max_filings;
        match with_timeout(
            self.settings.timeout,
            self.providers.filings.recent_filings(symbol, limit),
        )
        .await
        {
            Ok(mut items) => {
                items.truncate(limit);
                items
            }
            Err(e) => {
                warn!(symbol, source = self.providers.filings.name(), error = %e, "Filings lookup failed");
                Vec::new()
            }
        }
    }

    /// Ask the AI provider; failures become [`AI_FAILURE_PLACEHOLDER`].
    pub async fn narrate(&self, prompt: &str) -> String {
        match with_timeout(self.settings.timeout, self.providers.ai.complete(prompt)).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                warn!(provider = self.providers.ai.name(), "AI returned an empty reply");
                AI_FAILURE_PLACEHOLDER.to_string()
            }
            Err(e) => {
                warn!(provider = self.providers.ai.name(), error = %e, "AI request failed");
                AI_FAILURE_PLACEHOLDER.to_string()
            }
        }
    }

    /// Build the full signal for an instrument whose quote is already known.
    pub async fn compose(&self, instrument: &Instrument, quote: Quote) -> SignalMessage {
        let context = self.gather(instrument).await;
        let prompt = build_prompt(instrument, &quote, &context);
        debug!(symbol = %instrument, prompt_len = prompt.len(), "Requesting AI signal");
        let narrative = self.narrate(&prompt).await;
        SignalMessage::new(instrument.clone(), quote.value, quote.volume, narrative, context)
    }
}
