//! Watch-list configuration (TOML file) and credentials (environment).

use crate::application::observed::FirstObservation;
use crate::domain::entities::instrument::Instrument;
use crate::domain::error::DomainError;
use crate::domain::values::instrument_kind::InstrumentKind;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "marketsignal.toml";

/// Process-lifetime, read-only configuration of what to watch and how to report it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatchConfig {
    /// Seconds to sleep between cycles.
    pub interval_secs: u64,
    /// Threshold applied to instruments that do not set their own.
    pub default_threshold: f64,
    pub first_observation: FirstObservation,
    /// Prefix the first message of each non-empty batch with a "Market Signal Update" header.
    pub send_header: bool,
    pub instruments: Vec<InstrumentConfig>,
    pub limits: OutputLimits,
    pub options: OptionsScanConfig,
    pub providers: ProviderSettings,
    pub ai: AiSettings,
    pub telegram: TelegramSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstrumentConfig {
    pub symbol: String,
    #[serde(default)]
    pub kind: InstrumentKind,
    /// Fractional change (0.01 = 1%) that must be exceeded to report.
    #[serde(default)]
    pub threshold: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputLimits {
    pub max_messages_per_cycle: usize,
    pub max_option_rows: usize,
    pub max_headlines: usize,
    pub max_filings: usize,
    /// Rows listed by the `/options` command.
    pub options_command_rows: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptionsScanConfig {
    pub enabled: bool,
    /// A row is unusual when its volume exceeds the side's mean times this.
    pub multiplier: f64,
    /// Number of nearest expirations scanned.
    pub expirations: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderSettings {
    pub news: bool,
    pub filings: bool,
    /// Upper bound on any single external call.
    pub timeout_secs: u64,
    /// SEC EDGAR rejects requests without a contact User-Agent.
    pub sec_user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AiSettings {
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TelegramSettings {
    /// `parse_mode` for outgoing messages; empty sends plain text.
    pub parse_mode: String,
    /// Serve `/stock`, `/forex`, ... commands from the bot's chats.
    pub commands: bool,
    pub poll_timeout_secs: u64,
}

/// A validated instrument with its effective threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WatchedInstrument {
    pub instrument: Instrument,
    pub threshold: f64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        let equity = |s: &str| InstrumentConfig {
            symbol: s.into(),
            kind: InstrumentKind::Equity,
            threshold: None,
        };
        let pair = |s: &str, kind| InstrumentConfig {
            symbol: s.into(),
            kind,
            threshold: None,
        };
        Self {
            interval_secs: 900,
            default_threshold: 0.01,
            first_observation: FirstObservation::default(),
            send_header: true,
            instruments: vec![
                equity("AAPL"),
                equity("TSLA"),
                equity("AMZN"),
                equity("NVDA"),
                equity("GOOGL"),
                pair("EURUSD", InstrumentKind::Forex),
                pair("GBPUSD", InstrumentKind::Forex),
                pair("USDJPY", InstrumentKind::Forex),
                pair("XAUUSD", InstrumentKind::Commodity),
            ],
            limits: OutputLimits::default(),
            options: OptionsScanConfig::default(),
            providers: ProviderSettings::default(),
            ai: AiSettings::default(),
            telegram: TelegramSettings::default(),
        }
    }
}

impl Default for OutputLimits {
    fn default() -> Self {
        Self {
            max_messages_per_cycle: 10,
            max_option_rows: 3,
            max_headlines: 3,
            max_filings: 5,
            options_command_rows: 10,
        }
    }
}

impl Default for OptionsScanConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            multiplier: crate::application::unusual_options::DEFAULT_MULTIPLIER,
            expirations: 2,
        }
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            news: true,
            filings: true,
            timeout_secs: 15,
            sec_user_agent: "marketsignal/0.1 (ops@marketsignal.invalid)".into(),
        }
    }
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4.1-mini".into(),
        }
    }
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            parse_mode: "Markdown".into(),
            commands: true,
            poll_timeout_secs: 30,
        }
    }
}

impl WatchConfig {
    /// Load from `path`, or from [`DEFAULT_CONFIG_PATH`] falling back to
    /// built-in defaults when that file does not exist. Environment
    /// overrides are applied before validation.
    pub fn load(path: Option<&Path>) -> Result<Self, DomainError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => {
                tracing::info!("No {DEFAULT_CONFIG_PATH} found, using built-in watch list");
                Self::default()
            }
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, DomainError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            DomainError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, DomainError> {
        toml::from_str(raw).map_err(|e| DomainError::Config(e.to_string()))
    }

    /// Apply `SIGNAL_INTERVAL` and `OPENAI_MODEL` from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("SIGNAL_INTERVAL").filter(|v| !v.trim().is_empty()) {
            self.interval_secs = raw.trim().parse().map_err(|_| {
                DomainError::Config(format!("SIGNAL_INTERVAL must be whole seconds, got '{raw}'"))
            })?;
        }
        if let Some(model) = lookup("OPENAI_MODEL").filter(|v| !v.trim().is_empty()) {
            self.ai.model = model.trim().to_string();
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.interval_secs == 0 {
            return Err(DomainError::Config("interval_secs must be greater than 0".into()));
        }
        check_threshold("default_threshold", self.default_threshold)?;
        if self.limits.max_messages_per_cycle == 0 {
            return Err(DomainError::Config(
                "limits.max_messages_per_cycle must be greater than 0".into(),
            ));
        }
        if !(self.options.multiplier.is_finite() && self.options.multiplier > 0.0) {
            return Err(DomainError::Config(format!(
                "options.multiplier must be a positive number, got {}",
                self.options.multiplier
            )));
        }
        if self.providers.timeout_secs == 0 {
            return Err(DomainError::Config(
                "providers.timeout_secs must be greater than 0".into(),
            ));
        }
        self.watchlist().map(|_| ())
    }

    /// Instruments in configured order with effective thresholds.
    pub fn watchlist(&self) -> Result<Vec<WatchedInstrument>, DomainError> {
        if self.instruments.is_empty() {
            return Err(DomainError::Config("no instruments configured".into()));
        }
        let mut seen = std::collections::HashSet::new();
        let mut list = Vec::with_capacity(self.instruments.len());
        for entry in &self.instruments {
            let instrument = Instrument::new(&entry.symbol, entry.kind)
                .map_err(|e| DomainError::Config(format!("instruments: {e}")))?;
            let threshold = entry.threshold.unwrap_or(self.default_threshold);
            check_threshold(&format!("threshold for {instrument}"), threshold)?;
            if !seen.insert(instrument.clone()) {
                return Err(DomainError::Config(format!(
                    "instrument {instrument} ({}) is listed twice",
                    instrument.kind()
                )));
            }
            list.push(WatchedInstrument {
                instrument,
                threshold,
            });
        }
        Ok(list)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.providers.timeout_secs)
    }
}

fn check_threshold(what: &str, value: f64) -> Result<(), DomainError> {
    if !(value.is_finite() && value >= 0.0) {
        return Err(DomainError::Config(format!(
            "{what} must be a non-negative fraction, got {value}"
        )));
    }
    Ok(())
}

/// Secrets read from the environment (`.env` is loaded by the binary via dotenvy).
#[derive(Clone, Default)]
pub struct Credentials {
    pub openai_api_key: Option<String>,
    pub newsapi_key: Option<String>,
    pub telegram: Option<TelegramCredentials>,
    pub discord: Option<DiscordCredentials>,
}

#[derive(Clone)]
pub struct TelegramCredentials {
    pub bot_token: String,
    pub chat_id: String,
}

#[derive(Clone)]
pub struct DiscordCredentials {
    pub bot_token: String,
    pub channel_id: String,
}

impl Credentials {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Empty values count as absent.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let telegram = match (get("TELEGRAM_BOT_TOKEN"), get("TELEGRAM_CHAT_ID")) {
            (Some(bot_token), Some(chat_id)) => Some(TelegramCredentials { bot_token, chat_id }),
            (Some(_), None) | (None, Some(_)) => {
                tracing::warn!("Telegram needs both TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID; disabled");
                None
            }
            (None, None) => None,
        };
        let discord = match (get("DISCORD_BOT_TOKEN"), get("DISCORD_CHANNEL_ID")) {
            (Some(bot_token), Some(channel_id)) => Some(DiscordCredentials {
                bot_token,
                channel_id,
            }),
            (Some(_), None) | (None, Some(_)) => {
                tracing::warn!("Discord needs both DISCORD_BOT_TOKEN and DISCORD_CHANNEL_ID; disabled");
                None
            }
            (None, None) => None,
        };

        Self {
            openai_api_key: get("OPENAI_API_KEY"),
            newsapi_key: get("NEWSAPI_KEY"),
            telegram,
            discord,
        }
    }

    pub fn require_openai(&self) -> Result<&str, DomainError> {
        self.openai_api_key
            .as_deref()
            .ok_or(DomainError::MissingCredential("OPENAI_API_KEY"))
    }
}
