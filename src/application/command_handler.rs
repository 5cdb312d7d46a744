//! Stateless request/response handling for chat commands.
//!
//! Manual queries always report: there is no threshold gate and no access
//! to the loop's observed values.

use crate::application::compose::SignalComposer;
use crate::application::format::{render_signal, render_unusual_listing};
use crate::config::WatchedInstrument;
use crate::domain::entities::instrument::Instrument;
use crate::domain::values::instrument_kind::InstrumentKind;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Errors shown verbatim to the user who sent the command.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Usage: {0}")]
    MissingArgument(&'static str),

    #[error("{0}")]
    InvalidSymbol(String),

    #[error("Unknown command /{0}. Send /help for the list of commands.")]
    UnknownCommand(String),

    #[error("No market data available for {0} right now. Try again later.")]
    NoData(String),

    #[error("Options scanning is disabled.")]
    OptionsDisabled,

    #[error("{0} is watched as more than one kind. Use /stock, /forex or /commodity instead.")]
    AmbiguousSymbol(String),
}

/// A `/command arg...` message split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub name: String,
    pub args: Vec<String>,
}

impl ParsedCommand {
    /// Parse chat text such as `/stock@MyBot aapl`. Returns `None` for
    /// anything that is not a command.
    pub fn parse(text: &str) -> Option<Self> {
        let mut tokens = text.split_whitespace();
        let head = tokens.next()?.strip_prefix('/')?;
        let name = head.split('@').next().unwrap_or_default().to_lowercase();
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name,
            args: tokens.map(String::from).collect(),
        })
    }
}

pub const HELP_TEXT: &str = "Commands:\n\
/stock <TICKER> - AI signal for a stock\n\
/forex <PAIR> - AI signal for a currency pair (e.g. EURUSD)\n\
/commodity <PAIR> - AI signal for a commodity pair (e.g. XAUUSD)\n\
/signal <SYMBOL> - AI signal, kind detected automatically\n\
/options <TICKER> - unusual options activity\n\
/help - this message";

pub struct CommandHandler {
    composer: Arc<SignalComposer>,
    /// Kinds configured per symbol; a symbol may be watched as several kinds.
    known_kinds: HashMap<String, Vec<InstrumentKind>>,
}

impl CommandHandler {
    pub fn new(composer: Arc<SignalComposer>, watchlist: &[WatchedInstrument]) -> Self {
        let mut known_kinds: HashMap<String, Vec<InstrumentKind>> = HashMap::new();
        for w in watchlist {
            known_kinds
                .entry(w.instrument.symbol().to_string())
                .or_default()
                .push(w.instrument.kind());
        }
        Self {
            composer,
            known_kinds,
        }
    }

    /// Handle one command and return the reply text. Never fails: errors
    /// are rendered into the reply.
    pub async fn handle(&self, command: &str, args: &[String]) -> String {
        let name = command.trim_start_matches('/').to_lowercase();
        match self.dispatch(&name, args).await {
            Ok(reply) => {
                info!(command = %name, ?args, "Command handled");
                reply
            }
            Err(e) => {
                info!(command = %name, ?args, error = %e, "Command rejected");
                format!("⚠️ {e}")
            }
        }
    }

    async fn dispatch(&self, name: &str, args: &[String]) -> Result<String, CommandError> {
        match name {
            "start" | "help" => Ok(HELP_TEXT.to_string()),
            "stock" => {
                let token = first_arg(args, "/stock <TICKER>")?;
                self.signal_for(parse_as(token, InstrumentKind::Equity)?).await
            }
            "forex" => {
                let token = first_arg(args, "/forex <PAIR>")?;
                self.signal_for(parse_as(token, InstrumentKind::Forex)?).await
            }
            "commodity" => {
                let token = first_arg(args, "/commodity <PAIR>")?;
                self.signal_for(parse_as(token, InstrumentKind::Commodity)?).await
            }
            "signal" => {
                let token = first_arg(args, "/signal <SYMBOL>")?;
                self.signal_for(self.resolve(token)?).await
            }
            "options" => {
                let token = first_arg(args, "/options <TICKER>")?;
                self.options_for(parse_as(token, InstrumentKind::Equity)?).await
            }
            other => Err(CommandError::UnknownCommand(other.to_string())),
        }
    }

    /// Kind from the watch list when the symbol is configured once, else
    /// inferred. A symbol watched as several kinds is refused.
    fn resolve(&self, token: &str) -> Result<Instrument, CommandError> {
        let upper = token.trim().to_uppercase();
        match self.known_kinds.get(&upper).map(Vec::as_slice) {
            Some([kind]) => parse_as(&upper, *kind),
            Some([_, _, ..]) => Err(CommandError::AmbiguousSymbol(upper)),
            _ => Instrument::infer(&upper).map_err(|e| CommandError::InvalidSymbol(invalid_text(e))),
        }
    }

    async fn signal_for(&self, instrument: Instrument) -> Result<String, CommandError> {
        let quote = self.composer.fetch_quote(&instrument).await.map_err(|e| {
            warn!(symbol = %instrument, error = %e, "Quote failed for command");
            CommandError::NoData(instrument.symbol().to_string())
        })?;
        let signal = self.composer.compose(&instrument, quote).await;
        Ok(render_signal(&signal, self.composer.limits()))
    }

    async fn options_for(&self, instrument: Instrument) -> Result<String, CommandError> {
        if !self.composer.options_enabled() {
            return Err(CommandError::OptionsDisabled);
        }
        let unusual = self
            .composer
            .unusual_options(instrument.symbol())
            .await
            .unwrap_or_else(|e| {
                warn!(symbol = %instrument, error = %e, "Options fetch failed for command");
                Vec::new()
            });
        Ok(render_unusual_listing(
            instrument.symbol(),
            &unusual,
            self.composer.limits().options_command_rows,
        ))
    }
}

fn first_arg<'a>(args: &'a [String], usage: &'static str) -> Result<&'a str, CommandError> {
    args.first()
        .map(|s| s.as_str())
        .filter(|s| !s.trim().is_empty())
        .ok_or(CommandError::MissingArgument(usage))
}

fn parse_as(token: &str, kind: InstrumentKind) -> Result<Instrument, CommandError> {
    Instrument::new(token, kind).map_err(|e| CommandError::InvalidSymbol(invalid_text(e)))
}

fn invalid_text(e: crate::domain::error::DomainError) -> String {
    match e {
        crate::domain::error::DomainError::InvalidInput(msg) => msg,
        other => other.to_string(),
    }
}
