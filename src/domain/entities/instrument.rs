use crate::domain::error::DomainError;
use crate::domain::values::instrument_kind::InstrumentKind;
use serde::Serialize;
use std::fmt;

const MAX_EQUITY_SYMBOL_LEN: usize = 15;

/// ISO 4217 codes accepted as forex pair legs.
const CURRENCIES: &[&str] = &[
    "USD", "EUR", "GBP", "JPY", "CHF", "CAD", "AUD", "NZD", "CNY", "HKD", "SGD", "SEK", "NOK",
    "DKK", "PLN", "CZK", "HUF", "TRY", "ZAR", "MXN", "BRL", "INR", "KRW", "RUB", "ILS", "THB",
    "IDR", "MYR", "PHP", "TWD", "AED", "SAR",
];

/// Precious-metal codes; a pair with one of these legs is a commodity.
const METALS: &[&str] = &["XAU", "XAG", "XPT", "XPD"];

/// A tracked market instrument: an uppercased symbol tagged with its kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Instrument {
    symbol: String,
    kind: InstrumentKind,
}

impl Instrument {
    pub fn new(symbol: &str, kind: InstrumentKind) -> Result<Self, DomainError> {
        let symbol = symbol.trim().to_uppercase();
        match kind {
            InstrumentKind::Equity => validate_equity(&symbol)?,
            InstrumentKind::Forex | InstrumentKind::Commodity => validate_pair(&symbol)?,
        }
        Ok(Self { symbol, kind })
    }

    pub fn equity(symbol: &str) -> Result<Self, DomainError> {
        Self::new(symbol, InstrumentKind::Equity)
    }

    pub fn forex(symbol: &str) -> Result<Self, DomainError> {
        Self::new(symbol, InstrumentKind::Forex)
    }

    pub fn commodity(symbol: &str) -> Result<Self, DomainError> {
        Self::new(symbol, InstrumentKind::Commodity)
    }

    /// Guess the kind of a bare token: six-letter codes made of known
    /// currency/metal legs are pairs, anything else is an equity ticker.
    pub fn infer(token: &str) -> Result<Self, DomainError> {
        let upper = token.trim().to_uppercase();
        if upper.len() == 6 && upper.is_ascii() {
            let (base, quote) = upper.split_at(3);
            let is_metal = |code: &str| METALS.contains(&code);
            let is_currency = |code: &str| CURRENCIES.contains(&code);
            if (is_metal(base) && is_currency(quote)) || (is_currency(base) && is_metal(quote)) {
                return Self::commodity(&upper);
            }
            if is_currency(base) && is_currency(quote) {
                return Self::forex(&upper);
            }
        }
        Self::equity(&upper)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn kind(&self) -> InstrumentKind {
        self.kind
    }

    /// Base and quote legs for forex/commodity pairs.
    pub fn pair(&self) -> Option<(&str, &str)> {
        if self.kind.is_pair() {
            Some(self.symbol.split_at(3))
        } else {
            None
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

fn validate_equity(symbol: &str) -> Result<(), DomainError> {
    if symbol.is_empty() || symbol.len() > MAX_EQUITY_SYMBOL_LEN {
        return Err(DomainError::InvalidInput(format!(
            "'{symbol}' is not a valid ticker (1-{MAX_EQUITY_SYMBOL_LEN} characters)"
        )));
    }
    let allowed = |c: char| c.is_ascii_uppercase() || c.is_ascii_digit() || ".-^=".contains(c);
    if !symbol.chars().all(allowed) {
        return Err(DomainError::InvalidInput(format!(
            "'{symbol}' is not a valid ticker"
        )));
    }
    Ok(())
}

fn validate_pair(symbol: &str) -> Result<(), DomainError> {
    if symbol.len() != 6 || !symbol.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(DomainError::InvalidInput(format!(
            "'{symbol}' is not a valid pair code (expected six letters, e.g. EURUSD)"
        )));
    }
    Ok(())
}
