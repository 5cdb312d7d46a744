use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentKind {
    /// Listed equity, quoted in price and traded volume
    #[default]
    Equity,
    /// Currency pair such as EURUSD, quoted as an exchange rate
    Forex,
    /// Metal or other commodity pair such as XAUUSD
    Commodity,
}

impl InstrumentKind {
    /// Chat command that requests a signal for this kind.
    pub fn command(&self) -> &'static str {
        match self {
            Self::Equity => "stock",
            Self::Forex => "forex",
            Self::Commodity => "commodity",
        }
    }

    pub fn is_pair(&self) -> bool {
        matches!(self, Self::Forex | Self::Commodity)
    }
}

impl fmt::Display for InstrumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equity => write!(f, "equity"),
            Self::Forex => write!(f, "forex"),
            Self::Commodity => write!(f, "commodity"),
        }
    }
}

impl FromStr for InstrumentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "equity" | "stock" => Ok(Self::Equity),
            "forex" | "fx" => Ok(Self::Forex),
            "commodity" | "metal" => Ok(Self::Commodity),
            _ => Err(format!(
                "Unknown instrument kind: '{s}'. Use 'equity', 'forex' or 'commodity'"
            )),
        }
    }
}
