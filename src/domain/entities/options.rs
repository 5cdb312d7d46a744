use crate::domain::values::option_side::OptionSide;
use chrono::NaiveDate;
use serde::Serialize;

/// One contract row of an option chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionRow {
    pub strike: f64,
    /// Traded volume; `None` when the venue reported no trades field.
    pub volume: Option<u64>,
    pub last_price: f64,
}

/// Calls and puts for a single expiration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionChainSnapshot {
    pub expiration: NaiveDate,
    pub calls: Vec<OptionRow>,
    pub puts: Vec<OptionRow>,
}

/// A contract flagged by the unusual-volume scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnusualOption {
    pub side: OptionSide,
    pub strike: f64,
    pub volume: u64,
    pub expiration: NaiveDate,
    pub last_price: f64,
}
