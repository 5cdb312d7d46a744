use crate::domain::entities::article::{Filing, Headline};
use crate::domain::entities::instrument::Instrument;
use crate::domain::entities::options::UnusualOption;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Auxiliary context gathered for one instrument.
///
/// A section is `None` when it does not apply (turned off in config, or not
/// an equity) and `Some(vec![])` when the source was consulted and had
/// nothing, including when it failed or has no credentials.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuxiliaryContext {
    pub unusual_options: Option<Vec<UnusualOption>>,
    pub headlines: Option<Vec<Headline>>,
    pub filings: Option<Vec<Filing>>,
}

/// Everything needed to render one chat message for an instrument.
#[derive(Debug, Clone, Serialize)]
pub struct SignalMessage {
    pub instrument: Instrument,
    pub value: f64,
    pub volume: Option<u64>,
    pub narrative: String,
    pub context: AuxiliaryContext,
    pub generated_at: DateTime<Utc>,
}

impl SignalMessage {
    pub fn new(
        instrument: Instrument,
        value: f64,
        volume: Option<u64>,
        narrative: String,
        context: AuxiliaryContext,
    ) -> Self {
        Self {
            instrument,
            value,
            volume,
            narrative,
            context,
            generated_at: Utc::now(),
        }
    }
}
