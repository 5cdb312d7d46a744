//! Prompt construction for the AI provider.

use crate::domain::entities::instrument::Instrument;
use crate::domain::entities::signal_message::AuxiliaryContext;
use crate::domain::ports::market_data::Quote;
use crate::domain::values::instrument_kind::InstrumentKind;

const INSTRUCTION: &str =
    "Generate a concise Buy/Sell/Hold signal and confidence (0-100%). Provide short reasoning.";

pub fn build_prompt(instrument: &Instrument, quote: &Quote, ctx: &AuxiliaryContext) -> String {
    let mut lines = match instrument.kind() {
        InstrumentKind::Equity => vec![
            format!("Analyze stock {} with:", instrument.symbol()),
            format!("- Price: {} USD", quote.value),
            format!("- Volume: {}", display_volume(quote.volume)),
        ],
        InstrumentKind::Forex => vec![
            format!("Analyze forex pair {} with:", instrument.symbol()),
            format!("- Rate: {}", quote.value),
        ],
        InstrumentKind::Commodity => vec![
            format!("Analyze commodity {} with:", instrument.symbol()),
            format!("- Price: {}", quote.value),
        ],
    };

    if let Some(unusual) = &ctx.unusual_options {
        let items: Vec<String> = unusual
            .iter()
            .map(|u| {
                format!(
                    "{} strike {} exp {} vol {} last {}",
                    u.side, u.strike, u.expiration, u.volume, u.last_price
                )
            })
            .collect();
        lines.push(format!("- Options unusual activity: {}", list_or_none(&items)));
    }
    if let Some(headlines) = &ctx.headlines {
        let items: Vec<String> = headlines.iter().map(|h| h.title.clone()).collect();
        lines.push(format!("- News headlines: {}", list_or_none(&items)));
    }
    if let Some(filings) = &ctx.filings {
        let items: Vec<String> = filings.iter().map(|f| f.title.clone()).collect();
        lines.push(format!("- SEC filings: {}", list_or_none(&items)));
    }

    lines.push(INSTRUCTION.to_string());
    lines.join("\n")
}

fn display_volume(volume: Option<u64>) -> String {
    volume.map_or_else(|| "unknown".to_string(), |v| v.to_string())
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join("; ")
    }
}
