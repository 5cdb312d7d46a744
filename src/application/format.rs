//! Chat message rendering.

use crate::config::OutputLimits;
use crate::domain::entities::options::UnusualOption;
use crate::domain::entities::signal_message::SignalMessage;
use crate::domain::values::instrument_kind::InstrumentKind;
use chrono::{DateTime, Utc};

pub fn bold(text: &str) -> String {
    format!("*{text}*")
}

pub fn cycle_header(now: DateTime<Utc>) -> String {
    format!(
        "🚀 {} - {}",
        bold("Market Signal Update"),
        now.format("%Y-%m-%d %H:%M UTC")
    )
}

pub fn render_signal(msg: &SignalMessage, limits: &OutputLimits) -> String {
    let inst = &msg.instrument;
    let mut out = vec![bold(inst.symbol())];

    match inst.kind() {
        InstrumentKind::Equity => {
            out.push(format!("Price: ${:.2}", msg.value));
            if let Some(volume) = msg.volume {
                out.push(format!("Volume: {volume}"));
            }
        }
        InstrumentKind::Forex => out.push(format!("Rate: {:.4}", msg.value)),
        InstrumentKind::Commodity => out.push(format!("Price: ${:.2}", msg.value)),
    }
    out.push(format!("Signal: {}", msg.narrative.trim()));

    if let Some(unusual) = &msg.context.unusual_options {
        if unusual.is_empty() {
            out.push("Options Unusual: none".into());
        } else {
            out.push("Options Unusual:".into());
            out.extend(
                unusual
                    .iter()
                    .take(limits.max_option_rows)
                    .map(|u| format!("• {}", option_line(u))),
            );
        }
    }
    if let Some(headlines) = &msg.context.headlines {
        if headlines.is_empty() {
            out.push("News: No major headlines".into());
        } else {
            out.push("News:".into());
            out.extend(
                headlines
                    .iter()
                    .take(limits.max_headlines)
                    .map(|h| format!("• {} ({})", h.title, h.url)),
            );
        }
    }
    if let Some(filings) = &msg.context.filings {
        if filings.is_empty() {
            out.push("Filings: No recent filings".into());
        } else {
            out.push("Filings:".into());
            out.extend(
                filings
                    .iter()
                    .take(limits.max_filings)
                    .map(|f| format!("• {} ({})", f.title, f.url)),
            );
        }
    }

    out.join("\n")
}

/// Reply body for the `/options` command.
pub fn render_unusual_listing(symbol: &str, unusual: &[UnusualOption], max_rows: usize) -> String {
    if unusual.is_empty() {
        return format!("No unusual options activity for {symbol}.");
    }
    let mut out = vec![format!("📈 {symbol} Options Unusual Activity:")];
    out.extend(unusual.iter().take(max_rows).map(option_line));
    if unusual.len() > max_rows {
        out.push(format!("(+{} more)", unusual.len() - max_rows));
    }
    out.join("\n")
}

fn option_line(u: &UnusualOption) -> String {
    format!(
        "{} {} exp {} vol {} last ${:.2}",
        u.side, u.strike, u.expiration, u.volume, u.last_price
    )
}

/// Cut `text` to at most `max_chars` characters, marking the cut with an ellipsis.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(1);
    let mut out: String = text.chars().take(keep).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::article::{Filing, Headline};
    use crate::domain::entities::instrument::Instrument;
    use crate::domain::entities::signal_message::AuxiliaryContext;
    use crate::domain::values::option_side::OptionSide;
    use chrono::NaiveDate;

    fn unusual(strike: f64) -> UnusualOption {
        UnusualOption {
            side: OptionSide::Call,
            strike,
            volume: 5000,
            expiration: NaiveDate::from_ymd_opt(2025, 6, 20).unwrap(),
            last_price: 2.5,
        }
    }

    #[test]
    fn test_equity_message_sections() {
        let msg = SignalMessage::new(
            Instrument::equity("AAPL").unwrap(),
            187.456,
            Some(1000),
            "BUY, 70% confidence".into(),
            AuxiliaryContext {
                unusual_options: Some((0..5).map(|i| unusual(100.0 + i as f64)).collect()),
                headlines: Some(vec![]),
                filings: Some(vec![Filing {
                    title: "10-Q filed 2025-05-02".into(),
                    url: "https://sec.example/1".into(),
                }]),
            },
        );
        let text = render_signal(&msg, &OutputLimits::default());
        assert!(text.starts_with("*AAPL*\nPrice: $187.46\nVolume: 1000\nSignal: BUY, 70% confidence"));
        assert_eq!(text.matches("• CALL").count(), 3);
        assert!(text.contains("• CALL 100 exp 2025-06-20 vol 5000 last $2.50"));
        assert!(text.contains("News: No major headlines"));
        assert!(text.contains("• 10-Q filed 2025-05-02 (https://sec.example/1)"));
    }

    #[test]
    fn test_forex_message_has_no_equity_sections() {
        let msg = SignalMessage::new(
            Instrument::forex("EURUSD").unwrap(),
            1.08421,
            None,
            "HOLD".into(),
            AuxiliaryContext {
                headlines: Some(vec![Headline {
                    title: "ECB holds".into(),
                    url: "https://news.example/ecb".into(),
                }]),
                ..Default::default()
            },
        );
        let text = render_signal(&msg, &OutputLimits::default());
        assert_eq!(
            text,
            "*EURUSD*\nRate: 1.0842\nSignal: HOLD\nNews:\n• ECB holds (https://news.example/ecb)"
        );
    }

    #[test]
    fn test_listing_caps_rows() {
        let rows: Vec<UnusualOption> = (0..4).map(|i| unusual(i as f64)).collect();
        let text = render_unusual_listing("TSLA", &rows, 2);
        assert_eq!(text.lines().count(), 4);
        assert!(text.ends_with("(+2 more)"));
        assert_eq!(
            render_unusual_listing("TSLA", &[], 10),
            "No unusual options activity for TSLA."
        );
    }

    #[test]
    fn test_truncate_on_char_boundary() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("ééééé", 3), "éé…");
    }
}
