//! Periodic sweep over the watch list.
//!
//! Each cycle fetches every instrument in configured order, gates it against
//! the previous cycle's value, composes signals for the instruments that
//! clear the gate (earliest-configured first, up to the per-cycle cap) and
//! fans the rendered messages out to every chat channel. The optional cycle
//! header is prefixed to the first message, never sent on its own.

use crate::application::compose::SignalComposer;
use crate::application::delivery::{deliver, DeliveryReport};
use crate::application::format::{cycle_header, render_signal};
use crate::application::observed::{FirstObservation, GateDecision, ObservedValues};
use crate::config::WatchedInstrument;
use crate::domain::ports::chat_channel::ChatChannel;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy)]
pub struct LoopSettings {
    pub interval: Duration,
    pub max_messages_per_cycle: usize,
    pub first_observation: FirstObservation,
    pub send_header: bool,
    pub delivery_timeout: Duration,
}

#[derive(Debug, Serialize)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub evaluated: usize,
    /// Symbols that produced a message, in send order.
    pub reported: Vec<String>,
    pub below_threshold: Vec<String>,
    pub seeded: Vec<String>,
    pub no_data: Vec<String>,
    /// Cleared the gate but fell past the per-cycle cap.
    pub suppressed: Vec<String>,
    /// Rendered signal messages, without the cycle header.
    #[serde(skip_serializing)]
    pub messages: Vec<String>,
    pub delivery: DeliveryReport,
}

impl CycleReport {
    fn new(evaluated: usize) -> Self {
        Self {
            started_at: Utc::now(),
            evaluated,
            reported: Vec::new(),
            below_threshold: Vec::new(),
            seeded: Vec::new(),
            no_data: Vec::new(),
            suppressed: Vec::new(),
            messages: Vec::new(),
            delivery: DeliveryReport::default(),
        }
    }
}

pub struct SignalLoop {
    composer: Arc<SignalComposer>,
    watchlist: Vec<WatchedInstrument>,
    channels: Vec<Arc<dyn ChatChannel>>,
    settings: LoopSettings,
}

impl SignalLoop {
    pub fn new(
        composer: Arc<SignalComposer>,
        watchlist: Vec<WatchedInstrument>,
        channels: Vec<Arc<dyn ChatChannel>>,
        settings: LoopSettings,
    ) -> Self {
        Self {
            composer,
            watchlist,
            channels,
            settings,
        }
    }

    pub fn watchlist(&self) -> &[WatchedInstrument] {
        &self.watchlist
    }

    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name()).collect()
    }

    pub async fn run_cycle(&self, state: &mut ObservedValues) -> CycleReport {
        let mut report = CycleReport::new(self.watchlist.len());

        for watched in &self.watchlist {
            let instrument = &watched.instrument;
            let symbol = instrument.symbol().to_string();

            let quote = match self.composer.fetch_quote(instrument).await {
                Ok(q) => q,
                Err(e) => {
                    warn!(symbol = %instrument, error = %e, "No data this cycle");
                    report.no_data.push(symbol);
                    continue;
                }
            };

            match state.observe(
                instrument,
                quote.value,
                watched.threshold,
                self.settings.first_observation,
            ) {
                GateDecision::Report { change } => {
                    debug!(symbol = %instrument, value = quote.value, ?change, "Cleared threshold");
                }
                GateDecision::BelowThreshold { change } => {
                    debug!(symbol = %instrument, value = quote.value, change, threshold = watched.threshold, "Below threshold");
                    report.below_threshold.push(symbol);
                    continue;
                }
                GateDecision::Seeded => {
                    debug!(symbol = %instrument, value = quote.value, "Seeded baseline");
                    report.seeded.push(symbol);
                    continue;
                }
            }

            if report.messages.len() >= self.settings.max_messages_per_cycle {
                report.suppressed.push(symbol);
                continue;
            }

            let signal = self.composer.compose(instrument, quote).await;
            report
                .messages
                .push(render_signal(&signal, self.composer.limits()));
            report.reported.push(symbol);
        }

        if !report.messages.is_empty() {
            let mut outgoing = report.messages.clone();
            if self.settings.send_header {
                // Header shares the first message; sends per cycle stay within the cap.
                outgoing[0] = format!("{}\n\n{}", cycle_header(report.started_at), outgoing[0]);
            }
            report.delivery =
                deliver(&self.channels, &outgoing, self.settings.delivery_timeout).await;
        }

        info!(
            evaluated = report.evaluated,
            reported = report.reported.len(),
            below_threshold = report.below_threshold.len(),
            seeded = report.seeded.len(),
            no_data = report.no_data.len(),
            suppressed = report.suppressed.len(),
            delivery_failures = report.delivery.failures.len(),
            "Cycle complete"
        );
        report
    }

    /// Run cycles forever, sleeping `interval` between them. Stops only when
    /// the surrounding task is dropped.
    pub async fn run(&self, mut state: ObservedValues) {
        let mut cycle: u64 = 0;
        loop {
            cycle += 1;
            debug!(cycle, tracked = state.len(), "Starting cycle");
            self.run_cycle(&mut state).await;
            tokio::time::sleep(self.settings.interval).await;
        }
    }
}
