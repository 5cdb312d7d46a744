//! Last observed value per instrument, owned by the signal loop.

use crate::domain::entities::instrument::Instrument;
use crate::domain::values::relative_change::{clears_threshold, relative_change};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What to do with an instrument seen for the first time since startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FirstObservation {
    /// Report it: there is no baseline, so the change counts as undefined.
    #[default]
    Report,
    /// Record it as the baseline without reporting.
    Seed,
}

/// Outcome of passing one fresh value through the threshold gate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GateDecision {
    /// Report; `change` is `None` when there was no usable baseline.
    Report { change: Option<f64> },
    BelowThreshold { change: f64 },
    Seeded,
}

impl GateDecision {
    pub fn is_report(&self) -> bool {
        matches!(self, GateDecision::Report { .. })
    }
}

/// Single-owner map of the most recent value seen for each instrument.
///
/// Lost on restart. Only the signal loop holds one; it is passed by `&mut`
/// into each cycle.
#[derive(Debug, Default)]
pub struct ObservedValues {
    values: HashMap<Instrument, f64>,
}

impl ObservedValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, instrument: &Instrument) -> Option<f64> {
        self.values.get(instrument).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Gate `current` against the previous value, then record `current`
    /// unconditionally so the next cycle measures from it.
    pub fn observe(
        &mut self,
        instrument: &Instrument,
        current: f64,
        threshold: f64,
        first: FirstObservation,
    ) -> GateDecision {
        let previous = self.values.insert(instrument.clone(), current);
        match previous {
            None => match first {
                FirstObservation::Report => GateDecision::Report { change: None },
                FirstObservation::Seed => GateDecision::Seeded,
            },
            Some(last) => {
                let change = relative_change(last, current);
                if clears_threshold(last, current, threshold) {
                    GateDecision::Report { change }
                } else {
                    GateDecision::BelowThreshold {
                        change: change.unwrap_or_default(),
                    }
                }
            }
        }
    }
}
