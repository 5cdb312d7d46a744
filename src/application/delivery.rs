use crate::application::timeout::with_timeout;
use crate::domain::ports::chat_channel::ChatChannel;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, Serialize)]
pub struct DeliveryReport {
    pub attempted: usize,
    pub delivered: usize,
    pub failures: Vec<DeliveryFailure>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeliveryFailure {
    pub channel: String,
    pub error: String,
}

/// Send every message to every channel, in message order. A failing channel
/// is logged and skipped for that message only.
pub async fn deliver(
    channels: &[Arc<dyn ChatChannel>],
    messages: &[String],
    limit: Duration,
) -> DeliveryReport {
    let mut report = DeliveryReport::default();
    for message in messages {
        for channel in channels {
            report.attempted += 1;
            match with_timeout(limit, channel.send(message)).await {
                Ok(()) => {
                    report.delivered += 1;
                    debug!(channel = channel.name(), len = message.len(), "Delivered message");
                }
                Err(e) => {
                    warn!(channel = channel.name(), error = %e, "Delivery failed");
                    report.failures.push(DeliveryFailure {
                        channel: channel.name().to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }
    }
    report
}
