use core::fmt::Display;
use std::time::Duration;

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::discovery::DiscoveryMessage;

/// A connection to the MQTT broker.
pub trait MqttSession {
    type Error: Display;

    fn is_connected(&self) -> bool;

    /// Tries once to establish the connection.
    fn connect(&mut self) -> Result<(), Self::Error>;

    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), Self::Error>;
}

/// Blocks until `session` is connected, retrying every `interval`.
///
/// Returns the number of failed attempts.
pub fn ensure_connected<S, D>(session: &mut S, delay: &mut D, interval: Duration) -> u32
where
    S: MqttSession,
    D: DelayNs,
{
    let mut failures = 0;

    while !session.is_connected() {
        info!("Attempting MQTT connection...");
        match session.connect() {
            Ok(()) => {
                info!("MQTT connected");
            }
            Err(e) => {
                failures += 1;
                warn!(
                    "MQTT connection failed: {}, try again in {} seconds",
                    e,
                    interval.as_secs()
                );
                delay.delay_ms(interval.as_millis() as u32);
            }
        }
    }

    failures
}

/// Connects `session` and publishes the retained discovery messages.
pub fn announce<S, D>(
    session: &mut S,
    delay: &mut D,
    interval: Duration,
    messages: &[DiscoveryMessage],
) where
    S: MqttSession,
    D: DelayNs,
{
    ensure_connected(session, delay, interval);

    for message in messages {
        if let Err(e) = session.publish(&message.topic, message.payload.as_bytes(), true) {
            warn!("Failed to publish discovery to {}: {}", message.topic, e);
        }
    }
    info!("Announced {} entities", messages.len());
}
