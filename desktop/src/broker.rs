use atmosphere_boi_common::mqtt::MqttSession;
use log::info;

#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    #[error("connection refused (attempt {0})")]
    Refused(u32),
    #[error("not connected")]
    NotConnected,
}

/// An MQTT session that logs what it would publish.
///
/// Refuses the first `refusals` connection attempts so the reconnect
/// path can be watched without a broker.
pub struct LoggingBroker {
    url: String,
    refusals: u32,
    attempts: u32,
    connected: bool,
    published: usize,
}

impl LoggingBroker {
    pub fn new(url: String, refusals: u32) -> Self {
        Self {
            url,
            refusals,
            attempts: 0,
            connected: false,
            published: 0,
        }
    }

    pub fn published(&self) -> usize {
        self.published
    }
}

impl MqttSession for LoggingBroker {
    type Error = BrokerError;

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn connect(&mut self) -> Result<(), Self::Error> {
        self.attempts += 1;
        if self.attempts <= self.refusals {
            return Err(BrokerError::Refused(self.attempts));
        }
        info!(target: "mqtt", "connected to {}", self.url);
        self.connected = true;
        Ok(())
    }

    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), Self::Error> {
        if !self.connected {
            return Err(BrokerError::NotConnected);
        }
        info!(
            target: "mqtt",
            "{}{} <- {}",
            topic,
            if retain { " (retained)" } else { "" },
            String::from_utf8_lossy(payload)
        );
        self.published += 1;
        Ok(())
    }
}
