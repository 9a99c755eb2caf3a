use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use atmosphere_boi_common::config::MqttConfig;
use atmosphere_boi_common::mqtt::MqttSession;
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::mqtt::client::{EspMqttClient, EventPayload, MqttClientConfiguration, QoS};
use esp_idf_svc::sys::EspError;
use log::{info, warn};

const POLL_MS: u32 = 100;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("mqtt client error: {0}")]
    Client(#[from] EspError),
    #[error("broker did not accept the connection within {0:?}")]
    Timeout(Duration),
    #[error("not connected")]
    NotConnected,
}

/// The ESP-IDF MQTT client behind [`MqttSession`].
///
/// The client connects in the background; the connection flag is
/// kept up to date from its event callback.
pub struct EspSession {
    url: String,
    client_id: String,
    timeout: Duration,
    connected: Arc<AtomicBool>,
    client: Option<EspMqttClient<'static>>,
}

impl EspSession {
    pub fn new(config: &MqttConfig) -> Self {
        Self {
            url: config.url(),
            client_id: config.client_id.clone(),
            timeout: config
                .reconnect_interval()
                .max(Duration::from_millis(POLL_MS.into())),
            connected: Arc::new(AtomicBool::new(false)),
            client: None,
        }
    }

    fn start_client(&mut self) -> Result<EspMqttClient<'static>, EspError> {
        let connected = self.connected.clone();
        let conf = MqttClientConfiguration {
            client_id: Some(&self.client_id),
            ..Default::default()
        };

        EspMqttClient::new_cb(&self.url, &conf, move |event| match event.payload() {
            EventPayload::Connected(_) => {
                connected.store(true, Ordering::Relaxed);
            }
            EventPayload::Disconnected => {
                connected.store(false, Ordering::Relaxed);
            }
            EventPayload::Error(e) => {
                warn!("MQTT error: {:?}", e);
            }
            _ => {}
        })
    }
}

impl MqttSession for EspSession {
    type Error = SessionError;

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    fn connect(&mut self) -> Result<(), Self::Error> {
        if self.client.is_none() {
            info!("Connecting to {} as {}", self.url, self.client_id);
            self.client = Some(self.start_client()?);
        }

        let mut waited = Duration::ZERO;
        while waited < self.timeout {
            if self.is_connected() {
                return Ok(());
            }
            FreeRtos::delay_ms(POLL_MS);
            waited += Duration::from_millis(POLL_MS.into());
        }

        Err(SessionError::Timeout(self.timeout))
    }

    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), Self::Error> {
        let client = self.client.as_mut().ok_or(SessionError::NotConnected)?;
        client.publish(topic, QoS::AtMostOnce, retain, payload)?;
        Ok(())
    }
}
