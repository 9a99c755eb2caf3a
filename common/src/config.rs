use std::net::Ipv4Addr;
use std::time::Duration;

use serde::Deserialize;

/// Runtime configuration. Every section falls back to the defaults of
/// the V6 hardware when it is left out.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub device: DeviceConfig,
    pub wifi: WifiConfig,
    pub mqtt: MqttConfig,
    pub display: DisplayConfig,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct DeviceConfig {
    /// Human readable name, used on screen and in Home Assistant.
    pub name: String,
    /// Identifier used in discovery topics.
    pub node_id: String,
    /// Constant offset applied by the particulate sensor [°C].
    pub temperature_offset: f32,
    pub poll_interval_ms: u32,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: "Atmosphere Boi V6".into(),
            node_id: "atmosphereBoiV6".into(),
            temperature_offset: 0.0,
            poll_interval_ms: 1000,
        }
    }
}

impl DeviceConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.into())
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct WifiConfig {
    pub ssid: String,
    pub password: String,
    /// Fixed IPv4 settings; DHCP is used when absent.
    pub static_ip: Option<StaticIpConfig>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct StaticIpConfig {
    pub address: Ipv4Addr,
    pub gateway: Ipv4Addr,
    pub netmask: Ipv4Addr,
    pub primary_dns: Ipv4Addr,
    pub secondary_dns: Ipv4Addr,
}

impl Default for StaticIpConfig {
    fn default() -> Self {
        Self {
            address: Ipv4Addr::new(192, 168, 100, 67),
            gateway: Ipv4Addr::new(192, 168, 100, 1),
            netmask: Ipv4Addr::new(255, 255, 255, 0),
            primary_dns: Ipv4Addr::new(1, 1, 1, 1),
            secondary_dns: Ipv4Addr::new(1, 0, 0, 1),
        }
    }
}

impl StaticIpConfig {
    /// Netmask as a CIDR prefix length.
    pub fn prefix_len(&self) -> u8 {
        u32::from(self.netmask).count_ones() as u8
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct MqttConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    pub client_id: String,
    pub state_topic: String,
    pub discovery_prefix: String,
    pub reconnect_interval_ms: u32,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: "192.168.100.42".into(),
            port: 1883,
            client_id: "Atmosphere_Boi_V6".into(),
            state_topic: "home/sensor/atmosphereBoiV6/value".into(),
            discovery_prefix: "homeassistant".into(),
            reconnect_interval_ms: 5000,
        }
    }
}

/// Shortest wait between broker connection attempts.
pub const MIN_RECONNECT_INTERVAL_MS: u32 = 100;

impl MqttConfig {
    /// Wait between connection attempts, never below
    /// [`MIN_RECONNECT_INTERVAL_MS`].
    pub fn reconnect_interval(&self) -> Duration {
        let ms = self.reconnect_interval_ms.max(MIN_RECONNECT_INTERVAL_MS);
        Duration::from_millis(ms.into())
    }

    pub fn url(&self) -> String {
        format!("mqtt://{}:{}", self.host, self.port)
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    pub enabled: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}
