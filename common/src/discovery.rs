//! Home Assistant MQTT discovery.
//!
//! One retained config message per entity tells Home Assistant how to
//! pick its value out of the shared state message.

use serde::Serialize;

use crate::config::Config;

/// An entity announced to Home Assistant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Entity {
    /// Last part of the unique object id.
    pub suffix: &'static str,
    /// Appended to the device name.
    pub label: &'static str,
    /// Key in the state message.
    pub key: &'static str,
    pub unit: Option<&'static str>,
    pub device_class: &'static str,
}

pub const ENTITIES: [Entity; 6] = [
    Entity {
        suffix: "pm25",
        label: "PM2.5",
        key: "pm25",
        unit: Some("µg/m³"),
        device_class: "pm25",
    },
    Entity {
        suffix: "humidity",
        label: "Humidity",
        key: "humidity",
        unit: Some("%"),
        device_class: "humidity",
    },
    Entity {
        suffix: "temp",
        label: "Temperature",
        key: "temperature",
        unit: Some("˚F"),
        device_class: "temperature",
    },
    Entity {
        suffix: "voc",
        label: "VOC Index",
        key: "voc",
        unit: None,
        device_class: "aqi",
    },
    Entity {
        suffix: "nox",
        label: "NOX Index",
        key: "nox",
        unit: None,
        device_class: "aqi",
    },
    Entity {
        suffix: "co2",
        label: "CO2",
        key: "co2",
        unit: Some("ppm"),
        device_class: "carbon_dioxide",
    },
];

/// Discovery config payload, using Home Assistant's abbreviated keys.
#[derive(Debug, Serialize)]
struct SensorConfig<'a> {
    name: String,
    #[serde(rename = "stat_t")]
    state_topic: &'a str,
    #[serde(rename = "unit_of_meas", skip_serializing_if = "Option::is_none")]
    unit: Option<&'a str>,
    #[serde(rename = "dev_cla")]
    device_class: &'a str,
    #[serde(rename = "frc_upd")]
    force_update: bool,
    #[serde(rename = "val_tpl")]
    value_template: String,
}

/// A message ready to publish, retained.
#[derive(Clone, Debug, PartialEq)]
pub struct DiscoveryMessage {
    pub topic: String,
    pub payload: String,
}

impl Entity {
    pub fn topic(&self, config: &Config) -> String {
        format!(
            "{}/sensor/{}_{}/config",
            config.mqtt.discovery_prefix, config.device.node_id, self.suffix
        )
    }

    pub fn message(&self, config: &Config) -> serde_json::Result<DiscoveryMessage> {
        let payload = SensorConfig {
            name: format!("{} {}", config.device.name, self.label),
            state_topic: &config.mqtt.state_topic,
            unit: self.unit,
            device_class: self.device_class,
            force_update: true,
            value_template: format!("{{{{ value_json.{}|default(0) }}}}", self.key),
        };

        Ok(DiscoveryMessage {
            topic: self.topic(config),
            payload: serde_json::to_string(&payload)?,
        })
    }
}

/// The discovery messages for every entity, in announcement order.
pub fn messages(config: &Config) -> serde_json::Result<Vec<DiscoveryMessage>> {
    ENTITIES.iter().map(|e| e.message(config)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn six_topics_in_order() {
        let topics: Vec<String> = messages(&Config::default())
            .unwrap()
            .into_iter()
            .map(|m| m.topic)
            .collect();

        assert_eq!(
            topics,
            [
                "homeassistant/sensor/atmosphereBoiV6_pm25/config",
                "homeassistant/sensor/atmosphereBoiV6_humidity/config",
                "homeassistant/sensor/atmosphereBoiV6_temp/config",
                "homeassistant/sensor/atmosphereBoiV6_voc/config",
                "homeassistant/sensor/atmosphereBoiV6_nox/config",
                "homeassistant/sensor/atmosphereBoiV6_co2/config",
            ]
        );
    }

    #[test]
    fn pm25_payload() {
        let message = ENTITIES[0].message(&Config::default()).unwrap();
        assert_eq!(
            message.payload,
            r#"{"name":"Atmosphere Boi V6 PM2.5","stat_t":"home/sensor/atmosphereBoiV6/value","unit_of_meas":"µg/m³","dev_cla":"pm25","frc_upd":true,"val_tpl":"{{ value_json.pm25|default(0) }}"}"#
        );
    }

    #[test]
    fn indices_have_no_unit() {
        let config = Config::default();
        for entity in ENTITIES.iter().filter(|e| e.device_class == "aqi") {
            let message = entity.message(&config).unwrap();
            let value: serde_json::Value = serde_json::from_str(&message.payload).unwrap();
            assert!(value.get("unit_of_meas").is_none());
            assert_eq!(value["frc_upd"], true);
        }
    }

    #[test]
    fn prefix_and_node_follow_config() {
        let mut config = Config::default();
        config.mqtt.discovery_prefix = "ha".into();
        config.device.node_id = "bedroom".into();

        assert_eq!(ENTITIES[5].topic(&config), "ha/sensor/bedroom_co2/config");
    }
}
