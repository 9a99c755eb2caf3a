use serde::Serialize;

use crate::reading::Reading;

/// The state message Home Assistant reads its sensor values from.
///
/// Temperature is published in °F. Values carry two decimals.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct StatePayload {
    pub humidity: f64,
    pub temperature: f64,
    pub voc: f64,
    pub nox: f64,
    pub co2: f64,
    pub pm25: f64,
}

fn two_decimals(value: f32) -> f64 {
    (f64::from(value) * 100.0).round() / 100.0
}

impl From<&Reading> for StatePayload {
    fn from(reading: &Reading) -> Self {
        Self {
            humidity: two_decimals(reading.humidity),
            temperature: two_decimals(reading.temperature_fahrenheit()),
            voc: two_decimals(reading.voc_index),
            nox: two_decimals(reading.nox_index),
            co2: two_decimals(reading.co2),
            pm25: two_decimals(reading.pm2_5),
        }
    }
}

impl StatePayload {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
