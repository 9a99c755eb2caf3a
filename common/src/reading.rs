use crate::sen5x::Sen5xData;

/// The latest value of every quantity the device measures.
///
/// A field is NaN until its sensor has reported it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reading {
    pub pm1_0: f32,
    pub pm2_5: f32,
    pub pm4_0: f32,
    pub pm10_0: f32,
    pub humidity: f32,
    /// [°C]
    pub temperature: f32,
    pub voc_index: f32,
    pub nox_index: f32,
    /// [ppm]
    pub co2: f32,
}

impl Default for Reading {
    fn default() -> Self {
        Self {
            pm1_0: f32::NAN,
            pm2_5: f32::NAN,
            pm4_0: f32::NAN,
            pm10_0: f32::NAN,
            humidity: f32::NAN,
            temperature: f32::NAN,
            voc_index: f32::NAN,
            nox_index: f32::NAN,
            co2: f32::NAN,
        }
    }
}

impl Reading {
    /// Overwrites every particulate sensor field, NaN included.
    pub fn apply_particulate(&mut self, data: &Sen5xData) {
        self.pm1_0 = data.pm1_0;
        self.pm2_5 = data.pm2_5;
        self.pm4_0 = data.pm4_0;
        self.pm10_0 = data.pm10_0;
        self.humidity = data.humidity;
        self.temperature = data.temperature;
        self.voc_index = data.voc_index;
        self.nox_index = data.nox_index;
    }

    pub fn apply_co2(&mut self, ppm: f32) {
        self.co2 = ppm;
    }

    fn fields(&self) -> [f32; 9] {
        [
            self.pm1_0,
            self.pm2_5,
            self.pm4_0,
            self.pm10_0,
            self.humidity,
            self.temperature,
            self.voc_index,
            self.nox_index,
            self.co2,
        ]
    }

    /// True when no field is NaN.
    pub fn is_complete(&self) -> bool {
        self.fields().iter().all(|v| !v.is_nan())
    }

    pub fn temperature_fahrenheit(&self) -> f32 {
        self.temperature * 9.0 / 5.0 + 32.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Sen5xData {
        Sen5xData {
            pm1_0: 1.0,
            pm2_5: 2.5,
            pm4_0: 4.0,
            pm10_0: 10.0,
            humidity: 40.0,
            temperature: 20.0,
            voc_index: 100.0,
            nox_index: 1.0,
        }
    }

    #[test]
    fn starts_incomplete() {
        assert!(!Reading::default().is_complete());
    }

    #[test]
    fn complete_after_both_sensors() {
        let mut reading = Reading::default();
        reading.apply_particulate(&sample());
        assert!(!reading.is_complete());

        reading.apply_co2(450.0);
        assert!(reading.is_complete());
    }

    #[test]
    fn nan_from_sensor_replaces_old_value() {
        let mut reading = Reading::default();
        reading.apply_particulate(&sample());
        reading.apply_co2(450.0);

        let mut warming_up = sample();
        warming_up.nox_index = f32::NAN;
        reading.apply_particulate(&warming_up);

        assert!(reading.nox_index.is_nan());
        assert_eq!(reading.co2, 450.0);
        assert!(!reading.is_complete());
    }

    #[test]
    fn fahrenheit_conversion() {
        let mut reading = Reading::default();
        reading.temperature = 25.0;
        assert_eq!(reading.temperature_fahrenheit(), 77.0);
        reading.temperature = -40.0;
        assert_eq!(reading.temperature_fahrenheit(), -40.0);
    }
}
