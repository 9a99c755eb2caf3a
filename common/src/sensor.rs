use core::fmt::Display;

use crate::sen5x::Sen5xData;

/// A source of particulate, humidity, temperature, VOC and NOx values.
///
/// Implemented by the SEN5x driver on the device and by the simulator
/// on the desktop.
pub trait ParticulateSensor {
    type Error: Display;

    /// Reads the latest values. Fields the sensor cannot provide yet
    /// are NaN.
    fn read(&mut self) -> Result<Sen5xData, Self::Error>;
}

/// A source of CO2 concentrations that produces values at its own pace.
pub trait Co2Sensor {
    type Error: Display;

    /// Whether a fresh value can be read.
    fn data_ready(&mut self) -> Result<bool, Self::Error>;

    /// Reads the CO2 concentration in ppm.
    fn read_co2(&mut self) -> Result<f32, Self::Error>;
}
