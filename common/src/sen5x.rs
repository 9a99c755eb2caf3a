//! Driver for the Sensirion SEN5x environmental sensor node.
//!
//! The SEN55 variant reports particulate matter, humidity, temperature,
//! VOC and NOx indices. Values the sensor cannot provide yet (the NOx
//! index during warm-up, for instance) come back as NaN.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::error::SensorError;
use crate::sensirion::{read_words, words_to_string, write_command};
use crate::sensor::ParticulateSensor;

/// Fixed I2C address of the SEN5x.
pub const ADDRESS: u8 = 0x69;

#[derive(Clone, Copy, Debug)]
enum Command {
    StartMeasurement,
    StopMeasurement,
    ReadDataReady,
    ReadMeasuredValues,
    TemperatureOffsetParameters,
    ProductName,
    SerialNumber,
    DeviceReset,
}

impl Command {
    fn code(self) -> u16 {
        match self {
            Command::StartMeasurement => 0x0021,
            Command::StopMeasurement => 0x0104,
            Command::ReadDataReady => 0x0202,
            Command::ReadMeasuredValues => 0x03C4,
            Command::TemperatureOffsetParameters => 0x60B2,
            Command::ProductName => 0xD014,
            Command::SerialNumber => 0xD033,
            Command::DeviceReset => 0xD304,
        }
    }

    /// Time the sensor needs before it accepts the next transfer.
    fn execution_ms(self) -> u32 {
        match self {
            Command::StartMeasurement => 50,
            Command::StopMeasurement | Command::DeviceReset => 200,
            Command::ReadDataReady
            | Command::ReadMeasuredValues
            | Command::TemperatureOffsetParameters => 20,
            Command::ProductName | Command::SerialNumber => 50,
        }
    }
}

/// SEN5x sensor data.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sen5xData {
    /// Mass Concentration PM1.0 [μg/m³]
    pub pm1_0: f32,
    /// Mass Concentration PM2.5 [μg/m³]
    pub pm2_5: f32,
    /// Mass Concentration PM4.0 [μg/m³]
    pub pm4_0: f32,
    /// Mass Concentration PM10 [μg/m³]
    pub pm10_0: f32,
    /// Compensated Ambient Humidity [%RH]
    pub humidity: f32,
    /// Compensated Ambient Temperature [°C]
    pub temperature: f32,
    /// VOC Index
    pub voc_index: f32,
    /// NOx Index
    pub nox_index: f32,
}

/// SEN5x sensor raw data, in the order the sensor sends it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Sen5xDataRaw {
    /// Mass Concentration PM1.0 [μg/m³] [×10]
    pub pm1_0: u16,
    /// Mass Concentration PM2.5 [μg/m³] [×10]
    pub pm2_5: u16,
    /// Mass Concentration PM4.0 [μg/m³] [×10]
    pub pm4_0: u16,
    /// Mass Concentration PM10.0 [μg/m³] [×10]
    pub pm10_0: u16,
    /// Compensated Ambient Humidity [%RH] [×100]
    pub humidity: i16,
    /// Compensated Ambient Temperature [°C] [×200]
    pub temperature: i16,
    /// VOC Index [×10]
    pub voc_index: i16,
    /// NOx Index [×10]
    pub nox_index: i16,
}

impl From<[u16; 8]> for Sen5xDataRaw {
    fn from(words: [u16; 8]) -> Self {
        Self {
            pm1_0: words[0],
            pm2_5: words[1],
            pm4_0: words[2],
            pm10_0: words[3],
            humidity: words[4] as i16,
            temperature: words[5] as i16,
            voc_index: words[6] as i16,
            nox_index: words[7] as i16,
        }
    }
}

fn scale_unsigned(raw: u16, factor: f32) -> f32 {
    if raw == u16::MAX {
        f32::NAN
    } else {
        raw as f32 / factor
    }
}

fn scale_signed(raw: i16, factor: f32) -> f32 {
    if raw == i16::MAX {
        f32::NAN
    } else {
        raw as f32 / factor
    }
}

impl From<Sen5xDataRaw> for Sen5xData {
    fn from(raw: Sen5xDataRaw) -> Self {
        Self {
            pm1_0: scale_unsigned(raw.pm1_0, 10.0),
            pm2_5: scale_unsigned(raw.pm2_5, 10.0),
            pm4_0: scale_unsigned(raw.pm4_0, 10.0),
            pm10_0: scale_unsigned(raw.pm10_0, 10.0),
            humidity: scale_signed(raw.humidity, 100.0),
            temperature: scale_signed(raw.temperature, 200.0),
            voc_index: scale_signed(raw.voc_index, 10.0),
            nox_index: scale_signed(raw.nox_index, 10.0),
        }
    }
}

pub struct Sen5x<I2C, D> {
    i2c: I2C,
    delay: D,
}

impl<I2C, D> Sen5x<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self { i2c, delay }
    }

    /// Gives the bus and delay back.
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    fn send(&mut self, command: Command, args: &[u16]) -> Result<(), SensorError<I2C::Error>> {
        write_command(&mut self.i2c, ADDRESS, command.code(), args)?;
        self.delay.delay_ms(command.execution_ms());
        Ok(())
    }

    fn query(
        &mut self,
        command: Command,
        words: &mut [u16],
    ) -> Result<(), SensorError<I2C::Error>> {
        self.send(command, &[])?;
        read_words(&mut self.i2c, ADDRESS, words)
    }

    /// Resets the sensor to its power-on state.
    pub fn device_reset(&mut self) -> Result<(), SensorError<I2C::Error>> {
        self.send(Command::DeviceReset, &[])
    }

    /// Starts periodic measurement; new values arrive every second.
    pub fn start_measurement(&mut self) -> Result<(), SensorError<I2C::Error>> {
        self.send(Command::StartMeasurement, &[])
    }

    pub fn stop_measurement(&mut self) -> Result<(), SensorError<I2C::Error>> {
        self.send(Command::StopMeasurement, &[])
    }

    /// Whether a new measurement is available since the last read.
    pub fn data_ready(&mut self) -> Result<bool, SensorError<I2C::Error>> {
        let mut word = [0u16; 1];
        self.query(Command::ReadDataReady, &mut word)?;
        Ok(word[0] & 0x00FF != 0)
    }

    pub fn read_raw(&mut self) -> Result<Sen5xDataRaw, SensorError<I2C::Error>> {
        let mut words = [0u16; 8];
        self.query(Command::ReadMeasuredValues, &mut words)?;
        Ok(words.into())
    }

    /// Reads the latest measurement, unknown values as NaN.
    pub fn read_measured_values(&mut self) -> Result<Sen5xData, SensorError<I2C::Error>> {
        self.read_raw().map(Sen5xData::from)
    }

    /// Sets a constant temperature offset in °C, with no slope and no
    /// time constant.
    pub fn set_temperature_offset_simple(
        &mut self,
        offset: f32,
    ) -> Result<(), SensorError<I2C::Error>> {
        let offset = (offset * 200.0) as i16;
        self.send(Command::TemperatureOffsetParameters, &[offset as u16, 0, 0])
    }

    pub fn product_name(&mut self) -> Result<String, SensorError<I2C::Error>> {
        let mut words = [0u16; 16];
        self.query(Command::ProductName, &mut words)?;
        Ok(words_to_string(&words))
    }

    pub fn serial_number(&mut self) -> Result<String, SensorError<I2C::Error>> {
        let mut words = [0u16; 16];
        self.query(Command::SerialNumber, &mut words)?;
        Ok(words_to_string(&words))
    }
}

impl<I2C, D> ParticulateSensor for Sen5x<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    type Error = SensorError<I2C::Error>;

    fn read(&mut self) -> Result<Sen5xData, Self::Error> {
        self.read_measured_values()
    }
}
