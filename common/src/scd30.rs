//! Driver for the Sensirion SCD30 CO2, humidity and temperature module.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::error::SensorError;
use crate::sensirion::{read_words, write_command};
use crate::sensor::Co2Sensor;

/// Fixed I2C address of the SCD30.
pub const ADDRESS: u8 = 0x61;

/// Measurement interval set by [`Scd30::begin`], in seconds.
pub const DEFAULT_INTERVAL_S: u16 = 2;

const START_CONTINUOUS_MEASUREMENT: u16 = 0x0010;
const STOP_CONTINUOUS_MEASUREMENT: u16 = 0x0104;
const SET_MEASUREMENT_INTERVAL: u16 = 0x4600;
const GET_DATA_READY: u16 = 0x0202;
const READ_MEASUREMENT: u16 = 0x0300;
const READ_FIRMWARE_VERSION: u16 = 0xD100;
const SOFT_RESET: u16 = 0xD304;

/// Minimum wait between a command write and the response read.
const READ_DELAY_MS: u32 = 3;
const RESET_DELAY_MS: u32 = 30;

/// One SCD30 measurement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scd30Measurement {
    /// CO2 concentration [ppm]
    pub co2: f32,
    /// Temperature [°C]
    pub temperature: f32,
    /// Relative humidity [%RH]
    pub humidity: f32,
}

pub struct Scd30<I2C, D> {
    i2c: I2C,
    delay: D,
}

impl<I2C, D> Scd30<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self { i2c, delay }
    }

    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    fn query(&mut self, command: u16, words: &mut [u16]) -> Result<(), SensorError<I2C::Error>> {
        write_command(&mut self.i2c, ADDRESS, command, &[])?;
        self.delay.delay_ms(READ_DELAY_MS);
        read_words(&mut self.i2c, ADDRESS, words)
    }

    /// Resets the chip, checks it answers and starts continuous
    /// measurement every [`DEFAULT_INTERVAL_S`] seconds.
    ///
    /// Returns the firmware version.
    pub fn begin(&mut self) -> Result<u16, SensorError<I2C::Error>> {
        self.soft_reset()?;
        let version = self.firmware_version()?;
        self.start_continuous_measurement(0)?;
        self.set_measurement_interval(DEFAULT_INTERVAL_S)?;
        Ok(version)
    }

    pub fn soft_reset(&mut self) -> Result<(), SensorError<I2C::Error>> {
        write_command(&mut self.i2c, ADDRESS, SOFT_RESET, &[])?;
        self.delay.delay_ms(RESET_DELAY_MS);
        Ok(())
    }

    /// Firmware version, major in the high byte.
    pub fn firmware_version(&mut self) -> Result<u16, SensorError<I2C::Error>> {
        let mut word = [0u16; 1];
        self.query(READ_FIRMWARE_VERSION, &mut word)?;
        Ok(word[0])
    }

    /// Starts continuous measurement. `ambient_pressure_mbar` of 0
    /// disables pressure compensation.
    pub fn start_continuous_measurement(
        &mut self,
        ambient_pressure_mbar: u16,
    ) -> Result<(), SensorError<I2C::Error>> {
        write_command(
            &mut self.i2c,
            ADDRESS,
            START_CONTINUOUS_MEASUREMENT,
            &[ambient_pressure_mbar],
        )
    }

    pub fn stop_continuous_measurement(&mut self) -> Result<(), SensorError<I2C::Error>> {
        write_command(&mut self.i2c, ADDRESS, STOP_CONTINUOUS_MEASUREMENT, &[])
    }

    pub fn set_measurement_interval(&mut self, seconds: u16) -> Result<(), SensorError<I2C::Error>> {
        write_command(&mut self.i2c, ADDRESS, SET_MEASUREMENT_INTERVAL, &[seconds])
    }

    pub fn data_ready(&mut self) -> Result<bool, SensorError<I2C::Error>> {
        let mut word = [0u16; 1];
        self.query(GET_DATA_READY, &mut word)?;
        Ok(word[0] == 1)
    }

    pub fn read_measurement(&mut self) -> Result<Scd30Measurement, SensorError<I2C::Error>> {
        let mut words = [0u16; 6];
        self.query(READ_MEASUREMENT, &mut words)?;

        let float = |hi: u16, lo: u16| f32::from_bits(((hi as u32) << 16) | lo as u32);
        Ok(Scd30Measurement {
            co2: float(words[0], words[1]),
            temperature: float(words[2], words[3]),
            humidity: float(words[4], words[5]),
        })
    }
}

impl<I2C, D> Co2Sensor for Scd30<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    type Error = SensorError<I2C::Error>;

    fn data_ready(&mut self) -> Result<bool, Self::Error> {
        Scd30::data_ready(self)
    }

    fn read_co2(&mut self) -> Result<f32, Self::Error> {
        self.read_measurement().map(|m| m.co2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensirion::testing::{command, frame};
    use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    fn float_words(value: f32) -> [u16; 2] {
        let bits = value.to_bits();
        [(bits >> 16) as u16, bits as u16]
    }

    #[test]
    fn begin_starts_continuous_measurement() {
        let expectations = [
            I2cTransaction::write(ADDRESS, vec![0xD3, 0x04]),
            I2cTransaction::write(ADDRESS, vec![0xD1, 0x00]),
            I2cTransaction::read(ADDRESS, frame(&[0x0342])),
            I2cTransaction::write(ADDRESS, vec![0x00, 0x10, 0x00, 0x00, 0x81]),
            I2cTransaction::write(ADDRESS, command(0x4600, &[2])),
        ];
        let mut sensor = Scd30::new(I2cMock::new(&expectations), NoDelay);

        assert_eq!(sensor.begin().unwrap(), 0x0342);

        sensor.release().0.done();
    }

    #[test]
    fn begin_fails_when_chip_is_absent() {
        let expectations = [I2cTransaction::write(ADDRESS, vec![0xD3, 0x04])
            .with_error(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address))];
        let mut sensor = Scd30::new(I2cMock::new(&expectations), NoDelay);

        let err = sensor.begin().unwrap_err();
        assert!(matches!(err, SensorError::Bus(ErrorKind::NoAcknowledge(_))));

        sensor.release().0.done();
    }

    #[test]
    fn measurement_floats_are_decoded() {
        let mut words = Vec::new();
        words.extend(float_words(612.5));
        words.extend(float_words(23.25));
        words.extend(float_words(41.0));

        let expectations = [
            I2cTransaction::write(ADDRESS, vec![0x03, 0x00]),
            I2cTransaction::read(ADDRESS, frame(&words)),
        ];
        let mut sensor = Scd30::new(I2cMock::new(&expectations), NoDelay);

        let m = sensor.read_measurement().unwrap();
        assert_eq!(
            m,
            Scd30Measurement {
                co2: 612.5,
                temperature: 23.25,
                humidity: 41.0,
            }
        );

        sensor.release().0.done();
    }

    #[test]
    fn data_ready_flag() {
        let expectations = [
            I2cTransaction::write(ADDRESS, vec![0x02, 0x02]),
            I2cTransaction::read(ADDRESS, frame(&[0])),
            I2cTransaction::write(ADDRESS, vec![0x02, 0x02]),
            I2cTransaction::read(ADDRESS, frame(&[1])),
        ];
        let mut sensor = Scd30::new(I2cMock::new(&expectations), NoDelay);

        assert!(!Co2Sensor::data_ready(&mut sensor).unwrap());
        assert!(Co2Sensor::data_ready(&mut sensor).unwrap());

        sensor.release().0.done();
    }

    #[test]
    fn stop_continuous_measurement_is_a_bare_command() {
        let expectations = [I2cTransaction::write(ADDRESS, vec![0x01, 0x04])];
        let mut sensor = Scd30::new(I2cMock::new(&expectations), NoDelay);

        sensor.stop_continuous_measurement().unwrap();

        sensor.release().0.done();
    }
}
