//! Stand-ins for the sensors so the loop runs without hardware.

use std::time::Duration;

use atmosphere_boi_common::sen5x::Sen5xData;
use atmosphere_boi_common::sensor::{Co2Sensor, ParticulateSensor};
use embedded_hal::delay::DelayNs;

#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error("injected bus fault on read {0}")]
    InjectedFault(u32),
}

/// Smooth, repeatable variation around `base`.
fn wave(base: f32, amplitude: f32, step: u32, period: f32) -> f32 {
    base + amplitude * (step as f32 * core::f32::consts::TAU / period).sin()
}

/// Produces SEN55-like values. The NOx index stays unknown for the
/// first `warmup` reads, as on the real sensor.
pub struct SimulatedSen5x {
    step: u32,
    warmup: u32,
    fail_every: Option<u32>,
}

impl SimulatedSen5x {
    pub fn new(warmup: u32, fail_every: Option<u32>) -> Self {
        Self {
            step: 0,
            warmup,
            fail_every,
        }
    }
}

impl ParticulateSensor for SimulatedSen5x {
    type Error = SimulationError;

    fn read(&mut self) -> Result<Sen5xData, Self::Error> {
        self.step += 1;
        let step = self.step;

        if let Some(n) = self.fail_every.filter(|&n| n > 0) {
            if step % n == 0 {
                return Err(SimulationError::InjectedFault(step));
            }
        }

        let pm2_5 = wave(8.0, 3.0, step, 60.0);
        Ok(Sen5xData {
            pm1_0: pm2_5 * 0.8,
            pm2_5,
            pm4_0: pm2_5 * 1.1,
            pm10_0: pm2_5 * 1.2,
            humidity: wave(45.0, 5.0, step, 300.0),
            temperature: wave(21.5, 1.5, step, 600.0),
            voc_index: wave(100.0, 20.0, step, 120.0),
            nox_index: if step <= self.warmup { f32::NAN } else { 1.0 },
        })
    }
}

/// Produces a new CO2 value every `interval` polls.
pub struct SimulatedScd30 {
    polls: u32,
    interval: u32,
}

impl SimulatedScd30 {
    pub fn new(interval: u32) -> Self {
        Self {
            polls: 0,
            interval: interval.max(1),
        }
    }
}

impl Co2Sensor for SimulatedScd30 {
    type Error = SimulationError;

    fn data_ready(&mut self) -> Result<bool, Self::Error> {
        self.polls += 1;
        Ok(self.polls % self.interval == 0)
    }

    fn read_co2(&mut self) -> Result<f32, Self::Error> {
        Ok(wave(650.0, 150.0, self.polls, 900.0))
    }
}

/// Blocks the thread; `scale` shortens every wait for fast runs.
pub struct StdDelay {
    pub scale: f32,
}

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        let ns = (ns as f32 * self.scale) as u64;
        std::thread::sleep(Duration::from_nanos(ns));
    }
}
