use core::convert::Infallible;
use std::time::Duration;

use embedded_hal::delay::DelayNs;
use log::{error, info, warn};

use crate::config::Config;
use crate::discovery::DiscoveryMessage;
use crate::display::TextDisplay;
use crate::mqtt::{self, ensure_connected, MqttSession};
use crate::payload::StatePayload;
use crate::reading::Reading;
use crate::report;
use crate::sensor::{Co2Sensor, ParticulateSensor};

/// Stands in for a display or MQTT session the build does without.
pub enum Disabled {}

impl TextDisplay for Disabled {
    type Error = Infallible;

    fn columns(&self) -> usize {
        match *self {}
    }

    fn show(&mut self, _lines: &[String]) -> Result<(), Self::Error> {
        match *self {}
    }
}

impl MqttSession for Disabled {
    type Error = Infallible;

    fn is_connected(&self) -> bool {
        match *self {}
    }

    fn connect(&mut self) -> Result<(), Self::Error> {
        match *self {}
    }

    fn publish(&mut self, _topic: &str, _payload: &[u8], _retain: bool) -> Result<(), Self::Error> {
        match *self {}
    }
}

/// What a single pass of the loop did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The particulate sensor could not be read; nothing else happened.
    ReadFailed,
    /// At least one value is still unknown, so nothing was published.
    Incomplete,
    /// Every value is known but there is no MQTT session.
    Complete,
    Published,
    PublishFailed,
}

/// The polling loop: read both sensors, log, publish, redraw.
pub struct Monitor<P, C, T, S, D> {
    particulate: P,
    co2: C,
    display: Option<T>,
    session: Option<S>,
    delay: D,
    title: String,
    state_topic: String,
    poll_interval: Duration,
    reconnect_interval: Duration,
    reading: Reading,
}

impl<P, C, T, S, D> Monitor<P, C, T, S, D>
where
    P: ParticulateSensor,
    C: Co2Sensor,
    T: TextDisplay,
    S: MqttSession,
    D: DelayNs,
{
    pub fn new(
        config: &Config,
        particulate: P,
        co2: C,
        display: Option<T>,
        session: Option<S>,
        delay: D,
    ) -> Self {
        Self {
            particulate,
            co2,
            display,
            session,
            delay,
            title: config.device.name.clone(),
            state_topic: config.mqtt.state_topic.clone(),
            poll_interval: config.device.poll_interval(),
            reconnect_interval: config.mqtt.reconnect_interval(),
            reading: Reading::default(),
        }
    }

    pub fn reading(&self) -> &Reading {
        &self.reading
    }

    pub fn display(&self) -> Option<&T> {
        self.display.as_ref()
    }

    pub fn session(&self) -> Option<&S> {
        self.session.as_ref()
    }

    /// Connects to the broker and publishes the retained discovery
    /// messages. Does nothing without a session.
    pub fn announce(&mut self, messages: &[DiscoveryMessage]) {
        if let Some(session) = self.session.as_mut() {
            mqtt::announce(session, &mut self.delay, self.reconnect_interval, messages);
        }
    }

    /// Shows `text` alone on the display.
    pub fn splash(&mut self, text: &str) {
        if let Some(display) = self.display.as_mut() {
            let lines = report::wrap(text, display.columns());
            if let Err(e) = display.show(&lines) {
                warn!("Failed to update display: {}", e);
            }
        }
    }

    /// One pass of the loop, without the wait.
    pub fn cycle(&mut self) -> CycleOutcome {
        let data = match self.particulate.read() {
            Ok(data) => data,
            Err(e) => {
                error!("Error trying to read measured values: {}", e);
                return CycleOutcome::ReadFailed;
            }
        };
        self.reading.apply_particulate(&data);

        match self.co2.data_ready() {
            Ok(true) => match self.co2.read_co2() {
                Ok(ppm) => self.reading.apply_co2(ppm),
                Err(e) => error!("Error reading CO2 sensor data: {}", e),
            },
            Ok(false) => {}
            Err(e) => error!("Error checking CO2 data ready: {}", e),
        }

        for line in report::console_lines(&self.reading) {
            info!("{}", line);
        }

        let outcome = if self.reading.is_complete() {
            self.publish_state()
        } else {
            CycleOutcome::Incomplete
        };

        self.render();

        outcome
    }

    /// Waits the poll interval, then runs a cycle.
    pub fn tick(&mut self) -> CycleOutcome {
        self.delay.delay_ms(self.poll_interval.as_millis() as u32);
        self.cycle()
    }

    pub fn run(&mut self) -> ! {
        loop {
            self.tick();
        }
    }

    fn publish_state(&mut self) -> CycleOutcome {
        let Some(session) = self.session.as_mut() else {
            return CycleOutcome::Complete;
        };

        let payload = match StatePayload::from(&self.reading).to_json() {
            Ok(payload) => payload,
            Err(e) => {
                error!("Failed to serialize state: {}", e);
                return CycleOutcome::PublishFailed;
            }
        };

        ensure_connected(session, &mut self.delay, self.reconnect_interval);

        info!("Publishing {}", payload);
        match session.publish(&self.state_topic, payload.as_bytes(), false) {
            Ok(()) => CycleOutcome::Published,
            Err(e) => {
                warn!("Failed to publish state: {}", e);
                CycleOutcome::PublishFailed
            }
        }
    }

    fn render(&mut self) {
        if let Some(display) = self.display.as_mut() {
            let lines = report::screen_lines(&self.reading, &self.title, display.columns());
            if let Err(e) = display.show(&lines) {
                warn!("Failed to update display: {}", e);
            }
        }
    }
}

/// Stops the device for good after an unrecoverable error.
pub fn halt<D: DelayNs>(delay: &mut D) -> ! {
    loop {
        delay.delay_ms(10);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::discovery;
    use crate::mqtt::testing::FakeSession;
    use crate::sen5x::Sen5xData;

    #[derive(Default)]
    struct Clock {
        elapsed_ms: u64,
    }

    impl DelayNs for Clock {
        fn delay_ns(&mut self, ns: u32) {
            self.elapsed_ms += u64::from(ns) / 1_000_000;
        }

        fn delay_ms(&mut self, ms: u32) {
            self.elapsed_ms += u64::from(ms);
        }
    }

    struct ScriptedSen5x(VecDeque<Result<Sen5xData, &'static str>>);

    impl ParticulateSensor for ScriptedSen5x {
        type Error = &'static str;

        fn read(&mut self) -> Result<Sen5xData, Self::Error> {
            self.0.pop_front().unwrap_or(Err("script exhausted"))
        }
    }

    /// One data-ready poll of the scripted CO2 sensor.
    enum Co2Step {
        NotReady,
        CheckFails,
        Ready(Result<f32, &'static str>),
    }

    struct ScriptedScd30 {
        script: VecDeque<Co2Step>,
        pending: Option<Result<f32, &'static str>>,
    }

    impl ScriptedScd30 {
        fn new(script: impl IntoIterator<Item = Co2Step>) -> Self {
            Self {
                script: script.into_iter().collect(),
                pending: None,
            }
        }
    }

    impl Co2Sensor for ScriptedScd30 {
        type Error = &'static str;

        fn data_ready(&mut self) -> Result<bool, Self::Error> {
            match self.script.pop_front().unwrap_or(Co2Step::NotReady) {
                Co2Step::NotReady => Ok(false),
                Co2Step::CheckFails => Err("nack"),
                Co2Step::Ready(result) => {
                    self.pending = Some(result);
                    Ok(true)
                }
            }
        }

        fn read_co2(&mut self) -> Result<f32, Self::Error> {
            self.pending.take().unwrap_or(Err("not ready"))
        }
    }

    #[derive(Default)]
    struct Screen {
        frames: Vec<Vec<String>>,
    }

    impl TextDisplay for Screen {
        type Error = Infallible;

        fn columns(&self) -> usize {
            report::OLED_COLUMNS
        }

        fn show(&mut self, lines: &[String]) -> Result<(), Self::Error> {
            self.frames.push(lines.to_vec());
            Ok(())
        }
    }

    fn data() -> Sen5xData {
        Sen5xData {
            pm1_0: 1.0,
            pm2_5: 2.0,
            pm4_0: 3.0,
            pm10_0: 4.0,
            humidity: 50.0,
            temperature: 20.0,
            voc_index: 100.0,
            nox_index: 1.0,
        }
    }

    type TestMonitor = Monitor<ScriptedSen5x, ScriptedScd30, Screen, FakeSession, Clock>;

    fn monitor(
        sen5x: impl IntoIterator<Item = Result<Sen5xData, &'static str>>,
        scd30: impl IntoIterator<Item = Co2Step>,
        session: Option<FakeSession>,
    ) -> TestMonitor {
        Monitor::new(
            &Config::default(),
            ScriptedSen5x(sen5x.into_iter().collect()),
            ScriptedScd30::new(scd30),
            Some(Screen::default()),
            session,
            Clock::default(),
        )
    }

    #[test]
    fn read_failure_abandons_cycle() {
        let mut monitor = monitor(
            [Ok(data()), Err("bus")],
            [Co2Step::Ready(Ok(400.0)), Co2Step::Ready(Ok(800.0))],
            None,
        );

        assert_eq!(monitor.cycle(), CycleOutcome::Complete);
        assert_eq!(monitor.cycle(), CycleOutcome::ReadFailed);

        assert_eq!(monitor.reading().co2, 400.0);
        assert_eq!(monitor.display().unwrap().frames.len(), 1);
    }

    #[test]
    fn co2_is_retained_while_not_ready() {
        let mut monitor = monitor(
            [Ok(data()), Ok(data()), Ok(data())],
            [Co2Step::Ready(Ok(420.0)), Co2Step::NotReady, Co2Step::Ready(Err("crc"))],
            None,
        );

        monitor.cycle();
        monitor.cycle();
        monitor.cycle();

        assert_eq!(monitor.reading().co2, 420.0);
    }

    #[test]
    fn co2_is_retained_when_ready_check_fails() {
        let mut monitor = monitor(
            [Ok(data()), Ok(data())],
            [Co2Step::Ready(Ok(430.0)), Co2Step::CheckFails],
            None,
        );

        assert_eq!(monitor.cycle(), CycleOutcome::Complete);
        assert_eq!(monitor.cycle(), CycleOutcome::Complete);

        assert_eq!(monitor.reading().co2, 430.0);
        assert_eq!(monitor.display().unwrap().frames.len(), 2);
    }

    #[test]
    fn publishes_only_complete_readings() {
        let mut warming_up = data();
        warming_up.nox_index = f32::NAN;
        let session = FakeSession {
            connected: true,
            ..Default::default()
        };
        let mut monitor = monitor(
            [Ok(data()), Ok(warming_up), Ok(data())],
            [Co2Step::NotReady, Co2Step::Ready(Ok(500.0)), Co2Step::NotReady],
            Some(session),
        );

        assert_eq!(monitor.cycle(), CycleOutcome::Incomplete);
        assert_eq!(monitor.cycle(), CycleOutcome::Incomplete);
        assert_eq!(monitor.cycle(), CycleOutcome::Published);

        let published = &monitor.session().unwrap().published;
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].topic, "home/sensor/atmosphereBoiV6/value");
        assert!(!published[0].retain);
        assert_eq!(
            published[0].payload,
            r#"{"humidity":50.0,"temperature":68.0,"voc":100.0,"nox":1.0,"co2":500.0,"pm25":2.0}"#
        );
    }

    #[test]
    fn reconnects_before_publishing() {
        let session = FakeSession {
            refusals: 2,
            ..Default::default()
        };
        let mut monitor = monitor([Ok(data())], [Co2Step::Ready(Ok(450.0))], Some(session));

        assert_eq!(monitor.cycle(), CycleOutcome::Published);
        assert_eq!(monitor.session().unwrap().attempts, 3);
        assert_eq!(monitor.delay.elapsed_ms, 10_000);
    }

    #[test]
    fn announce_publishes_retained_discovery() {
        let mut monitor = monitor([], [], Some(FakeSession::default()));
        let messages = discovery::messages(&Config::default()).unwrap();

        monitor.announce(&messages);

        let published = &monitor.session().unwrap().published;
        assert_eq!(published.len(), 6);
        assert!(published.iter().all(|p| p.retain));
        assert_eq!(published[5].topic, "homeassistant/sensor/atmosphereBoiV6_co2/config");
    }

    #[test]
    fn tick_waits_poll_interval() {
        let mut monitor = monitor([Ok(data())], [Co2Step::NotReady], None);

        monitor.tick();

        assert_eq!(monitor.delay.elapsed_ms, 1000);
    }

    #[test]
    fn screen_shows_splash_then_values() {
        let mut monitor = monitor([Ok(data())], [Co2Step::Ready(Ok(410.0))], None);

        monitor.splash("Okay!");
        monitor.cycle();

        let frames = &monitor.display().unwrap().frames;
        assert_eq!(frames[0], ["Okay!"]);
        assert_eq!(frames[1][0], "Atmosphere Boi V6");
        assert_eq!(frames[1][6], "CO2: 410.00ppm");
    }

    #[test]
    fn runs_without_display_or_session() {
        let mut monitor: Monitor<_, _, Disabled, Disabled, _> = Monitor::new(
            &Config::default(),
            ScriptedSen5x([Ok(data())].into_iter().collect()),
            ScriptedScd30::new([Co2Step::Ready(Ok(400.0))]),
            None,
            None,
            Clock::default(),
        );

        assert_eq!(monitor.cycle(), CycleOutcome::Complete);
    }
}
