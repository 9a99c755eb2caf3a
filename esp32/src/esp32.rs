use std::cell::RefCell;
use std::rc::Rc;

use atmosphere_boi_common::Config;
use embedded_hal_bus::i2c::RcDevice;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_svc::hal::modem::Modem;
use esp_idf_svc::hal::prelude::*;
use esp_idf_svc::nvs::EspDefaultNvsPartition;

/// One bus shared by both sensors and the display.
pub type I2cBus = Rc<RefCell<I2cDriver<'static>>>;

/// A handle onto the shared bus for a single device.
pub type I2cDevice = RcDevice<I2cDriver<'static>>;

/// What the WiFi station needs.
pub struct Radio {
    pub modem: Modem,
    pub sysloop: EspSystemEventLoop,
    pub nvs: EspDefaultNvsPartition,
}

pub struct Board {
    pub i2c: I2cBus,
    pub radio: Radio,
}

impl Board {
    /// Takes the peripherals and brings up the I2C bus on the default
    /// Wire pins (SDA 21, SCL 22) at 100 kHz.
    pub fn take() -> anyhow::Result<Self> {
        let p = Peripherals::take()?;

        let i2c = I2cDriver::new(
            p.i2c0,
            p.pins.gpio21,
            p.pins.gpio22,
            &I2cConfig::new().baudrate(100_000.Hz()),
        )?;

        Ok(Self {
            i2c: Rc::new(RefCell::new(i2c)),
            radio: Radio {
                modem: p.modem,
                sysloop: EspSystemEventLoop::take()?,
                nvs: EspDefaultNvsPartition::take()?,
            },
        })
    }
}

pub fn device(bus: &I2cBus) -> I2cDevice {
    RcDevice::new(bus.clone())
}

/// Builds the configuration from compile time settings.
///
/// `WIFI_SSID` and `WIFI_PASS` are required with the `mqtt` feature.
/// `MQTT_HOST` and `WIFI_STATIC_IP` are optional.
pub fn firmware_config() -> anyhow::Result<Config> {
    let mut config = Config::default();

    #[cfg(feature = "mqtt")]
    {
        use anyhow::Context;
        use atmosphere_boi_common::config::StaticIpConfig;

        config.wifi.ssid = env!("WIFI_SSID").into();
        config.wifi.password = env!("WIFI_PASS").into();

        if let Some(host) = option_env!("MQTT_HOST") {
            config.mqtt.host = host.into();
        }

        if let Some(address) = option_env!("WIFI_STATIC_IP") {
            config.wifi.static_ip = Some(StaticIpConfig {
                address: address
                    .parse()
                    .context("WIFI_STATIC_IP is not an IPv4 address")?,
                ..Default::default()
            });
        }
    }

    #[cfg(not(feature = "mqtt"))]
    {
        config.mqtt.enabled = false;
    }

    #[cfg(not(feature = "display"))]
    {
        config.display.enabled = false;
    }

    Ok(config)
}
