use anyhow::Context;
use atmosphere_boi_common::scd30::Scd30;
use atmosphere_boi_common::sen5x::Sen5x;
use atmosphere_boi_common::{halt, Monitor};
#[cfg(feature = "mqtt")]
use atmosphere_boi_common::{discovery, mqtt::announce};
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::log::EspLogger;
use log::{error, info, warn};

mod esp32;

#[cfg(feature = "display")]
mod display;
#[cfg(feature = "mqtt")]
mod mqtt;
#[cfg(feature = "mqtt")]
mod wifi;

use esp32::{device, Board};

fn main() {
    // It is necessary to call this function once. Otherwise some patches to the runtime
    // implemented by esp-idf-sys might not link properly. See https://github.com/esp-rs/esp-idf-template/issues/71
    esp_idf_svc::sys::link_patches();

    // Bind the log crate to the ESP Logging facilities
    EspLogger::initialize_default();

    info!("Atmosphere Boi: v6");

    if let Err(e) = run() {
        error!("{:#}", e);
        halt(&mut FreeRtos);
    }
}

/// Brings the board up and hands over to the monitoring loop. Only
/// returns on a setup failure.
fn run() -> anyhow::Result<()> {
    let config = esp32::firmware_config()?;
    let Board { i2c, radio } = Board::take()?;

    #[cfg(feature = "mqtt")]
    let (_wifi, session) = if config.mqtt.enabled {
        let wifi = wifi::connect(radio, &config.wifi).context("WiFi Failed!")?;

        let mut session = mqtt::EspSession::new(&config.mqtt);
        let messages =
            discovery::messages(&config).context("Failed to build discovery messages")?;
        announce(
            &mut session,
            &mut FreeRtos,
            config.mqtt.reconnect_interval(),
            &messages,
        );

        (Some(wifi), Some(session))
    } else {
        (None, None)
    };
    #[cfg(not(feature = "mqtt"))]
    let session: Option<atmosphere_boi_common::Disabled> = {
        drop(radio);
        None
    };

    info!("Initializing SCD30");
    let mut scd30 = Scd30::new(device(&i2c), FreeRtos);
    let version = scd30.begin().context("Failed to find SCD30 chip")?;
    info!("SCD30 firmware {}.{}", version >> 8, version & 0xff);

    #[cfg(feature = "display")]
    let display = if config.display.enabled {
        info!("Starting display");
        Some(display::Oled::new(device(&i2c)).context("Failed to start display")?)
    } else {
        None
    };
    #[cfg(not(feature = "display"))]
    let display: Option<atmosphere_boi_common::Disabled> = None;

    info!("Initializing SEN55");
    let mut sen5x = Sen5x::new(device(&i2c), FreeRtos);
    sen5x
        .device_reset()
        .context("Error trying to execute deviceReset()")?;

    match sen5x.product_name() {
        Ok(name) => info!("ProductName: {}", name),
        Err(e) => warn!("Error trying to execute getProductName(): {}", e),
    }
    match sen5x.serial_number() {
        Ok(serial) => info!("SerialNumber: {}", serial),
        Err(e) => warn!("Error trying to execute getSerialNumber(): {}", e),
    }

    sen5x
        .set_temperature_offset_simple(config.device.temperature_offset)
        .context("Error trying to execute setTemperatureOffsetSimple()")?;
    info!("Temperature Offset set to {} deg. Celsius", config.device.temperature_offset);

    sen5x
        .start_measurement()
        .context("Error trying to execute startMeasurement()")?;

    let mut monitor = Monitor::new(&config, sen5x, scd30, display, session, FreeRtos);
    monitor.splash("Okay!");

    monitor.run()
}
