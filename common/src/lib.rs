//! # Atmosphere Boi
//! ## Air quality monitoring shared between the device and the desktop
//!
//! - SEN5x and SCD30 drivers over `embedded-hal`
//! - the polling loop, generic over sensors, display and MQTT session
//! - Home Assistant discovery and state messages

pub mod config;
pub mod discovery;
pub mod display;
pub mod error;
pub mod monitor;
pub mod mqtt;
pub mod payload;
pub mod reading;
pub mod report;
pub mod scd30;
pub mod sen5x;
pub mod sensor;

mod sensirion;

pub use config::Config;
pub use error::SensorError;
pub use monitor::{halt, CycleOutcome, Disabled, Monitor};
pub use reading::Reading;
