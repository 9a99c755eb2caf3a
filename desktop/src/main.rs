//! Runs the monitoring loop on the desktop with simulated sensors.
//!
//! Usage:
//!   atmosphere-boi-desktop                         # default config, runs forever
//!   atmosphere-boi-desktop --config boi.toml       # custom config
//!   atmosphere-boi-desktop --cycles 20 --fast      # quick run

mod broker;
mod simulated;
mod terminal;

use std::path::{Path, PathBuf};

use anyhow::Context;
use atmosphere_boi_common::{discovery, Config, Monitor};
use clap::Parser;
use log::info;

use broker::LoggingBroker;
use simulated::{SimulatedScd30, SimulatedSen5x, StdDelay};
use terminal::TerminalDisplay;

#[derive(Parser, Debug)]
#[command(name = "atmosphere-boi-desktop")]
#[command(about = "Air quality monitor loop with simulated sensors")]
struct Args {
    /// Configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Stop after this many cycles instead of running forever
    #[arg(long)]
    cycles: Option<u32>,

    /// Shorten every wait a hundredfold
    #[arg(long)]
    fast: bool,

    /// Do not draw the display
    #[arg(long)]
    no_display: bool,

    /// Do not publish
    #[arg(long)]
    no_mqtt: bool,

    /// Reads during which the NOx index is still unknown
    #[arg(long, default_value = "10")]
    nox_warmup: u32,

    /// Make every Nth particulate read fail
    #[arg(long)]
    fail_every: Option<u32>,

    /// Connection attempts the broker refuses before accepting
    #[arg(long, default_value = "0")]
    broker_refusals: u32,
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

type DesktopMonitor = Monitor<
    SimulatedSen5x,
    SimulatedScd30,
    TerminalDisplay<std::io::Stdout>,
    LoggingBroker,
    StdDelay,
>;

/// Holds the monitor and how long to run it.
struct App {
    monitor: DesktopMonitor,
    cycles: Option<u32>,
}

impl App {
    fn new(args: &Args, config: &Config) -> anyhow::Result<Self> {
        let display = (config.display.enabled && !args.no_display)
            .then(|| TerminalDisplay::new(std::io::stdout()));
        let session = (config.mqtt.enabled && !args.no_mqtt)
            .then(|| LoggingBroker::new(config.mqtt.url(), args.broker_refusals));
        let delay = StdDelay {
            scale: if args.fast { 0.01 } else { 1.0 },
        };

        let mut monitor = Monitor::new(
            config,
            SimulatedSen5x::new(args.nox_warmup, args.fail_every),
            SimulatedScd30::new(2),
            display,
            session,
            delay,
        );

        let messages = discovery::messages(config).context("Failed to build discovery messages")?;
        monitor.announce(&messages);
        monitor.splash("Okay!");

        Ok(Self {
            monitor,
            cycles: args.cycles,
        })
    }

    fn run(&mut self) {
        match self.cycles {
            Some(cycles) => {
                for _ in 0..cycles {
                    self.monitor.tick();
                }
                let published = self.monitor.session().map_or(0, LoggingBroker::published);
                info!("Stopped after {} cycles, {} messages published", cycles, published);
            }
            None => self.monitor.run(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    info!("{}: simulated", config.device.name);

    let mut app = App::new(&args, &config)?;
    app.run();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use atmosphere_boi_common::{CycleOutcome, Disabled};

    #[test]
    fn example_config_parses() {
        let config: Config = toml::from_str(include_str!("../atmosphere.toml")).unwrap();
        assert_eq!(config.device.node_id, "atmosphereBoiV6");
        assert_eq!(config.mqtt.port, 1883);
    }

    #[test]
    fn static_ip_from_toml() {
        let config: Config = toml::from_str(
            r#"
            [wifi]
            ssid = "home"

            [wifi.static_ip]
            address = "192.168.1.50"
            netmask = "255.255.0.0"
            "#,
        )
        .unwrap();

        let ip = config.wifi.static_ip.unwrap();
        assert_eq!(ip.address.octets(), [192, 168, 1, 50]);
        assert_eq!(ip.prefix_len(), 16);
    }

    #[test]
    fn display_and_session_are_optional() {
        let mut monitor: Monitor<_, _, Disabled, Disabled, _> = Monitor::new(
            &Config::default(),
            SimulatedSen5x::new(0, None),
            SimulatedScd30::new(1),
            None,
            None,
            StdDelay { scale: 0.0 },
        );

        assert_eq!(monitor.tick(), CycleOutcome::Complete);
    }
}
