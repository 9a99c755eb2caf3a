use anyhow::anyhow;
use atmosphere_boi_common::config::{StaticIpConfig, WifiConfig};
use embedded_svc::wifi::{AuthMethod, ClientConfiguration, Configuration};
use esp_idf_svc::ipv4::{self, ClientSettings, Mask, Subnet};
use esp_idf_svc::netif::{EspNetif, NetifConfiguration, NetifStack};
use esp_idf_svc::wifi::{BlockingWifi, EspWifi, WifiDriver};
use log::info;

use crate::esp32::Radio;

pub type Wifi = BlockingWifi<EspWifi<'static>>;

/// Station interface, with fixed addressing when configured and DHCP
/// otherwise.
fn station_netif(static_ip: Option<&StaticIpConfig>) -> anyhow::Result<EspNetif> {
    let Some(ip) = static_ip else {
        return Ok(EspNetif::new(NetifStack::Sta)?);
    };

    info!("Using static IP {}/{}", ip.address, ip.prefix_len());

    let settings = ClientSettings {
        ip: ip.address,
        subnet: Subnet {
            gateway: ip.gateway,
            mask: Mask(ip.prefix_len()),
        },
        dns: Some(ip.primary_dns),
        secondary_dns: Some(ip.secondary_dns),
    };

    Ok(EspNetif::new_with_conf(&NetifConfiguration {
        ip_configuration: Some(ipv4::Configuration::Client(
            ipv4::ClientConfiguration::Fixed(settings),
        )),
        ..NetifConfiguration::wifi_default_client()
    })?)
}

/// Joins the configured network and waits until the interface is up.
pub fn connect(radio: Radio, config: &WifiConfig) -> anyhow::Result<Wifi> {
    let Radio {
        modem,
        sysloop,
        nvs,
    } = radio;

    let driver = WifiDriver::new(modem, sysloop.clone(), Some(nvs))?;
    let esp_wifi = EspWifi::wrap_all(
        driver,
        station_netif(config.static_ip.as_ref())?,
        EspNetif::new(NetifStack::Ap)?,
    )?;
    let mut wifi = BlockingWifi::wrap(esp_wifi, sysloop)?;

    let wifi_configuration: Configuration = Configuration::Client(ClientConfiguration {
        ssid: config
            .ssid
            .as_str()
            .try_into()
            .map_err(|_| anyhow!("SSID is too long"))?,
        bssid: None,
        auth_method: AuthMethod::WPA2Personal,
        password: config
            .password
            .as_str()
            .try_into()
            .map_err(|_| anyhow!("WiFi password is too long"))?,
        channel: None,
        ..Default::default()
    });

    wifi.set_configuration(&wifi_configuration)?;

    wifi.start()?;
    info!("Wifi started");

    wifi.connect()?;
    info!("Wifi connected");

    wifi.wait_netif_up()?;
    info!("Wifi netif up");

    let ip_info = wifi.wifi().sta_netif().get_ip_info()?;
    info!("IP address: {}", ip_info.ip);

    Ok(wifi)
}
