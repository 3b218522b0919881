//! ESP-IDF WiFi driver.
//!
//! Wraps the ESP-IDF WiFi stack behind [`WifiDriver`]. Static addressing is
//! applied by swapping a fixed-IP netif configuration in before the join or
//! host action.

use std::net::IpAddr;

use esp_idf_hal::modem::Modem;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::ipv4;
use esp_idf_svc::netif::{EspNetif, NetifConfiguration};
use esp_idf_svc::wifi::{
    AccessPointConfiguration, AuthMethod, BlockingWifi, ClientConfiguration, Configuration,
    EspWifi,
};
use esp_idf_sys::EspError;
use log::{info, warn};

use super::{DriverError, WifiDriver};
use crate::config::StaticAddressConfig;

/// WiFi driver over ESP-IDF.
pub struct EspWifiDriver<'a> {
    wifi: BlockingWifi<EspWifi<'a>>,
}

impl<'a> EspWifiDriver<'a> {
    /// Create a new driver from the modem peripheral and system event loop.
    pub fn new(modem: Modem, sysloop: EspSystemEventLoop) -> Result<Self, EspError> {
        let esp_wifi = EspWifi::new(modem, sysloop.clone(), None)?;
        let wifi = BlockingWifi::wrap(esp_wifi, sysloop)?;
        Ok(Self { wifi })
    }

    fn ensure_started(&mut self) -> Result<(), EspError> {
        if !self.wifi.is_started().unwrap_or(false) {
            self.wifi
                .set_configuration(&Configuration::Client(ClientConfiguration::default()))?;
            self.wifi.start()?;
        }
        Ok(())
    }

    fn auth_method(secret: &str) -> AuthMethod {
        if secret.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        }
    }

    fn prefix_len(mask: std::net::Ipv4Addr) -> u8 {
        u32::from(mask).leading_ones() as u8
    }

    fn subnet(config: &StaticAddressConfig, gateway: std::net::Ipv4Addr) -> ipv4::Subnet {
        ipv4::Subnet {
            gateway,
            mask: ipv4::Mask(Self::prefix_len(config.subnet_mask)),
        }
    }

    fn action(e: EspError) -> DriverError {
        DriverError::ActionFailed(format!("{:?}", e))
    }

    fn address(e: EspError) -> DriverError {
        DriverError::AddressConfig(format!("{:?}", e))
    }
}

impl WifiDriver for EspWifiDriver<'_> {
    fn scan(&mut self) -> Result<Vec<String>, DriverError> {
        self.ensure_started()
            .map_err(|e| DriverError::ScanFailed(format!("{:?}", e)))?;
        let access_points = self
            .wifi
            .scan()
            .map_err(|e| DriverError::ScanFailed(format!("{:?}", e)))?;
        Ok(access_points
            .into_iter()
            .map(|ap| ap.ssid.to_string())
            .collect())
    }

    fn join(&mut self, ssid: &str, secret: &str) -> Result<(), DriverError> {
        info!("joining {}", ssid);

        let configuration = Configuration::Client(ClientConfiguration {
            ssid: ssid.try_into().map_err(|_| DriverError::InvalidSsid)?,
            password: secret.try_into().map_err(|_| DriverError::InvalidSecret)?,
            auth_method: Self::auth_method(secret),
            ..Default::default()
        });

        self.wifi
            .set_configuration(&configuration)
            .map_err(Self::action)?;
        if !self.wifi.is_started().unwrap_or(false) {
            self.wifi.start().map_err(Self::action)?;
        }
        self.wifi.connect().map_err(Self::action)?;
        self.wifi.wait_netif_up().map_err(Self::action)?;

        Ok(())
    }

    fn host(&mut self, ssid: &str, secret: &str) -> Result<(), DriverError> {
        info!("advertising {}", ssid);

        let configuration = Configuration::AccessPoint(AccessPointConfiguration {
            ssid: ssid.try_into().map_err(|_| DriverError::InvalidSsid)?,
            password: secret.try_into().map_err(|_| DriverError::InvalidSecret)?,
            auth_method: Self::auth_method(secret),
            ..Default::default()
        });

        self.wifi
            .set_configuration(&configuration)
            .map_err(Self::action)?;
        if !self.wifi.is_started().unwrap_or(false) {
            self.wifi.start().map_err(Self::action)?;
        }
        self.wifi.wait_netif_up().map_err(Self::action)?;

        Ok(())
    }

    fn configure_station(&mut self, config: &StaticAddressConfig) -> Result<(), DriverError> {
        let netif_configuration = NetifConfiguration {
            ip_configuration: Some(ipv4::Configuration::Client(
                ipv4::ClientConfiguration::Fixed(ipv4::ClientSettings {
                    ip: config.device,
                    subnet: Self::subnet(config, config.gateway),
                    dns: config.dns_primary,
                    secondary_dns: config.dns_secondary,
                }),
            )),
            ..NetifConfiguration::wifi_default_client()
        };
        let netif = EspNetif::new_with_conf(&netif_configuration).map_err(Self::address)?;
        self.wifi
            .wifi_mut()
            .swap_netif_sta(netif)
            .map_err(Self::address)?;
        Ok(())
    }

    fn configure_access_point(&mut self, config: &StaticAddressConfig) -> Result<(), DriverError> {
        let netif_configuration = NetifConfiguration {
            ip_configuration: Some(ipv4::Configuration::Router(ipv4::RouterConfiguration {
                subnet: Self::subnet(config, config.device),
                dhcp_enabled: true,
                dns: config.dns_primary,
                secondary_dns: config.dns_secondary,
            })),
            ..NetifConfiguration::wifi_default_router()
        };
        let netif = EspNetif::new_with_conf(&netif_configuration).map_err(Self::address)?;
        self.wifi
            .wifi_mut()
            .swap_netif_ap(netif)
            .map_err(Self::address)?;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }

    fn ip_addr(&self) -> Option<IpAddr> {
        let station = self
            .wifi
            .wifi()
            .sta_netif()
            .get_ip_info()
            .ok()
            .filter(|info| !info.ip.is_unspecified());
        let info = station.or_else(|| self.wifi.wifi().ap_netif().get_ip_info().ok())?;
        Some(IpAddr::V4(info.ip))
    }

    fn disconnect(&mut self) {
        if let Err(e) = self.wifi.disconnect() {
            warn!("disconnect failed: {:?}", e);
        }
        if let Err(e) = self.wifi.stop() {
            warn!("stop failed: {:?}", e);
        }
    }
}
