//! Host WiFi driver.
//!
//! On host systems the OS handles networking, so join/host are immediate
//! successes and scanning sees nothing (selection then falls back to host
//! mode). Lets the full bootstrap and demos run without hardware.

use std::net::IpAddr;

use log::info;

use super::{DriverError, WifiDriver};
use crate::config::StaticAddressConfig;

/// Host driver: the OS network stands in for the radio.
pub struct HostWifi {
    associated: bool,
    ip_addr: Option<IpAddr>,
}

impl HostWifi {
    /// Create a new host driver.
    pub fn new() -> Self {
        Self {
            associated: false,
            ip_addr: None,
        }
    }

    /// Get the primary local IP address.
    ///
    /// This uses a trick: create a UDP socket and "connect" to a public IP
    /// (doesn't actually send anything), then check which local address was
    /// chosen.
    fn detect_local_ip() -> Option<IpAddr> {
        use std::net::UdpSocket;

        let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
        socket.connect("8.8.8.8:80").ok()?;
        let local_addr = socket.local_addr().ok()?;
        Some(local_addr.ip())
    }

    fn associate(&mut self, ssid: &str) {
        self.ip_addr = Self::detect_local_ip();
        self.associated = true;
        match self.ip_addr {
            Some(ip) => info!("host network standing in for {}, local IP: {}", ssid, ip),
            None => info!("host network standing in for {}, no local IP detected", ssid),
        }
    }
}

impl Default for HostWifi {
    fn default() -> Self {
        Self::new()
    }
}

impl WifiDriver for HostWifi {
    fn scan(&mut self) -> Result<Vec<String>, DriverError> {
        // The OS does not expose a scan here; report nothing visible.
        Ok(Vec::new())
    }

    fn join(&mut self, ssid: &str, _secret: &str) -> Result<(), DriverError> {
        self.associate(ssid);
        Ok(())
    }

    fn host(&mut self, ssid: &str, _secret: &str) -> Result<(), DriverError> {
        self.associate(ssid);
        Ok(())
    }

    fn configure_station(&mut self, _config: &StaticAddressConfig) -> Result<(), DriverError> {
        // The OS owns addressing on the host.
        Ok(())
    }

    fn configure_access_point(&mut self, _config: &StaticAddressConfig) -> Result<(), DriverError> {
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.associated
    }

    fn ip_addr(&self) -> Option<IpAddr> {
        if self.associated {
            self.ip_addr
        } else {
            None
        }
    }

    fn disconnect(&mut self) {
        self.associated = false;
        self.ip_addr = None;
    }
}
