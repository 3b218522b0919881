//! Scripted WiFi driver for state-machine tests.

use std::cell::Cell;
use std::net::{IpAddr, Ipv4Addr};

use super::{DriverError, WifiDriver};
use crate::config::StaticAddressConfig;

/// Scripted driver: visibility, failures, and connection timing are all
/// configured up front; every call is counted.
pub(crate) struct MockDriver {
    visible: Vec<String>,
    scan_error: Option<String>,
    join_error: Option<String>,
    host_error: Option<String>,
    config_error: Option<String>,
    /// Report connected on the Nth status check; `None` means never.
    connected_after: Option<u32>,
    scan_count: u32,
    join_calls: u32,
    host_calls: u32,
    disconnect_calls: u32,
    status_checks: Cell<u32>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self {
            visible: Vec::new(),
            scan_error: None,
            join_error: None,
            host_error: None,
            config_error: None,
            connected_after: None,
            scan_count: 0,
            join_calls: 0,
            host_calls: 0,
            disconnect_calls: 0,
            status_checks: Cell::new(0),
        }
    }

    pub fn with_visible(mut self, names: &[&str]) -> Self {
        self.visible = names.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_scan_error(mut self, msg: &str) -> Self {
        self.scan_error = Some(msg.to_string());
        self
    }

    pub fn with_join_error(mut self, msg: &str) -> Self {
        self.join_error = Some(msg.to_string());
        self
    }

    pub fn with_host_error(mut self, msg: &str) -> Self {
        self.host_error = Some(msg.to_string());
        self
    }

    pub fn with_config_error(mut self, msg: &str) -> Self {
        self.config_error = Some(msg.to_string());
        self
    }

    pub fn connected_after(mut self, checks: Option<u32>) -> Self {
        self.connected_after = checks;
        self
    }

    pub fn scan_count(&self) -> u32 {
        self.scan_count
    }

    pub fn join_calls(&self) -> u32 {
        self.join_calls
    }

    pub fn host_calls(&self) -> u32 {
        self.host_calls
    }

    pub fn disconnect_calls(&self) -> u32 {
        self.disconnect_calls
    }

    pub fn status_checks(&self) -> u32 {
        self.status_checks.get()
    }
}

impl WifiDriver for MockDriver {
    fn scan(&mut self) -> Result<Vec<String>, DriverError> {
        self.scan_count += 1;
        match &self.scan_error {
            Some(msg) => Err(DriverError::ScanFailed(msg.clone())),
            None => Ok(self.visible.clone()),
        }
    }

    fn join(&mut self, _ssid: &str, _secret: &str) -> Result<(), DriverError> {
        self.join_calls += 1;
        match &self.join_error {
            Some(msg) => Err(DriverError::ActionFailed(msg.clone())),
            None => Ok(()),
        }
    }

    fn host(&mut self, _ssid: &str, _secret: &str) -> Result<(), DriverError> {
        self.host_calls += 1;
        match &self.host_error {
            Some(msg) => Err(DriverError::ActionFailed(msg.clone())),
            None => Ok(()),
        }
    }

    fn configure_station(&mut self, _config: &StaticAddressConfig) -> Result<(), DriverError> {
        match &self.config_error {
            Some(msg) => Err(DriverError::AddressConfig(msg.clone())),
            None => Ok(()),
        }
    }

    fn configure_access_point(&mut self, config: &StaticAddressConfig) -> Result<(), DriverError> {
        self.configure_station(config)
    }

    fn is_connected(&self) -> bool {
        let checks = self.status_checks.get() + 1;
        self.status_checks.set(checks);
        self.connected_after.is_some_and(|n| checks >= n)
    }

    fn ip_addr(&self) -> Option<IpAddr> {
        if self.join_calls > 0 || self.host_calls > 0 {
            Some(IpAddr::V4(Ipv4Addr::new(192, 168, 2, 10)))
        } else {
            None
        }
    }

    fn disconnect(&mut self) {
        self.disconnect_calls += 1;
    }
}
