//! WiFi driver abstraction.
//!
//! This trait is the boundary between the bootstrap state machines and the
//! actual network stack, allowing the same selection and supervision code to
//! run on ESP32 hardware and on the host.

use std::fmt;
use std::net::IpAddr;

use crate::config::StaticAddressConfig;

/// Platform WiFi driver.
///
/// Implementations wrap a real radio (ESP-IDF) or the host OS network. The
/// supervisor owns the driver exclusively; nothing else issues actions
/// against it.
pub trait WifiDriver {
    /// Scan for visible networks, returning their names.
    ///
    /// Produced fresh on every call; results are never cached across scans.
    fn scan(&mut self) -> Result<Vec<String>, DriverError>;

    /// Join an existing network as a station.
    fn join(&mut self, ssid: &str, secret: &str) -> Result<(), DriverError>;

    /// Advertise a new network as an access point.
    fn host(&mut self, ssid: &str, secret: &str) -> Result<(), DriverError>;

    /// Apply static station addressing ahead of a join.
    fn configure_station(&mut self, config: &StaticAddressConfig) -> Result<(), DriverError>;

    /// Apply static access-point addressing ahead of hosting.
    fn configure_access_point(&mut self, config: &StaticAddressConfig) -> Result<(), DriverError>;

    /// Whether the driver currently reports an active association.
    fn is_connected(&self) -> bool;

    /// Local address, if any.
    fn ip_addr(&self) -> Option<IpAddr>;

    /// Tear down any association. Safe to call in any state.
    fn disconnect(&mut self);
}

/// Errors reported by a WiFi driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// Network name rejected by the platform (too long, bad encoding).
    InvalidSsid,
    /// Shared secret rejected by the platform.
    InvalidSecret,
    /// The scan itself failed.
    ScanFailed(String),
    /// The join/host action was rejected.
    ActionFailed(String),
    /// Static address configuration failed.
    AddressConfig(String),
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSsid => write!(f, "invalid network name"),
            Self::InvalidSecret => write!(f, "invalid shared secret"),
            Self::ScanFailed(msg) => write!(f, "scan failed: {}", msg),
            Self::ActionFailed(msg) => write!(f, "network action failed: {}", msg),
            Self::AddressConfig(msg) => write!(f, "address configuration failed: {}", msg),
        }
    }
}

impl std::error::Error for DriverError {}
