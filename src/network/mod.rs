//! Network bootstrap.
//!
//! Run once at startup (or again after reconfiguration):
//!
//! 1. [`select_network`] scans for visible networks and intersects them with
//!    the credential store in priority order, deciding join-vs-host mode.
//! 2. [`ConnectionSupervisor`] drives the chosen action with static addressing
//!    and a bounded retry loop, ending in a terminal connected/failed outcome.
//!
//! The actual radio sits behind the [`WifiDriver`] trait:
//!
//! - **ESP32** (`esp32` feature): [`EspWifiDriver`] over ESP-IDF
//! - **Host**: [`HostWifi`], where the OS already provides the network
//!
//! # Example
//!
//! ```no_run
//! use fleetlink::config::{Credential, CredentialStore, DeviceId, StaticAddressConfig};
//! use fleetlink::network::{select_network, ConnectionSupervisor, HostWifi, RetryPolicy};
//!
//! let store = CredentialStore::new(vec![Credential::new("FleetNet", "Fl33tNet!").unwrap()]);
//! let mut driver = HostWifi::new();
//!
//! let selection = select_network(&mut driver, &store).unwrap();
//! let mut supervisor = ConnectionSupervisor::new(driver, RetryPolicy::default());
//! let info = supervisor
//!     .connect(&selection, &StaticAddressConfig::for_device(DeviceId::Dancer))
//!     .unwrap();
//! println!("up as {} ({:?})", info.ssid, info.mode);
//! ```

mod driver;
#[cfg(feature = "esp32")]
mod esp;
#[cfg(not(target_os = "espidf"))]
mod host;
mod selector;
mod supervisor;

#[cfg(test)]
pub(crate) mod testutil;

pub use driver::{DriverError, WifiDriver};
#[cfg(feature = "esp32")]
pub use esp::EspWifiDriver;
#[cfg(not(target_os = "espidf"))]
pub use host::HostWifi;
pub use selector::{select_network, NetworkMode, SelectedNetwork, SelectionError};
pub use supervisor::{
    ConnectError, ConnectedInfo, ConnectionState, ConnectionSupervisor, RetryPolicy,
};
