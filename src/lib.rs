//! Fleetlink device networking library.
//!
//! Small robot devices on a shared WiFi network use this crate to find and
//! join (or else host) that network from a prioritized credential list, and to
//! exchange simple HTTP request/response messages with a peer device once
//! connected.
//!
//! The platform-independent core (selection, connection supervision, the
//! request session) is testable on the host machine without hardware; the
//! ESP-IDF driver is compiled in with the `esp32` feature.

pub mod client;
pub mod config;
pub mod network;
pub mod server;

// Re-export commonly used items
pub use client::{Method, RequestSession, Response, SessionError, TransportError, PEER_HTTP_PORT};
pub use config::{ConfigError, Credential, CredentialStore, DeviceId, StaticAddressConfig};
pub use network::{
    select_network, ConnectError, ConnectedInfo, ConnectionState, ConnectionSupervisor,
    DriverError, NetworkMode, RetryPolicy, SelectedNetwork, SelectionError, WifiDriver,
};
pub use server::{PeerReply, PeerRequest, PeerServer, Router};

#[cfg(not(target_os = "espidf"))]
pub use client::ThreadedTransport;
#[cfg(feature = "esp32")]
pub use network::EspWifiDriver;
#[cfg(not(target_os = "espidf"))]
pub use network::HostWifi;
