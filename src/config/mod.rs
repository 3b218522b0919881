//! Device configuration.
//!
//! This module holds the static configuration a device is initialized with:
//!
//! - [`credentials`] - the prioritized list of known networks
//! - [`address`] - static addressing and the device identity route table
//!
//! All of it is plain data, supplied once at startup and immutable for the
//! process lifetime. The state machines in [`crate::network`] borrow it; they
//! never own or mutate it.

mod address;
mod credentials;

pub use address::{
    DeviceId, StaticAddressConfig, DEFAULT_GATEWAY, DEFAULT_SUBNET_MASK, FALLBACK_PEER_ADDRESS,
};
pub use credentials::{
    ConfigError, Credential, CredentialStore, MAX_NAME_LEN, MAX_SECRET_LEN, MIN_SECRET_LEN,
};
