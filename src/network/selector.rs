//! Network selection.
//!
//! Decides which known network to operate under, and in which role, from one
//! scan of what is currently visible.

use log::{info, warn};

use super::WifiDriver;
use crate::config::{Credential, CredentialStore};

/// Role the device takes on the selected network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkMode {
    /// Become a client on an existing network.
    Join,
    /// Advertise the network for others to join.
    Host,
}

/// Outcome of selection: a credential and the role to use it in.
#[derive(Debug, Clone)]
pub struct SelectedNetwork {
    /// The credential to join or advertise with.
    pub credential: Credential,
    /// Join an existing network or host a new one.
    pub mode: NetworkMode,
}

/// Pick a network from the store, preferring the highest-priority credential
/// whose name is currently visible.
///
/// Performs exactly one scan. If any store entry is visible, the best one is
/// returned in [`NetworkMode::Join`]. Otherwise the highest-priority entry is
/// returned in [`NetworkMode::Host`], so the device always ends up with some
/// identity to operate under. An empty store fails outright.
///
/// A failed scan is treated the same as an empty one: no match, host
/// fallback. Scans are not retried here.
pub fn select_network<D: WifiDriver>(
    driver: &mut D,
    store: &CredentialStore,
) -> Result<SelectedNetwork, SelectionError> {
    let first = store.first().ok_or(SelectionError::NoCredentials)?;

    let visible = match driver.scan() {
        Ok(names) => names,
        Err(e) => {
            warn!("scan failed, treating as no visible networks: {}", e);
            Vec::new()
        }
    };

    for credential in store.iter() {
        if visible.iter().any(|name| name == credential.name()) {
            info!("found known network {}, joining", credential.name());
            return Ok(SelectedNetwork {
                credential: credential.clone(),
                mode: NetworkMode::Join,
            });
        }
    }

    info!(
        "no known network visible, falling back to hosting {}",
        first.name()
    );
    Ok(SelectedNetwork {
        credential: first.clone(),
        mode: NetworkMode::Host,
    })
}

/// Errors that can occur during selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// The credential store is empty; no identity is available at all.
    NoCredentials,
}

impl std::fmt::Display for SelectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "credential store is empty"),
        }
    }
}

impl std::error::Error for SelectionError {}
