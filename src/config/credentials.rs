//! Network credentials.
//!
//! A device ships with an ordered list of known networks it may join or host.
//! List order encodes priority: index 0 is tried first and doubles as the
//! identity to advertise when hosting.
//!
//! # Example
//!
//! ```
//! use fleetlink::config::{Credential, CredentialStore};
//!
//! let store = CredentialStore::new(vec![
//!     Credential::new("FleetNet", "Fl33tNet!").unwrap(),
//!     Credential::new("Workshop", "workshop1234").unwrap(),
//! ]);
//! assert_eq!(store.first().unwrap().name(), "FleetNet");
//! ```

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Maximum network name length per IEEE 802.11 standard.
pub const MAX_NAME_LEN: usize = 32;

/// Maximum shared secret length for WPA2.
pub const MAX_SECRET_LEN: usize = 64;

/// Minimum shared secret length for WPA2.
pub const MIN_SECRET_LEN: usize = 8;

/// One known network: a name and a WPA2-style shared secret.
///
/// Immutable once constructed. Identity is the name. The secret is wiped from
/// memory when the credential is dropped.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Credential {
    name: String,
    secret: String,
}

impl Credential {
    /// Create a new credential.
    ///
    /// Returns an error if the name or secret are invalid.
    pub fn new(name: impl Into<String>, secret: impl Into<String>) -> Result<Self, ConfigError> {
        let credential = Self {
            name: name.into(),
            secret: secret.into(),
        };
        credential.validate()?;
        Ok(credential)
    }

    /// Create a credential for an open network (no secret).
    pub fn open(name: impl Into<String>) -> Result<Self, ConfigError> {
        Self::new(name, String::new())
    }

    /// Network name (SSID).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shared secret. Empty for open networks.
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Check if this is an open network (no secret).
    pub fn is_open(&self) -> bool {
        self.secret.is_empty()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::NameEmpty);
        }
        if self.name.len() > MAX_NAME_LEN {
            return Err(ConfigError::NameTooLong {
                len: self.name.len(),
                max: MAX_NAME_LEN,
            });
        }

        // An empty secret is OK for open networks
        if !self.secret.is_empty() && self.secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::SecretTooShort {
                len: self.secret.len(),
                min: MIN_SECRET_LEN,
            });
        }
        if self.secret.len() > MAX_SECRET_LEN {
            return Err(ConfigError::SecretTooLong {
                len: self.secret.len(),
                max: MAX_SECRET_LEN,
            });
        }

        Ok(())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Keep secrets out of logs
        f.debug_struct("Credential")
            .field("name", &self.name)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Ordered list of known networks, highest priority first.
///
/// The store is loaded once at initialization and not modified afterwards.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    entries: Vec<Credential>,
}

impl CredentialStore {
    /// Create a store from an ordered list. Index 0 is the highest priority.
    pub fn new(entries: Vec<Credential>) -> Self {
        Self { entries }
    }

    /// Create an empty store. Selection against it always fails.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no credentials.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &Credential> {
        self.entries.iter()
    }

    /// The highest-priority entry, used as the host-mode fallback identity.
    pub fn first(&self) -> Option<&Credential> {
        self.entries.first()
    }

    /// Look up a credential by network name.
    pub fn lookup(&self, name: &str) -> Option<&Credential> {
        self.entries.iter().find(|c| c.name() == name)
    }
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Network name is empty.
    NameEmpty,
    /// Network name exceeds maximum length.
    NameTooLong { len: usize, max: usize },
    /// Shared secret is too short for WPA2.
    SecretTooShort { len: usize, min: usize },
    /// Shared secret exceeds maximum length.
    SecretTooLong { len: usize, max: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NameEmpty => write!(f, "network name cannot be empty"),
            Self::NameTooLong { len, max } => {
                write!(f, "network name too long: {} bytes (max {})", len, max)
            }
            Self::SecretTooShort { len, min } => {
                write!(f, "shared secret too short: {} bytes (min {})", len, min)
            }
            Self::SecretTooLong { len, max } => {
                write!(f, "shared secret too long: {} bytes (max {})", len, max)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Credential Tests ====================

    #[test]
    fn test_valid_credential() {
        let credential = Credential::new("FleetNet", "password123").unwrap();
        assert_eq!(credential.name(), "FleetNet");
        assert_eq!(credential.secret(), "password123");
        assert!(!credential.is_open());
    }

    #[test]
    fn test_open_network() {
        let credential = Credential::open("OpenNet").unwrap();
        assert!(credential.is_open());
        assert_eq!(credential.secret(), "");
    }

    #[test]
    fn test_empty_name() {
        let result = Credential::new("", "password123");
        assert_eq!(result, Err(ConfigError::NameEmpty));
    }

    #[test]
    fn test_name_too_long() {
        let long_name = "a".repeat(33);
        let result = Credential::new(long_name, "password123");
        assert!(matches!(result, Err(ConfigError::NameTooLong { .. })));
    }

    #[test]
    fn test_name_max_length() {
        let max_name = "a".repeat(32);
        assert!(Credential::new(max_name, "password123").is_ok());
    }

    #[test]
    fn test_secret_too_short() {
        let result = Credential::new("FleetNet", "short");
        assert!(matches!(result, Err(ConfigError::SecretTooShort { .. })));
    }

    #[test]
    fn test_secret_min_length() {
        assert!(Credential::new("FleetNet", "12345678").is_ok());
    }

    #[test]
    fn test_secret_too_long() {
        let long_secret = "a".repeat(65);
        let result = Credential::new("FleetNet", long_secret);
        assert!(matches!(result, Err(ConfigError::SecretTooLong { .. })));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let credential = Credential::new("FleetNet", "password123").unwrap();
        let debug_str = format!("{:?}", credential);
        assert!(debug_str.contains("FleetNet"));
        assert!(!debug_str.contains("password123"));
    }

    // ==================== CredentialStore Tests ====================

    #[test]
    fn test_store_priority_order() {
        let store = CredentialStore::new(vec![
            Credential::new("First", "password1").unwrap(),
            Credential::new("Second", "password2").unwrap(),
        ]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.first().unwrap().name(), "First");

        let names: Vec<&str> = store.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["First", "Second"]);
    }

    #[test]
    fn test_store_lookup() {
        let store = CredentialStore::new(vec![
            Credential::new("First", "password1").unwrap(),
            Credential::new("Second", "password2").unwrap(),
        ]);
        assert_eq!(store.lookup("Second").unwrap().secret(), "password2");
        assert!(store.lookup("Missing").is_none());
    }

    #[test]
    fn test_empty_store() {
        let store = CredentialStore::empty();
        assert!(store.is_empty());
        assert!(store.first().is_none());
    }
}
