//! Connection supervision.
//!
//! Drives the join/host action decided by selection, with static addressing
//! and a bounded retry loop, and tracks the connection lifecycle:
//! `Idle -> Connecting -> Connected | Failed`.

use std::fmt;
use std::net::IpAddr;
use std::thread;
use std::time::Duration;

use log::{info, warn};

use super::{DriverError, NetworkMode, SelectedNetwork, WifiDriver};
use crate::config::StaticAddressConfig;

/// Bounded retry behavior for join attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of status checks before giving up.
    pub max_attempts: u32,
    /// Fixed wait between status checks.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            delay: Duration::from_secs(1),
        }
    }
}

/// Connection lifecycle state. Owned exclusively by the supervisor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection activity.
    Idle,
    /// A join/host action is in progress.
    Connecting { attempt: u32 },
    /// Terminal: the device is up on a network.
    Connected { address: Option<IpAddr> },
    /// Terminal: the last attempt failed.
    Failed { reason: ConnectError },
}

/// Details of a successful connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectedInfo {
    /// Name of the network joined or hosted.
    pub ssid: String,
    /// Role taken on the network.
    pub mode: NetworkMode,
    /// Local address, when the driver can report one.
    pub address: Option<IpAddr>,
}

/// Supervises the connection of one device to one network.
///
/// Owns the [`WifiDriver`] exclusively; all join/host/teardown actions flow
/// through here. The supervisor never re-selects on its own: after a failure
/// the caller decides whether to scan again and re-invoke.
pub struct ConnectionSupervisor<D: WifiDriver> {
    driver: D,
    policy: RetryPolicy,
    state: ConnectionState,
}

impl<D: WifiDriver> ConnectionSupervisor<D> {
    /// Create a supervisor around a driver.
    pub fn new(driver: D, policy: RetryPolicy) -> Self {
        Self {
            driver,
            policy,
            state: ConnectionState::Idle,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    /// Borrow the underlying driver, e.g. to scan before re-selection.
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Connect according to the selection.
    ///
    /// Applies the mode-appropriate static addressing first; a configuration
    /// failure is logged and does not stop the attempt. Host mode then
    /// advertises once (no retry loop). Join mode issues the join and polls
    /// connection status every `delay` up to `max_attempts` times, exiting
    /// early as soon as the driver reports connected.
    pub fn connect(
        &mut self,
        selection: &SelectedNetwork,
        addresses: &StaticAddressConfig,
    ) -> Result<ConnectedInfo, ConnectError> {
        let ssid = selection.credential.name();
        let secret = selection.credential.secret();
        self.state = ConnectionState::Connecting { attempt: 0 };

        // Static addressing is applied best-effort: a device that cannot
        // claim its fixed address still joins/hosts rather than staying off
        // the network entirely.
        let configured = match selection.mode {
            NetworkMode::Host => self.driver.configure_access_point(addresses),
            NetworkMode::Join => self.driver.configure_station(addresses),
        };
        if let Err(e) = configured {
            warn!("static addressing failed, continuing without it: {}", e);
        }

        match selection.mode {
            NetworkMode::Host => {
                info!("hosting network {}", ssid);
                if let Err(e) = self.driver.host(ssid, secret) {
                    return Err(self.fail(ConnectError::ActionFailed(e)));
                }
            }
            NetworkMode::Join => {
                info!("joining network {}", ssid);
                if let Err(e) = self.driver.join(ssid, secret) {
                    return Err(self.fail(ConnectError::ActionFailed(e)));
                }

                let mut connected = false;
                for attempt in 1..=self.policy.max_attempts {
                    self.state = ConnectionState::Connecting { attempt };
                    thread::sleep(self.policy.delay);
                    if self.driver.is_connected() {
                        connected = true;
                        break;
                    }
                }
                if !connected {
                    return Err(self.fail(ConnectError::Timeout {
                        attempts: self.policy.max_attempts,
                    }));
                }
            }
        }

        let address = self.driver.ip_addr();
        match address {
            Some(ip) => info!("up on {} at {}", ssid, ip),
            None => warn!("up on {} but no local address reported", ssid),
        }
        self.state = ConnectionState::Connected { address };

        Ok(ConnectedInfo {
            ssid: ssid.to_string(),
            mode: selection.mode,
            address,
        })
    }

    /// Tear down any association and return to `Idle`.
    ///
    /// Always safe to call, in any state.
    pub fn disconnect(&mut self) {
        info!("disconnecting");
        self.driver.disconnect();
        self.state = ConnectionState::Idle;
    }

    fn fail(&mut self, reason: ConnectError) -> ConnectError {
        warn!("connection failed: {}", reason);
        self.state = ConnectionState::Failed {
            reason: reason.clone(),
        };
        reason
    }
}

/// Errors that end a connection attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectError {
    /// Join retries exhausted without the driver reporting connected.
    Timeout { attempts: u32 },
    /// The join/host action itself was rejected.
    ActionFailed(DriverError),
}

impl fmt::Display for ConnectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout { attempts } => {
                write!(f, "not connected after {} status checks", attempts)
            }
            Self::ActionFailed(e) => write!(f, "action rejected: {}", e),
        }
    }
}

impl std::error::Error for ConnectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ActionFailed(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Credential, DeviceId};
    use crate::network::testutil::MockDriver;

    fn join_selection() -> SelectedNetwork {
        SelectedNetwork {
            credential: Credential::new("NetA", "password-a").unwrap(),
            mode: NetworkMode::Join,
        }
    }

    fn host_selection() -> SelectedNetwork {
        SelectedNetwork {
            credential: Credential::new("NetA", "password-a").unwrap(),
            mode: NetworkMode::Host,
        }
    }

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            delay: Duration::ZERO,
        }
    }

    fn addresses() -> StaticAddressConfig {
        StaticAddressConfig::for_device(DeviceId::Dancer)
    }

    #[test]
    fn test_bounded_retry_times_out() {
        // Driver never reports connected: exactly max_attempts checks, then
        // a timeout.
        let driver = MockDriver::new().connected_after(None);
        let mut supervisor = ConnectionSupervisor::new(driver, fast_policy(3));

        let err = supervisor
            .connect(&join_selection(), &addresses())
            .unwrap_err();
        assert_eq!(err, ConnectError::Timeout { attempts: 3 });
        assert_eq!(supervisor.driver_mut().status_checks(), 3);
        assert!(matches!(
            supervisor.state(),
            ConnectionState::Failed {
                reason: ConnectError::Timeout { attempts: 3 }
            }
        ));
    }

    #[test]
    fn test_join_exits_early_once_connected() {
        let driver = MockDriver::new().connected_after(Some(2));
        let mut supervisor = ConnectionSupervisor::new(driver, fast_policy(5));

        let info = supervisor.connect(&join_selection(), &addresses()).unwrap();
        assert_eq!(info.ssid, "NetA");
        assert_eq!(info.mode, NetworkMode::Join);
        assert_eq!(supervisor.driver_mut().status_checks(), 2);
        assert!(matches!(
            supervisor.state(),
            ConnectionState::Connected { .. }
        ));
    }

    #[test]
    fn test_host_succeeds_in_one_step() {
        let driver = MockDriver::new();
        let mut supervisor = ConnectionSupervisor::new(driver, fast_policy(3));

        let info = supervisor.connect(&host_selection(), &addresses()).unwrap();
        assert_eq!(info.mode, NetworkMode::Host);
        // Hosting never enters the status poll loop.
        assert_eq!(supervisor.driver_mut().status_checks(), 0);
        assert_eq!(supervisor.driver_mut().host_calls(), 1);
    }

    #[test]
    fn test_host_action_failure_is_terminal() {
        let driver = MockDriver::new().with_host_error("radio off");
        let mut supervisor = ConnectionSupervisor::new(driver, fast_policy(3));

        let err = supervisor
            .connect(&host_selection(), &addresses())
            .unwrap_err();
        assert!(matches!(err, ConnectError::ActionFailed(_)));
        // No automatic retry of a failed host action.
        assert_eq!(supervisor.driver_mut().host_calls(), 1);
    }

    #[test]
    fn test_join_action_failure_is_terminal() {
        let driver = MockDriver::new().with_join_error("auth rejected");
        let mut supervisor = ConnectionSupervisor::new(driver, fast_policy(3));

        let err = supervisor
            .connect(&join_selection(), &addresses())
            .unwrap_err();
        assert!(matches!(err, ConnectError::ActionFailed(_)));
        assert_eq!(supervisor.driver_mut().status_checks(), 0);
    }

    #[test]
    fn test_address_configuration_failure_is_not_fatal() {
        // Addressing fails, but the join is still attempted and succeeds.
        let driver = MockDriver::new()
            .with_config_error("netif busy")
            .connected_after(Some(1));
        let mut supervisor = ConnectionSupervisor::new(driver, fast_policy(3));

        let info = supervisor.connect(&join_selection(), &addresses()).unwrap();
        assert_eq!(info.ssid, "NetA");
        assert_eq!(supervisor.driver_mut().join_calls(), 1);
    }

    #[test]
    fn test_disconnect_resets_to_idle() {
        let driver = MockDriver::new().connected_after(Some(1));
        let mut supervisor = ConnectionSupervisor::new(driver, fast_policy(3));

        supervisor.connect(&join_selection(), &addresses()).unwrap();
        supervisor.disconnect();
        assert_eq!(*supervisor.state(), ConnectionState::Idle);
        assert_eq!(supervisor.driver_mut().disconnect_calls(), 1);

        // Safe to call again from Idle.
        supervisor.disconnect();
        assert_eq!(*supervisor.state(), ConnectionState::Idle);
    }

    #[test]
    fn test_default_policy_constants() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 10);
        assert_eq!(policy.delay, Duration::from_secs(1));
    }
}
