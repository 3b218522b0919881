//! Static addressing and the device route table.
//!
//! Every device identity maps to a fixed address on the fleet subnet, so a
//! client can reach its peer's server without DNS. The mapping is static
//! configuration data; the connection state machine only consumes it.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use crate::client::PEER_HTTP_PORT;

/// Gateway for the fleet network.
pub const DEFAULT_GATEWAY: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 1);

/// Subnet mask for the fleet network.
pub const DEFAULT_SUBNET_MASK: Ipv4Addr = Ipv4Addr::new(255, 255, 255, 0);

/// Address assigned to identities missing from the route table.
pub const FALLBACK_PEER_ADDRESS: Ipv4Addr = Ipv4Addr::new(192, 168, 2, 0);

/// Device identities the fleet supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceId {
    Dancer,
    Plotter,
    Marquee,
    Tower,
}

/// Route table: device identity to its fixed address on the fleet subnet.
const PEER_ROUTES: [(DeviceId, Ipv4Addr); 4] = [
    (DeviceId::Dancer, Ipv4Addr::new(192, 168, 2, 1)),
    (DeviceId::Plotter, Ipv4Addr::new(192, 168, 2, 2)),
    (DeviceId::Marquee, Ipv4Addr::new(192, 168, 2, 3)),
    (DeviceId::Tower, Ipv4Addr::new(192, 168, 2, 4)),
];

impl DeviceId {
    /// Fixed address this identity's server lives at.
    pub fn peer_address(self) -> Ipv4Addr {
        PEER_ROUTES
            .iter()
            .find(|(id, _)| *id == self)
            .map(|(_, addr)| *addr)
            .unwrap_or(FALLBACK_PEER_ADDRESS)
    }

    /// Socket address of this identity's HTTP server.
    pub fn peer_endpoint(self) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(self.peer_address(), PEER_HTTP_PORT))
    }
}

/// Static address configuration applied during connection setup.
///
/// Supplied at initialization and immutable for the lifetime of a bootstrap
/// attempt. The DNS pair is optional; fleet traffic is addressed by the route
/// table, not by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticAddressConfig {
    /// Address this device claims.
    pub device: Ipv4Addr,
    /// Gateway for traffic leaving the subnet.
    pub gateway: Ipv4Addr,
    /// Subnet mask.
    pub subnet_mask: Ipv4Addr,
    /// Optional primary DNS.
    pub dns_primary: Option<Ipv4Addr>,
    /// Optional secondary DNS.
    pub dns_secondary: Option<Ipv4Addr>,
}

impl StaticAddressConfig {
    /// Create a configuration with no DNS entries.
    pub fn new(device: Ipv4Addr, gateway: Ipv4Addr, subnet_mask: Ipv4Addr) -> Self {
        Self {
            device,
            gateway,
            subnet_mask,
            dns_primary: None,
            dns_secondary: None,
        }
    }

    /// Default addressing for a device identity: its route-table address on
    /// the fleet gateway and subnet.
    pub fn for_device(id: DeviceId) -> Self {
        Self::new(id.peer_address(), DEFAULT_GATEWAY, DEFAULT_SUBNET_MASK)
    }

    /// Attach a DNS pair.
    pub fn with_dns(mut self, primary: Ipv4Addr, secondary: Ipv4Addr) -> Self {
        self.dns_primary = Some(primary);
        self.dns_secondary = Some(secondary);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_table_lookup() {
        assert_eq!(
            DeviceId::Dancer.peer_address(),
            Ipv4Addr::new(192, 168, 2, 1)
        );
        assert_eq!(
            DeviceId::Plotter.peer_address(),
            Ipv4Addr::new(192, 168, 2, 2)
        );
        assert_eq!(
            DeviceId::Marquee.peer_address(),
            Ipv4Addr::new(192, 168, 2, 3)
        );
        assert_eq!(DeviceId::Tower.peer_address(), Ipv4Addr::new(192, 168, 2, 4));
    }

    #[test]
    fn test_peer_endpoint_port() {
        let endpoint = DeviceId::Dancer.peer_endpoint();
        assert_eq!(endpoint.port(), PEER_HTTP_PORT);
        assert_eq!(endpoint.ip(), Ipv4Addr::new(192, 168, 2, 1));
    }

    #[test]
    fn test_for_device_defaults() {
        let config = StaticAddressConfig::for_device(DeviceId::Marquee);
        assert_eq!(config.device, Ipv4Addr::new(192, 168, 2, 3));
        assert_eq!(config.gateway, DEFAULT_GATEWAY);
        assert_eq!(config.subnet_mask, DEFAULT_SUBNET_MASK);
        assert!(config.dns_primary.is_none());
        assert!(config.dns_secondary.is_none());
    }

    #[test]
    fn test_with_dns() {
        let config = StaticAddressConfig::for_device(DeviceId::Tower)
            .with_dns(Ipv4Addr::new(8, 8, 8, 8), Ipv4Addr::new(8, 8, 4, 4));
        assert_eq!(config.dns_primary, Some(Ipv4Addr::new(8, 8, 8, 8)));
        assert_eq!(config.dns_secondary, Some(Ipv4Addr::new(8, 8, 4, 4)));
    }
}
