//! Host loopback demo.
//!
//! Runs the whole stack on one machine: bootstraps the network over the host
//! driver, starts a peer server on a loopback port, then drives ping/GET/POST
//! and an asynchronous send through a request session.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin loopback
//! ```

use std::net::{IpAddr, Ipv4Addr};
use std::sync::mpsc;
use std::time::Duration;

use fleetlink::{
    select_network, ConnectionSupervisor, Credential, CredentialStore, DeviceId, HostWifi, Method,
    PeerReply, PeerServer, RequestSession, RetryPolicy, Router, StaticAddressConfig,
    ThreadedTransport,
};
use log::{error, info};

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("=== Fleetlink loopback demo starting ===");

    // Bootstrap: select a network and bring it up over the host driver.
    let store = CredentialStore::new(vec![
        Credential::new("FleetNet", "Fl33tNet!pass").expect("valid credential"),
        Credential::new("Workshop", "workshop1234").expect("valid credential"),
    ]);

    let mut driver = HostWifi::new();
    let selection = match select_network(&mut driver, &store) {
        Ok(selection) => selection,
        Err(e) => {
            error!("selection failed: {}", e);
            std::process::exit(1);
        }
    };
    info!(
        "selected {} in {:?} mode",
        selection.credential.name(),
        selection.mode
    );

    let mut supervisor = ConnectionSupervisor::new(driver, RetryPolicy::default());
    let addresses = StaticAddressConfig::for_device(DeviceId::Dancer);
    let connected = match supervisor.connect(&selection, &addresses) {
        Ok(info) => info,
        Err(e) => {
            error!("bootstrap failed: {}", e);
            std::process::exit(1);
        }
    };
    info!(
        "up on {} ({:?}), address {:?}",
        connected.ssid, connected.mode, connected.address
    );

    // Serve a couple of endpoints on a loopback port.
    let router = Router::new()
        .on("/", Method::Get, |_| PeerReply::ok("fleetlink"))
        .on("/status", Method::Get, |_| PeerReply::ok("dancing"))
        .on("/move", Method::Post, |request| {
            PeerReply::ok(
                request
                    .params
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, v))
                    .collect::<Vec<_>>()
                    .join("&"),
            )
        });

    let server = match PeerServer::start(Some(IpAddr::V4(Ipv4Addr::LOCALHOST)), 0, router) {
        Ok(server) => server,
        Err(e) => {
            error!("failed to start peer server: {}", e);
            std::process::exit(1);
        }
    };
    info!("peer server at http://{}/", server.local_addr());

    // Client side: one reusable session against the server.
    let mut session = RequestSession::with_peer(ThreadedTransport::new(), server.local_addr());

    match session.ping() {
        Ok(status) => info!("ping: {}", status),
        Err(e) => error!("ping failed: {}", e),
    }

    match session.send_blocking("/status", Method::Get, &[]) {
        Ok(response) => info!("GET /status -> {} {}", response.status, response.body),
        Err(e) => error!("GET /status failed: {}", e),
    }

    match session.send_blocking("/move", Method::Post, &[("dir", "left"), ("speed", "3")]) {
        Ok(response) => info!("POST /move -> {} {}", response.status, response.body),
        Err(e) => error!("POST /move failed: {}", e),
    }

    // Asynchronous variant: the callback fires from the transport thread.
    let (tx, rx) = mpsc::channel();
    let issued = session.send_async("/status", Method::Get, &[], move |outcome| {
        let _ = tx.send(outcome);
    });
    match issued {
        Ok(()) => match rx.recv_timeout(Duration::from_secs(10)) {
            Ok(Ok(response)) => info!("async GET /status -> {}", response.status),
            Ok(Err(e)) => error!("async GET /status failed: {}", e),
            Err(_) => error!("async GET /status never completed"),
        },
        Err(e) => error!("async send rejected: {}", e),
    }

    supervisor.disconnect();
    info!("=== done ===");
}
