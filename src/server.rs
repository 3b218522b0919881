//! Peer HTTP responder.
//!
//! The optional local server side of a device: a [`Router`] holds (path,
//! method, handler) registrations plus a catch-all not-found handler, and a
//! [`PeerServer`] serves it from a background thread. GET parameters arrive
//! in the query string, POST parameters in a form-url-encoded body, matching
//! what [`crate::client::RequestSession`] produces.

use std::io::Read;
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use log::{error, info, warn};
use tiny_http::{Response, Server};

use crate::client::{decode_params, Method};

/// One parsed request as seen by a handler.
#[derive(Debug, Clone)]
pub struct PeerRequest {
    /// Path without the query string.
    pub path: String,
    /// GET or POST.
    pub method: Method,
    /// Decoded key/value parameters, in wire order.
    pub params: Vec<(String, String)>,
}

/// What a handler sends back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerReply {
    pub status: u16,
    pub body: String,
}

impl PeerReply {
    /// 200 with a body.
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    /// The default 404.
    pub fn not_found() -> Self {
        Self {
            status: 404,
            body: "Not found".to_string(),
        }
    }
}

type Handler = Box<dyn Fn(&PeerRequest) -> PeerReply + Send + Sync + 'static>;

/// Route registry: (path, method, handler) plus a catch-all.
#[derive(Default)]
pub struct Router {
    routes: Vec<(String, Method, Handler)>,
    not_found: Option<Handler>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a path and method.
    pub fn on<F>(mut self, path: &str, method: Method, handler: F) -> Self
    where
        F: Fn(&PeerRequest) -> PeerReply + Send + Sync + 'static,
    {
        self.routes
            .push((path.to_string(), method, Box::new(handler)));
        self
    }

    /// Register the catch-all handler for unknown paths.
    pub fn on_not_found<F>(mut self, handler: F) -> Self
    where
        F: Fn(&PeerRequest) -> PeerReply + Send + Sync + 'static,
    {
        self.not_found = Some(Box::new(handler));
        self
    }

    /// Route a request to its handler, or to the catch-all.
    pub fn dispatch(&self, request: &PeerRequest) -> PeerReply {
        let wanted = normalize(&request.path);
        for (path, method, handler) in &self.routes {
            if *method == request.method && normalize(path) == wanted {
                return handler(request);
            }
        }
        match &self.not_found {
            Some(handler) => handler(request),
            None => PeerReply::not_found(),
        }
    }
}

/// Trailing-slash tolerant path comparison key.
fn normalize(path: &str) -> &str {
    if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    }
}

/// HTTP responder running a [`Router`] on a background thread.
pub struct PeerServer {
    handle: Option<thread::JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
    local_addr: SocketAddr,
}

impl PeerServer {
    /// Start the server.
    ///
    /// # Arguments
    ///
    /// * `bind_addr` - IP address to bind to (use `None` for 0.0.0.0)
    /// * `port` - Port to listen on (0 picks a free one)
    /// * `router` - Routes to serve
    ///
    /// # Returns
    ///
    /// A handle to the running server. Drop it to stop the server.
    pub fn start(
        bind_addr: Option<IpAddr>,
        port: u16,
        router: Router,
    ) -> Result<Self, std::io::Error> {
        let addr = match bind_addr {
            Some(ip) => format!("{}:{}", ip, port),
            None => format!("0.0.0.0:{}", port),
        };

        let server = Server::http(&addr)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::AddrInUse, format!("{}", e)))?;
        let local_addr = server.server_addr().to_ip().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::AddrNotAvailable, "no local address")
        })?;

        info!("peer server listening on http://{}/", local_addr);

        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();

        let handle = thread::spawn(move || {
            Self::run_server(server, router, shutdown_clone);
        });

        Ok(Self {
            handle: Some(handle),
            shutdown,
            local_addr,
        })
    }

    /// Address the server is actually bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    fn run_server(server: Server, router: Router, shutdown: Arc<AtomicBool>) {
        let allow_header =
            tiny_http::Header::from_bytes(&b"Allow"[..], &b"GET, POST"[..]).expect("static header");

        loop {
            // Use Acquire ordering to ensure we see the shutdown flag from stop()
            if shutdown.load(Ordering::Acquire) {
                info!("peer server shutting down");
                break;
            }

            match server.recv_timeout(std::time::Duration::from_millis(100)) {
                Ok(Some(mut request)) => {
                    let method = match request.method() {
                        tiny_http::Method::Get => Method::Get,
                        tiny_http::Method::Post => Method::Post,
                        _ => {
                            let response = Response::from_string("Method Not Allowed")
                                .with_status_code(405)
                                .with_header(allow_header.clone());
                            let _ = request.respond(response);
                            continue;
                        }
                    };

                    let url = request.url().to_string();
                    let (path, query) = match url.split_once('?') {
                        Some((path, query)) => (path.to_string(), query.to_string()),
                        None => (url, String::new()),
                    };

                    let params = match method {
                        Method::Get => decode_params(&query),
                        _ => {
                            let mut body = String::new();
                            if let Err(e) = request.as_reader().read_to_string(&mut body) {
                                warn!("failed to read request body: {}", e);
                            }
                            decode_params(&body)
                        }
                    };

                    let reply = router.dispatch(&PeerRequest {
                        path,
                        method,
                        params,
                    });
                    let response =
                        Response::from_string(reply.body).with_status_code(reply.status);
                    if let Err(e) = request.respond(response) {
                        warn!("failed to send response: {}", e);
                    }
                }
                Ok(None) => {
                    // Timeout, check shutdown flag and continue
                }
                Err(e) => {
                    error!("server error: {}", e);
                    break;
                }
            }
        }
    }

    /// Stop the server.
    ///
    /// Note: May take up to 100ms due to polling interval.
    pub fn stop(&mut self) {
        // Use Release ordering to ensure the server thread sees this write
        self.shutdown.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for PeerServer {
    fn drop(&mut self) {
        self.stop();
    }
}
