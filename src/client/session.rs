//! Request session.
//!
//! One session talks to one peer device and owns at most one in-flight
//! request at a time. Issuing a new request while another is pending aborts
//! the pending one first; the underlying transport does not reliably release
//! resources for a superseded request otherwise.

use std::fmt;
use std::net::SocketAddr;
use std::thread;
use std::time::Duration;

use log::{debug, info};

use super::encode::{encode_params, FORM_CONTENT_TYPE};
use super::transport::{
    CompletionFn, HttpTransport, Method, ReadyState, Response, TransportError, TransportHandle,
};
use crate::config::DeviceId;

/// Port peer servers listen on.
pub const PEER_HTTP_PORT: u16 = 80;

/// Sleep between readiness checks in blocking mode.
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// The one status code [`RequestSession::ping`] accepts as success.
pub const STATUS_OK: u16 = 200;

/// Request/response session against a single peer.
///
/// Reusable across requests. Blocking sends park the caller in a poll loop
/// until the exchange terminates; asynchronous sends return immediately and
/// deliver the outcome to a completion callback. Dropping the session, or
/// re-targeting it with [`Self::set_peer`], aborts any pending request.
pub struct RequestSession<T: HttpTransport> {
    transport: T,
    peer: Option<SocketAddr>,
    pending: Option<T::Handle>,
}

impl<T: HttpTransport> RequestSession<T> {
    /// Create a session with no peer configured yet.
    ///
    /// Sends fail with [`SessionError::NotConfigured`] until a peer is set.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            peer: None,
            pending: None,
        }
    }

    /// Create a session targeting an explicit peer address.
    pub fn with_peer(transport: T, peer: SocketAddr) -> Self {
        Self {
            transport,
            peer: Some(peer),
            pending: None,
        }
    }

    /// Create a session targeting a fleet device by identity.
    pub fn for_device(transport: T, id: DeviceId) -> Self {
        Self::with_peer(transport, id.peer_endpoint())
    }

    /// Currently configured peer, if any.
    pub fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }

    /// Re-target the session. Aborts any pending request.
    pub fn set_peer(&mut self, peer: SocketAddr) {
        self.abort_pending();
        self.peer = Some(peer);
    }

    /// Whether a request is currently in flight.
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|h| h.ready_state() != ReadyState::Done)
    }

    /// Ping the peer's root endpoint. Blocking.
    ///
    /// Useful for checking whether a server is up at all before deciding to
    /// host one. Success is exactly [`STATUS_OK`]; every other status is
    /// reported as [`SessionError::UnexpectedStatus`].
    pub fn ping(&mut self) -> Result<u16, SessionError> {
        let response = self.send_blocking("/", Method::Get, &[])?;
        info!("ping answered with status {}", response.status);
        if response.status == STATUS_OK {
            Ok(response.status)
        } else {
            Err(SessionError::UnexpectedStatus(response.status))
        }
    }

    /// Send a request and block until it terminates.
    ///
    /// Internally a poll loop over transport readiness, sleeping
    /// [`POLL_INTERVAL`] between checks; the calling thread does no other
    /// work for the duration, so keep this off time-sensitive paths. The
    /// returned response carries whatever status the peer produced, OK or
    /// not.
    pub fn send_blocking(
        &mut self,
        path: &str,
        method: Method,
        params: &[(&str, &str)],
    ) -> Result<Response, SessionError> {
        let mut handle = self.issue(path, method, params, None)?;

        let outcome = loop {
            if handle.ready_state() == ReadyState::Done {
                break handle.take_outcome();
            }
            thread::sleep(POLL_INTERVAL);
        };

        match outcome {
            Some(result) => Ok(result?),
            // Done without an outcome only happens after an abort, which
            // nothing else can trigger while we hold the handle.
            None => Err(SessionError::Transport(TransportError::Connection(
                "request aborted before completion".to_string(),
            ))),
        }
    }

    /// Send a request and return immediately.
    ///
    /// `on_complete` is invoked exactly once, from the transport's completion
    /// context, with the terminal outcome; it must not block. The session
    /// must outlive the exchange: dropping it aborts the request and the
    /// callback never fires. No timeout is enforced here; a request that
    /// never completes stays pending until superseded or the session goes
    /// away.
    pub fn send_async<F>(
        &mut self,
        path: &str,
        method: Method,
        params: &[(&str, &str)],
        on_complete: F,
    ) -> Result<(), SessionError>
    where
        F: FnOnce(Result<Response, TransportError>) + Send + 'static,
    {
        let handle = self.issue(path, method, params, Some(Box::new(on_complete)))?;
        self.pending = Some(handle);
        Ok(())
    }

    /// Open and send one request, aborting any prior pending one first.
    fn issue(
        &mut self,
        path: &str,
        method: Method,
        params: &[(&str, &str)],
        on_complete: Option<CompletionFn>,
    ) -> Result<T::Handle, SessionError> {
        let peer = self.peer.ok_or(SessionError::NotConfigured)?;
        if !matches!(method, Method::Get | Method::Post) {
            return Err(SessionError::UnsupportedMethod(method));
        }

        self.abort_pending();

        let encoded = encode_params(params);
        let separator = if path.starts_with('/') { "" } else { "/" };
        let url = match method {
            Method::Get if !encoded.is_empty() => {
                format!("http://{}{}{}?{}", peer, separator, path, encoded)
            }
            _ => format!("http://{}{}{}", peer, separator, path),
        };
        debug!("{} {}", method, url);

        let mut handle = self.transport.open(method, &url)?;
        if let Some(callback) = on_complete {
            handle.on_complete(callback);
        }

        match method {
            Method::Post => {
                let body = encoded.into_bytes();
                handle.set_header("Content-Type", FORM_CONTENT_TYPE);
                handle.set_header("Content-Length", &body.len().to_string());
                handle.send(Some(&body))?;
            }
            _ => handle.send(None)?,
        }

        Ok(handle)
    }

    fn abort_pending(&mut self) {
        if let Some(mut prior) = self.pending.take() {
            if prior.ready_state() != ReadyState::Done {
                debug!("aborting in-flight request before reuse");
                prior.abort();
            }
        }
    }
}

impl<T: HttpTransport> Drop for RequestSession<T> {
    fn drop(&mut self) {
        self.abort_pending();
    }
}

/// Errors surfaced by a request session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// No peer endpoint configured; rejected before any transport action.
    NotConfigured,
    /// The method is not supported by the session; rejected before any
    /// transport action.
    UnsupportedMethod(Method),
    /// The exchange completed with a status outside the expected set
    /// (`ping` only; `send` returns codes literally).
    UnexpectedStatus(u16),
    /// The transport failed to produce a usable status.
    Transport(TransportError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "peer endpoint is not configured"),
            Self::UnsupportedMethod(method) => write!(f, "unsupported method {}", method),
            Self::UnexpectedStatus(status) => write!(f, "unexpected status {}", status),
            Self::Transport(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TransportError> for SessionError {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}
