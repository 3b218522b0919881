//! Peer HTTP client.
//!
//! A [`RequestSession`] sends GET/POST requests to one peer device and
//! delivers the outcome either synchronously (the caller blocks in a poll
//! loop) or asynchronously (a completion callback fires from the transport).
//!
//! The actual wire work sits behind the [`HttpTransport`]/[`TransportHandle`]
//! traits; on the host, [`ThreadedTransport`] implements them over a worker
//! thread per request.

mod encode;
mod session;
#[cfg(not(target_os = "espidf"))]
mod threaded;
mod transport;

pub use encode::{decode_params, encode_params, FORM_CONTENT_TYPE};
pub use session::{RequestSession, SessionError, PEER_HTTP_PORT, POLL_INTERVAL, STATUS_OK};
#[cfg(not(target_os = "espidf"))]
pub use threaded::ThreadedTransport;
pub use transport::{
    CompletionFn, HttpTransport, Method, ReadyState, Response, TransportError, TransportHandle,
};
