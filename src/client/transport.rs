//! HTTP transport boundary.
//!
//! The session talks to the network through these traits. A transport opens
//! abortable request handles; a handle carries one exchange from `send` to a
//! terminal outcome, observable either by polling [`TransportHandle::ready_state`]
//! or through a completion callback.

use std::fmt;

/// HTTP method carried by a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    /// Wire name of the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Readiness of one request handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    /// Opened but not yet sent.
    Unsent,
    /// Sent; the exchange is in flight.
    Loading,
    /// Terminal: an outcome is available (unless the request was aborted).
    Done,
}

/// A completed exchange.
///
/// Carries whatever status the peer returned; the session does not collapse
/// non-OK codes into errors. Callers decide which codes are acceptable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP status code, always positive.
    pub status: u16,
    /// Response body, possibly empty.
    pub body: String,
}

/// Completion callback registered for asynchronous sends.
///
/// Invoked exactly once, from the transport's own completion context. Must
/// not block.
pub type CompletionFn = Box<dyn FnOnce(Result<Response, TransportError>) + Send + 'static>;

/// Factory for request handles.
pub trait HttpTransport {
    type Handle: TransportHandle;

    /// Open a request. No network traffic occurs until [`TransportHandle::send`].
    fn open(&mut self, method: Method, url: &str) -> Result<Self::Handle, TransportError>;
}

/// One in-flight, abortable request.
///
/// Implementations must uphold:
///
/// - `Done` implies an outcome is available via [`Self::take_outcome`] until
///   taken or delivered to a callback, except after an abort.
/// - A callback registered with [`Self::on_complete`] fires exactly once, and
///   never after [`Self::abort`].
/// - Aborting an unsent or completed request is a no-op beyond suppressing
///   the callback.
pub trait TransportHandle {
    /// Attach a request header. Only meaningful before `send`.
    fn set_header(&mut self, name: &str, value: &str);

    /// Register a completion callback. If the exchange already finished, the
    /// outcome is delivered immediately.
    fn on_complete(&mut self, callback: CompletionFn);

    /// Begin the exchange, with an optional body.
    fn send(&mut self, body: Option<&[u8]>) -> Result<(), TransportError>;

    /// Cancel the exchange. Any registered callback will never fire.
    fn abort(&mut self);

    /// Current readiness.
    fn ready_state(&self) -> ReadyState;

    /// Take the terminal outcome. `None` until `Done`, and `None` again once
    /// taken, delivered to a callback, or aborted.
    fn take_outcome(&mut self) -> Option<Result<Response, TransportError>>;
}

/// Errors reported by a transport.
///
/// Positive status codes are not errors; they come back in [`Response`]. A
/// transport error means the exchange produced no usable status at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Connection-level failure, carrying the transport's own error text.
    Connection(String),
    /// The transport reported a non-positive status code.
    Status { code: i32, message: String },
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection(msg) => write!(f, "connection failed: {}", msg),
            Self::Status { code, message } => {
                write!(f, "transport status {}: {}", code, message)
            }
        }
    }
}

impl std::error::Error for TransportError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_wire_names() {
        assert_eq!(Method::Get.as_str(), "GET");
        assert_eq!(Method::Post.as_str(), "POST");
        assert_eq!(Method::Put.as_str(), "PUT");
        assert_eq!(Method::Delete.as_str(), "DELETE");
    }

    #[test]
    fn test_transport_error_display() {
        let err = TransportError::Status {
            code: -1,
            message: "connection refused".to_string(),
        };
        let text = format!("{}", err);
        assert!(text.contains("-1"));
        assert!(text.contains("connection refused"));
    }
}
