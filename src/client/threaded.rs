//! Host-side HTTP transport.
//!
//! Each request runs on its own worker thread through a blocking `reqwest`
//! client; the handle observes it through shared state. Completion callbacks
//! fire from the worker thread. Aborting flags the shared state so a
//! superseded worker discards its result and never invokes the callback.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use log::warn;

use super::transport::{
    CompletionFn, HttpTransport, Method, ReadyState, Response, TransportError, TransportHandle,
};

/// Time allowed for the TCP connect.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Time allowed for the whole exchange.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// `HttpTransport` over `reqwest::blocking`, one worker thread per request.
pub struct ThreadedTransport {
    client: reqwest::blocking::Client,
}

impl ThreadedTransport {
    /// Create a transport with the default timeouts.
    pub fn new() -> Self {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|e| {
                warn!("client builder failed ({}), using defaults", e);
                reqwest::blocking::Client::new()
            });
        Self { client }
    }
}

impl Default for ThreadedTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport for ThreadedTransport {
    type Handle = ThreadedHandle;

    fn open(&mut self, method: Method, url: &str) -> Result<Self::Handle, TransportError> {
        let url = reqwest::Url::parse(url)
            .map_err(|e| TransportError::Connection(format!("invalid url {}: {}", url, e)))?;
        Ok(ThreadedHandle {
            client: self.client.clone(),
            method,
            url,
            headers: Vec::new(),
            shared: Arc::new(Mutex::new(Shared {
                state: ReadyState::Unsent,
                outcome: None,
                callback: None,
                aborted: false,
            })),
        })
    }
}

struct Shared {
    state: ReadyState,
    outcome: Option<Result<Response, TransportError>>,
    callback: Option<CompletionFn>,
    aborted: bool,
}

/// One in-flight request backed by a worker thread.
pub struct ThreadedHandle {
    client: reqwest::blocking::Client,
    method: Method,
    url: reqwest::Url,
    headers: Vec<(String, String)>,
    shared: Arc<Mutex<Shared>>,
}

impl ThreadedHandle {
    fn reqwest_method(method: Method) -> reqwest::Method {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

impl TransportHandle for ThreadedHandle {
    fn set_header(&mut self, name: &str, value: &str) {
        self.headers.push((name.to_string(), value.to_string()));
    }

    fn on_complete(&mut self, callback: CompletionFn) {
        let delivery = {
            let mut shared = self.shared.lock().expect("transport state poisoned");
            if shared.state == ReadyState::Done {
                // Exchange finished before the callback was registered;
                // deliver the outcome now, outside the lock.
                shared.outcome.take()
            } else {
                shared.callback = Some(callback);
                return;
            }
        };
        if let Some(outcome) = delivery {
            callback(outcome);
        }
    }

    fn send(&mut self, body: Option<&[u8]>) -> Result<(), TransportError> {
        {
            let mut shared = self.shared.lock().expect("transport state poisoned");
            if shared.state != ReadyState::Unsent {
                return Err(TransportError::Connection(
                    "request already sent".to_string(),
                ));
            }
            shared.state = ReadyState::Loading;
        }

        let client = self.client.clone();
        let method = Self::reqwest_method(self.method);
        let url = self.url.clone();
        let headers = self.headers.clone();
        let body = body.map(|b| b.to_vec());
        let shared = self.shared.clone();

        thread::spawn(move || {
            let mut request = client.request(method, url);
            for (name, value) in &headers {
                request = request.header(name.as_str(), value.as_str());
            }
            if let Some(bytes) = body {
                request = request.body(bytes);
            }

            let outcome = match request.send() {
                Ok(response) => {
                    let status = response.status().as_u16();
                    match response.text() {
                        Ok(body) => Ok(Response { status, body }),
                        Err(e) => Err(TransportError::Connection(e.to_string())),
                    }
                }
                Err(e) => Err(TransportError::Connection(e.to_string())),
            };

            let mut shared = shared.lock().expect("transport state poisoned");
            if shared.aborted {
                // Superseded; the result belongs to no one.
                return;
            }
            shared.state = ReadyState::Done;
            match shared.callback.take() {
                Some(callback) => {
                    drop(shared);
                    callback(outcome);
                }
                None => shared.outcome = Some(outcome),
            }
        });

        Ok(())
    }

    fn abort(&mut self) {
        let mut shared = self.shared.lock().expect("transport state poisoned");
        shared.aborted = true;
        shared.callback = None;
        shared.outcome = None;
        shared.state = ReadyState::Done;
    }

    fn ready_state(&self) -> ReadyState {
        self.shared.lock().expect("transport state poisoned").state
    }

    fn take_outcome(&mut self) -> Option<Result<Response, TransportError>> {
        self.shared
            .lock()
            .expect("transport state poisoned")
            .outcome
            .take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn test_open_rejects_invalid_url() {
        let mut transport = ThreadedTransport::new();
        let result = transport.open(Method::Get, "not a url");
        assert!(matches!(result, Err(TransportError::Connection(_))));
    }

    #[test]
    fn test_refused_connection_reports_error() {
        // Grab a free port, then close it again so nothing is listening.
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let mut transport = ThreadedTransport::new();
        let mut handle = transport
            .open(Method::Get, &format!("http://127.0.0.1:{}/", port))
            .unwrap();
        handle.send(None).unwrap();

        while handle.ready_state() != ReadyState::Done {
            thread::sleep(Duration::from_millis(10));
        }
        let outcome = handle.take_outcome().unwrap();
        assert!(matches!(outcome, Err(TransportError::Connection(_))));
    }

    #[test]
    fn test_double_send_is_rejected() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let mut transport = ThreadedTransport::new();
        let mut handle = transport
            .open(Method::Get, &format!("http://127.0.0.1:{}/", port))
            .unwrap();
        handle.send(None).unwrap();
        assert!(handle.send(None).is_err());
    }
}
