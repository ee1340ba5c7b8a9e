//! HTTP transport seam.
//!
//! The client only needs "send this request, give me status and body back".
//! [`UreqTransport`] does that with a blocking `ureq` agent; tests plug in an
//! in-memory fake.

use http::{Method, Request, Response};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError(pub String);

impl core::fmt::Display for TransportError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for TransportError {}

pub trait Transport {
    /// Perform one request. Any HTTP status is a successful exchange here;
    /// only connection and I/O failures are errors.
    fn send(&self, request: Request<Vec<u8>>) -> Result<Response<String>, TransportError>;
}

pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build();
        UreqTransport {
            agent: ureq::Agent::new_with_config(config),
        }
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: Request<Vec<u8>>) -> Result<Response<String>, TransportError> {
        let (parts, body) = request.into_parts();
        let uri = parts.uri.to_string();

        let result = match parts.method {
            Method::GET => {
                let mut req = self.agent.get(uri.as_str());
                for (name, value) in &parts.headers {
                    req = req.header(name.as_str(), value.as_bytes());
                }
                req.call()
            }
            Method::POST => {
                let mut req = self.agent.post(uri.as_str());
                for (name, value) in &parts.headers {
                    req = req.header(name.as_str(), value.as_bytes());
                }
                req.send(&body[..])
            }
            other => return Err(TransportError(format!("unsupported method {}", other))),
        };

        let mut res = result.map_err(|e| TransportError(e.to_string()))?;
        let status = res.status();
        let text = res
            .body_mut()
            .read_to_string()
            .map_err(|e| TransportError(format!("reading response body failed: {}", e)))?;

        Response::builder()
            .status(status)
            .body(text)
            .map_err(|e| TransportError(e.to_string()))
    }
}
