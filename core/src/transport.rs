//! The network seam between `GatewayClient` and the HTTP stack.
//!
//! # Design
//! `GatewayClient` never talks to a socket directly. It hands an
//! `HttpRequest` to a `Transport` and gets back a status code plus a lazy
//! body stream. The dispatcher decides whether to read that stream; dropping
//! it releases the connection. Tests swap in an in-memory transport.

use std::fmt;
use std::io::Read;
use std::time::Duration;

use crate::config::REQUEST_TIMEOUT;
use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest};

/// Status code and unread body of a completed round trip.
pub struct TransportResponse {
    pub status: u16,
    pub body: Box<dyn Read>,
}

impl fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Executes one HTTP round trip. Implementations must not retry.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<TransportResponse, TransportError>;
}

/// Blocking transport backed by a `ureq` agent.
///
/// 4xx/5xx responses are returned as data rather than `Err`, leaving status
/// interpretation to the dispatcher.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl UreqTransport {
    pub fn new() -> Self {
        Self::with_timeout(REQUEST_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<TransportResponse, TransportError> {
        let url = request.url.as_str();
        let body = request.body.as_slice();

        // GET and DELETE still carry the credential envelope.
        let response = match request.method {
            HttpMethod::Get => {
                with_headers(self.agent.get(url), &request.headers).force_send_body().send(body)
            }
            HttpMethod::Delete => {
                with_headers(self.agent.delete(url), &request.headers).force_send_body().send(body)
            }
            HttpMethod::Post => with_headers(self.agent.post(url), &request.headers).send(body),
            HttpMethod::Put => with_headers(self.agent.put(url), &request.headers).send(body),
            HttpMethod::Patch => with_headers(self.agent.patch(url), &request.headers).send(body),
        }?;

        let status = response.status().as_u16();
        let body = response.into_body().into_reader();
        Ok(TransportResponse {
            status,
            body: Box::new(body),
        })
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}
