//! HTTP request types for the deferred-payment gateway.
//!
//! # Design
//! Requests are described as plain data. `GatewayClient::build_request`
//! produces an `HttpRequest` without touching the network; a `Transport`
//! executes it. Keeping construction separate from I/O lets every stage
//! before the round trip be tested without a server.

use std::fmt;

use url::Url;

/// Content type sent with every gateway request.
pub const CONTENT_TYPE_XML: &str = "application/xml; charset=utf-8";

/// HTTP method for a gateway request. No other verbs are supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    /// Returns the method as an uppercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// The body is always present: even an operation without parameters sends
/// the credential envelope.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// Returns the first header value matching `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}
