//! Error types for the gateway client.
//!
//! # Design
//! Each dispatch stage has its own `DispatchError` variant so callers can
//! tell a malformed base URL from a network failure from a schema mismatch
//! without string matching. Every variant wraps the underlying cause. None of
//! them are retried inside the crate.

use thiserror::Error;

/// Errors returned by `GatewayClient::dispatch` and its building blocks.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The base URL was rejected or did not parse. No request was sent.
    #[error("url parse: {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: UrlError,
    },

    /// The request body could not be serialized to XML.
    ///
    /// `value` is the `Debug` rendering of the caller's body; credentials are
    /// never part of it.
    #[error("xml marshal: value={value}: {source}")]
    Marshal {
        value: String,
        #[source]
        source: quick_xml::SeError,
    },

    /// The method/URL combination cannot form an HTTP request.
    #[error("build request: {method} {url}: {reason}")]
    Request {
        method: &'static str,
        url: String,
        reason: String,
    },

    /// The round trip failed (DNS, connect, TLS, timeout).
    #[error("transport: {method} {url}: {source}")]
    Transport {
        method: &'static str,
        url: String,
        #[source]
        source: TransportError,
    },

    /// The response body stream failed while being read.
    #[error("read body (status {status}): {source}")]
    BodyRead {
        status: u16,
        #[source]
        source: std::io::Error,
    },

    /// The response body was not the XML document the caller expected.
    #[error("xml unmarshal (status {status}): data={body}: {source}")]
    Unmarshal {
        status: u16,
        body: String,
        #[source]
        source: DecodeError,
    },
}

impl DispatchError {
    /// Short name of the stage that failed.
    pub fn stage(&self) -> &'static str {
        match self {
            DispatchError::InvalidUrl { .. } => "url",
            DispatchError::Marshal { .. } => "marshal",
            DispatchError::Request { .. } => "request",
            DispatchError::Transport { .. } => "transport",
            DispatchError::BodyRead { .. } => "body",
            DispatchError::Unmarshal { .. } => "unmarshal",
        }
    }
}

/// Why a base URL was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlError {
    /// The `url` crate strips or escapes these; they are refused up front so
    /// a request never goes somewhere other than what the caller wrote.
    #[error("invalid control character in URL")]
    ControlCharacter,

    #[error(transparent)]
    Parse(#[from] url::ParseError),
}

/// Why a response body could not be decoded.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error(transparent)]
    Xml(#[from] quick_xml::DeError),
}

/// Failure reported by a `Transport` implementation.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransportError(Box<dyn std::error::Error + Send + Sync>);

impl TransportError {
    pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self(source.into())
    }
}

impl From<ureq::Error> for TransportError {
    fn from(err: ureq::Error) -> Self {
        Self::new(err)
    }
}

/// Errors raised while assembling a `ClientConfig` from the environment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("{name}: expected a boolean, got {value:?}")]
    InvalidFlag { name: &'static str, value: String },
}
