//! Gateway client and the generic XML dispatcher.
//!
//! # Design
//! `GatewayClient` holds the merchant credentials, the API host, and a
//! transport, none of which change after construction. A dispatch is split
//! into `build_request` (URL, envelope, headers; no I/O) and `parse_reply`
//! (status routing and XML decoding), with `dispatch` running the single
//! round trip between them. Per-operation wrappers describe themselves with
//! a `Call` and pick their own success and error types.
//!
//! Failures are returned, never retried.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::endpoint;
use crate::error::{DecodeError, DispatchError};
use crate::http::{HttpMethod, HttpRequest, CONTENT_TYPE_XML};
use crate::transport::{Transport, TransportResponse, UreqTransport};
use crate::types::{Credentials, Decode, Envelope, Reply, DEFAULT_ROOT};

/// Statuses from here up are decoded as the error shape.
const FIRST_ERROR_STATUS: u16 = 400;

/// One request against the gateway: where it goes, what it carries, and
/// which reply branches to decode.
#[derive(Debug, Clone)]
pub struct Call<'a, B: ?Sized = ()> {
    method: HttpMethod,
    base_url: Cow<'a, str>,
    path: Vec<String>,
    query: BTreeMap<String, String>,
    body: &'a B,
    root: &'a str,
    decode: Decode,
}

impl<'a> Call<'a, ()> {
    /// Start a call against an arbitrary base URL with an empty body.
    pub fn new(method: HttpMethod, base_url: impl Into<Cow<'a, str>>) -> Self {
        Self {
            method,
            base_url: base_url.into(),
            path: Vec::new(),
            query: BTreeMap::new(),
            body: &(),
            root: DEFAULT_ROOT,
            decode: Decode::default(),
        }
    }
}

impl<'a, B: ?Sized> Call<'a, B> {
    /// Append path segments, in order, after any already given.
    pub fn path<I, S>(mut self, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.path.extend(segments.into_iter().map(Into::into));
        self
    }

    /// Set a query parameter, replacing any same-named key in the base URL.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Operation fields placed next to the credentials.
    pub fn body<C: ?Sized>(self, body: &'a C) -> Call<'a, C> {
        Call {
            method: self.method,
            base_url: self.base_url,
            path: self.path,
            query: self.query,
            body,
            root: self.root,
            decode: self.decode,
        }
    }

    /// Name of the request document's root element.
    pub fn root(mut self, root: &'a str) -> Self {
        self.root = root;
        self
    }

    /// Return only the status for responses below 400.
    pub fn skip_success(mut self) -> Self {
        self.decode.success = false;
        self
    }

    /// Return only the status for responses of 400 and above.
    pub fn skip_failure(mut self) -> Self {
        self.decode.failure = false;
        self
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn decode(&self) -> Decode {
        self.decode
    }
}

/// Client for the deferred-payment gateway.
///
/// Immutable after construction and `Send + Sync`; share one instance
/// across threads instead of building one per call.
pub struct GatewayClient {
    credentials: Credentials,
    api_host: String,
    transport: Box<dyn Transport>,
}

impl fmt::Debug for GatewayClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayClient")
            .field("credentials", &self.credentials)
            .field("api_host", &self.api_host)
            .finish_non_exhaustive()
    }
}

impl GatewayClient {
    /// Build a client over HTTPS with the fixed 30 second timeout.
    pub fn new(
        authentication_id: impl Into<String>,
        shop_code: impl Into<String>,
        connect_password: impl Into<String>,
        sandbox: bool,
    ) -> Self {
        Self::from_config(ClientConfig::new(
            authentication_id,
            shop_code,
            connect_password,
            sandbox,
        ))
    }

    pub fn from_config(config: ClientConfig) -> Self {
        Self::with_transport(config, UreqTransport::new())
    }

    pub fn with_transport(config: ClientConfig, transport: impl Transport + 'static) -> Self {
        Self {
            api_host: config.api_host().to_string(),
            credentials: config.credentials,
            transport: Box::new(transport),
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn api_host(&self) -> &str {
        &self.api_host
    }

    /// Start a call against this client's API host.
    pub fn request(&self, method: HttpMethod) -> Call<'_, ()> {
        Call::new(method, self.api_host.as_str())
    }

    /// Resolve the URL, serialize the envelope, and assemble the request.
    pub fn build_request<B>(&self, call: &Call<'_, B>) -> Result<HttpRequest, DispatchError>
    where
        B: Serialize + fmt::Debug + ?Sized,
    {
        let url = endpoint::build_url(&call.base_url, call.path.as_slice(), &call.query)?;

        let envelope = Envelope {
            credentials: &self.credentials,
            body: call.body,
        };
        let body = envelope
            .to_xml(call.root)
            .map_err(|source| DispatchError::Marshal {
                value: format!("{:?}", call.body),
                source,
            })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(DispatchError::Request {
                method: call.method.as_str(),
                url: url.to_string(),
                reason: format!("unsupported scheme {:?}", url.scheme()),
            });
        }

        Ok(HttpRequest {
            method: call.method,
            url,
            headers: vec![("Content-Type".to_string(), CONTENT_TYPE_XML.to_string())],
            body: body.into_bytes(),
        })
    }

    /// Route a response to the success or error shape by status code.
    ///
    /// When the selected branch is skipped the body is dropped unread.
    pub fn parse_reply<T, E>(
        &self,
        response: TransportResponse,
        decode: Decode,
    ) -> Result<Reply<T, E>, DispatchError>
    where
        T: DeserializeOwned,
        E: DeserializeOwned,
    {
        let TransportResponse { status, body: mut stream } = response;

        if status < FIRST_ERROR_STATUS {
            let body = if decode.success {
                Some(read_xml(status, stream.as_mut())?)
            } else {
                None
            };
            Ok(Reply::Success { status, body })
        } else {
            let body = if decode.failure {
                Some(read_xml(status, stream.as_mut())?)
            } else {
                None
            };
            Ok(Reply::Failure { status, body })
        }
    }

    /// Run one request/response cycle.
    pub fn dispatch<B, T, E>(&self, call: Call<'_, B>) -> Result<Reply<T, E>, DispatchError>
    where
        B: Serialize + fmt::Debug + ?Sized,
        T: DeserializeOwned,
        E: DeserializeOwned,
    {
        let request = self.build_request(&call)?;
        debug!(method = %request.method, url = %request.url, "sending gateway request");

        let response = self.transport.execute(&request).map_err(|source| {
            warn!(method = %request.method, url = %request.url, error = %source, "gateway request failed");
            DispatchError::Transport {
                method: request.method.as_str(),
                url: request.url.to_string(),
                source,
            }
        })?;
        debug!(method = %request.method, url = %request.url, status = response.status, "gateway responded");

        self.parse_reply(response, call.decode)
    }
}

fn read_xml<X: DeserializeOwned>(status: u16, body: &mut dyn Read) -> Result<X, DispatchError> {
    let mut bytes = Vec::new();
    body.read_to_end(&mut bytes)
        .map_err(|source| DispatchError::BodyRead { status, source })?;
    let unmarshal = |source: DecodeError| DispatchError::Unmarshal {
        status,
        body: String::from_utf8_lossy(&bytes).into_owned(),
        source,
    };
    let text = std::str::from_utf8(&bytes).map_err(|e| unmarshal(e.into()))?;
    quick_xml::de::from_str(text).map_err(|e| unmarshal(e.into()))
}
