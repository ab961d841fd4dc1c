//! Client for a payment gateway's deferred-payment XML API.
//!
//! # Overview
//! Every operation is one HTTPS round trip: the client wraps the caller's
//! parameters in an XML envelope carrying the merchant credentials, sends it,
//! and decodes the response into the caller's success type (status < 400) or
//! error type (status >= 400).
//!
//! # Design
//! - `GatewayClient` is immutable after construction and safe to share
//!   across threads. It holds credentials, the API host, and a `Transport`.
//! - A dispatch splits into `build_request` (no I/O), one `Transport`
//!   round trip, and `parse_reply`, so each stage is testable alone.
//! - `Reply<T, E>` is a sum type; a call never populates both shapes.
//! - Every failure comes back as a `DispatchError` naming its stage. Nothing
//!   is retried; resilience belongs to the caller.
//!
//! ```no_run
//! use deferred_core::{GatewayClient, HttpMethod, Reply};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Serialize)]
//! #[serde(rename_all = "camelCase")]
//! struct Cancel {
//!     gmo_transaction_id: String,
//! }
//!
//! #[derive(Debug, Deserialize)]
//! struct Accepted {
//!     result: String,
//! }
//!
//! #[derive(Debug, Deserialize)]
//! struct Rejected {
//!     code: String,
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GatewayClient::new("auth-id", "shop-code", "password", true);
//! let cancel = Cancel { gmo_transaction_id: "12345".into() };
//! let reply: Reply<Accepted, Rejected> =
//!     client.dispatch(client.request(HttpMethod::Post).path(["auto", "cancel.do"]).body(&cancel))?;
//! match reply {
//!     Reply::Success { body, .. } => println!("accepted: {body:?}"),
//!     Reply::Failure { status, body } => println!("rejected ({status}): {body:?}"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use client::{Call, GatewayClient};
pub use config::{ClientConfig, Environment, REQUEST_TIMEOUT};
pub use error::{ConfigError, DecodeError, DispatchError, TransportError, UrlError};
pub use http::{HttpMethod, HttpRequest, CONTENT_TYPE_XML};
pub use transport::{Transport, TransportResponse, UreqTransport};
pub use types::{Credentials, Decode, Envelope, Reply};
