//! Credentials, the outbound XML envelope, and the dispatch reply.
//!
//! # Design
//! Every request document carries the merchant credentials at its root next
//! to the operation fields. `Envelope` flattens both into one element so the
//! per-operation types never have to repeat the credential fields.
//!
//! A dispatch yields exactly one of two shapes. `Reply` makes that a sum type
//! instead of two optional output slots.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Merchant credentials sent in the body of every request.
///
/// Fields are private and there are no setters; a value is fixed once built.
/// `Debug` only shows the shop code.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    authentication_id: String,
    shop_code: String,
    connect_password: String,
}

impl Credentials {
    pub fn new(
        authentication_id: impl Into<String>,
        shop_code: impl Into<String>,
        connect_password: impl Into<String>,
    ) -> Self {
        Self {
            authentication_id: authentication_id.into(),
            shop_code: shop_code.into(),
            connect_password: connect_password.into(),
        }
    }

    pub fn authentication_id(&self) -> &str {
        &self.authentication_id
    }

    pub fn shop_code(&self) -> &str {
        &self.shop_code
    }

    pub fn connect_password(&self) -> &str {
        &self.connect_password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("authentication_id", &"<redacted>")
            .field("shop_code", &self.shop_code)
            .field("connect_password", &"<redacted>")
            .finish()
    }
}

/// Root element used when a call does not name one.
pub const DEFAULT_ROOT: &str = "request";

/// The XML document sent to the gateway: credentials first, then the
/// operation's own fields, all as direct children of the root element.
#[derive(Serialize)]
pub struct Envelope<'a, B: ?Sized> {
    #[serde(flatten)]
    pub credentials: &'a Credentials,
    #[serde(flatten)]
    pub body: &'a B,
}

impl<B: Serialize + ?Sized> Envelope<'_, B> {
    /// Serialize the envelope as `<root>...</root>`.
    pub fn to_xml(&self, root: &str) -> Result<String, quick_xml::SeError> {
        quick_xml::se::to_string_with_root(root, self)
    }
}

/// Which reply branches should be decoded from the response body.
///
/// A skipped branch returns only its status code and leaves the body unread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decode {
    pub success: bool,
    pub failure: bool,
}

impl Default for Decode {
    fn default() -> Self {
        Self {
            success: true,
            failure: true,
        }
    }
}

/// Outcome of a single dispatch, selected by status code.
///
/// `Success` covers statuses below 400 and `Failure` everything from 400 up.
/// `body` is `None` only when decoding of that branch was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply<T, E> {
    Success { status: u16, body: Option<T> },
    Failure { status: u16, body: Option<E> },
}

impl<T, E> Reply<T, E> {
    pub fn status(&self) -> u16 {
        match self {
            Reply::Success { status, .. } | Reply::Failure { status, .. } => *status,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Reply::Success { .. })
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            Reply::Success { body, .. } => body.as_ref(),
            Reply::Failure { .. } => None,
        }
    }

    pub fn failure(&self) -> Option<&E> {
        match self {
            Reply::Failure { body, .. } => body.as_ref(),
            Reply::Success { .. } => None,
        }
    }

    /// Collapse into a `Result`, dropping the status code.
    pub fn into_result(self) -> Result<Option<T>, Option<E>> {
        match self {
            Reply::Success { body, .. } => Ok(body),
            Reply::Failure { body, .. } => Err(body),
        }
    }
}
