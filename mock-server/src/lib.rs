//! Scriptable stand-in for the deferred-payment gateway.
//!
//! Every path and method reaches one handler that records the request and
//! answers according to the current `Script`. Tests hold a `MockGateway`
//! handle to change the script and inspect what arrived.

use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tracing::info;

pub const CONTENT_TYPE_XML: &str = "application/xml; charset=utf-8";

/// How the mock answers the next requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Script {
    /// Fixed status and XML body.
    Reply { status: u16, body: String },
    /// The request body sent straight back.
    Echo { status: u16 },
}

/// One request as the mock received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

#[derive(Debug)]
struct Inner {
    script: Script,
    requests: Vec<Recorded>,
}

/// Shared handle to the mock's script and request log.
#[derive(Debug, Clone)]
pub struct MockGateway {
    inner: Arc<Mutex<Inner>>,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new(Script::Echo { status: 200 })
    }
}

impl MockGateway {
    pub fn new(script: Script) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                script,
                requests: Vec::new(),
            })),
        }
    }

    pub fn respond_with(&self, status: u16, body: impl Into<String>) {
        self.lock().script = Script::Reply {
            status,
            body: body.into(),
        };
    }

    pub fn echo(&self, status: u16) {
        self.lock().script = Script::Echo { status };
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.lock().requests.clone()
    }

    pub fn last_request(&self) -> Option<Recorded> {
        self.lock().requests.last().cloned()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panicking test thread must not take the server down with it.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

pub fn app(gateway: MockGateway) -> Router {
    Router::new().fallback(handle).with_state(gateway)
}

pub async fn run(listener: TcpListener, gateway: MockGateway) -> Result<(), std::io::Error> {
    axum::serve(listener, app(gateway)).await
}

async fn handle(
    State(gateway): State<MockGateway>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let recorded = Recorded {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        content_type: headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
        body: String::from_utf8_lossy(&body).into_owned(),
    };
    info!(method = %recorded.method, path = %recorded.path, "mock gateway request");

    let (status, reply) = {
        let mut inner = gateway.lock();
        let answer = match &inner.script {
            Script::Reply { status, body } => (*status, body.clone()),
            Script::Echo { status } => (*status, recorded.body.clone()),
        };
        inner.requests.push(recorded);
        answer
    };

    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(header::CONTENT_TYPE, CONTENT_TYPE_XML)], reply).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_script_echoes_with_200() {
        let gateway = MockGateway::default();
        assert_eq!(gateway.lock().script, Script::Echo { status: 200 });
        assert!(gateway.requests().is_empty());
        assert!(gateway.last_request().is_none());
    }

    #[test]
    fn respond_with_replaces_script() {
        let gateway = MockGateway::default();
        gateway.respond_with(400, "<error><code>E1</code></error>");
        assert_eq!(
            gateway.lock().script,
            Script::Reply {
                status: 400,
                body: "<error><code>E1</code></error>".to_string()
            }
        );
        gateway.echo(201);
        assert_eq!(gateway.lock().script, Script::Echo { status: 201 });
    }

    #[test]
    fn clones_share_state() {
        let gateway = MockGateway::default();
        let other = gateway.clone();
        other.respond_with(503, "");
        assert_eq!(
            gateway.lock().script,
            Script::Reply {
                status: 503,
                body: String::new()
            }
        );
    }
}
