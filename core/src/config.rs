//! Client configuration: credentials plus the sandbox/production switch.

use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::types::Credentials;

/// Every request is abandoned after this long.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const SANDBOX_API_HOST: &str = "https://testshop.gmo-ab.com";
pub const PRODUCTION_API_HOST: &str = "https://shop.gmo-ab.com";

pub const ENV_AUTHENTICATION_ID: &str = "DEFERRED_AUTHENTICATION_ID";
pub const ENV_SHOP_CODE: &str = "DEFERRED_SHOP_CODE";
pub const ENV_CONNECT_PASSWORD: &str = "DEFERRED_CONNECT_PASSWORD";
pub const ENV_SANDBOX: &str = "DEFERRED_SANDBOX";

/// Which gateway host a client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Sandbox,
    #[default]
    Production,
}

impl Environment {
    pub fn from_sandbox_flag(sandbox: bool) -> Self {
        if sandbox {
            Environment::Sandbox
        } else {
            Environment::Production
        }
    }

    pub fn api_host(&self) -> &'static str {
        match self {
            Environment::Sandbox => SANDBOX_API_HOST,
            Environment::Production => PRODUCTION_API_HOST,
        }
    }
}

/// Everything needed to build a `GatewayClient`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    pub credentials: Credentials,
    #[serde(default)]
    pub environment: Environment,
}

impl ClientConfig {
    pub fn new(
        authentication_id: impl Into<String>,
        shop_code: impl Into<String>,
        connect_password: impl Into<String>,
        sandbox: bool,
    ) -> Self {
        Self {
            credentials: Credentials::new(authentication_id, shop_code, connect_password),
            environment: Environment::from_sandbox_flag(sandbox),
        }
    }

    /// Read the configuration from `DEFERRED_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same rules as [`ClientConfig::from_env`] against an arbitrary lookup.
    ///
    /// The three credentials are required and must be non-empty.
    /// `DEFERRED_SANDBOX` is optional and defaults to production.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        let authentication_id = required(ENV_AUTHENTICATION_ID)?;
        let shop_code = required(ENV_SHOP_CODE)?;
        let connect_password = required(ENV_CONNECT_PASSWORD)?;

        let sandbox = match lookup(ENV_SANDBOX) {
            Some(raw) => parse_flag(ENV_SANDBOX, &raw)?,
            None => false,
        };

        Ok(Self::new(authentication_id, shop_code, connect_password, sandbox))
    }

    pub fn api_host(&self) -> &'static str {
        self.environment.api_host()
    }
}

fn parse_flag(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            name,
            value: raw.to_string(),
        }),
    }
}
