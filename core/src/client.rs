//! Client facade: one transport, one service per resource.
//!
//! # Design
//! `Client` holds only immutable configuration. Services are cheap clones
//! over a shared [`Transport`], so a client can be shared across threads
//! or cloned freely.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::error::ApiError;
use crate::http::{HttpExecutor, UreqExecutor};
use crate::policy_schedule::PolicyScheduleService;
use crate::transport::Transport;
use crate::user::UserService;

/// Environment variable holding the API base URL.
pub const ENV_API_URL: &str = "APL_API";
/// Environment variable holding an optional bearer token.
pub const ENV_API_TOKEN: &str = "APL_API_TOKEN";
/// Environment variable holding an optional request timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "APL_TIMEOUT_SECS";

#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub headers: Vec<(String, String)>,
    pub timeout: Option<Duration>,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.headers.iter().map(|(k, _)| k.as_str()).collect();
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("headers", &names)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            headers: vec![("accept".to_string(), "application/json".to_string())],
            timeout: None,
        }
    }

    /// Add a header sent with every request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn bearer_token(self, token: impl AsRef<str>) -> Self {
        let value = format!("Bearer {}", token.as_ref());
        self.header("authorization", value)
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Read `APL_API`, `APL_API_TOKEN` and `APL_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let base_url = lookup(ENV_API_URL)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ApiError::Config(format!("{ENV_API_URL} is not set")))?;
        let mut config = Self::new(base_url);
        if let Some(token) = lookup(ENV_API_TOKEN).filter(|v| !v.is_empty()) {
            config = config.bearer_token(token);
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|e| ApiError::Config(format!("{ENV_TIMEOUT_SECS}={secs}: {e}")))?;
            config = config.timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }
}

/// Entry point to the API. Each resource is a public field.
#[derive(Debug, Clone)]
pub struct Client {
    pub users: UserService,
    pub policy_schedules: PolicyScheduleService,
}

impl Client {
    /// Build a client that talks HTTP through `ureq`.
    ///
    /// Fails only when the base URL or a header is invalid.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let executor = Arc::new(UreqExecutor::new(config.timeout));
        Self::with_executor(config, executor)
    }

    /// Build a client from the environment, see [`ClientConfig::from_env`].
    pub fn from_env() -> Result<Self, ApiError> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn with_executor(config: ClientConfig, executor: Arc<dyn HttpExecutor>) -> Result<Self, ApiError> {
        let transport = Transport::new(&config.base_url, config.headers, executor)?;
        debug!(base_url = %transport.base_url(), "client configured");
        Ok(Self {
            users: UserService::new(transport.clone()),
            policy_schedules: PolicyScheduleService::new(transport),
        })
    }
}
