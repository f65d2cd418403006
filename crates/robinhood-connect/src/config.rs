//! Client configuration.
//!
//! Defaults target the production API. [`ClientConfig::from_env`] layers
//! `ROBINHOOD_*` environment variables on top of the defaults; unset or
//! unparsable values keep the default.

use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.robinhood.com";

/// Public OAuth client id used by the Robinhood web app.
pub const DEFAULT_CLIENT_ID: &str = "c82SH0WZOsabOXGP2sxqcj34FxkvfnWRZBKlBjFS";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

pub const ENV_BASE_URL: &str = "ROBINHOOD_BASE_URL";
pub const ENV_TIMEOUT_MS: &str = "ROBINHOOD_TIMEOUT_MS";
pub const ENV_RETRY_ATTEMPTS: &str = "ROBINHOOD_RETRY_ATTEMPTS";
pub const ENV_RETRY_DELAY_MS: &str = "ROBINHOOD_RETRY_DELAY_MS";
pub const ENV_ACCESS_TOKEN: &str = "ROBINHOOD_ACCESS_TOKEN";
pub const ENV_CLIENT_ID: &str = "ROBINHOOD_CLIENT_ID";

/// Settings accepted by [`crate::RobinhoodClient`] and [`crate::RobinhoodService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    /// Accepted for forward compatibility. The client only ever replays a
    /// request once, after a token refresh.
    pub retry_attempts: u32,
    /// Accepted for forward compatibility, see `retry_attempts`.
    pub retry_delay: Duration,
    pub access_token: Option<String>,
    pub client_id: String,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::from(DEFAULT_BASE_URL),
            timeout: DEFAULT_TIMEOUT,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
            access_token: None,
            client_id: String::from(DEFAULT_CLIENT_ID),
            user_agent: String::from(DEFAULT_USER_AGENT),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (environment, file, test map).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let millis = |key: &str| {
            non_empty(key)
                .and_then(|value| value.trim().parse::<u64>().ok())
                .map(Duration::from_millis)
        };

        Self {
            base_url: non_empty(ENV_BASE_URL)
                .map(|value| normalize_base_url(&value))
                .unwrap_or(defaults.base_url),
            timeout: millis(ENV_TIMEOUT_MS).unwrap_or(defaults.timeout),
            retry_attempts: non_empty(ENV_RETRY_ATTEMPTS)
                .and_then(|value| value.trim().parse().ok())
                .unwrap_or(defaults.retry_attempts),
            retry_delay: millis(ENV_RETRY_DELAY_MS).unwrap_or(defaults.retry_delay),
            access_token: non_empty(ENV_ACCESS_TOKEN),
            client_id: non_empty(ENV_CLIENT_ID).unwrap_or(defaults.client_id),
            user_agent: defaults.user_agent,
        }
    }

    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Self {
        self.base_url = normalize_base_url(base_url.as_ref());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, attempts: u32, delay: Duration) -> Self {
        self.retry_attempts = attempts;
        self.retry_delay = delay;
        self
    }

    pub fn with_access_token(mut self, access_token: impl Into<String>) -> Self {
        self.access_token = Some(access_token.into());
        self
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

fn normalize_base_url(value: &str) -> String {
    value.trim().trim_end_matches('/').to_owned()
}
