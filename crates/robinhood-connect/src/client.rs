//! Authenticated transport.
//!
//! [`RobinhoodClient`] decorates every request with the standard JSON headers
//! and the current bearer token, replays a request exactly once after a
//! successful token refresh when the upstream answers 401, and flattens
//! paginated responses.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::auth::{AuthOutcome, AuthState, Credentials, TokenManager, TokenSet};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http_client::{HttpClient, HttpMethod, HttpRequest, HttpResponse, ReqwestHttpClient};

/// A decoded response body, classified once at the transport boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseShape {
    /// `{ "results": [...], "next": <url|null> }`
    Envelope {
        results: Vec<Value>,
        next: Option<String>,
    },
    Sequence(Vec<Value>),
    Single(Value),
}

impl ResponseShape {
    pub fn classify(value: Value) -> Self {
        match value {
            Value::Array(items) => Self::Sequence(items),
            Value::Object(mut map) if map.get("results").is_some_and(Value::is_array) => {
                let results = match map.remove("results") {
                    Some(Value::Array(items)) => items,
                    _ => Vec::new(),
                };
                let next = match map.remove("next") {
                    Some(Value::String(link)) if !link.trim().is_empty() => Some(link),
                    _ => None,
                };
                Self::Envelope { results, next }
            }
            other => Self::Single(other),
        }
    }
}

/// Low-level client owning one token lifecycle.
pub struct RobinhoodClient {
    http_client: Arc<dyn HttpClient>,
    config: Arc<ClientConfig>,
    tokens: TokenManager,
}

impl RobinhoodClient {
    /// Client backed by the production reqwest transport.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::new()), config)
    }

    pub fn with_http_client(http_client: Arc<dyn HttpClient>, config: ClientConfig) -> Self {
        let config = Arc::new(config);
        Self {
            tokens: TokenManager::new(http_client.clone(), config.clone()),
            http_client,
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    pub fn auth_state(&self) -> AuthState {
        self.tokens.state()
    }

    pub fn is_authenticated(&self) -> bool {
        self.tokens.is_authenticated()
    }

    pub async fn authenticate(&self, credentials: &Credentials) -> AuthOutcome {
        self.tokens.authenticate(credentials).await
    }

    pub async fn refresh_access_token(&self) -> Result<TokenSet, ApiError> {
        self.tokens.refresh_access_token().await
    }

    /// Absolute URL for an API path; absolute inputs pass through untouched.
    pub fn url(&self, path: &str) -> String {
        resolve_url(&self.config.base_url, path)
    }

    /// Authenticated GET that fails on any non-2xx status.
    ///
    /// A 401 triggers one token refresh and one replay. A 401 on the replay,
    /// or any other status, is returned as [`ApiError::Status`].
    pub async fn get(&self, path: &str) -> Result<HttpResponse, ApiError> {
        let url = self.url(path);
        let response = self.dispatch(&url, false).await?;
        if !response.is_unauthorized() {
            return ensure_success(response);
        }

        debug!(url = %url, "received 401; refreshing access token");
        if let Err(error) = self.tokens.refresh_access_token().await {
            self.tokens.clear();
            return Err(error);
        }

        let replayed = self.dispatch(&url, true).await?;
        ensure_success(replayed)
    }

    pub async fn get_json<T>(&self, path: &str) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let response = self.get(path).await?;
        serde_json::from_str(&response.body).map_err(|error| ApiError::decode(path, &error))
    }

    pub async fn get_shape(&self, path: &str) -> Result<ResponseShape, ApiError> {
        self.get_json::<Value>(path).await.map(ResponseShape::classify)
    }

    /// Follow `next` links until exhausted and return every element in
    /// upstream order. Bare sequences are returned as-is and single objects as
    /// a one-element vector.
    pub async fn paginate_values(&self, path: &str) -> Result<Vec<Value>, ApiError> {
        let mut items = Vec::new();
        let mut next = Some(path.to_owned());
        let mut pages = 0_usize;

        while let Some(page) = next.take() {
            pages += 1;
            match self.get_shape(&page).await? {
                ResponseShape::Envelope { results, next: link } => {
                    items.extend(results);
                    next = link;
                }
                ResponseShape::Sequence(values) => items.extend(values),
                ResponseShape::Single(value) => items.push(value),
            }
        }

        debug!(path, pages, items = items.len(), "pagination complete");
        Ok(items)
    }

    pub async fn paginate<T>(&self, path: &str) -> Result<Vec<T>, ApiError>
    where
        T: DeserializeOwned,
    {
        self.paginate_values(path)
            .await?
            .into_iter()
            .map(|value| serde_json::from_value(value).map_err(|error| ApiError::decode(path, &error)))
            .collect()
    }

    async fn dispatch(&self, url: &str, retry: bool) -> Result<HttpResponse, ApiError> {
        let request =
            json_request(HttpMethod::Get, url, &self.config).with_auth(&self.tokens.bearer());
        debug!(url, retry, "dispatching request");
        Ok(self.http_client.execute(request).await?)
    }
}

impl std::fmt::Debug for RobinhoodClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RobinhoodClient")
            .field("base_url", &self.config.base_url)
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

/// Request carrying the JSON accept/content-type headers, the configured
/// user agent and timeout.
pub(crate) fn json_request(method: HttpMethod, url: impl Into<String>, config: &ClientConfig) -> HttpRequest {
    HttpRequest::new(method, url)
        .with_header("accept", "application/json")
        .with_header("content-type", "application/json")
        .with_header("user-agent", config.user_agent.as_str())
        .with_timeout(config.timeout)
}

pub(crate) fn resolve_url(base_url: &str, path: &str) -> String {
    if path.starts_with("https://") || path.starts_with("http://") {
        return path.to_owned();
    }

    let base = base_url.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

fn ensure_success(response: HttpResponse) -> Result<HttpResponse, ApiError> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(ApiError::Status {
            status: response.status,
            body: response.body,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const BASE: &str = "https://api.robinhood.com";
    const ACCOUNTS_URL: &str = "https://api.robinhood.com/accounts/";

    #[test]
    fn classifies_envelope_sequence_and_single() {
        let envelope = ResponseShape::classify(json!({
            "results": [{"id": 1}],
            "next": "https://api.robinhood.com/orders/?cursor=abc",
            "previous": null
        }));
        assert_eq!(
            envelope,
            ResponseShape::Envelope {
                results: vec![json!({"id": 1})],
                next: Some(String::from("https://api.robinhood.com/orders/?cursor=abc")),
            }
        );

        let last_page = ResponseShape::classify(json!({"results": [], "next": null}));
        assert_eq!(
            last_page,
            ResponseShape::Envelope {
                results: Vec::new(),
                next: None
            }
        );

        assert_eq!(
            ResponseShape::classify(json!([1, 2])),
            ResponseShape::Sequence(vec![json!(1), json!(2)])
        );
        assert_eq!(
            ResponseShape::classify(json!({"results": "not-a-list"})),
            ResponseShape::Single(json!({"results": "not-a-list"}))
        );
    }

    #[test]
    fn resolves_relative_and_absolute_urls() {
        assert_eq!(resolve_url(BASE, "/accounts/"), ACCOUNTS_URL);
        assert_eq!(resolve_url("https://api.robinhood.com/", "accounts/"), ACCOUNTS_URL);
        assert_eq!(
            resolve_url(BASE, "https://nummus.robinhood.com/holdings/"),
            "https://nummus.robinhood.com/holdings/"
        );
    }
}
