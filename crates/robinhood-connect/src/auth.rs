//! Token lifecycle: password/MFA authentication, refresh-token exchange and
//! the bearer credential attached to every outbound call.
//!
//! # States
//!
//! ```text
//!                authenticate() ok
//! Unauthenticated ─────────────────▶ Authenticated
//!       ▲                              │   ▲
//!       │ refresh failed               │   │ refresh ok
//!       │                        401   ▼   │
//!       └──────────────────────── Refreshing
//! ```
//!
//! An MFA challenge leaves the manager `Unauthenticated`; the caller resubmits
//! [`Credentials`] with `mfa_code` set.

use std::fmt::{Debug, Formatter};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::client::{json_request, resolve_url};
use crate::config::ClientConfig;
use crate::endpoints;
use crate::error::ApiError;
use crate::http_client::{HttpAuth, HttpClient, HttpMethod};

pub const DEVICE_TOKEN_LEN: usize = 40;
const DEVICE_TOKEN_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

const TOKEN_EXPIRES_IN_SECS: u64 = 86_400;
const TOKEN_SCOPE: &str = "internal";
const MFA_CHALLENGE_TYPE: &str = "sms";

/// One-shot login material. Never stored by the client.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub mfa_code: Option<String>,
    pub device_token: Option<String>,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            mfa_code: None,
            device_token: None,
        }
    }

    pub fn with_mfa_code(mut self, mfa_code: impl Into<String>) -> Self {
        self.mfa_code = Some(mfa_code.into());
        self
    }

    pub fn with_device_token(mut self, device_token: impl Into<String>) -> Self {
        self.device_token = Some(device_token.into());
        self
    }
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("mfa_code", &self.mfa_code.as_ref().map(|_| "<redacted>"))
            .field("device_token", &self.device_token)
            .finish()
    }
}

/// Access/refresh token pair as returned by the OAuth endpoint.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: u64,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub scope: String,
}

impl TokenSet {
    /// Token set seeded from a bare access token (no refresh capability).
    pub fn from_access_token(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            expires_in: 0,
            token_type: default_token_type(),
            scope: String::from(TOKEN_SCOPE),
        }
    }
}

impl Debug for TokenSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSet")
            .field("access_token", &"<redacted>")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "<redacted>"),
            )
            .field("expires_in", &self.expires_in)
            .field("token_type", &self.token_type)
            .field("scope", &self.scope)
            .finish()
    }
}

fn default_token_type() -> String {
    String::from("Bearer")
}

/// Result of a password authentication attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Success(TokenSet),
    MfaRequired,
    Failure(ApiError),
}

/// Observable state of the token lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    Authenticated,
    Refreshing,
}

#[derive(Serialize)]
struct PasswordGrantBody<'a> {
    username: &'a str,
    password: &'a str,
    device_token: &'a str,
    expires_in: u64,
    scope: &'a str,
    challenge_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    mfa_code: Option<&'a str>,
}

#[derive(Serialize)]
struct RefreshGrantBody<'a> {
    grant_type: &'a str,
    refresh_token: &'a str,
    scope: &'a str,
    client_id: &'a str,
}

#[derive(Deserialize)]
struct MfaChallenge {
    #[serde(default)]
    mfa_required: bool,
}

#[derive(Debug, Default)]
struct TokenState {
    tokens: Option<TokenSet>,
    refreshes_in_flight: usize,
}

/// Owns the [`TokenSet`] of one client instance.
pub struct TokenManager {
    http_client: Arc<dyn HttpClient>,
    config: Arc<ClientConfig>,
    inner: Mutex<TokenState>,
}

impl TokenManager {
    pub fn new(http_client: Arc<dyn HttpClient>, config: Arc<ClientConfig>) -> Self {
        let tokens = config
            .access_token
            .as_ref()
            .map(|token| TokenSet::from_access_token(token.clone()));

        Self {
            http_client,
            config,
            inner: Mutex::new(TokenState {
                tokens,
                refreshes_in_flight: 0,
            }),
        }
    }

    pub fn state(&self) -> AuthState {
        let state = self.lock();
        if state.refreshes_in_flight > 0 {
            AuthState::Refreshing
        } else if state.tokens.is_some() {
            AuthState::Authenticated
        } else {
            AuthState::Unauthenticated
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock().tokens.is_some()
    }

    pub fn token_set(&self) -> Option<TokenSet> {
        self.lock().tokens.clone()
    }

    pub fn restore(&self, tokens: TokenSet) {
        self.lock().tokens = Some(tokens);
    }

    pub fn clear(&self) {
        self.lock().tokens = None;
    }

    /// Bearer credential for the next request, or [`HttpAuth::None`] when no
    /// token is held.
    pub fn bearer(&self) -> HttpAuth {
        self.lock()
            .tokens
            .as_ref()
            .map(|tokens| HttpAuth::BearerToken(tokens.access_token.clone()))
            .unwrap_or(HttpAuth::None)
    }

    /// Run the password grant.
    ///
    /// Only a 400 whose JSON body sets `mfa_required` asks for a second
    /// factor. Every other non-2xx answer is a [`AuthOutcome::Failure`].
    pub async fn authenticate(&self, credentials: &Credentials) -> AuthOutcome {
        let device_token = credentials
            .device_token
            .clone()
            .unwrap_or_else(generate_device_token);

        let body = PasswordGrantBody {
            username: &credentials.username,
            password: &credentials.password,
            device_token: &device_token,
            expires_in: TOKEN_EXPIRES_IN_SECS,
            scope: TOKEN_SCOPE,
            challenge_type: MFA_CHALLENGE_TYPE,
            mfa_code: credentials.mfa_code.as_deref(),
        };
        let body = match serde_json::to_string(&body) {
            Ok(body) => body,
            Err(error) => {
                return AuthOutcome::Failure(ApiError::decode("authentication request", &error))
            }
        };

        let request = json_request(
            HttpMethod::Post,
            resolve_url(&self.config.base_url, endpoints::TOKEN),
            &self.config,
        )
        .with_body(body);

        debug!(username = %credentials.username, has_mfa_code = credentials.mfa_code.is_some(), "authenticating");

        let response = match self.http_client.execute(request).await {
            Ok(response) => response,
            Err(error) => {
                warn!(error = %error, "authentication transport failure");
                return AuthOutcome::Failure(ApiError::Transport(error));
            }
        };

        if response.status == 400 && signals_mfa(&response.body) {
            info!(status = response.status, "authentication requires MFA code");
            return AuthOutcome::MfaRequired;
        }

        if !response.is_success() {
            warn!(status = response.status, "authentication rejected");
            return AuthOutcome::Failure(ApiError::Status {
                status: response.status,
                body: response.body,
            });
        }

        match serde_json::from_str::<TokenSet>(&response.body) {
            Ok(tokens) => {
                self.restore(tokens.clone());
                info!(expires_in = tokens.expires_in, "authenticated");
                AuthOutcome::Success(tokens)
            }
            Err(error) => AuthOutcome::Failure(ApiError::decode("token response", &error)),
        }
    }

    /// Exchange the held refresh token for a new [`TokenSet`].
    ///
    /// Fails fast with [`ApiError::NoRefreshToken`] when none is held. Any
    /// other failure discards the current token set.
    pub async fn refresh_access_token(&self) -> Result<TokenSet, ApiError> {
        let refresh_token = {
            let mut state = self.lock();
            let refresh_token = state
                .tokens
                .as_ref()
                .and_then(|tokens| tokens.refresh_token.clone())
                .ok_or(ApiError::NoRefreshToken)?;
            state.refreshes_in_flight += 1;
            refresh_token
        };

        let result = self.exchange_refresh_token(&refresh_token).await;

        let mut state = self.lock();
        state.refreshes_in_flight = state.refreshes_in_flight.saturating_sub(1);
        match result {
            Ok(mut tokens) => {
                if tokens.refresh_token.is_none() {
                    tokens.refresh_token = Some(refresh_token);
                }
                state.tokens = Some(tokens.clone());
                info!(expires_in = tokens.expires_in, "access token refreshed");
                Ok(tokens)
            }
            Err(error) => {
                state.tokens = None;
                warn!(error = %error, "token refresh failed; credentials cleared");
                Err(error)
            }
        }
    }

    async fn exchange_refresh_token(&self, refresh_token: &str) -> Result<TokenSet, ApiError> {
        let body = serde_json::to_string(&RefreshGrantBody {
            grant_type: "refresh_token",
            refresh_token,
            scope: TOKEN_SCOPE,
            client_id: &self.config.client_id,
        })
        .map_err(|error| ApiError::decode("refresh request", &error))?;

        let request = json_request(
            HttpMethod::Post,
            resolve_url(&self.config.base_url, endpoints::TOKEN),
            &self.config,
        )
        .with_body(body);

        let response = self.http_client.execute(request).await?;
        if !response.is_success() {
            return Err(ApiError::Status {
                status: response.status,
                body: response.body,
            });
        }

        serde_json::from_str(&response.body)
            .map_err(|error| ApiError::decode("refresh token response", &error))
    }

    fn lock(&self) -> MutexGuard<'_, TokenState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Debug for TokenManager {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Random 40-character lowercase alphanumeric device identifier.
///
/// Uses a non-cryptographic generator; the value only identifies the device
/// to the upstream and is not a secret.
pub fn generate_device_token() -> String {
    (0..DEVICE_TOKEN_LEN)
        .map(|_| DEVICE_TOKEN_ALPHABET[fastrand::usize(..DEVICE_TOKEN_ALPHABET.len())] as char)
        .collect()
}

fn signals_mfa(body: &str) -> bool {
    serde_json::from_str::<MfaChallenge>(body)
        .map(|challenge| challenge.mfa_required)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::ReqwestHttpClient;

    #[test]
    fn device_token_is_forty_lowercase_alphanumerics() {
        let token = generate_device_token();

        assert_eq!(token.len(), DEVICE_TOKEN_LEN);
        assert!(token
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit()));
        assert_ne!(token, generate_device_token());
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let credentials = Credentials::new("ada", "hunter2").with_mfa_code("123456");
        let tokens = TokenSet::from_access_token("secret-access");

        let rendered = format!("{credentials:?} {tokens:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("123456"));
        assert!(!rendered.contains("secret-access"));
    }

    #[test]
    fn mfa_flag_is_read_from_json_bodies_only() {
        assert!(signals_mfa(r#"{"mfa_required":true,"mfa_type":"sms"}"#));
        assert!(!signals_mfa(r#"{"mfa_required":false}"#));
        assert!(!signals_mfa(r#"{"detail":"Unable to log in."}"#));
        assert!(!signals_mfa("<html>mfa_required</html>"));
    }

    #[test]
    fn seeded_access_token_counts_as_authenticated() {
        let manager = TokenManager::new(
            Arc::new(ReqwestHttpClient::new()),
            Arc::new(ClientConfig::default().with_access_token("seeded")),
        );

        assert_eq!(manager.state(), AuthState::Authenticated);
        assert!(manager
            .token_set()
            .is_some_and(|tokens| tokens.refresh_token.is_none()));
    }
}
