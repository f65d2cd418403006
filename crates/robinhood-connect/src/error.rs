use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::domain::SOURCE;
use crate::http_client::HttpError;
use crate::UtcDateTime;

/// Value-level validation failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("timestamp is neither RFC3339 nor YYYY-MM-DD: '{value}'")]
    InvalidTimestamp { value: String },
}

/// Low-level failure raised by the authenticated transport and raw endpoints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(#[from] HttpError),

    #[error("upstream returned status {status}")]
    Status { status: u16, body: String },

    #[error("failed to decode {context}: {message}")]
    Decode { context: String, message: String },

    #[error("no refresh token available; authenticate first")]
    NoRefreshToken,
}

impl ApiError {
    pub fn decode(context: impl Into<String>, error: &serde_json::Error) -> Self {
        Self::Decode {
            context: context.into(),
            message: error.to_string(),
        }
    }

    /// HTTP status carried by the error, if the upstream answered at all.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Opaque payload attached to a [`StandardizedError`].
    pub fn details(&self) -> Value {
        match self {
            Self::Transport(error) => json!({
                "kind": "transport",
                "message": error.message(),
                "timedOut": error.timed_out(),
            }),
            Self::Status { status, body } => {
                let body = serde_json::from_str::<Value>(body)
                    .unwrap_or_else(|_| Value::String(body.clone()));
                json!({ "kind": "status", "status": status, "body": body })
            }
            Self::Decode { context, message } => json!({
                "kind": "decode",
                "context": context,
                "message": message,
            }),
            Self::NoRefreshToken => json!({ "kind": "no_refresh_token" }),
        }
    }
}

/// Closed taxonomy of failures surfaced by [`crate::RobinhoodService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    MfaRequired,
    AuthFailed,
    TokenRefreshFailed,
    PortfolioFetchFailed,
    PositionsFetchFailed,
    PositionFetchFailed,
    AccountsFetchFailed,
    BalanceFetchFailed,
    QuoteFetchFailed,
    QuotesFetchFailed,
    TransactionsFetchFailed,
    HistoricalDataFetchFailed,
    WatchlistsFetchFailed,
    DividendsFetchFailed,
}

impl ErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MfaRequired => "MFA_REQUIRED",
            Self::AuthFailed => "AUTH_FAILED",
            Self::TokenRefreshFailed => "TOKEN_REFRESH_FAILED",
            Self::PortfolioFetchFailed => "PORTFOLIO_FETCH_FAILED",
            Self::PositionsFetchFailed => "POSITIONS_FETCH_FAILED",
            Self::PositionFetchFailed => "POSITION_FETCH_FAILED",
            Self::AccountsFetchFailed => "ACCOUNTS_FETCH_FAILED",
            Self::BalanceFetchFailed => "BALANCE_FETCH_FAILED",
            Self::QuoteFetchFailed => "QUOTE_FETCH_FAILED",
            Self::QuotesFetchFailed => "QUOTES_FETCH_FAILED",
            Self::TransactionsFetchFailed => "TRANSACTIONS_FETCH_FAILED",
            Self::HistoricalDataFetchFailed => "HISTORICAL_DATA_FETCH_FAILED",
            Self::WatchlistsFetchFailed => "WATCHLISTS_FETCH_FAILED",
            Self::DividendsFetchFailed => "DIVIDENDS_FETCH_FAILED",
        }
    }
}

impl Display for ErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single error shape returned by every public service operation.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{code}: {message}")]
#[serde(rename_all = "camelCase")]
pub struct StandardizedError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    pub timestamp: UtcDateTime,
    #[serde(rename = "source")]
    pub origin: String,
}

impl StandardizedError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            timestamp: UtcDateTime::now(),
            origin: String::from(SOURCE),
        }
    }

    /// Wrap a low-level failure, keeping it as opaque `details`.
    pub fn from_api(code: ErrorCode, context: &str, error: &ApiError) -> Self {
        Self::new(code, format!("{context}: {error}")).with_details(error.details())
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}
