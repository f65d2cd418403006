//! Read-only Robinhood adapter.
//!
//! This crate contains:
//! - Token lifecycle (password/MFA login, refresh, single 401 replay)
//! - Authenticated transport with pagination
//! - Thin raw endpoint accessors
//! - Pure mapping from upstream records to standardized records
//! - A facade returning standardized records or a [`StandardizedError`]

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod domain;
pub mod endpoints;
pub mod error;
pub mod http_client;
pub mod mapper;
pub mod service;

pub use api::RobinhoodApi;
pub use auth::{
    generate_device_token, AuthOutcome, AuthState, Credentials, TokenManager, TokenSet,
};
pub use client::{ResponseShape, RobinhoodClient};
pub use config::ClientConfig;
pub use domain::{
    Account, AssetType, Balance, Dividend, HistoricalBar, HistoricalData, Portfolio, Position,
    PositionMetadata, Quote, StandardInterval, Transaction, TransactionStatus, TransactionType,
    UtcDateTime, Watchlist, SOURCE,
};
pub use error::{ApiError, ErrorCode, StandardizedError, ValidationError};
pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, ReqwestHttpClient,
};
pub use service::RobinhoodService;
