//! # Domain Models
//!
//! Two families of records live here:
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`raw`] | Brokerage-shaped records decoded straight from the wire |
//! | [`standard`] | Vendor-neutral records returned to callers |
//!
//! Raw records are only ever consumed by [`crate::mapper`]. Standardized
//! records carry numeric money fields that are never NaN or infinite, plus a
//! `source` tag and a `last_updated` timestamp.

pub mod raw;
pub mod standard;
mod timestamp;

pub use standard::{
    Account, AssetType, Balance, Dividend, HistoricalBar, HistoricalData, Portfolio, Position,
    PositionMetadata, Quote, StandardInterval, Transaction, TransactionStatus, TransactionType,
    Watchlist,
};
pub use timestamp::UtcDateTime;

/// Provenance tag stamped on every standardized record and error.
pub const SOURCE: &str = "robinhood";

/// Currency of every monetary field the upstream reports.
pub const CURRENCY: &str = "USD";
