//! Raw endpoint accessor.
//!
//! Thin GET-only pass-throughs over [`RobinhoodClient`]: each call fetches one
//! upstream resource (following pagination where the upstream pages) and
//! decodes it into [`crate::domain::raw`] records. Nothing here maps,
//! aggregates or absorbs failures.

use serde_json::Value;

use crate::client::RobinhoodClient;
use crate::domain::raw::{
    RawAccount, RawCryptoHolding, RawDividend, RawHistoricals, RawInstrument, RawOrder,
    RawPortfolio, RawPosition, RawQuote, RawWatchlist, RawWatchlistItem,
};
use crate::endpoints;
use crate::error::ApiError;

pub const DEFAULT_HISTORICALS_BOUNDS: &str = "regular";

#[derive(Debug)]
pub struct RobinhoodApi {
    client: RobinhoodClient,
}

impl RobinhoodApi {
    pub fn new(client: RobinhoodClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &RobinhoodClient {
        &self.client
    }

    pub async fn get_accounts(&self) -> Result<Vec<RawAccount>, ApiError> {
        self.client.paginate(endpoints::ACCOUNTS).await
    }

    pub async fn get_portfolio(&self, account_number: &str) -> Result<RawPortfolio, ApiError> {
        self.client
            .get_json(&endpoints::portfolio(account_number))
            .await
    }

    /// Positions with a non-zero quantity.
    pub async fn get_positions(&self) -> Result<Vec<RawPosition>, ApiError> {
        self.client.paginate(endpoints::POSITIONS_NONZERO).await
    }

    /// Instrument behind a cross-reference URL taken from another record.
    pub async fn get_instrument(&self, url: &str) -> Result<RawInstrument, ApiError> {
        self.client.get_json(url).await
    }

    /// First instrument listed for `symbol`, if the upstream knows it.
    pub async fn get_instrument_by_symbol(
        &self,
        symbol: &str,
    ) -> Result<Option<RawInstrument>, ApiError> {
        let path = endpoints::instruments_by_symbol(symbol);
        let mut instruments: Vec<RawInstrument> = self.client.paginate(&path).await?;
        if instruments.is_empty() {
            return Ok(None);
        }
        Ok(Some(instruments.swap_remove(0)))
    }

    pub async fn get_quote(&self, symbol: &str) -> Result<RawQuote, ApiError> {
        self.client.get_json(&endpoints::quote(symbol)).await
    }

    /// Batch quote lookup. The upstream answers `null` for unknown symbols;
    /// those slots are `None` so the result stays aligned with `symbols`.
    pub async fn get_quotes(&self, symbols: &[String]) -> Result<Vec<Option<RawQuote>>, ApiError> {
        if symbols.is_empty() {
            return Ok(Vec::new());
        }

        let path = endpoints::quotes(symbols);
        self.client
            .paginate_values(&path)
            .await?
            .into_iter()
            .map(|value| match value {
                Value::Null => Ok(None),
                value => serde_json::from_value(value)
                    .map(Some)
                    .map_err(|error| ApiError::decode(path.as_str(), &error)),
            })
            .collect()
    }

    pub async fn get_orders(&self) -> Result<Vec<RawOrder>, ApiError> {
        self.client.paginate(endpoints::ORDERS).await
    }

    pub async fn get_historicals(
        &self,
        symbol: &str,
        interval: &str,
        span: &str,
        bounds: &str,
    ) -> Result<RawHistoricals, ApiError> {
        self.client
            .get_json(&endpoints::historicals(symbol, interval, span, bounds))
            .await
    }

    /// Crypto holdings live on a separate host; the absolute URL is used as-is.
    pub async fn get_crypto_holdings(&self) -> Result<Vec<RawCryptoHolding>, ApiError> {
        self.client.paginate(endpoints::CRYPTO_HOLDINGS).await
    }

    pub async fn get_watchlists(&self) -> Result<Vec<RawWatchlist>, ApiError> {
        self.client.paginate(endpoints::WATCHLISTS).await
    }

    pub async fn get_watchlist_items(&self, name: &str) -> Result<Vec<RawWatchlistItem>, ApiError> {
        self.client
            .paginate(&endpoints::watchlist_items(name))
            .await
    }

    pub async fn get_dividends(&self) -> Result<Vec<RawDividend>, ApiError> {
        self.client.paginate(endpoints::DIVIDENDS).await
    }
}
