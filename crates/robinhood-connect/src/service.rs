//! # Orchestration Facade
//!
//! [`RobinhoodService`] composes raw endpoint calls, auxiliary lookups and the
//! mapper into standardized records. Every operation returns either its
//! records or a [`StandardizedError`] carrying a fixed [`ErrorCode`].
//!
//! ## Partial failures
//!
//! | Operation | Auxiliary lookup fails |
//! |-----------|------------------------|
//! | positions, position, portfolio | position is dropped |
//! | watchlists | item is dropped |
//! | transactions, dividends, quotes | sentinel symbol/name |
//!
//! When every position of a non-empty set is dropped the operation fails. A
//! balance has no partial form: a failed portfolio lookup fails the call.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::api::{RobinhoodApi, DEFAULT_HISTORICALS_BOUNDS};
use crate::auth::{AuthOutcome, AuthState, Credentials, TokenSet};
use crate::client::RobinhoodClient;
use crate::config::ClientConfig;
use crate::domain::raw::{RawAccount, RawInstrument, RawPosition};
use crate::domain::{
    Account, Balance, Dividend, HistoricalData, Portfolio, Position, Quote, Transaction, Watchlist,
};
use crate::error::{ApiError, ErrorCode, StandardizedError};
use crate::http_client::HttpClient;
use crate::mapper;

type InstrumentCache = HashMap<String, Option<RawInstrument>>;

#[derive(Debug)]
pub struct RobinhoodService {
    api: RobinhoodApi,
}

impl RobinhoodService {
    pub fn new(config: ClientConfig) -> Self {
        Self::from_client(RobinhoodClient::new(config))
    }

    pub fn with_http_client(http_client: Arc<dyn HttpClient>, config: ClientConfig) -> Self {
        Self::from_client(RobinhoodClient::with_http_client(http_client, config))
    }

    /// Service configured from `ROBINHOOD_*` environment variables.
    pub fn from_env() -> Self {
        Self::new(ClientConfig::from_env())
    }

    pub fn from_client(client: RobinhoodClient) -> Self {
        Self {
            api: RobinhoodApi::new(client),
        }
    }

    /// Raw accessor sharing this service's token lifecycle.
    pub fn api(&self) -> &RobinhoodApi {
        &self.api
    }

    pub async fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<TokenSet, StandardizedError> {
        match self.client().authenticate(credentials).await {
            AuthOutcome::Success(tokens) => Ok(tokens),
            AuthOutcome::MfaRequired => Err(StandardizedError::new(
                ErrorCode::MfaRequired,
                "multi-factor authentication code required",
            )),
            AuthOutcome::Failure(error) => Err(StandardizedError::from_api(
                ErrorCode::AuthFailed,
                "authentication failed",
                &error,
            )),
        }
    }

    pub async fn refresh_token(&self) -> Result<TokenSet, StandardizedError> {
        self.client()
            .refresh_access_token()
            .await
            .map_err(|error| fetch_error(ErrorCode::TokenRefreshFailed, "failed to refresh token", &error))
    }

    pub fn is_authenticated(&self) -> bool {
        self.client().is_authenticated()
    }

    pub fn auth_state(&self) -> AuthState {
        self.client().auth_state()
    }

    /// Current tokens, for the caller to persist.
    pub fn token_set(&self) -> Option<TokenSet> {
        self.client().tokens().token_set()
    }

    pub fn restore_tokens(&self, tokens: TokenSet) {
        self.client().tokens().restore(tokens);
    }

    /// Forget the held tokens. Nothing is revoked upstream.
    pub fn logout(&self) {
        self.client().tokens().clear();
        info!("logged out; tokens cleared");
    }

    pub async fn get_accounts(&self) -> Result<Vec<Account>, StandardizedError> {
        let accounts = self.api.get_accounts().await.map_err(|error| {
            fetch_error(ErrorCode::AccountsFetchFailed, "failed to fetch accounts", &error)
        })?;

        Ok(accounts.iter().map(mapper::map_account).collect())
    }

    /// Portfolio of `account_id`, or of the first account when `None`.
    pub async fn get_portfolio(
        &self,
        account_id: Option<&str>,
    ) -> Result<Portfolio, StandardizedError> {
        let code = ErrorCode::PortfolioFetchFailed;
        let context = "failed to fetch portfolio";

        let account = self.select_account(account_id, code, context).await?;
        let account_number = account_key(&account);
        let portfolio = self
            .api
            .get_portfolio(&account_number)
            .await
            .map_err(|error| fetch_error(code, context, &error))?;
        let positions = self
            .load_positions(Some(account_number.as_str()))
            .await
            .map_err(|error| fetch_error(code, context, &error))?;

        Ok(mapper::map_portfolio(&account, &portfolio, positions))
    }

    pub async fn get_positions(&self) -> Result<Vec<Position>, StandardizedError> {
        self.load_positions(None).await.map_err(|error| {
            fetch_error(ErrorCode::PositionsFetchFailed, "failed to fetch positions", &error)
        })
    }

    /// Held position in `symbol`, `None` when not held.
    pub async fn get_position(&self, symbol: &str) -> Result<Option<Position>, StandardizedError> {
        let positions = self.load_positions(None).await.map_err(|error| {
            fetch_error(
                ErrorCode::PositionFetchFailed,
                &format!("failed to fetch position for {symbol}"),
                &error,
            )
        })?;

        Ok(positions
            .into_iter()
            .find(|position| position.symbol.eq_ignore_ascii_case(symbol.trim())))
    }

    pub async fn get_balance(&self, account_id: Option<&str>) -> Result<Balance, StandardizedError> {
        let account = self
            .select_account(account_id, ErrorCode::BalanceFetchFailed, "failed to fetch balance")
            .await?;
        let account_number = account_key(&account);

        let portfolio = self
            .api
            .get_portfolio(&account_number)
            .await
            .map_err(|error| {
                fetch_error(ErrorCode::BalanceFetchFailed, "failed to fetch balance", &error)
            })?;

        Ok(mapper::map_balance(&account, Some(&portfolio)))
    }

    pub async fn get_quote(&self, symbol: &str) -> Result<Quote, StandardizedError> {
        let (quote, instrument) = tokio::join!(
            self.api.get_quote(symbol),
            self.api.get_instrument_by_symbol(symbol)
        );

        let quote = quote.map_err(|error| {
            fetch_error(
                ErrorCode::QuoteFetchFailed,
                &format!("failed to fetch quote for {symbol}"),
                &error,
            )
        })?;
        let instrument = instrument.unwrap_or_else(|error| {
            warn!(symbol, error = %error, "instrument lookup failed; quote keeps sentinel name");
            None
        });

        Ok(mapper::map_quote(&quote, instrument.as_ref()))
    }

    /// Quotes for `symbols`; symbols the upstream does not know are skipped.
    pub async fn get_quotes(&self, symbols: &[String]) -> Result<Vec<Quote>, StandardizedError> {
        let quotes = self.api.get_quotes(symbols).await.map_err(|error| {
            fetch_error(ErrorCode::QuotesFetchFailed, "failed to fetch quotes", &error)
        })?;

        let mut cache = InstrumentCache::new();
        let mut mapped = Vec::with_capacity(quotes.len());
        for (requested, quote) in symbols.iter().zip(quotes) {
            let Some(quote) = quote else {
                debug!(symbol = %requested, "no quote returned");
                continue;
            };
            let instrument = self
                .lookup_instrument(&mut cache, quote.instrument.as_deref())
                .await;
            mapped.push(mapper::map_quote(&quote, instrument.as_ref()));
        }

        Ok(mapped)
    }

    pub async fn get_transactions(&self) -> Result<Vec<Transaction>, StandardizedError> {
        let orders = self.api.get_orders().await.map_err(|error| {
            fetch_error(
                ErrorCode::TransactionsFetchFailed,
                "failed to fetch transactions",
                &error,
            )
        })?;

        let mut cache = InstrumentCache::new();
        let mut transactions = Vec::with_capacity(orders.len());
        for order in &orders {
            let instrument = self
                .lookup_instrument(&mut cache, order.instrument.as_deref())
                .await;
            transactions.push(mapper::map_transaction(order, instrument.as_ref()));
        }

        Ok(transactions)
    }

    /// Bars for `symbol` within regular trading hours.
    pub async fn get_historical_data(
        &self,
        symbol: &str,
        interval: &str,
        span: &str,
    ) -> Result<HistoricalData, StandardizedError> {
        let historicals = self
            .api
            .get_historicals(symbol, interval, span, DEFAULT_HISTORICALS_BOUNDS)
            .await
            .map_err(|error| {
                fetch_error(
                    ErrorCode::HistoricalDataFetchFailed,
                    &format!("failed to fetch historical data for {symbol}"),
                    &error,
                )
            })?;

        let data = mapper::map_historicals(&historicals, symbol);
        debug!(
            symbol = %data.symbol,
            interval = data.interval.as_str(),
            bars = data.data_points.len(),
            "historical data mapped"
        );
        Ok(data)
    }

    pub async fn get_watchlists(&self) -> Result<Vec<Watchlist>, StandardizedError> {
        let watchlists = self.api.get_watchlists().await.map_err(|error| {
            fetch_error(
                ErrorCode::WatchlistsFetchFailed,
                "failed to fetch watchlists",
                &error,
            )
        })?;

        let mut cache = InstrumentCache::new();
        let mut mapped = Vec::with_capacity(watchlists.len());
        for watchlist in &watchlists {
            let name = watchlist
                .name
                .clone()
                .or_else(|| watchlist.url.as_deref().and_then(mapper::id_from_url))
                .unwrap_or_default();

            let items = if name.is_empty() {
                Vec::new()
            } else {
                self.api
                    .get_watchlist_items(&name)
                    .await
                    .unwrap_or_else(|error| {
                        warn!(watchlist = %name, error = %error, "watchlist items lookup failed; list left empty");
                        Vec::new()
                    })
            };

            let mut instruments = Vec::with_capacity(items.len());
            for item in &items {
                match self
                    .lookup_instrument(&mut cache, item.instrument.as_deref())
                    .await
                {
                    Some(instrument) => instruments.push(instrument),
                    None => debug!(watchlist = %name, "watchlist item dropped"),
                }
            }

            mapped.push(mapper::map_watchlist(watchlist, &instruments));
        }

        Ok(mapped)
    }

    pub async fn get_dividends(&self) -> Result<Vec<Dividend>, StandardizedError> {
        let dividends = self.api.get_dividends().await.map_err(|error| {
            fetch_error(ErrorCode::DividendsFetchFailed, "failed to fetch dividends", &error)
        })?;

        let mut cache = InstrumentCache::new();
        let mut mapped = Vec::with_capacity(dividends.len());
        for dividend in &dividends {
            let instrument = self
                .lookup_instrument(&mut cache, dividend.instrument.as_deref())
                .await;
            mapped.push(mapper::map_dividend(dividend, instrument.as_ref()));
        }

        Ok(mapped)
    }

    fn client(&self) -> &RobinhoodClient {
        self.api.client()
    }

    async fn select_account(
        &self,
        account_id: Option<&str>,
        code: ErrorCode,
        context: &str,
    ) -> Result<RawAccount, StandardizedError> {
        let accounts = self
            .api
            .get_accounts()
            .await
            .map_err(|error| fetch_error(code, context, &error))?;

        let selected = match account_id {
            Some(id) => accounts
                .into_iter()
                .find(|account| account_key(account) == id.trim()),
            None => accounts.into_iter().next(),
        };

        selected.ok_or_else(|| {
            let message = match account_id {
                Some(id) => format!("{context}: account {id} not found"),
                None => format!("{context}: no brokerage account found"),
            };
            StandardizedError::new(code, message)
        })
    }

    /// Enriched positions, optionally restricted to one account. Positions
    /// whose instrument or quote lookup fails are dropped; if that drops every
    /// position, the last lookup error is returned.
    async fn load_positions(&self, account_number: Option<&str>) -> Result<Vec<Position>, ApiError> {
        let raw_positions: Vec<RawPosition> = self
            .api
            .get_positions()
            .await?
            .into_iter()
            .filter(|position| match (account_number, position_account(position)) {
                (Some(wanted), Some(held)) => wanted == held,
                _ => true,
            })
            .collect();

        let mut positions = Vec::with_capacity(raw_positions.len());
        let mut last_error = None;
        for raw in &raw_positions {
            match self.enrich_position(raw).await {
                Ok(position) => positions.push(position),
                Err(error) => {
                    warn!(
                        position = raw.url.as_deref().unwrap_or_default(),
                        error = %error,
                        "position lookup failed; position dropped"
                    );
                    last_error = Some(error);
                }
            }
        }

        match last_error {
            Some(error) if positions.is_empty() => Err(error),
            _ => Ok(positions),
        }
    }

    async fn enrich_position(&self, raw: &RawPosition) -> Result<Position, ApiError> {
        let instrument_url = raw.instrument.as_deref().ok_or_else(|| ApiError::Decode {
            context: String::from("position"),
            message: String::from("position has no instrument reference"),
        })?;
        let instrument = self.api.get_instrument(instrument_url).await?;
        let symbol = instrument.symbol.as_deref().ok_or_else(|| ApiError::Decode {
            context: String::from(instrument_url),
            message: String::from("instrument has no symbol"),
        })?;
        let quote = self.api.get_quote(symbol).await?;

        Ok(mapper::map_position(raw, Some(&instrument), Some(&quote)))
    }

    /// Instrument behind `url`, memoized per call. Failures are logged once
    /// and yield `None`.
    async fn lookup_instrument(
        &self,
        cache: &mut InstrumentCache,
        url: Option<&str>,
    ) -> Option<RawInstrument> {
        let url = url?;
        if let Some(cached) = cache.get(url) {
            return cached.clone();
        }

        let instrument = match self.api.get_instrument(url).await {
            Ok(instrument) => Some(instrument),
            Err(error) => {
                warn!(instrument = url, error = %error, "instrument lookup failed");
                None
            }
        };
        cache.insert(url.to_owned(), instrument.clone());
        instrument
    }
}

fn fetch_error(code: ErrorCode, context: &str, error: &ApiError) -> StandardizedError {
    warn!(code = %code, error = %error, "{context}");
    StandardizedError::from_api(code, context, error)
}

fn account_key(account: &RawAccount) -> String {
    account
        .account_number
        .clone()
        .or_else(|| account.url.as_deref().and_then(mapper::id_from_url))
        .unwrap_or_default()
}

fn position_account(position: &RawPosition) -> Option<String> {
    position
        .account_number
        .clone()
        .or_else(|| position.account.as_deref().and_then(mapper::id_from_url))
}
