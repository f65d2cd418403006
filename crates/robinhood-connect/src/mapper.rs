//! Raw → standardized record conversion.
//!
//! Every function here is pure and total: missing or unparsable upstream
//! numbers become `0.0`, missing related records become sentinel values, and
//! no derived amount or percentage is ever NaN or infinite.

use crate::domain::raw::{
    RawAccount, RawDividend, RawHistoricalBar, RawHistoricals, RawInstrument, RawOrder,
    RawPortfolio, RawPosition, RawQuote, RawWatchlist,
};
use crate::domain::{
    Account, AssetType, Balance, Dividend, HistoricalBar, HistoricalData, Portfolio, Position,
    PositionMetadata, Quote, StandardInterval, Transaction, TransactionStatus, TransactionType,
    Watchlist, CURRENCY, SOURCE,
};
use crate::UtcDateTime;

pub const UNKNOWN_SYMBOL: &str = "UNKNOWN";
pub const UNKNOWN_INSTRUMENT_NAME: &str = "Unknown Instrument";
pub const UNKNOWN_NAME: &str = "Unknown";

/// Parse an upstream decimal string; anything missing, blank, unparsable or
/// non-finite is `0.0`.
pub fn parse_decimal(value: Option<&str>) -> f64 {
    value
        .and_then(|text| text.trim().parse::<f64>().ok())
        .filter(|number| number.is_finite())
        .unwrap_or(0.0)
}

/// `value` itself when finite, otherwise `0.0`.
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// `numerator / denominator × 100`, or `0.0` when the denominator is zero.
pub fn percent(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }

    finite_or_zero(numerator / denominator * 100.0)
}

/// Last non-empty path segment of an upstream URL
/// (`.../accounts/5RY12345/` → `5RY12345`).
pub fn id_from_url(url: &str) -> Option<String> {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty() && !segment.contains(':'))
        .map(str::to_owned)
}

pub fn map_asset_type(instrument_type: Option<&str>) -> AssetType {
    match instrument_type.map(|value| value.trim().to_ascii_lowercase()) {
        Some(value) if value == "stock" => AssetType::Stock,
        Some(value) if value == "etp" || value == "etf" => AssetType::Etf,
        Some(value) if value == "adr" => AssetType::Adr,
        _ => AssetType::Other,
    }
}

pub fn map_transaction_status(state: &str) -> TransactionStatus {
    match state.trim().to_ascii_lowercase().as_str() {
        "filled" | "executed" => TransactionStatus::Completed,
        "cancelled" | "canceled" => TransactionStatus::Cancelled,
        "failed" | "rejected" => TransactionStatus::Failed,
        "pending" | "queued" | "confirmed" | "partially_filled" => TransactionStatus::Pending,
        _ => TransactionStatus::Pending,
    }
}

pub fn map_transaction_type(side: Option<&str>) -> TransactionType {
    match side.map(|value| value.trim().to_ascii_lowercase()).as_deref() {
        Some("buy") => TransactionType::Buy,
        Some("sell") => TransactionType::Sell,
        _ => TransactionType::Other,
    }
}

/// Collapse upstream interval names; anything unrecognized is `Day`.
pub fn map_interval(interval: &str) -> StandardInterval {
    match interval.trim().to_ascii_lowercase().as_str() {
        "5minute" | "10minute" | "15minute" | "30minute" => StandardInterval::Minute,
        "hour" => StandardInterval::Hour,
        "day" => StandardInterval::Day,
        "week" => StandardInterval::Week,
        "month" => StandardInterval::Month,
        _ => StandardInterval::Day,
    }
}

pub fn map_position(
    raw: &RawPosition,
    instrument: Option<&RawInstrument>,
    quote: Option<&RawQuote>,
) -> Position {
    let quantity = parse_decimal(raw.quantity.as_deref());
    let average_cost = parse_decimal(raw.average_buy_price.as_deref());
    let current_price = parse_decimal(quote.and_then(|q| q.last_trade_price.as_deref()));
    let previous_close = parse_decimal(quote.and_then(|q| q.previous_close.as_deref()));

    let market_value = finite_or_zero(quantity * current_price);
    let cost_basis = finite_or_zero(quantity * average_cost);
    let total_gain_loss = finite_or_zero(market_value - cost_basis);
    let previous_value = finite_or_zero(quantity * previous_close);
    let day_change = finite_or_zero(quantity * (current_price - previous_close));

    Position {
        symbol: instrument_symbol(instrument),
        name: instrument_name(instrument, UNKNOWN_INSTRUMENT_NAME),
        quantity,
        average_cost,
        current_price,
        previous_close,
        market_value,
        cost_basis,
        total_gain_loss,
        total_gain_loss_percent: percent(total_gain_loss, cost_basis),
        day_change,
        day_change_percent: percent(day_change, previous_value),
        asset_type: map_asset_type(instrument.and_then(|i| i.instrument_type.as_deref())),
        currency: String::from(CURRENCY),
        metadata: PositionMetadata {
            position_url: raw.url.clone(),
            instrument_url: raw.instrument.clone(),
            account_url: raw.account.clone(),
        },
        source: String::from(SOURCE),
        last_updated: UtcDateTime::now(),
    }
}

pub fn map_quote(raw: &RawQuote, instrument: Option<&RawInstrument>) -> Quote {
    let price = parse_decimal(raw.last_trade_price.as_deref());
    let previous_close = parse_decimal(raw.previous_close.as_deref());
    let change = finite_or_zero(price - previous_close);

    Quote {
        symbol: raw
            .symbol
            .clone()
            .unwrap_or_else(|| instrument_symbol(instrument)),
        name: instrument_name(instrument, UNKNOWN_INSTRUMENT_NAME),
        price,
        previous_close,
        change,
        change_percent: percent(change, previous_close),
        bid: parse_decimal(raw.bid_price.as_deref()),
        ask: parse_decimal(raw.ask_price.as_deref()),
        bid_size: parse_decimal(raw.bid_size.as_deref()),
        ask_size: parse_decimal(raw.ask_size.as_deref()),
        extended_hours_price: raw
            .last_extended_hours_trade_price
            .as_deref()
            .map(|value| parse_decimal(Some(value))),
        trading_halted: raw.trading_halted,
        currency: String::from(CURRENCY),
        source: String::from(SOURCE),
        last_updated: parse_timestamp(raw.updated_at.as_deref()).unwrap_or_else(UtcDateTime::now),
    }
}

/// Map an order. Filled quantity and average fill price win over the
/// requested quantity and limit price when present.
pub fn map_transaction(order: &RawOrder, instrument: Option<&RawInstrument>) -> Transaction {
    let filled_quantity = parse_decimal(order.cumulative_quantity.as_deref());
    let quantity = if filled_quantity > 0.0 {
        filled_quantity
    } else {
        parse_decimal(order.quantity.as_deref())
    };

    let average_price = parse_decimal(order.average_price.as_deref());
    let price = if average_price > 0.0 {
        average_price
    } else {
        parse_decimal(order.price.as_deref())
    };

    Transaction {
        id: order.id.clone().unwrap_or_default(),
        account_id: order.account.as_deref().and_then(id_from_url),
        symbol: instrument_symbol(instrument),
        name: instrument_name(instrument, UNKNOWN_NAME),
        transaction_type: map_transaction_type(order.side.as_deref()),
        order_type: order.order_type.clone(),
        quantity,
        price,
        amount: finite_or_zero(quantity * price),
        fees: parse_decimal(order.fees.as_deref()),
        status: map_transaction_status(order.state.as_deref().unwrap_or_default()),
        date: parse_timestamp(order.created_at.as_deref()),
        currency: String::from(CURRENCY),
        source: String::from(SOURCE),
        last_updated: parse_timestamp(order.updated_at.as_deref()).unwrap_or_else(UtcDateTime::now),
    }
}

pub fn map_dividend(raw: &RawDividend, instrument: Option<&RawInstrument>) -> Dividend {
    let amount = parse_decimal(raw.amount.as_deref());
    let withholding = parse_decimal(raw.withholding.as_deref());

    Dividend {
        id: raw.id.clone().unwrap_or_default(),
        account_id: raw.account.as_deref().and_then(id_from_url),
        symbol: instrument_symbol(instrument),
        name: instrument_name(instrument, UNKNOWN_NAME),
        amount,
        rate: parse_decimal(raw.rate.as_deref()),
        shares: parse_decimal(raw.position.as_deref()),
        withholding,
        net_amount: finite_or_zero(amount - withholding),
        state: raw.state.clone(),
        record_date: parse_timestamp(raw.record_date.as_deref()),
        payable_date: parse_timestamp(raw.payable_date.as_deref()),
        paid_at: parse_timestamp(raw.paid_at.as_deref()),
        currency: String::from(CURRENCY),
        source: String::from(SOURCE),
        last_updated: UtcDateTime::now(),
    }
}

pub fn map_historical_bar(raw: &RawHistoricalBar) -> HistoricalBar {
    HistoricalBar {
        timestamp: parse_timestamp(raw.begins_at.as_deref()),
        open: parse_decimal(raw.open_price.as_deref()),
        high: parse_decimal(raw.high_price.as_deref()),
        low: parse_decimal(raw.low_price.as_deref()),
        close: parse_decimal(raw.close_price.as_deref()),
        volume: parse_decimal(raw.volume.as_deref()).max(0.0) as u64,
        session: raw.session.clone(),
        interpolated: raw.interpolated,
    }
}

/// `requested_symbol` fills in when the upstream omits the symbol.
pub fn map_historicals(raw: &RawHistoricals, requested_symbol: &str) -> HistoricalData {
    HistoricalData {
        symbol: raw
            .symbol
            .clone()
            .unwrap_or_else(|| requested_symbol.to_ascii_uppercase()),
        interval: map_interval(raw.interval.as_deref().unwrap_or_default()),
        span: raw.span.clone(),
        bounds: raw.bounds.clone(),
        previous_close: parse_decimal(raw.previous_close.as_deref()),
        data_points: raw.historicals.iter().map(map_historical_bar).collect(),
        source: String::from(SOURCE),
        last_updated: UtcDateTime::now(),
    }
}

pub fn map_account(raw: &RawAccount) -> Account {
    Account {
        id: account_id(raw),
        account_type: raw
            .account_type
            .clone()
            .unwrap_or_else(|| String::from("cash")),
        is_active: !raw.deactivated,
        cash: parse_decimal(raw.cash.as_deref()),
        buying_power: parse_decimal(raw.buying_power.as_deref()),
        currency: String::from(CURRENCY),
        created_at: parse_timestamp(raw.created_at.as_deref()),
        url: raw.url.clone(),
        source: String::from(SOURCE),
        last_updated: UtcDateTime::now(),
    }
}

pub fn map_balance(account: &RawAccount, portfolio: Option<&RawPortfolio>) -> Balance {
    Balance {
        account_id: account_id(account),
        cash: parse_decimal(account.cash.as_deref()),
        buying_power: parse_decimal(account.buying_power.as_deref()),
        total_value: parse_decimal(portfolio.and_then(|p| p.equity.as_deref())),
        market_value: parse_decimal(portfolio.and_then(|p| p.market_value.as_deref())),
        cash_available_for_withdrawal: parse_decimal(
            account.cash_available_for_withdrawal.as_deref(),
        ),
        unsettled_funds: parse_decimal(account.unsettled_funds.as_deref()),
        uncleared_deposits: parse_decimal(account.uncleared_deposits.as_deref()),
        currency: String::from(CURRENCY),
        source: String::from(SOURCE),
        last_updated: UtcDateTime::now(),
    }
}

/// Aggregate already-mapped positions of one account. Gain/loss and day
/// change are sums over those positions; total value is the reported equity.
pub fn map_portfolio(
    account: &RawAccount,
    portfolio: &RawPortfolio,
    positions: Vec<Position>,
) -> Portfolio {
    let market_value = finite_or_zero(positions.iter().map(|p| p.market_value).sum());
    let cost_basis = finite_or_zero(positions.iter().map(|p| p.cost_basis).sum());
    let day_change = finite_or_zero(positions.iter().map(|p| p.day_change).sum());
    let total_gain_loss = finite_or_zero(market_value - cost_basis);
    let previous_value = finite_or_zero(market_value - day_change);

    Portfolio {
        account_id: account_id(account),
        total_value: parse_decimal(portfolio.equity.as_deref()),
        cash_balance: parse_decimal(account.cash.as_deref()),
        buying_power: parse_decimal(account.buying_power.as_deref()),
        market_value,
        cost_basis,
        total_gain_loss,
        total_gain_loss_percent: percent(total_gain_loss, cost_basis),
        day_change,
        day_change_percent: percent(day_change, previous_value),
        positions,
        currency: String::from(CURRENCY),
        source: String::from(SOURCE),
        last_updated: UtcDateTime::now(),
    }
}

/// `instruments` are the resolved instruments of the list's items, in item
/// order.
pub fn map_watchlist(raw: &RawWatchlist, instruments: &[RawInstrument]) -> Watchlist {
    let symbols: Vec<String> = instruments
        .iter()
        .filter_map(|instrument| instrument.symbol.clone())
        .collect();
    let name = raw
        .name
        .clone()
        .or_else(|| raw.url.as_deref().and_then(id_from_url))
        .unwrap_or_else(|| String::from(UNKNOWN_NAME));

    Watchlist {
        id: raw
            .url
            .as_deref()
            .and_then(id_from_url)
            .unwrap_or_else(|| name.clone()),
        name,
        item_count: symbols.len(),
        symbols,
        url: raw.url.clone(),
        source: String::from(SOURCE),
        last_updated: UtcDateTime::now(),
    }
}

fn account_id(account: &RawAccount) -> String {
    account
        .account_number
        .clone()
        .or_else(|| account.url.as_deref().and_then(id_from_url))
        .unwrap_or_default()
}

fn instrument_symbol(instrument: Option<&RawInstrument>) -> String {
    instrument
        .and_then(|i| i.symbol.clone())
        .unwrap_or_else(|| String::from(UNKNOWN_SYMBOL))
}

fn instrument_name(instrument: Option<&RawInstrument>, fallback: &str) -> String {
    instrument
        .and_then(|i| i.simple_name.clone().or_else(|| i.name.clone()))
        .unwrap_or_else(|| fallback.to_owned())
}

fn parse_timestamp(value: Option<&str>) -> Option<UtcDateTime> {
    value.and_then(|text| UtcDateTime::parse_date_or_timestamp(text).ok())
}
