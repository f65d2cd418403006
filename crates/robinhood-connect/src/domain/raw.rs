//! Upstream (brokerage-shaped) records.
//!
//! Decimal values arrive as strings and any field may be missing or null, so
//! every field defaults. Numeric fields go through [`lenient_decimal`], which
//! also accepts bare JSON numbers. Cross references between records are URLs.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Accept `"12.34"`, `12.34` or `null` and keep the textual form.
pub fn lenient_decimal<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => Some(text),
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => None,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawAccount {
    pub url: Option<String>,
    pub account_number: Option<String>,
    #[serde(rename = "type")]
    pub account_type: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub cash: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub buying_power: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub cash_available_for_withdrawal: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub portfolio_cash: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub uncleared_deposits: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub unsettled_funds: Option<String>,
    pub deactivated: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawPortfolio {
    pub url: Option<String>,
    pub account: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub equity: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub extended_hours_equity: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub market_value: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub extended_hours_market_value: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub equity_previous_close: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub adjusted_equity_previous_close: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub withdrawable_amount: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub last_core_equity: Option<String>,
    pub start_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawPosition {
    pub url: Option<String>,
    pub instrument: Option<String>,
    pub account: Option<String>,
    pub account_number: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub quantity: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub average_buy_price: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub intraday_quantity: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub shares_held_for_sells: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawInstrument {
    pub id: Option<String>,
    pub url: Option<String>,
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub simple_name: Option<String>,
    #[serde(rename = "type")]
    pub instrument_type: Option<String>,
    pub country: Option<String>,
    pub tradeable: bool,
    pub state: Option<String>,
    pub quote: Option<String>,
    pub market: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawQuote {
    pub symbol: Option<String>,
    pub instrument: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub ask_price: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub ask_size: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub bid_price: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub bid_size: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub last_trade_price: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub last_extended_hours_trade_price: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub previous_close: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub adjusted_previous_close: Option<String>,
    pub previous_close_date: Option<String>,
    pub trading_halted: bool,
    pub has_traded: bool,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawOrder {
    pub id: Option<String>,
    pub url: Option<String>,
    pub account: Option<String>,
    pub instrument: Option<String>,
    pub side: Option<String>,
    #[serde(rename = "type")]
    pub order_type: Option<String>,
    pub state: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub quantity: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub cumulative_quantity: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub price: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub average_price: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub fees: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub last_transaction_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawDividend {
    pub id: Option<String>,
    pub url: Option<String>,
    pub account: Option<String>,
    pub instrument: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub amount: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub rate: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub position: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub withholding: Option<String>,
    pub record_date: Option<String>,
    pub payable_date: Option<String>,
    pub paid_at: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawHistoricals {
    pub symbol: Option<String>,
    pub interval: Option<String>,
    pub span: Option<String>,
    pub bounds: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub previous_close: Option<String>,
    pub instrument: Option<String>,
    pub historicals: Vec<RawHistoricalBar>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawHistoricalBar {
    pub begins_at: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub open_price: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub close_price: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub high_price: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub low_price: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub volume: Option<String>,
    pub session: Option<String>,
    pub interpolated: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawWatchlist {
    pub url: Option<String>,
    pub name: Option<String>,
    pub user: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawWatchlistItem {
    pub url: Option<String>,
    pub watchlist: Option<String>,
    pub instrument: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawCryptoHolding {
    pub id: Option<String>,
    pub account_id: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub quantity: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub quantity_available: Option<String>,
    pub currency: RawCryptoCurrency,
    pub cost_bases: Vec<RawCryptoCostBasis>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawCryptoCurrency {
    pub id: Option<String>,
    pub code: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawCryptoCostBasis {
    #[serde(deserialize_with = "lenient_decimal")]
    pub direct_cost_basis: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub direct_quantity: Option<String>,
}
