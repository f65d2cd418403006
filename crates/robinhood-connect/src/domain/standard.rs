use serde::{Deserialize, Serialize};

use crate::UtcDateTime;

/// Broad instrument class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetType {
    Stock,
    Etf,
    Adr,
    Other,
}

/// Normalized bar interval; sub-hour upstream granularities share `Minute`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StandardInterval {
    Minute,
    Hour,
    Day,
    Week,
    Month,
}

impl StandardInterval {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Completed,
    Cancelled,
    Failed,
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Buy,
    Sell,
    Other,
}

/// Upstream references kept alongside a position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionMetadata {
    pub position_url: Option<String>,
    pub instrument_url: Option<String>,
    pub account_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub symbol: String,
    pub name: String,
    pub quantity: f64,
    pub average_cost: f64,
    pub current_price: f64,
    pub previous_close: f64,
    pub market_value: f64,
    pub cost_basis: f64,
    pub total_gain_loss: f64,
    pub total_gain_loss_percent: f64,
    pub day_change: f64,
    pub day_change_percent: f64,
    pub asset_type: AssetType,
    pub currency: String,
    pub metadata: PositionMetadata,
    pub source: String,
    pub last_updated: UtcDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub account_id: String,
    pub total_value: f64,
    pub cash_balance: f64,
    pub buying_power: f64,
    pub market_value: f64,
    pub cost_basis: f64,
    pub total_gain_loss: f64,
    pub total_gain_loss_percent: f64,
    pub day_change: f64,
    pub day_change_percent: f64,
    pub positions: Vec<Position>,
    pub currency: String,
    pub source: String,
    pub last_updated: UtcDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    pub account_id: String,
    pub cash: f64,
    pub buying_power: f64,
    pub total_value: f64,
    pub market_value: f64,
    pub cash_available_for_withdrawal: f64,
    pub unsettled_funds: f64,
    pub uncleared_deposits: f64,
    pub currency: String,
    pub source: String,
    pub last_updated: UtcDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub account_type: String,
    pub is_active: bool,
    pub cash: f64,
    pub buying_power: f64,
    pub currency: String,
    pub created_at: Option<UtcDateTime>,
    pub url: Option<String>,
    pub source: String,
    pub last_updated: UtcDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub previous_close: f64,
    pub change: f64,
    pub change_percent: f64,
    pub bid: f64,
    pub ask: f64,
    pub bid_size: f64,
    pub ask_size: f64,
    pub extended_hours_price: Option<f64>,
    pub trading_halted: bool,
    pub currency: String,
    pub source: String,
    pub last_updated: UtcDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub account_id: Option<String>,
    pub symbol: String,
    pub name: String,
    pub transaction_type: TransactionType,
    pub order_type: Option<String>,
    pub quantity: f64,
    pub price: f64,
    pub amount: f64,
    pub fees: f64,
    pub status: TransactionStatus,
    pub date: Option<UtcDateTime>,
    pub currency: String,
    pub source: String,
    pub last_updated: UtcDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dividend {
    pub id: String,
    pub account_id: Option<String>,
    pub symbol: String,
    pub name: String,
    pub amount: f64,
    pub rate: f64,
    pub shares: f64,
    pub withholding: f64,
    pub net_amount: f64,
    pub state: Option<String>,
    pub record_date: Option<UtcDateTime>,
    pub payable_date: Option<UtcDateTime>,
    pub paid_at: Option<UtcDateTime>,
    pub currency: String,
    pub source: String,
    pub last_updated: UtcDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalBar {
    pub timestamp: Option<UtcDateTime>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub session: Option<String>,
    pub interpolated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalData {
    pub symbol: String,
    pub interval: StandardInterval,
    pub span: Option<String>,
    pub bounds: Option<String>,
    pub previous_close: f64,
    pub data_points: Vec<HistoricalBar>,
    pub source: String,
    pub last_updated: UtcDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Watchlist {
    pub id: String,
    pub name: String,
    pub symbols: Vec<String>,
    pub item_count: usize,
    pub url: Option<String>,
    pub source: String,
    pub last_updated: UtcDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_serialize_camel_case_with_provenance() {
        let watchlist = Watchlist {
            id: String::from("Default"),
            name: String::from("Default"),
            symbols: vec![String::from("AAPL")],
            item_count: 1,
            url: None,
            source: String::from("robinhood"),
            last_updated: UtcDateTime::parse("2024-01-01T00:00:00Z").expect("timestamp"),
        };

        let encoded = serde_json::to_value(&watchlist).expect("must serialize");
        assert_eq!(encoded["itemCount"], 1);
        assert_eq!(encoded["source"], "robinhood");
        assert_eq!(encoded["lastUpdated"], "2024-01-01T00:00:00Z");
    }

    #[test]
    fn enums_serialize_snake_case() {
        assert_eq!(
            serde_json::to_string(&TransactionStatus::Cancelled).expect("serialize"),
            "\"cancelled\""
        );
        assert_eq!(StandardInterval::Minute.as_str(), "minute");
    }
}
