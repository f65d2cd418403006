//! URL templates for the upstream REST API, relative to the configured base
//! URL unless absolute.

pub const TOKEN: &str = "/oauth2/token/";
pub const ACCOUNTS: &str = "/accounts/";
pub const POSITIONS_NONZERO: &str = "/positions/?nonzero=true";
pub const ORDERS: &str = "/orders/";
pub const DIVIDENDS: &str = "/dividends/";
pub const WATCHLISTS: &str = "/watchlists/";
pub const CRYPTO_HOLDINGS: &str = "https://nummus.robinhood.com/holdings/";

pub fn portfolio(account_number: &str) -> String {
    format!("/portfolios/{}/", urlencoding::encode(account_number))
}

pub fn instruments_by_symbol(symbol: &str) -> String {
    format!("/instruments/?symbol={}", urlencoding::encode(symbol))
}

pub fn quote(symbol: &str) -> String {
    format!("/quotes/{}/", urlencoding::encode(symbol))
}

pub fn quotes(symbols: &[String]) -> String {
    let joined = symbols
        .iter()
        .map(|symbol| symbol.as_str())
        .collect::<Vec<_>>()
        .join(",");
    format!("/quotes/?symbols={}", urlencoding::encode(&joined))
}

pub fn historicals(symbol: &str, interval: &str, span: &str, bounds: &str) -> String {
    format!(
        "/quotes/historicals/{}/?interval={}&span={}&bounds={}",
        urlencoding::encode(symbol),
        urlencoding::encode(interval),
        urlencoding::encode(span),
        urlencoding::encode(bounds),
    )
}

pub fn watchlist_items(name: &str) -> String {
    format!("/watchlists/{}/", urlencoding::encode(name))
}
