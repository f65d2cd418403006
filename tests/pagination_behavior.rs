//! Behaviour tests for cursor pagination over the upstream's envelope shape.

mod common;

use std::sync::Arc;

use common::{api_url, page, FakeUpstream};
use robinhood_connect::{
    ApiError, ClientConfig, HttpMethod, RobinhoodApi, RobinhoodClient, TokenSet,
};

fn api(upstream: &Arc<FakeUpstream>) -> RobinhoodApi {
    let client = RobinhoodClient::with_http_client(upstream.clone(), ClientConfig::default());
    client.tokens().restore(TokenSet::from_access_token("access-1"));
    RobinhoodApi::new(client)
}

#[tokio::test]
async fn when_orders_span_three_pages_all_are_returned_in_order() {
    // Given: Three pages of orders with 2, 1 and 2 entries
    let upstream = FakeUpstream::new();
    let second = api_url("/orders/?cursor=p2");
    let third = api_url("/orders/?cursor=p3");
    upstream.get(
        api_url("/orders/"),
        200,
        page(r#"{"id":"o1"},{"id":"o2"}"#, Some(second.as_str())),
    );
    upstream.get(&second, 200, page(r#"{"id":"o3"}"#, Some(third.as_str())));
    upstream.get(&third, 200, page(r#"{"id":"o4"},{"id":"o5"}"#, None));

    // When: The orders are fetched
    let orders = api(&upstream).get_orders().await.expect("orders");

    // Then: Five orders in upstream order from exactly three requests
    let ids: Vec<_> = orders.iter().filter_map(|order| order.id.as_deref()).collect();
    assert_eq!(ids, ["o1", "o2", "o3", "o4", "o5"]);
    assert_eq!(upstream.requests().len(), 3);
}

#[tokio::test]
async fn when_last_page_has_empty_next_pagination_stops() {
    // Given: A single page whose next link is an empty string
    let upstream = FakeUpstream::new();
    upstream.get(
        api_url("/dividends/"),
        200,
        r#"{"results":[{"id":"d1","amount":"1.00"}],"next":""}"#,
    );

    // When: Dividends are fetched
    let dividends = api(&upstream).get_dividends().await.expect("dividends");

    // Then: One request, one dividend
    assert_eq!(dividends.len(), 1);
    assert_eq!(upstream.requests().len(), 1);
}

#[tokio::test]
async fn when_endpoint_returns_bare_array_it_is_used_as_is() {
    // Given: A watchlist endpoint answering with a plain array
    let upstream = FakeUpstream::new();
    upstream.get(
        api_url("/watchlists/"),
        200,
        r#"[{"name":"Default"},{"name":"Tech"}]"#,
    );

    // When: Watchlists are fetched
    let watchlists = api(&upstream).get_watchlists().await.expect("watchlists");

    // Then: Both entries are returned
    let names: Vec<_> = watchlists
        .iter()
        .filter_map(|watchlist| watchlist.name.as_deref())
        .collect();
    assert_eq!(names, ["Default", "Tech"]);
}

#[tokio::test]
async fn when_endpoint_returns_single_object_it_becomes_one_element() {
    // Given: An accounts endpoint answering with one bare object
    let upstream = FakeUpstream::new();
    upstream.get(api_url("/accounts/"), 200, r#"{"account_number":"5RY1"}"#);

    // When: Accounts are fetched
    let accounts = api(&upstream).get_accounts().await.expect("accounts");

    // Then: The object is wrapped into a one-element list
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].account_number.as_deref(), Some("5RY1"));
}

#[tokio::test]
async fn when_a_middle_page_fails_the_whole_listing_fails() {
    // Given: A first page pointing at a page that errors
    let upstream = FakeUpstream::new();
    let broken = api_url("/positions/?nonzero=true&cursor=p2");
    upstream.get(
        api_url("/positions/?nonzero=true"),
        200,
        page(r#"{"quantity":"1"}"#, Some(broken.as_str())),
    );
    upstream.get(&broken, 503, "unavailable");

    // When: Positions are fetched
    let error = api(&upstream).get_positions().await.expect_err("must fail");

    // Then: The page error is surfaced rather than a partial list
    assert!(matches!(error, ApiError::Status { status: 503, .. }));
    assert_eq!(upstream.count(HttpMethod::Get, &broken), 1);
}

#[tokio::test]
async fn when_next_link_is_absolute_it_is_followed_verbatim() {
    // Given: A crypto page linking to another absolute URL on the crypto host
    let upstream = FakeUpstream::new();
    let next = "https://nummus.robinhood.com/holdings/?cursor=p2";
    upstream.get(
        "https://nummus.robinhood.com/holdings/",
        200,
        page(r#"{"id":"h1","currency":{"code":"BTC"}}"#, Some(next)),
    );
    upstream.get(
        next,
        200,
        page(r#"{"id":"h2","currency":{"code":"ETH"}}"#, None),
    );

    // When: Crypto holdings are fetched
    let holdings = api(&upstream).get_crypto_holdings().await.expect("holdings");

    // Then: Both pages are read from the crypto host
    let codes: Vec<_> = holdings
        .iter()
        .filter_map(|holding| holding.currency.code.as_deref())
        .collect();
    assert_eq!(codes, ["BTC", "ETH"]);
    assert!(upstream
        .requests()
        .iter()
        .all(|request| request.url.starts_with("https://nummus.robinhood.com/")));
}
