//! Shared fixtures for the behaviour suites.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use robinhood_connect::{
    ClientConfig, HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, RobinhoodService,
    TokenSet,
};

pub const API: &str = "https://api.robinhood.com";
pub const TOKEN_URL: &str = "https://api.robinhood.com/oauth2/token/";

pub fn api_url(path: &str) -> String {
    format!("{API}{path}")
}

/// In-memory upstream. Responses queued for one method + URL are served in
/// order and the last one repeats; anything unscripted answers 404.
#[derive(Default)]
pub struct FakeUpstream {
    routes: Mutex<HashMap<(HttpMethod, String), VecDeque<Result<HttpResponse, HttpError>>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl FakeUpstream {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn get(&self, url: impl Into<String>, status: u16, body: impl Into<String>) {
        self.push(HttpMethod::Get, url.into(), Ok(HttpResponse::new(status, body)));
    }

    pub fn post(&self, url: impl Into<String>, status: u16, body: impl Into<String>) {
        self.push(HttpMethod::Post, url.into(), Ok(HttpResponse::new(status, body)));
    }

    pub fn get_fails(&self, url: impl Into<String>, error: HttpError) {
        self.push(HttpMethod::Get, url.into(), Err(error));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub fn count(&self, method: HttpMethod, url: &str) -> usize {
        self.requests()
            .iter()
            .filter(|request| request.method == method && request.url == url)
            .count()
    }

    fn push(&self, method: HttpMethod, url: String, response: Result<HttpResponse, HttpError>) {
        self.routes
            .lock()
            .expect("routes lock")
            .entry((method, url))
            .or_default()
            .push_back(response);
    }

    fn respond(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
        let mut routes = self.routes.lock().expect("routes lock");
        let Some(queue) = routes.get_mut(&(request.method, request.url.clone())) else {
            return Ok(HttpResponse::new(404, r#"{"detail":"Not found."}"#));
        };

        if queue.len() > 1 {
            queue.pop_front().expect("queued response")
        } else {
            queue.front().cloned().expect("queued response")
        }
    }
}

impl HttpClient for FakeUpstream {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let response = self.respond(&request);
        self.requests.lock().expect("requests lock").push(request);
        Box::pin(async move { response })
    }
}

pub fn service(upstream: &Arc<FakeUpstream>) -> RobinhoodService {
    RobinhoodService::with_http_client(upstream.clone(), ClientConfig::default())
}

/// Service already holding an access token and a refresh token.
pub fn signed_in_service(upstream: &Arc<FakeUpstream>) -> RobinhoodService {
    let service = service(upstream);
    service.restore_tokens(TokenSet {
        refresh_token: Some(String::from("refresh-1")),
        ..TokenSet::from_access_token("access-1")
    });
    service
}

pub fn page(results: &str, next: Option<&str>) -> String {
    match next {
        Some(next) => format!(r#"{{"results":[{results}],"next":"{next}"}}"#),
        None => format!(r#"{{"results":[{results}],"next":null}}"#),
    }
}

pub fn instrument_url(id: &str) -> String {
    api_url(&format!("/instruments/{id}/"))
}

pub fn instrument(symbol: &str, name: &str) -> String {
    format!(r#"{{"symbol":"{symbol}","simple_name":"{name}","type":"stock"}}"#)
}

pub fn quote(symbol: &str, last: &str, previous_close: &str) -> String {
    format!(
        r#"{{"symbol":"{symbol}","last_trade_price":"{last}","previous_close":"{previous_close}","bid_price":"0","ask_price":"0"}}"#
    )
}
