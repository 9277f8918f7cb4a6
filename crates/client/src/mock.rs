//! Recording in-memory transport for tests of the stages and the run
//! controller.

use async_trait::async_trait;
use hohstartup_core::{Endpoints, Error, Result};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::transport::{strip_query, HttpRequest, HttpResponse, HttpTransport};

enum Reply {
    Respond(HttpResponse),
    Fail(String),
}

/// Answers each URL with a scripted reply and records every request.
/// Unscripted URLs fail with a transport error.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<String, Reply>>,
    requests: Mutex<Vec<HttpRequest>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, url: &str, response: HttpResponse) -> Self {
        lock(&self.routes).insert(url.to_string(), Reply::Respond(response));
        self
    }

    pub fn fail(self, url: &str, message: &str) -> Self {
        lock(&self.routes).insert(url.to_string(), Reply::Fail(message.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        lock(&self.requests).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }

    pub fn calls_to(&self, url: &str) -> usize {
        lock(&self.requests).iter().filter(|r| r.url == url).count()
    }

    pub fn last_request_to(&self, url: &str) -> Option<HttpRequest> {
        lock(&self.requests)
            .iter()
            .rev()
            .find(|r| r.url == url)
            .cloned()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let url = request.url.clone();
        lock(&self.requests).push(request);
        match lock(&self.routes).get(&url) {
            Some(Reply::Respond(response)) => Ok(response.clone()),
            Some(Reply::Fail(message)) => Err(Error::Transport(message.clone())),
            None => Err(Error::Transport(format!(
                "no mock route for {}",
                strip_query(&url)
            ))),
        }
    }
}

/// Canned responses for one complete run. `Default` is a well-formed
/// exchange; tests tweak single fields to break one stage.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub redirect_url: String,
    pub login_body: Value,
    pub set_cookies: Vec<String>,
    pub redirect_html: String,
    pub play_body: Value,
    pub startup_status: u16,
    pub startup_bytes: Vec<u8>,
    pub relay_body: Value,
}

impl Default for Scenario {
    fn default() -> Self {
        let redirect_url = "https://x/y".to_string();
        Self {
            login_body: json!({ "redirectUrl": redirect_url }),
            redirect_url,
            set_cookies: vec!["SESSION=abc123; Path=/; HttpOnly".to_string()],
            redirect_html: r#"<html><script>const clientVersion = "9.9.9";</script></html>"#
                .to_string(),
            play_body: json!({ "sessionId": "sid-1" }),
            startup_status: 200,
            startup_bytes: vec![0x01, 0x02],
            relay_body: json!({ "webResourceUrl": "https://result" }),
        }
    }
}

impl Scenario {
    pub fn transport(&self, endpoints: &Endpoints) -> MockTransport {
        let mut redirect = HttpResponse::new(200).with_header("content-type", "text/html");
        for cookie in &self.set_cookies {
            redirect = redirect.with_header("set-cookie", cookie);
        }
        redirect = redirect.with_body(self.redirect_html.clone().into_bytes());

        MockTransport::new()
            .on(&endpoints.login, HttpResponse::json(200, &self.login_body))
            .on(&self.redirect_url, redirect)
            .on(&endpoints.account_play, HttpResponse::json(200, &self.play_body))
            .on(
                &endpoints.startup,
                HttpResponse::new(self.startup_status)
                    .with_header("content-type", "application/x-protobuf")
                    .with_body(self.startup_bytes.clone()),
            )
            .on(&endpoints.relay, HttpResponse::json(200, &self.relay_body))
    }
}
