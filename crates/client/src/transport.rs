use async_trait::async_trait;
use flate2::read::GzDecoder;
use hohstartup_core::config::NetworkConfig;
use hohstartup_core::{Error, Result};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::io::Read;
use tracing::{debug, warn};

use crate::client::build_http_client;
use crate::extract::parse_set_cookie;
use crate::headers::Headers;

/// Longest body excerpt kept in error messages.
const ERROR_BODY_LIMIT: usize = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => f.write_str("GET"),
            Method::Post => f.write_str("POST"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Headers,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn get(url: &str, headers: Headers) -> Self {
        Self {
            method: Method::Get,
            url: url.to_string(),
            headers,
            body: None,
        }
    }

    pub fn post(url: &str, headers: Headers, body: Option<Vec<u8>>) -> Self {
        Self {
            method: Method::Post,
            url: url.to_string(),
            headers,
            body,
        }
    }

    pub fn post_json(url: &str, headers: Headers, body: &Value) -> Result<Self> {
        Ok(Self::post(url, headers, Some(serde_json::to_vec(body)?)))
    }

    /// Request body parsed as JSON, if it is JSON.
    pub fn json_body(&self) -> Option<Value> {
        self.body
            .as_deref()
            .and_then(|b| serde_json::from_slice(b).ok())
    }
}

#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u16,
    /// Header names are lowercase; repeated headers appear once per value.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    pub fn json(status: u16, body: &Value) -> Self {
        Self::new(status)
            .with_header("content-type", "application/json")
            .with_body(body.to_string().into_bytes())
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .push((name.to_ascii_lowercase(), value.to_string()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json_body<T: DeserializeOwned>(&self, what: &str) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| {
            Error::Protocol(format!(
                "invalid {} response: {}. Body: {}",
                what,
                e,
                excerpt(&self.text())
            ))
        })
    }

    /// Turns a non-2xx status into a transport error naming `what`.
    pub fn error_for_status(self, what: &str) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }
        Err(Error::Transport(format!(
            "{} returned HTTP {}: {}",
            what,
            self.status,
            excerpt(&self.text())
        )))
    }
}

fn excerpt(text: &str) -> &str {
    if text.len() <= ERROR_BODY_LIMIT {
        return text;
    }
    let mut end = ERROR_BODY_LIMIT;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// The single seam between the stages and the network.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// Undo a gzip content encoding the HTTP client left in place.
pub fn decode_body(headers: &[(String, String)], body: Vec<u8>) -> Result<Vec<u8>> {
    let gzipped = headers.iter().any(|(k, v)| {
        k.eq_ignore_ascii_case("content-encoding") && v.trim().eq_ignore_ascii_case("gzip")
    });
    if !gzipped || body.is_empty() {
        return Ok(body);
    }
    let mut decoded = Vec::new();
    GzDecoder::new(body.as_slice())
        .read_to_end(&mut decoded)
        .map_err(|e| Error::Transport(format!("failed to decode gzip body: {}", e)))?;
    Ok(decoded)
}

/// Most redirects followed for one request.
const MAX_REDIRECTS: usize = 10;

/// `url` without its query string or fragment, for logs and error messages.
/// Redirect URLs carry one-time login tokens in the query.
pub fn strip_query(url: &str) -> &str {
    url.split(['?', '#']).next().unwrap_or(url)
}

/// Where a redirect response points, resolved against the URL that produced
/// it. `None` when the response is not a followable redirect.
fn redirect_target(current: &Url, response: &HttpResponse) -> Result<Option<Url>> {
    if !matches!(response.status, 301 | 302 | 303 | 307 | 308) {
        return Ok(None);
    }
    let Some(location) = response.header("location") else {
        return Ok(None);
    };
    current.join(location).map(Some).map_err(|e| {
        Error::Transport(format!(
            "invalid redirect location from {}: {}",
            strip_query(current.as_str()),
            e
        ))
    })
}

/// 307/308 repeat the request as is; the other redirects continue as GET
/// without a body.
fn follows_as_get(status: u16) -> bool {
    !matches!(status, 307 | 308)
}

/// Cookies set along one redirect chain, replayed to the host that set them.
#[derive(Default)]
struct RedirectCookies {
    set_cookie_headers: Vec<(String, String)>,
    jar: Vec<(String, String, String)>,
}

impl RedirectCookies {
    fn absorb(&mut self, host: &str, response: &HttpResponse) {
        for value in response.header_values("set-cookie") {
            self.set_cookie_headers
                .push(("set-cookie".to_string(), value.to_string()));
            if let Some((name, cookie)) = parse_set_cookie(value) {
                self.jar.retain(|(h, n, _)| !(h == host && *n == name));
                self.jar.push((host.to_string(), name, cookie));
            }
        }
    }

    fn cookie_header(&self, host: &str) -> Option<String> {
        let pairs: Vec<String> = self
            .jar
            .iter()
            .filter(|(h, _, _)| h == host)
            .map(|(_, n, v)| format!("{}={}", n, v))
            .collect();
        (!pairs.is_empty()).then(|| pairs.join("; "))
    }
}

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(network: &NetworkConfig) -> Result<Self> {
        Ok(Self {
            client: build_http_client(network)?,
        })
    }

    async fn send_once(
        &self,
        method: Method,
        url: &Url,
        headers: &Headers,
        cookies: Option<String>,
        body: Option<Vec<u8>>,
    ) -> Result<HttpResponse> {
        let shown = strip_query(url.as_str());
        let reqwest_method = match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        };

        let mut builder = self.client.request(reqwest_method, url.clone());
        for (name, value) in headers.iter() {
            builder = builder.header(name, value);
        }
        if let Some(cookies) = cookies {
            builder = builder.header("Cookie", cookies);
        }
        if let Some(body) = body {
            builder = builder.body(body);
        }

        debug!(method = %method, url = %shown, "Sending request");

        let response = builder.send().await.map_err(|e| {
            let reason = if e.is_timeout() { "timed out" } else { "failed" };
            let e = e.without_url();
            warn!(url = %shown, error = %e, "Request {}", reason);
            Error::Transport(format!("{} {} {}: {}", method, shown, reason, e))
        })?;

        let status = response.status().as_u16();
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .filter_map(|(k, v)| {
                v.to_str()
                    .ok()
                    .map(|v| (k.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();

        let bytes = response.bytes().await.map_err(|e| {
            Error::Transport(format!(
                "failed to read response body from {}: {}",
                shown,
                e.without_url()
            ))
        })?;
        let body = decode_body(&headers, bytes.to_vec())?;

        debug!(status, body_len = body.len(), url = %shown, "Received response");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    /// Follows redirects itself so that `Set-Cookie` headers from every hop
    /// reach the caller. Earlier hops' cookies come first in the returned
    /// headers and are sent on to later hops on the same host.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut url = Url::parse(&request.url).map_err(|e| {
            Error::Transport(format!("invalid URL {}: {}", strip_query(&request.url), e))
        })?;
        let mut method = request.method;
        let mut body = request.body;
        let mut cookies = RedirectCookies::default();

        for _ in 0..=MAX_REDIRECTS {
            let host = url.host_str().unwrap_or_default().to_string();
            let response = self
                .send_once(
                    method,
                    &url,
                    &request.headers,
                    cookies.cookie_header(&host),
                    body.clone(),
                )
                .await?;

            let Some(next) = redirect_target(&url, &response)? else {
                let mut headers = cookies.set_cookie_headers;
                headers.extend(response.headers);
                return Ok(HttpResponse {
                    status: response.status,
                    headers,
                    body: response.body,
                });
            };

            cookies.absorb(&host, &response);
            debug!(status = response.status, to = %strip_query(next.as_str()), "Following redirect");
            if follows_as_get(response.status) {
                method = Method::Get;
                body = None;
            }
            url = next;
        }

        Err(Error::Transport(format!(
            "too many redirects from {}",
            strip_query(&request.url)
        )))
    }
}
