//! Per-stage request headers.
//!
//! Every stage gets its header set from one of the pure builders below. A
//! request carries exactly these headers and nothing else.

use hohstartup_core::{SessionContext, SessionCookie};

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const PROTOBUF_CONTENT_TYPE: &str = "application/x-protobuf";

/// Ordered header list with case-insensitive lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.0.push((name.to_string(), value.into()));
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Login and relay requests.
pub fn json_headers() -> Headers {
    Headers::new().with("Content-Type", JSON_CONTENT_TYPE)
}

/// Redirect request: no headers of our own.
pub fn redirect_headers() -> Headers {
    Headers::new()
}

/// Account-play request: JSON content type plus the session cookie.
pub fn play_headers(cookie: &SessionCookie) -> Headers {
    Headers::new()
        .with("Content-Type", JSON_CONTENT_TYPE)
        .with("Cookie", cookie.header_value())
}

/// Startup request, bound to the negotiated session.
pub fn startup_headers(context: &SessionContext, request_id: &str) -> Headers {
    Headers::new()
        .with("X-AUTH-TOKEN", context.session_id.as_str())
        .with("X-Request-Id", request_id)
        .with("X-Platform", "browser")
        .with("X-ClientVersion", context.client_version.as_str())
        .with("Accept-Encoding", "gzip")
        .with("Accept", PROTOBUF_CONTENT_TYPE)
        .with("Content-Type", PROTOBUF_CONTENT_TYPE)
}
