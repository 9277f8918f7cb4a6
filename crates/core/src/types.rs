use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Username/password pair used for the login exchange.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// A run may only proceed when both fields are non-blank.
    pub fn is_complete(&self) -> bool {
        !self.username.trim().is_empty() && !self.password.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(default)]
    pub redirect_url: Option<String>,
}

#[derive(Clone, PartialEq, Eq)]
pub struct SessionCookie {
    pub value: String,
}

impl SessionCookie {
    pub const NAME: &'static str = "SESSION";

    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into() }
    }

    /// Value for the `Cookie` request header.
    pub fn header_value(&self) -> String {
        format!("{}={}", Self::NAME, self.value)
    }
}

impl fmt::Debug for SessionCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCookie")
            .field("name", &Self::NAME)
            .field("value_len", &self.value.len())
            .finish()
    }
}

/// State carried from the negotiator to the startup fetcher.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub session_id: String,
    pub client_version: String,
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("session_id_len", &self.session_id.len())
            .field("client_version", &self.client_version)
            .finish()
    }
}

/// Opaque startup blob, held in its base64 transport encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupPayload {
    encoded: String,
}

impl StartupPayload {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            encoded: STANDARD.encode(bytes),
        }
    }

    pub fn as_base64(&self) -> &str {
        &self.encoded
    }

    pub fn decode(&self) -> Result<Vec<u8>> {
        STANDARD
            .decode(&self.encoded)
            .map_err(|e| Error::Protocol(format!("invalid base64 startup payload: {}", e)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_resource_url: Option<String>,
}

impl RelayResponse {
    /// The follow-up URL, if the relay returned a non-blank one.
    pub fn follow_up_url(&self) -> Option<&str> {
        self.web_resource_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }
}

/// States of a single run. `Done` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    Negotiating,
    FetchingStartup,
    Forwarding,
    Presenting,
    Done,
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunState::Idle => "idle",
            RunState::Negotiating => "negotiating",
            RunState::FetchingStartup => "fetching startup",
            RunState::Forwarding => "forwarding",
            RunState::Presenting => "presenting",
            RunState::Done => "done",
            RunState::Failed => "failed",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_completeness() {
        assert!(Credentials::new("alice", "secret").is_complete());
        assert!(!Credentials::new("", "secret").is_complete());
        assert!(!Credentials::new("   ", "secret").is_complete());
        assert!(!Credentials::new("alice", "").is_complete());
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let dbg = format!("{:?}", Credentials::new("alice", "hunter2"));
        assert!(dbg.contains("alice"));
        assert!(!dbg.contains("hunter2"));
    }

    #[test]
    fn test_session_cookie_header() {
        assert_eq!(SessionCookie::new("abc123").header_value(), "SESSION=abc123");
    }

    #[test]
    fn test_login_response_missing_field() {
        let resp: LoginResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.redirect_url.is_none());
        let resp: LoginResponse =
            serde_json::from_str(r#"{"redirectUrl":"https://x/y"}"#).unwrap();
        assert_eq!(resp.redirect_url.as_deref(), Some("https://x/y"));
    }

    #[test]
    fn test_startup_payload_lossless() {
        let bytes = vec![0x00, 0x01, 0x02, 0xff, 0xfe, 0x80];
        let payload = StartupPayload::from_bytes(&bytes);
        assert_eq!(payload.as_base64(), "AAEC//6A");
        assert_eq!(payload.decode().unwrap(), bytes);
    }

    #[test]
    fn test_relay_response_follow_up() {
        let resp: RelayResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(resp.follow_up_url(), None);
        let resp: RelayResponse =
            serde_json::from_str(r#"{"webResourceUrl":"https://result"}"#).unwrap();
        assert_eq!(resp.follow_up_url(), Some("https://result"));
        let resp: RelayResponse = serde_json::from_str(r#"{"webResourceUrl":"  "}"#).unwrap();
        assert_eq!(resp.follow_up_url(), None);
    }

    #[test]
    fn test_run_state_display() {
        assert_eq!(RunState::FetchingStartup.to_string(), "fetching startup");
    }
}
