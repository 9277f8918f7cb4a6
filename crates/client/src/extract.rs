//! Parsing of the redirect response: the session cookie and the client
//! version embedded in the page.

use hohstartup_core::{Error, Result, SessionCookie};
use once_cell::sync::Lazy;
use regex::Regex;

static CLIENT_VERSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"const\s+clientVersion\s*=\s*"([^"]+)""#).expect("valid client version regex")
});

/// First `const clientVersion = "<value>"` assignment in `html`.
pub fn extract_client_version(html: &str) -> Result<String> {
    CLIENT_VERSION_RE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| Error::Protocol("client version not found".to_string()))
}

/// Splits a `Set-Cookie` header value into its name and value, ignoring
/// attributes.
pub fn parse_set_cookie(header: &str) -> Option<(String, String)> {
    let pair = header.split(';').next()?.trim();
    let (name, value) = pair.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    let value = value.trim().trim_matches('"');
    Some((name.to_string(), value.to_string()))
}

/// The cookie named exactly `SESSION`. Headers are in the order they were
/// received, so a later value replaces an earlier one.
pub fn find_session_cookie<'a, I>(set_cookie_headers: I) -> Result<SessionCookie>
where
    I: IntoIterator<Item = &'a str>,
{
    set_cookie_headers
        .into_iter()
        .filter_map(parse_set_cookie)
        .filter(|(name, _)| name == SessionCookie::NAME)
        .last()
        .map(|(_, value)| SessionCookie::new(value))
        .ok_or_else(|| Error::Authentication("session cookie not found".to_string()))
}
