use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Credentials missing: {0}")]
    CredentialsMissing(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Presenter error: {0}")]
    Presenter(String),
}

/// Coarse classification of an [`Error`], stable across releases so it can be
/// persisted in run history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    CredentialsMissing,
    Protocol,
    Authentication,
    Transport,
    Config,
    Io,
    Json,
    Storage,
    Presenter,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::CredentialsMissing(_) => ErrorKind::CredentialsMissing,
            Error::Protocol(_) => ErrorKind::Protocol,
            Error::Authentication(_) => ErrorKind::Authentication,
            Error::Transport(_) => ErrorKind::Transport,
            Error::Config(_) => ErrorKind::Config,
            Error::Io(_) => ErrorKind::Io,
            Error::Json(_) => ErrorKind::Json,
            Error::Storage(_) => ErrorKind::Storage,
            Error::Presenter(_) => ErrorKind::Presenter,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::CredentialsMissing => "credentials_missing",
            ErrorKind::Protocol => "protocol",
            ErrorKind::Authentication => "authentication",
            ErrorKind::Transport => "transport",
            ErrorKind::Config => "config",
            ErrorKind::Io => "io",
            ErrorKind::Json => "json",
            ErrorKind::Storage => "storage",
            ErrorKind::Presenter => "presenter",
        };
        f.write_str(s)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(
            Error::Protocol("missing sessionId".into()).kind(),
            ErrorKind::Protocol
        );
        assert_eq!(
            Error::Authentication("session cookie not found".into()).kind(),
            ErrorKind::Authentication
        );
        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        assert_eq!(Error::from(io).kind(), ErrorKind::Io);
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::CredentialsMissing).unwrap();
        assert_eq!(json, "\"credentials_missing\"");
        assert_eq!(ErrorKind::Transport.to_string(), "transport");
    }
}
