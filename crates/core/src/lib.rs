pub mod config;
pub mod endpoints;
pub mod error;
pub mod paths;
pub mod types;

pub use config::Config;
pub use endpoints::Endpoints;
pub use error::{Error, ErrorKind, Result};
pub use paths::{write_private, Paths};
pub use types::{
    Credentials, LoginResponse, RelayResponse, RunState, SessionContext, SessionCookie,
    StartupPayload,
};
