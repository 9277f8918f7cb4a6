pub mod controller;
pub mod credentials;
pub mod presenter;

pub use controller::{RunController, RunError, RunReport};
pub use credentials::{ChainedCredentials, CredentialSource, StaticCredentials, StoredCredentials};
pub use presenter::{BrowserPresenter, PrintPresenter, ResultPresenter};
