pub mod credentials;
pub mod history;

pub use credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use history::{HistoryLog, RunOutcome, RunRecord};
