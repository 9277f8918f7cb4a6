use hohstartup_core::{Config, Credentials, Result};
use hohstartup_storage::credentials::{PASSWORD_KEY, USERNAME_KEY};
use hohstartup_storage::CredentialStore;
use tracing::debug;

/// Where a run gets its username/password. `Ok(None)` means nothing is
/// available, and the run must stop before touching the network.
pub trait CredentialSource: Send + Sync {
    fn get_credentials(&self) -> Result<Option<Credentials>>;

    fn describe(&self) -> &'static str;
}

/// Fixed credentials from flags, environment or the config file.
pub struct StaticCredentials {
    credentials: Option<Credentials>,
    origin: &'static str,
}

impl StaticCredentials {
    pub fn new(credentials: Option<Credentials>, origin: &'static str) -> Self {
        Self {
            credentials: credentials.filter(Credentials::is_complete),
            origin,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.credentials(), "config file")
    }

    pub fn from_env() -> Self {
        Self::new(Config::env_credentials(), "environment")
    }
}

impl CredentialSource for StaticCredentials {
    fn get_credentials(&self) -> Result<Option<Credentials>> {
        Ok(self.credentials.clone())
    }

    fn describe(&self) -> &'static str {
        self.origin
    }
}

/// Credentials saved in a [`CredentialStore`] under `username`/`password`.
pub struct StoredCredentials<S> {
    store: S,
}

impl<S: CredentialStore> StoredCredentials<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn save(&self, credentials: &Credentials) -> Result<()> {
        self.store.set(USERNAME_KEY, &credentials.username)?;
        self.store.set(PASSWORD_KEY, &credentials.password)
    }

    pub fn clear(&self) -> Result<()> {
        self.store.remove(USERNAME_KEY)?;
        self.store.remove(PASSWORD_KEY)
    }
}

impl<S: CredentialStore> CredentialSource for StoredCredentials<S> {
    fn get_credentials(&self) -> Result<Option<Credentials>> {
        let username = self.store.get(USERNAME_KEY)?;
        let password = self.store.get(PASSWORD_KEY)?;
        Ok(match (username, password) {
            (Some(u), Some(p)) => Some(Credentials::new(u, p)).filter(Credentials::is_complete),
            _ => None,
        })
    }

    fn describe(&self) -> &'static str {
        "credential store"
    }
}

/// First source that yields credentials wins.
#[derive(Default)]
pub struct ChainedCredentials {
    sources: Vec<Box<dyn CredentialSource>>,
}

impl ChainedCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, source: impl CredentialSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }
}

impl CredentialSource for ChainedCredentials {
    fn get_credentials(&self) -> Result<Option<Credentials>> {
        for source in &self.sources {
            if let Some(creds) = source.get_credentials()? {
                debug!(source = source.describe(), "Credentials resolved");
                return Ok(Some(creds));
            }
        }
        Ok(None)
    }

    fn describe(&self) -> &'static str {
        "chained sources"
    }
}
