use hohstartup_client::{ReqwestTransport, UuidRequestIds};
use hohstartup_core::config::{PASSWORD_ENV, USERNAME_ENV};
use hohstartup_core::{Config, Credentials, Endpoints, ErrorKind, Paths};
use hohstartup_runner::{
    BrowserPresenter, ChainedCredentials, PrintPresenter, ResultPresenter, RunController,
    StaticCredentials, StoredCredentials,
};
use hohstartup_storage::{FileCredentialStore, HistoryLog};
use std::sync::Arc;
use tracing::info;

/// Credential lookup order: flags, environment, config file, stored credentials.
pub fn credential_chain(
    paths: &Paths,
    config: &Config,
    username: Option<String>,
    password: Option<String>,
) -> ChainedCredentials {
    chain_with_env(paths, config, username, password, StaticCredentials::from_env())
}

fn chain_with_env(
    paths: &Paths,
    config: &Config,
    username: Option<String>,
    password: Option<String>,
    env: StaticCredentials,
) -> ChainedCredentials {
    let flags = match (username, password) {
        (Some(u), Some(p)) => Some(Credentials::new(u, p)),
        _ => None,
    };
    ChainedCredentials::new()
        .then(StaticCredentials::new(flags, "command line"))
        .then(env)
        .then(StaticCredentials::from_config(config))
        .then(StoredCredentials::new(FileCredentialStore::new(paths)))
}

pub async fn run(
    username: Option<String>,
    password: Option<String>,
    no_browser: bool,
) -> anyhow::Result<()> {
    let paths = Paths::new();
    let config = Config::load_or_default(&paths)?;

    let credentials = credential_chain(&paths, &config, username, password);
    let transport = Arc::new(ReqwestTransport::new(&config.network)?);
    let presenter: Box<dyn ResultPresenter> = if no_browser || !config.presenter.open_browser {
        Box::new(PrintPresenter)
    } else {
        Box::new(BrowserPresenter)
    };

    let mut controller = RunController::new(
        Box::new(credentials),
        transport,
        Endpoints::default(),
        Arc::new(UuidRequestIds),
        presenter,
    );
    if config.history.enabled {
        controller = controller.with_history(HistoryLog::new(paths.clone()));
    }

    match controller.run().await {
        Ok(report) => {
            match report.web_resource_url {
                Some(url) => info!(url = %url, "Run finished"),
                None => println!("Done. The relay returned no resource to open."),
            }
            Ok(())
        }
        Err(e) => {
            if e.source.kind() == ErrorKind::CredentialsMissing {
                eprintln!("No username/password available. Provide them with one of:");
                eprintln!("  hohstartup run --username <name> --password <password>");
                eprintln!("  {}=<name> {}=<password> hohstartup run", USERNAME_ENV, PASSWORD_ENV);
                eprintln!("  hohstartup config set username <name> (and password)");
                eprintln!("  hohstartup login");
            }
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hohstartup_runner::CredentialSource;
    use hohstartup_storage::credentials::{PASSWORD_KEY, USERNAME_KEY};
    use hohstartup_storage::CredentialStore;
    use tempfile::TempDir;

    #[test]
    fn test_flags_win_over_config() {
        let temp_dir = TempDir::new().unwrap();
        let paths = Paths::with_base(temp_dir.path().to_path_buf());
        let config = Config {
            username: Some("configured".to_string()),
            password: Some("pw".to_string()),
            ..Config::default()
        };
        let chain = credential_chain(
            &paths,
            &config,
            Some("flagged".to_string()),
            Some("pw".to_string()),
        );
        assert_eq!(
            chain.get_credentials().unwrap().map(|c| c.username),
            Some("flagged".to_string())
        );
    }

    #[test]
    fn test_store_is_last_resort() {
        let temp_dir = TempDir::new().unwrap();
        let paths = Paths::with_base(temp_dir.path().to_path_buf());
        let store = FileCredentialStore::new(&paths);
        store.set(USERNAME_KEY, "stored").unwrap();
        store.set(PASSWORD_KEY, "pw").unwrap();

        // A lone username flag is not a complete credential.
        let chain = chain_with_env(
            &paths,
            &Config::default(),
            Some("half".to_string()),
            None,
            StaticCredentials::new(None, "environment"),
        );
        assert_eq!(
            chain.get_credentials().unwrap().map(|c| c.username),
            Some("stored".to_string())
        );
    }

    #[test]
    fn test_env_wins_over_config() {
        let temp_dir = TempDir::new().unwrap();
        let paths = Paths::with_base(temp_dir.path().to_path_buf());
        let config = Config {
            username: Some("configured".to_string()),
            password: Some("pw".to_string()),
            ..Config::default()
        };
        let chain = chain_with_env(
            &paths,
            &config,
            None,
            None,
            StaticCredentials::new(Some(Credentials::new("from-env", "pw")), "environment"),
        );
        assert_eq!(
            chain.get_credentials().unwrap().map(|c| c.username),
            Some("from-env".to_string())
        );
    }
}
