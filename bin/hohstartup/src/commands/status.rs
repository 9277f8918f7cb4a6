use hohstartup_core::{Config, Paths};
use hohstartup_runner::{CredentialSource, StaticCredentials, StoredCredentials};
use hohstartup_storage::{FileCredentialStore, HistoryLog, RunOutcome};

pub async fn run() -> anyhow::Result<()> {
    let paths = Paths::new();

    println!("hohstartup status");
    println!("=================");
    println!();

    let config_path = paths.config_file();
    println!(
        "Config:      {} {}",
        config_path.display(),
        if config_path.exists() { "✓" } else { "✗ (defaults)" }
    );
    let config = Config::load_or_default(&paths)?;

    let store = FileCredentialStore::new(&paths);
    println!(
        "Credentials: {} {}",
        store.path().display(),
        if store.path().exists() { "✓" } else { "✗ (not found)" }
    );
    println!();

    // Same order `run` resolves them in, minus command-line flags.
    let sources: [Box<dyn CredentialSource>; 3] = [
        Box::new(StaticCredentials::from_env()),
        Box::new(StaticCredentials::from_config(&config)),
        Box::new(StoredCredentials::new(store)),
    ];
    println!("Credential sources:");
    let mut active = None;
    for source in &sources {
        let status = match source.get_credentials() {
            Ok(Some(creds)) => {
                if active.is_none() {
                    active = Some((source.describe(), creds.username.clone()));
                }
                format!("✓ {}", creds.username)
            }
            Ok(None) => "✗ not set".to_string(),
            Err(e) => format!("✗ {}", e),
        };
        println!("  {:<18} {}", source.describe(), status);
    }
    println!();
    match active {
        Some((origin, username)) => println!("Runs will log in as {} (from {})", username, origin),
        None => println!("⚠ No credentials available. Run `hohstartup login` to store them."),
    }

    println!();
    println!("Network:");
    println!("  timeout:  {}s", config.network.timeout_secs);
    println!(
        "  proxy:    {}",
        match config.network.proxy.as_deref() {
            None => "(environment)",
            Some("") => "(direct)",
            Some(p) => p,
        }
    );
    println!(
        "Browser:     {}",
        if config.presenter.open_browser { "open result" } else { "print result" }
    );

    if config.history.enabled {
        let records = HistoryLog::new(paths).read_today()?;
        let failed = records
            .iter()
            .filter(|r| r.outcome == RunOutcome::Failed)
            .count();
        println!(
            "History:     {} run(s) today, {} failed",
            records.len(),
            failed
        );
    } else {
        println!("History:     disabled");
    }

    Ok(())
}
