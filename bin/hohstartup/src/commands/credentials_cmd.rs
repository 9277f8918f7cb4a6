use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use hohstartup_core::{Credentials, Paths};
use hohstartup_runner::StoredCredentials;
use hohstartup_storage::FileCredentialStore;
use std::io::{BufRead, IsTerminal, Write};

fn prompt(label: &str) -> anyhow::Result<String> {
    print!("{}: ", label);
    std::io::stdout().flush()?;
    let mut input = String::new();
    std::io::stdin().lock().read_line(&mut input)?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}

/// Like [`prompt`] but without echoing what is typed. Piped input is read
/// as a plain line.
fn prompt_hidden(label: &str) -> anyhow::Result<String> {
    if !std::io::stdin().is_terminal() {
        return prompt(label);
    }

    print!("{}: ", label);
    std::io::stdout().flush()?;

    terminal::enable_raw_mode()?;
    let result = read_hidden_line();
    terminal::disable_raw_mode()?;
    println!();
    result
}

fn read_hidden_line() -> anyhow::Result<String> {
    let mut input = String::new();
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind == KeyEventKind::Release {
            continue;
        }
        match key.code {
            KeyCode::Enter => return Ok(input),
            KeyCode::Backspace => {
                input.pop();
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                anyhow::bail!("Cancelled")
            }
            KeyCode::Char(c) => input.push(c),
            _ => {}
        }
    }
}

/// Prompt for credentials and save them to the credential store.
pub async fn login(username: Option<String>) -> anyhow::Result<()> {
    let username = match username {
        Some(u) => u,
        None => prompt("Username")?,
    };
    let password = prompt_hidden("Password")?;

    let credentials = Credentials::new(username, password);
    if !credentials.is_complete() {
        anyhow::bail!("Username and password must both be non-empty");
    }

    let paths = Paths::new();
    let store = FileCredentialStore::new(&paths);
    let location = store.path().display().to_string();
    StoredCredentials::new(store).save(&credentials)?;

    println!("✓ Credentials for {} saved to {}", credentials.username, location);
    Ok(())
}

pub async fn logout() -> anyhow::Result<()> {
    let paths = Paths::new();
    StoredCredentials::new(FileCredentialStore::new(&paths)).clear()?;
    println!("✓ Stored credentials removed");
    Ok(())
}
