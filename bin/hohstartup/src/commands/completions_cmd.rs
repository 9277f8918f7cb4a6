use clap_complete::{generate, Shell};

const BIN_NAME: &str = "hohstartup";

/// Where a completion script for `shell` is usually installed.
fn install_hint(shell: Shell) -> Option<String> {
    match shell {
        Shell::Bash => Some(format!(
            "{bin} completions bash > ~/.local/share/bash-completion/completions/{bin}",
            bin = BIN_NAME
        )),
        Shell::Zsh => Some(format!(
            "{bin} completions zsh > ~/.zfunc/_{bin}  (with ~/.zfunc on fpath)",
            bin = BIN_NAME
        )),
        Shell::Fish => Some(format!(
            "{bin} completions fish > ~/.config/fish/completions/{bin}.fish",
            bin = BIN_NAME
        )),
        _ => None,
    }
}

/// Write the completion script for `shell` to stdout and an install hint to
/// stderr.
pub async fn run(shell: Shell, mut cmd: clap::Command) -> anyhow::Result<()> {
    generate(shell, &mut cmd, BIN_NAME, &mut std::io::stdout());

    if let Some(hint) = install_hint(shell) {
        eprintln!();
        eprintln!("# Install with: {}", hint);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_hint() {
        assert!(install_hint(Shell::Bash)
            .unwrap()
            .contains("bash-completion/completions/hohstartup"));
        assert!(install_hint(Shell::Fish).unwrap().ends_with("hohstartup.fish"));
        assert_eq!(install_hint(Shell::Elvish), None);
    }
}
