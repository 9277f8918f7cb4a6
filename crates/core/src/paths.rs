use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Paths {
    pub base: PathBuf,
}

impl Paths {
    pub fn new() -> Self {
        let base = dirs::home_dir()
            .map(|h| h.join(".hohstartup"))
            .unwrap_or_else(|| PathBuf::from(".hohstartup"));
        Self { base }
    }

    pub fn with_base(base: PathBuf) -> Self {
        Self { base }
    }

    pub fn config_file(&self) -> PathBuf {
        self.base.join("config.json")
    }

    pub fn credentials_file(&self) -> PathBuf {
        self.base.join("credentials.json")
    }

    pub fn history_dir(&self) -> PathBuf {
        self.base.join("history")
    }

    pub fn history_file(&self, date: &str) -> PathBuf {
        self.history_dir().join(format!("{}.jsonl", date))
    }

}

/// Writes `contents` to `path` so that only the owner can read it on Unix.
/// The file is created with mode 0600 and an existing file is narrowed to
/// 0600 before anything is written.
pub fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }

    file.write_all(contents)?;
    file.flush()
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}
