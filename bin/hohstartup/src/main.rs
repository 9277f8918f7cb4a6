mod commands;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use hohstartup_core::{Config, Paths};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "hohstartup")]
#[command(about = "Log in to Heroes of History and hand the startup data to the web companion", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in, fetch startup data and forward it
    Run {
        /// Account username (overrides env, config and stored credentials)
        #[arg(short, long)]
        username: Option<String>,

        /// Account password
        #[arg(short, long)]
        password: Option<String>,

        /// Print the result URL instead of opening a browser
        #[arg(long)]
        no_browser: bool,
    },

    /// Store credentials for later runs
    Login {
        /// Username (prompted if omitted)
        #[arg(short, long)]
        username: Option<String>,
    },

    /// Remove stored credentials
    Logout,

    /// Show configuration and credential status
    Status,

    /// Show run history
    History {
        /// Day to show (YYYY-MM-DD, default today)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the whole configuration
    Show,
    /// Get a config value by dot-separated key (e.g. network.timeoutSecs)
    Get {
        /// Config key path
        key: String,
    },
    /// Set a config value by dot-separated key
    Set {
        /// Config key path
        key: String,
        /// Value to set (auto-detects JSON types)
        value: String,
    },
}

fn log_filter(verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new("debug");
    }
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let level = Config::load_or_default(&Paths::new())
        .map(|c| c.log_level)
        .unwrap_or_else(|_| "info".to_string());
    EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("info"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(log_filter(cli.verbose))
        .init();

    match cli.command {
        Commands::Run {
            username,
            password,
            no_browser,
        } => {
            commands::run_cmd::run(username, password, no_browser).await?;
        }
        Commands::Login { username } => {
            commands::credentials_cmd::login(username).await?;
        }
        Commands::Logout => {
            commands::credentials_cmd::logout().await?;
        }
        Commands::Status => {
            commands::status::run().await?;
        }
        Commands::History { date } => {
            commands::history_cmd::show(date).await?;
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                commands::config_cmd::show().await?;
            }
            ConfigCommands::Get { key } => {
                commands::config_cmd::get(&key).await?;
            }
            ConfigCommands::Set { key, value } => {
                commands::config_cmd::set(&key, &value).await?;
            }
        },
        Commands::Completions { shell } => {
            commands::completions_cmd::run(shell, Cli::command()).await?;
        }
    }

    Ok(())
}
