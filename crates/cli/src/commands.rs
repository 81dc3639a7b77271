//! CLI commands

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use smartbi_core::{
    ClientConfig, FileTokenStore, NavigationGuard, Notification, NotificationLevel, Notifier,
    RouteTable, Router, TokenStore,
};
use smartbi_http::{SmartBiClient, UserInfo};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::config;

#[derive(Subcommand)]
pub enum Commands {
    /// Create an account (role `user`, display name = account)
    Register { username: String, password: String },

    /// Log in and store the session token
    Login { username: String, password: String },

    /// Show the account that owns the current session
    Whoami,

    /// Forget the stored session token
    Logout,

    /// Resolve a dashboard path through the route guard
    Navigate { path: String },

    /// List the dashboard routes
    Routes,

    /// Configuration helpers
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,

    /// Write a default configuration file
    Init {
        /// Output file path (defaults to <state_dir>/smartbi.toml)
        output: Option<PathBuf>,
    },
}

/// Prints notifications to stderr
struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, notification: Notification) {
        let label = match notification.level {
            NotificationLevel::Error => "error",
            NotificationLevel::Warning => "warning",
            NotificationLevel::Info => "info",
            NotificationLevel::Success => "ok",
        };
        eprintln!("[{label}] {}", notification.message);
    }
}

/// Session-bound collaborators shared by the network commands
struct Session {
    tokens: Arc<FileTokenStore>,
    router: Arc<Router>,
    client: SmartBiClient,
}

impl Session {
    fn open(config: &ClientConfig) -> Result<Self> {
        let tokens = Arc::new(
            FileTokenStore::open(&config.state_dir, &config.token_key)
                .context("Failed to open session store")?,
        );
        let notifier: Arc<dyn Notifier> = Arc::new(StderrNotifier);
        let guard = NavigationGuard::new(tokens.clone(), notifier.clone())
            .with_paths(&config.login_path, &config.home_path);
        let router = Arc::new(Router::new(RouteTable::smartbi(), guard));
        let client = SmartBiClient::from_config(config, tokens.clone(), notifier, router.clone())?;

        Ok(Self {
            tokens,
            router,
            client,
        })
    }
}

impl Commands {
    pub async fn execute(self, client_config: &ClientConfig) -> Result<()> {
        match self {
            Commands::Register { username, password } => {
                let session = Session::open(client_config)?;
                let response = session.client.register(&username, &password).await?;
                println!(
                    "{}",
                    response.message().unwrap_or("Registration succeeded")
                );
            }
            Commands::Login { username, password } => {
                let session = Session::open(client_config)?;
                let response = session.client.login(&username, &password).await?;
                let Some(token) = response.token() else {
                    bail!("Login response did not contain a session token");
                };
                session.tokens.write(token)?;
                info!(account = %username, "Session stored");

                match response.data_as::<UserInfo>() {
                    Ok(user) => println!("Logged in as {}", display_name(&user)),
                    Err(_) => println!("Logged in as {username}"),
                }
                let nav = session.router.push(&client_config.home_path)?;
                println!("Landing page: {} ({})", nav.location.path, nav.location.name);
            }
            Commands::Whoami => {
                let session = Session::open(client_config)?;
                if !session.tokens.is_authenticated() {
                    bail!("Not logged in");
                }
                let user: UserInfo = session.client.current_user().await?.data_as()?;
                println!("{}", serde_json::to_string_pretty(&user)?);
            }
            Commands::Logout => {
                let session = Session::open(client_config)?;
                session.client.logout()?;
                println!("Logged out");
            }
            Commands::Navigate { path } => {
                let session = Session::open(client_config)?;
                let nav = session.router.push(&path)?;
                if nav.was_redirected() {
                    println!(
                        "{} -> {} ({:?})",
                        nav.requested, nav.location.path, nav.outcome
                    );
                } else {
                    println!("{} ({})", nav.location.path, nav.location.name);
                }
            }
            Commands::Routes => {
                for route in RouteTable::smartbi().flatten() {
                    println!(
                        "{:<22} {:<18} auth={:<5} {}",
                        route.path,
                        route.name,
                        route.meta.requires_auth,
                        route.meta.title.as_deref().unwrap_or("")
                    );
                }
            }
            Commands::Config { command } => match command {
                ConfigCommands::Show => {
                    println!("{}", toml::to_string_pretty(client_config)?);
                }
                ConfigCommands::Init { output } => {
                    let path = output.unwrap_or_else(|| client_config.state_dir.join("smartbi.toml"));
                    config::generate_default_config(&path)?;
                    println!("Configuration written to {}", path.display());
                }
            },
        }

        Ok(())
    }
}

fn display_name(user: &UserInfo) -> &str {
    user.user_name
        .as_deref()
        .filter(|name| !name.is_empty())
        .unwrap_or(&user.user_account)
}
