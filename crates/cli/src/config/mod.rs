use clap::Parser;
use serde::Deserialize;

use crate::{
    app::Command,
    error::{AppError, Result},
};

const DEFAULT_CONFIG_PATH: &str = "config/countdown.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub username: String,
    /// Only ever set through `COUNTDOWN_CLI_PASSWORD`.
    #[serde(skip_deserializing)]
    pub password: Option<String>,
    /// Overrides the limit announced by the server.
    pub max_projects: Option<usize>,
    pub color: bool,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
            username: String::new(),
            password: None,
            max_projects: None,
            color: true,
            log_level: "warn".to_string(),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "countdown", about = "Deadline countdown for your projects")]
pub struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override base URL (e.g. http://127.0.0.1:3000).
    #[arg(long)]
    base_url: Option<String>,
    /// Override username (password is never read from CLI).
    #[arg(long)]
    username: Option<String>,
    /// Override the maximum number of projects.
    #[arg(long)]
    max_projects: Option<usize>,
    /// Print without colors.
    #[arg(long)]
    no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

pub fn load() -> Result<(AppConfig, Command)> {
    let args = Args::parse();
    let password = std::env::var("COUNTDOWN_CLI_PASSWORD").ok();
    load_from(args, password)
}

fn load_from(args: Args, password: Option<String>) -> Result<(AppConfig, Command)> {
    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(
        config::Environment::with_prefix("COUNTDOWN_CLI")
            .try_parsing(true)
            .ignore_empty(true),
    );
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(base_url) = args.base_url {
        settings.base_url = base_url;
    }
    if let Some(username) = args.username {
        settings.username = username;
    }
    if let Some(max_projects) = args.max_projects {
        settings.max_projects = Some(max_projects);
    }
    if args.no_color {
        settings.color = false;
    }
    settings.password = password.filter(|password| !password.is_empty());

    if settings.username.is_empty() {
        return Err(AppError::Usage(
            "no username, pass --username or set COUNTDOWN_CLI_USERNAME".to_string(),
        ));
    }

    Ok((settings, args.command))
}
