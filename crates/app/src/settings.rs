//! Handles settings for the server. Configuration is read from an optional
//! `settings.toml` and from `COUNTDOWN__*` environment variables, e.g.
//! `COUNTDOWN__SERVER__PORT=8080`.
//!
//! ```toml
//! [app]
//! level = "info"
//!
//! [server]
//! port = 3000
//! bind = "0.0.0.0"
//! database = { sqlite = "countdown.db" }
//!
//! [countdown]
//! enabled = true
//! max_projects_per_user = 50
//! ```

use config::{Config, ConfigBuilder, ConfigError, Environment, File, builder::DefaultState};
use serde::Deserialize;

use server::CountdownConfig;

const SETTINGS_FILE: &str = "settings";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Server {
    pub port: u16,
    pub bind: Option<String>,
    pub database: Database,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            port: 3000,
            bind: None,
            database: Database::Sqlite("countdown.db".to_string()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub countdown: CountdownConfig,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::build(
            Config::builder()
                .add_source(File::with_name(SETTINGS_FILE).required(false))
                .add_source(
                    Environment::with_prefix("COUNTDOWN")
                        .separator("__")
                        .try_parsing(true),
                ),
        )
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder.build()?.try_deserialize()
    }
}
