//! Handles settings for the application. Configuration is read from an
//! optional `settings.toml` next to the binary, then overridden by
//! `STOCKDESK__<SECTION>__<KEY>` environment variables.
//!
//! ```toml
//! [app]
//! level = "debug"
//!
//! [server]
//! port = 7251
//! database = { sqlite = "stockdesk.db" }
//! allowed_origins = ["http://localhost:3000"]
//!
//! [security]
//! bcrypt_cost = 12
//! ```
use config::{
    Config, ConfigError, Environment, File,
    builder::{ConfigBuilder, DefaultState},
};
use serde::Deserialize;

const DEFAULT_PORT: u16 = 7251;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
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

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    #[serde(default = "default_port")]
    pub port: u16,
    pub database: Database,
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct Security {
    pub bcrypt_cost: u32,
}

impl Default for Security {
    fn default() -> Self {
        Self {
            bcrypt_cost: bcrypt_default_cost(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Option<Server>,
    #[serde(default)]
    pub security: Security,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load(Config::builder().add_source(File::with_name("settings").required(false)))
    }

    fn load(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder
            .add_source(
                Environment::with_prefix("STOCKDESK")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("server.allowed_origins"),
            )
            .build()?
            .try_deserialize()
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_allowed_origins() -> Vec<String> {
    [
        "http://localhost:3000",
        "https://localhost:3000",
        "http://localhost:7251",
        "https://localhost:7251",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn bcrypt_default_cost() -> u32 {
    engine::BcryptHasher::default().cost()
}
