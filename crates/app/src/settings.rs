//! Handles settings for the application.
//!
//! Values are read from an optional `settings.toml` in the working directory
//! and can be overridden with `LISTIFY__`-prefixed environment variables,
//! e.g. `LISTIFY__AUTH__JWT_SECRET` or `LISTIFY__SERVER__PORT`.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_database")]
    pub database: Database,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind: None,
            port: default_port(),
            database: default_database(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Auth {
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
    pub google_client_id: Option<String>,
    #[serde(default = "default_google_timeout_secs")]
    pub google_timeout_secs: u64,
}

impl Default for Auth {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            token_ttl_hours: default_token_ttl_hours(),
            google_client_id: None,
            google_timeout_secs: default_google_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Cors {
    #[serde(default = "default_origins")]
    pub origins: Vec<String>,
}

impl Default for Cors {
    fn default() -> Self {
        Self {
            origins: default_origins(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    #[serde(default)]
    pub server: Server,
    #[serde(default)]
    pub auth: Auth,
    #[serde(default)]
    pub cors: Cors,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_database() -> Database {
    Database::Sqlite("listify.db".to_string())
}

fn default_jwt_secret() -> String {
    "dev-secret".to_string()
}

fn default_token_ttl_hours() -> i64 {
    24
}

fn default_google_timeout_secs() -> u64 {
    5
}

fn default_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(
                Environment::with_prefix("LISTIFY")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.origins")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}
