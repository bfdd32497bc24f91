use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;

/// Configuration for the application
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    /// Directory the printable report is written to
    #[serde(default = "default_report_dir")]
    pub report_dir: String,

    /// File receiving log output; the terminal UI owns stdout
    #[serde(default = "default_log_file")]
    pub log_file: String,

    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,
}

fn default_report_dir() -> String {
    "reports".to_string()
}

fn default_log_file() -> String {
    "project_tracker.log".to_string()
}

fn default_db_max_connections() -> u32 {
    5
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Variables from a `.env` file are loaded first if one exists, then the
    /// process environment is deserialized into `Config`.
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let config = envy::from_env::<Config>()?;

        Ok(config)
    }

    /// Get a direct reference to the database URL
    pub fn database_url(&self) -> &str {
        &self.database_url
    }
}

/// Initialize environment variables and load configuration
pub fn init() -> Result<Config> {
    Config::load()
}
