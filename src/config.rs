use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ShopError};

pub const ENV_PREFIX: &str = "SHOPFRONT_";
pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    pub shopfront: String,
    pub reqwest: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<String>,
}

impl LoggingConfig {
    const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];
    const SHOPFRONT_LEVEL: &str = "info";
    const REQWEST_LEVEL: &str = "warn";

    fn default() -> Self {
        LoggingConfig {
            shopfront: Self::SHOPFRONT_LEVEL.to_string(),
            reqwest: Self::REQWEST_LEVEL.to_string(),
            log_dir: None,
        }
    }

    /// flexi_logger spec string, e.g. `shopfront=info, reqwest=warn`
    pub fn log_spec(&self) -> String {
        format!("shopfront={}, reqwest={}", self.shopfront, self.reqwest)
    }

    fn ensure_valid(&mut self) {
        // Logging isn't up yet when config is read, so problems go to stderr
        Self::ensure_level("shopfront", &mut self.shopfront, Self::SHOPFRONT_LEVEL);
        Self::ensure_level("reqwest", &mut self.reqwest, Self::REQWEST_LEVEL);

        if let Some(dir) = &self.log_dir {
            if dir.trim().is_empty() {
                self.log_dir = None;
            }
        }
    }

    fn ensure_level(name: &str, level: &mut String, default: &str) {
        let original = level.clone();
        *level = level.trim().to_ascii_lowercase();
        if !Self::LOG_LEVELS.contains(&level.as_str()) {
            eprintln!(
                "Config error: {} log level of '{}' is invalid - using default of '{}'",
                name, original, default
            );
            *level = default.to_owned();
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BackendConfig {
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl BackendConfig {
    const BASE_URL: &str = "http://localhost:8000";

    pub fn new(base_url: impl Into<String>) -> Self {
        let mut backend = BackendConfig {
            base_url: base_url.into(),
            timeout_secs: None,
        };
        backend.ensure_valid();
        backend
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    fn default() -> Self {
        BackendConfig {
            base_url: Self::BASE_URL.to_owned(),
            timeout_secs: None,
        }
    }

    fn ensure_valid(&mut self) {
        let trimmed = self.base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            eprintln!(
                "Config error: backend base_url is empty - using default of '{}'",
                Self::BASE_URL
            );
            self.base_url = Self::BASE_URL.to_owned();
        } else {
            self.base_url = trimmed.to_owned();
        }

        if self.timeout_secs == Some(0) {
            self.timeout_secs = None;
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MockConfig {
    pub host: String,
    pub port: u16,
}

impl MockConfig {
    const HOST: &str = "127.0.0.1";
    const PORT: u16 = 8000;

    fn default() -> Self {
        MockConfig {
            host: Self::HOST.to_owned(),
            port: Self::PORT,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    pub backend: BackendConfig,
    pub logging: LoggingConfig,
    pub mock: MockConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            backend: BackendConfig::default(),
            logging: LoggingConfig::default(),
            mock: MockConfig::default(),
        }
    }
}

impl Config {
    pub fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "shopfront")
            .ok_or_else(|| ShopError::Config("Could not determine project directories".into()))
    }

    pub fn default_path(project_dirs: &ProjectDirs) -> PathBuf {
        project_dirs.config_dir().join(CONFIG_FILE_NAME)
    }

    /// Loads the configuration from `config.toml` in the app's config directory.
    /// Writes the default config to disk if no file exists yet.
    pub fn load_config(project_dirs: &ProjectDirs) -> Self {
        let config_path = Self::default_path(project_dirs);

        if !config_path.exists() {
            Self::write_default(&config_path);
        }

        Self::load_from(&config_path)
    }

    /// Loads defaults, then the TOML file at `config_path` (if present), then
    /// `SHOPFRONT_` environment variables. `SHOPFRONT_BACKEND__BASE_URL` sets
    /// `backend.base_url`. Falls back to defaults if extraction fails.
    pub fn load_from(config_path: &Path) -> Self {
        let default_config = Config::default();

        let figment = Figment::from(Serialized::defaults(default_config.clone()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let mut config = figment.extract().unwrap_or_else(|err| {
            eprintln!(
                "Could not load config file {}: {}. Using default configuration.",
                config_path.display(),
                err
            );
            default_config
        });

        config.ensure_valid();

        config
    }

    fn write_default(config_path: &Path) {
        if let Some(parent) = config_path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                eprintln!(
                    "Failed to create configuration directory {}: {}",
                    parent.display(),
                    e
                );
            }
        }
        match toml::to_string_pretty(&Config::default()) {
            Ok(toml_string) => {
                if let Err(e) = fs::write(config_path, toml_string) {
                    eprintln!(
                        "Failed to write default config to {}: {}",
                        config_path.display(),
                        e
                    );
                }
            }
            Err(_) => eprintln!("Failed to serialize default config."),
        }
    }

    fn ensure_valid(&mut self) {
        self.backend.ensure_valid();
        self.logging.ensure_valid();
    }
}
