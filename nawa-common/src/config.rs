//! Configuration loading and layering
//!
//! Resolution follows a fixed priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Command-line and environment values are merged by the binaries (clap
//! reads both) into a [`ConfigLayer`]; this module merges that layer over the
//! file layer and applies defaults.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://nawa.db?mode=rwc";
pub const DEFAULT_BIND: &str = "127.0.0.1:5780";
pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const DEFAULT_ASSETS_DIR: &str = "./assets";
pub const DEFAULT_CONFIG_FILE: &str = "nawa.toml";

/// One configuration source; every field optional
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigLayer {
    pub database_url: Option<String>,
    pub bind: Option<String>,
    pub developer_api_key: Option<String>,
    pub delete_api_key: Option<String>,
    pub cors_origin: Option<String>,
    pub assets_dir: Option<PathBuf>,
    pub smtp: SmtpLayer,
}

/// SMTP section of a configuration source
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SmtpLayer {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub from: Option<String>,
}

/// Fully resolved settings
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    pub database_url: String,
    pub bind: String,
    pub developer_api_key: Option<String>,
    pub delete_api_key: Option<String>,
    pub cors_origin: Option<String>,
    pub assets_dir: PathBuf,
    /// `None` disables outbound mail
    pub smtp: Option<SmtpSettings>,
}

#[derive(Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
}

fn masked(secret: &Option<String>) -> Option<&'static str> {
    secret.as_ref().map(|_| "***")
}

// API keys never appear in debug output
impl std::fmt::Debug for ConfigLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigLayer")
            .field("database_url", &self.database_url.as_deref().map(redact_url))
            .field("bind", &self.bind)
            .field("developer_api_key", &masked(&self.developer_api_key))
            .field("delete_api_key", &masked(&self.delete_api_key))
            .field("cors_origin", &self.cors_origin)
            .field("assets_dir", &self.assets_dir)
            .field("smtp", &self.smtp)
            .finish()
    }
}

impl std::fmt::Debug for SmtpLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpLayer")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &masked(&self.password))
            .field("from", &self.from)
            .finish()
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("database_url", &redact_url(&self.database_url))
            .field("bind", &self.bind)
            .field("developer_api_key", &masked(&self.developer_api_key))
            .field("delete_api_key", &masked(&self.delete_api_key))
            .field("cors_origin", &self.cors_origin)
            .field("assets_dir", &self.assets_dir)
            .field("smtp", &self.smtp)
            .finish()
    }
}

// Keeps the password out of logs
impl std::fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &masked(&self.password))
            .field("from", &self.from)
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl SmtpLayer {
    fn over(self, lower: SmtpLayer) -> SmtpLayer {
        SmtpLayer {
            host: non_empty(self.host).or(lower.host),
            port: self.port.or(lower.port),
            user: non_empty(self.user).or(lower.user),
            password: non_empty(self.password).or(lower.password),
            from: non_empty(self.from).or(lower.from),
        }
    }
}

impl ConfigLayer {
    /// Merge `self` over `lower`: set values in `self` win, empty strings
    /// fall through.
    pub fn over(self, lower: ConfigLayer) -> ConfigLayer {
        ConfigLayer {
            database_url: non_empty(self.database_url).or(lower.database_url),
            bind: non_empty(self.bind).or(lower.bind),
            developer_api_key: non_empty(self.developer_api_key).or(lower.developer_api_key),
            delete_api_key: non_empty(self.delete_api_key).or(lower.delete_api_key),
            cors_origin: non_empty(self.cors_origin).or(lower.cors_origin),
            assets_dir: self.assets_dir.or(lower.assets_dir),
            smtp: self.smtp.over(lower.smtp),
        }
    }

    /// Apply compiled defaults
    pub fn resolve(self) -> Result<Settings> {
        let smtp = match non_empty(self.smtp.host) {
            None => None,
            Some(host) => {
                let username = non_empty(self.smtp.user);
                let from = non_empty(self.smtp.from)
                    .or_else(|| username.clone())
                    .ok_or_else(|| {
                        Error::Config("SMTP host is set but neither smtp.from nor smtp.user is".to_string())
                    })?;
                Some(SmtpSettings {
                    host,
                    port: self.smtp.port.unwrap_or(DEFAULT_SMTP_PORT),
                    username,
                    password: non_empty(self.smtp.password),
                    from,
                })
            }
        };

        Ok(Settings {
            database_url: non_empty(self.database_url).unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            bind: non_empty(self.bind).unwrap_or_else(|| DEFAULT_BIND.to_string()),
            developer_api_key: non_empty(self.developer_api_key),
            delete_api_key: non_empty(self.delete_api_key),
            cors_origin: non_empty(self.cors_origin),
            assets_dir: self.assets_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_ASSETS_DIR)),
            smtp,
        })
    }
}

/// Load a TOML config file.
///
/// A missing file is not an error: a warning is logged and an empty layer
/// returned. A file that exists but does not parse is a `Config` error.
pub fn load_config_file(path: &Path) -> Result<ConfigLayer> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("Config file {} not found, using environment and defaults", path.display());
            return Ok(ConfigLayer::default());
        }
        Err(e) => return Err(e.into()),
    };

    let layer: ConfigLayer = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    info!("Loaded config file {}", path.display());
    Ok(layer)
}

impl Settings {
    /// Log what is configured without printing any secret
    pub fn log_summary(&self) {
        info!("Database: {}", redact_url(&self.database_url));
        info!("Bind address: {}", self.bind);
        info!(
            "Developer API key: {}",
            if self.developer_api_key.is_some() { "configured" } else { "NOT configured" }
        );
        info!(
            "Delete API key: {}",
            if self.delete_api_key.is_some() { "configured" } else { "NOT configured" }
        );
        match &self.smtp {
            Some(smtp) => info!("SMTP relay: {}:{} (from {})", smtp.host, smtp.port, smtp.from),
            None => warn!("SMTP not configured, confirmation emails disabled"),
        }
        info!("Assets directory: {}", self.assets_dir.display());
    }
}

/// Strip `user:password@` from a connection URL
pub fn redact_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***@{}", &url[..scheme_end], &url[at + 1..])
        }
        _ => url.to_string(),
    }
}
