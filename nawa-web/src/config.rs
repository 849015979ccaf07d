//! Command-line and environment configuration for the server
//!
//! clap reads each flag from the command line or its environment variable;
//! the result is layered over the TOML config file (see
//! `nawa_common::config`).

use clap::Parser;
use nawa_common::config::{load_config_file, ConfigLayer, Settings, SmtpLayer, DEFAULT_CONFIG_FILE};
use std::path::PathBuf;

/// Command-line arguments for nawa-web
#[derive(Parser, Clone)]
#[command(name = "nawa-web")]
#[command(about = "Form submission backend for the Nawa marketing site")]
#[command(version)]
pub struct ServerArgs {
    /// TOML config file (optional; missing file means defaults)
    #[arg(long, env = "NAWA_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Database connection string
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Address to listen on
    #[arg(long, env = "NAWA_BIND")]
    pub bind: Option<String>,

    /// Secret for read and preview endpoints
    #[arg(long, env = "DEVELOPER_API_KEY", hide_env_values = true)]
    pub developer_api_key: Option<String>,

    /// Secret for delete endpoints
    #[arg(long, env = "DELETE_API_KEY", hide_env_values = true)]
    pub delete_api_key: Option<String>,

    /// Allowed browser origin (any origin when unset)
    #[arg(long, env = "NAWA_CORS_ORIGIN")]
    pub cors_origin: Option<String>,

    /// Directory holding static assets served by the API
    #[arg(long, env = "NAWA_ASSETS_DIR")]
    pub assets_dir: Option<PathBuf>,

    /// SMTP relay host (mail disabled when unset)
    #[arg(long, env = "SMTP_HOST")]
    pub smtp_host: Option<String>,

    #[arg(long, env = "SMTP_PORT")]
    pub smtp_port: Option<u16>,

    #[arg(long, env = "SMTP_USER")]
    pub smtp_user: Option<String>,

    #[arg(long, env = "SMTP_PASSWORD", hide_env_values = true)]
    pub smtp_password: Option<String>,

    /// Sender address (defaults to the SMTP user)
    #[arg(long, env = "SMTP_FROM")]
    pub smtp_from: Option<String>,
}

// Secrets are masked by the layer's Debug
impl std::fmt::Debug for ServerArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerArgs")
            .field("config", &self.config)
            .field("layer", &self.layer())
            .finish()
    }
}

impl ServerArgs {
    /// Command-line/environment layer
    pub fn layer(&self) -> ConfigLayer {
        ConfigLayer {
            database_url: self.database_url.clone(),
            bind: self.bind.clone(),
            developer_api_key: self.developer_api_key.clone(),
            delete_api_key: self.delete_api_key.clone(),
            cors_origin: self.cors_origin.clone(),
            assets_dir: self.assets_dir.clone(),
            smtp: SmtpLayer {
                host: self.smtp_host.clone(),
                port: self.smtp_port,
                user: self.smtp_user.clone(),
                password: self.smtp_password.clone(),
                from: self.smtp_from.clone(),
            },
        }
    }

    /// Resolve settings: these arguments over the config file over defaults
    pub fn load_settings(&self) -> nawa_common::Result<Settings> {
        let file = load_config_file(&self.config)?;
        self.layer().over(file).resolve()
    }
}
