//! Centralized application configuration, loaded and validated once at startup.

use std::env;
use std::path::PathBuf;

use crate::config::db::{PoolSettings, TlsSettings};
use crate::config::env::{DbCredentials, EnvLookup, EnvSource};
use crate::error::AppError;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_DOTENV_PATH: &str = ".env";

#[derive(Debug, Clone)]
pub struct Config {
    // Server configuration
    pub host: String,
    pub port: u16,

    // Where the values below came from
    pub source: EnvSource,

    // Database configuration
    pub credentials: DbCredentials,
    pub pool: PoolSettings,
    pub tls: TlsSettings,
}

impl Config {
    /// Load from the source named by `CONFIG_SOURCE`.
    pub fn load() -> Result<Self, AppError> {
        let source = EnvSource::from_env()?;
        let dotenv_path = env::var("DOTENV_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DOTENV_PATH));
        let lookup = EnvLookup::load(source, &dotenv_path)?;
        Self::from_lookup(&lookup)
    }

    pub fn from_lookup(lookup: &EnvLookup) -> Result<Self, AppError> {
        let credentials = DbCredentials::from_lookup(lookup)?;
        let pool = PoolSettings::from_lookup(lookup)?;
        let tls = TlsSettings::from_lookup(lookup)?;

        let host = lookup
            .get("BACKEND_HOST")
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = lookup
            .parse_opt::<u16>("BACKEND_PORT")?
            .unwrap_or(DEFAULT_PORT);

        Ok(Config {
            host,
            port,
            source: lookup.source(),
            credentials,
            pool,
            tls,
        })
    }

    pub fn database_url(&self) -> String {
        self.credentials.connection_string()
    }
}
