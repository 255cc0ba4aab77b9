//! Pool sizing and TLS settings for the PostgreSQL connection.

use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::config::env::EnvLookup;
use crate::error::AppError;

/// Accepted range for both `pool_size` and `max_overflow`.
pub const POOL_BOUNDS: (u32, u32) = (5, 20);
/// Physical connections are recycled after this long.
pub const POOL_RECYCLE: Duration = Duration::from_secs(1800);
/// How long a request waits for a pooled connection before failing.
pub const POOL_TIMEOUT: Duration = Duration::from_secs(30);

pub const DEFAULT_POOL_SIZE: u32 = 20;
pub const DEFAULT_MAX_OVERFLOW: u32 = 20;
pub const DEFAULT_CERTS_DIR: &str = "app/certs";

/// Pool sizing. Construct through [`PoolSettings::new`] so bounds are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    pool_size: u32,
    max_overflow: u32,
    /// Log every statement at info level
    pub echo: bool,
}

impl PoolSettings {
    pub fn new(pool_size: u32, max_overflow: u32, echo: bool) -> Result<Self, AppError> {
        let settings = Self {
            pool_size,
            max_overflow,
            echo,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_lookup(lookup: &EnvLookup) -> Result<Self, AppError> {
        let pool_size = lookup
            .parse_opt::<u32>("DB_POOL_SIZE")?
            .unwrap_or(DEFAULT_POOL_SIZE);
        let max_overflow = lookup
            .parse_opt::<u32>("DB_MAX_OVERFLOW")?
            .unwrap_or(DEFAULT_MAX_OVERFLOW);
        let echo = match lookup.get("DB_ECHO") {
            Some(raw) => parse_flag("DB_ECHO", &raw)?,
            None => false,
        };
        Self::new(pool_size, max_overflow, echo)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let (lo, hi) = POOL_BOUNDS;
        for (name, value) in [
            ("pool_size", self.pool_size),
            ("max_overflow", self.max_overflow),
        ] {
            if !(lo..=hi).contains(&value) {
                return Err(AppError::config(format!(
                    "{name} must be between {lo} and {hi}, got {value}"
                )));
            }
        }
        Ok(())
    }

    pub fn pool_size(&self) -> u32 {
        self.pool_size
    }

    pub fn max_overflow(&self) -> u32 {
        self.max_overflow
    }

    /// Upper bound on concurrent physical connections
    pub fn max_connections(&self) -> u32 {
        self.pool_size + self.max_overflow
    }
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            pool_size: DEFAULT_POOL_SIZE,
            max_overflow: DEFAULT_MAX_OVERFLOW,
            echo: false,
        }
    }
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(AppError::config(format!(
            "{key} must be a boolean, got '{other}'"
        ))),
    }
}

/// Whether the connection uses TLS at all.
///
/// There is no implicit fallback: a partial set of certificate files is an
/// error under `Required`, and plaintext has to be asked for by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsMode {
    #[default]
    Required,
    Disabled,
}

impl FromStr for TlsMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "required" | "require" => Ok(TlsMode::Required),
            "disabled" | "disable" => Ok(TlsMode::Disabled),
            other => Err(AppError::config(format!(
                "POSTGRES_TLS must be 'required' or 'disabled', got '{other}'"
            ))),
        }
    }
}

/// How much of the server's certificate is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsVerify {
    /// Chain to the pinned CA and matching hostname
    #[default]
    Full,
    /// Chain to the pinned CA, any hostname
    CaOnly,
    /// Encrypt without verifying the server at all
    InsecureSkipVerify,
}

impl FromStr for TlsVerify {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" | "verify-full" => Ok(TlsVerify::Full),
            "ca-only" | "verify-ca" => Ok(TlsVerify::CaOnly),
            "insecure-skip-verify" => Ok(TlsVerify::InsecureSkipVerify),
            other => Err(AppError::config(format!(
                "POSTGRES_TLS_VERIFY must be 'full', 'ca-only' or 'insecure-skip-verify', got '{other}'"
            ))),
        }
    }
}

/// CA certificate plus the client certificate and key presented for mutual TLS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsFiles {
    pub ca: PathBuf,
    pub cert: PathBuf,
    pub key: PathBuf,
}

impl TlsFiles {
    /// `ca.pem`, `server.pem` and `server.key` under `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            ca: dir.join("ca.pem"),
            cert: dir.join("server.pem"),
            key: dir.join("server.key"),
        }
    }

    /// All three paths must be readable regular files.
    pub fn validate(&self) -> Result<(), AppError> {
        let unusable: Vec<String> = [&self.ca, &self.cert, &self.key]
            .into_iter()
            .filter(|p| !is_readable_file(p))
            .map(|p| p.display().to_string())
            .collect();

        if unusable.is_empty() {
            Ok(())
        } else {
            Err(AppError::config(format!(
                "SSL certificate files not found: {}",
                unusable.join(", ")
            )))
        }
    }
}

fn is_readable_file(path: &Path) -> bool {
    path.is_file() && File::open(path).is_ok()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsSettings {
    pub mode: TlsMode,
    pub verify: TlsVerify,
    pub files: TlsFiles,
}

impl TlsSettings {
    /// Mutual TLS with full verification against the given files.
    pub fn required(files: TlsFiles) -> Self {
        Self {
            mode: TlsMode::Required,
            verify: TlsVerify::Full,
            files,
        }
    }

    /// Plaintext connection. Certificate paths are kept for reporting only.
    pub fn disabled() -> Self {
        Self {
            mode: TlsMode::Disabled,
            verify: TlsVerify::Full,
            files: TlsFiles::in_dir(DEFAULT_CERTS_DIR),
        }
    }

    pub fn with_verify(mut self, verify: TlsVerify) -> Self {
        self.verify = verify;
        self
    }

    pub fn from_lookup(lookup: &EnvLookup) -> Result<Self, AppError> {
        let mode = lookup.parse_opt::<TlsMode>("POSTGRES_TLS")?.unwrap_or_default();
        let verify = lookup
            .parse_opt::<TlsVerify>("POSTGRES_TLS_VERIFY")?
            .unwrap_or_default();
        let dir = lookup
            .get("POSTGRES_CERTS_DIR")
            .unwrap_or_else(|| DEFAULT_CERTS_DIR.to_string());

        Ok(Self {
            mode,
            verify,
            files: TlsFiles::in_dir(dir),
        })
    }
}

impl fmt::Display for TlsSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            TlsMode::Disabled => f.write_str("disabled"),
            TlsMode::Required => write!(f, "required verify={:?}", self.verify),
        }
    }
}
