use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use kura_api::bootstrap::BootstrapAccounts;

pub const DEV_JWT_SECRET: &str = "dev-secret-change-me";

/// Process configuration, read from `KURA_*` environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub upload_dir: PathBuf,
    pub upload_url_prefix: String,
    pub max_upload_mb: usize,
    pub bootstrap: BootstrapAccounts,
    pub legacy_login_provisioning: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let defaults = BootstrapAccounts::default();

        let port = var("KURA_PORT", "5000")
            .parse()
            .context("KURA_PORT must be a port number")?;

        let token_ttl_hours: i64 = var("KURA_TOKEN_TTL_HOURS", "24")
            .parse()
            .context("KURA_TOKEN_TTL_HOURS must be a whole number of hours")?;
        if token_ttl_hours <= 0 {
            bail!("KURA_TOKEN_TTL_HOURS must be positive, got {}", token_ttl_hours);
        }

        let max_upload_mb: usize = var("KURA_MAX_UPLOAD_MB", "20")
            .parse()
            .context("KURA_MAX_UPLOAD_MB must be a whole number of megabytes")?;
        if max_upload_mb == 0 {
            bail!("KURA_MAX_UPLOAD_MB must be at least 1");
        }

        let legacy_login_provisioning = parse_bool(
            "KURA_LEGACY_LOGIN_PROVISIONING",
            &var("KURA_LEGACY_LOGIN_PROVISIONING", "false"),
        )?;

        Ok(Self {
            host: var("KURA_HOST", "0.0.0.0"),
            port,
            db_path: PathBuf::from(var("KURA_DB_PATH", "kura.db")),
            jwt_secret: var("KURA_JWT_SECRET", DEV_JWT_SECRET),
            token_ttl_hours,
            upload_dir: PathBuf::from(var("KURA_UPLOAD_DIR", "static/uploads")),
            upload_url_prefix: var("KURA_UPLOAD_URL_PREFIX", "/static/uploads"),
            max_upload_mb,
            bootstrap: BootstrapAccounts {
                founder_username: var("KURA_FOUNDER_USERNAME", &defaults.founder_username),
                founder_password: var("KURA_FOUNDER_PASSWORD", &defaults.founder_password),
                super_username: var("KURA_SUPER_USERNAME", &defaults.super_username),
                super_password: var("KURA_SUPER_PASSWORD", &defaults.super_password),
            },
            legacy_login_provisioning,
        })
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => bail!("{} must be true or false, got '{}'", key, other),
    }
}
