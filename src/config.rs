use std::path::PathBuf;

use crate::errors::AppError;

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Certificates are written below the public directory so the page server can hand
/// them out under this path.
pub const UPLOAD_URL_PREFIX: &str = "/uploads/certificates";

pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Outgoing mail server. Email delivery is off when `EMAIL_HOST` is unset.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Sender mailbox, `EMAIL_FROM` or the SMTP user.
    pub from: String,
}

/// Runtime settings, read from the environment (and `.env` through dotenv).
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    /// `None` runs the service on the seeded in-memory store.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub public_dir: PathBuf,
    /// Always `<public_dir>/uploads/certificates`.
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub api_base_url: Option<String>,
    /// Public address of the site, used for links in emails.
    pub site_url: String,
    pub smtp: Option<SmtpConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let jwt_secret = std::env::var("JWT_SECRET")
            .map_err(|_| AppError::Config("JWT_SECRET must be set".to_string()))?;

        let public_dir = PathBuf::from(env_or("PUBLIC_DIR", "public"));
        let upload_dir = public_dir.join(UPLOAD_URL_PREFIX.trim_start_matches('/'));

        Ok(Config {
            bind_address: env_or("BIND_ADDRESS", "127.0.0.1:8080"),
            database_url: non_empty_var("DATABASE_URL"),
            jwt_secret,
            token_ttl_hours: parse_var("TOKEN_TTL_HOURS", 24)?,
            public_dir,
            upload_dir,
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            api_base_url: non_empty_var("API_BASE_URL"),
            site_url: env_or("SITE_URL", "http://localhost:8080").trim_end_matches('/').to_string(),
            smtp: smtp_from_env()?,
        })
    }

    #[cfg(test)]
    pub fn for_tests(public_dir: &std::path::Path) -> Self {
        Config {
            bind_address: "127.0.0.1:0".to_string(),
            database_url: None,
            jwt_secret: "test-secret".to_string(),
            token_ttl_hours: 1,
            public_dir: public_dir.to_path_buf(),
            upload_dir: public_dir.join(UPLOAD_URL_PREFIX.trim_start_matches('/')),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            api_base_url: None,
            site_url: "http://localhost:8080".to_string(),
            smtp: None,
        }
    }
}

fn smtp_from_env() -> Result<Option<SmtpConfig>, AppError> {
    let Some(host) = non_empty_var("EMAIL_HOST") else {
        return Ok(None);
    };

    let username = non_empty_var("EMAIL_USER")
        .ok_or_else(|| AppError::Config("EMAIL_USER must be set when EMAIL_HOST is".to_string()))?;

    Ok(Some(SmtpConfig {
        host,
        port: parse_var("EMAIL_PORT", DEFAULT_SMTP_PORT)?,
        password: std::env::var("EMAIL_PASS").unwrap_or_default(),
        from: non_empty_var("EMAIL_FROM").unwrap_or_else(|| username.clone()),
        username,
    }))
}

fn env_or(key: &str, default: &str) -> String {
    non_empty_var(key).unwrap_or_else(|| default.to_string())
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> Result<T, AppError> {
    match non_empty_var(key) {
        Some(raw) => raw
            .parse()
            .map_err(|_| AppError::Config(format!("{} is not a valid value", key))),
        None => Ok(default),
    }
}
