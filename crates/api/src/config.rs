//! Process configuration loaded from the environment.

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use thiserror::Error;

use workforce_core::{CompanyId, UserId};
use workforce_observability::LogFormat;

const DEV_JWT_SECRET: &str = "workforce-dev-secret-change-me";
const MIN_JWT_SECRET_LEN: usize = 16;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            name,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub jwt_secret: String,
    pub api_host: String,
    pub api_port: u16,
    pub log_format: LogFormat,
    pub bootstrap_super_admin: Option<UserId>,
    pub default_company_id: CompanyId,
    /// `JWT_SECRET` was unset and the insecure dev default is in use.
    pub using_dev_secret: bool,
}

impl ApiConfig {
    /// Load from the process environment (after an optional `.env`).
    pub fn load() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let using_dev_secret = get("JWT_SECRET").is_none();
        let jwt_secret = match get("JWT_SECRET") {
            Some(secret) if secret.len() < MIN_JWT_SECRET_LEN => {
                return Err(ConfigError::invalid(
                    "JWT_SECRET",
                    format!("must be at least {MIN_JWT_SECRET_LEN} bytes"),
                ));
            }
            Some(secret) => secret,
            None => DEV_JWT_SECRET.to_owned(),
        };

        let api_host = get("API_HOST").unwrap_or_else(|| "0.0.0.0".to_owned());
        let api_port = get("API_PORT")
            .map(|v| v.trim().parse::<u16>())
            .transpose()
            .map_err(|e| ConfigError::invalid("API_PORT", e.to_string()))?
            .unwrap_or(8080);

        let log_format = get("LOG_FORMAT")
            .map(|v| LogFormat::from_str(&v))
            .transpose()
            .map_err(|e| ConfigError::invalid("LOG_FORMAT", e.to_string()))?
            .unwrap_or_default();

        let bootstrap_super_admin = get("BOOTSTRAP_SUPER_ADMIN_USER_ID")
            .map(|v| v.parse::<UserId>())
            .transpose()
            .map_err(|e| ConfigError::invalid("BOOTSTRAP_SUPER_ADMIN_USER_ID", e.to_string()))?;

        let default_company_id = get("DEFAULT_COMPANY_ID")
            .map(|v| v.parse::<CompanyId>())
            .transpose()
            .map_err(|e| ConfigError::invalid("DEFAULT_COMPANY_ID", e.to_string()))?
            .unwrap_or(CompanyId::new(1));

        Ok(Self {
            jwt_secret,
            api_host,
            api_port,
            log_format,
            bootstrap_super_admin,
            default_company_id,
            using_dev_secret,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, ConfigError> {
        let host = IpAddr::from_str(&self.api_host)
            .map_err(|e| ConfigError::invalid("API_HOST", format!("'{}': {e}", self.api_host)))?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}
