//! Process configuration from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::otp::OtpConfig;

/// Default planner when `OTP_URL` is unset.
pub const DEFAULT_OTP_URL: &str = "http://localhost:8080";

/// Default listen address when `BIND_ADDR` is unset.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} is not a valid socket address: {value}")]
    InvalidAddr { key: &'static str, value: String },

    #[error("{key} must be a whole number of seconds: {value}")]
    InvalidSeconds { key: &'static str, value: String },
}

/// Everything `main` needs to start serving.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub otp: OtpConfig,

    /// Serve recorded plans from this directory instead of a live planner
    pub mock_planner_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, treating empty values as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_value = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidAddr {
                key: "BIND_ADDR",
                value: bind_value.clone(),
            })?;

        let mut otp = OtpConfig::new(get("OTP_URL").as_deref().unwrap_or(DEFAULT_OTP_URL));
        if let Some(value) = get("OTP_TIMEOUT_SECS") {
            let secs: u64 = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidSeconds {
                    key: "OTP_TIMEOUT_SECS",
                    value: value.clone(),
                })?;
            otp = otp.with_timeout(secs);
        }

        Ok(Self {
            bind_addr,
            otp,
            mock_planner_dir: get("MOCK_PLANNER_DIR").map(PathBuf::from),
        })
    }
}
