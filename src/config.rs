use std::env::{self, VarError};
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use crate::error::{AppError, Result};
use crate::scrape::{DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: SocketAddr,
    /// Used when a request does not name its own timeout.
    pub default_timeout_secs: u64,
    /// Used when a request does not name its own user agent.
    pub default_user_agent: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        Self::from_lookup(|name| env::var(name))
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> std::result::Result<String, VarError>,
    {
        let var_or = |name: &str, default: &str| -> Result<String> {
            match lookup(name) {
                Ok(value) => Ok(value),
                Err(VarError::NotPresent) => Ok(default.to_string()),
                Err(e) => Err(e.into()),
            }
        };

        let host = var_or("HOST", "127.0.0.1")?;
        let port = var_or("PORT", "8000")?;
        let port = port.parse::<u16>().map_err(|e| AppError::ConfigError(format!("Invalid port: {}", e)))?;
        let ip = IpAddr::from_str(&host).map_err(|e| AppError::ConfigError(format!("Invalid host address: {}", e)))?;

        let timeout = var_or("SCRAPER_TIMEOUT_SECS", &DEFAULT_TIMEOUT_SECS.to_string())?;
        let default_timeout_secs = timeout
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or_else(|| AppError::ConfigError(format!("Invalid default timeout: {}", timeout)))?;

        let default_user_agent = var_or("SCRAPER_USER_AGENT", DEFAULT_USER_AGENT)?;

        Ok(Config {
            server_addr: SocketAddr::new(ip, port),
            default_timeout_secs,
            default_user_agent,
        })
    }
}
