use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Answer preflight requests and allow cross-origin browser clients
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: LogLevel,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

#[derive(Debug, Error)]
#[error("unknown log level '{0}', expected one of: error, warn, info, debug, trace")]
pub struct ParseLogLevelError(String);

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl FromStr for LogLevel {
    type Err = ParseLogLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(ParseLogLevelError(s.to_string())),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ServerConfig {
    const DEFAULT_HOST: &'static str = "0.0.0.0";
    const DEFAULT_PORT: u16 = 3000;

    /// Parse a listen address in `HOST:PORT` form
    pub fn from_listen(listen: &str) -> anyhow::Result<Self> {
        let (host, port) = listen
            .rsplit_once(':')
            .with_context(|| format!("listen address '{listen}' must be in HOST:PORT form"))?;

        if host.is_empty() {
            anyhow::bail!("listen address '{listen}' is missing a host");
        }

        let port = port
            .parse::<u16>()
            .with_context(|| format!("invalid port in listen address '{listen}'"))?;

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host =
            lookup("COUNTER_HOST").unwrap_or_else(|| ServerConfig::DEFAULT_HOST.to_string());
        let port = match lookup("COUNTER_PORT") {
            Some(port) => port
                .parse::<u16>()
                .with_context(|| format!("COUNTER_PORT '{port}' is not a valid port"))?,
            None => ServerConfig::DEFAULT_PORT,
        };

        let cors_enabled = lookup("COUNTER_CORS")
            .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or(false);

        let level = match lookup("LOG_LEVEL") {
            Some(level) => level.parse::<LogLevel>().context("invalid LOG_LEVEL")?,
            None => LogLevel::default(),
        };

        Ok(Config {
            server: ServerConfig { host, port },
            cors: CorsConfig {
                enabled: cors_enabled,
            },
            logging: LoggingConfig { level },
        })
    }

    /// Apply command line overrides on top of the environment
    pub fn with_overrides(
        mut self,
        listen: Option<&str>,
        cors: bool,
        log_level: Option<LogLevel>,
    ) -> anyhow::Result<Self> {
        if let Some(listen) = listen {
            self.server = ServerConfig::from_listen(listen)?;
        }
        if cors {
            self.cors.enabled = true;
        }
        if let Some(level) = log_level {
            self.logging.level = level;
        }
        Ok(self)
    }
}
