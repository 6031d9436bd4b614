// src/config.rs
use std::{env, time::Duration};

use crate::error::ConfigError;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:3000/api/chat";
pub const DEFAULT_SESSION_ID: &str = "demo-session-1";
pub const DEFAULT_GREETING: &str =
    "Hola, soy AsistenteDataSeed de Netlife. ¿Cuál es tu ID o cédula para revisar tu caso?";

/// Everything the widget needs at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetConfig {
    pub endpoint_url: String,
    pub session_id: String,
    pub greeting: String,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            endpoint_url: DEFAULT_ENDPOINT.to_string(),
            session_id: DEFAULT_SESSION_ID.to_string(),
            greeting: DEFAULT_GREETING.to_string(),
        }
    }
}

impl WidgetConfig {
    /// Reads `CHAT_API_URL`, `CHAT_SESSION_ID` and `CHAT_GREETING`.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            endpoint_url: non_blank(lookup("CHAT_API_URL")).unwrap_or(defaults.endpoint_url),
            session_id: non_blank(lookup("CHAT_SESSION_ID")).unwrap_or(defaults.session_id),
            greeting: non_blank(lookup("CHAT_GREETING")).unwrap_or(defaults.greeting),
        }
    }
}

/// Dev backend settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub session_ttl: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            session_ttl: Duration::from_secs(30 * 60),
        }
    }
}

impl ServerConfig {
    /// Reads `HOST`, `PORT` and `SESSION_TTL_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(host) = non_blank(lookup("HOST")) {
            config.host = host;
        }
        if let Some(port) = non_blank(lookup("PORT")) {
            config.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                name: "PORT",
                expected: "port number",
                value: port.clone(),
            })?;
        }
        if let Some(ttl) = non_blank(lookup("SESSION_TTL_SECS")) {
            let secs: u64 = ttl.parse().map_err(|_| ConfigError::InvalidValue {
                name: "SESSION_TTL_SECS",
                expected: "number of seconds",
                value: ttl.clone(),
            })?;
            config.session_ttl = Duration::from_secs(secs);
        }

        Ok(config)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
