use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid settings: {0}")]
    Invalid(String),
}

/// Client endpoint settings: where the AAA server lives and how patiently
/// to talk to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Server host name or address.
    pub host: String,

    /// Authentication port (default 1812/udp).
    #[serde(default = "default_auth_port")]
    pub auth_port: u16,

    /// Accounting port (default 1813/udp).
    #[serde(default = "default_acct_port")]
    pub acct_port: u16,

    /// Shared secret. Never transmitted; feeds the MD5 constructions only.
    pub secret: String,

    /// Socket receive timeout per attempt, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// How many times a request is sent before giving up on timeouts.
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
}

fn default_auth_port() -> u16 {
    1812
}

fn default_acct_port() -> u16 {
    1813
}

fn default_timeout_ms() -> u64 {
    3000
}

fn default_retry_count() -> u32 {
    3
}

impl Settings {
    pub fn new(host: impl Into<String>, secret: impl Into<String>) -> Self {
        Settings {
            host: host.into(),
            auth_port: default_auth_port(),
            acct_port: default_acct_port(),
            secret: secret.into(),
            timeout_ms: default_timeout_ms(),
            retry_count: default_retry_count(),
        }
    }

    /// Load settings from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&contents)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Ports must be non-zero; timeout and retry count positive.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.host.is_empty() {
            return Err(SettingsError::Invalid("host must not be empty".into()));
        }
        if self.auth_port == 0 || self.acct_port == 0 {
            return Err(SettingsError::Invalid("ports must be 1..=65535".into()));
        }
        if self.timeout_ms == 0 {
            return Err(SettingsError::Invalid("timeout must be positive".into()));
        }
        if self.retry_count == 0 {
            return Err(SettingsError::Invalid(
                "retry count must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_applied() {
        let settings: Settings =
            serde_json::from_str(r#"{"host": "radius.example.net", "secret": "s3cr3t"}"#).unwrap();
        assert_eq!(settings.auth_port, 1812);
        assert_eq!(settings.acct_port, 1813);
        assert_eq!(settings.retry_count, 3);
        settings.validate().unwrap();
    }

    #[test]
    fn zero_values_are_rejected() {
        let mut settings = Settings::new("radius.example.net", "s");
        settings.retry_count = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::new("radius.example.net", "s");
        settings.timeout_ms = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::new("radius.example.net", "s");
        settings.auth_port = 0;
        assert!(settings.validate().is_err());
    }
}
