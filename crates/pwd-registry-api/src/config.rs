//! Server configuration read from the environment at startup.

use std::net::SocketAddr;
use std::str::FromStr;

use pwd_registry_id_wizard::capture::{DEFAULT_MAX_EDGE, DEFAULT_MAX_UPLOAD_EDGE};

use crate::error::AppError;

/// Default upload ceiling for `PUT /{id}/photo`, in bytes.
pub const DEFAULT_PHOTO_MAX_BYTES: usize = 5 * 1024 * 1024;

/// Default minutes a draft may sit without a new event before it is evicted.
pub const DEFAULT_DRAFT_IDLE_MINUTES: u32 = 60;

/// Settings for the HTTP host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Interface to bind (`HOST`).
    pub host: String,
    /// Port to bind (`PORT`).
    pub port: u16,
    /// Longest edge of a stored photo (`ID_PHOTO_MAX_EDGE`).
    pub photo_max_edge: u32,
    /// Largest accepted request body (`ID_PHOTO_MAX_BYTES`).
    pub photo_max_bytes: usize,
    /// Largest upload width or height decoded (`ID_PHOTO_MAX_UPLOAD_EDGE`).
    pub photo_max_upload_edge: u32,
    /// Idle minutes before a draft is evicted (`ID_DRAFT_IDLE_MINUTES`).
    pub draft_idle_minutes: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            photo_max_edge: DEFAULT_MAX_EDGE,
            photo_max_bytes: DEFAULT_PHOTO_MAX_BYTES,
            photo_max_upload_edge: DEFAULT_MAX_UPLOAD_EDGE,
            draft_idle_minutes: DEFAULT_DRAFT_IDLE_MINUTES,
        }
    }
}

impl ServerConfig {
    /// Reads the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set but unparseable.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source; unset variables
    /// take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set but unparseable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = Self::default();
        let photo_max_edge = positive_or(&lookup, "ID_PHOTO_MAX_EDGE", defaults.photo_max_edge)?;
        let photo_max_upload_edge = positive_or(
            &lookup,
            "ID_PHOTO_MAX_UPLOAD_EDGE",
            defaults.photo_max_upload_edge,
        )?;
        let draft_idle_minutes =
            positive_or(&lookup, "ID_DRAFT_IDLE_MINUTES", defaults.draft_idle_minutes)?;

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "PORT", defaults.port)?,
            photo_max_edge,
            photo_max_bytes: parse_or(&lookup, "ID_PHOTO_MAX_BYTES", defaults.photo_max_bytes)?,
            photo_max_upload_edge,
            draft_idle_minutes,
        })
    }

    /// The address to bind.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `HOST:PORT` is not a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{key} must be a valid number: {e}"))),
    }
}

fn positive_or(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u32,
) -> Result<u32, AppError> {
    let value = parse_or(lookup, key, default)?;
    if value == 0 {
        return Err(AppError::Config(format!("{key} must be greater than zero")));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_unset_environment_yields_defaults() {
        let config = ServerConfig::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.port, 3000);
        assert_eq!(config.photo_max_edge, 1024);
        assert_eq!(config.photo_max_bytes, 5_242_880);
        assert_eq!(config.photo_max_upload_edge, 8192);
        assert_eq!(config.draft_idle_minutes, 60);
    }

    #[test]
    fn test_variables_override_defaults() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("ID_PHOTO_MAX_EDGE", "600"),
            ("ID_PHOTO_MAX_BYTES", "1048576"),
            ("ID_PHOTO_MAX_UPLOAD_EDGE", "4000"),
            ("ID_DRAFT_IDLE_MINUTES", "15"),
        ]))
        .unwrap();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.photo_max_edge, 600);
        assert_eq!(config.photo_max_bytes, 1_048_576);
        assert_eq!(config.photo_max_upload_edge, 4000);
        assert_eq!(config.draft_idle_minutes, 15);
        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:8080");
    }

    #[test]
    fn test_invalid_port_is_a_config_error() {
        let result = ServerConfig::from_lookup(lookup_from(&[("PORT", "seventy")]));

        match result {
            Err(AppError::Config(msg)) => assert!(msg.starts_with("PORT")),
            other => panic!("expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_max_edge_is_a_config_error() {
        let result = ServerConfig::from_lookup(lookup_from(&[("ID_PHOTO_MAX_EDGE", "0")]));

        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_zero_upload_edge_and_idle_minutes_are_config_errors() {
        for key in ["ID_PHOTO_MAX_UPLOAD_EDGE", "ID_DRAFT_IDLE_MINUTES"] {
            let result = ServerConfig::from_lookup(lookup_from(&[(key, "0")]));

            match result {
                Err(AppError::Config(msg)) => assert!(msg.starts_with(key)),
                other => panic!("expected Config error for {key}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_unparseable_host_fails_at_socket_addr() {
        let config =
            ServerConfig::from_lookup(lookup_from(&[("HOST", "not a host")])).unwrap();

        assert!(matches!(config.socket_addr(), Err(AppError::Config(_))));
    }
}
