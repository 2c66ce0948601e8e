//! Process configuration from the environment.
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `HOST` | `0.0.0.0` | interface to bind |
//! | `PORT` | `5000` | port to bind |
//! | `APP_ENV` (or `NODE_ENV`) | `production` | `development` enables request logging and debug output |
//!
//! Values in `config/config.env` are loaded first when the file exists.
//! Variables already set in the process environment win.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::str::FromStr;

use crate::error::ServerError;

pub const ENV_FILE: &str = "config/config.env";
pub const DEFAULT_PORT: u16 = 5000;

/// Loads `path` into the process environment.
///
/// Returns `Ok(false)` when the file does not exist.
pub fn load_env_file(path: impl AsRef<Path>) -> Result<bool, ServerError> {
    let path = path.as_ref();
    match dotenvy::from_path(path) {
        Ok(()) => Ok(true),
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(ServerError::Config(format!("{}: {e}", path.display()))),
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    Development,
    #[default]
    Production,
}

impl Mode {
    pub fn is_development(self) -> bool {
        self == Self::Development
    }
}

impl FromStr for Mode {
    type Err = ServerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(ServerError::Config(format!(
                "unknown mode `{other}`, expected `development` or `production`"
            ))),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Development => "development",
            Self::Production => "production",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub mode: Mode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            mode: Mode::default(),
        }
    }
}

impl Config {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self, ServerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, which maps a variable name to
    /// its value. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ServerError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(host) = get("HOST") {
            config.host = host.trim().parse().map_err(|e| {
                ServerError::Config(format!("HOST `{host}` is not an IP address: {e}"))
            })?;
        }
        if let Some(port) = get("PORT") {
            config.port = port.trim().parse().map_err(|e| {
                ServerError::Config(format!("PORT `{port}` is not a valid port: {e}"))
            })?;
        }
        if let Some(mode) = get("APP_ENV").or_else(|| get("NODE_ENV")) {
            config.mode = mode.parse()?;
        }
        Ok(config)
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars.iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.addr().to_string(), "0.0.0.0:5000");
    }

    #[test]
    fn reads_every_variable() {
        let config = Config::from_lookup(lookup(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("APP_ENV", "Development"),
        ])).unwrap();

        assert_eq!(config.addr().to_string(), "127.0.0.1:8080");
        assert!(config.mode.is_development());
    }

    #[test]
    fn node_env_is_a_fallback() {
        let config = Config::from_lookup(lookup(&[("NODE_ENV", "development")])).unwrap();
        assert_eq!(config.mode, Mode::Development);

        let config = Config::from_lookup(lookup(&[
            ("APP_ENV", "production"),
            ("NODE_ENV", "development"),
        ])).unwrap();
        assert_eq!(config.mode, Mode::Production);
    }

    #[test]
    fn empty_values_are_unset() {
        let config = Config::from_lookup(lookup(&[("PORT", " ")])).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn bad_values_are_config_errors() {
        assert!(matches!(
            Config::from_lookup(lookup(&[("PORT", "http")])),
            Err(ServerError::Config(_))
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[("HOST", "localhost")])),
            Err(ServerError::Config(_))
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[("APP_ENV", "staging")])),
            Err(ServerError::Config(_))
        ));
    }

    #[test]
    fn missing_env_file_is_not_an_error() {
        assert!(!load_env_file("does/not/exist.env").unwrap());
    }
}
