//! Configuration loading and constants.
//!
//! Configuration is layered: an optional TOML file, then environment variables,
//! then command line overrides. The result is validated into an [`AppConfig`]
//! holding the [`Zone`] this instance reports. A missing zone is a startup error.

use std::path::{Path, PathBuf};

use const_format::formatcp;
use serde::Deserialize;

use crate::zone::{Zone, ZoneError};

// =============================================================================
// HTTP Response Headers
// =============================================================================

/// Content type for every JSON response
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Zone value - immutable for the process lifetime
pub const HTTP_CACHE_ZONE_MAX_AGE: u32 = 60;

/// Stale-if-error duration for upstream caches (5 minutes)
pub const HTTP_CACHE_STALE_IF_ERROR: u32 = 300;

pub const CACHE_CONTROL_ZONE: &str = formatcp!(
    "public, max-age={}, stale-if-error={}",
    HTTP_CACHE_ZONE_MAX_AGE,
    HTTP_CACHE_STALE_IF_ERROR
);

/// Response header carrying the per-request correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

// =============================================================================
// Defaults
// =============================================================================

/// Default configuration file path, used only when the file exists
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

pub const DEFAULT_HTTP_HOST: &str = "0.0.0.0";
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// Seconds to wait for in-flight requests on shutdown
pub const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 30;

/// Default log filter when neither --log-level nor RUST_LOG is set
pub const DEFAULT_LOG_FILTER: &str = "zone_reporter=info,tower_http=info";

// =============================================================================
// Environment Variables
// =============================================================================

pub const ZONE_ENV: &str = "ZONE";

/// Relaxed binding of `eureka.instance.metadataMap.zone`
pub const EUREKA_ZONE_ENV: &str = "EUREKA_INSTANCE_METADATAMAP_ZONE";

pub const SERVER_PORT_ENV: &str = "SERVER_PORT";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Validated application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Zone reported by `GET /zone`
    pub zone: Zone,
    pub http: HttpServerConfig,
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "HttpServerConfig::default_host")]
    pub host: String,
    #[serde(default = "HttpServerConfig::default_port")]
    pub port: u16,
    #[serde(default = "HttpServerConfig::default_shutdown_grace")]
    pub shutdown_grace_seconds: u64,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            shutdown_grace_seconds: Self::default_shutdown_grace(),
        }
    }
}

impl HttpServerConfig {
    fn default_host() -> String {
        DEFAULT_HTTP_HOST.to_string()
    }

    fn default_port() -> u16 {
        DEFAULT_HTTP_PORT
    }

    fn default_shutdown_grace() -> u64 {
        DEFAULT_SHUTDOWN_GRACE_SECS
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(ConfigError::Validation(format!(
                "unknown log format '{}', expected 'text' or 'json'",
                other
            ))),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

/// On-disk layout of the TOML configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub zone: Option<String>,
    #[serde(default)]
    pub eureka: Option<EurekaSection>,
    #[serde(default)]
    pub http: HttpServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[eureka.instance.metadataMap]`, the key the zone was historically read from.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EurekaSection {
    #[serde(default)]
    pub instance: EurekaInstance,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EurekaInstance {
    #[serde(default, rename = "metadataMap")]
    pub metadata_map: EurekaMetadata,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EurekaMetadata {
    pub zone: Option<String>,
}

impl FileConfig {
    /// Parse a configuration file from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Read a configuration file from disk.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    fn zone(&self) -> Option<&str> {
        self.zone.as_deref().or_else(|| {
            self.eureka
                .as_ref()
                .and_then(|e| e.instance.metadata_map.zone.as_deref())
        })
    }
}

/// Values supplied on the command line; these win over every other source.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub zone: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub log_format: Option<LogFormat>,
}

impl AppConfig {
    /// Load configuration from the file at `path` (or the default path if it
    /// exists), the process environment, and `overrides`.
    pub fn load(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        let file = match config_path(path) {
            Some(path) => FileConfig::read(path)?,
            None => FileConfig::default(),
        };

        Self::resolve(file, |key| std::env::var(key).ok(), overrides)
    }

    /// Merge the file, environment and overrides, then validate.
    ///
    /// `env` looks up an environment variable by name. Variables that are set
    /// but blank count as unset.
    pub fn resolve<F>(
        file: FileConfig,
        env: F,
        overrides: &ConfigOverrides,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| env(key).filter(|value| !value.trim().is_empty());

        let raw_zone = overrides
            .zone
            .clone()
            .or_else(|| env(ZONE_ENV))
            .or_else(|| env(EUREKA_ZONE_ENV))
            .or_else(|| file.zone().map(str::to_string))
            .ok_or(ConfigError::MissingZone)?;
        let zone = Zone::new(raw_zone)?;

        let mut http = file.http;
        if let Some(port) = env(SERVER_PORT_ENV) {
            http.port = port.trim().parse().map_err(|_| {
                ConfigError::Validation(format!("{} is not a valid port: '{}'", SERVER_PORT_ENV, port))
            })?;
        }
        if let Some(host) = &overrides.host {
            http.host = host.clone();
        }
        if let Some(port) = overrides.port {
            http.port = port;
        }

        let mut logging = file.logging;
        if let Some(format) = env(LOG_FORMAT_ENV) {
            logging.format = format.parse()?;
        }
        if let Some(format) = overrides.log_format {
            logging.format = format;
        }

        Ok(Self {
            zone,
            http,
            logging,
        })
    }
}

/// The configuration file that will be read, if any: `explicit` when given,
/// otherwise the default path when a file exists there.
pub fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let default = Path::new(DEFAULT_CONFIG_PATH);
            default.is_file().then(|| default.to_path_buf())
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("No zone configured. Set `zone` in the config file, the ZONE environment variable, or --zone")]
    MissingZone,
    #[error("Configuration error: {0}")]
    Validation(String),
}

impl From<ZoneError> for ConfigError {
    fn from(err: ZoneError) -> Self {
        ConfigError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn no_env() -> impl Fn(&str) -> Option<String> {
        |_| None
    }

    #[test]
    fn test_parse_full_file() {
        let file = FileConfig::from_toml(
            r#"
            zone = "us-east-1"

            [http]
            host = "127.0.0.1"
            port = 9000
            shutdown_grace_seconds = 5

            [logging]
            format = "json"
            "#,
        )
        .unwrap();

        let config = AppConfig::resolve(file, no_env(), &ConfigOverrides::default()).unwrap();
        assert_eq!(config.zone.as_str(), "us-east-1");
        assert_eq!(config.http.host, "127.0.0.1");
        assert_eq!(config.http.port, 9000);
        assert_eq!(config.http.shutdown_grace_seconds, 5);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_defaults_when_sections_absent() {
        let file = FileConfig::from_toml(r#"zone = "eu-west-1""#).unwrap();
        let config = AppConfig::resolve(file, no_env(), &ConfigOverrides::default()).unwrap();
        assert_eq!(config.http.host, DEFAULT_HTTP_HOST);
        assert_eq!(config.http.port, DEFAULT_HTTP_PORT);
        assert_eq!(config.http.shutdown_grace_seconds, DEFAULT_SHUTDOWN_GRACE_SECS);
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn test_missing_zone_is_an_error() {
        let err = AppConfig::resolve(FileConfig::default(), no_env(), &ConfigOverrides::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingZone));
        assert!(err.to_string().contains("No zone configured"));
    }

    #[test]
    fn test_eureka_metadata_key() {
        let file = FileConfig::from_toml(
            r#"
            [eureka.instance.metadataMap]
            zone = "zone1"
            "#,
        )
        .unwrap();
        let config = AppConfig::resolve(file, no_env(), &ConfigOverrides::default()).unwrap();
        assert_eq!(config.zone.as_str(), "zone1");
    }

    #[test]
    fn test_top_level_zone_wins_over_eureka_key() {
        let file = FileConfig::from_toml(
            r#"
            zone = "top"
            [eureka.instance.metadataMap]
            zone = "nested"
            "#,
        )
        .unwrap();
        let config = AppConfig::resolve(file, no_env(), &ConfigOverrides::default()).unwrap();
        assert_eq!(config.zone.as_str(), "top");
    }

    #[test]
    fn test_env_overrides_file() {
        let file = FileConfig::from_toml(r#"zone = "from-file""#).unwrap();
        let env = env_of(&[(ZONE_ENV, "from-env"), (SERVER_PORT_ENV, "9090")]);
        let config = AppConfig::resolve(file, env, &ConfigOverrides::default()).unwrap();
        assert_eq!(config.zone.as_str(), "from-env");
        assert_eq!(config.http.port, 9090);
    }

    #[test]
    fn test_zone_env_wins_over_eureka_env() {
        let env = env_of(&[(ZONE_ENV, "plain"), (EUREKA_ZONE_ENV, "relaxed")]);
        let config =
            AppConfig::resolve(FileConfig::default(), env, &ConfigOverrides::default()).unwrap();
        assert_eq!(config.zone.as_str(), "plain");

        let env = env_of(&[(EUREKA_ZONE_ENV, "relaxed")]);
        let config =
            AppConfig::resolve(FileConfig::default(), env, &ConfigOverrides::default()).unwrap();
        assert_eq!(config.zone.as_str(), "relaxed");
    }

    #[test]
    fn test_overrides_win_over_env() {
        let env = env_of(&[(ZONE_ENV, "from-env"), (SERVER_PORT_ENV, "9090"), (LOG_FORMAT_ENV, "json")]);
        let overrides = ConfigOverrides {
            zone: Some("from-cli".to_string()),
            host: Some("127.0.0.1".to_string()),
            port: Some(7000),
            log_format: Some(LogFormat::Text),
        };
        let config = AppConfig::resolve(FileConfig::default(), env, &overrides).unwrap();
        assert_eq!(config.zone.as_str(), "from-cli");
        assert_eq!(config.http.host, "127.0.0.1");
        assert_eq!(config.http.port, 7000);
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn test_invalid_server_port_rejected() {
        let env = env_of(&[(ZONE_ENV, "z"), (SERVER_PORT_ENV, "http")]);
        let err = AppConfig::resolve(FileConfig::default(), env, &ConfigOverrides::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_invalid_log_format_rejected() {
        let env = env_of(&[(ZONE_ENV, "z"), (LOG_FORMAT_ENV, "xml")]);
        let err = AppConfig::resolve(FileConfig::default(), env, &ConfigOverrides::default())
            .unwrap_err();
        assert!(err.to_string().contains("xml"));
    }

    #[test]
    fn test_empty_zone_rejected() {
        let file = FileConfig::from_toml(r#"zone = "   ""#).unwrap();
        let err = AppConfig::resolve(file, no_env(), &ConfigOverrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_unresolved_placeholder_rejected() {
        let env = env_of(&[(ZONE_ENV, "${eureka.instance.metadataMap.zone}")]);
        let err = AppConfig::resolve(FileConfig::default(), env, &ConfigOverrides::default())
            .unwrap_err();
        assert!(err.to_string().contains("placeholder"));
    }

    #[test]
    fn test_malformed_toml() {
        let err = FileConfig::from_toml("zone = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "zone = \"ap-south-1\"\n[http]\nport = 8181").unwrap();

        let overrides = ConfigOverrides {
            zone: None,
            port: Some(8282),
            ..Default::default()
        };
        let file_config = FileConfig::read(file.path()).unwrap();
        let config = AppConfig::resolve(file_config, no_env(), &overrides).unwrap();
        assert_eq!(config.zone.as_str(), "ap-south-1");
        assert_eq!(config.http.port, 8282);
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = AppConfig::load(Some(&missing), &ConfigOverrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_blank_env_counts_as_unset() {
        let file = FileConfig::from_toml(r#"zone = "from-file""#).unwrap();
        let env = env_of(&[
            (ZONE_ENV, ""),
            (EUREKA_ZONE_ENV, "  "),
            (SERVER_PORT_ENV, ""),
            (LOG_FORMAT_ENV, ""),
        ]);
        let config = AppConfig::resolve(file, env, &ConfigOverrides::default()).unwrap();
        assert_eq!(config.zone.as_str(), "from-file");
        assert_eq!(config.http.port, DEFAULT_HTTP_PORT);
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn test_blank_env_alone_is_missing_zone() {
        let env = env_of(&[(ZONE_ENV, "")]);
        let err = AppConfig::resolve(FileConfig::default(), env, &ConfigOverrides::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingZone));
    }

    #[test]
    fn test_config_path_explicit() {
        let path = Path::new("/nonexistent/zone.toml");
        assert_eq!(config_path(Some(path)), Some(path.to_path_buf()));
    }

    #[test]
    fn test_config_path_default_only_when_present() {
        let expected = Path::new(DEFAULT_CONFIG_PATH)
            .is_file()
            .then(|| PathBuf::from(DEFAULT_CONFIG_PATH));
        assert_eq!(config_path(None), expected);
    }

    #[test]
    fn test_cache_control_value() {
        assert_eq!(CACHE_CONTROL_ZONE, "public, max-age=60, stale-if-error=300");
    }
}
