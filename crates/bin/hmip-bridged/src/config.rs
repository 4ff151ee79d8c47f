//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `hmip-bridge.toml` in the working directory. Every field has a
//! default so the file is optional, except the session credentials which
//! must come from the file or the environment. Environment variables take
//! precedence over file values.

use std::path::PathBuf;
use std::time::Duration;

use hmip_bridge_adapter_mqtt::MqttConfig;
use hmip_bridge_app::supervisor::SupervisorConfig;
use serde::Deserialize;

const CONFIG_FILE: &str = "hmip-bridge.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// MQTT broker settings.
    pub mqtt: MqttConfig,
    /// Automation session settings.
    pub session: SessionConfig,
    /// Bridge behaviour.
    pub bridge: BridgeConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Automation session credentials and source.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Access point identifier (SGTIN) of the home.
    pub access_point: Option<String>,
    /// Auth token registered for the access point.
    pub auth_token: Option<String>,
    /// Fixture served by the virtual session. The bundled demo home is used
    /// when unset.
    pub fixture: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Log publishes instead of sending them.
    pub no_publish: bool,
    /// First reconnect delay, in seconds.
    pub reconnect_delay_secs: u64,
    /// Reconnect delay ceiling, in seconds.
    pub max_reconnect_delay_secs: u64,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
    /// Force the `debug` level everywhere.
    pub debug: bool,
}

impl Config {
    /// Load configuration from `hmip-bridge.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// result is invalid or lacks session credentials.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file(CONFIG_FILE)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(
        &mut self,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(val) = var("HMIP_BRIDGE_MQTT_HOST") {
            self.mqtt.host = val;
        }
        if let Some(val) = var("HMIP_BRIDGE_MQTT_PORT") {
            self.mqtt.port = val.trim().parse().map_err(|_| {
                ConfigError::Validation(format!(
                    "HMIP_BRIDGE_MQTT_PORT is not a valid port: {val:?}"
                ))
            })?;
        }
        if let Some(val) = var("HMIP_BRIDGE_MQTT_USERNAME") {
            self.mqtt.username = Some(val);
        }
        if let Some(val) = var("HMIP_BRIDGE_MQTT_PASSWORD") {
            self.mqtt.password = Some(val);
        }
        if let Some(val) = var("HMIP_BRIDGE_ACCESS_POINT") {
            self.session.access_point = Some(val);
        }
        if let Some(val) = var("HMIP_BRIDGE_AUTH_TOKEN") {
            self.session.auth_token = Some(val);
        }
        if let Some(val) = var("HMIP_BRIDGE_NO_PUBLISH") {
            self.bridge.no_publish = is_enabled(&val);
        }
        if let Some(val) = var("HMIP_BRIDGE_DEBUG") {
            self.logging.debug = is_enabled(&val);
        }
        if let Some(val) = var("HMIP_BRIDGE_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.mqtt.port == 0 {
            return Err(ConfigError::Validation(
                "mqtt port must be non-zero".to_string(),
            ));
        }
        if self.bridge.reconnect_delay_secs == 0 {
            return Err(ConfigError::Validation(
                "reconnect delay must be non-zero".to_string(),
            ));
        }
        if self.bridge.max_reconnect_delay_secs < self.bridge.reconnect_delay_secs {
            return Err(ConfigError::Validation(
                "max reconnect delay must not be below the reconnect delay".to_string(),
            ));
        }
        if is_blank(self.session.access_point.as_deref()) {
            return Err(ConfigError::MissingCredentials(
                "session.access_point (HMIP_BRIDGE_ACCESS_POINT)",
            ));
        }
        if is_blank(self.session.auth_token.as_deref()) {
            return Err(ConfigError::MissingCredentials(
                "session.auth_token (HMIP_BRIDGE_AUTH_TOKEN)",
            ));
        }
        Ok(())
    }

    /// Reconnect policy for the session supervisor.
    #[must_use]
    pub fn supervisor(&self) -> SupervisorConfig {
        SupervisorConfig {
            reconnect_delay: Duration::from_secs(self.bridge.reconnect_delay_secs),
            max_reconnect_delay: Duration::from_secs(self.bridge.max_reconnect_delay_secs),
        }
    }

    /// Effective log filter directive.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        if self.logging.debug {
            "debug"
        } else {
            &self.logging.filter
        }
    }
}

fn is_enabled(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            no_publish: false,
            reconnect_delay_secs: 1,
            max_reconnect_delay_secs: 60,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info,rumqttc=warn".to_string(),
            debug: false,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
    /// A session credential is missing.
    #[error("missing session credential: set {0}")]
    MissingCredentials(&'static str),
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn with_credentials() -> Config {
        let mut config = Config::default();
        config.session.access_point = Some("3014-F711-A000-0000-0000-0001".to_string());
        config.session.auth_token = Some("token".to_string());
        config
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.mqtt.host, "localhost");
        assert_eq!(config.mqtt.port, 1883);
        assert!(!config.bridge.no_publish);
        assert_eq!(config.bridge.reconnect_delay_secs, 1);
        assert_eq!(config.bridge.max_reconnect_delay_secs, 60);
        assert!(!config.logging.debug);
        assert!(config.session.fixture.is_none());
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.mqtt.port, 1883);
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [mqtt]
            host = 'broker.lan'
            port = 1884
            username = 'bridge'
            password = 'secret'
            client_id = 'hmip'

            [session]
            access_point = '3014F711A0000000000000001'
            auth_token = 'abc'
            fixture = 'home.toml'

            [bridge]
            no_publish = true
            reconnect_delay_secs = 2
            max_reconnect_delay_secs = 30

            [logging]
            filter = 'warn'
            debug = true
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.mqtt.host, "broker.lan");
        assert_eq!(config.mqtt.port, 1884);
        assert_eq!(config.mqtt.username.as_deref(), Some("bridge"));
        assert_eq!(config.mqtt.client_id, "hmip");
        assert_eq!(config.session.auth_token.as_deref(), Some("abc"));
        assert_eq!(config.session.fixture, Some(PathBuf::from("home.toml")));
        assert!(config.bridge.no_publish);
        assert_eq!(config.logging.filter, "warn");
        assert!(config.logging.debug);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.mqtt.port, 1883);
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }

    #[test]
    fn should_require_auth_token() {
        let mut config = with_credentials();
        config.session.auth_token = None;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredentials(_)));
        assert_eq!(
            err.to_string(),
            "missing session credential: set session.auth_token (HMIP_BRIDGE_AUTH_TOKEN)"
        );
    }

    #[test]
    fn should_treat_blank_access_point_as_missing() {
        let mut config = with_credentials();
        config.session.access_point = Some("  ".to_string());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingCredentials(_))
        ));
    }

    #[test]
    fn should_reject_zero_port() {
        let mut config = with_credentials();
        config.mqtt.port = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn should_reject_inverted_reconnect_delays() {
        let mut config = with_credentials();
        config.bridge.reconnect_delay_secs = 10;
        config.bridge.max_reconnect_delay_secs = 5;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn should_apply_env_overrides() {
        let mut config = Config::default();
        config.apply_overrides(env(&[
            ("HMIP_BRIDGE_MQTT_HOST", "10.0.0.2"),
            ("HMIP_BRIDGE_MQTT_PORT", "8883"),
            ("HMIP_BRIDGE_MQTT_USERNAME", "user"),
            ("HMIP_BRIDGE_MQTT_PASSWORD", "pass"),
            ("HMIP_BRIDGE_ACCESS_POINT", "ap"),
            ("HMIP_BRIDGE_AUTH_TOKEN", "token"),
            ("HMIP_BRIDGE_NO_PUBLISH", "true"),
            ("HMIP_BRIDGE_DEBUG", "1"),
        ]))
        .unwrap();
        assert_eq!(config.mqtt.host, "10.0.0.2");
        assert_eq!(config.mqtt.port, 8883);
        assert_eq!(config.mqtt.username.as_deref(), Some("user"));
        assert_eq!(config.mqtt.password.as_deref(), Some("pass"));
        assert_eq!(config.session.access_point.as_deref(), Some("ap"));
        assert!(config.bridge.no_publish);
        assert!(config.logging.debug);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_reject_unparsable_port_override() {
        let mut config = Config::default();
        let err = config
            .apply_overrides(env(&[("HMIP_BRIDGE_MQTT_PORT", "abc")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert_eq!(
            err.to_string(),
            "invalid configuration: HMIP_BRIDGE_MQTT_PORT is not a valid port: \"abc\""
        );
        assert_eq!(config.mqtt.port, 1883);
    }

    #[test]
    fn should_prefer_rust_log_over_bridge_log() {
        let mut config = Config::default();
        config.apply_overrides(env(&[
            ("HMIP_BRIDGE_LOG", "warn"),
            ("RUST_LOG", "trace"),
        ]))
        .unwrap();
        assert_eq!(config.log_filter(), "trace");
    }

    #[test]
    fn should_force_debug_filter() {
        let mut config = Config::default();
        config.logging.debug = true;
        assert_eq!(config.log_filter(), "debug");
    }

    #[test]
    fn should_build_supervisor_config() {
        let config = Config::default();
        let supervisor = config.supervisor();
        assert_eq!(supervisor.reconnect_delay, Duration::from_secs(1));
        assert_eq!(supervisor.max_reconnect_delay, Duration::from_secs(60));
    }
}
