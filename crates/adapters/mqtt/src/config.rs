//! MQTT broker configuration.

use std::time::Duration;

use rumqttc::MqttOptions;
use serde::Deserialize;

/// Connection settings for the MQTT broker.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    /// Broker hostname or IP address.
    pub host: String,
    /// Broker port.
    pub port: u16,
    /// Username, if the broker requires authentication.
    pub username: Option<String>,
    /// Password, used together with `username`.
    pub password: Option<String>,
    /// Client identifier. Defaults to `homematicip-mqtt-` and a random suffix.
    pub client_id: String,
    /// Keep-alive interval in seconds.
    pub keep_alive_secs: u16,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1883,
            username: None,
            password: None,
            client_id: random_client_id(),
            keep_alive_secs: 30,
        }
    }
}

fn random_client_id() -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("homematicip-mqtt-{}", &suffix[..8])
}

impl MqttConfig {
    pub(crate) fn options(&self) -> MqttOptions {
        let mut options = MqttOptions::new(&self.client_id, &self.host, self.port);
        options.set_keep_alive(Duration::from_secs(u64::from(self.keep_alive_secs)));
        options.set_clean_session(true);
        if let Some(username) = &self.username {
            options.set_credentials(username, self.password.as_deref().unwrap_or_default());
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_have_sensible_defaults() {
        let config = MqttConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 1883);
        assert!(config.username.is_none());
        assert_eq!(config.keep_alive_secs, 30);
        assert!(config.client_id.starts_with("homematicip-mqtt-"));
        assert_eq!(config.client_id.len(), "homematicip-mqtt-".len() + 8);
    }

    #[test]
    fn should_randomize_default_client_id() {
        assert_ne!(MqttConfig::default().client_id, MqttConfig::default().client_id);
    }

    #[test]
    fn should_deserialize_from_toml() {
        let toml = r#"
            host = "mqtt.example.com"
            port = 8883
            username = "bridge"
            password = "secret"
            client_id = "my-bridge"
            keep_alive_secs = 60
        "#;
        let config: MqttConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.host, "mqtt.example.com");
        assert_eq!(config.port, 8883);
        assert_eq!(config.username.as_deref(), Some("bridge"));
        assert_eq!(config.password.as_deref(), Some("secret"));
        assert_eq!(config.client_id, "my-bridge");
        assert_eq!(config.keep_alive_secs, 60);
    }

    #[test]
    fn should_use_defaults_for_missing_fields() {
        let toml = r#"host = "192.168.1.100""#;
        let config: MqttConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.host, "192.168.1.100");
        assert_eq!(config.port, 1883);
        assert!(config.client_id.starts_with("homematicip-mqtt-"));
    }

    #[test]
    fn should_build_client_options() {
        let config = MqttConfig {
            host: "broker".to_string(),
            port: 1884,
            client_id: "bridge-1".to_string(),
            keep_alive_secs: 15,
            ..MqttConfig::default()
        };
        let options = config.options();
        assert_eq!(options.broker_address(), ("broker".to_string(), 1884));
        assert_eq!(options.client_id(), "bridge-1");
        assert_eq!(options.keep_alive(), Duration::from_secs(15));
    }
}
