use common::config::Validate;
use common::games::snake::{BoundaryMode, FieldSize};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "snek_client.yaml";

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ClientConfig {
    /// Relay to join; offline play when absent or empty.
    pub server_address: Option<String>,
    pub wrap: bool,
    pub field_width: i32,
    pub field_height: i32,
    pub initial_length: usize,
    pub tick_interval_ms: u64,
    pub local_players: usize,
    pub outbound_buffer: usize,
    pub log_file: String,
}

impl ClientConfig {
    pub fn field(&self) -> FieldSize {
        FieldSize::new(self.field_width, self.field_height)
    }

    pub fn boundary(&self) -> BoundaryMode {
        if self.wrap {
            BoundaryMode::Wrap
        } else {
            BoundaryMode::Bounded
        }
    }

    pub fn server_address(&self) -> Option<&str> {
        self.server_address.as_deref().filter(|address| !address.is_empty())
    }

    pub fn is_online(&self) -> bool {
        self.server_address().is_some()
    }
}

impl Validate for ClientConfig {
    fn validate(&self) -> Result<(), String> {
        if self.field_width < 2 || self.field_height < 2 {
            return Err(format!(
                "field must be at least 2x2, got {}x{}",
                self.field_width, self.field_height
            ));
        }
        // Cells are two columns wide and terminals address columns with u16.
        if self.field_width > i32::from(u16::MAX / 2) || self.field_height > i32::from(u16::MAX) {
            return Err(format!(
                "field {}x{} does not fit a terminal",
                self.field_width, self.field_height
            ));
        }
        if self.initial_length == 0 || self.initial_length as i64 > i64::from(self.field_width) {
            return Err(format!(
                "initial_length must be between 1 and field_width ({}), got {}",
                self.field_width, self.initial_length
            ));
        }
        if self.tick_interval_ms == 0 {
            return Err("tick_interval_ms must be greater than 0".to_string());
        }
        if !(1..=2).contains(&self.local_players) {
            return Err(format!("local_players must be 1 or 2, got {}", self.local_players));
        }
        if self.is_online() && self.local_players != 1 {
            return Err("online play supports exactly one local player".to_string());
        }
        if self.outbound_buffer == 0 {
            return Err("outbound_buffer must be greater than 0".to_string());
        }
        if self.log_file.is_empty() {
            return Err("log_file must not be empty".to_string());
        }
        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_address: None,
            wrap: false,
            field_width: 50,
            field_height: 50,
            initial_length: 10,
            tick_interval_ms: 75,
            local_players: 1,
            outbound_buffer: 128,
            log_file: "snek_client.log".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::config::{ConfigSerializer, YamlConfigSerializer};

    #[test]
    fn test_default_config_is_valid() {
        assert!(ClientConfig::default().validate().is_ok());
        assert!(!ClientConfig::default().is_online());
    }

    #[test]
    fn test_default_config_round_trips_through_yaml() {
        let serializer = YamlConfigSerializer;
        let content = serializer.serialize(&ClientConfig::default()).unwrap();
        let restored: ClientConfig = serializer.deserialize(&content).unwrap();
        assert_eq!(restored, ClientConfig::default());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: ClientConfig = YamlConfigSerializer
            .deserialize("server_address: \"http://[::1]:6000\"\nwrap: true\n")
            .unwrap();

        assert!(config.is_online());
        assert_eq!(config.boundary(), BoundaryMode::Wrap);
        assert_eq!(config.field(), FieldSize::new(50, 50));
    }

    #[test]
    fn test_empty_server_address_means_offline() {
        let config = ClientConfig {
            server_address: Some(String::new()),
            local_players: 2,
            ..Default::default()
        };

        assert!(config.validate().is_ok());
        assert!(!config.is_online());
        assert_eq!(config.server_address(), None);

        let from_yaml: ClientConfig = YamlConfigSerializer.deserialize("server_address: \"\"\n").unwrap();
        assert!(!from_yaml.is_online());
    }

    #[test]
    fn test_online_play_requires_single_local_player() {
        let config = ClientConfig {
            server_address: Some("http://[::1]:6000".to_string()),
            local_players: 2,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let offline = ClientConfig {
            local_players: 2,
            ..Default::default()
        };
        assert!(offline.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_values() {
        let cases = [
            ClientConfig { field_width: 1, ..Default::default() },
            ClientConfig { initial_length: 0, ..Default::default() },
            ClientConfig { initial_length: 51, ..Default::default() },
            ClientConfig { tick_interval_ms: 0, ..Default::default() },
            ClientConfig { local_players: 3, ..Default::default() },
            ClientConfig { outbound_buffer: 0, ..Default::default() },
        ];
        for config in cases {
            assert!(config.validate().is_err(), "{:?} should be rejected", config);
        }
    }
}
