use std::net::SocketAddr;
use serde::{Deserialize, Serialize};
use common::config::Validate;

pub const DEFAULT_CONFIG_FILE: &str = "snek_server.yaml";

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_address: String,
    /// Capacity of each session's outbound channel.
    pub outbound_buffer: usize,
}

impl ServerConfig {
    pub fn socket_address(&self) -> Result<SocketAddr, String> {
        self.listen_address
            .parse()
            .map_err(|e| format!("invalid listen_address {:?}: {}", self.listen_address, e))
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<(), String> {
        self.socket_address()?;
        if self.outbound_buffer == 0 {
            return Err("outbound_buffer must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: "[::]:6000".to_string(),
            outbound_buffer: 128,
        }
    }
}
