//! Runtime configuration for a membership node.
//!
//! Values come from command line flags (with `CLIP_*` environment overrides,
//! see `cli`) and are validated once at startup; after that the configuration
//! is immutable for the lifetime of the process.

use std::time::Duration;

use anyhow::{bail, Result};

#[derive(Debug, Clone)]
pub struct Config {
    /// Cluster-unique identity of this node. Required.
    pub id: String,
    /// Interface the HTTP server binds.
    pub bind_address: String,
    /// Host other nodes use to reach us; auto-detected when empty.
    pub advertise_address: String,
    /// HTTP port.
    pub port: u16,
    /// UDP port shared by all nodes for broadcast discovery.
    pub broadcast_port: u16,
    /// Base URLs contacted with a `join` at startup.
    pub seed_nodes: Vec<String>,

    pub heartbeat_interval: Duration,
    pub peer_timeout: Duration,
    pub gossip_interval: Duration,
    pub broadcast_interval: Duration,

    pub log_level: String,
    pub log_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            id: String::new(),
            bind_address: "0.0.0.0".to_string(),
            advertise_address: String::new(),
            port: 8080,
            broadcast_port: 9999,
            seed_nodes: Vec::new(),
            heartbeat_interval: Duration::from_secs(5),
            peer_timeout: Duration::from_secs(15),
            gossip_interval: Duration::from_secs(10),
            broadcast_interval: Duration::from_secs(10),
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            bail!("service id is required");
        }
        if self.port == 0 {
            bail!("port must be between 1 and 65535");
        }
        if self.broadcast_port == 0 {
            bail!("broadcast port must be between 1 and 65535");
        }
        if self.heartbeat_interval.is_zero() {
            bail!("heartbeat interval must be positive");
        }
        if self.peer_timeout.is_zero() {
            bail!("peer timeout must be positive");
        }
        if self.gossip_interval.is_zero() {
            bail!("gossip interval must be positive");
        }
        if self.broadcast_interval.is_zero() {
            bail!("broadcast interval must be positive");
        }
        Ok(())
    }
}
