use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    pub server: ServerSection,
    #[serde(default)]
    pub world: WorldSection,
    #[serde(default)]
    pub network: NetworkSection,
    pub logging: LoggingSection,
}

#[derive(Debug, Deserialize)]
pub struct ServerSection {
    pub address: String,
    pub port: u16,
    pub motd: String,
    pub max_players: u32,
    /// Server-side cap on the streaming radius, in chunks.
    #[serde(default = "default_view_distance")]
    pub view_distance: u8,
    /// Seconds without a complete frame before a connection is dropped.
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,
    #[serde(default)]
    pub unknown_packet_policy: UnknownPacketPolicy,
    /// Path to a 64x64 PNG advertised in the status response.
    #[serde(default)]
    pub favicon: Option<String>,
}

fn default_view_distance() -> u8 {
    5
}

fn default_read_timeout() -> u64 {
    30
}

/// What to do with a packet id the current state does not know.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownPacketPolicy {
    #[default]
    Disconnect,
    Ignore,
}

#[derive(Debug, Deserialize)]
pub struct WorldSection {
    #[serde(default = "default_world_name")]
    pub name: String,
    /// Chunks per side of the square world grid.
    #[serde(default = "default_world_size")]
    pub size: u32,
    #[serde(default = "default_spawn")]
    pub spawn: SpawnSection,
}

fn default_world_name() -> String {
    "world".into()
}

fn default_world_size() -> u32 {
    32
}

fn default_spawn() -> SpawnSection {
    SpawnSection {
        x: 125.0,
        y: 6.0,
        z: 125.0,
    }
}

impl Default for WorldSection {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            size: default_world_size(),
            spawn: default_spawn(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SpawnSection {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Deserialize)]
pub struct NetworkSection {
    /// Runtime worker threads. 0 = available parallelism.
    #[serde(default)]
    pub workers: usize,
    #[serde(default = "default_keep_alive_interval")]
    pub keep_alive_interval_secs: u64,
    /// Seconds one outbound burst may take to reach the socket before the
    /// connection is dropped as stalled.
    #[serde(default = "default_write_timeout")]
    pub write_timeout_secs: u64,
}

fn default_keep_alive_interval() -> u64 {
    5
}

fn default_write_timeout() -> u64 {
    10
}

impl Default for NetworkSection {
    fn default() -> Self {
        Self {
            workers: 0,
            keep_alive_interval_secs: default_keep_alive_interval(),
            write_timeout_secs: default_write_timeout(),
        }
    }
}

impl NetworkSection {
    pub fn worker_threads(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }
}

#[derive(Debug, Deserialize)]
pub struct LoggingSection {
    pub level: String,
}

impl ServerConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.address, self.server.port)
    }
}
