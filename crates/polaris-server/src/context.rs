//! Everything a connection needs from the server, constructed once in `main`
//! and shared by reference.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use polaris_proto::registry::PacketRegistry;
use polaris_scheduler::Scheduler;

use crate::config::{ServerConfig, UnknownPacketPolicy};
use crate::translator::FrameTranslator;
use crate::world::World;

pub struct ServerContext {
    pub config: Arc<ServerConfig>,
    pub world: Arc<World>,
    pub scheduler: Scheduler,
    pub registry: PacketRegistry,
    pub translator: Option<Arc<dyn FrameTranslator>>,
    /// `data:image/png;base64,...` for the status response.
    pub favicon: Option<String>,
    next_connection_id: AtomicU64,
}

impl ServerContext {
    pub fn new(config: Arc<ServerConfig>, world: Arc<World>, scheduler: Scheduler) -> Self {
        Self {
            config,
            world,
            scheduler,
            registry: PacketRegistry::java_47(),
            translator: None,
            favicon: None,
            next_connection_id: AtomicU64::new(0),
        }
    }

    pub fn with_translator(mut self, translator: Arc<dyn FrameTranslator>) -> Self {
        self.translator = Some(translator);
        self
    }

    pub fn with_favicon(mut self, favicon: String) -> Self {
        self.favicon = Some(favicon);
        self
    }

    pub fn next_connection_id(&self) -> u64 {
        self.next_connection_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.config.server.read_timeout_secs)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.config.network.write_timeout_secs)
    }

    pub fn keep_alive_interval(&self) -> Duration {
        Duration::from_secs(self.config.network.keep_alive_interval_secs)
    }

    pub fn unknown_packet_policy(&self) -> UnknownPacketPolicy {
        self.config.server.unknown_packet_policy
    }
}

/// Read a PNG and wrap it as a status-response data URI.
pub fn load_favicon<P: AsRef<Path>>(path: P) -> std::io::Result<String> {
    let png = std::fs::read(path)?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn favicon_is_data_uri() {
        let path = std::env::temp_dir().join(format!("polaris-favicon-{}.png", std::process::id()));
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();
        let uri = load_favicon(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(uri, "data:image/png;base64,iVBORw==");
        assert!(load_favicon(path).is_err());
    }
}
