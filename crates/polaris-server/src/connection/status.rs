use super::*;

use polaris_proto::packets::{Ping, StatusDocument, StatusResponse};

/// Version name advertised in the server list.
const VERSION_NAME: &str = "Polaris 1.8";

impl Session {
    pub(super) fn handle_status_request(&self) -> Result<(), SessionError> {
        let world = &self.ctx.world;
        let mut document = StatusDocument::new(
            VERSION_NAME,
            self.ctx.config.server.max_players,
            world.player_count() as u32,
            self.ctx.config.server.motd.as_str(),
        );
        document.favicon = self.ctx.favicon.clone();

        let json = serde_json::to_string(&document)?;
        self.send_packet(ClientboundPacket::StatusResponse(StatusResponse::new(json)));
        Ok(())
    }

    /// Echo the payload, then close: a status connection ends after the ping.
    pub(super) fn handle_status_ping(&self, ping: Ping) {
        self.send_packet(ClientboundPacket::StatusPong(ping));
        self.disconnect("status complete");
    }
}
