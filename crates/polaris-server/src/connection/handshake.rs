use super::*;

use polaris_proto::packets::Handshake;

impl Session {
    /// Switch to the state the client asked for. An invalid code ends the
    /// connection before anything else is read.
    pub(super) fn handle_handshake(&self, packet: Handshake) -> Result<(), SessionError> {
        let next = packet.requested_state()?;
        if packet.protocol_version != polaris_proto::packets::PROTOCOL_VERSION {
            debug!(
                conn = self.id,
                version = packet.protocol_version,
                "client speaks a different protocol version"
            );
        }
        debug!(
            conn = self.id,
            address = %packet.server_address,
            port = packet.server_port,
            state = %next,
            "handshake"
        );
        self.set_state(next);
        Ok(())
    }
}
