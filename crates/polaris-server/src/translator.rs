//! Hook for an external protocol translator sitting between framing and
//! packet decode/encode.

use bytes::Bytes;

/// Outcome of passing one frame payload through the translator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translated {
    /// Continue with these bytes (possibly rewritten).
    Forward(Bytes),
    /// Drop the frame.
    Cancel,
}

/// Byte-to-byte filter keyed by connection id.
///
/// `inbound` sees every frame payload before packet decode, `outbound` every
/// encoded packet before framing.
pub trait FrameTranslator: Send + Sync {
    fn inbound(&self, connection: u64, frame: Bytes) -> Translated;

    fn outbound(&self, connection: u64, frame: Bytes) -> Translated;

    /// Forget per-connection state.
    fn connection_closed(&self, _connection: u64) {}
}
