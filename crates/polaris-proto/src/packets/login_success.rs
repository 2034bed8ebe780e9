//! LoginSuccess (0x02): Server → Client.

use bytes::BufMut;

use crate::codec::{self, ProtoEncode};
use crate::types::Uuid;

/// Completes login and moves the client into the play state.
#[derive(Debug, Clone)]
pub struct LoginSuccess {
    pub uuid: Uuid,
    pub username: String,
}

impl ProtoEncode for LoginSuccess {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        // Protocol 47 sends the UUID as its hyphenated text form.
        codec::write_string(buf, &self.uuid.to_string());
        codec::write_string(buf, &self.username);
    }
}
