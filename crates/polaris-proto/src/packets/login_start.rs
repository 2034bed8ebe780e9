//! LoginStart (0x00): Client → Server.

use bytes::Buf;

use crate::codec::{self, ProtoDecode};
use crate::error::ProtoError;

/// Longest username the client is allowed to send.
pub const MAX_USERNAME_LENGTH: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginStart {
    pub username: String,
}

impl LoginStart {
    /// Usernames are 1..=16 characters of `[A-Za-z0-9_]`.
    pub fn is_valid_username(name: &str) -> bool {
        !name.is_empty()
            && name.len() <= MAX_USERNAME_LENGTH
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    }
}

impl ProtoDecode for LoginStart {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        Ok(Self {
            username: codec::read_bounded_string(buf, MAX_USERNAME_LENGTH)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_rules() {
        assert!(LoginStart::is_valid_username("alice"));
        assert!(LoginStart::is_valid_username("Steve_1234567890"));
        assert!(!LoginStart::is_valid_username(""));
        assert!(!LoginStart::is_valid_username("has space"));
        assert!(!LoginStart::is_valid_username("seventeen_chars_x"));
    }
}
