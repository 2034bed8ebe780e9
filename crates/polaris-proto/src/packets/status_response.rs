//! StatusResponse (0x00): Server → Client.
//!
//! Carries the server list document as a JSON string.

use bytes::BufMut;
use serde::Serialize;

use crate::codec::{self, ProtoEncode};
use crate::packets::PROTOCOL_VERSION;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusVersion {
    pub name: String,
    pub protocol: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusPlayers {
    pub max: u32,
    pub online: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusDescription {
    pub text: String,
}

/// The document shown in the client's server list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusDocument {
    pub version: StatusVersion,
    pub players: StatusPlayers,
    pub description: StatusDescription,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
}

impl StatusDocument {
    pub fn new(version_name: impl Into<String>, max: u32, online: u32, motd: impl Into<String>) -> Self {
        Self {
            version: StatusVersion {
                name: version_name.into(),
                protocol: PROTOCOL_VERSION,
            },
            players: StatusPlayers { max, online },
            description: StatusDescription { text: motd.into() },
            favicon: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StatusResponse {
    pub json: String,
}

impl StatusResponse {
    pub fn new(json: impl Into<String>) -> Self {
        Self { json: json.into() }
    }
}

impl ProtoEncode for StatusResponse {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        codec::write_string(buf, &self.json);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::read_string;
    use bytes::BytesMut;

    #[test]
    fn document_shape() {
        let doc = StatusDocument::new("Polaris 1.8", 100, 3, "A Polaris server");
        let value: serde_json::Value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["version"]["protocol"], 47);
        assert_eq!(value["players"]["max"], 100);
        assert_eq!(value["players"]["online"], 3);
        assert_eq!(value["description"]["text"], "A Polaris server");
        assert!(value.get("favicon").is_none());
    }

    #[test]
    fn encode_is_plain_string() {
        let mut buf = BytesMut::new();
        StatusResponse::new("{}").proto_encode(&mut buf);
        assert_eq!(read_string(&mut buf.freeze()).unwrap(), "{}");
    }
}
