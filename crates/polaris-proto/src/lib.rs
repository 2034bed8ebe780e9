//! Minecraft Java Edition (protocol 47) wire types, framing and packet definitions.

pub mod chat;
pub mod codec;
pub mod error;
pub mod frame;
pub mod metadata;
pub mod packets;
pub mod registry;
pub mod state;
pub mod types;
