use polaris_proto::error::ProtoError;
use polaris_proto::state::ProtocolState;
use thiserror::Error;

/// Failure that ends one connection. Never propagates to other sessions.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtoError),

    #[error("already logged in")]
    AlreadyLoggedIn,

    #[error("play packet before login")]
    NotLoggedIn,

    #[error("invalid keep-alive: expected {expected:?}, received {received}")]
    InvalidKeepAlive { expected: Option<i32>, received: i32 },

    #[error("unexpected packet {packet} in state {state}")]
    UnexpectedPacket {
        packet: &'static str,
        state: ProtocolState,
    },

    #[error("server is full")]
    ServerFull,

    #[error("invalid username {0:?}")]
    InvalidUsername(String),

    #[error("no complete frame within the read timeout")]
    TimedOut,

    #[error("failed to encode status document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SessionError {
    /// Text shown to the client when this error closes its connection.
    pub fn disconnect_reason(&self) -> &'static str {
        match self {
            SessionError::Protocol(_) | SessionError::UnexpectedPacket { .. } => "Protocol error",
            SessionError::AlreadyLoggedIn => "Already logged in",
            SessionError::NotLoggedIn => "Not logged in",
            SessionError::InvalidKeepAlive { .. } => "invalid keep-alive",
            SessionError::ServerFull => "Server is full",
            SessionError::InvalidUsername(_) => "Invalid username",
            SessionError::TimedOut => "Timed out",
            SessionError::Json(_) | SessionError::Io(_) => "Internal error",
        }
    }
}
