//! In-memory sessions and a scripted client for unit tests.

use std::sync::Arc;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use futures::{SinkExt, StreamExt};
use polaris_proto::codec::{read_string, ProtoDecode, ProtoEncode};
use polaris_proto::frame::FrameCodec;
use polaris_proto::packets::id;
use polaris_proto::state::ProtocolState;
use polaris_proto::types::VarInt;
use polaris_scheduler::Scheduler;
use polaris_world::flat_generator::FlatWorld;
use polaris_world::Location;
use tokio::io::{DuplexStream, ReadHalf, WriteHalf};
use tokio::task::JoinHandle;
use tokio_util::codec::{FramedRead, FramedWrite};

use crate::config::ServerConfig;
use crate::connection::Session;
use crate::context::ServerContext;
use crate::translator::FrameTranslator;
use crate::world::World;

const TEST_CONFIG: &str = r#"
[server]
address = "127.0.0.1"
port = 0
motd = "Polaris test"
max_players = 10

[logging]
level = "debug"
"#;

const PIPE_CAPACITY: usize = 16 * 1024 * 1024;

pub fn context(world_size: u32, max_players: u32) -> Arc<ServerContext> {
    context_with(world_size, max_players, |_| {})
}

/// A context over a fresh flat world, with `configure` applied last.
pub fn context_with(
    world_size: u32,
    max_players: u32,
    configure: impl FnOnce(&mut ServerConfig),
) -> Arc<ServerContext> {
    Arc::new(build(world_size, max_players, configure))
}

pub fn context_with_translator(
    world_size: u32,
    translator: Arc<dyn FrameTranslator>,
) -> Arc<ServerContext> {
    Arc::new(build(world_size, 10, |_| {}).with_translator(translator))
}

fn build(
    world_size: u32,
    max_players: u32,
    configure: impl FnOnce(&mut ServerConfig),
) -> ServerContext {
    let mut config: ServerConfig = toml::from_str(TEST_CONFIG).unwrap();
    config.server.max_players = max_players;
    config.world.size = world_size;
    config.world.spawn.x = 8.0;
    config.world.spawn.z = 8.0;
    configure(&mut config);

    let spawn = config.world.spawn;
    let provider = FlatWorld::generate(
        config.world.size as i32,
        Location::new(spawn.x, spawn.y, spawn.z),
    );
    let world = World::new(
        Arc::new(provider),
        config.server.max_players as usize,
        config.server.view_distance,
    );
    let scheduler = Scheduler::new(tokio::runtime::Handle::current()).unwrap();
    ServerContext::new(Arc::new(config), Arc::new(world), scheduler)
}

/// Frame payload: packet id then body.
pub fn frame(packet_id: i32, body: &[u8]) -> Bytes {
    let mut buf = BytesMut::new();
    VarInt(packet_id).proto_encode(&mut buf);
    buf.extend_from_slice(body);
    buf.freeze()
}

/// A session whose read loop is not running; tests feed it frames directly.
pub fn session(ctx: &Arc<ServerContext>) -> (Arc<Session>, Client) {
    let (server, client) = tokio::io::duplex(PIPE_CAPACITY);
    let session = Session::new(Arc::clone(ctx), None, Box::new(server));
    (session, Client::new(client))
}

/// A session driven by its own read loop, as the listener would spawn it.
pub fn spawn_connection(ctx: &Arc<ServerContext>) -> (Arc<Session>, Client, JoinHandle<()>) {
    let (server, client) = tokio::io::duplex(PIPE_CAPACITY);
    let (reader, writer) = tokio::io::split(server);
    let session = Session::new(Arc::clone(ctx), None, Box::new(writer));
    let handle = tokio::spawn(Arc::clone(&session).run(reader));
    (session, Client::new(client), handle)
}

/// A session that has completed login as `name`.
pub async fn join(ctx: &Arc<ServerContext>, name: &str) -> (Arc<Session>, Client) {
    let (session, client) = session(ctx);
    session.set_state(ProtocolState::Login);
    session.login(name.to_owned()).await.unwrap();
    (session, client)
}

pub struct Client {
    reader: FramedRead<ReadHalf<DuplexStream>, FrameCodec>,
    writer: FramedWrite<WriteHalf<DuplexStream>, FrameCodec>,
}

impl Client {
    fn new(stream: DuplexStream) -> Self {
        let (reader, writer) = tokio::io::split(stream);
        Self {
            reader: FramedRead::new(reader, FrameCodec),
            writer: FramedWrite::new(writer, FrameCodec),
        }
    }

    pub async fn send(&mut self, packet_id: i32, body: &[u8]) {
        self.writer.send(frame(packet_id, body)).await.unwrap();
    }

    /// Next packet, or `None` on EOF or after a second of silence.
    pub async fn next_frame(&mut self) -> Option<(i32, Bytes)> {
        self.read(Duration::from_secs(1)).await
    }

    /// Everything already sent, up to the first pause.
    pub async fn drain(&mut self) -> Vec<(i32, Bytes)> {
        let mut frames = Vec::new();
        while let Some(frame) = self.read(Duration::from_millis(100)).await {
            frames.push(frame);
        }
        frames
    }

    async fn read(&mut self, wait: Duration) -> Option<(i32, Bytes)> {
        let mut payload = tokio::time::timeout(wait, self.reader.next())
            .await
            .ok()??
            .ok()?
            .freeze();
        let packet_id = VarInt::proto_decode(&mut payload).ok()?.0;
        Some((packet_id, payload))
    }

    /// Chat packets as JSON components.
    pub fn chat_json(frames: &[(i32, Bytes)]) -> Vec<serde_json::Value> {
        frames
            .iter()
            .filter(|(packet_id, _)| *packet_id == id::play_out::CHAT_MESSAGE)
            .map(|(_, body)| {
                let mut body = body.clone();
                serde_json::from_str(&read_string(&mut body).unwrap()).unwrap()
            })
            .collect()
    }

    /// Top-level text of every chat packet.
    pub fn chat_lines(frames: &[(i32, Bytes)]) -> Vec<String> {
        Self::chat_json(frames)
            .into_iter()
            .filter_map(|json| json["text"].as_str().map(str::to_owned))
            .collect()
    }
}
