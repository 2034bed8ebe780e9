//! Per-connection protocol state machine.
//!
//! A [`Session`] never writes to its socket inline. Packets are queued on a
//! bounded channel through [`Session::send_packets`] and a single writer task
//! drains it, so the read loop, the keep-alive timer and other sessions'
//! broadcasts never interleave frames or wait on this peer's socket. A peer
//! that stops reading is dropped once its queue fills or a flush outlasts
//! the write timeout.

mod handshake;
mod login;
mod movement;
mod play;
mod status;

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, OnceLock, Weak};
use std::time::{Duration, Instant};

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, info, warn};

use polaris_proto::chat::{ChatColor, TextComponent};
use polaris_proto::frame::FrameCodec;
use polaris_proto::packets::{
    ChatBroadcast, ClientboundPacket, DestroyEntities, Disconnect, PlayerListItem,
    ServerboundPacket,
};
use polaris_proto::state::ProtocolState;
use polaris_proto::types::Uuid;
use polaris_scheduler::Task;

use crate::config::UnknownPacketPolicy;
use crate::context::ServerContext;
use crate::error::SessionError;
use crate::player::Player;
use crate::translator::Translated;

pub type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

type FrameWriter = FramedWrite<BoxedWriter, FrameCodec>;

/// Bursts a session may have waiting for its writer.
const OUTBOUND_CAPACITY: usize = 1024;

/// Name and UUID assigned during login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub uuid: Uuid,
}

enum Outgoing {
    /// Written in order, then flushed.
    Burst(Vec<ClientboundPacket>),
    /// Final packet, if any, then the socket is shut.
    Close(Option<ClientboundPacket>),
}

#[derive(Debug, Default)]
struct KeepAliveState {
    /// Last token issued.
    token: Option<i32>,
    /// When the frame carrying `token` was written.
    sent_at: Option<Instant>,
}

pub struct Session {
    id: u64,
    peer: Option<SocketAddr>,
    ctx: Arc<ServerContext>,
    state: AtomicU8,
    connected: AtomicBool,
    login_started: AtomicBool,
    outbound: mpsc::Sender<Outgoing>,
    writer: Mutex<Option<JoinHandle<()>>>,
    identity: OnceLock<Identity>,
    player: Mutex<Option<Arc<Player>>>,
    latency: Mutex<Duration>,
    keep_alive: Mutex<KeepAliveState>,
    keep_alive_task: Mutex<Option<Task>>,
    closed: Notify,
}

impl Session {
    /// Wrap `writer` and start the task that drains the outbound queue into
    /// it. Must be called inside a tokio runtime.
    pub fn new(ctx: Arc<ServerContext>, peer: Option<SocketAddr>, writer: BoxedWriter) -> Arc<Self> {
        let (outbound, queue) = mpsc::channel(OUTBOUND_CAPACITY);
        let session = Arc::new(Self {
            id: ctx.next_connection_id(),
            peer,
            ctx,
            state: AtomicU8::new(ProtocolState::Handshake as u8),
            connected: AtomicBool::new(true),
            login_started: AtomicBool::new(false),
            outbound,
            writer: Mutex::new(None),
            identity: OnceLock::new(),
            player: Mutex::new(None),
            latency: Mutex::new(Duration::ZERO),
            keep_alive: Mutex::new(KeepAliveState::default()),
            keep_alive_task: Mutex::new(None),
            closed: Notify::new(),
        });

        let frames = FramedWrite::new(writer, FrameCodec);
        let handle = tokio::spawn(write_loop(Arc::downgrade(&session), frames, queue));
        *session.writer.lock() = Some(handle);
        session
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }

    pub fn state(&self) -> ProtocolState {
        ProtocolState::from_u8(self.state.load(Ordering::Acquire)).unwrap_or(ProtocolState::Handshake)
    }

    pub(crate) fn set_state(&self, state: ProtocolState) {
        self.state.store(state as u8, Ordering::Release);
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.get()
    }

    pub fn player(&self) -> Option<Arc<Player>> {
        self.player.lock().clone()
    }

    pub fn latency(&self) -> Duration {
        *self.latency.lock()
    }

    /// Read frames until the peer goes away or the session is disconnected,
    /// then tear the session down.
    pub async fn run<R>(self: Arc<Self>, reader: R)
    where
        R: AsyncRead + Unpin + Send,
    {
        let mut frames = FramedRead::new(reader, FrameCodec);
        let timeout = self.ctx.read_timeout();

        while self.is_connected() {
            let next = tokio::select! {
                _ = self.closed.notified() => break,
                next = tokio::time::timeout(timeout, frames.next()) => next,
            };

            let result = match next {
                Err(_) => Err(SessionError::TimedOut),
                Ok(None) => {
                    debug!(conn = self.id, "peer closed the connection");
                    self.close_silently();
                    break;
                }
                Ok(Some(Err(e))) => Err(e.into()),
                Ok(Some(Ok(frame))) => self.receive_frame(frame.freeze()).await,
            };

            if let Err(e) = result {
                self.fail(e);
                break;
            }
        }

        self.teardown();
    }

    /// Run one frame payload through the translator, decode it for the
    /// current state and handle it.
    pub async fn receive_frame(self: &Arc<Self>, frame: Bytes) -> Result<(), SessionError> {
        let frame = match &self.ctx.translator {
            Some(translator) => match translator.inbound(self.id, frame) {
                Translated::Forward(frame) => frame,
                Translated::Cancel => return Ok(()),
            },
            None => frame,
        };

        let state = self.state();
        match self.ctx.registry.decode_frame(state, frame) {
            Ok(packet) => self.handle_packet(packet).await,
            Err(e) if state == ProtocolState::Status => {
                debug!(conn = self.id, error = %e, "ignoring malformed status request");
                Ok(())
            }
            Err(e) if e.is_unknown_packet() => {
                warn!(conn = self.id, error = %e, "unknown packet");
                match self.ctx.unknown_packet_policy() {
                    UnknownPacketPolicy::Ignore => Ok(()),
                    UnknownPacketPolicy::Disconnect => Err(e.into()),
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn handle_packet(self: &Arc<Self>, packet: ServerboundPacket) -> Result<(), SessionError> {
        let state = self.state();
        match (state, packet) {
            (ProtocolState::Handshake, ServerboundPacket::Handshake(p)) => self.handle_handshake(p),
            (ProtocolState::Status, ServerboundPacket::StatusRequest(_)) => {
                self.handle_status_request()
            }
            (ProtocolState::Status, ServerboundPacket::StatusPing(p)) => {
                self.handle_status_ping(p);
                Ok(())
            }
            (ProtocolState::Login, ServerboundPacket::LoginStart(p)) => {
                self.login(p.username).await.map(|_| ())
            }
            (ProtocolState::Play, packet) => {
                let player = self.player().ok_or(SessionError::NotLoggedIn)?;
                self.handle_play_packet(&player, packet).await
            }
            (state, packet) => Err(SessionError::UnexpectedPacket {
                packet: packet.name(),
                state,
            }),
        }
    }

    /// Queue `packets` to be written in order, as one burst.
    ///
    /// Never waits on the socket. A no-op once the session is no longer
    /// live. A session whose queue is full is dropped.
    pub fn send_packets<I>(&self, packets: I)
    where
        I: IntoIterator<Item = ClientboundPacket>,
    {
        if !self.is_connected() {
            return;
        }
        let packets: Vec<ClientboundPacket> = packets.into_iter().collect();
        if packets.is_empty() {
            return;
        }
        match self.outbound.try_send(Outgoing::Burst(packets)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!(conn = self.id, "outbound queue full, dropping connection");
                self.abort_writer();
            }
            Err(TrySendError::Closed(_)) => self.mark_closed(),
        }
    }

    pub fn send_packet(&self, packet: ClientboundPacket) {
        self.send_packets([packet]);
    }

    /// Encode `packets`, pass them through the translator and flush them.
    async fn write_burst(
        &self,
        frames: &mut FrameWriter,
        packets: Vec<ClientboundPacket>,
    ) -> Result<(), SessionError> {
        for packet in packets {
            let frame = packet.encode().freeze();
            let frame = match &self.ctx.translator {
                Some(translator) => match translator.outbound(self.id, frame) {
                    Translated::Forward(frame) => frame,
                    Translated::Cancel => continue,
                },
                None => frame,
            };
            frames.feed(frame).await?;
            self.on_transmit(&packet);
        }
        frames.flush().await?;
        Ok(())
    }

    /// Per-packet hook, run right after a packet is handed to the transport.
    fn on_transmit(&self, packet: &ClientboundPacket) {
        if let ClientboundPacket::KeepAlive(keep_alive) = packet {
            let mut state = self.keep_alive.lock();
            if state.token == Some(keep_alive.token) {
                state.sent_at = Some(Instant::now());
            }
        }
    }

    /// Close the connection, telling the client why when the state allows it.
    ///
    /// Bursts queued earlier are still written first; anything sent after
    /// this call is dropped. Only the first call has any effect.
    pub fn disconnect(&self, reason: &str) {
        if !self.connected.swap(false, Ordering::AcqRel) {
            return;
        }

        let message = Disconnect::with_message(reason);
        let last = match self.state() {
            ProtocolState::Login => Some(ClientboundPacket::LoginDisconnect(message)),
            ProtocolState::Play => Some(ClientboundPacket::PlayDisconnect(message)),
            ProtocolState::Handshake | ProtocolState::Status => None,
        };
        if self.outbound.try_send(Outgoing::Close(last)).is_err() {
            self.abort_writer();
        }

        info!(conn = self.id, player = ?self.identity().map(|i| &i.name), reason, "disconnected");
        self.closed.notify_one();
    }

    /// Mark the session dead without writing anything more.
    fn close_silently(&self) {
        if self.connected.swap(false, Ordering::AcqRel) {
            if self.outbound.try_send(Outgoing::Close(None)).is_err() {
                self.abort_writer();
            }
            self.closed.notify_one();
        }
    }

    fn mark_closed(&self) {
        if self.connected.swap(false, Ordering::AcqRel) {
            self.closed.notify_one();
        }
    }

    /// Stop the writer where it is. Dropping the write half closes the
    /// socket for writing.
    fn abort_writer(&self) {
        if let Some(handle) = self.writer.lock().take() {
            handle.abort();
        }
        self.mark_closed();
    }

    /// Wait until the writer has drained its queue and shut the socket,
    /// giving up after the write timeout.
    pub async fn flushed(&self) {
        let Some(mut handle) = self.writer.lock().take() else {
            return;
        };
        if tokio::time::timeout(self.ctx.write_timeout(), &mut handle)
            .await
            .is_err()
        {
            handle.abort();
        }
    }

    fn fail(&self, error: SessionError) {
        match &error {
            SessionError::Protocol(_) | SessionError::UnexpectedPacket { .. } => {
                warn!(conn = self.id, error = %error, "protocol violation")
            }
            _ => debug!(conn = self.id, error = %error, "closing connection"),
        }
        self.disconnect(error.disconnect_reason());
    }

    /// Remove the player from the world. Runs its body at most once.
    pub fn teardown(&self) {
        if let Some(task) = self.keep_alive_task.lock().take() {
            task.cancel();
        }
        if let Some(translator) = &self.ctx.translator {
            translator.connection_closed(self.id);
        }

        let Some(player) = self.player.lock().take() else {
            return;
        };
        let world = &self.ctx.world;
        let entity_id = player.entity_id();

        // Unregister before unlinking so no concurrent pass can link the
        // departing player again.
        world.unregister(entity_id);
        let despawn = ClientboundPacket::DestroyEntities(DestroyEntities::single(entity_id));
        for viewer in world.remove_all_viewer_pairs(entity_id) {
            if let Some(viewer) = world.player(viewer) {
                viewer.session().send_packet(despawn.clone());
            }
        }

        let left = TextComponent::colored(format!("{} left.", player.name()), ChatColor::Yellow);
        world.broadcast(vec![
            ClientboundPacket::PlayerListItem(PlayerListItem::Remove(vec![player.uuid()])),
            ClientboundPacket::Chat(ChatBroadcast::new(&left)),
        ]);

        info!(conn = self.id, player = %player.name(), "left the game");
    }
}

/// Drain `queue` into the socket until the session closes, a write fails
/// or a burst outlasts the write timeout.
async fn write_loop(
    session: Weak<Session>,
    mut frames: FrameWriter,
    mut queue: mpsc::Receiver<Outgoing>,
) {
    while let Some(outgoing) = queue.recv().await {
        let Some(session) = session.upgrade() else {
            break;
        };
        let timeout = session.ctx.write_timeout();
        let (packets, last) = match outgoing {
            Outgoing::Burst(packets) => (packets, false),
            Outgoing::Close(packet) => (packet.into_iter().collect(), true),
        };

        if !packets.is_empty() {
            match tokio::time::timeout(timeout, session.write_burst(&mut frames, packets)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    debug!(conn = session.id, error = %e, "write failed");
                    session.mark_closed();
                    break;
                }
                Err(_) => {
                    warn!(conn = session.id, ?timeout, "peer stopped reading, dropping connection");
                    session.mark_closed();
                    break;
                }
            }
        }
        if last {
            break;
        }
    }

    if let Err(e) = frames.get_mut().shutdown().await {
        debug!(error = %e, "shutdown failed");
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("peer", &self.peer)
            .field("state", &self.state())
            .field("connected", &self.is_connected())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, Client};
    use bytes::BufMut;
    use polaris_proto::codec::{read_string, write_string, ProtoDecode, ProtoEncode};
    use polaris_proto::packets::id;
    use polaris_proto::types::VarInt;

    fn handshake_body(next_state: i32) -> Vec<u8> {
        let mut body = bytes::BytesMut::new();
        VarInt(47).proto_encode(&mut body);
        write_string(&mut body, "localhost");
        body.put_u16(25565);
        VarInt(next_state).proto_encode(&mut body);
        body.to_vec()
    }

    #[tokio::test]
    async fn next_state_codes() {
        let ctx = testing::context(4, 10);
        for (code, state) in [
            (1, ProtocolState::Status),
            (2, ProtocolState::Login),
            (3, ProtocolState::Play),
        ] {
            let (session, _client) = testing::session(&ctx);
            session
                .receive_frame(testing::frame(0x00, &handshake_body(code)))
                .await
                .unwrap();
            assert_eq!(session.state(), state);
            assert!(session.is_connected());
        }

        for code in [0, 4, -1] {
            let (session, _client) = testing::session(&ctx);
            let err = session
                .receive_frame(testing::frame(0x00, &handshake_body(code)))
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                SessionError::Protocol(polaris_proto::error::ProtoError::InvalidNextState(c)) if c == code
            ));
            assert_eq!(session.state(), ProtocolState::Handshake);
        }
    }

    #[tokio::test]
    async fn invalid_next_state_closes_without_packet() {
        let ctx = testing::context(4, 10);
        let (session, mut client, handle) = testing::spawn_connection(&ctx);
        client.send(0x00, &handshake_body(4)).await;

        handle.await.unwrap();
        assert!(!session.is_connected());
        assert_eq!(session.state(), ProtocolState::Handshake);
        assert!(client.next_frame().await.is_none());
    }

    #[tokio::test]
    async fn status_exchange() {
        let ctx = testing::context(4, 7);
        let (session, mut client, handle) = testing::spawn_connection(&ctx);
        client.send(0x00, &handshake_body(1)).await;
        // Garbage in the status state is ignored.
        client.send(0x05, &[1, 2, 3]).await;
        client.send(id::status::REQUEST, &[]).await;

        let (packet_id, mut body) = client.next_frame().await.unwrap();
        assert_eq!(packet_id, id::status::RESPONSE);
        let json: serde_json::Value = serde_json::from_str(&read_string(&mut body).unwrap()).unwrap();
        assert_eq!(json["version"]["protocol"], 47);
        assert_eq!(json["players"]["max"], 7);
        assert_eq!(json["players"]["online"], 0);
        assert_eq!(json["description"]["text"], "Polaris test");
        assert!(json.get("favicon").is_none());

        client.send(id::status::PING, &0x1122_3344_5566_7788i64.to_be_bytes()).await;
        let (packet_id, body) = client.next_frame().await.unwrap();
        assert_eq!(packet_id, id::status::PONG);
        assert_eq!(&body[..], &0x1122_3344_5566_7788i64.to_be_bytes());

        handle.await.unwrap();
        assert!(!session.is_connected());
        assert!(client.next_frame().await.is_none());
    }

    #[tokio::test]
    async fn login_twice_is_rejected() {
        let ctx = testing::context(4, 10);
        let (session, _client) = testing::session(&ctx);
        session.set_state(ProtocolState::Login);

        let player = session.login("alice".into()).await.unwrap();
        let err = session.login("alice".into()).await.unwrap_err();
        assert!(matches!(err, SessionError::AlreadyLoggedIn));

        assert_eq!(ctx.world.player_count(), 1);
        assert!(Arc::ptr_eq(&session.player().unwrap(), &player));
        assert_eq!(session.identity().unwrap().name, "alice");
    }

    #[tokio::test]
    async fn alice_joins_and_others_hear_once() {
        let ctx = testing::context(4, 10);
        let (bob_session, mut bob) = testing::join(&ctx, "bob").await;
        let bob_id = bob_session.player().unwrap().entity_id();
        bob.drain().await;

        let (alice_session, mut alice, _handle) = testing::spawn_connection(&ctx);
        alice.send(0x00, &handshake_body(2)).await;
        let mut login = bytes::BytesMut::new();
        write_string(&mut login, "alice");
        alice.send(id::login::LOGIN_START, &login).await;

        let (packet_id, mut body) = alice.next_frame().await.unwrap();
        assert_eq!(packet_id, id::login::LOGIN_SUCCESS);
        let uuid = read_string(&mut body).unwrap();
        assert_eq!(read_string(&mut body).unwrap(), "alice");
        assert_eq!(uuid.len(), 36);

        let frames = alice.drain().await;
        let ids: Vec<i32> = frames.iter().map(|(id, _)| *id).collect();
        let join_order = [
            id::play_out::JOIN_GAME,
            id::play_out::PLUGIN_MESSAGE,
            id::play_out::SPAWN_POSITION,
            id::play_out::PLAYER_LIST_ITEM,
            id::play_out::PLAYER_LIST_HEADER_FOOTER,
            id::play_out::PLAYER_POSITION_LOOK,
        ];
        assert_eq!(&ids[..join_order.len()], &join_order);
        assert!(ids.contains(&id::play_out::CHUNK_BULK));
        assert!(!Client::chat_lines(&frames).iter().any(|l| l.contains("joined")));

        let alice_player = alice_session.player().unwrap();
        assert!(alice_player.entity_id() > bob_id);
        assert_eq!(ctx.world.player_count(), 2);
        assert!(ctx.world.player_by_name("alice").is_some());

        let bob_frames = bob.drain().await;
        let joined: Vec<String> = Client::chat_lines(&bob_frames)
            .into_iter()
            .filter(|l| l.contains("alice joined."))
            .collect();
        assert_eq!(joined.len(), 1);
        let list_adds = bob_frames
            .iter()
            .filter(|(id, body)| *id == id::play_out::PLAYER_LIST_ITEM && body[0] == 0)
            .count();
        assert_eq!(list_adds, 1);
    }

    #[tokio::test]
    async fn invalid_username_gets_login_disconnect() {
        let ctx = testing::context(4, 10);
        let (session, mut client, handle) = testing::spawn_connection(&ctx);
        client.send(0x00, &handshake_body(2)).await;
        let mut login = bytes::BytesMut::new();
        write_string(&mut login, "not valid!");
        client.send(id::login::LOGIN_START, &login).await;

        let (packet_id, mut body) = client.next_frame().await.unwrap();
        assert_eq!(packet_id, id::login::DISCONNECT);
        assert!(read_string(&mut body).unwrap().contains("Invalid username"));
        handle.await.unwrap();
        assert!(session.player().is_none());
        assert_eq!(ctx.world.player_count(), 0);
    }

    #[tokio::test]
    async fn full_server_refuses_login() {
        let ctx = testing::context(4, 1);
        let _first = testing::join(&ctx, "first").await;

        let (session, mut client) = testing::session(&ctx);
        session.set_state(ProtocolState::Login);
        let err = session.login("second".into()).await.unwrap_err();
        assert!(matches!(err, SessionError::ServerFull));
        session.fail(err);

        let (packet_id, mut body) = client.next_frame().await.unwrap();
        assert_eq!(packet_id, id::login::DISCONNECT);
        assert!(read_string(&mut body).unwrap().contains("Server is full"));
        assert_eq!(ctx.world.player_count(), 1);
    }

    #[tokio::test]
    async fn keep_alive_round_trip() {
        let ctx = testing::context(4, 10);
        let (session, mut client) = testing::join(&ctx, "alice").await;
        client.drain().await;

        session.send_keep_alive();
        let (packet_id, mut body) = client.next_frame().await.unwrap();
        assert_eq!(packet_id, id::play_out::KEEP_ALIVE);
        let token = VarInt::proto_decode(&mut body).unwrap().0;

        let mut echo = bytes::BytesMut::new();
        VarInt(token).proto_encode(&mut echo);
        session
            .receive_frame(testing::frame(id::play_in::KEEP_ALIVE, &echo))
            .await
            .unwrap();
        assert!(session.latency() < Duration::from_secs(5));

        let mut wrong = bytes::BytesMut::new();
        VarInt(token + 1).proto_encode(&mut wrong);
        let err = session
            .receive_frame(testing::frame(id::play_in::KEEP_ALIVE, &wrong))
            .await
            .unwrap_err();
        assert_eq!(err.disconnect_reason(), "invalid keep-alive");

        client.drain().await;
        session.fail(err);
        let (packet_id, mut body) = client.next_frame().await.unwrap();
        assert_eq!(packet_id, id::play_out::DISCONNECT);
        assert!(read_string(&mut body).unwrap().contains("invalid keep-alive"));
    }

    #[tokio::test]
    async fn disconnect_is_idempotent_and_drops_later_sends() {
        let ctx = testing::context(4, 10);
        let (session, mut client) = testing::join(&ctx, "alice").await;
        client.drain().await;

        session.disconnect("bye");
        session.disconnect("again");
        session.send_packet(ClientboundPacket::Chat(ChatBroadcast::new(&TextComponent::plain("late"))));

        let frames = client.drain().await;
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].0, id::play_out::DISCONNECT);
        assert!(!session.is_connected());

        session.teardown();
        session.teardown();
        assert_eq!(ctx.world.player_count(), 0);
        assert!(session.player().is_none());
    }

    #[tokio::test]
    async fn departure_is_announced() {
        let ctx = testing::context(4, 10);
        let (alice, _alice_client) = testing::join(&ctx, "alice").await;
        let (_bob, mut bob_client) = testing::join(&ctx, "bob").await;
        let alice_id = alice.player().unwrap().entity_id();
        assert!(ctx.world.viewer_ids(alice_id).len() == 1);
        bob_client.drain().await;

        alice.disconnect("bye");
        alice.teardown();

        let frames = bob_client.drain().await;
        assert!(frames.iter().any(|(id, _)| *id == id::play_out::DESTROY_ENTITIES));
        assert!(Client::chat_lines(&frames).iter().any(|l| l.contains("alice left.")));
        assert!(ctx.world.viewer_ids(alice_id).is_empty());
    }

    #[tokio::test]
    async fn play_packet_before_login_is_rejected() {
        let ctx = testing::context(4, 10);
        let (session, _client) = testing::session(&ctx);
        session.set_state(ProtocolState::Play);
        let err = session
            .receive_frame(testing::frame(id::play_in::ARM_SWING, &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::NotLoggedIn));
    }

    #[tokio::test]
    async fn unknown_packet_policy() {
        let ctx = testing::context(4, 10);
        let (session, _client) = testing::join(&ctx, "alice").await;
        let err = session
            .receive_frame(testing::frame(0x7A, &[0, 1, 2]))
            .await
            .unwrap_err();
        assert!(matches!(&err, SessionError::Protocol(e) if e.is_unknown_packet()));

        let ctx = testing::context_with(4, 10, |config| {
            config.server.unknown_packet_policy = UnknownPacketPolicy::Ignore;
        });
        let (session, _client) = testing::join(&ctx, "bob").await;
        session
            .receive_frame(testing::frame(0x7A, &[0, 1, 2]))
            .await
            .unwrap();
        assert!(session.is_connected());
    }

    #[tokio::test]
    async fn stalled_peer_does_not_hold_up_others() {
        let ctx = testing::context_with(4, 10, |config| config.network.write_timeout_secs = 1);
        // A peer that never reads: the pipe fills long before login is streamed.
        let (server, _silent_peer) = tokio::io::duplex(4096);
        let stalled = Session::new(Arc::clone(&ctx), None, Box::new(server));
        stalled.set_state(ProtocolState::Login);
        tokio::time::timeout(Duration::from_secs(3), stalled.login("stalled".into()))
            .await
            .unwrap()
            .unwrap();

        let (bob, mut bob_client) = tokio::time::timeout(Duration::from_secs(3), testing::join(&ctx, "bob"))
            .await
            .unwrap();
        let bob_frames = bob_client.drain().await;
        assert!(bob_frames.iter().any(|(id, _)| *id == id::play_out::JOIN_GAME));
        assert!(bob_frames.iter().any(|(id, _)| *id == id::play_out::SPAWN_PLAYER));

        tokio::time::timeout(Duration::from_secs(5), async {
            while stalled.is_connected() {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        })
        .await
        .unwrap();
        assert!(bob.is_connected());

        // Disconnecting the dead session neither blocks nor writes.
        stalled.disconnect("Shutting down");
        tokio::time::timeout(Duration::from_secs(3), stalled.flushed())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn full_outbound_queue_drops_the_session() {
        let ctx = testing::context(4, 10);
        let (server, _silent_peer) = tokio::io::duplex(64);
        let session = Session::new(Arc::clone(&ctx), None, Box::new(server));
        let line = TextComponent::plain("spam");

        for _ in 0..OUTBOUND_CAPACITY {
            session.send_packet(ClientboundPacket::Chat(ChatBroadcast::new(&line)));
        }
        assert!(session.is_connected());
        session.send_packet(ClientboundPacket::Chat(ChatBroadcast::new(&line)));
        assert!(!session.is_connected());
    }
}
