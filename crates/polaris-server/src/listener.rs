//! TCP accept loop.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::connection::Session;
use crate::context::ServerContext;

pub struct Listener {
    listener: TcpListener,
    ctx: Arc<ServerContext>,
}

impl Listener {
    pub async fn bind(address: &str, ctx: Arc<ServerContext>) -> std::io::Result<Self> {
        let listener = TcpListener::bind(address).await?;
        Ok(Self { listener, ctx })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until `shutdown` flips to `true`. Each socket gets
    /// its own session task.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        if let Ok(addr) = self.local_addr() {
            info!(%addr, "listening");
        }

        loop {
            tokio::select! {
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        if let Err(e) = stream.set_nodelay(true) {
                            debug!(%peer, error = %e, "TCP_NODELAY not set");
                        }
                        let (reader, writer) = stream.into_split();
                        let session = Session::new(Arc::clone(&self.ctx), Some(peer), Box::new(writer));
                        debug!(conn = session.id(), %peer, "accepted connection");
                        tokio::spawn(session.run(reader));
                    }
                    Err(e) => warn!(error = %e, "accept failed"),
                },
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("listener stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use bytes::{BufMut, BytesMut};
    use futures::{SinkExt, StreamExt};
    use polaris_proto::codec::{read_string, write_string, ProtoDecode, ProtoEncode};
    use polaris_proto::frame::FrameCodec;
    use polaris_proto::packets::id;
    use polaris_proto::types::VarInt;
    use std::time::Duration;
    use tokio::net::TcpStream;
    use tokio_util::codec::Framed;

    #[tokio::test]
    async fn serves_status_over_tcp_and_stops() {
        let ctx = testing::context(4, 3);
        let listener = Listener::bind("127.0.0.1:0", Arc::clone(&ctx)).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop, stopped) = watch::channel(false);
        let handle = tokio::spawn(listener.run(stopped));

        let stream = TcpStream::connect(addr).await.unwrap();
        let mut framed = Framed::new(stream, FrameCodec);

        let mut handshake = BytesMut::new();
        VarInt(id::handshake::HANDSHAKE).proto_encode(&mut handshake);
        VarInt(47).proto_encode(&mut handshake);
        write_string(&mut handshake, "localhost");
        handshake.put_u16(addr.port());
        VarInt(1).proto_encode(&mut handshake);
        framed.send(handshake.freeze()).await.unwrap();
        framed.send(testing::frame(id::status::REQUEST, &[])).await.unwrap();

        let mut response = tokio::time::timeout(Duration::from_secs(2), framed.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(VarInt::proto_decode(&mut response).unwrap().0, id::status::RESPONSE);
        let json: serde_json::Value = serde_json::from_str(&read_string(&mut response).unwrap()).unwrap();
        assert_eq!(json["players"]["max"], 3);

        stop.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
