use dongdong_protocol::{ClientToServer, GameSnapshot, ServerToClient};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::store::Session;

/// Status reported when the peer sent a close frame without a code.
pub const CLOSE_NO_STATUS: u16 = 1005;
/// Status reported when the socket died without any close frame.
pub const CLOSE_ABNORMAL: u16 = 1006;

pub type ConnectionId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionPhase {
    Connecting,
    Open,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    Opened,
    Snapshot(GameSnapshot),
    /// Server refused an action; the socket stays open.
    ServerError(String),
    Closed { code: u16, reason: String },
    /// Transport failure. A `Closed` event follows separately.
    Error(String),
}

/// A lifecycle event tagged with the link that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub connection: ConnectionId,
    pub event: ConnectionEvent,
}

struct Link {
    id: ConnectionId,
    session: Session,
    phase: ConnectionPhase,
    tx_out: UnboundedSender<ClientToServer>,
}

/// Owns at most one socket. Never reconnects on its own.
pub struct ConnectionManager {
    config: ClientConfig,
    events: UnboundedSender<Envelope>,
    link: Option<Link>,
    next_id: ConnectionId,
}

impl ConnectionManager {
    pub fn new(config: ClientConfig) -> (Self, UnboundedReceiver<Envelope>) {
        let (events, rx) = mpsc::unbounded_channel();
        let manager = Self {
            config,
            events,
            link: None,
            next_id: 0,
        };
        (manager, rx)
    }

    /// Tears down any current link, then dials `{ws_base}/ws/{room}/{player}`.
    pub fn connect(&mut self, session: Session) -> Result<ConnectionId> {
        self.disconnect();
        let url = self
            .config
            .ws_endpoint(&session.room_id, &session.player_name)?;

        let (tx_out, rx_out) = mpsc::unbounded_channel();
        let id = self.install(session, tx_out);
        info!(connection = id, %url, "opening game socket");
        tokio::spawn(run_socket(id, url, rx_out, self.events.clone()));
        Ok(id)
    }

    /// Dropping the outbound sender makes the socket task send a normal close.
    pub fn disconnect(&mut self) {
        if let Some(link) = self.link.take() {
            info!(connection = link.id, room = %link.session.room_id, "closing game socket");
        }
    }

    pub fn send(&self, frame: ClientToServer) -> Result<()> {
        match &self.link {
            Some(link) if link.phase == ConnectionPhase::Open => {
                debug!(connection = link.id, ?frame, "send");
                link.tx_out
                    .send(frame)
                    .map_err(|_| ClientError::NotConnected)
            }
            _ => Err(ClientError::NotConnected),
        }
    }

    /// Tracks the link's phase from its own events. Returns `false` for
    /// envelopes from a link that has since been replaced or closed.
    pub fn observe(&mut self, envelope: &Envelope) -> bool {
        if self.current() != Some(envelope.connection) {
            debug!(connection = envelope.connection, "ignoring event from stale socket");
            return false;
        }
        match &envelope.event {
            ConnectionEvent::Opened => {
                if let Some(link) = self.link.as_mut() {
                    link.phase = ConnectionPhase::Open;
                }
            }
            ConnectionEvent::Closed { .. } => self.link = None,
            _ => {}
        }
        true
    }

    pub fn phase(&self) -> Option<ConnectionPhase> {
        self.link.as_ref().map(|l| l.phase)
    }

    pub fn session(&self) -> Option<&Session> {
        self.link.as_ref().map(|l| &l.session)
    }

    pub fn current(&self) -> Option<ConnectionId> {
        self.link.as_ref().map(|l| l.id)
    }

    fn install(
        &mut self,
        session: Session,
        tx_out: UnboundedSender<ClientToServer>,
    ) -> ConnectionId {
        self.next_id += 1;
        let id = self.next_id;
        self.link = Some(Link {
            id,
            session,
            phase: ConnectionPhase::Connecting,
            tx_out,
        });
        id
    }

    /// Registers a link backed by a plain channel instead of a socket.
    #[cfg(test)]
    pub(crate) fn attach(
        &mut self,
        session: Session,
    ) -> (ConnectionId, UnboundedReceiver<ClientToServer>) {
        self.disconnect();
        let (tx_out, rx_out) = mpsc::unbounded_channel();
        (self.install(session, tx_out), rx_out)
    }
}

/// Splits an inbound text frame into one of the two event kinds.
pub fn decode_frame(text: &str) -> serde_json::Result<ConnectionEvent> {
    Ok(match serde_json::from_str::<ServerToClient>(text)? {
        ServerToClient::GameState { payload } => ConnectionEvent::Snapshot(payload),
        ServerToClient::Error { message } => ConnectionEvent::ServerError(message),
    })
}

async fn run_socket(
    id: ConnectionId,
    url: Url,
    mut rx_out: UnboundedReceiver<ClientToServer>,
    events: UnboundedSender<Envelope>,
) {
    let emit = |event: ConnectionEvent| {
        let _ = events.send(Envelope { connection: id, event });
    };

    let ws = match connect_async(url.as_str()).await {
        Ok((ws, _)) => ws,
        Err(e) => {
            warn!(connection = id, error = %e, "socket handshake failed");
            emit(ConnectionEvent::Error(format!("connect: {e}")));
            emit(ConnectionEvent::Closed {
                code: CLOSE_ABNORMAL,
                reason: String::new(),
            });
            return;
        }
    };
    let (mut write, mut read) = ws.split();
    emit(ConnectionEvent::Opened);

    let mut closed = (CLOSE_ABNORMAL, String::new());
    loop {
        tokio::select! {
            cmd = rx_out.recv() => match cmd {
                Some(frame) => {
                    let text = match serde_json::to_string(&frame) {
                        Ok(text) => text,
                        Err(e) => {
                            warn!(connection = id, error = %e, "could not encode frame");
                            continue;
                        }
                    };
                    if let Err(e) = write.send(Message::Text(text)).await {
                        emit(ConnectionEvent::Error(format!("send: {e}")));
                        break;
                    }
                }
                None => {
                    let frame = CloseFrame {
                        code: CloseCode::Normal,
                        reason: "client left".into(),
                    };
                    let _ = write.send(Message::Close(Some(frame))).await;
                    closed = (u16::from(CloseCode::Normal), "client left".into());
                    break;
                }
            },
            msg = read.next() => match msg {
                Some(Ok(Message::Text(text))) => match decode_frame(&text) {
                    Ok(event) => emit(event),
                    Err(e) => warn!(connection = id, error = %e, "dropping undecodable frame"),
                },
                Some(Ok(Message::Close(frame))) => {
                    closed = frame
                        .map(|f| (u16::from(f.code), f.reason.into_owned()))
                        .unwrap_or((CLOSE_NO_STATUS, String::new()));
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    emit(ConnectionEvent::Error(e.to_string()));
                    break;
                }
                None => break,
            },
        }
    }

    let (code, reason) = closed;
    info!(connection = id, code, %reason, "game socket closed");
    emit(ConnectionEvent::Closed { code, reason });
}
