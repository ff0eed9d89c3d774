// client/src/app.rs
use dongdong_protocol::{classify_close, ClientToServer, CloseKind, GamePhase, GameSnapshot, Tile};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::lobby::LobbyClient;
use crate::messages::{Intent, LobbyOutcome};
use crate::store::{Session, StateStore};
use crate::timers::{self, TimerEvent, TimerSlot, COUNTDOWN_SECONDS, NOTIFICATION_TTL};
use crate::view::{Layout, Overlay, View, ViewModel};
use crate::ws::{ConnectionEvent, ConnectionManager, Envelope};

pub const STATUS_WELCOME: &str = "Create a room or join one with its code.";
pub const STATUS_DISCONNECTED: &str = "Disconnected. Please refresh to start a new game.";
pub const STATUS_SEND_FAILED: &str = "Error: Disconnected from server.";
pub const STATUS_SOCKET_ERROR: &str = "A connection error occurred.";

pub fn countdown_status(seconds: u32) -> String {
    format!("Next stack starts in {seconds}...")
}

/// Presentation controller.
///
/// Reads the store, owns the client-only overlay (status line, countdown,
/// notification), gates intents and hands legal ones to the connection. It
/// never edits the snapshot itself; only the next server snapshot does.
pub struct Controller<V: View> {
    store: StateStore,
    connection: ConnectionManager,
    conn_rx: UnboundedReceiver<Envelope>,
    lobby: LobbyClient,
    view: V,
    layout: Layout,
    overlay: Overlay,

    countdown: TimerSlot,
    notification: TimerSlot,
    timer_tx: UnboundedSender<TimerEvent>,
    timer_rx: UnboundedReceiver<TimerEvent>,

    lobby_tx: UnboundedSender<LobbyOutcome>,
    lobby_rx: UnboundedReceiver<LobbyOutcome>,
}

impl<V: View> Controller<V> {
    pub fn new(
        store: StateStore,
        connection: ConnectionManager,
        conn_rx: UnboundedReceiver<Envelope>,
        lobby: LobbyClient,
        view: V,
        layout: Layout,
    ) -> Self {
        let (timer_tx, timer_rx) = mpsc::unbounded_channel();
        let (lobby_tx, lobby_rx) = mpsc::unbounded_channel();
        Self {
            store,
            connection,
            conn_rx,
            lobby,
            view,
            layout,
            overlay: Overlay {
                status: STATUS_WELCOME.to_string(),
                ..Default::default()
            },
            countdown: TimerSlot::default(),
            notification: TimerSlot::default(),
            timer_tx,
            timer_rx,
            lobby_tx,
            lobby_rx,
        }
    }

    pub fn from_config(config: ClientConfig, view: V) -> Self {
        let layout = config.layout;
        let (connection, conn_rx) = ConnectionManager::new(config.clone());
        let lobby = LobbyClient::new(config);
        Self::new(StateStore::new(), connection, conn_rx, lobby, view, layout)
    }

    /// Drives the controller until `Quit` or until the intent source closes.
    pub async fn run(mut self, mut intents: UnboundedReceiver<Intent>) {
        self.refresh();
        loop {
            tokio::select! {
                Some(envelope) = self.conn_rx.recv() => self.handle_connection(envelope),
                Some(event) = self.timer_rx.recv() => self.handle_timer(event),
                Some(outcome) = self.lobby_rx.recv() => self.handle_lobby(outcome),
                intent = intents.recv() => {
                    let keep_going = match intent {
                        Some(intent) => self.handle_intent(intent),
                        None => false,
                    };
                    if !keep_going {
                        break;
                    }
                }
            }
        }
        self.connection.disconnect();
        self.countdown.cancel();
        self.notification.cancel();
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_model(&self) -> ViewModel {
        ViewModel::build(&self.store, &self.overlay, self.layout)
    }

    fn refresh(&mut self) {
        let model = self.view_model();
        self.view.render(&model);
    }

    /* ---------------------------- connection ---------------------------- */

    pub fn handle_connection(&mut self, envelope: Envelope) {
        if !self.connection.observe(&envelope) {
            return;
        }
        match envelope.event {
            ConnectionEvent::Opened => {
                info!(room = self.store.room_id(), player = self.store.my_player_name(), "joined");
            }
            ConnectionEvent::Snapshot(snapshot) => self.apply_snapshot(snapshot),
            ConnectionEvent::ServerError(message) => {
                warn!(%message, "server refused action");
                self.notify(format!("Error: {message}"));
            }
            ConnectionEvent::Closed { code, reason } => self.on_closed(code, &reason),
            ConnectionEvent::Error(error) => {
                warn!(%error, "socket error");
                self.overlay.status = STATUS_SOCKET_ERROR.to_string();
                self.notify(format!("Connection error: {error}"));
            }
        }
        self.refresh();
    }

    fn apply_snapshot(&mut self, snapshot: GameSnapshot) {
        let message = snapshot.message.clone();
        let transition = self.store.apply_snapshot(snapshot);
        self.overlay.stack_cleared = false;
        if !self.countdown.is_active() {
            self.overlay.status = message;
        }
        if transition.entered(&GamePhase::RoundOver) {
            self.start_countdown();
        }
    }

    fn on_closed(&mut self, code: u16, reason: &str) {
        match classify_close(code) {
            CloseKind::Rejected => {
                warn!(code, reason, "join rejected");
                self.notify(format!("Connection failed: {reason}"));
            }
            CloseKind::Ambient => info!(code, reason, "disconnected"),
        }
        self.end_session();
    }

    fn end_session(&mut self) {
        self.store.reset();
        self.countdown.cancel();
        self.overlay.countdown = None;
        self.overlay.stack_cleared = false;
        self.overlay.status = STATUS_DISCONNECTED.to_string();
    }

    fn open_session(&mut self, room_id: String, player_name: String) {
        self.countdown.cancel();
        self.overlay.countdown = None;
        self.overlay.stack_cleared = false;

        let session = Session::new(room_id, player_name);
        match self.connection.connect(session.clone()) {
            Ok(_) => {
                self.overlay.status = format!("Joining room {}...", session.room_id);
                self.store.begin_session(session);
            }
            Err(e) => {
                warn!(error = %e, "could not open socket");
                self.store.reset();
                self.notify(format!("Could not connect: {e}"));
            }
        }
    }

    /* ------------------------------ timers ------------------------------ */

    fn start_countdown(&mut self) {
        let tx = self.timer_tx.clone();
        self.countdown.restart(|generation| timers::countdown(generation, tx));
        self.overlay.countdown = Some(COUNTDOWN_SECONDS);
        self.overlay.status = countdown_status(COUNTDOWN_SECONDS);
    }

    fn notify(&mut self, text: String) {
        let tx = self.timer_tx.clone();
        self.notification
            .restart(|generation| timers::dismiss_after(generation, NOTIFICATION_TTL, tx));
        self.overlay.notification = Some(text);
    }

    pub fn handle_timer(&mut self, event: TimerEvent) {
        match event {
            TimerEvent::CountdownTick { generation, remaining } => {
                if !self.countdown.is_current(generation) {
                    return;
                }
                if remaining > 0 {
                    self.overlay.countdown = Some(remaining);
                    self.overlay.status = countdown_status(remaining);
                } else {
                    self.countdown.finish();
                    self.overlay.countdown = None;
                    self.overlay.stack_cleared = true;
                    if let Some(snapshot) = self.store.snapshot() {
                        self.overlay.status = snapshot.message.clone();
                    }
                }
            }
            TimerEvent::NotificationExpired { generation } => {
                if !self.notification.is_current(generation) {
                    return;
                }
                self.notification.finish();
                self.overlay.notification = None;
            }
        }
        self.refresh();
    }

    /* ------------------------------ intents ----------------------------- */

    /// Returns `false` once the user asked to quit.
    pub fn handle_intent(&mut self, intent: Intent) -> bool {
        match intent {
            Intent::CreateRoom { player_name } => self.create_room(player_name),
            Intent::JoinRoom { player_name, room_id } => self.join_room(player_name, room_id),
            Intent::StartGame => {
                if self.store.can_start_game() {
                    self.send(ClientToServer::StartGame);
                } else {
                    debug!("start_game not offered");
                }
            }
            Intent::PlaceBet(raw) => self.place_bet(&raw),
            Intent::PlayTile(tile) => self.play_tile(tile),
            Intent::PlayFromHand(index) => {
                let tile = self
                    .store
                    .my_player()
                    .and_then(|me| me.hand.get(index))
                    .copied();
                match tile {
                    Some(tile) => self.play_tile(tile),
                    None => debug!(index, "no tile at that hand position"),
                }
            }
            Intent::ToggleSpectators => {
                self.overlay.show_spectators = !self.overlay.show_spectators;
            }
            Intent::Disconnect => {
                if self.connection.current().is_some() || self.store.session().is_some() {
                    self.connection.disconnect();
                    self.end_session();
                }
            }
            Intent::Quit => return false,
        }
        self.refresh();
        true
    }

    fn place_bet(&mut self, raw: &str) {
        if !self.store.can_bet() {
            debug!("place_bet not offered");
            return;
        }
        match raw.trim().parse::<i64>() {
            Ok(amount) => self.send(ClientToServer::place_bet(amount)),
            Err(_) => debug!(input = raw, "ignoring non-integer bet"),
        }
    }

    fn play_tile(&mut self, tile: Tile) {
        if self.store.can_play(&tile) {
            self.send(ClientToServer::play_tile(tile));
        } else {
            debug!(%tile, "play_tile not offered");
        }
    }

    fn send(&mut self, frame: ClientToServer) {
        if let Err(e) = self.connection.send(frame) {
            warn!(error = %e, "send dropped");
            self.overlay.status = STATUS_SEND_FAILED.to_string();
        }
    }

    /* ------------------------------- lobby ------------------------------ */

    fn create_room(&mut self, player_name: String) {
        let player_name = player_name.trim().to_string();
        if player_name.is_empty() {
            self.notify("Please enter your name.".to_string());
            return;
        }
        let lobby = self.lobby.clone();
        let tx = self.lobby_tx.clone();
        tokio::spawn(async move {
            let outcome = match lobby.create_room().await {
                Ok(room_id) => LobbyOutcome::Created { room_id, player_name },
                Err(e) => LobbyOutcome::CreateFailed(e),
            };
            let _ = tx.send(outcome);
        });
    }

    /// The existence probe blocks the join: a missing room never gets a socket.
    fn join_room(&mut self, player_name: String, room_id: String) {
        let player_name = player_name.trim().to_string();
        let room_id = room_id.trim().to_string();
        if player_name.is_empty() || room_id.is_empty() {
            self.notify("Please enter your name and a room code.".to_string());
            return;
        }
        let lobby = self.lobby.clone();
        let tx = self.lobby_tx.clone();
        tokio::spawn(async move {
            let outcome = match lobby.room_exists(&room_id).await {
                Ok(true) => LobbyOutcome::Found { room_id, player_name },
                Ok(false) => LobbyOutcome::NotFound { room_id },
                Err(error) => LobbyOutcome::ProbeFailed { room_id, error },
            };
            let _ = tx.send(outcome);
        });
    }

    pub fn handle_lobby(&mut self, outcome: LobbyOutcome) {
        match outcome {
            LobbyOutcome::Created { room_id, player_name }
            | LobbyOutcome::Found { room_id, player_name } => {
                self.open_session(room_id, player_name);
            }
            LobbyOutcome::NotFound { room_id } => {
                self.notify(format!("Error: Room {room_id} not found."));
            }
            LobbyOutcome::CreateFailed(error) => {
                warn!(%error, "room creation failed");
                self.notify("Error creating room.".to_string());
            }
            LobbyOutcome::ProbeFailed { room_id, error } => {
                warn!(%error, room = %room_id, "room probe failed");
                self.notify(format!(
                    "Error: Room {room_id} not found or server is unreachable."
                ));
            }
        }
        self.refresh();
    }
}
