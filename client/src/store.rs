use dongdong_protocol::{GamePhase, GameSnapshot, Player, Tile};

/// Who we are for the current connection attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub room_id: String,
    pub player_name: String,
}

impl Session {
    pub fn new(room_id: impl Into<String>, player_name: impl Into<String>) -> Self {
        Self {
            room_id: room_id.into(),
            player_name: player_name.into(),
        }
    }
}

/// Discriminant before and after a snapshot replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub previous: Option<GamePhase>,
    pub current: GamePhase,
}

impl Transition {
    /// True only on the edge into `phase`, not while staying in it.
    pub fn entered(&self, phase: &GamePhase) -> bool {
        self.current == *phase && self.previous.as_ref() != Some(phase)
    }
}

/// Sole owner of the latest authoritative snapshot and the session identity.
///
/// Every derived query is computed from the current snapshot on each call;
/// nothing is cached alongside it.
#[derive(Debug, Default)]
pub struct StateStore {
    snapshot: Option<GameSnapshot>,
    session: Option<Session>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new session always starts from an empty snapshot.
    pub fn begin_session(&mut self, session: Session) {
        self.snapshot = None;
        self.session = Some(session);
    }

    pub fn apply_snapshot(&mut self, snapshot: GameSnapshot) -> Transition {
        let current = snapshot.game_state.clone();
        let previous = self
            .snapshot
            .replace(snapshot)
            .map(|old| old.game_state);
        Transition { previous, current }
    }

    pub fn reset(&mut self) {
        self.snapshot = None;
        self.session = None;
    }

    pub fn snapshot(&self) -> Option<&GameSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn my_player_name(&self) -> &str {
        self.session.as_ref().map_or("", |s| s.player_name.as_str())
    }

    pub fn room_id(&self) -> &str {
        self.session.as_ref().map_or("", |s| s.room_id.as_str())
    }

    pub fn phase(&self) -> Option<&GamePhase> {
        self.snapshot.as_ref().map(|s| &s.game_state)
    }

    pub fn my_player(&self) -> Option<&Player> {
        let name = self.my_player_name();
        if name.is_empty() {
            return None;
        }
        self.snapshot.as_ref()?.player(name)
    }

    pub fn is_my_turn(&self) -> bool {
        match (self.my_player(), self.snapshot.as_ref()) {
            (Some(me), Some(snap)) => snap.turn_player_name.as_deref() == Some(me.name.as_str()),
            _ => false,
        }
    }

    pub fn is_host(&self) -> bool {
        let name = self.my_player_name();
        !name.is_empty()
            && self
                .snapshot
                .as_ref()
                .and_then(|s| s.host())
                .is_some_and(|host| host.name == name)
    }

    pub fn can_bet(&self) -> bool {
        self.is_my_turn() && self.phase() == Some(&GamePhase::AwaitingBets)
    }

    /// Follow-suit legality is left to the server; every tile in hand is
    /// offered while it is our turn to play.
    pub fn can_play(&self, _tile: &Tile) -> bool {
        self.is_my_turn() && self.phase() == Some(&GamePhase::AwaitingPlay)
    }

    pub fn can_start_game(&self) -> bool {
        self.is_host()
            && self.phase() == Some(&GamePhase::Lobby)
            && self.snapshot.as_ref().is_some_and(|s| s.players.len() >= 2)
    }

    /// Inclusive bet range for the current round.
    pub fn bet_range(&self) -> std::ops::RangeInclusive<u32> {
        0..=self.snapshot.as_ref().map_or(0, |s| s.current_round)
    }
}
