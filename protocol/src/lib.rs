use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;

/// ---- Close codes ----
/// The server closes with this when the room id does not exist.
pub const CLOSE_ROOM_NOT_FOUND: u16 = 4000;
/// The server closes with this when an active player already holds the name.
pub const CLOSE_NAME_TAKEN: u16 = 4001;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseKind {
    /// The join attempt itself was refused.
    Rejected,
    /// Restart, network loss, normal close, anything else.
    Ambient,
}

pub fn classify_close(code: u16) -> CloseKind {
    match code {
        CLOSE_ROOM_NOT_FOUND | CLOSE_NAME_TAKEN => CloseKind::Rejected,
        _ => CloseKind::Ambient,
    }
}

/// ---- Tiles ----
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Color {
    #[serde(alias = "red", alias = "RED")]
    Red,
    #[serde(alias = "black", alias = "BLACK")]
    Black,
    #[serde(alias = "blue", alias = "BLUE")]
    Blue,
    #[serde(alias = "orange", alias = "ORANGE")]
    Orange,
}

impl Color {
    pub const ALL: [Color; 4] = [Color::Red, Color::Black, Color::Blue, Color::Orange];

    pub fn parse(s: &str) -> Option<Color> {
        Color::ALL
            .into_iter()
            .find(|c| c.to_string().eq_ignore_ascii_case(s.trim()))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Red => write!(f, "Red"),
            Color::Black => write!(f, "Black"),
            Color::Blue => write!(f, "Blue"),
            Color::Orange => write!(f, "Orange"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Tile {
    pub color: Color,
    pub number: u8,
}

impl Tile {
    pub fn new(color: Color, number: u8) -> Self {
        Tile { color, number }
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {}]", self.color, self.number)
    }
}

/// ---- Game phase ----
/// The server owns the set of phases; anything we do not know about is kept
/// verbatim so it can still be displayed and compared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GamePhase {
    #[default]
    Lobby,
    RoundStarting,
    AwaitingBets,
    AwaitingPlay,
    TrickResolving,
    RoundOver,
    GameOver,
    Other(String),
}

impl GamePhase {
    pub fn as_str(&self) -> &str {
        match self {
            GamePhase::Lobby => "LOBBY",
            GamePhase::RoundStarting => "ROUND_STARTING",
            GamePhase::AwaitingBets => "AWAITING_BETS",
            GamePhase::AwaitingPlay => "AWAITING_PLAY",
            GamePhase::TrickResolving => "TRICK_RESOLVING",
            GamePhase::RoundOver => "ROUND_OVER",
            GamePhase::GameOver => "GAME_OVER",
            GamePhase::Other(s) => s,
        }
    }
}

impl From<String> for GamePhase {
    fn from(s: String) -> Self {
        match s.as_str() {
            "LOBBY" => GamePhase::Lobby,
            "ROUND_STARTING" => GamePhase::RoundStarting,
            "AWAITING_BETS" => GamePhase::AwaitingBets,
            "AWAITING_PLAY" => GamePhase::AwaitingPlay,
            "TRICK_RESOLVING" => GamePhase::TrickResolving,
            "ROUND_OVER" => GamePhase::RoundOver,
            "GAME_OVER" => GamePhase::GameOver,
            _ => GamePhase::Other(s),
        }
    }
}

impl From<GamePhase> for String {
    fn from(phase: GamePhase) -> Self {
        phase.as_str().to_string()
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ---- Snapshot ----
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Player {
    pub name: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub bet: u32,
    #[serde(default, alias = "tricks_won")]
    pub stacks_won: u32,
    #[serde(default)]
    pub hand: Vec<Tile>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BettingInfo {
    pub is_last_player: bool,
    /// -1 when every bet in range is allowed.
    pub forbidden_bet: i64,
}

impl BettingInfo {
    pub fn forbidden(&self) -> Option<u32> {
        if self.is_last_player {
            u32::try_from(self.forbidden_bet).ok()
        } else {
            None
        }
    }
}

/// Complete authoritative state pushed by the server. Always replaces the
/// previous one wholesale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub game_state: GamePhase,
    #[serde(default)]
    pub current_round: u32,
    #[serde(default)]
    pub master_color: Option<Color>,
    #[serde(default)]
    pub secondary_color: Option<Color>,
    #[serde(default)]
    pub players: Vec<Player>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub turn_player_name: Option<String>,
    #[serde(default, alias = "currentTrickPlays")]
    pub current_stack_plays: HashMap<String, Tile>,
    #[serde(default)]
    pub spectators: Vec<String>,
    #[serde(default)]
    pub event_log: Vec<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub betting_info: Option<BettingInfo>,
}

impl GameSnapshot {
    /// Seat 0 hosts the room.
    pub fn host(&self) -> Option<&Player> {
        self.players.first()
    }

    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name == name)
    }
}

fn empty_as_none<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(de)?;
    Ok(raw.filter(|s| !s.is_empty()))
}

/// ---- Lobby HTTP ----
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomCreated {
    pub room_id: String,
}

/// ---- WebSocket frames ----
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BetPayload {
    pub amount: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TilePayload {
    pub tile: Tile,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientToServer {
    StartGame,
    PlaceBet { payload: BetPayload },
    PlayTile { payload: TilePayload },
}

impl ClientToServer {
    pub fn place_bet(amount: i64) -> Self {
        ClientToServer::PlaceBet {
            payload: BetPayload { amount },
        }
    }

    pub fn play_tile(tile: Tile) -> Self {
        ClientToServer::PlayTile {
            payload: TilePayload { tile },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerToClient {
    GameState { payload: GameSnapshot },
    Error { message: String },
}
