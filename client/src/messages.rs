use dongdong_protocol::Tile;

use crate::error::ClientError;

/// What the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    CreateRoom { player_name: String },
    JoinRoom { player_name: String, room_id: String },
    StartGame,
    /// Raw text from the bet field.
    PlaceBet(String),
    PlayTile(Tile),
    /// 0-based position in my hand.
    PlayFromHand(usize),
    ToggleSpectators,
    Disconnect,
    Quit,
}

/// Result of a lobby round-trip, posted back to the controller.
#[derive(Debug)]
pub enum LobbyOutcome {
    Created { room_id: String, player_name: String },
    Found { room_id: String, player_name: String },
    NotFound { room_id: String },
    CreateFailed(ClientError),
    ProbeFailed { room_id: String, error: ClientError },
}
