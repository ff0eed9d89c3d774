use dongdong_protocol::{Color, GamePhase, Tile};

use crate::store::StateStore;

/// Names longer than this are cut in the compact layout.
pub const COMPACT_NAME_LIMIT: usize = 5;

/// Terminals this many columns wide or narrower get the compact layout.
pub const COMPACT_MAX_COLUMNS: u16 = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    #[default]
    Wide,
    /// Narrow displays: short names, terse labels.
    Compact,
}

impl Layout {
    pub fn for_width(columns: u16) -> Self {
        if columns <= COMPACT_MAX_COLUMNS {
            Layout::Compact
        } else {
            Layout::Wide
        }
    }

    pub fn display_name(self, name: &str) -> String {
        match self {
            Layout::Wide => name.to_string(),
            Layout::Compact if name.chars().count() > COMPACT_NAME_LIMIT => {
                let short: String = name.chars().take(COMPACT_NAME_LIMIT).collect();
                format!("{short}…")
            }
            Layout::Compact => name.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Lobby,
    Table,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerRow {
    pub name: String,
    pub display_name: String,
    pub is_me: bool,
    pub is_turn: bool,
    pub is_host: bool,
    pub score: i64,
    pub bet: u32,
    pub stacks_won: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayedTile {
    pub player: String,
    pub tile: Tile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandTile {
    pub tile: Tile,
    pub playable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BetPrompt {
    pub max: u32,
    pub forbidden: Option<u32>,
}

/// Client-only state the controller layers over the snapshot.
#[derive(Debug, Clone, Default)]
pub struct Overlay {
    pub status: String,
    pub notification: Option<String>,
    pub countdown: Option<u32>,
    pub stack_cleared: bool,
    pub show_spectators: bool,
}

/// Everything a front end needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewModel {
    pub screen: Screen,
    pub layout: Layout,
    pub room_id: String,
    pub player_name: String,
    pub phase: Option<GamePhase>,
    /// `None` before the first round; shown as "--".
    pub round: Option<u32>,
    pub master_color: Option<Color>,
    pub secondary_color: Option<Color>,
    pub status: String,
    pub notification: Option<String>,
    pub countdown: Option<u32>,
    pub players: Vec<PlayerRow>,
    pub spectators: Vec<String>,
    pub show_spectators: bool,
    pub event_log: Vec<String>,
    pub stack: Vec<PlayedTile>,
    pub hand: Vec<HandTile>,
    pub can_start_game: bool,
    pub bet_prompt: Option<BetPrompt>,
}

impl ViewModel {
    pub fn build(store: &StateStore, overlay: &Overlay, layout: Layout) -> Self {
        let mut model = ViewModel {
            screen: Screen::Lobby,
            layout,
            room_id: store.room_id().to_string(),
            player_name: store.my_player_name().to_string(),
            phase: None,
            round: None,
            master_color: None,
            secondary_color: None,
            status: overlay.status.clone(),
            notification: overlay.notification.clone(),
            countdown: overlay.countdown,
            players: Vec::new(),
            spectators: Vec::new(),
            show_spectators: overlay.show_spectators,
            event_log: Vec::new(),
            stack: Vec::new(),
            hand: Vec::new(),
            can_start_game: false,
            bet_prompt: None,
        };

        let Some(snap) = store.snapshot() else {
            return model;
        };

        let in_lobby = snap.game_state == GamePhase::Lobby && model.room_id.is_empty();
        model.screen = if in_lobby { Screen::Lobby } else { Screen::Table };
        model.phase = Some(snap.game_state.clone());
        model.round = Some(snap.current_round).filter(|r| *r > 0);
        model.master_color = snap.master_color;
        model.secondary_color = snap.secondary_color;

        let me = store.my_player_name();
        let turn = snap.turn_player_name.as_deref();
        model.players = snap
            .players
            .iter()
            .enumerate()
            .map(|(seat, p)| PlayerRow {
                name: p.name.clone(),
                display_name: layout.display_name(&p.name),
                is_me: !me.is_empty() && p.name == me,
                is_turn: turn == Some(p.name.as_str()),
                is_host: seat == 0,
                score: p.score,
                bet: p.bet,
                stacks_won: p.stacks_won,
            })
            .collect();
        model.spectators = snap.spectators.clone();
        model.event_log = snap.event_log.clone();

        if !overlay.stack_cleared {
            // Seat order first, then anyone the server lists who has no seat.
            let mut stack: Vec<PlayedTile> = snap
                .players
                .iter()
                .filter_map(|p| {
                    snap.current_stack_plays.get(&p.name).map(|tile| PlayedTile {
                        player: p.name.clone(),
                        tile: *tile,
                    })
                })
                .collect();
            let mut unseated: Vec<PlayedTile> = snap
                .current_stack_plays
                .iter()
                .filter(|(name, _)| snap.player(name).is_none())
                .map(|(name, tile)| PlayedTile {
                    player: name.clone(),
                    tile: *tile,
                })
                .collect();
            unseated.sort_by(|a, b| a.player.cmp(&b.player));
            stack.extend(unseated);
            model.stack = stack;
        }

        if let Some(mine) = store.my_player() {
            model.hand = mine
                .hand
                .iter()
                .map(|tile| HandTile {
                    tile: *tile,
                    playable: store.can_play(tile),
                })
                .collect();
        }

        model.can_start_game = store.can_start_game();
        if store.can_bet() {
            model.bet_prompt = Some(BetPrompt {
                max: *store.bet_range().end(),
                forbidden: snap.betting_info.and_then(|b| b.forbidden()),
            });
        }
        model
    }

    pub fn round_label(&self) -> String {
        self.round.map_or_else(|| "--".to_string(), |r| r.to_string())
    }
}

/// A front end. Called after every change with a freshly built model.
pub trait View {
    fn render(&mut self, model: &ViewModel);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Session;
    use dongdong_protocol::{BettingInfo, GameSnapshot, Player};
    use std::collections::HashMap;

    fn seat(name: &str, hand: Vec<Tile>) -> Player {
        Player {
            name: name.into(),
            score: 10,
            bet: 1,
            stacks_won: 0,
            hand,
        }
    }

    fn table() -> GameSnapshot {
        let mut plays = HashMap::new();
        plays.insert("Charlotte".to_string(), Tile::new(Color::Blue, 2));
        plays.insert("Alice".to_string(), Tile::new(Color::Red, 9));
        plays.insert("Ghost".to_string(), Tile::new(Color::Black, 1));
        GameSnapshot {
            game_state: GamePhase::AwaitingPlay,
            current_round: 2,
            master_color: Some(Color::Orange),
            players: vec![
                seat("Alice", vec![Tile::new(Color::Red, 3)]),
                seat("Bob", vec![]),
                seat("Charlotte", vec![Tile::new(Color::Blue, 5), Tile::new(Color::Black, 7)]),
            ],
            turn_player_name: Some("Charlotte".into()),
            current_stack_plays: plays,
            message: "Charlotte to play.".into(),
            ..Default::default()
        }
    }

    fn store_for(name: &str, snap: GameSnapshot) -> StateStore {
        let mut store = StateStore::new();
        store.begin_session(Session::new("0420", name));
        store.apply_snapshot(snap);
        store
    }

    #[test]
    fn empty_store_shows_lobby() {
        let model = ViewModel::build(&StateStore::new(), &Overlay::default(), Layout::Wide);
        assert_eq!(model.screen, Screen::Lobby);
        assert!(model.players.is_empty());
        assert_eq!(model.round_label(), "--");
    }

    #[test]
    fn stack_follows_seat_order() {
        let store = store_for("Charlotte", table());
        let model = ViewModel::build(&store, &Overlay::default(), Layout::Wide);
        let order: Vec<&str> = model.stack.iter().map(|p| p.player.as_str()).collect();
        assert_eq!(order, vec!["Alice", "Charlotte", "Ghost"]);
        assert_eq!(model.screen, Screen::Table);
        assert_eq!(model.round_label(), "2");
    }

    #[test]
    fn cleared_stack_is_hidden_locally() {
        let store = store_for("Charlotte", table());
        let overlay = Overlay { stack_cleared: true, ..Default::default() };
        let model = ViewModel::build(&store, &overlay, Layout::Wide);
        assert!(model.stack.is_empty());
    }

    #[test]
    fn hand_is_playable_only_on_my_turn() {
        let store = store_for("Charlotte", table());
        let model = ViewModel::build(&store, &Overlay::default(), Layout::Wide);
        assert_eq!(model.hand.len(), 2);
        assert!(model.hand.iter().all(|h| h.playable));

        let store = store_for("Alice", table());
        let model = ViewModel::build(&store, &Overlay::default(), Layout::Wide);
        assert_eq!(model.hand.len(), 1);
        assert!(!model.hand[0].playable);
        assert!(model.players[0].is_me && model.players[0].is_host);
        assert!(model.players[2].is_turn);
    }

    #[test]
    fn spectators_have_no_hand() {
        let model = ViewModel::build(&store_for("Zed", table()), &Overlay::default(), Layout::Wide);
        assert!(model.hand.is_empty());
        assert!(model.players.iter().all(|p| !p.is_me));
    }

    #[test]
    fn bet_prompt_carries_range_and_hint() {
        let mut snap = table();
        snap.game_state = GamePhase::AwaitingBets;
        snap.betting_info = Some(BettingInfo { is_last_player: true, forbidden_bet: 1 });
        let store = store_for("Charlotte", snap.clone());
        let model = ViewModel::build(&store, &Overlay::default(), Layout::Wide);
        assert_eq!(model.bet_prompt, Some(BetPrompt { max: 2, forbidden: Some(1) }));

        let model = ViewModel::build(&store_for("Bob", snap), &Overlay::default(), Layout::Wide);
        assert_eq!(model.bet_prompt, None);
    }

    #[test]
    fn compact_layout_truncates_names() {
        let store = store_for("Alice", table());
        let model = ViewModel::build(&store, &Overlay::default(), Layout::Compact);
        assert_eq!(model.players[0].display_name, "Alice");
        assert_eq!(model.players[2].display_name, "Charl…");
        assert_eq!(Layout::Wide.display_name("Charlotte"), "Charlotte");
    }

    #[test]
    fn narrow_terminals_get_the_compact_layout() {
        assert_eq!(Layout::for_width(60), Layout::Compact);
        assert_eq!(Layout::for_width(COMPACT_MAX_COLUMNS), Layout::Compact);
        assert_eq!(Layout::for_width(COMPACT_MAX_COLUMNS + 1), Layout::Wide);
    }

    #[test]
    fn lobby_without_room_stays_on_lobby_screen() {
        let mut store = StateStore::new();
        store.apply_snapshot(GameSnapshot::default());
        let model = ViewModel::build(&store, &Overlay::default(), Layout::Wide);
        assert_eq!(model.screen, Screen::Lobby);
    }
}
