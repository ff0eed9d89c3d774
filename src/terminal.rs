use std::fmt::Write as _;
use std::io::{self, Write};

use dongdong_client::view::{Screen, ViewModel};
use dongdong_client::{Layout, View};

/// Prints the table to stdout whenever the model changes.
#[derive(Default)]
pub struct TerminalView {
    last: Option<String>,
}

impl View for TerminalView {
    fn render(&mut self, model: &ViewModel) {
        let frame = draw(model);
        if self.last.as_deref() == Some(frame.as_str()) {
            return;
        }
        let mut out = io::stdout().lock();
        let _ = writeln!(out, "{frame}");
        let _ = out.flush();
        self.last = Some(frame);
    }
}

pub fn draw(model: &ViewModel) -> String {
    let mut s = String::new();
    if let Some(note) = &model.notification {
        let _ = writeln!(s, "🔔 {note}");
    }

    if model.screen == Screen::Lobby {
        let _ = writeln!(s, "\n🎮 === DONG DONG LOBBY ===");
        let _ = writeln!(s, "ℹ️  {}", model.status);
        let _ = writeln!(s, "Type `create <name>` or `join <room> <name>` (`help` for more).");
        return s;
    }

    let compact = model.layout == Layout::Compact;
    let _ = writeln!(s, "\n🎲 === ROOM {} ===", model.room_id);
    let _ = writeln!(
        s,
        "🙋 {}   🎰 Round {}   👑 Master {}   ♦️  Lead {}",
        model.player_name,
        model.round_label(),
        model.master_color.map_or_else(|| String::from("--"), |c| c.to_string()),
        model.secondary_color.map_or_else(|| String::from("--"), |c| c.to_string()),
    );

    let _ = writeln!(s, "👥 Players ({}):", model.players.len());
    for p in &model.players {
        let turn = if p.is_turn { " 👈" } else { "" };
        if compact {
            let _ = writeln!(
                s,
                "  {} S:{} B:{} W:{}{}",
                p.display_name, p.score, p.bet, p.stacks_won, turn
            );
        } else {
            let me = if p.is_me { " (You)" } else { "" };
            let host = if p.is_host { " 🎩" } else { "" };
            let _ = writeln!(
                s,
                "  {}{}{}: score {}, bet {}, stacks won {}{}",
                p.display_name, me, host, p.score, p.bet, p.stacks_won, turn
            );
        }
    }

    if model.show_spectators && !model.spectators.is_empty() {
        let _ = writeln!(s, "👀 Spectators: {}", model.spectators.join(", "));
    }

    if !model.event_log.is_empty() {
        let _ = writeln!(s, "📜 Log:");
        let tail = if compact { 3 } else { 8 };
        let skip = model.event_log.len().saturating_sub(tail);
        for line in &model.event_log[skip..] {
            let _ = writeln!(s, "  {line}");
        }
    }

    if !model.stack.is_empty() {
        let plays: Vec<String> = model
            .stack
            .iter()
            .map(|p| format!("{} {}", p.player, p.tile))
            .collect();
        let _ = writeln!(s, "🃏 Stack: {}", plays.join("  "));
    }

    let _ = writeln!(s, "💬 {}", model.status);

    if !model.hand.is_empty() {
        let tiles: Vec<String> = model
            .hand
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let mark = if h.playable { "*" } else { "" };
                format!("{}:{}{mark}", i + 1, h.tile)
            })
            .collect();
        let _ = writeln!(s, "✋ Hand: {}", tiles.join(" "));
    }
    if model.can_start_game {
        let _ = writeln!(s, "▶️  You host this room: type `start` to begin.");
    }
    if let Some(prompt) = model.bet_prompt {
        let hint = prompt
            .forbidden
            .map(|f| format!(", not {f}"))
            .unwrap_or_default();
        let _ = writeln!(s, "💰 Your bet: `bet <0-{}>`{hint}", prompt.max);
    }
    s
}
