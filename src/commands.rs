use dongdong_client::Intent;
use dongdong_protocol::{Color, Tile};

/// A line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Intent(Intent),
    Help,
    Rules,
}

pub const HELP: &str = "\
📋 Commands:
  create <name>           - Create a room and sit down
  join <room> <name>      - Join a room by its code
  start                   - Start the game (host, 2+ players)
  bet <n>                 - Place your bet
  play <n>                - Play the n-th tile of your hand
  play <color> <number>   - Play a specific tile
  spectators              - Show/hide the spectator list
  leave                   - Leave the room
  rules                   - How to play
  quit                    - Exit";

pub const RULES: &str = "\
📖 How to play
  • Each round every player gets as many tiles as the round number (up to 13).
  • A master color is drawn each round; it beats every other color.
  • Bet how many stacks you expect to win. The last bidder may not make the
    bets add up to the round number.
  • The first tile of a stack sets its color; follow it if you can.
  • Exact bet: 10 + bet² points. Otherwise you lose (bet - won)² points.";

pub fn parse_command(input: &str) -> Option<Command> {
    let parts: Vec<&str> = input.split_whitespace().collect();
    let (head, args) = parts.split_first()?;

    let intent = match head.to_lowercase().as_str() {
        "help" | "?" => return Some(Command::Help),
        "rules" => return Some(Command::Rules),
        "create" => Intent::CreateRoom {
            player_name: args.join(" "),
        },
        "join" => {
            let (room, name) = args.split_first()?;
            Intent::JoinRoom {
                room_id: room.to_string(),
                player_name: name.join(" "),
            }
        }
        "start" => Intent::StartGame,
        "bet" => Intent::PlaceBet(args.join(" ")),
        "play" => match args {
            [position] => {
                let n: usize = position.parse().ok()?;
                Intent::PlayFromHand(n.checked_sub(1)?)
            }
            [color, number] => {
                Intent::PlayTile(Tile::new(Color::parse(color)?, number.parse().ok()?))
            }
            _ => return None,
        },
        "spectators" => Intent::ToggleSpectators,
        "leave" => Intent::Disconnect,
        "quit" | "exit" => Intent::Quit,
        _ => return None,
    };
    Some(Command::Intent(intent))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intent(line: &str) -> Intent {
        match parse_command(line) {
            Some(Command::Intent(intent)) => intent,
            other => panic!("{line:?} parsed as {other:?}"),
        }
    }

    #[test]
    fn lobby_commands() {
        assert_eq!(
            intent("create Mary Jane"),
            Intent::CreateRoom { player_name: "Mary Jane".into() }
        );
        assert_eq!(
            intent("join 0420 Bob"),
            Intent::JoinRoom { room_id: "0420".into(), player_name: "Bob".into() }
        );
        // Validation of empty names is the controller's job.
        assert_eq!(intent("create"), Intent::CreateRoom { player_name: String::new() });
        assert_eq!(parse_command("join"), None);
    }

    #[test]
    fn bets_pass_raw_text_through() {
        assert_eq!(intent("bet 2"), Intent::PlaceBet("2".into()));
        assert_eq!(intent("BET lots"), Intent::PlaceBet("lots".into()));
    }

    #[test]
    fn play_by_position_or_tile() {
        assert_eq!(intent("play 1"), Intent::PlayFromHand(0));
        assert_eq!(intent("play red 3"), Intent::PlayTile(Tile::new(Color::Red, 3)));
        assert_eq!(parse_command("play 0"), None);
        assert_eq!(parse_command("play green 3"), None);
        assert_eq!(parse_command("play"), None);
    }

    #[test]
    fn misc() {
        assert_eq!(parse_command("  "), None);
        assert_eq!(parse_command("dance"), None);
        assert_eq!(parse_command("help"), Some(Command::Help));
        assert_eq!(parse_command("rules"), Some(Command::Rules));
        assert_eq!(intent("quit"), Intent::Quit);
        assert_eq!(intent("leave"), Intent::Disconnect);
        assert_eq!(intent("spectators"), Intent::ToggleSpectators);
    }
}
