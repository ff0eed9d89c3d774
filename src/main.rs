//! Terminal front end for Dong Dong.

mod commands;
mod terminal;

use anyhow::Context;
use clap::Parser;
use dongdong_client::config::DEFAULT_API_BASE;
use dongdong_client::{ClientConfig, Controller, Intent, Layout};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedSender};

use commands::{parse_command, Command, HELP, RULES};
use terminal::TerminalView;

#[derive(Parser, Debug)]
#[command(name = "dongdong")]
#[command(about = "Play Dong Dong from the terminal")]
struct Cli {
    /// Base URL of the room service
    #[arg(long, env = "DONGDONG_API", default_value = DEFAULT_API_BASE)]
    api: String,

    /// Base URL for game sockets; derived from --api when omitted
    #[arg(long, env = "DONGDONG_WS")]
    ws: Option<String>,

    /// Shorter names and labels for narrow terminals
    #[arg(long)]
    compact: bool,

    /// Terminal width in columns; narrow terminals switch to the compact layout
    #[arg(long, env = "COLUMNS")]
    width: Option<u16>,

    /// Verbose logging with targets and line numbers
    #[arg(long)]
    debug: bool,
}

impl Cli {
    fn layout(&self) -> Layout {
        if self.compact {
            return Layout::Compact;
        }
        self.width.map_or(Layout::Wide, Layout::for_width)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_filter = if cli.debug {
        "debug"
    } else {
        "dongdong=info,dongdong_client=info,warn"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(cli.debug)
        .with_file(cli.debug)
        .with_line_number(cli.debug)
        .init();

    let layout = cli.layout();
    let config = ClientConfig::new(&cli.api, cli.ws.as_deref())
        .with_context(|| format!("invalid server address '{}'", cli.api))?
        .with_layout(layout);
    tracing::info!(api = %config.api_base, ws = %config.ws_base, "starting");

    println!("🎮 Dong Dong");
    println!("============");
    println!("{HELP}");

    let (tx, rx) = mpsc::unbounded_channel();
    let input = tokio::spawn(read_commands(tx));

    Controller::from_config(config, TerminalView::default())
        .run(rx)
        .await;

    input.abort();
    println!("👋 Bye");
    Ok(())
}

async fn read_commands(tx: UnboundedSender<Intent>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("stdin: {e}");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match parse_command(&line) {
            Some(Command::Help) => println!("{HELP}"),
            Some(Command::Rules) => println!("{RULES}"),
            Some(Command::Intent(intent)) => {
                if tx.send(intent).is_err() {
                    break;
                }
            }
            None => println!("❓ Unknown command. Type 'help' for the list."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("dongdong").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn layout_follows_flag_then_width() {
        assert_eq!(parse(&["--compact", "--width", "200"]).layout(), Layout::Compact);
        assert_eq!(parse(&["--width", "72"]).layout(), Layout::Compact);
        assert_eq!(parse(&["--width", "120"]).layout(), Layout::Wide);
    }
}
