#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter for playing Cluedo from a terminal or a script.

mod script;
mod session;

use std::{
    fs::{self, File},
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use cluedo_board::{Board, CLASSIC_LAYOUT};
use cluedo_controller::Controller;
use cluedo_core::{GameContent, Player};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::session::Session;

/// Play Cluedo on the command line.
#[derive(Parser, Debug)]
#[command(name = "cluedo")]
#[command(about = "Play a game of Cluedo from the terminal", long_about = None)]
struct Args {
    /// Seated players as NAME:PIECE, in turn order
    #[arg(long, value_delimiter = ',', value_parser = parse_player, required = true)]
    players: Vec<Player>,

    /// Seed for dice, dealing and item placement
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Board layout file (defaults to the classic board)
    #[arg(long)]
    layout: Option<PathBuf>,

    /// Content table in TOML (defaults to the classic cards)
    #[arg(long)]
    content: Option<PathBuf>,

    /// Read commands from this file instead of standard input
    #[arg(long)]
    script: Option<PathBuf>,
}

fn parse_player(value: &str) -> Result<Player, String> {
    let (name, piece) = value
        .split_once(':')
        .ok_or_else(|| format!("expected NAME:PIECE, got {value:?}"))?;
    let (name, piece) = (name.trim(), piece.trim());
    if name.is_empty() || piece.is_empty() {
        return Err(format!("expected NAME:PIECE, got {value:?}"));
    }
    Ok(Player::new(name, piece))
}

/// Entry point for the Cluedo command-line interface.
fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .try_init();

    let args = Args::parse();
    let board = load_board(args.layout.as_deref(), args.content.as_deref())?;

    let mut controller = Controller::new(board, ChaCha8Rng::seed_from_u64(args.seed));
    controller
        .set_players(args.players)
        .context("failed to seat players")?;
    controller.deal_cards().context("failed to deal cards")?;
    info!(seed = args.seed, "game started");

    let input: Box<dyn BufRead> = match &args.script {
        Some(path) => Box::new(BufReader::new(File::open(path).with_context(|| {
            format!("failed to open script at {}", path.display())
        })?)),
        None => Box::new(io::stdin().lock()),
    };

    let mut session = Session::new(controller, io::stdout().lock());
    session.run(input)
}

fn load_board(layout: Option<&Path>, content: Option<&Path>) -> Result<Board> {
    let content = match content {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read content table at {}", path.display()))?;
            parse_content(&contents)?
        }
        None => GameContent::classic(),
    };
    let layout = match layout {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read board layout at {}", path.display()))?,
        None => CLASSIC_LAYOUT.to_owned(),
    };
    Board::from_layout(&layout, content).context("failed to build board")
}

fn parse_content(contents: &str) -> Result<GameContent> {
    let content: GameContent =
        toml::from_str(contents).context("failed to parse content table toml contents")?;
    content.validate().context("content table is invalid")?;
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn players_parse_from_name_and_piece() {
        let player = parse_player("Ann : Miss Scarlett").expect("player parses");
        assert_eq!(player.name(), "Ann");
        assert_eq!(player.piece(), "Miss Scarlett");
        assert!(parse_player("Ann").is_err());
        assert!(parse_player(":Miss Scarlett").is_err());
    }

    #[test]
    fn classic_board_loads_without_files() {
        let board = load_board(None, None).expect("classic board loads");
        assert_eq!(board.dimensions(), (24, 25));
    }

    #[test]
    fn malformed_content_is_reported() {
        let error = parse_content("rooms = 3").expect_err("not a content table");
        assert!(error.to_string().contains("failed to parse content table"));
    }
}
