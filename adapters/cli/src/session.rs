//! Runs text commands against a controller and reports what happened.

use std::io::{BufRead, Write};

use anyhow::{bail, Context, Result};
use cluedo_board::{query, Item, Room};
use cluedo_controller::{apply, Controller};
use cluedo_core::{Command, Event, ItemId, MovePath, PlayerId, Status, TurnError};
use cluedo_system_pathfinding::Pathfinder;
use rand::Rng;
use tracing::debug;

use crate::script::{parse_line, ScriptCommand};

/// Interactive game session writing its transcript to `out`.
pub(crate) struct Session<R, W> {
    controller: Controller<R>,
    pathfinder: Pathfinder,
    out: W,
}

impl<R: Rng, W: Write> Session<R, W> {
    pub(crate) fn new(controller: Controller<R>, out: W) -> Self {
        Self {
            controller,
            pathfinder: Pathfinder::default(),
            out,
        }
    }

    /// Executes every line of `input` until it ends or the game is over.
    pub(crate) fn run(&mut self, input: impl BufRead) -> Result<()> {
        for (number, line) in input.lines().enumerate() {
            let line = line.context("failed to read command")?;
            match parse_line(&line) {
                Ok(Some(command)) => self.execute(command)?,
                Ok(None) => {}
                Err(error) => writeln!(self.out, "line {}: {error}", number + 1)?,
            }
            if self.controller.status() == Status::GameOver {
                break;
            }
        }
        Ok(())
    }

    /// Executes a single command.
    ///
    /// Rejected moves and turn errors are reported and play goes on. Contract
    /// violations abort the session.
    pub(crate) fn execute(&mut self, command: ScriptCommand) -> Result<()> {
        debug!(?command, "executing");
        let outcome = match command {
            ScriptCommand::Roll(None) => self.apply(Command::RollDice),
            ScriptCommand::Roll(Some(value)) => self.apply(Command::SetDiceRoll { value }),
            ScriptCommand::Move(target) => {
                let Some(piece) = self.current_piece() else {
                    writeln!(self.out, "nobody is playing")?;
                    return Ok(());
                };
                match self
                    .pathfinder
                    .plan_route(self.controller.board(), piece, target)
                {
                    Some(path) => self.walk(path),
                    None => {
                        writeln!(self.out, "no route to {target}")?;
                        return Ok(());
                    }
                }
            }
            ScriptCommand::Suggest(claim) => self.apply(Command::Suggest { claim }),
            ScriptCommand::Accuse(claim) => self.apply(Command::Accuse { claim }),
            ScriptCommand::Reveal(card) => self.apply(Command::RevealCard { card }),
            ScriptCommand::Skip => self.apply(Command::SkipRotatingPlayer),
            ScriptCommand::Finish => self.apply(Command::FinishTurn),
            ScriptCommand::Reset => self.apply(Command::Reset),
            ScriptCommand::Board => {
                write!(self.out, "{}", query::render(self.controller.board()))?;
                return Ok(());
            }
            ScriptCommand::Status => {
                self.print_status()?;
                return Ok(());
            }
        };

        match outcome {
            Ok(events) => self.report(&events),
            Err(error) if error.is_fatal() => bail!(error),
            Err(error) => {
                writeln!(self.out, "rejected: {error}")?;
                Ok(())
            }
        }
    }

    fn apply(&mut self, command: Command) -> Result<Vec<Event>, TurnError> {
        let mut events = Vec::new();
        let result = apply(&mut self.controller, command, &mut events);
        if result.is_err() {
            let _ = self.report(&events);
        }
        result.map(|()| events)
    }

    fn walk(&mut self, path: MovePath) -> Result<Vec<Event>, TurnError> {
        let mut events = self.apply(Command::AttemptMove { path })?;
        while self.controller.status() == Status::Moving {
            match self.apply(Command::Tick) {
                Ok(more) => events.extend(more),
                Err(error) => {
                    let _ = self.report(&events);
                    return Err(error);
                }
            }
        }
        Ok(events)
    }

    fn current_piece(&self) -> Option<ItemId> {
        let player = self.controller.current_player()?;
        self.controller
            .board()
            .item_by_name(player.piece())
            .map(|item| item.id())
    }

    fn player_name(&self, player: PlayerId) -> &str {
        self.controller
            .players()
            .get(player.index())
            .map_or("nobody", |player| player.name())
    }

    fn report(&mut self, events: &[Event]) -> Result<()> {
        for event in events {
            let line = self.describe(event);
            writeln!(self.out, "{line}")?;
        }
        Ok(())
    }

    fn describe(&self, event: &Event) -> String {
        match event {
            Event::CardsDealt { hand_sizes } => format!("cards dealt: {hand_sizes:?}"),
            Event::DiceRolled { player, value } => {
                format!("{} rolled {value}", self.player_name(*player))
            }
            Event::MoveAccepted { player, steps } => {
                format!("{} sets off on a {steps} step route", self.player_name(*player))
            }
            Event::ItemMoved { from, to, .. } => format!("  {from} -> {to}"),
            Event::StatusChanged { to, .. } => format!("now {to}"),
            Event::SuggestionMade { player, claim } => {
                format!("{} suggests {claim}", self.player_name(*player))
            }
            Event::RotationAdvanced { player } => {
                let cards = self.controller.disproving_cards();
                if self.controller.rotation_complete() {
                    "nobody could disprove the suggestion".to_owned()
                } else if cards.is_empty() {
                    format!("{} cannot disprove", self.player_name(*player))
                } else {
                    format!(
                        "{} can disprove with: {}",
                        self.player_name(*player),
                        cards.join(", ")
                    )
                }
            }
            Event::CardRevealed { by, card } => {
                format!("{} shows {card}", self.player_name(*by))
            }
            Event::PlayerEliminated { player } => {
                format!("{} is out of the game", self.player_name(*player))
            }
            Event::GameOver { winner: Some(player) } => {
                format!("{} solved the murder", self.player_name(*player))
            }
            Event::GameOver { winner: None } => match self.controller.solution() {
                Some(solution) => format!("the murderer got away: {solution}"),
                None => "the murderer got away".to_owned(),
            },
            Event::TurnFinished { next, .. } => {
                format!("{} to play", self.player_name(*next))
            }
            Event::GameReset => "new game".to_owned(),
        }
    }

    fn print_status(&mut self) -> Result<()> {
        let controller = &self.controller;
        let mut lines = vec![format!("status: {}", controller.status())];
        if let Some(player) = controller.current_player() {
            lines.push(format!("player: {} ({})", player.name(), player.piece()));
            lines.push(format!("hand: {}", player.hand().join(", ")));
        }
        let board = controller.board();
        let here = controller
            .current_player()
            .and_then(|player| board.item_by_name(player.piece()))
            .filter(|piece| !piece.room().is_corridor());
        if let Some(piece) = here {
            let room = board.room(piece.room()).map_or("?", Room::name);
            let items: Vec<&str> = query::items_in_room(board, piece.room())
                .into_iter()
                .map(Item::name)
                .collect();
            lines.push(format!("room: {room} ({})", items.join(", ")));
        }
        lines.push(format!(
            "dice: {} ({} left)",
            controller.dice(),
            controller.moves_remaining()
        ));
        if let Some(suggestion) = controller.suggestion() {
            lines.push(format!("claim: {suggestion}"));
        }
        for line in lines {
            writeln!(self.out, "{line}")?;
        }
        Ok(())
    }

    #[cfg(test)]
    fn into_output(self) -> W {
        self.out
    }
}
