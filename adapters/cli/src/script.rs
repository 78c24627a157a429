//! Text commands accepted on standard input or from a script file.

use cluedo_core::{CellCoord, Claim};
use thiserror::Error;

/// Separator between the three cards of a suggestion or accusation.
const CLAIM_DELIMITER: char = '|';

/// A single line of player input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ScriptCommand {
    /// Rolls the dice, or records the provided value.
    Roll(Option<u32>),
    /// Walks the current piece toward a square.
    Move(CellCoord),
    /// Suggests a murderer.
    Suggest(Claim),
    /// Accuses a murderer.
    Accuse(Claim),
    /// Shows a card to disprove the suggestion.
    Reveal(String),
    /// Passes the disprove rotation on.
    Skip,
    /// Ends the current turn.
    Finish,
    /// Starts a new game with the same players.
    Reset,
    /// Prints the board.
    Board,
    /// Prints the turn state.
    Status,
}

/// Reasons a line could not be understood.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub(crate) enum ScriptError {
    #[error("unknown command {0:?}")]
    UnknownCommand(String),
    #[error("{command} expects {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },
    #[error("{0:?} is not a number")]
    InvalidNumber(String),
    #[error("a claim names a character, a weapon and a room separated by '|', got {0:?}")]
    InvalidClaim(String),
}

/// Parses one line of input. Blank lines and `#` comments yield `None`.
pub(crate) fn parse_line(line: &str) -> Result<Option<ScriptCommand>, ScriptError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (keyword, rest) = match line.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest.trim()),
        None => (line, ""),
    };

    let command = match keyword.to_ascii_lowercase().as_str() {
        "roll" => {
            if rest.is_empty() {
                ScriptCommand::Roll(None)
            } else {
                ScriptCommand::Roll(Some(parse_number(rest)?))
            }
        }
        "move" => {
            let mut parts = rest.split_whitespace();
            let (Some(column), Some(row), None) = (parts.next(), parts.next(), parts.next())
            else {
                return Err(ScriptError::MissingArgument {
                    command: "move",
                    expected: "<column> <row>",
                });
            };
            ScriptCommand::Move(CellCoord::new(parse_number(column)?, parse_number(row)?))
        }
        "suggest" => ScriptCommand::Suggest(parse_claim(rest)?),
        "accuse" => ScriptCommand::Accuse(parse_claim(rest)?),
        "reveal" => {
            if rest.is_empty() {
                return Err(ScriptError::MissingArgument {
                    command: "reveal",
                    expected: "<card>",
                });
            }
            ScriptCommand::Reveal(rest.to_owned())
        }
        "skip" => ScriptCommand::Skip,
        "finish" => ScriptCommand::Finish,
        "reset" => ScriptCommand::Reset,
        "board" => ScriptCommand::Board,
        "status" => ScriptCommand::Status,
        _ => return Err(ScriptError::UnknownCommand(keyword.to_owned())),
    };
    Ok(Some(command))
}

fn parse_number(value: &str) -> Result<u32, ScriptError> {
    value
        .parse()
        .map_err(|_| ScriptError::InvalidNumber(value.to_owned()))
}

fn parse_claim(value: &str) -> Result<Claim, ScriptError> {
    let cards: Vec<&str> = value.split(CLAIM_DELIMITER).map(str::trim).collect();
    match cards.as_slice() {
        [character, weapon, room]
            if !character.is_empty() && !weapon.is_empty() && !room.is_empty() =>
        {
            Ok(Claim::new(*character, *weapon, *room))
        }
        _ => Err(ScriptError::InvalidClaim(value.to_owned())),
    }
}
