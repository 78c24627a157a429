//! Failure vocabulary shared by the board, the controller and adapters.

use thiserror::Error;

use crate::{CellCoord, ItemKind, PlayerId, Status, UnfinishedTurn};

/// Reasons an item could not be moved. The board is left unchanged.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MoveError {
    /// The move contained no squares.
    #[error("cannot perform an empty move")]
    EmptyPath,
    /// The destination lies outside the board.
    #[error("square {0} lies outside the board")]
    OutOfBounds(CellCoord),
    /// The destination is a void square that belongs to no room.
    #[error("square {0} is not part of any room")]
    NoRoom(CellCoord),
    /// The destination holds an item that keeps the mover out.
    #[error("square {cell} already holds a {kind}")]
    Occupied {
        /// Square that was requested.
        cell: CellCoord,
        /// Kind of item already on the square.
        kind: ItemKind,
    },
    /// A step jumps between two rooms without using the right portal.
    #[error("cannot move from {from} to {to} without a portal")]
    NoPortal {
        /// Square the item leaves.
        from: CellCoord,
        /// Square in the other room.
        to: CellCoord,
    },
    /// Every eligible square of the room is taken.
    #[error("room {0} has no free square")]
    RoomFull(String),
    /// No item carries the provided name.
    #[error("unknown item {0}")]
    UnknownItem(String),
    /// No room carries the provided name.
    #[error("unknown room {0}")]
    UnknownRoom(String),
}

/// Reasons the controller refused a turn operation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TurnError {
    /// The current player already made a wrong accusation.
    #[error("{0} has been eliminated")]
    PlayerEliminated(PlayerId),
    /// A suggestion or accusation was already made this turn.
    #[error("a suggestion or accusation was already made this turn")]
    AlreadySuggested,
    /// The turn cannot be handed over yet.
    #[error("turn not finished: {0}")]
    TurnNotFinished(UnfinishedTurn),
    /// The operation is not available in the current phase.
    #[error("operation not available while {actual}")]
    UnexpectedStatus {
        /// Phase the controller was in.
        actual: Status,
    },
    /// Dice rolls must move the piece at least one square.
    #[error("invalid dice roll {0}")]
    InvalidDiceRoll(u32),
    /// Players have not been seated.
    #[error("no players have been seated")]
    NoPlayers,
    /// No solution has been drawn yet.
    #[error("cards have not been dealt")]
    NotDealt,
    /// The name is not a card of the expected category.
    #[error("unknown {category} card {name}")]
    UnknownCard {
        /// Category the card was expected to belong to.
        category: &'static str,
        /// Name that was supplied.
        name: String,
    },
    /// The game has already ended.
    #[error("the game is over")]
    GameOver,
    /// The board rejected a move.
    #[error(transparent)]
    Move(#[from] MoveError),
    /// The caller broke the controller's contract.
    #[error(transparent)]
    Contract(#[from] ContractViolation),
}

impl TurnError {
    /// Reports whether the error signals caller misuse rather than legitimate play.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Contract(_))
    }
}

/// Misuse of the controller API that legitimate play never produces.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ContractViolation {
    /// The revealed card is not one of the three suggested cards.
    #[error("card {card} was not part of the suggestion")]
    CardNotSuggested {
        /// Card the caller tried to reveal.
        card: String,
    },
    /// A card was revealed while no suggestion was in flight.
    #[error("no suggestion is awaiting a card")]
    NoSuggestion,
}

/// Fatal problems found while building a board from its layout and content.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BuildError {
    /// The layout contained no rows.
    #[error("layout is empty")]
    EmptyLayout,
    /// A row has a different width from the first row.
    #[error("layout row {row} is {actual} squares wide, expected {expected}")]
    RaggedRow {
        /// Zero-based row index.
        row: u32,
        /// Width of the first row.
        expected: u32,
        /// Width of the offending row.
        actual: u32,
    },
    /// A glyph names neither a room nor a structural element.
    #[error("unknown glyph {glyph:?} at {cell}")]
    UnknownGlyph {
        /// Glyph that was read.
        glyph: char,
        /// Square holding the glyph.
        cell: CellCoord,
    },
    /// A portal is the last glyph of its row or names an unknown room.
    #[error("portal at {0} has no valid target room")]
    PortalWithoutTarget(CellCoord),
    /// No orthogonal neighbour of a portal belongs to a room.
    #[error("portal at {0} is not attached to a room")]
    PortalWithoutRoom(CellCoord),
    /// No neighbour of a door belongs to a room.
    #[error("door at {0} is not attached to a room")]
    DoorWithoutRoom(CellCoord),
    /// A room already owns a portal.
    #[error("room {0} has more than one portal")]
    DuplicatePortal(String),
    /// A character starts outside the corridor.
    #[error("{name} starts at {cell}, which is not a corridor square")]
    InvalidStart {
        /// Character whose start square is invalid.
        name: String,
        /// Configured start square.
        cell: CellCoord,
    },
    /// Two characters share a start square.
    #[error("two characters start at {0}")]
    SharedStart(CellCoord),
    /// A card category has no entries.
    #[error("content lists no {0}")]
    EmptyCategory(&'static str),
    /// Fewer characters than the smallest game needs.
    #[error("content lists only {0} characters")]
    NotEnoughCharacters(usize),
    /// More rooms than room identifiers.
    #[error("content lists {0} rooms, which is too many")]
    TooManyRooms(usize),
    /// More pieces and weapons than item identifiers.
    #[error("content lists {0} pieces and weapons, which is too many")]
    TooManyItems(usize),
    /// Each weapon needs its own room at setup.
    #[error("{weapons} weapons need distinct rooms but only {rooms} exist")]
    NotEnoughRooms {
        /// Number of named rooms.
        rooms: usize,
        /// Number of weapons.
        weapons: usize,
    },
    /// A room glyph collides with a structural glyph.
    #[error("room glyph {0:?} is reserved")]
    ReservedGlyph(char),
    /// Two rooms share a glyph.
    #[error("room glyph {0:?} is used twice")]
    DuplicateGlyph(char),
    /// Two cards share a name.
    #[error("name {0} is used twice")]
    DuplicateName(String),
}

/// Reasons a roster of players could not be seated.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SetupError {
    /// Fewer players than the smallest game needs.
    #[error("at least 3 players are required, got {0}")]
    TooFewPlayers(usize),
    /// More players than there are characters.
    #[error("at most {max} players are supported, got {actual}")]
    TooManyPlayers {
        /// Largest supported roster.
        max: usize,
        /// Roster size that was supplied.
        actual: usize,
    },
    /// A player chose a piece that is not a character.
    #[error("unknown piece {0}")]
    UnknownPiece(String),
    /// Two players chose the same piece.
    #[error("piece {0} was chosen twice")]
    DuplicatePiece(String),
    /// Pieces or weapons could not be placed on the board.
    #[error(transparent)]
    Board(#[from] MoveError),
}
