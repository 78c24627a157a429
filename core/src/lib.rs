#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Cluedo engine.
//!
//! This crate defines the vocabulary that connects adapters, the
//! authoritative board and controller, and the pure systems. Adapters submit
//! [`Command`] values describing player intents, the controller executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! that adapters read to redraw. Systems such as pathfinding and dealing only
//! read immutable state and hand back plain values.

use std::{collections::VecDeque, fmt};

use serde::{Deserialize, Serialize};

mod content;
mod error;

pub use content::{CharacterSpec, GameContent, RoomSpec};
pub use error::{BuildError, ContractViolation, MoveError, SetupError, TurnError};

/// Fewest players a game may be started with.
pub const MIN_PLAYERS: usize = 3;

/// Most players a game may be started with.
pub const MAX_PLAYERS: usize = 6;

/// Highest value produced by a roll of the two dice.
pub const MAX_DICE_ROLL: u32 = 12;

/// Commands that express all permissible controller mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Shuffles the deck, withholds a solution and deals the remaining cards.
    DealCards,
    /// Records an externally produced dice roll for the current player.
    SetDiceRoll {
        /// Number of squares the current player may travel this turn.
        value: u32,
    },
    /// Rolls the dice using the controller's random source.
    RollDice,
    /// Requests that the current player's piece follow the provided path.
    AttemptMove {
        /// Ordered squares to visit, excluding the piece's current square.
        path: MovePath,
    },
    /// Advances an in-flight move by exactly one step.
    Tick,
    /// Suggests a murderer, weapon and room for the other players to disprove.
    Suggest {
        /// Cards named by the suggestion.
        claim: Claim,
    },
    /// Accuses a murderer, weapon and room, ending the game or eliminating the accuser.
    Accuse {
        /// Cards named by the accusation.
        claim: Claim,
    },
    /// Records the card the rotating player showed to disprove a suggestion.
    RevealCard {
        /// Name of the revealed card.
        card: String,
    },
    /// Moves the disprove rotation on to the next player.
    SkipRotatingPlayer,
    /// Ends the current player's turn.
    FinishTurn,
    /// Restarts the game with the same players.
    Reset,
}

/// Events broadcast by the controller after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that cards were dealt and a new solution withheld.
    CardsDealt {
        /// Number of cards handed to each player, in seating order.
        hand_sizes: Vec<usize>,
    },
    /// Announces the dice value granted to the current player.
    DiceRolled {
        /// Player that rolled.
        player: PlayerId,
        /// Value that was rolled.
        value: u32,
    },
    /// Confirms that a move request passed validation.
    MoveAccepted {
        /// Player whose piece will move.
        player: PlayerId,
        /// Number of squares in the accepted path.
        steps: usize,
    },
    /// Confirms that an item moved between two squares.
    ItemMoved {
        /// Item that moved.
        item: ItemId,
        /// Square the item occupied before moving.
        from: CellCoord,
        /// Square the item occupies after the move.
        to: CellCoord,
    },
    /// Announces a transition of the turn state machine.
    StatusChanged {
        /// Status before the transition.
        from: Status,
        /// Status after the transition.
        to: Status,
    },
    /// Announces a suggestion made by the current player.
    SuggestionMade {
        /// Player making the suggestion.
        player: PlayerId,
        /// Cards named by the suggestion.
        claim: Claim,
    },
    /// Announces that the disprove rotation moved to another player.
    RotationAdvanced {
        /// Player now being asked to disprove the suggestion.
        player: PlayerId,
    },
    /// Announces that a card was shown to disprove a suggestion.
    CardRevealed {
        /// Player that showed the card.
        by: PlayerId,
        /// Card that was shown.
        card: String,
    },
    /// Announces that a player made a wrong accusation.
    PlayerEliminated {
        /// Player removed from contention.
        player: PlayerId,
    },
    /// Announces the end of the game.
    GameOver {
        /// Player that solved the murder, if anyone did.
        winner: Option<PlayerId>,
    },
    /// Announces the hand-over to the next player.
    TurnFinished {
        /// Player whose turn ended.
        previous: PlayerId,
        /// Player whose turn begins.
        next: PlayerId,
    },
    /// Confirms that the game was restarted.
    GameReset,
}

/// Location of a single board square expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new board coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the square.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the square.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Computes the straight-line distance between two coordinates.
    #[must_use]
    pub fn euclidean_distance(self, other: CellCoord) -> f64 {
        let columns = f64::from(self.column().abs_diff(other.column()));
        let rows = f64::from(self.row().abs_diff(other.row()));
        columns.hypot(rows)
    }

    /// Returns the orthogonal neighbours that fall inside a grid of the given size.
    ///
    /// Neighbours are yielded left, right, up, down.
    #[must_use]
    pub fn orthogonal_neighbors(self, columns: u32, rows: u32) -> Vec<CellCoord> {
        let mut neighbors = Vec::with_capacity(4);
        if self.column > 0 {
            neighbors.push(Self::new(self.column - 1, self.row));
        }
        if self.column + 1 < columns {
            neighbors.push(Self::new(self.column + 1, self.row));
        }
        if self.row > 0 {
            neighbors.push(Self::new(self.column, self.row - 1));
        }
        if self.row + 1 < rows {
            neighbors.push(Self::new(self.column, self.row + 1));
        }
        neighbors
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Axis-aligned rectangle expressed in cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRect {
    origin: CellCoord,
    size: CellRectSize,
}

impl CellRect {
    /// Constructs a rectangle from an origin cell and size.
    #[must_use]
    pub const fn from_origin_and_size(origin: CellCoord, size: CellRectSize) -> Self {
        Self { origin, size }
    }

    /// Rectangle covering exactly one cell.
    #[must_use]
    pub const fn single(cell: CellCoord) -> Self {
        Self::from_origin_and_size(cell, CellRectSize::new(1, 1))
    }

    /// Upper-left cell that anchors the rectangle.
    #[must_use]
    pub const fn origin(&self) -> CellCoord {
        self.origin
    }

    /// Dimensions of the rectangle measured in whole cells.
    #[must_use]
    pub const fn size(&self) -> CellRectSize {
        self.size
    }

    /// Reports whether the cell lies inside the rectangle.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        cell.column() >= self.origin.column()
            && cell.row() >= self.origin.row()
            && cell.column() < self.origin.column() + self.size.width()
            && cell.row() < self.origin.row() + self.size.height()
    }

    /// Smallest rectangle covering both this rectangle and the provided cell.
    #[must_use]
    pub fn expanded_to(self, cell: CellCoord) -> Self {
        let left = self.origin.column().min(cell.column());
        let top = self.origin.row().min(cell.row());
        let right = (self.origin.column() + self.size.width()).max(cell.column() + 1);
        let bottom = (self.origin.row() + self.size.height()).max(cell.row() + 1);
        Self::from_origin_and_size(
            CellCoord::new(left, top),
            CellRectSize::new(right - left, bottom - top),
        )
    }
}

/// Size of a [`CellRect`] measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRectSize {
    width: u32,
    height: u32,
}

impl CellRectSize {
    /// Creates a new size descriptor with explicit dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width of the rectangle in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the rectangle in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }
}

/// Identifier of a room on the board.
///
/// The corridor always owns identifier zero; named rooms follow in the order
/// they appear in the [`GameContent`] room table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomId(u8);

impl RoomId {
    /// Reserved room that every hallway square belongs to.
    pub const CORRIDOR: RoomId = RoomId(0);

    /// Creates a new room identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Reports whether the identifier names the corridor.
    #[must_use]
    pub const fn is_corridor(&self) -> bool {
        self.0 == Self::CORRIDOR.0
    }
}

/// Unique identifier assigned to a piece or weapon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(u8);

impl ItemId {
    /// Creates a new item identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }
}

/// Seat of a player around the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(u8);

impl PlayerId {
    /// Creates a new player identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Seat index suitable for indexing per-player tables.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    /// Player seated after this one in a game of `player_count` players.
    #[must_use]
    pub fn next(self, player_count: usize) -> Self {
        if player_count == 0 {
            return self;
        }
        let next = (self.index() + 1) % player_count;
        Self(u8::try_from(next).unwrap_or(0))
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player {}", self.0)
    }
}

/// Kinds of items that occupy board squares.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    /// A player's token.
    Piece,
    /// A murder weapon.
    Weapon,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Piece => f.write_str("piece"),
            Self::Weapon => f.write_str("weapon"),
        }
    }
}

/// Side of a door square that admits travel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DoorOrientation {
    /// Orientation has not been assigned; the door admits nothing.
    None,
    /// Door is entered from the same column, above or below it.
    Vertical,
    /// Door is entered from the same row, left or right of it.
    Horizontal,
}

impl DoorOrientation {
    /// Reports whether a piece standing on `other` may pass through the door at `door`.
    #[must_use]
    pub fn admits(self, door: CellCoord, other: CellCoord) -> bool {
        match self {
            Self::None => false,
            Self::Vertical => other.column() == door.column(),
            Self::Horizontal => other.row() == door.row(),
        }
    }
}

/// Phases of the turn state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// Current player must roll the dice.
    RollingDice,
    /// Current player must pick a destination.
    SelectingMove,
    /// Current player has resolved an accusation.
    Accusing,
    /// Other players are asked in turn to disprove a suggestion.
    Suggesting,
    /// A card was shown to disprove the suggestion.
    Revealing,
    /// A path is being walked one tick at a time.
    Moving,
    /// Movement is over; the player may suggest, accuse or finish.
    Waiting,
    /// The game has ended.
    GameOver,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::RollingDice => "rolling dice",
            Self::SelectingMove => "selecting move",
            Self::Accusing => "accusing",
            Self::Suggesting => "suggesting",
            Self::Revealing => "revealing",
            Self::Moving => "moving",
            Self::Waiting => "waiting",
            Self::GameOver => "game over",
        };
        f.write_str(label)
    }
}

/// Reasons a turn cannot be finished yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnfinishedTurn {
    /// The dice have not been rolled.
    DiceNotRolled,
    /// Movement has not been completed.
    MoveIncomplete,
}

impl fmt::Display for UnfinishedTurn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DiceNotRolled => f.write_str("roll the dice first"),
            Self::MoveIncomplete => f.write_str("finish moving first"),
        }
    }
}

/// Resolution of an accusation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccusationOutcome {
    /// The accusation matched the solution and the accuser won.
    Correct,
    /// The accusation was wrong; the accuser is out but others play on.
    Eliminated,
    /// The accusation was wrong and nobody is left in contention.
    AllEliminated,
}

/// Ordered squares a moving item will visit.
///
/// The square the item currently occupies is never part of the path; the
/// destination always is.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovePath {
    steps: VecDeque<CellCoord>,
}

impl MovePath {
    /// Creates a path visiting the provided squares in order.
    #[must_use]
    pub fn new(steps: impl IntoIterator<Item = CellCoord>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
        }
    }

    /// Number of steps remaining.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Reports whether no steps remain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Next square to visit.
    #[must_use]
    pub fn first(&self) -> Option<CellCoord> {
        self.steps.front().copied()
    }

    /// Final square of the path.
    #[must_use]
    pub fn last(&self) -> Option<CellCoord> {
        self.steps.back().copied()
    }

    /// Path made of every step after the first.
    #[must_use]
    pub fn rest(&self) -> MovePath {
        Self {
            steps: self.steps.iter().skip(1).copied().collect(),
        }
    }

    /// Removes and returns the next square to visit.
    pub fn advance(&mut self) -> Option<CellCoord> {
        self.steps.pop_front()
    }

    /// Iterator over the remaining squares in visiting order.
    pub fn iter(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.steps.iter().copied()
    }
}

impl FromIterator<CellCoord> for MovePath {
    fn from_iter<T: IntoIterator<Item = CellCoord>>(iter: T) -> Self {
        Self::new(iter)
    }
}

/// Character, weapon and room named together.
///
/// Used for suggestions, accusations and the hidden solution.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Claim {
    character: String,
    weapon: String,
    room: String,
}

impl Claim {
    /// Creates a claim naming the provided cards.
    #[must_use]
    pub fn new(
        character: impl Into<String>,
        weapon: impl Into<String>,
        room: impl Into<String>,
    ) -> Self {
        Self {
            character: character.into(),
            weapon: weapon.into(),
            room: room.into(),
        }
    }

    /// Character named by the claim.
    #[must_use]
    pub fn character(&self) -> &str {
        &self.character
    }

    /// Weapon named by the claim.
    #[must_use]
    pub fn weapon(&self) -> &str {
        &self.weapon
    }

    /// Room named by the claim.
    #[must_use]
    pub fn room(&self) -> &str {
        &self.room
    }

    /// The three named cards in character, weapon, room order.
    #[must_use]
    pub fn cards(&self) -> [&str; 3] {
        [&self.character, &self.weapon, &self.room]
    }

    /// Reports whether the claim names the provided card.
    #[must_use]
    pub fn names(&self, card: &str) -> bool {
        self.cards().contains(&card)
    }
}

impl fmt::Display for Claim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} with the {} in the {}",
            self.character, self.weapon, self.room
        )
    }
}

/// A person seated at the table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    name: String,
    piece: String,
    hand: Vec<String>,
}

impl Player {
    /// Creates a player controlling the named piece with an empty hand.
    #[must_use]
    pub fn new(name: impl Into<String>, piece: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            piece: piece.into(),
            hand: Vec::new(),
        }
    }

    /// Display name of the player.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the character piece the player moves.
    #[must_use]
    pub fn piece(&self) -> &str {
        &self.piece
    }

    /// Cards dealt to the player.
    #[must_use]
    pub fn hand(&self) -> &[String] {
        &self.hand
    }

    /// Reports whether the player holds the named card.
    #[must_use]
    pub fn holds(&self, card: &str) -> bool {
        self.hand.iter().any(|held| held == card)
    }

    /// Replaces the player's hand.
    pub fn set_hand(&mut self, hand: Vec<String>) {
        self.hand = hand;
    }
}
