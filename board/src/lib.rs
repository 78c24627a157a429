#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative board topology and occupancy for Cluedo.
//!
//! The board is built once from a text layout and a [`GameContent`] table.
//! Rooms, doors and portals never change afterwards; only the pieces and
//! weapons standing on squares move, and only through [`Board::move_item`],
//! [`Board::move_to_room`] and [`Board::set_up`].

mod layout;

use cluedo_core::{
    BuildError, CellCoord, CellRect, DoorOrientation, GameContent, ItemId, ItemKind, MoveError,
    RoomId,
};
use rand::{seq::SliceRandom, Rng};
use tracing::{debug, info};

/// Layout of the classic 24 by 25 board.
pub const CLASSIC_LAYOUT: &str = include_str!("../assets/classic.layout");

/// A single board square.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Square {
    pub(crate) cell: CellCoord,
    pub(crate) room: Option<RoomId>,
    pub(crate) piece: Option<ItemId>,
    pub(crate) weapon: Option<ItemId>,
    pub(crate) door: Option<DoorOrientation>,
    pub(crate) portal: Option<RoomId>,
}

impl Square {
    pub(crate) const fn void(cell: CellCoord) -> Self {
        Self {
            cell,
            room: None,
            piece: None,
            weapon: None,
            door: None,
            portal: None,
        }
    }

    /// Position of the square.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Room owning the square; `None` for void squares.
    #[must_use]
    pub const fn room(&self) -> Option<RoomId> {
        self.room
    }

    /// Piece standing on the square.
    #[must_use]
    pub const fn piece(&self) -> Option<ItemId> {
        self.piece
    }

    /// Weapon lying on the square.
    #[must_use]
    pub const fn weapon(&self) -> Option<ItemId> {
        self.weapon
    }

    /// Orientation of the door, if the square is one.
    #[must_use]
    pub const fn door(&self) -> Option<DoorOrientation> {
        self.door
    }

    /// Reports whether the square is a door.
    #[must_use]
    pub const fn is_door(&self) -> bool {
        self.door.is_some()
    }

    /// Room reached through the portal on this square.
    #[must_use]
    pub const fn portal(&self) -> Option<RoomId> {
        self.portal
    }

    /// Reports whether the square belongs to a named room.
    #[must_use]
    pub fn is_room(&self) -> bool {
        self.room.map_or(false, |room| !room.is_corridor())
    }

    /// Reports whether the square belongs to the corridor.
    #[must_use]
    pub fn is_corridor(&self) -> bool {
        self.room.map_or(false, |room| room.is_corridor())
    }

    /// Reports whether a piece may be placed on the square.
    #[must_use]
    pub const fn can_contain_piece(&self) -> bool {
        self.piece.is_none()
    }

    /// Reports whether a weapon may be placed on the square.
    #[must_use]
    pub const fn can_contain_weapon(&self) -> bool {
        self.weapon.is_none()
    }

    /// Reports whether an item of the given kind may be placed on the square.
    #[must_use]
    pub const fn can_contain(&self, kind: ItemKind) -> bool {
        match kind {
            ItemKind::Piece => self.can_contain_piece(),
            ItemKind::Weapon => self.can_contain_weapon(),
        }
    }

    /// Kind of item on the square that keeps an incoming `kind` out.
    ///
    /// A piece blocks every item. A weapon blocks only another weapon.
    fn blocking_kind(&self, kind: ItemKind) -> Option<ItemKind> {
        if self.piece.is_some() {
            Some(ItemKind::Piece)
        } else if !self.can_contain(kind) {
            Some(kind)
        } else {
            None
        }
    }

    fn slot_mut(&mut self, kind: ItemKind) -> &mut Option<ItemId> {
        match kind {
            ItemKind::Piece => &mut self.piece,
            ItemKind::Weapon => &mut self.weapon,
        }
    }
}

/// One-way link from a square to another room.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Portal {
    pub(crate) cell: CellCoord,
    pub(crate) target: RoomId,
}

impl Portal {
    /// Square holding the portal.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Room the portal leads to.
    #[must_use]
    pub const fn target(&self) -> RoomId {
        self.target
    }
}

/// A named area of the board, or the corridor joining them.
///
/// Rooms compare equal when their names match.
#[derive(Clone, Debug)]
pub struct Room {
    pub(crate) id: RoomId,
    pub(crate) name: String,
    pub(crate) squares: Vec<CellCoord>,
    pub(crate) doors: Vec<CellCoord>,
    pub(crate) bounds: Option<CellRect>,
    pub(crate) portal: Option<Portal>,
}

impl Room {
    pub(crate) fn new(id: RoomId, name: &str) -> Self {
        Self {
            id,
            name: name.to_owned(),
            squares: Vec::new(),
            doors: Vec::new(),
            bounds: None,
            portal: None,
        }
    }

    /// Identifier of the room.
    #[must_use]
    pub const fn id(&self) -> RoomId {
        self.id
    }

    /// Card and display name of the room.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Member squares in row-major order, doors and portal included.
    #[must_use]
    pub fn squares(&self) -> &[CellCoord] {
        &self.squares
    }

    /// Door squares in row-major order.
    #[must_use]
    pub fn doors(&self) -> &[CellCoord] {
        &self.doors
    }

    /// Rectangle enclosing every member square; `None` for the corridor.
    #[must_use]
    pub const fn bounds(&self) -> Option<CellRect> {
        self.bounds
    }

    /// Outgoing portal of the room.
    #[must_use]
    pub const fn portal(&self) -> Option<Portal> {
        self.portal
    }

    /// Reports whether this is the corridor.
    #[must_use]
    pub const fn is_corridor(&self) -> bool {
        self.id.is_corridor()
    }
}

impl PartialEq for Room {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Room {}

/// A piece or weapon standing on the board.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item {
    id: ItemId,
    kind: ItemKind,
    name: String,
    cell: CellCoord,
    room: RoomId,
}

impl Item {
    /// Identifier of the item.
    #[must_use]
    pub const fn id(&self) -> ItemId {
        self.id
    }

    /// Whether the item is a piece or a weapon.
    #[must_use]
    pub const fn kind(&self) -> ItemKind {
        self.kind
    }

    /// Card name of the item.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Square the item occupies.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Room owning the occupied square.
    #[must_use]
    pub const fn room(&self) -> RoomId {
        self.room
    }
}

/// Grid of squares, rooms and the items standing on them.
#[derive(Clone, Debug)]
pub struct Board {
    content: GameContent,
    columns: u32,
    rows: u32,
    squares: Vec<Square>,
    rooms: Vec<Room>,
    items: Vec<Item>,
}

impl Board {
    /// Builds the classic board with the classic content.
    pub fn classic() -> Result<Self, BuildError> {
        Self::from_layout(CLASSIC_LAYOUT, GameContent::classic())
    }

    /// Builds a board from a layout description.
    ///
    /// Pieces start on their configured squares. Weapons are laid out one per
    /// room in table order until [`Board::set_up`] scatters them.
    pub fn from_layout(layout: &str, content: GameContent) -> Result<Self, BuildError> {
        content.validate()?;
        let grid = layout::parse(layout, &content)?;

        let mut board = Self {
            columns: grid.columns,
            rows: grid.rows,
            squares: grid.squares,
            rooms: grid.rooms,
            items: Vec::new(),
            content,
        };

        let characters = board.content.characters().to_vec();
        for character in characters {
            let square = board
                .square(character.start)
                .filter(|square| square.is_corridor())
                .ok_or_else(|| BuildError::InvalidStart {
                    name: character.name.clone(),
                    cell: character.start,
                })?;
            if !square.can_contain_piece() {
                return Err(BuildError::SharedStart(character.start));
            }
            let id = board.next_item_id()?;
            board.spawn(id, ItemKind::Piece, &character.name, character.start);
        }

        let weapons = board.content.weapons().to_vec();
        for (offset, weapon) in weapons.iter().enumerate() {
            let room = board
                .rooms
                .get(offset + 1)
                .ok_or(BuildError::NotEnoughRooms {
                    rooms: board.rooms.len().saturating_sub(1),
                    weapons: weapons.len(),
                })?;
            let cell = room
                .squares
                .iter()
                .copied()
                .find(|cell| board.is_resting_square(*cell, ItemKind::Weapon))
                .ok_or_else(|| BuildError::EmptyCategory("room squares"))?;
            let id = board.next_item_id()?;
            board.spawn(id, ItemKind::Weapon, weapon, cell);
        }

        debug!(
            columns = board.columns,
            rows = board.rows,
            rooms = board.rooms.len(),
            items = board.items.len(),
            "board built"
        );
        Ok(board)
    }

    fn next_item_id(&self) -> Result<ItemId, BuildError> {
        u8::try_from(self.items.len())
            .map(ItemId::new)
            .map_err(|_| BuildError::TooManyItems(self.items.len() + 1))
    }

    fn spawn(&mut self, id: ItemId, kind: ItemKind, name: &str, cell: CellCoord) {
        let room = self
            .square(cell)
            .and_then(Square::room)
            .unwrap_or(RoomId::CORRIDOR);
        self.items.push(Item {
            id,
            kind,
            name: name.to_owned(),
            cell,
            room,
        });
        if let Some(square) = self.square_mut(cell) {
            *square.slot_mut(kind) = Some(id);
        }
    }

    /// Content table the board was built from.
    #[must_use]
    pub fn content(&self) -> &GameContent {
        &self.content
    }

    /// Number of columns and rows.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Row-major position of `cell`, or `None` off the board.
    ///
    /// Matches the order of [`Board::squares`], so callers can keep
    /// per-square side tables.
    #[must_use]
    pub fn square_index(&self, cell: CellCoord) -> Option<usize> {
        layout::index(self.columns, self.rows, cell)
    }

    /// Square at the provided position.
    #[must_use]
    pub fn square(&self, cell: CellCoord) -> Option<&Square> {
        self.square_index(cell).and_then(|index| self.squares.get(index))
    }

    fn square_mut(&mut self, cell: CellCoord) -> Option<&mut Square> {
        self.square_index(cell).and_then(|index| self.squares.get_mut(index))
    }

    /// Iterator over every square in row-major order.
    pub fn squares(&self) -> impl Iterator<Item = &Square> {
        self.squares.iter()
    }

    /// Every room, corridor first.
    #[must_use]
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Room with the provided identifier.
    #[must_use]
    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(usize::from(id.get()))
    }

    /// Room with the provided name.
    #[must_use]
    pub fn room_by_name(&self, name: &str) -> Option<&Room> {
        self.rooms.iter().find(|room| room.name == name)
    }

    /// Room owning the square at the provided position.
    #[must_use]
    pub fn room_at(&self, cell: CellCoord) -> Option<&Room> {
        self.square(cell)
            .and_then(Square::room)
            .and_then(|id| self.room(id))
    }

    /// Every piece and weapon, pieces first.
    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Item with the provided identifier.
    #[must_use]
    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Item with the provided name.
    #[must_use]
    pub fn item_by_name(&self, name: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.name == name)
    }

    fn item_of_kind(&self, name: &str, kind: ItemKind) -> Result<&Item, MoveError> {
        self.item_by_name(name)
            .filter(|item| item.kind == kind)
            .ok_or_else(|| MoveError::UnknownItem(name.to_owned()))
    }

    /// Reports whether a single step from `from` to `to` is legal.
    ///
    /// Leaving a room for the corridor requires `from` to be a door facing
    /// `to`. Entering a room from the corridor requires `to` to be a door
    /// facing `from` and, when `exception` is given, that door must belong to
    /// the room owning the `exception` square. Moves inside the corridor or
    /// between room squares are always legal.
    #[must_use]
    pub fn valid_move(&self, from: CellCoord, to: CellCoord, exception: Option<CellCoord>) -> bool {
        let (Some(origin), Some(destination)) = (self.square(from), self.square(to)) else {
            return false;
        };
        let (Some(from_room), Some(to_room)) = (origin.room, destination.room) else {
            return false;
        };

        match (from_room.is_corridor(), to_room.is_corridor()) {
            (false, true) => origin
                .door
                .map_or(false, |orientation| orientation.admits(from, to)),
            (true, false) => {
                if let Some(exception) = exception {
                    let pinned = self.square(exception).and_then(Square::room);
                    if pinned != Some(to_room) {
                        return false;
                    }
                }
                destination
                    .door
                    .map_or(false, |orientation| orientation.admits(to, from))
            }
            _ => true,
        }
    }

    /// Orthogonal neighbours of `cell` that can be reached from it in one legal step.
    ///
    /// Neighbours are checked left, right, up, down.
    #[must_use]
    pub fn adjacent_squares(&self, cell: CellCoord, exception: Option<CellCoord>) -> Vec<CellCoord> {
        cell.orthogonal_neighbors(self.columns, self.rows)
            .into_iter()
            .filter(|neighbor| self.valid_move(cell, *neighbor, exception))
            .collect()
    }

    /// Orthogonal neighbours of `cell` from which it can be reached in one legal step.
    #[must_use]
    pub fn approach_squares(&self, cell: CellCoord, exception: Option<CellCoord>) -> Vec<CellCoord> {
        cell.orthogonal_neighbors(self.columns, self.rows)
            .into_iter()
            .filter(|neighbor| self.valid_move(*neighbor, cell, exception))
            .collect()
    }

    /// Picks a uniformly random square of `room` where an item of `kind` may rest.
    ///
    /// Doors and portal squares are never chosen.
    pub fn random_square<R>(&self, room: RoomId, kind: ItemKind, rng: &mut R) -> Option<CellCoord>
    where
        R: Rng + ?Sized,
    {
        let candidates: Vec<CellCoord> = self
            .room(room)?
            .squares
            .iter()
            .copied()
            .filter(|cell| self.is_resting_square(*cell, kind))
            .collect();
        candidates.choose(rng).copied()
    }

    fn is_resting_square(&self, cell: CellCoord, kind: ItemKind) -> bool {
        self.square(cell).map_or(false, |square| {
            !square.is_door() && square.portal.is_none() && square.can_contain(kind)
        })
    }

    /// Moves an item one step to `destination` and returns where it landed.
    ///
    /// A piece stepping into a room lands on a random free square of that
    /// room; everything else lands on `destination` itself. The board is left
    /// unchanged when the move fails.
    pub fn move_item<R>(
        &mut self,
        id: ItemId,
        destination: CellCoord,
        rng: &mut R,
    ) -> Result<CellCoord, MoveError>
    where
        R: Rng + ?Sized,
    {
        let item = self
            .item(id)
            .ok_or_else(|| MoveError::UnknownItem(format!("#{}", id.get())))?;
        let (kind, from) = (item.kind, item.cell);
        let square = self
            .square(destination)
            .ok_or(MoveError::OutOfBounds(destination))?;
        let room = square.room.ok_or(MoveError::NoRoom(destination))?;
        if let Some(blocking) = square.blocking_kind(kind) {
            return Err(MoveError::Occupied {
                cell: destination,
                kind: blocking,
            });
        }
        let enters_room = square.is_room();

        self.detach(id);
        let landing = if kind == ItemKind::Piece && enters_room {
            match self.random_square(room, kind, rng) {
                Some(cell) => cell,
                None => {
                    self.attach(id, from);
                    return Err(MoveError::RoomFull(self.room_name(room)));
                }
            }
        } else {
            destination
        };
        self.attach(id, landing);

        debug!(item = id.get(), %from, to = %landing, "item moved");
        Ok(landing)
    }

    /// Teleports a piece and a weapon onto random free squares of a room.
    ///
    /// Used when a suggestion summons the named suspect and weapon. The board
    /// is left unchanged when either item cannot be placed.
    pub fn move_to_room<R>(
        &mut self,
        piece: &str,
        weapon: &str,
        room: &str,
        rng: &mut R,
    ) -> Result<(), MoveError>
    where
        R: Rng + ?Sized,
    {
        let piece = self.item_of_kind(piece, ItemKind::Piece)?;
        let (piece_id, piece_from) = (piece.id, piece.cell);
        let weapon = self.item_of_kind(weapon, ItemKind::Weapon)?;
        let (weapon_id, weapon_from) = (weapon.id, weapon.cell);
        let room_id = self
            .room_by_name(room)
            .filter(|room| !room.is_corridor())
            .map(Room::id)
            .ok_or_else(|| MoveError::UnknownRoom(room.to_owned()))?;

        self.detach(piece_id);
        let Some(piece_cell) = self.random_square(room_id, ItemKind::Piece, rng) else {
            self.attach(piece_id, piece_from);
            return Err(MoveError::RoomFull(room.to_owned()));
        };
        self.attach(piece_id, piece_cell);

        self.detach(weapon_id);
        let Some(weapon_cell) = self.random_square(room_id, ItemKind::Weapon, rng) else {
            self.attach(weapon_id, weapon_from);
            self.detach(piece_id);
            self.attach(piece_id, piece_from);
            return Err(MoveError::RoomFull(room.to_owned()));
        };
        self.attach(weapon_id, weapon_cell);

        debug!(room, %piece_cell, %weapon_cell, "piece and weapon summoned");
        Ok(())
    }

    /// Returns every item to its starting arrangement.
    ///
    /// Pieces go back to their configured start squares. Each weapon is put
    /// in a different randomly chosen room on a random free square.
    pub fn set_up<R>(&mut self, rng: &mut R) -> Result<(), MoveError>
    where
        R: Rng + ?Sized,
    {
        for square in &mut self.squares {
            square.piece = None;
            square.weapon = None;
        }

        let starts: Vec<(ItemId, CellCoord)> = self
            .items
            .iter()
            .filter(|item| item.kind == ItemKind::Piece)
            .filter_map(|item| {
                self.content
                    .character(&item.name)
                    .map(|character| (item.id, character.start))
            })
            .collect();
        for (id, cell) in starts {
            self.attach(id, cell);
        }

        let weapons: Vec<ItemId> = self
            .items
            .iter()
            .filter(|item| item.kind == ItemKind::Weapon)
            .map(Item::id)
            .collect();
        let rooms: Vec<RoomId> = self
            .rooms
            .iter()
            .filter(|room| !room.is_corridor())
            .map(Room::id)
            .collect();
        let chosen: Vec<RoomId> = rooms.choose_multiple(rng, weapons.len()).copied().collect();

        for (weapon, room) in weapons.into_iter().zip(chosen) {
            let cell = self
                .random_square(room, ItemKind::Weapon, rng)
                .ok_or_else(|| MoveError::RoomFull(self.room_name(room)))?;
            self.attach(weapon, cell);
        }

        info!(items = self.items.len(), "board set up");
        Ok(())
    }

    fn room_name(&self, id: RoomId) -> String {
        self.room(id).map(|room| room.name.clone()).unwrap_or_default()
    }

    fn detach(&mut self, id: ItemId) {
        let Some((kind, cell)) = self.item(id).map(|item| (item.kind, item.cell)) else {
            return;
        };
        if let Some(square) = self.square_mut(cell) {
            let slot = square.slot_mut(kind);
            if *slot == Some(id) {
                *slot = None;
            }
        }
    }

    fn attach(&mut self, id: ItemId, cell: CellCoord) {
        let Some(index) = self.items.iter().position(|item| item.id == id) else {
            return;
        };
        let kind = self.items[index].kind;
        let room = self
            .square(cell)
            .and_then(Square::room)
            .unwrap_or(RoomId::CORRIDOR);
        if let Some(square) = self.square_mut(cell) {
            *square.slot_mut(kind) = Some(id);
        }
        let item = &mut self.items[index];
        item.cell = cell;
        item.room = room;
    }
}

/// Query functions that provide read-only views derived from the board.
pub mod query {
    use cluedo_core::{CellCoord, ItemKind, RoomId};

    use super::{Board, Item};

    /// Door of `room` closest to `target`, by straight-line distance.
    ///
    /// Ties keep the door listed first.
    #[must_use]
    pub fn closest_door(board: &Board, room: RoomId, target: CellCoord) -> Option<CellCoord> {
        let room = board.room(room)?;
        let mut best: Option<(CellCoord, f64)> = None;
        for door in room.doors() {
            let distance = door.euclidean_distance(target);
            match best {
                Some((_, closest)) if closest <= distance => {}
                _ => best = Some((*door, distance)),
            }
        }
        best.map(|(door, _)| door)
    }

    /// Items currently inside `room`.
    #[must_use]
    pub fn items_in_room(board: &Board, room: RoomId) -> Vec<&Item> {
        board.items().iter().filter(|item| item.room() == room).collect()
    }

    /// Character-cell rendering of the board.
    ///
    /// Pieces show as the digit of their index, weapons as lowercase letters
    /// starting at `a`, doors as `D`, portals as `P`, other squares as their
    /// room glyph, `-` for corridor and `#` for void.
    #[must_use]
    pub fn render(board: &Board) -> String {
        let (columns, _) = board.dimensions();
        let mut output = String::new();
        for square in board.squares() {
            let glyph = if let Some(piece) = square.piece() {
                char::from_digit(u32::from(piece.get()), 36).unwrap_or('?')
            } else if let Some(weapon) = square.weapon() {
                weapon_glyph(board, weapon.get())
            } else if square.is_door() {
                'D'
            } else if square.portal().is_some() {
                'P'
            } else {
                match square.room() {
                    None => '#',
                    Some(room) if room.is_corridor() => '-',
                    Some(room) => board
                        .content()
                        .rooms()
                        .get(usize::from(room.get()).saturating_sub(1))
                        .map_or('?', |spec| spec.glyph),
                }
            };
            output.push(glyph);
            if square.cell().column() + 1 == columns {
                output.push('\n');
            }
        }
        output
    }

    fn weapon_glyph(board: &Board, id: u8) -> char {
        let first_weapon = board
            .items()
            .iter()
            .find(|item| item.kind() == ItemKind::Weapon)
            .map_or(0, |item| item.id().get());
        let offset = id.saturating_sub(first_weapon);
        char::from(b'a'.saturating_add(offset))
    }
}
