//! Layout parser that turns a text grid into squares and rooms.

use cluedo_core::{BuildError, CellCoord, CellRect, DoorOrientation, GameContent, RoomId};

use crate::{Portal, Room, Square};

const VOID: char = '#';
const CORRIDOR: char = '-';
const DOOR: char = 'D';
const PORTAL: char = 'P';

/// Squares and rooms read from a layout, before any item is placed.
#[derive(Debug)]
pub(crate) struct Grid {
    pub(crate) columns: u32,
    pub(crate) rows: u32,
    pub(crate) squares: Vec<Square>,
    pub(crate) rooms: Vec<Room>,
}

impl Grid {
    fn index(&self, cell: CellCoord) -> Option<usize> {
        index(self.columns, self.rows, cell)
    }

    fn square(&self, cell: CellCoord) -> Option<&Square> {
        self.index(cell).and_then(|index| self.squares.get(index))
    }

    fn square_mut(&mut self, cell: CellCoord) -> Option<&mut Square> {
        self.index(cell).and_then(|index| self.squares.get_mut(index))
    }

    fn neighbor(&self, cell: CellCoord, dx: i64, dy: i64) -> Option<&Square> {
        let column = i64::from(cell.column()) + dx;
        let row = i64::from(cell.row()) + dy;
        let column = u32::try_from(column).ok()?;
        let row = u32::try_from(row).ok()?;
        self.square(CellCoord::new(column, row))
    }

    /// Out-of-bounds and void neighbours count as walls, not corridor.
    fn is_corridor_at(&self, cell: CellCoord, dx: i64, dy: i64) -> bool {
        self.neighbor(cell, dx, dy)
            .map_or(false, |square| square.is_corridor())
    }
}

pub(crate) fn index(columns: u32, rows: u32, cell: CellCoord) -> Option<usize> {
    if cell.column() < columns && cell.row() < rows {
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(columns).ok()?;
        Some(row * width + column)
    } else {
        None
    }
}

/// Parses `source` using the glyph table of `content`.
pub(crate) fn parse(source: &str, content: &GameContent) -> Result<Grid, BuildError> {
    let lines: Vec<Vec<char>> = source
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .map(|line| line.chars().collect())
        .collect();

    let Some(first) = lines.first() else {
        return Err(BuildError::EmptyLayout);
    };
    let columns = to_u32(first.len());
    let rows = to_u32(lines.len());

    let mut rooms = Vec::with_capacity(content.rooms().len() + 1);
    rooms.push(Room::new(RoomId::CORRIDOR, content.corridor()));
    for (offset, spec) in content.rooms().iter().enumerate() {
        let id = RoomId::new(u8::try_from(offset + 1).map_err(|_| {
            BuildError::TooManyRooms(content.rooms().len())
        })?);
        rooms.push(Room::new(id, &spec.name));
    }

    let mut grid = Grid {
        columns,
        rows,
        squares: Vec::with_capacity(lines.len() * first.len()),
        rooms,
    };
    let mut doors = Vec::new();
    let mut portals = Vec::new();

    for (row_index, line) in lines.iter().enumerate() {
        let row = to_u32(row_index);
        if line.len() != first.len() {
            return Err(BuildError::RaggedRow {
                row,
                expected: columns,
                actual: to_u32(line.len()),
            });
        }

        let mut column_index = 0;
        while column_index < line.len() {
            let cell = CellCoord::new(to_u32(column_index), row);
            let mut square = Square::void(cell);
            match line[column_index] {
                VOID => {}
                CORRIDOR => square.room = Some(RoomId::CORRIDOR),
                DOOR => {
                    square.door = Some(DoorOrientation::None);
                    doors.push(cell);
                }
                PORTAL => {
                    let target = line
                        .get(column_index + 1)
                        .and_then(|glyph| content.room_for_glyph(*glyph))
                        .ok_or(BuildError::PortalWithoutTarget(cell))?;
                    portals.push((cell, target));
                    grid.squares.push(square);
                    grid.squares.push(Square::void(CellCoord::new(
                        to_u32(column_index + 1),
                        row,
                    )));
                    column_index += 2;
                    continue;
                }
                glyph => {
                    let id = content
                        .room_for_glyph(glyph)
                        .ok_or(BuildError::UnknownGlyph { glyph, cell })?;
                    square.room = Some(id);
                }
            }
            grid.squares.push(square);
            column_index += 1;
        }
    }

    for door in doors {
        assign_door(&mut grid, door)?;
    }
    for (cell, target) in portals {
        attach_portal(&mut grid, cell, target)?;
    }
    register_members(&mut grid);

    Ok(grid)
}

fn assign_door(grid: &mut Grid, door: CellCoord) -> Result<(), BuildError> {
    let mut owner = None;
    'scan: for dx in -1..=1 {
        for dy in -1..=1 {
            if let Some(neighbor) = grid.neighbor(door, dx, dy) {
                if neighbor.is_room() {
                    owner = neighbor.room;
                    break 'scan;
                }
            }
        }
    }
    let owner = owner.ok_or(BuildError::DoorWithoutRoom(door))?;

    let orientation = if !grid.is_corridor_at(door, -1, 0) && !grid.is_corridor_at(door, 1, 0) {
        DoorOrientation::Vertical
    } else if !grid.is_corridor_at(door, 0, -1) && !grid.is_corridor_at(door, 0, 1) {
        DoorOrientation::Horizontal
    } else {
        DoorOrientation::Vertical
    };

    if let Some(square) = grid.square_mut(door) {
        square.room = Some(owner);
        square.door = Some(orientation);
    }
    Ok(())
}

fn attach_portal(grid: &mut Grid, cell: CellCoord, target: RoomId) -> Result<(), BuildError> {
    let owner = [(-1, 0), (1, 0), (0, -1), (0, 1)]
        .into_iter()
        .filter_map(|(dx, dy)| grid.neighbor(cell, dx, dy))
        .find(|neighbor| neighbor.is_room())
        .and_then(|neighbor| neighbor.room)
        .ok_or(BuildError::PortalWithoutRoom(cell))?;

    let room = grid
        .rooms
        .get_mut(usize::from(owner.get()))
        .ok_or(BuildError::PortalWithoutRoom(cell))?;
    if room.portal.is_some() {
        return Err(BuildError::DuplicatePortal(room.name.clone()));
    }
    room.portal = Some(Portal { cell, target });

    if let Some(square) = grid.square_mut(cell) {
        square.room = Some(owner);
        square.portal = Some(target);
    }
    let consumed = CellCoord::new(cell.column() + 1, cell.row());
    if let Some(square) = grid.square_mut(consumed) {
        square.room = Some(owner);
    }
    Ok(())
}

fn register_members(grid: &mut Grid) {
    for square in &grid.squares {
        let Some(room_id) = square.room else {
            continue;
        };
        let Some(room) = grid.rooms.get_mut(usize::from(room_id.get())) else {
            continue;
        };
        room.squares.push(square.cell);
        if square.is_door() {
            room.doors.push(square.cell);
        }
        if !room_id.is_corridor() {
            room.bounds = Some(match room.bounds {
                Some(bounds) => bounds.expanded_to(square.cell),
                None => CellRect::single(square.cell),
            });
        }
    }
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_content() -> GameContent {
        GameContent::classic()
    }

    #[test]
    fn rejects_empty_layout() {
        let result = parse("\n\n", &tiny_content());
        assert!(matches!(result, Err(BuildError::EmptyLayout)));
    }

    #[test]
    fn rejects_ragged_rows() {
        let result = parse("KK--\nKK-\n", &tiny_content());
        assert!(matches!(
            result,
            Err(BuildError::RaggedRow {
                row: 1,
                expected: 4,
                actual: 3
            })
        ));
    }

    #[test]
    fn rejects_unknown_glyphs() {
        let result = parse("KK-X\n", &tiny_content());
        assert!(matches!(
            result,
            Err(BuildError::UnknownGlyph { glyph: 'X', .. })
        ));
    }

    #[test]
    fn door_takes_room_and_orientation_from_neighbours() {
        let grid = parse("KKK\nKDK\n---\n", &tiny_content()).expect("layout parses");
        let door = grid.square(CellCoord::new(1, 1)).expect("door square");
        assert_eq!(door.room, Some(RoomId::new(1)));
        assert_eq!(door.door, Some(DoorOrientation::Vertical));
    }

    #[test]
    fn door_between_vertical_walls_opens_sideways() {
        let grid = parse("-K-\n-D-\n-K-\n", &tiny_content()).expect("layout parses");
        let door = grid.square(CellCoord::new(1, 1)).expect("door square");
        assert_eq!(door.door, Some(DoorOrientation::Horizontal));
    }

    #[test]
    fn isolated_door_is_rejected() {
        let result = parse("---\n-D-\n---\n", &tiny_content());
        assert!(matches!(result, Err(BuildError::DoorWithoutRoom(_))));
    }

    #[test]
    fn portal_consumes_target_glyph() {
        let grid = parse("PSK\nKKK\n---\n", &tiny_content()).expect("layout parses");
        let portal = grid.square(CellCoord::new(0, 0)).expect("portal square");
        assert_eq!(portal.room, Some(RoomId::new(1)));
        assert_eq!(portal.portal, Some(RoomId::new(9)));

        let consumed = grid.square(CellCoord::new(1, 0)).expect("consumed square");
        assert_eq!(consumed.room, Some(RoomId::new(1)));
        assert_eq!(consumed.portal, None);

        let kitchen = &grid.rooms[1];
        assert_eq!(
            kitchen.portal,
            Some(Portal {
                cell: CellCoord::new(0, 0),
                target: RoomId::new(9)
            })
        );
    }

    #[test]
    fn portal_without_room_is_rejected() {
        let result = parse("-PS-\n----\n", &tiny_content());
        assert!(matches!(result, Err(BuildError::PortalWithoutRoom(_))));
    }

    #[test]
    fn portal_at_row_end_is_rejected() {
        let result = parse("KKP\n", &tiny_content());
        assert!(matches!(result, Err(BuildError::PortalWithoutTarget(_))));
    }

    #[test]
    fn room_bounds_cover_member_squares() {
        let grid = parse("-KK\n-KK\n-D-\n", &tiny_content()).expect("layout parses");
        let kitchen = &grid.rooms[1];
        let bounds = kitchen.bounds.expect("kitchen bounds");
        assert_eq!(bounds.origin(), CellCoord::new(1, 0));
        assert_eq!(bounds.size().width(), 2);
        assert_eq!(bounds.size().height(), 3);
        assert_eq!(kitchen.doors, vec![CellCoord::new(1, 2)]);
        assert!(grid.rooms[0].bounds.is_none());
    }
}
